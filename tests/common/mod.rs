// Common test utilities: builders for a small but fully-populated shape
// that exercises every array the format carries.

use cgmath::Quaternion;
use dts_tools_lib::math::{DtsBox3, DtsPoint3, DtsQuat16};
use dts_tools_lib::shape::model::{
    DtsDetail, DtsFrameTrigger, DtsKeyFrame, DtsName, DtsNode, DtsObject, DtsSequence, DtsShape,
    DtsSubSequence, DtsTransform, DtsTransition, NO_ALWAYS_NODE, NO_PARENT,
};
use dts_tools_lib::shape::{
    ChunkPayload, DtsCelAnimMesh, DtsChunk, DtsFace, DtsFrame, DtsMaterial, DtsMaterialList,
    DtsTextureVertex, DtsVertex,
};

/// Two-frame mesh with three vertices per frame.
pub fn sample_mesh() -> DtsCelAnimMesh {
    let vertex = |x, y, z, normal| DtsVertex { x, y, z, normal };
    DtsCelAnimMesh {
        vertex_per_frame_count: 3,
        texture_vertex_per_frame_count: 2,
        radius: 2.5,
        vertex_list: vec![
            vertex(10, 20, 30, 0),
            vertex(0, 0, 0, 17),
            vertex(255, 255, 255, 255),
            vertex(12, 34, 56, 3),
            vertex(78, 90, 12, 99),
            vertex(1, 2, 3, 200),
        ],
        texture_vertex_list: vec![
            DtsTextureVertex { x: 0.0, y: 0.5 },
            DtsTextureVertex { x: 1.0, y: 0.25 },
        ],
        face_list: vec![
            DtsFace {
                vertex_index_list: [0, 1, 2],
                texture_index_list: [0, 1, 0],
                material: 0,
            },
            DtsFace {
                vertex_index_list: [2, 1, 0],
                texture_index_list: [1, 0, 1],
                material: 1,
            },
        ],
        frame_list: vec![
            DtsFrame {
                first_vertex_index: 0,
                scale: DtsPoint3::new(0.1, 0.1, 0.1),
                origin: DtsPoint3::new(1.0, 1.0, 1.0),
            },
            DtsFrame {
                first_vertex_index: 3,
                scale: DtsPoint3::new(0.25, 0.5, 1.0),
                origin: DtsPoint3::new(-4.0, 0.0, 2.0),
            },
        ],
    }
}

/// One detail level, two material slots.
pub fn sample_materials() -> DtsMaterialList {
    DtsMaterialList {
        detail_count: 1,
        material_count: 2,
        materials_list: vec![
            DtsMaterial {
                flags: 0x0303,
                alpha: 1.0,
                index: 0,
                color_r: 0,
                color_g: 0,
                color_b: 0,
                color_flags: 0,
                map_file: "turret.bmp".to_string(),
                surface_type: 0x3,
                elasticity: 0.4,
                friction: 0.7,
                use_default_props: 0,
            },
            DtsMaterial {
                flags: 0x0102,
                alpha: 0.5,
                index: 3,
                color_r: 200,
                color_g: 64,
                color_b: 32,
                color_flags: 1,
                map_file: String::new(),
                surface_type: 0x0,
                elasticity: 0.0,
                friction: 0.0,
                use_default_props: 1,
            },
        ],
    }
}

/// A two-node, two-object shape with one animated sequence, nested mesh
/// chunks and a trailing material list.
pub fn sample_shape() -> DtsShape {
    let identity = DtsQuat16::from_quaternion(&Quaternion::new(1.0, 0.0, 0.0, 0.0));
    let tilt = DtsQuat16::from_quaternion(&Quaternion::new(0.5, 0.5, 0.5, 0.5));

    DtsShape {
        radius: 5.0,
        center: DtsPoint3::new(0.0, 0.0, 1.0),
        bounds: DtsBox3 {
            min: DtsPoint3::new(-2.0, -2.0, 0.0),
            max: DtsPoint3::new(2.0, 2.0, 2.0),
        },
        node_list: vec![
            DtsNode {
                name_index: 0,
                parent_index: NO_PARENT,
                sub_sequence_count: 1,
                first_sub_sequence_index: 0,
                default_transform_index: 0,
            },
            DtsNode {
                name_index: 1,
                parent_index: 0,
                sub_sequence_count: 1,
                first_sub_sequence_index: 1,
                default_transform_index: 1,
            },
        ],
        sequence_list: vec![DtsSequence {
            name_index: 2,
            cyclic: 1,
            duration: 1.25,
            priority: 0,
            first_frame_trigger_index: 0,
            frame_trigger_count: 1,
            ifl_sub_sequence_count: 0,
            first_ifl_sub_sequence_index: 0,
        }],
        sub_sequence_list: vec![
            DtsSubSequence {
                sequence_index: 0,
                key_frame_count: 2,
                first_key_frame_index: 0,
            },
            DtsSubSequence {
                sequence_index: 0,
                key_frame_count: 1,
                first_key_frame_index: 2,
            },
        ],
        key_frame_list: vec![
            DtsKeyFrame {
                position: 0.0,
                key_value_index: 0,
                material_index: 0x9003,
            },
            DtsKeyFrame {
                position: 0.5,
                key_value_index: 1,
                material_index: 0x0000,
            },
            DtsKeyFrame {
                position: 1.0,
                key_value_index: 1,
                material_index: 0x4001,
            },
        ],
        transform_list: vec![
            DtsTransform {
                quat: identity,
                translate: DtsPoint3::new(0.0, 0.0, 0.0),
            },
            DtsTransform {
                quat: tilt,
                translate: DtsPoint3::new(1.0, 2.0, 3.0),
            },
        ],
        name_list: vec![
            DtsName::new("body"),
            DtsName::new("turret"),
            DtsName::new("run"),
        ],
        object_list: vec![
            DtsObject {
                name_index: 0,
                flags: 0,
                mesh_index: 0,
                node_index: 0,
                padding: 0,
                offset: DtsPoint3::new(0.0, 0.0, 0.0),
                sub_sequence_count: 0,
                first_sub_sequence_index: 0,
            },
            DtsObject {
                name_index: 1,
                flags: 1,
                mesh_index: 1,
                node_index: 1,
                padding: 0,
                offset: DtsPoint3::new(0.0, 0.5, 0.0),
                sub_sequence_count: 1,
                first_sub_sequence_index: 1,
            },
        ],
        detail_list: vec![DtsDetail {
            root_node_index: 0,
            min_size: 0.0,
        }],
        transition_list: vec![DtsTransition {
            start_sequence_index: 0,
            end_sequence_index: 0,
            start_position: 0.0,
            end_position: 1.0,
            duration: 0.25,
            transform: DtsTransform {
                quat: tilt,
                translate: DtsPoint3::new(0.0, 0.0, 0.0),
            },
        }],
        frame_trigger_list: vec![DtsFrameTrigger {
            position: 0.5,
            value: 7,
        }],
        default_materials: 2,
        always_node: NO_ALWAYS_NODE,
        mesh_list: vec![
            DtsChunk::new(ChunkPayload::CelAnimMesh(sample_mesh()), 1),
            DtsChunk::new(ChunkPayload::CelAnimMesh(sample_mesh()), 1),
        ],
        material_list: Some(Box::new(DtsChunk::new(
            ChunkPayload::MaterialList(sample_materials()),
            1,
        ))),
    }
}

/// The sample shape wrapped in its file-level chunk.
pub fn sample_shape_chunk() -> DtsChunk {
    DtsChunk::new(ChunkPayload::Shape(sample_shape()), 8)
}
