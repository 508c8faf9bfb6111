use std::path::PathBuf;

use dts_tools_lib::shape::ChunkPayload;
use dts_tools_lib::DtsChunk;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage:");
        eprintln!("  dts_inspect <shape.dts> [--tree] [--json]");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  dts_inspect egg.dts");
        eprintln!("  dts_inspect egg.dts --tree");
        eprintln!("  dts_inspect egg.dts --json > egg.json");
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let show_tree = args.iter().any(|a| a == "--tree");
    let show_json = args.iter().any(|a| a == "--json");

    let chunk = match DtsChunk::from_file(&path) {
        Ok(chunk) => chunk,
        Err(e) => {
            eprintln!("{:?}", e);
            std::process::exit(1);
        }
    };

    eprintln!("Chunk: {}", chunk.payload.chunk_name());
    eprintln!("  version: {}", chunk.version);
    eprintln!("  encoded size: {} bytes", chunk.size());

    match &chunk.payload {
        ChunkPayload::Shape(shape) => {
            eprintln!("  radius: {}", shape.radius);
            eprintln!("  nodes: {}", shape.node_list.len());
            eprintln!("  objects: {}", shape.object_list.len());
            eprintln!("  sequences: {}", shape.sequence_list.len());
            eprintln!("  sub-sequences: {}", shape.sub_sequence_list.len());
            eprintln!("  key frames: {}", shape.key_frame_list.len());
            eprintln!("  transforms: {}", shape.transform_list.len());
            eprintln!("  details: {}", shape.detail_list.len());
            eprintln!("  transitions: {}", shape.transition_list.len());
            eprintln!("  frame triggers: {}", shape.frame_trigger_list.len());
            eprintln!("  meshes: {}", shape.mesh_list.len());
            match shape.materials() {
                Some(materials) => eprintln!(
                    "  materials: {} ({} details x {} slots)",
                    materials.materials_list.len(),
                    materials.detail_count,
                    materials.material_count
                ),
                None => eprintln!("  materials: none"),
            }

            if show_tree {
                if let Err(e) = ptree::print_tree(&shape.hierarchy_tree()) {
                    eprintln!("Failed to print hierarchy: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ChunkPayload::CelAnimMesh(mesh) => {
            eprintln!("  vertices: {}", mesh.vertex_list.len());
            eprintln!("  vertices per frame: {}", mesh.vertex_per_frame_count);
            eprintln!("  texture vertices: {}", mesh.texture_vertex_list.len());
            eprintln!("  faces: {}", mesh.face_list.len());
            eprintln!("  frames: {}", mesh.frame_list.len());
        }
        ChunkPayload::MaterialList(materials) => {
            eprintln!(
                "  materials: {} ({} details x {} slots)",
                materials.materials_list.len(),
                materials.detail_count,
                materials.material_count
            );
        }
    }

    if show_json {
        match serde_json::to_string_pretty(&chunk) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize chunk: {}", e);
                std::process::exit(1);
            }
        }
    }
}
