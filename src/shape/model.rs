use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite, Endian};
use ptree::{item::StringItem, TreeBuilder};
use serde::{Deserialize, Serialize};

use super::chunk::DtsChunk;
use super::material::DtsMaterialList;
use super::mesh::DtsCelAnimMesh;
use super::{fill_slot, read_count, read_seq, string_from_slot};
use crate::math::{DtsBox3, DtsPoint3, DtsQuat16};

/// Fixed byte width of one name-table slot.
pub const DTS_MAX_NAME: usize = 24;

/// Parent index of a root node.
pub const NO_PARENT: i16 = -1;

/// `always_node` value for a shape without an always-drawn node.
pub const NO_ALWAYS_NODE: i32 = -1;

/// Object flag bit: the object starts invisible.
pub const OBJECT_DEFAULT_INVISIBLE: i16 = 0x0001;

pub const KEY_VISIBLE: u16 = 0x8000;
pub const KEY_CARES_ABOUT_VISIBILITY: u16 = 0x4000;
pub const KEY_CARES_ABOUT_MATERIAL: u16 = 0x2000;
pub const KEY_CARES_ABOUT_FRAME: u16 = 0x1000;
pub const KEY_MATERIAL_INDEX_MASK: u16 = 0x0FFF;

/// A transform-bearing point in the shape hierarchy ("bone"). Nodes form a
/// forest via `parent_index`; the parent may sit before or after the child
/// in the array.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsNode {
    pub name_index: i16,
    pub parent_index: i16,
    pub sub_sequence_count: i16,
    pub first_sub_sequence_index: i16,
    pub default_transform_index: i16,
}

impl DtsNode {
    pub const SIZE: usize = 10;
}

/// A named animation clip. Nodes and objects bind to it through their
/// sub-sequence runs, not the other way around.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsSequence {
    pub name_index: i32,
    pub cyclic: i32,
    pub duration: f32,
    pub priority: i32,
    pub first_frame_trigger_index: i32,
    pub frame_trigger_count: i32,
    pub ifl_sub_sequence_count: i32,
    pub first_ifl_sub_sequence_index: i32,
}

impl DtsSequence {
    pub const SIZE: usize = 32;

    pub fn is_cyclic(&self) -> bool {
        self.cyclic != 0
    }
}

/// Binds a contiguous run of keyframes to a sequence, on behalf of the node
/// or object that owns this sub-sequence.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsSubSequence {
    pub sequence_index: i16,
    pub key_frame_count: i16,
    pub first_key_frame_index: i16,
}

impl DtsSubSequence {
    pub const SIZE: usize = 6;
}

/// One timed sample in a sub-sequence.
///
/// `key_value_index` points into the shape transform array for node-driven
/// sub-sequences and into the mesh frame array for cel-driven ones. The top
/// four bits of `material_index` are flags; the low twelve are the actual
/// material index.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsKeyFrame {
    pub position: f32,
    pub key_value_index: u16,
    pub material_index: u16,
}

impl DtsKeyFrame {
    pub const SIZE: usize = 8;

    pub fn visibility(&self) -> bool {
        self.material_index & KEY_VISIBLE != 0
    }

    pub fn cares_about_visibility(&self) -> bool {
        self.material_index & KEY_CARES_ABOUT_VISIBILITY != 0
    }

    pub fn cares_about_material(&self) -> bool {
        self.material_index & KEY_CARES_ABOUT_MATERIAL != 0
    }

    pub fn cares_about_frame(&self) -> bool {
        self.material_index & KEY_CARES_ABOUT_FRAME != 0
    }

    pub fn material(&self) -> u16 {
        self.material_index & KEY_MATERIAL_INDEX_MASK
    }
}

/// A quantized rotation plus translation.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsTransform {
    pub quat: DtsQuat16,
    pub translate: DtsPoint3,
}

impl DtsTransform {
    pub const SIZE: usize = DtsQuat16::SIZE + DtsPoint3::SIZE;
}

/// One entry of the shape name table: a fixed 24-byte NUL-padded slot.
#[binrw]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsName {
    #[br(map = |raw: [u8; DTS_MAX_NAME]| string_from_slot(&raw))]
    #[bw(map = |name: &String| fill_slot::<DTS_MAX_NAME>(name))]
    pub name: String,
}

impl DtsName {
    pub const SIZE: usize = DTS_MAX_NAME;

    pub fn new(name: &str) -> Self {
        DtsName {
            name: name.to_string(),
        }
    }
}

/// Geometry bound to exactly one node. An object whose name equals its
/// node's name is that node's primary mesh; others are attachments.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsObject {
    pub name_index: i16,
    pub flags: i16,
    pub mesh_index: i32,
    pub node_index: i16,
    // alignment filler in the original layout, preserved verbatim
    pub padding: i16,
    pub offset: DtsPoint3,
    pub sub_sequence_count: i16,
    pub first_sub_sequence_index: i16,
}

impl DtsObject {
    pub const SIZE: usize = 16 + DtsPoint3::SIZE;

    pub fn default_invisible(&self) -> bool {
        self.flags & OBJECT_DEFAULT_INVISIBLE != 0
    }
}

/// Level-of-detail entry: the node subtree to draw once the shape's
/// projected size reaches `min_size`.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsDetail {
    pub root_node_index: i32,
    pub min_size: f32,
}

impl DtsDetail {
    pub const SIZE: usize = 8;
}

/// Blend descriptor between two sequences.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsTransition {
    pub start_sequence_index: i32,
    pub end_sequence_index: i32,
    pub start_position: f32,
    pub end_position: f32,
    pub duration: f32,
    pub transform: DtsTransform,
}

impl DtsTransition {
    pub const SIZE: usize = 20 + DtsTransform::SIZE;
}

/// Named event marker fired when a sequence passes `position`.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsFrameTrigger {
    pub position: f32,
    pub value: i32,
}

impl DtsFrameTrigger {
    pub const SIZE: usize = 8;
}

/// The decoded shape: the full scene of nodes, objects, animation tables,
/// nested mesh chunks and the optional trailing material list.
///
/// All cross-references between the arrays are plain integer indices; the
/// shape owns every array outright. Array counts are not stored — encoding
/// re-derives each count from the owning array's length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DtsShape {
    pub radius: f32,
    pub center: DtsPoint3,
    pub bounds: DtsBox3,
    pub node_list: Vec<DtsNode>,
    pub sequence_list: Vec<DtsSequence>,
    pub sub_sequence_list: Vec<DtsSubSequence>,
    pub key_frame_list: Vec<DtsKeyFrame>,
    pub transform_list: Vec<DtsTransform>,
    pub name_list: Vec<DtsName>,
    pub object_list: Vec<DtsObject>,
    pub detail_list: Vec<DtsDetail>,
    pub transition_list: Vec<DtsTransition>,
    pub frame_trigger_list: Vec<DtsFrameTrigger>,
    pub default_materials: i32,
    pub always_node: i32,
    pub mesh_list: Vec<DtsChunk>,
    pub material_list: Option<Box<DtsChunk>>,
}

impl BinRead for DtsShape {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let node_count = read_count(reader, endian)?;
        let sequence_count = read_count(reader, endian)?;
        let sub_sequence_count = read_count(reader, endian)?;
        let key_frame_count = read_count(reader, endian)?;
        let transform_count = read_count(reader, endian)?;
        let name_count = read_count(reader, endian)?;
        let object_count = read_count(reader, endian)?;
        let detail_count = read_count(reader, endian)?;
        let mesh_count = read_count(reader, endian)?;
        let transition_count = read_count(reader, endian)?;
        let frame_trigger_count = read_count(reader, endian)?;
        let radius = f32::read_options(reader, endian, ())?;
        let center = DtsPoint3::read_options(reader, endian, ())?;
        let bounds = DtsBox3::read_options(reader, endian, ())?;

        let node_list = read_seq(reader, endian, node_count)?;
        let sequence_list = read_seq(reader, endian, sequence_count)?;
        let sub_sequence_list = read_seq(reader, endian, sub_sequence_count)?;
        let key_frame_list = read_seq(reader, endian, key_frame_count)?;
        let transform_list = read_seq(reader, endian, transform_count)?;
        let name_list = read_seq(reader, endian, name_count)?;
        let object_list = read_seq(reader, endian, object_count)?;
        let detail_list = read_seq(reader, endian, detail_count)?;
        let transition_list = read_seq(reader, endian, transition_count)?;
        let frame_trigger_list = read_seq(reader, endian, frame_trigger_count)?;

        let default_materials = i32::read_options(reader, endian, ())?;
        let always_node = i32::read_options(reader, endian, ())?;

        let mesh_list = read_seq(reader, endian, mesh_count)?;

        let has_materials = i32::read_options(reader, endian, ())?;
        let material_list = if has_materials != 0 {
            Some(Box::new(DtsChunk::read_options(reader, endian, ())?))
        } else {
            None
        };

        Ok(DtsShape {
            radius,
            center,
            bounds,
            node_list,
            sequence_list,
            sub_sequence_list,
            key_frame_list,
            transform_list,
            name_list,
            object_list,
            detail_list,
            transition_list,
            frame_trigger_list,
            default_materials,
            always_node,
            mesh_list,
            material_list,
        })
    }
}

impl BinWrite for DtsShape {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        (self.node_list.len() as i32).write_options(writer, endian, ())?;
        (self.sequence_list.len() as i32).write_options(writer, endian, ())?;
        (self.sub_sequence_list.len() as i32).write_options(writer, endian, ())?;
        (self.key_frame_list.len() as i32).write_options(writer, endian, ())?;
        (self.transform_list.len() as i32).write_options(writer, endian, ())?;
        (self.name_list.len() as i32).write_options(writer, endian, ())?;
        (self.object_list.len() as i32).write_options(writer, endian, ())?;
        (self.detail_list.len() as i32).write_options(writer, endian, ())?;
        (self.mesh_list.len() as i32).write_options(writer, endian, ())?;
        (self.transition_list.len() as i32).write_options(writer, endian, ())?;
        (self.frame_trigger_list.len() as i32).write_options(writer, endian, ())?;
        self.radius.write_options(writer, endian, ())?;
        self.center.write_options(writer, endian, ())?;
        self.bounds.write_options(writer, endian, ())?;

        for node in &self.node_list {
            node.write_options(writer, endian, ())?;
        }
        for sequence in &self.sequence_list {
            sequence.write_options(writer, endian, ())?;
        }
        for sub_sequence in &self.sub_sequence_list {
            sub_sequence.write_options(writer, endian, ())?;
        }
        for key_frame in &self.key_frame_list {
            key_frame.write_options(writer, endian, ())?;
        }
        for transform in &self.transform_list {
            transform.write_options(writer, endian, ())?;
        }
        for name in &self.name_list {
            name.write_options(writer, endian, ())?;
        }
        for object in &self.object_list {
            object.write_options(writer, endian, ())?;
        }
        for detail in &self.detail_list {
            detail.write_options(writer, endian, ())?;
        }
        for transition in &self.transition_list {
            transition.write_options(writer, endian, ())?;
        }
        for frame_trigger in &self.frame_trigger_list {
            frame_trigger.write_options(writer, endian, ())?;
        }

        self.default_materials.write_options(writer, endian, ())?;
        self.always_node.write_options(writer, endian, ())?;

        for mesh in &self.mesh_list {
            mesh.write_options(writer, endian, ())?;
        }

        i32::from(self.material_list.is_some()).write_options(writer, endian, ())?;
        if let Some(material_list) = &self.material_list {
            material_list.write_options(writer, endian, ())?;
        }

        Ok(())
    }
}

impl DtsShape {
    /// Exact encoded byte size of the shape payload.
    pub fn size(&self) -> usize {
        let mut size = 12 * 4 + DtsPoint3::SIZE + DtsBox3::SIZE;
        size += self.node_list.len() * DtsNode::SIZE;
        size += self.sequence_list.len() * DtsSequence::SIZE;
        size += self.sub_sequence_list.len() * DtsSubSequence::SIZE;
        size += self.key_frame_list.len() * DtsKeyFrame::SIZE;
        size += self.transform_list.len() * DtsTransform::SIZE;
        size += self.name_list.len() * DtsName::SIZE;
        size += self.object_list.len() * DtsObject::SIZE;
        size += self.detail_list.len() * DtsDetail::SIZE;
        size += self.transition_list.len() * DtsTransition::SIZE;
        size += self.frame_trigger_list.len() * DtsFrameTrigger::SIZE;
        size += 2 * 4; // default_materials + always_node
        size += self.mesh_list.iter().map(DtsChunk::size).sum::<usize>();
        size += 4; // has_materials
        if let Some(material_list) = &self.material_list {
            size += material_list.size();
        }
        size
    }

    /// Resolve a name-table index.
    pub fn name(&self, index: impl Into<i32>) -> Option<&str> {
        let index = usize::try_from(index.into()).ok()?;
        self.name_list.get(index).map(|n| n.name.as_str())
    }

    pub fn node_name(&self, node: &DtsNode) -> Option<&str> {
        self.name(node.name_index)
    }

    pub fn object_name(&self, object: &DtsObject) -> Option<&str> {
        self.name(object.name_index)
    }

    pub fn sequence_name(&self, sequence: &DtsSequence) -> Option<&str> {
        self.name(sequence.name_index)
    }

    /// Whether `object` is the primary mesh of its node, i.e. their names
    /// resolve to the same string. Which of several objects on a node gets
    /// the node's default transform is a consumer decision; this only
    /// surfaces the name-equality fact.
    pub fn object_is_primary(&self, object: &DtsObject) -> bool {
        let node = match usize::try_from(object.node_index)
            .ok()
            .and_then(|i| self.node_list.get(i))
        {
            Some(node) => node,
            None => return false,
        };
        match (self.name(object.name_index), self.name(node.name_index)) {
            (Some(object_name), Some(node_name)) => object_name == node_name,
            _ => false,
        }
    }

    /// The sub-sequence run owned by `node`, or an empty slice if the run
    /// is out of range.
    pub fn node_sub_sequences(&self, node: &DtsNode) -> &[DtsSubSequence] {
        slice_run(
            &self.sub_sequence_list,
            node.first_sub_sequence_index as i32,
            node.sub_sequence_count as i32,
        )
    }

    /// The sub-sequence run owned by `object`, or an empty slice if the run
    /// is out of range.
    pub fn object_sub_sequences(&self, object: &DtsObject) -> &[DtsSubSequence] {
        slice_run(
            &self.sub_sequence_list,
            object.first_sub_sequence_index as i32,
            object.sub_sequence_count as i32,
        )
    }

    /// The keyframe run of one sub-sequence, or an empty slice if out of
    /// range.
    pub fn sub_sequence_key_frames(&self, sub_sequence: &DtsSubSequence) -> &[DtsKeyFrame] {
        slice_run(
            &self.key_frame_list,
            sub_sequence.first_key_frame_index as i32,
            sub_sequence.key_frame_count as i32,
        )
    }

    pub fn sub_sequence_sequence(&self, sub_sequence: &DtsSubSequence) -> Option<&DtsSequence> {
        usize::try_from(sub_sequence.sequence_index)
            .ok()
            .and_then(|i| self.sequence_list.get(i))
    }

    /// The mesh payload at `index` in the mesh chunk list, if that chunk
    /// actually holds a mesh.
    pub fn mesh(&self, index: i32) -> Option<&DtsCelAnimMesh> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.mesh_list.get(i))
            .and_then(DtsChunk::cel_anim_mesh)
    }

    /// The trailing material list, if present and actually a material list.
    /// The decoder does not verify the gated chunk's payload type; a
    /// mismatch shows up here as `None`.
    pub fn materials(&self) -> Option<&DtsMaterialList> {
        self.material_list
            .as_deref()
            .and_then(DtsChunk::material_list)
    }

    /// Printable tree of the node forest with each node's objects attached.
    pub fn hierarchy_tree(&self) -> StringItem {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.node_list.len()];
        let mut roots = Vec::new();
        for (idx, node) in self.node_list.iter().enumerate() {
            match usize::try_from(node.parent_index)
                .ok()
                .filter(|&p| p < self.node_list.len())
            {
                Some(parent) => children[parent].push(idx),
                None => roots.push(idx),
            }
        }

        let mut builder = TreeBuilder::new("shape".to_string());
        let mut visited = vec![false; self.node_list.len()];
        for root in roots {
            self.add_node_to_tree(&mut builder, &children, &mut visited, root);
        }
        builder.build()
    }

    fn add_node_to_tree(
        &self,
        builder: &mut TreeBuilder,
        children: &[Vec<usize>],
        visited: &mut [bool],
        idx: usize,
    ) {
        if visited[idx] {
            return;
        }
        visited[idx] = true;

        let node = &self.node_list[idx];
        builder.begin_child(format!(
            "{} (node {})",
            self.node_name(node).unwrap_or("?"),
            idx
        ));
        for (object_idx, object) in self.object_list.iter().enumerate() {
            if usize::try_from(object.node_index).map_or(false, |node| node == idx) {
                builder.add_empty_child(format!(
                    "object {} `{}` -> mesh {}",
                    object_idx,
                    self.object_name(object).unwrap_or("?"),
                    object.mesh_index
                ));
            }
        }
        for &child in &children[idx] {
            self.add_node_to_tree(builder, children, visited, child);
        }
        builder.end_child();
    }
}

fn slice_run<T>(items: &[T], first: i32, count: i32) -> &[T] {
    let (Ok(first), Ok(count)) = (usize::try_from(first), usize::try_from(count)) else {
        return &[];
    };
    first
        .checked_add(count)
        .and_then(|end| items.get(first..end))
        .unwrap_or(&[])
}
