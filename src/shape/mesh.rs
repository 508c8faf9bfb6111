use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite, Endian};
use serde::{Deserialize, Serialize};

use super::normal_table::lookup_normal;
use super::{read_count, read_seq};
use crate::error::DtsError;
use crate::math::DtsPoint3;

/// A quantized vertex: one byte per axis plus a normal-table index.
///
/// The raw axis bytes only become model-space coordinates through the
/// scale/origin block of the frame that owns the vertex; see
/// [`DtsVertex::decode`].
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsVertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub normal: u8,
}

impl DtsVertex {
    pub const SIZE: usize = 4;

    /// Dequantize against a frame's scale/origin block. The normal is a
    /// table lookup, never derived from geometry.
    pub fn decode(&self, frame: &DtsFrame) -> (DtsPoint3, DtsPoint3) {
        let scale = &frame.scale.0;
        let origin = &frame.origin.0;
        let point = DtsPoint3::new(
            self.x as f32 * scale.x + origin.x,
            self.y as f32 * scale.y + origin.y,
            self.z as f32 * scale.z + origin.z,
        );
        (point, lookup_normal(self.normal))
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsTextureVertex {
    pub x: f32,
    pub y: f32,
}

impl DtsTextureVertex {
    pub const SIZE: usize = 8;
}

/// A triangle: three vertex indices, three parallel texture-vertex indices
/// and a material slot. On the wire the vertex and texture indices are
/// interleaved (v0 t0 v1 t1 v2 t2), so reading and writing are by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DtsFace {
    pub vertex_index_list: [i32; 3],
    pub texture_index_list: [i32; 3],
    pub material: i32,
}

impl DtsFace {
    pub const SIZE: usize = 28;
}

impl BinRead for DtsFace {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let mut face = DtsFace::default();
        for corner in 0..3 {
            face.vertex_index_list[corner] = i32::read_options(reader, endian, ())?;
            face.texture_index_list[corner] = i32::read_options(reader, endian, ())?;
        }
        face.material = i32::read_options(reader, endian, ())?;
        Ok(face)
    }
}

impl BinWrite for DtsFace {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        for corner in 0..3 {
            self.vertex_index_list[corner].write_options(writer, endian, ())?;
            self.texture_index_list[corner].write_options(writer, endian, ())?;
        }
        self.material.write_options(writer, endian, ())
    }
}

/// Per-animation-frame vertex block: the run of vertices starting at
/// `first_vertex_index` shares this scale/origin pair.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsFrame {
    pub first_vertex_index: i32,
    pub scale: DtsPoint3,
    pub origin: DtsPoint3,
}

impl DtsFrame {
    pub const SIZE: usize = 4 + 2 * DtsPoint3::SIZE;
}

/// A multi-frame animated mesh.
///
/// The vertex array is partitioned into `frame_list.len()` contiguous runs
/// with increasing start offsets; `vertex_per_frame_count` vertices belong
/// to each run. Vertex counts are re-derived from the arrays on encode;
/// the two per-frame counts are real stored state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DtsCelAnimMesh {
    pub vertex_per_frame_count: i32,
    pub texture_vertex_per_frame_count: i32,
    pub radius: f32,
    pub vertex_list: Vec<DtsVertex>,
    pub texture_vertex_list: Vec<DtsTextureVertex>,
    pub face_list: Vec<DtsFace>,
    pub frame_list: Vec<DtsFrame>,
}

impl BinRead for DtsCelAnimMesh {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let vertex_count = read_count(reader, endian)?;
        let vertex_per_frame_count = i32::read_options(reader, endian, ())?;
        let texture_vertex_count = read_count(reader, endian)?;
        let face_count = read_count(reader, endian)?;
        let frame_count = read_count(reader, endian)?;
        let texture_vertex_per_frame_count = i32::read_options(reader, endian, ())?;
        let radius = f32::read_options(reader, endian, ())?;

        let vertex_list = read_seq(reader, endian, vertex_count)?;
        let texture_vertex_list = read_seq(reader, endian, texture_vertex_count)?;
        let face_list = read_seq(reader, endian, face_count)?;
        let frame_list = read_seq(reader, endian, frame_count)?;

        Ok(DtsCelAnimMesh {
            vertex_per_frame_count,
            texture_vertex_per_frame_count,
            radius,
            vertex_list,
            texture_vertex_list,
            face_list,
            frame_list,
        })
    }
}

impl BinWrite for DtsCelAnimMesh {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        (self.vertex_list.len() as i32).write_options(writer, endian, ())?;
        self.vertex_per_frame_count.write_options(writer, endian, ())?;
        (self.texture_vertex_list.len() as i32).write_options(writer, endian, ())?;
        (self.face_list.len() as i32).write_options(writer, endian, ())?;
        (self.frame_list.len() as i32).write_options(writer, endian, ())?;
        self.texture_vertex_per_frame_count
            .write_options(writer, endian, ())?;
        self.radius.write_options(writer, endian, ())?;

        for vertex in &self.vertex_list {
            vertex.write_options(writer, endian, ())?;
        }
        for texture_vertex in &self.texture_vertex_list {
            texture_vertex.write_options(writer, endian, ())?;
        }
        for face in &self.face_list {
            face.write_options(writer, endian, ())?;
        }
        for frame in &self.frame_list {
            frame.write_options(writer, endian, ())?;
        }

        Ok(())
    }
}

impl DtsCelAnimMesh {
    /// Exact encoded byte size of the mesh payload.
    pub fn size(&self) -> usize {
        7 * 4
            + self.vertex_list.len() * DtsVertex::SIZE
            + self.texture_vertex_list.len() * DtsTextureVertex::SIZE
            + self.face_list.len() * DtsFace::SIZE
            + self.frame_list.len() * DtsFrame::SIZE
    }

    /// The frame owning vertex `index`: the one with the greatest
    /// `first_vertex_index` not past the vertex. Frames partition the
    /// vertex array into contiguous, increasing-start runs, so a linear
    /// scan that stops at the first frame starting beyond `index` is exact.
    pub fn frame_for_vertex(&self, index: usize) -> Option<&DtsFrame> {
        let mut owner = None;
        for frame in &self.frame_list {
            match usize::try_from(frame.first_vertex_index) {
                Ok(first) if first <= index => owner = Some(frame),
                _ => break,
            }
        }
        owner
    }

    /// Dequantize vertex `index` into a model-space point and its table
    /// normal. A vertex index past the array, or one not covered by any
    /// frame run, is corrupt.
    pub fn decoded_vertex(&self, index: usize) -> Result<(DtsPoint3, DtsPoint3), DtsError> {
        let vertex = self
            .vertex_list
            .get(index)
            .ok_or(DtsError::CorruptVertex { vertex: index })?;
        let frame = self
            .frame_for_vertex(index)
            .ok_or(DtsError::CorruptVertex { vertex: index })?;
        Ok(vertex.decode(frame))
    }

    /// Check every face index against the declared vertex and
    /// texture-vertex arrays.
    pub fn validate_faces(&self) -> Result<(), DtsError> {
        let vertex_count = self.vertex_list.len();
        let texture_vertex_count = self.texture_vertex_list.len();
        for (face_index, face) in self.face_list.iter().enumerate() {
            for &index in &face.vertex_index_list {
                if usize::try_from(index).map_or(true, |i| i >= vertex_count) {
                    return Err(DtsError::CorruptFace {
                        face: face_index,
                        index,
                    });
                }
            }
            for &index in &face.texture_index_list {
                if usize::try_from(index).map_or(true, |i| i >= texture_vertex_count) {
                    return Err(DtsError::CorruptFace {
                        face: face_index,
                        index,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(first_vertex_index: i32) -> DtsFrame {
        DtsFrame {
            first_vertex_index,
            scale: DtsPoint3::new(0.1, 0.1, 0.1),
            origin: DtsPoint3::new(1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn vertex_decode_applies_scale_then_origin() {
        let vertex = DtsVertex {
            x: 10,
            y: 20,
            z: 30,
            normal: 0,
        };
        let (point, normal) = vertex.decode(&frame(0));
        assert_eq!(point, DtsPoint3::new(2.0, 3.0, 4.0));
        assert_eq!(normal, lookup_normal(0));
    }

    #[test]
    fn frames_partition_the_vertex_array() {
        let mesh = DtsCelAnimMesh {
            vertex_list: vec![DtsVertex::default(); 20],
            frame_list: vec![frame(0), frame(5), frame(12)],
            ..Default::default()
        };
        let starts: Vec<i32> = [4usize, 5, 11, 12, 19]
            .iter()
            .map(|&v| mesh.frame_for_vertex(v).unwrap().first_vertex_index)
            .collect();
        assert_eq!(starts, [0, 5, 5, 12, 12]);
    }

    #[test]
    fn vertex_before_the_first_frame_run_is_corrupt() {
        let mesh = DtsCelAnimMesh {
            vertex_list: vec![DtsVertex::default(); 4],
            frame_list: vec![frame(2)],
            ..Default::default()
        };
        assert_eq!(
            mesh.decoded_vertex(1),
            Err(DtsError::CorruptVertex { vertex: 1 })
        );
        assert!(mesh.decoded_vertex(3).is_ok());
    }

    #[test]
    fn faces_reject_out_of_range_indices() {
        let mut mesh = DtsCelAnimMesh {
            vertex_list: vec![DtsVertex::default(); 3],
            texture_vertex_list: vec![DtsTextureVertex::default(); 3],
            face_list: vec![DtsFace {
                vertex_index_list: [0, 1, 2],
                texture_index_list: [0, 1, 2],
                material: 0,
            }],
            ..Default::default()
        };
        assert_eq!(mesh.validate_faces(), Ok(()));

        mesh.face_list[0].vertex_index_list[2] = 3;
        assert_eq!(
            mesh.validate_faces(),
            Err(DtsError::CorruptFace { face: 0, index: 3 })
        );

        mesh.face_list[0].vertex_index_list[2] = -1;
        assert_eq!(
            mesh.validate_faces(),
            Err(DtsError::CorruptFace { face: 0, index: -1 })
        );
    }
}
