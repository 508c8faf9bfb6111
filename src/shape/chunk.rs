use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use binrw::{BinRead, BinResult, BinWrite, Endian};
use serde::{Deserialize, Serialize};

use super::material::DtsMaterialList;
use super::mesh::DtsCelAnimMesh;
use super::model::DtsShape;
use super::string_from_slot;
use crate::error::{raise, DtsError};

/// Magic of every chunk: the four bytes `PERS` packed high-to-low, so the
/// little-endian wire order is `S R E P`.
pub const DTS_CHUNK_TAG: i32 = 0x5045_5253;

pub const SHAPE_CHUNK_NAME: &str = "TS::Shape";
pub const MESH_CHUNK_NAME: &str = "TS::CelAnimMesh";
pub const MATERIAL_LIST_CHUNK_NAME: &str = "TS::MaterialList";

/// Chunk payload, selected solely by the decoded chunk name. The mapping is
/// total over the three recognized names; anything else is a hard decode
/// failure, never a fallthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChunkPayload {
    Shape(DtsShape),
    CelAnimMesh(DtsCelAnimMesh),
    MaterialList(DtsMaterialList),
}

impl ChunkPayload {
    /// The wire name this payload serializes under.
    pub fn chunk_name(&self) -> &'static str {
        match self {
            ChunkPayload::Shape(_) => SHAPE_CHUNK_NAME,
            ChunkPayload::CelAnimMesh(_) => MESH_CHUNK_NAME,
            ChunkPayload::MaterialList(_) => MATERIAL_LIST_CHUNK_NAME,
        }
    }

    /// Exact encoded byte size of the payload alone.
    pub fn size(&self) -> usize {
        match self {
            ChunkPayload::Shape(shape) => shape.size(),
            ChunkPayload::CelAnimMesh(mesh) => mesh.size(),
            ChunkPayload::MaterialList(materials) => materials.size(),
        }
    }
}

/// A self-describing tagged record: magic tag, advisory length, even-padded
/// name slot, version, then a payload picked by the name.
///
/// `length` and `name_size` are preserved exactly as decoded so that
/// re-encoding a parsed chunk reproduces the input bytes; traversal never
/// consults them. Chunks built through [`DtsChunk::new`] get canonical
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtsChunk {
    pub length: i32,
    pub name_size: i16,
    pub version: i32,
    pub payload: ChunkPayload,
}

impl BinRead for DtsChunk {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let start = reader.stream_position()?;
        // Running out of bytes inside the fixed header is a header fault,
        // not the generic end-of-buffer raised by a truncated payload.
        let header_err = |err: binrw::Error| match err {
            binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => raise(
                start,
                DtsError::MalformedHeader("fewer than the fixed header bytes remain".to_string()),
            ),
            other => other,
        };

        let tag = i32::read_options(reader, endian, ()).map_err(|e| header_err(e))?;
        if tag != DTS_CHUNK_TAG {
            return Err(raise(
                start,
                DtsError::MalformedHeader(format!("bad tag {tag:#010x}")),
            ));
        }
        let length = i32::read_options(reader, endian, ()).map_err(|e| header_err(e))?;
        let name_size = i16::read_options(reader, endian, ()).map_err(|e| header_err(e))?;
        if name_size < 0 {
            return Err(raise(
                start,
                DtsError::MalformedHeader(format!("negative name size {name_size}")),
            ));
        }

        let mut name_slot = vec![0u8; padded_name_slot(name_size)];
        reader
            .read_exact(&mut name_slot)
            .map_err(|e| header_err(binrw::Error::Io(e)))?;
        let name = string_from_slot(&name_slot);
        let version = i32::read_options(reader, endian, ()).map_err(|e| header_err(e))?;

        let payload = match name.as_str() {
            SHAPE_CHUNK_NAME => ChunkPayload::Shape(DtsShape::read_options(reader, endian, ())?),
            MESH_CHUNK_NAME => {
                ChunkPayload::CelAnimMesh(DtsCelAnimMesh::read_options(reader, endian, ())?)
            }
            MATERIAL_LIST_CHUNK_NAME => {
                ChunkPayload::MaterialList(DtsMaterialList::read_options(reader, endian, ())?)
            }
            _ => return Err(raise(start, DtsError::UnsupportedChunkType(name))),
        };

        Ok(DtsChunk {
            length,
            name_size,
            version,
            payload,
        })
    }
}

impl BinWrite for DtsChunk {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        DTS_CHUNK_TAG.write_options(writer, endian, ())?;
        self.length.write_options(writer, endian, ())?;
        self.name_size.write_options(writer, endian, ())?;

        let name = self.payload.chunk_name().as_bytes();
        let mut name_slot = vec![0u8; self.name_slot()];
        let n = name.len().min(name_slot.len());
        name_slot[..n].copy_from_slice(&name[..n]);
        writer.write_all(&name_slot)?;

        self.version.write_options(writer, endian, ())?;

        match &self.payload {
            ChunkPayload::Shape(shape) => shape.write_options(writer, endian, ()),
            ChunkPayload::CelAnimMesh(mesh) => mesh.write_options(writer, endian, ()),
            ChunkPayload::MaterialList(materials) => materials.write_options(writer, endian, ()),
        }
    }
}

impl DtsChunk {
    /// Wrap a payload in a canonical header: logical name length, advisory
    /// `length` covering everything after the length field itself.
    pub fn new(payload: ChunkPayload, version: i32) -> Self {
        let name_size = payload.chunk_name().len() as i16;
        let mut chunk = DtsChunk {
            length: 0,
            name_size,
            version,
            payload,
        };
        chunk.length = (chunk.size() - 8) as i32;
        chunk
    }

    /// Byte width of the stored name slot: the declared size rounded up to
    /// the next even number.
    pub fn name_slot(&self) -> usize {
        padded_name_slot(self.name_size)
    }

    /// Exact encoded byte size of the whole chunk. Advisory: useful for
    /// pre-sizing an output buffer, never consulted while reading.
    pub fn size(&self) -> usize {
        4 + 4 + 2 + self.name_slot() + 4 + self.payload.size()
    }

    /// Decode one chunk from an in-memory buffer.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, DtsError> {
        let mut reader = Cursor::new(buffer);
        DtsChunk::read_options(&mut reader, Endian::Little, ()).map_err(DtsError::from)
    }

    /// Encode into a fresh buffer of exactly [`DtsChunk::size`] bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DtsError> {
        let mut writer = Cursor::new(Vec::with_capacity(self.size()));
        self.write_options(&mut writer, Endian::Little, ())
            .map_err(DtsError::from)?;
        Ok(writer.into_inner())
    }

    /// Read a shape file whole into memory and decode it.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            anyhow::anyhow!("Failed to open DTS file '{}': {}", path.display(), e)
        })?;

        DtsChunk::from_bytes(&data).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse DTS file '{}': {}\n\
                 File size: {} bytes.\n\
                 This may indicate a corrupted or truncated file.",
                path.display(),
                e,
                data.len()
            )
        })
    }

    pub fn shape(&self) -> Option<&DtsShape> {
        match &self.payload {
            ChunkPayload::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn cel_anim_mesh(&self) -> Option<&DtsCelAnimMesh> {
        match &self.payload {
            ChunkPayload::CelAnimMesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn material_list(&self) -> Option<&DtsMaterialList> {
        match &self.payload {
            ChunkPayload::MaterialList(materials) => Some(materials),
            _ => None,
        }
    }
}

fn padded_name_slot(name_size: i16) -> usize {
    (name_size as usize + 1) & !1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_slots_round_up_to_even() {
        assert_eq!(padded_name_slot(9), 10);
        assert_eq!(padded_name_slot(8), 8);
        assert_eq!(padded_name_slot(15), 16);
        assert_eq!(padded_name_slot(16), 16);
        assert_eq!(padded_name_slot(0), 0);
    }

    #[test]
    fn canonical_chunks_use_the_logical_name_length() {
        let chunk = DtsChunk::new(ChunkPayload::Shape(DtsShape::default()), 8);
        assert_eq!(chunk.name_size, 9);
        assert_eq!(chunk.name_slot(), 10);

        let chunk = DtsChunk::new(
            ChunkPayload::MaterialList(DtsMaterialList::default()),
            1,
        );
        assert_eq!(chunk.name_size, 16);
        assert_eq!(chunk.name_slot(), 16);
    }

    #[test]
    fn bad_tag_is_a_malformed_header() {
        let chunk = DtsChunk::new(ChunkPayload::Shape(DtsShape::default()), 8);
        let mut bytes = chunk.to_bytes().unwrap();
        bytes[0] = b'X';
        match DtsChunk::from_bytes(&bytes) {
            Err(DtsError::MalformedHeader(_)) => {}
            other => panic!("expected MalformedHeader, got {:?}", other),
        }
    }

    #[test]
    fn unknown_chunk_names_are_rejected() {
        let chunk = DtsChunk::new(ChunkPayload::Shape(DtsShape::default()), 8);
        let mut bytes = chunk.to_bytes().unwrap();
        // overwrite "TS::Shape" in the name slot with an unknown name
        bytes[10..19].copy_from_slice(b"TS::Hedge");
        assert_eq!(
            DtsChunk::from_bytes(&bytes),
            Err(DtsError::UnsupportedChunkType("TS::Hedge".to_string()))
        );
    }

    #[test]
    fn truncated_buffers_never_yield_a_chunk() {
        let chunk = DtsChunk::new(ChunkPayload::Shape(DtsShape::default()), 8);
        let bytes = chunk.to_bytes().unwrap();

        // Cuts inside the fixed header: tag, name_size, name slot, version.
        for cut in [3, 9, 12, 22] {
            match DtsChunk::from_bytes(&bytes[..cut]) {
                Err(DtsError::MalformedHeader(_)) => {}
                other => panic!("cut at {} bytes: expected MalformedHeader, got {:?}", cut, other),
            }
        }

        // Cuts inside the payload.
        for cut in [30, bytes.len() - 1] {
            assert_eq!(
                DtsChunk::from_bytes(&bytes[..cut]),
                Err(DtsError::UnexpectedEndOfBuffer),
                "cut at {} bytes",
                cut
            );
        }
    }
}
