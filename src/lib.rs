//! Decoder/encoder for Darkstar-engine DTS shape files.
//!
//! A shape file is a single tagged chunk whose payload carries the whole
//! scene: node hierarchy, animated meshes as nested chunks, keyframed
//! transform tables and an optional trailing material list. Decode the file
//! with [`DtsChunk::from_file`] or [`DtsChunk::from_bytes`]; re-serialize
//! with [`DtsChunk::to_bytes`]. Both directions are pure passes over an
//! in-memory buffer.

pub mod error;
pub mod math;
pub mod shape;

pub use error::DtsError;
pub use math::{DtsBox3, DtsPoint3, DtsQuat16};
pub use shape::{ChunkPayload, DtsCelAnimMesh, DtsChunk, DtsMaterialList, DtsShape};
