pub mod chunk;
pub mod material;
pub mod mesh;
pub mod model;
pub mod normal_table;

pub use chunk::{ChunkPayload, DtsChunk};
pub use material::{DtsMaterial, DtsMaterialList};
pub use mesh::{DtsCelAnimMesh, DtsFace, DtsFrame, DtsTextureVertex, DtsVertex};
pub use model::{
    DtsDetail, DtsFrameTrigger, DtsKeyFrame, DtsName, DtsNode, DtsObject, DtsSequence, DtsShape,
    DtsSubSequence, DtsTransform, DtsTransition,
};
pub use normal_table::{lookup_normal, NORMAL_TABLE};

use binrw::{BinRead, BinResult, Endian, VecArgs};
use std::io::{Read, Seek};

/// Decode a fixed-size byte slot holding a NUL-terminated string.
pub(crate) fn string_from_slot(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).to_string()
}

/// Fill a fixed-size byte slot from a string: zero-padded, silently
/// truncated if the string does not fit.
pub(crate) fn fill_slot<const N: usize>(name: &str) -> [u8; N] {
    let mut raw = [0u8; N];
    let bytes = name.as_bytes();
    let n = bytes.len().min(N);
    raw[..n].copy_from_slice(&bytes[..n]);
    raw
}

/// Read an i32 array count, rejecting negatives before anything is
/// allocated from it.
pub(crate) fn read_count<R: Read + Seek>(reader: &mut R, endian: Endian) -> BinResult<usize> {
    let pos = reader.stream_position()?;
    let count = i32::read_options(reader, endian, ())?;
    usize::try_from(count).map_err(|_| binrw::Error::AssertFail {
        pos,
        message: format!("negative array count {count}"),
    })
}

/// Read `count` records back to back.
pub(crate) fn read_seq<T, R>(reader: &mut R, endian: Endian, count: usize) -> BinResult<Vec<T>>
where
    R: Read + Seek,
    T: for<'a> BinRead<Args<'a> = ()> + 'static,
{
    Vec::read_options(reader, endian, VecArgs { count, inner: () })
}
