use thiserror::Error;

/// Decode/encode failures for DTS shape data.
///
/// All variants are fatal to the operation that raised them: no partial
/// model is ever returned and no recovery is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DtsError {
    #[error("malformed chunk header: {0}")]
    MalformedHeader(String),

    #[error("unsupported chunk type `{0}`")]
    UnsupportedChunkType(String),

    #[error("unexpected end of buffer")]
    UnexpectedEndOfBuffer,

    #[error("vertex {vertex} is not covered by any frame")]
    CorruptVertex { vertex: usize },

    #[error("face {face} references out-of-range index {index}")]
    CorruptFace { face: usize, index: i32 },

    #[error("invalid material list shape: {detail_count} details x {material_count} materials")]
    InvalidMaterialListShape {
        detail_count: i32,
        material_count: i32,
    },

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<binrw::Error> for DtsError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Backtrace(bt) => Self::from(*bt.error),
            binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::UnexpectedEndOfBuffer
            }
            other => {
                if let Some(dts) = other.custom_err::<DtsError>() {
                    dts.clone()
                } else {
                    Self::Parse(other.to_string())
                }
            }
        }
    }
}

/// Wrap a domain error so it can travel through a `binrw` read/write and be
/// recovered intact by `From<binrw::Error>` above.
pub(crate) fn raise(pos: u64, err: DtsError) -> binrw::Error {
    binrw::Error::Custom {
        pos,
        err: Box::new(err),
    }
}
