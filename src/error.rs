//! Error taxonomy shared by the decoder, the ring/track assembly and the
//! path interpolator.

use crate::mesh::PointId;

/// Malformed container, chunk or record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("not a LWO2 file (missing FORM header)")]
    NotForm,
    #[error("not a LWO2 file, form type {}", tag_name(.found))]
    NotLwo2 { found: [u8; 4] },
    #[error("unexpected end of data at position {position}")]
    UnexpectedEof { position: usize },
    #[error("{} chunk size invalid: {length}", tag_name(.tag))]
    InvalidChunkLength { tag: [u8; 4], length: u32 },
    #[error("{} chunk read before PNTS", tag_name(.tag))]
    MissingPoints { tag: [u8; 4] },
    #[error("only FACE polygons are supported, found {}", tag_name(.found))]
    UnsupportedPolygonType { found: [u8; 4] },
    #[error("only triangle polygons are supported, found {count} vertices")]
    NonTriangle { count: u16 },
    #[error("point index {index} out of range ({len} points)")]
    IndexOutOfRange { index: u32, len: usize },
    #[error("string null padding incorrect at position {position}")]
    BadStringPadding { position: usize },
    #[error("more than {limit} chunks")]
    TooManyChunks { limit: usize },
    #[error("no points decoded")]
    EmptyMesh,
}

/// Well-formed mesh that is not a tube.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("mesh does not look like a square tube around point {}", .point.index())]
    NotATube { point: PointId },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported system byte order")]
    UnsupportedHost,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn tag_name(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}
