//! LWO2 container constants.

pub const FORM: [u8; 4] = *b"FORM";
pub const LWO2: [u8; 4] = *b"LWO2";

pub const CHUNK_PNTS: [u8; 4] = *b"PNTS";
pub const CHUNK_VMAP: [u8; 4] = *b"VMAP";
pub const CHUNK_POLS: [u8; 4] = *b"POLS";

pub const VMAP_TXUV: [u8; 4] = *b"TXUV";
pub const POLS_FACE: [u8; 4] = *b"FACE";

pub const CHUNK_HEADER_SIZE: usize = 8; // 4 tag + 4 length
pub const POINT_RECORD_SIZE: u32 = 12; // 3 x f32

/// Low bits of a polygon record's count field; the high bits are flags.
pub const POLYGON_COUNT_MASK: u16 = 0x03FF;

/// First byte marking a 4-byte variable-length index.
pub const VX_LONG_MARKER: u8 = 0xFF;
