//! Big-endian chunk reader/writer for the LWO2 IFF container.

use super::format::{CHUNK_HEADER_SIZE, VX_LONG_MARKER};
use crate::error::{Error, FormatError};

/// Native byte order of the host, probed once per decode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn native() -> Result<Self, Error> {
        Self::from_probe(0x1122_3344u32.to_ne_bytes())
    }

    fn from_probe(bytes: [u8; 4]) -> Result<Self, Error> {
        match bytes[0] {
            0x44 => Ok(ByteOrder::Little),
            0x11 => Ok(ByteOrder::Big),
            _ => Err(Error::UnsupportedHost),
        }
    }

    /// Converts a big-endian wire value assembled in native order.
    fn u32_from_wire(self, bytes: [u8; 4]) -> u32 {
        let value = u32::from_ne_bytes(bytes);
        match self {
            ByteOrder::Little => value.swap_bytes(),
            ByteOrder::Big => value,
        }
    }

    fn u16_from_wire(self, bytes: [u8; 2]) -> u16 {
        let value = u16::from_ne_bytes(bytes);
        match self {
            ByteOrder::Little => value.swap_bytes(),
            ByteOrder::Big => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChunkHeader {
    pub tag: [u8; 4],
    pub length: u32,
}

/// Cursor over a byte buffer that refuses to read past `end`.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    position: usize,
    end: usize,
    order: ByteOrder,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            position: 0,
            end: data.len(),
            order,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn has_data(&self) -> bool {
        self.position < self.end
    }

    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.position)
    }

    /// Narrows the readable range. The new end must lie within the buffer.
    pub fn limit(&mut self, end: usize) -> Result<(), FormatError> {
        if end > self.data.len() {
            return Err(FormatError::UnexpectedEof {
                position: self.data.len(),
            });
        }
        self.end = end;
        Ok(())
    }

    /// Reader over the next `length` bytes, positioned at the current offset.
    pub fn sub_reader(&self, length: usize) -> Result<ChunkReader<'a>, FormatError> {
        let end = self.checked_end(length)?;
        Ok(ChunkReader {
            data: self.data,
            position: self.position,
            end,
            order: self.order,
        })
    }

    /// Moves the cursor; positions past `end` are clamped to `end`.
    ///
    /// Only used to skip chunk padding, so a pad byte missing at the very end
    /// of a container is not an error. Reads stay bounds checked.
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.end);
    }

    fn checked_end(&self, length: usize) -> Result<usize, FormatError> {
        match self.position.checked_add(length) {
            Some(end) if end <= self.end => Ok(end),
            Some(end) => Err(FormatError::UnexpectedEof { position: end }),
            None => Err(FormatError::UnexpectedEof {
                position: usize::MAX,
            }),
        }
    }

    pub fn read_block(&mut self, length: usize) -> Result<&'a [u8], FormatError> {
        let end = self.checked_end(length)?;
        let block = &self.data[self.position..end];
        self.position = end;
        Ok(block)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.read_block(N)?);
        Ok(bytes)
    }

    pub fn read_byte(&mut self) -> Result<u8, FormatError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4], FormatError> {
        self.read_array()
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        let bytes = self.read_array()?;
        Ok(self.order.u16_from_wire(bytes))
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        let bytes = self.read_array()?;
        Ok(self.order.u32_from_wire(bytes))
    }

    pub fn read_f32(&mut self) -> Result<f32, FormatError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_header(&mut self) -> Result<ChunkHeader, FormatError> {
        if self.remaining() < CHUNK_HEADER_SIZE {
            return Err(FormatError::UnexpectedEof {
                position: self.position + CHUNK_HEADER_SIZE,
            });
        }
        let tag = self.read_tag()?;
        let length = self.read_u32()?;
        Ok(ChunkHeader { tag, length })
    }

    /// Variable-length point index: 2 bytes, or 4 bytes when the first byte
    /// is `0xFF` (the index is then the 3 bytes that follow).
    pub fn read_vx(&mut self) -> Result<u32, FormatError> {
        let head: [u8; 2] = self.read_array()?;
        if head[0] == VX_LONG_MARKER {
            let tail: [u8; 2] = self.read_array()?;
            Ok((u32::from(head[1]) << 16) | (u32::from(tail[0]) << 8) | u32::from(tail[1]))
        } else {
            Ok((u32::from(head[0]) << 8) | u32::from(head[1]))
        }
    }

    /// NUL-terminated string, padded with one extra NUL to an even length.
    pub fn read_string(&mut self) -> Result<String, FormatError> {
        let start = self.position;
        let terminator = self.data[start..self.end]
            .iter()
            .position(|&b| b == 0)
            .ok_or(FormatError::UnexpectedEof { position: self.end })?;
        let text = String::from_utf8_lossy(&self.data[start..start + terminator]).into_owned();
        self.position = start + terminator + 1;

        if (self.position - start) & 1 == 1 {
            let pad_position = self.position;
            match self.read_byte() {
                Ok(0) => {}
                _ => {
                    return Err(FormatError::BadStringPadding {
                        position: pad_position,
                    })
                }
            }
        }
        Ok(text)
    }
}

/// Writes big-endian LWO2 data. Chunks nest: `begin_chunk` reserves the
/// length field, `end_chunk` patches it and appends the pad byte.
pub struct ChunkWriter {
    buffer: Vec<u8>,
    chunk_stack: Vec<usize>, // Start positions of open chunks
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(1024),
            chunk_stack: Vec::with_capacity(4),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn begin_chunk(&mut self, tag: [u8; 4]) {
        self.chunk_stack.push(self.buffer.len());
        self.write_tag(tag);
        self.write_u32(0); // Placeholder for length
    }

    /// Closes the innermost open chunk. Does nothing when none is open.
    pub fn end_chunk(&mut self) {
        let Some(start_pos) = self.chunk_stack.pop() else {
            return;
        };
        let content_length = self.buffer.len() - start_pos - CHUNK_HEADER_SIZE;
        let length_bytes = (content_length as u32).to_be_bytes();
        self.buffer[start_pos + 4..start_pos + 8].copy_from_slice(&length_bytes);
        if content_length & 1 == 1 {
            self.buffer.push(0);
        }
    }

    pub fn write_byte(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_tag(&mut self, tag: [u8; 4]) {
        self.buffer.extend_from_slice(&tag);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_vx(&mut self, index: u32) {
        if index < 0xFF00 {
            self.write_u16(index as u16);
        } else {
            self.write_byte(VX_LONG_MARKER);
            self.buffer
                .extend_from_slice(&(index & 0x00FF_FFFF).to_be_bytes()[1..]);
        }
    }

    pub fn write_string(&mut self, text: &str) {
        self.buffer.extend_from_slice(text.as_bytes());
        self.buffer.push(0);
        if (text.len() + 1) & 1 == 1 {
            self.buffer.push(0);
        }
    }
}

impl Default for ChunkWriter {
    fn default() -> Self {
        Self::new()
    }
}
