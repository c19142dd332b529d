//! Binary Wexpr codec — length-prefixed, type-tagged chunks.
//!
//! A binary Wexpr document is a 20-byte file header followed by chunks. A
//! chunk is `size:u32be || type:u8 || payload`, where `size` counts payload
//! bytes only. Expression chunks nest: an array's payload is its children's
//! chunks concatenated, a map's payload alternates value-typed key chunks
//! and value chunks. All integers are big-endian on the wire regardless of
//! host byte order.
//!
//! The writer is two-phase: children render into a temporary payload buffer
//! so each chunk header carries an exact size. [`Expression::to_binary_chunk`]
//! emits the main expression chunk only; the file header is prepended by
//! [`Expression::to_binary_document`].
//!
//! Chunk types 0x05 and above are reserved and skipped on read wherever a
//! chunk may begin.

use crate::error::{ErrorCode, Result, WexprError};
use crate::expression::Expression;

/// First 8 bytes of a binary Wexpr document: `0x83 "BWEXPR" 0x0A`.
pub const FILE_MAGIC: [u8; 8] = [0x83, b'B', b'W', b'E', b'X', b'P', b'R', 0x0A];

/// Format version written and accepted, big-endian in bytes 8..12.
pub const FILE_VERSION: u32 = 0x0000_0001;

/// Total header size: magic, version, and 8 reserved (zero) bytes.
pub const FILE_HEADER_SIZE: usize = 20;

/// Size of a chunk's `size` + `type` prefix.
const CHUNK_PREFIX_SIZE: usize = 5;

/// Wire type tag of an expression chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChunkType {
    Null = 0x00,
    Value = 0x01,
    Array = 0x02,
    Map = 0x03,
    BinaryData = 0x04,
}

impl ChunkType {
    /// Parse a tag byte. `None` for reserved types (0x05 and up).
    pub fn from_byte(byte: u8) -> Option<ChunkType> {
        match byte {
            0x00 => Some(ChunkType::Null),
            0x01 => Some(ChunkType::Value),
            0x02 => Some(ChunkType::Array),
            0x03 => Some(ChunkType::Map),
            0x04 => Some(ChunkType::BinaryData),
            _ => None,
        }
    }
}

/// The canonical 20-byte file header.
pub fn file_header() -> [u8; FILE_HEADER_SIZE] {
    let mut header = [0u8; FILE_HEADER_SIZE];
    header[..8].copy_from_slice(&FILE_MAGIC);
    header[8..12].copy_from_slice(&FILE_VERSION.to_be_bytes());
    // bytes 12..20 reserved, zero
    header
}

impl Expression {
    /// Render this expression as a self-contained binary chunk (size, type
    /// and payload, children included) without the file header.
    ///
    /// An `Invalid` expression yields an empty buffer; `Invalid` children of
    /// containers are omitted, along with their key for map entries.
    pub fn to_binary_chunk(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_chunk(self, &mut out);
        out
    }

    /// Render this expression as a complete binary document: the 20-byte
    /// file header followed by the main expression chunk.
    pub fn to_binary_document(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FILE_HEADER_SIZE);
        out.extend_from_slice(&file_header());
        write_chunk(self, &mut out);
        out
    }

    /// Parse one complete binary chunk (as produced by
    /// [`Expression::to_binary_chunk`]) into an expression tree.
    ///
    /// A chunk of reserved type yields `Invalid`.
    pub fn from_binary_chunk(data: &[u8]) -> Result<Expression> {
        let (chunk, _rest) = split_chunk(data)?;
        Ok(expression_from_chunk(&chunk)?.unwrap_or(Expression::Invalid))
    }
}

/// Parse the chunk stream of a full binary document (leading byte 0x83).
///
/// Validates the header, then accepts at most one main expression chunk;
/// reserved chunks are skipped. A document with no main chunk yields
/// `Invalid`.
pub(crate) fn decode_document(data: &[u8]) -> Result<Expression> {
    if data.len() < FILE_HEADER_SIZE {
        return Err(WexprError::binary(
            ErrorCode::BinaryInvalidHeader,
            "invalid binary header - not big enough",
        ));
    }
    if data[..8] != FILE_MAGIC {
        return Err(WexprError::binary(
            ErrorCode::BinaryInvalidHeader,
            "invalid binary header - invalid magic",
        ));
    }
    let version = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
    if version != FILE_VERSION {
        return Err(WexprError::binary(
            ErrorCode::BinaryUnknownVersion,
            format!("invalid binary header - unknown version {version}"),
        ));
    }
    if data[12..FILE_HEADER_SIZE].iter().any(|&b| b != 0) {
        return Err(WexprError::binary(
            ErrorCode::BinaryInvalidHeader,
            "invalid binary header - reserved bytes must be zero",
        ));
    }

    let mut rest = &data[FILE_HEADER_SIZE..];
    let mut main: Option<Expression> = None;
    while !rest.is_empty() {
        let (chunk, remaining) = split_chunk(rest)?;
        if ChunkType::from_byte(chunk.type_byte).is_some() {
            if main.is_some() {
                return Err(WexprError::binary(
                    ErrorCode::BinaryMultipleExpressions,
                    "found multiple expression chunks",
                ));
            }
            main = expression_from_chunk(&chunk)?;
        }
        rest = remaining;
    }
    Ok(main.unwrap_or(Expression::Invalid))
}

struct RawChunk<'a> {
    type_byte: u8,
    payload: &'a [u8],
}

/// Split one chunk off the front of `data`, bounds-checked against the
/// declared size.
fn split_chunk(data: &[u8]) -> Result<(RawChunk<'_>, &[u8])> {
    if data.len() < CHUNK_PREFIX_SIZE {
        return Err(WexprError::binary(
            ErrorCode::BinaryChunkTruncated,
            "chunk header runs past the end of input",
        ));
    }
    let size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let end = CHUNK_PREFIX_SIZE + size;
    if data.len() < end {
        return Err(WexprError::binary(
            ErrorCode::BinaryChunkTruncated,
            format!(
                "chunk declares {size} payload bytes but only {} remain",
                data.len() - CHUNK_PREFIX_SIZE
            ),
        ));
    }
    Ok((
        RawChunk {
            type_byte: data[4],
            payload: &data[CHUNK_PREFIX_SIZE..end],
        },
        &data[end..],
    ))
}

/// Build an expression from one raw chunk. `Ok(None)` for reserved types.
fn expression_from_chunk(chunk: &RawChunk<'_>) -> Result<Option<Expression>> {
    let Some(chunk_type) = ChunkType::from_byte(chunk.type_byte) else {
        return Ok(None);
    };
    match chunk_type {
        ChunkType::Null => Ok(Some(Expression::Null)),
        ChunkType::Value => {
            let value = String::from_utf8(chunk.payload.to_vec()).map_err(|_| {
                WexprError::binary(ErrorCode::InvalidUtf8, "value chunk is not valid UTF-8")
            })?;
            Ok(Some(Expression::Value(value)))
        }
        ChunkType::BinaryData => Ok(Some(Expression::BinaryData(chunk.payload.to_vec()))),
        ChunkType::Array => {
            let mut children = Vec::new();
            let mut rest = chunk.payload;
            while !rest.is_empty() {
                let (child, remaining) = split_chunk(rest)?;
                if let Some(expr) = expression_from_chunk(&child)? {
                    children.push(expr);
                }
                rest = remaining;
            }
            Ok(Some(Expression::Array(children)))
        }
        ChunkType::Map => {
            let mut map = Expression::Map(Vec::new());
            let mut rest = chunk.payload;
            loop {
                let Some((key_chunk, remaining)) = next_known_chunk(rest)? else {
                    return Ok(Some(map));
                };
                rest = remaining;
                if ChunkType::from_byte(key_chunk.type_byte) != Some(ChunkType::Value) {
                    return Err(WexprError::binary(
                        ErrorCode::BinaryMapKeyMustBeAValue,
                        format!(
                            "map key chunk must be a value, found type {:#04x}",
                            key_chunk.type_byte
                        ),
                    ));
                }
                let key = String::from_utf8(key_chunk.payload.to_vec()).map_err(|_| {
                    WexprError::binary(ErrorCode::InvalidUtf8, "map key chunk is not valid UTF-8")
                })?;

                let Some((value_chunk, remaining)) = next_known_chunk(rest)? else {
                    return Err(WexprError::binary(
                        ErrorCode::BinaryChunkTruncated,
                        format!("map key '{key}' has no value chunk"),
                    ));
                };
                rest = remaining;
                // The value chunk is known-typed, so this cannot be None.
                if let Some(value) = expression_from_chunk(&value_chunk)? {
                    map.map_set_value_for_key(key, value);
                }
            }
        }
    }
}

/// Split chunks off `data` until one of known type appears, skipping
/// reserved types. `Ok(None)` once the buffer is exhausted.
fn next_known_chunk(data: &[u8]) -> Result<Option<(RawChunk<'_>, &[u8])>> {
    let mut rest = data;
    while !rest.is_empty() {
        let (chunk, remaining) = split_chunk(rest)?;
        if ChunkType::from_byte(chunk.type_byte).is_some() {
            return Ok(Some((chunk, remaining)));
        }
        rest = remaining;
    }
    Ok(None)
}

fn write_chunk(expr: &Expression, out: &mut Vec<u8>) {
    match expr {
        Expression::Invalid => {}
        Expression::Null => write_chunk_prefix(ChunkType::Null, 0, out),
        Expression::Value(value) => write_value_chunk(value, out),
        Expression::BinaryData(data) => {
            write_chunk_prefix(ChunkType::BinaryData, data.len(), out);
            out.extend_from_slice(data);
        }
        Expression::Array(children) => {
            let mut payload = Vec::new();
            for child in children {
                write_chunk(child, &mut payload);
            }
            write_chunk_prefix(ChunkType::Array, payload.len(), out);
            out.extend_from_slice(&payload);
        }
        Expression::Map(pairs) => {
            let mut payload = Vec::new();
            for (key, value) in pairs {
                if matches!(value, Expression::Invalid) {
                    continue;
                }
                write_value_chunk(key, &mut payload);
                write_chunk(value, &mut payload);
            }
            write_chunk_prefix(ChunkType::Map, payload.len(), out);
            out.extend_from_slice(&payload);
        }
    }
}

fn write_value_chunk(value: &str, out: &mut Vec<u8>) {
    write_chunk_prefix(ChunkType::Value, value.len(), out);
    out.extend_from_slice(value.as_bytes());
}

/// Chunk sizes are u32 on the wire; documents past 4 GiB per chunk are not
/// representable.
fn write_chunk_prefix(chunk_type: ChunkType, size: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&(size as u32).to_be_bytes());
    out.push(chunk_type as u8);
}
