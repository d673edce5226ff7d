//! Recursive length prefix (RLP) codec.
//!
//! Only what the legacy transaction format needs: byte strings, minimal
//! big-endian unsigned integers and flat-or-nested lists. Decoding is strict
//! and rejects every non-canonical form, so that `encode(decode(x)) == x`
//! holds for any accepted input.

use alloy_primitives::U256;

use crate::error::EthError;

/// Offset of a short byte-string header (0x80 + len).
const STRING_OFFSET: u8 = 0x80;
/// Offset of a short list header (0xc0 + len).
const LIST_OFFSET: u8 = 0xc0;
/// Longest payload that still fits a single-byte header.
const SHORT_PAYLOAD_MAX: usize = 55;
/// Nesting bound for decoding. Transactions use a single level.
const MAX_DEPTH: usize = 16;

/// Appends the RLP encoding of a byte string.
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
        out.push(bytes[0]);
    } else {
        encode_header(bytes.len(), STRING_OFFSET, out);
        out.extend_from_slice(bytes);
    }
}

/// Appends an unsigned integer as its minimal big-endian byte string.
/// Zero encodes as the empty string (0x80).
pub fn encode_u64(value: u64, out: &mut Vec<u8>) {
    let bytes = value.to_be_bytes();
    encode_bytes(trim_leading_zeros(&bytes), out);
}

/// Appends a 256-bit unsigned integer with leading zero bytes stripped.
pub fn encode_u256(value: &U256, out: &mut Vec<u8>) {
    let bytes = value.to_be_bytes::<32>();
    encode_bytes(trim_leading_zeros(&bytes), out);
}

/// Wraps an already-encoded concatenation of items in a list header.
pub fn encode_list(payload: &[u8], out: &mut Vec<u8>) {
    encode_header(payload.len(), LIST_OFFSET, out);
    out.extend_from_slice(payload);
}

fn encode_header(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len <= SHORT_PAYLOAD_MAX {
        out.push(offset + len as u8);
    } else {
        let len_bytes = (len as u64).to_be_bytes();
        let trimmed = trim_leading_zeros(&len_bytes);
        out.push(offset + SHORT_PAYLOAD_MAX as u8 + trimmed.len() as u8);
        out.extend_from_slice(trimmed);
    }
}

pub(crate) fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// A decoded RLP item borrowing from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem<'a> {
    Bytes(&'a [u8]),
    List(Vec<RlpItem<'a>>),
}

impl<'a> RlpItem<'a> {
    /// Returns the byte-string payload, or an error naming `field` if the
    /// item is a list.
    pub fn as_bytes(&self, field: &str) -> Result<&'a [u8], EthError> {
        match self {
            RlpItem::Bytes(bytes) => Ok(bytes),
            RlpItem::List(_) => Err(EthError::MalformedEncoding(format!(
                "{field}: expected a byte string, found a list"
            ))),
        }
    }

    pub fn as_list(&self, field: &str) -> Result<&[RlpItem<'a>], EthError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(EthError::MalformedEncoding(format!(
                "{field}: expected a list, found a byte string"
            ))),
        }
    }

    pub fn as_u64(&self, field: &str) -> Result<u64, EthError> {
        let bytes = canonical_uint(self.as_bytes(field)?, 8, field)?;
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn as_u256(&self, field: &str) -> Result<U256, EthError> {
        let bytes = canonical_uint(self.as_bytes(field)?, 32, field)?;
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(U256::from_be_bytes(buf))
    }
}

fn canonical_uint<'a>(bytes: &'a [u8], width: usize, field: &str) -> Result<&'a [u8], EthError> {
    if bytes.len() > width {
        return Err(EthError::MalformedEncoding(format!(
            "{field}: integer is {} bytes, at most {width} allowed",
            bytes.len()
        )));
    }
    if bytes.first() == Some(&0) {
        return Err(EthError::MalformedEncoding(format!(
            "{field}: integer has leading zero bytes"
        )));
    }
    Ok(bytes)
}

/// Decodes exactly one item spanning the whole input.
///
/// Bytes left over after the outermost item yield
/// [`EthError::TrailingBytes`].
pub fn decode(input: &[u8]) -> Result<RlpItem<'_>, EthError> {
    let (item, consumed) = decode_item(input, 0)?;
    if consumed != input.len() {
        return Err(EthError::TrailingBytes(input.len() - consumed));
    }
    Ok(item)
}

fn decode_item(input: &[u8], depth: usize) -> Result<(RlpItem<'_>, usize), EthError> {
    if depth > MAX_DEPTH {
        return Err(EthError::MalformedEncoding("nesting too deep".into()));
    }

    let prefix = *input
        .first()
        .ok_or_else(|| EthError::MalformedEncoding("unexpected end of input".into()))?;

    if prefix < STRING_OFFSET {
        return Ok((RlpItem::Bytes(&input[..1]), 1));
    }

    let is_list = prefix >= LIST_OFFSET;
    let offset = if is_list { LIST_OFFSET } else { STRING_OFFSET };
    let (header_len, payload_len) = decode_length(input, prefix - offset)?;

    let end = header_len
        .checked_add(payload_len)
        .filter(|&end| end <= input.len())
        .ok_or_else(|| {
            EthError::MalformedEncoding(format!(
                "length prefix claims {payload_len} bytes, only {} available",
                input.len().saturating_sub(header_len)
            ))
        })?;
    let payload = &input[header_len..end];

    if !is_list {
        if payload.len() == 1 && payload[0] < STRING_OFFSET {
            return Err(EthError::MalformedEncoding(
                "single byte below 0x80 must be encoded as itself".into(),
            ));
        }
        return Ok((RlpItem::Bytes(payload), end));
    }

    let mut items = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        let (item, used) = decode_item(rest, depth + 1)?;
        items.push(item);
        rest = &rest[used..];
    }

    Ok((RlpItem::List(items), end))
}

/// Returns `(header_len, payload_len)` for a header whose first byte sits
/// `tag` above its string or list offset.
fn decode_length(input: &[u8], tag: u8) -> Result<(usize, usize), EthError> {
    let tag = tag as usize;
    if tag <= SHORT_PAYLOAD_MAX {
        return Ok((1, tag));
    }

    let len_of_len = tag - SHORT_PAYLOAD_MAX;
    let len_bytes = input.get(1..1 + len_of_len).ok_or_else(|| {
        EthError::MalformedEncoding("truncated length prefix".into())
    })?;

    if len_bytes[0] == 0 {
        return Err(EthError::MalformedEncoding(
            "length prefix has leading zero bytes".into(),
        ));
    }

    let mut buf = [0u8; 8];
    buf[8 - len_of_len..].copy_from_slice(len_bytes);
    let len = usize::try_from(u64::from_be_bytes(buf))
        .map_err(|_| EthError::MalformedEncoding("length prefix overflows".into()))?;

    if len <= SHORT_PAYLOAD_MAX {
        return Err(EthError::MalformedEncoding(
            "long-form length used for a short payload".into(),
        ));
    }

    Ok((1 + len_of_len, len))
}
