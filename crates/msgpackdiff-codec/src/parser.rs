//! Recursive MessagePack parser.
//!
//! [`next_kind`] peeks at the next marker and classifies it; [`parse`] reads
//! exactly one object and returns the remaining bytes; [`parse_all`] reads
//! every root object in a buffer.
//!
//! Integers follow the `msgp` classification: positive fixints and the
//! signed markers become [`Value::Int`], the `uint8..uint64` markers become
//! [`Value::Uint`]. Complex numbers and timestamps are extension types:
//!
//! | ext type | size | value |
//! |---|---|---|
//! | 3 | 8 | `Complex64`, two big-endian `f32` |
//! | 4 | 16 | `Complex128`, two big-endian `f64` |
//! | 5 | 12 | `Timestamp`, big-endian `i64` seconds + `u32` nanoseconds |
//! | -1 | 4 / 8 / 12 | `Timestamp`, standard MessagePack timestamp |

use std::fmt;

use chrono::DateTime;
use rmp::decode;
use rmp::Marker;
use tracing::debug;

use msgpackdiff_types::{OrderedMap, Value, ValueKind};

use crate::error::{CodecError, CodecResult};

/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

const COMPLEX64_EXT: i8 = 3;
const COMPLEX128_EXT: i8 = 4;
const TIME_EXT: i8 = 5;
const TIMESTAMP_EXT: i8 = -1;

/// Parser settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum container nesting. A root map or array sits at depth 0, so a
    /// limit of 1 allows a flat container but nothing nested inside it.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Classify the next object in `bytes` without consuming anything.
///
/// Returns [`ValueKind::Invalid`] for an empty buffer, the reserved marker
/// `0xc1`, and extension types this parser does not understand.
pub fn next_kind(bytes: &[u8]) -> ValueKind {
    let Some(&first) = bytes.first() else {
        return ValueKind::Invalid;
    };
    match Marker::from_u8(first) {
        Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => ValueKind::String,
        Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => ValueKind::Binary,
        Marker::FixMap(_) | Marker::Map16 | Marker::Map32 => ValueKind::Map,
        Marker::FixArray(_) | Marker::Array16 | Marker::Array32 => ValueKind::Array,
        Marker::F32 => ValueKind::Float32,
        Marker::F64 => ValueKind::Float64,
        Marker::True | Marker::False => ValueKind::Bool,
        Marker::FixPos(_)
        | Marker::FixNeg(_)
        | Marker::I8
        | Marker::I16
        | Marker::I32
        | Marker::I64 => ValueKind::Int,
        Marker::U8 | Marker::U16 | Marker::U32 | Marker::U64 => ValueKind::Uint,
        Marker::Null => ValueKind::Nil,
        marker @ (Marker::FixExt1
        | Marker::FixExt2
        | Marker::FixExt4
        | Marker::FixExt8
        | Marker::FixExt16
        | Marker::Ext8
        | Marker::Ext16
        | Marker::Ext32) => match ext_type(bytes, marker) {
            Some(COMPLEX64_EXT) => ValueKind::Complex64,
            Some(COMPLEX128_EXT) => ValueKind::Complex128,
            Some(TIME_EXT) | Some(TIMESTAMP_EXT) => ValueKind::Timestamp,
            _ => ValueKind::Invalid,
        },
        Marker::Reserved => ValueKind::Invalid,
    }
}

/// The extension type byte that follows an extension marker and its length.
fn ext_type(bytes: &[u8], marker: Marker) -> Option<i8> {
    let offset = match marker {
        Marker::Ext8 => 2,
        Marker::Ext16 => 3,
        Marker::Ext32 => 5,
        _ => 1,
    };
    bytes.get(offset).map(|b| *b as i8)
}

/// Parse one object with the default configuration.
///
/// Returns the object and the bytes that follow it.
pub fn parse(bytes: &[u8]) -> CodecResult<(Value, &[u8])> {
    parse_with(bytes, &ParserConfig::default())
}

/// Parse one object, returning it and the bytes that follow it.
pub fn parse_with<'a>(bytes: &'a [u8], config: &ParserConfig) -> CodecResult<(Value, &'a [u8])> {
    let mut rd = bytes;
    let value = read_value(&mut rd, config, 0)?;
    Ok((value, rd))
}

/// Parse every root object in `bytes` with the default configuration.
pub fn parse_all(bytes: &[u8]) -> CodecResult<Value> {
    parse_all_with(bytes, &ParserConfig::default())
}

/// Parse every root object in `bytes`.
///
/// A single root object is returned as-is. Several concatenated objects are
/// wrapped in a [`Value::Array`] in encoded order. An empty buffer is an
/// error.
pub fn parse_all_with(bytes: &[u8], config: &ParserConfig) -> CodecResult<Value> {
    if bytes.is_empty() {
        return Err(CodecError::MalformedEncoding("empty input".into()));
    }

    let mut roots = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (value, tail) = parse_with(rest, config)?;
        roots.push(value);
        rest = tail;
    }

    debug!(roots = roots.len(), bytes = bytes.len(), "parsed MessagePack input");
    if roots.len() == 1 {
        Ok(roots.remove(0))
    } else {
        Ok(Value::Array(roots))
    }
}

fn malformed(what: &str, err: impl fmt::Display) -> CodecError {
    CodecError::MalformedEncoding(format!("{what}: {err}"))
}

fn read_value(rd: &mut &[u8], config: &ParserConfig, depth: usize) -> CodecResult<Value> {
    match next_kind(rd) {
        ValueKind::String => read_string(rd).map(Value::String),
        ValueKind::Binary => read_binary(rd).map(Value::Binary),
        ValueKind::Map => read_map(rd, config, depth),
        ValueKind::Array => read_array(rd, config, depth),
        ValueKind::Float32 => decode::read_f32(rd)
            .map(Value::Float32)
            .map_err(|e| malformed("float32", e)),
        ValueKind::Float64 => decode::read_f64(rd)
            .map(Value::Float64)
            .map_err(|e| malformed("float64", e)),
        ValueKind::Bool => decode::read_bool(rd)
            .map(Value::Bool)
            .map_err(|e| malformed("bool", e)),
        ValueKind::Int => decode::read_int::<i64, _>(rd)
            .map(Value::Int)
            .map_err(|e| malformed("int", e)),
        ValueKind::Uint => decode::read_int::<u64, _>(rd)
            .map(Value::Uint)
            .map_err(|e| malformed("uint", e)),
        ValueKind::Nil => decode::read_nil(rd)
            .map(|()| Value::Nil)
            .map_err(|e| malformed("nil", e)),
        ValueKind::Complex64 => read_complex64(rd),
        ValueKind::Complex128 => read_complex128(rd),
        ValueKind::Timestamp => read_timestamp(rd),
        ValueKind::Invalid => Err(invalid_marker(rd)),
    }
}

/// Explain why [`next_kind`] returned `Invalid`.
fn invalid_marker(bytes: &[u8]) -> CodecError {
    let Some(&first) = bytes.first() else {
        return CodecError::MalformedEncoding("unexpected end of input".into());
    };
    let marker = Marker::from_u8(first);
    if matches!(marker, Marker::Reserved) {
        return CodecError::MalformedEncoding(format!("invalid type marker 0x{first:02x}"));
    }
    match ext_type(bytes, marker) {
        Some(typeid) => {
            CodecError::MalformedEncoding(format!("unsupported extension type {typeid}"))
        }
        None => CodecError::MalformedEncoding("truncated extension header".into()),
    }
}

fn check_depth(config: &ParserConfig, depth: usize) -> CodecResult<()> {
    if depth >= config.max_depth {
        return Err(CodecError::MaxDepthExceeded {
            max: config.max_depth,
        });
    }
    Ok(())
}

/// Split `len` bytes off the front of the reader.
fn take<'a>(rd: &mut &'a [u8], len: usize, what: &str) -> CodecResult<&'a [u8]> {
    if rd.len() < len {
        return Err(CodecError::MalformedEncoding(format!(
            "truncated {what}: need {len} bytes, have {}",
            rd.len()
        )));
    }
    let (head, tail) = rd.split_at(len);
    *rd = tail;
    Ok(head)
}

fn read_string(rd: &mut &[u8]) -> CodecResult<String> {
    let len = decode::read_str_len(rd).map_err(|e| malformed("str header", e))? as usize;
    let bytes = take(rd, len, "str")?;
    String::from_utf8(bytes.to_vec()).map_err(|e| malformed("str", e))
}

fn read_binary(rd: &mut &[u8]) -> CodecResult<Vec<u8>> {
    let len = decode::read_bin_len(rd).map_err(|e| malformed("bin header", e))? as usize;
    take(rd, len, "bin").map(<[u8]>::to_vec)
}

/// Map keys are strings; `bin` keys holding UTF-8 are accepted as well.
fn read_key(rd: &mut &[u8]) -> CodecResult<String> {
    match next_kind(rd) {
        ValueKind::String => read_string(rd),
        ValueKind::Binary => {
            let bytes = read_binary(rd)?;
            String::from_utf8(bytes).map_err(|e| malformed("map key", e))
        }
        ValueKind::Invalid => Err(invalid_marker(rd)),
        kind => Err(CodecError::MalformedEncoding(format!(
            "map key must be a string, found {kind}"
        ))),
    }
}

fn read_map(rd: &mut &[u8], config: &ParserConfig, depth: usize) -> CodecResult<Value> {
    check_depth(config, depth)?;
    let len = decode::read_map_len(rd).map_err(|e| malformed("map header", e))? as usize;

    // An entry needs at least two bytes, so a lying header cannot force a
    // huge allocation.
    let mut map = OrderedMap::with_capacity(len.min(rd.len() / 2));
    for _ in 0..len {
        let key = read_key(rd)?;
        if map.contains_key(&key) {
            return Err(CodecError::DuplicateMapKey(key));
        }
        let value = read_value(rd, config, depth + 1)?;
        map.insert(key, value)?;
    }
    Ok(Value::Map(map))
}

fn read_array(rd: &mut &[u8], config: &ParserConfig, depth: usize) -> CodecResult<Value> {
    check_depth(config, depth)?;
    let len = decode::read_array_len(rd).map_err(|e| malformed("array header", e))? as usize;

    let mut items = Vec::with_capacity(len.min(rd.len()));
    for _ in 0..len {
        items.push(read_value(rd, config, depth + 1)?);
    }
    Ok(Value::Array(items))
}

fn read_ext<'a>(rd: &mut &'a [u8], what: &str) -> CodecResult<(i8, &'a [u8])> {
    let meta = decode::read_ext_meta(rd).map_err(|e| malformed(what, e))?;
    let data = take(rd, meta.size as usize, what)?;
    Ok((meta.typeid, data))
}

fn expect_len(data: &[u8], len: usize, what: &str) -> CodecResult<()> {
    if data.len() != len {
        return Err(CodecError::MalformedEncoding(format!(
            "{what} extension must be {len} bytes, got {}",
            data.len()
        )));
    }
    Ok(())
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u64(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

fn read_complex64(rd: &mut &[u8]) -> CodecResult<Value> {
    let (_, data) = read_ext(rd, "complex64")?;
    expect_len(data, 8, "complex64")?;
    Ok(Value::Complex64(
        f32::from_bits(be_u32(&data[0..4])),
        f32::from_bits(be_u32(&data[4..8])),
    ))
}

fn read_complex128(rd: &mut &[u8]) -> CodecResult<Value> {
    let (_, data) = read_ext(rd, "complex128")?;
    expect_len(data, 16, "complex128")?;
    Ok(Value::Complex128(
        f64::from_bits(be_u64(&data[0..8])),
        f64::from_bits(be_u64(&data[8..16])),
    ))
}

fn read_timestamp(rd: &mut &[u8]) -> CodecResult<Value> {
    let (typeid, data) = read_ext(rd, "timestamp")?;
    let (secs, nanos) = match (typeid, data.len()) {
        (TIME_EXT, 12) => (be_u64(&data[0..8]) as i64, be_u32(&data[8..12])),
        (TIMESTAMP_EXT, 4) => (i64::from(be_u32(data)), 0),
        (TIMESTAMP_EXT, 8) => {
            let raw = be_u64(data);
            ((raw & 0x3_ffff_ffff) as i64, (raw >> 34) as u32)
        }
        (TIMESTAMP_EXT, 12) => (be_u64(&data[4..12]) as i64, be_u32(&data[0..4])),
        (_, len) => {
            return Err(CodecError::MalformedEncoding(format!(
                "timestamp extension type {typeid} cannot be {len} bytes"
            )))
        }
    };
    if nanos >= 1_000_000_000 {
        return Err(CodecError::MalformedEncoding(format!(
            "timestamp nanoseconds out of range: {nanos}"
        )));
    }
    DateTime::from_timestamp(secs, nanos)
        .map(Value::Timestamp)
        .ok_or_else(|| CodecError::MalformedEncoding(format!("timestamp out of range: {secs}s")))
}
