use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::map::OrderedMap;

/// One parsed MessagePack object.
///
/// The variant is fixed when the parser builds the value and never changes
/// afterwards. Containers own their children; MessagePack encodes trees, so
/// there is no sharing and no cycles.
///
/// `PartialEq` is representational equality (same variant, same payload, same
/// map key order). Semantic comparison lives in `msgpackdiff-diff`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Binary(Vec<u8>),
    Map(OrderedMap),
    Array(Vec<Value>),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Nil,
    /// Real and imaginary parts.
    Complex64(f32, f32),
    /// Real and imaginary parts.
    Complex128(f64, f64),
    Timestamp(DateTime<Utc>),
}

/// The tag of a [`Value`].
///
/// `Invalid` never tags a constructed value; the parser reports it for a
/// marker it cannot classify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Binary,
    Map,
    Array,
    Float32,
    Float64,
    Bool,
    Int,
    Uint,
    Nil,
    Complex64,
    Complex128,
    Timestamp,
    Invalid,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 14] = [
        ValueKind::String,
        ValueKind::Binary,
        ValueKind::Map,
        ValueKind::Array,
        ValueKind::Float32,
        ValueKind::Float64,
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Uint,
        ValueKind::Nil,
        ValueKind::Complex64,
        ValueKind::Complex128,
        ValueKind::Timestamp,
        ValueKind::Invalid,
    ];

    /// Returns `true` for the kinds that take part in flexible numeric comparison.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Int
                | ValueKind::Uint
                | ValueKind::Float32
                | ValueKind::Float64
                | ValueKind::Complex64
                | ValueKind::Complex128
        )
    }

    /// Lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::String => "str",
            ValueKind::Binary => "bin",
            ValueKind::Map => "map",
            ValueKind::Array => "array",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Nil => "nil",
            ValueKind::Complex64 => "complex64",
            ValueKind::Complex128 => "complex128",
            ValueKind::Timestamp => "time",
            ValueKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::Map(_) => ValueKind::Map,
            Value::Array(_) => ValueKind::Array,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Uint(_) => ValueKind::Uint,
            Value::Nil => ValueKind::Nil,
            Value::Complex64(..) => ValueKind::Complex64,
            Value::Complex128(..) => ValueKind::Complex128,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    /// Returns `true` for maps and arrays.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Array(_))
    }

    /// Number of direct children of a map or array; `None` for scalars.
    pub fn child_count(&self) -> Option<usize> {
        match self {
            Value::Map(map) => Some(map.len()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Whether this value counts as "empty" when a missing field may stand in for it.
    ///
    /// Scalars are empty when they hold their zero value (nil, `false`, `0`,
    /// `0.0`, `0+0i`, the UNIX epoch, `""`, empty binary). Maps and arrays are
    /// empty when every element is empty, so `[]`, `{}` and `["", 0, [false]]`
    /// all qualify.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Binary(bytes) => bytes.is_empty(),
            Value::Map(map) => map.values().all(Value::is_empty_value),
            Value::Array(items) => items.iter().all(Value::is_empty_value),
            Value::Float32(f) => *f == 0.0,
            Value::Float64(f) => *f == 0.0,
            Value::Bool(b) => !*b,
            Value::Int(i) => *i == 0,
            Value::Uint(u) => *u == 0,
            Value::Nil => true,
            Value::Complex64(re, im) => *re == 0.0 && *im == 0.0,
            Value::Complex128(re, im) => *re == 0.0 && *im == 0.0,
            Value::Timestamp(t) => t.timestamp() == 0 && t.timestamp_subsec_nanos() == 0,
        }
    }
}

/// JSON-quote a string.
pub fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

fn write_complex<T: fmt::Debug>(
    f: &mut fmt::Formatter<'_>,
    re: T,
    im: T,
    negative: bool,
) -> fmt::Result {
    let sign = if negative { "" } else { "+" };
    write!(f, "({re:?}{sign}{im:?}i)")
}

/// Compact, single-line rendering.
///
/// Scalars use the same text the report renderer prints. Containers are
/// written inline (`{"a": 1, "b": [true]}`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(&quote(s)),
            Value::Binary(bytes) => write!(f, "base64({})", quote(&STANDARD.encode(bytes))),
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", quote(key))?;
                }
                f.write_str("}")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Float32(v) => write!(f, "{v:?}"),
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Nil => f.write_str("null"),
            Value::Complex64(re, im) => write_complex(f, re, im, im.is_sign_negative()),
            Value::Complex128(re, im) => write_complex(f, re, im, im.is_sign_negative()),
            Value::Timestamp(t) => write!(
                f,
                "timestamp({})",
                t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<OrderedMap> for Value {
    fn from(map: OrderedMap) -> Self {
        Value::Map(map)
    }
}
