//! Typed format arguments.
//!
//! A [`Value`] is one argument handed to a template at render time. Probes
//! build a `Vec<Value>` from whatever they detected and the renderer turns
//! each referenced value into text with [`append_value`].

use std::fmt;

/// Separator placed between the elements of a [`Value::List`].
pub const LIST_SEPARATOR: &str = ", ";

/// A single format argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Renders as nothing.
    Null,
    /// Unsigned integer.
    UInt(u64),
    /// 16-bit unsigned integer (years, for example).
    UInt16(u16),
    /// 8-bit unsigned integer (months, hours, percentages).
    UInt8(u8),
    /// Signed integer.
    Int(i64),
    /// Borrowed text.
    Str(&'a str),
    /// Owned text.
    OwnedString(String),
    /// Floating point number.
    Double(f64),
    /// Ordered list of values, joined with [`LIST_SEPARATOR`].
    List(Vec<Value<'a>>),
}

/// Append the textual form of `value` to `buffer`.
///
/// Integers use plain base-10. Doubles use Rust's shortest round-trip
/// representation, which does not depend on the process locale.
pub fn append_value(buffer: &mut String, value: &Value<'_>) {
    use fmt::Write;

    match value {
        Value::Null => {}
        Value::UInt(n) => {
            let _ = write!(buffer, "{}", n);
        }
        Value::UInt16(n) => {
            let _ = write!(buffer, "{}", n);
        }
        Value::UInt8(n) => {
            let _ = write!(buffer, "{}", n);
        }
        Value::Int(n) => {
            let _ = write!(buffer, "{}", n);
        }
        Value::Str(s) => buffer.push_str(s),
        Value::OwnedString(s) => buffer.push_str(s),
        Value::Double(d) => {
            let _ = write!(buffer, "{}", d);
        }
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buffer.push_str(LIST_SEPARATOR);
                }
                append_value(buffer, item);
            }
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = String::new();
        append_value(&mut buffer, self);
        f.write_str(&buffer)
    }
}

impl From<u64> for Value<'_> {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<u32> for Value<'_> {
    fn from(n: u32) -> Self {
        Value::UInt(u64::from(n))
    }
}

impl From<usize> for Value<'_> {
    fn from(n: usize) -> Self {
        Value::UInt(n as u64)
    }
}

impl From<u16> for Value<'_> {
    fn from(n: u16) -> Self {
        Value::UInt16(n)
    }
}

impl From<u8> for Value<'_> {
    fn from(n: u8) -> Self {
        Value::UInt8(n)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value<'_> {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value<'_> {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(s)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::Str(s.as_str())
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::OwnedString(s)
    }
}

/// An absent value renders like an empty one.
impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<'a, T: Into<Value<'a>>> From<Vec<T>> for Value<'a> {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
