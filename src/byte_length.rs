//! Byte Length Module
//!
//! Values stored in a byte-bounded cache report their own size through
//! [`ByteLength`]. [`ByteList`] composes any number of such values, nesting
//! freely, and reports the sum of its elements.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{CacheError, Result};

// == Byte Length ==
/// A value that knows how many bytes it occupies.
pub trait ByteLength {
    /// Returns the byte length of the value.
    fn byte_length(&self) -> usize;
}

impl ByteLength for str {
    fn byte_length(&self) -> usize {
        self.len()
    }
}

impl ByteLength for String {
    fn byte_length(&self) -> usize {
        self.len()
    }
}

impl ByteLength for [u8] {
    fn byte_length(&self) -> usize {
        self.len()
    }
}

impl ByteLength for Vec<u8> {
    fn byte_length(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> ByteLength for [u8; N] {
    fn byte_length(&self) -> usize {
        N
    }
}

impl ByteLength for Bytes {
    fn byte_length(&self) -> usize {
        self.len()
    }
}

impl<T: ByteLength + ?Sized> ByteLength for &T {
    fn byte_length(&self) -> usize {
        (**self).byte_length()
    }
}

impl<T: ByteLength + ?Sized> ByteLength for Box<T> {
    fn byte_length(&self) -> usize {
        (**self).byte_length()
    }
}

impl<T: ByteLength + ?Sized> ByteLength for Rc<T> {
    fn byte_length(&self) -> usize {
        (**self).byte_length()
    }
}

impl<T: ByteLength + ?Sized> ByteLength for Arc<T> {
    fn byte_length(&self) -> usize {
        (**self).byte_length()
    }
}

// == Try Byte Length ==
/// Fallible form of [`ByteLength`], used by the byte-bounded cache.
///
/// Every [`ByteLength`] type succeeds. Types whose size is only known at
/// runtime, such as [`Value`], reject unsupported shapes with
/// [`CacheError::UnsupportedValue`].
pub trait TryByteLength {
    fn try_byte_length(&self) -> Result<usize>;
}

impl<T: ByteLength + ?Sized> TryByteLength for T {
    fn try_byte_length(&self) -> Result<usize> {
        Ok(self.byte_length())
    }
}

// == Byte List ==
/// Read-only sequence whose byte length is the sum of its elements.
///
/// The length is recomputed on every call, walking the elements (and any
/// nested lists) each time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteList<T> {
    items: Vec<T>,
}

impl<T> ByteList<T> {
    /// Wraps an existing sequence.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Returns the underlying elements.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Number of elements (not bytes).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unwraps into the underlying vector.
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T: ByteLength> ByteLength for ByteList<T> {
    fn byte_length(&self) -> usize {
        self.items.iter().map(ByteLength::byte_length).sum()
    }
}

impl<T> From<Vec<T>> for ByteList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for ByteList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a ByteList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// == Value ==
/// Dynamically shaped value for callers that only learn a value's kind at
/// runtime.
///
/// `Text`, `Binary` and `List` report a byte length. A bare `Array`, an
/// `Integer` or `Null` cannot be measured and are refused by the byte-bounded
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Binary(Bytes),
    /// Composite wrapper; measured as the sum of its elements
    List(ByteList<Value>),
    /// Plain sequence without the wrapper
    Array(Vec<Value>),
    Integer(i64),
    Null,
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Binary(_) => "binary",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::Integer(_) => "integer",
            Value::Null => "null",
        }
    }
}

impl TryByteLength for Value {
    fn try_byte_length(&self) -> Result<usize> {
        match self {
            Value::Text(text) => Ok(text.byte_length()),
            Value::Binary(buf) => Ok(buf.byte_length()),
            Value::List(list) => list
                .iter()
                .try_fold(0usize, |acc, item| -> Result<usize> {
                    Ok(acc + item.try_byte_length()?)
                }),
            other => Err(CacheError::UnsupportedValue(other.kind().to_string())),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<u8>> for Value {
    fn from(buf: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(buf))
    }
}

impl From<Bytes> for Value {
    fn from(buf: Bytes) -> Self {
        Value::Binary(buf)
    }
}

impl From<ByteList<Value>> for Value {
    fn from(list: ByteList<Value>) -> Self {
        Value::List(list)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Binary(buf) => write!(f, "<{} bytes>", buf.len()),
            Value::List(list) => write_seq(f, list.as_slice()),
            Value::Array(items) => write_seq(f, items),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Null => f.write_str("null"),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}
