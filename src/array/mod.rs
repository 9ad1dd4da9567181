//! Array module - bulk extraction of typed arrays from chunked sources.
//!
//! Provides:
//! - [`ArraySource`] - a bounded, offset-addressed typed array
//! - [`ChunkedSlice`] - an in-memory source that caps every chunk
//! - [`BulkArrayReader`] - drains any source into one contiguous `Vec<T>`
//!
//! Supported element kinds are `f64`, `i64`, `i8` and `String`.
//!
//! # Example
//!
//! ```
//! use pvrpc::array::{BulkArrayReader, ChunkedSlice};
//!
//! let data = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let source = ChunkedSlice::new(&data, 2);
//!
//! let values = BulkArrayReader::read_doubles(&source).unwrap();
//! assert_eq!(values, data);
//! ```

mod reader;
mod source;

use std::fmt;

pub use reader::BulkArrayReader;
pub use source::{ArraySource, ChunkedSlice};

/// The closed set of element kinds an array source can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 64-bit float.
    Double,
    /// 64-bit signed integer.
    Long,
    /// 8-bit signed integer.
    Byte,
    /// Text.
    String,
}

impl ElementKind {
    /// Lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Double => "double",
            ElementKind::Long => "long",
            ElementKind::Byte => "byte",
            ElementKind::String => "string",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element type that may appear in an [`ArraySource`].
///
/// Implemented for exactly the four supported kinds.
pub trait ArrayElement: Clone + Send + Sync + 'static {
    /// Kind tag for this element type.
    const KIND: ElementKind;
}

impl ArrayElement for f64 {
    const KIND: ElementKind = ElementKind::Double;
}

impl ArrayElement for i64 {
    const KIND: ElementKind = ElementKind::Long;
}

impl ArrayElement for i8 {
    const KIND: ElementKind = ElementKind::Byte;
}

impl ArrayElement for String {
    const KIND: ElementKind = ElementKind::String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kinds() {
        assert_eq!(<f64 as ArrayElement>::KIND, ElementKind::Double);
        assert_eq!(<i64 as ArrayElement>::KIND, ElementKind::Long);
        assert_eq!(<i8 as ArrayElement>::KIND, ElementKind::Byte);
        assert_eq!(<String as ArrayElement>::KIND, ElementKind::String);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ElementKind::Double.to_string(), "double");
        assert_eq!(ElementKind::String.to_string(), "string");
    }
}
