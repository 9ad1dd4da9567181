//! Structure module - named-field records used as RPC arguments and replies.
//!
//! This is deliberately small: a [`PvStructure`] is an ordered list of named
//! [`FieldValue`]s, and [`FieldDesc`] describes a field's name and type. It
//! exists so handlers and services have a concrete value type to read from
//! and write into.
//!
//! # Example
//!
//! ```
//! use pvrpc::structure::{FieldDesc, PvStructure};
//!
//! let mut reply = PvStructure::create(&[FieldDesc::string("greeting")]).unwrap();
//! reply.set_field("greeting", "Hello World").unwrap();
//! assert_eq!(reply.get_string("greeting").unwrap(), "Hello World");
//! ```

mod pv;
mod value;

use std::fmt;

use crate::array::ElementKind;

pub use pv::{PvField, PvStructure};
pub use value::{ArrayField, FieldValue};

/// Type of a single field: a scalar or an array of one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ElementKind),
    Array(ElementKind),
}

impl FieldType {
    /// Element kind, regardless of shape.
    pub fn element_kind(&self) -> ElementKind {
        match self {
            FieldType::Scalar(kind) | FieldType::Array(kind) => *kind,
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(kind) => write!(f, "{}", kind),
            FieldType::Array(kind) => write!(f, "{}[]", kind),
        }
    }
}

/// Name and type of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDesc {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDesc {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn scalar(name: impl Into<String>, kind: ElementKind) -> Self {
        Self::new(name, FieldType::Scalar(kind))
    }

    pub fn array(name: impl Into<String>, kind: ElementKind) -> Self {
        Self::new(name, FieldType::Array(kind))
    }

    /// Shorthand for a scalar string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ElementKind::String)
    }
}
