//! Field values.

use serde::{Deserialize, Serialize};

use super::FieldType;
use crate::array::{ArrayElement, ElementKind};

/// Value held by one field of a [`PvStructure`](super::PvStructure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Double(f64),
    Long(i64),
    Byte(i8),
    String(String),
    DoubleArray(Vec<f64>),
    LongArray(Vec<i64>),
    ByteArray(Vec<i8>),
    StringArray(Vec<String>),
}

impl FieldValue {
    /// Type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Double(_) => FieldType::Scalar(ElementKind::Double),
            FieldValue::Long(_) => FieldType::Scalar(ElementKind::Long),
            FieldValue::Byte(_) => FieldType::Scalar(ElementKind::Byte),
            FieldValue::String(_) => FieldType::Scalar(ElementKind::String),
            FieldValue::DoubleArray(_) => FieldType::Array(ElementKind::Double),
            FieldValue::LongArray(_) => FieldType::Array(ElementKind::Long),
            FieldValue::ByteArray(_) => FieldType::Array(ElementKind::Byte),
            FieldValue::StringArray(_) => FieldType::Array(ElementKind::String),
        }
    }

    /// Zero value for a field type: `0`, empty string or empty array.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Scalar(ElementKind::Double) => FieldValue::Double(0.0),
            FieldType::Scalar(ElementKind::Long) => FieldValue::Long(0),
            FieldType::Scalar(ElementKind::Byte) => FieldValue::Byte(0),
            FieldType::Scalar(ElementKind::String) => FieldValue::String(String::new()),
            FieldType::Array(ElementKind::Double) => FieldValue::DoubleArray(Vec::new()),
            FieldType::Array(ElementKind::Long) => FieldValue::LongArray(Vec::new()),
            FieldType::Array(ElementKind::Byte) => FieldValue::ByteArray(Vec::new()),
            FieldType::Array(ElementKind::String) => FieldValue::StringArray(Vec::new()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<i8> for FieldValue {
    fn from(v: i8) -> Self {
        FieldValue::Byte(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl<T: ArrayField> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        T::into_array_value(v)
    }
}

/// Array element types that can be stored in a structure field.
pub trait ArrayField: ArrayElement + Sized {
    /// Borrow the array if `value` is an array of this element type.
    fn array_ref(value: &FieldValue) -> Option<&[Self]>;

    /// Wrap a vector as a field value.
    fn into_array_value(values: Vec<Self>) -> FieldValue;
}

macro_rules! impl_array_field {
    ($ty:ty, $variant:ident) => {
        impl ArrayField for $ty {
            fn array_ref(value: &FieldValue) -> Option<&[Self]> {
                match value {
                    FieldValue::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn into_array_value(values: Vec<Self>) -> FieldValue {
                FieldValue::$variant(values)
            }
        }
    };
}

impl_array_field!(f64, DoubleArray);
impl_array_field!(i64, LongArray);
impl_array_field!(i8, ByteArray);
impl_array_field!(String, StringArray);
