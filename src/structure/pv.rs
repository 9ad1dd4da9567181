//! Named-field structure.

use serde::{Deserialize, Serialize};

use super::{ArrayField, FieldDesc, FieldType, FieldValue};
use crate::array::{BulkArrayReader, ChunkedSlice, ElementKind};
use crate::error::{PvRpcError, Result};

/// One named field of a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvField {
    pub name: String,
    pub value: FieldValue,
}

/// Ordered record of named fields.
///
/// Field order is declaration order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PvStructure {
    fields: Vec<PvField>,
}

impl PvStructure {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a structure with the given fields, each set to its zero value.
    ///
    /// # Errors
    ///
    /// Returns [`PvRpcError::DuplicateField`] if a name appears twice.
    pub fn create(fields: &[FieldDesc]) -> Result<Self> {
        let mut structure = Self::new();
        for desc in fields {
            structure.add_field(&desc.name, FieldValue::default_for(desc.field_type))?;
        }
        Ok(structure)
    }

    /// Append a new field.
    pub fn add_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        if self.position(name).is_some() {
            return Err(PvRpcError::DuplicateField(name.to_string()));
        }
        self.fields.push(PvField {
            name: name.to_string(),
            value: value.into(),
        });
        Ok(())
    }

    /// Builder-style [`add_field`](Self::add_field).
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self> {
        self.add_field(name, value)?;
        Ok(self)
    }

    /// Get a field value by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.position(name).map(|i| &self.fields[i].value)
    }

    /// Overwrite a declared field.
    ///
    /// # Errors
    ///
    /// - [`PvRpcError::UnknownField`] if the field was never declared.
    /// - [`PvRpcError::FieldType`] if the new value has a different type.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let index = self
            .position(name)
            .ok_or_else(|| PvRpcError::UnknownField(name.to_string()))?;

        let slot = &mut self.fields[index].value;
        let expected = slot.field_type();
        let found = value.field_type();
        if expected != found {
            return Err(PvRpcError::FieldType {
                name: name.to_string(),
                expected,
                found,
            });
        }

        *slot = value;
        Ok(())
    }

    /// Get a field, checking that it exists and has the declared type.
    pub fn require(&self, desc: &FieldDesc) -> Result<&FieldValue> {
        let value = self
            .get_field(&desc.name)
            .ok_or_else(|| PvRpcError::MissingField(desc.name.clone()))?;

        if value.field_type() != desc.field_type {
            return Err(mismatch(&desc.name, desc.field_type, value));
        }
        Ok(value)
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        self.scalar(name, ElementKind::String, |v| match v {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn get_double(&self, name: &str) -> Result<f64> {
        self.scalar(name, ElementKind::Double, |v| match v {
            FieldValue::Double(d) => Some(*d),
            _ => None,
        })
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        self.scalar(name, ElementKind::Long, |v| match v {
            FieldValue::Long(l) => Some(*l),
            _ => None,
        })
    }

    pub fn get_byte(&self, name: &str) -> Result<i8> {
        self.scalar(name, ElementKind::Byte, |v| match v {
            FieldValue::Byte(b) => Some(*b),
            _ => None,
        })
    }

    /// Copy an array field out into a fresh vector.
    ///
    /// The array is read through a [`ChunkedSlice`] capped at `chunk_limit`
    /// elements per read.
    pub fn copy_array<T: ArrayField>(&self, name: &str, chunk_limit: usize) -> Result<Vec<T>> {
        let value = self
            .get_field(name)
            .ok_or_else(|| PvRpcError::MissingField(name.to_string()))?;
        let values = T::array_ref(value)
            .ok_or_else(|| mismatch(name, FieldType::Array(T::KIND), value))?;

        BulkArrayReader::read_all(&ChunkedSlice::new(values, chunk_limit))
    }

    /// Names and types of all fields, in order.
    pub fn introspect(&self) -> Vec<FieldDesc> {
        self.fields
            .iter()
            .map(|f| FieldDesc::new(f.name.clone(), f.value.field_type()))
            .collect()
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &PvField> {
        self.fields.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    fn scalar<'a, T>(
        &'a self,
        name: &str,
        kind: ElementKind,
        pick: impl FnOnce(&'a FieldValue) -> Option<T>,
    ) -> Result<T> {
        let value = self
            .get_field(name)
            .ok_or_else(|| PvRpcError::MissingField(name.to_string()))?;
        pick(value).ok_or_else(|| mismatch(name, FieldType::Scalar(kind), value))
    }
}

fn mismatch(name: &str, expected: FieldType, value: &FieldValue) -> PvRpcError {
    PvRpcError::FieldType {
        name: name.to_string(),
        expected,
        found: value.field_type(),
    }
}
