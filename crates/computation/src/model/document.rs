//! Field documents.
//!
//! A [`Document`] is an ordered list of named [`Bson`] values. Entity
//! envelopes, graph encodings and storage rows are all documents. Field
//! order is preserved, which keeps encoded bytes deterministic.

use crate::error::DecodeError;

/// A document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bson {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    String(String),
    Array(Vec<Bson>),
    Document(Document),
}

impl Bson {
    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Bson::Null => "null",
            Bson::Bool(_) => "bool",
            Bson::Int32(_) => "int32",
            Bson::Int64(_) => "int64",
            Bson::String(_) => "string",
            Bson::Array(_) => "array",
            Bson::Document(_) => "document",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Bson]> {
        match self {
            Bson::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Bson::Null)
    }
}

impl From<bool> for Bson {
    fn from(value: bool) -> Self {
        Bson::Bool(value)
    }
}

impl From<i32> for Bson {
    fn from(value: i32) -> Self {
        Bson::Int32(value)
    }
}

impl From<i64> for Bson {
    fn from(value: i64) -> Self {
        Bson::Int64(value)
    }
}

impl From<String> for Bson {
    fn from(value: String) -> Self {
        Bson::String(value)
    }
}

impl From<&str> for Bson {
    fn from(value: &str) -> Self {
        Bson::String(value.to_string())
    }
}

impl From<Vec<Bson>> for Bson {
    fn from(value: Vec<Bson>) -> Self {
        Bson::Array(value)
    }
}

impl From<Document> for Bson {
    fn from(value: Document) -> Self {
        Bson::Document(value)
    }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(value: Option<T>) -> Self {
        value.map_or(Bson::Null, Into::into)
    }
}

/// An ordered set of named values. Field names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    fields: Vec<(String, Bson)>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field. An existing field keeps its position; a new one is
    /// appended. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bson>) -> Option<Bson> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    /// Returns a field's value.
    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes a field.
    pub fn remove(&mut self, key: &str) -> Option<Bson> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over fields in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Bson)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a field, or [`DecodeError::MissingField`].
    pub fn get_required(&self, field: &'static str) -> Result<&Bson, DecodeError> {
        self.get(field).ok_or(DecodeError::MissingField { field })
    }

    /// Returns a field that may be absent or null.
    pub fn get_optional(&self, field: &str) -> Option<&Bson> {
        self.get(field).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, field: &'static str) -> Result<&str, DecodeError> {
        let value = self.get_required(field)?;
        value.as_str().ok_or_else(|| mistyped(field, "string", value))
    }

    pub fn get_i32(&self, field: &'static str) -> Result<i32, DecodeError> {
        let value = self.get_required(field)?;
        value.as_i32().ok_or_else(|| mistyped(field, "int32", value))
    }

    pub fn get_array(&self, field: &'static str) -> Result<&[Bson], DecodeError> {
        let value = self.get_required(field)?;
        value.as_array().ok_or_else(|| mistyped(field, "array", value))
    }

    pub fn get_document(&self, field: &'static str) -> Result<&Document, DecodeError> {
        let value = self.get_required(field)?;
        value
            .as_document()
            .ok_or_else(|| mistyped(field, "document", value))
    }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

/// Builds the error for a field holding the wrong type.
pub(crate) fn mistyped(field: &'static str, expected: &'static str, found: &Bson) -> DecodeError {
    DecodeError::UnexpectedFieldType {
        field,
        expected,
        found: found.type_name(),
    }
}
