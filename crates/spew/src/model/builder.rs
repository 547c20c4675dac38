//! Builder API for ergonomic record and map construction.
//!
//! # Example
//!
//! ```rust
//! use spew::model::{MapBuilder, RecordBuilder};
//! use spew::Value;
//!
//! let point = RecordBuilder::new("Point")
//!     .field("x", 1i64)
//!     .field("y", 2i64)
//!     .private_field("cache", Value::nil_ptr("Point"))
//!     .build();
//!
//! let scores = MapBuilder::new("String", "i64")
//!     .entry("alice", 3i64)
//!     .entry("bob", 5i64)
//!     .build();
//! # let _ = (point, scores);
//! ```

use std::rc::Rc;

use crate::model::{Field, Kind, TypeName, Value};

/// Builder for record values.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    ty: TypeName,
    fields: Vec<Field>,
}

impl RecordBuilder {
    /// Creates a builder for a record of the given type.
    pub fn new(ty: impl Into<TypeName>) -> Self {
        Self {
            ty: ty.into(),
            fields: Vec::new(),
        }
    }

    /// Appends an exported field.
    pub fn field(mut self, name: impl Into<Rc<str>>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            exported: true,
        });
        self
    }

    /// Appends a non-exported field.
    pub fn private_field(mut self, name: impl Into<Rc<str>>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            exported: false,
        });
        self
    }

    /// Builds the record.
    pub fn build(self) -> Value {
        Value::new(self.ty, Kind::Record(self.fields))
    }
}

impl Value {
    /// Starts building a record of the given type.
    pub fn record(ty: impl Into<TypeName>) -> RecordBuilder {
        RecordBuilder::new(ty)
    }
}

/// Builder for map values.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    key: TypeName,
    value: TypeName,
    entries: Vec<(Value, Value)>,
}

impl MapBuilder {
    /// Creates a builder for a map with the given key and value types.
    pub fn new(key: impl Into<TypeName>, value: impl Into<TypeName>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn entry(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Appends several entries at once.
    pub fn entries<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Builds the map.
    pub fn build(self) -> Value {
        Value::map(self.key, self.value, self.entries)
    }
}
