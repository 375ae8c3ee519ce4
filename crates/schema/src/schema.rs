//! Schema combinators.
//!
//! Schemas are plain values built with constructor functions and chained
//! builder methods, mirroring how procedure contracts are authored:
//!
//! ```
//! use quire_schema::Schema;
//!
//! let input = Schema::object([
//!     ("contentTypeId", Schema::string().required()),
//!     ("ids", Schema::array_of(Schema::string().min_length(1)).min_size(1).required()),
//!     ("version", Schema::number().required()),
//!     ("options", Schema::plain_object().optional()),
//! ]);
//! ```

use std::collections::BTreeMap;

/// A wire-payload schema.
#[derive(Debug, Clone)]
pub enum Schema {
    /// A string, optionally with a minimum length.
    String { min_length: Option<usize> },
    /// A number. Numeric strings coerce (`"1"` validates).
    Number,
    /// A boolean.
    Boolean,
    /// A closed object: keys not declared here are rejected.
    Object { fields: BTreeMap<String, ObjectField> },
    /// Any JSON object, contents unchecked. Used for free-form `options`
    /// bags whose shape belongs to the storage backend.
    PlainObject,
    /// An array of homogeneous items, optionally with a minimum size.
    Array {
        items: Box<Schema>,
        min_size: Option<usize>,
    },
    /// Any one of the alternatives, tried in order.
    OneOf(Vec<Schema>),
}

/// A field of a closed object schema.
#[derive(Debug, Clone)]
pub struct ObjectField {
    pub schema: Schema,
    pub required: bool,
}

impl Schema {
    /// String schema.
    pub fn string() -> Self {
        Self::String { min_length: None }
    }

    /// Number schema. Accepts JSON numbers and numeric strings.
    pub fn number() -> Self {
        Self::Number
    }

    /// Boolean schema.
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// Permissive object schema (any keys, any values).
    pub fn plain_object() -> Self {
        Self::PlainObject
    }

    /// Closed object schema with the given fields.
    pub fn object<K>(fields: impl IntoIterator<Item = (K, ObjectField)>) -> Self
    where
        K: Into<String>,
    {
        Self::Object {
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
        }
    }

    /// Array schema with homogeneous item schema.
    pub fn array_of(items: Schema) -> Self {
        Self::Array {
            items: Box::new(items),
            min_size: None,
        }
    }

    /// Union schema: the value must match one of the alternatives.
    pub fn one_of(alternatives: impl IntoIterator<Item = Schema>) -> Self {
        Self::OneOf(alternatives.into_iter().collect())
    }

    /// Minimum length constraint. Applies to string schemas; a no-op on
    /// other kinds.
    pub fn min_length(self, min: usize) -> Self {
        match self {
            Self::String { .. } => Self::String {
                min_length: Some(min),
            },
            other => other,
        }
    }

    /// Minimum size constraint. Applies to array schemas; a no-op on other
    /// kinds.
    pub fn min_size(self, min: usize) -> Self {
        match self {
            Self::Array { items, .. } => Self::Array {
                items,
                min_size: Some(min),
            },
            other => other,
        }
    }

    /// Wrap into a required object field.
    pub fn required(self) -> ObjectField {
        ObjectField {
            schema: self,
            required: true,
        }
    }

    /// Wrap into an optional object field. A missing key is accepted; a
    /// present key still validates.
    pub fn optional(self) -> ObjectField {
        ObjectField {
            schema: self,
            required: false,
        }
    }
}
