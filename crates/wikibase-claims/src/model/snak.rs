//! Snaks: one property, one datatype, at most one value.

use crate::error::DecodeError;
use crate::model::{DataType, PropertyId, Value};

/// Whether a snak states a value, an unknown value, or no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnakType {
    #[default]
    Value,
    SomeValue,
    NoValue,
}

impl SnakType {
    /// Parses the `snaktype` attribute.
    pub fn from_wire(raw: &str) -> Result<Self, DecodeError> {
        match raw {
            "value" => Ok(SnakType::Value),
            "somevalue" => Ok(SnakType::SomeValue),
            "novalue" => Ok(SnakType::NoValue),
            _ => Err(DecodeError::InvalidSnakType {
                value: raw.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SnakType::Value => "value",
            SnakType::SomeValue => "somevalue",
            SnakType::NoValue => "novalue",
        }
    }
}

/// A property/datatype/value triple.
///
/// `value` is `None` for `somevalue`/`novalue` snaks and for datatypes
/// without a value model. The datatype is kept as declared, independent of
/// the value variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snak {
    pub property: PropertyId,
    pub datatype: DataType,
    pub snak_type: SnakType,
    pub value: Option<Value>,
}

impl Snak {
    /// Creates a value snak.
    pub fn new(property: PropertyId, datatype: DataType, value: Value) -> Self {
        Self {
            property,
            datatype,
            snak_type: SnakType::Value,
            value: Some(value),
        }
    }

    /// Creates a snak stating that some unknown value exists.
    pub fn some_value(property: PropertyId, datatype: DataType) -> Self {
        Self {
            property,
            datatype,
            snak_type: SnakType::SomeValue,
            value: None,
        }
    }

    /// Creates a snak stating that no value exists.
    pub fn no_value(property: PropertyId, datatype: DataType) -> Self {
        Self {
            property,
            datatype,
            snak_type: SnakType::NoValue,
            value: None,
        }
    }

    /// Returns true if this is a value snak whose value could not be modelled.
    pub fn is_unresolved(&self) -> bool {
        self.snak_type == SnakType::Value && self.value.is_none()
    }
}
