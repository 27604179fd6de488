//! Semantic validation for claims.
//!
//! Decoding only checks what it needs to build a value. The checks here
//! cover the model invariants (mainsnak property, value matches datatype,
//! value-level bounds) and run before a claim is encoded for an edit.
//!
//! **Note:** Schema checking is advisory. Properties missing from a
//! [`SchemaContext`] are accepted.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::model::{Claim, DataType, PropertyId, Snak, SnakType, Value};

/// Schema context for semantic validation.
///
/// Applications can register the datatype each property is declared with
/// (e.g. from `wbgetentities` on the property pages) and check claims
/// against it.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    properties: HashMap<PropertyId, DataType>,
}

impl SchemaContext {
    /// Creates a new empty schema context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property with its declared datatype.
    pub fn add_property(&mut self, property: PropertyId, data_type: DataType) {
        self.properties.insert(property, data_type);
    }

    /// Gets the declared datatype of a property, if registered.
    pub fn get_property_type(&self, property: &PropertyId) -> Option<&DataType> {
        self.properties.get(property)
    }
}

fn check_value(property: &PropertyId, value: &Value) -> Result<(), ValidationError> {
    match value.validate() {
        Some(reason) => Err(ValidationError::InvalidValue {
            property: property.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Validates one snak.
///
/// - `somevalue`/`novalue` snaks carry no value
/// - a value matches the declared datatype (unknown datatypes are not checked)
/// - the value passes [`Value::validate`]
pub fn validate_snak(snak: &Snak) -> Result<(), ValidationError> {
    let Some(value) = &snak.value else {
        return Ok(());
    };
    if snak.snak_type != SnakType::Value {
        return Err(ValidationError::UnexpectedValue {
            property: snak.property.clone(),
            snak_type: snak.snak_type.as_str(),
        });
    }
    let found = value.data_type();
    if snak.datatype.is_known() && snak.datatype != found {
        return Err(ValidationError::TypeMismatch {
            property: snak.property.clone(),
            expected: snak.datatype.clone(),
            found,
        });
    }
    check_value(&snak.property, value)
}

/// Validates a claim's invariants and every snak and qualifier value in it.
pub fn validate_claim(claim: &Claim) -> Result<(), ValidationError> {
    if claim.property != claim.mainsnak.property {
        return Err(ValidationError::MainsnakPropertyMismatch {
            claim: claim.property.clone(),
            mainsnak: claim.mainsnak.property.clone(),
        });
    }
    validate_snak(&claim.mainsnak)?;

    for (property, values) in claim.qualifiers.iter() {
        for value in values {
            check_value(property, value)?;
        }
    }
    for group in &claim.references {
        for snak in group.snaks() {
            validate_snak(snak)?;
        }
    }
    Ok(())
}

/// Validates a claim and checks every datatype against a schema.
pub fn validate_claim_with_schema(
    claim: &Claim,
    schema: &SchemaContext,
) -> Result<(), ValidationError> {
    validate_claim(claim)?;

    let snaks = std::iter::once(&claim.mainsnak)
        .chain(claim.references.iter().flat_map(|group| group.snaks()));
    for snak in snaks {
        if let Some(declared) = schema.get_property_type(&snak.property) {
            if *declared != snak.datatype {
                return Err(ValidationError::DataTypeInconsistent {
                    property: snak.property.clone(),
                    schema: declared.clone(),
                    declared: snak.datatype.clone(),
                });
            }
        }
    }

    for (property, values) in claim.qualifiers.iter() {
        let Some(expected) = schema.get_property_type(property) else {
            continue;
        };
        for value in values {
            let found = value.data_type();
            if *expected != found {
                return Err(ValidationError::TypeMismatch {
                    property: property.clone(),
                    expected: expected.clone(),
                    found,
                });
            }
        }
    }
    Ok(())
}

/// Validates a single value (independent of property context).
///
/// This checks value-level constraints like:
/// - coordinates within range
/// - quantity amount within its bounds
/// - time components present for the precision
pub fn validate_value(value: &Value) -> Option<&'static str> {
    value.validate()
}
