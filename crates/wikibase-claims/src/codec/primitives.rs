//! Attribute-level reading of tree nodes and scalar wire formatting.

use url::Url;

use crate::error::DecodeError;
use crate::tree::Node;

// =============================================================================
// DECODING
// =============================================================================

/// Reader over the attributes and children of one node.
///
/// Wraps a [`Node`] and turns missing or unparsable attributes into
/// [`DecodeError`]s naming the node and attribute.
#[derive(Debug, Clone)]
pub struct NodeReader<N> {
    node: N,
}

impl<N: Node> NodeReader<N> {
    /// Creates a reader without checking the node name.
    pub fn new(node: N) -> Self {
        Self { node }
    }

    /// Creates a reader, failing if the node is not named `name`.
    pub fn expect(node: N, name: &'static str) -> Result<Self, DecodeError> {
        if !node.is(name) {
            return Err(DecodeError::UnexpectedNode {
                expected: name,
                found: node.name().to_string(),
            });
        }
        Ok(Self { node })
    }

    /// Returns the wrapped node.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Reads an attribute that must be present.
    pub fn required(&self, attribute: &'static str) -> Result<&str, DecodeError> {
        self.node
            .attribute(attribute)
            .ok_or_else(|| DecodeError::missing_attribute(self.node.name(), attribute))
    }

    /// Reads an attribute that may be absent.
    pub fn optional(&self, attribute: &str) -> Option<&str> {
        self.node.attribute(attribute)
    }

    /// Reads a required finite float.
    pub fn read_f64(&self, attribute: &'static str) -> Result<f64, DecodeError> {
        parse_f64(attribute, self.required(attribute)?)
    }

    /// Reads an optional finite float.
    pub fn read_optional_f64(&self, attribute: &'static str) -> Result<Option<f64>, DecodeError> {
        self.optional(attribute)
            .map(|raw| parse_f64(attribute, raw))
            .transpose()
    }

    /// Reads a required unsigned integer.
    pub fn read_u32(&self, attribute: &'static str) -> Result<u32, DecodeError> {
        let raw = self.required(attribute)?;
        raw.parse().map_err(|_| invalid_number(attribute, raw))
    }

    /// Reads a required signed integer.
    pub fn read_i64(&self, attribute: &'static str) -> Result<i64, DecodeError> {
        let raw = self.required(attribute)?;
        raw.parse().map_err(|_| invalid_number(attribute, raw))
    }

    /// Reads an optional signed 16-bit integer.
    pub fn read_optional_i16(&self, attribute: &'static str) -> Result<Option<i16>, DecodeError> {
        self.optional(attribute)
            .map(|raw| raw.parse().map_err(|_| invalid_number(attribute, raw)))
            .transpose()
    }

    /// Reads a required absolute URL.
    pub fn read_url(&self, attribute: &'static str) -> Result<Url, DecodeError> {
        parse_url(attribute, self.required(attribute)?)
    }

    /// Returns the first child named `name`.
    pub fn child(&self, parent: &'static str, name: &'static str) -> Result<N, DecodeError> {
        self.node
            .child(name)
            .ok_or(DecodeError::MissingChild { parent, child: name })
    }
}

fn invalid_number(field: &'static str, raw: &str) -> DecodeError {
    DecodeError::InvalidNumber {
        field,
        value: raw.to_string(),
    }
}

/// Parses a float, rejecting NaN and infinities.
pub fn parse_f64(field: &'static str, raw: &str) -> Result<f64, DecodeError> {
    let value: f64 = raw.trim().parse().map_err(|_| invalid_number(field, raw))?;
    if !value.is_finite() {
        return Err(DecodeError::NonFiniteNumber { field, value });
    }
    Ok(value)
}

/// Parses an absolute URL.
pub fn parse_url(field: &'static str, raw: &str) -> Result<Url, DecodeError> {
    Url::parse(raw).map_err(|e| DecodeError::InvalidUrl {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// ENCODING
// =============================================================================

/// Formats a quantity amount as the signed decimal string Wikibase expects
/// (`+10`, `-0.5`).
pub fn format_amount(value: f64) -> String {
    if value.is_sign_negative() {
        format!("{value}")
    } else {
        format!("+{value}")
    }
}
