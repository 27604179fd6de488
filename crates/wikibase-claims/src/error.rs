//! Error types for claim decoding, wire encoding and validation.

use thiserror::Error;

use crate::model::{DataType, PropertyId};

/// Broad classification of decode failures.
///
/// Every [`DecodeError`] maps onto exactly one kind, so callers can decide
/// whether to skip a single malformed claim or abort a whole batch without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A property or item identifier does not match `P\d+` / `Q\d+`.
    InvalidIdentifier,
    /// A required attribute is missing or unparsable within a known datatype.
    MalformedValue,
    /// The claim rank is not one of `preferred`, `normal`, `deprecated`.
    UnrecognizedRank,
    /// The node handed to a decoder has the wrong name or structure.
    UnexpectedNodeShape,
}

impl ErrorKind {
    /// Returns a stable, machine-readable name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidIdentifier => "invalid-identifier",
            ErrorKind::MalformedValue => "malformed-value",
            ErrorKind::UnrecognizedRank => "unrecognized-rank",
            ErrorKind::UnexpectedNodeShape => "unexpected-node-shape",
        }
    }
}

/// Error while decoding a snak, claim or value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === InvalidIdentifier ===
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    // === MalformedValue ===
    #[error("missing attribute `{attribute}` on <{node}>")]
    MissingAttribute { node: String, attribute: &'static str },

    #[error("{datatype} snak has no <{node}> node")]
    MissingDataValue { datatype: DataType, node: &'static str },

    #[error("datavalue type {found:?} does not match datatype {datatype}")]
    DataValueTypeMismatch { datatype: DataType, found: String },

    #[error("entity type {found:?} where {expected:?} was expected")]
    UnexpectedEntityType { expected: &'static str, found: String },

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not a finite number: {value}")]
    NonFiniteNumber { field: &'static str, value: f64 },

    #[error("invalid URL in {field}: {value:?} ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("unsupported time precision {precision}")]
    InvalidPrecision { precision: i64 },

    #[error("invalid time {value:?} at precision {precision}: {reason}")]
    InvalidTime {
        value: String,
        precision: u8,
        reason: String,
    },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("invalid snak type: {value:?}")]
    InvalidSnakType { value: String },

    // === UnrecognizedRank ===
    #[error("unrecognized rank: {value:?}")]
    UnrecognizedRank { value: String },

    // === UnexpectedNodeShape ===
    #[error("expected <{expected}> node, found <{found}>")]
    UnexpectedNode { expected: &'static str, found: String },

    #[error("<{parent}> has no <{child}> child")]
    MissingChild { parent: &'static str, child: &'static str },

    #[error("qualifier snak for {snak} listed under property group {group}")]
    QualifierPropertyMismatch { group: PropertyId, snak: PropertyId },

    #[error("malformed XML: {reason}")]
    MalformedXml { reason: String },

    #[error("invalid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("unexpected JSON at {context}: expected {expected}")]
    UnexpectedJson {
        context: &'static str,
        expected: &'static str,
    },
}

impl DecodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            DecodeError::UnrecognizedRank { .. } => ErrorKind::UnrecognizedRank,
            DecodeError::UnexpectedNode { .. }
            | DecodeError::MissingChild { .. }
            | DecodeError::QualifierPropertyMismatch { .. }
            | DecodeError::MalformedXml { .. }
            | DecodeError::InvalidJson { .. }
            | DecodeError::UnexpectedJson { .. } => ErrorKind::UnexpectedNodeShape,
            _ => ErrorKind::MalformedValue,
        }
    }

    pub(crate) fn missing_attribute(node: &str, attribute: &'static str) -> Self {
        DecodeError::MissingAttribute {
            node: node.to_string(),
            attribute,
        }
    }
}

/// Error while encoding to the edit-API wire format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} is not a finite number: {value}")]
    NonFiniteFloat { field: &'static str, value: f64 },

    #[error("value snak for {property} has no value")]
    MissingValue { property: PropertyId },

    #[error("invalid claim: {0}")]
    Invalid(#[from] ValidationError),
}

/// Error during structural or schema validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("claim property {claim} differs from mainsnak property {mainsnak}")]
    MainsnakPropertyMismatch {
        claim: PropertyId,
        mainsnak: PropertyId,
    },

    #[error("value for {property} is a {found}, datatype is {expected}")]
    TypeMismatch {
        property: PropertyId,
        expected: DataType,
        found: DataType,
    },

    #[error("{snak_type} snak for {property} carries a value")]
    UnexpectedValue {
        property: PropertyId,
        snak_type: &'static str,
    },

    #[error("invalid value for {property}: {reason}")]
    InvalidValue {
        property: PropertyId,
        reason: &'static str,
    },

    #[error("datatype mismatch for {property}: schema says {schema}, snak declares {declared}")]
    DataTypeInconsistent {
        property: PropertyId,
        schema: DataType,
        declared: DataType,
    },
}
