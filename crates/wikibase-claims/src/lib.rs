//! Wikibase claims: decoding statement trees and encoding edit-API JSON.
//!
//! This crate reads the claims of a Wikibase entity (as returned by
//! `wbgetentities`) into a typed model, and writes claims back in the JSON
//! notation the edit API accepts.
//!
//! # Overview
//!
//! - **Typed values**: items, properties, strings, URLs, monolingual text,
//!   times, globe coordinates and quantities
//! - **Interned properties**: a [`PropertyRegistry`] gives every property id
//!   one shared instance per decoding session
//! - **Tolerant reads**: unknown datatypes and partial snaks come back as
//!   unresolved snaks instead of failing the whole claim
//!
//! # Quick Start
//!
//! ```rust
//! use wikibase_claims::tree::Element;
//! use wikibase_claims::{decode_claim, encode_claim, ItemId, Rank, Value};
//!
//! let claim = Element::new("claim")
//!     .attr("id", "Q42$F078E5B3-F9A8-480E-B7AC-D97778CBBEF9")
//!     .attr("rank", "normal")
//!     .attr("type", "statement")
//!     .with_child(
//!         Element::new("mainsnak")
//!             .attr("snaktype", "value")
//!             .attr("property", "P31")
//!             .attr("datatype", "wikibase-item")
//!             .with_child(
//!                 Element::new("datavalue").attr("type", "wikibase-entityid").with_child(
//!                     Element::new("value")
//!                         .attr("entity-type", "item")
//!                         .attr("numeric-id", "5"),
//!                 ),
//!             ),
//!     );
//!
//! let decoded = decode_claim(&claim.as_node()).unwrap();
//! assert_eq!(decoded.rank, Rank::Normal);
//! assert_eq!(decoded.value(), Some(&Value::Item(ItemId::from_numeric(5))));
//!
//! let json = encode_claim(&decoded).unwrap();
//! assert!(json.starts_with(r#"{"id":"Q42$F078E5B3-F9A8-480E-B7AC-D97778CBBEF9""#));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Core data types (Claim, Snak, Value, ids, registry, builders)
//! - [`codec`]: Tree decoding, JSON encoding and JSON decoding
//! - [`tree`]: The node abstraction the decoder reads, plus an owned tree
//! - [`validate`]: Semantic validation
//! - [`error`]: Error types
//! - [`util`]: Wire time parsing and formatting
//!
//! # Features
//!
//! - `xml` (default): [`tree::Element::parse_xml`] for raw `wbgetentities`
//!   XML responses

pub mod codec;
pub mod error;
pub mod model;
pub mod tree;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    decode_claim, decode_claim_json, decode_claims, decode_reference_json, decode_snak,
    decode_snak_json, decode_value, decode_value_json, encode_claim, encode_claim_with_options,
    encode_reference, encode_snak, encode_value, DecodeOptions, Decoder, EncodeOptions,
};
pub use error::{DecodeError, EncodeError, ErrorKind, ValidationError};
pub use model::{
    Claim, ClaimBuilder, DataType, Era, GlobeCoordinate, ItemId, PropertyId, PropertyRegistry,
    PropertyResolver, Quantity, Qualifiers, Rank, ReferenceBuilder, ReferenceGroup,
    SharedPropertyRegistry, Snak, SnakType, Time, TimePrecision, Value,
};
pub use model::id::{new_statement_guid, statement_subject, WIKIDATA_ENTITY_PREFIX};
pub use tree::{Element, Node};
pub use validate::{validate_claim, validate_claim_with_schema, validate_snak, validate_value, SchemaContext};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
