//! Data model types for Wikibase claims.
//!
//! - Identifiers (properties, items, statement ids)
//! - Values (typed snak payloads)
//! - Snaks and claims
//! - Property registry (shared property instances)
//! - Builders (ergonomic construction)

pub mod builder;
pub mod claim;
pub mod id;
pub mod registry;
pub mod snak;
pub mod value;

pub use builder::{ClaimBuilder, ReferenceBuilder};
pub use claim::{Claim, Qualifiers, Rank, ReferenceGroup};
pub use id::{items, new_statement_guid, statement_subject, ItemId, PropertyId, WIKIDATA_ENTITY_PREFIX};
pub use registry::{PropertyRegistry, PropertyResolver, SharedPropertyRegistry};
pub use snak::{Snak, SnakType};
pub use value::{DataType, Era, GlobeCoordinate, Quantity, Time, TimePrecision, Value};
