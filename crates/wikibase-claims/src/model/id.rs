//! Wikibase identifiers.
//!
//! Properties (`P…`) and items (`Q…`) are validated and normalized when they
//! are constructed: the prefix is accepted in either case and always rendered
//! uppercase, and the numeric part must fit in a `u64`. Statement ids are
//! opaque strings of the form `Q42$<guid>`.

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::error::DecodeError;

/// Concept URI prefix of Wikidata entities.
pub const WIKIDATA_ENTITY_PREFIX: &str = "http://www.wikidata.org/entity/";

lazy_static! {
    static ref PROPERTY_ID: Regex = Regex::new(r"^[Pp]([0-9]+)$").unwrap();
    static ref ITEM_ID: Regex = Regex::new(r"^[Qq]([0-9]+)$").unwrap();
}

fn parse_numeric(kind: &'static str, raw: &str, digits: &str) -> Result<u64, DecodeError> {
    digits.parse().map_err(|_| DecodeError::InvalidIdentifier {
        kind,
        value: raw.to_string(),
    })
}

/// Parses the `P…` form of a property id into its number.
pub(crate) fn parse_property_number(raw: &str) -> Result<u64, DecodeError> {
    match PROPERTY_ID.captures(raw) {
        Some(caps) => parse_numeric("property", raw, &caps[1]),
        None => Err(DecodeError::InvalidIdentifier {
            kind: "property",
            value: raw.to_string(),
        }),
    }
}

/// Parses a bare `numeric-id` attribute.
pub(crate) fn parse_numeric_id(kind: &'static str, raw: &str) -> Result<u64, DecodeError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidIdentifier {
            kind,
            value: raw.to_string(),
        });
    }
    parse_numeric(kind, raw, raw)
}

/// A property identifier such as `P31`.
///
/// The canonical text is shared behind an `Arc`, so clones handed out by a
/// [`PropertyRegistry`](crate::model::PropertyRegistry) point at the same
/// allocation. Equality, ordering and hashing are by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId {
    number: u64,
    text: Arc<str>,
}

impl PropertyId {
    /// Parses and normalizes a property id (`p31` becomes `P31`).
    pub fn new(raw: &str) -> Result<Self, DecodeError> {
        parse_property_number(raw).map(Self::from_numeric)
    }

    /// Creates a property id from its number.
    pub fn from_numeric(number: u64) -> Self {
        Self {
            number,
            text: Arc::from(format!("P{number}")),
        }
    }

    /// Returns the numeric part.
    pub fn numeric_id(&self) -> u64 {
        self.number
    }

    /// Returns the canonical `P…` form.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if both ids share one allocation.
    pub fn same_instance(&self, other: &PropertyId) -> bool {
        Arc::ptr_eq(&self.text, &other.text)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for PropertyId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// An item identifier such as `Q42`.
///
/// Used for item values and for globe, unit and calendar-model references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Parses and normalizes an item id (`q42` becomes `Q42`).
    pub fn new(raw: &str) -> Result<Self, DecodeError> {
        match ITEM_ID.captures(raw) {
            Some(caps) => parse_numeric("item", raw, &caps[1]).map(ItemId),
            None => Err(DecodeError::InvalidIdentifier {
                kind: "item",
                value: raw.to_string(),
            }),
        }
    }

    /// Creates an item id from its number.
    pub const fn from_numeric(number: u64) -> Self {
        ItemId(number)
    }

    /// Returns the numeric part.
    pub fn numeric_id(&self) -> u64 {
        self.0
    }

    /// Recovers an item from a concept URI such as
    /// `http://www.wikidata.org/entity/Q2`.
    ///
    /// Returns `None` when the URI starts with none of `prefixes` or the
    /// remainder is not an item id.
    pub fn from_entity_uri<S: AsRef<str>>(uri: &str, prefixes: &[S]) -> Option<Self> {
        prefixes
            .iter()
            .find_map(|prefix| uri.strip_prefix(prefix.as_ref()))
            .and_then(|rest| ItemId::new(rest).ok())
    }

    /// Renders the concept URI of this item under `base`.
    pub fn entity_uri(&self, base: &str) -> String {
        format!("{base}{self}")
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Well-known items referenced by the value model.
pub mod items {
    use super::ItemId;

    /// Earth, the default globe of coordinates.
    pub const EARTH: ItemId = ItemId::from_numeric(2);
    /// Proleptic Gregorian calendar.
    pub const GREGORIAN_CALENDAR: ItemId = ItemId::from_numeric(1985727);
    /// Proleptic Julian calendar.
    pub const JULIAN_CALENDAR: ItemId = ItemId::from_numeric(1985786);
}

/// Generates a fresh statement id for a claim on `subject`.
///
/// The edit API expects client-generated ids of the form
/// `Q42$5627445f-43cb-ed6d-3adb-760e85bd17ee` when a claim is created with
/// `wbsetclaim`.
pub fn new_statement_guid(subject: &ItemId) -> String {
    format!("{}${}", subject, Uuid::new_v4())
}

/// Extracts the subject item from a statement id.
pub fn statement_subject(statement_id: &str) -> Option<ItemId> {
    let (subject, guid) = statement_id.split_once('$')?;
    if guid.is_empty() {
        return None;
    }
    ItemId::new(subject).ok()
}
