//! Builder API for constructing new claims.
//!
//! # Example
//!
//! ```rust
//! use wikibase_claims::model::builder::ClaimBuilder;
//! use wikibase_claims::{DataType, ItemId, PropertyId, Rank, Snak, Value};
//!
//! let subject = ItemId::new("Q42").unwrap();
//! let p31 = PropertyId::new("P31").unwrap();
//! let human = Value::Item(ItemId::new("Q5").unwrap());
//!
//! let claim = ClaimBuilder::new(&subject, Snak::new(p31, DataType::Item, human))
//!     .rank(Rank::Preferred)
//!     .qualifier(PropertyId::new("P580").unwrap(), Value::String("x".into()))
//!     .reference(|r| r.url(PropertyId::new("P854").unwrap(), "https://example.org/").unwrap())
//!     .build();
//!
//! assert!(claim.id.starts_with("Q42$"));
//! assert_eq!(claim.references.len(), 1);
//! ```

use crate::error::DecodeError;
use crate::model::id::new_statement_guid;
use crate::model::{
    Claim, DataType, ItemId, PropertyId, Qualifiers, Rank, ReferenceGroup, Snak, Value,
};

/// Builder for a [`Claim`].
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    id: String,
    rank: Rank,
    claim_type: String,
    mainsnak: Snak,
    qualifiers: Qualifiers,
    references: Vec<ReferenceGroup>,
}

impl ClaimBuilder {
    /// Starts a statement on `subject` with a freshly generated id.
    pub fn new(subject: &ItemId, mainsnak: Snak) -> Self {
        Self::with_id(new_statement_guid(subject), mainsnak)
    }

    /// Starts a statement with an explicit id.
    pub fn with_id(id: impl Into<String>, mainsnak: Snak) -> Self {
        Self {
            id: id.into(),
            rank: Rank::Normal,
            claim_type: "statement".to_string(),
            mainsnak,
            qualifiers: Qualifiers::new(),
            references: Vec::new(),
        }
    }

    /// Sets the rank.
    pub fn rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    /// Sets the type tag.
    pub fn claim_type(mut self, claim_type: impl Into<String>) -> Self {
        self.claim_type = claim_type.into();
        self
    }

    /// Appends a qualifier value.
    pub fn qualifier(mut self, property: PropertyId, value: Value) -> Self {
        self.qualifiers.push(property, value);
        self
    }

    /// Adds a reference group using a builder function.
    pub fn reference<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ReferenceBuilder) -> ReferenceBuilder,
    {
        let group = f(ReferenceBuilder::new()).build();
        if !self.references.contains(&group) {
            self.references.push(group);
        }
        self
    }

    /// Adds an already built reference group.
    pub fn reference_group(mut self, group: ReferenceGroup) -> Self {
        if !self.references.contains(&group) {
            self.references.push(group);
        }
        self
    }

    /// Builds the claim.
    pub fn build(self) -> Claim {
        let mut claim = Claim::new(self.id, self.mainsnak);
        claim.rank = self.rank;
        claim.claim_type = self.claim_type;
        claim.qualifiers = self.qualifiers;
        claim.references = self.references;
        claim
    }
}

/// Builder for a [`ReferenceGroup`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    group: ReferenceGroup,
}

impl ReferenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a snak.
    pub fn snak(mut self, snak: Snak) -> Self {
        self.group.insert(snak);
        self
    }

    /// Adds a `wikibase-item` snak.
    pub fn item(self, property: PropertyId, item: ItemId) -> Self {
        self.snak(Snak::new(property, DataType::Item, Value::Item(item)))
    }

    /// Adds a `string` snak.
    pub fn string(self, property: PropertyId, value: impl Into<String>) -> Self {
        self.snak(Snak::new(property, DataType::String, Value::String(value.into())))
    }

    /// Adds a `url` snak, failing if `url` is not an absolute URL.
    pub fn url(self, property: PropertyId, url: &str) -> Result<Self, DecodeError> {
        let value = Value::url(url)?;
        Ok(self.snak(Snak::new(property, DataType::Url, value)))
    }

    /// Builds the group.
    pub fn build(self) -> ReferenceGroup {
        self.group
    }
}
