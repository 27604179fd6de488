//! Claims, qualifiers and reference groups.

use rustc_hash::FxHashMap;

use crate::error::DecodeError;
use crate::model::{ItemId, PropertyId, Snak, Value};
use crate::model::id::statement_subject;

/// Rank of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

impl Rank {
    /// Parses a rank. Matching is case-sensitive: `Normal` is rejected.
    pub fn from_wire(raw: &str) -> Result<Self, DecodeError> {
        match raw {
            "preferred" => Ok(Rank::Preferred),
            "normal" => Ok(Rank::Normal),
            "deprecated" => Ok(Rank::Deprecated),
            _ => Err(DecodeError::UnrecognizedRank {
                value: raw.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Preferred => "preferred",
            Rank::Normal => "normal",
            Rank::Deprecated => "deprecated",
        }
    }
}

/// Qualifier values grouped by property.
///
/// Properties keep the order in which they first appeared; values keep
/// insertion order within their property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Qualifiers {
    entries: Vec<(PropertyId, Vec<Value>)>,
    indices: FxHashMap<PropertyId, usize>,
}

impl Qualifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `property`.
    pub fn push(&mut self, property: PropertyId, value: Value) {
        if let Some(&idx) = self.indices.get(&property) {
            self.entries[idx].1.push(value);
        } else {
            let idx = self.entries.len();
            self.indices.insert(property.clone(), idx);
            self.entries.push((property, vec![value]));
        }
    }

    /// Returns the values recorded for `property`.
    pub fn get(&self, property: &PropertyId) -> Option<&[Value]> {
        self.indices
            .get(property)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Iterates over property groups in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyId, &[Value])> {
        self.entries.iter().map(|(p, values)| (p, values.as_slice()))
    }

    /// Properties in first-appearance order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyId> {
        self.entries.iter().map(|(p, _)| p)
    }

    /// Number of distinct properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One reference: a set of snaks.
///
/// Duplicate snaks collapse on insert. Equality ignores snak order and the
/// read-side `hash`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGroup {
    /// Hash assigned by the repository, if the group was read from it.
    pub hash: Option<String>,
    snaks: Vec<Snak>,
}

impl ReferenceGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a snak. Returns false if an equal snak was already present.
    pub fn insert(&mut self, snak: Snak) -> bool {
        if self.snaks.contains(&snak) {
            return false;
        }
        self.snaks.push(snak);
        true
    }

    pub fn contains(&self, snak: &Snak) -> bool {
        self.snaks.contains(snak)
    }

    /// Snaks in insertion order.
    pub fn snaks(&self) -> &[Snak] {
        &self.snaks
    }

    pub fn len(&self) -> usize {
        self.snaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snaks.is_empty()
    }

    /// Groups the snaks by property, properties in first-seen order and
    /// snaks in insertion order within each property.
    pub fn by_property(&self) -> Vec<(&PropertyId, Vec<&Snak>)> {
        let mut groups: Vec<(&PropertyId, Vec<&Snak>)> = Vec::new();
        let mut indices: FxHashMap<&PropertyId, usize> = FxHashMap::default();
        for snak in &self.snaks {
            if let Some(&idx) = indices.get(&snak.property) {
                groups[idx].1.push(snak);
            } else {
                indices.insert(&snak.property, groups.len());
                groups.push((&snak.property, vec![snak]));
            }
        }
        groups
    }
}

impl PartialEq for ReferenceGroup {
    fn eq(&self, other: &Self) -> bool {
        self.snaks.len() == other.snaks.len() && self.snaks.iter().all(|s| other.contains(s))
    }
}

impl FromIterator<Snak> for ReferenceGroup {
    fn from_iter<I: IntoIterator<Item = Snak>>(iter: I) -> Self {
        let mut group = ReferenceGroup::new();
        for snak in iter {
            group.insert(snak);
        }
        group
    }
}

/// A statement about an entity.
#[derive(Debug, Clone)]
pub struct Claim {
    /// Statement id, e.g. `Q42$5627445f-43cb-ed6d-3adb-760e85bd17ee`.
    pub id: String,
    pub rank: Rank,
    /// Type tag, normally `statement`.
    pub claim_type: String,
    /// Always equal to `mainsnak.property`.
    pub property: PropertyId,
    pub mainsnak: Snak,
    pub qualifiers: Qualifiers,
    /// Reference groups; no two are equal.
    pub references: Vec<ReferenceGroup>,
}

impl Claim {
    /// Creates a normal-rank statement around `mainsnak`.
    pub fn new(id: impl Into<String>, mainsnak: Snak) -> Self {
        Self {
            id: id.into(),
            rank: Rank::Normal,
            claim_type: "statement".to_string(),
            property: mainsnak.property.clone(),
            mainsnak,
            qualifiers: Qualifiers::new(),
            references: Vec::new(),
        }
    }

    /// Appends a qualifier value.
    pub fn add_qualifier(&mut self, property: PropertyId, value: Value) {
        self.qualifiers.push(property, value);
    }

    /// Adds a reference group. Returns false if an equal group was present.
    pub fn add_reference(&mut self, group: ReferenceGroup) -> bool {
        if self.references.contains(&group) {
            return false;
        }
        self.references.push(group);
        true
    }

    /// Returns the main value, if any.
    pub fn value(&self) -> Option<&Value> {
        self.mainsnak.value.as_ref()
    }

    /// Returns the entity this statement is about, derived from its id.
    pub fn subject(&self) -> Option<ItemId> {
        statement_subject(&self.id)
    }
}

impl PartialEq for Claim {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.rank == other.rank
            && self.claim_type == other.claim_type
            && self.property == other.property
            && self.mainsnak == other.mainsnak
            && self.qualifiers == other.qualifiers
            && self.references.len() == other.references.len()
            && self.references.iter().all(|g| other.references.contains(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;

    fn string_snak(property: u64, text: &str) -> Snak {
        Snak::new(
            PropertyId::from_numeric(property),
            DataType::String,
            Value::String(text.to_string()),
        )
    }

    #[test]
    fn test_rank_is_case_sensitive() {
        assert_eq!(Rank::from_wire("preferred").unwrap(), Rank::Preferred);
        assert_eq!(Rank::from_wire("deprecated").unwrap().as_str(), "deprecated");
        assert!(Rank::from_wire("Normal").is_err());
        assert!(Rank::from_wire("").is_err());
    }

    #[test]
    fn test_qualifier_ordering() {
        let p1 = PropertyId::from_numeric(1);
        let p2 = PropertyId::from_numeric(2);
        let mut qualifiers = Qualifiers::new();
        qualifiers.push(p2.clone(), Value::String("a".into()));
        qualifiers.push(p1.clone(), Value::String("b".into()));
        qualifiers.push(p2.clone(), Value::String("c".into()));

        let order: Vec<_> = qualifiers.properties().cloned().collect();
        assert_eq!(order, vec![p2.clone(), p1.clone()]);
        assert_eq!(
            qualifiers.get(&p2).unwrap(),
            &[Value::String("a".into()), Value::String("c".into())]
        );
        assert_eq!(qualifiers.len(), 2);
    }

    #[test]
    fn test_reference_group_is_a_set() {
        let mut group = ReferenceGroup::new();
        assert!(group.insert(string_snak(1, "x")));
        assert!(!group.insert(string_snak(1, "x")));
        assert!(group.insert(string_snak(2, "y")));
        assert_eq!(group.len(), 2);

        let reversed: ReferenceGroup = [string_snak(2, "y"), string_snak(1, "x")].into_iter().collect();
        assert_eq!(group, reversed);
    }

    #[test]
    fn test_reference_group_by_property() {
        let group: ReferenceGroup = [
            string_snak(854, "a"),
            string_snak(813, "b"),
            string_snak(854, "c"),
        ]
        .into_iter()
        .collect();

        let grouped = group.by_property();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0.as_str(), "P854");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0.as_str(), "P813");
    }

    #[test]
    fn test_claim_references_dedupe() {
        let mut claim = Claim::new("Q1$abc", string_snak(10, "v"));
        assert_eq!(claim.property, PropertyId::from_numeric(10));
        assert_eq!(claim.subject(), Some(ItemId::from_numeric(1)));

        let group: ReferenceGroup = [string_snak(1, "x")].into_iter().collect();
        assert!(claim.add_reference(group.clone()));
        assert!(!claim.add_reference(group));
        assert_eq!(claim.references.len(), 1);
    }

    #[test]
    fn test_claim_equality_ignores_reference_order() {
        let a: ReferenceGroup = [string_snak(1, "x")].into_iter().collect();
        let b: ReferenceGroup = [string_snak(2, "y")].into_iter().collect();

        let mut one = Claim::new("Q1$abc", string_snak(10, "v"));
        one.add_reference(a.clone());
        one.add_reference(b.clone());

        let mut two = Claim::new("Q1$abc", string_snak(10, "v"));
        two.add_reference(b);
        two.add_reference(a);

        assert_eq!(one, two);
    }
}
