//! Property de-duplication.
//!
//! A registry hands out one shared [`PropertyId`] per canonical id, so every
//! snak, qualifier group and reference grouping decoded in a session points
//! at the same allocation. Sharing is an optimization: ids compare by value.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::DecodeError;
use crate::model::id::parse_property_number;
use crate::model::PropertyId;

/// Resolves raw property strings to (possibly shared) property ids.
pub trait PropertyResolver {
    /// Normalizes and validates `raw`, returning the canonical property.
    fn resolve(&mut self, raw: &str) -> Result<PropertyId, DecodeError>;

    /// Returns the canonical property for a known number.
    fn resolve_numeric(&mut self, number: u64) -> PropertyId;
}

impl<R: PropertyResolver + ?Sized> PropertyResolver for &mut R {
    fn resolve(&mut self, raw: &str) -> Result<PropertyId, DecodeError> {
        (**self).resolve(raw)
    }

    fn resolve_numeric(&mut self, number: u64) -> PropertyId {
        (**self).resolve_numeric(number)
    }
}

/// Session-scoped registry, usually owned by one [`Decoder`](crate::codec::Decoder).
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    interned: FxHashMap<u64, PropertyId>,
}

impl PropertyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared instance for `raw` if it was resolved before.
    pub fn get(&self, raw: &str) -> Option<&PropertyId> {
        let number = parse_property_number(raw).ok()?;
        self.interned.get(&number)
    }

    /// Number of distinct properties seen.
    pub fn len(&self) -> usize {
        self.interned.len()
    }

    /// Returns true if nothing was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }
}

impl PropertyResolver for PropertyRegistry {
    fn resolve(&mut self, raw: &str) -> Result<PropertyId, DecodeError> {
        let number = parse_property_number(raw)?;
        Ok(self.resolve_numeric(number))
    }

    fn resolve_numeric(&mut self, number: u64) -> PropertyId {
        self.interned
            .entry(number)
            .or_insert_with(|| PropertyId::from_numeric(number))
            .clone()
    }
}

/// Process-wide registry that can be shared between threads.
///
/// Lookups take a read lock; only the first sighting of a property takes the
/// write lock. Use `&SharedPropertyRegistry` as the resolver of each
/// per-thread decoder.
#[derive(Debug, Default)]
pub struct SharedPropertyRegistry {
    inner: RwLock<PropertyRegistry>,
}

impl SharedPropertyRegistry {
    /// Creates an empty shared registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `raw` through the shared map.
    pub fn resolve(&self, raw: &str) -> Result<PropertyId, DecodeError> {
        let number = parse_property_number(raw)?;
        Ok(self.resolve_numeric(number))
    }

    /// Resolves a property number through the shared map.
    pub fn resolve_numeric(&self, number: u64) -> PropertyId {
        if let Some(existing) = self.inner.read().interned.get(&number) {
            return existing.clone();
        }
        self.inner.write().resolve_numeric(number)
    }

    /// Number of distinct properties seen.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if nothing was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl PropertyResolver for &SharedPropertyRegistry {
    fn resolve(&mut self, raw: &str) -> Result<PropertyId, DecodeError> {
        SharedPropertyRegistry::resolve(self, raw)
    }

    fn resolve_numeric(&mut self, number: u64) -> PropertyId {
        SharedPropertyRegistry::resolve_numeric(self, number)
    }
}
