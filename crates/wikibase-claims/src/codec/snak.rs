//! Snak decoding.

use tracing::debug;

use crate::codec::primitives::NodeReader;
use crate::codec::value::decode_value;
use crate::error::DecodeError;
use crate::model::id::WIKIDATA_ENTITY_PREFIX;
use crate::model::{DataType, PropertyRegistry, PropertyResolver, Snak, SnakType};
use crate::tree::Node;

/// Options for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Concept URI prefixes under which globe and unit URIs are recognized.
    pub entity_prefixes: Vec<String>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            entity_prefixes: vec![
                WIKIDATA_ENTITY_PREFIX.to_string(),
                "https://www.wikidata.org/entity/".to_string(),
            ],
        }
    }
}

impl DecodeOptions {
    /// Creates default options (Wikidata concept URIs).
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognizes entity URIs of another Wikibase installation as well.
    pub fn with_entity_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.entity_prefixes.push(prefix.into());
        self
    }
}

/// Stateful decoder for snaks and claims.
///
/// Owns the property resolver for one decoding session, so all properties
/// decoded through the same decoder share instances. Use
/// `Decoder::with_resolver(&shared)` to share a
/// [`SharedPropertyRegistry`](crate::model::SharedPropertyRegistry) between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder<R = PropertyRegistry> {
    pub(crate) resolver: R,
    pub(crate) options: DecodeOptions,
}

impl Decoder<PropertyRegistry> {
    /// Creates a decoder with a fresh session registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: PropertyResolver> Decoder<R> {
    /// Creates a decoder around an existing resolver.
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            options: DecodeOptions::default(),
        }
    }

    /// Replaces the decode options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Consumes the decoder, returning its resolver.
    pub fn into_resolver(self) -> R {
        self.resolver
    }

    /// Decodes one snak node (`mainsnak`, `qualifiers`, `snaks`, ...).
    ///
    /// The node name is not checked. A missing `datatype` is kept as an
    /// empty unknown datatype, so the snak comes back without a value.
    pub fn decode_snak<N: Node>(&mut self, node: &N) -> Result<Snak, DecodeError> {
        let reader = NodeReader::new(node.clone());
        let property = self.resolver.resolve(reader.required("property")?)?;
        let datatype = match reader.optional("datatype") {
            Some(tag) => DataType::from_wire(tag),
            None => {
                debug!(property = %property, "snak without datatype");
                DataType::Other(String::new())
            }
        };
        let snak_type = match reader.optional("snaktype") {
            Some(raw) => SnakType::from_wire(raw)?,
            None => SnakType::Value,
        };

        let value = match snak_type {
            SnakType::Value => decode_value(node, &datatype, &mut self.resolver, &self.options)?,
            SnakType::SomeValue | SnakType::NoValue => None,
        };

        Ok(Snak {
            property,
            datatype,
            snak_type,
            value,
        })
    }
}

/// Decodes one snak node with a throwaway registry and default options.
pub fn decode_snak<N: Node>(node: &N) -> Result<Snak, DecodeError> {
    Decoder::new().decode_snak(node)
}
