//! Reading and writing Wikibase statements.
//!
//! - [`claim`], [`snak`], [`value`]: decoding from attribute-tagged trees
//! - [`wire`]: encoding to the edit-API JSON notation
//! - [`json`]: decoding the same JSON notation back

pub mod claim;
pub mod json;
pub mod primitives;
pub mod snak;
pub mod value;
pub mod wire;

pub use claim::{decode_claim, decode_claims};
pub use json::{decode_claim_json, decode_reference_json, decode_snak_json, decode_value_json};
pub use primitives::NodeReader;
pub use snak::{decode_snak, DecodeOptions, Decoder};
pub use value::decode_value;
pub use wire::{
    claim_to_json, encode_claim, encode_claim_with_options, encode_reference, encode_snak,
    encode_value, encode_value_with_options, snak_to_json, value_to_json, EncodeOptions,
};
