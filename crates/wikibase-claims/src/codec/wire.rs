//! Edit-API wire encoding.
//!
//! Produces the compact JSON consumed by `wbcreateclaim` (`value=`),
//! `wbsetqualifier` (`value=`), `wbsetreference` (`snaks=`) and `wbsetclaim`
//! (`claim=`). Output is deterministic: object members appear in insertion
//! order and snaks are grouped by property in first-seen order.
//! Percent-encoding is left to the transport.

use serde_json::{json, Map, Value as Json};

use crate::codec::primitives::format_amount;
use crate::error::EncodeError;
use crate::model::id::{items, WIKIDATA_ENTITY_PREFIX};
use crate::model::{Claim, ItemId, ReferenceGroup, Snak, SnakType, Value};
use crate::validate::validate_claim;

/// Options for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Prefix of concept URIs written for globes, units and calendar models.
    pub concept_base: String,
    /// Globe written for coordinates without one.
    pub default_globe: ItemId,
    /// Calendar model written for times without one.
    pub default_calendar: ItemId,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            concept_base: WIKIDATA_ENTITY_PREFIX.to_string(),
            default_globe: items::EARTH,
            default_calendar: items::GREGORIAN_CALENDAR,
        }
    }
}

impl EncodeOptions {
    /// Creates default options (Wikidata, Earth, proleptic Gregorian).
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes concept URIs under another base.
    pub fn with_concept_base(mut self, base: impl Into<String>) -> Self {
        self.concept_base = base.into();
        self
    }
}

fn number(field: &'static str, value: f64) -> Result<Json, EncodeError> {
    serde_json::Number::from_f64(value)
        .map(Json::Number)
        .ok_or(EncodeError::NonFiniteFloat { field, value })
}

fn amount(field: &'static str, value: f64) -> Result<Json, EncodeError> {
    if !value.is_finite() {
        return Err(EncodeError::NonFiniteFloat { field, value });
    }
    Ok(Json::String(format_amount(value)))
}

/// Converts a value to its wire JSON (the `value` member of a datavalue).
pub fn value_to_json(value: &Value, options: &EncodeOptions) -> Result<Json, EncodeError> {
    Ok(match value {
        Value::Item(item) => json!({
            "entity-type": "item",
            "numeric-id": item.numeric_id(),
            "id": item.to_string(),
        }),
        Value::Property(property) => json!({
            "entity-type": "property",
            "numeric-id": property.numeric_id(),
            "id": property.as_str(),
        }),
        Value::CommonsMedia(s) | Value::String(s) => Json::String(s.clone()),
        Value::Url(url) => Json::String(url.to_string()),
        Value::MonolingualText { language, text } => json!({
            "text": text,
            "language": language,
        }),
        Value::Time(time) => {
            let calendar = match &time.calendar_model {
                Some(url) => url.to_string(),
                None => options.default_calendar.entity_uri(&options.concept_base),
            };
            json!({
                "time": time.to_wire_string(),
                "timezone": time.timezone,
                "before": time.before,
                "after": time.after,
                "precision": time.precision.as_u8(),
                "calendarmodel": calendar,
            })
        }
        Value::GlobeCoordinate(c) => {
            let precision = match c.precision {
                Some(p) => number("precision", p)?,
                None => Json::Null,
            };
            json!({
                "latitude": number("latitude", c.latitude)?,
                "longitude": number("longitude", c.longitude)?,
                "altitude": Json::Null,
                "precision": precision,
                "globe": c.globe.unwrap_or(options.default_globe).entity_uri(&options.concept_base),
            })
        }
        Value::Quantity(q) => {
            let unit = match q.unit {
                Some(unit) => unit.entity_uri(&options.concept_base),
                None => "1".to_string(),
            };
            json!({
                "amount": amount("amount", q.amount)?,
                "unit": unit,
                "upperBound": amount("upperBound", q.upper_bound)?,
                "lowerBound": amount("lowerBound", q.lower_bound)?,
            })
        }
    })
}

/// Encodes a value with default options.
pub fn encode_value(value: &Value) -> Result<String, EncodeError> {
    encode_value_with_options(value, &EncodeOptions::default())
}

/// Encodes a value with the given options.
pub fn encode_value_with_options(
    value: &Value,
    options: &EncodeOptions,
) -> Result<String, EncodeError> {
    Ok(value_to_json(value, options)?.to_string())
}

/// Converts a snak to its wire JSON.
///
/// The declared datatype is written as is; a value snak without a value
/// cannot be encoded.
pub fn snak_to_json(snak: &Snak, options: &EncodeOptions) -> Result<Json, EncodeError> {
    let mut object = Map::new();
    object.insert("snaktype".into(), snak.snak_type.as_str().into());
    object.insert("property".into(), snak.property.as_str().into());
    if snak.snak_type == SnakType::Value {
        let value = snak.value.as_ref().ok_or_else(|| EncodeError::MissingValue {
            property: snak.property.clone(),
        })?;
        let value_type = snak
            .datatype
            .value_type()
            .unwrap_or_else(|| value.data_type().value_type().unwrap_or("string"));
        object.insert(
            "datavalue".into(),
            json!({
                "value": value_to_json(value, options)?,
                "type": value_type,
            }),
        );
    }
    object.insert("datatype".into(), snak.datatype.as_str().into());
    Ok(Json::Object(object))
}

/// Encodes a snak with default options.
pub fn encode_snak(snak: &Snak) -> Result<String, EncodeError> {
    Ok(snak_to_json(snak, &EncodeOptions::default())?.to_string())
}

/// Groups snaks by property: `{"P1": [snak, ...], ...}` in first-seen order.
fn snaks_by_property<'a>(
    groups: impl IntoIterator<Item = (&'a str, Vec<&'a Snak>)>,
    options: &EncodeOptions,
) -> Result<(Json, Json), EncodeError> {
    let mut snaks = Map::new();
    let mut order = Vec::new();
    for (property, group) in groups {
        let list = group
            .into_iter()
            .map(|snak| snak_to_json(snak, options))
            .collect::<Result<Vec<_>, _>>()?;
        snaks.insert(property.to_string(), Json::Array(list));
        order.push(Json::String(property.to_string()));
    }
    Ok((Json::Object(snaks), Json::Array(order)))
}

fn reference_to_json(group: &ReferenceGroup, options: &EncodeOptions) -> Result<Json, EncodeError> {
    let (snaks, order) = snaks_by_property(
        group.by_property().into_iter().map(|(p, s)| (p.as_str(), s)),
        options,
    )?;
    let mut object = Map::new();
    if let Some(hash) = &group.hash {
        object.insert("hash".into(), Json::String(hash.clone()));
    }
    object.insert("snaks".into(), snaks);
    object.insert("snaks-order".into(), order);
    Ok(Json::Object(object))
}

/// Encodes a reference group as the `snaks` parameter of `wbsetreference`.
pub fn encode_reference(group: &ReferenceGroup) -> Result<String, EncodeError> {
    let (snaks, _) = snaks_by_property(
        group.by_property().into_iter().map(|(p, s)| (p.as_str(), s)),
        &EncodeOptions::default(),
    )?;
    Ok(snaks.to_string())
}

/// Converts a claim to its wire JSON after validating it.
pub fn claim_to_json(claim: &Claim, options: &EncodeOptions) -> Result<Json, EncodeError> {
    validate_claim(claim)?;

    let mut object = Map::new();
    object.insert("id".into(), Json::String(claim.id.clone()));
    object.insert("type".into(), Json::String(claim.claim_type.clone()));
    object.insert("mainsnak".into(), snak_to_json(&claim.mainsnak, options)?);
    object.insert("rank".into(), claim.rank.as_str().into());

    if !claim.qualifiers.is_empty() {
        let groups: Vec<(&str, Vec<Snak>)> = claim
            .qualifiers
            .iter()
            .map(|(property, values)| {
                let snaks = values
                    .iter()
                    .map(|v| Snak::new(property.clone(), v.data_type(), v.clone()))
                    .collect();
                (property.as_str(), snaks)
            })
            .collect();
        let (qualifiers, order) = snaks_by_property(
            groups.iter().map(|(property, snaks)| (*property, snaks.iter().collect())),
            options,
        )?;
        object.insert("qualifiers".into(), qualifiers);
        object.insert("qualifiers-order".into(), order);
    }

    if !claim.references.is_empty() {
        let references = claim
            .references
            .iter()
            .map(|group| reference_to_json(group, options))
            .collect::<Result<Vec<_>, _>>()?;
        object.insert("references".into(), Json::Array(references));
    }

    Ok(Json::Object(object))
}

/// Encodes a claim as the `claim` parameter of `wbsetclaim`.
pub fn encode_claim(claim: &Claim) -> Result<String, EncodeError> {
    encode_claim_with_options(claim, &EncodeOptions::default())
}

/// Encodes a claim with the given options.
pub fn encode_claim_with_options(
    claim: &Claim,
    options: &EncodeOptions,
) -> Result<String, EncodeError> {
    Ok(claim_to_json(claim, options)?.to_string())
}
