//! Decoding from the compact JSON notation.
//!
//! The edit API answers `format=json` requests with the same shapes the
//! encoder in [`wire`](crate::codec::wire) writes, so values, snaks and claims
//! can be read back from it. Tolerances match the tree decoder: unknown
//! datatypes give no value and a bad calendar model is dropped.

use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::codec::primitives::{parse_f64, parse_url};
use crate::codec::snak::Decoder;
use crate::codec::value::{calendar_model, entity_from_uri, time_precision, unit_from_uri};
use crate::error::DecodeError;
use crate::model::{
    Claim, DataType, GlobeCoordinate, ItemId, PropertyId, PropertyResolver, Qualifiers, Quantity,
    Rank, ReferenceGroup, Snak, SnakType, Time, Value,
};

type Object = Map<String, Json>;

fn parse(raw: &str) -> Result<Json, DecodeError> {
    serde_json::from_str(raw).map_err(|e| DecodeError::InvalidJson {
        reason: e.to_string(),
    })
}

fn as_object<'a>(json: &'a Json, context: &'static str) -> Result<&'a Object, DecodeError> {
    json.as_object().ok_or(DecodeError::UnexpectedJson {
        context,
        expected: "object",
    })
}

fn field<'a>(object: &'a Object, context: &str, key: &'static str) -> Result<&'a Json, DecodeError> {
    object
        .get(key)
        .ok_or_else(|| DecodeError::missing_attribute(context, key))
}

fn str_field<'a>(object: &'a Object, context: &str, key: &'static str) -> Result<&'a str, DecodeError> {
    field(object, context, key)?
        .as_str()
        .ok_or(DecodeError::UnexpectedJson {
            context: key,
            expected: "string",
        })
}

fn optional_str<'a>(object: &'a Object, key: &'static str) -> Result<Option<&'a str>, DecodeError> {
    match object.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s)),
        Some(_) => Err(DecodeError::UnexpectedJson {
            context: key,
            expected: "string",
        }),
    }
}

fn int_field(object: &Object, context: &str, key: &'static str) -> Result<i64, DecodeError> {
    let value = field(object, context, key)?;
    value.as_i64().ok_or_else(|| DecodeError::InvalidNumber {
        field: key,
        value: value.to_string(),
    })
}

fn tolerance(object: &Object, key: &'static str) -> Result<u32, DecodeError> {
    let raw = int_field(object, "value", key)?;
    u32::try_from(raw).map_err(|_| DecodeError::InvalidNumber {
        field: key,
        value: raw.to_string(),
    })
}

/// Reads a float written either as a JSON number or as a decimal string.
fn float_field(object: &Object, key: &'static str) -> Result<Option<f64>, DecodeError> {
    match object.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::Number(n)) => n.as_f64().map(Some).ok_or_else(|| DecodeError::InvalidNumber {
            field: key,
            value: n.to_string(),
        }),
        Some(Json::String(s)) => parse_f64(key, s).map(Some),
        Some(other) => Err(DecodeError::InvalidNumber {
            field: key,
            value: other.to_string(),
        }),
    }
}

fn required_float(object: &Object, key: &'static str) -> Result<f64, DecodeError> {
    float_field(object, key)?.ok_or_else(|| DecodeError::missing_attribute("value", key))
}

fn entity_number(object: &Object, kind: &'static str) -> Result<Option<u64>, DecodeError> {
    if let Some(found) = optional_str(object, "entity-type")? {
        if found != kind {
            return Err(DecodeError::UnexpectedEntityType {
                expected: kind,
                found: found.to_string(),
            });
        }
    }
    match object.get("numeric-id") {
        None => Ok(None),
        Some(n) => n.as_u64().map(Some).ok_or_else(|| DecodeError::InvalidIdentifier {
            kind,
            value: n.to_string(),
        }),
    }
}

fn decode_time(object: &Object) -> Result<Time, DecodeError> {
    let precision = time_precision(int_field(object, "value", "precision")?)?;
    let timezone = match object.get("timezone") {
        None => 0,
        Some(_) => {
            let raw = int_field(object, "value", "timezone")?;
            i16::try_from(raw).map_err(|_| DecodeError::InvalidNumber {
                field: "timezone",
                value: raw.to_string(),
            })?
        }
    };
    let time = Time::from_wire(str_field(object, "value", "time")?, precision)?
        .with_tolerance(tolerance(object, "before")?, tolerance(object, "after")?)
        .with_timezone(timezone);
    Ok(match calendar_model(optional_str(object, "calendarmodel")?) {
        Some(url) => time.with_calendar_model(url),
        None => time,
    })
}

fn string_value(json: &Json) -> Result<&str, DecodeError> {
    json.as_str().ok_or(DecodeError::UnexpectedJson {
        context: "value",
        expected: "string",
    })
}

impl<R: PropertyResolver> Decoder<R> {
    /// Decodes the `value` member of a datavalue for the given datatype.
    pub fn decode_value_json(
        &mut self,
        json: &Json,
        datatype: &DataType,
    ) -> Result<Option<Value>, DecodeError> {
        let value = match datatype {
            DataType::CommonsMedia => Value::CommonsMedia(string_value(json)?.to_string()),
            DataType::String => Value::String(string_value(json)?.to_string()),
            DataType::Url => Value::Url(parse_url("url", string_value(json)?)?),
            DataType::Item => {
                let object = as_object(json, "value")?;
                match entity_number(object, "item")? {
                    Some(n) => Value::Item(ItemId::from_numeric(n)),
                    None => Value::Item(ItemId::new(str_field(object, "value", "id")?)?),
                }
            }
            DataType::Property => {
                let object = as_object(json, "value")?;
                match entity_number(object, "property")? {
                    Some(n) => Value::Property(self.resolver.resolve_numeric(n)),
                    None => Value::Property(self.resolver.resolve(str_field(object, "value", "id")?)?),
                }
            }
            DataType::MonolingualText => {
                let object = as_object(json, "value")?;
                Value::monolingual(
                    str_field(object, "value", "language")?,
                    str_field(object, "value", "text")?,
                )?
            }
            DataType::Time => Value::Time(decode_time(as_object(json, "value")?)?),
            DataType::GlobeCoordinate => {
                let object = as_object(json, "value")?;
                let mut coordinate = GlobeCoordinate::new(
                    required_float(object, "latitude")?,
                    required_float(object, "longitude")?,
                )?;
                if let Some(precision) = float_field(object, "precision")? {
                    coordinate = coordinate.with_precision(precision)?;
                }
                coordinate.globe = optional_str(object, "globe")?
                    .and_then(|uri| entity_from_uri("globe", uri, &self.options));
                Value::GlobeCoordinate(coordinate)
            }
            DataType::Quantity => {
                let object = as_object(json, "value")?;
                let amount = required_float(object, "amount")?;
                let quantity = Quantity::new(amount)?.with_bounds(
                    float_field(object, "lowerBound")?.unwrap_or(amount),
                    float_field(object, "upperBound")?.unwrap_or(amount),
                )?;
                Value::Quantity(Quantity {
                    unit: optional_str(object, "unit")?
                        .and_then(|uri| unit_from_uri(uri, &self.options)),
                    ..quantity
                })
            }
            DataType::Other(tag) => {
                debug!(datatype = %tag, "no value model for datatype, leaving value unset");
                return Ok(None);
            }
        };
        Ok(Some(value))
    }

    /// Decodes a snak object.
    pub fn decode_snak_json(&mut self, json: &Json) -> Result<Snak, DecodeError> {
        let object = as_object(json, "snak")?;
        let property = self.resolver.resolve(str_field(object, "snak", "property")?)?;
        let datatype = DataType::from_wire(optional_str(object, "datatype")?.unwrap_or(""));
        let snak_type = match optional_str(object, "snaktype")? {
            Some(raw) => SnakType::from_wire(raw)?,
            None => SnakType::Value,
        };

        let value = match (snak_type, datatype.value_type()) {
            (SnakType::Value, Some(expected)) => {
                let datavalue = as_object(field(object, "snak", "datavalue")?, "datavalue")?;
                if let Some(found) = optional_str(datavalue, "type")? {
                    if found != expected {
                        return Err(DecodeError::DataValueTypeMismatch {
                            datatype,
                            found: found.to_string(),
                        });
                    }
                }
                self.decode_value_json(field(datavalue, "datavalue", "value")?, &datatype)?
            }
            (SnakType::Value, None) => self.decode_value_json(&Json::Null, &datatype)?,
            _ => None,
        };

        Ok(Snak {
            property,
            datatype,
            snak_type,
            value,
        })
    }

    /// Decodes a `{"P1": [snak, ...]}` map, keys in `order` first when given.
    fn decode_snak_map(
        &mut self,
        object: &Object,
        order: Option<&Json>,
        context: &'static str,
    ) -> Result<Vec<(PropertyId, Vec<Snak>)>, DecodeError> {
        let ordered = order
            .and_then(Json::as_array)
            .into_iter()
            .flatten()
            .filter_map(Json::as_str);
        let mut keys: Vec<&str> = Vec::with_capacity(object.len());
        for key in ordered.chain(object.keys().map(String::as_str)) {
            if object.contains_key(key) && !keys.contains(&key) {
                keys.push(key);
            }
        }

        let mut groups = Vec::with_capacity(keys.len());
        for key in keys {
            let group_property = self.resolver.resolve(key)?;
            let list = object[key].as_array().ok_or(DecodeError::UnexpectedJson {
                context,
                expected: "array of snaks",
            })?;
            let mut snaks = Vec::with_capacity(list.len());
            for json in list {
                let snak = self.decode_snak_json(json)?;
                if snak.property != group_property {
                    return Err(DecodeError::QualifierPropertyMismatch {
                        group: group_property,
                        snak: snak.property,
                    });
                }
                snaks.push(snak);
            }
            groups.push((group_property, snaks));
        }
        Ok(groups)
    }

    /// Decodes a claim object.
    pub fn decode_claim_json(&mut self, json: &Json) -> Result<Claim, DecodeError> {
        let object = as_object(json, "claim")?;
        let id = str_field(object, "claim", "id")?.to_string();
        let rank = Rank::from_wire(str_field(object, "claim", "rank")?)?;
        let claim_type = optional_str(object, "type")?.unwrap_or("statement").to_string();
        let mainsnak = match object.get("mainsnak") {
            Some(json) => self.decode_snak_json(json)?,
            None => {
                return Err(DecodeError::MissingChild {
                    parent: "claim",
                    child: "mainsnak",
                });
            }
        };

        let mut claim = Claim::new(id, mainsnak);
        claim.rank = rank;
        claim.claim_type = claim_type;

        if let Some(qualifiers) = object.get("qualifiers") {
            let groups = self.decode_snak_map(
                as_object(qualifiers, "qualifiers")?,
                object.get("qualifiers-order"),
                "qualifiers",
            )?;
            let mut decoded = Qualifiers::new();
            for (property, snaks) in groups {
                for value in snaks.into_iter().filter_map(|s| s.value) {
                    decoded.push(property.clone(), value);
                }
            }
            claim.qualifiers = decoded;
        }

        if let Some(references) = object.get("references") {
            let list = references.as_array().ok_or(DecodeError::UnexpectedJson {
                context: "references",
                expected: "array",
            })?;
            for reference in list {
                let reference = as_object(reference, "reference")?;
                let mut group = ReferenceGroup::new();
                group.hash = optional_str(reference, "hash")?.map(str::to_string);
                if let Some(snaks) = reference.get("snaks") {
                    let groups = self.decode_snak_map(
                        as_object(snaks, "snaks")?,
                        reference.get("snaks-order"),
                        "snaks",
                    )?;
                    for snak in groups.into_iter().flat_map(|(_, snaks)| snaks) {
                        group.insert(snak);
                    }
                }
                claim.add_reference(group);
            }
        }

        Ok(claim)
    }
}

/// Decodes a JSON value string for the given datatype.
pub fn decode_value_json(raw: &str, datatype: &DataType) -> Result<Option<Value>, DecodeError> {
    Decoder::new().decode_value_json(&parse(raw)?, datatype)
}

/// Decodes a JSON snak string.
pub fn decode_snak_json(raw: &str) -> Result<Snak, DecodeError> {
    Decoder::new().decode_snak_json(&parse(raw)?)
}

/// Decodes a JSON claim string.
pub fn decode_claim_json(raw: &str) -> Result<Claim, DecodeError> {
    Decoder::new().decode_claim_json(&parse(raw)?)
}

/// Decodes a reference `snaks` map string (as written by
/// [`encode_reference`](crate::codec::wire::encode_reference)).
pub fn decode_reference_json(raw: &str) -> Result<ReferenceGroup, DecodeError> {
    let json = parse(raw)?;
    let mut decoder = Decoder::new();
    let groups = decoder.decode_snak_map(as_object(&json, "snaks")?, None, "snaks")?;
    Ok(groups.into_iter().flat_map(|(_, snaks)| snaks).collect())
}
