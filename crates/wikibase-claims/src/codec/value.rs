//! Per-datatype value decoding from snak trees.
//!
//! A snak node carries one `datavalue` child. String-shaped datatypes keep
//! the payload in its `value` attribute; all others nest a `value` node
//! whose attributes depend on the datatype.

use tracing::{debug, trace};
use url::Url;

use crate::codec::snak::DecodeOptions;
use crate::codec::primitives::{parse_url, NodeReader};
use crate::error::DecodeError;
use crate::model::id::parse_numeric_id;
use crate::model::{
    DataType, GlobeCoordinate, ItemId, PropertyId, PropertyResolver, Quantity, Time, TimePrecision, Value,
};
use crate::tree::Node;

/// Decodes the value of a snak node according to its declared datatype.
///
/// Returns `Ok(None)` for datatypes without a value model. A known datatype
/// with missing or malformed attributes is an error.
pub fn decode_value<N: Node, R: PropertyResolver>(
    snak: &N,
    datatype: &DataType,
    resolver: &mut R,
    options: &DecodeOptions,
) -> Result<Option<Value>, DecodeError> {
    let expected_type = match datatype.value_type() {
        Some(t) => t,
        None => {
            debug!(datatype = %datatype, "no value model for datatype, leaving value unset");
            return Ok(None);
        }
    };

    let datavalue = snak
        .child("datavalue")
        .ok_or_else(|| DecodeError::MissingDataValue {
            datatype: datatype.clone(),
            node: "datavalue",
        })?;
    let datavalue = NodeReader::new(datavalue);
    if let Some(found) = datavalue.optional("type") {
        if !found.eq_ignore_ascii_case(expected_type) {
            return Err(DecodeError::DataValueTypeMismatch {
                datatype: datatype.clone(),
                found: found.to_string(),
            });
        }
    }

    let value = match datatype {
        DataType::CommonsMedia => Value::CommonsMedia(datavalue.required("value")?.to_string()),
        DataType::String => Value::String(datavalue.required("value")?.to_string()),
        DataType::Url => Value::Url(parse_url("url", datavalue.required("value")?)?),
        DataType::Item => Value::Item(decode_item(&nested_value(&datavalue, datatype)?)?),
        DataType::Property => {
            Value::Property(decode_property(&nested_value(&datavalue, datatype)?, resolver)?)
        }
        DataType::MonolingualText => {
            let reader = nested_value(&datavalue, datatype)?;
            Value::monolingual(reader.required("language")?, reader.required("text")?)?
        }
        DataType::Time => Value::Time(decode_time(&nested_value(&datavalue, datatype)?)?),
        DataType::GlobeCoordinate => Value::GlobeCoordinate(decode_globe_coordinate(
            &nested_value(&datavalue, datatype)?,
            options,
        )?),
        DataType::Quantity => {
            Value::Quantity(decode_quantity(&nested_value(&datavalue, datatype)?, options)?)
        }
        DataType::Other(_) => return Ok(None),
    };

    Ok(Some(value))
}

/// Returns the `value` node nested under a datavalue.
fn nested_value<N: Node>(
    datavalue: &NodeReader<N>,
    datatype: &DataType,
) -> Result<NodeReader<N>, DecodeError> {
    datavalue
        .node()
        .child("value")
        .map(NodeReader::new)
        .ok_or_else(|| DecodeError::MissingDataValue {
            datatype: datatype.clone(),
            node: "value",
        })
}

fn check_entity_type<N: Node>(
    reader: &NodeReader<N>,
    expected: &'static str,
) -> Result<(), DecodeError> {
    let found = reader.required("entity-type")?;
    if found.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedEntityType {
            expected,
            found: found.to_string(),
        })
    }
}

fn decode_item<N: Node>(reader: &NodeReader<N>) -> Result<ItemId, DecodeError> {
    check_entity_type(reader, "item")?;
    match reader.optional("numeric-id") {
        Some(raw) => parse_numeric_id("item", raw).map(ItemId::from_numeric),
        None => ItemId::new(reader.required("id")?),
    }
}

fn decode_property<N: Node, R: PropertyResolver>(
    reader: &NodeReader<N>,
    resolver: &mut R,
) -> Result<PropertyId, DecodeError> {
    if reader.optional("entity-type").is_some() {
        check_entity_type(reader, "property")?;
    }
    match reader.optional("numeric-id") {
        Some(raw) => Ok(resolver.resolve_numeric(parse_numeric_id("property", raw)?)),
        None => resolver.resolve(reader.required("id")?),
    }
}

fn decode_time<N: Node>(reader: &NodeReader<N>) -> Result<Time, DecodeError> {
    let precision = time_precision(reader.read_i64("precision")?)?;
    let time = Time::from_wire(reader.required("time")?, precision)?
        .with_tolerance(reader.read_u32("before")?, reader.read_u32("after")?)
        .with_timezone(reader.read_optional_i16("timezone")?.unwrap_or(0));
    Ok(match calendar_model(reader.optional("calendarmodel")) {
        Some(url) => time.with_calendar_model(url),
        None => time,
    })
}

fn decode_globe_coordinate<N: Node>(
    reader: &NodeReader<N>,
    options: &DecodeOptions,
) -> Result<GlobeCoordinate, DecodeError> {
    let mut coordinate = GlobeCoordinate::new(reader.read_f64("latitude")?, reader.read_f64("longitude")?)?;
    if let Some(precision) = reader.read_optional_f64("precision")? {
        coordinate = coordinate.with_precision(precision)?;
    }
    coordinate.globe = reader
        .optional("globe")
        .and_then(|uri| entity_from_uri("globe", uri, options));
    Ok(coordinate)
}

fn decode_quantity<N: Node>(
    reader: &NodeReader<N>,
    options: &DecodeOptions,
) -> Result<Quantity, DecodeError> {
    let amount = reader.read_f64("amount")?;
    let quantity = Quantity::new(amount)?.with_bounds(
        reader.read_optional_f64("lowerBound")?.unwrap_or(amount),
        reader.read_optional_f64("upperBound")?.unwrap_or(amount),
    )?;
    Ok(Quantity {
        unit: reader.optional("unit").and_then(|uri| unit_from_uri(uri, options)),
        ..quantity
    })
}

/// Maps a precision code onto [`TimePrecision`].
pub(crate) fn time_precision(code: i64) -> Result<TimePrecision, DecodeError> {
    u8::try_from(code)
        .ok()
        .and_then(TimePrecision::from_u8)
        .ok_or(DecodeError::InvalidPrecision { precision: code })
}

/// Parses a calendar model URI. Failure is not an error.
pub(crate) fn calendar_model(raw: Option<&str>) -> Option<Url> {
    let raw = raw?;
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!(calendarmodel = %raw, error = %e, "ignoring unparsable calendar model");
            None
        }
    }
}

/// Recovers an item from a concept URI under one of the configured prefixes.
pub(crate) fn entity_from_uri(field: &str, uri: &str, options: &DecodeOptions) -> Option<ItemId> {
    let item = ItemId::from_entity_uri(uri, options.entity_prefixes.as_slice());
    if item.is_none() {
        trace!(field, uri, "entity URI not recognized, leaving unset");
    }
    item
}

/// Recovers a unit item; `1` means dimensionless.
pub(crate) fn unit_from_uri(uri: &str, options: &DecodeOptions) -> Option<ItemId> {
    if uri == "1" {
        return None;
    }
    entity_from_uri("unit", uri, options)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{items, PropertyRegistry};
    use crate::tree::Element;

    fn snak(datatype: &str, datavalue: Element) -> Element {
        Element::new("mainsnak")
            .attr("snaktype", "value")
            .attr("property", "P1")
            .attr("datatype", datatype)
            .with_child(datavalue)
    }

    fn nested(value_type: &str, value: Element) -> Element {
        Element::new("datavalue").attr("type", value_type).with_child(value)
    }

    fn decode(element: &Element) -> Result<Option<Value>, DecodeError> {
        let node = element.as_node();
        let datatype = DataType::from_wire(node.attribute("datatype").unwrap_or(""));
        decode_value(&node, &datatype, &mut PropertyRegistry::new(), &DecodeOptions::default())
    }

    fn time_value(time: &str, precision: &str) -> Element {
        Element::new("value")
            .attr("time", time)
            .attr("timezone", "0")
            .attr("before", "0")
            .attr("after", "0")
            .attr("precision", precision)
            .attr("calendarmodel", "http://www.wikidata.org/entity/Q1985727")
    }

    #[test]
    fn test_string_shaped_values() {
        let value = decode(&snak(
            "string",
            Element::new("datavalue").attr("value", "hello").attr("type", "string"),
        ))
        .unwrap();
        assert_eq!(value, Some(Value::String("hello".into())));

        let value = decode(&snak(
            "commonsMedia",
            Element::new("datavalue").attr("value", "Douglas adams portrait.jpg"),
        ))
        .unwrap();
        assert_eq!(value, Some(Value::CommonsMedia("Douglas adams portrait.jpg".into())));

        let err = decode(&snak("url", Element::new("datavalue").attr("value", "not a url"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_item_value() {
        let element = snak(
            "wikibase-item",
            nested(
                "wikibase-entityid",
                Element::new("value").attr("entity-type", "item").attr("numeric-id", "42"),
            ),
        );
        assert_eq!(decode(&element).unwrap(), Some(Value::Item(ItemId::from_numeric(42))));

        let element = snak(
            "wikibase-item",
            nested(
                "wikibase-entityid",
                Element::new("value").attr("entity-type", "item").attr("id", "Q5"),
            ),
        );
        assert_eq!(decode(&element).unwrap(), Some(Value::Item(ItemId::from_numeric(5))));

        let element = snak(
            "wikibase-item",
            nested(
                "wikibase-entityid",
                Element::new("value").attr("entity-type", "property").attr("numeric-id", "42"),
            ),
        );
        assert!(matches!(decode(&element), Err(DecodeError::UnexpectedEntityType { .. })));
    }

    #[test]
    fn test_property_value_uses_registry() {
        let element = snak(
            "wikibase-property",
            nested(
                "wikibase-entityid",
                Element::new("value").attr("entity-type", "property").attr("numeric-id", "31"),
            ),
        );
        let mut registry = PropertyRegistry::new();
        let node = element.as_node();
        let value =
            decode_value(&node, &DataType::Property, &mut registry, &DecodeOptions::default()).unwrap();
        match value {
            Some(Value::Property(p)) => {
                assert_eq!(p.as_str(), "P31");
                assert!(registry.get("P31").unwrap().same_instance(&p));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_monolingual_requires_both_attributes() {
        let element = snak(
            "monolingualtext",
            nested("monolingualtext", Element::new("value").attr("text", "Douglas").attr("language", "en")),
        );
        assert_eq!(
            decode(&element).unwrap(),
            Some(Value::MonolingualText {
                language: "en".into(),
                text: "Douglas".into()
            })
        );

        let element = snak(
            "monolingualtext",
            nested("monolingualtext", Element::new("value").attr("text", "Douglas")),
        );
        assert_eq!(decode(&element).unwrap_err().kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_time_year_precision_ignores_month_and_day() {
        let a = decode(&snak("time", nested("time", time_value("+1969-07-20T00:00:00Z", "9")))).unwrap();
        let b = decode(&snak("time", nested("time", time_value("+1969-00-00T00:00:00Z", "9")))).unwrap();
        assert_eq!(a, b);
        match a {
            Some(Value::Time(t)) => {
                assert_eq!(t.year, BigInt::from(1969));
                assert_eq!(t.month, None);
                assert_eq!(t.day, None);
                assert_eq!(t.precision, TimePrecision::Year);
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_time_bce_day_precision() {
        let value = decode(&snak("time", nested("time", time_value("-0044-03-15T00:00:00Z", "11"))))
            .unwrap();
        match value {
            Some(Value::Time(t)) => {
                assert_eq!(t.era(), crate::model::Era::BeforeCommonEra);
                assert_eq!(t.year_of_era(), BigInt::from(44));
                assert_eq!((t.month, t.day), (Some(3), Some(15)));
                assert_eq!(
                    t.calendar_model.as_ref().map(Url::as_str),
                    Some("http://www.wikidata.org/entity/Q1985727")
                );
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_time_bad_calendar_model_is_tolerated() {
        let value = time_value("+2001-01-01T00:00:00Z", "11").attr("calendarmodel", "gregorian");
        match decode(&snak("time", nested("time", value))).unwrap() {
            Some(Value::Time(t)) => assert!(t.calendar_model.is_none()),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_time_errors() {
        let value = time_value("+2001-01-01T00:00:00Z", "15");
        assert!(matches!(
            decode(&snak("time", nested("time", value))),
            Err(DecodeError::InvalidPrecision { precision: 15 })
        ));

        let value = time_value("+2001-02-30T00:00:00Z", "11");
        assert!(matches!(
            decode(&snak("time", nested("time", value))),
            Err(DecodeError::InvalidTime { .. })
        ));

        let value = Element::new("value").attr("time", "+2001-00-00T00:00:00Z").attr("precision", "9");
        assert!(matches!(
            decode(&snak("time", nested("time", value))),
            Err(DecodeError::MissingAttribute { attribute: "before", .. })
        ));
    }

    #[test]
    fn test_globe_coordinate() {
        let value = Element::new("value")
            .attr("latitude", "52.516666666667")
            .attr("longitude", "13.383333333333")
            .attr("precision", "0.016666666666667")
            .attr("globe", "http://www.wikidata.org/entity/Q2");
        match decode(&snak("globe-coordinate", nested("globecoordinate", value))).unwrap() {
            Some(Value::GlobeCoordinate(c)) => {
                assert_eq!(c.globe, Some(items::EARTH));
                assert_eq!(c.precision, Some(0.016666666666667));
            }
            other => panic!("unexpected value: {other:?}"),
        }

        let value = Element::new("value")
            .attr("latitude", "1")
            .attr("longitude", "2")
            .attr("globe", "http://example.org/moon");
        match decode(&snak("globe-coordinate", nested("globecoordinate", value))).unwrap() {
            Some(Value::GlobeCoordinate(c)) => {
                assert_eq!(c.globe, None);
                assert_eq!(c.precision, None);
            }
            other => panic!("unexpected value: {other:?}"),
        }

        let value = Element::new("value").attr("latitude", "abc").attr("longitude", "2");
        assert!(matches!(
            decode(&snak("globe-coordinate", nested("globecoordinate", value))),
            Err(DecodeError::InvalidNumber { field: "latitude", .. })
        ));
    }

    #[test]
    fn test_quantity() {
        let value = Element::new("value")
            .attr("amount", "+10")
            .attr("upperBound", "+11")
            .attr("lowerBound", "+9")
            .attr("unit", "https://www.wikidata.org/entity/Q11573");
        match decode(&snak("quantity", nested("quantity", value))).unwrap() {
            Some(Value::Quantity(q)) => {
                assert_eq!((q.amount, q.lower_bound, q.upper_bound), (10.0, 9.0, 11.0));
                assert_eq!(q.unit, Some(ItemId::from_numeric(11573)));
            }
            other => panic!("unexpected value: {other:?}"),
        }

        let value = Element::new("value").attr("amount", "-3").attr("unit", "1");
        match decode(&snak("quantity", nested("quantity", value))).unwrap() {
            Some(Value::Quantity(q)) => {
                assert_eq!((q.lower_bound, q.upper_bound), (-3.0, -3.0));
                assert_eq!(q.unit, None);
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_each_datatype_decodes_its_own_variant() {
        let cases = [
            ("string", Element::new("datavalue").attr("value", "x")),
            ("commonsMedia", Element::new("datavalue").attr("value", "x.jpg")),
            ("url", Element::new("datavalue").attr("value", "https://example.org/")),
            (
                "wikibase-item",
                nested("wikibase-entityid", Element::new("value").attr("entity-type", "item").attr("numeric-id", "5")),
            ),
            (
                "wikibase-property",
                nested(
                    "wikibase-entityid",
                    Element::new("value").attr("entity-type", "property").attr("numeric-id", "31"),
                ),
            ),
            (
                "monolingualtext",
                nested("monolingualtext", Element::new("value").attr("language", "en").attr("text", "x")),
            ),
            ("time", nested("time", time_value("+1969-07-20T00:00:00Z", "11"))),
            (
                "globe-coordinate",
                nested("globecoordinate", Element::new("value").attr("latitude", "1").attr("longitude", "2")),
            ),
            ("quantity", nested("quantity", Element::new("value").attr("amount", "+3"))),
        ];

        for (tag, datavalue) in cases {
            let value = decode(&snak(tag, datavalue)).unwrap().unwrap();
            assert_eq!(value.data_type(), DataType::from_wire(tag), "datatype {tag}");
        }
    }

    #[test]
    fn test_unknown_datatype_has_no_value() {
        let element = snak("geo-shape", Element::new("datavalue").attr("value", "Data:Berlin.map"));
        assert_eq!(decode(&element).unwrap(), None);
    }

    #[test]
    fn test_datavalue_shape_errors() {
        let element = Element::new("mainsnak").attr("datatype", "string");
        assert!(matches!(
            decode(&element),
            Err(DecodeError::MissingDataValue { node: "datavalue", .. })
        ));

        let element = snak("string", Element::new("datavalue").attr("value", "x").attr("type", "time"));
        assert!(matches!(decode(&element), Err(DecodeError::DataValueTypeMismatch { .. })));

        let element = snak("quantity", Element::new("datavalue").attr("type", "quantity"));
        assert!(matches!(
            decode(&element),
            Err(DecodeError::MissingDataValue { node: "value", .. })
        ));
    }
}
