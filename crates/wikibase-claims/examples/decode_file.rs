//! Simple decoder to inspect a `wbgetentities` XML response.

use std::collections::BTreeMap;
use std::fs;

use wikibase_claims::{Decoder, Element, SnakType, Value, encode_claim};

fn format_value(v: &Value) -> String {
    match v {
        Value::Item(item) => item.to_string(),
        Value::Property(property) => property.to_string(),
        Value::String(s) | Value::CommonsMedia(s) => {
            let preview: String = s.chars().take(60).collect();
            if s.chars().count() > 60 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Value::Url(url) => url.to_string(),
        Value::MonolingualText { language, text } => format!("\"{}\"@{}", text, language),
        Value::Time(t) => format!("TIME({}, precision {})", t.to_wire_string(), t.precision.as_u8()),
        Value::GlobeCoordinate(c) => format!("POINT({}, {})", c.latitude, c.longitude),
        Value::Quantity(q) => match &q.unit {
            Some(unit) => format!("{} {}", q.amount, unit),
            None => format!("{}", q.amount),
        },
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Q42.xml".to_string());

    println!("Reading: {}", path);

    let xml = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", xml.len());

    let tree = Element::parse_xml(&xml).expect("Failed to parse XML");
    let mut decoder = Decoder::new();
    let claims = decoder.decode_claims(&tree.as_node()).expect("Failed to decode");

    println!("\n=== Claims ({}) ===", claims.len());

    let mut per_property: BTreeMap<u64, usize> = BTreeMap::new();
    let mut unresolved = 0;
    let mut no_value = 0;
    let mut some_value = 0;
    for claim in &claims {
        *per_property.entry(claim.property.numeric_id()).or_default() += 1;
        match claim.mainsnak.snak_type {
            SnakType::NoValue => no_value += 1,
            SnakType::SomeValue => some_value += 1,
            SnakType::Value if claim.mainsnak.is_unresolved() => unresolved += 1,
            SnakType::Value => {}
        }
    }
    println!("  Properties: {}", per_property.len());
    println!("  somevalue: {}", some_value);
    println!("  novalue: {}", no_value);
    println!("  Unresolved: {}", unresolved);

    // Show first few claims in detail
    println!("\n=== First claims ===");
    for claim in claims.iter().take(10) {
        let value = match claim.value() {
            Some(v) => format_value(v),
            None => claim.mainsnak.snak_type.as_str().to_string(),
        };
        println!(
            "  {} [{}] {} = {}",
            claim.id,
            claim.rank.as_str(),
            claim.property,
            value
        );
        for (property, values) in claim.qualifiers.iter() {
            for v in values {
                println!("      {} = {}", property, format_value(v));
            }
        }
        if !claim.references.is_empty() {
            println!("      ({} references)", claim.references.len());
        }
    }

    if let Some(claim) = claims.first() {
        println!("\n=== Encoded ===");
        match encode_claim(claim) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("Not encodable: {}", e),
        }
    }
}
