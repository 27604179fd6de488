//! Benchmark for claim decoding and encoding.
//!
//! Builds a synthetic entity with many claims (or reads a `wbgetentities`
//! XML response given as the first argument), then times tree decoding,
//! JSON encoding and JSON decoding.
//!
//! Usage: `bench-claims [entity.xml] [claim-count]`

use std::fs;
use std::time::Instant;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wikibase_claims::{Claim, Decoder, Element, encode_claim};

const DEFAULT_CLAIMS: usize = 20_000;

const DATATYPES: [&str; 4] = ["wikibase-item", "time", "globe-coordinate", "quantity"];

fn datavalue(datatype: &str, n: usize) -> Element {
    match datatype {
        "wikibase-item" => Element::new("datavalue").attr("type", "wikibase-entityid").with_child(
            Element::new("value")
                .attr("entity-type", "item")
                .attr("numeric-id", (n % 1000 + 1).to_string()),
        ),
        "time" => Element::new("datavalue").attr("type", "time").with_child(
            Element::new("value")
                .attr("time", format!("+{:04}-{:02}-{:02}T00:00:00Z", 1000 + n % 1000, n % 12 + 1, n % 28 + 1))
                .attr("timezone", "0")
                .attr("before", "0")
                .attr("after", "0")
                .attr("precision", "11")
                .attr("calendarmodel", "http://www.wikidata.org/entity/Q1985727"),
        ),
        "globe-coordinate" => Element::new("datavalue").attr("type", "globecoordinate").with_child(
            Element::new("value")
                .attr("latitude", format!("{}", (n % 180) as f64 - 89.5))
                .attr("longitude", format!("{}", (n % 360) as f64 - 179.5))
                .attr("precision", "0.0001")
                .attr("globe", "http://www.wikidata.org/entity/Q2"),
        ),
        _ => Element::new("datavalue").attr("type", "quantity").with_child(
            Element::new("value")
                .attr("amount", format!("+{}", n))
                .attr("unit", "http://www.wikidata.org/entity/Q11573")
                .attr("upperBound", format!("+{}", n + 1))
                .attr("lowerBound", format!("+{}", n.saturating_sub(1))),
        ),
    }
}

fn snak(name: &str, property: &str, datatype: &str, n: usize) -> Element {
    Element::new(name)
        .attr("snaktype", "value")
        .attr("property", property)
        .attr("datatype", datatype)
        .with_child(datavalue(datatype, n))
}

fn synthetic_claim(n: usize) -> Element {
    let datatype = DATATYPES[n % DATATYPES.len()];
    let property = format!("P{}", 10 + n % 200);

    Element::new("claim")
        .attr("id", format!("Q42${:08X}-0000-4000-8000-{:012X}", n, n))
        .attr("rank", "normal")
        .attr("type", "statement")
        .with_child(snak("mainsnak", &property, datatype, n))
        .with_child(
            Element::new("qualifiers").with_child(
                Element::new("property")
                    .attr("id", "P580")
                    .with_child(snak("qualifiers", "P580", "time", n)),
            ),
        )
        .with_child(
            Element::new("references").with_child(
                Element::new("reference").attr("hash", format!("{:040x}", n)).with_child(
                    Element::new("snaks")
                        .with_child(
                            Element::new("property")
                                .attr("id", "P248")
                                .with_child(snak("snaks", "P248", "wikibase-item", n)),
                        )
                        .with_child(
                            Element::new("property").attr("id", "P854").with_child(
                                Element::new("snaks")
                                    .attr("snaktype", "value")
                                    .attr("property", "P854")
                                    .attr("datatype", "url")
                                    .with_child(
                                        Element::new("datavalue")
                                            .attr("type", "string")
                                            .attr("value", format!("https://example.org/source/{}", n)),
                                    ),
                            ),
                        ),
                ),
            ),
        )
}

fn synthetic_entity(count: usize) -> Element {
    let mut claims = Element::new("claims");
    for n in 0..count {
        claims = claims.with_child(synthetic_claim(n));
    }
    Element::new("entity").attr("id", "Q42").with_child(claims)
}

fn load_entity(path: &str) -> Option<Element> {
    let xml = match fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) => {
            warn!(error = %e, path, "could not read input");
            return None;
        }
    };
    match Element::parse_xml(&xml) {
        Ok(tree) => Some(tree),
        Err(e) => {
            warn!(error = %e, path, "could not parse input");
            None
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let count = args
        .next()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_CLAIMS);

    let build_start = Instant::now();
    let tree = match path.as_deref().and_then(load_entity) {
        Some(tree) => tree,
        None => synthetic_entity(count),
    };
    let build_time = build_start.elapsed();
    println!("Prepared input tree in {:?}", build_time);

    // Tree decode
    let decode_start = Instant::now();
    let mut decoder = Decoder::new();
    let claims: Vec<Claim> = match decoder.decode_claims(&tree.as_node()) {
        Ok(claims) => claims,
        Err(e) => {
            eprintln!("Decode failed: {} ({})", e, e.kind().as_str());
            std::process::exit(1);
        }
    };
    let decode_time = decode_start.elapsed();
    let unresolved = claims.iter().filter(|c| c.mainsnak.is_unresolved()).count();
    println!(
        "Decoded {} claims ({} properties, {} unresolved) in {:?}",
        claims.len(),
        decoder.resolver().len(),
        unresolved,
        decode_time
    );

    // JSON encode
    let encode_start = Instant::now();
    let mut encoded = Vec::with_capacity(claims.len());
    let mut rejected = 0usize;
    for claim in &claims {
        match encode_claim(claim) {
            Ok(json) => encoded.push(json),
            Err(e) => {
                rejected += 1;
                info!(claim = %claim.id, error = %e, "claim not encoded");
            }
        }
    }
    let encode_time = encode_start.elapsed();
    let total_bytes: usize = encoded.iter().map(String::len).sum();
    println!(
        "Encoded {} claims ({} rejected, {} bytes) in {:?}",
        encoded.len(),
        rejected,
        total_bytes,
        encode_time
    );

    // JSON decode
    let reparse_start = Instant::now();
    let mut reparsed = 0usize;
    for json in &encoded {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "encoded claim is not JSON");
                continue;
            }
        };
        match decoder.decode_claim_json(&value) {
            Ok(_) => reparsed += 1,
            Err(e) => warn!(error = %e, "re-decode failed"),
        }
    }
    let reparse_time = reparse_start.elapsed();
    println!("Re-decoded {} claims from JSON in {:?}", reparsed, reparse_time);

    if let Some(first) = encoded.first() {
        match serde_json::from_str::<serde_json::Value>(first) {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(pretty) => println!("\nFirst claim:\n{}", pretty),
                Err(e) => warn!(error = %e, "could not pretty-print"),
            },
            Err(e) => warn!(error = %e, "could not re-read encoded claim"),
        }
    }
}
