//! Claim assembly from statement trees.
//!
//! Expected shape, as returned by `wbgetentities` in XML:
//!
//! ```text
//! <claim id="Q42$..." rank="normal" type="statement">
//!   <mainsnak property="P31" datatype="wikibase-item" snaktype="value">...</mainsnak>
//!   <qualifiers>
//!     <property id="P580">
//!       <qualifiers property="P580" datatype="time" snaktype="value">...</qualifiers>
//!     </property>
//!   </qualifiers>
//!   <references>
//!     <reference hash="...">
//!       <snaks>
//!         <property id="P248">
//!           <snaks property="P248" datatype="wikibase-item" snaktype="value">...</snaks>
//!         </property>
//!       </snaks>
//!     </reference>
//!   </references>
//! </claim>
//! ```

use tracing::{debug, trace};

use crate::codec::primitives::NodeReader;
use crate::codec::snak::Decoder;
use crate::error::DecodeError;
use crate::model::{Claim, PropertyResolver, Qualifiers, Rank, ReferenceGroup};
use crate::tree::Node;

/// Nodes `decode_claims` descends through on the way to `claim` nodes.
const CLAIM_CONTAINERS: [&str; 6] = ["claim", "property", "claims", "entity", "entities", "api"];

impl<R: PropertyResolver> Decoder<R> {
    /// Decodes a `claim` node.
    ///
    /// Any other node name is a caller error and fails with
    /// [`ErrorKind::UnexpectedNodeShape`](crate::error::ErrorKind).
    pub fn decode_claim<N: Node>(&mut self, node: &N) -> Result<Claim, DecodeError> {
        let reader = NodeReader::expect(node.clone(), "claim")?;
        let id = reader.required("id")?.to_string();
        let rank = Rank::from_wire(reader.required("rank")?)?;
        let claim_type = reader.required("type")?.to_string();

        let mainsnak = self.decode_snak(&reader.child("claim", "mainsnak")?)?;
        let mut claim = Claim::new(id, mainsnak);
        claim.rank = rank;
        claim.claim_type = claim_type;

        for child in node.children() {
            if child.is("qualifiers") {
                for (property, values) in self.decode_qualifiers(&child)?.iter() {
                    for value in values {
                        claim.add_qualifier(property.clone(), value.clone());
                    }
                }
            } else if child.is("references") {
                for group in self.decode_references(&child)? {
                    if !claim.add_reference(group) {
                        trace!(claim = %claim.id, "dropping duplicate reference group");
                    }
                }
            }
        }

        Ok(claim)
    }

    /// Decodes a `qualifiers` node into values grouped by property.
    ///
    /// The node holds `property` groups, each holding qualifier snaks. If the
    /// first child is not a `property` group the result is empty. Snaks
    /// without a value are skipped.
    pub fn decode_qualifiers<N: Node>(&mut self, node: &N) -> Result<Qualifiers, DecodeError> {
        let mut qualifiers = Qualifiers::new();
        match node.first_child() {
            Some(first) if first.is("property") => {}
            _ => {
                debug!("qualifiers node has no property groups");
                return Ok(qualifiers);
            }
        }

        for group in node.children().filter(|c| c.is("property")) {
            let group_property = self
                .resolver
                .resolve(NodeReader::new(group.clone()).required("id")?)?;
            for snak_node in group.children() {
                if !snak_node.is("qualifiers") {
                    trace!(node = snak_node.name(), "skipping non-snak node in qualifier group");
                    continue;
                }
                let snak = self.decode_snak(&snak_node)?;
                if snak.property != group_property {
                    return Err(DecodeError::QualifierPropertyMismatch {
                        group: group_property,
                        snak: snak.property,
                    });
                }
                match snak.value {
                    Some(value) => qualifiers.push(group_property.clone(), value),
                    None => debug!(
                        property = %group_property,
                        snaktype = snak.snak_type.as_str(),
                        "skipping qualifier without value"
                    ),
                }
            }
        }

        Ok(qualifiers)
    }

    /// Decodes a `references` node into reference groups.
    ///
    /// Every `reference` child becomes one group; a reference without a
    /// `snaks` child yields an empty group. Groups are returned in document
    /// order, duplicates included.
    pub fn decode_references<N: Node>(
        &mut self,
        node: &N,
    ) -> Result<Vec<ReferenceGroup>, DecodeError> {
        let mut groups = Vec::new();
        for reference in node.children() {
            if !reference.is("reference") {
                trace!(node = reference.name(), "skipping non-reference node");
                continue;
            }

            let mut group = ReferenceGroup::new();
            group.hash = reference.attribute("hash").map(str::to_string);

            match reference.child("snaks") {
                Some(snaks) => {
                    for property in snaks.children().filter(|c| c.is("property")) {
                        for snak_node in property.children() {
                            let snak = self.decode_snak(&snak_node)?;
                            group.insert(snak);
                        }
                    }
                }
                None => debug!("reference without snaks, keeping empty group"),
            }

            groups.push(group);
        }
        Ok(groups)
    }

    /// Decodes every claim under a container node, in document order.
    ///
    /// Accepts a single `claim`, a `property` group of claims, a `claims`
    /// node, an `entity`, or a whole `wbgetentities` response rooted at
    /// `api` with its `entities` list. Other children (labels, sitelinks, ...)
    /// are not searched.
    pub fn decode_claims<N: Node>(&mut self, node: &N) -> Result<Vec<Claim>, DecodeError> {
        let mut claims = Vec::new();
        self.collect_claims(node, &mut claims)?;
        Ok(claims)
    }

    fn collect_claims<N: Node>(
        &mut self,
        node: &N,
        claims: &mut Vec<Claim>,
    ) -> Result<(), DecodeError> {
        if node.is("claim") {
            claims.push(self.decode_claim(node)?);
            return Ok(());
        }
        for child in node.children() {
            if CLAIM_CONTAINERS.iter().any(|name| child.is(name)) {
                self.collect_claims(&child, claims)?;
            }
        }
        Ok(())
    }
}

/// Decodes a `claim` node with a throwaway registry and default options.
pub fn decode_claim<N: Node>(node: &N) -> Result<Claim, DecodeError> {
    Decoder::new().decode_claim(node)
}

/// Decodes every claim under a container node with one shared session.
pub fn decode_claims<N: Node>(node: &N) -> Result<Vec<Claim>, DecodeError> {
    Decoder::new().decode_claims(node)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codec::snak::DecodeOptions;
    use crate::error::ErrorKind;
    use crate::model::{DataType, ItemId, PropertyId, Snak, Value};
    use crate::tree::Element;

    fn string_snak(name: &str, property: &str, text: &str) -> Element {
        Element::new(name)
            .attr("snaktype", "value")
            .attr("property", property)
            .attr("datatype", "string")
            .with_child(Element::new("datavalue").attr("value", text).attr("type", "string"))
    }

    fn item_mainsnak(property: &str, numeric_id: &str) -> Element {
        Element::new("mainsnak")
            .attr("snaktype", "value")
            .attr("property", property)
            .attr("datatype", "wikibase-item")
            .with_child(
                Element::new("datavalue").attr("type", "wikibase-entityid").with_child(
                    Element::new("value")
                        .attr("entity-type", "item")
                        .attr("numeric-id", numeric_id),
                ),
            )
    }

    fn claim_node() -> Element {
        Element::new("claim")
            .attr("id", "Q1$abc-123")
            .attr("rank", "normal")
            .attr("type", "statement")
            .with_child(item_mainsnak("P31", "42"))
    }

    fn qualifier_group(property: &str, texts: &[&str]) -> Element {
        texts.iter().fold(Element::new("property").attr("id", property), |group, text| {
            group.with_child(string_snak("qualifiers", property, text))
        })
    }

    fn reference(hash: &str, snaks: &[(&str, &str)]) -> Element {
        let mut groups: Vec<Element> = Vec::new();
        for (property, text) in snaks {
            match groups
                .iter_mut()
                .find(|g| g.attributes[0].1 == *property)
            {
                Some(group) => group.children.push(string_snak("snaks", property, text)),
                None => groups.push(
                    Element::new("property")
                        .attr("id", *property)
                        .with_child(string_snak("snaks", property, text)),
                ),
            }
        }
        let snaks = groups
            .into_iter()
            .fold(Element::new("snaks"), |node, group| node.with_child(group));
        Element::new("reference").attr("hash", hash).with_child(snaks)
    }

    #[test]
    fn test_end_to_end_claim() {
        let element = claim_node()
            .with_child(Element::new("qualifiers").with_child(qualifier_group("P10", &["hello"])));
        let claim = decode_claim(&element.as_node()).unwrap();

        assert_eq!(claim.id, "Q1$abc-123");
        assert_eq!(claim.rank, Rank::Normal);
        assert_eq!(claim.claim_type, "statement");
        assert_eq!(claim.property, PropertyId::new("P31").unwrap());
        assert_eq!(claim.property, claim.mainsnak.property);
        assert_eq!(claim.value(), Some(&Value::Item(ItemId::from_numeric(42))));

        let p10 = PropertyId::new("P10").unwrap();
        assert_eq!(claim.qualifiers.len(), 1);
        assert_eq!(claim.qualifiers.get(&p10).unwrap(), &[Value::String("hello".into())]);
        assert!(claim.references.is_empty());
    }

    #[test]
    fn test_qualifier_order() {
        let element = claim_node().with_child(
            Element::new("qualifiers")
                .with_child(qualifier_group("P580", &["a", "b"]))
                .with_child(qualifier_group("P582", &["c"])),
        );
        let claim = decode_claim(&element.as_node()).unwrap();
        let order: Vec<_> = claim.qualifiers.properties().map(|p| p.as_str().to_string()).collect();
        assert_eq!(order, vec!["P580", "P582"]);
        assert_eq!(
            claim.qualifiers.get(&PropertyId::from_numeric(580)).unwrap(),
            &[Value::String("a".into()), Value::String("b".into())]
        );
    }

    #[test]
    fn test_qualifiers_without_property_groups() {
        let element = claim_node().with_child(
            Element::new("qualifiers")
                .with_child(Element::new("qualifiers-order"))
                .with_child(qualifier_group("P580", &["a"])),
        );
        let claim = decode_claim(&element.as_node()).unwrap();
        assert!(claim.qualifiers.is_empty());

        let element = claim_node().with_child(Element::new("qualifiers"));
        assert!(decode_claim(&element.as_node()).unwrap().qualifiers.is_empty());
    }

    #[test]
    fn test_qualifier_without_value_is_skipped() {
        let somevalue = Element::new("qualifiers")
            .attr("snaktype", "somevalue")
            .attr("property", "P580")
            .attr("datatype", "time");
        let element = claim_node().with_child(
            Element::new("qualifiers").with_child(
                Element::new("property")
                    .attr("id", "P580")
                    .with_child(somevalue)
                    .with_child(string_snak("qualifiers", "P580", "x")),
            ),
        );
        let claim = decode_claim(&element.as_node()).unwrap();
        assert_eq!(
            claim.qualifiers.get(&PropertyId::from_numeric(580)).unwrap(),
            &[Value::String("x".into())]
        );
    }

    #[test]
    fn test_qualifier_property_mismatch() {
        let element = claim_node().with_child(
            Element::new("qualifiers").with_child(
                Element::new("property")
                    .attr("id", "P580")
                    .with_child(string_snak("qualifiers", "P582", "x")),
            ),
        );
        let err = decode_claim(&element.as_node()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedNodeShape);
    }

    #[test]
    fn test_references() {
        let element = claim_node().with_child(
            Element::new("references")
                .with_child(reference("h1", &[("P854", "a"), ("P813", "b"), ("P854", "a")]))
                .with_child(Element::new("reference").attr("hash", "h2"))
                .with_child(Element::new("junk")),
        );
        let claim = decode_claim(&element.as_node()).unwrap();
        assert_eq!(claim.references.len(), 2);

        let first = &claim.references[0];
        assert_eq!(first.hash.as_deref(), Some("h1"));
        assert_eq!(first.len(), 2);
        assert!(first.contains(&Snak::new(
            PropertyId::from_numeric(813),
            DataType::String,
            Value::String("b".into())
        )));

        let second = &claim.references[1];
        assert!(second.is_empty());
        assert_eq!(second.hash.as_deref(), Some("h2"));
    }

    #[test]
    fn test_duplicate_reference_groups_collapse() {
        let element = claim_node().with_child(
            Element::new("references")
                .with_child(reference("h1", &[("P854", "a"), ("P813", "b")]))
                .with_child(reference("h2", &[("P813", "b"), ("P854", "a")])),
        );
        let claim = decode_claim(&element.as_node()).unwrap();
        assert_eq!(claim.references.len(), 1);
    }

    #[test]
    fn test_claim_shape_errors() {
        let err = decode_claim(&item_mainsnak("P31", "42").as_node()).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedNode { expected: "claim", .. }));

        let element = Element::new("claim")
            .attr("id", "Q1$x")
            .attr("rank", "normal")
            .attr("type", "statement");
        let err = decode_claim(&element.as_node()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingChild { child: "mainsnak", .. }));

        let element = claim_node().attr("rank", "Normal");
        let err = decode_claim(&element.as_node()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedRank);

        let element = Element::new("claim")
            .attr("rank", "normal")
            .attr("type", "statement")
            .with_child(item_mainsnak("P31", "42"));
        let err = decode_claim(&element.as_node()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_malformed_value_fails_claim() {
        let element = claim_node().with_child(
            Element::new("qualifiers").with_child(
                Element::new("property").attr("id", "P854").with_child(
                    Element::new("qualifiers")
                        .attr("property", "P854")
                        .attr("datatype", "url")
                        .with_child(Element::new("datavalue").attr("value", "::")),
                ),
            ),
        );
        let err = decode_claim(&element.as_node()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUrl { .. }));
    }

    #[test]
    fn test_decode_claims_container() {
        let second = Element::new("claim")
            .attr("id", "Q1$def")
            .attr("rank", "preferred")
            .attr("type", "statement")
            .with_child(item_mainsnak("P31", "5"));
        let third = Element::new("claim")
            .attr("id", "Q1$ghi")
            .attr("rank", "deprecated")
            .attr("type", "statement")
            .with_child(item_mainsnak("P279", "7"));
        let element = Element::new("entity").attr("id", "Q1").with_child(Element::new("labels")).with_child(
            Element::new("claims")
                .with_child(
                    Element::new("property")
                        .attr("id", "P31")
                        .with_child(claim_node())
                        .with_child(second),
                )
                .with_child(Element::new("property").attr("id", "P279").with_child(third)),
        );

        let mut decoder = Decoder::new();
        let claims = decoder.decode_claims(&element.as_node()).unwrap();
        let ids: Vec<_> = claims.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Q1$abc-123", "Q1$def", "Q1$ghi"]);
        assert!(claims[0].property.same_instance(&claims[1].property));
        assert_eq!(decoder.resolver().len(), 2);
    }

    #[test]
    fn test_decode_claims_from_api_response() {
        let response = Element::new("api").attr("success", "1").with_child(
            Element::new("entities")
                .with_child(
                    Element::new("entity").attr("id", "Q1").with_child(
                        Element::new("claims").with_child(
                            Element::new("property").attr("id", "P31").with_child(claim_node()),
                        ),
                    ),
                )
                .with_child(Element::new("entity").attr("id", "Q2").with_child(Element::new("sitelinks"))),
        );

        let claims = decode_claims(&response.as_node()).unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, "Q1$abc-123");
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_decode_claims_from_xml_document() {
        let xml = r#"<?xml version="1.0"?>
<api success="1">
  <entities>
    <entity type="item" id="Q1">
      <labels><label language="en" value="universe"/></labels>
      <claims>
        <property id="P31">
          <claim type="statement" id="Q1$abc-123" rank="normal">
            <mainsnak snaktype="value" property="P31" datatype="wikibase-item">
              <datavalue type="wikibase-entityid">
                <value entity-type="item" numeric-id="36906466"/>
              </datavalue>
            </mainsnak>
          </claim>
        </property>
      </claims>
    </entity>
  </entities>
</api>"#;
        let tree = Element::parse_xml(xml).unwrap();
        let claims = decode_claims(&tree.as_node()).unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].value(), Some(&Value::Item(ItemId::from_numeric(36906466))));
    }

    #[test]
    fn test_custom_entity_prefix() {
        let options = DecodeOptions::new().with_entity_prefix("https://wiki.example.org/entity/");
        assert_eq!(options.entity_prefixes.len(), 3);
        let quantity = Element::new("mainsnak")
            .attr("property", "P2067")
            .attr("datatype", "quantity")
            .with_child(
                Element::new("datavalue").attr("type", "quantity").with_child(
                    Element::new("value")
                        .attr("amount", "+70")
                        .attr("unit", "https://wiki.example.org/entity/Q11570"),
                ),
            );
        let snak = Decoder::new()
            .with_options(options)
            .decode_snak(&quantity.as_node())
            .unwrap();
        match snak.value {
            Some(Value::Quantity(q)) => assert_eq!(q.unit, Some(ItemId::from_numeric(11570))),
            other => panic!("unexpected value: {other:?}"),
        }
    }
}
