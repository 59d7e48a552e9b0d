//! Relationship-related objects for OPC packages.
//!
//! Each part may carry a `_rels/<name>.rels` stream naming the parts it points
//! at. Masters reach their layouts, the presentation reaches its masters and
//! slides, and slides reach their layout through these relationships.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    r_id: String,
    /// Relationship type URI
    reltype: String,
    /// Target reference - a part-relative URI, or a URL for external targets
    target_ref: String,
    /// Base URI for resolving relative references
    base_uri: String,
    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type URI.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the raw target reference.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source, in document order.
#[derive(Debug)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Parse a relationships stream.
    ///
    /// # Arguments
    /// * `xml` - The raw `.rels` XML
    /// * `base_uri` - Directory URI of the source part, used to resolve targets
    pub fn from_xml(xml: &[u8], base_uri: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() != b"Relationship" {
                        continue;
                    }
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target = None;
                    let mut is_external = false;
                    for attr in e.attributes().flatten() {
                        let value = std::str::from_utf8(&attr.value)
                            .map_err(|e| OpcError::Xml(e.to_string()))?
                            .to_string();
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(value),
                            b"Type" => reltype = Some(value),
                            b"Target" => target = Some(value),
                            b"TargetMode" => is_external = value == "External",
                            _ => {}
                        }
                    }
                    match (r_id, reltype, target) {
                        (Some(r_id), Some(reltype), Some(target_ref)) => {
                            rels.push(Relationship {
                                r_id,
                                reltype,
                                target_ref,
                                base_uri: base_uri.to_string(),
                                is_external,
                            });
                        }
                        _ => {
                            return Err(OpcError::InvalidRelationship(
                                "Relationship element missing Id, Type, or Target".to_string(),
                            ));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {}
            }
        }
        Ok(Self { rels })
    }

    /// Look up a relationship by its ID.
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.r_id == r_id)
    }

    /// Find the first relationship of a given type.
    pub fn find_by_reltype(&self, reltype: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.reltype == reltype)
    }

    /// Largest numeric suffix among "rIdN" identifiers, 0 if none.
    ///
    /// New relationships continue numbering past this.
    pub fn max_numeric_rid(&self) -> u32 {
        self.rels
            .iter()
            .filter_map(|r| r.r_id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
    }

    /// Iterate relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
<Relationship Id="rId3" Type="http://example.com/external" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn parses_and_resolves_targets() {
        let rels = Relationships::from_xml(RELS, "/ppt").unwrap();
        assert_eq!(rels.len(), 3);

        let master = rels.get("rId1").unwrap();
        assert_eq!(
            master.target_partname().unwrap().as_str(),
            "/ppt/slideMasters/slideMaster1.xml"
        );
    }

    #[test]
    fn external_target_has_no_partname() {
        let rels = Relationships::from_xml(RELS, "/ppt").unwrap();
        let ext = rels.get("rId3").unwrap();
        assert!(ext.is_external());
        assert!(ext.target_partname().is_err());
    }

    #[test]
    fn max_rid_scans_numeric_suffixes() {
        let rels = Relationships::from_xml(RELS, "/ppt").unwrap();
        assert_eq!(rels.max_numeric_rid(), 7);
    }

    #[test]
    fn find_by_reltype_returns_first() {
        let rels = Relationships::from_xml(RELS, "/ppt").unwrap();
        let slide = rels
            .find_by_reltype(crate::opc::constants::reltype::SLIDE)
            .unwrap();
        assert_eq!(slide.r_id(), "rId7");
    }

    #[test]
    fn missing_attributes_rejected() {
        let bad = br#"<Relationships><Relationship Id="rId1" Target="x.xml"/></Relationships>"#;
        assert!(Relationships::from_xml(bad, "/").is_err());
    }
}
