//! Relationship-related objects for OPC packages.
//!
//! Each part (and the package itself) owns one `Relationships` collection,
//! serialized as the part's `.rels` member.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::collections::HashMap;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rel256", "relId1")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI relative to the source or an external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute partname of the target. Fails for external relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external and has no target part",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source, keyed by relationship ID.
#[derive(Debug)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    /// Map of relationship ID to Relationship
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection for a source directory.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    /// Add a relationship under an explicit ID, replacing any previous entry with that ID.
    ///
    /// Use [`Relationships::add_unique`] when an existing ID must not be overwritten.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        match self.rels.entry(r_id) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                slot.insert(rel);
                slot.into_mut()
            },
            std::collections::hash_map::Entry::Vacant(slot) => slot.insert(rel),
        }
    }

    /// Add an internal relationship under an explicit ID that must not be taken yet.
    pub fn add_unique(&mut self, reltype: &str, target_ref: &str, r_id: &str) -> Result<&Relationship> {
        if self.rels.contains_key(r_id) {
            return Err(OpcError::DuplicateRelationship {
                r_id: r_id.to_string(),
                source_uri: self.base_uri.clone(),
            });
        }
        Ok(self.add_relationship(
            reltype.to_string(),
            target_ref.to_string(),
            r_id.to_string(),
            false,
        ))
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    #[inline]
    pub fn contains(&self, r_id: &str) -> bool {
        self.rels.contains_key(r_id)
    }

    /// Get or add an internal relationship to `target_ref`.
    ///
    /// An existing relationship of the same type and target is reused; otherwise
    /// a new one is created under the next free "rIdN" ID.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> &Relationship {
        let existing = self
            .rels
            .values()
            .find(|rel| {
                rel.reltype() == reltype && rel.target_ref() == target_ref && !rel.is_external()
            })
            .map(|rel| rel.r_id().to_string());

        let r_id = match existing {
            Some(r_id) => r_id,
            None => {
                let r_id = self.next_r_id();
                self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), false);
                r_id
            },
        };
        &self.rels[&r_id]
    }

    /// Lowest unused ID of the form "rIdN", filling gaps first.
    fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self
            .rels
            .keys()
            .filter_map(|r_id| {
                r_id.strip_prefix("rId")
                    .and_then(|digits| atoi_simd::parse::<u32>(digits.as_bytes()).ok())
            })
            .collect();
        used.sort_unstable();

        let mut next = 1u32;
        for num in used {
            match num.cmp(&next) {
                std::cmp::Ordering::Equal => next += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next)
    }

    /// The single relationship of a type.
    ///
    /// Fails if there is none, or more than one.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.values().filter(|rel| rel.reltype() == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    /// All relationships of a type, ordered by relationship ID.
    pub fn with_reltype<'a>(&'a self, reltype: &'a str) -> Vec<&'a Relationship> {
        let mut rels: Vec<&Relationship> = self
            .rels
            .values()
            .filter(|rel| rel.reltype() == reltype)
            .collect();
        rels.sort_by(|a, b| a.r_id().cmp(b.r_id()));
        rels
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize to the content of a `.rels` member, sorted by rId for stable output.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by(|a, b| a.r_id().cmp(b.r_id()));

        for rel in rels {
            let target_mode = if rel.is_external() {
                r#" TargetMode="External""#
            } else {
                ""
            };

            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref()),
                target_mode
            ));
        }

        xml.push_str("</Relationships>");

        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;

    #[test]
    fn test_next_r_id_fills_gaps() {
        let mut rels = Relationships::new("/ppt".to_string());
        assert_eq!(rels.next_r_id(), "rId1");

        rels.add_relationship(rt::SLIDE_MASTER.into(), "a.xml".into(), "rId1".into(), false);
        rels.add_relationship(rt::THEME.into(), "b.xml".into(), "rId3".into(), false);
        assert_eq!(rels.next_r_id(), "rId2");
    }

    #[test]
    fn test_next_r_id_ignores_custom_ids() {
        let mut rels = Relationships::new("/ppt".to_string());
        rels.add_relationship(rt::SLIDE.into(), "slides/slide1.xml".into(), "rel256".into(), false);
        assert_eq!(rels.next_r_id(), "rId1");
    }

    #[test]
    fn test_get_or_add_reuses() {
        let mut rels = Relationships::new("/ppt/slides".to_string());
        let layout = "../slideLayouts/slideLayout1.xml";

        assert_eq!(rels.get_or_add(rt::SLIDE_LAYOUT, layout).r_id(), "rId1");
        assert_eq!(rels.get_or_add(rt::SLIDE_LAYOUT, layout).r_id(), "rId1");
        assert_eq!(rels.len(), 1);
    }

    #[test]
    fn test_add_unique_rejects_taken_id() {
        let mut rels = Relationships::new("/ppt/slides".to_string());
        rels.add_unique(rt::IMAGE, "../media/image1.png", "relId1").unwrap();

        let err = rels.add_unique(rt::IMAGE, "../media/image2.png", "relId1").unwrap_err();
        assert!(matches!(err, OpcError::DuplicateRelationship { .. }));
        assert_eq!(rels.get("relId1").unwrap().target_ref(), "../media/image1.png");
    }

    #[test]
    fn test_part_with_reltype() {
        let mut rels = Relationships::new("/ppt/slides".to_string());
        assert!(rels.part_with_reltype(rt::SLIDE_LAYOUT).is_err());

        rels.add_relationship(rt::SLIDE_LAYOUT.into(), "../slideLayouts/slideLayout1.xml".into(), "rId1".into(), false);
        let rel = rels.part_with_reltype(rt::SLIDE_LAYOUT).unwrap();
        assert_eq!(
            rel.target_partname().unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout1.xml"
        );

        rels.add_relationship(rt::SLIDE_LAYOUT.into(), "../slideLayouts/slideLayout2.xml".into(), "rId2".into(), false);
        assert!(matches!(
            rels.part_with_reltype(rt::SLIDE_LAYOUT),
            Err(OpcError::InvalidRelationship(_))
        ));
    }

    #[test]
    fn test_to_xml_sorted_and_escaped() {
        let mut rels = Relationships::new("/ppt".to_string());
        rels.add_relationship(rt::SLIDE.into(), "slides/slide2.xml".into(), "rel257".into(), false);
        rels.add_relationship(rt::SLIDE.into(), "slides/slide1.xml".into(), "rel256".into(), false);
        rels.add_relationship("http://x/hyperlink".into(), "http://a.b/?q=1&r=2".into(), "rId9".into(), true);

        let xml = rels.to_xml();
        let first = xml.find("rel256").unwrap();
        let second = xml.find("rel257").unwrap();
        assert!(first < second);
        assert!(xml.contains(r#"Target="http://a.b/?q=1&amp;r=2" TargetMode="External""#));
    }
}
