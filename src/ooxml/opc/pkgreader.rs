//! Read-only view of a serialized OPC package: content types, relationships
//! and the parts reachable from the package relationships.

use crate::common::xml::attr_value;
use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

pub type SerializedRels = SmallVec<[SerializedRelationship; 8]>;

/// A part as loaded from the physical package, before it becomes a [`Part`](super::Part).
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,
    pub blob: Vec<u8>,
    pub srels: SerializedRels,
}

/// A relationship as read from a `.rels` member.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    /// Directory of the source part, used to resolve `target_ref`
    pub base_uri: String,
    pub r_id: String,
    pub reltype: String,
    pub target_ref: String,
    pub target_mode: String,
}

impl SerializedRelationship {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }

    /// Absolute partname of an internal target.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external and has no target part",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Content types by partname override or by extension default.
#[derive(Debug, Default)]
pub struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    /// Parse `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let (key_attr, is_default) = match e.local_name().as_ref() {
                        b"Default" => (b"Extension".as_slice(), true),
                        b"Override" => (b"PartName".as_slice(), false),
                        _ => {
                            buf.clear();
                            continue;
                        },
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == key_attr {
                            key = attr_value(&attr);
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = attr_value(&attr);
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            map.defaults.insert(key.to_lowercase(), ct);
                        } else {
                            map.overrides.insert(key.to_lowercase(), ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Content type for a partname: override first, then extension default.
    /// Partname and extension comparisons are case-insensitive.
    pub fn get(&self, pack_uri: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(&pack_uri.as_str().to_lowercase()) {
            return Ok(ct.clone());
        }

        if let Some(ct) = self.defaults.get(&pack_uri.ext().to_lowercase()) {
            return Ok(ct.clone());
        }

        Err(OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Parse a `.rels` member whose source part lives in `base_uri`.
pub fn parse_rels_xml(rels_xml: &[u8], base_uri: &str) -> Result<SerializedRels> {
    let mut srels = SmallVec::new();
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut r_id = None;
                let mut reltype = None;
                let mut target_ref = None;
                let mut mode = target_mode::INTERNAL.to_string();

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => r_id = attr_value(&attr),
                        b"Type" => reltype = attr_value(&attr),
                        b"Target" => target_ref = attr_value(&attr),
                        b"TargetMode" => {
                            if let Some(value) = attr_value(&attr) {
                                mode = value;
                            }
                        },
                        _ => {},
                    }
                }

                if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref) {
                    srels.push(SerializedRelationship {
                        base_uri: base_uri.to_string(),
                        r_id,
                        reltype,
                        target_ref,
                        target_mode: mode,
                    });
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(srels)
}

/// Parts and relationships of a package, loaded by walking the relationship
/// graph from the package root.
pub struct PackageReader {
    pkg_srels: SerializedRels,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    pub fn from_phys_reader(phys_reader: PhysPkgReader) -> Result<Self> {
        let mut members = phys_reader.into_members();

        let content_types_xml = members
            .get(CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))?;
        let content_types = ContentTypeMap::from_xml(content_types_xml)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = Self::load_rels(&members, &package_uri)?;
        let sparts = Self::load_parts(&mut members, &pkg_srels, &content_types)?;

        Ok(Self { pkg_srels, sparts })
    }

    fn load_rels(
        members: &HashMap<String, Vec<u8>>,
        source_uri: &PackURI,
    ) -> Result<SerializedRels> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;

        match members.get(rels_uri.membername()) {
            Some(xml) => parse_rels_xml(xml, source_uri.base_uri()),
            None => Ok(SmallVec::new()),
        }
    }

    /// Every internal target reachable from the package relationships must exist.
    fn load_parts(
        members: &mut HashMap<String, Vec<u8>>,
        pkg_srels: &[SerializedRelationship],
        content_types: &ContentTypeMap,
    ) -> Result<Vec<SerializedPart>> {
        let mut sparts = Vec::with_capacity(32);
        let mut visited = HashSet::with_capacity(32);
        let mut work_queue: Vec<PackURI> = Vec::with_capacity(pkg_srels.len());

        let mut enqueue = |srels: &[SerializedRelationship], queue: &mut Vec<PackURI>| {
            for srel in srels.iter().filter(|srel| !srel.is_external()) {
                if let Ok(partname) = srel.target_partname()
                    && visited.insert(partname.clone())
                {
                    queue.push(partname);
                }
            }
        };

        enqueue(pkg_srels, &mut work_queue);

        while let Some(partname) = work_queue.pop() {
            let srels = Self::load_rels(members, &partname)?;
            enqueue(&srels, &mut work_queue);

            let blob = members
                .remove(partname.membername())
                .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
            let content_type = content_types.get(&partname)?;

            sparts.push(SerializedPart {
                partname,
                content_type,
                blob,
                srels,
            });
        }

        Ok(sparts)
    }

    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    pub fn iter_sparts(&self) -> impl Iterator<Item = &SerializedPart> {
        self.sparts.iter()
    }

    /// Split into package relationships and parts.
    pub fn into_parts(self) -> (SerializedRels, Vec<SerializedPart>) {
        (self.pkg_srels, self.sparts)
    }
}
