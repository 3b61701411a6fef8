//! Structural validation of a finished presentation package.
//!
//! The validator reopens the package from its bytes and reports problems as
//! [`ValidationFinding`]s instead of failing on the first one. Only a file
//! that is not a ZIP archive at all is an error.
//!
//! Locations are `partname#path`, where the path is the element path inside
//! the part, e.g. `/ppt/slides/slide1.xml#/p:sld/p:cSld`.

use crate::common::unit::MAX_POSITIVE_COORDINATE;
use crate::common::xml::attr_value;
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::{ContentTypeMap, SerializedRels, parse_rels_xml};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Lowest slide id allowed in `<p:sldId>`.
pub const MIN_SLIDE_ID: u32 = 256;

/// Slide ids must stay below this value; master and layout ids start here.
pub const MASTER_ID_BASE: u32 = 2_147_483_648;

/// One structural problem in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub description: String,
    pub location: String,
}

impl ValidationFinding {
    fn new(description: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.description)
    }
}

/// Validate the package at `path`.
pub fn validate_package<P: AsRef<Path>>(path: P) -> Result<Vec<ValidationFinding>> {
    let data = std::fs::read(path)?;
    validate_bytes(&data)
}

/// Validate a package held in memory.
pub fn validate_bytes(data: &[u8]) -> Result<Vec<ValidationFinding>> {
    let reader = PhysPkgReader::from_bytes(data)?;
    let mut validator = Validator::new(&reader);
    validator.run();

    debug!(findings = validator.findings.len(), "validated package");
    Ok(validator.findings)
}

struct Validator<'a> {
    reader: &'a PhysPkgReader,
    content_types: ContentTypeMap,
    /// Relationships by source partname, for every well-formed `.rels` member
    rels: HashMap<PackURI, SerializedRels>,
    /// Partnames of XML members that failed to parse
    malformed: HashSet<String>,
    findings: Vec<ValidationFinding>,
}

impl<'a> Validator<'a> {
    fn new(reader: &'a PhysPkgReader) -> Self {
        Self {
            reader,
            content_types: ContentTypeMap::default(),
            rels: HashMap::new(),
            malformed: HashSet::new(),
            findings: Vec::new(),
        }
    }

    fn report(&mut self, description: impl Into<String>, location: impl Into<String>) {
        self.findings.push(ValidationFinding::new(description, location));
    }

    fn run(&mut self) {
        self.check_well_formed();
        self.load_content_types();
        self.load_relationships();
        self.check_relationship_targets();

        if let Some(presentation) = self.check_presentation() {
            let mut slides: Vec<PackURI> = self
                .members()
                .into_iter()
                .filter(|partname| self.content_type(partname) == Some(ct::PML_SLIDE))
                .collect();
            slides.sort();
            for slide in slides {
                self.check_slide(&slide);
            }
            debug!(presentation = %presentation, "checked presentation and slides");
        }
    }

    fn members(&self) -> Vec<PackURI> {
        self.reader
            .member_names()
            .into_iter()
            .filter_map(|name| PackURI::new(format!("/{}", name)).ok())
            .collect()
    }

    fn content_type(&self, partname: &PackURI) -> Option<&'static str> {
        // Only the PresentationML types the checks care about
        let found = self.content_types.get(partname).ok()?;
        [ct::PML_SLIDE, ct::PML_SLIDE_LAYOUT, ct::PML_SLIDE_MASTER]
            .into_iter()
            .find(|known| *known == found)
    }

    fn blob(&self, partname: &PackURI) -> Option<&'a [u8]> {
        self.reader.blob_for(partname).ok()
    }

    fn check_well_formed(&mut self) {
        for partname in self.members() {
            let ext = partname.ext().to_ascii_lowercase();
            if ext != "xml" && ext != "rels" {
                continue;
            }
            let Some(blob) = self.blob(&partname) else {
                continue;
            };

            let mut reader = Reader::from_reader(blob);
            let result = loop {
                match reader.read_event() {
                    Ok(Event::Eof) => break Ok(()),
                    Ok(_) => {},
                    Err(e) => break Err(e),
                }
            };
            if let Err(e) = result {
                self.report(
                    format!("XML is not well-formed: {}", e),
                    format!("{}#/", partname),
                );
                self.malformed.insert(partname.to_string());
            }
        }
    }

    fn load_content_types(&mut self) {
        let location = format!("{}#/Types", CONTENT_TYPES_URI);
        match self.reader.content_types_xml() {
            Ok(xml) => match ContentTypeMap::from_xml(xml) {
                Ok(map) => self.content_types = map,
                Err(e) => self.report(format!("Content types cannot be read: {}", e), location),
            },
            Err(_) => self.report("Package has no content types part", location),
        }
    }

    fn load_relationships(&mut self) {
        for rels_uri in self.members() {
            if rels_uri.ext() != "rels" || self.malformed.contains(rels_uri.as_str()) {
                continue;
            }
            let Some(source) = source_of_rels(&rels_uri) else {
                continue;
            };
            let Some(blob) = self.blob(&rels_uri) else {
                continue;
            };

            match parse_rels_xml(blob, source.base_uri()) {
                Ok(srels) => {
                    if source.as_str() != PACKAGE_URI && !self.reader.contains(&source) {
                        self.report(
                            format!("Relationships belong to missing part {}", source),
                            format!("{}#/Relationships", rels_uri),
                        );
                    }
                    self.rels.insert(source, srels);
                },
                Err(e) => self.report(
                    format!("Relationships cannot be read: {}", e),
                    format!("{}#/Relationships", rels_uri),
                ),
            }
        }
    }

    fn check_relationship_targets(&mut self) {
        let mut missing = Vec::new();

        for (source, srels) in &self.rels {
            for srel in srels.iter().filter(|srel| !srel.is_external()) {
                let exists = srel
                    .target_partname()
                    .map(|target| self.reader.contains(&target))
                    .unwrap_or(false);
                if !exists {
                    let rels_uri = source
                        .rels_uri()
                        .map(|uri| uri.to_string())
                        .unwrap_or_default();
                    missing.push(ValidationFinding::new(
                        format!(
                            "Relationship {} targets missing part {}",
                            srel.r_id, srel.target_ref
                        ),
                        format!(
                            "{}#/Relationships/Relationship[@Id='{}']",
                            rels_uri, srel.r_id
                        ),
                    ));
                }
            }
        }

        missing.sort_by(|a, b| a.location.cmp(&b.location));
        self.findings.extend(missing);
    }

    /// Checks the slide master and slide lists. Returns the presentation partname
    /// when it could be located and parsed.
    fn check_presentation(&mut self) -> Option<PackURI> {
        let package = PackURI::new(PACKAGE_URI).ok()?;
        let main = self.rels.get(&package).and_then(|srels| {
            srels
                .iter()
                .find(|srel| srel.reltype == rt::OFFICE_DOCUMENT)
                .and_then(|srel| srel.target_partname().ok())
        });
        let Some(presentation) = main else {
            self.report("Package has no main presentation part", "/_rels/.rels#/Relationships");
            return None;
        };
        if self.malformed.contains(presentation.as_str()) {
            return None;
        }
        let blob = self.blob(&presentation)?;

        let lists = match read_id_lists(blob) {
            Ok(lists) => lists,
            Err(e) => {
                self.report(e, format!("{}#/p:presentation", presentation));
                return None;
            },
        };
        let pres_rels = self.rels.get(&presentation).cloned().unwrap_or_default();

        if lists.masters.is_empty() {
            self.report(
                "Presentation has no slide master",
                format!("{}#/p:presentation/p:sldMasterIdLst", presentation),
            );
        }
        for (i, (id, r_id)) in lists.masters.iter().enumerate() {
            let location = format!(
                "{}#/p:presentation/p:sldMasterIdLst/p:sldMasterId[{}]",
                presentation,
                i + 1
            );
            if *id < u64::from(MASTER_ID_BASE) {
                self.report(format!("Slide master id {} is below {}", id, MASTER_ID_BASE), &location);
            }
            self.check_list_target(&pres_rels, r_id, rt::SLIDE_MASTER, ct::PML_SLIDE_MASTER, &location);
        }

        let mut seen = HashSet::new();
        for (i, (id, r_id)) in lists.slides.iter().enumerate() {
            let location = format!(
                "{}#/p:presentation/p:sldIdLst/p:sldId[{}]",
                presentation,
                i + 1
            );
            if *id < u64::from(MIN_SLIDE_ID) || *id >= u64::from(MASTER_ID_BASE) {
                self.report(
                    format!(
                        "Slide id {} is outside [{}, {})",
                        id, MIN_SLIDE_ID, MASTER_ID_BASE
                    ),
                    &location,
                );
            }
            if !seen.insert(*id) {
                self.report(format!("Slide id {} is used more than once", id), &location);
            }
            self.check_list_target(&pres_rels, r_id, rt::SLIDE, ct::PML_SLIDE, &location);
        }

        Some(presentation)
    }

    fn check_list_target(
        &mut self,
        srels: &SerializedRels,
        r_id: &str,
        reltype: &str,
        content_type: &str,
        location: &str,
    ) {
        let Some(srel) = srels.iter().find(|srel| srel.r_id == r_id) else {
            self.report(format!("Relationship {} is not defined", r_id), location);
            return;
        };
        if srel.reltype != reltype {
            self.report(
                format!("Relationship {} has type {}, expected {}", r_id, srel.reltype, reltype),
                location,
            );
            return;
        }
        // Missing targets are reported by the relationship check
        if let Ok(target) = srel.target_partname()
            && self.reader.contains(&target)
            && self.content_type(&target) != Some(content_type)
        {
            self.report(
                format!("{} is not of type {}", target, content_type),
                location,
            );
        }
    }

    fn check_slide(&mut self, slide: &PackURI) {
        let srels = self.rels.get(slide).cloned().unwrap_or_default();

        let layouts = srels
            .iter()
            .filter(|srel| srel.reltype == rt::SLIDE_LAYOUT)
            .count();
        if layouts != 1 {
            self.report(
                format!("Slide has {} slide layout relationships, expected 1", layouts),
                format!("{}#/p:sld", slide),
            );
        }

        if self.malformed.contains(slide.as_str()) {
            return;
        }
        let Some(blob) = self.blob(slide) else {
            return;
        };

        let mut reader = Reader::from_reader(blob);
        let mut path: Vec<String> = Vec::new();
        let mut has_shape_tree = false;

        loop {
            let (e, is_empty) = match reader.read_event() {
                Ok(Event::Start(e)) => (e, false),
                Ok(Event::Empty(e)) => (e, true),
                Ok(Event::End(_)) => {
                    path.pop();
                    continue;
                },
                Ok(Event::Eof) | Err(_) => break,
                Ok(_) => continue,
            };

            let local = e.local_name();
            let local = local.as_ref();
            path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            let location = format!("{}#/{}", slide, path.join("/"));

            if local == b"spTree" && path.len() == 3 && path[1].ends_with("cSld") {
                has_shape_tree = true;
            }

            let parent_is_shape_xfrm = path.len() >= 3
                && path[path.len() - 2].ends_with("xfrm")
                && path[path.len() - 3].ends_with("spPr")
                && !path[path.len() - 3].ends_with("grpSpPr");

            for attr in e.attributes().flatten() {
                let key = attr.key;
                let Some(value) = attr_value(&attr) else {
                    continue;
                };

                if key.prefix().is_some()
                    && matches!(key.local_name().as_ref(), b"id" | b"embed" | b"link")
                    && !srels.iter().any(|srel| srel.r_id == value)
                {
                    self.report(format!("Reference to undefined relationship {}", value), &location);
                }

                if local == b"ext"
                    && parent_is_shape_xfrm
                    && matches!(key.as_ref(), b"cx" | b"cy")
                    && !atoi_simd::parse::<i64>(value.as_bytes())
                        .is_ok_and(|v| (1..=MAX_POSITIVE_COORDINATE).contains(&v))
                {
                    self.report(
                        format!(
                            "Extent {}=\"{}\" is outside [1, {}]",
                            String::from_utf8_lossy(key.as_ref()),
                            value,
                            MAX_POSITIVE_COORDINATE
                        ),
                        &location,
                    );
                }
            }

            if is_empty {
                path.pop();
            }
        }

        if !has_shape_tree {
            self.report("Slide has no shape tree", format!("{}#/p:sld/p:cSld", slide));
        }
    }
}

/// Source partname of a `.rels` member, e.g. "/ppt/slides/slide1.xml" for
/// "/ppt/slides/_rels/slide1.xml.rels" and "/" for "/_rels/.rels".
fn source_of_rels(rels_uri: &PackURI) -> Option<PackURI> {
    let dir = rels_uri.base_uri();
    let source_dir = dir.strip_suffix("/_rels").or_else(|| (dir == "/_rels").then_some(""))?;
    let source_name = rels_uri.filename().strip_suffix(".rels")?;

    let source = if source_name.is_empty() {
        PACKAGE_URI.to_string()
    } else {
        format!("{}/{}", source_dir, source_name)
    };
    PackURI::new(source).ok()
}

/// `(id, r:id)` pairs from the presentation's master and slide lists.
struct IdLists {
    masters: Vec<(u64, String)>,
    slides: Vec<(u64, String)>,
}

fn read_id_lists(xml: &[u8]) -> std::result::Result<IdLists, String> {
    let mut reader = Reader::from_reader(xml);
    let mut lists = IdLists {
        masters: Vec::new(),
        slides: Vec::new(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let target = match e.local_name().as_ref() {
                    b"sldMasterId" => &mut lists.masters,
                    b"sldId" => &mut lists.slides,
                    _ => continue,
                };
                let (id, r_id) = crate::ooxml::pptx::parts::id_attrs(&e).map_err(|e| e.to_string())?;
                let element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let id = id
                    .and_then(|id| atoi_simd::parse::<u64>(id.as_bytes()).ok())
                    .ok_or_else(|| format!("<{}> has no numeric id", element))?;
                let r_id = r_id.ok_or_else(|| format!("<{}> {} has no r:id", element, id))?;
                target.push((id, r_id));
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {},
        }
    }

    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::template::starter_template_bytes;
    use std::io::{Cursor, Read, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Copy a package, replacing or adding members.
    fn patch(bytes: &[u8], changes: &[(&str, &str)]) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let name = file.name().to_string();
            if changes.iter().any(|(n, _)| *n == name) {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            writer.start_file(name, options).unwrap();
            writer.write_all(&data).unwrap();
        }
        for (name, content) in changes {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    fn read_member(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_starter_template_is_clean() {
        let findings = validate_bytes(&starter_template_bytes().unwrap()).unwrap();
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_source_of_rels() {
        let source = |s: &str| source_of_rels(&PackURI::new(s).unwrap()).map(|u| u.to_string());
        assert_eq!(source("/_rels/.rels").as_deref(), Some("/"));
        assert_eq!(
            source("/ppt/_rels/presentation.xml.rels").as_deref(),
            Some("/ppt/presentation.xml")
        );
        assert_eq!(
            source("/ppt/slides/_rels/slide1.xml.rels").as_deref(),
            Some("/ppt/slides/slide1.xml")
        );
        assert_eq!(source("/ppt/slides/slide1.xml"), None);
    }

    #[test]
    fn test_malformed_xml() {
        let bytes = patch(
            &starter_template_bytes().unwrap(),
            &[("ppt/viewProps.xml", "<p:viewPr><p:gridSpacing></p:viewPr>")],
        );
        let findings = validate_bytes(&bytes).unwrap();

        assert_eq!(findings.len(), 1, "{:?}", findings);
        assert_eq!(findings[0].location, "/ppt/viewProps.xml#/");
        assert!(findings[0].description.starts_with("XML is not well-formed"));
    }

    #[test]
    fn test_missing_relationship_target() {
        let base = starter_template_bytes().unwrap();
        let rels = read_member(&base, "ppt/_rels/presentation.xml.rels").replace(
            "</Relationships>",
            r#"<Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme9.xml"/></Relationships>"#,
        );
        let bytes = patch(&base, &[("ppt/_rels/presentation.xml.rels", &rels)]);
        let findings = validate_bytes(&bytes).unwrap();

        assert_eq!(findings.len(), 1, "{:?}", findings);
        assert_eq!(
            findings[0].location,
            "/ppt/_rels/presentation.xml.rels#/Relationships/Relationship[@Id='rId9']"
        );
    }

    #[test]
    fn test_bad_slide_list() {
        let base = starter_template_bytes().unwrap();
        let pres = read_member(&base, "ppt/presentation.xml").replace(
            "</p:sldMasterIdLst>",
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="12" r:id="rId2"/><p:sldId id="300" r:id="rel300"/><p:sldId id="300" r:id="rel300"/></p:sldIdLst>"#,
        );
        let bytes = patch(&base, &[("ppt/presentation.xml", &pres)]);
        let findings = validate_bytes(&bytes).unwrap();
        let descriptions: Vec<&str> = findings.iter().map(|f| f.description.as_str()).collect();

        assert!(descriptions.contains(&"Slide id 12 is outside [256, 2147483648)"));
        assert!(descriptions.iter().any(|d| d.starts_with("Relationship rId2 has type")));
        assert!(descriptions.contains(&"Relationship rel300 is not defined"));
        assert!(descriptions.contains(&"Slide id 300 is used more than once"));
        assert!(findings
            .iter()
            .any(|f| f.location == "/ppt/presentation.xml#/p:presentation/p:sldIdLst/p:sldId[3]"));
    }

    /// The starter template plus one slide, wired into the slide list but
    /// without a layout relationship.
    fn deck_with_slide(slide: &str) -> Vec<u8> {
        let base = starter_template_bytes().unwrap();
        let pres = read_member(&base, "ppt/presentation.xml").replace(
            "</p:sldMasterIdLst>",
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rel256"/></p:sldIdLst>"#,
        );
        let pres_rels = read_member(&base, "ppt/_rels/presentation.xml.rels").replace(
            "</Relationships>",
            r#"<Relationship Id="rel256" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#,
        );
        let content_types = read_member(&base, "[Content_Types].xml").replace(
            "</Types>",
            r#"<Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/></Types>"#,
        );

        patch(
            &base,
            &[
                ("ppt/presentation.xml", &pres),
                ("ppt/_rels/presentation.xml.rels", &pres_rels),
                ("[Content_Types].xml", &content_types),
                ("ppt/slides/slide1.xml", slide),
            ],
        )
    }

    fn picture_slide(cx: &str, cy: &str) -> String {
        format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:pic><p:blipFill><a:blip r:embed="relId1"/></p:blipFill><p:spPr><a:xfrm><a:off x="100" y="100"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr></p:pic></p:spTree></p:cSld></p:sld>"#,
            cx, cy
        )
    }

    #[test]
    fn test_bad_slide() {
        let findings = validate_bytes(&deck_with_slide(&picture_slide("0", "5"))).unwrap();
        let descriptions: Vec<&str> = findings.iter().map(|f| f.description.as_str()).collect();

        assert_eq!(findings.len(), 3, "{:?}", findings);
        assert!(descriptions.contains(&"Slide has 0 slide layout relationships, expected 1"));
        assert!(descriptions.contains(&"Reference to undefined relationship relId1"));
        assert!(descriptions.contains(&"Extent cx=\"0\" is outside [1, 27273042316900]"));
        assert!(findings.iter().any(|f| f.location
            == "/ppt/slides/slide1.xml#/p:sld/p:cSld/p:spTree/p:pic/p:spPr/a:xfrm/a:ext"));
    }

    #[test]
    fn test_oversized_extent() {
        let slide = picture_slide("348815917968750", "6858000");
        let findings = validate_bytes(&deck_with_slide(&slide)).unwrap();
        let descriptions: Vec<&str> = findings.iter().map(|f| f.description.as_str()).collect();
        assert!(descriptions.contains(&"Extent cx=\"348815917968750\" is outside [1, 27273042316900]"));
        assert!(!descriptions.iter().any(|d| d.starts_with("Extent cy")));

        // The largest allowed value is fine
        let slide = picture_slide("27273042316900", "6858000");
        let findings = validate_bytes(&deck_with_slide(&slide)).unwrap();
        assert!(!findings.iter().any(|f| f.description.starts_with("Extent")), "{:?}", findings);
    }

    #[test]
    fn test_not_a_package() {
        assert!(validate_bytes(b"definitely not a zip").is_err());
    }
}
