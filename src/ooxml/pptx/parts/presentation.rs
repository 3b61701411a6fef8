/// Presentation part - the main part in a .pptx package.
///
/// Corresponds to `/ppt/presentation.xml` in the package.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::parts::id_attrs;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// One `<p:sldId>` (or `<p:sldMasterId>`) entry: numeric id plus the
/// presentation-part relationship that points at the slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideIdEntry {
    pub id: u32,
    pub r_id: String,
}

/// The main presentation part.
pub struct PresentationPart<'a> {
    part: &'a dyn Part,
}

impl<'a> PresentationPart<'a> {
    /// Wrap an OPC part, checking that it is a presentation main part.
    pub fn from_part(part: &'a dyn Part) -> Result<Self> {
        match part.content_type() {
            ct::PML_PRESENTATION_MAIN | ct::PML_PRES_MACRO_MAIN | ct::PML_TEMPLATE_MAIN => {
                Ok(Self { part })
            },
            other => Err(OoxmlError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: other.to_string(),
            }),
        }
    }

    #[inline]
    fn xml_bytes(&self) -> &[u8] {
        self.part.blob()
    }

    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }

    /// Slide list entries in presentation order.
    pub fn slide_ids(&self) -> Result<Vec<SlideIdEntry>> {
        self.id_list(b"sldId")
    }

    /// Slide master list entries in presentation order.
    pub fn slide_master_ids(&self) -> Result<Vec<SlideIdEntry>> {
        self.id_list(b"sldMasterId")
    }

    fn id_list(&self, element: &[u8]) -> Result<Vec<SlideIdEntry>> {
        let mut reader = Reader::from_reader(self.xml_bytes());
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.local_name().as_ref() == element =>
                {
                    let (id, r_id) = id_attrs(e)?;
                    let id = id
                        .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
                        .ok_or_else(|| {
                            OoxmlError::Xml(format!(
                                "<{}> without a numeric id",
                                String::from_utf8_lossy(element)
                            ))
                        })?;
                    let r_id = r_id.ok_or_else(|| {
                        OoxmlError::Xml(format!(
                            "<{}> {} without r:id",
                            String::from_utf8_lossy(element),
                            id
                        ))
                    })?;
                    entries.push(SlideIdEntry { id, r_id });
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(entries)
    }
}

/// Children of `<p:presentation>` that precede `<p:sldIdLst>`.
const BEFORE_SLD_ID_LST: [&[u8]; 4] = [
    b"sldMasterIdLst",
    b"notesMasterIdLst",
    b"handoutMasterIdLst",
    b"sldIdLst",
];

/// Rewrite presentation XML with `entries` appended to its slide list.
///
/// An existing `<p:sldIdLst>` is extended in place. Otherwise a new list is
/// inserted before the first child that must follow it (usually `<p:sldSz>`).
/// Element and relationship prefixes are taken from the document itself.
pub fn append_slide_ids(xml: &[u8], entries: &[SlideIdEntry]) -> Result<Vec<u8>> {
    if entries.is_empty() {
        return Ok(xml.to_vec());
    }

    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + entries.len() * 48));

    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut r_prefix: Option<String> = None;
    let mut done = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;

        match event {
            Event::Start(ref e) if depth == 0 => {
                if let Some(p) = e.name().prefix() {
                    prefix = format!("{}:", String::from_utf8_lossy(p.as_ref()));
                }
                r_prefix = relationships_prefix(e)?;
                depth += 1;
                write(&mut writer, event)?;
            },
            Event::Start(ref e) => {
                // An open sldIdLst gets its entries in front of the end tag
                if depth == 1 && !done && !BEFORE_SLD_ID_LST.contains(&e.local_name().as_ref()) {
                    write_slide_id_lst(&mut writer, &prefix, r_prefix.as_deref(), entries)?;
                    done = true;
                }
                depth += 1;
                write(&mut writer, event)?;
            },
            Event::Empty(ref e) if depth == 1 && !done => {
                let is_list = e.local_name().as_ref() == b"sldIdLst";
                if is_list || !BEFORE_SLD_ID_LST.contains(&e.local_name().as_ref()) {
                    write_slide_id_lst(&mut writer, &prefix, r_prefix.as_deref(), entries)?;
                    done = true;
                }
                if !is_list {
                    write(&mut writer, event)?;
                }
            },
            Event::End(ref e) => {
                if !done {
                    if depth == 2 && e.local_name().as_ref() == b"sldIdLst" {
                        write_entries(&mut writer, &prefix, r_prefix.as_deref(), entries)?;
                        done = true;
                    } else if depth == 1 {
                        write_slide_id_lst(&mut writer, &prefix, r_prefix.as_deref(), entries)?;
                        done = true;
                    }
                }
                depth = depth.saturating_sub(1);
                write(&mut writer, event)?;
            },
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    if !done {
        return Err(OoxmlError::InvalidFormat(
            "presentation part has no root element".to_string(),
        ));
    }

    Ok(writer.into_inner())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| OoxmlError::Xml(e.to_string()))
}

/// Prefix bound to the officeDocument relationships namespace on the root element.
fn relationships_prefix(root: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in root.attributes() {
        let attr = attr?;
        if let Some(declared) = attr.key.as_ref().strip_prefix(b"xmlns:")
            && attr.value.as_ref() == namespace::OFC_RELATIONSHIPS.as_bytes()
        {
            return Ok(Some(String::from_utf8_lossy(declared).into_owned()));
        }
    }
    Ok(None)
}

fn write_slide_id_lst(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    r_prefix: Option<&str>,
    entries: &[SlideIdEntry],
) -> Result<()> {
    let name = format!("{}sldIdLst", prefix);
    write(writer, Event::Start(BytesStart::new(name.as_str())))?;
    write_entries(writer, prefix, r_prefix, entries)?;
    write(writer, Event::End(BytesEnd::new(name.as_str())))
}

/// Without a declared prefix each entry declares `r` itself.
fn write_entries(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    r_prefix: Option<&str>,
    entries: &[SlideIdEntry],
) -> Result<()> {
    let name = format!("{}sldId", prefix);
    let r_attr = format!("{}:id", r_prefix.unwrap_or("r"));

    for entry in entries {
        let id = entry.id.to_string();
        let mut elem = BytesStart::new(name.as_str());
        elem.push_attribute(("id", id.as_str()));
        elem.push_attribute((r_attr.as_str(), entry.r_id.as_str()));
        if r_prefix.is_none() {
            elem.push_attribute(("xmlns:r", namespace::OFC_RELATIONSHIPS));
        }
        write(writer, Event::Empty(elem))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::opc::part::XmlPart;

    const PRESENTATION_NO_SLIDES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#;

    fn part(xml: &[u8]) -> XmlPart {
        XmlPart::new(
            PackURI::new("/ppt/presentation.xml").unwrap(),
            ct::PML_PRESENTATION_MAIN.to_string(),
            xml.to_vec(),
        )
    }

    fn entry(id: u32) -> SlideIdEntry {
        SlideIdEntry {
            id,
            r_id: format!("rel{}", id),
        }
    }

    #[test]
    fn test_reads_masters_and_size() {
        let part = part(PRESENTATION_NO_SLIDES.as_bytes());
        let pres = PresentationPart::from_part(&part).unwrap();

        assert!(pres.slide_ids().unwrap().is_empty());
        assert_eq!(
            pres.slide_master_ids().unwrap(),
            vec![SlideIdEntry {
                id: 2147483648,
                r_id: "rId1".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_other_content_types() {
        let part = XmlPart::new(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            b"<p:sld/>".to_vec(),
        );
        assert!(matches!(
            PresentationPart::from_part(&part),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_append_inserts_list_before_slide_size() {
        let xml = append_slide_ids(PRESENTATION_NO_SLIDES.as_bytes(), &[entry(256), entry(257)]).unwrap();
        let text = String::from_utf8(xml.clone()).unwrap();

        assert!(text.contains(
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rel256"/><p:sldId id="257" r:id="rel257"/></p:sldIdLst><p:sldSz"#
        ));

        let part = part(&xml);
        let pres = PresentationPart::from_part(&part).unwrap();
        assert_eq!(pres.slide_ids().unwrap(), vec![entry(256), entry(257)]);
    }

    #[test]
    fn test_append_extends_existing_list() {
        let base = PRESENTATION_NO_SLIDES.replace(
            "</p:sldMasterIdLst>",
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="300" r:id="rId7"/></p:sldIdLst>"#,
        );
        let xml = append_slide_ids(base.as_bytes(), &[entry(301)]).unwrap();

        let part = part(&xml);
        let pres = PresentationPart::from_part(&part).unwrap();
        assert_eq!(
            pres.slide_ids().unwrap(),
            vec![
                SlideIdEntry {
                    id: 300,
                    r_id: "rId7".to_string()
                },
                entry(301)
            ]
        );
    }

    #[test]
    fn test_append_expands_empty_list() {
        let base = PRESENTATION_NO_SLIDES
            .replace("</p:sldMasterIdLst>", "</p:sldMasterIdLst><p:sldIdLst/>");
        let xml = append_slide_ids(base.as_bytes(), &[entry(256)]).unwrap();
        let text = String::from_utf8(xml).unwrap();

        assert!(text.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rel256"/></p:sldIdLst>"#));
        assert!(!text.contains("<p:sldIdLst/>"));
    }

    #[test]
    fn test_append_with_default_namespace_and_no_r_prefix() {
        let base = r#"<presentation xmlns="http://schemas.openxmlformats.org/presentationml/2006/main"><sldMasterIdLst/></presentation>"#;
        let xml = append_slide_ids(base.as_bytes(), &[entry(256)]).unwrap();
        let text = String::from_utf8(xml).unwrap();

        assert!(text.contains(r#"<sldIdLst><sldId id="256" r:id="rel256" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"/></sldIdLst></presentation>"#));
    }

    #[test]
    fn test_append_nothing_is_identity() {
        let xml = append_slide_ids(PRESENTATION_NO_SLIDES.as_bytes(), &[]).unwrap();
        assert_eq!(xml, PRESENTATION_NO_SLIDES.as_bytes());
    }
}
