/// Slide master part.
///
/// Corresponds to `/ppt/slideMasters/slideMasterN.xml` in the package.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::parts::id_attrs;
use quick_xml::Reader;
use quick_xml::events::Event;

pub struct SlideMasterPart<'a> {
    part: &'a dyn Part,
}

impl<'a> SlideMasterPart<'a> {
    pub fn from_part(part: &'a dyn Part) -> Result<Self> {
        if part.content_type() != ct::PML_SLIDE_MASTER {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_SLIDE_MASTER.to_string(),
                got: part.content_type().to_string(),
            });
        }
        Ok(Self { part })
    }

    /// Relationship IDs of the layouts in `<p:sldLayoutIdLst>`, in order.
    pub fn slide_layout_rids(&self) -> Result<Vec<String>> {
        let mut reader = Reader::from_reader(self.part.blob());
        reader.config_mut().trim_text(true);

        let mut rids = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.local_name().as_ref() == b"sldLayoutId" =>
                {
                    if let (_, Some(r_id)) = id_attrs(e)? {
                        rids.push(r_id);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(rids)
    }

    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::opc::part::XmlPart;

    #[test]
    fn test_slide_layout_rids() {
        let xml = br#"<p:sldMaster xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:cSld><p:spTree/></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId3"/></p:sldLayoutIdLst></p:sldMaster>"#;
        let part = XmlPart::new(
            PackURI::new("/ppt/slideMasters/slideMaster1.xml").unwrap(),
            ct::PML_SLIDE_MASTER.to_string(),
            xml.to_vec(),
        );

        let master = SlideMasterPart::from_part(&part).unwrap();
        assert_eq!(master.slide_layout_rids().unwrap(), vec!["rId1", "rId3"]);
    }

    #[test]
    fn test_wrong_content_type() {
        let part = XmlPart::new(
            PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap(),
            ct::PML_SLIDE_LAYOUT.to_string(),
            b"<p:sldLayout/>".to_vec(),
        );
        assert!(SlideMasterPart::from_part(&part).is_err());
    }
}
