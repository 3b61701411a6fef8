//! Package parts.
//!
//! A part is a named blob with a content type and its own relationships.
//! XML parts additionally expose a quick-xml reader over their content.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use memchr::memmem;
use quick_xml::Reader;

/// A part in an OPC package.
pub trait Part: Send {
    fn partname(&self) -> &PackURI;

    fn content_type(&self) -> &str;

    /// Raw content of this part.
    fn blob(&self) -> &[u8];

    /// Replace the content of this part. Relationships are untouched.
    fn set_blob(&mut self, blob: Vec<u8>);

    fn rels(&self) -> &Relationships;

    fn rels_mut(&mut self) -> &mut Relationships;

    /// Relate this part to `target_ref` (relative to this part's directory),
    /// reusing an existing relationship of the same type and target.
    fn relate_to(&mut self, target_ref: &str, reltype: &str) -> String {
        let rel = self.rels_mut().get_or_add(reltype, target_ref);
        rel.r_id().to_string()
    }

    /// Target reference for a relationship ID.
    fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels()
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))
    }

    /// Number of `r:id="..."` and `r:embed="..."` references to `r_id` in the content.
    fn rel_ref_count(&self, r_id: &str) -> usize {
        let blob = self.blob();
        ["r:id", "r:embed"]
            .iter()
            .map(|attr| {
                let pattern = format!(r#"{}="{}""#, attr, r_id);
                memmem::Finder::new(pattern.as_bytes())
                    .find_iter(blob)
                    .count()
            })
            .sum()
    }
}

/// A binary part such as an embedded picture.
#[derive(Debug)]
pub struct BlobPart {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl BlobPart {
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob,
            rels,
        }
    }
}

impl Part for BlobPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.blob
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// An XML part. Content is kept as UTF-8 bytes and parsed on demand.
#[derive(Debug)]
pub struct XmlPart {
    partname: PackURI,
    content_type: String,
    xml_bytes: Vec<u8>,
    rels: Relationships,
}

impl XmlPart {
    pub fn new(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            xml_bytes,
            rels,
        }
    }

    /// Load an XML part from raw data, rejecting content that isn't UTF-8.
    pub fn load(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&xml_bytes).map_err(|e| {
            OpcError::XmlError(format!("Invalid UTF-8 in XML part {}: {}", partname, e))
        })?;

        Ok(Self::new(partname, content_type, xml_bytes))
    }

    /// A quick-xml reader over the content, with text trimming enabled.
    pub fn reader(&self) -> Reader<&[u8]> {
        let mut reader = Reader::from_reader(self.xml_bytes.as_slice());
        reader.config_mut().trim_text(true);
        reader
    }

    pub fn xml_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.xml_bytes).map_err(Into::into)
    }
}

impl Part for XmlPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.xml_bytes
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.xml_bytes = blob;
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// Picks the part implementation for a content type.
pub struct PartFactory;

impl PartFactory {
    pub fn load(partname: PackURI, content_type: String, blob: Vec<u8>) -> Result<Box<dyn Part>> {
        if Self::is_xml_content_type(&content_type) {
            Ok(Box::new(XmlPart::load(partname, content_type, blob)?))
        } else {
            Ok(Box::new(BlobPart::new(partname, content_type, blob)))
        }
    }

    #[inline]
    pub fn is_xml_content_type(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type.ends_with("/xml")
    }
}
