//! Serializes an [`OpcPackage`] into a ZIP archive: `[Content_Types].xml`,
//! the package relationships, then every part followed by its `.rels` member.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use std::collections::BTreeMap;
use std::path::Path;

pub struct PackageWriter;

impl PackageWriter {
    /// Write a package to a file, replacing it if it exists.
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage) -> Result<()> {
        let bytes = Self::to_bytes(package)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut phys_writer = PhysPkgWriter::new();

        let content_types_uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        let cti = ContentTypesItem::from_package(package);
        phys_writer.write(&content_types_uri, cti.to_xml().as_bytes())?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_rels_uri = package_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        phys_writer.write(&pkg_rels_uri, package.rels().to_xml().as_bytes())?;

        for part in package.iter_parts() {
            // Pictures are already compressed
            if part.content_type().starts_with("image/") {
                phys_writer.write_stored(part.partname(), part.blob())?;
            } else {
                phys_writer.write(part.partname(), part.blob())?;
            }

            if !part.rels().is_empty() {
                let rels_uri = part
                    .partname()
                    .rels_uri()
                    .map_err(OpcError::InvalidPackUri)?;
                phys_writer.write(&rels_uri, part.rels().to_xml().as_bytes())?;
            }
        }

        phys_writer.finish()
    }
}

/// Default and Override entries of `[Content_Types].xml`.
struct ContentTypesItem {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    fn from_package(package: &OpcPackage) -> Self {
        let mut cti = Self::new();

        for part in package.iter_parts() {
            cti.add_content_type(part.partname(), part.content_type());
        }

        cti
    }

    /// Well-known extension pairs become Default entries unless the extension
    /// is already claimed by another type; everything else is an Override.
    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_lowercase();

        if Self::is_default_content_type(&ext, content_type) {
            let claimed = self
                .defaults
                .entry(ext)
                .or_insert_with(|| content_type.to_string());
            if claimed == content_type {
                return;
            }
        }

        self.overrides
            .insert(partname.to_string(), content_type.to_string());
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024 + self.overrides.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");

        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypesItem::new();
        cti.add_content_type(&PackURI::new("/ppt/media/image1.png").unwrap(), ct::PNG);
        cti.add_content_type(&PackURI::new("/ppt/media/image2.bmp").unwrap(), ct::BMP);
        cti.add_content_type(
            &PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE,
        );

        let xml = cti.to_xml();

        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Default Extension="bmp" ContentType="image/bmp"/>"#));
        assert!(xml.contains(r#"<Override PartName="/ppt/slides/slide1.xml""#));
    }

    #[test]
    fn test_conflicting_extension_falls_back_to_override() {
        let mut cti = ContentTypesItem::new();
        cti.defaults.insert("png".to_string(), "image/x-custom".to_string());
        cti.add_content_type(&PackURI::new("/ppt/media/image1.png").unwrap(), ct::PNG);

        assert_eq!(cti.defaults["png"], "image/x-custom");
        assert_eq!(cti.overrides["/ppt/media/image1.png"], ct::PNG);
    }
}
