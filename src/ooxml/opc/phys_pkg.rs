//! Physical access to a ZIP-based OPC package.
//!
//! The reader inflates every member up front; presentation templates are small
//! and the assembler rewrites the whole package anyway.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Member contents of a package, keyed by membername (partname without the leading slash).
pub struct PhysPkgReader {
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }

        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(name, blob);
        }

        Ok(Self { members })
    }

    /// Content of the member for `pack_uri`.
    pub fn blob_for(&self, pack_uri: &PackURI) -> Result<&[u8]> {
        self.members
            .get(pack_uri.membername())
            .map(Vec::as_slice)
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    pub fn content_types_xml(&self) -> Result<&[u8]> {
        self.blob_for(&PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?)
    }

    /// The `.rels` member for `source_uri`, if it has one.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Result<Option<&[u8]>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Ok(self.members.get(rels_uri.membername()).map(Vec::as_slice))
    }

    #[inline]
    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.members.contains_key(pack_uri.membername())
    }

    /// Membernames in lexical order.
    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Take ownership of all member contents.
    pub fn into_members(self) -> HashMap<String, Vec<u8>> {
        self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Writes package members into an in-memory ZIP archive.
pub struct PhysPkgWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Write a member with deflate compression.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(pack_uri.membername(), options)?;
        self.zip.write_all(blob)?;
        Ok(())
    }

    /// Write a member without compression. Used for already-compressed media.
    pub fn write_stored(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.start_file(pack_uri.membername(), options)?;
        self.zip.write_all(blob)?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        let mut writer = PhysPkgWriter::new();
        writer.write(&uri, b"<p:presentation/>").unwrap();
        let bytes = writer.finish().unwrap();

        let reader = PhysPkgReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.len(), 1);
        assert!(reader.contains(&uri));
        assert_eq!(reader.blob_for(&uri).unwrap(), b"<p:presentation/>");
    }

    #[test]
    fn test_missing_members() {
        let mut writer = PhysPkgWriter::new();
        writer
            .write_stored(&PackURI::new("/ppt/media/image1.png").unwrap(), &[0x89, b'P'])
            .unwrap();
        let reader = PhysPkgReader::from_bytes(&writer.finish().unwrap()).unwrap();

        assert!(reader.content_types_xml().is_err());
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert!(reader.rels_xml_for(&slide).unwrap().is_none());
        assert_eq!(reader.member_names(), vec!["ppt/media/image1.png"]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PhysPkgReader::open(dir.path().join("absent.pptx"));
        assert!(matches!(result, Err(OpcError::PackageNotFound(_))));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(PhysPkgReader::from_bytes(b"not a zip archive").is_err());
    }
}
