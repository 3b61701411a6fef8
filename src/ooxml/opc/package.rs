//! In-memory OPC package.
//!
//! An [`OpcPackage`] owns every part of a package together with the package
//! relationships. It is loaded from a ZIP archive, mutated in place, and
//! written back out as a whole.

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub struct OpcPackage {
    rels: Relationships,

    /// Parts by partname. Ordered so that saved archives are deterministic.
    parts: BTreeMap<PackURI, Box<dyn Part>>,
}

impl OpcPackage {
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: BTreeMap::new(),
        }
    }

    /// Open a package file.
    ///
    /// # Example
    /// ```no_run
    /// use picdeck::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("template.pptx")?;
    /// println!("{} parts", pkg.part_count());
    /// # Ok::<(), picdeck::ooxml::opc::OpcError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::unmarshal(PackageReader::from_phys_reader(PhysPkgReader::open(path)?)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::unmarshal(PackageReader::from_phys_reader(PhysPkgReader::from_bytes(data)?)?)
    }

    fn unmarshal(pkg_reader: PackageReader) -> Result<Self> {
        let mut package = Self::new();
        let (pkg_srels, sparts) = pkg_reader.into_parts();

        for srel in pkg_srels {
            let is_external = srel.is_external();
            package
                .rels
                .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
        }

        for spart in sparts {
            let mut part = PartFactory::load(spart.partname, spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut()
                    .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
            }
            package.parts.insert(part.partname().clone(), part);
        }

        Ok(package)
    }

    /// Write the package to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// The part targeted by the package-level officeDocument relationship.
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let partname = self.main_document_partname()?;
        self.get_part(&partname)
    }

    pub fn main_document_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname)
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname)
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Add a part. Fails if the partname is already taken.
    pub fn add_part(&mut self, part: Box<dyn Part>) -> Result<()> {
        let partname = part.partname().clone();
        if self.parts.contains_key(&partname) {
            return Err(OpcError::DuplicatePart(partname.to_string()));
        }
        self.parts.insert(partname, part);
        Ok(())
    }

    /// Parts in partname order.
    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// First free partname for a template containing a `%d` placeholder,
    /// e.g. "/ppt/media/image%d.png".
    ///
    /// Indices are shared across extensions: with "/ppt/media/image1.gif"
    /// present, "/ppt/media/image%d.png" yields "image2.png".
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        let (prefix, _) = template.split_once("%d").ok_or_else(|| {
            OpcError::InvalidPackUri(format!("partname template without %d: {}", template))
        })?;

        let used: HashSet<u32> = self
            .parts
            .keys()
            .filter_map(|name| {
                let rest = name.as_str().strip_prefix(prefix)?;
                let digits = rest.split('.').next()?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                atoi_simd::parse::<u32>(digits.as_bytes()).ok()
            })
            .collect();

        let n = (1..=u32::MAX).find(|n| !used.contains(n)).ok_or_else(|| {
            OpcError::InvalidPackUri(format!("no free partname left for {}", template))
        })?;
        PackURI::new(template.replace("%d", &n.to_string())).map_err(OpcError::InvalidPackUri)
    }

    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}
