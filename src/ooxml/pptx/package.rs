/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{BlobPart, OpcError, OpcPackage, PackURI, Part, XmlPart};
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::pptx::parts::{PresentationPart, SlideIdEntry, SlideMasterPart, append_slide_ids};
use crate::ooxml::pptx::writer::slide::PICTURE_REL_ID;
use std::path::Path;
use tracing::debug;

/// The master and layout every new slide is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReference {
    pub master: PackURI,
    pub layout: PackURI,
}

/// Everything needed to register one picture slide.
#[derive(Debug)]
pub struct NewSlide<'a> {
    pub slide_id: u32,
    /// Relationship id of the slide in the presentation part's rels
    pub rel_id: &'a str,
    pub slide_xml: String,
    pub layout: &'a PackURI,
    pub image_format: ImageFormat,
    pub image_bytes: Vec<u8>,
}

/// Partnames created for a registered slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedSlide {
    pub slide_part: PackURI,
    pub image_part: PackURI,
}

/// A PowerPoint (.pptx) package.
///
/// Wraps an OPC package and keeps the slides added since it was opened.
/// Those slides are written into `<p:sldIdLst>` when the package is saved.
///
/// # Examples
///
/// ```rust,no_run
/// use picdeck::ooxml::pptx::Package;
///
/// let pkg = Package::open("template.pptx")?;
/// println!("Presentation has {} slides", pkg.slide_ids()?.len());
/// # Ok::<(), picdeck::ooxml::error::OoxmlError>(())
/// ```
pub struct Package {
    opc: OpcPackage,
    presentation_partname: PackURI,
    pending_slides: Vec<SlideIdEntry>,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    /// Wrap an OPC package whose main part is a presentation.
    pub fn from_opc(opc: OpcPackage) -> Result<Self> {
        let presentation_partname = opc
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = opc.get_part(&presentation_partname)?.content_type();
        if content_type != ct::PML_PRESENTATION_MAIN
            && content_type != ct::PML_PRES_MACRO_MAIN
            && content_type != ct::PML_TEMPLATE_MAIN
        {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: content_type.to_string(),
            });
        }

        Ok(Self {
            opc,
            presentation_partname,
            pending_slides: Vec::new(),
        })
    }

    /// The presentation part as stored; slides added since opening are not listed yet.
    pub fn presentation(&self) -> Result<PresentationPart<'_>> {
        PresentationPart::from_part(self.opc.get_part(&self.presentation_partname)?)
    }

    #[inline]
    pub fn presentation_partname(&self) -> &PackURI {
        &self.presentation_partname
    }

    /// The first layout of the first slide master.
    pub fn layout_reference(&self) -> Result<LayoutReference> {
        let pres = self.presentation()?;
        let master_entry = pres
            .slide_master_ids()?
            .into_iter()
            .next()
            .ok_or_else(|| OoxmlError::InvalidFormat("presentation has no slide master".to_string()))?;
        let master = self.resolve(pres.part(), &master_entry.r_id)?;

        let master_part = SlideMasterPart::from_part(self.opc.get_part(&master)?)?;
        let layout_rid = master_part
            .slide_layout_rids()?
            .into_iter()
            .next()
            .ok_or_else(|| {
                OoxmlError::InvalidFormat(format!("slide master {} has no layouts", master))
            })?;
        let layout = self.resolve(master_part.part(), &layout_rid)?;

        let layout_type = self.opc.get_part(&layout)?.content_type();
        if layout_type != ct::PML_SLIDE_LAYOUT {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_SLIDE_LAYOUT.to_string(),
                got: layout_type.to_string(),
            });
        }

        Ok(LayoutReference { master, layout })
    }

    fn resolve(&self, source: &dyn Part, r_id: &str) -> Result<PackURI> {
        let rel = source.rels().get(r_id).ok_or_else(|| {
            OoxmlError::InvalidRelationship(format!(
                "{} has no relationship {}",
                source.partname(),
                r_id
            ))
        })?;
        let target = rel.target_partname()?;
        if !self.opc.contains_part(&target) {
            return Err(OoxmlError::PartNotFound(target.to_string()));
        }
        Ok(target)
    }

    /// Slide ids already in the presentation plus those added since opening.
    pub fn slide_ids(&self) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = self
            .presentation()?
            .slide_ids()?
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        ids.extend(self.pending_slides.iter().map(|entry| entry.id));
        Ok(ids)
    }

    /// Whether the presentation part already has a relationship with this id.
    pub fn has_presentation_rel(&self, r_id: &str) -> Result<bool> {
        Ok(self
            .opc
            .get_part(&self.presentation_partname)?
            .rels()
            .contains(r_id))
    }

    /// Register a slide part, its picture and its presentation relationship.
    ///
    /// The slide's layout relationship gets the next free `rIdN`; the picture
    /// is always related as `relId1`. The package is left untouched when the
    /// presentation relationship id is already taken.
    pub fn add_picture_slide(&mut self, slide: NewSlide<'_>) -> Result<AddedSlide> {
        if self.has_presentation_rel(slide.rel_id)? {
            return Err(OpcError::DuplicateRelationship {
                r_id: slide.rel_id.to_string(),
                source_uri: self.presentation_partname.to_string(),
            }
            .into());
        }

        let slide_partname = self.opc.next_partname("/ppt/slides/slide%d.xml")?;
        let image_partname = self.opc.next_partname(&format!(
            "/ppt/media/image%d.{}",
            slide.image_format.extension()
        ))?;

        let mut slide_part = XmlPart::new(
            slide_partname.clone(),
            ct::PML_SLIDE.to_string(),
            slide.slide_xml.into_bytes(),
        );
        let slide_dir = slide_partname.base_uri();
        slide_part.relate_to(&slide.layout.relative_ref(slide_dir), rt::SLIDE_LAYOUT);
        slide_part
            .rels_mut()
            .add_unique(rt::IMAGE, &image_partname.relative_ref(slide_dir), PICTURE_REL_ID)?;

        let image_part = BlobPart::new(
            image_partname.clone(),
            slide.image_format.mime_type().to_string(),
            slide.image_bytes,
        );

        let pres_dir = self.presentation_partname.base_uri().to_string();
        let pres_part = self.opc.get_part_mut(&self.presentation_partname)?;
        pres_part
            .rels_mut()
            .add_unique(rt::SLIDE, &slide_partname.relative_ref(&pres_dir), slide.rel_id)?;

        self.opc.add_part(Box::new(image_part))?;
        self.opc.add_part(Box::new(slide_part))?;
        self.pending_slides.push(SlideIdEntry {
            id: slide.slide_id,
            r_id: slide.rel_id.to_string(),
        });

        debug!(
            slide_id = slide.slide_id,
            rel_id = slide.rel_id,
            slide_part = %slide_partname,
            image_part = %image_partname,
            "registered slide parts"
        );

        Ok(AddedSlide {
            slide_part: slide_partname,
            image_part: image_partname,
        })
    }

    /// Number of slides added since the package was opened or last saved.
    pub fn pending_slide_count(&self) -> usize {
        self.pending_slides.len()
    }

    /// Write added slides into the presentation's slide list.
    fn flush_slide_list(&mut self) -> Result<()> {
        if self.pending_slides.is_empty() {
            return Ok(());
        }

        let part = self.opc.get_part_mut(&self.presentation_partname)?;
        let xml = append_slide_ids(part.blob(), &self.pending_slides)?;
        part.set_blob(xml);
        self.pending_slides.clear();
        Ok(())
    }

    /// Save the whole package to `path`.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush_slide_list()?;
        self.opc.save(path)?;
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_slide_list()?;
        Ok(self.opc.to_bytes()?)
    }

    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::template::starter_template_bytes;
    use crate::ooxml::pptx::writer::SlideFragment;

    fn new_slide<'a>(slide_id: u32, rel_id: &'a str, layout: &'a PackURI) -> NewSlide<'a> {
        NewSlide {
            slide_id,
            rel_id,
            slide_xml: SlideFragment::new("p.png", "p.png", 100, 100).to_xml().unwrap(),
            layout,
            image_format: ImageFormat::Png,
            image_bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn test_add_picture_slide() {
        let mut pkg = Package::from_bytes(&starter_template_bytes().unwrap()).unwrap();
        let layout = pkg.layout_reference().unwrap().layout;

        let added = pkg.add_picture_slide(new_slide(256, "rel256", &layout)).unwrap();
        assert_eq!(added.slide_part.as_str(), "/ppt/slides/slide1.xml");
        assert_eq!(added.image_part.as_str(), "/ppt/media/image1.png");
        assert_eq!(pkg.pending_slide_count(), 1);
        assert_eq!(pkg.slide_ids().unwrap(), vec![256]);

        let slide = pkg.opc_package().get_part(&added.slide_part).unwrap();
        assert_eq!(
            slide.rels().get("rId1").unwrap().target_ref(),
            "../slideLayouts/slideLayout1.xml"
        );
        assert_eq!(
            slide.rels().get("relId1").unwrap().target_ref(),
            "../media/image1.png"
        );
        assert_eq!(slide.rel_ref_count("relId1"), 1);

        let bytes = pkg.to_bytes().unwrap();
        let reopened = Package::from_bytes(&bytes).unwrap();
        let pres = reopened.presentation().unwrap();
        assert_eq!(
            pres.slide_ids().unwrap(),
            vec![SlideIdEntry {
                id: 256,
                r_id: "rel256".to_string()
            }]
        );
        assert!(reopened.opc_package().contains_part(&added.image_part));
    }

    #[test]
    fn test_duplicate_rel_id_leaves_package_untouched() {
        let mut pkg = Package::from_bytes(&starter_template_bytes().unwrap()).unwrap();
        let layout = pkg.layout_reference().unwrap().layout;

        pkg.add_picture_slide(new_slide(256, "rel256", &layout)).unwrap();
        let parts_before = pkg.opc_package().part_count();

        let err = pkg.add_picture_slide(new_slide(257, "rel256", &layout)).unwrap_err();
        assert!(matches!(
            err,
            OoxmlError::Opc(OpcError::DuplicateRelationship { .. })
        ));
        assert_eq!(pkg.opc_package().part_count(), parts_before);
        assert_eq!(pkg.pending_slide_count(), 1);
    }

    #[test]
    fn test_missing_master_is_invalid_format() {
        let mut opc = OpcPackage::from_bytes(&starter_template_bytes().unwrap()).unwrap();
        let pres_name = opc.main_document_partname().unwrap();
        let pres = opc.get_part_mut(&pres_name).unwrap();
        let xml = String::from_utf8(pres.blob().to_vec())
            .unwrap()
            .replace(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#, "");
        pres.set_blob(xml.into_bytes());

        let pkg = Package::from_opc(opc).unwrap();
        assert!(matches!(
            pkg.layout_reference(),
            Err(OoxmlError::InvalidFormat(_))
        ));
    }
}
