//! Slide XML for a single full-slide picture.
//!
//! A [`SlideFragment`] is an immutable description of one slide: the shape
//! tree's group properties plus one picture. It depends on nothing but its
//! inputs, so the same inputs always serialize to the same XML.

use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use std::fmt::Write as FmtWrite;

/// Shape id of the shape tree's group properties.
pub const GROUP_SHAPE_ID: u32 = 1;

/// Shape id of the picture.
pub const PICTURE_SHAPE_ID: u32 = 4;

/// Slide-local relationship id of the picture. Every slide has exactly one
/// image relationship, so every slide reuses this id.
pub const PICTURE_REL_ID: &str = "relId1";

/// Default top-left offset of the picture, in EMUs.
pub const DEFAULT_PICTURE_OFFSET: i64 = 100;

/// `<p:cNvPr>`: shape id, name and optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonVisualProps {
    pub id: u32,
    pub name: String,
    pub descr: Option<String>,
}

/// `<a:xfrm>` offset and extent in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// The `<p:pic>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub props: NonVisualProps,
    /// `<a:picLocks noChangeAspect="1"/>`
    pub lock_aspect_ratio: bool,
    /// `r:embed` of the blip fill
    pub embed_rel_id: String,
    pub xfrm: Transform,
}

/// One slide: shape tree with identity group transform and a single picture.
/// The slide defers to the master's color mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideFragment {
    group: NonVisualProps,
    picture: Picture,
}

impl SlideFragment {
    /// Slide showing a `cx` by `cy` picture at the default offset.
    ///
    /// # Example
    ///
    /// ```rust
    /// use picdeck::ooxml::pptx::writer::SlideFragment;
    ///
    /// let slide = SlideFragment::new("beach.png", "Beach at noon", 2_438_400, 1_828_800);
    /// let xml = slide.to_xml()?;
    /// assert!(xml.contains(r#"<a:blip r:embed="relId1"/>"#));
    /// # Ok::<(), picdeck::ooxml::error::OoxmlError>(())
    /// ```
    pub fn new(name: &str, descr: &str, cx: i64, cy: i64) -> Self {
        Self {
            group: NonVisualProps {
                id: GROUP_SHAPE_ID,
                name: String::new(),
                descr: None,
            },
            picture: Picture {
                props: NonVisualProps {
                    id: PICTURE_SHAPE_ID,
                    name: name.to_string(),
                    descr: Some(descr.to_string()),
                },
                lock_aspect_ratio: true,
                embed_rel_id: PICTURE_REL_ID.to_string(),
                xfrm: Transform {
                    x: DEFAULT_PICTURE_OFFSET,
                    y: DEFAULT_PICTURE_OFFSET,
                    cx,
                    cy,
                },
            },
        }
    }

    /// Same slide with the picture's top-left corner at `(offset, offset)`.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.picture.xfrm.x = offset;
        self.picture.xfrm.y = offset;
        self
    }

    pub fn group(&self) -> &NonVisualProps {
        &self.group
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    /// Serialize to a complete slide part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        );
        xml.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);

        xml.push_str("<p:cSld>");
        xml.push_str("<p:spTree>");

        xml.push_str("<p:nvGrpSpPr>");
        write_c_nv_pr(&mut xml, &self.group)?;
        xml.push_str("<p:cNvGrpSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvGrpSpPr>");

        // Identity transform: the group neither moves nor scales its children
        xml.push_str("<p:grpSpPr>");
        xml.push_str("<a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/>"#);
        xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
        xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
        xml.push_str("</a:xfrm>");
        xml.push_str("</p:grpSpPr>");

        self.write_picture(&mut xml)?;

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");

        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");

        Ok(xml)
    }

    fn write_picture(&self, xml: &mut String) -> Result<()> {
        let pic = &self.picture;

        xml.push_str("<p:pic>");
        xml.push_str("<p:nvPicPr>");
        write_c_nv_pr(xml, &pic.props)?;
        if pic.lock_aspect_ratio {
            xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
        } else {
            xml.push_str("<p:cNvPicPr/>");
        }
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvPicPr>");

        xml.push_str("<p:blipFill>");
        write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(&pic.embed_rel_id))
            .map_err(|e| OoxmlError::Xml(format!("Failed to write blip: {}", e)))?;
        xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
        xml.push_str("</p:blipFill>");

        xml.push_str("<p:spPr>");
        xml.push_str("<a:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, pic.xfrm.x, pic.xfrm.y)
            .map_err(|e| OoxmlError::Xml(format!("Failed to write offset: {}", e)))?;
        write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, pic.xfrm.cx, pic.xfrm.cy)
            .map_err(|e| OoxmlError::Xml(format!("Failed to write extent: {}", e)))?;
        xml.push_str("</a:xfrm>");
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr>");
        xml.push_str("</p:pic>");

        Ok(())
    }
}

fn write_c_nv_pr(xml: &mut String, props: &NonVisualProps) -> Result<()> {
    write!(xml, r#"<p:cNvPr id="{}" name="{}""#, props.id, escape_xml(&props.name))
        .map_err(|e| OoxmlError::Xml(format!("Failed to write cNvPr: {}", e)))?;
    if let Some(ref descr) = props.descr {
        write!(xml, r#" descr="{}""#, escape_xml(descr))
            .map_err(|e| OoxmlError::Xml(format!("Failed to write cNvPr: {}", e)))?;
    }
    xml.push_str("/>");
    Ok(())
}
