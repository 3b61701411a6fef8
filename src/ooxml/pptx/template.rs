//! Starter presentation template.
//!
//! The smallest package a slide show can be built into: one presentation part
//! with no slides and a 4:3 slide size, one slide master, one blank layout,
//! one theme, plus the presentation, view and table-style properties parts
//! and the core/app document properties.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Part, XmlPart};
use std::path::Path;

/// Slide master id of the starter master; master ids live above 2^31.
pub const STARTER_MASTER_ID: u32 = 2_147_483_648;

/// Slide layout id of the blank layout.
pub const STARTER_LAYOUT_ID: u32 = 2_147_483_649;

pub fn presentation_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#,
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
        r#"<p:sldSz cx="9144000" cy="6858000" type="screen4x3"/>"#,
        r#"<p:notesSz cx="6858000" cy="9144000"/>"#,
        r#"</p:presentation>"#
    )
}

pub fn slide_master_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        r#"</p:spTree></p:cSld>"#,
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
        r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
        r#"</p:sldMaster>"#
    )
}

pub fn blank_layout_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
        r#"<p:cSld name="Blank"><p:spTree>"#,
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        r#"</p:spTree></p:cSld>"#,
        r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
        r#"</p:sldLayout>"#
    )
}

pub fn theme_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
        r#"<a:themeElements>"#,
        r#"<a:clrScheme name="Office">"#,
        r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
        r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
        r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2>"#,
        r#"<a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
        r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1>"#,
        r#"<a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
        r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3>"#,
        r#"<a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
        r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5>"#,
        r#"<a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
        r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink>"#,
        r#"<a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
        r#"</a:clrScheme>"#,
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        r#"</a:fontScheme>"#,
        r#"<a:fmtScheme name="Office">"#,
        r#"<a:fillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"</a:fillStyleLst>"#,
        r#"<a:lnStyleLst>"#,
        r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"</a:lnStyleLst>"#,
        r#"<a:effectStyleLst>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"</a:effectStyleLst>"#,
        r#"<a:bgFillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"</a:bgFillStyleLst>"#,
        r#"</a:fmtScheme>"#,
        r#"</a:themeElements>"#,
        r#"<a:objectDefaults/><a:extraClrSchemeLst/>"#,
        r#"</a:theme>"#
    )
}

pub fn pres_props_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:presentationPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#
    )
}

pub fn view_props_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:viewPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:gridSpacing cx="76200" cy="76200"/>"#,
        r#"</p:viewPr>"#
    )
}

pub fn table_styles_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"def="{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}"/>"#
    )
}

pub fn core_props_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        r#"<dc:title>Slide Show</dc:title><dc:creator>picdeck</dc:creator>"#,
        r#"</cp:coreProperties>"#
    )
}

pub fn app_props_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
        r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
        r#"<Application>picdeck</Application><Slides>0</Slides>"#,
        r#"</Properties>"#
    )
}

fn xml_part(partname: &str, content_type: &str, xml: &str) -> Result<XmlPart> {
    let partname = PackURI::new(partname).map_err(crate::ooxml::opc::OpcError::InvalidPackUri)?;
    Ok(XmlPart::new(
        partname,
        content_type.to_string(),
        xml.as_bytes().to_vec(),
    ))
}

/// Assemble the starter package in memory.
pub fn starter_template() -> Result<OpcPackage> {
    let mut pkg = OpcPackage::new();

    let mut presentation = xml_part(
        "/ppt/presentation.xml",
        ct::PML_PRESENTATION_MAIN,
        presentation_xml(),
    )?;
    // rId1 is referenced by <p:sldMasterId>, so it is assigned first
    presentation.relate_to("slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);
    presentation.relate_to("presProps.xml", rt::PRES_PROPS);
    presentation.relate_to("viewProps.xml", rt::VIEW_PROPS);
    presentation.relate_to("theme/theme1.xml", rt::THEME);
    presentation.relate_to("tableStyles.xml", rt::TABLE_STYLES);

    let mut master = xml_part(
        "/ppt/slideMasters/slideMaster1.xml",
        ct::PML_SLIDE_MASTER,
        slide_master_xml(),
    )?;
    // rId1 is referenced by <p:sldLayoutId>
    master.relate_to("../slideLayouts/slideLayout1.xml", rt::SLIDE_LAYOUT);
    master.relate_to("../theme/theme1.xml", rt::THEME);

    let mut layout = xml_part(
        "/ppt/slideLayouts/slideLayout1.xml",
        ct::PML_SLIDE_LAYOUT,
        blank_layout_xml(),
    )?;
    layout.relate_to("../slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);

    let parts = [
        presentation,
        master,
        layout,
        xml_part("/ppt/theme/theme1.xml", ct::OFC_THEME, theme_xml())?,
        xml_part("/ppt/presProps.xml", ct::PML_PRES_PROPS, pres_props_xml())?,
        xml_part("/ppt/viewProps.xml", ct::PML_VIEW_PROPS, view_props_xml())?,
        xml_part("/ppt/tableStyles.xml", ct::PML_TABLE_STYLES, table_styles_xml())?,
        xml_part("/docProps/core.xml", ct::OPC_CORE_PROPERTIES, core_props_xml())?,
        xml_part("/docProps/app.xml", ct::OFC_EXTENDED_PROPERTIES, app_props_xml())?,
    ];
    for part in parts {
        pkg.add_part(Box::new(part))?;
    }

    let rels = pkg.rels_mut();
    rels.get_or_add(rt::OFFICE_DOCUMENT, "ppt/presentation.xml");
    rels.get_or_add(rt::CORE_PROPERTIES, "docProps/core.xml");
    rels.get_or_add(rt::EXTENDED_PROPERTIES, "docProps/app.xml");

    Ok(pkg)
}

/// The starter package as `.pptx` bytes.
pub fn starter_template_bytes() -> Result<Vec<u8>> {
    Ok(starter_template()?.to_bytes()?)
}

/// Write the starter package to `path`, replacing any existing file.
pub fn write_starter_template<P: AsRef<Path>>(path: P) -> Result<()> {
    starter_template()?.save(path)?;
    Ok(())
}
