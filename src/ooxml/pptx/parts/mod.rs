/// Parts for PowerPoint presentation documents.
///
/// Read-side wrappers around the XML parts the slide show builder needs to
/// inspect: the presentation part and the slide master.
pub mod presentation;
pub mod slide;

pub use presentation::{PresentationPart, SlideIdEntry, append_slide_ids};
pub use slide::SlideMasterPart;

use crate::common::xml::attr_value;
use crate::ooxml::error::Result;
use quick_xml::events::BytesStart;

/// The plain `id` attribute and the relationship-namespaced `r:id` attribute
/// of an id-list entry such as `<p:sldId id="256" r:id="rId2"/>`.
pub(crate) fn id_attrs(e: &BytesStart<'_>) -> Result<(Option<String>, Option<String>)> {
    let mut id = None;
    let mut r_id = None;

    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() != b"id" {
            continue;
        }
        if attr.key.prefix().is_some() {
            r_id = attr_value(&attr);
        } else {
            id = attr_value(&attr);
        }
    }

    Ok((id, r_id))
}
