//! XML helpers shared by the OPC and PresentationML layers.

mod escape;

pub use escape::{attr_value, escape_xml, unescape_xml};
