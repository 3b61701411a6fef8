//! Office Open XML (OOXML) support.
//!
//! Two layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, parts, relationships, content types)
//! 2. **PresentationML** (`pptx`): presentation, slide master, layout and slide parts,
//!    the starter template and the package validator
//!
//! # Example
//!
//! ```rust,no_run
//! use picdeck::ooxml::pptx::Package;
//!
//! let pkg = Package::open("template.pptx")?;
//! println!("template has {} slides", pkg.slide_ids()?.len());
//! # Ok::<(), picdeck::ooxml::error::OoxmlError>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;

pub use opc::{OpcPackage, PackURI};
