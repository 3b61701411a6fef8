//! PowerPoint (.pptx) presentation support.
//!
//! - `Package`: a .pptx package opened for adding picture slides
//! - `parts`: read access to the presentation and slide master parts
//! - `writer`: XML for new slides
//! - `template`: the starter package slide shows are built into
//! - `validate`: structural checks on a finished package
//!
//! # Example
//!
//! ```rust,no_run
//! use picdeck::ooxml::pptx::{validate_package, write_starter_template};
//!
//! write_starter_template("starter.pptx")?;
//! for finding in validate_package("starter.pptx")? {
//!     println!("{}", finding);
//! }
//! # Ok::<(), picdeck::ooxml::error::OoxmlError>(())
//! ```
pub mod format;
pub mod package;
pub mod parts;
pub mod template;
pub mod validate;
pub mod writer;

pub use format::ImageFormat;
pub use package::{AddedSlide, LayoutReference, NewSlide, Package};
pub use template::{starter_template_bytes, write_starter_template};
pub use validate::{ValidationFinding, validate_bytes, validate_package};
