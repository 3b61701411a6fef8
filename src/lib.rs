//! Picdeck - build PowerPoint slide shows from folders of images
//!
//! Every image becomes one slide showing that picture, laid out on the first
//! slide layout of a template presentation. The finished package is checked
//! with a structural validator whose findings are reported, not fixed.
//!
//! # Features
//!
//! - **Slide show assembly**: one picture per slide, in input order
//! - **Image support**: BMP, GIF, JPEG, PNG and TIFF, embedded unchanged
//! - **Starter template**: a minimal presentation to build into when no template is at hand
//! - **Validation**: well-formedness, relationship and slide list checks on the saved deck
//!
//! # Example - Building a deck
//!
//! ```no_run
//! use picdeck::slideshow::{DeckOptions, build, discover_images};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let images = discover_images("holiday")?;
//! let report = build("holiday.pptx", "template.pptx", &images, &DeckOptions::default(), &mut ())?;
//!
//! for slide in &report.slides {
//!     println!("{} -> slide {}", slide.source.display(), slide.slide_id);
//! }
//! if !report.is_clean() {
//!     for finding in &report.findings {
//!         eprintln!("warning: {}", finding);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level package access
//!
//! ```no_run
//! use picdeck::ooxml::pptx::Package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pkg = Package::open("holiday.pptx")?;
//! println!("Slide ids: {:?}", pkg.slide_ids()?);
//! println!("Layout: {}", pkg.layout_reference()?.layout);
//! # Ok(())
//! # }
//! ```

/// Unit conversion and XML text helpers shared by the other modules
pub mod common;

/// OOXML (Office Open XML) packages
///
/// The OPC container layer plus the PresentationML pieces needed to add
/// picture slides to a .pptx file and to check the result.
pub mod ooxml;

/// Slide show assembly from image files
pub mod slideshow;

// Re-export commonly used types for convenience
pub use ooxml::pptx::{Package, ValidationFinding, validate_package, write_starter_template};
pub use slideshow::{BuildError, BuildReport, DeckOptions, SlideShowBuilder, build, discover_images};
