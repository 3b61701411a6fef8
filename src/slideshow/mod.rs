//! Slide show assembly.
//!
//! Turns an ordered list of images into a presentation with one picture per
//! slide, built on top of a template package:
//!
//! - [`build`] / [`SlideShowBuilder`]: the assembler
//! - [`geometry`]: pixel bounds and EMU conversion
//! - [`SlideIdAllocator`]: slide and relationship ids
//! - [`discover_images`]: collecting the images in a folder
//! - [`build_in_background`]: the same build on tokio's blocking pool
//!
//! # Example
//!
//! ```rust,no_run
//! use picdeck::slideshow::{DeckOptions, build, discover_images};
//!
//! let images = discover_images("photos")?;
//! let report = build("photos.pptx", "template.pptx", &images, &DeckOptions::default(), &mut ())?;
//! println!("{} slides, {} findings", report.slides.len(), report.findings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod discover;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod image;
pub mod options;
pub mod progress;
pub mod resolution;
pub mod task;

pub use assembler::{BuildReport, SlideRecord, SlideShowBuilder, build};
pub use discover::{DEFAULT_EXTENSIONS, discover_images, discover_images_with};
pub use error::{BuildError, Result};
pub use geometry::{Geometry, PixelSize, Resolution, ScalePolicy, compute_geometry};
pub use ids::SlideIdAllocator;
pub use self::image::{ProbedImage, probe};
pub use options::DeckOptions;
pub use progress::{Progress, SlideQueued};
pub use task::{BuildJob, build_in_background};
