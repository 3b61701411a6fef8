/// Open Packaging Conventions (OPC) implementation.
///
/// This module provides the package layer underneath the presentation code:
///
/// - Package structure (parts, relationships)
/// - Content type management
/// - ZIP-based physical packaging through the `zip` crate
///
/// Parts are held fully in memory between `OpcPackage::open` and
/// `OpcPackage::save`; the physical file is only touched at those two points.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use error::{OpcError, Result};
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use rel::{Relationship, Relationships};
