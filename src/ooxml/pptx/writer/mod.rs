//! XML writers for new presentation parts.

pub mod slide;

pub use slide::{NonVisualProps, Picture, SlideFragment, Transform};
