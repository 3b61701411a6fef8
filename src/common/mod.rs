//! Common utilities shared across the package and presentation layers.

pub mod unit;
pub mod xml;
