//! Error types for the extreg protocol layer.

mod extension;

pub use extension::*;
