#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image basic operations module.
pub mod core;

/// edge detection module.
pub mod edges;

/// image filtering module.
pub mod filter;

/// region growing from a seed pixel.
pub mod flood_fill;

/// morphological operations module.
pub mod morphology;

/// border handling for neighbourhood operations.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;
