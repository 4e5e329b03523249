//! Morphological image processing operations.
//!
//! Grayscale erosion and dilation are minimum and maximum filters over the footprint of a
//! structuring element ([`Kernel`]). Taps that fall outside the image never take part in the
//! minimum or maximum, so the image border neither grows nor shrinks bright regions.

mod kernels;
pub use kernels::{Kernel, KernelShape};

mod ops;
pub use ops::{close, dilate, erode, open};
