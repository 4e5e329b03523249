#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use skyline_image as image;

#[doc(inline)]
pub use skyline_imgproc as imgproc;

#[doc(inline)]
pub use skyline_io as io;

#[doc(inline)]
pub use skyline_segment as segment;
