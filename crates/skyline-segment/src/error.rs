use skyline_image::ImageError;
use skyline_imgproc::flood_fill::FloodFillError;
use skyline_io::IoError;

/// An error type for the segmentation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SegmentError {
    /// Reading or writing an image file failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The input image has no pixels.
    #[error("Input image has zero area")]
    EmptyImage,

    /// The flood fill seed lies outside the image.
    #[error("Flood fill seed ({x}, {y}) is outside the image ({width}x{height})")]
    SeedOutOfBounds {
        /// The seed column.
        x: usize,
        /// The seed row.
        y: usize,
        /// The image width.
        width: usize,
        /// The image height.
        height: usize,
    },

    /// The pipeline parameters are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<FloodFillError> for SegmentError {
    fn from(err: FloodFillError) -> Self {
        match err {
            FloodFillError::SeedOutOfBounds {
                x,
                y,
                width,
                height,
            } => SegmentError::SeedOutOfBounds {
                x,
                y,
                width,
                height,
            },
        }
    }
}
