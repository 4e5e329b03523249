/// A step of the segmentation pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Grayscale conversion of the input.
    Gray,
    /// 3x3 gaussian smoothing.
    Blur,
    /// Star removal by erosion.
    Erode,
    /// Edge detection, edges painted into the eroded image.
    Edges,
    /// Edge thickening.
    Dilate,
    /// Region fill from the seed.
    FloodFill,
    /// Removal of thin filled streaks.
    Open,
    /// Binarization into a mask.
    Threshold,
    /// Mask inversion.
    Invert,
    /// The grayscale image with the mask applied.
    Mask,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 10] = [
        Stage::Gray,
        Stage::Blur,
        Stage::Erode,
        Stage::Edges,
        Stage::Dilate,
        Stage::FloodFill,
        Stage::Open,
        Stage::Threshold,
        Stage::Invert,
        Stage::Mask,
    ];

    /// The position of the stage in the pipeline, starting at 1.
    pub fn index(&self) -> usize {
        *self as usize + 1
    }

    /// A short lowercase name, suitable for file names.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Gray => "gray",
            Stage::Blur => "blur",
            Stage::Erode => "erode",
            Stage::Edges => "edges",
            Stage::Dilate => "dilate",
            Stage::FloodFill => "flood-fill",
            Stage::Open => "open",
            Stage::Threshold => "threshold",
            Stage::Invert => "invert",
            Stage::Mask => "mask",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
