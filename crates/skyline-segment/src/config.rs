use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyline_imgproc::flood_fill::FloodFillRange;

use crate::error::SegmentError;

/// Which image the edge thickening stage starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DilationSource {
    /// The eroded image with the detected edges painted at full intensity.
    #[default]
    Highlighted,
    /// The binary edge map alone.
    EdgeMap,
}

/// Where the segmented image of an input is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// Every input writes the same path, the last one wins.
    Fixed(PathBuf),
    /// Next to each input, the extension replaced by `out.png`.
    PerInput,
}

impl Default for OutputNaming {
    fn default() -> Self {
        OutputNaming::Fixed(PathBuf::from("segmented.png"))
    }
}

impl OutputNaming {
    /// The output path for `input`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use skyline_segment::OutputNaming;
    ///
    /// let out = OutputNaming::PerInput.output_path(Path::new("night/sky.jpg"));
    /// assert_eq!(out, Path::new("night/sky.out.png"));
    /// ```
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match self {
            OutputNaming::Fixed(path) => path.clone(),
            OutputNaming::PerInput => input.with_extension("out.png"),
        }
    }
}

/// The parameters of the segmentation pipeline.
///
/// Missing fields take the values of [`Variant::A`] when deserialized, unknown fields are
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentorConfig {
    /// Low hysteresis threshold of the edge detector.
    pub canny_low: f32,
    /// High hysteresis threshold of the edge detector.
    pub canny_high: f32,
    /// Passes of the 3x3 erosion removing stars.
    pub erode_iterations: usize,
    /// Passes of the 3x3 dilation thickening the edges.
    pub dilate_iterations: usize,
    /// The input of the dilation.
    pub dilation_source: DilationSource,
    /// Flood fill start point as `(x, y)`.
    pub seed: (usize, usize),
    /// Maximal darker deviation accepted by the flood fill.
    pub lo_diff: u8,
    /// Maximal brighter deviation accepted by the flood fill.
    pub up_diff: u8,
    /// How the flood fill tolerance is anchored.
    pub flood_fill_range: FloodFillRange,
    /// Whether the filled image is opened before thresholding.
    pub opening: bool,
    /// Side of the ellipse used by the opening.
    pub opening_kernel_size: usize,
    /// Values strictly above this become the mask.
    pub threshold: u8,
    /// Whether the mask is inverted before it is applied.
    pub invert_mask: bool,
    /// Where results are written.
    pub output: OutputNaming,
}

impl Default for SegmentorConfig {
    fn default() -> Self {
        Variant::A.config()
    }
}

impl SegmentorConfig {
    /// Check that the parameters are consistent.
    ///
    /// The seed can only be checked against an image, see [`crate::Segmentor::segment`].
    pub fn validate(&self) -> Result<(), SegmentError> {
        for (name, value) in [("canny_low", self.canny_low), ("canny_high", self.canny_high)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SegmentError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.canny_low > self.canny_high {
            return Err(SegmentError::InvalidConfig(format!(
                "canny_low ({}) is greater than canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }

        if self.opening && self.opening_kernel_size == 0 {
            return Err(SegmentError::InvalidConfig(
                "opening_kernel_size must be at least 1".to_string(),
            ));
        }

        if let OutputNaming::Fixed(path) = &self.output {
            if path.as_os_str().is_empty() {
                return Err(SegmentError::InvalidConfig(
                    "fixed output path is empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// The two tunings the pipeline ships with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Keeps the filled side, cleans it with a 20x20 opening and writes `segmented.png`.
    #[default]
    A,
    /// Keeps the other side, no opening, writes `<stem>.out.png` next to every input.
    B,
}

impl Variant {
    /// The parameters of the preset.
    pub fn config(&self) -> SegmentorConfig {
        match self {
            Variant::A => SegmentorConfig {
                canny_low: 40.0,
                canny_high: 40.0,
                erode_iterations: 2,
                dilate_iterations: 3,
                dilation_source: DilationSource::Highlighted,
                seed: (0, 0),
                lo_diff: 100,
                up_diff: 100,
                flood_fill_range: FloodFillRange::Fixed,
                opening: true,
                opening_kernel_size: 20,
                threshold: 254,
                invert_mask: false,
                output: OutputNaming::default(),
            },
            Variant::B => SegmentorConfig {
                canny_low: 50.0,
                canny_high: 100.0,
                dilate_iterations: 2,
                opening: false,
                invert_mask: true,
                output: OutputNaming::PerInput,
                ..Variant::A.config()
            },
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Variant::A),
            "b" => Ok(Variant::B),
            other => Err(format!("unknown variant '{other}', expected 'a' or 'b'")),
        }
    }
}
