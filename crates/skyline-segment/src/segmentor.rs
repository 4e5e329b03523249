use skyline_image::Image;
use skyline_imgproc::{
    color, core, edges,
    filter::gaussian_blur,
    flood_fill::flood_fill,
    morphology::{self, Kernel, KernelShape},
    threshold::threshold_binary,
};

use crate::{
    config::{DilationSource, SegmentorConfig},
    error::SegmentError,
    observer::{NoopObserver, StageObserver},
    stage::Stage,
};

/// The value painted by the flood fill and kept by the threshold.
const FILL_VALUE: u8 = 255;

/// Separates the horizon from the sky of starfield images.
///
/// The segmentor holds only its validated configuration, so one instance can be shared
/// between threads.
///
/// # Example
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_segment::{Segmentor, Variant};
///
/// let segmentor = Segmentor::new(Variant::A.config()).unwrap();
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 32, height: 24 }, 0).unwrap();
///
/// let segmented = segmentor.segment(&image).unwrap();
/// assert_eq!(segmented.size(), image.size());
/// assert!(segmented.as_slice().iter().all(|&v| v == 0));
/// ```
#[derive(Debug, Clone)]
pub struct Segmentor {
    config: SegmentorConfig,
}

impl Segmentor {
    /// Create a segmentor after validating `config`.
    pub fn new(config: SegmentorConfig) -> Result<Self, SegmentError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration of the segmentor.
    pub fn config(&self) -> &SegmentorConfig {
        &self.config
    }

    /// Segment a color image.
    ///
    /// Returns the grayscale conversion of `image` with the selected region set to zero.
    ///
    /// # Errors
    ///
    /// [`SegmentError::EmptyImage`] for an image without pixels and
    /// [`SegmentError::SeedOutOfBounds`] when the flood fill seed lies outside of it.
    pub fn segment(&self, image: &Image<u8, 3>) -> Result<Image<u8, 1>, SegmentError> {
        self.segment_with(image, &mut NoopObserver)
    }

    /// Segment a color image, reporting every intermediate image to `observer`.
    pub fn segment_with(
        &self,
        image: &Image<u8, 3>,
        observer: &mut dyn StageObserver,
    ) -> Result<Image<u8, 1>, SegmentError> {
        if image.is_empty() {
            return Err(SegmentError::EmptyImage);
        }

        let cfg = &self.config;
        let size = image.size();
        let (seed_x, seed_y) = cfg.seed;
        if seed_x >= size.width || seed_y >= size.height {
            return Err(SegmentError::SeedOutOfBounds {
                x: seed_x,
                y: seed_y,
                width: size.width,
                height: size.height,
            });
        }

        // kept untouched for the final masking
        let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
        color::gray_from_rgb_u8(image, &mut gray)?;
        observer.on_stage(Stage::Gray, &gray);

        let mut blurred = Image::<u8, 1>::from_size_val(size, 0)?;
        gaussian_blur(&gray, &mut blurred, (3, 3), (0.0, 0.0))?;
        observer.on_stage(Stage::Blur, &blurred);

        let small = Kernel::new(KernelShape::Ellipse {
            width: 3,
            height: 3,
        });

        let mut eroded = Image::<u8, 1>::from_size_val(size, 0)?;
        morphology::erode(&blurred, &mut eroded, &small, cfg.erode_iterations)?;
        observer.on_stage(Stage::Erode, &eroded);

        let (highlighted, edge_map) = detect_edges(eroded, cfg.canny_low, cfg.canny_high)?;
        observer.on_stage(Stage::Edges, &highlighted);

        let dilation_src = match cfg.dilation_source {
            DilationSource::Highlighted => &highlighted,
            DilationSource::EdgeMap => &edge_map,
        };
        let mut filled = Image::<u8, 1>::from_size_val(size, 0)?;
        morphology::dilate(dilation_src, &mut filled, &small, cfg.dilate_iterations)?;
        observer.on_stage(Stage::Dilate, &filled);

        let fill = flood_fill(
            &mut filled,
            cfg.seed,
            FILL_VALUE,
            cfg.lo_diff,
            cfg.up_diff,
            cfg.flood_fill_range,
        )?;
        log::debug!("flood fill area {} rect {:?}", fill.area, fill.rect);
        observer.on_stage(Stage::FloodFill, &filled);

        let cleaned = if cfg.opening {
            let kernel = Kernel::new(KernelShape::Ellipse {
                width: cfg.opening_kernel_size,
                height: cfg.opening_kernel_size,
            });
            let mut opened = Image::<u8, 1>::from_size_val(size, 0)?;
            morphology::open(&filled, &mut opened, &kernel)?;
            observer.on_stage(Stage::Open, &opened);
            opened
        } else {
            filled
        };

        let mut mask = Image::<u8, 1>::from_size_val(size, 0)?;
        threshold_binary(&cleaned, &mut mask, cfg.threshold, FILL_VALUE)?;
        observer.on_stage(Stage::Threshold, &mask);

        if cfg.invert_mask {
            let mut inverted = Image::<u8, 1>::from_size_val(size, 0)?;
            core::bitwise_not(&mask, &mut inverted)?;
            observer.on_stage(Stage::Invert, &inverted);
            mask = inverted;
        }

        let mut segmented = Image::<u8, 1>::from_size_val(size, 0)?;
        core::bitwise_and(&gray, &mask, &mut segmented)?;
        observer.on_stage(Stage::Mask, &segmented);

        Ok(segmented)
    }
}

/// Run the edge detector on `image` and paint the edges into it.
///
/// Returns the highlighted image, which reuses the buffer of `image`, and the edge map.
fn detect_edges(
    mut image: Image<u8, 1>,
    low: f32,
    high: f32,
) -> Result<(Image<u8, 1>, Image<u8, 1>), SegmentError> {
    let mut edge_map = Image::<u8, 1>::from_size_val(image.size(), 0)?;
    edges::canny(&image, &mut edge_map, low, high)?;
    edges::highlight_edges(&mut image, &edge_map)?;
    Ok((image, edge_map))
}

/// Segment `image` with a one-off segmentor built from `config`.
pub fn segment(image: &Image<u8, 3>, config: &SegmentorConfig) -> Result<Image<u8, 1>, SegmentError> {
    Segmentor::new(config.clone())?.segment(image)
}
