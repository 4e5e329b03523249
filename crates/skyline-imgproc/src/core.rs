use rayon::prelude::*;
use skyline_image::{Image, ImageError};

use crate::parallel;

/// Perform a bitwise AND operation between two images.
///
/// Used to apply a binary mask: pixels where one source is 0 become 0, pixels where it
/// is 255 keep the value of the other source.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `src2` - The second input image.
/// * `dst` - The output image.
///
/// # Example
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_imgproc::core::bitwise_and;
///
/// let size = ImageSize { width: 2, height: 2 };
/// let image = Image::<u8, 1>::new(size, vec![10, 20, 30, 40]).unwrap();
/// let mask = Image::<u8, 1>::new(size, vec![255, 0, 255, 0]).unwrap();
/// let mut output = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// bitwise_and(&image, &mask, &mut output).unwrap();
/// assert_eq!(output.as_slice(), &[10, 0, 30, 0]);
/// ```
pub fn bitwise_and<const C: usize>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src1.size() != src2.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            src2.width(),
            src2.height(),
        ));
    }

    if src1.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val_two(src1, src2, dst, |&a, &b, out| {
        *out = a & b;
    });

    Ok(())
}

/// Invert every bit of an image.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
pub fn bitwise_not<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |&s, d| *d = !s);

    Ok(())
}

/// Count the non-zero values of an image, over all channels.
pub fn count_nonzero<const C: usize>(image: &Image<u8, C>) -> usize {
    image.as_slice().par_iter().filter(|&&v| v != 0).count()
}

/// Compute the minimum and maximum values of an image.
///
/// Returns `None` for an empty image.
pub fn min_max<const C: usize>(image: &Image<u8, C>) -> Option<(u8, u8)> {
    image
        .as_slice()
        .par_iter()
        .map(|&v| (v, v))
        .reduce_with(|(lo1, hi1), (lo2, hi2)| (lo1.min(lo2), hi1.max(hi2)))
}
