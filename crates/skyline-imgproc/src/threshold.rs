use num_traits::Zero;
use std::cmp::PartialOrd;

use skyline_image::{Image, ImageError};

use crate::parallel;

/// Apply a binary threshold to an image.
///
/// Values strictly greater than `threshold` become `max_value`, everything else zero.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Examples
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 254, 255, 0, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 254, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 0, 0, 255, 0, 0]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Apply an inverse binary threshold to an image.
///
/// Values strictly greater than `threshold` become zero, everything else `max_value`.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is less than the threshold.
pub fn threshold_binary_inverse<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            T::zero()
        } else {
            max_value
        };
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_image::ImageSize;

    #[test]
    fn test_threshold_binary() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![100, 200, 50, 150, 200, 250],
        )?;

        let mut thresholded = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        threshold_binary(&image, &mut thresholded, 100, 255)?;
        assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);

        let mut inverted = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        threshold_binary_inverse(&image, &mut inverted, 100, 255)?;
        assert_eq!(inverted.as_slice(), &[255, 0, 255, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn test_threshold_binary_f32() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![0.2, 0.5, 0.8],
        )?;

        let mut thresholded = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        threshold_binary(&image, &mut thresholded, 0.5, 1.0)?;
        assert_eq!(thresholded.as_slice(), &[0.0, 0.0, 1.0]);

        Ok(())
    }

    #[test]
    fn test_threshold_size_mismatch() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        assert_eq!(
            threshold_binary(&image, &mut dst, 1, 255),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}
