use rayon::prelude::*;
use skyline_image::{Image, ImageError};

use super::{kernels, separable_filter, FloatConversion};
use crate::padding::PaddingMode;

/// Blur an image using a gaussian blur filter
///
/// Borders are resolved with [`PaddingMode::Reflect101`]. A non-positive sigma is derived
/// from the kernel size, see [`kernels::gaussian_kernel_1d`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_imgproc::filter::gaussian_blur;
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 10).unwrap();
/// let mut blurred = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gaussian_blur(&image, &mut blurred, (3, 3), (0.0, 0.0)).unwrap();
/// assert!(blurred.as_slice().iter().all(|&v| v == 10));
/// ```
pub fn gaussian_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), ImageError>
where
    T: FloatConversion + Copy + Send + Sync,
{
    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter(src, dst, &kernel_x, &kernel_y, PaddingMode::Reflect101)
}

/// Compute the 3x3 sobel derivatives of a grayscale image.
///
/// Integer arithmetic throughout, borders resolved with [`PaddingMode::Replicate`] so that a
/// step between the outermost two rows or columns also shows on the outermost one.
///
/// # Arguments
///
/// * `src` - The source grayscale image.
/// * `dx` - The horizontal derivative, positive for intensities increasing to the right.
/// * `dy` - The vertical derivative, positive for intensities increasing downwards.
///
/// PRECONDITION: all images must have the same shape.
pub fn spatial_gradient_u8(
    src: &Image<u8, 1>,
    dx: &mut Image<i16, 1>,
    dy: &mut Image<i16, 1>,
) -> Result<(), ImageError> {
    for out_size in [dx.size(), dy.size()] {
        if src.size() != out_size {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                out_size.width,
                out_size.height,
            ));
        }
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let (deriv, smooth) = kernels::sobel_kernel_1d();
    let src_data = src.as_slice();
    let border = PaddingMode::Replicate;

    dx.as_slice_mut()
        .par_chunks_exact_mut(cols)
        .zip(dy.as_slice_mut().par_chunks_exact_mut(cols))
        .enumerate()
        .for_each(|(r, (dx_row, dy_row))| {
            // replicate never fails to map an index
            let ys = [-1isize, 0, 1].map(|o| border.map_index(r as isize + o, rows).unwrap_or(r));
            for c in 0..cols {
                let xs =
                    [-1isize, 0, 1].map(|o| border.map_index(c as isize + o, cols).unwrap_or(c));
                let mut gx = 0i32;
                let mut gy = 0i32;
                for (ky, &y) in ys.iter().enumerate() {
                    for (kx, &x) in xs.iter().enumerate() {
                        let val = src_data[y * cols + x] as i32;
                        gx += val * deriv[kx] * smooth[ky];
                        gy += val * smooth[kx] * deriv[ky];
                    }
                }
                dx_row[c] = gx as i16;
                dy_row[c] = gy as i16;
            }
        });

    Ok(())
}
