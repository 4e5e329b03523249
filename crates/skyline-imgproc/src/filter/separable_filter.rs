use rayon::prelude::*;
use skyline_image::{Image, ImageError};

use crate::padding::PaddingMode;

/// Trait for floating point casting
pub trait FloatConversion {
    /// Convert the type to f32
    fn to_f32(&self) -> f32;
    /// Convert the type from f32
    fn from_f32(val: f32) -> Self;
}

impl FloatConversion for f32 {
    fn to_f32(&self) -> f32 {
        *self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl FloatConversion for u8 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, 255.0) as u8
    }
}

/// Apply a separable filter to an image.
///
/// The horizontal kernel is applied first into an f32 buffer, then the vertical kernel writes
/// the destination. Both kernels are correlated around their center tap.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `padding_mode` - How taps outside the image are resolved. [`PaddingMode::Constant`]
///   treats them as zero.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    padding_mode: PaddingMode,
) -> Result<(), ImageError>
where
    T: FloatConversion + Copy + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;
    let src_data = src.as_slice();
    let mut temp = vec![0.0f32; src_data.len()];

    // horizontal pass
    temp.par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, temp_row)| {
            let src_row = &src_data[r * cols * C..(r + 1) * cols * C];
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (i, &k) in kernel_x.iter().enumerate() {
                    let x = c as isize + i as isize - half_x;
                    if let Some(x) = padding_mode.map_index(x, cols) {
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            *acc_val += src_row[x * C + ch].to_f32() * k;
                        }
                    }
                }
                temp_row[c * C..(c + 1) * C].copy_from_slice(&acc);
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (i, &k) in kernel_y.iter().enumerate() {
                    let y = r as isize + i as isize - half_y;
                    if let Some(y) = padding_mode.map_index(y, rows) {
                        let idx = (y * cols + c) * C;
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            *acc_val += temp[idx + ch] * k;
                        }
                    }
                }
                for (ch, &acc_val) in acc.iter().enumerate() {
                    dst_row[c * C + ch] = T::from_f32(acc_val);
                }
            }
        });

    Ok(())
}
