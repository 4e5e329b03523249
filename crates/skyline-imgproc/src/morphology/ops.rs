use rayon::prelude::*;
use skyline_image::{Image, ImageError};

use super::kernels::{Kernel, KernelSpan};

#[derive(Clone, Copy)]
enum MorphOp {
    Erode,
    Dilate,
}

impl MorphOp {
    #[inline]
    fn pick<T: Ord>(self, a: T, b: T) -> T {
        match self {
            MorphOp::Erode => a.min(b),
            MorphOp::Dilate => a.max(b),
        }
    }
}

/// One pass of a minimum/maximum filter over the kernel footprint.
fn morph_pass<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    spans: &[KernelSpan],
    op: MorphOp,
) where
    T: Copy + Ord + Send + Sync,
{
    let rows = src.rows() as isize;
    let cols = src.cols() as isize;
    let src_data = src.as_slice();
    let stride = src.cols() * C;

    dst.as_slice_mut()
        .par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(r, dst_row)| {
            for c in 0..cols {
                for ch in 0..C {
                    let mut acc: Option<T> = None;

                    for span in spans {
                        let y = r as isize + span.dy;
                        if y < 0 || y >= rows {
                            continue;
                        }
                        let x0 = (c + span.dx_start).max(0);
                        let x1 = (c + span.dx_end).min(cols - 1);
                        if x0 > x1 {
                            continue;
                        }

                        let row = &src_data[y as usize * stride..(y as usize + 1) * stride];
                        let best = row[x0 as usize * C + ch..=x1 as usize * C + ch]
                            .iter()
                            .step_by(C)
                            .copied()
                            .reduce(|a, b| op.pick(a, b));

                        if let Some(best) = best {
                            acc = Some(match acc {
                                None => best,
                                Some(v) => op.pick(v, best),
                            });
                        }
                    }

                    let idx = c as usize * C + ch;
                    // no tap inside the image keeps the source value
                    dst_row[idx] = acc.unwrap_or(src_data[r * stride + idx]);
                }
            }
        });
}

fn morph_iterate<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
    op: MorphOp,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        ));
    }

    if iterations == 0 || src.is_empty() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let spans = kernel.spans();

    morph_pass(src, dst, &spans, op);
    if iterations > 1 {
        let mut temp = dst.clone();
        for _ in 1..iterations {
            morph_pass(&temp, dst, &spans, op);
            temp.as_slice_mut().copy_from_slice(dst.as_slice());
        }
    }

    Ok(())
}

/// Dilate an image using a [`Kernel`].
///
/// Dilation expands bright regions in the image. Each pixel is replaced
/// by the maximum value in the neighborhood defined by the kernel; taps
/// outside the image are ignored.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `iterations` - Number of times the dilation is applied. Zero copies `src`.
///
/// # Returns
///
/// Ok(()) on success, or [`ImageError`] if shapes don't match.
///
/// # Example
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_imgproc::morphology::{dilate, Kernel, KernelShape};
///
/// let mut data = vec![0u8; 9];
/// data[4] = 255;
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 3 }, data).unwrap();
/// let mut dilated = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let kernel = Kernel::new(KernelShape::Cross { size: 3 });
/// dilate(&image, &mut dilated, &kernel, 1).unwrap();
/// assert_eq!(dilated.as_slice(), &[0, 255, 0, 255, 255, 255, 0, 255, 0]);
/// ```
pub fn dilate<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Send + Sync,
{
    morph_iterate(src, dst, kernel, iterations, MorphOp::Dilate)
}

/// Erode an image using a [`Kernel`].
///
/// Erosion shrinks bright regions in the image. Each pixel is replaced
/// by the minimum value in the neighborhood defined by the kernel; taps
/// outside the image are ignored.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `iterations` - Number of times the erosion is applied. Zero copies `src`.
///
/// # Returns
///
/// Ok(()) on success, or [`ImageError`] if shapes don't match.
pub fn erode<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Send + Sync,
{
    morph_iterate(src, dst, kernel, iterations, MorphOp::Erode)
}

/// Opening: erosion followed by dilation.
///
/// Removes bright structures smaller than the kernel and thin streaks.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
pub fn open<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Send + Sync,
{
    let mut temp_img = src.clone();
    erode(src, &mut temp_img, kernel, 1)?;
    dilate(&temp_img, dst, kernel, 1)?;
    Ok(())
}

/// Closing: dilation followed by erosion.
///
/// Fills dark holes smaller than the kernel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
pub fn close<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Send + Sync,
{
    let mut temp_img = src.clone();
    dilate(src, &mut temp_img, kernel, 1)?;
    erode(&temp_img, dst, kernel, 1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::KernelShape;
    use skyline_image::ImageSize;

    fn gray(width: usize, height: usize, data: Vec<u8>) -> Result<Image<u8, 1>, ImageError> {
        Image::new(ImageSize { width, height }, data)
    }

    #[test]
    fn test_erode_box_ignores_border() -> Result<(), ImageError> {
        let input = gray(3, 3, vec![5, 3, 7, 6, 2, 8, 9, 4, 1])?;
        let mut output = Image::from_size_val(input.size(), 0)?;
        let kernel = Kernel::new(KernelShape::Box { size: 3 });

        erode(&input, &mut output, &kernel, 1)?;
        assert_eq!(output.as_slice(), &[2, 2, 2, 2, 1, 1, 2, 1, 1]);

        Ok(())
    }

    #[test]
    fn test_erode_cross() -> Result<(), ImageError> {
        let input = gray(3, 3, vec![5, 3, 7, 6, 2, 8, 9, 4, 1])?;
        let mut output = Image::from_size_val(input.size(), 0)?;
        let kernel = Kernel::new(KernelShape::Cross { size: 3 });

        erode(&input, &mut output, &kernel, 1)?;
        assert_eq!(output.as_slice(), &[3, 2, 3, 2, 2, 1, 4, 1, 1]);

        Ok(())
    }

    #[test]
    fn test_erode_iterations() -> Result<(), ImageError> {
        // a bright 3 pixel wide bar survives one pass of a cross but not two
        #[rustfmt::skip]
        let input = gray(5, 5, vec![
            0, 0, 0, 0, 0,
            9, 9, 9, 9, 9,
            9, 9, 9, 9, 9,
            9, 9, 9, 9, 9,
            0, 0, 0, 0, 0,
        ])?;
        let kernel = Kernel::new(KernelShape::Ellipse {
            width: 3,
            height: 3,
        });

        let mut once = Image::from_size_val(input.size(), 0)?;
        erode(&input, &mut once, &kernel, 1)?;
        assert!(once.as_slice()[10..15].iter().all(|&v| v == 9));
        assert_eq!(once.as_slice().iter().filter(|&&v| v != 0).count(), 5);

        let mut twice = Image::from_size_val(input.size(), 0)?;
        erode(&input, &mut twice, &kernel, 2)?;
        assert!(twice.as_slice().iter().all(|&v| v == 0));

        Ok(())
    }

    #[test]
    fn test_zero_iterations_copies() -> Result<(), ImageError> {
        let input = gray(2, 2, vec![1, 2, 3, 4])?;
        let mut output = Image::from_size_val(input.size(), 0)?;
        let kernel = Kernel::new(KernelShape::Box { size: 3 });
        dilate(&input, &mut output, &kernel, 0)?;
        assert_eq!(output, input);
        Ok(())
    }

    #[test]
    fn test_dilate_multichannel() -> Result<(), ImageError> {
        let input = Image::<u8, 2>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![0, 7, 5, 0, 0, 1],
        )?;
        let mut output = Image::from_size_val(input.size(), 0)?;
        let kernel = Kernel::new(KernelShape::Box { size: 3 });
        dilate(&input, &mut output, &kernel, 1)?;
        assert_eq!(output.as_slice(), &[5, 7, 5, 7, 5, 1]);
        Ok(())
    }

    #[test]
    fn test_open_removes_small_blob() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 9,
            height: 9,
        };
        let mut input = Image::<u8, 1>::from_size_val(size, 0)?;
        input.set_pixel(4, 4, 0, 255)?;
        // a large bright block touching the bottom border
        for y in 6..9 {
            for x in 0..9 {
                input.set_pixel(x, y, 0, 255)?;
            }
        }

        let kernel = Kernel::new(KernelShape::Box { size: 3 });
        let mut opened = Image::from_size_val(size, 0)?;
        open(&input, &mut opened, &kernel)?;

        assert_eq!(opened.get_pixel(4, 4, 0)?, &0);
        for y in 6..9 {
            for x in 0..9 {
                assert_eq!(opened.get_pixel(x, y, 0)?, &255);
            }
        }

        Ok(())
    }

    #[test]
    fn test_close_fills_hole() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };
        let mut input = Image::<u8, 1>::from_size_val(size, 200)?;
        input.set_pixel(2, 2, 0, 0)?;

        let kernel = Kernel::new(KernelShape::Box { size: 3 });
        let mut closed = Image::from_size_val(size, 0)?;
        close(&input, &mut closed, &kernel)?;

        assert!(closed.as_slice().iter().all(|&v| v == 200));
        Ok(())
    }

    #[test]
    fn test_size_mismatch() -> Result<(), ImageError> {
        let input = gray(2, 2, vec![0; 4])?;
        let mut output = gray(3, 2, vec![0; 6])?;
        let kernel = Kernel::new(KernelShape::Box { size: 3 });
        assert!(erode(&input, &mut output, &kernel, 1).is_err());
        Ok(())
    }
}
