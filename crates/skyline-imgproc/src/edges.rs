use rayon::prelude::*;
use skyline_image::{Image, ImageError};

use crate::filter::spatial_gradient_u8;

// per pixel state after non-maximum suppression
const WEAK: u8 = 0;
const NOT_EDGE: u8 = 1;
const STRONG: u8 = 2;

/// tan(22.5°) in Q15 fixed point
const TG22: i64 = 13573;

/// Detect edges with the Canny algorithm.
///
/// The gradient comes from a 3x3 Sobel operator and its magnitude is the L1 norm
/// `|dx| + |dy|`. After non-maximum suppression along the quantized gradient direction,
/// pixels above `high_threshold` are edges, and pixels above `low_threshold` are edges when
/// they are 8-connected to another edge pixel.
///
/// If `low_threshold > high_threshold` the two are swapped.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output edge map, 255 on edges and 0 elsewhere.
/// * `low_threshold` - The hysteresis low threshold.
/// * `high_threshold` - The hysteresis high threshold.
///
/// # Example
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_imgproc::edges::canny;
///
/// let size = ImageSize { width: 8, height: 8 };
/// let data = (0..64).map(|i| if i < 32 { 0u8 } else { 100 }).collect();
/// let image = Image::<u8, 1>::new(size, data).unwrap();
/// let mut edges = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// canny(&image, &mut edges, 40.0, 40.0).unwrap();
/// assert_eq!(&edges.as_slice()[24..32], &[255; 8]);
/// ```
pub fn canny(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    low_threshold: f32,
    high_threshold: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (low, high) = if low_threshold > high_threshold {
        (high_threshold, low_threshold)
    } else {
        (low_threshold, high_threshold)
    };

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let mut dx = Image::<i16, 1>::from_size_val(src.size(), 0)?;
    let mut dy = Image::<i16, 1>::from_size_val(src.size(), 0)?;
    spatial_gradient_u8(src, &mut dx, &mut dy)?;

    let magnitude = dx
        .as_slice()
        .par_iter()
        .zip(dy.as_slice().par_iter())
        .map(|(&gx, &gy)| (gx as i32).abs() + (gy as i32).abs())
        .collect::<Vec<_>>();

    let mut states = non_max_suppression(
        &magnitude,
        dx.as_slice(),
        dy.as_slice(),
        (rows, cols),
        (low, high),
    );
    hysteresis(&mut states, rows, cols);

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(states.par_iter())
        .for_each(|(d, &s)| *d = if s == STRONG { 255 } else { 0 });

    Ok(())
}

/// Classify every pixel as strong, weak or no edge.
///
/// A pixel survives when its magnitude is a local maximum across the edge: strictly greater
/// than the neighbor before it and not smaller than the neighbor after it for the horizontal
/// and vertical directions, strictly greater than both on the diagonals. Magnitudes outside
/// the image count as zero.
fn non_max_suppression(
    magnitude: &[i32],
    dx: &[i16],
    dy: &[i16],
    (rows, cols): (usize, usize),
    (low, high): (f32, f32),
) -> Vec<u8> {
    let mag_at = |r: isize, c: isize| -> i32 {
        if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
            0
        } else {
            magnitude[r as usize * cols + c as usize]
        }
    };

    let mut states = vec![NOT_EDGE; rows * cols];

    states
        .par_chunks_exact_mut(cols)
        .enumerate()
        .for_each(|(r, state_row)| {
            let r = r as isize;
            for (c, state) in state_row.iter_mut().enumerate() {
                let idx = r as usize * cols + c;
                let m = magnitude[idx];
                if m as f32 <= low {
                    continue;
                }

                let c = c as isize;
                let gx = dx[idx] as i64;
                let gy = dy[idx] as i64;
                let x = gx.abs();
                let y = gy.abs() << 15;
                let tg22x = x * TG22;

                let is_max = if y < tg22x {
                    // gradient mostly horizontal
                    m > mag_at(r, c - 1) && m >= mag_at(r, c + 1)
                } else {
                    let tg67x = tg22x + (x << 16);
                    if y > tg67x {
                        // gradient mostly vertical
                        m > mag_at(r - 1, c) && m >= mag_at(r + 1, c)
                    } else {
                        let s = if (gx < 0) != (gy < 0) { -1 } else { 1 };
                        m > mag_at(r - 1, c - s) && m > mag_at(r + 1, c + s)
                    }
                };

                if is_max {
                    *state = if m as f32 > high { STRONG } else { WEAK };
                }
            }
        });

    states
}

/// Promote weak pixels connected to strong ones, then leave only strong pixels marked.
fn hysteresis(states: &mut [u8], rows: usize, cols: usize) {
    let mut stack = states
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == STRONG)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    while let Some(idx) = stack.pop() {
        let r = (idx / cols) as isize;
        let c = (idx % cols) as isize;
        for (or, oc) in [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ] {
            let nr = r + or;
            let nc = c + oc;
            if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                continue;
            }
            let nidx = nr as usize * cols + nc as usize;
            if states[nidx] == WEAK {
                states[nidx] = STRONG;
                stack.push(nidx);
            }
        }
    }
}

/// Set every pixel of `image` that lies on an edge to the maximum intensity.
///
/// The image is modified in place.
///
/// # Arguments
///
/// * `image` - The image to highlight.
/// * `edges` - An edge map, non-zero on edges.
pub fn highlight_edges(image: &mut Image<u8, 1>, edges: &Image<u8, 1>) -> Result<(), ImageError> {
    if image.size() != edges.size() {
        return Err(ImageError::InvalidImageSize(
            image.cols(),
            image.rows(),
            edges.cols(),
            edges.rows(),
        ));
    }

    image
        .as_slice_mut()
        .par_iter_mut()
        .zip(edges.as_slice().par_iter())
        .filter(|(_, &e)| e != 0)
        .for_each(|(p, _)| *p = u8::MAX);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_image::ImageSize;

    fn step_image(size: ImageSize, step_row: usize, low: u8, high: u8) -> Image<u8, 1> {
        let data = (0..size.height)
            .flat_map(|r| std::iter::repeat(if r < step_row { low } else { high }).take(size.width))
            .collect();
        Image::new(size, data).unwrap()
    }

    #[test]
    fn test_canny_flat_image() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 16,
            height: 12,
        };
        let image = Image::<u8, 1>::from_size_val(size, 128)?;
        let mut edges = Image::<u8, 1>::from_size_val(size, 7)?;

        canny(&image, &mut edges, 40.0, 40.0)?;
        assert!(edges.as_slice().iter().all(|&v| v == 0));

        Ok(())
    }

    #[test]
    fn test_canny_horizontal_step() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        let image = step_image(size, 5, 0, 100);
        let mut edges = Image::<u8, 1>::from_size_val(size, 0)?;

        canny(&image, &mut edges, 40.0, 40.0)?;

        for r in 0..10 {
            for c in 0..10 {
                let expected = if r == 4 { 255 } else { 0 };
                assert_eq!(edges.get_pixel(c, r, 0)?, &expected, "pixel ({c}, {r})");
            }
        }

        Ok(())
    }

    #[test]
    fn test_canny_step_on_first_row() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        let image = step_image(size, 1, 0, 100);
        let mut edges = Image::<u8, 1>::from_size_val(size, 0)?;

        canny(&image, &mut edges, 40.0, 40.0)?;

        for r in 0..10 {
            for c in 0..10 {
                let expected = if r == 0 { 255 } else { 0 };
                assert_eq!(edges.get_pixel(c, r, 0)?, &expected, "pixel ({c}, {r})");
            }
        }

        Ok(())
    }

    #[test]
    fn test_canny_thresholds() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        // a step of 10 gives a magnitude of 40
        let image = step_image(size, 5, 50, 60);
        let mut edges = Image::<u8, 1>::from_size_val(size, 0)?;

        canny(&image, &mut edges, 40.0, 40.0)?;
        assert!(edges.as_slice().iter().all(|&v| v == 0));

        canny(&image, &mut edges, 20.0, 39.0)?;
        assert_eq!(edges.as_slice().iter().filter(|&&v| v == 255).count(), 10);

        // weak everywhere and nothing strong
        canny(&image, &mut edges, 20.0, 50.0)?;
        assert!(edges.as_slice().iter().all(|&v| v == 0));

        // swapped thresholds behave the same
        canny(&image, &mut edges, 39.0, 20.0)?;
        assert_eq!(edges.as_slice().iter().filter(|&&v| v == 255).count(), 10);

        Ok(())
    }

    #[test]
    fn test_hysteresis() {
        #[rustfmt::skip]
        let mut states = vec![
            STRONG,   WEAK,     NOT_EDGE, NOT_EDGE, NOT_EDGE,
            NOT_EDGE, NOT_EDGE, WEAK,     NOT_EDGE, WEAK,
            NOT_EDGE, NOT_EDGE, NOT_EDGE, NOT_EDGE, NOT_EDGE,
            WEAK,     NOT_EDGE, NOT_EDGE, NOT_EDGE, NOT_EDGE,
        ];
        hysteresis(&mut states, 4, 5);

        let strong = states
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == STRONG)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        // the diagonal chain is followed, isolated weak pixels are dropped
        assert_eq!(strong, vec![0, 1, 7]);
    }

    #[test]
    fn test_highlight_edges() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let mut image = Image::<u8, 1>::new(size, vec![10, 20, 30])?;
        let edges = Image::<u8, 1>::new(size, vec![0, 255, 0])?;

        highlight_edges(&mut image, &edges)?;
        assert_eq!(image.as_slice(), &[10, 255, 30]);

        // any non-zero edge value counts, the buffer is written in place
        let ptr = image.as_slice().as_ptr();
        let edges = Image::<u8, 1>::new(size, vec![1, 0, 0])?;
        highlight_edges(&mut image, &edges)?;
        assert_eq!(image.as_slice(), &[255, 255, 30]);
        assert_eq!(image.as_slice().as_ptr(), ptr);

        let wrong = Image::<u8, 1>::new([1, 3].into(), vec![0, 0, 0])?;
        assert_eq!(
            highlight_edges(&mut image, &wrong),
            Err(ImageError::InvalidImageSize(3, 1, 1, 3))
        );

        Ok(())
    }
}
