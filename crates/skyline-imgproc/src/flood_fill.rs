use skyline_image::Image;

/// An error type for the flood fill.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FloodFillError {
    /// Error when the seed point lies outside the image.
    #[error("Seed point ({x}, {y}) is outside the image ({width}x{height})")]
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
}

/// How the tolerance of a flood fill is anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodFillRange {
    /// Every candidate is compared against the seed value.
    #[default]
    Fixed,
    /// Every candidate is compared against the neighbor it was reached from.
    Floating,
}

/// An axis aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    /// The left column.
    pub x: usize,
    /// The top row.
    pub y: usize,
    /// The number of columns.
    pub width: usize,
    /// The number of rows.
    pub height: usize,
}

/// The outcome of a flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodFillResult {
    /// The number of repainted pixels.
    pub area: usize,
    /// The bounding box of the repainted region.
    pub rect: Rect,
}

/// Fill the 4-connected region around a seed point with a new value.
///
/// A neighbor joins the region when its value lies in `[reference - lo_diff, reference + up_diff]`,
/// where the reference is the seed value or the value of the neighbor it was reached from,
/// see [`FloodFillRange`]. Comparisons use the values before the fill.
///
/// # Arguments
///
/// * `image` - The grayscale image, repainted in place.
/// * `seed` - The starting point as `(x, y)`.
/// * `new_val` - The value written into the region.
/// * `lo_diff` - Maximal lower brightness difference.
/// * `up_diff` - Maximal upper brightness difference.
/// * `range` - The tolerance anchor.
///
/// # Example
///
/// ```
/// use skyline_image::{Image, ImageSize};
/// use skyline_imgproc::flood_fill::{flood_fill, FloodFillRange};
///
/// let mut image = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 2 },
///     vec![0, 255, 0, 0, 255, 0],
/// ).unwrap();
///
/// let result = flood_fill(&mut image, (0, 0), 128, 10, 10, FloodFillRange::Fixed).unwrap();
/// assert_eq!(result.area, 2);
/// assert_eq!(image.as_slice(), &[128, 255, 0, 128, 255, 0]);
/// ```
pub fn flood_fill(
    image: &mut Image<u8, 1>,
    seed: (usize, usize),
    new_val: u8,
    lo_diff: u8,
    up_diff: u8,
    range: FloodFillRange,
) -> Result<FloodFillResult, FloodFillError> {
    let (width, height) = (image.width(), image.height());
    let (sx, sy) = seed;
    if sx >= width || sy >= height {
        return Err(FloodFillError::SeedOutOfBounds {
            x: sx,
            y: sy,
            width,
            height,
        });
    }

    let data = image.as_slice();
    let seed_val = data[sy * width + sx] as i32;
    let accepts = |reference: i32, candidate: i32| {
        candidate >= reference - lo_diff as i32 && candidate <= reference + up_diff as i32
    };

    let mut visited = vec![false; width * height];
    let mut stack = vec![(sx, sy)];
    visited[sy * width + sx] = true;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (sx, sy, sx, sy);
    let mut area = 0;

    while let Some((x, y)) = stack.pop() {
        area += 1;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        let reference = match range {
            FloodFillRange::Fixed => seed_val,
            FloodFillRange::Floating => data[y * width + x] as i32,
        };

        let neighbors = [
            (x.checked_sub(1), Some(y)),
            ((x + 1 < width).then_some(x + 1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), (y + 1 < height).then_some(y + 1)),
        ];

        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let idx = ny * width + nx;
            if !visited[idx] && accepts(reference, data[idx] as i32) {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    image
        .as_slice_mut()
        .iter_mut()
        .zip(visited.iter())
        .filter(|(_, &v)| v)
        .for_each(|(p, _)| *p = new_val);

    Ok(FloodFillResult {
        area,
        rect: Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        },
    })
}
