/// Shapes of morphological `Kernels`.
///
/// Defines the geometry of the kernel used in morphological operations.
/// All kernels are anchored at `(width / 2, height / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    /// A rectangular box structuring element.
    ///
    /// All pixels within the box are included in the morphological operation.
    Box {
        /// `size` - The side length of the square kernel (size x size).
        size: usize,
    },

    /// A cross (plus) shaped structuring element.
    ///
    /// Only pixels along the horizontal and vertical center lines are included,
    /// forming a plus/cross pattern.
    Cross {
        /// `size` - The side length of the square cross kernel (size x size).
        size: usize,
    },

    /// An ellipse (or circle) shaped structuring element inscribed in the kernel box.
    ///
    /// Row `i` of the kernel, at vertical distance `dy = i - height / 2` from the anchor,
    /// covers the columns within `round(rx * sqrt(1 - dy^2 / ry^2))` of the anchor, where
    /// `rx = width / 2` and `ry = height / 2`.
    Ellipse {
        /// * `width` - The width of the ellipse.
        width: usize,
        /// * `height` - The height of the ellipse.
        height: usize,
    },
}

/// A horizontal run of active kernel taps, relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KernelSpan {
    pub dy: isize,
    pub dx_start: isize,
    pub dx_end: isize,
}

/// A morphological structuring element.
///
/// The kernel defines the neighborhood structure used in morphological operations
/// (dilate, erode, open, close). It stores a binary mask where 1 indicates pixels
/// included in the operation and 0 indicates excluded pixels.
///
/// # Example
///
/// ```rust
/// use skyline_imgproc::morphology::{Kernel, KernelShape};
///
/// // Create a 3x3 ellipse kernel, which degenerates to a cross
/// let kernel = Kernel::new(KernelShape::Ellipse { width: 3, height: 3 });
/// assert_eq!(kernel.width(), 3);
/// assert_eq!(kernel.height(), 3);
/// assert_eq!(kernel.anchor(), (1, 1));
/// assert_eq!(kernel.data(), &[0, 1, 0, 1, 1, 1, 0, 1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Kernel {
    /// Create a morphological kernel from a shape.
    ///
    /// # Arguments
    ///
    /// * `shape` - The shape of the kernel (Box, Cross, or Ellipse).
    pub fn new(shape: KernelShape) -> Self {
        match shape {
            KernelShape::Box { size } => box_kernel(size),
            KernelShape::Cross { size } => cross_kernel(size),
            KernelShape::Ellipse { width, height } => ellipse_kernel(width, height),
        }
    }

    /// Get a reference to the kernel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the width of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the kernel.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the anchor of the kernel as `(x, y)`.
    pub fn anchor(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Number of active taps.
    pub fn count_active(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Decompose the active taps into horizontal runs relative to the anchor.
    pub(crate) fn spans(&self) -> Vec<KernelSpan> {
        let (ax, ay) = self.anchor();
        let mut spans = Vec::new();

        for (i, row) in self.data.chunks_exact(self.width.max(1)).enumerate() {
            let mut j = 0;
            while j < row.len() {
                if row[j] == 0 {
                    j += 1;
                    continue;
                }
                let start = j;
                while j < row.len() && row[j] != 0 {
                    j += 1;
                }
                spans.push(KernelSpan {
                    dy: i as isize - ay as isize,
                    dx_start: start as isize - ax as isize,
                    dx_end: (j - 1) as isize - ax as isize,
                });
            }
        }

        spans
    }
}

/// Create a box structuring element filled with 1s.
fn box_kernel(size: usize) -> Kernel {
    Kernel {
        data: vec![1u8; size * size],
        width: size,
        height: size,
    }
}

/// Create a cross structuring element with 1s along the center row and column.
fn cross_kernel(size: usize) -> Kernel {
    let mut data = vec![0u8; size * size];
    let mid = size / 2;

    // fill horizontal line
    for j in 0..size {
        data[mid * size + j] = 1;
    }

    // fill vertical line
    for i in 0..size {
        data[i * size + mid] = 1;
    }

    Kernel {
        data,
        width: size,
        height: size,
    }
}

/// Create an ellipse structuring element.
fn ellipse_kernel(width: usize, height: usize) -> Kernel {
    let mut data = vec![0u8; width * height];
    let rx = (width / 2) as isize;
    let ry = (height / 2) as isize;
    let inv_ry2 = if ry > 0 {
        1.0 / (ry * ry) as f64
    } else {
        0.0
    };

    for i in 0..height {
        let dy = i as isize - ry;
        if dy.abs() > ry {
            continue;
        }

        let half = if ry > 0 {
            (rx as f64 * (((ry * ry - dy * dy) as f64) * inv_ry2).sqrt()).round() as isize
        } else {
            rx
        };

        let start = (rx - half).max(0) as usize;
        let end = ((rx + half + 1) as usize).min(width);
        for j in start..end {
            data[i * width + j] = 1;
        }
    }

    Kernel {
        data,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print_kernel(kernel: &Kernel) {
        for row in kernel.data().chunks(kernel.width()) {
            for v in row {
                print!("{} ", v);
            }
            println!();
        }
    }

    #[test]
    fn test_box_kernel() {
        let kernel = Kernel::new(KernelShape::Box { size: 3 });
        assert_eq!(kernel.width(), 3);
        assert_eq!(kernel.height(), 3);
        assert!(kernel.data().iter().all(|&x| x == 1));
        assert_eq!(kernel.count_active(), 9);
    }

    #[test]
    fn test_cross_kernel() {
        let kernel = Kernel::new(KernelShape::Cross { size: 3 });
        let data = kernel.data();
        // center row
        assert_eq!(data[3], 1);
        assert_eq!(data[4], 1);
        assert_eq!(data[5], 1);
        // center column
        assert_eq!(data[1], 1);
        assert_eq!(data[7], 1);
        // corners
        assert_eq!(data[0], 0);
    }

    #[test]
    fn test_ellipse_kernel_3x3_is_cross() {
        let ellipse = Kernel::new(KernelShape::Ellipse {
            width: 3,
            height: 3,
        });
        let cross = Kernel::new(KernelShape::Cross { size: 3 });
        assert_eq!(ellipse, cross);
    }

    #[test]
    fn test_ellipse_kernel_5x5() {
        let kernel = Kernel::new(KernelShape::Ellipse {
            width: 5,
            height: 5,
        });
        print_kernel(&kernel);

        #[rustfmt::skip]
        let expected = [
            0, 0, 1, 0, 0,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            0, 0, 1, 0, 0,
        ];
        assert_eq!(kernel.data(), &expected);
    }

    #[test]
    fn test_ellipse_kernel_20x20() {
        let kernel = Kernel::new(KernelShape::Ellipse {
            width: 20,
            height: 20,
        });
        print_kernel(&kernel);

        assert_eq!(kernel.anchor(), (10, 10));
        // the first row only holds the anchor column
        assert_eq!(kernel.data()[..20].iter().filter(|&&v| v == 1).count(), 1);
        assert_eq!(kernel.data()[10], 1);
        // the anchor row spans the whole width
        assert!(kernel.data()[10 * 20..11 * 20].iter().all(|&v| v == 1));
        // symmetric around the anchor row
        for dy in 1..10 {
            let above = &kernel.data()[(10 - dy) * 20..(11 - dy) * 20];
            let below = &kernel.data()[(10 + dy) * 20..(11 + dy) * 20];
            assert_eq!(above, below);
        }
    }

    #[test]
    fn test_kernel_spans() {
        let kernel = Kernel::new(KernelShape::Cross { size: 3 });
        let spans = kernel.spans();
        assert_eq!(
            spans,
            vec![
                KernelSpan {
                    dy: -1,
                    dx_start: 0,
                    dx_end: 0
                },
                KernelSpan {
                    dy: 0,
                    dx_start: -1,
                    dx_end: 1
                },
                KernelSpan {
                    dy: 1,
                    dx_start: 0,
                    dx_end: 0
                },
            ]
        );
    }
}
