/// Fixed binomial kernels used when no sigma is given for the small odd sizes.
const SMALL_GAUSSIAN_TABLES: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
    ],
];

/// Derive the gaussian sigma from the kernel size.
///
/// Follows the usual convention `sigma = 0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn sigma_from_kernel_size(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Create a gaussian blur kernel.
///
/// A non-positive `sigma` derives it from the kernel size; odd sizes up to 7 then use the
/// exact binomial coefficients.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 && kernel_size % 2 == 1 && kernel_size <= 7 {
        return SMALL_GAUSSIAN_TABLES[kernel_size / 2].to_vec();
    }

    let sigma = if sigma <= 0.0 {
        sigma_from_kernel_size(kernel_size)
    } else {
        sigma
    };

    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create a 3x3 sobel kernel.
///
/// # Returns
///
/// The derivative and the smoothing parts of the separable kernel.
pub fn sobel_kernel_1d() -> ([i32; 3], [i32; 3]) {
    ([-1, 0, 1], [1, 2, 1])
}
