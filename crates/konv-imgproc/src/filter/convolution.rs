use konv_image::Image;

use super::Kernel;
use crate::{
    error::FilterError,
    padding::{replicate_padding, Padding2D},
    parallel::{par_iter_rows_indexed, run_with_strategy, ExecutionStrategy},
};

/// Lowest intensity an output pixel can take.
pub const MIN_INTENSITY: f32 = 0.0;

/// Highest intensity an output pixel can take.
pub const MAX_INTENSITY: f32 = 255.0;

/// Check that an image and a kernel can be convolved.
///
/// The kernel must be non-empty, square and odd-sized so that it has a center
/// pixel; the image must have at least one row and one column.
///
/// # Errors
///
/// * [`FilterError::InvalidKernelShape`] if the kernel is empty, not square or even-sized.
/// * [`FilterError::EmptyImage`] if the image has no pixels.
pub fn validate_convolution_inputs(
    src: &Image<f32, 1>,
    kernel: &Kernel,
) -> Result<(), FilterError> {
    let (rows, cols) = (kernel.rows(), kernel.cols());

    if rows == 0 || cols == 0 {
        return Err(FilterError::InvalidKernelShape(format!(
            "kernel must not be empty, got {rows}x{cols}"
        )));
    }

    if !kernel.is_square() {
        return Err(FilterError::InvalidKernelShape(format!(
            "kernel must be square, got {rows}x{cols}"
        )));
    }

    if rows % 2 == 0 {
        return Err(FilterError::InvalidKernelShape(format!(
            "kernel size must be odd, got {rows}x{cols}"
        )));
    }

    if src.size().is_empty() {
        return Err(FilterError::EmptyImage(src.width(), src.height()));
    }

    Ok(())
}

/// Saturate a raw weighted sum into `[MIN_INTENSITY, MAX_INTENSITY]`.
///
/// NaN maps to `MIN_INTENSITY`.
#[inline]
pub fn clamp_intensity(value: f32) -> f32 {
    if value.is_nan() {
        return MIN_INTENSITY;
    }
    value.clamp(MIN_INTENSITY, MAX_INTENSITY)
}

/// Weighted sum of the `k x k` window of `padded` whose top-left corner is `(x, y)`.
#[inline]
fn window_sum(padded: &[f32], stride: usize, weights: &[f32], k: usize, x: usize, y: usize) -> f32 {
    weights
        .chunks_exact(k)
        .enumerate()
        .map(|(ky, kernel_row)| {
            let start = (y + ky) * stride + x;
            padded[start..start + k]
                .iter()
                .zip(kernel_row)
                .map(|(&p, &w)| p * w)
                .sum::<f32>()
        })
        .sum()
}

/// Convolve a grayscale image with a square kernel.
///
/// Uses the default [`ExecutionStrategy`]. See [`convolve_with_strategy`].
///
/// # Example
///
/// ```
/// use konv_image::Image;
/// use konv_imgproc::filter::{convolve, KernelPreset};
///
/// let src = Image::<f32, 1>::from_size_val([4, 4].into(), 50.0).unwrap();
/// let dst = convolve(&src, &KernelPreset::Edge.kernel()).unwrap();
///
/// assert_eq!(dst.size(), src.size());
/// assert!(dst.as_slice().iter().all(|&v| v == 0.0));
/// ```
pub fn convolve(src: &Image<f32, 1>, kernel: &Kernel) -> Result<Image<f32, 1>, FilterError> {
    convolve_with_strategy(src, kernel, ExecutionStrategy::default())
}

/// Convolve a grayscale image with a square kernel.
///
/// The image is extended by edge replication with radius `K / 2`, then every output
/// pixel `(x, y)` receives the sum of the element-wise product between the kernel and
/// the `K x K` window of the extended image anchored at `(x, y)`, saturated to
/// `[0, 255]`. The kernel is applied as is, without flipping or normalization.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `kernel` - A non-empty, square, odd-sized kernel.
/// * `strategy` - How output rows are distributed across threads.
///
/// # Returns
///
/// A new image with the same size as `src`.
///
/// # Errors
///
/// Returns an error if the inputs fail [`validate_convolution_inputs`] or the
/// strategy cannot be applied. No output is produced in that case.
pub fn convolve_with_strategy(
    src: &Image<f32, 1>,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<Image<f32, 1>, FilterError> {
    validate_convolution_inputs(src, kernel)?;

    let k = kernel.cols();
    log::debug!(
        "convolving {} with a {k}x{k} kernel, strategy: {strategy}",
        src.size()
    );

    // a fixed pool is built once and shared by the padding and reduction stages
    run_with_strategy(strategy, |rows| -> Result<Image<f32, 1>, FilterError> {
        let padded = replicate_padding(src, &Padding2D::uniform(kernel.radius()), rows)?;
        let padded_data = padded.as_slice();
        let padded_stride = padded.width();
        let weights = kernel.as_slice();

        let mut dst = Image::from_size_val(src.size(), 0.0f32)?;

        par_iter_rows_indexed(dst.as_slice_mut(), src.width(), rows, |y, dst_row| {
            dst_row.iter_mut().enumerate().for_each(|(x, out)| {
                *out = clamp_intensity(window_sum(padded_data, padded_stride, weights, k, x, y));
            });
        })?;

        Ok(dst)
    })?
}
