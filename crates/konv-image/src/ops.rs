use crate::{Image, ImageError};

/// Widen an 8-bit image to `f32` intensities in `[0, 255]`.
///
/// The conversion is exact for every `u8` value.
pub fn to_intensity_f32<const C: usize>(src: &Image<u8, C>) -> Result<Image<f32, C>, ImageError> {
    src.cast::<f32>()
}

/// Narrow `f32` intensities back to an 8-bit image.
///
/// Values saturate to `[0, 255]` and the fractional part is truncated toward zero.
/// NaN maps to `0`.
///
/// # Example
///
/// ```
/// use konv_image::{ops::to_u8_saturating, Image};
///
/// let image = Image::<f32, 1>::new([4, 1].into(), vec![-3.0, 12.9, 254.5, 300.0]).unwrap();
/// let image_u8 = to_u8_saturating(&image).unwrap();
///
/// assert_eq!(image_u8.as_slice(), &[0, 12, 254, 255]);
/// ```
pub fn to_u8_saturating<const C: usize>(src: &Image<f32, C>) -> Result<Image<u8, C>, ImageError> {
    // `as` saturates out of range floats and maps NaN to zero
    let data = src.as_slice().iter().map(|&v| v as u8).collect();
    Image::new(src.size(), data)
}
