use konv_image::{Image, ImageSize};

use crate::{
    error::FilterError,
    parallel::{par_iter_rows_indexed, ExecutionStrategy},
};

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// Creates the same padding on all four sides.
    pub fn uniform(pad: usize) -> Self {
        Self {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
        }
    }

    /// Returns the size of an image of `size` after applying this padding.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }
}

/// Clamps a possibly out of range coordinate to the nearest valid index in `[0, len)`.
#[inline]
fn replicate_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Creates a new image extended by edge replication.
///
/// Every synthesized cell takes the value of the nearest in-bounds pixel, so rows
/// above and below repeat the first and last rows, columns to the sides repeat the
/// first and last columns, and corner blocks repeat the corner pixels.
///
/// Example: ...d c b a | a a a a...
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `padding` - The amount of padding (in pixels) for all four sides.
/// * `strategy` - How the padded rows are distributed.
///
/// # Errors
///
/// Returns an error if `src` has no pixels, since there is nothing to replicate, or
/// if the strategy cannot be applied.
///
/// # Example
///
/// ```rust
/// use konv_image::Image;
/// use konv_imgproc::{
///     padding::{replicate_padding, Padding2D},
///     parallel::ExecutionStrategy,
/// };
///
/// let src = Image::<f32, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let dst = replicate_padding(&src, &Padding2D::uniform(1), ExecutionStrategy::Serial).unwrap();
///
/// assert_eq!(dst.width(), 4);
/// assert_eq!(dst.height(), 4);
/// assert_eq!(
///     dst.as_slice(),
///     &[
///         1.0, 1.0, 2.0, 2.0,
///         1.0, 1.0, 2.0, 2.0,
///         3.0, 3.0, 4.0, 4.0,
///         3.0, 3.0, 4.0, 4.0,
///     ]
/// );
/// ```
pub fn replicate_padding<T, const C: usize>(
    src: &Image<T, C>,
    padding: &Padding2D,
    strategy: ExecutionStrategy,
) -> Result<Image<T, C>, FilterError>
where
    T: Copy + Send + Sync,
{
    let src_data = src.as_slice();
    if src.size().is_empty() || C == 0 {
        return Err(FilterError::EmptyImage(src.width(), src.height()));
    }

    let old_height = src.height();
    let old_stride = src.width() * C;
    let new_stride = (src.width() + padding.left + padding.right) * C;

    let mut dst = Image::from_size_val(padding.padded_size(src.size()), src_data[0])?;

    par_iter_rows_indexed(dst.as_slice_mut(), new_stride, strategy, |y, dst_row| {
        let src_y = replicate_index(y as isize - padding.top as isize, old_height);
        let src_row = &src_data[src_y * old_stride..(src_y + 1) * old_stride];

        let (left, rest) = dst_row.split_at_mut(padding.left * C);
        let (center, right) = rest.split_at_mut(old_stride);
        center.copy_from_slice(src_row);

        let first = &src_row[..C];
        let last = &src_row[old_stride - C..];
        left.chunks_exact_mut(C)
            .for_each(|px| px.copy_from_slice(first));
        right
            .chunks_exact_mut(C)
            .for_each(|px| px.copy_from_slice(last));
    })?;

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ParallelError;

    fn make_src_4x4() -> Result<Image<f32, 1>, FilterError> {
        Ok(Image::from_fn([4, 4].into(), |x, y| (y * 4 + x + 1) as f32)?)
    }

    #[test]
    fn test_replicate_index() {
        assert_eq!(replicate_index(-3, 4), 0);
        assert_eq!(replicate_index(0, 4), 0);
        assert_eq!(replicate_index(3, 4), 3);
        assert_eq!(replicate_index(6, 4), 3);
        assert_eq!(replicate_index(-1, 1), 0);
    }

    #[test]
    fn test_replicate_padding_every_border_cell() -> Result<(), FilterError> {
        let src = make_src_4x4()?;
        let dst = replicate_padding(&src, &Padding2D::uniform(1), ExecutionStrategy::Serial)?;

        #[rustfmt::skip]
        let expected: [f32; 36] = [
             1.0,  1.0,  2.0,  3.0,  4.0,  4.0,
             1.0,  1.0,  2.0,  3.0,  4.0,  4.0,
             5.0,  5.0,  6.0,  7.0,  8.0,  8.0,
             9.0,  9.0, 10.0, 11.0, 12.0, 12.0,
            13.0, 13.0, 14.0, 15.0, 16.0, 16.0,
            13.0, 13.0, 14.0, 15.0, 16.0, 16.0,
        ];

        assert_eq!(dst.size(), ImageSize { width: 6, height: 6 });
        assert_eq!(dst.as_slice(), &expected);

        Ok(())
    }

    #[test]
    fn test_replicate_padding_corners_radius_two() -> Result<(), FilterError> {
        let src = make_src_4x4()?;
        let dst = replicate_padding(&src, &Padding2D::uniform(2), ExecutionStrategy::AutoRows)?;
        assert_eq!(dst.size(), ImageSize { width: 8, height: 8 });

        // each 2x2 corner block repeats the nearest image corner
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(dst.get_pixel(x, y, 0)?, &1.0);
                assert_eq!(dst.get_pixel(x + 6, y, 0)?, &4.0);
                assert_eq!(dst.get_pixel(x, y + 6, 0)?, &13.0);
                assert_eq!(dst.get_pixel(x + 6, y + 6, 0)?, &16.0);
            }
        }

        // edges repeat the nearest row or column
        for i in 0..4 {
            for k in 0..2 {
                let col = *src.get_pixel(i, 0, 0)?;
                assert_eq!(dst.get_pixel(i + 2, k, 0)?, &col);
                let col = *src.get_pixel(i, 3, 0)?;
                assert_eq!(dst.get_pixel(i + 2, k + 6, 0)?, &col);
                let row = *src.get_pixel(0, i, 0)?;
                assert_eq!(dst.get_pixel(k, i + 2, 0)?, &row);
                let row = *src.get_pixel(3, i, 0)?;
                assert_eq!(dst.get_pixel(k + 6, i + 2, 0)?, &row);
            }
        }

        Ok(())
    }

    #[test]
    fn test_replicate_padding_interior_is_source() -> Result<(), FilterError> {
        let src = Image::<f32, 1>::from_fn([5, 3].into(), |x, y| (x * 7 + y * 3) as f32)?;
        let pad = 2;
        let dst = replicate_padding(&src, &Padding2D::uniform(pad), ExecutionStrategy::Fixed(2))?;

        for y in 0..src.height() {
            for x in 0..src.width() {
                assert_eq!(dst.get_pixel(x + pad, y + pad, 0)?, src.get_pixel(x, y, 0)?);
            }
        }

        Ok(())
    }

    #[test]
    fn test_replicate_padding_asymmetric_multichannel() -> Result<(), FilterError> {
        let src = Image::<u8, 3>::new([2, 1].into(), vec![1, 2, 3, 4, 5, 6])?;
        let padding = Padding2D {
            top: 1,
            bottom: 0,
            left: 2,
            right: 1,
        };
        let dst = replicate_padding(&src, &padding, ExecutionStrategy::Serial)?;

        assert_eq!(dst.size(), ImageSize { width: 5, height: 2 });
        let row: [u8; 15] = [1, 2, 3, 1, 2, 3, 1, 2, 3, 4, 5, 6, 4, 5, 6];
        assert_eq!(&dst.as_slice()[..15], &row);
        assert_eq!(&dst.as_slice()[15..], &row);

        Ok(())
    }

    #[test]
    fn test_replicate_padding_larger_than_image() -> Result<(), FilterError> {
        let src = Image::<u8, 1>::new([1, 1].into(), vec![7])?;
        let dst = replicate_padding(
            &src,
            &Padding2D {
                top: 3,
                bottom: 3,
                left: 4,
                right: 4,
            },
            ExecutionStrategy::default(),
        )?;

        assert_eq!(dst.size(), ImageSize { width: 9, height: 7 });
        assert!(dst.as_slice().iter().all(|&v| v == 7));

        Ok(())
    }

    #[test]
    fn test_replicate_padding_empty_image() -> Result<(), FilterError> {
        let src = Image::<f32, 1>::new([0, 3].into(), vec![])?;
        let res = replicate_padding(&src, &Padding2D::uniform(1), ExecutionStrategy::Serial);
        assert_eq!(res, Err(FilterError::EmptyImage(0, 3)));
        Ok(())
    }

    #[test]
    fn test_replicate_padding_strategies_agree() -> Result<(), FilterError> {
        let src = Image::<u8, 2>::from_fn([5, 4].into(), |x, y| (x * 11 + y * 29) as u8)?;
        let padding = Padding2D {
            top: 2,
            bottom: 1,
            left: 1,
            right: 3,
        };

        let expected = replicate_padding(&src, &padding, ExecutionStrategy::Serial)?;
        for strategy in [ExecutionStrategy::AutoRows, ExecutionStrategy::Fixed(3)] {
            assert_eq!(replicate_padding(&src, &padding, strategy)?, expected);
        }

        let res = replicate_padding(&src, &padding, ExecutionStrategy::Fixed(0));
        assert_eq!(
            res,
            Err(FilterError::Parallel(ParallelError::InvalidThreadCount(0)))
        );
        Ok(())
    }
}
