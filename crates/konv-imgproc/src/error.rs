use konv_image::ImageError;

use crate::filter::KernelParseError;
use crate::parallel::ParallelError;

/// An error type for the filtering operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel is empty, not square, has ragged rows or an even side.
    #[error("Invalid kernel shape: {0}")]
    InvalidKernelShape(String),

    /// The image has zero rows or columns.
    #[error("Image must not be empty, got width {0} and height {1}")]
    EmptyImage(usize, usize),

    /// The requested preset name is not in the kernel catalog.
    #[error("Unknown kernel name: {0}")]
    UnknownKernel(String),

    /// The `custom` kernel was selected without any kernel text.
    #[error("A custom kernel was selected but no kernel was provided")]
    MissingCustomKernel,

    /// The kernel text could not be parsed.
    #[error(transparent)]
    KernelParse(#[from] KernelParseError),

    /// The execution strategy could not be applied.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// An image could not be created.
    #[error(transparent)]
    Image(#[from] ImageError),
}
