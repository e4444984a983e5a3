#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for the convolution engine.
pub mod image;

/// Error types for the image module.
pub mod error;

/// conversions at the 8-bit boundary.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
