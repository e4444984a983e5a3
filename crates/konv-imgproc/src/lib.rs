#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the image processing module.
pub mod error;

/// image filtering module.
pub mod filter;

/// module containing parallization utilities.
pub mod parallel;

/// border extension of images.
pub mod padding;

pub use crate::error::FilterError;
