//! Filter operations
//!
//! This module provides the kernel type, the preset catalog, a strict kernel text
//! parser and the convolution engine for grayscale images.

/// Filter kernels and the preset catalog
mod kernels;
pub use kernels::*;

/// Kernel text parsing
mod parse;
pub use parse::*;

/// Kernel selection by name
mod selection;
pub use selection::*;

/// Convolution operations
mod convolution;
pub use convolution::*;
