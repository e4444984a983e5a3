//! Grayscale kernel convolution with edge-replicate borders.
//!
//! ```
//! use konv::image::Image;
//! use konv::imgproc::filter::{convolve, KernelSelection};
//!
//! let src = Image::<f32, 1>::from_size_val([4, 4].into(), 100.0).unwrap();
//! let kernel = KernelSelection::resolve("blur", None).unwrap().into_kernel();
//! let dst = convolve(&src, &kernel).unwrap();
//!
//! assert_eq!(dst.size(), src.size());
//! ```

#[doc(inline)]
pub use konv_image as image;

#[doc(inline)]
pub use konv_imgproc as imgproc;
