use std::str::FromStr;

use crate::error::FilterError;

/// A 2D grid of filter weights stored in row-major order.
///
/// A kernel is not required to be square or odd-sized when it is built; the
/// convolution validates its shape before using it. The weights are never
/// normalized by the engine, so any scaling must be part of the values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")
)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from its dimensions and row-major weights.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelShape`] if `data` does not hold
    /// `rows * cols` weights.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, FilterError> {
        if data.len() != rows * cols {
            return Err(FilterError::InvalidKernelShape(format!(
                "expected {} weights for a {rows}x{cols} kernel, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a kernel from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelShape`] if the rows differ in length.
    ///
    /// # Example
    ///
    /// ```
    /// use konv_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::from_rows(&[[1.0, 0.0, -1.0]; 3]).unwrap();
    /// assert_eq!(kernel.rows(), 3);
    /// assert_eq!(kernel.cols(), 3);
    ///
    /// assert!(Kernel::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    /// ```
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, FilterError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(FilterError::InvalidKernelShape(format!(
                    "row {i} has {} weights, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Create a `size x size` kernel that is zero everywhere except a `1` at the center.
    pub fn identity(size: usize) -> Self {
        let mut data = vec![0.0; size * size];
        if size > 0 {
            data[(size / 2) * size + size / 2] = 1.0;
        }
        Self {
            rows: size,
            cols: size,
            data,
        }
    }

    /// Number of kernel rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of kernel columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the kernel has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The padding radius `cols / 2` needed around an image for this kernel.
    pub fn radius(&self) -> usize {
        self.cols / 2
    }

    /// The weights in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get the weight at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Copy the weights out as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks_exact(self.cols).map(<[f32]>::to_vec).collect()
    }
}

impl<const K: usize> From<[[f32; K]; K]> for Kernel {
    fn from(weights: [[f32; K]; K]) -> Self {
        Self {
            rows: K,
            cols: K,
            data: weights.iter().flatten().copied().collect(),
        }
    }
}

impl TryFrom<Vec<Vec<f32>>> for Kernel {
    type Error = FilterError;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self, Self::Error> {
        Kernel::from_rows(&rows)
    }
}

impl From<Kernel> for Vec<Vec<f32>> {
    fn from(kernel: Kernel) -> Self {
        kernel.to_rows()
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, row) in self.to_rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let row = row.iter().map(|w| w.to_string()).collect::<Vec<_>>();
            write!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}

const NINTH: f32 = 1.0 / 9.0;

/// The named kernels of the preset catalog.
///
/// The catalog is fixed at compile time; every preset is a `3x3` kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum KernelPreset {
    /// Mean of the 3x3 neighborhood.
    #[default]
    Blur,
    /// Center-weighted sharpening, weights sum to one.
    Sharpen,
    /// 8-connectivity Laplacian-like edge detector, weights sum to zero.
    Edge,
    /// Diagonal relief filter.
    Emboss,
}

impl KernelPreset {
    /// Every preset, in catalog order.
    pub const ALL: [KernelPreset; 4] = [
        KernelPreset::Blur,
        KernelPreset::Sharpen,
        KernelPreset::Edge,
        KernelPreset::Emboss,
    ];

    /// The catalog name of the preset.
    pub fn name(&self) -> &'static str {
        match self {
            KernelPreset::Blur => "blur",
            KernelPreset::Sharpen => "sharpen",
            KernelPreset::Edge => "edge",
            KernelPreset::Emboss => "emboss",
        }
    }

    /// A one-line, human readable description of the effect.
    pub fn description(&self) -> &'static str {
        match self {
            KernelPreset::Blur => "Smooths the image by averaging neighboring pixels.",
            KernelPreset::Sharpen => "Enhances edges and details.",
            KernelPreset::Edge => "Detects edges in the image.",
            KernelPreset::Emboss => "Creates a 3D embossed effect.",
        }
    }

    /// The preset weights.
    pub fn weights(&self) -> [[f32; 3]; 3] {
        match self {
            KernelPreset::Blur => [[NINTH; 3]; 3],
            KernelPreset::Sharpen => [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]],
            KernelPreset::Edge => [
                [-1.0, -1.0, -1.0],
                [-1.0, 8.0, -1.0],
                [-1.0, -1.0, -1.0],
            ],
            KernelPreset::Emboss => [[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]],
        }
    }

    /// Build the preset as a [`Kernel`].
    pub fn kernel(&self) -> Kernel {
        Kernel::from(self.weights())
    }
}

impl std::fmt::Display for KernelPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KernelPreset {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        KernelPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| FilterError::UnknownKernel(name.to_string()))
    }
}
