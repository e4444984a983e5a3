use super::{parse_kernel, Kernel, KernelPreset};
use crate::error::FilterError;

/// Name that selects a user supplied kernel instead of a preset.
pub const CUSTOM_KERNEL_NAME: &str = "custom";

/// List the kernel names a caller can choose from: every preset, then `custom`.
pub fn list_kernels() -> Vec<&'static str> {
    KernelPreset::ALL
        .iter()
        .map(KernelPreset::name)
        .chain(std::iter::once(CUSTOM_KERNEL_NAME))
        .collect()
}

/// A kernel chosen by name, either from the catalog or from caller text.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelSelection {
    /// A catalog kernel.
    Preset(KernelPreset),
    /// A kernel parsed from caller text.
    Custom(Kernel),
}

impl KernelSelection {
    /// Resolve a kernel name and optional kernel text into a selection.
    ///
    /// `custom` requires `custom_text`, which goes through [`parse_kernel`]. Any other
    /// name must be a preset; `custom_text` is ignored in that case.
    ///
    /// # Errors
    ///
    /// * [`FilterError::MissingCustomKernel`] if `custom` is selected without text.
    /// * [`FilterError::UnknownKernel`] if the name is not in the catalog.
    /// * [`FilterError::KernelParse`] if the custom text is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use konv_imgproc::filter::{KernelPreset, KernelSelection};
    ///
    /// let selection = KernelSelection::resolve("sharpen", None).unwrap();
    /// assert_eq!(selection, KernelSelection::Preset(KernelPreset::Sharpen));
    ///
    /// let selection = KernelSelection::resolve("custom", Some("0 0 0\n0 1 0\n0 0 0")).unwrap();
    /// assert_eq!(selection.name(), "custom");
    /// ```
    pub fn resolve(name: &str, custom_text: Option<&str>) -> Result<Self, FilterError> {
        if name.trim().eq_ignore_ascii_case(CUSTOM_KERNEL_NAME) {
            let text = custom_text
                .filter(|text| !text.trim().is_empty())
                .ok_or(FilterError::MissingCustomKernel)?;
            let kernel = parse_kernel(text)?;
            log::debug!(
                "resolved custom {}x{} kernel",
                kernel.rows(),
                kernel.cols()
            );
            return Ok(KernelSelection::Custom(kernel));
        }

        let preset = name.parse::<KernelPreset>()?;
        if custom_text.is_some() {
            log::debug!("ignoring custom kernel text for preset {preset}");
        }
        log::debug!("resolved preset kernel {preset}");
        Ok(KernelSelection::Preset(preset))
    }

    /// The catalog name of the selection.
    pub fn name(&self) -> &'static str {
        match self {
            KernelSelection::Preset(preset) => preset.name(),
            KernelSelection::Custom(_) => CUSTOM_KERNEL_NAME,
        }
    }

    /// The kernel weights of the selection.
    pub fn into_kernel(self) -> Kernel {
        match self {
            KernelSelection::Preset(preset) => preset.kernel(),
            KernelSelection::Custom(kernel) => kernel,
        }
    }
}

impl Default for KernelSelection {
    fn default() -> Self {
        KernelSelection::Preset(KernelPreset::default())
    }
}
