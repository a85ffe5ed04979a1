use serde::{Deserialize, Serialize};

/// Configuration for the preprocessing chain and tensor normalization.
///
/// All fields have working defaults tuned for handheld soroban photos;
/// deserialization fills missing fields from [`Default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Images whose long edge exceeds this are scaled down to it.
    pub target_long_edge: u32,
    /// Gray-world white balance on the color image.
    pub enable_white_balance: bool,
    /// Contrast-limited adaptive histogram equalization on the gray image.
    pub enable_clahe: bool,
    /// CLAHE clip limit relative to the uniform histogram level.
    pub clahe_clip_limit: f64,
    /// CLAHE tile count per axis.
    pub clahe_tile_grid: u32,
    pub enable_gaussian_blur: bool,
    /// Gaussian kernel side length, forced odd.
    pub gaussian_kernel_size: u32,
    /// Edge-preserving bilateral filter; expensive, off by default.
    pub enable_bilateral_filter: bool,
    /// Bilateral filter window diameter.
    pub bilateral_d: u32,
    pub bilateral_sigma_color: f64,
    pub bilateral_sigma_space: f64,
    /// Lower hysteresis threshold for the edge map.
    pub canny_threshold1: f64,
    /// Upper hysteresis threshold for the edge map.
    pub canny_threshold2: f64,
    /// Adaptive threshold neighborhood side length, forced odd.
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean before thresholding.
    pub adaptive_c: f64,
    /// Square kernel side length for the close/open cleanup.
    pub morph_kernel_size: u32,
    /// Per-channel RGB mean for tensor normalization.
    pub mean_rgb: [f32; 3],
    /// Per-channel RGB standard deviation for tensor normalization.
    pub std_rgb: [f32; 3],
    /// Side length of the square tensor fed to the bead classifier.
    pub cell_output_size: usize,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_long_edge: 1280,
            enable_white_balance: true,
            enable_clahe: true,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: 8,
            enable_gaussian_blur: true,
            gaussian_kernel_size: 3,
            enable_bilateral_filter: false,
            bilateral_d: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            canny_threshold1: 50.0,
            canny_threshold2: 150.0,
            adaptive_block_size: 11,
            adaptive_c: 2.0,
            morph_kernel_size: 3,
            mean_rgb: [0.485, 0.456, 0.406],
            std_rgb: [0.229, 0.224, 0.225],
            cell_output_size: 224,
        }
    }
}
