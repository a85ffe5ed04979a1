//! Camera frame preprocessing.
//!
//! Turns a raw camera buffer into the images the detector consumes: a
//! denoised BGR image, an enhanced grayscale image, a binary mask for
//! contour extraction, and an edge map for the line-based diagnostics.

mod binarize;
mod buffer;
mod edges;
mod filters;

pub use buffer::{FrameBuffer, PixelLayout};

pub(crate) use binarize::to_grayscale;
pub(crate) use edges::sobel_x_abs_u8;

use crate::config::PreprocessingConfig;
use crate::error::VisionError;
use soroban_vision_core::{resize_bilinear_color, ColorImage, ColorImageView, GrayImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Intermediate images handed from preprocessing to detection.
#[derive(Clone, Debug)]
pub struct PreprocessOutput {
    /// Resized and denoised BGR image, prior to grayscale conversion.
    pub color: ColorImage,
    /// Enhanced grayscale image the binary mask and edge map derive from.
    pub gray: GrayImage,
    /// Binary mask, white where the frame structure is.
    pub binary: GrayImage,
    /// Two-threshold edge map of `gray`.
    pub edges: GrayImage,
}

/// Deterministic preprocessing chain in front of the detector.
#[derive(Clone, Debug)]
pub struct ImagePreprocessor {
    config: PreprocessingConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Convert a camera buffer into a packed BGR image.
    pub fn convert_frame(&self, frame: &FrameBuffer<'_>) -> Result<ColorImage, VisionError> {
        frame.to_bgr()
    }

    /// Scale down so the long edge matches `target_long_edge`; images already
    /// within the target are copied unchanged.
    pub fn resize_to_long_edge(&self, img: &ColorImageView<'_>) -> ColorImage {
        let long_edge = img.width.max(img.height);
        let target = self.config.target_long_edge as usize;
        if long_edge <= target || long_edge == 0 {
            return ColorImage {
                width: img.width,
                height: img.height,
                data: img.data.to_vec(),
            };
        }
        let scale = target as f64 / long_edge as f64;
        let out_w = ((img.width as f64 * scale).round() as usize).max(1);
        let out_h = ((img.height as f64 * scale).round() as usize).max(1);
        resize_bilinear_color(img, out_w, out_h)
    }

    pub fn white_balance(&self, img: &ColorImageView<'_>) -> ColorImage {
        filters::white_balance(img)
    }

    pub fn gaussian_blur(&self, img: &ColorImageView<'_>) -> ColorImage {
        filters::gaussian_blur(img, self.config.gaussian_kernel_size)
    }

    pub fn bilateral_filter(&self, img: &ColorImageView<'_>) -> ColorImage {
        filters::bilateral_filter(
            img,
            self.config.bilateral_d,
            self.config.bilateral_sigma_color,
            self.config.bilateral_sigma_space,
        )
    }

    pub fn to_grayscale(&self, img: &ColorImageView<'_>) -> GrayImage {
        binarize::to_grayscale(img)
    }

    pub fn enhance_contrast(&self, gray: &GrayImage) -> GrayImage {
        binarize::clahe(
            &gray.view(),
            self.config.clahe_clip_limit,
            self.config.clahe_tile_grid,
        )
    }

    /// Local-mean binarization followed by the morphological cleanup.
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let thresholded = binarize::adaptive_threshold(
            &gray.view(),
            self.config.adaptive_block_size,
            self.config.adaptive_c,
        );
        binarize::morphology_clean(&thresholded.view(), self.config.morph_kernel_size)
    }

    pub fn detect_edges(&self, gray: &GrayImage) -> GrayImage {
        edges::detect_edges(
            &gray.view(),
            self.config.canny_threshold1,
            self.config.canny_threshold2,
        )
    }

    /// Run the full chain on a camera buffer.
    pub fn preprocess(&self, frame: &FrameBuffer<'_>) -> Result<PreprocessOutput, VisionError> {
        let color = self.convert_frame(frame)?;
        self.preprocess_image(&color.view())
    }

    /// Run the full chain on an already-converted BGR image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn preprocess_image(
        &self,
        img: &ColorImageView<'_>,
    ) -> Result<PreprocessOutput, VisionError> {
        if img.is_empty() {
            return Err(VisionError::invalid_input("input image is empty"));
        }

        let mut color = self.resize_to_long_edge(img);
        if self.config.enable_white_balance {
            color = self.white_balance(&color.view());
        }
        if self.config.enable_gaussian_blur {
            color = self.gaussian_blur(&color.view());
        }
        if self.config.enable_bilateral_filter {
            color = self.bilateral_filter(&color.view());
        }

        let mut gray = self.to_grayscale(&color.view());
        if self.config.enable_clahe {
            gray = self.enhance_contrast(&gray);
        }

        let binary = self.binarize(&gray);
        let edges = self.detect_edges(&gray);

        Ok(PreprocessOutput {
            color,
            gray,
            binary,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PreprocessingConfig {
        PreprocessingConfig::default()
    }

    #[test]
    fn resize_is_a_copy_below_the_target() {
        let pre = ImagePreprocessor::new(config());
        let img = ColorImage::filled(640, 480, [10, 20, 30]);
        assert_eq!(pre.resize_to_long_edge(&img.view()), img);
    }

    #[test]
    fn resize_preserves_aspect_ratio() {
        let pre = ImagePreprocessor::new(config());
        let img = ColorImage::filled(2560, 1440, [10, 20, 30]);
        let out = pre.resize_to_long_edge(&img.view());
        assert_eq!((out.width, out.height), (1280, 720));
    }

    #[test]
    fn empty_input_is_rejected() {
        let pre = ImagePreprocessor::new(config());
        let empty = ColorImage::new(0, 0);
        assert!(matches!(
            pre.preprocess_image(&empty.view()),
            Err(VisionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn full_chain_produces_consistent_dimensions() {
        let pre = ImagePreprocessor::new(config());
        let img = ColorImage::filled(320, 200, [80, 80, 80]);
        let out = pre.preprocess_image(&img.view()).expect("preprocess");
        assert_eq!((out.color.width, out.color.height), (320, 200));
        assert_eq!((out.gray.width, out.gray.height), (320, 200));
        assert_eq!((out.binary.width, out.binary.height), (320, 200));
        assert_eq!((out.edges.width, out.edges.height), (320, 200));
    }

    #[test]
    fn flat_input_binarizes_to_white() {
        let pre = ImagePreprocessor::new(config());
        let img = ColorImage::filled(64, 64, [90, 90, 90]);
        let out = pre.preprocess_image(&img.view()).expect("preprocess");
        assert!(out.binary.data.iter().all(|&v| v == 255));
    }
}
