//! End-to-end extraction pipeline.
//!
//! [`SorobanVision`] owns the preprocessing, detection, and tensor-conversion
//! components and runs them in order on each frame: preprocess, find the
//! frame quadrilateral, rectify it, count lanes, split lanes into bead cells,
//! and normalize the cells into one batch tensor. Any stage can fail; the
//! result always reports how far the chain got.

use std::time::Instant;

use log::{debug, warn};
use soroban_vision_core::ColorImageView;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::PreprocessingConfig;
use crate::detector::{DetectionParams, FrameDetectionResult, LaneInfo, SorobanDetector};
use crate::error::VisionError;
use crate::preprocess::{FrameBuffer, ImagePreprocessor};
use crate::tensor::{BatchTensor, TensorConverter};

/// Width of the rectified frame image.
pub const WARP_WIDTH: usize = 800;
/// Height of the rectified frame image.
pub const WARP_HEIGHT: usize = 200;
/// Cells per lane: one upper bead cell plus four lower bead cells.
pub const CELLS_PER_LANE: usize = 5;

/// Everything one frame produces, successful or not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractionResult {
    /// Whether the chain ran all the way to a tensor.
    pub success: bool,
    /// First failure along the chain, if any.
    pub error: Option<VisionError>,
    /// Frame geometry; partial when the chain failed after detection.
    pub frame: FrameDetectionResult,
    /// Per-lane geometry in rectified coordinates, leftmost lane first.
    pub lanes: Vec<LaneInfo>,
    /// Normalized NCHW cell batch, present only on success.
    pub tensor: Option<BatchTensor>,
    /// `lanes.len() * CELLS_PER_LANE` on success, `0` otherwise.
    pub total_cells: i32,
    /// Wall-clock time of the whole call, input conversion included.
    pub elapsed_ms: f64,
}

impl ExtractionResult {
    /// Drops the bulky payloads while keeping the frame geometry.
    /// Safe to call twice.
    pub fn release(&mut self) {
        if let Some(tensor) = &mut self.tensor {
            tensor.release();
        }
        self.tensor = None;
        self.lanes = Vec::new();
        self.total_cells = 0;
    }

    fn failed(error: VisionError, frame: FrameDetectionResult, started: Instant) -> Self {
        Self {
            success: false,
            error: Some(error),
            frame,
            elapsed_ms: started.elapsed().as_secs_f64() * 1e3,
            ..Self::default()
        }
    }
}

/// Camera-to-tensor pipeline with sticky state for the last detected frame.
pub struct SorobanVision {
    preprocessor: ImagePreprocessor,
    detector: SorobanDetector,
    converter: TensorConverter,
    last_frame: Option<FrameDetectionResult>,
}

impl Default for SorobanVision {
    fn default() -> Self {
        Self::new(PreprocessingConfig::default(), DetectionParams::default())
    }
}

impl SorobanVision {
    pub fn new(config: PreprocessingConfig, params: DetectionParams) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(config.clone()),
            detector: SorobanDetector::new(params),
            converter: TensorConverter::new(config),
            last_frame: None,
        }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        self.preprocessor.config()
    }

    pub fn params(&self) -> &DetectionParams {
        self.detector.params()
    }

    /// Replace the preprocessing and normalization configuration.
    pub fn set_config(&mut self, config: PreprocessingConfig) {
        self.preprocessor = ImagePreprocessor::new(config.clone());
        self.converter = TensorConverter::new(config);
    }

    /// Replace the detection parameters.
    pub fn set_detection_params(&mut self, params: DetectionParams) {
        self.detector = SorobanDetector::new(params);
    }

    /// Frame geometry of the most recent frame that passed detection,
    /// lane count included.
    pub fn last_frame(&self) -> Option<&FrameDetectionResult> {
        self.last_frame.as_ref()
    }

    /// Run the pipeline on a raw camera buffer.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame),
            fields(width = frame.width, height = frame.height)
        )
    )]
    pub fn process_frame(&mut self, frame: &FrameBuffer<'_>) -> ExtractionResult {
        let started = Instant::now();
        let color = match self.preprocessor.convert_frame(frame) {
            Ok(color) => color,
            Err(err) => {
                return ExtractionResult::failed(err, FrameDetectionResult::not_detected(), started)
            }
        };
        self.run(&color.view(), started)
    }

    /// Run the pipeline on an already-converted BGR image.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, img),
            fields(width = img.width, height = img.height)
        )
    )]
    pub fn process_image(&mut self, img: &ColorImageView<'_>) -> ExtractionResult {
        self.run(img, Instant::now())
    }

    fn run(&mut self, img: &ColorImageView<'_>, started: Instant) -> ExtractionResult {
        let output = match self.preprocessor.preprocess_image(img) {
            Ok(output) => output,
            Err(err) => {
                return ExtractionResult::failed(err, FrameDetectionResult::not_detected(), started)
            }
        };

        let mut frame = self.detector.detect_frame(&output.binary.view());
        if !frame.detected {
            return ExtractionResult::failed(VisionError::FrameNotDetected, frame, started);
        }

        let warped =
            match self
                .detector
                .warp_frame(&output.color.view(), &frame, WARP_WIDTH, WARP_HEIGHT)
            {
                Ok(warped) => warped,
                Err(err) => return ExtractionResult::failed(err, frame, started),
            };

        let estimate = self.detector.detect_lane_count(&warped.view());
        frame.lane_count = estimate.lane_count;
        frame.lane_count_clamped = estimate.clamped;
        if estimate.clamped {
            warn!(
                "raw lane estimate {} clamped into [{}, {}]",
                estimate.raw_peaks - 1,
                self.detector.params().min_lane_count,
                self.detector.params().max_lane_count
            );
        }
        self.last_frame = Some(frame.clone());

        if frame.lane_count <= 0 {
            return ExtractionResult::failed(
                VisionError::lane_extraction("lane count estimate is zero"),
                frame,
                started,
            );
        }

        let lanes = self.detector.extract_lanes(&warped.view(), frame.lane_count);
        if lanes.is_empty() {
            return ExtractionResult::failed(
                VisionError::lane_extraction("no lanes in the rectified frame"),
                frame,
                started,
            );
        }
        debug!("extracted {} lanes from the rectified frame", lanes.len());

        let mut cells = Vec::with_capacity(lanes.len() * CELLS_PER_LANE);
        for lane in &lanes {
            cells.extend(self.detector.extract_cells(&warped.view(), lane));
        }

        let tensor = match self.converter.convert_batch(&cells) {
            Ok(tensor) => tensor,
            Err(err) => return ExtractionResult::failed(err, frame, started),
        };

        ExtractionResult {
            success: true,
            error: None,
            frame,
            lanes,
            tensor: Some(tensor),
            total_cells: cells.len() as i32,
            elapsed_ms: started.elapsed().as_secs_f64() * 1e3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_vision_core::ColorImage;

    #[test]
    fn featureless_image_reports_frame_not_detected() {
        let mut vision = SorobanVision::default();
        let img = ColorImage::filled(320, 240, [128, 128, 128]);
        let result = vision.process_image(&img.view());
        assert!(!result.success);
        assert_eq!(result.error, Some(VisionError::FrameNotDetected));
        assert!(!result.frame.detected);
        assert!(result.tensor.is_none());
        assert!(vision.last_frame().is_none());
    }

    #[test]
    fn empty_image_reports_invalid_input() {
        let mut vision = SorobanVision::default();
        let img = ColorImage::new(0, 0);
        let result = vision.process_image(&img.view());
        assert!(!result.success);
        assert_eq!(result.error.map(|e| e.code()), Some(1));
    }

    #[test]
    fn release_drops_payloads_and_keeps_frame() {
        let mut result = ExtractionResult {
            success: true,
            total_cells: 10,
            ..ExtractionResult::default()
        };
        result.release();
        assert_eq!(result.total_cells, 0);
        assert!(result.lanes.is_empty());
        result.release();
        assert!(result.tensor.is_none());
    }

    #[test]
    fn set_config_swaps_the_preprocessing_chain() {
        let mut vision = SorobanVision::default();
        let config = PreprocessingConfig {
            target_long_edge: 640,
            ..PreprocessingConfig::default()
        };
        vision.set_config(config.clone());
        assert_eq!(vision.config(), &config);
    }
}
