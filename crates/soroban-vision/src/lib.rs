//! Soroban (abacus) frame detection and bead-cell tensor extraction.
//!
//! The pipeline takes one camera frame and produces classifier-ready input:
//! - preprocessing: resize, white balance, smoothing, CLAHE, adaptive
//!   binarization, and an edge map,
//! - detection: the frame quadrilateral, perspective rectification, lane
//!   counting, and per-lane bead-cell crops,
//! - conversion: normalized NCHW float tensors, one cell per batch entry.
//!
//! [`SorobanVision`] wires the stages together; the pieces are public for
//! callers that want to run or tune a single stage.

mod config;
pub mod detector;
mod error;
#[cfg(feature = "image")]
mod image_io;
mod io;
mod overlay;
mod pipeline;
pub mod preprocess;
mod tensor;

pub use config::PreprocessingConfig;
pub use detector::{
    DetectionParams, FrameDetectionResult, LaneCountEstimate, LaneInfo, SorobanDetector,
};
pub use error::VisionError;
#[cfg(feature = "image")]
pub use image_io::{color_image_from_dynamic, load_color_image, save_color_image};
pub use io::{load_json, save_json_pretty, VisionIoError};
pub use overlay::draw_debug_overlay;
pub use pipeline::{
    ExtractionResult, SorobanVision, CELLS_PER_LANE, WARP_HEIGHT, WARP_WIDTH,
};
pub use preprocess::{FrameBuffer, ImagePreprocessor, PixelLayout, PreprocessOutput};
pub use tensor::{BatchTensor, CellTensor, TensorConverter};

pub use soroban_vision_core as core;
