//! Soroban frame detection.
//!
//! This module wires together contour tracing on the binarized frame image,
//! quadrilateral selection and corner ordering, perspective rectification,
//! and lane/cell extraction from the rectified frame.

mod boundaries;
mod contours;
mod frame;
mod lanes;
mod params;
mod result;

pub use boundaries::{lane_boundaries_from_lines, lane_boundaries_from_projection};
pub use frame::{order_corners, SorobanDetector};
pub use params::DetectionParams;
pub use result::{FrameDetectionResult, LaneCountEstimate, LaneInfo};
