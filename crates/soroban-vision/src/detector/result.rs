use serde::{Deserialize, Serialize};
use soroban_vision_core::{Quadrilateral, Rect};

/// Outcome of frame localization on one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDetectionResult {
    pub detected: bool,
    /// Frame corners ordered top-left, top-right, bottom-right, bottom-left.
    pub corners: Quadrilateral,
    /// Axis-aligned pixel extent of the frame.
    pub bounding_box: Rect,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Number of digit lanes; `0` until lane estimation ran.
    pub lane_count: i32,
    /// True when the raw lane estimate fell outside the configured bounds
    /// and was clamped. Treat the frame as low confidence.
    pub lane_count_clamped: bool,
}

impl FrameDetectionResult {
    pub fn not_detected() -> Self {
        Self::default()
    }
}

/// One vertical digit strip of the rectified frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneInfo {
    /// Strip extent in rectified-frame coordinates.
    pub bounding_box: Rect,
    /// Decimal position, rightmost lane is digit 0.
    pub digit_index: i32,
    /// Classified digit value; left 0 here, filled by an external classifier.
    pub value: i32,
    /// Classification confidence; left 0 here.
    pub confidence: f32,
}

/// Lane count estimate with the pre-clamp evidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneCountEstimate {
    /// Estimate after clamping to the configured bounds.
    pub lane_count: i32,
    /// Number of vertical-gradient peaks the estimate derives from
    /// (`lane_count` is peaks minus one before clamping).
    pub raw_peaks: i32,
    /// True when clamping changed the estimate.
    pub clamped: bool,
}
