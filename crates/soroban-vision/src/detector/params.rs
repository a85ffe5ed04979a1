use serde::{Deserialize, Serialize};

/// Configuration for frame detection and lane segmentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Smallest accepted frame area as a fraction of the image area.
    pub min_frame_area_ratio: f64,
    /// Largest accepted frame area as a fraction of the image area.
    pub max_frame_area_ratio: f64,
    /// Width over height bounds for the frame bounding box. A soroban frame
    /// is always wider than tall.
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Lane count bounds; estimates outside are clamped and flagged.
    pub min_lane_count: i32,
    pub max_lane_count: i32,
    /// Accumulator resolution in pixels for the line-based diagnostics.
    pub hough_rho: f64,
    /// Accumulator resolution in radians.
    pub hough_theta: f64,
    /// Minimum accumulator votes for a candidate line.
    pub hough_threshold: u32,
    /// Minimum segment length in pixels.
    pub hough_min_length: f64,
    /// Largest gap in pixels bridged within one segment.
    pub hough_max_gap: f64,
    /// Polygon simplification tolerance as a fraction of the perimeter.
    pub contour_approx_epsilon: f64,
    /// Vertical split of a lane, top to bottom: heaven beads, reckoning-bar
    /// band (discarded), earth beads.
    pub upper_bead_ratio: u32,
    pub divider_ratio: u32,
    pub lower_bead_ratio: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_frame_area_ratio: 0.05,
            max_frame_area_ratio: 0.95,
            min_aspect_ratio: 1.5,
            max_aspect_ratio: 10.0,
            min_lane_count: 1,
            max_lane_count: 27,
            hough_rho: 1.0,
            hough_theta: std::f64::consts::PI / 180.0,
            hough_threshold: 80,
            hough_min_length: 50.0,
            hough_max_gap: 10.0,
            contour_approx_epsilon: 0.02,
            upper_bead_ratio: 1,
            divider_ratio: 1,
            lower_bead_ratio: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let params: DetectionParams =
            serde_json::from_str(r#"{"max_lane_count": 13}"#).expect("parse");
        assert_eq!(params.max_lane_count, 13);
        assert_eq!(params.min_lane_count, 1);
        assert_eq!(params.upper_bead_ratio, 1);
        assert_eq!(params.lower_bead_ratio, 4);
    }
}
