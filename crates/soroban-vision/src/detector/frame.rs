//! Frame localization on the binary mask and perspective rectification.

use super::contours::{
    approx_polygon_closed, bounding_rect, closed_perimeter, is_convex, shoelace_area,
    trace_external_contours,
};
use super::params::DetectionParams;
use super::result::FrameDetectionResult;
use crate::error::VisionError;
use nalgebra::Point2;
use soroban_vision_core::{
    homography_from_4pt, warp_perspective_color, ColorImage, ColorImageView, GrayImageView, Point,
    Quadrilateral,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fallback corners for empty quadrants during ordering.
const DEFAULT_CORNERS: [Point; 4] = [
    Point { x: 0.0, y: 0.0 },
    Point { x: 100.0, y: 0.0 },
    Point { x: 100.0, y: 100.0 },
    Point { x: 0.0, y: 100.0 },
];

/// Assign corners to quadrants around their centroid, first hit wins.
///
/// Quadrants without a point fall back to a default corner, so the result is
/// always a full quadrilateral.
pub fn order_corners(points: &[Point]) -> Quadrilateral {
    let mut corners = DEFAULT_CORNERS;
    if points.is_empty() {
        return Quadrilateral::new(corners[0], corners[1], corners[2], corners[3]);
    }

    let mut cx = 0.0f32;
    let mut cy = 0.0f32;
    for p in points {
        cx += p.x;
        cy += p.y;
    }
    cx /= points.len() as f32;
    cy /= points.len() as f32;

    let mut seen = [false; 4];
    for p in points {
        let quadrant = if p.x < cx && p.y < cy {
            0
        } else if p.x >= cx && p.y < cy {
            1
        } else if p.x >= cx && p.y >= cy {
            2
        } else {
            3
        };
        if !seen[quadrant] {
            seen[quadrant] = true;
            corners[quadrant] = *p;
        }
    }
    Quadrilateral::new(corners[0], corners[1], corners[2], corners[3])
}

pub(crate) fn frame_confidence(area_ratio: f64, aspect_in_bounds: bool) -> f32 {
    if aspect_in_bounds {
        (area_ratio * 5.0).min(1.0) as f32
    } else {
        (area_ratio * 0.5) as f32
    }
}

/// Locates the soroban frame and rectifies it.
#[derive(Clone, Debug)]
pub struct SorobanDetector {
    params: DetectionParams,
}

impl SorobanDetector {
    pub fn new(params: DetectionParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Find the frame quadrilateral in a binary mask.
    ///
    /// Candidates are white components whose outer contour simplifies to a
    /// convex quadrilateral with plausible area and aspect; the largest one
    /// wins. `lane_count` stays 0 here.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, binary), fields(width = binary.width, height = binary.height))
    )]
    pub fn detect_frame(&self, binary: &GrayImageView<'_>) -> FrameDetectionResult {
        if binary.width == 0 || binary.height == 0 {
            return FrameDetectionResult::not_detected();
        }
        let image_area = (binary.width * binary.height) as f64;

        let mut best: Option<(f64, Vec<Point>)> = None;
        for contour in trace_external_contours(binary) {
            let area = shoelace_area(&contour);
            let ratio = area / image_area;
            if ratio < self.params.min_frame_area_ratio || ratio > self.params.max_frame_area_ratio
            {
                continue;
            }

            let epsilon = self.params.contour_approx_epsilon * closed_perimeter(&contour);
            let approx = approx_polygon_closed(&contour, epsilon);
            if approx.len() != 4 || !is_convex(&approx) {
                continue;
            }

            let aspect = bounding_rect(&approx).aspect_ratio();
            if aspect < self.params.min_aspect_ratio || aspect > self.params.max_aspect_ratio {
                continue;
            }

            if best.as_ref().is_none_or(|(a, _)| area > *a) {
                best = Some((area, approx));
            }
        }

        let Some((area, quad)) = best else {
            return FrameDetectionResult::not_detected();
        };

        let bounding_box = bounding_rect(&quad);
        let aspect = bounding_box.aspect_ratio();
        let aspect_in_bounds =
            aspect >= self.params.min_aspect_ratio && aspect <= self.params.max_aspect_ratio;

        FrameDetectionResult {
            detected: true,
            corners: order_corners(&quad),
            bounding_box,
            confidence: frame_confidence(area / image_area, aspect_in_bounds),
            lane_count: 0,
            lane_count_clamped: false,
        }
    }

    /// Rectify the detected frame onto an `out_w` x `out_h` canvas.
    pub fn warp_frame(
        &self,
        src: &ColorImageView<'_>,
        frame: &FrameDetectionResult,
        out_w: usize,
        out_h: usize,
    ) -> Result<ColorImage, VisionError> {
        if src.is_empty() {
            return Err(VisionError::invalid_input("source image is empty"));
        }
        if out_w == 0 || out_h == 0 {
            return Err(VisionError::invalid_input("warp output size is zero"));
        }
        if !frame.detected {
            return Err(VisionError::FrameNotDetected);
        }

        let rect = [
            Point2::new(0.0f32, 0.0),
            Point2::new(out_w as f32, 0.0),
            Point2::new(out_w as f32, out_h as f32),
            Point2::new(0.0f32, out_h as f32),
        ];
        let img = frame.corners.corners().map(|p| p.to_na());

        let Some(h) = homography_from_4pt(&rect, &img) else {
            return Err(VisionError::FrameNotDetected);
        };
        Ok(warp_perspective_color(src, h, out_w, out_h))
    }
}
