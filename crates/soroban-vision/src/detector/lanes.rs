//! Lane counting and bead-cell extraction on the rectified frame.

use super::result::{LaneCountEstimate, LaneInfo};
use super::SorobanDetector;
use crate::preprocess::{sobel_x_abs_u8, to_grayscale};
use soroban_vision_core::{ColorImage, ColorImageView, Rect};

impl SorobanDetector {
    /// Estimate the lane count of a rectified frame from vertical gradients.
    ///
    /// Rods and frame edges produce peaks in the column projection of the
    /// horizontal Sobel response; a soroban with n lanes shows n + 1 of
    /// them. The raw estimate is clamped to the configured bounds and the
    /// clamp is reported, not hidden.
    pub fn detect_lane_count(&self, warped: &ColorImageView<'_>) -> LaneCountEstimate {
        let gray = to_grayscale(warped);
        let sobel = sobel_x_abs_u8(&gray.view());

        let cols = sobel.width;
        let mut projection = vec![0u64; cols];
        for y in 0..sobel.height {
            for x in 0..cols {
                projection[x] += sobel.data[y * cols + x] as u64;
            }
        }

        let max = projection.iter().copied().max().unwrap_or(0);
        let threshold = max as f64 / 3.0;
        let window = cols / 50;

        let mut peaks = 0i32;
        for i in window..cols.saturating_sub(window) {
            let v = projection[i];
            if (v as f64) <= threshold {
                continue;
            }
            let lo = i - window;
            let hi = (i + window).min(cols - 1);
            let is_peak = (lo..=hi).all(|j| j == i || projection[j] < v);
            if is_peak {
                peaks += 1;
            }
        }

        let raw = peaks - 1;
        let lane_count = raw.clamp(self.params().min_lane_count, self.params().max_lane_count);
        LaneCountEstimate {
            lane_count,
            raw_peaks: peaks,
            clamped: lane_count != raw,
        }
    }

    /// Split the rectified frame into `lane_count` equal-width strips.
    ///
    /// The rightmost strip is digit 0; `value` and `confidence` stay 0 for
    /// a downstream classifier.
    pub fn extract_lanes(&self, warped: &ColorImageView<'_>, lane_count: i32) -> Vec<LaneInfo> {
        if lane_count <= 0 || warped.is_empty() {
            return Vec::new();
        }
        let lane_width = warped.width / lane_count as usize;
        if lane_width == 0 {
            return Vec::new();
        }

        (0..lane_count)
            .map(|i| LaneInfo {
                bounding_box: Rect::new(
                    (i as usize * lane_width) as f32,
                    0.0,
                    lane_width as f32,
                    warped.height as f32,
                ),
                digit_index: lane_count - 1 - i,
                value: 0,
                confidence: 0.0,
            })
            .collect()
    }

    /// Cut one lane into its five bead cells.
    ///
    /// The lane splits vertically by the configured upper : divider : lower
    /// ratios; the divider band is discarded and the lower band yields four
    /// equal cells. Degenerate bands come back as empty images.
    pub fn extract_cells(&self, warped: &ColorImageView<'_>, lane: &LaneInfo) -> Vec<ColorImage> {
        let total = (self.params().upper_bead_ratio
            + self.params().divider_ratio
            + self.params().lower_bead_ratio) as usize;
        if total == 0 || warped.is_empty() {
            return Vec::new();
        }

        let bb = lane.bounding_box;
        let crop = warped.crop(
            bb.x.max(0.0) as usize,
            bb.y.max(0.0) as usize,
            bb.width.max(0.0) as usize,
            bb.height.max(0.0) as usize,
        );
        let rows = crop.height;
        let cols = crop.width;
        let view = crop.view();

        let upper_h = rows * self.params().upper_bead_ratio as usize / total;
        let divider_h = rows * self.params().divider_ratio as usize / total;
        let lower_h = rows * self.params().lower_bead_ratio as usize / total;

        let mut cells = Vec::with_capacity(5);
        cells.push(view.crop(0, 0, cols, upper_h));

        let lower_start = upper_h + divider_h;
        let single = lower_h / 4;
        for i in 0..4 {
            cells.push(view.crop(0, lower_start + i * single, cols, single));
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectionParams;

    /// Bands of alternating brightness separated by single-column dips; the
    /// asymmetric levels keep one strict Sobel maximum per separator.
    fn banded_frame(width: usize, height: usize, separators: &[usize]) -> ColorImage {
        let mut img = ColorImage::new(width, height);
        let mut band = 0usize;
        let mut next_sep = 0usize;
        for x in 0..width {
            let value = if next_sep < separators.len() && x == separators[next_sep] {
                next_sep += 1;
                band += 1;
                190
            } else if band % 2 == 0 {
                230
            } else {
                210
            };
            for y in 0..height {
                img.set_pixel(x, y, [value, value, value]);
            }
        }
        img
    }

    #[test]
    fn lane_count_is_peaks_minus_one() {
        let separators = [50, 100, 150, 200, 250, 300, 350];
        let img = banded_frame(400, 40, &separators);
        let detector = SorobanDetector::new(DetectionParams::default());
        let estimate = detector.detect_lane_count(&img.view());
        assert_eq!(estimate.raw_peaks, 7);
        assert_eq!(estimate.lane_count, 6);
        assert!(!estimate.clamped);
    }

    #[test]
    fn lane_count_clamps_and_reports_it() {
        let separators = [50, 100, 150, 200, 250, 300, 350];
        let img = banded_frame(400, 40, &separators);
        let params = DetectionParams {
            max_lane_count: 3,
            ..DetectionParams::default()
        };
        let detector = SorobanDetector::new(params);
        let estimate = detector.detect_lane_count(&img.view());
        assert_eq!(estimate.lane_count, 3);
        assert!(estimate.clamped);

        let flat = ColorImage::filled(400, 40, [128, 128, 128]);
        let detector = SorobanDetector::new(DetectionParams::default());
        let estimate = detector.detect_lane_count(&flat.view());
        assert_eq!(estimate.raw_peaks, 0);
        assert_eq!(estimate.lane_count, 1);
        assert!(estimate.clamped);
    }

    #[test]
    fn lanes_are_equal_strips_with_descending_digits() {
        let img = ColorImage::filled(100, 40, [128, 128, 128]);
        let detector = SorobanDetector::new(DetectionParams::default());
        let lanes = detector.extract_lanes(&img.view(), 5);

        assert_eq!(lanes.len(), 5);
        for (i, lane) in lanes.iter().enumerate() {
            assert_eq!(lane.bounding_box.x, (i * 20) as f32);
            assert_eq!(lane.bounding_box.width, 20.0);
            assert_eq!(lane.bounding_box.height, 40.0);
            assert_eq!(lane.digit_index, 4 - i as i32);
            assert_eq!(lane.value, 0);
        }
        assert_eq!(lanes.last().map(|l| l.digit_index), Some(0));
    }

    #[test]
    fn no_lanes_for_degenerate_inputs() {
        let detector = SorobanDetector::new(DetectionParams::default());
        let img = ColorImage::filled(10, 10, [0, 0, 0]);
        assert!(detector.extract_lanes(&img.view(), 0).is_empty());
        assert!(detector.extract_lanes(&img.view(), -2).is_empty());
        assert!(detector.extract_lanes(&img.view(), 20).is_empty());
    }

    #[test]
    fn cells_follow_the_one_one_four_split() {
        let img = ColorImage::filled(80, 200, [100, 100, 100]);
        let detector = SorobanDetector::new(DetectionParams::default());
        let lanes = detector.extract_lanes(&img.view(), 2);
        let cells = detector.extract_cells(&img.view(), &lanes[0]);

        assert_eq!(cells.len(), 5);
        // 200 rows split 1:1:4 -> upper 33, divider 33, lower 133.
        assert_eq!((cells[0].width, cells[0].height), (40, 33));
        for cell in &cells[1..] {
            assert_eq!((cell.width, cell.height), (40, 33));
        }
    }

    #[test]
    fn cells_come_from_their_own_lane() {
        let mut img = ColorImage::filled(80, 120, [10, 10, 10]);
        for y in 0..120 {
            for x in 40..80 {
                img.set_pixel(x, y, [0, 200, 0]);
            }
        }
        let detector = SorobanDetector::new(DetectionParams::default());
        let lanes = detector.extract_lanes(&img.view(), 2);

        let right_cells = detector.extract_cells(&img.view(), &lanes[1]);
        for cell in &right_cells {
            assert!(cell.data.chunks_exact(3).all(|px| px == [0, 200, 0]));
        }
        let left_cells = detector.extract_cells(&img.view(), &lanes[0]);
        for cell in &left_cells {
            assert!(cell.data.chunks_exact(3).all(|px| px == [10, 10, 10]));
        }
    }
}
