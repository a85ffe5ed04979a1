//! Diagnostic lane-boundary strategies.
//!
//! Neither runs on the primary path; both exist to cross-check the gradient
//! projection estimate on troublesome frames. They share one contract: given
//! an image, return sorted deduplicated x positions, with candidates closer
//! than [`MERGE_DISTANCE`] pixels merged into the first one.

use super::params::DetectionParams;
use soroban_vision_core::GrayImageView;

/// Candidates closer than this collapse into one boundary.
const MERGE_DISTANCE: i32 = 10;

/// Smoothing half-width for the intensity projection.
const SMOOTH_RADIUS: usize = 5;

fn merge_close(mut xs: Vec<i32>) -> Vec<i32> {
    xs.sort_unstable();
    let mut out: Vec<i32> = Vec::with_capacity(xs.len());
    for x in xs {
        match out.last() {
            Some(&last) if (x - last).abs() < MERGE_DISTANCE => {}
            _ => out.push(x),
        }
    }
    out
}

/// Lane boundaries as minima of the smoothed column-intensity projection.
///
/// Rod columns are darker than bead columns, so boundaries show up as local
/// minima after an 11-column box filter; the unsmoothed edge columns stay
/// zero and never qualify.
pub fn lane_boundaries_from_projection(gray: &GrayImageView<'_>) -> Vec<i32> {
    let cols = gray.width;
    if cols == 0 || gray.height == 0 {
        return Vec::new();
    }

    let mut projection = vec![0i64; cols];
    for y in 0..gray.height {
        for x in 0..cols {
            projection[x] += gray.data[y * cols + x] as i64;
        }
    }

    let mut smoothed = vec![0i64; cols];
    let span = (2 * SMOOTH_RADIUS + 1) as i64;
    for i in SMOOTH_RADIUS..cols.saturating_sub(SMOOTH_RADIUS) {
        let sum: i64 = projection[i - SMOOTH_RADIUS..=i + SMOOTH_RADIUS].iter().sum();
        smoothed[i] = sum / span;
    }

    let mut minima = Vec::new();
    for i in 1..cols.saturating_sub(1) {
        if smoothed[i] < smoothed[i - 1] && smoothed[i] < smoothed[i + 1] {
            minima.push(i as i32);
        }
    }
    merge_close(minima)
}

struct Segment {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl Segment {
    fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }

    fn angle_from_horizontal_deg(&self) -> f64 {
        (self.y2 - self.y1).abs().atan2((self.x2 - self.x1).abs()).to_degrees()
    }

    fn midpoint_x(&self) -> i32 {
        ((self.x1 + self.x2) / 2.0).round() as i32
    }
}

/// Walk along the line `(theta, rho)` over the edge map, linking edge pixels
/// into segments; gaps wider than `max_gap` split, segments shorter than
/// `min_length` drop.
fn collect_segments(
    edges: &GrayImageView<'_>,
    theta: f64,
    rho: f64,
    max_gap: f64,
    min_length: f64,
    out: &mut Vec<Segment>,
) {
    let (w, h) = (edges.width as i32, edges.height as i32);
    let (sin, cos) = theta.sin_cos();

    // Step along the dominant direction of the line, which runs along
    // (-sin, cos).
    let vertical_walk = cos.abs() >= sin.abs();
    let steps = if vertical_walk { h } else { w };

    let mut run: Option<(f64, f64, f64, f64)> = None;
    let mut flush = |run: &mut Option<(f64, f64, f64, f64)>| {
        if let Some((x1, y1, x2, y2)) = run.take() {
            let seg = Segment { x1, y1, x2, y2 };
            if seg.length() >= min_length {
                out.push(seg);
            }
        }
    };

    for s in 0..steps {
        let (x, y) = if vertical_walk {
            let y = s as f64;
            ((rho - y * sin) / cos, y)
        } else {
            let x = s as f64;
            (x, (rho - x * cos) / sin)
        };

        let xi = x.round() as i32;
        let yi = y.round() as i32;
        let on_edge = xi >= 0
            && yi >= 0
            && xi < w
            && yi < h
            && edges.data[yi as usize * edges.width + xi as usize] > 0;

        if on_edge {
            match run {
                Some((_, _, lx, ly)) if (x - lx).hypot(y - ly) > max_gap => {
                    flush(&mut run);
                    run = Some((x, y, x, y));
                }
                Some((sx, sy, _, _)) => run = Some((sx, sy, x, y)),
                None => run = Some((x, y, x, y)),
            }
        }
    }
    flush(&mut run);
}

/// Lane boundaries from near-vertical line segments in an edge map.
///
/// A plain rho/theta accumulator votes over all edge pixels; bins over the
/// threshold that are 3x3 local maxima become candidate lines, segments are
/// collected along them, and segments steeper than 80 degrees contribute
/// their midpoint x.
pub fn lane_boundaries_from_lines(
    edges: &GrayImageView<'_>,
    params: &DetectionParams,
) -> Vec<i32> {
    let (w, h) = (edges.width, edges.height);
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let theta_step = params.hough_theta.max(1e-6);
    let rho_step = params.hough_rho.max(1e-6);
    let n_theta = (std::f64::consts::PI / theta_step).round() as usize;
    let diag = ((w * w + h * h) as f64).sqrt();
    let n_rho = (2.0 * diag / rho_step).ceil() as usize + 1;

    let mut acc = vec![0u32; n_theta * n_rho];
    for y in 0..h {
        for x in 0..w {
            if edges.data[y * w + x] == 0 {
                continue;
            }
            for t in 0..n_theta {
                let theta = t as f64 * theta_step;
                let rho = x as f64 * theta.cos() + y as f64 * theta.sin();
                let bin = ((rho + diag) / rho_step).round() as usize;
                if bin < n_rho {
                    acc[t * n_rho + bin] += 1;
                }
            }
        }
    }

    let mut segments = Vec::new();
    for t in 0..n_theta {
        for r in 0..n_rho {
            let votes = acc[t * n_rho + r];
            if votes < params.hough_threshold {
                continue;
            }
            // 3x3 local maximum, ties resolved toward the lower index.
            let mut is_max = true;
            'nms: for dt in -1i32..=1 {
                for dr in -1i32..=1 {
                    if dt == 0 && dr == 0 {
                        continue;
                    }
                    let nt = t as i32 + dt;
                    let nr = r as i32 + dr;
                    if nt < 0 || nr < 0 || nt >= n_theta as i32 || nr >= n_rho as i32 {
                        continue;
                    }
                    let nv = acc[nt as usize * n_rho + nr as usize];
                    let beats = if (dt, dr) < (0, 0) { nv >= votes } else { nv > votes };
                    if beats {
                        is_max = false;
                        break 'nms;
                    }
                }
            }
            if !is_max {
                continue;
            }

            let theta = t as f64 * theta_step;
            let rho = r as f64 * rho_step - diag;
            collect_segments(
                edges,
                theta,
                rho,
                params.hough_max_gap,
                params.hough_min_length,
                &mut segments,
            );
        }
    }

    let xs = segments
        .iter()
        .filter(|s| s.angle_from_horizontal_deg() > 80.0)
        .map(Segment::midpoint_x)
        .collect();
    merge_close(xs)
}
