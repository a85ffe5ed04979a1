//! External contour tracing and polygon tooling on binary masks.
//!
//! Only the outer boundary of each white component is traced; hole
//! boundaries are never reported. Components are 8-connected.

use soroban_vision_core::{GrayImageView, Point, Rect};

/// Moore neighborhood in clockwise order with y growing downward.
const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

#[inline]
fn is_white(mask: &GrayImageView<'_>, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 || x >= mask.width as i32 || y >= mask.height as i32 {
        return false;
    }
    mask.data[y as usize * mask.width + x as usize] > 0
}

/// Moore-neighbor boundary trace from the component's first pixel in
/// row-major order, stopping on re-entry of the start pixel from the same
/// background cell.
fn trace_boundary(mask: &GrayImageView<'_>, sx: i32, sy: i32) -> Vec<Point> {
    let start = (sx, sy);
    let start_back = (sx - 1, sy);
    let mut p = start;
    let mut b = start_back;
    let mut contour = vec![Point::new(sx as f32, sy as f32)];

    let max_steps = 4 * (mask.width * mask.height + 1);
    for _ in 0..max_steps {
        let db = (b.0 - p.0, b.1 - p.1);
        let bi = match NEIGHBORS.iter().position(|&d| d == db) {
            Some(i) => i,
            None => break,
        };

        let mut moved = false;
        for k in 1..=8 {
            let idx = (bi + k) % 8;
            let n = (p.0 + NEIGHBORS[idx].0, p.1 + NEIGHBORS[idx].1);
            if is_white(mask, n.0, n.1) {
                let prev = (bi + k - 1) % 8;
                b = (p.0 + NEIGHBORS[prev].0, p.1 + NEIGHBORS[prev].1);
                p = n;
                moved = true;
                break;
            }
        }
        if !moved {
            break;
        }
        if p == start && b == start_back {
            break;
        }
        contour.push(Point::new(p.0 as f32, p.1 as f32));
    }
    contour
}

fn flood_mark(mask: &GrayImageView<'_>, visited: &mut [bool], sx: usize, sy: usize) {
    let w = mask.width;
    let mut stack = vec![(sx, sy)];
    visited[sy * w + sx] = true;
    while let Some((x, y)) = stack.pop() {
        for &(dx, dy) in &NEIGHBORS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if !is_white(mask, nx, ny) {
                continue;
            }
            let ni = ny as usize * w + nx as usize;
            if !visited[ni] {
                visited[ni] = true;
                stack.push((nx as usize, ny as usize));
            }
        }
    }
}

/// Outer boundaries of all white components, in row-major discovery order.
pub(crate) fn trace_external_contours(mask: &GrayImageView<'_>) -> Vec<Vec<Point>> {
    let (w, h) = (mask.width, mask.height);
    let mut visited = vec![false; w * h];
    let mut contours = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if mask.data[y * w + x] == 0 || visited[y * w + x] {
                continue;
            }
            contours.push(trace_boundary(mask, x as i32, y as i32));
            flood_mark(mask, &mut visited, x, y);
        }
    }
    contours
}

/// Absolute polygon area via the shoelace formula.
pub(crate) fn shoelace_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        sum += points[i].x as f64 * points[j].y as f64 - points[j].x as f64 * points[i].y as f64;
    }
    sum.abs() / 2.0
}

pub(crate) fn closed_perimeter(points: &[Point]) -> f64 {
    let mut sum = 0.0f64;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        sum += points[i].distance_to(points[j]) as f64;
    }
    sum
}

fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let abx = (b.x - a.x) as f64;
    let aby = (b.y - a.y) as f64;
    let apx = (p.x - a.x) as f64;
    let apy = (p.y - a.y) as f64;
    let len2 = abx * abx + aby * aby;
    if len2 == 0.0 {
        return (apx * apx + apy * apy).sqrt();
    }
    (abx * apy - aby * apx).abs() / len2.sqrt()
}

/// Ramer-Douglas-Peucker on an open chain, keeping both endpoints.
fn rdp_open(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut spans = vec![(0usize, n - 1)];
    while let Some((a, b)) = spans.pop() {
        let mut d_max = 0.0;
        let mut i_max = a;
        for i in a + 1..b {
            let d = perpendicular_distance(points[i], points[a], points[b]);
            if d > d_max {
                d_max = d;
                i_max = i;
            }
        }
        if d_max > epsilon {
            keep[i_max] = true;
            spans.push((a, i_max));
            spans.push((i_max, b));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Simplify a closed ring: split at the vertex farthest from the first one,
/// simplify both halves, and stitch them back together.
pub(crate) fn approx_polygon_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut far = 0;
    let mut best = -1.0f32;
    for (i, p) in points.iter().enumerate() {
        let d = points[0].distance_to(*p);
        if d > best {
            best = d;
            far = i;
        }
    }
    if far == 0 {
        return vec![points[0]];
    }

    let first = &points[..=far];
    let mut second: Vec<Point> = points[far..].to_vec();
    second.push(points[0]);

    let mut out = rdp_open(first, epsilon);
    let tail = rdp_open(&second, epsilon);
    out.extend_from_slice(&tail[1..tail.len() - 1]);
    out
}

/// All turns share a sign (collinear runs allowed).
pub(crate) fn is_convex(poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut pos = false;
    let mut neg = false;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let c = poly[(i + 2) % n];
        let cross = (b.x - a.x) as f64 * (c.y - b.y) as f64
            - (b.y - a.y) as f64 * (c.x - b.x) as f64;
        if cross > 0.0 {
            pos = true;
        } else if cross < 0.0 {
            neg = true;
        }
        if pos && neg {
            return false;
        }
    }
    true
}

/// Axis-aligned pixel extent; width and height count pixels, so a single
/// point spans 1x1.
pub(crate) fn bounding_rect(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x - min_x + 1.0, max_y - min_y + 1.0)
}
