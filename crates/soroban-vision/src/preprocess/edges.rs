//! Sobel gradients and a two-threshold edge map.

use soroban_vision_core::{GrayImage, GrayImageView};

#[inline]
fn at_clamped(src: &GrayImageView<'_>, x: i32, y: i32) -> i32 {
    let xi = x.clamp(0, src.width as i32 - 1) as usize;
    let yi = y.clamp(0, src.height as i32 - 1) as usize;
    src.data[yi * src.width + xi] as i32
}

#[inline]
fn sobel_at(src: &GrayImageView<'_>, x: i32, y: i32) -> (i32, i32) {
    let p = |dx: i32, dy: i32| at_clamped(src, x + dx, y + dy);
    let gx = p(1, -1) - p(-1, -1) + 2 * (p(1, 0) - p(-1, 0)) + p(1, 1) - p(-1, 1);
    let gy = p(-1, 1) - p(-1, -1) + 2 * (p(0, 1) - p(0, -1)) + p(1, 1) - p(1, -1);
    (gx, gy)
}

/// Absolute horizontal Sobel response saturated to u8.
///
/// Vertical structures such as rods and lane separators light up; horizontal
/// ones vanish.
pub(crate) fn sobel_x_abs_u8(src: &GrayImageView<'_>) -> GrayImage {
    let mut out = GrayImage::new(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let (gx, _) = sobel_at(src, x as i32, y as i32);
            out.data[y * src.width + x] = gx.unsigned_abs().min(255) as u8;
        }
    }
    out
}

/// Canny-style edge map: Sobel gradients, L1 magnitude, four-direction
/// non-maximum suppression, then hysteresis between the two thresholds.
pub(crate) fn detect_edges(src: &GrayImageView<'_>, t1: f64, t2: f64) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    let low = t1.min(t2).max(0.0) as i32;
    let high = t1.max(t2).max(0.0) as i32;

    let mut mag = vec![0i32; w * h];
    let mut dir = vec![0u8; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let (gx, gy) = sobel_at(src, x as i32, y as i32);
            let ax = gx.abs() as f32;
            let ay = gy.abs() as f32;
            mag[y * w + x] = gx.abs() + gy.abs();

            // 0 horizontal gradient, 1 vertical, 2 falling diagonal, 3 rising.
            dir[y * w + x] = if ay <= ax * 0.4142 {
                0
            } else if ay >= ax * 2.4142 {
                1
            } else if (gx >= 0) == (gy >= 0) {
                2
            } else {
                3
            };
        }
    }

    // Non-maximum suppression along the gradient direction.
    let mut thin = vec![0i32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let m = mag[y * w + x];
            if m < low {
                continue;
            }
            let (n1, n2) = match dir[y * w + x] {
                0 => (mag[y * w + x - 1], mag[y * w + x + 1]),
                1 => (mag[(y - 1) * w + x], mag[(y + 1) * w + x]),
                2 => (mag[(y - 1) * w + x - 1], mag[(y + 1) * w + x + 1]),
                _ => (mag[(y - 1) * w + x + 1], mag[(y + 1) * w + x - 1]),
            };
            if m >= n1 && m >= n2 {
                thin[y * w + x] = m;
            }
        }
    }

    // Hysteresis: strong pixels seed, weak pixels join when 8-connected.
    let mut stack = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if thin[y * w + x] >= high && out.data[y * w + x] == 0 {
                out.data[y * w + x] = 255;
                stack.push((x, y));
                while let Some((cx, cy)) = stack.pop() {
                    for dy in -1i32..=1 {
                        for dx in -1i32..=1 {
                            let nx = cx as i32 + dx;
                            let ny = cy as i32 + dy;
                            if nx < 1 || ny < 1 || nx >= w as i32 - 1 || ny >= h as i32 - 1 {
                                continue;
                            }
                            let ni = ny as usize * w + nx as usize;
                            if out.data[ni] == 0 && thin[ni] >= low {
                                out.data[ni] = 255;
                                stack.push((nx as usize, ny as usize));
                            }
                        }
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_step(w: usize, h: usize, split: usize) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in 0..h {
            for x in split..w {
                img.set(x, y, 255);
            }
        }
        img
    }

    #[test]
    fn sobel_x_fires_on_vertical_edges_only() {
        let img = vertical_step(12, 6, 6);
        let sob = sobel_x_abs_u8(&img.view());
        assert_eq!(sob.at(5, 3), 255);
        assert_eq!(sob.at(2, 3), 0);

        let mut horiz = GrayImage::new(12, 6);
        for y in 3..6 {
            for x in 0..12 {
                horiz.set(x, y, 255);
            }
        }
        let sob = sobel_x_abs_u8(&horiz.view());
        for y in 1..5 {
            for x in 1..11 {
                assert_eq!(sob.at(x, y), 0);
            }
        }
    }

    #[test]
    fn edge_map_marks_a_step_and_nothing_else() {
        let img = vertical_step(16, 8, 8);
        let edges = detect_edges(&img.view(), 50.0, 150.0);
        let mid_row = 4;
        assert!(edges.at(7, mid_row) == 255 || edges.at(8, mid_row) == 255);
        assert_eq!(edges.at(2, mid_row), 0);
        assert_eq!(edges.at(13, mid_row), 0);
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = GrayImage::filled(16, 16, 128);
        let edges = detect_edges(&img.view(), 50.0, 150.0);
        assert!(edges.data.iter().all(|&v| v == 0));
    }
}
