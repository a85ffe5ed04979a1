//! Grayscale conversion, contrast enhancement and binarization.

use soroban_vision_core::{ColorImageView, GrayImage, GrayImageView};

/// BT.601 luma conversion, `0.299 R + 0.587 G + 0.114 B`.
pub(crate) fn to_grayscale(img: &ColorImageView<'_>) -> GrayImage {
    let mut out = GrayImage::new(img.width, img.height);
    for (dst, px) in out.data.iter_mut().zip(img.data.chunks_exact(3)) {
        let luma = 0.299 * px[2] as f32 + 0.587 * px[1] as f32 + 0.114 * px[0] as f32;
        *dst = luma.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Partition `extent` into `grid` contiguous spans.
fn tile_bounds(extent: usize, grid: usize) -> Vec<(usize, usize)> {
    (0..grid)
        .map(|t| (t * extent / grid, (t + 1) * extent / grid))
        .collect()
}

/// Per-coordinate blend table: the two bracketing tile indices and the
/// interpolation fraction between their centers.
fn axis_blend(bounds: &[(usize, usize)], extent: usize) -> Vec<(usize, usize, f32)> {
    let centers: Vec<f32> = bounds.iter().map(|&(s, e)| (s + e) as f32 / 2.0).collect();
    let last = centers.len() - 1;

    (0..extent)
        .map(|i| {
            let x = i as f32;
            if x <= centers[0] {
                return (0, 0, 0.0);
            }
            if x >= centers[last] {
                return (last, last, 0.0);
            }
            let mut t = 0;
            while t + 1 < centers.len() && centers[t + 1] <= x {
                t += 1;
            }
            let span = centers[t + 1] - centers[t];
            let frac = if span > 0.0 { (x - centers[t]) / span } else { 0.0 };
            (t, t + 1, frac)
        })
        .collect()
}

fn identity_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        *slot = v as u8;
    }
    lut
}

fn tile_lut(src: &GrayImageView<'_>, xs: (usize, usize), ys: (usize, usize), clip_limit: f64) -> [u8; 256] {
    let count = (xs.1 - xs.0) * (ys.1 - ys.0);
    if count == 0 {
        return identity_lut();
    }

    let mut hist = [0u32; 256];
    for y in ys.0..ys.1 {
        let row = &src.data[y * src.width..(y + 1) * src.width];
        for &v in &row[xs.0..xs.1] {
            hist[v as usize] += 1;
        }
    }

    // Clip the histogram and hand the whole excess back, first uniformly,
    // then the residual one count at a time over evenly spaced bins.
    let clip = ((clip_limit * count as f64 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for h in hist.iter_mut() {
        if *h > clip {
            excess += *h - clip;
            *h = clip;
        }
    }
    let add = excess / 256;
    for h in hist.iter_mut() {
        *h += add;
    }
    let mut residual = (excess % 256) as usize;
    if residual > 0 {
        let step = (256 / residual).max(1);
        let mut i = 0;
        while residual > 0 && i < 256 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }

    let total: u64 = hist.iter().map(|&h| h as u64).sum();
    let scale = 255.0 / total as f64;
    let mut lut = [0u8; 256];
    let mut cum = 0u64;
    for (v, slot) in lut.iter_mut().enumerate() {
        cum += hist[v] as u64;
        *slot = (cum as f64 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into `tile_grid x tile_grid` tiles, each with a
/// clipped-histogram equalization LUT; pixels blend the four nearest tile
/// LUTs bilinearly, so tile seams stay invisible.
pub(crate) fn clahe(src: &GrayImageView<'_>, clip_limit: f64, tile_grid: u32) -> GrayImage {
    if src.width == 0 || src.height == 0 {
        return GrayImage::new(0, 0);
    }

    let grid = tile_grid.max(1) as usize;
    let xb = tile_bounds(src.width, grid);
    let yb = tile_bounds(src.height, grid);

    let mut luts = Vec::with_capacity(grid * grid);
    for &ys in &yb {
        for &xs in &xb {
            luts.push(tile_lut(src, xs, ys, clip_limit));
        }
    }

    let xbl = axis_blend(&xb, src.width);
    let ybl = axis_blend(&yb, src.height);

    let mut out = GrayImage::new(src.width, src.height);
    for y in 0..src.height {
        let (ty0, ty1, fy) = ybl[y];
        for x in 0..src.width {
            let (tx0, tx1, fx) = xbl[x];
            let v = src.data[y * src.width + x] as usize;

            let v00 = luts[ty0 * grid + tx0][v] as f32;
            let v10 = luts[ty0 * grid + tx1][v] as f32;
            let v01 = luts[ty1 * grid + tx0][v] as f32;
            let v11 = luts[ty1 * grid + tx1][v] as f32;

            let top = v00 + fx * (v10 - v00);
            let bottom = v01 + fx * (v11 - v01);
            out.data[y * src.width + x] = (top + fy * (bottom - top)).round() as u8;
        }
    }
    out
}

/// Binarize against the local mean: pixel > mean(window) - c becomes 255.
///
/// `block_size` is the window side length, forced odd; windows clamp at the
/// image border and the mean uses the actual pixel count.
pub(crate) fn adaptive_threshold(src: &GrayImageView<'_>, block_size: u32, c: f64) -> GrayImage {
    if src.width == 0 || src.height == 0 {
        return GrayImage::new(0, 0);
    }

    let block = {
        let b = block_size.max(3) as usize;
        if b % 2 == 0 {
            b + 1
        } else {
            b
        }
    };
    let r = block / 2;
    let (w, h) = (src.width, src.height);

    // Summed-area table with a zero top row / left column.
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += src.data[y * w + x] as u64;
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r + 1).min(w);

            let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0];
            let count = ((x1 - x0) * (y1 - y0)) as f64;
            let mean = sum as f64 / count;

            out.data[y * w + x] = if src.data[y * w + x] as f64 > mean - c {
                255
            } else {
                0
            };
        }
    }
    out
}

fn erode(src: &GrayImage, r: usize) -> GrayImage {
    min_max_filter(src, r, true)
}

fn dilate(src: &GrayImage, r: usize) -> GrayImage {
    min_max_filter(src, r, false)
}

/// Separable square min/max filter; the window clamps at the border.
fn min_max_filter(src: &GrayImage, r: usize, take_min: bool) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let pick = |a: u8, b: u8| if take_min { a.min(b) } else { a.max(b) };

    let mut tmp = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let mut v = src.data[y * w + x0];
            for xi in x0 + 1..x1 {
                v = pick(v, src.data[y * w + xi]);
            }
            tmp.data[y * w + x] = v;
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r + 1).min(h);
        for x in 0..w {
            let mut v = tmp.data[y0 * w + x];
            for yi in y0 + 1..y1 {
                v = pick(v, tmp.data[yi * w + x]);
            }
            out.data[y * w + x] = v;
        }
    }
    out
}

/// Close (fill pinholes) then open (drop specks) with a square kernel.
pub(crate) fn morphology_clean(src: &GrayImageView<'_>, ksize: u32) -> GrayImage {
    if src.width == 0 || src.height == 0 {
        return GrayImage::new(0, 0);
    }
    let k = ksize.max(1) as usize;
    let r = if k % 2 == 0 { k / 2 } else { (k - 1) / 2 };
    if r == 0 {
        return GrayImage {
            width: src.width,
            height: src.height,
            data: src.data.to_vec(),
        };
    }

    let owned = GrayImage {
        width: src.width,
        height: src.height,
        data: src.data.to_vec(),
    };
    let closed = erode(&dilate(&owned, r), r);
    dilate(&erode(&closed, r), r)
}
