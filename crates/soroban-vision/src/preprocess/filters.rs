//! Color-domain denoising filters.

use soroban_vision_core::{ColorImage, ColorImageView};

/// Gray-world white balance: scale each channel so its mean matches the
/// global gray mean. Channels with zero mean are left untouched.
pub(crate) fn white_balance(img: &ColorImageView<'_>) -> ColorImage {
    if img.is_empty() {
        return ColorImage::new(0, 0);
    }

    let mut sums = [0u64; 3];
    for px in img.data.chunks_exact(3) {
        sums[0] += px[0] as u64;
        sums[1] += px[1] as u64;
        sums[2] += px[2] as u64;
    }
    let n = (img.width * img.height) as f64;
    let means = [
        sums[0] as f64 / n,
        sums[1] as f64 / n,
        sums[2] as f64 / n,
    ];
    let gray = (means[0] + means[1] + means[2]) / 3.0;

    let mut scale = [1.0f64; 3];
    for c in 0..3 {
        if means[c] > 0.0 {
            scale[c] = gray / means[c];
        }
    }

    let mut out = ColorImage::new(img.width, img.height);
    for (dst, src) in out.data.chunks_exact_mut(3).zip(img.data.chunks_exact(3)) {
        for c in 0..3 {
            dst[c] = (src[c] as f64 * scale[c]).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn force_odd(ksize: u32) -> usize {
    let k = ksize.max(1) as usize;
    if k % 2 == 0 {
        k + 1
    } else {
        k
    }
}

/// Normalized 1-D Gaussian with the kernel-size-derived sigma used when no
/// explicit sigma is given: `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let r = (ksize / 2) as i32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel = Vec::with_capacity(ksize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let w = (-(i * i) as f64 / denom).exp();
        kernel.push(w);
        sum += w;
    }
    kernel.iter().map(|w| (w / sum) as f32).collect()
}

#[inline]
fn clamp_index(i: i32, len: usize) -> usize {
    i.clamp(0, len as i32 - 1) as usize
}

/// Separable Gaussian blur with replicated borders.
pub(crate) fn gaussian_blur(img: &ColorImageView<'_>, ksize: u32) -> ColorImage {
    if img.is_empty() {
        return ColorImage::new(0, 0);
    }

    let k = force_odd(ksize);
    if k == 1 {
        return ColorImage {
            width: img.width,
            height: img.height,
            data: img.data.to_vec(),
        };
    }
    let kernel = gaussian_kernel(k);
    let r = (k / 2) as i32;
    let (w, h) = (img.width, img.height);

    // Horizontal pass into f32 to avoid double rounding.
    let mut tmp = vec![0.0f32; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = clamp_index(x as i32 + ki as i32 - r, w);
                let px = img.pixel(sx, y);
                for c in 0..3 {
                    acc[c] += kw * px[c] as f32;
                }
            }
            let o = (y * w + x) * 3;
            tmp[o..o + 3].copy_from_slice(&acc);
        }
    }

    let mut out = ColorImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = clamp_index(y as i32 + ki as i32 - r, h);
                let o = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += kw * tmp[o + c];
                }
            }
            let bgr = [
                acc[0].round().clamp(0.0, 255.0) as u8,
                acc[1].round().clamp(0.0, 255.0) as u8,
                acc[2].round().clamp(0.0, 255.0) as u8,
            ];
            out.set_pixel(x, y, bgr);
        }
    }
    out
}

/// Edge-preserving bilateral filter.
///
/// Range weight uses the L1 distance over all three channels (one weight per
/// neighbor, shared by the channels); the spatial window is the disc of
/// diameter `d` with replicated borders.
pub(crate) fn bilateral_filter(
    img: &ColorImageView<'_>,
    d: u32,
    sigma_color: f64,
    sigma_space: f64,
) -> ColorImage {
    if img.is_empty() {
        return ColorImage::new(0, 0);
    }

    let radius = (d.max(1) / 2) as i32;
    let (w, h) = (img.width, img.height);

    let color_denom = 2.0 * sigma_color * sigma_color;
    let mut color_weight = [0.0f32; 256 * 3];
    for (dist, cw) in color_weight.iter_mut().enumerate() {
        *cw = (-(dist * dist) as f64 / color_denom).exp() as f32;
    }

    let space_denom = 2.0 * sigma_space * sigma_space;
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = (dx * dx + dy * dy) as f64;
            if d2 > (radius * radius) as f64 {
                continue;
            }
            offsets.push((dx, dy, (-d2 / space_denom).exp() as f32));
        }
    }

    let mut out = ColorImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let center = img.pixel(x, y);
            let mut acc = [0.0f32; 3];
            let mut weight_sum = 0.0f32;
            for &(dx, dy, sw) in &offsets {
                let sx = clamp_index(x as i32 + dx, w);
                let sy = clamp_index(y as i32 + dy, h);
                let px = img.pixel(sx, sy);
                let dist = px[0].abs_diff(center[0]) as usize
                    + px[1].abs_diff(center[1]) as usize
                    + px[2].abs_diff(center[2]) as usize;
                let wgt = sw * color_weight[dist];
                weight_sum += wgt;
                for c in 0..3 {
                    acc[c] += wgt * px[c] as f32;
                }
            }
            let bgr = [
                (acc[0] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (acc[1] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (acc[2] / weight_sum).round().clamp(0.0, 255.0) as u8,
            ];
            out.set_pixel(x, y, bgr);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_balance_keeps_achromatic_images() {
        let img = ColorImage::filled(4, 3, [90, 90, 90]);
        assert_eq!(white_balance(&img.view()), img);
    }

    #[test]
    fn white_balance_equalizes_a_uniform_tint() {
        let img = ColorImage::filled(5, 5, [100, 200, 50]);
        let out = white_balance(&img.view());
        // Every channel lands on the shared gray mean.
        assert_eq!(out.pixel(2, 2), [117, 117, 117]);
    }

    #[test]
    fn gaussian_blur_keeps_uniform_images() {
        let img = ColorImage::filled(6, 6, [120, 40, 200]);
        assert_eq!(gaussian_blur(&img.view(), 3), img);
    }

    #[test]
    fn gaussian_blur_forces_even_kernel_odd() {
        let mut img = ColorImage::new(7, 7);
        img.set_pixel(3, 3, [255, 255, 255]);
        assert_eq!(gaussian_blur(&img.view(), 2), gaussian_blur(&img.view(), 3));
    }

    #[test]
    fn gaussian_blur_spreads_an_impulse() {
        let mut img = ColorImage::new(7, 7);
        img.set_pixel(3, 3, [255, 255, 255]);
        let out = gaussian_blur(&img.view(), 3);
        let center = out.pixel(3, 3)[0];
        let side = out.pixel(2, 3)[0];
        assert!(center > side && side > 0);
        assert!(center < 255);
    }

    #[test]
    fn bilateral_keeps_uniform_images() {
        let img = ColorImage::filled(8, 8, [30, 60, 90]);
        assert_eq!(bilateral_filter(&img.view(), 5, 75.0, 75.0), img);
    }

    #[test]
    fn bilateral_preserves_a_hard_step() {
        let mut img = ColorImage::new(10, 4);
        for y in 0..4 {
            for x in 5..10 {
                img.set_pixel(x, y, [255, 255, 255]);
            }
        }
        // Tight color sigma: cross-edge neighbours get negligible weight.
        let out = bilateral_filter(&img.view(), 5, 10.0, 75.0);
        assert_eq!(out.pixel(4, 2), [0, 0, 0]);
        assert_eq!(out.pixel(5, 2), [255, 255, 255]);
    }
}
