//! Packed pixel buffers and bilinear sampling.
//!
//! Two formats cover the whole pipeline: single-channel grayscale and
//! interleaved 3-byte BGR (the camera-buffer convention). Each comes in an
//! owned and a borrowed flavor. Samples outside the image read as black;
//! resizing clamps to the border instead.

/// Borrowed grayscale image, row-major, `data.len() == width * height`.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Owned grayscale image, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Zero-filled image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }
}

/// Borrowed BGR image, interleaved, `data.len() == width * height * 3`.
#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Owned BGR image, interleaved blue, green, red.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl ColorImage {
    /// Black image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    /// Image filled with a constant `[b, g, r]` pixel.
    pub fn filled(width: usize, height: usize, bgr: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&bgr);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn view(&self) -> ColorImageView<'_> {
        ColorImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, bgr: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&bgr);
    }
}

impl<'a> ColorImageView<'a> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Copy out the rectangle `[x, x+w) × [y, y+h)`, clamped to the image.
    ///
    /// A rectangle that clamps to zero size yields an empty image.
    pub fn crop(&self, x: usize, y: usize, w: usize, h: usize) -> ColorImage {
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        let x0 = x.min(x1);
        let y0 = y.min(y1);
        let cw = x1 - x0;
        let ch = y1 - y0;

        let mut data = Vec::with_capacity(cw * ch * 3);
        for row in y0..y1 {
            let start = (row * self.width + x0) * 3;
            data.extend_from_slice(&self.data[start..start + cw * 3]);
        }
        ColorImage {
            width: cw,
            height: ch,
            data,
        }
    }
}

#[inline]
fn gray_at(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
fn color_at(src: &ColorImageView<'_>, x: i32, y: i32) -> [u8; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0, 0, 0];
    }
    let i = (y as usize * src.width + x as usize) * 3;
    [src.data[i], src.data[i + 1], src.data[i + 2]]
}

/// Bilinear sample with pixel values at integer coordinates; outside reads 0.
#[inline]
pub fn sample_bilinear_gray(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = gray_at(src, x0, y0) as f32;
    let p10 = gray_at(src, x0 + 1, y0) as f32;
    let p01 = gray_at(src, x0, y0 + 1) as f32;
    let p11 = gray_at(src, x0 + 1, y0 + 1) as f32;

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);
    top + fy * (bottom - top)
}

#[inline]
pub fn sample_bilinear_gray_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear_gray(src, x, y).round().clamp(0.0, 255.0) as u8
}

/// Per-channel bilinear sample of a BGR view; outside reads black.
#[inline]
pub fn sample_bilinear_color(src: &ColorImageView<'_>, x: f32, y: f32) -> [u8; 3] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = color_at(src, x0, y0);
    let p10 = color_at(src, x0 + 1, y0);
    let p01 = color_at(src, x0, y0 + 1);
    let p11 = color_at(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
        let bottom = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
        out[c] = (top + fy * (bottom - top)).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Bilinear resize of a BGR view with border clamping.
///
/// Source positions follow the pixel-center convention
/// `src = (dst + 0.5) * scale - 0.5`, so resizing to the same dimensions is
/// an exact copy.
pub fn resize_bilinear_color(src: &ColorImageView<'_>, out_w: usize, out_h: usize) -> ColorImage {
    if src.is_empty() || out_w == 0 || out_h == 0 {
        return ColorImage::new(0, 0);
    }

    let scale_x = src.width as f32 / out_w as f32;
    let scale_y = src.height as f32 / out_h as f32;
    let mut out = ColorImage::new(out_w, out_h);

    for y in 0..out_h {
        let sy = ((y as f32 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = (sy.floor() as usize).min(src.height - 1);
        let y1 = (y0 + 1).min(src.height - 1);
        let fy = sy - y0 as f32;

        for x in 0..out_w {
            let sx = ((x as f32 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = (sx.floor() as usize).min(src.width - 1);
            let x1 = (x0 + 1).min(src.width - 1);
            let fx = sx - x0 as f32;

            let p00 = src.pixel(x0, y0);
            let p10 = src.pixel(x1, y0);
            let p01 = src.pixel(x0, y1);
            let p11 = src.pixel(x1, y1);

            let mut bgr = [0u8; 3];
            for c in 0..3 {
                let top = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
                let bottom = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
                bgr[c] = (top + fy * (bottom - top)).round().clamp(0.0, 255.0) as u8;
            }
            out.set_pixel(x, y, bgr);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_sampling_is_exact_on_pixel_coordinates() {
        let mut img = GrayImage::new(4, 3);
        img.set(2, 1, 200);
        let v = img.view();
        assert_eq!(sample_bilinear_gray(&v, 2.0, 1.0), 200.0);
        assert_eq!(sample_bilinear_gray_u8(&v, 2.0, 1.0), 200);
    }

    #[test]
    fn gray_sampling_interpolates_between_pixels() {
        let mut img = GrayImage::new(2, 1);
        img.set(0, 0, 100);
        img.set(1, 0, 200);
        let v = img.view();
        assert_eq!(sample_bilinear_gray(&v, 0.5, 0.0), 150.0);
    }

    #[test]
    fn sampling_outside_reads_black() {
        let img = GrayImage::filled(3, 3, 255);
        let v = img.view();
        assert_eq!(sample_bilinear_gray(&v, -2.0, 0.0), 0.0);

        let color = ColorImage::filled(3, 3, [10, 20, 30]);
        assert_eq!(sample_bilinear_color(&color.view(), 10.0, 10.0), [0, 0, 0]);
    }

    #[test]
    fn resize_to_same_size_copies() {
        let mut img = ColorImage::new(5, 4);
        img.set_pixel(3, 2, [9, 8, 7]);
        img.set_pixel(0, 0, [1, 2, 3]);
        let out = resize_bilinear_color(&img.view(), 5, 4);
        assert_eq!(out, img);
    }

    #[test]
    fn resize_halves_a_uniform_image_without_change() {
        let img = ColorImage::filled(8, 8, [50, 100, 150]);
        let out = resize_bilinear_color(&img.view(), 4, 4);
        assert_eq!(out.width, 4);
        assert_eq!(out.height, 4);
        assert!(out
            .data
            .chunks(3)
            .all(|px| px == [50, 100, 150]));
    }

    #[test]
    fn crop_respects_bounds() {
        let mut img = ColorImage::new(6, 4);
        img.set_pixel(2, 1, [5, 6, 7]);
        let cropped = img.view().crop(2, 1, 10, 10);
        assert_eq!(cropped.width, 4);
        assert_eq!(cropped.height, 3);
        assert_eq!(cropped.pixel(0, 0), [5, 6, 7]);

        let empty = img.view().crop(6, 4, 3, 3);
        assert!(empty.is_empty());
    }
}
