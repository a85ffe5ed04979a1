//! Typed camera frame buffers.

use crate::error::VisionError;
use soroban_vision_core::ColorImage;

/// Pixel layout of a camera frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 4 bytes per pixel, blue first. The common iOS/macOS camera layout.
    Bgra8,
    /// 4 bytes per pixel, red first.
    Rgba8,
    /// 3 bytes per pixel, red first, no alpha.
    Rgb8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8 | Self::Rgba8 => 4,
            Self::Rgb8 => 3,
        }
    }
}

/// Borrowed view of a camera frame.
///
/// `bytes_per_row` may exceed `width * bytes_per_pixel` when rows are
/// padded; the final row only needs to cover its pixels.
#[derive(Clone, Copy, Debug)]
pub struct FrameBuffer<'a> {
    pub width: u32,
    pub height: u32,
    pub bytes_per_row: u32,
    pub layout: PixelLayout,
    pub data: &'a [u8],
}

impl<'a> FrameBuffer<'a> {
    pub fn new(
        width: u32,
        height: u32,
        bytes_per_row: u32,
        layout: PixelLayout,
        data: &'a [u8],
    ) -> Self {
        Self {
            width,
            height,
            bytes_per_row,
            layout,
            data,
        }
    }

    /// Tightly packed buffer, `bytes_per_row == width * bytes_per_pixel`.
    pub fn packed(width: u32, height: u32, layout: PixelLayout, data: &'a [u8]) -> Self {
        let bpr = width as usize * layout.bytes_per_pixel();
        Self::new(width, height, bpr as u32, layout, data)
    }

    fn validate(&self) -> Result<(), VisionError> {
        if self.width == 0 || self.height == 0 {
            return Err(VisionError::invalid_input("frame has zero dimensions"));
        }
        if self.data.is_empty() {
            return Err(VisionError::invalid_input("frame data is empty"));
        }
        let bpp = self.layout.bytes_per_pixel();
        let row_bytes = self.width as usize * bpp;
        if (self.bytes_per_row as usize) < row_bytes {
            return Err(VisionError::invalid_input(format!(
                "bytes_per_row {} shorter than a row of {} pixels",
                self.bytes_per_row, self.width
            )));
        }
        let needed = self.bytes_per_row as usize * (self.height as usize - 1) + row_bytes;
        if self.data.len() < needed {
            return Err(VisionError::invalid_input(format!(
                "frame data holds {} bytes, {} required",
                self.data.len(),
                needed
            )));
        }
        Ok(())
    }

    /// Convert into a packed BGR image, dropping any alpha channel.
    pub fn to_bgr(&self) -> Result<ColorImage, VisionError> {
        self.validate()?;

        let w = self.width as usize;
        let h = self.height as usize;
        let bpp = self.layout.bytes_per_pixel();
        let stride = self.bytes_per_row as usize;

        let mut out = ColorImage::new(w, h);
        for y in 0..h {
            let row = &self.data[y * stride..y * stride + w * bpp];
            for x in 0..w {
                let p = &row[x * bpp..x * bpp + bpp];
                let bgr = match self.layout {
                    PixelLayout::Bgra8 => [p[0], p[1], p[2]],
                    PixelLayout::Rgba8 | PixelLayout::Rgb8 => [p[2], p[1], p[0]],
                };
                out.set_pixel(x, y, bgr);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_channels_are_swapped_into_bgr() {
        let data = [10u8, 20, 30, 255, 40, 50, 60, 255];
        let buf = FrameBuffer::packed(2, 1, PixelLayout::Rgba8, &data);
        let img = buf.to_bgr().expect("valid frame");
        assert_eq!(img.pixel(0, 0), [30, 20, 10]);
        assert_eq!(img.pixel(1, 0), [60, 50, 40]);
    }

    #[test]
    fn bgra_passes_through_without_swap() {
        let data = [10u8, 20, 30, 255];
        let buf = FrameBuffer::packed(1, 1, PixelLayout::Bgra8, &data);
        let img = buf.to_bgr().expect("valid frame");
        assert_eq!(img.pixel(0, 0), [10, 20, 30]);
    }

    #[test]
    fn row_padding_is_skipped() {
        // 1x2 RGB rows padded to 5 bytes; pad bytes hold a sentinel.
        let data = [1u8, 2, 3, 99, 99, 4, 5, 6];
        let buf = FrameBuffer::new(1, 2, 5, PixelLayout::Rgb8, &data);
        let img = buf.to_bgr().expect("valid frame");
        assert_eq!(img.pixel(0, 0), [3, 2, 1]);
        assert_eq!(img.pixel(0, 1), [6, 5, 4]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let data = [0u8; 10];
        let buf = FrameBuffer::packed(2, 2, PixelLayout::Rgb8, &data);
        assert!(matches!(
            buf.to_bgr(),
            Err(VisionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let data = [0u8; 12];
        let buf = FrameBuffer::packed(0, 2, PixelLayout::Rgb8, &data);
        assert!(matches!(
            buf.to_bgr(),
            Err(VisionError::InvalidInput { .. })
        ));
    }
}
