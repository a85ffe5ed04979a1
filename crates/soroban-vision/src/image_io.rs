//! Bridges to the `image` crate.
//!
//! The pipeline works on packed BGR buffers; these helpers convert to and
//! from `image` types and wrap file I/O, mapping failures onto
//! [`VisionError::ImageOp`].

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgb};
use soroban_vision_core::{ColorImage, ColorImageView};

use crate::error::VisionError;

/// Convert a decoded image into the pipeline's BGR representation.
pub fn color_image_from_dynamic(img: &DynamicImage) -> ColorImage {
    let rgb = img.to_rgb8();
    let (w, h) = (rgb.width() as usize, rgb.height() as usize);
    let mut out = ColorImage::new(w, h);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        out.set_pixel(x as usize, y as usize, [b, g, r]);
    }
    out
}

/// Load an image file into the pipeline's BGR representation.
pub fn load_color_image(path: impl AsRef<Path>) -> Result<ColorImage, VisionError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| VisionError::image_op(format!("open {}: {e}", path.display())))?;
    Ok(color_image_from_dynamic(&img))
}

/// Save a BGR image, with the format chosen from the file extension.
pub fn save_color_image(
    img: &ColorImageView<'_>,
    path: impl AsRef<Path>,
) -> Result<(), VisionError> {
    let path = path.as_ref();
    let mut rgb: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::new(img.width as u32, img.height as u32);
    for (x, y, pixel) in rgb.enumerate_pixels_mut() {
        let [b, g, r] = img.pixel(x as usize, y as usize);
        *pixel = Rgb([r, g, b]);
    }
    rgb.save(path)
        .map_err(|e| VisionError::image_op(format!("save {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_image_converts_to_bgr() {
        let mut rgb = image::RgbImage::new(3, 2);
        rgb.put_pixel(0, 0, image::Rgb([10, 20, 30]));
        rgb.put_pixel(2, 1, image::Rgb([200, 100, 50]));
        let color = color_image_from_dynamic(&DynamicImage::ImageRgb8(rgb));
        assert_eq!((color.width, color.height), (3, 2));
        assert_eq!(color.pixel(0, 0), [30, 20, 10]);
        assert_eq!(color.pixel(2, 1), [50, 100, 200]);
    }

    #[test]
    fn grayscale_input_replicates_over_channels() {
        let mut gray = image::GrayImage::new(2, 2);
        gray.put_pixel(1, 0, image::Luma([77]));
        let color = color_image_from_dynamic(&DynamicImage::ImageLuma8(gray));
        assert_eq!(color.pixel(1, 0), [77, 77, 77]);
    }

    #[test]
    fn missing_file_is_an_image_op_error() {
        let err = load_color_image("/definitely/not/here.png").expect_err("must fail");
        assert_eq!(err.code(), 6);
    }

    #[test]
    fn unwritable_path_is_an_image_op_error() {
        let img = ColorImage::filled(2, 2, [1, 2, 3]);
        let err = save_color_image(&img.view(), "/definitely/not/here.png").expect_err("must fail");
        assert_eq!(err.code(), 6);
    }
}
