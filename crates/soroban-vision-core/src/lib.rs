//! Core geometry and image primitives for soroban frame detection.
//!
//! This crate is intentionally small and self-contained: value types for
//! points, rectangles and quadrilaterals, packed grayscale/BGR pixel buffers
//! with bilinear sampling, and 4-point homography estimation with
//! perspective warping. It does *not* depend on any concrete image container
//! crate.

mod geometry;
mod homography;
mod image;
mod logger;

pub use geometry::{Point, Quadrilateral, Rect};
pub use homography::{
    homography_from_4pt, warp_perspective_color, warp_perspective_gray, Homography,
};
pub use image::{
    resize_bilinear_color, sample_bilinear_color, sample_bilinear_gray, sample_bilinear_gray_u8,
    ColorImage, ColorImageView, GrayImage, GrayImageView,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
