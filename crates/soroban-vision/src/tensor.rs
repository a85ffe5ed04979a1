//! Tensor conversion for bead-cell classification.
//!
//! Cells come out of the detector as small BGR crops; the classifier side
//! wants normalized float tensors. [`TensorConverter`] resizes each crop to
//! the configured square size, swaps BGR to RGB, and applies per-channel
//! mean/std normalization, packing batches in NCHW order.

use soroban_vision_core::{resize_bilinear_color, ColorImage, ColorImageView, GrayImageView};

use crate::config::PreprocessingConfig;
use crate::error::VisionError;

/// Normalized CHW tensor for a single bead cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellTensor {
    /// Channel-major values, `channels * height * width` long.
    pub data: Vec<f32>,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl CellTensor {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drops the payload and zeroes the shape. Safe to call twice.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.channels = 0;
        self.height = 0;
        self.width = 0;
    }
}

/// Normalized NCHW tensor holding every cell of a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchTensor {
    /// Batch-major values, `batch * channels * height * width` long.
    pub data: Vec<f32>,
    pub batch: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl BatchTensor {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drops the payload and zeroes the shape. Safe to call twice.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.batch = 0;
        self.channels = 0;
        self.height = 0;
        self.width = 0;
    }
}

/// Converts bead-cell crops into normalized classifier input tensors.
#[derive(Clone, Debug)]
pub struct TensorConverter {
    config: PreprocessingConfig,
}

impl TensorConverter {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Resizes a BGR crop to the configured square size and normalizes it
    /// into a CHW tensor with RGB channel order.
    pub fn convert_cell(&self, cell: &ColorImageView<'_>) -> Result<CellTensor, VisionError> {
        if cell.is_empty() {
            return Err(VisionError::invalid_input("empty cell image"));
        }
        let size = self.config.cell_output_size;
        let resized = resize_bilinear_color(cell, size, size);
        let plane = size * size;
        let mean = self.config.mean_rgb;
        let std_dev = self.config.std_rgb;
        let mut data = vec![0.0f32; 3 * plane];
        for y in 0..size {
            for x in 0..size {
                let [b, g, r] = resized.pixel(x, y);
                let rgb = [r, g, b];
                for (c, &value) in rgb.iter().enumerate() {
                    data[c * plane + y * size + x] =
                        (value as f32 / 255.0 - mean[c]) / std_dev[c];
                }
            }
        }
        Ok(CellTensor {
            data,
            channels: 3,
            height: size,
            width: size,
        })
    }

    /// Converts a grayscale crop by replicating the luma over all channels.
    pub fn convert_gray_cell(&self, cell: &GrayImageView<'_>) -> Result<CellTensor, VisionError> {
        if cell.width == 0 || cell.height == 0 {
            return Err(VisionError::invalid_input("empty cell image"));
        }
        let mut color = ColorImage::new(cell.width, cell.height);
        for y in 0..cell.height {
            for x in 0..cell.width {
                let v = cell.data[y * cell.width + x];
                color.set_pixel(x, y, [v, v, v]);
            }
        }
        self.convert_cell(&color.view())
    }

    /// Converts a batch of cells into one NCHW tensor.
    ///
    /// The batch is all-or-nothing: any failing cell drops the whole batch.
    pub fn convert_batch(&self, cells: &[ColorImage]) -> Result<BatchTensor, VisionError> {
        if cells.is_empty() {
            return Err(VisionError::invalid_input("empty cell batch"));
        }
        let size = self.config.cell_output_size;
        let total = cells.len() * 3 * size * size;
        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| VisionError::MemoryAllocation {
                bytes: total * std::mem::size_of::<f32>(),
            })?;
        for cell in cells {
            let tensor = self.convert_cell(&cell.view())?;
            data.extend_from_slice(&tensor.data);
        }
        Ok(BatchTensor {
            data,
            batch: cells.len(),
            channels: 3,
            height: size,
            width: size,
        })
    }
}
