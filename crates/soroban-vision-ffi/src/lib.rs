//! C ABI for the soroban extraction pipeline.
//!
//! Handle-based: create one instance per capture session, feed it camera
//! frames, free each result. All structs are flat `repr(C)`. The lane array
//! and tensor buffer inside [`SvExtractionResult`] are owned by the result
//! and stay valid until [`soroban_vision_free_result`].
//!
//! Error codes are shared with [`soroban_vision::VisionError::code`]:
//! 0 none, 1 invalid input, 2 frame not detected, 3 lane extraction failed,
//! 4 tensor conversion failed, 5 memory allocation failed, 6 image
//! operation failed.

use std::ptr;

use soroban_vision::core::{Point, Quadrilateral, Rect};
use soroban_vision::{
    DetectionParams, ExtractionResult, FrameBuffer, FrameDetectionResult, LaneInfo, PixelLayout,
    PreprocessingConfig, SorobanVision,
};

const CODE_NONE: i32 = 0;
const CODE_INVALID_INPUT: i32 = 1;

/// Opaque pipeline handle, one per capture session. Not thread-safe; calls
/// on one handle must be serialized by the caller.
pub struct SorobanVisionHandle {
    inner: SorobanVision,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SvPoint {
    pub x: f32,
    pub y: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SvRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Frame corners in TL, TR, BR, BL order.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SvQuad {
    pub top_left: SvPoint,
    pub top_right: SvPoint,
    pub bottom_right: SvPoint,
    pub bottom_left: SvPoint,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SvFrameResult {
    pub detected: bool,
    pub corners: SvQuad,
    pub bounding_box: SvRect,
    pub confidence: f32,
    pub lane_count: i32,
    /// The raw lane estimate fell outside the configured bounds.
    pub lane_count_clamped: bool,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SvLaneInfo {
    pub bounding_box: SvRect,
    pub digit_index: i32,
    pub value: i32,
    pub confidence: f32,
}

/// Flat extraction result. `lanes` and `tensor_data` are heap buffers owned
/// by the result; release them with [`soroban_vision_free_result`].
#[repr(C)]
#[derive(Debug)]
pub struct SvExtractionResult {
    pub success: bool,
    pub error_code: i32,
    pub frame: SvFrameResult,
    pub lanes: *mut SvLaneInfo,
    pub lane_count: i32,
    /// NCHW float data, `tensor_batch * channels * height * width` values.
    pub tensor_data: *mut f32,
    pub tensor_batch: i32,
    pub tensor_channels: i32,
    pub tensor_height: i32,
    pub tensor_width: i32,
    pub total_cells: i32,
    pub elapsed_ms: f64,
}

impl Default for SvExtractionResult {
    fn default() -> Self {
        Self {
            success: false,
            error_code: CODE_NONE,
            frame: SvFrameResult::default(),
            lanes: ptr::null_mut(),
            lane_count: 0,
            tensor_data: ptr::null_mut(),
            tensor_batch: 0,
            tensor_channels: 0,
            tensor_height: 0,
            tensor_width: 0,
            total_cells: 0,
            elapsed_ms: 0.0,
        }
    }
}

/// Pixel layout of a camera buffer.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SvPixelLayout {
    Bgra8 = 0,
    Rgba8 = 1,
    Rgb8 = 2,
}

/// Borrowed camera frame. `bytes_per_row` may exceed the packed row size
/// when rows are padded.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SvFrameBuffer {
    pub data: *const u8,
    pub data_len: usize,
    pub width: u32,
    pub height: u32,
    pub bytes_per_row: u32,
    pub layout: SvPixelLayout,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SvPreprocessingConfig {
    pub target_long_edge: u32,
    pub enable_white_balance: bool,
    pub enable_clahe: bool,
    pub clahe_clip_limit: f64,
    pub clahe_tile_grid: u32,
    pub enable_gaussian_blur: bool,
    pub gaussian_kernel_size: u32,
    pub enable_bilateral_filter: bool,
    pub bilateral_d: u32,
    pub bilateral_sigma_color: f64,
    pub bilateral_sigma_space: f64,
    pub canny_threshold1: f64,
    pub canny_threshold2: f64,
    pub adaptive_block_size: u32,
    pub adaptive_c: f64,
    pub morph_kernel_size: u32,
    pub mean_rgb: [f32; 3],
    pub std_rgb: [f32; 3],
    pub cell_output_size: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SvDetectionParams {
    pub min_frame_area_ratio: f64,
    pub max_frame_area_ratio: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub min_lane_count: i32,
    pub max_lane_count: i32,
    pub hough_rho: f64,
    pub hough_theta: f64,
    pub hough_threshold: u32,
    pub hough_min_length: f64,
    pub hough_max_gap: f64,
    pub contour_approx_epsilon: f64,
    pub upper_bead_ratio: u32,
    pub divider_ratio: u32,
    pub lower_bead_ratio: u32,
}

impl From<Point> for SvPoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Rect> for SvRect {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

impl From<&Quadrilateral> for SvQuad {
    fn from(q: &Quadrilateral) -> Self {
        Self {
            top_left: q.top_left.into(),
            top_right: q.top_right.into(),
            bottom_right: q.bottom_right.into(),
            bottom_left: q.bottom_left.into(),
        }
    }
}

impl From<&FrameDetectionResult> for SvFrameResult {
    fn from(f: &FrameDetectionResult) -> Self {
        Self {
            detected: f.detected,
            corners: SvQuad::from(&f.corners),
            bounding_box: f.bounding_box.into(),
            confidence: f.confidence,
            lane_count: f.lane_count,
            lane_count_clamped: f.lane_count_clamped,
        }
    }
}

impl From<&LaneInfo> for SvLaneInfo {
    fn from(l: &LaneInfo) -> Self {
        Self {
            bounding_box: l.bounding_box.into(),
            digit_index: l.digit_index,
            value: l.value,
            confidence: l.confidence,
        }
    }
}

impl From<SvPixelLayout> for PixelLayout {
    fn from(layout: SvPixelLayout) -> Self {
        match layout {
            SvPixelLayout::Bgra8 => PixelLayout::Bgra8,
            SvPixelLayout::Rgba8 => PixelLayout::Rgba8,
            SvPixelLayout::Rgb8 => PixelLayout::Rgb8,
        }
    }
}

impl From<&SvPreprocessingConfig> for PreprocessingConfig {
    fn from(c: &SvPreprocessingConfig) -> Self {
        Self {
            target_long_edge: c.target_long_edge,
            enable_white_balance: c.enable_white_balance,
            enable_clahe: c.enable_clahe,
            clahe_clip_limit: c.clahe_clip_limit,
            clahe_tile_grid: c.clahe_tile_grid,
            enable_gaussian_blur: c.enable_gaussian_blur,
            gaussian_kernel_size: c.gaussian_kernel_size,
            enable_bilateral_filter: c.enable_bilateral_filter,
            bilateral_d: c.bilateral_d,
            bilateral_sigma_color: c.bilateral_sigma_color,
            bilateral_sigma_space: c.bilateral_sigma_space,
            canny_threshold1: c.canny_threshold1,
            canny_threshold2: c.canny_threshold2,
            adaptive_block_size: c.adaptive_block_size,
            adaptive_c: c.adaptive_c,
            morph_kernel_size: c.morph_kernel_size,
            mean_rgb: c.mean_rgb,
            std_rgb: c.std_rgb,
            cell_output_size: c.cell_output_size as usize,
        }
    }
}

impl From<&PreprocessingConfig> for SvPreprocessingConfig {
    fn from(c: &PreprocessingConfig) -> Self {
        Self {
            target_long_edge: c.target_long_edge,
            enable_white_balance: c.enable_white_balance,
            enable_clahe: c.enable_clahe,
            clahe_clip_limit: c.clahe_clip_limit,
            clahe_tile_grid: c.clahe_tile_grid,
            enable_gaussian_blur: c.enable_gaussian_blur,
            gaussian_kernel_size: c.gaussian_kernel_size,
            enable_bilateral_filter: c.enable_bilateral_filter,
            bilateral_d: c.bilateral_d,
            bilateral_sigma_color: c.bilateral_sigma_color,
            bilateral_sigma_space: c.bilateral_sigma_space,
            canny_threshold1: c.canny_threshold1,
            canny_threshold2: c.canny_threshold2,
            adaptive_block_size: c.adaptive_block_size,
            adaptive_c: c.adaptive_c,
            morph_kernel_size: c.morph_kernel_size,
            mean_rgb: c.mean_rgb,
            std_rgb: c.std_rgb,
            cell_output_size: c.cell_output_size as u32,
        }
    }
}

impl Default for SvPreprocessingConfig {
    fn default() -> Self {
        Self::from(&PreprocessingConfig::default())
    }
}

impl From<&SvDetectionParams> for DetectionParams {
    fn from(p: &SvDetectionParams) -> Self {
        Self {
            min_frame_area_ratio: p.min_frame_area_ratio,
            max_frame_area_ratio: p.max_frame_area_ratio,
            min_aspect_ratio: p.min_aspect_ratio,
            max_aspect_ratio: p.max_aspect_ratio,
            min_lane_count: p.min_lane_count,
            max_lane_count: p.max_lane_count,
            hough_rho: p.hough_rho,
            hough_theta: p.hough_theta,
            hough_threshold: p.hough_threshold,
            hough_min_length: p.hough_min_length,
            hough_max_gap: p.hough_max_gap,
            contour_approx_epsilon: p.contour_approx_epsilon,
            upper_bead_ratio: p.upper_bead_ratio,
            divider_ratio: p.divider_ratio,
            lower_bead_ratio: p.lower_bead_ratio,
        }
    }
}

impl From<&DetectionParams> for SvDetectionParams {
    fn from(p: &DetectionParams) -> Self {
        Self {
            min_frame_area_ratio: p.min_frame_area_ratio,
            max_frame_area_ratio: p.max_frame_area_ratio,
            min_aspect_ratio: p.min_aspect_ratio,
            max_aspect_ratio: p.max_aspect_ratio,
            min_lane_count: p.min_lane_count,
            max_lane_count: p.max_lane_count,
            hough_rho: p.hough_rho,
            hough_theta: p.hough_theta,
            hough_threshold: p.hough_threshold,
            hough_min_length: p.hough_min_length,
            hough_max_gap: p.hough_max_gap,
            contour_approx_epsilon: p.contour_approx_epsilon,
            upper_bead_ratio: p.upper_bead_ratio,
            divider_ratio: p.divider_ratio,
            lower_bead_ratio: p.lower_bead_ratio,
        }
    }
}

impl Default for SvDetectionParams {
    fn default() -> Self {
        Self::from(&DetectionParams::default())
    }
}

fn fill_result(out: &mut SvExtractionResult, extraction: &ExtractionResult) {
    out.success = extraction.success;
    out.error_code = extraction
        .error
        .as_ref()
        .map_or(CODE_NONE, |e| e.code());
    out.frame = SvFrameResult::from(&extraction.frame);
    out.total_cells = extraction.total_cells;
    out.elapsed_ms = extraction.elapsed_ms;

    if !extraction.lanes.is_empty() {
        let lanes: Vec<SvLaneInfo> = extraction.lanes.iter().map(SvLaneInfo::from).collect();
        out.lane_count = lanes.len() as i32;
        out.lanes = Box::into_raw(lanes.into_boxed_slice()) as *mut SvLaneInfo;
    }

    if let Some(tensor) = &extraction.tensor {
        if tensor.batch > 0 {
            let data = tensor.data.clone().into_boxed_slice();
            out.tensor_data = Box::into_raw(data) as *mut f32;
            out.tensor_batch = tensor.batch as i32;
            out.tensor_channels = tensor.channels as i32;
            out.tensor_height = tensor.height as i32;
            out.tensor_width = tensor.width as i32;
        }
    }
}

/// Create a pipeline instance with default configuration.
#[no_mangle]
pub extern "C" fn soroban_vision_create() -> *mut SorobanVisionHandle {
    Box::into_raw(Box::new(SorobanVisionHandle {
        inner: SorobanVision::default(),
    }))
}

/// Destroy a pipeline instance. NULL is a no-op.
///
/// # Safety
/// `handle` must be NULL or a pointer from [`soroban_vision_create`] that
/// has not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn soroban_vision_destroy(handle: *mut SorobanVisionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Run the pipeline on one camera frame and fill `result`.
///
/// Returns the error code, `0` on success. `result` is fully overwritten;
/// on failure it still carries the partial frame result and the code.
///
/// # Safety
/// `handle` must be a live handle from [`soroban_vision_create`]. `frame`
/// must point to a valid buffer descriptor whose `data` covers `data_len`
/// readable bytes and whose `layout` is a valid [`SvPixelLayout`]. `result`
/// must point to writable memory for one [`SvExtractionResult`].
#[no_mangle]
pub unsafe extern "C" fn soroban_vision_process(
    handle: *mut SorobanVisionHandle,
    frame: *const SvFrameBuffer,
    result: *mut SvExtractionResult,
) -> i32 {
    let (Some(handle), Some(frame), Some(out)) =
        (handle.as_mut(), frame.as_ref(), result.as_mut())
    else {
        return CODE_INVALID_INPUT;
    };

    *out = SvExtractionResult::default();
    if frame.data.is_null() {
        out.error_code = CODE_INVALID_INPUT;
        return CODE_INVALID_INPUT;
    }

    let data = std::slice::from_raw_parts(frame.data, frame.data_len);
    let buffer = FrameBuffer::new(
        frame.width,
        frame.height,
        frame.bytes_per_row,
        frame.layout.into(),
        data,
    );
    let extraction = handle.inner.process_frame(&buffer);
    fill_result(out, &extraction);
    out.error_code
}

/// Free the lane array and tensor buffer of a result and zero the pointers.
/// NULL and already-freed results are no-ops.
///
/// # Safety
/// `result` must be NULL or point to a result filled by
/// [`soroban_vision_process`] whose buffers were not freed by other means.
#[no_mangle]
pub unsafe extern "C" fn soroban_vision_free_result(result: *mut SvExtractionResult) {
    let Some(result) = result.as_mut() else {
        return;
    };

    if !result.lanes.is_null() && result.lane_count > 0 {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            result.lanes,
            result.lane_count as usize,
        )));
    }
    result.lanes = ptr::null_mut();
    result.lane_count = 0;

    let tensor_len = result.tensor_batch as usize
        * result.tensor_channels as usize
        * result.tensor_height as usize
        * result.tensor_width as usize;
    if !result.tensor_data.is_null() && tensor_len > 0 {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            result.tensor_data,
            tensor_len,
        )));
    }
    result.tensor_data = ptr::null_mut();
    result.tensor_batch = 0;
    result.tensor_channels = 0;
    result.tensor_height = 0;
    result.tensor_width = 0;
    result.total_cells = 0;
}

/// Replace the preprocessing and normalization configuration.
///
/// # Safety
/// `handle` must be a live handle from [`soroban_vision_create`]; `config`
/// must be NULL or point to a valid [`SvPreprocessingConfig`].
#[no_mangle]
pub unsafe extern "C" fn soroban_vision_set_config(
    handle: *mut SorobanVisionHandle,
    config: *const SvPreprocessingConfig,
) -> i32 {
    let (Some(handle), Some(config)) = (handle.as_mut(), config.as_ref()) else {
        return CODE_INVALID_INPUT;
    };
    handle.inner.set_config(config.into());
    CODE_NONE
}

/// Replace the detection parameters.
///
/// # Safety
/// `handle` must be a live handle from [`soroban_vision_create`]; `params`
/// must be NULL or point to a valid [`SvDetectionParams`].
#[no_mangle]
pub unsafe extern "C" fn soroban_vision_set_detection_params(
    handle: *mut SorobanVisionHandle,
    params: *const SvDetectionParams,
) -> i32 {
    let (Some(handle), Some(params)) = (handle.as_mut(), params.as_ref()) else {
        return CODE_INVALID_INPUT;
    };
    handle.inner.set_detection_params(params.into());
    CODE_NONE
}
