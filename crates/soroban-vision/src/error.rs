use serde::{Deserialize, Serialize};

/// Errors produced by the extraction pipeline.
///
/// Variants carry enough context for a caller-side message and map onto the
/// stable numeric codes used across the C boundary via [`VisionError::code`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VisionError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("soroban frame not detected")]
    FrameNotDetected,
    #[error("lane extraction failed: {reason}")]
    LaneExtractionFailed { reason: String },
    #[error("tensor conversion failed: {reason}")]
    TensorConversionFailed { reason: String },
    #[error("memory allocation of {bytes} bytes failed")]
    MemoryAllocation { bytes: usize },
    #[error("image operation failed: {reason}")]
    ImageOp { reason: String },
}

impl VisionError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn lane_extraction(reason: impl Into<String>) -> Self {
        Self::LaneExtractionFailed {
            reason: reason.into(),
        }
    }

    pub(crate) fn tensor_conversion(reason: impl Into<String>) -> Self {
        Self::TensorConversionFailed {
            reason: reason.into(),
        }
    }

    pub(crate) fn image_op(reason: impl Into<String>) -> Self {
        Self::ImageOp {
            reason: reason.into(),
        }
    }

    /// Stable numeric code, `0` being reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidInput { .. } => 1,
            Self::FrameNotDetected => 2,
            Self::LaneExtractionFailed { .. } => 3,
            Self::TensorConversionFailed { .. } => 4,
            Self::MemoryAllocation { .. } => 5,
            Self::ImageOp { .. } => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(VisionError::invalid_input("x").code(), 1);
        assert_eq!(VisionError::FrameNotDetected.code(), 2);
        assert_eq!(VisionError::lane_extraction("x").code(), 3);
        assert_eq!(VisionError::tensor_conversion("x").code(), 4);
        assert_eq!(VisionError::MemoryAllocation { bytes: 16 }.code(), 5);
        assert_eq!(VisionError::image_op("x").code(), 6);
    }

    #[test]
    fn messages_carry_context() {
        let err = VisionError::lane_extraction("lane count is zero");
        assert_eq!(err.to_string(), "lane extraction failed: lane count is zero");
    }
}
