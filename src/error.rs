/// Broad class of an [`EncodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied inconsistent geometry or data.
    Validation,
    /// The input describes a pixel layout the encoder does not write.
    UnsupportedFormat,
    /// The image cannot be held in memory or in a single PNG chunk.
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("invalid dimensions {width}x{height}, both must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLengthMismatch { expected: usize, actual: usize },
    #[error("unsupported channel count {0}, expected 3 (RGB) or 4 (RGBA)")]
    InvalidChannelCount(u8),
    #[error("image of {width}x{height} pixels is too large to encode")]
    ImageTooLarge { width: u32, height: u32 },
    #[error("payload of {len} bytes exceeds the PNG chunk length limit")]
    PayloadTooLarge { len: usize },
    #[error("failed to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },
}

impl EncodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDimensions { .. } | Self::BufferLengthMismatch { .. } => {
                ErrorKind::Validation
            }
            Self::InvalidChannelCount(_) => ErrorKind::UnsupportedFormat,
            Self::ImageTooLarge { .. }
            | Self::PayloadTooLarge { .. }
            | Self::AllocationFailure { .. } => ErrorKind::Resource,
        }
    }
}
