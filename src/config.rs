use crate::EncodeError;

/// Color types the encoder writes, with their IHDR codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// RGB, three 8-bit channels.
    Truecolor = 2,
    /// RGBA, four 8-bit channels.
    TruecolorWithAlpha = 6,
}

impl ColorType {
    pub fn from_channels(channels: u8) -> Result<Self, EncodeError> {
        match channels {
            3 => Ok(Self::Truecolor),
            4 => Ok(Self::TruecolorWithAlpha),
            other => Err(EncodeError::InvalidChannelCount(other)),
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(Self::Truecolor),
            6 => Some(Self::TruecolorWithAlpha),
            _ => None,
        }
    }

    pub fn channel_count(&self) -> u8 {
        match self {
            Self::Truecolor => 3,
            Self::TruecolorWithAlpha => 4,
        }
    }
}

/// Geometry of an image to encode. Only valid configurations can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    width: u32,
    height: u32,
    color_type: ColorType,
}

impl EncoderConfig {
    pub fn new(width: u32, height: u32, color_type: ColorType) -> Result<Self, EncodeError> {
        if width == 0 || height == 0 {
            return Err(EncodeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            color_type,
        })
    }

    /// Builds a config from a raw channel count, rejecting anything but 3 or 4.
    pub fn from_channels(width: u32, height: u32, channels: u8) -> Result<Self, EncodeError> {
        Self::new(width, height, ColorType::from_channels(channels)?)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    pub fn channels(&self) -> u8 {
        self.color_type.channel_count()
    }

    /// Bytes in one unfiltered row.
    pub fn row_len(&self) -> Result<usize, EncodeError> {
        (self.width as usize)
            .checked_mul(self.channels() as usize)
            .ok_or_else(|| self.too_large())
    }

    /// Bytes the caller's pixel buffer must hold.
    pub fn buffer_len(&self) -> Result<usize, EncodeError> {
        self.row_len()?
            .checked_mul(self.height as usize)
            .ok_or_else(|| self.too_large())
    }

    /// Bytes in the filtered bitmap: every row gains a filter-type byte.
    pub fn filtered_len(&self) -> Result<usize, EncodeError> {
        self.row_len()?
            .checked_add(1)
            .and_then(|row| row.checked_mul(self.height as usize))
            .ok_or_else(|| self.too_large())
    }

    pub(crate) fn too_large(&self) -> EncodeError {
        EncodeError::ImageTooLarge {
            width: self.width,
            height: self.height,
        }
    }
}
