use log::debug;

use crate::{
    chunks::{
        idat::IDATChunk, iend::IENDChunk, ihdr::IHDRChunk, ihdr::IHDR_LEN, ParseableChunk,
        CHUNK_OVERHEAD,
    },
    crc::CrcTable,
    filters::filter_scanlines,
    image_data::{compress_data, stored_stream_len},
    utils::try_buffer,
    EncodeError, EncoderConfig,
};

pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\x0d\x0a\x1a\x0a";

/// Writes 8-bit RGB/RGBA images as PNG files whose image data is stored
/// without compression.
///
/// The encoder only holds its CRC table, so one instance can be built up front
/// and shared by reference between threads.
///
/// ```
/// use stored_png::{EncoderConfig, PngEncoder};
///
/// let encoder = PngEncoder::new();
/// let config = EncoderConfig::from_channels(1, 1, 4)?;
/// let png = encoder.encode(&config, &[10, 20, 30, 255])?;
/// assert!(png.starts_with(b"\x89PNG"));
/// # Ok::<(), stored_png::EncodeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PngEncoder {
    crc: CrcTable,
}

impl PngEncoder {
    pub const fn new() -> Self {
        Self {
            crc: CrcTable::new(),
        }
    }

    pub fn with_table(crc: CrcTable) -> Self {
        Self { crc }
    }

    pub fn crc_table(&self) -> &CrcTable {
        &self.crc
    }

    /// Encodes `pixels`, laid out row-major with interleaved channels, into a
    /// complete PNG file. Output is identical for identical input.
    pub fn encode(&self, config: &EncoderConfig, pixels: &[u8]) -> Result<Vec<u8>, EncodeError> {
        // The IDAT payload must fit one chunk; reject before touching memory.
        stored_stream_len(config.filtered_len()?).map_err(|_| config.too_large())?;

        let filtered = filter_scanlines(pixels, config)?;
        let stream = compress_data(&filtered)?;
        drop(filtered);

        let file_len = PNG_SIGNATURE.len() + 3 * CHUNK_OVERHEAD + IHDR_LEN + stream.len();
        let mut png = try_buffer(file_len)?;
        png.extend_from_slice(&PNG_SIGNATURE);
        IHDRChunk::new(config).write_to(&mut png, &self.crc)?;
        IDATChunk { data: &stream }.write_to(&mut png, &self.crc)?;
        IENDChunk.write_to(&mut png, &self.crc)?;
        debug_assert_eq!(png.len(), file_len);

        debug!(
            "encoded {}x{} {:?} image: {} pixel bytes -> {} file bytes",
            config.width(),
            config.height(),
            config.color_type(),
            pixels.len(),
            png.len()
        );
        Ok(png)
    }
}
