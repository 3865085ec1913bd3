use anyhow::bail;

use crate::{utils::try_buffer, EncodeError, EncoderConfig};

/// Filter-type byte for "None": the scanline is stored as-is.
pub const FILTER_NONE: u8 = 0;

/// Prefixes every row of `pixels` with the "None" filter byte.
pub fn filter_scanlines(pixels: &[u8], config: &EncoderConfig) -> Result<Vec<u8>, EncodeError> {
    let expected = config.buffer_len()?;
    if pixels.len() != expected {
        return Err(EncodeError::BufferLengthMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    let mut filtered = try_buffer(config.filtered_len()?)?;
    for row in pixels.chunks_exact(config.row_len()?) {
        filtered.push(FILTER_NONE);
        filtered.extend_from_slice(row);
    }
    Ok(filtered)
}

/// Strips the filter bytes from `height` rows of `row_len` pixel bytes each.
///
/// Only the "None" filter is understood, which is all this crate writes.
pub fn reconstruct_scanlines(
    filtered: &[u8],
    row_len: usize,
    height: usize,
) -> anyhow::Result<Vec<u8>> {
    let scanline_len = row_len + 1;
    if scanline_len.checked_mul(height) != Some(filtered.len()) {
        bail!(
            "image data holds {} bytes, expected {} rows of {scanline_len}",
            filtered.len(),
            height
        );
    }
    let mut pixels = Vec::with_capacity(row_len * height);
    for (y, scanline) in filtered.chunks_exact(scanline_len).enumerate() {
        match scanline[0] {
            FILTER_NONE => pixels.extend_from_slice(&scanline[1..]),
            other => bail!("row {y} uses filter type {other}, only None is supported"),
        }
    }
    Ok(pixels)
}
