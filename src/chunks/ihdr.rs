use anyhow::anyhow;
use nom::{
    number::complete::{be_u32, le_u8},
    sequence::tuple,
    IResult,
};

use super::ParseableChunk;
use crate::EncoderConfig;

pub(crate) const IHDR_LEN: usize = 13;
pub(crate) const BIT_DEPTH: u8 = 8;

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct IHDRChunk {
    pub width: u32,
    pub height: u32,
    pub(crate) bit_depth: u8,
    pub(crate) color_type: u8,
    pub(crate) compression_method: u8,
    pub(crate) filter_method: u8,
    pub(crate) interlace_method: u8,
}
impl IHDRChunk {
    /// Header for an 8-bit, non-interlaced image using the default
    /// compression and filter methods.
    pub(crate) fn new(config: &EncoderConfig) -> Self {
        Self {
            width: config.width(),
            height: config.height(),
            bit_depth: BIT_DEPTH,
            color_type: config.color_type() as u8,
            ..Default::default()
        }
    }
}

fn header_fields(input: &[u8]) -> IResult<&[u8], (u32, u32, u8, u8, u8, u8, u8)> {
    tuple((be_u32, be_u32, le_u8, le_u8, le_u8, le_u8, le_u8))(input)
}

impl<'a> ParseableChunk<'a> for IHDRChunk {
    const HEADER: &'static [u8; 4] = b"IHDR";

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self> {
        if chunk_data.len() != IHDR_LEN {
            return Err(anyhow!(
                "IHDR holds {} bytes, expected {IHDR_LEN}",
                chunk_data.len()
            ));
        }
        let (_, fields) = header_fields(chunk_data).map_err(|_| anyhow!("malformed IHDR"))?;
        let (
            width,
            height,
            bit_depth,
            color_type,
            compression_method,
            filter_method,
            interlace_method,
        ) = fields;
        Ok(IHDRChunk {
            width,
            height,
            bit_depth,
            color_type,
            compression_method,
            filter_method,
            interlace_method,
        })
    }

    fn write_data(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&[
            self.bit_depth,
            self.color_type,
            self.compression_method,
            self.filter_method,
            self.interlace_method,
        ]);
    }
}
