//! Reader for the files [`PngEncoder`](crate::PngEncoder) writes.

use std::{fmt, marker::PhantomData};

use anyhow::{anyhow, bail, ensure, Context};
use log::debug;
use nom::{bytes::complete::tag, IResult};

use crate::{
    chunks::{
        ihdr::{IHDRChunk, BIT_DEPTH},
        iter_chunks, Chunk, ChunkIter, RawChunk,
    },
    crc::CrcTable,
    filters::reconstruct_scanlines,
    image_data::{decompress_data, parse_stored_stream},
    png::PNG_SIGNATURE,
    ColorType, Pixel,
};

pub(crate) struct PNGDecoder<'a, State> {
    chunks: ChunkIter<'a>,
    seen: Vec<ChunkSummary>,
    _state: PhantomData<State>,
}

impl<'a, State> PNGDecoder<'a, State> {
    fn next_chunk(&mut self) -> Option<anyhow::Result<RawChunk<'a>>> {
        let chunk = self.chunks.next()?;
        if let Ok(chunk) = &chunk {
            self.seen.push(ChunkSummary {
                chunk_type: chunk.type_name(),
                length: chunk.data.len(),
                crc: chunk.crc,
            });
        }
        Some(chunk)
    }
}

pub(crate) struct Start;
pub(crate) struct Chunks;

impl<'a> PNGDecoder<'a, Start> {
    pub(crate) fn new(data: &'a [u8], crc: &'a CrcTable) -> anyhow::Result<Self> {
        let (rest, _) = parse_signature(data)
            .map_err(|_| anyhow!("input doesn't start with expected signature"))?;
        Ok(Self {
            chunks: iter_chunks(rest, crc),
            seen: vec![],
            _state: PhantomData,
        })
    }

    pub(crate) fn parse_ihdr(mut self) -> anyhow::Result<(PNGDecoder<'a, Chunks>, IHDRChunk)> {
        let first = self.next_chunk().ok_or_else(|| anyhow!("missing IHDR"))??;
        match first.parse()? {
            Chunk::IHDR(header) => Ok((
                PNGDecoder {
                    chunks: self.chunks,
                    seen: self.seen,
                    _state: PhantomData,
                },
                header,
            )),
            _ => bail!("first chunk is {}, expected IHDR", first.type_name()),
        }
    }
}

impl<'a> PNGDecoder<'a, Chunks> {
    /// Collects the consecutive IDAT chunks, checking that IEND follows.
    /// Also returns a summary of every chunk read, IHDR included.
    pub(crate) fn parse_idat(mut self) -> anyhow::Result<(Vec<u8>, Vec<ChunkSummary>)> {
        let mut stream = vec![];
        let (mut seen_idat, mut idat_done) = (false, false);
        while let Some(chunk) = self.next_chunk() {
            let chunk = chunk?;
            match chunk.parse()? {
                Chunk::IDAT(idat) => {
                    ensure!(!idat_done, "IDAT chunks must be consecutive");
                    seen_idat = true;
                    stream.extend_from_slice(idat.data);
                }
                Chunk::IEND => {
                    ensure!(seen_idat, "Couldn't find an IDAT");
                    return Ok((stream, self.seen));
                }
                Chunk::IHDR(_) => bail!("duplicate IHDR"),
                Chunk::Unknown(raw) => {
                    idat_done = seen_idat;
                    debug!("skipping {} chunk", raw.type_name());
                }
            }
        }
        bail!("missing IEND")
    }
}

fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&PNG_SIGNATURE[..])(input)
}

fn check_header(header: &IHDRChunk) -> anyhow::Result<ColorType> {
    ensure!(
        header.width > 0 && header.height > 0,
        "image has zero size {}x{}",
        header.width,
        header.height
    );
    ensure!(
        header.bit_depth == BIT_DEPTH,
        "bit depth {} is not supported",
        header.bit_depth
    );
    ensure!(
        header.compression_method == 0 && header.filter_method == 0,
        "unknown compression or filter method"
    );
    ensure!(header.interlace_method == 0, "interlaced images are not supported");
    ColorType::from_code(header.color_type)
        .ok_or_else(|| anyhow!("color type {} is not supported", header.color_type))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
    /// Row-major, channel-interleaved samples.
    pub data: Vec<u8>,
}
impl DecodedImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.color_type.channel_count() as usize;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        Pixel::from_samples(self.data.get(start..start + channels)?)
    }
}

/// Decodes a stored-only PNG file, verifying every checksum on the way.
pub fn decode(bytes: &[u8], crc: &CrcTable) -> anyhow::Result<DecodedImage> {
    let (decoder, header) = PNGDecoder::new(bytes, crc)?.parse_ihdr()?;
    let color_type = check_header(&header)?;
    let (stream, _) = decoder.parse_idat()?;
    let filtered = decompress_data(&stream).context("Failed to unpack image data.")?;
    let row_len = (header.width as usize)
        .checked_mul(color_type.channel_count() as usize)
        .context("image row does not fit in memory")?;
    let data = reconstruct_scanlines(&filtered, row_len, header.height as usize)?;
    Ok(DecodedImage {
        width: header.width,
        height: header.height,
        color_type,
        data,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub chunk_type: String,
    pub length: usize,
    pub crc: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    pub is_final: bool,
    pub len: u16,
}

/// Layout of a stored-only PNG file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngSummary {
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
    pub chunks: Vec<ChunkSummary>,
    pub blocks: Vec<BlockSummary>,
    pub adler: u32,
}

impl fmt::Display for PngSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}x{} {:?}", self.width, self.height, self.color_type)?;
        for chunk in &self.chunks {
            writeln!(
                f,
                "chunk {} length={} crc={:#010x}",
                chunk.chunk_type, chunk.length, chunk.crc
            )?;
        }
        for (i, block) in self.blocks.iter().enumerate() {
            let marker = if block.is_final { " final" } else { "" };
            writeln!(f, "block {i} len={}{marker}", block.len)?;
        }
        write!(f, "adler32={:#010x}", self.adler)
    }
}

/// Lists the chunks and stored blocks of a file without reconstructing pixels.
pub fn inspect(bytes: &[u8], crc: &CrcTable) -> anyhow::Result<PngSummary> {
    let (decoder, header) = PNGDecoder::new(bytes, crc)?.parse_ihdr()?;
    let color_type = check_header(&header)?;
    let (stream, chunks) = decoder.parse_idat()?;
    let parsed = parse_stored_stream(&stream)?;
    Ok(PngSummary {
        width: header.width,
        height: header.height,
        color_type,
        chunks,
        blocks: parsed
            .blocks
            .iter()
            .map(|block| BlockSummary {
                is_final: block.is_final,
                len: block.len(),
            })
            .collect(),
        adler: parsed.adler,
    })
}
