use anyhow::{anyhow, bail, ensure};
use log::trace;
use nom::{
    bytes::complete::take,
    combinator::verify,
    number::complete::{be_u32, le_u16, le_u8},
    sequence::tuple,
    IResult,
};

use crate::{
    adler::adler32,
    chunks::MAX_CHUNK_LEN,
    utils::{div_ceil, try_buffer},
    EncodeError,
};

/// CMF `0x78` (deflate, 32K window) and FLG `0x01` (fastest, no dictionary).
/// `0x7801` is a multiple of 31, as the zlib check bits require.
pub const ZLIB_HEADER: [u8; 2] = [0x78, 0x01];
pub const MAX_STORED_BLOCK_LEN: usize = u16::MAX as usize;
const BLOCK_HEADER_LEN: usize = 5;
const TRAILER_LEN: usize = 4;

/// Exact size of the stream [`compress_data`] produces for `data_len` bytes.
/// Streams that would not fit in a single PNG chunk are an error.
pub fn stored_stream_len(data_len: usize) -> Result<usize, EncodeError> {
    let blocks = div_ceil(data_len, MAX_STORED_BLOCK_LEN).max(1);
    blocks
        .checked_mul(BLOCK_HEADER_LEN)
        .and_then(|headers| headers.checked_add(data_len))
        .and_then(|len| len.checked_add(ZLIB_HEADER.len() + TRAILER_LEN))
        .filter(|&len| len <= MAX_CHUNK_LEN)
        .ok_or(EncodeError::PayloadTooLarge { len: data_len })
}

/// Wraps `filtered` in a zlib stream of stored deflate blocks.
pub fn compress_data(filtered: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let stream_len = stored_stream_len(filtered.len())?;
    let mut stream = try_buffer(stream_len)?;
    stream.extend_from_slice(&ZLIB_HEADER);
    if filtered.is_empty() {
        write_stored_block(&mut stream, &[], true);
    }
    let mut blocks = filtered.chunks(MAX_STORED_BLOCK_LEN).peekable();
    while let Some(block) = blocks.next() {
        write_stored_block(&mut stream, block, blocks.peek().is_none());
    }
    stream.extend_from_slice(&adler32(filtered).to_be_bytes());
    trace!(
        "packed {} bytes into {} stored blocks",
        filtered.len(),
        div_ceil(filtered.len(), MAX_STORED_BLOCK_LEN).max(1)
    );
    debug_assert_eq!(stream.len(), stream_len);
    Ok(stream)
}

fn write_stored_block(out: &mut Vec<u8>, data: &[u8], is_final: bool) {
    debug_assert!(data.len() <= MAX_STORED_BLOCK_LEN);
    let len = data.len() as u16;
    // BTYPE = 00, the remaining bits pad the header to a byte boundary.
    out.push(is_final as u8);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredBlock<'a> {
    pub is_final: bool,
    pub data: &'a [u8],
}
impl StoredBlock<'_> {
    pub(crate) fn len(&self) -> u16 {
        self.data.len() as u16
    }
}

#[derive(Debug)]
pub struct StoredStream<'a> {
    pub blocks: Vec<StoredBlock<'a>>,
    pub adler: u32,
}

/// Splits a zlib stream into its stored blocks. Streams holding compressed
/// blocks are rejected.
pub fn parse_stored_stream(stream: &[u8]) -> anyhow::Result<StoredStream<'_>> {
    let (mut input, _) = zlib_header(stream).map_err(|_| anyhow!("invalid zlib header"))?;
    let mut blocks = vec![];
    loop {
        let (rest, block) = stored_block(input).map_err(|e| {
            anyhow!(
                "block {} is not a valid stored block: {:?}",
                blocks.len(),
                e.map(|e| e.code)
            )
        })?;
        input = rest;
        blocks.push(block);
        if block.is_final {
            break;
        }
    }
    let (rest, adler) = adler_trailer(input).map_err(|_| anyhow!("missing Adler-32 trailer"))?;
    if !rest.is_empty() {
        bail!("{} unexpected bytes after the zlib stream", rest.len());
    }
    Ok(StoredStream { blocks, adler })
}

/// Concatenates the stored blocks and checks the Adler-32 trailer.
pub fn decompress_data(stream: &[u8]) -> anyhow::Result<Vec<u8>> {
    let parsed = parse_stored_stream(stream)?;
    let data = parsed
        .blocks
        .iter()
        .map(|block| block.data)
        .collect::<Vec<_>>()
        .concat();
    let computed = adler32(&data);
    ensure!(
        computed == parsed.adler,
        "Adler-32 mismatch: trailer {:#010x}, computed {computed:#010x}",
        parsed.adler
    );
    Ok(data)
}

fn zlib_header(input: &[u8]) -> IResult<&[u8], (u8, u8)> {
    verify(tuple((le_u8, le_u8)), |&(cmf, flg): &(u8, u8)| {
        cmf & 0x0f == 8 && flg & 0x20 == 0 && u16::from_be_bytes([cmf, flg]) % 31 == 0
    })(input)
}

fn stored_block(input: &[u8]) -> IResult<&[u8], StoredBlock<'_>> {
    let (input, (header, len, _)) = verify(
        tuple((le_u8, le_u16, le_u16)),
        |&(header, len, nlen): &(u8, u16, u16)| header & 0b110 == 0 && len == !nlen,
    )(input)?;
    let (input, data) = take(len)(input)?;
    Ok((
        input,
        StoredBlock {
            is_final: header & 1 == 1,
            data,
        },
    ))
}

fn adler_trailer(input: &[u8]) -> IResult<&[u8], u32> {
    be_u32(input)
}
