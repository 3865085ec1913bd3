use anyhow::bail;
use nom::{
    bytes::complete::take,
    combinator::map_res,
    number::complete::be_u32,
    sequence::tuple,
    IResult,
};

use crate::{crc::CrcTable, EncodeError};

pub(crate) mod idat;
pub(crate) mod iend;
pub(crate) mod ihdr;

/// Bytes a chunk adds around its data: length, type and CRC fields.
pub const CHUNK_OVERHEAD: usize = 12;
/// Largest data length a PNG chunk may declare.
pub const MAX_CHUNK_LEN: usize = (1 << 31) - 1;

/// Appends `len(data) ‖ chunk_type ‖ data ‖ crc` to `out`, the CRC covering
/// the type and data only.
pub fn write_chunk(
    out: &mut Vec<u8>,
    chunk_type: &[u8; 4],
    data: &[u8],
    crc: &CrcTable,
) -> Result<(), EncodeError> {
    length_field(data.len())?;
    build_chunk(out, chunk_type, crc, |out| out.extend_from_slice(data))
}

fn length_field(len: usize) -> Result<[u8; 4], EncodeError> {
    if len > MAX_CHUNK_LEN {
        return Err(EncodeError::PayloadTooLarge { len });
    }
    Ok((len as u32).to_be_bytes())
}

/// Frames whatever `write_data` appends as one chunk. `out` is left untouched
/// on error.
fn build_chunk(
    out: &mut Vec<u8>,
    chunk_type: &[u8; 4],
    crc: &CrcTable,
    write_data: impl FnOnce(&mut Vec<u8>),
) -> Result<(), EncodeError> {
    let start = out.len();
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(chunk_type);
    write_data(out);
    let length = match length_field(out.len() - start - 8) {
        Ok(length) => length,
        Err(e) => {
            out.truncate(start);
            return Err(e);
        }
    };
    out[start..start + 4].copy_from_slice(&length);
    let checksum = crc.checksum(&out[start + 4..]);
    out.extend_from_slice(&checksum.to_be_bytes());
    Ok(())
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug)]
pub(crate) enum Chunk<'a> {
    IHDR(ihdr::IHDRChunk),
    IDAT(idat::IDATChunk<'a>),
    IEND,
    Unknown(RawChunk<'a>),
}

/// A framed chunk whose CRC has been checked but whose data is not interpreted.
#[derive(Debug, Clone, Copy)]
pub struct RawChunk<'a> {
    pub chunk_type: &'a [u8; 4],
    pub data: &'a [u8],
    pub crc: u32,
}
impl<'a> RawChunk<'a> {
    pub(crate) fn parse(self) -> anyhow::Result<Chunk<'a>> {
        let header = self.chunk_type;
        if header == ihdr::IHDRChunk::HEADER {
            Ok(Chunk::IHDR(ihdr::IHDRChunk::from_bytes(self.data)?))
        } else if header == idat::IDATChunk::HEADER {
            Ok(Chunk::IDAT(idat::IDATChunk::from_bytes(self.data)?))
        } else if header == iend::IENDChunk::HEADER {
            iend::IENDChunk::from_bytes(self.data)?;
            Ok(Chunk::IEND)
        } else {
            Ok(Chunk::Unknown(self))
        }
    }

    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(self.chunk_type).into_owned()
    }
}

/// Iterates over the chunks following the signature, verifying each CRC.
/// Iteration ends after `IEND` or at the first malformed chunk.
pub fn iter_chunks<'a>(source: &'a [u8], crc: &'a CrcTable) -> ChunkIter<'a> {
    ChunkIter {
        source,
        crc,
        finished: false,
    }
}

pub struct ChunkIter<'a> {
    source: &'a [u8],
    crc: &'a CrcTable,
    finished: bool,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = anyhow::Result<RawChunk<'a>>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match valid_chunk(self.source, self.crc) {
            Ok((rest, chunk)) => {
                self.source = rest;
                if chunk.chunk_type == iend::IENDChunk::HEADER {
                    self.finished = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn framed_chunk(input: &[u8]) -> IResult<&[u8], RawChunk<'_>> {
    let (input, length) = be_u32(input)?;
    let (input, (chunk_type, data, crc)) = tuple((
        map_res(take(4usize), <&[u8; 4]>::try_from),
        take(length),
        be_u32,
    ))(input)?;
    Ok((
        input,
        RawChunk {
            chunk_type,
            data,
            crc,
        },
    ))
}

fn valid_chunk<'a>(input: &'a [u8], crc: &CrcTable) -> anyhow::Result<(&'a [u8], RawChunk<'a>)> {
    let (rest, chunk) = match framed_chunk(input) {
        Ok(parsed) => parsed,
        Err(e) => bail!("truncated or malformed chunk: {:?}", e.map(|e| e.code)),
    };
    let computed = crc.update(crc.update(0xffffffff, chunk.chunk_type), chunk.data) ^ 0xffffffff;
    if computed != chunk.crc {
        bail!(
            "CRC mismatch in {} chunk: stored {:#010x}, computed {computed:#010x}",
            chunk.type_name(),
            chunk.crc
        );
    }
    Ok((rest, chunk))
}

pub(crate) trait ParseableChunk<'a>: Sized {
    const HEADER: &'static [u8; 4];

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self>;
    fn write_data(&self, out: &mut Vec<u8>);

    /// Appends the whole chunk, length and CRC included.
    fn write_to(&self, out: &mut Vec<u8>, crc: &CrcTable) -> Result<(), EncodeError> {
        build_chunk(out, Self::HEADER, crc, |out| self.write_data(out))
    }
}
