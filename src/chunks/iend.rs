use anyhow::ensure;

use super::ParseableChunk;

pub(crate) struct IENDChunk;
impl<'a> ParseableChunk<'a> for IENDChunk {
    const HEADER: &'static [u8; 4] = b"IEND";

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self> {
        ensure!(
            chunk_data.is_empty(),
            "IEND must be empty, found {} bytes",
            chunk_data.len()
        );
        Ok(Self)
    }

    fn write_data(&self, _out: &mut Vec<u8>) {}
}
