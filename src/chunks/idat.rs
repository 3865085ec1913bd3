use super::ParseableChunk;

#[derive(Debug)]
pub(crate) struct IDATChunk<'a> {
    pub(crate) data: &'a [u8],
}
impl<'a> ParseableChunk<'a> for IDATChunk<'a> {
    const HEADER: &'static [u8; 4] = b"IDAT";

    fn from_bytes(chunk_data: &'a [u8]) -> anyhow::Result<Self> {
        Ok(IDATChunk { data: chunk_data })
    }

    fn write_data(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.data);
    }
}
