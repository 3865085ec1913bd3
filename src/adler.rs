const MOD_ADLER: u32 = 65_521;
// Largest span summed before reducing; `b` must stay below u32::MAX.
const CHUNK_LEN: usize = 3_800;

/// Adler-32 checksum used as the trailer of a zlib stream.
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for chunk in data.chunks(CHUNK_LEN) {
        for &byte in chunk {
            a += byte as u32;
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }
    (b << 16) | a
}
