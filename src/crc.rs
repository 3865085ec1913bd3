/// Lookup table for the CRC-32 used by PNG chunks (polynomial `0xedb88320`).
///
/// The table is a plain value: build it once and share it by reference. It is
/// never mutated after construction, so it can be read from many threads.
#[derive(Clone, PartialEq, Eq)]
pub struct CrcTable([u32; 256]);

impl CrcTable {
    pub const fn new() -> Self {
        let mut table = [0; 256];
        let mut n = 0;
        while n < 256 {
            let mut c = n as u32;
            let mut i = 0;
            while i < 8 {
                if c & 1 != 0 {
                    c = 0xedb88320 ^ (c >> 1);
                } else {
                    c >>= 1;
                }
                i += 1;
            }
            table[n] = c;
            n += 1;
        }
        Self(table)
    }

    /// Feeds `data` into a running CRC without the initial/final inversion.
    pub fn update(&self, crc: u32, data: &[u8]) -> u32 {
        let mut new_crc = crc;
        for &b in data {
            let index = (new_crc ^ b as u32) & 0xff;
            new_crc = self.0[index as usize] ^ (new_crc >> 8);
        }
        new_crc
    }

    pub fn checksum(&self, data: &[u8]) -> u32 {
        self.update(0xffffffff, data) ^ 0xffffffff
    }
}

impl Default for CrcTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CrcTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrcTable").finish_non_exhaustive()
    }
}
