//! PNG writer for 8-bit RGB and RGBA buffers using uncompressed deflate blocks.

pub mod adler;
pub mod chunks;
mod config;
pub mod crc;
mod decoder;
mod error;
pub mod filters;
pub mod image_data;
mod pixel;
mod png;
mod utils;

pub use config::{ColorType, EncoderConfig};
pub use crc::CrcTable;
pub use decoder::{decode, inspect, BlockSummary, ChunkSummary, DecodedImage, PngSummary};
pub use error::{EncodeError, ErrorKind};
pub use pixel::Pixel;
pub use png::{PngEncoder, PNG_SIGNATURE};
