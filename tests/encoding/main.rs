use stored_png::{
    adler::adler32, decode, image_data::MAX_STORED_BLOCK_LEN, CrcTable, EncodeError,
    EncoderConfig, ErrorKind, PngEncoder, PNG_SIGNATURE,
};

struct Chunk<'a> {
    chunk_type: &'a [u8],
    data: &'a [u8],
    crc: u32,
}

/// Splits a file into chunks by reading the length fields directly.
fn split_chunks(png: &[u8]) -> Vec<Chunk<'_>> {
    let mut rest = &png[8..];
    let mut chunks = vec![];
    while !rest.is_empty() {
        let len = u32::from_be_bytes(rest[0..4].try_into().unwrap()) as usize;
        chunks.push(Chunk {
            chunk_type: &rest[4..8],
            data: &rest[8..8 + len],
            crc: u32::from_be_bytes(rest[8 + len..12 + len].try_into().unwrap()),
        });
        rest = &rest[12 + len..];
    }
    chunks
}

/// `(final, LEN, NLEN, payload)` for each stored block of an IDAT payload.
fn split_blocks(idat: &[u8]) -> Vec<(bool, u16, u16, &[u8])> {
    let mut rest = &idat[2..idat.len() - 4];
    let mut blocks = vec![];
    while !rest.is_empty() {
        let len = u16::from_le_bytes([rest[1], rest[2]]);
        let nlen = u16::from_le_bytes([rest[3], rest[4]]);
        blocks.push((rest[0] & 1 == 1, len, nlen, &rest[5..5 + len as usize]));
        rest = &rest[5 + len as usize..];
    }
    blocks
}

fn gradient(width: u32, height: u32, channels: u8) -> Vec<u8> {
    (0..width as usize * height as usize * channels as usize)
        .map(|i| (i * 31 % 256) as u8)
        .collect()
}

fn decode_with_png_crate(data: &[u8]) -> (png::OutputInfo, Vec<u8>) {
    let decoder = png::Decoder::new(data);
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info, buf)
}

fn filtered(pixels: &[u8], row_len: usize) -> Vec<u8> {
    pixels
        .chunks(row_len)
        .flat_map(|row| std::iter::once(0).chain(row.iter().copied()))
        .collect()
}

#[test]
fn single_rgba_pixel_round_trips() {
    let config = EncoderConfig::from_channels(1, 1, 4).unwrap();
    let png = PngEncoder::new().encode(&config, &[10, 20, 30, 255]).unwrap();

    let (info, pixels) = decode_with_png_crate(&png);
    assert_eq!((info.width, info.height), (1, 1));
    assert_eq!(info.color_type, png::ColorType::Rgba);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);
    assert_eq!(pixels, [10, 20, 30, 255]);
}

#[test]
fn two_rgb_pixels_round_trip() {
    let config = EncoderConfig::from_channels(2, 1, 3).unwrap();
    let png = PngEncoder::new()
        .encode(&config, &[0, 0, 0, 255, 255, 255])
        .unwrap();

    let (info, pixels) = decode_with_png_crate(&png);
    assert_eq!(info.color_type, png::ColorType::Rgb);
    assert_eq!(pixels, [0, 0, 0, 255, 255, 255]);
}

#[test]
fn large_images_round_trip_through_independent_decoders() {
    let encoder = PngEncoder::new();
    for (width, height, channels) in [(300, 200, 4), (257, 129, 3), (1, 70_000, 3)] {
        let config = EncoderConfig::from_channels(width, height, channels).unwrap();
        let pixels = gradient(width, height, channels);
        let png = encoder.encode(&config, &pixels).unwrap();

        let (_, decoded) = decode_with_png_crate(&png);
        assert_eq!(decoded, pixels, "{width}x{height}x{channels}");
        assert_eq!(decode(&png, encoder.crc_table()).unwrap().data, pixels);

        let chunks = split_chunks(&png);
        let inflated = miniz_oxide::inflate::decompress_to_vec_zlib(chunks[1].data).unwrap();
        assert_eq!(inflated, filtered(&pixels, width as usize * channels as usize));
    }
}

#[test]
fn file_structure() {
    let config = EncoderConfig::from_channels(40, 30, 3).unwrap();
    let png = PngEncoder::new()
        .encode(&config, &gradient(40, 30, 3))
        .unwrap();

    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(&png[..8], &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]);
    let chunks = split_chunks(&png);
    let types: Vec<&[u8]> = chunks.iter().map(|c| c.chunk_type).collect();
    assert_eq!(types, [&b"IHDR"[..], b"IDAT", b"IEND"]);
    assert!(chunks[2].data.is_empty());
    assert_eq!(&png[png.len() - 12..png.len() - 8], &[0, 0, 0, 0]);
    assert_eq!(
        chunks[0].data,
        [0, 0, 0, 40, 0, 0, 0, 30, 8, 2, 0, 0, 0]
    );
}

#[test]
fn every_chunk_crc_matches() {
    let crc = CrcTable::new();
    let config = EncoderConfig::from_channels(120, 600, 4).unwrap();
    let png = PngEncoder::with_table(crc.clone())
        .encode(&config, &gradient(120, 600, 4))
        .unwrap();
    for chunk in split_chunks(&png) {
        let covered = [chunk.chunk_type, chunk.data].concat();
        assert_eq!(crc.checksum(&covered), chunk.crc);
    }
}

#[test]
fn adler_trailer_covers_filtered_bitmap() {
    let config = EncoderConfig::from_channels(5, 4, 3).unwrap();
    let pixels = gradient(5, 4, 3);
    let png = PngEncoder::new().encode(&config, &pixels).unwrap();
    let idat = split_chunks(&png)[1].data;

    let trailer = u32::from_be_bytes(idat[idat.len() - 4..].try_into().unwrap());
    assert_eq!(trailer, adler32(&filtered(&pixels, 15)));
    assert_ne!(trailer, adler32(&pixels));
    assert_eq!(&idat[..2], &[0x78, 0x01]);
}

#[test]
fn stored_block_headers() {
    // 200 rows of 1024 bytes plus filter bytes spans four blocks.
    let config = EncoderConfig::from_channels(256, 200, 4).unwrap();
    let pixels = gradient(256, 200, 4);
    let png = PngEncoder::new().encode(&config, &pixels).unwrap();
    let blocks = split_blocks(split_chunks(&png)[1].data);

    assert_eq!(blocks.len(), 4);
    for (i, (is_final, len, nlen, payload)) in blocks.iter().enumerate() {
        assert_eq!(len.wrapping_add(*nlen), 0xffff);
        assert_eq!(*len, !*nlen);
        assert_eq!(payload.len(), *len as usize);
        assert_eq!(*is_final, i == blocks.len() - 1);
    }
    let joined: Vec<u8> = blocks.iter().flat_map(|b| b.3.iter().copied()).collect();
    assert_eq!(joined, filtered(&pixels, 1024));
}

#[test]
fn filtered_length_boundary() {
    let encoder = PngEncoder::new();
    // 13107 rows of 1 filter byte + 4 samples = 65535 filtered bytes.
    let exact_rows = MAX_STORED_BLOCK_LEN / 5;
    let config = EncoderConfig::from_channels(1, exact_rows as u32, 4).unwrap();
    let png = encoder
        .encode(&config, &gradient(1, exact_rows as u32, 4))
        .unwrap();
    let blocks = split_blocks(split_chunks(&png)[1].data);
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].0);
    assert_eq!(blocks[0].1 as usize, MAX_STORED_BLOCK_LEN);

    // 16384 rows of 4 bytes = 65536 filtered bytes.
    let config = EncoderConfig::from_channels(1, 16_384, 3).unwrap();
    let png = encoder.encode(&config, &gradient(1, 16_384, 3)).unwrap();
    let blocks = split_blocks(split_chunks(&png)[1].data);
    assert_eq!(blocks.len(), 2);
    assert_eq!((blocks[0].0, blocks[0].1), (false, 65_535));
    assert_eq!((blocks[1].0, blocks[1].1), (true, 1));
}

#[test]
fn output_is_deterministic() {
    let config = EncoderConfig::from_channels(64, 48, 4).unwrap();
    let pixels = gradient(64, 48, 4);
    let first = PngEncoder::new().encode(&config, &pixels).unwrap();
    let second = PngEncoder::default().encode(&config, &pixels).unwrap();
    assert_eq!(first, second);
}

#[test]
fn one_encoder_shared_between_threads() {
    let encoder = PngEncoder::new();
    let config = EncoderConfig::from_channels(97, 53, 3).unwrap();
    let pixels = gradient(97, 53, 3);
    let expected = encoder.encode(&config, &pixels).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| encoder.encode(&config, &pixels).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn invalid_input_is_rejected() {
    assert_eq!(
        EncoderConfig::from_channels(0, 10, 4).unwrap_err(),
        EncodeError::InvalidDimensions {
            width: 0,
            height: 10
        }
    );

    let err = EncoderConfig::from_channels(10, 10, 2).unwrap_err();
    assert_eq!(err, EncodeError::InvalidChannelCount(2));
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

    let config = EncoderConfig::from_channels(10, 10, 3).unwrap();
    let err = PngEncoder::new().encode(&config, &[0; 299]).unwrap_err();
    assert_eq!(
        err,
        EncodeError::BufferLengthMismatch {
            expected: 300,
            actual: 299
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
}
