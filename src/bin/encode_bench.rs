use std::{fs, path::PathBuf, time::Instant};

use anyhow::Context;
use clap::Parser;
use log::info;
use miniz_oxide::deflate::compress_to_vec_zlib;
use stored_png::{filters::filter_scanlines, EncoderConfig, PngEncoder};

const SIZES: [(u32, u32); 4] = [(64, 64), (256, 256), (1024, 1024), (4096, 2048)];
const ZLIB_LEVELS: [u8; 2] = [1, 6];

/// Compare stored-block encoding with zlib compression on synthetic images.
#[derive(Parser)]
struct Args {
    /// Directory the results.json report is written to
    #[arg(short, long, default_value = "benchmark")]
    output: PathBuf,
    #[arg(short, long)]
    verbose: bool,
}

fn synthetic_image(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 255]);
        }
    }
    pixels
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let verbosity = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Error
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    let encoder = PngEncoder::new();
    let mut results = Vec::with_capacity(SIZES.len());
    for (width, height) in SIZES {
        let config = EncoderConfig::from_channels(width, height, 4)?;
        let pixels = synthetic_image(width, height);

        let start = Instant::now();
        let png = encoder.encode(&config, &pixels)?;
        let stored_micros = start.elapsed().as_micros();

        let filtered = filter_scanlines(&pixels, &config)?;
        let mut zlib = Vec::with_capacity(ZLIB_LEVELS.len());
        for level in ZLIB_LEVELS {
            let start = Instant::now();
            let compressed = compress_to_vec_zlib(&filtered, level);
            zlib.push(serde_json::json!({
                "level": level,
                "bytes": compressed.len(),
                "micros": start.elapsed().as_micros() as u64,
            }));
        }
        info!("{width}x{height}: {} bytes in {stored_micros}us", png.len());
        results.push(serde_json::json!({
            "width": width,
            "height": height,
            "pixel_bytes": pixels.len(),
            "stored": { "bytes": png.len(), "micros": stored_micros as u64 },
            "zlib": zlib,
        }));
    }

    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    let report = serde_json::json!({
        "date": now,
        "results": results,
    });
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    fs::write(args.output.join("results.json"), report.to_string())?;
    Ok(())
}
