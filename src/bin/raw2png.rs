use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use stored_png::{EncoderConfig, PngEncoder};

/// Write raw RGB/RGBA pixel dumps as uncompressed PNG files.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a file of row-major, channel-interleaved 8-bit samples
    Encode {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// 3 for RGB, 4 for RGBA
        #[arg(long, default_value_t = 4)]
        channels: u8,
        input: PathBuf,
        /// Defaults to the input path with a .png extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the chunks and stored blocks of a PNG written by this tool
    Inspect { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Error
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    let encoder = PngEncoder::new();
    match cli.command {
        Command::Encode {
            width,
            height,
            channels,
            input,
            output,
        } => {
            let config = EncoderConfig::from_channels(width, height, channels)?;
            let pixels = fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let png = encoder
                .encode(&config, &pixels)
                .with_context(|| format!("Failed to encode {}", input.display()))?;
            let output = output.unwrap_or_else(|| input.with_extension("png"));
            fs::write(&output, &png)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("wrote {} bytes to {}", png.len(), output.display());
        }
        Command::Inspect { file } => {
            let bytes =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let summary = stored_png::inspect(&bytes, encoder.crc_table())
                .with_context(|| format!("Failed to inspect {}", file.display()))?;
            println!("{summary}");
        }
    }
    Ok(())
}
