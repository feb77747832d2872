//! vgmstream command line interface
//!
//! Prints stream information or renders a stream, loops and fade included, to WAV.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use vgmstream_rs::encoder::{Encoder, WavEncoder};
use vgmstream_rs::filter::{Fade, Filter};
use vgmstream_rs::{AudioFrame, PlaybackConfig, VgmStream};

/// Frames rendered per call
const RENDER_FRAMES: usize = 0x8000;

#[derive(Parser)]
#[command(name = "vgmstream")]
#[command(about = "Decoder for streamed game audio formats", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print what the stream is and how it loops
    Info {
        /// Input stream
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Render a stream to 16-bit WAV
    Decode {
        /// Input stream
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Times to play the loop
        #[arg(short, long, default_value = "2")]
        loops: f64,

        /// Fade-out length in seconds
        #[arg(short, long, default_value = "10")]
        fade: f64,

        /// Seconds played past the last loop before the fade
        #[arg(short = 'd', long, default_value = "0")]
        fade_delay: f64,

        /// Play the stream once and ignore its loop
        #[arg(short, long)]
        ignore_loop: bool,
    },
}

fn decode(input: PathBuf, output: PathBuf, config: PlaybackConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let mut vgm = VgmStream::open(&input)?;
    if config.ignore_loop {
        vgm.disable_loop();
    }
    let total = vgm.play_samples_with(&config);
    let channels = vgm.channels();
    let sample_rate = vgm.sample_rate;

    info!("Rendering {} samples of {:?} to {:?}", total, input, output);

    let mut fade = if vgm.loop_flag {
        Some(Fade::ending_at(total as u64, config.fade_seconds, sample_rate)?)
    } else {
        None
    };
    let mut encoder = WavEncoder::new(&output, sample_rate, channels)?;
    let mut buffer = vec![0i16; RENDER_FRAMES * channels];
    let mut rendered = 0;

    while rendered < total {
        let frames = RENDER_FRAMES.min(total - rendered);
        let done = vgm.render(&mut buffer[..frames * channels])?;
        if done == 0 {
            warn!("Stream ended at sample {} of {}", rendered, total);
            break;
        }

        let mut frame = AudioFrame::new(buffer[..done * channels].to_vec(), sample_rate, channels, rendered as u64)?;
        if let Some(fade) = fade.as_mut() {
            frame = fade.process(&frame)?;
        }
        encoder.encode(&frame)?;
        rendered += done;
    }

    encoder.finalize()?;
    vgm.close();
    info!("Wrote {} samples per channel", rendered);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    info!("vgmstream-rs {}", vgmstream_rs::VERSION);

    match cli.command {
        Commands::Info { input } => {
            let vgm = VgmStream::open(&input)?;
            println!("{}", vgm.describe());
            vgm.close();
        }
        Commands::Decode {
            input,
            output,
            loops,
            fade,
            fade_delay,
            ignore_loop,
        } => {
            let config = PlaybackConfig::new()
                .with_loop_count(loops)
                .with_fade_seconds(fade)
                .with_fade_delay_seconds(fade_delay)
                .with_ignore_loop(ignore_loop);
            decode(input, output, config)?;
        }
    }

    Ok(())
}
