//! Aeolus CLI - interactive demo, offline render, device listing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use aeolus::config::Config;
use aeolus::engine::{list_output_devices, AudioEngine, EngineSettings};
use aeolus::feedback::FeedbackMode;
use aeolus::mixer::Mixer;
use aeolus::monitor::Monitor;
use aeolus::relay::Relay;
use aeolus::samples::SampleBank;
use aeolus::version::long_version;

#[derive(Parser)]
#[command(name = "aeolus")]
#[command(about = "Interactive audio feedback demo", version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive dashboard demo
    Run {
        /// UDP port for the OSC relay (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Output device name (overrides config; see `aeolus devices`)
        #[arg(short, long)]
        device: Option<String>,

        /// Feedback mode at boot: none or wind (overrides config)
        #[arg(short, long)]
        audio: Option<FeedbackMode>,

        /// Master gain at boot, dB (overrides config)
        #[arg(long)]
        master_db: Option<f32>,

        /// Config file path (default: ./aeolus.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render the feedback graph offline to a WAV file
    Render {
        /// Output WAV file path
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "5.0")]
        duration: f32,

        /// Gesture x position in [0, 1]
        #[arg(short, long, default_value = "0.5")]
        x: f32,

        /// Gesture y position in [0, 1]
        #[arg(short, long, default_value = "0.5")]
        y: f32,

        /// Gesture rate driving the main gain
        #[arg(short, long, default_value = "2.0")]
        rate: f32,

        /// Sample rate in Hz
        #[arg(short, long, default_value = "44100")]
        sample_rate: u32,

        /// Feedback mode: none or wind
        #[arg(short, long, default_value = "wind")]
        mode: FeedbackMode,

        /// Noise seed, for reproducible renders
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List audio output devices
    Devices,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The dashboard owns the terminal, so logging is muted while it runs.
    match &cli.command {
        Commands::Run { .. } => {
            tracing_subscriber::fmt().with_writer(std::io::sink).init();
        }
        _ => tracing_subscriber::fmt::init(),
    }

    match cli.command {
        Commands::Run {
            port,
            device,
            audio,
            master_db,
            config,
        } => run_demo(port, device, audio, master_db, config),
        Commands::Render {
            output,
            duration,
            x,
            y,
            rate,
            sample_rate,
            mode,
            seed,
        } => render_offline(output, duration, x, y, rate, sample_rate, mode, seed),
        Commands::Devices => {
            for name in list_output_devices()? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_demo(
    port: Option<u16>,
    device: Option<String>,
    audio: Option<FeedbackMode>,
    master_db: Option<f32>,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config.as_deref())?;

    let settings = EngineSettings {
        device: device.or(config.device),
        mode: audio.unwrap_or(config.mode),
        master_db: master_db.unwrap_or(config.master_db),
    };
    let engine = AudioEngine::new(&settings)?;
    let relay = Relay::new(port.unwrap_or(config.port))?;
    let mut bank = config.samples_dir.map(SampleBank::new);

    Monitor::new(&engine, &relay, bank.as_mut()).run()
}

#[allow(clippy::too_many_arguments)]
fn render_offline(
    output: PathBuf,
    duration: f32,
    x: f32,
    y: f32,
    rate: f32,
    sample_rate: u32,
    mode: FeedbackMode,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mixer = Mixer::new(sample_rate as f32, mode, aeolus::mixer::DEFAULT_MASTER_DB)?;
    if let Some(seed) = seed {
        mixer.reseed_noise(seed);
    }
    mixer.controls().feedback.set_control(x, y, rate);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&output, spec)?;

    let total = (duration.max(0.0) * sample_rate as f32) as usize;
    let mut block = vec![0.0f32; 512];
    let mut written = 0;
    while written < total {
        let n = block.len().min(total - written);
        let buf = &mut block[..n];
        mixer.render_mono(buf);
        for &s in buf.iter() {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        written += n;
    }
    writer.finalize()?;
    info!("wrote {:.1}s of {} to {}", duration, mode, output.display());
    Ok(())
}
