use clap::Parser;
use std::{error::Error, io, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parallax_scroll::config::{self, OutputFormat, Settings};
use parallax_scroll::display::{ImageWriter, JsonWriter, RenderDevice, SvgWriter};
use parallax_scroll::parallax::{self, ParallaxScene};

#[derive(Parser)]
#[command(name = "parallax-scroll")]
#[command(version, about = "Render scroll-driven parallax frames")]
struct Cli {
    /// Settings file (defaults to resources/Settings.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the container height
    #[arg(long)]
    container_height: Option<f64>,

    /// Number of evenly spaced offsets to render
    #[arg(short, long)]
    frames: Option<u32>,

    /// Explicit scroll offsets, replaces the sweep
    #[arg(long = "offset", allow_negative_numbers = true)]
    offsets: Vec<f64>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output directory for svg and png frames
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        // Keep stdout free for json frames
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    // Read once, every notification maps against the same height
    let scene = ParallaxScene::new(settings.container_height, settings.motion);

    let offsets = if cli.offsets.is_empty() {
        parallax::sweep(scene.container_height(), settings.frames)
    } else {
        cli.offsets.clone()
    };

    info!(
        container_height = scene.container_height(),
        frames = offsets.len(),
        format = ?settings.output.format,
        "rendering parallax frames"
    );

    let mut render_device = init_render_device(&settings)?;

    for (index, offset) in offsets.into_iter().enumerate() {
        let frame = scene.frame(offset);
        render_device.render(index, &frame)?;
    }

    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings: Settings = match &cli.config {
        Some(path) => config::load_config(&path.to_string_lossy())?,
        None => match config::load_config(config::DEFAULT_SETTINGS_PATH) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not load default settings, using built-in values. Err {}", e);
                Settings::default()
            }
        },
    };

    if let Some(height) = cli.container_height {
        settings.container_height = height;
    }
    if let Some(frames) = cli.frames {
        settings.frames = frames;
    }
    if let Some(format) = cli.format {
        settings.output.format = format;
    }
    if let Some(out) = &cli.out {
        settings.output.directory = out.clone();
    }

    Ok(settings)
}

fn init_render_device(settings: &Settings) -> Result<Box<dyn RenderDevice>, Box<dyn Error>> {
    let directory = settings.output.directory.clone();
    let geometry = settings.scene.clone();

    let device: Box<dyn RenderDevice> = match settings.output.format {
        OutputFormat::Svg => Box::new(SvgWriter::new(directory, geometry)?),
        OutputFormat::Png => Box::new(ImageWriter::new(directory, geometry)?),
        OutputFormat::Json => Box::new(JsonWriter::new(io::stdout())),
    };

    Ok(device)
}
