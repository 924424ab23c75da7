use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use overlay_compositor::{composition::OverlayEngine, config::Config};

#[derive(Parser)]
#[command(
    name = "overlay-compositor",
    version,
    about = "Burn a still image into the lower half of a video",
    long_about = "Overlay-Compositor copies a source video into a fresh composition, burns a still image into the lower half of every frame (correcting one stored-orientation case), and exports the result as a single container file."
)]
struct Cli {
    /// Overlay image file (PNG, JPEG)
    #[arg(short, long)]
    image: PathBuf,

    /// Source video file (must contain a video and an audio track)
    #[arg(short = 's', long)]
    video: PathBuf,

    /// Output video file path (must not already exist)
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Overlay-Compositor v{}", env!("CARGO_PKG_VERSION"));
    info!("Image: {:?}", cli.image);
    info!("Video: {:?}", cli.video);
    info!("Output: {:?}", cli.output);

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    let image_bytes = std::fs::read(&cli.image)
        .map_err(|e| anyhow::anyhow!("Cannot read overlay image {:?}: {}", cli.image, e))?;

    let engine = OverlayEngine::new(config);
    let output = engine.export(&image_bytes, &cli.video, &cli.output).await?;

    info!("Export complete! Output saved to: {:?}", output);
    Ok(())
}
