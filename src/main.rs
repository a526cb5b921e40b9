//! # Media Budget Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio del batch
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, output, budget, fps, workers)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che la directory di input esista
//! 4. Crea un oggetto Config e avvia il dispatcher
//!
//! Il processo termina con successo anche se alcuni file falliscono: ogni
//! errore viene solo stampato.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-converter img -o converted_img --image-size-kb 50 --video-size-kb 500
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use media_budget_converter::{convert_all, Config};

#[derive(Parser)]
#[command(name = "media-converter")]
#[command(about = "Convert images to WebP and videos to GIF within a size budget")]
struct Args {
    /// Directory containing media files to convert
    #[arg(default_value = "img")]
    input: PathBuf,

    /// Output directory, mirrors the input tree
    #[arg(short, long, default_value = "converted_img")]
    output: PathBuf,

    /// Maximum size of each WebP in KB
    #[arg(long, default_value = "100")]
    image_size_kb: u64,

    /// Maximum size of each GIF in KB
    #[arg(long, default_value = "1000")]
    video_size_kb: u64,

    /// Starting frame rate of the GIFs
    #[arg(long, default_value = "10")]
    fps: f64,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging, RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.input.is_dir() {
        return Err(anyhow::anyhow!("Input directory does not exist: {}", args.input.display()));
    }

    let defaults = Config::default();
    let config = Config {
        input_path: args.input,
        output_path: args.output,
        image_size_kb: args.image_size_kb,
        video_size_kb: args.video_size_kb,
        workers: args.workers.unwrap_or(defaults.workers),
        video_fps: args.fps,
        show_progress: !args.no_progress,
        ..defaults
    };
    debug!("Configuration: {}", serde_json::to_string(&config)?);

    convert_all(config).await?;

    Ok(())
}
