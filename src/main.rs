//! # Photo Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio del compressore
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (root, qualità JPEG, verbose)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` ha la precedenza)
//! 3. Crea un oggetto Config con tutti i parametri
//! 4. Istanzia PhotoCompressor con il codec di produzione e avvia la run
//!
//! ## Esempio di utilizzo:
//! ```bash
//! photo-compressor ~/Takeout/Photos --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use photo_compressor::config::{DEFAULT_JPEG_QUALITY, DEFAULT_ROOT};
use photo_compressor::{Config, ImageProcessor, PhotoCompressor};

#[derive(Parser)]
#[command(name = "photo-compressor")]
#[command(about = "Compress photos into sibling .compressed folders, keeping capture timestamps")]
struct Args {
    /// Directory containing the photos to compress
    #[arg(default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// JPEG encoder quality (1-100)
    #[arg(short = 'q', long, default_value_t = DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Verbose logging (per-file shrink percentages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config {
        root: args.root,
        jpeg_quality: args.jpeg_quality,
        verbose: args.verbose,
    };

    let codec = ImageProcessor::new(config.jpeg_quality);
    PhotoCompressor::new(config, codec)?.run()?;

    Ok(())
}
