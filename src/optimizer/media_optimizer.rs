//! # Photo Compressor Main Orchestrator
//!
//! Orchestratore principale che delega responsabilità ai moduli specializzati.
//!
//! ## Flusso di esecuzione:
//! 1. **Discovery**: trova le immagini sotto la root (esclusi i `.compressed`)
//! 2. **Preparazione**: crea le directory `.compressed` di destinazione
//! 3. **Processing sequenziale**: per ogni file `TaskOptimizer::process`
//! 4. **Statistics**: aggrega i `FileOutcome` in un `RunSummary`
//! 5. **Reporting**: conteggio finale delle immagini senza timestamp
//!
//! Il primo errore interrompe la run; i file già scritti restano su disco.

use crate::{
    config::Config,
    file_manager::FileManager,
    image_processor::ImageCodec,
    optimizer::task_optimizer::TaskOptimizer,
    progress::{ProgressManager, RunSummary},
};
use anyhow::{Context, Result};
use tracing::info;

/// Orchestratore principale, generico sul codec
pub struct PhotoCompressor<C: ImageCodec> {
    config: Config,
    codec: C,
}

impl<C: ImageCodec> PhotoCompressor<C> {
    /// Crea nuova istanza del compressore
    pub fn new(config: Config, codec: C) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, codec })
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Run the whole pipeline once over `config.root`
    pub fn run(&self) -> Result<RunSummary> {
        let root = &self.config.root;
        info!("Starting photo compression in: {}", root.display());

        let images = FileManager::find_images(root);
        FileManager::prepare_destinations(&images)
            .context("Failed to create destination directories")?;
        info!("Found {} images to compress", images.len());

        let progress = if self.config.verbose {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(images.len() as u64)
        };

        let task = TaskOptimizer::new(&self.codec);
        let mut summary = RunSummary::new();
        for image in &images {
            let outcome = task
                .process(image)
                .with_context(|| format!("Failed to compress {}", image.display()))?;
            summary.record(&outcome);

            let name = image.file_name().unwrap_or(image.as_os_str()).to_string_lossy();
            progress.update(&name);
        }

        progress.finish(&summary.format_summary());
        info!("Images without capture timestamp: {}", summary.metadata_missing);
        info!("{}", summary.format_summary());

        Ok(summary)
    }
}
