//! # Task Optimizer Module
//!
//! Worker per la compressione di un singolo file:
//! risoluzione metadata → compressione → regression guard.
//! Il risultato è un `FileOutcome` che il chiamante aggrega; nessuno stato
//! condiviso tra un file e l'altro.

use crate::{
    error::{CompressError, Result},
    image_processor::{ImageCodec, ImageKind},
    metadata::{MetadataResolver, MetadataSource, ResolvedMetadata},
    optimizer::{path_resolver::PathResolver, regression_guard::RegressionGuard},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of processing one source image
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub original_size: u64,
    pub final_size: u64,
    pub shrink_percent: f64,
    pub reverted: bool,
    pub metadata_source: MetadataSource,
}

impl FileOutcome {
    pub fn metadata_resolved(&self) -> bool {
        self.metadata_source != MetadataSource::Missing
    }
}

/// Worker per elaborazione singoli file
pub struct TaskOptimizer<'a, C: ImageCodec> {
    codec: &'a C,
}

impl<'a, C: ImageCodec> TaskOptimizer<'a, C> {
    pub fn new(codec: &'a C) -> Self {
        Self { codec }
    }

    /// Processa un singolo file
    pub fn process(&self, source: &Path) -> Result<FileOutcome> {
        let destination = PathResolver::destination_path(source);
        let metadata = MetadataResolver::resolve(self.codec, source)?;

        self.compress(source, &destination, &metadata)?;
        let report = RegressionGuard::enforce(source, &destination)?;

        let name = source.file_name().unwrap_or(source.as_os_str()).to_string_lossy();
        debug!("[{:05.2}] {}", report.shrink_percent, name);

        Ok(FileOutcome {
            source: source.to_path_buf(),
            destination,
            original_size: report.original_size,
            final_size: report.final_size,
            shrink_percent: report.shrink_percent,
            reverted: report.reverted,
            metadata_source: metadata.source,
        })
    }

    /// Decode `source` and write its optimized encoding to `destination`.
    pub fn compress(
        &self,
        source: &Path,
        destination: &Path,
        metadata: &ResolvedMetadata,
    ) -> Result<()> {
        let kind = ImageKind::from_path(source)
            .ok_or_else(|| CompressError::UnsupportedFormat(source.to_path_buf()))?;
        let image = self.codec.decode(source)?;
        self.codec
            .encode_optimized(&image, kind, &metadata.tags, destination)
    }
}
