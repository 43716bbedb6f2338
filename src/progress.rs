//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche della run.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar con `indicatif`
//! - `RunSummary`: Statistiche aggregate dai `FileOutcome`
//!
//! ## Statistiche tracciate:
//! - **files_processed**: File compressi (o copiati) nella destinazione
//! - **files_reverted**: File il cui output era più grande e che sono stati copiati verbatim
//! - **metadata_missing**: Immagini scritte senza timestamp di scatto
//! - **total_original_size**: Byte totali delle sorgenti
//! - **total_bytes_saved**: Byte risparmiati
//!
//! ## Esempio:
//! ```ignore
//! let progress = ProgressManager::new(total_files);
//! let mut summary = RunSummary::new();
//!
//! summary.record(&outcome);
//! progress.update("photo.jpg");
//!
//! progress.finish(&summary.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::optimizer::task_optimizer::FileOutcome;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages progress reporting for a compression run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        Self { bar }
    }

    /// Progress manager that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics aggregated over one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_reverted: usize,
    pub metadata_missing: usize,
    pub total_original_size: u64,
    pub total_bytes_saved: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_processed += 1;
        if outcome.reverted {
            self.files_reverted += 1;
        }
        if !outcome.metadata_resolved() {
            self.metadata_missing += 1;
        }
        self.total_original_size += outcome.original_size;
        self.total_bytes_saved += outcome.original_size.saturating_sub(outcome.final_size);
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Kept original: {} | Without timestamp: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_reverted,
            self.metadata_missing,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataSource;
    use std::path::PathBuf;

    fn outcome(original: u64, last: u64, reverted: bool, source: MetadataSource) -> FileOutcome {
        FileOutcome {
            source: PathBuf::from("a/x.jpg"),
            destination: PathBuf::from("a.compressed/x.jpg"),
            original_size: original,
            final_size: last,
            shrink_percent: FileManager::calculate_reduction(original, last),
            reverted,
            metadata_source: source,
        }
    }

    #[test]
    fn test_record_counts_missing_metadata_once_per_file() {
        let mut summary = RunSummary::new();
        summary.record(&outcome(100, 50, false, MetadataSource::Sidecar));
        summary.record(&outcome(100, 100, true, MetadataSource::Missing));
        summary.record(&outcome(200, 150, false, MetadataSource::Embedded));

        assert_eq!(summary.files_processed, 3);
        assert_eq!(summary.files_reverted, 1);
        assert_eq!(summary.metadata_missing, 1);
        assert_eq!(summary.total_original_size, 400);
        assert_eq!(summary.total_bytes_saved, 100);
        assert_eq!(summary.overall_reduction_percent(), 25.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::new();
        assert_eq!(summary.overall_reduction_percent(), 0.0);
        assert!(summary.format_summary().starts_with("Processed: 0 files"));
    }
}
