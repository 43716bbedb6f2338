//! # Regression Guard
//!
//! Dopo la compressione confronta le dimensioni: se l'output è più grande
//! della sorgente lo sostituisce con una copia verbatim e ricalcola la
//! percentuale. Un pareggio (0%) viene accettato così com'è.

use crate::error::Result;
use crate::file_manager::FileManager;
use std::path::Path;
use tracing::debug;

/// Sizes observed after the guard ran
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardReport {
    pub original_size: u64,
    pub final_size: u64,
    /// Shrink percentage of the file left at the destination; never negative
    pub shrink_percent: f64,
    /// True when the optimized output was replaced by a copy of the source
    pub reverted: bool,
}

pub struct RegressionGuard;

impl RegressionGuard {
    /// Ensure `destination` is not larger than `source`.
    pub fn enforce(source: &Path, destination: &Path) -> Result<GuardReport> {
        let original_size = FileManager::file_size(source)?;
        let optimized_size = FileManager::file_size(destination)?;
        let shrink_percent = FileManager::calculate_reduction(original_size, optimized_size);

        if shrink_percent >= 0.0 {
            return Ok(GuardReport {
                original_size,
                final_size: optimized_size,
                shrink_percent,
                reverted: false,
            });
        }

        debug!(
            "Optimized {} grew from {} to {}, keeping the original",
            source.display(),
            FileManager::format_size(original_size),
            FileManager::format_size(optimized_size)
        );
        FileManager::copy_verbatim(source, destination)?;

        let final_size = FileManager::file_size(destination)?;
        Ok(GuardReport {
            original_size,
            final_size,
            shrink_percent: FileManager::calculate_reduction(original_size, final_size),
            reverted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pair(src: &[u8], dst: &[u8]) -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.png");
        let destination = tmp.path().join("out.png");
        fs::write(&source, src).unwrap();
        fs::write(&destination, dst).unwrap();
        (tmp, source, destination)
    }

    #[test]
    fn test_smaller_output_is_kept() {
        let (_tmp, source, destination) = pair(&[1; 200], &[2; 50]);

        let report = RegressionGuard::enforce(&source, &destination).unwrap();
        assert!(!report.reverted);
        assert_eq!(report.shrink_percent, 75.0);
        assert_eq!(report.final_size, 50);
        assert_eq!(fs::read(&destination).unwrap(), vec![2; 50]);
    }

    #[test]
    fn test_larger_output_is_replaced_by_source() {
        let (_tmp, source, destination) = pair(b"small original", &[9; 500]);

        let report = RegressionGuard::enforce(&source, &destination).unwrap();
        assert!(report.reverted);
        assert_eq!(report.shrink_percent, 0.0);
        assert_eq!(report.original_size, report.final_size);
        assert_eq!(fs::read(&destination).unwrap(), fs::read(&source).unwrap());
    }

    #[test]
    fn test_tie_is_accepted() {
        let (_tmp, source, destination) = pair(&[1; 100], &[2; 100]);

        let report = RegressionGuard::enforce(&source, &destination).unwrap();
        assert!(!report.reverted);
        assert_eq!(report.shrink_percent, 0.0);
        assert_eq!(fs::read(&destination).unwrap(), vec![2; 100]);
    }

    #[test]
    fn test_missing_destination_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.png");
        fs::write(&source, b"abc").unwrap();

        assert!(RegressionGuard::enforce(&source, &tmp.path().join("missing.png")).is_err());
    }
}
