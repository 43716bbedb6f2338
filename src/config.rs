//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione di una run.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri della run
//! - Fornisce valori di default coerenti con il comportamento storico
//! - Valida i parametri prima dell'avvio della pipeline
//!
//! ## Parametri di configurazione:
//! - `root`: Directory da scansionare (default: `im2`)
//! - `jpeg_quality`: Qualità dell'encoder JPEG in modalità optimize (1-100, default: 75)
//! - `verbose`: Abilita le righe DEBUG con la percentuale per file
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     root: PathBuf::from("/photos/export"),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::{CompressError, Result};
use std::path::PathBuf;

/// Folder scanned when no root is given on the command line
pub const DEFAULT_ROOT: &str = "im2";

/// Encoder quality used by the JPEG optimize mode
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Configuration for a compression run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory searched recursively for images
    pub root: PathBuf,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            verbose: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(CompressError::Validation(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.root.as_os_str().is_empty() {
            return Err(CompressError::Validation(
                "Root directory must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
