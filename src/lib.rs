//! # Photo Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `file_manager`: Discovery immagini e operazioni sui file
//! - `metadata`: Risoluzione del timestamp di scatto (EXIF → sidecar JSON → nessuno)
//! - `image_processor`: Trait `ImageCodec` e codec di produzione (JPEG/PNG)
//! - `optimizer`: Orchestratore, worker per file, regression guard, path
//! - `progress`: Progress bar e statistiche della run
//!
//! ## Utilizzo:
//! ```ignore
//! use photo_compressor::{Config, ImageProcessor, PhotoCompressor};
//!
//! let config = Config::default();
//! let codec = ImageProcessor::new(config.jpeg_quality);
//! let summary = PhotoCompressor::new(config, codec)?.run()?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod metadata;
pub mod optimizer;
pub mod progress;

#[cfg(test)]
mod test_helpers;

pub use config::Config;
pub use error::CompressError;
pub use image_processor::{ImageCodec, ImageKind, ImageProcessor};
pub use metadata::{MetadataResolver, MetadataSource, ResolvedMetadata, TagSet};
pub use optimizer::{FileOutcome, PhotoCompressor};
pub use progress::RunSummary;
