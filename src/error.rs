//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare gli errori fatali della run
//! - Fornisce messaggi di errore descrittivi con il path coinvolto
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non leggibili, directory non creabili, etc.)
//! - `Image`: Decode/encode falliti (file corrotti, formati non supportati)
//! - `Exif`: Blocco EXIF illeggibile o non serializzabile
//! - `Png`: Ottimizzazione PNG fallita
//! - `Sidecar`: File JSON sidecar malformato o con shape inattesa
//! - `Timestamp`: Timestamp del sidecar non convertibile
//! - `UnsupportedFormat`: Estensione non gestita dal codec
//! - `Metadata`: Blocco metadata non incorporabile nell'output
//! - `Validation`: Configurazione non valida
//!
//! Metadata mancanti e sidecar assenti NON sono errori: vengono loggati e
//! contati nel `RunSummary`.

use std::path::PathBuf;

/// Errors that abort a compression run
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF error in {path}: {source}")]
    Exif {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },

    #[error("PNG optimization failed for {path}: {message}")]
    Png { path: PathBuf, message: String },

    #[error("Malformed sidecar {path}: {source}")]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid capture timestamp {value:?} in {path}")]
    Timestamp { path: PathBuf, value: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Metadata embedding error: {0}")]
    Metadata(String),

    #[error("Configuration error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CompressError>;
