//! # File Management Module
//!
//! Questo modulo gestisce la discovery delle immagini e le operazioni sui file.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva delle immagini sotto la directory root
//! - Esclusione dell'output di run precedenti (directory `.compressed`)
//! - Creazione eager delle directory di destinazione
//! - Utilità per dimensioni, percentuali e copie verbatim
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG (estensione case-insensitive)
//!
//! ## Esempio:
//! ```ignore
//! let images = FileManager::find_images(Path::new("/photos"));
//! FileManager::prepare_destinations(&images)?;
//! ```

use crate::error::Result;
use crate::optimizer::path_resolver::{PathResolver, COMPRESSED_MARKER};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extensions accepted as compression candidates, compared lowercase
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all images under `root` that are eligible for compression.
    ///
    /// A root that does not exist yields an empty list. Paths containing the
    /// compressed-output marker are never returned.
    pub fn find_images(root: &Path) -> Vec<PathBuf> {
        let images: Vec<PathBuf> = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::is_supported_image(path))
            .filter(|path| !Self::is_compressed_output(path))
            .collect();

        debug!("Found {} candidate images under {}", images.len(), root.display());
        images
    }

    /// Create the `.compressed` sibling directory for every candidate.
    pub fn prepare_destinations(images: &[PathBuf]) -> Result<()> {
        for image in images {
            let dir = PathResolver::destination_dir(image);
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Check if a file has a supported image extension (any case)
    pub fn is_supported_image(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Check if a path lies inside (or names) compressed output
    pub fn is_compressed_output(path: &Path) -> bool {
        path.to_string_lossy().contains(COMPRESSED_MARKER)
    }

    /// Size of a file in bytes
    pub fn file_size(path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    /// Overwrite `destination` with a byte-for-byte copy of `source`
    pub fn copy_verbatim(source: &Path, destination: &Path) -> Result<()> {
        fs::copy(source, destination)?;
        Ok(())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction; negative when the file grew
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) * 100.0) / original_size as f64
        }
    }
}
