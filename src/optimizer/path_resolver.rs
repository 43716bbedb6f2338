//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output.
//! `<dir>/<name>` viene scritto in `<dir>.compressed/<name>`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Substring identifying compressed output anywhere in a path
pub const COMPRESSED_MARKER: &str = ".compressed";

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Sibling directory receiving the output for `source`'s parent
    pub fn destination_dir(source: &Path) -> PathBuf {
        let parent = match source.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut dir = OsString::from(parent.as_os_str());
        dir.push(COMPRESSED_MARKER);
        PathBuf::from(dir)
    }

    /// Destination of the compressed copy of `source`
    pub fn destination_path(source: &Path) -> PathBuf {
        let dir = Self::destination_dir(source);
        match source.file_name() {
            Some(name) => dir.join(name),
            None => dir,
        }
    }

    /// Sidecar JSON path for `source`: the full file name plus `.json`
    pub fn sidecar_path(source: &Path) -> PathBuf {
        let mut path = OsString::from(source.as_os_str());
        path.push(".json");
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_path() {
        let dest = PathResolver::destination_path(Path::new("/photos/2023/trip/IMG_1.JPG"));
        assert_eq!(dest, PathBuf::from("/photos/2023/trip.compressed/IMG_1.JPG"));
    }

    #[test]
    fn test_destination_path_is_deterministic() {
        let source = Path::new("export/album/photo.png");
        assert_eq!(
            PathResolver::destination_path(source),
            PathResolver::destination_path(source)
        );
    }

    #[test]
    fn test_destination_for_bare_file_name() {
        assert_eq!(
            PathResolver::destination_path(Path::new("photo.jpg")),
            PathBuf::from("..compressed/photo.jpg")
        );
    }

    #[test]
    fn test_sidecar_path_keeps_extension() {
        assert_eq!(
            PathResolver::sidecar_path(Path::new("/a/photo.JPG")),
            PathBuf::from("/a/photo.JPG.json")
        );
    }
}
