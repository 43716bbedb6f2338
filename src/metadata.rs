//! # Metadata Resolution Module
//!
//! Questo modulo decide quale timestamp di scatto incorporare nell'output.
//!
//! ## Priorità di risoluzione:
//! 1. **Embedded**: tag 306 già presente nell'immagine sorgente (autorevole,
//!    il sidecar non viene nemmeno letto)
//! 2. **Sidecar**: `<path-immagine>.json` con `creationTime.timestamp`
//!    (epoch in secondi, UTC), aggiunto ai tag della sorgente
//! 3. **Missing**: nessun timestamp; i tag della sorgente restano invariati e
//!    il chiamante conta il file
//!
//! In tutti e tre i casi il tag set parte da quello letto dalla sorgente:
//! Make, Orientation, GPS e gli altri tag non vengono persi.
//!
//! ## Errori:
//! - Sidecar assente → warning, si passa al punto 3
//! - Sidecar malformato / campo mancante → errore fatale della run
//!
//! I timestamp ricavati dal nome del file non sono gestiti.

use crate::error::{CompressError, Result};
use crate::image_processor::ImageCodec;
use crate::optimizer::path_resolver::PathResolver;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

/// EXIF tag id holding the capture date/time
pub const CAPTURE_TIMESTAMP_TAG: u16 = 306;

/// Layout of an embedded capture timestamp
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Embedded metadata tag set.
///
/// Entries are the ASCII values of the primary image IFD, keyed by numeric
/// tag id. A set read from an image also keeps the raw EXIF payload. While
/// unmodified it is written back byte for byte; after a `set` the codec
/// re-serializes the payload with the entries overriding its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    entries: BTreeMap<u16, String>,
    raw: Option<Vec<u8>>,
    modified: bool,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag set read from an image, carrying its raw EXIF payload
    pub fn from_embedded(raw: Vec<u8>, entries: BTreeMap<u16, String>) -> Self {
        Self {
            entries,
            raw: Some(raw),
            modified: false,
        }
    }

    pub fn get(&self, tag: u16) -> Option<&str> {
        self.entries.get(&tag).map(String::as_str)
    }

    pub fn set(&mut self, tag: u16, value: impl Into<String>) {
        self.modified = true;
        self.entries.insert(tag, value.into());
    }

    /// True when there is nothing to embed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.raw.as_ref().map_or(true, |r| r.is_empty())
    }

    /// Raw EXIF payload the set was read from
    pub fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// True once any entry was set after reading
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    /// Capture timestamp, if present and not blank
    pub fn capture_timestamp(&self) -> Option<&str> {
        self.get(CAPTURE_TIMESTAMP_TAG)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Where the embedded timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    Embedded,
    Sidecar,
    Missing,
}

/// Tag set ready to be embedded, plus how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub tags: TagSet,
    pub source: MetadataSource,
}

#[derive(Debug, Deserialize)]
struct Sidecar {
    #[serde(rename = "creationTime")]
    creation_time: CreationTime,
}

#[derive(Debug, Deserialize)]
struct CreationTime {
    timestamp: EpochSeconds,
}

/// Photo exports write the epoch as an integer, a float or a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Number(i64),
    Float(f64),
    Text(String),
}

impl EpochSeconds {
    /// Whole seconds; fractional values are truncated toward zero
    fn whole_seconds(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for EpochSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Format epoch seconds as an EXIF date/time in UTC.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn format_capture_timestamp(epoch_seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.format(EXIF_DATETIME_FORMAT).to_string())
}

/// Resolves the capture timestamp for a source image
pub struct MetadataResolver;

impl MetadataResolver {
    /// Resolve the tag set to embed for `source`.
    ///
    /// Never fails for missing metadata; fails only on unreadable images or
    /// malformed sidecars.
    pub fn resolve<C: ImageCodec + ?Sized>(codec: &C, source: &Path) -> Result<ResolvedMetadata> {
        let mut tags = codec.read_tags(source)?;
        if tags.capture_timestamp().is_some() {
            debug!("Using embedded capture timestamp for {}", source.display());
            return Ok(ResolvedMetadata {
                tags,
                source: MetadataSource::Embedded,
            });
        }

        if let Some(timestamp) = Self::sidecar_timestamp(source)? {
            tags.set(CAPTURE_TIMESTAMP_TAG, timestamp);
            return Ok(ResolvedMetadata {
                tags,
                source: MetadataSource::Sidecar,
            });
        }

        // TODO: filename-based fallbacks (SIGNAL-*/IMG-* date names) once their formats are pinned down
        error!("No capture timestamp for {}, writing without one", source.display());
        Ok(ResolvedMetadata {
            tags,
            source: MetadataSource::Missing,
        })
    }

    /// Read `<source>.json` and format its capture timestamp.
    ///
    /// `Ok(None)` when the sidecar does not exist.
    pub fn sidecar_timestamp(source: &Path) -> Result<Option<String>> {
        let sidecar_path = PathResolver::sidecar_path(source);
        if !sidecar_path.is_file() {
            warn!("{} does not exist", sidecar_path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&sidecar_path)?;
        let sidecar: Sidecar =
            serde_json::from_str(&content).map_err(|e| CompressError::Sidecar {
                path: sidecar_path.clone(),
                source: e,
            })?;

        let timestamp = sidecar.creation_time.timestamp;
        let formatted = timestamp
            .whole_seconds()
            .and_then(format_capture_timestamp)
            .ok_or_else(|| CompressError::Timestamp {
                path: sidecar_path.clone(),
                value: timestamp.to_string(),
            })?;

        debug!("Capture timestamp {} from {}", formatted, sidecar_path.display());
        Ok(Some(formatted))
    }
}
