//! # Image Processing Module
//!
//! Questo modulo contiene il codec che decodifica, ottimizza e riscrive le
//! immagini, incorporando il tag set EXIF risolto.
//!
//! ## Architettura
//!
//! La pipeline parla solo con il trait [`ImageCodec`]; l'implementazione di
//! produzione è [`ImageProcessor`], tutta in-process:
//!
//! | Formato | Decode  | Encode / Optimize                  | EXIF              |
//! |---------|---------|------------------------------------|-------------------|
//! | JPEG    | `image` | `JpegEncoder` (qualità da config)  | segmento APP1     |
//! | PNG     | `image` | `oxipng` (lossless, preset 2)      | chunk `eXIf`      |
//!
//! La lettura dei tag usa `kamadak-exif`. Un tag set non modificato viene
//! riscritto byte per byte; un tag set costruito o modificato viene
//! serializzato di nuovo con il writer di `kamadak-exif`, riportando i campi
//! dell'IFD principale della sorgente (Orientation, GPS, Exif) accanto ai
//! valori ASCII impostati.
//!
//! ## Error Handling
//!
//! Qualsiasi errore del codec (file corrotto, formato non supportato,
//! scrittura fallita) viene propagato: la run si interrompe.

use crate::error::{CompressError, Result};
use crate::metadata::TagSet;
use exif::{Context, Field, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use oxipng::{BitDepth, ColorType, Options, RawImage};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::debug;

/// Identifier that opens the EXIF payload of a JPEG APP1 segment
const JPEG_EXIF_HEADER: &[u8] = b"Exif\0\0";

/// oxipng optimization level; 2 is its default trade-off
const PNG_OPTIMIZATION_PRESET: u8 = 2;

/// Output encodings the compressor can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Encoding implied by the (case-insensitive) file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// Decode / optimize / encode capability used by the pipeline.
///
/// Tag access on the resulting [`TagSet`] (`get` / `set`) completes the
/// read-tag / write-tag half of the interface.
pub trait ImageCodec {
    type Image;

    /// Decode the image at `path`.
    fn decode(&self, path: &Path) -> Result<Self::Image>;

    /// Read the embedded metadata of the image at `path`; empty if it has none.
    fn read_tags(&self, path: &Path) -> Result<TagSet>;

    /// Encode `image` with size-minimizing settings for `kind`, embed `tags`
    /// and write the result to `destination`, replacing any existing file.
    fn encode_optimized(
        &self,
        image: &Self::Image,
        kind: ImageKind,
        tags: &TagSet,
        destination: &Path,
    ) -> Result<()>;
}

/// Production codec backed by `image`, `oxipng` and `kamadak-exif`
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    jpeg_quality: u8,
}

impl ImageProcessor {
    /// Creates a codec that encodes JPEGs at `jpeg_quality` (1-100).
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    fn encode_jpeg(&self, image: &DynamicImage, exif: Option<&[u8]>) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut encoded, self.jpeg_quality);
        let (width, height) = (image.width(), image.height());

        if has_gray_pixels(image) {
            let gray = image.to_luma8();
            encoder.write_image(gray.as_raw(), width, height, ExtendedColorType::L8)?;
        } else {
            let rgb = image.to_rgb8();
            encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }

        match exif {
            Some(payload) => embed_jpeg_exif(encoded, payload),
            None => Ok(encoded),
        }
    }

    fn encode_png(
        &self,
        image: &DynamicImage,
        exif: Option<Vec<u8>>,
        destination: &Path,
    ) -> Result<Vec<u8>> {
        let png_error = |e: oxipng::PngError| CompressError::Png {
            path: destination.to_path_buf(),
            message: e.to_string(),
        };

        let (color_type, bit_depth, data) = png_pixels(image);
        let mut raw = RawImage::new(image.width(), image.height(), color_type, bit_depth, data)
            .map_err(png_error)?;
        if let Some(payload) = exif {
            raw.add_png_chunk(*b"eXIf", payload);
        }

        raw.create_optimized_png(&Options::from_preset(PNG_OPTIMIZATION_PRESET))
            .map_err(png_error)
    }
}

impl ImageCodec for ImageProcessor {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        debug!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
        Ok(image)
    }

    fn read_tags(&self, path: &Path) -> Result<TagSet> {
        let mut reader = BufReader::new(File::open(path)?);
        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(TagSet::new()),
            Err(e) => {
                return Err(CompressError::Exif {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let mut entries = BTreeMap::new();
        for field in exif
            .fields()
            .filter(|f| f.ifd_num == In::PRIMARY && f.tag.context() == Context::Tiff)
        {
            if let Value::Ascii(ref values) = field.value {
                if let Some(first) = values.first() {
                    let text = String::from_utf8_lossy(first);
                    let text = text.trim_end_matches('\0');
                    if !text.trim().is_empty() {
                        entries.insert(field.tag.number(), text.to_string());
                    }
                }
            }
        }

        Ok(TagSet::from_embedded(exif.buf().to_vec(), entries))
    }

    fn encode_optimized(
        &self,
        image: &DynamicImage,
        kind: ImageKind,
        tags: &TagSet,
        destination: &Path,
    ) -> Result<()> {
        let exif = exif_payload(tags, destination)?;
        let bytes = match kind {
            ImageKind::Jpeg => self.encode_jpeg(image, exif.as_deref())?,
            ImageKind::Png => self.encode_png(image, exif, destination)?,
        };

        fs::write(destination, &bytes)?;
        debug!("Wrote {} ({} bytes)", destination.display(), bytes.len());
        Ok(())
    }
}

fn has_gray_pixels(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
    )
}

/// Pixel layout handed to oxipng; 16-bit samples are big-endian as in PNG
fn png_pixels(image: &DynamicImage) -> (ColorType, BitDepth, Vec<u8>) {
    fn be_bytes(samples: &[u16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_be_bytes()).collect()
    }

    match image {
        DynamicImage::ImageLuma8(buf) => (
            ColorType::Grayscale { transparent_shade: None },
            BitDepth::Eight,
            buf.as_raw().clone(),
        ),
        DynamicImage::ImageLumaA8(buf) => {
            (ColorType::GrayscaleAlpha, BitDepth::Eight, buf.as_raw().clone())
        }
        DynamicImage::ImageRgb8(buf) => (
            ColorType::RGB { transparent_color: None },
            BitDepth::Eight,
            buf.as_raw().clone(),
        ),
        DynamicImage::ImageRgba8(buf) => (ColorType::RGBA, BitDepth::Eight, buf.as_raw().clone()),
        DynamicImage::ImageLuma16(buf) => (
            ColorType::Grayscale { transparent_shade: None },
            BitDepth::Sixteen,
            be_bytes(buf.as_raw()),
        ),
        DynamicImage::ImageLumaA16(buf) => {
            (ColorType::GrayscaleAlpha, BitDepth::Sixteen, be_bytes(buf.as_raw()))
        }
        DynamicImage::ImageRgb16(buf) => (
            ColorType::RGB { transparent_color: None },
            BitDepth::Sixteen,
            be_bytes(buf.as_raw()),
        ),
        DynamicImage::ImageRgba16(buf) => {
            (ColorType::RGBA, BitDepth::Sixteen, be_bytes(buf.as_raw()))
        }
        other => (ColorType::RGBA, BitDepth::Eight, other.to_rgba8().into_raw()),
    }
}

/// TIFF-structured EXIF payload for `tags`, or `None` when there is nothing to embed.
///
/// An unmodified set is written back byte for byte. Otherwise the primary
/// image fields of its raw payload are carried over, with the entries
/// replacing same-numbered TIFF fields. Thumbnail fields are not carried.
fn exif_payload(tags: &TagSet, destination: &Path) -> Result<Option<Vec<u8>>> {
    if tags.is_empty() {
        return Ok(None);
    }
    let exif_error = |e: exif::Error| CompressError::Exif {
        path: destination.to_path_buf(),
        source: e,
    };

    let mut fields = match tags.raw() {
        Some(raw) if !tags.is_modified() => return Ok(Some(raw.to_vec())),
        Some(raw) => carried_fields(raw, tags).map_err(exif_error)?,
        None => Vec::new(),
    };
    fields.extend(tags.iter().map(|(tag, value)| Field {
        tag: Tag(Context::Tiff, tag),
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![value.as_bytes().to_vec()]),
    }));

    let mut writer = exif::experimental::Writer::new();
    for field in &fields {
        writer.push_field(field);
    }

    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).map_err(exif_error)?;
    Ok(Some(buf.into_inner()))
}

/// Fields of `raw` that survive re-serialization of `tags`
fn carried_fields(raw: &[u8], tags: &TagSet) -> std::result::Result<Vec<Field>, exif::Error> {
    let exif = exif::Reader::new().read_raw(raw.to_vec())?;
    Ok(exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY)
        .filter(|f| !matches!(f.value, Value::Unknown(..)))
        .filter(|f| !(f.tag.context() == Context::Tiff && tags.get(f.tag.number()).is_some()))
        .cloned()
        .collect())
}

/// Insert an APP1 EXIF segment after SOI (and after the JFIF APP0 segment, if any).
fn embed_jpeg_exif(jpeg: Vec<u8>, payload: &[u8]) -> Result<Vec<u8>> {
    if jpeg.len() < 4 || jpeg[0..2] != [0xFF, 0xD8] {
        return Err(CompressError::Metadata(
            "encoded JPEG does not start with SOI".to_string(),
        ));
    }

    let segment_len = u16::try_from(2 + JPEG_EXIF_HEADER.len() + payload.len()).map_err(|_| {
        CompressError::Metadata(format!(
            "EXIF payload of {} bytes does not fit in a JPEG APP1 segment",
            payload.len()
        ))
    })?;

    let mut insert_at = 2;
    if jpeg[2..4] == [0xFF, 0xE0] && jpeg.len() >= 6 {
        let app0_len = u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize;
        if 4 + app0_len <= jpeg.len() {
            insert_at = 4 + app0_len;
        }
    }

    let mut out = Vec::with_capacity(jpeg.len() + segment_len as usize + 2);
    out.extend_from_slice(&jpeg[..insert_at]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(JPEG_EXIF_HEADER);
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[insert_at..]);
    Ok(out)
}
