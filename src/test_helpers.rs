//! Shared test utilities: a fake codec and small image fixtures.

use crate::error::Result;
use crate::image_processor::{ImageCodec, ImageKind, ImageProcessor};
use crate::metadata::TagSet;
use exif::{Field, In, Tag, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[path = "../tests/common/mod.rs"]
mod fixtures;

pub use fixtures::{write_gradient_png, write_noisy_jpeg};

/// Codec that never touches real image data.
///
/// "Decoding" reads the raw bytes, "encoding" writes those bytes scaled by
/// `output_ratio` so tests control whether the output shrinks or grows.
/// Files starting with `CORRUPT` fail to decode.
pub struct FakeCodec {
    embedded: HashMap<PathBuf, TagSet>,
    output_ratio: f64,
    pub writes: Mutex<Vec<(PathBuf, ImageKind, TagSet)>>,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self {
            embedded: HashMap::new(),
            output_ratio: 0.5,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_embedded(mut self, path: &Path, tags: TagSet) -> Self {
        self.embedded.insert(path.to_path_buf(), tags);
        self
    }

    pub fn with_output_ratio(mut self, ratio: f64) -> Self {
        self.output_ratio = ratio;
        self
    }

    /// Tags most recently written to `destination`
    pub fn written_tags(&self, destination: &Path) -> Option<TagSet> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(path, _, _)| path == destination)
            .map(|(_, _, tags)| tags.clone())
    }
}

impl ImageCodec for FakeCodec {
    type Image = Vec<u8>;

    fn decode(&self, path: &Path) -> Result<Vec<u8>> {
        let bytes = fs::read(path)?;
        if bytes.starts_with(b"CORRUPT") {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt image").into());
        }
        Ok(bytes)
    }

    fn read_tags(&self, path: &Path) -> Result<TagSet> {
        if let Some(tags) = self.embedded.get(path) {
            return Ok(tags.clone());
        }
        Ok(self.written_tags(path).unwrap_or_default())
    }

    fn encode_optimized(
        &self,
        image: &Vec<u8>,
        kind: ImageKind,
        tags: &TagSet,
        destination: &Path,
    ) -> Result<()> {
        let len = (image.len() as f64 * self.output_ratio).round() as usize;
        let bytes: Vec<u8> = image.iter().copied().cycle().take(len).collect();
        fs::write(destination, bytes)?;
        self.writes
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), kind, tags.clone()));
        Ok(())
    }
}

/// Primary-IFD field, the shape `read_tags` and the EXIF writer work with
pub fn primary_field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

/// Write a noisy JPEG whose EXIF payload holds exactly `fields`.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, fields: &[Field]) {
    let mut writer = exif::experimental::Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut payload = Cursor::new(Vec::new());
    writer.write(&mut payload, false).unwrap();

    write_noisy_jpeg(path, width, height);
    let codec = ImageProcessor::new(100);
    let image = codec.decode(path).unwrap();
    let tags = TagSet::from_embedded(payload.into_inner(), BTreeMap::new());
    codec
        .encode_optimized(&image, ImageKind::Jpeg, &tags, path)
        .unwrap();
}

/// Parsed EXIF of the image at `path`
pub fn read_exif(path: &Path) -> exif::Exif {
    let mut reader = BufReader::new(File::open(path).unwrap());
    exif::Reader::new().read_from_container(&mut reader).unwrap()
}
