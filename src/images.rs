//! Image acquisition for the department signature and the Canada wordmark.
//!
//! Sources are either base64 data URIs or filesystem paths. Remote URLs are
//! not fetched; callers that need them provide their own [`ImageLoader`].

use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::error::{Error, Result};

/// Decoded image bytes together with the pixel dimensions of the source.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// Original encoded bytes (PNG / JPEG), embedded as-is.
    pub bytes: Vec<u8>,
    pub px_width: u32,
    pub px_height: u32,
}

impl LoadedImage {
    /// Decode with the `image` crate to obtain pixel dimensions.
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        let img = ::image::load_from_memory(&bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(Error::ImageDecode("image has no pixels".to_string()));
        }
        Ok(Self {
            px_width: img.width(),
            px_height: img.height(),
            bytes,
        })
    }

    /// Width that keeps the aspect ratio at the given height.
    pub fn width_for_height(&self, height: f32) -> f32 {
        height * self.px_width as f32 / self.px_height as f32
    }
}

/// Fetches raw image bytes for a source string.
pub trait ImageLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>>;
}

/// Loads data URIs and local files (relative paths resolve against
/// `base_dir` when set).
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    pub base_dir: Option<PathBuf>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }
}

impl ImageLoader for SourceLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>> {
        let source = source.trim();
        if source.starts_with("data:") {
            return parse_data_uri(source);
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return Err(Error::ImageLoad(format!(
                "remote image sources are not fetched: {source}"
            )));
        }
        let mut path = PathBuf::from(source);
        if path.is_relative() {
            if let Some(base) = &self.base_dir {
                path = base.join(path);
            }
        }
        fs::read(&path).map_err(|e| Error::ImageLoad(format!("{}: {e}", path.display())))
    }
}

/// Load and decode an image in one step.
pub fn acquire(loader: &dyn ImageLoader, source: &str) -> Result<LoadedImage> {
    LoadedImage::decode(loader.load(source)?)
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| Error::ImageLoad("not a data URI".to_string()))?;
    let comma_pos = rest.find(',').ok_or_else(|| {
        Error::ImageLoad("invalid data URI: missing `,` between header and data".to_string())
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err(Error::ImageLoad(
            "only base64-encoded data URIs are supported".to_string(),
        ));
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| Error::ImageLoad(format!("base64 decode error: {e}")))
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = ::image::RgbImage::from_pixel(width, height, ::image::Rgb([200, 30, 30]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
    out.into_inner()
}
