//! Export artifacts and their delivery.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, RgbaImage};

use crate::error::Result;

// ============================================================================
// Filename tokens
// ============================================================================

static LAST_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Returns a unique filename token: the current millisecond timestamp,
/// forced strictly monotonic so exports within the same millisecond never
/// collide.
fn next_token() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);

    let mut prev = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_TOKEN.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => prev = observed,
        }
    }
}

// ============================================================================
// RasterArtifact
// ============================================================================

/// The raster output of one export invocation.
///
/// Holds the composited pixel buffer and the suggested filename,
/// `qrcode-<token>.png`. Artifacts are produced fresh on every export and
/// never cached; delivery consumes the artifact.
#[derive(Debug)]
pub struct RasterArtifact {
    pixels: RgbaImage,
    filename: String,
}

impl RasterArtifact {
    pub(crate) fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            filename: format!("qrcode-{}.png", next_token()),
        }
    }

    /// Suggested filename, `qrcode-<token>.png`.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Width and height of the pixel buffer (always equal).
    pub fn size(&self) -> u32 {
        self.pixels.width()
    }

    /// The composited pixel buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Encodes the artifact as PNG and returns the file bytes.
    pub fn into_png_bytes(self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Writes the artifact to `<dir>/<filename>` and returns the path.
    pub fn save_into(self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        let bytes = self.into_png_bytes()?;
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

// ============================================================================
// VectorArtifact
// ============================================================================

/// The vector output of one export invocation, `qrcode-<token>.svg`.
///
/// Same delivery contract as [`RasterArtifact`], with no decoding involved:
/// the displayed symbol's markup is written out as-is.
#[derive(Debug, Clone)]
pub struct VectorArtifact {
    markup: String,
    filename: String,
}

impl VectorArtifact {
    pub(crate) fn new(markup: String) -> Self {
        Self {
            markup,
            filename: format!("qrcode-{}.svg", next_token()),
        }
    }

    /// Suggested filename, `qrcode-<token>.svg`.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The SVG markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Writes the artifact to `<dir>/<filename>` and returns the path.
    pub fn save_into(self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        fs::write(&path, self.markup.as_bytes())?;
        Ok(path)
    }
}

// ============================================================================
// Tests
// ============================================================================
