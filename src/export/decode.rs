//! Asynchronous decoding of serialized vector sources into raster pixels.
//!
//! Decoding is the one asynchronous step of an export: the caller stages the
//! serialized bytes, submits a job to a worker thread that owns the SVG
//! rasterizer, and suspends on a completion channel. Staged bytes live in a
//! shared table keyed by id; the [`StagedSource`] guard removes its entry
//! when dropped, so the table drains no matter how the export ends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use tokio::sync::oneshot;

use crate::error::{Error, Result};

type SourceId = u64;
type StagingTable = Arc<Mutex<HashMap<SourceId, Arc<[u8]>>>>;

// ============================================================================
// StagedSource
// ============================================================================

/// A transient handle to serialized source bytes staged for decoding.
///
/// The staged entry is released when the guard drops: after completion,
/// after failure, or when the owning export is cancelled mid-decode.
#[derive(Debug)]
pub struct StagedSource {
    id: SourceId,
    table: StagingTable,
}

impl StagedSource {
    fn id(&self) -> SourceId {
        self.id
    }
}

impl Drop for StagedSource {
    fn drop(&mut self) {
        if let Ok(mut table) = self.table.lock() {
            table.remove(&self.id);
        }
    }
}

// ============================================================================
// SvgDecoder
// ============================================================================

struct DecodeJob {
    source: SourceId,
    target: u32,
    resp: oneshot::Sender<Result<RgbaImage>>,
}

/// An async-friendly SVG decoder backed by a dedicated worker thread.
///
/// The worker thread owns the rasterizer and executes jobs sent from async
/// tasks in submission order. Callers stage bytes, submit, and await the
/// completion signal. Dropping the decoder shuts the worker down once queued
/// jobs have drained.
pub struct SvgDecoder {
    job_tx: Sender<DecodeJob>,
    table: StagingTable,
    next_id: AtomicU64,
}

impl SvgDecoder {
    /// Creates a decoder (spawns the worker thread).
    pub fn new() -> Self {
        let table: StagingTable = Arc::new(Mutex::new(HashMap::new()));
        let (job_tx, job_rx) = mpsc::channel::<DecodeJob>();

        let worker_table = Arc::clone(&table);
        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let source = worker_table
                    .lock()
                    .ok()
                    .and_then(|table| table.get(&job.source).cloned());
                let result = match source {
                    Some(bytes) => decode_svg(&bytes, job.target),
                    // The owning export was cancelled between submit and pickup.
                    None => Err(Error::Rasterization(
                        "source released before decode".to_string(),
                    )),
                };
                let _ = job.resp.send(result);
            }
        });

        Self {
            job_tx,
            table,
            next_id: AtomicU64::new(0),
        }
    }

    /// Stages serialized source bytes for decoding.
    ///
    /// The entry stays readable by the worker until the returned guard
    /// drops.
    pub fn stage(&self, bytes: Vec<u8>) -> StagedSource {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut table) = self.table.lock() {
            table.insert(id, bytes.into());
        }
        StagedSource {
            id,
            table: Arc::clone(&self.table),
        }
    }

    /// Number of staged sources currently live.
    pub fn staged_len(&self) -> usize {
        self.table.lock().map(|table| table.len()).unwrap_or(0)
    }

    /// Submits a decode job and suspends until its completion signal.
    ///
    /// The decoded image has exactly `target x target` pixels; the source is
    /// stretched to fill when its declared size differs.
    pub async fn decode(&self, staged: &StagedSource, target: u32) -> Result<RgbaImage> {
        let (resp, done) = oneshot::channel();
        self.job_tx
            .send(DecodeJob {
                source: staged.id(),
                target,
                resp,
            })
            .map_err(|_| Error::Rasterization("decode worker is gone".to_string()))?;

        done.await
            .map_err(|_| Error::Rasterization("decode canceled".to_string()))?
    }
}

impl Default for SvgDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SVG Rasterization
// ============================================================================

/// Rasterizes self-contained SVG bytes into a `target x target` RGBA image.
fn decode_svg(bytes: &[u8], target: u32) -> Result<RgbaImage> {
    if target == 0 {
        return Err(Error::Rasterization("target size is zero".to_string()));
    }

    let opts = Options::default();
    let tree = Tree::from_data(bytes, &opts)
        .map_err(|e| Error::Rasterization(format!("malformed vector source: {e}")))?;

    let svg_size = tree.size();
    let mut pixmap = Pixmap::new(target, target).ok_or_else(|| {
        Error::Rasterization(format!("cannot allocate {target}x{target} pixmap"))
    })?;
    let transform = Transform::from_scale(
        target as f32 / svg_size.width(),
        target as f32 / svg_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (pixel, out) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        // tiny_skia uses premultiplied alpha, we need to unpremultiply
        let (r, g, b, a) = unpremultiply(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha());
        *out = Rgba([r, g, b, a]);
    }

    img
}

/// Unpremultiplies a premultiplied alpha pixel.
fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CIRCLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><circle cx="50" cy="50" r="40" fill="#ff0000"/></svg>"##;

    #[tokio::test]
    async fn decodes_staged_svg_at_target_size() {
        let decoder = SvgDecoder::new();

        let staged = decoder.stage(CIRCLE_SVG.as_bytes().to_vec());
        let img = decoder.decode(&staged, 64).await.unwrap();

        assert_eq!((img.width(), img.height()), (64, 64));
        assert_eq!(img.get_pixel(32, 32).0, [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn source_is_stretched_to_fill_target() {
        let decoder = SvgDecoder::new();

        // Declared size is 100x100; the decode target wins.
        let staged = decoder.stage(CIRCLE_SVG.as_bytes().to_vec());
        let img = decoder.decode(&staged, 32).await.unwrap();

        assert_eq!((img.width(), img.height()), (32, 32));
    }

    #[tokio::test]
    async fn malformed_source_fails_to_decode() {
        let decoder = SvgDecoder::new();

        let staged = decoder.stage(b"definitely not svg".to_vec());
        let err = decoder.decode(&staged, 64).await.unwrap_err();

        assert!(matches!(err, Error::Rasterization(_)));
        drop(staged);
        assert_eq!(decoder.staged_len(), 0);
    }

    #[test]
    fn staging_releases_on_drop() {
        let decoder = SvgDecoder::new();

        let a = decoder.stage(vec![1]);
        let b = decoder.stage(vec![2]);
        assert_eq!(decoder.staged_len(), 2);

        drop(a);
        assert_eq!(decoder.staged_len(), 1);
        drop(b);
        assert_eq!(decoder.staged_len(), 0);
    }

    #[test]
    fn unpremultiply_handles_zero_alpha() {
        assert_eq!(unpremultiply(10, 20, 30, 0), (0, 0, 0, 0));
    }
}
