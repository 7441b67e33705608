//! The render-to-raster export pipeline.
//!
//! An export converts the currently displayed vector symbol into a flat
//! raster artifact matching the user's styling. Each invocation runs the
//! same fixed sequence:
//!
//! 1. Resolve the symbol handle (fails when nothing is displayed)
//! 2. Allocate a private `size x size` [`Surface`]
//! 3. Fill the surface with the background color
//! 4. Serialize the symbol and stage the bytes for decoding
//! 5. Suspend on the asynchronous decode
//! 6. Composite the decoded pixels over the painted surface
//! 7. Wrap the pixels in a [`RasterArtifact`] with a unique filename
//!
//! The decode is the only suspension point: everything before it runs
//! synchronously, so the background is fully painted before the pipeline
//! yields, and the continuation only draws on top of it. Dropping the
//! returned future mid-decode releases the staged source and leaves the
//! worker's completion signal with no receiver, which is harmless.

mod artifact;
mod decode;
mod surface;

pub use artifact::{RasterArtifact, VectorArtifact};
pub use decode::{StagedSource, SvgDecoder};
pub use surface::Surface;

use log::{debug, warn};

use crate::error::Result;
use crate::style::StyleParameters;
use crate::symbol::SymbolHandle;

// ============================================================================
// RasterExporter
// ============================================================================

/// The export pipeline.
///
/// Owns the decode worker; every export allocates its own surface, so
/// overlapping invocations never share mutable state, while their decode
/// jobs serialize through the worker in submission order.
pub struct RasterExporter {
    decoder: SvgDecoder,
}

impl RasterExporter {
    /// Creates an exporter with its own decode worker.
    pub fn new() -> Self {
        Self {
            decoder: SvgDecoder::new(),
        }
    }

    /// The decoder backing this exporter.
    pub fn decoder(&self) -> &SvgDecoder {
        &self.decoder
    }

    /// Converts the currently displayed symbol into a raster artifact.
    ///
    /// `params` is the caller's view of the styling. When it disagrees with
    /// the parameters the displayed symbol was rendered from (the user edited
    /// inputs and the display has not caught up), the displayed symbol wins:
    /// the artifact always shows what is on screen. The mismatch is logged.
    ///
    /// # Errors
    ///
    /// [`Error::NoSymbol`] when the handle resolves to nothing,
    /// [`Error::Rasterization`] when the serialized source cannot be decoded.
    ///
    /// [`Error::NoSymbol`]: crate::Error::NoSymbol
    /// [`Error::Rasterization`]: crate::Error::Rasterization
    pub async fn export(
        &self,
        handle: SymbolHandle<'_>,
        params: &StyleParameters,
    ) -> Result<RasterArtifact> {
        let symbol = handle.resolve()?;
        let displayed = symbol.params();
        if displayed != params {
            warn!("export parameters differ from the displayed symbol; exporting what is displayed");
        }

        let size = displayed.size;
        debug!("exporting {size}x{size} raster artifact");

        let mut surface = Surface::new(size);
        surface.fill(displayed.background_color);

        let staged = self.decoder.stage(symbol.serialize());
        let decoded = self.decoder.decode(&staged, size).await;
        // The staged entry is released before the error propagates.
        drop(staged);
        let decoded = decoded.inspect_err(|e| warn!("decode failed: {e}"))?;

        surface.composite(&decoded);
        debug!("export complete");

        Ok(RasterArtifact::new(surface.into_pixels()))
    }
}

impl Default for RasterExporter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;
    use crate::style::Color;
    use crate::symbol::{QrSymbolRenderer, SymbolRenderer, VectorSymbol};

    fn rendered(params: &StyleParameters) -> VectorSymbol {
        QrSymbolRenderer::new().render(params).unwrap()
    }

    #[tokio::test]
    async fn artifact_matches_displayed_size() {
        let exporter = RasterExporter::new();

        for size in [100, 256, 500] {
            let params = StyleParameters::new("https://example.com").with_size(size);
            let symbol = rendered(&params);

            let artifact = exporter
                .export(SymbolHandle::new(Some(&symbol)), &params)
                .await
                .unwrap();

            assert_eq!(artifact.size(), size);
            assert_eq!(artifact.pixels().height(), size);
        }
    }

    #[tokio::test]
    async fn background_reaches_every_corner() {
        let bg = Color::new(0x33, 0x66, 0x99);
        let params = StyleParameters::new("hello").with_background(bg);
        let symbol = rendered(&params);

        let exporter = RasterExporter::new();
        let artifact = exporter
            .export(SymbolHandle::new(Some(&symbol)), &params)
            .await
            .unwrap();

        let size = artifact.size();
        for (x, y) in [(0, 0), (size - 1, 0), (0, size - 1), (size - 1, size - 1)] {
            assert_eq!(artifact.pixels().get_pixel(x, y).0, [0x33, 0x66, 0x99, 255]);
        }
    }

    #[tokio::test]
    async fn url_at_256_is_black_on_white() {
        let params = StyleParameters::new("https://example.com");
        let symbol = rendered(&params);

        let exporter = RasterExporter::new();
        let artifact = exporter
            .export(SymbolHandle::new(Some(&symbol)), &params)
            .await
            .unwrap();

        assert_eq!(artifact.size(), 256);

        // Quiet zone corners are pure background.
        for (x, y) in [(0, 0), (255, 0), (0, 255), (255, 255)] {
            assert_eq!(artifact.pixels().get_pixel(x, y).0, [255, 255, 255, 255]);
        }

        // The central region carries dark modules.
        let mut dark = 0;
        for y in 64..192 {
            for x in 64..192 {
                if artifact.pixels().get_pixel(x, y).0 == [0, 0, 0, 255] {
                    dark += 1;
                }
            }
        }
        assert!(dark > 0, "Expected dark modules near the center");

        // crispEdges keeps the output strictly two-tone.
        assert!(
            artifact
                .pixels()
                .pixels()
                .all(|p| p.0 == [0, 0, 0, 255] || p.0 == [255, 255, 255, 255])
        );
    }

    #[tokio::test]
    async fn repeated_export_is_pixel_identical() {
        let params = StyleParameters::new("hello");
        let symbol = rendered(&params);
        let exporter = RasterExporter::new();

        let handle = SymbolHandle::new(Some(&symbol));
        let first = exporter.export(handle, &params).await.unwrap();
        let second = exporter.export(handle, &params).await.unwrap();

        assert_eq!(first.pixels(), second.pixels());
        assert_ne!(first.filename(), second.filename());
    }

    #[tokio::test]
    async fn empty_handle_is_rejected() {
        let exporter = RasterExporter::new();

        let err = exporter
            .export(SymbolHandle::new(None), &StyleParameters::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoSymbol));
    }

    #[tokio::test]
    async fn staging_drains_after_repeated_exports() {
        let params = StyleParameters::new("hello");
        let symbol = rendered(&params);
        let exporter = RasterExporter::new();

        for _ in 0..5 {
            exporter
                .export(SymbolHandle::new(Some(&symbol)), &params)
                .await
                .unwrap();
        }

        assert_eq!(exporter.decoder().staged_len(), 0);
    }

    #[tokio::test]
    async fn displayed_symbol_wins_over_caller_params() {
        let displayed = StyleParameters::new("hello").with_size(256);
        let symbol = rendered(&displayed);

        // The caller's view has moved on: bigger size, red background.
        let stale = displayed
            .clone()
            .with_size(400)
            .with_background(Color::new(255, 0, 0));

        let exporter = RasterExporter::new();
        let artifact = exporter
            .export(SymbolHandle::new(Some(&symbol)), &stale)
            .await
            .unwrap();

        assert_eq!(artifact.size(), 256);
        assert_eq!(artifact.pixels().get_pixel(0, 0).0, [255, 255, 255, 255]);
    }
}
