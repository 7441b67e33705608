//! The interactive styling session.
//!
//! [`QrStudio`] plays the role of the form in front of the user: it owns the
//! current [`StyleParameters`] and the vector symbol rendered for them, and
//! keeps the two in sync by re-rendering on every edit.

use log::debug;

use crate::error::Result;
use crate::export::{RasterArtifact, RasterExporter, VectorArtifact};
use crate::style::{Color, StyleParameters, clamp_size};
use crate::symbol::{QrSymbolRenderer, SymbolHandle, SymbolRenderer, VectorSymbol};

// ============================================================================
// QrStudio
// ============================================================================

/// An interactive QR styling session.
///
/// Every mutation re-renders the displayed symbol synchronously, so the
/// display never lags the parameters. Export always rasterizes what is
/// displayed; it never re-encodes the text.
///
/// # Example
///
/// ```
/// use qr_studio::QrStudio;
///
/// # fn main() -> qr_studio::Result<()> {
/// let mut studio = QrStudio::new();
/// assert!(!studio.can_export());
///
/// studio.set_text("https://example.com")?;
/// assert!(studio.can_export());
///
/// let svg = studio.export_svg()?;
/// assert!(svg.filename().starts_with("qrcode-"));
/// # Ok(())
/// # }
/// ```
pub struct QrStudio {
    params: StyleParameters,
    renderer: Box<dyn SymbolRenderer>,
    display: Option<VectorSymbol>,
    exporter: RasterExporter,
}

impl QrStudio {
    /// Creates a session with default styling and the QR renderer.
    pub fn new() -> Self {
        Self::with_renderer(Box::new(QrSymbolRenderer::new()))
    }

    /// Creates a session with a custom symbol renderer.
    pub fn with_renderer(renderer: Box<dyn SymbolRenderer>) -> Self {
        Self {
            params: StyleParameters::default(),
            renderer,
            display: None,
            exporter: RasterExporter::new(),
        }
    }

    /// The current styling parameters.
    pub fn params(&self) -> &StyleParameters {
        &self.params
    }

    /// A read-only handle to the currently displayed symbol.
    pub fn symbol(&self) -> SymbolHandle<'_> {
        SymbolHandle::new(self.display.as_ref())
    }

    /// Returns `true` when a symbol is displayed and export is available.
    pub fn can_export(&self) -> bool {
        self.display.is_some()
    }

    /// The export pipeline this session delivers through.
    pub fn exporter(&self) -> &RasterExporter {
        &self.exporter
    }

    /// Replaces the encoded text and re-renders. Empty text clears the
    /// display.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.params.text = text.into();
        self.rerender()
    }

    /// Sets the rendered size in pixels (clamped to the accepted range) and
    /// re-renders.
    pub fn set_size(&mut self, size: u32) -> Result<()> {
        self.params.size = clamp_size(size);
        self.rerender()
    }

    /// Sets the module color and re-renders.
    pub fn set_foreground(&mut self, color: Color) -> Result<()> {
        self.params.foreground_color = color;
        self.rerender()
    }

    /// Sets the background color and re-renders.
    pub fn set_background(&mut self, color: Color) -> Result<()> {
        self.params.background_color = color;
        self.rerender()
    }

    /// Replaces all styling parameters at once and re-renders.
    pub fn apply(&mut self, params: StyleParameters) -> Result<()> {
        self.params = params;
        self.params.size = clamp_size(self.params.size);
        self.rerender()
    }

    fn rerender(&mut self) -> Result<()> {
        if self.params.text.is_empty() {
            self.display = None;
            return Ok(());
        }
        match self.renderer.render(&self.params) {
            Ok(symbol) => {
                debug!("rendered {}x{} symbol", symbol.size(), symbol.size());
                self.display = Some(symbol);
                Ok(())
            }
            Err(e) => {
                // Never keep a symbol the current parameters failed to render.
                self.display = None;
                Err(e)
            }
        }
    }

    /// Exports the displayed symbol as a raster artifact.
    ///
    /// Fails with [`Error::NoSymbol`] while nothing is displayed.
    ///
    /// [`Error::NoSymbol`]: crate::Error::NoSymbol
    pub async fn export(&self) -> Result<RasterArtifact> {
        self.exporter.export(self.symbol(), &self.params).await
    }

    /// Exports the displayed symbol's markup as a vector artifact.
    pub fn export_svg(&self) -> Result<VectorArtifact> {
        let symbol = self.symbol().resolve()?;
        Ok(VectorArtifact::new(symbol.markup().to_string()))
    }
}

impl Default for QrStudio {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
