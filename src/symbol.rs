//! The symbol renderer boundary and the vector symbol it produces.
//!
//! A [`SymbolRenderer`] turns [`StyleParameters`] into a [`VectorSymbol`]:
//! self-contained SVG markup whose declared size equals the size the user
//! chose, with both colors embedded. The default implementation encodes the
//! text as a QR code. The symbol also records the parameters it was rendered
//! from, which lets the export pipeline detect when a caller's view of the
//! styling has fallen behind the display.

use std::fmt::Write as _;

use qrcode::{EcLevel, QrCode};

use crate::error::{Error, Result};
use crate::style::StyleParameters;

/// Width of the quiet zone around the module matrix, in modules.
pub const QUIET_ZONE_MODULES: u32 = 4;

// ============================================================================
// VectorSymbol
// ============================================================================

/// A rendered vector image of the encoded symbol.
///
/// The markup is self-contained: declared width and height match the
/// rendered size, colors are embedded, and the module matrix is laid out in
/// viewBox units with a [`QUIET_ZONE_MODULES`]-wide margin on every side.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSymbol {
    markup: String,
    params: StyleParameters,
}

impl VectorSymbol {
    pub(crate) fn new(markup: String, params: StyleParameters) -> Self {
        Self { markup, params }
    }

    /// The SVG markup of the rendered symbol.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The parameters this symbol was rendered from.
    pub fn params(&self) -> &StyleParameters {
        &self.params
    }

    /// Declared width and height in pixels.
    pub fn size(&self) -> u32 {
        self.params.size
    }

    /// Serializes the symbol into the self-contained byte form handed to
    /// the raster decoder.
    pub fn serialize(&self) -> Vec<u8> {
        self.markup.clone().into_bytes()
    }
}

// ============================================================================
// SymbolHandle
// ============================================================================

/// A read-only reference to the currently displayed symbol.
///
/// The display subsystem owns the symbol; the export pipeline resolves the
/// handle at the start of every export and fails with [`Error::NoSymbol`]
/// when nothing is displayed.
#[derive(Debug, Clone, Copy)]
pub struct SymbolHandle<'a> {
    symbol: Option<&'a VectorSymbol>,
}

impl<'a> SymbolHandle<'a> {
    pub(crate) fn new(symbol: Option<&'a VectorSymbol>) -> Self {
        Self { symbol }
    }

    /// Resolves the handle to the displayed symbol.
    pub fn resolve(&self) -> Result<&'a VectorSymbol> {
        self.symbol.ok_or(Error::NoSymbol)
    }

    /// Returns `true` if a symbol is currently displayed.
    pub fn is_displayed(&self) -> bool {
        self.symbol.is_some()
    }
}

// ============================================================================
// SymbolRenderer
// ============================================================================

/// The component that turns styling parameters into a vector symbol.
///
/// Implementations must be synchronous and deterministic; the studio
/// re-renders through this trait on every state change, so the display
/// never lags the parameters.
pub trait SymbolRenderer {
    /// Renders the vector symbol for the given parameters.
    ///
    /// `params.text` is never empty here; the studio clears the display
    /// instead of rendering empty input.
    fn render(&self, params: &StyleParameters) -> Result<VectorSymbol>;
}

/// The default renderer: QR encoding via the `qrcode` crate.
#[derive(Debug, Clone)]
pub struct QrSymbolRenderer {
    ec_level: EcLevel,
}

impl QrSymbolRenderer {
    /// Creates a renderer with error correction level L, the level that
    /// leaves the most room for text.
    pub fn new() -> Self {
        Self {
            ec_level: EcLevel::L,
        }
    }

    /// Creates a renderer with a specific error correction level.
    pub fn with_ec_level(ec_level: EcLevel) -> Self {
        Self { ec_level }
    }
}

impl Default for QrSymbolRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRenderer for QrSymbolRenderer {
    fn render(&self, params: &StyleParameters) -> Result<VectorSymbol> {
        let code = QrCode::with_error_correction_level(params.text.as_bytes(), self.ec_level)?;
        let markup = svg_markup(&code, params);
        Ok(VectorSymbol::new(markup, params.clone()))
    }
}

// ============================================================================
// SVG assembly
// ============================================================================

/// Builds exact-size SVG markup for an encoded matrix.
///
/// One background path covers the full viewBox, then a single path draws
/// every dark module offset by the quiet zone. `crispEdges` disables
/// anti-aliasing so the raster output stays two-tone even when the module
/// grid does not land on whole pixels.
fn svg_markup(code: &QrCode, params: &StyleParameters) -> String {
    let modules = code.width() as u32;
    let span = modules + 2 * QUIET_ZONE_MODULES;
    let size = params.size;
    let fg = params.foreground_color.hex();
    let bg = params.background_color.hex();

    let mut path = String::new();
    for (i, color) in code.to_colors().iter().enumerate() {
        if *color == qrcode::Color::Dark {
            let x = i as u32 % modules + QUIET_ZONE_MODULES;
            let y = i as u32 / modules + QUIET_ZONE_MODULES;
            let _ = write!(path, "M{x},{y}h1v1h-1z");
        }
    }

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" \
         viewBox=\"0 0 {span} {span}\" shape-rendering=\"crispEdges\">\
         <path fill=\"{bg}\" d=\"M0,0h{span}v{span}H0z\"/>\
         <path fill=\"{fg}\" d=\"{path}\"/>\
         </svg>"
    )
}

// ============================================================================
// Tests
// ============================================================================
