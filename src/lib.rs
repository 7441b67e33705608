//! qr-studio: Live QR code styling and raster export
//!
//! This crate renders styled QR codes as vector symbols and exports what is
//! displayed as a flat PNG artifact. The [`QrStudio`] session owns the
//! styling state and re-renders on every edit; the [`RasterExporter`]
//! pipeline rasterizes the displayed symbol over its background color and
//! wraps the pixels in a uniquely named artifact.
//!
//! # Example
//!
//! ```no_run
//! use qr_studio::QrStudio;
//!
//! # async fn demo() -> qr_studio::Result<()> {
//! let mut studio = QrStudio::new();
//! studio.set_text("https://example.com")?;
//! studio.set_size(256)?;
//! studio.set_foreground("#1a1a2e".parse()?)?;
//!
//! // The one asynchronous step is decoding the vector symbol into pixels.
//! let artifact = studio.export().await?;
//! let path = artifact.save_into(std::env::temp_dir())?;
//! println!("saved {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Styling Parameters
//!
//! [`StyleParameters`] is the input boundary: a frontend communicates edits
//! as camelCase JSON, with sizes clamped to the accepted range and colors
//! parsed from hex notation:
//!
//! ```
//! use qr_studio::StyleParameters;
//!
//! let params = StyleParameters::from_json(
//!     r##"{"text":"hello","size":300,"foregroundColor":"#1a1a2e"}"##,
//! ).unwrap();
//! assert_eq!(params.size, 300);
//! ```

mod error;
mod export;
mod studio;
mod style;
mod symbol;

pub use error::{Error, Result};
pub use export::{
    RasterArtifact, RasterExporter, StagedSource, Surface, SvgDecoder, VectorArtifact,
};
pub use studio::QrStudio;
pub use style::{Color, MAX_SIZE, MIN_SIZE, StyleParameters};
pub use symbol::{
    QUIET_ZONE_MODULES, QrSymbolRenderer, SymbolHandle, SymbolRenderer, VectorSymbol,
};

pub use qrcode::EcLevel;
