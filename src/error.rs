//! Error types for the studio and the export pipeline

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while styling or exporting a symbol
#[derive(Error, Debug)]
pub enum Error {
    /// Export was requested while nothing is displayed
    #[error("no symbol is currently displayed")]
    NoSymbol,

    /// The encoder rejected the input text
    #[error("symbol encoding failed: {0}")]
    Symbol(#[from] qrcode::types::QrError),

    /// A color value could not be parsed
    #[error("invalid color: {0}")]
    InvalidColor(#[from] palette::rgb::FromHexError),

    /// The serialized vector source could not be decoded into pixels
    #[error("rasterization failed: {0}")]
    Rasterization(String),

    /// The composited surface could not be encoded as PNG
    #[error("artifact encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The artifact could not be written out
    #[error("artifact delivery failed: {0}")]
    Io(#[from] std::io::Error),
}
