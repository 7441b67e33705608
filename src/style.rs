//! Serializable styling parameters for the displayed symbol.
//!
//! [`StyleParameters`] captures everything the user controls in a format
//! that can be serialized to JSON and exchanged with a frontend process.
//!
//! # Example
//!
//! ```
//! use qr_studio::StyleParameters;
//!
//! let params = StyleParameters::new("https://example.com")
//!     .with_size(256)
//!     .with_foreground("#1a1a2e".parse().unwrap());
//!
//! let json = params.to_json().unwrap();
//! let restored = StyleParameters::from_json(&json).unwrap();
//! assert_eq!(restored, params);
//! ```

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Smallest accepted symbol size in pixels.
pub const MIN_SIZE: u32 = 100;

/// Largest accepted symbol size in pixels.
pub const MAX_SIZE: u32 = 500;

/// Clamps a requested size into the accepted range.
pub(crate) fn clamp_size(size: u32) -> u32 {
    size.clamp(MIN_SIZE, MAX_SIZE)
}

// ============================================================================
// Color
// ============================================================================

/// An opaque sRGB color.
///
/// Parses from `"#rrggbb"` or `"#rgb"` hex notation (the form color pickers
/// emit) and formats back to lowercase `"#rrggbb"`. Serializes as the hex
/// string:
///
/// ```json
/// { "foregroundColor": "#000000" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(Srgb<u8>);

impl Color {
    /// Creates a color from 8-bit RGB components.
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    /// Returns the color in lowercase `"#rrggbb"` notation.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }

    /// Returns the 8-bit RGB components.
    pub fn components(&self) -> (u8, u8, u8) {
        (self.0.red, self.0.green, self.0.blue)
    }

    /// Returns the color as a fully opaque RGBA pixel.
    pub(crate) fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.0.red, self.0.green, self.0.blue, 255])
    }
}

impl FromStr for Color {
    type Err = palette::rgb::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Srgb<u8>>()?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// StyleParameters
// ============================================================================

/// The user-facing styling state for the displayed symbol.
///
/// This is the input boundary: a frontend communicates edits as camelCase
/// JSON, and every path that sets `size` clamps it to
/// [`MIN_SIZE`]..=[`MAX_SIZE`].
///
/// # JSON Format
///
/// ```json
/// {
///   "text": "https://example.com",
///   "size": 256,
///   "foregroundColor": "#000000",
///   "backgroundColor": "#ffffff"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleParameters {
    /// The text to encode. Empty text means nothing is displayed.
    #[serde(default)]
    pub text: String,

    /// Rendered width and height in pixels.
    #[serde(default = "default_size", deserialize_with = "deserialize_size")]
    pub size: u32,

    /// Module (foreground) color.
    #[serde(default = "default_foreground")]
    pub foreground_color: Color,

    /// Background color.
    #[serde(default = "default_background")]
    pub background_color: Color,
}

fn default_size() -> u32 {
    256
}

fn default_foreground() -> Color {
    Color::new(0, 0, 0)
}

fn default_background() -> Color {
    Color::new(255, 255, 255)
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(clamp_size)
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: default_size(),
            foreground_color: default_foreground(),
            background_color: default_background(),
        }
    }
}

impl StyleParameters {
    /// Creates parameters for the given text with default styling
    /// (256 pixels, black on white).
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the rendered size in pixels, clamped to the accepted range.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = clamp_size(size);
        self
    }

    /// Sets the module color.
    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground_color = color;
        self
    }

    /// Sets the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Serializes the parameters to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes parameters from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_six_digit_hex() {
        let color: Color = "#336699".parse().unwrap();
        assert_eq!(color.components(), (0x33, 0x66, 0x99));
    }

    #[test]
    fn color_parses_three_digit_hex() {
        let color: Color = "#fa0".parse().unwrap();
        assert_eq!(color.components(), (0xff, 0xaa, 0x00));
    }

    #[test]
    fn color_rejects_malformed_hex() {
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn color_formats_lowercase_hex() {
        assert_eq!(Color::new(0xAB, 0xCD, 0xEF).hex(), "#abcdef");
        assert_eq!(Color::new(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn parameters_default_to_black_on_white() {
        let params = StyleParameters::default();
        assert!(params.text.is_empty());
        assert_eq!(params.size, 256);
        assert_eq!(params.foreground_color, Color::new(0, 0, 0));
        assert_eq!(params.background_color, Color::new(255, 255, 255));
    }

    #[test]
    fn parameters_serialize_camel_case() {
        let json = StyleParameters::new("hello").to_json().unwrap();

        assert!(json.contains("\"text\":\"hello\""));
        assert!(json.contains("\"size\":256"));
        assert!(json.contains("\"foregroundColor\":\"#000000\""));
        assert!(json.contains("\"backgroundColor\":\"#ffffff\""));
    }

    #[test]
    fn parameters_serialization_roundtrip() {
        let params = StyleParameters::new("wifi:MyNetwork")
            .with_size(400)
            .with_foreground("#112233".parse().unwrap())
            .with_background("#ffeedd".parse().unwrap());

        let json = params.to_json().unwrap();
        let restored = StyleParameters::from_json(&json).unwrap();

        assert_eq!(restored, params);
    }

    #[test]
    fn deserialized_size_is_clamped() {
        let too_big = StyleParameters::from_json(r#"{"text":"x","size":9000}"#).unwrap();
        assert_eq!(too_big.size, MAX_SIZE);

        let too_small = StyleParameters::from_json(r#"{"text":"x","size":10}"#).unwrap();
        assert_eq!(too_small.size, MIN_SIZE);
    }

    #[test]
    fn builder_clamps_size() {
        assert_eq!(StyleParameters::new("x").with_size(9999).size, MAX_SIZE);
        assert_eq!(StyleParameters::new("x").with_size(1).size, MIN_SIZE);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let params = StyleParameters::from_json(r#"{"text":"hello"}"#).unwrap();

        assert_eq!(params.size, 256);
        assert_eq!(params.foreground_color, Color::new(0, 0, 0));
        assert_eq!(params.background_color, Color::new(255, 255, 255));
    }
}
