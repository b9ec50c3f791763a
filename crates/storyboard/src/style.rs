//! Colours and visual styles.

use crate::result::{StoryboardError, StoryboardResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a colour from channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pure white
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    /// Pure black
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    /// Light neutral grey used for idle participants
    pub const GREY_A: Self = Self::rgb(0xDD, 0xDD, 0xDD);
    /// Deep green used for the spotlighted participant and confirmation marks
    pub const GREEN_E: Self = Self::rgb(0x69, 0x9C, 0x52);
    /// Pale green used for share connectors
    pub const GREEN_B: Self = Self::rgb(0xA6, 0xCF, 0x8C);
    /// Blue used for commitment broadcasts
    pub const BLUE_D: Self = Self::rgb(0x29, 0xAB, 0xCA);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{s}' must start with '#'"))?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("colour '{s}' must have six hex digits"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("colour '{s}' has invalid hex digits: {e}"))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// Colours for participant boxes in both display states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Fill and border colour while inactive
    pub inactive: Color,
    /// Fill opacity while inactive
    pub inactive_opacity: f64,
    /// Fill and border colour while active
    pub active: Color,
    /// Fill opacity while active
    pub active_opacity: f64,
    /// Label colour while inactive
    pub inactive_label: Color,
    /// Label colour while active
    pub active_label: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            inactive: Color::GREY_A,
            inactive_opacity: 0.4,
            active: Color::GREEN_E,
            active_opacity: 0.8,
            inactive_label: Color::WHITE,
            active_label: Color::WHITE,
        }
    }
}

impl Palette {
    /// Both fill opacities must be finite and within `0.0..=1.0`.
    pub fn validate(&self) -> StoryboardResult<()> {
        for (name, value) in [
            ("inactive_opacity", self.inactive_opacity),
            ("active_opacity", self.active_opacity),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(StoryboardError::config(format!(
                    "palette.{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// How a connector is stroked and labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStyle {
    /// Stroke colour (also used for the inline label)
    pub color: Color,
    /// Stroke width in points
    pub stroke_width: f64,
    /// Maximum arrow tip length as a fraction of the connector length
    pub tip_ratio: f64,
    /// Distance of the inline label from the connector midpoint
    pub label_offset: f64,
    /// Inline label font size
    pub label_font_size: f64,
    /// Inline label template; `{index}`, `{from}` and `{to}` are substituted
    pub label_template: String,
}

impl ConnectorStyle {
    /// Blue commitment broadcast labelled `g^{c_k}`.
    #[must_use]
    pub fn broadcast() -> Self {
        Self {
            color: Color::BLUE_D,
            stroke_width: 4.0,
            tip_ratio: 0.25,
            label_offset: 0.3,
            label_font_size: 26.0,
            label_template: "g^{c_{index}}".to_string(),
        }
    }

    /// Thick green pairwise share labelled `s_{ij}`.
    #[must_use]
    pub fn share() -> Self {
        Self {
            color: Color::GREEN_B,
            stroke_width: 6.0,
            tip_ratio: 0.25,
            label_offset: 0.25,
            label_font_size: 24.0,
            label_template: "s_{{from}{to}}".to_string(),
        }
    }

    /// Converging arrows of the combination stage, with small heads.
    #[must_use]
    pub fn converge() -> Self {
        Self {
            color: Color::BLUE_D,
            stroke_width: 6.0,
            tip_ratio: 0.1,
            label_offset: 0.2,
            label_font_size: 24.0,
            label_template: "s_{{index}}".to_string(),
        }
    }

    /// Render the label template for one connector.
    ///
    /// `index` is the 1-based peer position, `from`/`to` are 1-based
    /// participant numbers.
    #[must_use]
    pub fn label_text(&self, index: usize, from: usize, to: usize) -> String {
        self.label_template
            .replace("{index}", &index.to_string())
            .replace("{from}", &from.to_string())
            .replace("{to}", &to.to_string())
    }
}

/// Font and colour for free-standing text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points
    pub font_size: f64,
    /// Text colour
    pub color: Color,
}

impl TextStyle {
    /// Create a text style
    #[must_use]
    pub const fn new(font_size: f64, color: Color) -> Self {
        Self { font_size, color }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_roundtrip() {
        assert_eq!(Color::GREEN_E.to_string(), "#699c52");
        assert_eq!("#699C52".parse::<Color>().unwrap(), Color::GREEN_E);
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!("699c52".parse::<Color>().is_err());
        assert!("#69".parse::<Color>().is_err());
        assert!("#zz9c52".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_rejects_signed_channels() {
        assert!("#+1+1+1".parse::<Color>().is_err());
        assert!("#-1ff00".parse::<Color>().is_err());
    }

    #[test]
    fn test_palette_opacity_bounds() {
        assert!(Palette::default().validate().is_ok());
        let edge = Palette {
            inactive_opacity: 0.0,
            active_opacity: 1.0,
            ..Palette::default()
        };
        assert!(edge.validate().is_ok());

        for bad in [f64::NAN, f64::INFINITY, -0.1, 7.5] {
            let palette = Palette {
                active_opacity: bad,
                ..Palette::default()
            };
            let err = palette.validate().unwrap_err();
            assert!(err.to_string().contains("palette.active_opacity"));
        }
    }

    #[test]
    fn test_color_serde_as_string() {
        let json = serde_json::to_string(&Color::BLUE_D).unwrap();
        assert_eq!(json, "\"#29abca\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::BLUE_D);
    }

    #[test]
    fn test_label_templates() {
        assert_eq!(ConnectorStyle::broadcast().label_text(2, 1, 3), "g^{c_2}");
        assert_eq!(ConnectorStyle::share().label_text(1, 1, 3), "s_{13}");
        assert_eq!(ConnectorStyle::converge().label_text(0, 0, 0), "s_{0}");
    }

    #[test]
    fn test_palette_partial_yaml_uses_defaults() {
        let palette: Palette = serde_yaml_ng::from_str("active: \"#ff0000\"").unwrap();
        assert_eq!(palette.active, Color::rgb(0xFF, 0, 0));
        assert_eq!(palette.inactive, Color::GREY_A);
    }
}
