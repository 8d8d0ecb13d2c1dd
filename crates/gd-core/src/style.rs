//! Per-feature style properties.
//!
//! Every sub-record is optional: a feature may carry only a stroke, only a
//! point icon, and so on. Tools hold a *current style* that is merged onto
//! features sub-record by sub-record, never wholesale.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit RGBA color, written as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
                Some(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Shortest hex form: alpha is omitted when opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {s}")))
    }
}

// ─── Sub-records ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeProperties {
    pub color: Color,
    /// Width in pixels.
    pub width: f64,
}

/// Polygon fill. `color2` and `pattern` are only used by patterned fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillProperties {
    pub color1: Color,
    pub color2: Option<Color>,
    /// Key into the pattern resource store.
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointProperties {
    /// Key into the icon resource store. `None` renders a plain circle.
    pub icon: Option<String>,
    /// Icon size in pixels.
    pub size: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    pub value: String,
    pub color: Color,
    /// Font size in pixels.
    pub size: f64,
}

/// Nested, partially-defined style record attached to each feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProperties {
    pub stroke: Option<StrokeProperties>,
    pub fill: Option<FillProperties>,
    pub point: Option<PointProperties>,
    pub text: Option<TextProperties>,
    pub z_index: Option<i32>,
}

impl StyleProperties {
    /// Shallow merge per sub-record: every sub-record present in `other`
    /// replaces ours, absent ones leave ours untouched.
    pub fn merge(&mut self, other: &StyleProperties) {
        if let Some(stroke) = &other.stroke {
            self.stroke = Some(stroke.clone());
        }
        if let Some(fill) = &other.fill {
            self.fill = Some(fill.clone());
        }
        if let Some(point) = &other.point {
            self.point = Some(point.clone());
        }
        if let Some(text) = &other.text {
            self.text = Some(text.clone());
        }
        if other.z_index.is_some() {
            self.z_index = other.z_index;
        }
    }

    /// Copy of `self` with `other` merged on top.
    #[must_use]
    pub fn merged(&self, other: &StyleProperties) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Half the point icon size plus half the stroke width, in pixels.
    /// This is how far a rendered feature visually extends past its geometry.
    pub fn visual_padding_px(&self) -> f64 {
        let icon = self.point.as_ref().map_or(0.0, |p| p.size / 2.0);
        let stroke = self.stroke.as_ref().map_or(0.0, |s| s.width / 2.0);
        icon + stroke
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");
        assert_eq!(Color::from_hex("f00").unwrap(), Color::rgb(255, 0, 0));

        let translucent = Color::from_hex("#FF000080").unwrap();
        assert_eq!(translucent.a, 128);
        assert_eq!(translucent.to_hex(), "#FF000080");

        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn merge_keeps_unrelated_sub_records() {
        let mut style = StyleProperties {
            stroke: Some(StrokeProperties {
                color: Color::BLACK,
                width: 2.0,
            }),
            text: Some(TextProperties {
                value: "Depot".into(),
                color: Color::BLACK,
                size: 12.0,
            }),
            ..Default::default()
        };
        let current = StyleProperties {
            stroke: Some(StrokeProperties {
                color: Color::rgb(255, 0, 0),
                width: 5.0,
            }),
            fill: Some(FillProperties {
                color1: Color::WHITE,
                color2: None,
                pattern: None,
            }),
            ..Default::default()
        };

        style.merge(&current);

        assert_eq!(style.stroke, current.stroke);
        assert_eq!(style.fill, current.fill);
        assert_eq!(style.text.as_ref().map(|t| t.value.as_str()), Some("Depot"));
        assert_eq!(style.point, None);
    }

    #[test]
    fn visual_padding_from_icon_and_stroke() {
        let style = StyleProperties {
            stroke: Some(StrokeProperties {
                color: Color::BLACK,
                width: 6.0,
            }),
            point: Some(PointProperties {
                icon: None,
                size: 8.0,
                color: Color::BLACK,
            }),
            ..Default::default()
        };
        assert_eq!(style.visual_padding_px(), 7.0);
        assert_eq!(StyleProperties::default().visual_padding_px(), 0.0);
    }
}
