use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ImagePayload;
use crate::error::MemeError;

pub const MIN_FONT_SIZE: u32 = 20;
pub const MAX_FONT_SIZE: u32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// An opaque sRGB colour written as `#RGB` or `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor { r: 255, g: 255, b: 255 };
    pub const BLACK: HexColor = HexColor { r: 0, g: 0, b: 0 };

    pub fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl FromStr for HexColor {
    type Err = MemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MemeError::InvalidStyle(format!("invalid color: {}", s));
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Ok(HexColor {
                    r: expand(0)?,
                    g: expand(1)?,
                    b: expand(2)?,
                })
            }
            6 => Ok(HexColor {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = MemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(deserialize_with = "clamped_font_size")]
    font_size: u32,
    pub color: HexColor,
    #[serde(rename = "textAlign", default)]
    pub alignment: Alignment,
}

fn clamped_font_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_font_size(raw.round().max(0.0) as u32))
}

fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            color: HexColor::WHITE,
            alignment: Alignment::Center,
        }
    }
}

impl TextStyle {
    pub fn new(font_size: u32, color: HexColor, alignment: Alignment) -> Self {
        Self {
            font_size: clamp_font_size(font_size),
            color,
            alignment,
        }
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = clamp_font_size(size);
    }

    pub fn set_color(&mut self, hex: &str) -> Result<(), MemeError> {
        self.color = hex.parse()?;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything the compositor needs to draw one meme.
#[derive(Debug, Clone, PartialEq)]
pub struct MemeDocument {
    pub image: ImagePayload,
    pub top_text: String,
    pub bottom_text: String,
    pub top_style: TextStyle,
    pub bottom_style: TextStyle,
}

impl MemeDocument {
    pub fn new(image: ImagePayload) -> Self {
        Self {
            image,
            top_text: String::new(),
            bottom_text: String::new(),
            top_style: TextStyle::default(),
            bottom_style: TextStyle::default(),
        }
    }

    pub fn with_text(mut self, top: impl Into<String>, bottom: impl Into<String>) -> Self {
        self.top_text = top.into();
        self.bottom_text = bottom.into();
        self
    }

    pub fn with_styles(mut self, top: TextStyle, bottom: TextStyle) -> Self {
        self.top_style = top;
        self.bottom_style = bottom;
        self
    }

    pub fn band(&self, band: Band) -> (&str, &TextStyle) {
        match band {
            Band::Top => (&self.top_text, &self.top_style),
            Band::Bottom => (&self.bottom_text, &self.bottom_style),
        }
    }
}
