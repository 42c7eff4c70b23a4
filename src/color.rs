//! Base colors for emitted particles.
//!
//! Gesture handlers usually describe colors as short strings (`"#ff8800"`,
//! `"cyan"`), so [`Color`] parses the common CSS forms:
//!
//! | Form | Example |
//! |------|---------|
//! | Short hex | `#f80` |
//! | Hex | `#ff8800`, `0xff8800` |
//! | Functional | `rgb(255, 136, 0)` |
//! | Named | `orange`, `hotpink`, `white` |
//!
//! Components are stored as `f32` in `0.0..=1.0`. Per-particle tinting may
//! push them above 1.0; clamping is the renderer's job.

use crate::error::ParseColorError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB color with components nominally in `0.0..=1.0`.
///
/// # Example
///
/// ```
/// use burstpool::Color;
///
/// let orange: Color = "#ff8800".parse().unwrap();
/// assert_eq!(orange, Color::from_hex(0xff8800));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "[f32; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Build a color from float components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_bytes(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Build a color from 8-bit components.
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Multiply every channel by the same factor.
    ///
    /// Keeps the ratio between channels, so the hue is unchanged.
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        Self::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[f32; 3]> for Color {
    fn from(c: [f32; 3]) -> Self {
        Color::rgb(c[0], c[1], c[2])
    }
}

impl From<Color> for [f32; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

impl From<Vec3> for Color {
    fn from(v: Vec3) -> Self {
        Color::rgb(v.x, v.y, v.z)
    }
}

impl From<Color> for Vec3 {
    fn from(c: Color) -> Self {
        c.to_vec3()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex_digits(hex).ok_or_else(|| ParseColorError::new(s));
        }
        if let Some(hex) = text.strip_prefix("0x") {
            return match hex.len() {
                6 => parse_hex_digits(hex).ok_or_else(|| ParseColorError::new(s)),
                _ => Err(ParseColorError::new(s)),
            };
        }
        if let Some(args) = text
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args).ok_or_else(|| ParseColorError::new(s));
        }

        named_color(&text)
            .map(Color::from_hex)
            .ok_or_else(|| ParseColorError::new(s))
    }
}

fn parse_hex_digits(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            // #rgb expands each nibble: #f80 == #ff8800
            let packed = u32::from_str_radix(hex, 16).ok()?;
            let expand = |n: u32| (n << 4 | n) as u8;
            Some(Color::from_bytes(
                expand((packed >> 8) & 0xf),
                expand((packed >> 4) & 0xf),
                expand(packed & 0xf),
            ))
        }
        6 => u32::from_str_radix(hex, 16).ok().map(Color::from_hex),
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Color> {
    let parts: Vec<u8> = args
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color::from_bytes(*r, *g, *b)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<u32> {
    let hex = match name {
        "black" => 0x000000,
        "white" => 0xffffff,
        "red" => 0xff0000,
        "lime" => 0x00ff00,
        "green" => 0x008000,
        "blue" => 0x0000ff,
        "yellow" => 0xffff00,
        "cyan" | "aqua" => 0x00ffff,
        "magenta" | "fuchsia" => 0xff00ff,
        "orange" => 0xffa500,
        "orangered" => 0xff4500,
        "gold" => 0xffd700,
        "pink" => 0xffc0cb,
        "hotpink" => 0xff69b4,
        "deeppink" => 0xff1493,
        "purple" => 0x800080,
        "violet" => 0xee82ee,
        "skyblue" => 0x87ceeb,
        "deepskyblue" => 0x00bfff,
        "springgreen" => 0x00ff7f,
        "coral" => 0xff7f50,
        "silver" => 0xc0c0c0,
        "gray" | "grey" => 0x808080,
        _ => return None,
    };
    Some(hex)
}

/// Accepted serialized shapes: a color string or an `[r, g, b]` array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Text(String),
    Rgb([f32; 3]),
}

impl TryFrom<ColorRepr> for Color {
    type Error = ParseColorError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Text(s) => s.parse(),
            ColorRepr::Rgb(c) => Ok(Color::from(c)),
        }
    }
}
