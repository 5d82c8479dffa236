use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{GradiiError, GradiiResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha sRGB color with normalized `0..=1` channels.
///
/// Deserializes from `"#RGB"`, `"#RRGGBB"`, `"#RRGGBBAA"`, `{r,g,b[,a]}`, `{h,s,l[,a]}` or
/// `[r,g,b[,a]]`; serializes back to a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Construct from normalized channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    }

    /// Parse a CSS-style hex color.
    pub fn from_hex(s: &str) -> GradiiResult<Self> {
        parse_hex(s).map_err(GradiiError::validation)
    }

    /// Straight-alpha 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Premultiplied 8-bit channels.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        let r = (self.r.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let g = (self.g.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let b = (self.b.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);

        Rgba8Premul {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn with_alpha_mul(self, factor: f64) -> Self {
        Self {
            a: (self.a * factor.clamp(0.0, 1.0)).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Lowercase `#rrggbb` (or `#rrggbbaa` when not opaque).
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            HslaObj {
                h: f64,
                s: f64,
                l: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::HslaObj { h, s, l, a } => Ok(hsla_to_rgba(h, s, l, a)),
            Repr::Arr(v) => {
                if v.len() == 3 {
                    Ok(Self::rgba(v[0], v[1], v[2], 1.0))
                } else if v.len() == 4 {
                    Ok(Self::rgba(v[0], v[1], v[2], v[3]))
                } else {
                    Err(serde::de::Error::custom(
                        "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                    ))
                }
            }
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let (r, g, b, a) = match s.len() {
        3 => {
            let nib = |i: usize| hex_byte(&s[i..i + 1]).map(|v| v * 17);
            (nib(0)?, nib(1)?, nib(2)?, 255)
        }
        6 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            (r, g, b, 255)
        }
        8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = hex_byte(&s[6..8])?;
            (r, g, b, a)
        }
        _ => {
            return Err(
                "hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned(),
            );
        }
    };

    Ok(Color::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    Color::rgba(r, g, b, a)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
