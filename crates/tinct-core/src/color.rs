use std::fmt;

use crate::shape::Channel;

/// Straight-alpha sRGB color with 8-bit channels.
///
/// Invariant:
/// - `r`, `g`, `b` are never premultiplied. Premultiplied channels are
///   derived on demand by [`premultiplied`](Self::premultiplied).
///
/// All conversions are exact integer arithmetic so that an unedited literal
/// re-renders to the same bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ColorValue {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for ColorValue {
    fn default() -> Self {
        Self::opaque(0, 0, 0)
    }
}

impl ColorValue {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub fn channel(self, ch: Channel) -> u8 {
        match ch {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::A => self.a,
        }
    }

    /// Returns a copy with one channel replaced.
    #[inline]
    pub fn with_channel(mut self, ch: Channel, value: u8) -> Self {
        match ch {
            Channel::R => self.r = value,
            Channel::G => self.g = value,
            Channel::B => self.b = value,
            Channel::A => self.a = value,
        }
        self
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Premultiplied value of one channel: `channel * a / 255`, rounded down.
    ///
    /// The alpha channel is returned unchanged.
    #[inline]
    pub fn premultiplied(self, ch: Channel) -> u8 {
        match ch {
            Channel::A => self.a,
            c => premultiply(self.channel(c), self.a),
        }
    }

    /// Premultiplied `[r, g, b, a]`.
    pub fn to_premultiplied(self) -> [u8; 4] {
        [
            premultiply(self.r, self.a),
            premultiply(self.g, self.a),
            premultiply(self.b, self.a),
            self.a,
        ]
    }

    /// Inverse of [`to_premultiplied`](Self::to_premultiplied).
    ///
    /// Each channel becomes the smallest straight value that premultiplies
    /// back to the stored one, so `to_premultiplied(from_premultiplied(p)) == p`
    /// whenever every stored channel is `<= a`. Stored channels above alpha
    /// saturate at 255.
    ///
    /// Lossy edge case: with `a == 0` every stored channel is zero and the
    /// straight color cannot be recovered; the result is transparent black.
    pub fn from_premultiplied([r, g, b, a]: [u8; 4]) -> Self {
        Self {
            r: unpremultiply(r, a),
            g: unpremultiply(g, a),
            b: unpremultiply(b, a),
            a,
        }
    }

    /// `0xRRGGBB`. Alpha is dropped.
    #[inline]
    pub fn to_hex_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Decodes `0xRRGGBB`; bits above the low 24 are ignored and alpha is 255.
    #[inline]
    pub fn from_hex_packed(hex: u32) -> Self {
        Self::opaque(((hex >> 16) & 0xFF) as u8, ((hex >> 8) & 0xFF) as u8, (hex & 0xFF) as u8)
    }

    /// `#rrggbbaa`, lowercase.
    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Channels scaled to `[0, 1]`.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Nearest 8-bit color for `[0, 1]` components. Out-of-range and NaN
    /// components are clamped.
    pub fn from_rgba_f32([r, g, b, a]: [f32; 4]) -> Self {
        fn quantize(x: f32) -> u8 {
            if x.is_nan() {
                return 0;
            }
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::new(quantize(r), quantize(g), quantize(b), quantize(a))
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[inline]
fn premultiply(c: u8, a: u8) -> u8 {
    (c as u16 * a as u16 / 255) as u8
}

#[inline]
fn unpremultiply(p: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = a as u16;
    ((p as u16 * 255 + a - 1) / a).min(255) as u8
}
