use std::ops::{ Add, Mul };

use crate::feq;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Channels
/// accumulate unbounded while recursive contributions are summed; `clamp`
/// caps them at 1.0 once per pixel before output.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Compared component-wise, accounting for possible floating point error.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// The color white.
    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    /// Caps every channel at 1.0.
    pub fn clamp(&self) -> Color {
        Color {
            r: if self.r > 1.0 { 1.0 } else { self.r },
            g: if self.g > 1.0 { 1.0 } else { self.g },
            b: if self.b > 1.0 { 1.0 } else { self.b },
        }
    }

    /// Converts each channel to its 0-255 output integer.
    ///
    /// Channels above 1.0 saturate to 255; everything else is floored,
    /// so 1.0 itself maps to 255 only after `clamp` has run.
    pub fn to_bytes(&self) -> [u8; 3] {
        let channel = |c: f64| -> u8 {
            if c > 1.0 {
                255
            } else {
                (c * 255.0) as u8
            }
        };

        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Component-wise product, for modulating a surface color by a light's
/// color.
impl Mul for Color {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
        }
    }
}

/* Tests */

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn scale_color() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn multiply_colors_componentwise() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn clamp_caps_hot_channels_only() {
    let c = Color::rgb(1.5, 0.5, 2.0);

    assert_eq!(c.clamp(), Color::rgb(1.0, 0.5, 1.0));
}

#[test]
fn bytes_floor_in_range() {
    let c = Color::rgb(0.5, 0.0, 0.999);

    assert_eq!(c.to_bytes(), [127, 0, 254]);
}

#[test]
fn bytes_saturate_above_one() {
    let c = Color::rgb(1.5, 3.0, 1.0001);

    assert_eq!(c.to_bytes(), [255, 255, 255]);
}
