//! A color type used for clear colors and color uniforms.

use crate::shader::{Uniform, UniformValue};

/// A color with red, green, blue and alpha components. All components are expected to be
/// between 0 and 1, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Creates a new, completely opaque (alpha = 1), color.
    ///
    /// All parameters are clamped so that they are between 0 and 1, both inclusive.
    pub fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color::rgba(r, g, b, 1.0)
    }

    /// Creates a new color.
    ///
    /// All parameters are clamped so that they are between 0 and 1, both inclusive.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Creates a new, completely opaque, color from hue, saturation and lightness. `hue` wraps
    /// around at 1.
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color {
        let saturation = saturation.clamp(0.0, 1.0);
        let lightness = lightness.clamp(0.0, 1.0);
        let hue = hue.rem_euclid(1.0);

        if saturation <= 0.0 {
            return Color::rgb(lightness, lightness, lightness);
        }

        let q = if lightness < 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness*saturation
        };
        let p = 2.0*lightness - q;

        let hue_to_rgb = |hue: f32| {
            let hue = hue.rem_euclid(1.0);
            if hue < 1.0/6.0 { return p + (q - p)*6.0*hue }
            if hue < 1.0/2.0 { return q }
            if hue < 2.0/3.0 { return p + (q - p)*(2.0/3.0 - hue)*6.0 }
            p
        };

        Color::rgb(hue_to_rgb(hue + 1.0/3.0), hue_to_rgb(hue), hue_to_rgb(hue - 1.0/3.0))
    }

    /// Creates a color from a hex int. Bit `16..24` are the red channel, bit `8..16` the green
    /// channel and bit `0..8` the blue channel. The returned color is completely opaque.
    ///
    /// # Example
    /// ```rust
    /// # use easel::Color;
    /// let color = Color::hex_int(0xff00ff);
    ///
    /// assert_eq!(color, Color::rgb(1.0, 0.0, 1.0));
    /// ```
    pub fn hex_int(value: u32) -> Color {
        let r = (value >> 16 & 0xff) as f32 / 255.0;
        let g = (value >> 8 & 0xff) as f32 / 255.0;
        let b = (value & 0xff) as f32 / 255.0;

        Color { r, g, b, a: 1.0 }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::BLACK
    }
}

impl UniformValue for Color {
    fn to_uniform(&self) -> Uniform {
        Uniform::Vec4(self.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_int_splits_channels() {
        assert_eq!(Color::hex_int(0xff0000), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::hex_int(0x00ff00), Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(Color::hex_int(0x0000ff).to_array(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn components_are_clamped() {
        let color = Color::rgba(2.0, -1.0, 0.5, 3.0);
        assert_eq!(color.to_array(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn hsl_primaries() {
        let red = Color::hsl(0.0, 1.0, 0.5);
        assert!((red.r - 1.0).abs() < 1e-5 && red.g.abs() < 1e-5 && red.b.abs() < 1e-5);

        let grey = Color::hsl(0.3, 0.0, 0.25);
        assert_eq!(grey, Color::rgb(0.25, 0.25, 0.25));
    }
}
