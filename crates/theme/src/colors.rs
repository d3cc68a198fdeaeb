/// Normalised RGBA colour (each channel in `[0.0, 1.0]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const GREY:        Self = Self { r: 0.694, g: 0.694, b: 0.702, a: 1.0 }; // #b1b1b3
    pub const TRANSPARENT: Self = Self { r: 0.0,   g: 0.0,   b: 0.0,   a: 0.0 };

    /// Parse a CSS-style hex color string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let channel = |i: usize| -> Option<f32> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|b| f32::from(b) / 255.0)
        };

        let a = match hex.len() {
            6 => 1.0,
            8 => channel(6)?,
            _ => return None,
        };
        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)?, a })
    }

    /// Format as `#RRGGBBAA`.
    pub fn to_hex(self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }

    /// Return a copy with the alpha channel set to `alpha`.
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        let c = Color::from_hex("#ff0080").unwrap();
        assert_eq!((c.r, c.b, c.a), (1.0, 128.0 / 255.0, 1.0));

        let c = Color::from_hex("00000000").unwrap();
        assert_eq!(c, Color::TRANSPARENT);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
        assert_eq!(Color::from_hex("#ééé"), None);
    }

    #[test]
    fn hex_survives_formatting() {
        assert_eq!(Color::from_hex("#45a1ff").unwrap().to_hex(), "#45a1ffff");
        assert_eq!(Color::GREY.with_alpha(2.0).a, 1.0);
    }
}
