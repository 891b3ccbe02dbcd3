use std::fmt;

/// Accent color derived from the current track's artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AccentColor {
    /// Dark gray used whenever no artwork color is available.
    pub const NEUTRAL: AccentColor = AccentColor::new(0x42, 0x42, 0x42);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
