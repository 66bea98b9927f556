use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Split a big-endian `0xRRGGBB` value into its channels. The top byte is
    /// ignored.
    pub const fn from_u24(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub const fn to_u24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Formats as the six upper-case hex digits the command grammar uses.
impl Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_from_u24() {
        assert_eq!(Rgb::new(0x12, 0x34, 0x56), Rgb::from_u24(0x123456));
        assert_eq!(Rgb::new(0xFF, 0x00, 0x00), Rgb::from_u24(0xFF0000));
        assert_eq!(Rgb::BLACK, Rgb::from_u24(0xFF000000));
    }

    #[test]
    fn test_display() {
        assert_eq!("00FF0A", Rgb::new(0x00, 0xFF, 0x0A).to_string());
        assert_eq!(0x00FF0A, Rgb::new(0x00, 0xFF, 0x0A).to_u24());
    }
}
