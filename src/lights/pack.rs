use packed_struct::{prelude::*, types::bits::Bits};

use common::{Rgb, LED_COUNT};

use super::LightArray;

pub const START_BYTES: usize = 4;
pub const BYTES_PER_LED: usize = 4;
pub const END_BYTES: usize = 4;
pub const FRAME_LEN: usize = START_BYTES + LED_COUNT * BYTES_PER_LED + END_BYTES;

/// Global brightness field of every LED record. The arc always runs at full
/// brightness, colours are scaled through the RGB values instead.
pub const MAX_BRIGHTNESS: u8 = 0x1F;

/// First byte of every LED record: marker bits plus [`MAX_BRIGHTNESS`].
pub const LED_HEADER_BYTE: u8 = 0xE0 | MAX_BRIGHTNESS;

/// Trailing bytes that clock the data through the whole daisy chain.
pub const END_MARKER: u8 = 0xFF;

/// One complete transfer to the arc.
pub type WireFrame = [u8; FRAME_LEN];

// LED record (32-bit), sent in this order:
// Byte # | Bits & Definition
// 0      | 0xE0 = Marker, always 111
//        | 0x1F = Global brightness
// 1      | 0xFF = Blue
// 2      | 0xFF = Green
// 3      | 0xFF = Red
#[derive(PackedStruct, Default, Debug, PartialEq, Clone)]
#[packed_struct(bit_numbering = "msb0")]
pub struct LedPack {
    #[packed_field(bits = "0..=2")]
    pub _marker: ReservedOne<packed_bits::Bits<3>>,
    #[packed_field(bits = "3..=7")]
    pub brightness: Integer<u8, Bits<5>>,
    #[packed_field(bits = "8..=15")]
    pub blue: u8,
    #[packed_field(bits = "16..=23")]
    pub green: u8,
    #[packed_field(bits = "24..=31")]
    pub red: u8,
}

impl From<Rgb> for LedPack {
    fn from(color: Rgb) -> Self {
        LedPack {
            brightness: MAX_BRIGHTNESS.into(),
            blue: color.b,
            green: color.g,
            red: color.r,
            ..Default::default()
        }
    }
}

/// Build the frame that shows `lights` on the arc: the start marker, one
/// record per light in index order, then the end marker.
pub fn encode(lights: &LightArray) -> Result<WireFrame, PackingError> {
    let mut frame = [0u8; FRAME_LEN];

    for (i, color) in lights.iter().enumerate() {
        let offset = START_BYTES + i * BYTES_PER_LED;
        frame[offset..offset + BYTES_PER_LED].copy_from_slice(&LedPack::from(*color).pack()?);
    }

    frame[FRAME_LEN - END_BYTES..].fill(END_MARKER);

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_pack_black() -> Result<(), PackingError> {
        assert_eq!([0xFF, 0x00, 0x00, 0x00], LedPack::from(Rgb::BLACK).pack()?);

        // The marker bits are set even with zero brightness
        assert_eq!([0xE0, 0x00, 0x00, 0x00], LedPack::default().pack()?);

        Ok(())
    }

    #[test]
    fn test_led_pack_color_order() -> Result<(), PackingError> {
        assert_eq!(
            [0xFF, 0x56, 0x34, 0x12],
            LedPack::from(Rgb::new(0x12, 0x34, 0x56)).pack()?
        );

        assert_eq!(
            [0xE5, 0x03, 0x02, 0x01],
            LedPack {
                brightness: 5.into(),
                blue: 3,
                green: 2,
                red: 1,
                ..LedPack::default()
            }
            .pack()?
        );

        Ok(())
    }

    #[test]
    fn test_encode_all_black() -> Result<(), PackingError> {
        let frame = encode(&LightArray::default())?;

        assert_eq!(36, frame.len());
        assert_eq!([0x00; 4], frame[..4]);
        for i in 0..LED_COUNT {
            let offset = START_BYTES + i * BYTES_PER_LED;
            assert_eq!([LED_HEADER_BYTE, 0, 0, 0], frame[offset..offset + 4]);
        }
        assert_eq!([0xFF; 4], frame[32..]);

        Ok(())
    }

    #[test]
    fn test_encode_positions() -> Result<(), PackingError> {
        let mut lights = LightArray::default();
        lights.set(0, Rgb::new(0xFF, 0x00, 0x00));
        lights.set(6, Rgb::new(0x01, 0x02, 0x03));

        let frame = encode(&lights)?;

        assert_eq!([LED_HEADER_BYTE, 0x00, 0x00, 0xFF], frame[4..8]);
        assert_eq!([LED_HEADER_BYTE, 0x03, 0x02, 0x01], frame[28..32]);
        assert_eq!([LED_HEADER_BYTE, 0x00, 0x00, 0x00], frame[8..12]);

        Ok(())
    }
}
