use std::path::Path;

use anyhow::Error;
use pi_pinout::{GpioPin, PhysicalPin, WiringPiPin};
use serde::{Deserialize, Serialize};

use common::BUTTON_COUNT;

pub const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub leds: LedConfig,
    pub buzzer: BuzzerConfig,
    pub buttons: ButtonsConfig,
    pub apps: AppConfig,
}

/// SPI link to the light arc.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LedConfig {
    pub bus: u8,
    pub slave_select: u8,
    pub clock_hz: u32,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            slave_select: 0,
            clock_hz: 1_000_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BuzzerConfig {
    /// Hardware PWM channel driving the buzzer
    pub channel: u8,
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self { channel: 1 }
    }
}

/// Inputs for buttons A, B and C, in that order. In `config.ron` the pins are
/// a tuple: `pins: (Gpio(GpioPin(21)), Gpio(GpioPin(20)), Gpio(GpioPin(16)))`.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ButtonsConfig {
    pub pins: [Pin; BUTTON_COUNT],
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            pins: [
                Pin::Gpio(GpioPin(21)),
                Pin::Gpio(GpioPin(20)),
                Pin::Gpio(GpioPin(16)),
            ],
        }
    }
}

/// Settings for the bundled metronome and piano.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bpm: u32,
    pub first_beat_color: String,
    pub other_beat_color: String,
    /// Tones for buttons A, B and C in Hz, written as a tuple `(262, 330, 392)`
    pub tones: [u64; BUTTON_COUNT],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bpm: 90,
            first_beat_color: "FF0000".to_string(),
            other_beat_color: "FF00FF".to_string(),
            tones: [262, 330, 392],
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum Pin {
    Physical(PhysicalPin),
    Gpio(GpioPin),
    WiringPi(WiringPiPin),
}

impl Pin {
    /// The BCM GPIO number for this pin.
    pub fn gpio(self) -> GpioPin {
        match self {
            Pin::Physical(pin) => pin.into(),
            Pin::Gpio(pin) => pin,
            Pin::WiringPi(pin) => pin.into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Error> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Config, Error> {
        let config = std::fs::read_to_string(path)?;
        let config: Config = ron::from_str(&config)?;
        Ok(config)
    }

    /// Load `config.ron` if there is one, otherwise use the Rainbow HAT's
    /// standard wiring.
    pub fn load_or_default() -> Result<Config, Error> {
        match Path::new(CONFIG_FILE).exists() {
            true => Self::load(),
            false => {
                log::warn!("No {CONFIG_FILE} found, using default wiring");
                Ok(Config::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        // Write an example config file
        let path = std::env::temp_dir().join(format!(
            "rainbow-hat-test-config-{}.ron",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"(
    leds: (
        bus: 0,
        slave_select: 1,
        clock_hz: 500000,
    ),
    buttons: (
        pins: (
            Physical(PhysicalPin(40)),
            Gpio(GpioPin(20)),
            Gpio(GpioPin(16)),
        ),
    ),
    apps: (
        bpm: 120,
    ),
)"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.leds,
            LedConfig {
                bus: 0,
                slave_select: 1,
                clock_hz: 500_000,
            }
        );
        assert_eq!(config.buzzer, BuzzerConfig::default());
        assert_eq!(
            config.buttons.pins[0],
            Pin::Physical(pi_pinout::PhysicalPin(40))
        );
        assert_eq!(config.apps.bpm, 120);
        assert_eq!(config.apps.tones, [262, 330, 392]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_fixed_size_lists_are_tuples() {
        // Three-element arrays are written as RON tuples
        let apps: AppConfig = ron::from_str("(tones: (440, 494, 523))").unwrap();
        assert_eq!([440, 494, 523], apps.tones);

        assert!(ron::from_str::<AppConfig>("(tones: [440, 494, 523])").is_err());
    }

    #[test]
    fn test_gpio_pin() {
        assert_eq!(GpioPin(20), Pin::Gpio(GpioPin(20)).gpio());
    }
}
