use std::time::Duration;

use log::{info, warn};
use tokio::time::Instant;

use common::LED_PINS;

use crate::client::{ClientError, RainbowHat};
use crate::config::AppConfig;
use crate::sync::Interrupter;

use super::{finish, sleep_unless_raised};

pub const BEATS_PER_BAR: usize = 3;

/// How long the lights stay on each beat.
pub const FLASH_DURATION: Duration = Duration::from_millis(100);

/// Lights for `beat` (0-based): the whole arc, then the upper three, then the
/// lower three.
pub fn beat_pins(beat: usize) -> &'static [u8] {
    match beat % BEATS_PER_BAR {
        0 => &LED_PINS,
        1 => &LED_PINS[4..],
        _ => &LED_PINS[..3],
    }
}

/// Flashes the arc in time.
pub struct Metronome {
    bpm: u32,
    first_beat_color: String,
    other_beat_color: String,
}

impl Metronome {
    pub fn new(bpm: u32, first_beat_color: &str, other_beat_color: &str) -> Self {
        let bpm = match bpm {
            0 => {
                warn!("Metronome: 0 bpm, using 1");
                1
            }
            bpm => bpm,
        };

        Self {
            bpm,
            first_beat_color: first_beat_color.to_string(),
            other_beat_color: other_beat_color.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.bpm,
            &config.first_beat_color,
            &config.other_beat_color,
        )
    }

    pub fn beat_duration(&self) -> Duration {
        Duration::from_secs(60) / self.bpm
    }

    fn beat_color(&self, beat: usize) -> &str {
        match beat % BEATS_PER_BAR {
            0 => &self.first_beat_color,
            _ => &self.other_beat_color,
        }
    }

    /// Run until `interrupter` is raised.
    pub async fn run(&self, hat: &RainbowHat, interrupter: &Interrupter) -> Result<(), ClientError> {
        info!("Metronome: {} bpm", self.bpm);
        let result = self.beat(hat, interrupter).await;
        finish("Metronome", interrupter, result)
    }

    async fn beat(&self, hat: &RainbowHat, interrupter: &Interrupter) -> Result<(), ClientError> {
        let interrupt = interrupter.subscribe();

        for beat in (0..BEATS_PER_BAR).cycle() {
            if interrupt.is_raised() {
                break;
            }
            let start = Instant::now();

            hat.light_on(beat_pins(beat), &[self.beat_color(beat)])
                .await?;
            let flashed = sleep_unless_raised(&interrupt, FLASH_DURATION).await;
            hat.light_off().await?;
            if !flashed {
                break;
            }

            // Time spent on the LEDs counts towards the beat
            let rest = self.beat_duration().saturating_sub(start.elapsed());
            if !sleep_unless_raised(&interrupt, rest).await {
                break;
            }
        }

        info!("Metronome: stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_pins() {
        assert_eq!(&[0, 1, 2, 3, 4, 5, 6], beat_pins(0));
        assert_eq!(&[4, 5, 6], beat_pins(1));
        assert_eq!(&[0, 1, 2], beat_pins(2));
        assert_eq!(beat_pins(0), beat_pins(3));
    }

    #[test]
    fn test_beat_duration() {
        let metronome = Metronome::new(90, "FF0000", "FF00FF");
        assert_eq!(666, metronome.beat_duration().as_millis());

        assert_eq!(
            Duration::from_secs(60),
            Metronome::new(0, "FF0000", "FF00FF").beat_duration()
        );
    }

    #[test]
    fn test_beat_colors() {
        let metronome = Metronome::new(90, "FF0000", "FF00FF");
        assert_eq!("FF0000", metronome.beat_color(0));
        assert_eq!("FF00FF", metronome.beat_color(1));
        assert_eq!("FF00FF", metronome.beat_color(2));
    }
}
