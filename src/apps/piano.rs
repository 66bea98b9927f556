use std::time::Duration;

use log::{debug, info};

use common::{Button, BUTTON_COUNT};

use crate::client::{ClientError, RainbowHat};
use crate::config::AppConfig;
use crate::sync::Interrupter;

use super::{finish, sleep_unless_raised};

pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Plays a tone while a button is held. With several held, the first in
/// A, B, C order wins.
pub struct Piano {
    tones: [u64; BUTTON_COUNT],
}

impl Piano {
    /// `tones` in Hz for buttons A, B and C.
    pub fn new(tones: [u64; BUTTON_COUNT]) -> Self {
        Self { tones }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.tones)
    }

    /// Tone for the held button, 0 for none.
    pub fn tone(&self, button: Option<Button>) -> u64 {
        button.map_or(0, |button| self.tones[button.position()])
    }

    /// Run until `interrupter` is raised.
    pub async fn run(&self, hat: &RainbowHat, interrupter: &Interrupter) -> Result<(), ClientError> {
        info!("Piano: tones {:?} Hz", self.tones);
        let result = self.play(hat, interrupter).await;
        finish("Piano", interrupter, result)
    }

    async fn play(&self, hat: &RainbowHat, interrupter: &Interrupter) -> Result<(), ClientError> {
        let interrupt = interrupter.subscribe();
        let mut playing = None;

        loop {
            let tone = self.tone(hat.active_button()?);
            if playing != Some(tone) {
                debug!("Piano: tone {} Hz", tone);
                hat.play_tone(tone).await?;
                playing = Some(tone);
            }

            if !sleep_unless_raised(&interrupt, POLL_INTERVAL).await {
                break;
            }
        }

        info!("Piano: stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone() {
        let piano = Piano::new([262, 330, 392]);

        assert_eq!(0, piano.tone(None));
        assert_eq!(262, piano.tone(Some(Button::A)));
        assert_eq!(330, piano.tone(Some(Button::B)));
        assert_eq!(392, piano.tone(Some(Button::C)));
    }
}
