use std::fmt::{self, Display};

use log::info;

use common::{Button, ButtonSample, BUTTON_COUNT};

use crate::error::{Classify, ErrorKind};
use crate::hal::{ButtonInput, HardwareError, Level};

#[derive(Debug, PartialEq, Eq)]
pub struct DeviceError {
    pub button: Button,
    pub source: HardwareError,
}

impl Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error retrieving button {} value: {}", self.button, self.source)
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Classify for DeviceError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Device
    }
}

/// Samples the three buttons. Reads take no lock; every call looks at the
/// live inputs.
pub struct ButtonReader {
    inputs: [Box<dyn ButtonInput>; BUTTON_COUNT],
}

impl ButtonReader {
    /// `inputs` are buttons A, B and C in that order.
    pub fn new(inputs: [Box<dyn ButtonInput>; BUTTON_COUNT]) -> Self {
        Self { inputs }
    }

    pub fn read(&self) -> Result<ButtonSample, DeviceError> {
        let mut pressed = [false; BUTTON_COUNT];

        for (button, (input, slot)) in Button::ALL
            .into_iter()
            .zip(self.inputs.iter().zip(pressed.iter_mut()))
        {
            let level = input.level().map_err(|source| {
                info!("Button {}: read failed: {}", button, source);
                DeviceError { button, source }
            })?;

            // Buttons pull their input low while pressed
            *slot = level == Level::Low;
        }

        Ok(ButtonSample::new(pressed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimButton;

    fn reader() -> (ButtonReader, [SimButton; BUTTON_COUNT]) {
        let buttons = [SimButton::new(), SimButton::new(), SimButton::new()];
        let reader = ButtonReader::new([
            Box::new(buttons[0].clone()),
            Box::new(buttons[1].clone()),
            Box::new(buttons[2].clone()),
        ]);
        (reader, buttons)
    }

    #[test]
    fn test_all_high_is_released() {
        let (reader, _buttons) = reader();
        assert_eq!(ButtonSample::new([false, false, false]), reader.read().unwrap());
    }

    #[test]
    fn test_low_is_pressed() {
        let (reader, buttons) = reader();

        buttons[1].press();
        assert_eq!(ButtonSample::new([false, true, false]), reader.read().unwrap());

        buttons[1].release();
        buttons[2].press();
        assert_eq!(ButtonSample::new([false, false, true]), reader.read().unwrap());
    }

    #[test]
    fn test_reads_are_live() {
        let (reader, buttons) = reader();

        buttons[0].press();
        assert!(reader.read().unwrap().is_pressed(Button::A));
        buttons[0].release();
        assert!(!reader.read().unwrap().is_pressed(Button::A));
    }

    #[test]
    fn test_input_failure() {
        let (reader, buttons) = reader();

        buttons[2].break_input();
        let err = reader.read().unwrap_err();
        assert_eq!(Button::C, err.button);
        assert_eq!(ErrorKind::Device, err.kind());

        // Only that call fails
        buttons[2].repair();
        assert!(reader.read().is_ok());
    }
}
