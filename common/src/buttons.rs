use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::BUTTON_COUNT;

pub const STATUS_PRESSED: u8 = b'1';
pub const STATUS_RELEASED: u8 = b'0';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    C,
}

impl Button {
    /// Buttons in the order they are sampled and reported.
    pub const ALL: [Button; BUTTON_COUNT] = [Button::A, Button::B, Button::C];

    pub fn position(self) -> usize {
        match self {
            Button::A => 0,
            Button::B => 1,
            Button::C => 2,
        }
    }

    pub fn name(self) -> char {
        match self {
            Button::A => 'A',
            Button::B => 'B',
            Button::C => 'C',
        }
    }
}

impl Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Pressed state of every button at one instant, `true` meaning pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSample {
    pub pressed: [bool; BUTTON_COUNT],
}

impl ButtonSample {
    pub fn new(pressed: [bool; BUTTON_COUNT]) -> Self {
        Self { pressed }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.position()]
    }

    /// The first pressed button in A, B, C order. The board can only tell
    /// one press apart at a time, so later buttons are not reported.
    pub fn first_pressed(&self) -> Option<Button> {
        Button::ALL
            .into_iter()
            .find(|button| self.is_pressed(*button))
    }

    /// Status characters as the buttons endpoint reports them.
    pub fn to_status(&self) -> [u8; BUTTON_COUNT] {
        self.pressed.map(|pressed| match pressed {
            true => STATUS_PRESSED,
            false => STATUS_RELEASED,
        })
    }

    /// Inverse of [`ButtonSample::to_status`]. Returns `None` if any byte is
    /// not a status character.
    pub fn from_status(status: [u8; BUTTON_COUNT]) -> Option<Self> {
        let mut pressed = [false; BUTTON_COUNT];
        for (slot, byte) in pressed.iter_mut().zip(status) {
            *slot = match byte {
                STATUS_PRESSED => true,
                STATUS_RELEASED => false,
                _ => return None,
            };
        }
        Some(Self { pressed })
    }
}
