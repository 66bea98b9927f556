#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buttons;
pub mod color;
pub mod command;

pub use buttons::{Button, ButtonSample};
pub use color::Rgb;
pub use command::{parse, Commands, LightAssignment, ParseError};

// Board constants
pub const LED_COUNT: usize = 7;
pub const BUTTON_COUNT: usize = 3;

/// Longest command the light endpoint accepts, in bytes.
pub const MAX_COMMAND_LEN: usize = 70;

/// The buzzer endpoint takes one native-endian `u64` per write.
pub const FREQUENCY_WIDTH: usize = core::mem::size_of::<u64>();

/// Every light index on the arc, in order.
pub const LED_PINS: [u8; LED_COUNT] = [0, 1, 2, 3, 4, 5, 6];

/// Bounded command text, as sent to the light endpoint.
pub type CommandText = heapless::String<MAX_COMMAND_LEN>;
