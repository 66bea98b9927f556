//! Convenience client for applications driving the whole HAT.
//!
//! [`RainbowHat`] opens the three endpoints together, turns pin/colour lists
//! into light commands and renders failures into a fixed-size message buffer
//! so callers can report them without allocating.

use std::fmt::{self, Display, Write};

use log::{debug, info, warn};

use common::{Button, ButtonSample, CommandText, BUTTON_COUNT, LED_COUNT, LED_PINS};

use crate::board::{Board, OpenError, Peripheral};
use crate::endpoint::{ButtonsEndpoint, BuzzerEndpoint, EndpointError, LedEndpoint};
use crate::error::{Classify, ErrorKind};
use crate::sync::Interrupt;

/// Size of the buffer error messages are rendered into.
pub const ERR_BUF_SIZE: usize = 256;

pub type ErrorMessage = heapless::String<ERR_BUF_SIZE>;

const COLOR_DIGITS: usize = 6;
const OFF: &str = "000000";

/// Arguments rejected before anything is sent to the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgError {
    NoPins,
    TooManyPins { count: usize },
    NoColors,
    /// A colour that is not exactly six hex digits
    InvalidColor { position: usize },
    /// The pins and colours do not fit in one command
    CommandTooLong,
}

impl Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgError::NoPins => write!(f, "no pins given"),
            ArgError::TooManyPins { count } => {
                write!(f, "{count} pins given, the arc has {LED_COUNT}")
            }
            ArgError::NoColors => write!(f, "no colours given"),
            ArgError::InvalidColor { position } => {
                write!(f, "colour {position} is not six hex digits")
            }
            ArgError::CommandTooLong => write!(f, "light command too long"),
        }
    }
}

impl std::error::Error for ArgError {}

impl Classify for ArgError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Arg
    }
}

#[derive(Debug)]
pub enum ClientError {
    Open(OpenError),
    Arg(ArgError),
    Led(EndpointError),
    Buzzer(EndpointError),
    Buttons(EndpointError),
    /// The connection to this peripheral is closed
    Unavailable(Peripheral),
    /// The buttons endpoint reported bytes that are not status characters
    BadStatus([u8; BUTTON_COUNT]),
}

impl ClientError {
    /// The peripheral the failure belongs to.
    pub fn peripheral(&self) -> Peripheral {
        match self {
            ClientError::Open(e) => e.peripheral,
            ClientError::Arg(_) | ClientError::Led(_) => Peripheral::Leds,
            ClientError::Buzzer(_) => Peripheral::Buzzer,
            ClientError::Buttons(_) | ClientError::BadStatus(_) => Peripheral::Buttons,
            ClientError::Unavailable(peripheral) => *peripheral,
        }
    }

    fn summary(&self) -> &'static str {
        match (self.peripheral(), self.kind()) {
            (_, ErrorKind::Busy | ErrorKind::Interrupted) => "Device busy!",
            (_, ErrorKind::DeviceUnavailable) => "Device unavailable!",
            (Peripheral::Buzzer, ErrorKind::Range) => "Invalid argument - validate frequency!",
            (_, ErrorKind::Parse | ErrorKind::Range | ErrorKind::Arg) => "Invalid argument!",
            (_, ErrorKind::Transport | ErrorKind::Device) => "Device error!",
        }
    }

    /// Render a message such as `LED-Device: Device busy! (...)` into `buf`,
    /// replacing its contents. Never allocates. Returns `false` if the message
    /// had to be cut short to fit.
    pub fn write_message<const N: usize>(&self, buf: &mut heapless::String<N>) -> bool {
        buf.clear();

        let prefix = match self.peripheral() {
            Peripheral::Leds => "LED-Device",
            Peripheral::Buzzer => "Buzzer-Device",
            Peripheral::Buttons => "Button-Device",
        };

        let mut out = Truncating {
            buf,
            truncated: false,
        };
        // Truncating never reports an error, it records the overflow instead
        let _ = write!(out, "{}: {} ({})", prefix, self.summary(), self);

        if out.truncated {
            warn!("Error message truncated to {} bytes", N);
        }
        !out.truncated
    }
}

/// Writes as much as fits, stopping at a char boundary.
struct Truncating<'a, const N: usize> {
    buf: &'a mut heapless::String<N>,
    truncated: bool,
}

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.truncated || self.buf.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Open(e) => write!(f, "{e}"),
            ClientError::Arg(e) => write!(f, "{e}"),
            ClientError::Led(e) | ClientError::Buzzer(e) | ClientError::Buttons(e) => {
                write!(f, "{e}")
            }
            ClientError::Unavailable(peripheral) => {
                write!(f, "{peripheral} connection is closed")
            }
            ClientError::BadStatus(status) => {
                write!(f, "unexpected button status {:?}", status)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Open(e) => Some(e),
            ClientError::Arg(e) => Some(e),
            ClientError::Led(e) | ClientError::Buzzer(e) | ClientError::Buttons(e) => Some(e),
            ClientError::Unavailable(_) | ClientError::BadStatus(_) => None,
        }
    }
}

impl Classify for ClientError {
    fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Open(e) => e.kind(),
            ClientError::Arg(e) => e.kind(),
            ClientError::Led(e) | ClientError::Buzzer(e) | ClientError::Buttons(e) => e.kind(),
            ClientError::Unavailable(_) => ErrorKind::DeviceUnavailable,
            ClientError::BadStatus(_) => ErrorKind::Device,
        }
    }
}

impl From<OpenError> for ClientError {
    fn from(e: OpenError) -> Self {
        ClientError::Open(e)
    }
}

impl From<ArgError> for ClientError {
    fn from(e: ArgError) -> Self {
        ClientError::Arg(e)
    }
}

/// Build the light command for `pins` and `colors`.
///
/// With one colour, or one colour per pin, pin `i` gets `colors[i]` (the last
/// colour repeating). Any other count lights every pin with the first colour.
pub fn light_command(pins: &[u8], colors: &[&str]) -> Result<CommandText, ArgError> {
    if pins.is_empty() {
        return Err(ArgError::NoPins);
    }
    if pins.len() > LED_COUNT {
        return Err(ArgError::TooManyPins { count: pins.len() });
    }
    if colors.is_empty() {
        return Err(ArgError::NoColors);
    }
    if let Some(position) = colors.iter().position(|color| !is_hex_color(color)) {
        return Err(ArgError::InvalidColor { position });
    }

    let per_pin = colors.len() == 1 || colors.len() == pins.len();

    let mut command = CommandText::new();
    for (i, pin) in pins.iter().enumerate() {
        let color = match per_pin {
            true => colors[i.min(colors.len() - 1)],
            false => colors[0],
        };
        let separator = if i > 0 { "," } else { "" };
        write!(command, "{separator}{pin}:{color}").map_err(|_| ArgError::CommandTooLong)?;
    }

    Ok(command)
}

fn decode_status(status: [u8; BUTTON_COUNT]) -> Result<ButtonSample, ClientError> {
    ButtonSample::from_status(status).ok_or(ClientError::BadStatus(status))
}

fn is_hex_color(color: &str) -> bool {
    color.len() == COLOR_DIGITS && color.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A connection to the LEDs, buzzer and buttons of one board.
pub struct RainbowHat {
    leds: Option<LedEndpoint>,
    buttons: Option<ButtonsEndpoint>,
    buzzer: Option<BuzzerEndpoint>,
    interrupt: Interrupt,
}

impl RainbowHat {
    /// Open every peripheral on `board`. If one fails the ones already opened
    /// are closed again.
    pub fn open(board: &Board) -> Result<Self, ClientError> {
        let mut hat = RainbowHat {
            leds: None,
            buttons: None,
            buzzer: None,
            interrupt: Interrupt::never(),
        };

        let opened = board.open_leds().and_then(|leds| {
            hat.leds = Some(leds);
            hat.buttons = Some(board.open_buttons()?);
            hat.buzzer = Some(board.open_buzzer()?);
            Ok(())
        });

        if let Err(e) = opened {
            warn!("Rainbow HAT: {}", e);
            hat.close();
            return Err(e.into());
        }

        info!("Rainbow HAT: all devices opened");
        Ok(hat)
    }

    /// Let `interrupt` abort waits for the LEDs.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Light `pins` in `colors`, each colour six hex digits (`"FF00A0"`).
    pub async fn light_on(&self, pins: &[u8], colors: &[&str]) -> Result<(), ClientError> {
        let leds = self
            .leds
            .as_ref()
            .ok_or(ClientError::Unavailable(Peripheral::Leds))?;

        let command = light_command(pins, colors)?;
        debug!("Rainbow HAT: sending {:?}", command.as_str());

        leds.write(command.as_bytes(), &self.interrupt)
            .await
            .map_err(ClientError::Led)?;
        Ok(())
    }

    /// Turn every light off.
    pub async fn light_off(&self) -> Result<(), ClientError> {
        self.light_on(&LED_PINS, &[OFF]).await
    }

    /// Play `frequency_hz` on the buzzer, 0 for silence.
    pub async fn play_tone(&self, frequency_hz: u64) -> Result<(), ClientError> {
        let buzzer = self
            .buzzer
            .as_ref()
            .ok_or(ClientError::Unavailable(Peripheral::Buzzer))?;

        buzzer
            .write(&frequency_hz.to_ne_bytes())
            .await
            .map_err(ClientError::Buzzer)?;
        Ok(())
    }

    pub fn read_buttons(&self) -> Result<ButtonSample, ClientError> {
        let buttons = self
            .buttons
            .as_ref()
            .ok_or(ClientError::Unavailable(Peripheral::Buttons))?;

        let mut status = [0u8; BUTTON_COUNT];
        buttons.read(&mut status).map_err(ClientError::Buttons)?;

        decode_status(status)
    }

    /// The first pressed button in A, B, C order.
    pub fn active_button(&self) -> Result<Option<Button>, ClientError> {
        Ok(self.read_buttons()?.first_pressed())
    }

    pub fn is_open(&self) -> bool {
        self.leds.is_some() || self.buttons.is_some() || self.buzzer.is_some()
    }

    /// Close every open connection. Closing twice is harmless.
    pub fn close(&mut self) {
        if self.leds.take().is_some() {
            debug!("Rainbow HAT: LED connection closed");
        }
        if self.buttons.take().is_some() {
            debug!("Rainbow HAT: buttons connection closed");
        }
        if self.buzzer.take().is_some() {
            debug!("Rainbow HAT: buzzer connection closed");
        }
    }
}
