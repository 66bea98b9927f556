//! Byte-level endpoints for the three peripherals.
//!
//! These behave like the board's device files: the light endpoint takes
//! command text, the buzzer endpoint one native-endian `u64` frequency per
//! write, and the buttons endpoint reports three status characters per read.

use std::fmt::{self, Display};
use std::sync::Arc;

use log::info;

use common::{ParseError, BUTTON_COUNT, FREQUENCY_WIDTH, MAX_COMMAND_LEN};

use crate::buttons::{ButtonReader, DeviceError};
use crate::buzzer::{BuzzerController, BuzzerError};
use crate::error::{Classify, ErrorKind};
use crate::lights::{LedController, LedError};
use crate::sync::Interrupt;

#[derive(Debug)]
pub enum EndpointError {
    /// A write of the wrong size for this endpoint
    BadLength { expected: usize, actual: usize },
    /// The read buffer cannot hold a full report
    BufferTooSmall { needed: usize, actual: usize },
    Led(LedError),
    Buzzer(BuzzerError),
    Buttons(DeviceError),
}

impl Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::BadLength { expected, actual } => {
                write!(f, "expected a {expected} byte write, got {actual}")
            }
            EndpointError::BufferTooSmall { needed, actual } => {
                write!(f, "buffer of {actual} bytes too small, need {needed}")
            }
            EndpointError::Led(e) => write!(f, "{e}"),
            EndpointError::Buzzer(e) => write!(f, "{e}"),
            EndpointError::Buttons(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EndpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EndpointError::Led(e) => Some(e),
            EndpointError::Buzzer(e) => Some(e),
            EndpointError::Buttons(e) => Some(e),
            _ => None,
        }
    }
}

impl Classify for EndpointError {
    fn kind(&self) -> ErrorKind {
        match self {
            EndpointError::BadLength { .. } | EndpointError::BufferTooSmall { .. } => {
                ErrorKind::Arg
            }
            EndpointError::Led(e) => e.kind(),
            EndpointError::Buzzer(e) => e.kind(),
            EndpointError::Buttons(e) => e.kind(),
        }
    }
}

/// Write-only light endpoint.
#[derive(Clone)]
pub struct LedEndpoint {
    controller: Arc<LedController>,
}

impl LedEndpoint {
    pub(crate) fn new(controller: Arc<LedController>) -> Self {
        Self { controller }
    }

    /// Apply the command in `buf`, returning the number of bytes consumed.
    /// Oversized writes are rejected before waiting for the LEDs.
    pub async fn write(&self, buf: &[u8], interrupt: &Interrupt) -> Result<usize, EndpointError> {
        if buf.len() > MAX_COMMAND_LEN {
            info!("LEDs: input too large, max {} bytes", MAX_COMMAND_LEN);
            return Err(EndpointError::Led(LedError::Parse(ParseError::TooLong {
                len: buf.len(),
            })));
        }

        let text = std::str::from_utf8(buf)
            .map_err(|_| EndpointError::Led(LedError::Parse(ParseError::InvalidUtf8)))?;

        self.controller
            .apply(text, interrupt)
            .await
            .map_err(EndpointError::Led)?;

        Ok(buf.len())
    }
}

/// Write-only buzzer endpoint.
#[derive(Clone)]
pub struct BuzzerEndpoint {
    controller: Arc<BuzzerController>,
}

impl BuzzerEndpoint {
    pub(crate) fn new(controller: Arc<BuzzerController>) -> Self {
        Self { controller }
    }

    /// `buf` must be exactly one native-endian `u64` frequency in Hz.
    pub async fn write(&self, buf: &[u8]) -> Result<usize, EndpointError> {
        let bytes: [u8; FREQUENCY_WIDTH] =
            buf.try_into().map_err(|_| EndpointError::BadLength {
                expected: FREQUENCY_WIDTH,
                actual: buf.len(),
            })?;

        self.controller
            .set_frequency(u64::from_ne_bytes(bytes))
            .await
            .map_err(EndpointError::Buzzer)?;

        Ok(buf.len())
    }
}

/// Read-only buttons endpoint.
#[derive(Clone)]
pub struct ButtonsEndpoint {
    reader: Arc<ButtonReader>,
}

impl ButtonsEndpoint {
    pub(crate) fn new(reader: Arc<ButtonReader>) -> Self {
        Self { reader }
    }

    /// Fill the start of `buf` with one status character per button, `'1'`
    /// pressed and `'0'` released, in A, B, C order.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, EndpointError> {
        if buf.len() < BUTTON_COUNT {
            info!("Buttons: provided buffer not sufficient in size");
            return Err(EndpointError::BufferTooSmall {
                needed: BUTTON_COUNT,
                actual: buf.len(),
            });
        }

        let sample = self.reader.read().map_err(EndpointError::Buttons)?;
        buf[..BUTTON_COUNT].copy_from_slice(&sample.to_status());

        Ok(BUTTON_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::{RecordingSink, SimButton, SimTimer, TimerEvent};

    #[tokio::test]
    async fn test_led_write() {
        let sink = RecordingSink::new();
        let endpoint = LedEndpoint::new(Arc::new(LedController::new(sink.clone())));

        assert_eq!(
            8,
            endpoint
                .write(b"1:00FF00", &Interrupt::never())
                .await
                .unwrap()
        );
        assert_eq!(1, sink.frames().len());
    }

    #[tokio::test]
    async fn test_led_write_too_long() {
        let sink = RecordingSink::new();
        let endpoint = LedEndpoint::new(Arc::new(LedController::new(sink.clone())));

        let mut buf = b"1:00FF00".to_vec();
        buf.resize(MAX_COMMAND_LEN + 1, b' ');

        let err = endpoint.write(&buf, &Interrupt::never()).await.unwrap_err();
        assert!(matches!(
            err,
            EndpointError::Led(LedError::Parse(ParseError::TooLong { len: 71 }))
        ));
        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(sink.frames().is_empty());

        // Exactly at the limit is accepted
        buf.truncate(MAX_COMMAND_LEN);
        assert!(endpoint.write(&buf, &Interrupt::never()).await.is_ok());
    }

    #[tokio::test]
    async fn test_led_write_not_text() {
        let endpoint = LedEndpoint::new(Arc::new(LedController::new(RecordingSink::new())));

        let err = endpoint
            .write(&[b'1', b':', 0xFF, 0xFE], &Interrupt::never())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EndpointError::Led(LedError::Parse(ParseError::InvalidUtf8))
        ));
    }

    #[tokio::test]
    async fn test_buzzer_write() {
        let timer = SimTimer::new();
        let endpoint = BuzzerEndpoint::new(Arc::new(BuzzerController::new(timer.clone())));

        assert_eq!(8, endpoint.write(&440u64.to_ne_bytes()).await.unwrap());
        assert_eq!(Some(&TimerEvent::Enable), timer.events().last());

        let err = endpoint.write(&440u32.to_ne_bytes()).await.unwrap_err();
        assert!(matches!(
            err,
            EndpointError::BadLength {
                expected: 8,
                actual: 4
            }
        ));
        assert_eq!(ErrorKind::Arg, err.kind());
    }

    #[test]
    fn test_buttons_read() {
        let a = SimButton::new();
        let endpoint = ButtonsEndpoint::new(Arc::new(ButtonReader::new([
            Box::new(a.clone()),
            Box::new(SimButton::new()),
            Box::new(SimButton::new()),
        ])));

        let mut buf = [0u8; 8];
        assert_eq!(3, endpoint.read(&mut buf).unwrap());
        assert_eq!(b"000", &buf[..3]);

        a.press();
        endpoint.read(&mut buf).unwrap();
        assert_eq!(b"100", &buf[..3]);

        let mut small = [0u8; 2];
        let err = endpoint.read(&mut small).unwrap_err();
        assert!(matches!(
            err,
            EndpointError::BufferTooSmall {
                needed: 3,
                actual: 2
            }
        ));
    }
}
