//! Transport collaborators the controllers drive.
//!
//! Each trait is the smallest surface a controller needs from the hardware:
//!
//! - [`FrameSink`]: an atomic multi-byte transfer (SPI on the Pi)
//! - [`ToneTimer`]: a PWM output with configure/enable/disable
//! - [`ButtonInput`]: one digital input
//!
//! `sim` has in-memory versions used off the Pi and in tests, `rpi` wraps
//! rppal when the `pi` feature is enabled.

use std::fmt::{self, Display};

#[cfg(feature = "pi")]
pub mod rpi;
pub mod sim;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardwareError {
    pub device: &'static str,
    pub reason: String,
}

impl HardwareError {
    pub fn new(device: &'static str, reason: impl Into<String>) -> Self {
        Self {
            device,
            reason: reason.into(),
        }
    }
}

impl Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.device, self.reason)
    }
}

impl std::error::Error for HardwareError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

pub trait FrameSink: Send {
    /// Send the whole frame in one transfer. A frame is either sent completely
    /// or the call fails.
    fn transfer(&mut self, frame: &[u8]) -> Result<(), HardwareError>;
}

pub trait ToneTimer: Send {
    /// Set the on-time and period of the output, both in nanoseconds.
    fn configure(&mut self, duty_ns: u64, period_ns: u64) -> Result<(), HardwareError>;

    fn enable(&mut self) -> Result<(), HardwareError>;

    fn disable(&mut self) -> Result<(), HardwareError>;

    /// Longest period the timer can be configured with.
    fn max_period_ns(&self) -> u64 {
        i32::MAX as u64
    }
}

pub trait ButtonInput: Send + Sync {
    fn level(&self) -> Result<Level, HardwareError>;
}
