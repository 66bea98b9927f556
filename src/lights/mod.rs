use std::fmt::{self, Display};

use log::{debug, info, warn};
use packed_struct::PackingError;

use common::{LightAssignment, ParseError, Rgb, LED_COUNT};

use crate::error::{Classify, ErrorKind};
use crate::hal::{FrameSink, HardwareError};
use crate::sync::{AcquireMode, Interrupt, LockError, PeripheralLock};

pub mod pack;

pub use pack::{encode, WireFrame};

/// Colour of every light on the arc, black until told otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightArray {
    lights: [Rgb; LED_COUNT],
}

impl LightArray {
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.lights.get(index).copied()
    }

    /// Set one light. Indices past the end of the arc are ignored.
    pub fn set(&mut self, index: usize, color: Rgb) {
        if let Some(light) = self.lights.get_mut(index) {
            *light = color;
        }
    }

    pub fn apply(&mut self, assignments: &[LightAssignment]) {
        for assignment in assignments {
            self.set(assignment.index, assignment.color);
        }
    }

    pub fn clear(&mut self) {
        self.lights = [Rgb::BLACK; LED_COUNT];
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.lights.iter()
    }
}

#[derive(Debug)]
pub enum LedError {
    /// Interrupted while waiting for another update to finish
    Interrupted,
    /// The command was rejected, nothing changed
    Parse(ParseError),
    /// The frame could not be built
    Encode(PackingError),
    /// The frame could not be sent. The new colours are kept in memory.
    Transport(HardwareError),
}

impl Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::Interrupted => write!(f, "interrupted while waiting for the LEDs"),
            LedError::Parse(e) => write!(f, "invalid LED command: {e}"),
            LedError::Encode(e) => write!(f, "could not build LED frame: {e:?}"),
            LedError::Transport(e) => write!(f, "failed to update LEDs: {e}"),
        }
    }
}

impl std::error::Error for LedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedError::Parse(e) => Some(e),
            LedError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl Classify for LedError {
    fn kind(&self) -> ErrorKind {
        match self {
            LedError::Interrupted => ErrorKind::Interrupted,
            LedError::Parse(e) => e.kind(),
            LedError::Encode(_) | LedError::Transport(_) => ErrorKind::Transport,
        }
    }
}

impl From<LockError> for LedError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::Interrupted => LedError::Interrupted,
            // The LEDs are only ever acquired interruptibly, which never
            // reports busy
            LockError::Busy => LedError::Interrupted,
        }
    }
}

struct LedState {
    lights: LightArray,
    sink: Box<dyn FrameSink>,
}

impl LedState {
    fn transmit(&mut self) -> Result<(), LedError> {
        let frame = encode(&self.lights).map_err(LedError::Encode)?;
        self.sink.transfer(&frame).map_err(|e| {
            warn!("LEDs: failed to send frame: {}", e);
            LedError::Transport(e)
        })
    }
}

/// Owns the arc's colours and the link to it. Updates are serialised: one
/// caller at a time parses, mutates and transmits, later callers wait.
pub struct LedController {
    lock: PeripheralLock<LedState>,
}

impl LedController {
    pub fn new(sink: impl FrameSink + 'static) -> Self {
        Self {
            lock: PeripheralLock::new(
                "LEDs",
                LedState {
                    lights: LightArray::default(),
                    sink: Box::new(sink),
                },
            ),
        }
    }

    /// Apply a colour command and send the result to the arc.
    ///
    /// Waits for any other update to finish first; raising `interrupt` during
    /// that wait returns [`LedError::Interrupted`] without touching anything.
    /// The command is validated as a whole before any light changes.
    pub async fn apply(&self, text: &str, interrupt: &Interrupt) -> Result<(), LedError> {
        let mut state = self
            .lock
            .acquire(AcquireMode::Interruptible(interrupt))
            .await?;

        let assignments = common::parse(text).map_err(|e| {
            info!("LEDs: rejected command {:?}: {}", text, e);
            LedError::Parse(e)
        })?;

        for assignment in &assignments {
            debug!(
                "Light {}: setting to {}",
                assignment.index, assignment.color
            );
        }
        state.lights.apply(&assignments);

        state.transmit()
    }

    /// Turn every light off and send the result to the arc.
    pub async fn turn_off(&self, interrupt: &Interrupt) -> Result<(), LedError> {
        let mut state = self
            .lock
            .acquire(AcquireMode::Interruptible(interrupt))
            .await?;

        debug!("LEDs: all off");
        state.lights.clear();
        state.transmit()
    }

    /// The colours as last applied, whether or not they reached the arc.
    pub async fn lights(&self, interrupt: &Interrupt) -> Result<LightArray, LedError> {
        let state = self
            .lock
            .acquire(AcquireMode::Interruptible(interrupt))
            .await?;
        Ok(state.lights)
    }
}
