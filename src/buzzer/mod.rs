use std::fmt::{self, Display};

use log::{debug, info, warn};

use crate::error::{Classify, ErrorKind};
use crate::hal::{HardwareError, ToneTimer};
use crate::sync::{AcquireMode, LockError, PeripheralLock};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// What the buzzer is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToneState {
    pub enabled: bool,
    /// Last frequency played, kept while the output is disabled
    pub frequency_hz: u64,
}

/// PWM timing for one tone, square wave at 50% duty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TonePeriod {
    pub period_ns: u64,
    pub duty_ns: u64,
}

impl TonePeriod {
    /// Timing for `frequency_hz`, or `None` for 0 Hz.
    pub fn from_frequency(frequency_hz: u64) -> Option<Self> {
        let period_ns = NANOS_PER_SECOND.checked_div(frequency_hz)?;
        Some(Self {
            period_ns,
            duty_ns: period_ns / 2,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum BuzzerError {
    /// Another caller is using the buzzer, try again
    Busy,
    /// The tone's period is longer than the timer supports
    Range { period_ns: u64, max_period_ns: u64 },
    /// The timer rejected the configuration
    Timer(HardwareError),
}

impl Display for BuzzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuzzerError::Busy => write!(f, "buzzer is busy"),
            BuzzerError::Range {
                period_ns,
                max_period_ns,
            } => write!(
                f,
                "period of {period_ns} ns exceeds the timer limit of {max_period_ns} ns"
            ),
            BuzzerError::Timer(e) => write!(f, "buzzer config failed: {e}"),
        }
    }
}

impl std::error::Error for BuzzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuzzerError::Timer(e) => Some(e),
            _ => None,
        }
    }
}

impl Classify for BuzzerError {
    fn kind(&self) -> ErrorKind {
        match self {
            BuzzerError::Busy => ErrorKind::Busy,
            BuzzerError::Range { .. } => ErrorKind::Range,
            BuzzerError::Timer(_) => ErrorKind::Transport,
        }
    }
}

impl From<LockError> for BuzzerError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::Busy => BuzzerError::Busy,
            // The buzzer is only ever acquired without waiting, so there is
            // no wait to interrupt
            LockError::Interrupted => BuzzerError::Busy,
        }
    }
}

struct BuzzerState {
    tone: ToneState,
    timer: Box<dyn ToneTimer>,
}

/// Owns the buzzer's PWM timer. Callers never wait for it: if another call is
/// in progress they get [`BuzzerError::Busy`] and decide whether to retry.
pub struct BuzzerController {
    lock: PeripheralLock<BuzzerState>,
}

impl BuzzerController {
    pub fn new(timer: impl ToneTimer + 'static) -> Self {
        Self {
            lock: PeripheralLock::new(
                "Buzzer",
                BuzzerState {
                    tone: ToneState::default(),
                    timer: Box::new(timer),
                },
            ),
        }
    }

    /// Play `frequency_hz`, or silence the buzzer for 0.
    ///
    /// Silencing always succeeds. A range error touches neither the timer nor
    /// the recorded state. If the timer fails part way through a new tone the
    /// output is switched off and the state records it as disabled.
    pub async fn set_frequency(&self, frequency_hz: u64) -> Result<(), BuzzerError> {
        let mut state = self.lock.acquire(AcquireMode::NonBlocking).await?;

        let Some(tone) = TonePeriod::from_frequency(frequency_hz) else {
            if let Err(e) = state.timer.disable() {
                warn!("Buzzer: failed to disable output: {}", e);
            }
            if state.tone.enabled {
                debug!("Buzzer: off");
            }
            state.tone.enabled = false;
            return Ok(());
        };

        let max_period_ns = state.timer.max_period_ns();
        if tone.period_ns > max_period_ns {
            info!(
                "Buzzer: {} Hz out of range, period {} ns",
                frequency_hz, tone.period_ns
            );
            return Err(BuzzerError::Range {
                period_ns: tone.period_ns,
                max_period_ns,
            });
        }

        let configured = state
            .timer
            .configure(tone.duty_ns, tone.period_ns)
            .and_then(|()| state.timer.enable());

        if let Err(e) = configured {
            warn!("Buzzer: unexpected error during config: {}", e);
            // The timer may be half configured, leave it off
            if let Err(e) = state.timer.disable() {
                warn!("Buzzer: failed to disable output: {}", e);
            }
            state.tone.enabled = false;
            return Err(BuzzerError::Timer(e));
        }

        debug!("Buzzer: playing {} Hz", frequency_hz);
        state.tone = ToneState {
            enabled: true,
            frequency_hz,
        };
        Ok(())
    }

    /// Current tone, or `Busy` if a call is in progress.
    pub async fn state(&self) -> Result<ToneState, BuzzerError> {
        let state = self.lock.acquire(AcquireMode::NonBlocking).await?;
        Ok(state.tone)
    }
}
