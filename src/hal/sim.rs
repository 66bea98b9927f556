//! In-memory hardware. Each type is a cheap handle: clone it, hand one copy to
//! a controller and keep the other to inspect or steer what the controller
//! sees.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::trace;

use super::{ButtonInput, FrameSink, HardwareError, Level, ToneTimer};

#[derive(Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame transferred so far, oldest first.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }

    pub fn fail_next_transfer(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl FrameSink for RecordingSink {
    fn transfer(&mut self, frame: &[u8]) -> Result<(), HardwareError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(HardwareError::new("sim-spi", "transfer failed"));
        }

        trace!("sim-spi: {:02X?}", frame);
        self.frames
            .lock()
            .map_err(|_| HardwareError::new("sim-spi", "frame log poisoned"))?
            .push(frame.to_vec());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Configure { duty_ns: u64, period_ns: u64 },
    Enable,
    Disable,
}

#[derive(Clone)]
pub struct SimTimer {
    events: Arc<Mutex<Vec<TimerEvent>>>,
    fail_next: Arc<AtomicBool>,
    fail_enable: Arc<AtomicBool>,
    max_period_ns: u64,
}

impl Default for SimTimer {
    fn default() -> Self {
        Self {
            events: Arc::default(),
            fail_next: Arc::default(),
            fail_enable: Arc::default(),
            max_period_ns: i32::MAX as u64,
        }
    }
}

impl SimTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timer that only accepts periods up to `max_period_ns`.
    pub fn with_max_period(max_period_ns: u64) -> Self {
        Self {
            max_period_ns,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<TimerEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Whether the output is currently running, judged by the last
    /// enable/disable event.
    pub fn is_enabled(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .find_map(|event| match event {
                TimerEvent::Enable => Some(true),
                TimerEvent::Disable => Some(false),
                TimerEvent::Configure { .. } => None,
            })
            .unwrap_or(false)
    }

    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Fail the next `enable` only, letting configure and disable through.
    pub fn fail_next_enable(&self) {
        self.fail_enable.store(true, Ordering::SeqCst);
    }

    fn record(&self, event: TimerEvent) -> Result<(), HardwareError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(HardwareError::new("sim-pwm", "timer call failed"));
        }

        trace!("sim-pwm: {:?}", event);
        self.events
            .lock()
            .map_err(|_| HardwareError::new("sim-pwm", "event log poisoned"))?
            .push(event);
        Ok(())
    }
}

impl ToneTimer for SimTimer {
    fn configure(&mut self, duty_ns: u64, period_ns: u64) -> Result<(), HardwareError> {
        self.record(TimerEvent::Configure { duty_ns, period_ns })
    }

    fn enable(&mut self) -> Result<(), HardwareError> {
        if self.fail_enable.swap(false, Ordering::SeqCst) {
            return Err(HardwareError::new("sim-pwm", "enable failed"));
        }
        self.record(TimerEvent::Enable)
    }

    fn disable(&mut self) -> Result<(), HardwareError> {
        self.record(TimerEvent::Disable)
    }

    fn max_period_ns(&self) -> u64 {
        self.max_period_ns
    }
}

/// A button input wired like the board's: pulled high, low while pressed.
#[derive(Clone)]
pub struct SimButton {
    high: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl Default for SimButton {
    fn default() -> Self {
        Self {
            high: Arc::new(AtomicBool::new(true)),
            broken: Arc::default(),
        }
    }
}

impl SimButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.high.store(false, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.high.store(true, Ordering::SeqCst);
    }

    /// Make every read fail until [`SimButton::repair`] is called.
    pub fn break_input(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn repair(&self) {
        self.broken.store(false, Ordering::SeqCst);
    }
}

impl ButtonInput for SimButton {
    fn level(&self) -> Result<Level, HardwareError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(HardwareError::new("sim-gpio", "read failed"));
        }

        Ok(match self.high.load(Ordering::SeqCst) {
            true => Level::High,
            false => Level::Low,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_fail_once() {
        let sink = RecordingSink::new();
        let mut handle = sink.clone();

        sink.fail_next_transfer();
        assert!(handle.transfer(&[1, 2, 3]).is_err());
        handle.transfer(&[4, 5]).unwrap();

        assert_eq!(vec![vec![4, 5]], sink.frames());
        assert_eq!(Some(vec![4, 5]), sink.last_frame());
    }

    #[test]
    fn test_sim_timer_enabled() {
        let timer = SimTimer::new();
        let mut handle = timer.clone();
        assert!(!timer.is_enabled());

        handle.configure(5, 10).unwrap();
        handle.enable().unwrap();
        assert!(timer.is_enabled());

        handle.disable().unwrap();
        assert!(!timer.is_enabled());
    }

    #[test]
    fn test_sim_button_levels() {
        let button = SimButton::new();
        assert_eq!(Ok(Level::High), button.level());

        button.press();
        assert_eq!(Ok(Level::Low), button.level());

        button.break_input();
        assert!(button.level().is_err());
    }
}
