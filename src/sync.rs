//! Per-peripheral exclusion.
//!
//! Every peripheral owns its state behind one [`PeripheralLock`]. Callers pick
//! how to wait for it with [`AcquireMode`]: the light path waits until the
//! lock is free or the caller's [`Interrupt`] is raised, the buzzer path gives
//! up immediately.

use std::fmt::{self, Display};
use std::sync::Arc;

use log::debug;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::error::{Classify, ErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockError {
    /// Non-blocking acquisition found the lock held
    Busy,
    /// The interrupt was raised before the lock was acquired
    Interrupted,
}

impl Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Busy => write!(f, "device busy"),
            LockError::Interrupted => write!(f, "wait for device interrupted"),
        }
    }
}

impl std::error::Error for LockError {}

impl Classify for LockError {
    fn kind(&self) -> ErrorKind {
        match self {
            LockError::Busy => ErrorKind::Busy,
            LockError::Interrupted => ErrorKind::Interrupted,
        }
    }
}

pub enum AcquireMode<'a> {
    /// Wait for the lock, giving up if `interrupt` is raised first
    Interruptible(&'a Interrupt),
    /// Take the lock only if nobody holds it
    NonBlocking,
}

pub struct PeripheralLock<T> {
    name: &'static str,
    inner: Mutex<T>,
}

impl<T> PeripheralLock<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Mutex::new(value),
        }
    }

    /// Acquire the lock. The returned guard releases it when dropped, on
    /// every path out of the caller's critical section.
    pub async fn acquire(&self, mode: AcquireMode<'_>) -> Result<MutexGuard<'_, T>, LockError> {
        match mode {
            AcquireMode::NonBlocking => self.inner.try_lock().map_err(|_| {
                debug!("{}: lock held, not waiting", self.name);
                LockError::Busy
            }),
            AcquireMode::Interruptible(interrupt) => {
                // A free lock wins over an already raised interrupt
                tokio::select! {
                    biased;
                    guard = self.inner.lock() => Ok(guard),
                    _ = interrupt.raised() => {
                        debug!("{}: wait for lock interrupted", self.name);
                        Err(LockError::Interrupted)
                    }
                }
            }
        }
    }
}

/// Cancellation signal for interruptible waits. Cloning shares the signal.
#[derive(Clone, Debug)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

/// Raises the paired [`Interrupt`]s.
#[derive(Clone, Debug)]
pub struct Interrupter {
    tx: Arc<watch::Sender<bool>>,
}

/// A connected interrupter and interrupt, initially not raised.
pub fn interrupt_pair() -> (Interrupter, Interrupt) {
    let (tx, rx) = watch::channel(false);
    (Interrupter { tx: Arc::new(tx) }, Interrupt { rx })
}

impl Interrupt {
    /// An interrupt nothing can raise.
    pub fn never() -> Self {
        interrupt_pair().1
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt is raised. Never resolves if every
    /// interrupter was dropped without raising it.
    pub async fn raised(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|raised| *raised).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Interrupter {
    pub fn raise(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> Interrupt {
        Interrupt {
            rx: self.tx.subscribe(),
        }
    }
}
