//! Programs that run on top of [`RainbowHat`](crate::client::RainbowHat).
//!
//! Each runs until its interrupt is raised. When one fails it raises the
//! interrupt itself so the others wind down too.

use std::time::Duration;

use log::error;

use crate::client::ClientError;
use crate::error::{Classify, ErrorKind};
use crate::sync::{Interrupt, Interrupter};

mod metronome;
mod piano;

pub use metronome::{beat_pins, Metronome, BEATS_PER_BAR, FLASH_DURATION};
pub use piano::{Piano, POLL_INTERVAL};

/// Sleep for `duration`. Returns `false` if `interrupt` was raised first.
async fn sleep_unless_raised(interrupt: &Interrupt, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = interrupt.raised() => false,
    }
}

/// Sort an app's failure into a clean stop or an error. Errors raise the
/// interrupt for everyone else.
fn finish(
    app: &str,
    interrupter: &Interrupter,
    result: Result<(), ClientError>,
) -> Result<(), ClientError> {
    match result {
        Err(e) if e.kind() == ErrorKind::Interrupted && interrupter.is_raised() => Ok(()),
        Err(e) => {
            let mut message = crate::client::ErrorMessage::new();
            e.write_message(&mut message);
            error!("{}: {}", app, message);
            interrupter.raise();
            Err(e)
        }
        Ok(()) => Ok(()),
    }
}
