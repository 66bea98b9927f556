use std::fmt::{self, Display};

/// Coarse classification shared by every error the board reports. Callers
/// match on this to decide whether retrying makes sense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed command text
    Parse,
    /// A number outside what the hardware accepts
    Range,
    /// The peripheral is in use and the call does not wait
    Busy,
    /// Waiting for the peripheral was interrupted
    Interrupted,
    /// The hardware transfer failed
    Transport,
    /// The caller passed an argument of the wrong shape
    Arg,
    /// The peripheral was never opened or has been closed
    DeviceUnavailable,
    /// Reading an input failed
    Device,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::Range => "out of range",
            ErrorKind::Busy => "busy",
            ErrorKind::Interrupted => "interrupted",
            ErrorKind::Transport => "transport error",
            ErrorKind::Arg => "invalid argument",
            ErrorKind::DeviceUnavailable => "device unavailable",
            ErrorKind::Device => "device error",
        };
        write!(f, "{name}")
    }
}

/// Errors that can be sorted into an [`ErrorKind`].
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

impl Classify for common::ParseError {
    fn kind(&self) -> ErrorKind {
        match self.is_out_of_range() {
            true => ErrorKind::Range,
            false => ErrorKind::Parse,
        }
    }
}
