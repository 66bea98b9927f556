pub mod apps;
pub mod board;
pub mod buttons;
pub mod buzzer;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hal;
pub mod lights;
pub mod sync;

pub mod prelude {
    pub use crate::{
        board::{Board, OpenError, Peripheral},
        client::{ArgError, ClientError, ErrorMessage, RainbowHat},
        config::Config,
        error::{Classify, ErrorKind},
        sync::{interrupt_pair, Interrupt, Interrupter},
    };
    pub use common::{Button, ButtonSample, Rgb};
}
