use std::fmt::{self, Display};
use std::sync::Arc;

use log::info;

use crate::buttons::ButtonReader;
use crate::buzzer::BuzzerController;
use crate::endpoint::{ButtonsEndpoint, BuzzerEndpoint, LedEndpoint};
use crate::error::{Classify, ErrorKind};
use crate::hal::sim::{RecordingSink, SimButton, SimTimer};
use crate::lights::LedController;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Peripheral {
    Leds,
    Buzzer,
    Buttons,
}

impl Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peripheral::Leds => write!(f, "LED"),
            Peripheral::Buzzer => write!(f, "Buzzer"),
            Peripheral::Buttons => write!(f, "Buttons"),
        }
    }
}

/// Opening a peripheral the board does not have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenError {
    pub peripheral: Peripheral,
}

impl Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} device open failed", self.peripheral)
    }
}

impl std::error::Error for OpenError {}

impl Classify for OpenError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::DeviceUnavailable
    }
}

/// The peripherals found on the board. Each controller is created once and
/// shared by every endpoint opened on it.
#[derive(Default)]
pub struct Board {
    leds: Option<Arc<LedController>>,
    buzzer: Option<Arc<BuzzerController>>,
    buttons: Option<Arc<ButtonReader>>,
}

/// Handles to the hardware behind [`Board::simulated`].
#[derive(Clone)]
pub struct SimBoard {
    pub sink: RecordingSink,
    pub timer: SimTimer,
    pub buttons: [SimButton; common::BUTTON_COUNT],
}

impl Board {
    /// A board with no peripherals.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_leds(mut self, controller: LedController) -> Self {
        self.leds = Some(Arc::new(controller));
        self
    }

    pub fn with_buzzer(mut self, controller: BuzzerController) -> Self {
        self.buzzer = Some(Arc::new(controller));
        self
    }

    pub fn with_buttons(mut self, reader: ButtonReader) -> Self {
        self.buttons = Some(Arc::new(reader));
        self
    }

    /// A complete board backed by in-memory hardware.
    pub fn simulated() -> (Self, SimBoard) {
        let sim = SimBoard {
            sink: RecordingSink::new(),
            timer: SimTimer::new(),
            buttons: [SimButton::new(), SimButton::new(), SimButton::new()],
        };

        let board = Board::empty()
            .with_leds(LedController::new(sim.sink.clone()))
            .with_buzzer(BuzzerController::new(sim.timer.clone()))
            .with_buttons(ButtonReader::new([
                Box::new(sim.buttons[0].clone()),
                Box::new(sim.buttons[1].clone()),
                Box::new(sim.buttons[2].clone()),
            ]));

        (board, sim)
    }

    /// Probe the Rainbow HAT through rppal using the wiring in `config`.
    #[cfg(feature = "pi")]
    pub fn from_config(config: &crate::config::Config) -> Result<Self, anyhow::Error> {
        use crate::hal::rpi::{GpioButton, PwmTimer, SpiSink};

        let sink = SpiSink::open(&config.leds)?;
        let timer = PwmTimer::open(&config.buzzer)?;

        let gpio = rppal::gpio::Gpio::new()?;
        let [a, b, c] = config.buttons.pins;
        let open = |pin: crate::config::Pin| -> Result<Box<dyn crate::hal::ButtonInput>, anyhow::Error> {
            let pin = pin.gpio();
            info!("Button: initializing on pin {}", pin.0);
            Ok(Box::new(GpioButton::open(&gpio, pin.0)?))
        };
        let inputs = [open(a)?, open(b)?, open(c)?];

        Ok(Board::empty()
            .with_leds(LedController::new(sink))
            .with_buzzer(BuzzerController::new(timer))
            .with_buttons(ButtonReader::new(inputs)))
    }

    pub fn open_leds(&self) -> Result<LedEndpoint, OpenError> {
        let controller = self.leds.clone().ok_or(OpenError {
            peripheral: Peripheral::Leds,
        })?;
        info!("LED endpoint opened");
        Ok(LedEndpoint::new(controller))
    }

    pub fn open_buzzer(&self) -> Result<BuzzerEndpoint, OpenError> {
        let controller = self.buzzer.clone().ok_or(OpenError {
            peripheral: Peripheral::Buzzer,
        })?;
        info!("Buzzer endpoint opened");
        Ok(BuzzerEndpoint::new(controller))
    }

    pub fn open_buttons(&self) -> Result<ButtonsEndpoint, OpenError> {
        let reader = self.buttons.clone().ok_or(OpenError {
            peripheral: Peripheral::Buttons,
        })?;
        info!("Buttons endpoint opened");
        Ok(ButtonsEndpoint::new(reader))
    }
}
