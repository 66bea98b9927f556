use std::time::Duration;

use log::{debug, info};
use rppal::gpio::{Gpio, InputPin};
use rppal::pwm::{Channel, Pwm};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use super::{ButtonInput, FrameSink, HardwareError, Level, ToneTimer};
use crate::config::{BuzzerConfig, LedConfig};

pub struct SpiSink {
    spi: Spi,
}

impl SpiSink {
    pub fn open(config: &LedConfig) -> Result<Self, HardwareError> {
        let bus = match config.bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            2 => Bus::Spi2,
            other => return Err(HardwareError::new("spi", format!("no SPI bus {other}"))),
        };
        let slave_select = match config.slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => {
                return Err(HardwareError::new(
                    "spi",
                    format!("no slave select {other}"),
                ))
            }
        };

        let spi = Spi::new(bus, slave_select, config.clock_hz, Mode::Mode0)
            .map_err(|e| HardwareError::new("spi", e.to_string()))?;
        info!(
            "LEDs: SPI{} CE{} at {} Hz",
            config.bus, config.slave_select, config.clock_hz
        );

        Ok(Self { spi })
    }
}

impl FrameSink for SpiSink {
    fn transfer(&mut self, frame: &[u8]) -> Result<(), HardwareError> {
        let written = self
            .spi
            .write(frame)
            .map_err(|e| HardwareError::new("spi", e.to_string()))?;

        if written != frame.len() {
            return Err(HardwareError::new(
                "spi",
                format!("short transfer, {written} of {} bytes", frame.len()),
            ));
        }
        Ok(())
    }
}

pub struct PwmTimer {
    pwm: Pwm,
}

impl PwmTimer {
    pub fn open(config: &BuzzerConfig) -> Result<Self, HardwareError> {
        let channel = match config.channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HardwareError::new("pwm", format!("no PWM channel {other}"))),
        };

        let pwm = Pwm::new(channel).map_err(|e| HardwareError::new("pwm", e.to_string()))?;
        info!("Buzzer: PWM channel {}", config.channel);

        Ok(Self { pwm })
    }
}

fn pwm_error(e: rppal::pwm::Error) -> HardwareError {
    HardwareError::new("pwm", e.to_string())
}

impl ToneTimer for PwmTimer {
    fn configure(&mut self, duty_ns: u64, period_ns: u64) -> Result<(), HardwareError> {
        // The pulse width may never exceed the period, so clear it first
        self.pwm.set_pulse_width(Duration::ZERO).map_err(pwm_error)?;
        self.pwm
            .set_period(Duration::from_nanos(period_ns))
            .map_err(pwm_error)?;
        self.pwm
            .set_pulse_width(Duration::from_nanos(duty_ns))
            .map_err(pwm_error)?;

        debug!("Buzzer: period {period_ns} ns, duty {duty_ns} ns");
        Ok(())
    }

    fn enable(&mut self) -> Result<(), HardwareError> {
        self.pwm.enable().map_err(pwm_error)
    }

    fn disable(&mut self) -> Result<(), HardwareError> {
        self.pwm.disable().map_err(pwm_error)
    }
}

pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    pub fn open(gpio: &Gpio, bcm: u8) -> Result<Self, HardwareError> {
        let pin = gpio
            .get(bcm)
            .map_err(|e| HardwareError::new("gpio", e.to_string()))?
            .into_input();

        Ok(Self { pin })
    }
}

impl ButtonInput for GpioButton {
    fn level(&self) -> Result<Level, HardwareError> {
        Ok(match self.pin.read() {
            rppal::gpio::Level::Low => Level::Low,
            rppal::gpio::Level::High => Level::High,
        })
    }
}
