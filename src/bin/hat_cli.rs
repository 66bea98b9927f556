//! Poke the HAT from the shell.
//!
//! ```text
//! hat-cli leds 0:FF0000,3:00FF00
//! hat-cli on 0,1,2 FF0000,00FF00,0000FF
//! hat-cli off
//! hat-cli tone 440
//! hat-cli buttons
//! ```

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use log::info;

use rainbow_hat::prelude::*;

#[derive(Parser)]
#[command(name = "hat-cli")]
#[command(about = "Drive the Rainbow HAT lights, buzzer and buttons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Write a raw light command such as `0:FF0000,3:00FF00`
    Leds {
        command: String,
    },

    /// Light pins in the given colours
    On {
        /// Comma separated light numbers
        #[arg(value_delimiter = ',', num_args = 1, required = true)]
        pins: Vec<u8>,

        /// Comma separated colours, six hex digits each
        #[arg(value_delimiter = ',', num_args = 1, required = true)]
        colors: Vec<String>,
    },

    /// Turn every light off
    Off,

    /// Play a tone, 0 for silence
    Tone {
        hz: u64,
    },

    /// Print the state of each button
    Buttons,
}

#[cfg(feature = "pi")]
fn board(config: &Config) -> Result<Board, anyhow::Error> {
    Board::from_config(config)
}

#[cfg(not(feature = "pi"))]
fn board(_config: &Config) -> Result<Board, anyhow::Error> {
    log::warn!("Built without the `pi` feature, using a simulated board");
    Ok(Board::simulated().0)
}

/// Turn a client error into the message the C-style tools print.
fn report(e: ClientError) -> anyhow::Error {
    let mut message = ErrorMessage::new();
    e.write_message(&mut message);
    anyhow!("{}", message)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let cli = Cli::parse();

    let config = Config::load_or_default()?;
    let board = board(&config)?;

    match &cli.command {
        Command::Leds { command } => {
            let leds = board.open_leds()?;
            leds.write(command.as_bytes(), &Interrupt::never()).await?;
            info!("Sent {:?}", command);
        }
        Command::On { pins, colors } => {
            let colors: Vec<&str> = colors.iter().map(String::as_str).collect();
            let hat = RainbowHat::open(&board).map_err(report)?;
            hat.light_on(pins, &colors).await.map_err(report)?;
        }
        Command::Off => {
            let hat = RainbowHat::open(&board).map_err(report)?;
            hat.light_off().await.map_err(report)?;
        }
        Command::Tone { hz } => {
            let hat = RainbowHat::open(&board).map_err(report)?;
            hat.play_tone(*hz).await.map_err(report)?;
        }
        Command::Buttons => {
            let hat = RainbowHat::open(&board).map_err(report)?;
            let sample = hat.read_buttons().map_err(report)?;
            for button in Button::ALL {
                let state = match sample.is_pressed(button) {
                    true => "pressed",
                    false => "released",
                };
                println!("{button}: {state}");
            }
        }
    }

    Ok(())
}
