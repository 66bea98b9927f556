use log::{error, info, warn};

use rainbow_hat::apps::{Metronome, Piano};
use rainbow_hat::prelude::*;

#[cfg(feature = "pi")]
fn board(config: &Config) -> Result<Board, anyhow::Error> {
    Board::from_config(config)
}

#[cfg(not(feature = "pi"))]
fn board(_config: &Config) -> Result<Board, anyhow::Error> {
    warn!("Built without the `pi` feature, using a simulated board");
    Ok(Board::simulated().0)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let config = Config::load_or_default()?;
    let board = board(&config)?;

    let (interrupter, interrupt) = interrupt_pair();
    let mut hat = RainbowHat::open(&board)?.with_interrupt(interrupt);

    // Ctrl-C stops both apps
    tokio::spawn({
        let interrupter = interrupter.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Ctrl-C received, shutting down"),
                Err(e) => error!("Unable to listen for Ctrl-C: {}", e),
            }
            interrupter.raise();
        }
    });

    let metronome = Metronome::from_config(&config.apps);
    let piano = Piano::from_config(&config.apps);

    let (metronome_result, piano_result) = tokio::join!(
        metronome.run(&hat, &interrupter),
        piano.run(&hat, &interrupter)
    );

    // Leave the board dark and quiet
    let mut message = ErrorMessage::new();
    for result in [hat.light_off().await, hat.play_tone(0).await] {
        if let Err(e) = result {
            e.write_message(&mut message);
            warn!("Cleanup: {}", message);
        }
    }
    hat.close();

    if metronome_result.is_err() {
        error!("Severe error occurred during execution of metronome");
    }
    if piano_result.is_err() {
        error!("Severe error occurred during execution of piano simulation");
    }
    metronome_result?;
    piano_result?;

    Ok(())
}
