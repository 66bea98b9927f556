use std::time::Duration;

use rainbow_hat::apps::{Metronome, Piano};
use rainbow_hat::buttons::ButtonReader;
use rainbow_hat::hal::sim::{RecordingSink, SimButton, TimerEvent};
use rainbow_hat::lights::{encode, LightArray, LedController};
use rainbow_hat::prelude::*;

/// Frame for an arc with `lights` set and every other light off.
fn frame_with(lights: &[(usize, Rgb)]) -> Vec<u8> {
    let mut array = LightArray::default();
    for (index, color) in lights {
        array.set(*index, *color);
    }
    encode(&array).unwrap().to_vec()
}

const RED: Rgb = Rgb::new(0xFF, 0, 0);
const GREEN: Rgb = Rgb::new(0, 0xFF, 0);
const PURPLE: Rgb = Rgb::new(0xFF, 0, 0xFF);

#[tokio::test]
async fn test_light_on_broadcast() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    hat.light_on(&[0, 1, 2], &["FF0000"]).await.unwrap();

    assert_eq!(
        Some(frame_with(&[(0, RED), (1, RED), (2, RED)])),
        sim.sink.last_frame()
    );
}

#[tokio::test]
async fn test_light_on_color_per_pin() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    hat.light_on(&[0, 1], &["FF0000", "00FF00"]).await.unwrap();

    assert_eq!(
        Some(frame_with(&[(0, RED), (1, GREEN)])),
        sim.sink.last_frame()
    );
}

#[tokio::test]
async fn test_light_on_mismatched_colors() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    hat.light_on(&[0, 1, 2], &["FF0000", "00FF00"])
        .await
        .unwrap();

    assert_eq!(
        Some(frame_with(&[(0, RED), (1, RED), (2, RED)])),
        sim.sink.last_frame()
    );
}

#[tokio::test]
async fn test_light_on_bad_pin_reaches_driver() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    let err = hat.light_on(&[7], &["FF0000"]).await.unwrap_err();
    assert_eq!(ErrorKind::Range, err.kind());
    assert!(sim.sink.frames().is_empty());

    let mut message = ErrorMessage::new();
    assert!(err.write_message(&mut message));
    assert!(message.starts_with("LED-Device: Invalid argument!"));
}

#[tokio::test]
async fn test_light_off() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    hat.light_on(&[3], &["FFFFFF"]).await.unwrap();
    hat.light_off().await.unwrap();

    assert_eq!(Some(frame_with(&[])), sim.sink.last_frame());
}

#[tokio::test]
async fn test_play_tone() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    hat.play_tone(1).await.unwrap();
    assert_eq!(
        vec![
            TimerEvent::Configure {
                duty_ns: 500_000_000,
                period_ns: 1_000_000_000
            },
            TimerEvent::Enable
        ],
        sim.timer.events()
    );

    hat.play_tone(0).await.unwrap();
    assert!(!sim.timer.is_enabled());
}

#[tokio::test]
async fn test_read_buttons() {
    let (board, sim) = Board::simulated();
    let hat = RainbowHat::open(&board).unwrap();

    // Every input high
    assert_eq!(ButtonSample::new([false, false, false]), hat.read_buttons().unwrap());
    assert_eq!(None, hat.active_button().unwrap());

    sim.buttons[1].press();
    sim.buttons[2].press();
    assert_eq!(ButtonSample::new([false, true, true]), hat.read_buttons().unwrap());
    assert_eq!(Some(Button::B), hat.active_button().unwrap());

    sim.buttons[0].break_input();
    let err = hat.read_buttons().unwrap_err();
    assert_eq!(ErrorKind::Device, err.kind());
    assert_eq!(Peripheral::Buttons, err.peripheral());
}

#[test]
fn test_open_rolls_back() {
    // LEDs and buttons but no buzzer
    let board = Board::empty()
        .with_leds(LedController::new(RecordingSink::new()))
        .with_buttons(ButtonReader::new([
            Box::new(SimButton::new()),
            Box::new(SimButton::new()),
            Box::new(SimButton::new()),
        ]));

    let err = RainbowHat::open(&board).err().unwrap();
    assert!(matches!(
        err,
        ClientError::Open(OpenError {
            peripheral: Peripheral::Buzzer
        })
    ));
    assert_eq!(ErrorKind::DeviceUnavailable, err.kind());

    let err = RainbowHat::open(&Board::empty()).err().unwrap();
    assert_eq!(Peripheral::Leds, err.peripheral());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (board, sim) = Board::simulated();
    let mut hat = RainbowHat::open(&board).unwrap();
    assert!(hat.is_open());

    hat.close();
    hat.close();
    assert!(!hat.is_open());

    let err = hat.light_on(&[0], &["FF0000"]).await.unwrap_err();
    assert!(matches!(err, ClientError::Unavailable(Peripheral::Leds)));
    let err = hat.play_tone(440).await.unwrap_err();
    assert!(matches!(err, ClientError::Unavailable(Peripheral::Buzzer)));
    let err = hat.read_buttons().unwrap_err();
    assert!(matches!(err, ClientError::Unavailable(Peripheral::Buttons)));
    assert_eq!(ErrorKind::DeviceUnavailable, err.kind());

    assert!(sim.sink.frames().is_empty());
    assert!(sim.timer.events().is_empty());
}

#[tokio::test]
async fn test_metronome_beats() {
    let (board, sim) = Board::simulated();
    let (interrupter, interrupt) = interrupt_pair();
    let hat = RainbowHat::open(&board).unwrap().with_interrupt(interrupt);

    // 600 bpm leaves no rest after the flash
    let metronome = Metronome::new(600, "FF0000", "FF00FF");

    let (result, ()) = tokio::join!(metronome.run(&hat, &interrupter), async {
        tokio::time::sleep(Duration::from_millis(450)).await;
        interrupter.raise();
    });
    result.unwrap();

    let frames = sim.sink.frames();
    assert!(frames.len() >= 6, "only {} frames", frames.len());

    let all: Vec<(usize, Rgb)> = (0..7).map(|i| (i, RED)).collect();
    assert_eq!(frame_with(&all), frames[0]);
    assert_eq!(frame_with(&[]), frames[1]);
    assert_eq!(
        frame_with(&[(4, PURPLE), (5, PURPLE), (6, PURPLE)]),
        frames[2]
    );
    assert_eq!(frame_with(&[]), frames[3]);
    assert_eq!(
        frame_with(&[(0, PURPLE), (1, PURPLE), (2, PURPLE)]),
        frames[4]
    );

    // Stopped with the lights off
    assert_eq!(Some(frame_with(&[])), sim.sink.last_frame());
}

#[tokio::test]
async fn test_piano_plays_held_button() {
    let (board, sim) = Board::simulated();
    let (interrupter, _interrupt) = interrupt_pair();
    let hat = RainbowHat::open(&board).unwrap();

    let piano = Piano::new([262, 330, 392]);

    let (result, ()) = tokio::join!(piano.run(&hat, &interrupter), async {
        sim.buttons[1].press();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sim.timer.is_enabled());

        sim.buttons[1].release();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sim.timer.is_enabled());

        interrupter.raise();
    });
    result.unwrap();

    // 330 Hz
    assert!(sim.timer.events().contains(&TimerEvent::Configure {
        duty_ns: 1_515_151,
        period_ns: 3_030_303
    }));
}

#[tokio::test]
async fn test_piano_error_raises_interrupt() {
    let (board, sim) = Board::simulated();
    let (interrupter, _interrupt) = interrupt_pair();
    let hat = RainbowHat::open(&board).unwrap();

    sim.buttons[2].break_input();
    let err = Piano::new([262, 330, 392])
        .run(&hat, &interrupter)
        .await
        .unwrap_err();

    assert_eq!(ErrorKind::Device, err.kind());
    assert!(interrupter.is_raised());
}
