//! Driver tests: whole games through the command surface.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use euclid_cli::{CliError, Command, Driver, DriverConfig, SystemEnv};
use euclid_client::SessionConfig;
use euclid_core::{Difficulty, GameMode, legal_moves};

fn config(mode: GameMode, difficulty: Difficulty) -> DriverConfig {
    DriverConfig {
        mode,
        difficulty,
        session: SessionConfig {
            bot_delay: Duration::ZERO,
            resume_bot_delay: Duration::ZERO,
            ..SessionConfig::default()
        },
        save_path: None,
    }
}

fn text(out: &[u8]) -> String {
    String::from_utf8_lossy(out).into_owned()
}

/// Play the first legal move for the human seat.
async fn play_first_move(driver: &mut Driver<SystemEnv>, out: &mut Vec<u8>) {
    let engine = driver.session().engine().unwrap();
    let mv = legal_moves(engine.current_board())[0];
    driver.command(Command::Move(mv.high, mv.low), out).await.unwrap();
}

#[tokio::test]
async fn vs_bot_game_runs_to_completion() {
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Expert] {
        let mut driver = Driver::new(SystemEnv::seeded(3), config(GameMode::SinglePlayerVsBot, difficulty));
        let mut out = Vec::new();
        driver.start(None, &mut out).await.unwrap();

        while !driver.session().engine().unwrap().is_over() {
            if driver.session().engine().unwrap().is_local_turn() {
                play_first_move(&mut driver, &mut out).await;
            } else {
                assert!(driver.fire_next_timer(&mut out).await.unwrap());
            }
        }

        let output = text(&out);
        assert!(output.contains("game over"), "{output}");
        assert_eq!(driver.armed_timers(), 0);
    }
}

#[tokio::test]
async fn new_game_aborts_pending_bot_timer() {
    let mut config = config(GameMode::SinglePlayerVsBot, Difficulty::Expert);
    config.session.bot_delay = Duration::from_millis(50);
    let mut out = Vec::new();

    // Skip seeds whose board closes on the first move.
    let mut seed = 0;
    let mut driver = loop {
        let mut driver = Driver::new(SystemEnv::seeded(seed), config.clone());
        driver.start(None, &mut out).await.unwrap();
        play_first_move(&mut driver, &mut out).await;
        if !driver.session().engine().unwrap().is_over() {
            break driver;
        }
        seed += 1;
    };
    assert_eq!(driver.armed_timers(), 1);

    driver.command(Command::New, &mut out).await.unwrap();
    assert_eq!(driver.armed_timers(), 0);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!driver.fire_next_timer(&mut out).await.unwrap());

    let engine = driver.session().engine().unwrap();
    assert_eq!(engine.move_count(), 0);
    assert!(engine.is_local_turn());
}

#[tokio::test]
async fn local_game_alternates_seats() {
    let mut driver = Driver::new(SystemEnv::seeded(9), config(GameMode::LocalTwoPlayer, Difficulty::Medium));
    let mut out = Vec::new();
    driver.start(None, &mut out).await.unwrap();

    play_first_move(&mut driver, &mut out).await;
    play_first_move(&mut driver, &mut out).await;

    let engine = driver.session().engine().unwrap();
    assert_eq!(engine.move_count(), 2);
    assert_eq!(driver.armed_timers(), 0);
    assert!(text(&out).contains("Player 2: "));
}

#[tokio::test]
async fn refused_moves_are_reported_not_fatal() {
    let mut driver = Driver::new(SystemEnv::seeded(1), config(GameMode::LocalTwoPlayer, Difficulty::Easy));
    let mut out = Vec::new();
    driver.start(None, &mut out).await.unwrap();

    driver.command(Command::Move(1000, 2000), &mut out).await.unwrap();
    driver.command(Command::Pick(1000), &mut out).await.unwrap();

    let output = text(&out);
    assert_eq!(output.matches("error: ").count(), 2, "{output}");
    assert_eq!(driver.session().engine().unwrap().move_count(), 0);
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.cbor");

    let mut first = Driver::new(SystemEnv::seeded(4), config(GameMode::LocalTwoPlayer, Difficulty::Easy));
    let mut out = Vec::new();
    first.start(None, &mut out).await.unwrap();
    play_first_move(&mut first, &mut out).await;
    first.command(Command::Save(Some(path.clone())), &mut out).await.unwrap();
    assert!(text(&out).contains("saved to"));

    let mut second = Driver::new(SystemEnv::seeded(5), config(GameMode::LocalTwoPlayer, Difficulty::Easy));
    second.start(Some(path), &mut out).await.unwrap();

    assert_eq!(first.session().save(), second.session().save());
}

#[tokio::test]
async fn loading_garbage_keeps_current_game() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.cbor");
    std::fs::write(&path, b"not a snapshot").unwrap();

    let mut driver = Driver::new(SystemEnv::seeded(2), config(GameMode::LocalTwoPlayer, Difficulty::Easy));
    let mut out = Vec::new();
    driver.start(None, &mut out).await.unwrap();
    let before = driver.session().save();

    driver.command(Command::Load(Some(path)), &mut out).await.unwrap();
    driver.command(Command::Load(None), &mut out).await.unwrap();

    let output = text(&out);
    assert!(output.contains("broken.cbor"), "{output}");
    assert!(output.contains(&CliError::NoSavePath.to_string()), "{output}");
    assert_eq!(driver.session().save(), before);
}

#[tokio::test]
async fn run_reads_commands_until_quit() {
    let mut driver = Driver::new(SystemEnv::seeded(6), config(GameMode::LocalTwoPlayer, Difficulty::Easy));
    let mut out = Vec::new();
    driver.start(None, &mut out).await.unwrap();

    let input: &[u8] = b"help\n\nbogus words here\nhistory\nquit\nnew\n";
    driver.run(input, &mut out).await.unwrap();

    let output = text(&out);
    assert!(output.contains("commands:"));
    assert!(output.contains("unknown command"));
    assert!(output.contains("no moves yet"));
    assert_eq!(output.matches("board: ").count(), 1, "input after quit must be ignored");
}
