//! Fuzz target for the [`Session`] state machine
//!
//! # Strategy
//!
//! - Event sequences: arbitrary mixes of local commands, peer messages, bot
//!   timer fires, loads and disconnects, in any phase
//! - Peer messages carry small numbers so they often touch the real board
//! - Snapshots are built both from the session's own saves and from raw fields
//!
//! # Invariants
//!
//! - NEVER panic, whatever the event order
//! - `game_over` iff a winner is recorded
//! - A live board always has a legal move
//! - The selection holds at most two distinct numbers, all on the board
//! - A local game's snapshot restores to an identical engine

#![no_main]

use arbitrary::Arbitrary;
use euclid_client::{BotTimerKey, ClientEvent, Session, SessionConfig};
use euclid_core::{
    Difficulty, GameConfig, GameEngine, GameMode, MoveRecord, Player, StateSnapshot, is_terminal,
};
use euclid_harness::SimEnv;
use euclid_proto::PeerMessage;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum FuzzEvent {
    NewGame { local: bool, difficulty: u8 },
    HostMatch,
    JoinMatch,
    StartMatch,
    Select(u8),
    Propose { a: u8, b: u8 },
    /// Fire the pending timer if `pending` and one exists, otherwise a made-up key.
    BotTimer { pending: bool, session: u64, ply: u8 },
    Message(FuzzMessage),
    PeerDisconnected,
    /// Reload the session's own save.
    Reload,
    LoadRaw(FuzzSnapshot),
    Leave,
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzMessage {
    PlayerReady,
    GameStart { numbers: Vec<u8>, current: u8, host: u8, guest: u8 },
    Move { player: u8, num1: u8, num2: u8, diff: u8, numbers: Vec<u8> },
    GameOver { winner: u8, numbers: Vec<u8> },
    Unknown,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzSnapshot {
    vs_bot: bool,
    numbers: Vec<u8>,
    selected: Vec<u8>,
    second_to_move: bool,
    over: bool,
    winner: Option<bool>,
    history: Vec<(bool, u8, u8)>,
}

fn wide(numbers: &[u8]) -> Vec<u32> {
    numbers.iter().map(|&n| u32::from(n)).collect()
}

fn to_message(message: FuzzMessage) -> PeerMessage {
    match message {
        FuzzMessage::PlayerReady => PeerMessage::PlayerReady { player_nick: "fuzz".to_string() },
        FuzzMessage::GameStart { numbers, current, host, guest } => PeerMessage::GameStart {
            active_numbers: wide(&numbers),
            current_player: current,
            host_player: host,
            guest_player: guest,
        },
        FuzzMessage::Move { player, num1, num2, diff, numbers } => PeerMessage::Move {
            player,
            num1: num1.into(),
            num2: num2.into(),
            diff: diff.into(),
            active_numbers: wide(&numbers),
        },
        FuzzMessage::GameOver { winner, numbers } => {
            PeerMessage::GameOver { winner, final_state: wide(&numbers) }
        },
        FuzzMessage::Unknown => PeerMessage::Unknown,
    }
}

fn to_snapshot(raw: FuzzSnapshot) -> StateSnapshot {
    let seat = |second: bool| if second { Player::Two } else { Player::One };
    StateSnapshot {
        game_mode: if raw.vs_bot { GameMode::SinglePlayerVsBot } else { GameMode::LocalTwoPlayer },
        difficulty: Difficulty::Medium,
        active_numbers: wide(&raw.numbers),
        selected_numbers: wide(&raw.selected),
        current_player: seat(raw.second_to_move),
        game_over: raw.over,
        winner: raw.winner.map(seat),
        move_history: raw
            .history
            .into_iter()
            .map(|(second, a, b)| MoveRecord {
                player: seat(second),
                num1: a.into(),
                num2: b.into(),
                diff: a.abs_diff(b).into(),
            })
            .collect(),
        role: None,
    }
}

fn difficulty(n: u8) -> Difficulty {
    match n % 3 {
        0 => Difficulty::Easy,
        1 => Difficulty::Medium,
        _ => Difficulty::Expert,
    }
}

fn check_invariants(session: &Session<SimEnv>) {
    let Some(engine) = session.engine() else {
        return;
    };
    assert_eq!(engine.is_over(), engine.winner().is_some(), "over iff winner");
    if !engine.is_over() {
        assert!(!is_terminal(engine.current_board()), "live board without a legal move");
    }

    let selected = engine.selected();
    assert!(selected.len() <= 2);
    assert!(selected.iter().all(|&n| engine.current_board().contains(n)));
    if selected.len() == 2 {
        assert_ne!(selected[0], selected[1]);
    }

    if engine.state().mode != GameMode::NetworkTwoPlayer {
        let snapshot = engine.save();
        let restored = GameEngine::restore(engine.config().clone(), &snapshot)
            .expect("local game snapshot must restore");
        assert_eq!(restored.state(), engine.state());
    }
}

fuzz_target!(|input: (u64, Vec<FuzzEvent>)| {
    let (seed, events) = input;
    let mut session = Session::new(SimEnv::with_seed(seed), SessionConfig::default());

    for event in events.into_iter().take(256) {
        let event = match event {
            FuzzEvent::NewGame { local, difficulty: d } => ClientEvent::NewGame {
                mode: if local { GameMode::LocalTwoPlayer } else { GameMode::SinglePlayerVsBot },
                difficulty: difficulty(d),
            },
            FuzzEvent::HostMatch => ClientEvent::HostMatch,
            FuzzEvent::JoinMatch => ClientEvent::JoinMatch,
            FuzzEvent::StartMatch => ClientEvent::StartMatch,
            FuzzEvent::Select(n) => ClientEvent::Select(n.into()),
            FuzzEvent::Propose { a, b } => ClientEvent::Propose { a: a.into(), b: b.into() },
            FuzzEvent::BotTimer { pending, session: id, ply } => {
                let key = session
                    .pending_bot()
                    .filter(|_| pending)
                    .unwrap_or(BotTimerKey { session: id, ply: ply.into() });
                ClientEvent::BotTimerFired(key)
            },
            FuzzEvent::Message(message) => ClientEvent::MessageReceived(to_message(message)),
            FuzzEvent::PeerDisconnected => ClientEvent::PeerDisconnected,
            FuzzEvent::Reload => match session.save() {
                Some(snapshot) => ClientEvent::Load(snapshot),
                None => continue,
            },
            FuzzEvent::LoadRaw(raw) => ClientEvent::Load(to_snapshot(raw)),
            FuzzEvent::Leave => ClientEvent::Leave,
        };

        let before = session.save();
        if session.handle(event).is_err() {
            assert_eq!(session.save(), before, "refused event changed the game");
        }
        check_invariants(&session);
    }
});
