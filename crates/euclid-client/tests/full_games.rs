//! Complete games driven through the session, firing timers immediately.

#![allow(clippy::unwrap_used)]

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use euclid_client::{
    ClientAction, ClientEvent, Environment, Phase, Session, SessionConfig,
};
use euclid_core::{Difficulty, GameMode, Player, legal_moves};
use euclid_proto::PeerMessage;

struct Ready;

impl Future for Ready {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        Poll::Ready(())
    }
}

#[derive(Clone)]
struct FixedEnv(u8);

impl Environment for FixedEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        Ready
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(self.0);
    }
}

fn human_move(session: &Session<FixedEnv>) -> (u32, u32) {
    let mv = legal_moves(session.engine().unwrap().current_board())[0];
    (mv.high, mv.low)
}

#[test]
fn vs_bot_game_runs_to_completion() {
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Expert] {
        let mut session = Session::new(FixedEnv(7), SessionConfig::default());
        session.handle(ClientEvent::NewGame { mode: GameMode::SinglePlayerVsBot, difficulty }).unwrap();

        let mut game_overs = 0;
        while session.phase() == &Phase::Playing {
            let (a, b) = human_move(&session);
            let mut queue = session.handle(ClientEvent::Propose { a, b }).unwrap();
            while let Some(action) = queue.pop() {
                match action {
                    ClientAction::ScheduleBotMove { key, .. } => {
                        queue.extend(session.handle(ClientEvent::BotTimerFired(key)).unwrap());
                    },
                    ClientAction::GameOver { .. } => game_overs += 1,
                    _ => {},
                }
            }
        }

        let engine = session.engine().unwrap();
        assert_eq!(session.phase(), &Phase::Finished);
        assert_eq!(game_overs, 1);
        assert_eq!(engine.winner(), engine.move_history().last().map(|r| r.player));
        assert!(engine.move_history().iter().enumerate().all(|(i, r)| {
            r.player == if i % 2 == 0 { Player::One } else { Player::Two }
        }));
    }
}

#[test]
fn network_match_between_two_sessions() {
    let mut host = Session::new(FixedEnv(1), SessionConfig::default());
    let guest_config = SessionConfig { nick: "bob".into(), ..SessionConfig::default() };
    let mut guest = Session::new(FixedEnv(2), guest_config);

    host.handle(ClientEvent::HostMatch).unwrap();
    let mut to_host = sends(guest.handle(ClientEvent::JoinMatch).unwrap());
    let mut to_guest = Vec::new();
    for msg in to_host.drain(..) {
        host.handle(ClientEvent::MessageReceived(msg)).unwrap();
    }
    to_guest.extend(sends(host.handle(ClientEvent::StartMatch).unwrap()));
    assert_eq!(host.opponent(), Some("bob"));

    loop {
        for msg in to_guest.drain(..) {
            guest.handle(ClientEvent::MessageReceived(msg)).unwrap();
        }
        for msg in to_host.drain(..) {
            host.handle(ClientEvent::MessageReceived(msg)).unwrap();
        }
        if host.phase() == &Phase::Finished && guest.phase() == &Phase::Finished {
            break;
        }

        let host_turn = host.engine().unwrap().is_local_turn();
        let (mover, outbox) = if host_turn { (&mut host, &mut to_guest) } else { (&mut guest, &mut to_host) };
        let (a, b) = human_move(mover);
        outbox.extend(sends(mover.handle(ClientEvent::Propose { a, b }).unwrap()));
    }

    let (h, g) = (host.engine().unwrap(), guest.engine().unwrap());
    assert_eq!(h.current_board(), g.current_board());
    assert_eq!(h.winner(), g.winner());
    assert_eq!(h.move_history(), g.move_history());
    assert_eq!(host.divergences() + guest.divergences(), 0);
}

fn sends(actions: Vec<ClientAction>) -> Vec<PeerMessage> {
    actions
        .into_iter()
        .filter_map(|action| match action {
            ClientAction::Send(msg) => Some(msg),
            _ => None,
        })
        .collect()
}
