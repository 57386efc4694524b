//! Convergence properties for two peers.
//!
//! Both peers keep their own engine. Whatever the interleaving, duplication
//! rate or move choices, once every message is delivered they must hold the
//! same board, history and winner, and each must have seen the end exactly
//! once.

#![allow(clippy::unwrap_used)]

use euclid_client::SyncCoordinator;
use euclid_core::{
    GameConfig, GameEngine, GameSetup, NumberSet, Player, PlayerRole, legal_moves,
};
use euclid_harness::{Peer, PeerOp, PeerPair, WorldError};
use euclid_proto::PeerMessage;
use proptest::prelude::*;

fn assert_converged(pair: &PeerPair) -> Result<(), TestCaseError> {
    let host = pair.session(Peer::Host).engine().unwrap();
    let guest = pair.session(Peer::Guest).engine().unwrap();
    prop_assert_eq!(host.current_board(), guest.current_board());
    prop_assert_eq!(host.move_history(), guest.move_history());
    prop_assert_eq!(host.winner(), guest.winner());
    prop_assert_eq!(host.is_over(), guest.is_over());
    prop_assert_eq!(host.current_player(), guest.current_player());
    Ok(())
}

fn peer_op_strategy() -> impl Strategy<Value = PeerOp> {
    let peer = prop_oneof![Just(Peer::Host), Just(Peer::Guest)];
    prop_oneof![
        6 => any::<u8>().prop_map(|choice| PeerOp::Play { choice }),
        1 => (peer.clone(), any::<u8>(), any::<u8>())
            .prop_map(|(peer, a, b)| PeerOp::Propose { peer, a, b }),
        4 => (peer, 0u8..4).prop_map(|(to, max)| PeerOp::Deliver { to, max }),
        1 => Just(PeerOp::DeliverAll),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Played to the end with delivery after every move, the peers agree and
    /// each reports the result once, duplicates notwithstanding.
    #[test]
    fn prop_full_match_converges(
        seed in any::<u64>(),
        duplicate_rate in 0.0f64..0.6,
        choices in prop::collection::vec(any::<usize>(), 0..40),
    ) {
        let mut pair = PeerPair::new(seed, duplicate_rate).unwrap();
        pair.play_to_end(&choices).unwrap();

        prop_assert!(pair.is_settled());
        assert_converged(&pair)?;
        prop_assert!(pair.session(Peer::Host).engine().unwrap().is_over());
        prop_assert_eq!(pair.game_overs(Peer::Host), 1);
        prop_assert_eq!(pair.game_overs(Peer::Guest), 1);
        prop_assert_eq!(pair.session(Peer::Host).divergences(), 0);
        prop_assert_eq!(pair.session(Peer::Guest).divergences(), 0);
    }

    /// Arbitrary interleavings of moves, rogue proposals and partial
    /// deliveries still settle into agreement.
    #[test]
    fn prop_interleavings_converge(
        seed in any::<u64>(),
        duplicate_rate in 0.0f64..0.5,
        ops in prop::collection::vec(peer_op_strategy(), 0..150),
    ) {
        let mut pair = PeerPair::new(seed, duplicate_rate).unwrap();
        for op in &ops {
            match pair.apply(op) {
                Ok(()) | Err(WorldError::Client { .. }) => {},
                Err(e) => prop_assert!(false, "channel failure: {}", e),
            }
        }
        pair.deliver_all().unwrap();

        assert_converged(&pair)?;
        prop_assert!(pair.reconciled(Peer::Host) == 0 && pair.reconciled(Peer::Guest) == 0);
    }

    /// A receiver whose board was corrupted before a move arrives adopts the
    /// mover's board, counting one divergence.
    #[test]
    fn prop_corrupted_receiver_adopts_peer_board(
        (low, high) in (20u32..=40, 60u32..=80).prop_filter("closed", |&(l, h)| h != l * 2),
        warmup in prop::collection::vec(any::<usize>(), 0..12),
        victim in any::<usize>(),
        choice in any::<usize>(),
    ) {
        let config = GameConfig::default();
        let mut host =
            GameEngine::from_seeds(config.clone(), GameSetup::network(PlayerRole::Host), [low, high], Player::One)
                .unwrap();
        let mut guest = SyncCoordinator::accept_start(config, &[low, high], 1, 1, 2).unwrap();
        let mut host_sync = SyncCoordinator::new(PlayerRole::Host);
        let mut guest_sync = SyncCoordinator::new(PlayerRole::Guest);

        // Host plays, guest receives. Guest replies are played symmetrically.
        for pick in warmup {
            if host.is_over() {
                break;
            }
            let (mover, mover_sync, receiver, receiver_sync) = if host.is_local_turn() {
                (&mut host, &host_sync, &mut guest, &mut guest_sync)
            } else {
                (&mut guest, &guest_sync, &mut host, &mut host_sync)
            };
            let moves = legal_moves(mover.current_board());
            let mv = moves[pick % moves.len()];
            let record = mover.propose(mv.high, mv.low).unwrap();
            for message in mover_sync.local_move(mover, &record) {
                if let PeerMessage::Move { player, num1, num2, diff, active_numbers } = message {
                    receiver_sync
                        .on_move(receiver, player, num1, num2, diff, &active_numbers)
                        .unwrap();
                }
            }
        }
        prop_assume!(!host.is_over() && host.is_local_turn());

        let moves = legal_moves(host.current_board());
        let mv = moves[choice % moves.len()];
        let record = host.propose(mv.high, mv.low).unwrap();

        // Drop one number the move does not use from the guest's copy.
        let spare: Vec<u32> = guest
            .current_board()
            .iter()
            .filter(|&n| n != record.num1 && n != record.num2)
            .collect();
        prop_assume!(!spare.is_empty());
        let dropped = spare[victim % spare.len()];
        let corrupted =
            NumberSet::from_numbers(guest.current_board().iter().filter(|&n| n != dropped)).unwrap();
        guest.adopt_board(corrupted).unwrap();
        prop_assume!(!guest.is_over());

        let before = guest_sync.divergences();
        let messages = host_sync.local_move(&host, &record);
        let [PeerMessage::Move { player, num1, num2, diff, active_numbers }, ..] = messages.as_slice()
        else {
            return Err(TestCaseError::fail("first message is not a move"));
        };
        let outcome = guest_sync
            .on_move(&mut guest, *player, *num1, *num2, *diff, active_numbers)
            .unwrap();

        prop_assert!(outcome.reconciled.is_some());
        prop_assert_eq!(guest.current_board(), host.current_board());
        prop_assert_eq!(guest_sync.divergences(), before + 1);
    }
}

#[test]
fn duplicated_messages_are_dropped_not_applied() {
    let mut pair = PeerPair::new(42, 1.0).unwrap();
    pair.play_to_end(&[]).unwrap();

    assert!(pair.duplicated() > 0);
    assert!(pair.dropped(Peer::Guest) + pair.dropped(Peer::Host) > 0);
    let host = pair.session(Peer::Host).engine().unwrap();
    let guest = pair.session(Peer::Guest).engine().unwrap();
    assert_eq!(host.move_history(), guest.move_history());
    assert_eq!(host.move_count() + 2, host.current_board().len());
}
