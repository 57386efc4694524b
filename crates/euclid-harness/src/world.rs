//! Two peers wired together.
//!
//! A `PeerPair` holds a host and a guest session and one [`SimChannel`] per
//! direction. Actions a session emits are routed here: `Send` goes on the
//! channel, everything else is tallied for assertions. Delivery is explicit,
//! so tests choose the interleaving.

use arbitrary::Arbitrary;
use euclid_client::{ClientAction, ClientError, ClientEvent, Session, SessionConfig};
use euclid_core::legal_moves;
use euclid_proto::ProtoError;
use thiserror::Error;
use tracing::debug;

use crate::{SimChannel, SimEnv};

/// Which side of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary)]
pub enum Peer {
    /// Player one.
    Host,
    /// Player two.
    Guest,
}

impl Peer {
    /// The other side.
    pub fn other(self) -> Self {
        match self {
            Self::Host => Self::Guest,
            Self::Guest => Self::Host,
        }
    }
}

/// A step in a simulated match.
#[derive(Debug, Clone, Arbitrary)]
pub enum PeerOp {
    /// Whichever peer believes it is to move plays its `choice`-th legal move
    /// (modulo the number of legal moves). No-op if neither does.
    Play {
        /// Move index.
        choice: u8,
    },
    /// A peer proposes an arbitrary pair, legal or not, in turn or not.
    Propose {
        /// Proposing side.
        peer: Peer,
        /// First operand.
        a: u8,
        /// Second operand.
        b: u8,
    },
    /// Deliver up to `max` queued messages to `to`.
    Deliver {
        /// Receiving side.
        to: Peer,
        /// Message limit.
        max: u8,
    },
    /// Deliver everything in both directions.
    DeliverAll,
}

/// Failures that are not part of normal play.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A session refused an event.
    #[error("{peer:?}: {source}")]
    Client {
        /// Side that refused.
        peer: Peer,
        /// Session error.
        source: ClientError,
    },
    /// A channel could not carry a message.
    #[error(transparent)]
    Proto(#[from] ProtoError),
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    game_overs: usize,
    reconciled: usize,
    dropped: usize,
}

/// Host and guest sessions with a channel in each direction.
pub struct PeerPair {
    host: Session<SimEnv>,
    guest: Session<SimEnv>,
    to_host: SimChannel,
    to_guest: SimChannel,
    host_tally: Tally,
    guest_tally: Tally,
}

impl PeerPair {
    /// Open a lobby, join it and start the match, delivering every message.
    ///
    /// Each direction duplicates messages with `duplicate_rate` probability.
    pub fn new(seed: u64, duplicate_rate: f64) -> Result<Self, WorldError> {
        let env = SimEnv::with_seed(seed);
        let guest_config = SessionConfig { nick: "guest".to_string(), ..SessionConfig::default() };
        let mut pair = Self {
            host: Session::new(env.clone(), SessionConfig::default()),
            guest: Session::new(env, guest_config),
            to_host: SimChannel::new(seed.wrapping_add(1), duplicate_rate),
            to_guest: SimChannel::new(seed.wrapping_add(2), duplicate_rate),
            host_tally: Tally::default(),
            guest_tally: Tally::default(),
        };

        pair.handle(Peer::Host, ClientEvent::HostMatch)?;
        pair.handle(Peer::Guest, ClientEvent::JoinMatch)?;
        pair.deliver_all()?;
        pair.handle(Peer::Host, ClientEvent::StartMatch)?;
        pair.deliver_all()?;
        Ok(pair)
    }

    /// Session for one side.
    pub fn session(&self, peer: Peer) -> &Session<SimEnv> {
        match peer {
            Peer::Host => &self.host,
            Peer::Guest => &self.guest,
        }
    }

    /// Side that believes it is to move, if any.
    pub fn mover(&self) -> Option<Peer> {
        [Peer::Host, Peer::Guest].into_iter().find(|&peer| {
            self.session(peer).engine().is_some_and(|e| !e.is_over() && e.is_local_turn())
        })
    }

    /// Apply one step. Rule violations from `Propose` are returned as errors.
    pub fn apply(&mut self, op: &PeerOp) -> Result<(), WorldError> {
        match *op {
            PeerOp::Play { choice } => self.play(usize::from(choice)),
            PeerOp::Propose { peer, a, b } => {
                self.handle(peer, ClientEvent::Propose { a: u32::from(a), b: u32::from(b) })
            },
            PeerOp::Deliver { to, max } => self.deliver(to, usize::from(max)),
            PeerOp::DeliverAll => self.deliver_all(),
        }
    }

    /// Let the mover play its `choice`-th legal move.
    pub fn play(&mut self, choice: usize) -> Result<(), WorldError> {
        let Some(peer) = self.mover() else {
            return Ok(());
        };
        let moves = self
            .session(peer)
            .engine()
            .map(|engine| legal_moves(engine.current_board()))
            .unwrap_or_default();
        if moves.is_empty() {
            return Ok(());
        }
        let mv = moves[choice % moves.len()];
        self.handle(peer, ClientEvent::Propose { a: mv.high, b: mv.low })
    }

    /// Deliver up to `max` messages queued for `to`.
    ///
    /// Messages the receiver drops (duplicates, stale moves) are tallied, not
    /// returned as errors.
    pub fn deliver(&mut self, to: Peer, max: usize) -> Result<(), WorldError> {
        for _ in 0..max {
            let channel = match to {
                Peer::Host => &mut self.to_host,
                Peer::Guest => &mut self.to_guest,
            };
            let Some(message) = channel.recv()? else {
                break;
            };
            match self.handle(to, ClientEvent::MessageReceived(message)) {
                Ok(()) => {},
                Err(WorldError::Client { source, .. }) if !source.is_fatal() => {
                    debug!(?to, error = %source, "message dropped");
                    self.tally_mut(to).dropped += 1;
                },
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Deliver until both channels are empty.
    pub fn deliver_all(&mut self) -> Result<(), WorldError> {
        while !self.is_settled() {
            self.deliver(Peer::Host, self.to_host.len())?;
            self.deliver(Peer::Guest, self.to_guest.len())?;
        }
        Ok(())
    }

    /// Play to the end, delivering after every move.
    pub fn play_to_end(&mut self, choices: &[usize]) -> Result<(), WorldError> {
        let mut ply = 0;
        while self.mover().is_some() {
            self.play(choices.get(ply).copied().unwrap_or(0))?;
            self.deliver_all()?;
            ply += 1;
        }
        self.deliver_all()
    }

    /// Both channels are empty.
    pub fn is_settled(&self) -> bool {
        self.to_host.is_empty() && self.to_guest.is_empty()
    }

    /// `GameOver` actions seen by one side.
    pub fn game_overs(&self, peer: Peer) -> usize {
        self.tally(peer).game_overs
    }

    /// `Reconciled` actions seen by one side.
    pub fn reconciled(&self, peer: Peer) -> usize {
        self.tally(peer).reconciled
    }

    /// Peer messages one side dropped.
    pub fn dropped(&self, peer: Peer) -> usize {
        self.tally(peer).dropped
    }

    /// Extra copies injected by both channels.
    pub fn duplicated(&self) -> u64 {
        self.to_host.duplicated() + self.to_guest.duplicated()
    }

    fn handle(&mut self, peer: Peer, event: ClientEvent) -> Result<(), WorldError> {
        let session = match peer {
            Peer::Host => &mut self.host,
            Peer::Guest => &mut self.guest,
        };
        let actions = session.handle(event).map_err(|source| WorldError::Client { peer, source })?;
        self.route(peer, actions)
    }

    fn route(&mut self, from: Peer, actions: Vec<ClientAction>) -> Result<(), WorldError> {
        for action in actions {
            match action {
                ClientAction::Send(message) => match from {
                    Peer::Host => self.to_guest.send(&message)?,
                    Peer::Guest => self.to_host.send(&message)?,
                },
                ClientAction::GameOver { .. } => self.tally_mut(from).game_overs += 1,
                ClientAction::Reconciled { .. } => self.tally_mut(from).reconciled += 1,
                _ => {},
            }
        }
        Ok(())
    }

    fn tally(&self, peer: Peer) -> &Tally {
        match peer {
            Peer::Host => &self.host_tally,
            Peer::Guest => &self.guest_tally,
        }
    }

    fn tally_mut(&mut self, peer: Peer) -> &mut Tally {
        match peer {
            Peer::Host => &mut self.host_tally,
            Peer::Guest => &mut self.guest_tally,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use euclid_client::Phase;

    use super::*;

    #[test]
    fn match_starts_with_host_to_move() {
        let pair = PeerPair::new(11, 0.0).unwrap();
        assert_eq!(pair.mover(), Some(Peer::Host));
        assert_eq!(pair.session(Peer::Guest).phase(), &Phase::Playing);
        assert_eq!(pair.session(Peer::Host).opponent(), Some("guest"));
        assert_eq!(Peer::Host.other(), Peer::Guest);
    }

    #[test]
    fn turn_passes_only_after_delivery() {
        let mut pair = PeerPair::new(11, 0.0).unwrap();
        pair.play(0).unwrap();
        assert_eq!(pair.mover(), None);
        pair.deliver(Peer::Guest, 1).unwrap();
        assert_eq!(pair.mover(), Some(Peer::Guest));
    }

    #[test]
    fn out_of_turn_proposal_is_refused() {
        let mut pair = PeerPair::new(11, 0.0).unwrap();
        let result = pair.apply(&PeerOp::Propose { peer: Peer::Guest, a: 1, b: 2 });
        assert!(matches!(result, Err(WorldError::Client { peer: Peer::Guest, .. })));
        assert!(pair.is_settled());
    }
}
