//! Session events and actions.

use std::{fmt, time::Duration};

use euclid_core::{Difficulty, GameMode, MoveError, MoveRecord, Player, PlayerRole, StateSnapshot};
use euclid_proto::PeerMessage;

/// Identifies one scheduled bot move.
///
/// `session` changes whenever a game is started, loaded or abandoned, and `ply`
/// is the move count when the timer was armed. A fired key that does not match
/// the session's pending key is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BotTimerKey {
    /// Game identifier at scheduling time.
    pub session: u64,
    /// Moves made when the timer was armed.
    pub ply: usize,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The remote peer went away mid-match.
    OpponentDisconnected,
    /// The local user left.
    Left,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpponentDisconnected => f.write_str("opponent disconnected"),
            Self::Left => f.write_str("left"),
        }
    }
}

/// Input to the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Start a local game (against the bot, or two players on one board).
    NewGame {
        /// Local mode. Network matches go through `HostMatch`/`JoinMatch`.
        mode: GameMode,
        /// Bot tier.
        difficulty: Difficulty,
    },

    /// Open a lobby as host and wait for a guest.
    HostMatch,

    /// Join a host's lobby as guest.
    JoinMatch,

    /// Host starts the match once a guest is ready.
    StartMatch,

    /// User picked a number on the board.
    Select(u32),

    /// User proposed a pair directly.
    Propose {
        /// First operand.
        a: u32,
        /// Second operand.
        b: u32,
    },

    /// A scheduled bot timer fired.
    BotTimerFired(BotTimerKey),

    /// A message arrived from the peer.
    MessageReceived(PeerMessage),

    /// The transport lost the peer.
    PeerDisconnected,

    /// Resume a saved local game.
    Load(StateSnapshot),

    /// Abandon the current game or match.
    Leave,
}

/// Output of the session state machine, for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Send a message to the peer.
    Send(PeerMessage),

    /// Arm a single-shot timer; feed `BotTimerFired(key)` back when it fires.
    ScheduleBotMove {
        /// Key to return.
        key: BotTimerKey,
        /// Delay before firing.
        delay: Duration,
    },

    /// Disarm a timer armed earlier.
    CancelBotMove {
        /// Key of the timer to cancel.
        key: BotTimerKey,
    },

    /// A move was applied to the local board.
    MoveApplied(MoveRecord),

    /// A pair completed by selection was refused; selection is cleared.
    MoveRejected(MoveError),

    /// Pending picks changed.
    SelectionChanged(Vec<u32>),

    /// The local board was replaced by the peer's after a mismatch.
    Reconciled {
        /// Local board before adoption.
        local: Vec<u32>,
        /// Peer's board, now adopted.
        remote: Vec<u32>,
    },

    /// A network match began.
    MatchStarted {
        /// Local role.
        role: PlayerRole,
        /// Opponent's nickname, when known.
        opponent: Option<String>,
    },

    /// It is now the local player's turn.
    YourTurn,

    /// The game ended.
    GameOver {
        /// Winning seat.
        winner: Player,
    },

    /// The session stopped; the caller returns to a non-playing state.
    SessionEnded {
        /// Why it stopped.
        reason: EndReason,
    },
}
