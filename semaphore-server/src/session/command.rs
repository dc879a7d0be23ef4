use crate::relay::LinkSnapshot;
use semaphore_core::{ParticipantId, PeerInfo, SignalMessage};
use tokio::sync::oneshot;

/// Commands delivered to a session actor. One queue per session; processing
/// order is delivery order, which makes every roster/link mutation and every
/// check-then-forward an atomic unit.
pub enum SessionCommand {
    /// A participant asked to join with a display name.
    Join {
        participant: ParticipantId,
        name: String,
    },

    /// An inbound signaling frame from a joined channel.
    Signal {
        sender: ParticipantId,
        message: SignalMessage,
    },

    /// The participant's channel closed (cleanly or via `fault`).
    Disconnect {
        participant: ParticipantId,
        fault: bool,
    },

    /// Request/reply view of the current roster and link states.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub participants: Vec<PeerInfo>,
    pub links: Vec<LinkSnapshot>,
}
