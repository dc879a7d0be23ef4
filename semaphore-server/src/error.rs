use semaphore_core::{InvalidTransition, ParticipantId, SessionId, SignalMessage};
use thiserror::Error;

/// Everything that can go wrong while handling one signaling message.
/// Errors are local to the message: none of them take the server down, and
/// only `DuplicateParticipant` and a repeated `ProtocolViolation` cost the
/// sender its channel.
#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("join rejected: display name is missing or empty")]
    InvalidJoin,

    #[error("participant {participant} is already a member of session {session}")]
    DuplicateParticipant {
        participant: ParticipantId,
        session: SessionId,
    },

    #[error("relay target is unknown or ambiguous")]
    UnknownTarget { target: Option<ParticipantId> },

    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] InvalidTransition),

    #[error("transport fault on the channel of {participant}: {reason}")]
    ChannelFault {
        participant: ParticipantId,
        reason: String,
    },
}

impl SignalingError {
    /// Stable machine-readable code carried by `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJoin => "invalid-join",
            Self::DuplicateParticipant { .. } => "duplicate-participant",
            Self::UnknownTarget { .. } => "unknown-target",
            Self::ProtocolViolation(_) => "protocol-violation",
            Self::ChannelFault { .. } => "channel-fault",
        }
    }

    pub fn to_frame(&self) -> SignalMessage {
        SignalMessage::Error {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}
