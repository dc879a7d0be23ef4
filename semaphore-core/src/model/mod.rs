mod negotiation;
mod participant;
mod session;
mod signaling;

pub use negotiation::{InvalidTransition, LinkState, NegotiationLink, SignalKind};
pub use participant::{ParticipantId, PeerInfo};
pub use session::SessionId;
pub use signaling::{IceCandidateInit, IceServerConfig, SdpType, SessionDescription, SignalMessage};
