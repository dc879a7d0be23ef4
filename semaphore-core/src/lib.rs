pub mod model;

pub use model::{
    IceCandidateInit, IceServerConfig, InvalidTransition, LinkState, NegotiationLink,
    ParticipantId, PeerInfo, SdpType, SessionDescription, SessionId, SignalKind, SignalMessage,
};
