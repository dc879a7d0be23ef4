use crate::model::participant::{ParticipantId, PeerInfo};
use serde::{Deserialize, Serialize};

/// One ICE server entry advertised to clients on connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

/// A session description exactly as the browser serializes
/// `RTCSessionDescription`: `{"type": "offer"|"answer", "sdp": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpType,
    pub sdp: String,
}

/// An ICE candidate exactly as the browser serializes `RTCIceCandidate`.
/// Extra fields (e.g. `usernameFragment`) are tolerated and dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceCandidateInit {
    pub candidate: String,
    #[serde(rename = "sdpMid", default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
}

/// One signaling frame. A single JSON object per WebSocket text frame,
/// tagged on `"type"`.
///
/// `target` on the point-to-point kinds names the recipient; when absent the
/// relay infers it, which only works while the session has exactly two
/// members. `from` is stamped by the server before forwarding and must not
/// be set by clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    Join {
        name: String,
    },
    Offer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ParticipantId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
        offer: SessionDescription,
    },
    Answer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ParticipantId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
        answer: SessionDescription,
    },
    Candidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ParticipantId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
        candidate: IceCandidateInit,
    },
    /// Explicit goodbye from a client, or — with `from` set — the synthetic
    /// notification the server fans out when a peer disappears.
    Leave {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
    },
    /// First frame after a successful join: the joiner's own id plus the
    /// members already present.
    Welcome {
        participant_id: ParticipantId,
        peers: Vec<PeerInfo>,
    },
    /// Pushed on connect so clients can build their peer connection.
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    /// Tells an existing member that a newcomer arrived and that the
    /// receiver is the one expected to originate the offer for this pair.
    PeerJoined {
        participant_id: ParticipantId,
        name: String,
    },
    Error {
        code: String,
        message: String,
    },
    /// Forward-compatible no-op for unrecognized `"type"` tags.
    #[serde(other)]
    Unknown,
}
