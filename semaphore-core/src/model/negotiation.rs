use crate::model::participant::ParticipantId;
use serde::Serialize;
use thiserror::Error;

/// The relayable message kinds the state machine gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

/// Handshake progress of one participant pair.
///
/// `Established` is a labeling convenience: the first candidate after the
/// answer flips the link over, and candidates keep flowing afterwards
/// (trickle ICE). `Failed` is terminal; a later offer on the same pair key
/// replaces the link rather than resurrecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkState {
    Idle,
    OfferSent,
    AnswerReceived,
    Established,
    Failed,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind:?} is not valid while the link is {state:?}")]
pub struct InvalidTransition {
    pub kind: SignalKind,
    pub state: LinkState,
}

/// Negotiation link for one participant pair. Direction matters: the
/// initiator is whoever sent the live offer, the responder answers it.
#[derive(Debug, Clone)]
pub struct NegotiationLink {
    initiator: ParticipantId,
    responder: ParticipantId,
    state: LinkState,
}

impl NegotiationLink {
    pub fn new(initiator: ParticipantId, responder: ParticipantId) -> Self {
        Self {
            initiator,
            responder,
            state: LinkState::Idle,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn initiator(&self) -> ParticipantId {
        self.initiator
    }

    pub fn responder(&self) -> ParticipantId {
        self.responder
    }

    pub fn is_failed(&self) -> bool {
        self.state == LinkState::Failed
    }

    fn other(&self, id: ParticipantId) -> ParticipantId {
        if id == self.initiator {
            self.responder
        } else {
            self.initiator
        }
    }

    /// An offer in any live state is a (re)negotiation: the sender becomes
    /// the initiator and any prior answer progress is discarded.
    pub fn apply_offer(&mut self, from: ParticipantId) -> Result<LinkState, InvalidTransition> {
        if self.state == LinkState::Failed {
            return Err(InvalidTransition {
                kind: SignalKind::Offer,
                state: self.state,
            });
        }
        self.responder = self.other(from);
        self.initiator = from;
        self.state = LinkState::OfferSent;
        Ok(self.state)
    }

    /// Only the responder may answer, and only while an offer is pending.
    pub fn apply_answer(&mut self, from: ParticipantId) -> Result<LinkState, InvalidTransition> {
        if self.state != LinkState::OfferSent || from != self.responder {
            return Err(InvalidTransition {
                kind: SignalKind::Answer,
                state: self.state,
            });
        }
        self.state = LinkState::AnswerReceived;
        Ok(self.state)
    }

    /// Candidates trickle from either side once an offer is in flight.
    pub fn apply_candidate(&mut self, _from: ParticipantId) -> Result<LinkState, InvalidTransition> {
        match self.state {
            LinkState::OfferSent | LinkState::Established => Ok(self.state),
            LinkState::AnswerReceived => {
                self.state = LinkState::Established;
                Ok(self.state)
            }
            LinkState::Idle | LinkState::Failed => Err(InvalidTransition {
                kind: SignalKind::Candidate,
                state: self.state,
            }),
        }
    }

    pub fn fail(&mut self) {
        self.state = LinkState::Failed;
    }
}
