use crate::error::SignalingError;
use crate::session::Roster;
use crate::signaling::SignalingOutput;
use semaphore_core::{
    InvalidTransition, LinkState, NegotiationLink, ParticipantId, SignalKind, SignalMessage,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Links are keyed by the unordered participant pair; the link itself
/// remembers which side is currently the initiator.
type LinkKey = (ParticipantId, ParticipantId);

fn link_key(a: ParticipantId, b: ParticipantId) -> LinkKey {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Debug, Clone)]
pub struct LinkSnapshot {
    pub initiator: ParticipantId,
    pub responder: ParticipantId,
    pub state: LinkState,
}

/// Routes one participant's signaling frames to their target, gated by the
/// negotiation state machine. Owned by a session actor, so validation and
/// forwarding of a frame are a single atomic step.
pub struct RelayEngine {
    links: HashMap<LinkKey, NegotiationLink>,
    violations: HashMap<ParticipantId, u32>,
    violation_limit: u32,
}

impl RelayEngine {
    pub fn new(violation_limit: u32) -> Self {
        Self {
            links: HashMap::new(),
            violations: HashMap::new(),
            violation_limit,
        }
    }

    /// Creates the fresh link for a pair during join bootstrap. The existing
    /// member is the designated initiator, the newcomer responds.
    pub fn bootstrap_link(&mut self, initiator: ParticipantId, responder: ParticipantId) {
        self.links.insert(
            link_key(initiator, responder),
            NegotiationLink::new(initiator, responder),
        );
    }

    /// Marks every link involving the participant as failed and forgets its
    /// violation count. Failed links stay visible until the session dies; a
    /// rejoin gets a fresh identity and therefore fresh links.
    pub fn fail_links_of(&mut self, id: ParticipantId) {
        for ((a, b), link) in self.links.iter_mut() {
            if *a == id || *b == id {
                link.fail();
            }
        }
        self.violations.remove(&id);
    }

    pub fn link_state(&self, a: ParticipantId, b: ParticipantId) -> Option<LinkState> {
        self.links.get(&link_key(a, b)).map(|l| l.state())
    }

    pub fn link_snapshots(&self) -> Vec<LinkSnapshot> {
        self.links
            .values()
            .map(|l| LinkSnapshot {
                initiator: l.initiator(),
                responder: l.responder(),
                state: l.state(),
            })
            .collect()
    }

    /// Bumps the sender's repeat-offense counter. True once the configured
    /// limit is reached.
    pub fn record_violation(&mut self, id: ParticipantId) -> bool {
        let count = self.violations.entry(id).or_insert(0);
        *count += 1;
        *count >= self.violation_limit
    }

    /// Validates and forwards one offer/answer/candidate frame. The target
    /// comes from the frame's `target` field or, in a two-party session, is
    /// inferred as the only other member. On success the frame is forwarded
    /// with `from` stamped to the sender and the payload untouched.
    pub async fn relay(
        &mut self,
        roster: &Roster,
        sender: ParticipantId,
        message: SignalMessage,
        output: &Arc<dyn SignalingOutput>,
    ) -> Result<(), SignalingError> {
        let (kind, target) = match &message {
            SignalMessage::Offer { target, .. } => (SignalKind::Offer, *target),
            SignalMessage::Answer { target, .. } => (SignalKind::Answer, *target),
            SignalMessage::Candidate { target, .. } => (SignalKind::Candidate, *target),
            other => {
                debug!(?other, "relay called with a non-relayable frame");
                return Ok(());
            }
        };

        let target = self.resolve_target(roster, sender, target)?;
        self.advance(sender, target, kind)?;
        output.send(target, stamp_sender(message, sender)).await;
        Ok(())
    }

    fn resolve_target(
        &self,
        roster: &Roster,
        sender: ParticipantId,
        explicit: Option<ParticipantId>,
    ) -> Result<ParticipantId, SignalingError> {
        match explicit {
            Some(target) if roster.contains(target) && target != sender => Ok(target),
            Some(target) => Err(SignalingError::UnknownTarget {
                target: Some(target),
            }),
            None => {
                let others = roster.others(sender);
                match others.as_slice() {
                    [only] => Ok(only.id),
                    _ => Err(SignalingError::UnknownTarget { target: None }),
                }
            }
        }
    }

    fn advance(
        &mut self,
        sender: ParticipantId,
        target: ParticipantId,
        kind: SignalKind,
    ) -> Result<LinkState, SignalingError> {
        let key = link_key(sender, target);
        match kind {
            SignalKind::Offer => {
                let link = self
                    .links
                    .entry(key)
                    .or_insert_with(|| NegotiationLink::new(sender, target));
                // A failed link is never resurrected; the offer starts over.
                if link.is_failed() {
                    *link = NegotiationLink::new(sender, target);
                }
                Ok(link.apply_offer(sender)?)
            }
            SignalKind::Answer => match self.links.get_mut(&key) {
                Some(link) => Ok(link.apply_answer(sender)?),
                None => Err(no_link(kind)),
            },
            SignalKind::Candidate => match self.links.get_mut(&key) {
                Some(link) => Ok(link.apply_candidate(sender)?),
                None => Err(no_link(kind)),
            },
        }
    }
}

/// An answer or candidate for a pair with no link behaves like one in Idle.
fn no_link(kind: SignalKind) -> SignalingError {
    SignalingError::ProtocolViolation(InvalidTransition {
        kind,
        state: LinkState::Idle,
    })
}

fn stamp_sender(message: SignalMessage, sender: ParticipantId) -> SignalMessage {
    match message {
        SignalMessage::Offer { target, offer, .. } => SignalMessage::Offer {
            target,
            from: Some(sender),
            offer,
        },
        SignalMessage::Answer { target, answer, .. } => SignalMessage::Answer {
            target,
            from: Some(sender),
            answer,
        },
        SignalMessage::Candidate {
            target, candidate, ..
        } => SignalMessage::Candidate {
            target,
            from: Some(sender),
            candidate,
        },
        other => other,
    }
}
