use async_trait::async_trait;
use semaphore_core::{ParticipantId, SignalMessage};

/// Output port of a session actor: frame delivery to connected
/// participants. The WebSocket service implements it in production; tests
/// substitute a capturing mock.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue a frame for one participant. Fire-and-forget: a delivery
    /// failure surfaces later as that participant's channel tearing down
    /// and running disconnect cleanup.
    async fn send(&self, participant: ParticipantId, message: SignalMessage);

    /// Tear down a participant's channel from the server side.
    async fn close(&self, participant: ParticipantId);
}
