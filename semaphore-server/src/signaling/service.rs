use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use semaphore_core::{IceServerConfig, ParticipantId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct SignalingInner {
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Maps participants to their WebSocket outboxes. Dropping an outbox ends
/// that socket's send pump, which is how a server-side close propagates.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, participant: ParticipantId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(participant, tx);
    }

    pub fn remove_peer(&self, participant: ParticipantId) {
        self.inner.peers.remove(&participant);
    }

    pub fn send_signal(&self, participant: ParticipantId, msg: &SignalMessage) {
        if let Some(peer) = self.inner.peers.get(&participant) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!(%participant, "failed to queue signaling frame: {e}");
                    }
                }
                Err(e) => error!("failed to serialize signaling frame: {e}"),
            }
        } else {
            warn!(%participant, "attempted to signal a disconnected participant");
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, participant: ParticipantId, message: SignalMessage) {
        self.send_signal(participant, &message);
    }

    async fn close(&self, participant: ParticipantId) {
        self.remove_peer(participant);
    }
}
