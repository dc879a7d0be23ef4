use crate::session::{Session, SessionCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use semaphore_core::SessionId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub(crate) type SessionTable = Arc<DashMap<SessionId, mpsc::Sender<SessionCommand>>>;

const COMMAND_BUFFER: usize = 100;

/// Process-wide map from session id to its actor's command queue. Sessions
/// spawn lazily on first dispatch and remove themselves when their roster
/// empties, so the map only ever holds live sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: SessionTable,
    output: Arc<dyn SignalingOutput>,
    violation_limit: u32,
}

impl SessionManager {
    pub fn new(output: Arc<dyn SignalingOutput>, violation_limit: u32) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            output,
            violation_limit,
        }
    }

    /// Deliver a command to a session, creating it on demand. A send can
    /// lose a race against the actor's empty-roster shutdown; the stale
    /// entry is pruned and a fresh actor takes the command.
    pub async fn dispatch(&self, session_id: &SessionId, cmd: SessionCommand) {
        let mut cmd = cmd;
        for _ in 0..2 {
            let tx = self.sender_for(session_id);
            match tx.send(cmd).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    cmd = returned;
                    self.sessions
                        .remove_if(session_id, |_, entry| entry.same_channel(&tx));
                }
            }
        }
        warn!(session = %session_id, "failed to deliver command to session");
    }

    pub fn is_active(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn sender_for(&self, session_id: &SessionId) -> mpsc::Sender<SessionCommand> {
        let entry = self.sessions.entry(session_id.clone()).or_insert_with(|| {
            info!(session = %session_id, "creating session");
            let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
            let session = Session::new(
                session_id.clone(),
                self.violation_limit,
                self.output.clone(),
                rx,
                tx.clone(),
                Arc::clone(&self.sessions),
            );
            tokio::spawn(session.run());
            tx
        });
        entry.value().clone()
    }
}
