
use std::sync::Arc;
use std::time::{Duration, Instant};

use semaphore_core::{LinkState, ParticipantId, SessionId, SignalMessage};
use semaphore_server::{SessionCommand, SessionManager, SessionSnapshot};
use tokio::sync::oneshot;
use tracing::Level;

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_stack() -> (SessionManager, Arc<MockSignalingOutput>) {
    create_test_stack_with_limit(5)
}

pub fn create_test_stack_with_limit(
    violation_limit: u32,
) -> (SessionManager, Arc<MockSignalingOutput>) {
    let output = Arc::new(MockSignalingOutput::new());
    let manager = SessionManager::new(output.clone(), violation_limit);
    (manager, output)
}

/// Join a fresh participant and wait for its welcome frame.
pub async fn join(
    manager: &SessionManager,
    session: &SessionId,
    output: &MockSignalingOutput,
    name: &str,
) -> anyhow::Result<ParticipantId> {
    let participant = ParticipantId::new();
    manager
        .dispatch(
            session,
            SessionCommand::Join {
                participant,
                name: name.to_string(),
            },
        )
        .await;
    output
        .wait_for(
            participant,
            |m| matches!(m, SignalMessage::Welcome { .. }),
            1000,
        )
        .await?;
    Ok(participant)
}

/// Request/reply view of a session's roster and links. Because the reply is
/// queued behind everything dispatched before it, this doubles as an
/// ordering barrier in tests.
pub async fn snapshot(manager: &SessionManager, session: &SessionId) -> SessionSnapshot {
    let (tx, rx) = oneshot::channel();
    manager
        .dispatch(session, SessionCommand::Snapshot { reply: tx })
        .await;
    rx.await.expect("session actor dropped the snapshot request")
}

pub fn link_between(
    snap: &SessionSnapshot,
    a: ParticipantId,
    b: ParticipantId,
) -> Option<LinkState> {
    snap.links
        .iter()
        .find(|l| {
            (l.initiator == a && l.responder == b) || (l.initiator == b && l.responder == a)
        })
        .map(|l| l.state)
}

pub async fn wait_for_session_gone(
    manager: &SessionManager,
    session: &SessionId,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    let start = Instant::now();
    while manager.is_active(session) {
        if start.elapsed() > Duration::from_millis(timeout_ms) {
            anyhow::bail!("session {session} is still active");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}
