use crate::error::SignalingError;
use crate::session::{SessionCommand, SessionManager};
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use semaphore_core::{ParticipantId, SessionId, SignalMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct AppState {
    pub signaling: SignalingService,
    pub sessions: SessionManager,
    pub idle_timeout: Duration,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let session = SessionId::from(session);

    ws.on_upgrade(move |socket| handle_socket(socket, session, state))
}

async fn handle_socket(socket: WebSocket, session: SessionId, state: Arc<AppState>) {
    // Identity is bound to the channel: one server-assigned id per
    // connection, echoed back in the welcome frame after a join.
    let participant = ParticipantId::new();
    info!(%participant, %session, "new signaling channel");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(participant, tx);
    state.signaling.send_signal(
        participant,
        &SignalMessage::IceConfig {
            ice_servers: state.signaling.ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let session = session.clone();

        async move {
            let mut fault = false;
            loop {
                let frame = match tokio::time::timeout(state.idle_timeout, receiver.next()).await {
                    Err(_) => {
                        warn!(%participant, "channel idle past the configured limit, treating as disconnected");
                        fault = true;
                        break;
                    }
                    // Clean end of stream is not an error.
                    Ok(None) => break,
                    Ok(Some(Err(e))) => {
                        let err = SignalingError::ChannelFault {
                            participant,
                            reason: e.to_string(),
                        };
                        error!(%session, "{err}");
                        fault = true;
                        break;
                    }
                    Ok(Some(Ok(frame))) => frame,
                };

                match frame {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(SignalMessage::Join { name }) => {
                            state
                                .sessions
                                .dispatch(&session, SessionCommand::Join { participant, name })
                                .await;
                        }
                        Ok(
                            message @ (SignalMessage::Offer { .. }
                            | SignalMessage::Answer { .. }
                            | SignalMessage::Candidate { .. }
                            | SignalMessage::Leave { .. }),
                        ) => {
                            state
                                .sessions
                                .dispatch(
                                    &session,
                                    SessionCommand::Signal {
                                        sender: participant,
                                        message,
                                    },
                                )
                                .await;
                        }
                        Ok(SignalMessage::Unknown) => {
                            debug!(%participant, "ignoring frame with unknown type");
                        }
                        Ok(other) => {
                            debug!(%participant, ?other, "ignoring server-only frame from client");
                        }
                        Err(e) => warn!(%participant, "invalid signaling frame: {e}"),
                    },
                    Message::Close(_) => break,
                    // Ping/pong and binary frames still count as liveness.
                    _ => {}
                }
            }
            fault
        }
    });

    let fault = tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            false
        }
        res = (&mut recv_task) => {
            send_task.abort();
            res.unwrap_or(false)
        }
    };

    state.signaling.remove_peer(participant);
    state
        .sessions
        .dispatch(&session, SessionCommand::Disconnect { participant, fault })
        .await;
    info!(%participant, %session, "signaling channel closed");
}
