use crate::error::SignalingError;
use crate::relay::RelayEngine;
use crate::session::session_manager::SessionTable;
use crate::session::{Roster, SessionCommand, SessionSnapshot};
use crate::signaling::SignalingOutput;
use semaphore_core::{ParticipantId, PeerInfo, SessionId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The actor for one session. Owns the roster and the negotiation links;
/// consuming one command at a time is what serializes every mutation and
/// keeps check-then-forward atomic.
pub struct Session {
    id: SessionId,
    roster: Roster,
    relay: RelayEngine,
    output: Arc<dyn SignalingOutput>,
    command_rx: mpsc::Receiver<SessionCommand>,
    /// Kept so the queue only closes when the actor itself decides to exit.
    command_tx: mpsc::Sender<SessionCommand>,
    registry: SessionTable,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        violation_limit: u32,
        output: Arc<dyn SignalingOutput>,
        command_rx: mpsc::Receiver<SessionCommand>,
        command_tx: mpsc::Sender<SessionCommand>,
        registry: SessionTable,
    ) -> Self {
        Self {
            id,
            roster: Roster::new(),
            relay: RelayEngine::new(violation_limit),
            output,
            command_rx,
            command_tx,
            registry,
        }
    }

    pub async fn run(mut self) {
        info!(session = %self.id, "session started");

        'run: loop {
            let Some(cmd) = self.command_rx.recv().await else {
                break;
            };
            self.handle_command(cmd).await;

            // The last participant leaving destroys the session. Deregister
            // first so new joins spawn a fresh actor, then drain anything
            // already queued; a drained command re-registers this actor
            // instead of being lost.
            while self.roster.is_empty() {
                self.registry.remove(&self.id);
                match self.command_rx.try_recv() {
                    Ok(queued) => {
                        self.registry
                            .insert(self.id.clone(), self.command_tx.clone());
                        self.handle_command(queued).await;
                    }
                    Err(_) => break 'run,
                }
            }
        }

        info!(session = %self.id, "session destroyed");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join { participant, name } => {
                self.handle_join(participant, name).await;
            }
            SessionCommand::Signal { sender, message } => {
                self.handle_signal(sender, message).await;
            }
            SessionCommand::Disconnect { participant, fault } => {
                self.handle_disconnect(participant, fault).await;
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(SessionSnapshot {
                    participants: self.roster.members().to_vec(),
                    links: self.relay.link_snapshots(),
                });
            }
        }
    }

    async fn handle_join(&mut self, participant: ParticipantId, name: String) {
        let name = name.trim().to_string();
        if name.is_empty() {
            let err = SignalingError::InvalidJoin;
            warn!(session = %self.id, %participant, "{err}");
            // Retryable: the channel stays open.
            self.output.send(participant, err.to_frame()).await;
            return;
        }

        if !self.roster.insert(PeerInfo {
            id: participant,
            name: name.clone(),
        }) {
            let err = SignalingError::DuplicateParticipant {
                participant,
                session: self.id.clone(),
            };
            warn!(session = %self.id, "{err}");
            self.output.send(participant, err.to_frame()).await;
            // Closing forces a re-join on a fresh channel.
            self.output.close(participant).await;
            return;
        }

        let others = self.roster.others(participant);
        info!(
            session = %self.id,
            %participant,
            name = %name,
            members = self.roster.len(),
            "participant joined"
        );

        self.output
            .send(
                participant,
                SignalMessage::Welcome {
                    participant_id: participant,
                    peers: others.clone(),
                },
            )
            .await;

        // Mesh bootstrap: the earlier joiner of each pair originates that
        // pair's offer, so every existing member is told to call the
        // newcomer. The newcomer only ever answers.
        for peer in others {
            self.relay.bootstrap_link(peer.id, participant);
            self.output
                .send(
                    peer.id,
                    SignalMessage::PeerJoined {
                        participant_id: participant,
                        name: name.clone(),
                    },
                )
                .await;
        }
    }

    async fn handle_signal(&mut self, sender: ParticipantId, message: SignalMessage) {
        if let SignalMessage::Leave { .. } = message {
            self.handle_disconnect(sender, false).await;
            return;
        }

        if !self.roster.contains(sender) {
            warn!(session = %self.id, %sender, "dropping signal from a non-member");
            return;
        }

        match self
            .relay
            .relay(&self.roster, sender, message, &self.output)
            .await
        {
            Ok(()) => {}
            Err(err @ SignalingError::UnknownTarget { .. }) => {
                // Non-fatal: logged and dropped.
                warn!(session = %self.id, %sender, "{err}");
            }
            Err(err @ SignalingError::ProtocolViolation(_)) => {
                warn!(session = %self.id, %sender, "{err}");
                if self.relay.record_violation(sender) {
                    warn!(
                        session = %self.id,
                        %sender,
                        "violation threshold exceeded, closing channel"
                    );
                    self.output.close(sender).await;
                    self.handle_disconnect(sender, false).await;
                }
            }
            Err(err) => warn!(session = %self.id, %sender, "{err}"),
        }
    }

    async fn handle_disconnect(&mut self, participant: ParticipantId, fault: bool) {
        // Unregistering an absent participant is a no-op, which also makes
        // the duplicate cleanup paths (explicit leave + channel teardown)
        // converge.
        if !self.roster.remove(participant) {
            return;
        }

        self.relay.fail_links_of(participant);

        if fault {
            error!(session = %self.id, %participant, "removing participant after channel fault");
        } else {
            info!(session = %self.id, %participant, "participant left");
        }

        self.output.close(participant).await;

        for peer in self.roster.members() {
            self.output
                .send(
                    peer.id,
                    SignalMessage::Leave {
                        from: Some(participant),
                    },
                )
                .await;
        }
    }
}
