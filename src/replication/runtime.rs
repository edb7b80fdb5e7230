//! Async drivers for the host and the peer.
//!
//! The host task owns the [`HostReplicator`] outright: link frames, timer
//! ticks, bot deadlines and local UI commands are all handled one at a time
//! in a single `select!` loop, so mutations can never interleave. The peer
//! task only moves frames; its [`PeerReplica`] lives in the [`PeerHandle`].

use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::error::ReplicationError;
use super::host::{HostReplicator, Reply};
use super::message::{Envelope, Message};
use super::peer::PeerReplica;
use super::snapshot::Snapshot;
use crate::cards::CardId;
use crate::core::{PeerId, SeatId};
use crate::game::{Applied, Move, PlayRequest, Rejection};
use crate::scheduler::TurnClock;
use crate::transport::Transport;

/// How a replicated session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    /// This side left on purpose.
    Closed,
    /// The other side went away, or the link failed.
    ConnectionLost,
}

// =============================================================================
// Host
// =============================================================================

#[derive(Debug)]
enum HostCommand {
    Apply {
        seat: SeatId,
        mv: Move,
        reply: oneshot::Sender<Result<Applied, Rejection>>,
    },
    Shutdown,
}

/// Control handle for a running host task.
#[derive(Debug)]
pub struct HostHandle {
    commands: mpsc::UnboundedSender<HostCommand>,
    state: watch::Receiver<Snapshot>,
    task: JoinHandle<LinkEvent>,
}

impl HostHandle {
    /// Apply a move for a seat played on the host device.
    pub async fn submit(&self, seat: SeatId, mv: Move) -> Result<Applied, ReplicationError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(HostCommand::Apply { seat, mv, reply })
            .map_err(|_| ReplicationError::ConnectionLost)?;
        let applied = answer.await.map_err(|_| ReplicationError::ConnectionLost)??;
        Ok(applied)
    }

    /// Latest authoritative state, unredacted.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    /// Tear the link down and stop the task.
    pub async fn shutdown(self) -> LinkEvent {
        let _ = self.commands.send(HostCommand::Shutdown);
        self.finished().await
    }

    /// Wait for the task to end on its own.
    pub async fn finished(self) -> LinkEvent {
        self.task.await.unwrap_or(LinkEvent::ConnectionLost)
    }
}

/// Spawn the host loop on the current runtime. An initial snapshot is
/// broadcast before anything else.
pub fn spawn_host<T>(host_id: PeerId, replicator: HostReplicator, link: T) -> HostHandle
where
    T: Transport + 'static,
{
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(replicator.full_snapshot());
    let task = tokio::spawn(run_host(host_id, replicator, link, command_rx, state_tx));
    HostHandle {
        commands,
        state,
        task,
    }
}

/// Update local observers, then ship the peer's view over the link.
async fn publish<T: Transport>(
    replicator: &HostReplicator,
    link: &mut T,
    state: &watch::Sender<Snapshot>,
    host_id: PeerId,
) -> Result<(), ReplicationError> {
    state.send_replace(replicator.full_snapshot());
    let frame =
        Envelope::new(host_id, Message::SyncState(Box::new(replicator.snapshot()))).encode()?;
    link.send(frame).await?;
    Ok(())
}

async fn run_host<T: Transport>(
    host_id: PeerId,
    mut replicator: HostReplicator,
    mut link: T,
    mut commands: mpsc::UnboundedReceiver<HostCommand>,
    state: watch::Sender<Snapshot>,
) -> LinkEvent {
    let mut clock = TurnClock::new(replicator.authority().config().unit);
    let mut bot_at: Option<Instant> = None;

    if publish(&replicator, &mut link, &state, host_id).await.is_err() {
        return LinkEvent::ConnectionLost;
    }

    loop {
        if bot_at.is_none() && replicator.pending_bot().is_some() {
            bot_at = Some(Instant::now() + replicator.bot_delay());
        }
        let bot_due = async move {
            match bot_at {
                Some(at) => time::sleep_until(at).await,
                None => future::pending::<()>().await,
            }
        };

        let reply = tokio::select! {
            frame = link.recv() => {
                let Some(frame) = frame else {
                    warn!("Peer link closed");
                    return LinkEvent::ConnectionLost;
                };
                match Envelope::decode(&frame) {
                    Ok(envelope) => replicator.handle(envelope),
                    Err(e) => {
                        debug!(error = %e, "Dropping malformed frame");
                        Reply::Nothing
                    }
                }
            }
            _ = clock.tick() => replicator.tick(1),
            _ = bot_due => {
                bot_at = None;
                replicator.bot_step()
            }
            command = commands.recv() => match command {
                Some(HostCommand::Apply { seat, mv, reply }) => {
                    let result = replicator.apply_local(seat, mv);
                    let outcome = result.as_ref().map_or(Reply::Nothing, |a| Reply::Applied(*a));
                    let _ = reply.send(result);
                    outcome
                }
                Some(HostCommand::Shutdown) | None => {
                    info!("Host leaving, closing link");
                    link.close();
                    return LinkEvent::Closed;
                }
            },
        };

        // Sync requests resend state but never buy the active seat more time.
        if reply.restarts_turn() {
            clock.reset();
        }
        if reply.publishes() {
            if let Err(e) = publish(&replicator, &mut link, &state, host_id).await {
                warn!(error = %e, "Broadcast failed, ending session");
                return LinkEvent::ConnectionLost;
            }
        }
    }
}

// =============================================================================
// Peer
// =============================================================================

/// Control handle for a running peer task, holding the local replica.
#[derive(Debug)]
pub struct PeerHandle {
    replica: PeerReplica,
    outbox: mpsc::UnboundedSender<Option<Message>>,
    state: watch::Receiver<Option<Snapshot>>,
    task: JoinHandle<LinkEvent>,
}

impl PeerHandle {
    /// Copy the newest published snapshot into the replica and mark it seen.
    fn take_latest(&mut self) {
        let latest = self.state.borrow_and_update().clone();
        if let Some(snapshot) = latest {
            self.replica.replace(snapshot);
        }
    }

    /// The replica, brought up to date with the latest snapshot.
    pub fn replica(&mut self) -> &PeerReplica {
        // A closed channel still holds the final snapshot.
        if !matches!(self.state.has_changed(), Ok(false)) {
            self.take_latest();
        }
        &self.replica
    }

    /// Wait for the next snapshot.
    pub async fn changed(&mut self) -> Result<&PeerReplica, ReplicationError> {
        self.state
            .changed()
            .await
            .map_err(|_| ReplicationError::ConnectionLost)?;
        // `changed` already marked the value seen; apply it unconditionally.
        self.take_latest();
        Ok(&self.replica)
    }

    /// Wait until a snapshot satisfies `done`.
    pub async fn wait_for(
        &mut self,
        done: impl Fn(&Snapshot) -> bool,
    ) -> Result<Snapshot, ReplicationError> {
        loop {
            if let Some(snapshot) = self.replica().snapshot() {
                if done(snapshot) {
                    return Ok(snapshot.clone());
                }
            }
            self.changed().await?;
        }
    }

    fn send(&self, message: Message) -> Result<(), ReplicationError> {
        self.outbox
            .send(Some(message))
            .map_err(|_| ReplicationError::ConnectionLost)
    }

    /// Send an intent without checking it locally first.
    pub fn send_unchecked(&self, message: Message) -> Result<(), ReplicationError> {
        self.send(message)
    }

    pub fn play(&mut self, play: PlayRequest) -> Result<(), ReplicationError> {
        let message = self.replica().play_intent(play)?;
        self.send(message)
    }

    pub fn pick_up(&mut self) -> Result<(), ReplicationError> {
        let message = self.replica().pickup_intent()?;
        self.send(message)
    }

    pub fn confirm_setup(
        &mut self,
        face_up: &[CardId],
        stronghold_size: usize,
    ) -> Result<(), ReplicationError> {
        let message = self.replica().setup_intent(face_up, stronghold_size)?;
        self.send(message)
    }

    pub fn request_sync(&self) -> Result<(), ReplicationError> {
        self.send(Message::RequestSync)
    }

    /// Tear the link down and stop the task.
    pub async fn leave(self) -> LinkEvent {
        let _ = self.outbox.send(None);
        self.finished().await
    }

    /// Wait for the task to end on its own.
    pub async fn finished(self) -> LinkEvent {
        self.task.await.unwrap_or(LinkEvent::ConnectionLost)
    }
}

/// Spawn the peer loop. Until the first snapshot arrives the peer sends
/// `REQUEST_SYNC` every `poll_interval`.
pub fn spawn_peer<T>(peer_id: PeerId, link: T, poll_interval: Duration) -> PeerHandle
where
    T: Transport + 'static,
{
    let (outbox, outbox_rx) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(None);
    let task = tokio::spawn(run_peer(peer_id, link, outbox_rx, state_tx, poll_interval));
    PeerHandle {
        replica: PeerReplica::new(peer_id),
        outbox,
        state,
        task,
    }
}

async fn run_peer<T: Transport>(
    peer_id: PeerId,
    mut link: T,
    mut outbox: mpsc::UnboundedReceiver<Option<Message>>,
    state: watch::Sender<Option<Snapshot>>,
    poll_interval: Duration,
) -> LinkEvent {
    let mut poll = time::interval(poll_interval.max(Duration::from_millis(1)));
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut synced = false;

    loop {
        let outgoing = tokio::select! {
            _ = poll.tick(), if !synced => {
                debug!("Polling host for state");
                Message::RequestSync
            }
            frame = link.recv() => {
                let Some(frame) = frame else {
                    warn!("Host link closed");
                    return LinkEvent::ConnectionLost;
                };
                match Envelope::decode(&frame) {
                    Ok(Envelope { message: Message::SyncState(snapshot), .. }) => {
                        synced = true;
                        state.send_replace(Some(*snapshot));
                    }
                    Ok(other) => debug!(kind = ?other.message, "Ignoring non-state message"),
                    Err(e) => debug!(error = %e, "Dropping malformed frame"),
                }
                continue;
            }
            message = outbox.recv() => match message {
                Some(Some(message)) => message,
                Some(None) | None => {
                    info!("Leaving session, closing link");
                    link.close();
                    return LinkEvent::Closed;
                }
            },
        };

        let sent = match Envelope::new(peer_id, outgoing).encode() {
            Ok(frame) => link.send(frame).await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            warn!(error = %e, "Send failed, ending session");
            return LinkEvent::ConnectionLost;
        }
    }
}
