//! The non-authoritative mirror.
//!
//! A replica holds the latest snapshot and nothing else. It never applies a
//! move locally: it validates its own outgoing intents for a quick denial and
//! otherwise waits for the host to broadcast the result.

use tracing::debug;

use super::error::ReplicationError;
use super::message::Message;
use super::snapshot::{SeatView, Snapshot};
use crate::cards::{Card, CardId};
use crate::core::PeerId;
use crate::game::{check_play, Phase, PlayRequest, Rejection};
use crate::rules::{legal_groups, Group, Zone};

#[derive(Clone, Debug)]
pub struct PeerReplica {
    peer_id: PeerId,
    snapshot: Option<Snapshot>,
    received: u64,
}

impl PeerReplica {
    #[must_use]
    pub fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            snapshot: None,
            received: 0,
        }
    }

    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Replace local state wholesale.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.received += 1;
        debug!(
            turn = %snapshot.turn_index,
            phase = ?snapshot.phase,
            received = self.received,
            "Replaced replica state"
        );
        self.snapshot = Some(snapshot);
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn has_state(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Snapshots applied so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received
    }

    /// This peer's seat in the latest snapshot.
    #[must_use]
    pub fn my_seat(&self) -> Option<&SeatView> {
        self.snapshot.as_ref()?.seat_of(self.peer_id)
    }

    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        match (&self.snapshot, self.my_seat()) {
            (Some(snap), Some(me)) => snap.phase == Phase::Playing && snap.turn_index == me.seat,
            _ => false,
        }
    }

    /// Legal groups from this peer's playable zone, for hints.
    #[must_use]
    pub fn legal_groups(&self) -> Vec<Group> {
        let (Some(snap), Some(me)) = (&self.snapshot, self.my_seat()) else {
            return Vec::new();
        };
        let zone = if !me.hand.is_empty() {
            &me.hand
        } else {
            &me.face_up
        };
        legal_groups(zone, snap.top_of_pile(), snap.constraint)
    }

    fn seated(&self) -> Result<(&Snapshot, &SeatView), ReplicationError> {
        let snap = self.snapshot.as_ref().ok_or(ReplicationError::NotSynced)?;
        let me = snap.seat_of(self.peer_id).ok_or(ReplicationError::NotSeated)?;
        Ok((snap, me))
    }

    fn active_seat(&self) -> Result<(&Snapshot, &SeatView), ReplicationError> {
        let (snap, me) = self.seated()?;
        match snap.phase {
            Phase::Playing => {}
            Phase::GameOver => return Err(Rejection::GameOver.into()),
            phase => return Err(Rejection::WrongPhase { phase }.into()),
        }
        if snap.turn_index != me.seat {
            return Err(Rejection::NotYourTurn {
                seat: me.seat,
                turn: snap.turn_index,
            }
            .into());
        }
        Ok((snap, me))
    }

    /// Build a `PLAY` intent, or the reason the host would refuse it.
    pub fn play_intent(&self, play: PlayRequest) -> Result<Message, ReplicationError> {
        let (snap, me) = self.active_seat()?;
        check_play(
            &me.hand,
            &me.face_up,
            me.hidden_count,
            &play,
            snap.top_of_pile().map(|c| c.rank),
            snap.constraint,
        )?;
        Ok(Message::Play(play))
    }

    /// Build a `PICK_UP` intent.
    pub fn pickup_intent(&self) -> Result<Message, ReplicationError> {
        self.active_seat()?;
        Ok(Message::PickUp)
    }

    /// Build a `SETUP_CONFIRM` intent splitting the hand into stronghold and hand.
    pub fn setup_intent(
        &self,
        face_up: &[CardId],
        stronghold_size: usize,
    ) -> Result<Message, ReplicationError> {
        let (snap, me) = self.seated()?;
        if snap.phase != Phase::Setup {
            return Err(Rejection::WrongPhase { phase: snap.phase }.into());
        }
        if me.ready {
            return Err(Rejection::AlreadyReady { seat: me.seat }.into());
        }
        if face_up.len() != stronghold_size {
            return Err(Rejection::InvalidSetup {
                expected: stronghold_size,
                got: face_up.len(),
            }
            .into());
        }

        let (chosen, kept): (Vec<Card>, Vec<Card>) =
            me.hand.iter().partition(|c| face_up.contains(&c.id));
        if chosen.len() != face_up.len() {
            return Err(Rejection::CardsNotInZone { zone: Zone::Hand }.into());
        }
        Ok(Message::SetupConfirm {
            face_up_cards: chosen,
            hand: kept,
        })
    }
}
