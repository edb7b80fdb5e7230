//! The authoritative side of an online match.
//!
//! Wraps an [`Authority`] with the peer-to-seat mapping and the acceptance
//! rules for remote intents. Intents from a seat that is not active are
//! expected under network delay and are dropped without a reply.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::message::{Envelope, Message};
use super::snapshot::{Snapshot, Visibility};
use crate::cards::CardId;
use crate::core::{PeerId, SeatId};
use crate::game::{Applied, Move, Phase, Rejection};
use crate::table::Authority;

/// What the host should send back after handling an intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Nothing changed.
    Nothing,
    /// The peer asked for state; resend the current snapshot.
    Resync,
    /// A move was accepted; broadcast the new state.
    Applied(Applied),
}

impl Reply {
    /// Anything to put on the wire.
    #[must_use]
    pub fn publishes(&self) -> bool {
        !matches!(self, Self::Nothing)
    }

    /// A fresh turn started, so the countdown realigns.
    #[must_use]
    pub fn restarts_turn(&self) -> bool {
        matches!(self, Self::Applied(applied) if applied.turn_started)
    }
}

#[derive(Debug)]
pub struct HostReplicator {
    authority: Authority,
    peers: FxHashMap<PeerId, SeatId>,
}

impl HostReplicator {
    /// Remote seats are bound to the peers named in their seat specs.
    #[must_use]
    pub fn new(authority: Authority) -> Self {
        let peers = authority
            .session()
            .players
            .iter()
            .filter_map(|p| p.remote_peer.map(|peer| (peer, p.seat)))
            .collect();
        Self { authority, peers }
    }

    #[must_use]
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    #[must_use]
    pub fn seat_of(&self, peer: PeerId) -> Option<SeatId> {
        self.peers.get(&peer).copied()
    }

    /// Snapshot as shipped to peers.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let config = self.authority.config();
        Snapshot::capture(
            self.authority.session(),
            Visibility::from_redaction(config.redact_hidden),
            config.log_tail,
        )
    }

    /// Unredacted snapshot for the host's own observers.
    #[must_use]
    pub fn full_snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.authority.session(),
            Visibility::Full,
            self.authority.config().log_tail,
        )
    }

    /// Apply an intent received from the network.
    pub fn handle(&mut self, envelope: Envelope) -> Reply {
        let Some(seat) = self.seat_of(envelope.sender) else {
            debug!(sender = %envelope.sender, "Dropping message from unknown peer");
            return Reply::Nothing;
        };
        let session = self.authority.session();

        let mv = match envelope.message {
            Message::RequestSync => return Reply::Resync,
            Message::SyncState(_) => {
                debug!(%seat, "Peer sent a snapshot, ignoring");
                return Reply::Nothing;
            }
            Message::Play(_) | Message::PickUp
                if session.phase != Phase::Playing || session.turn != seat =>
            {
                debug!(%seat, turn = %session.turn, "Dropping stale intent");
                return Reply::Nothing;
            }
            Message::Play(play) => Move::Play(play),
            Message::PickUp => Move::PickUp,
            Message::SetupConfirm {
                face_up_cards,
                hand,
            } => {
                let face_up: Vec<CardId> = face_up_cards.iter().map(|c| c.id).collect();
                let kept: Vec<CardId> = hand.iter().map(|c| c.id).collect();
                if !self.partitions_hand(seat, &face_up, &kept) {
                    debug!(%seat, "Setup does not match the dealt hand, dropping");
                    return Reply::Nothing;
                }
                Move::ConfirmSetup { face_up }
            }
        };

        match self.authority.apply(seat, mv) {
            Ok(applied) => Reply::Applied(applied),
            Err(reason) => {
                debug!(%seat, %reason, "Remote intent rejected");
                Reply::Nothing
            }
        }
    }

    /// `face_up` and `kept` together are exactly the seat's current hand.
    fn partitions_hand(&self, seat: SeatId, face_up: &[CardId], kept: &[CardId]) -> bool {
        let Some(player) = self.authority.session().player(seat) else {
            return false;
        };
        let claimed: FxHashSet<CardId> = face_up.iter().chain(kept).copied().collect();
        let actual: FxHashSet<CardId> = player.hand.iter().map(|c| c.id).collect();
        claimed.len() == face_up.len() + kept.len() && claimed == actual
    }

    /// A move from the host's own seat.
    pub fn apply_local(&mut self, seat: SeatId, mv: Move) -> Result<Applied, Rejection> {
        self.authority.apply(seat, mv)
    }

    /// Advance the turn countdown.
    pub fn tick(&mut self, units: u32) -> Reply {
        Self::reply(self.authority.tick(units))
    }

    #[must_use]
    pub fn pending_bot(&self) -> Option<SeatId> {
        self.authority.pending_bot()
    }

    pub fn bot_delay(&mut self) -> std::time::Duration {
        self.authority.bot_delay()
    }

    /// Let the pending bot move.
    pub fn bot_step(&mut self) -> Reply {
        Self::reply(self.authority.bot_step())
    }

    fn reply(outcome: Option<Result<Applied, Rejection>>) -> Reply {
        match outcome {
            Some(Ok(applied)) => Reply::Applied(applied),
            Some(Err(_)) | None => Reply::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TableConfig;
    use crate::game::{PlayRequest, SeatSpec};

    fn host() -> (HostReplicator, PeerId) {
        let peer = PeerId::random();
        let config = TableConfig::default().with_seed(17);
        let authority = Authority::new(
            config,
            vec![SeatSpec::human("Ada"), SeatSpec::remote("Grace", peer)],
        );
        (HostReplicator::new(authority), peer)
    }

    fn confirm(host: &HostReplicator, seat: usize) -> Message {
        let hand = host.authority().session().players[seat].hand.clone();
        Message::SetupConfirm {
            face_up_cards: hand[..3].to_vec(),
            hand: hand[3..].to_vec(),
        }
    }

    fn start(host: &mut HostReplicator, peer: PeerId) {
        let hand = &host.authority().session().players[0].hand;
        let ids = hand[..3].iter().map(|c| c.id).collect();
        host.apply_local(SeatId::new(0), Move::ConfirmSetup { face_up: ids })
            .unwrap();
        let msg = confirm(host, 1);
        let reply = host.handle(Envelope::new(peer, msg));
        assert!(reply.restarts_turn());
        assert_eq!(host.authority().session().phase, Phase::Playing);
    }

    #[test]
    fn test_request_sync_always_answered() {
        let (mut host, peer) = host();
        let reply = host.handle(Envelope::new(peer, Message::RequestSync));
        assert_eq!(reply, Reply::Resync);
        assert!(reply.publishes());
        assert!(!reply.restarts_turn());
    }

    #[test]
    fn test_request_sync_leaves_countdown_running() {
        let config = TableConfig::default().with_seed(17).with_turn_timeout(3);
        let peer = PeerId::random();
        let authority = Authority::new(
            config,
            vec![SeatSpec::human("Ada"), SeatSpec::remote("Grace", peer)],
        );
        let mut host = HostReplicator::new(authority);
        start(&mut host, peer);

        assert_eq!(host.tick(1), Reply::Nothing);
        assert_eq!(host.handle(Envelope::new(peer, Message::RequestSync)), Reply::Resync);
        assert_eq!(host.tick(1), Reply::Nothing);
        assert_eq!(host.handle(Envelope::new(peer, Message::RequestSync)), Reply::Resync);

        let reply = host.tick(1);
        assert!(reply.restarts_turn());
        assert_eq!(host.authority().session().turn, SeatId::new(1));
    }

    #[test]
    fn test_unknown_sender_ignored() {
        let (mut host, _) = host();
        let stranger = PeerId::random();
        assert_eq!(
            host.handle(Envelope::new(stranger, Message::RequestSync)),
            Reply::Nothing
        );
    }

    #[test]
    fn test_setup_must_partition_hand() {
        let (mut host, peer) = host();
        let hand = host.authority().session().players[1].hand.clone();

        let short = Message::SetupConfirm {
            face_up_cards: hand[..3].to_vec(),
            hand: hand[3..5].to_vec(),
        };
        assert_eq!(host.handle(Envelope::new(peer, short)), Reply::Nothing);
        assert!(!host.authority().session().players[1].ready);

        let msg = confirm(&host, 1);
        assert!(host.handle(Envelope::new(peer, msg)).publishes());
        assert!(host.authority().session().players[1].ready);
    }

    #[test]
    fn test_intent_from_inactive_seat_is_dropped() {
        let (mut host, peer) = host();
        start(&mut host, peer);
        let before = host.authority().session().clone();

        // Seat 0 is active; the peer is seat 1.
        assert_eq!(host.handle(Envelope::new(peer, Message::PickUp)), Reply::Nothing);
        let card = before.players[1].hand[0];
        let play = Message::Play(PlayRequest::Hand { cards: vec![card] });
        assert_eq!(host.handle(Envelope::new(peer, play)), Reply::Nothing);

        let after = host.authority().session();
        assert_eq!(after.players, before.players);
        assert_eq!(after.log.len(), before.log.len());
    }

    #[test]
    fn test_active_peer_intent_applies() {
        let (mut host, peer) = host();
        start(&mut host, peer);
        host.apply_local(SeatId::new(0), Move::PickUp).unwrap();

        let reply = host.handle(Envelope::new(peer, Message::PickUp));
        assert!(matches!(reply, Reply::Applied(a) if a.seat == SeatId::new(1)));
        assert_eq!(host.authority().session().turn, SeatId::new(0));
    }

    #[test]
    fn test_snapshot_respects_redaction() {
        let (host, _) = host();
        assert!(host.snapshot().players.iter().all(|p| p.hidden.is_none()));
        assert!(host.full_snapshot().players.iter().all(|p| p.hidden.is_some()));
    }
}
