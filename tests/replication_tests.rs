//! Host/peer replication over in-process links.

mod common;

use std::time::Duration;

use tokio::time::{self, timeout};

use common::seat;
use stronghold::bot::{best_group, stronghold_picks};
use stronghold::game::GameEvent;
use stronghold::replication::{Board, Envelope, HostHandle, PeerHandle, SeatView};
use stronghold::rules::playable_zone;
use stronghold::transport::RegistrationRequest;
use stronghold::{
    legal_groups, spawn_host, spawn_peer, Authority, GameRng, GameSession, HostReplicator,
    LinkEvent, LocalRelay, MemoryLink, Message, Move, PeerId, Phase, PlayRequest, Rejection,
    ReplicationError, SeatSpec, Session, Snapshot, TableConfig, Transport, Zone,
};

const POLL: Duration = Duration::from_millis(10);
const DEADLINE: Duration = Duration::from_secs(30);

fn config() -> TableConfig {
    TableConfig::default()
        .with_seed(31)
        .with_unit(Duration::from_secs(60))
        .with_bot_delay(Duration::ZERO, Duration::ZERO)
}

fn last_seq(snapshot: &Snapshot) -> u64 {
    snapshot.log_tail.last().map_or(0, |e| e.seq)
}

/// Start a host for `[seat 0 = local, seat 1 = remote]` and a peer for seat 1.
fn start(config: TableConfig, local: SeatSpec) -> (HostHandle, PeerHandle) {
    let (host_link, peer_link) = MemoryLink::pair();
    let host_id = PeerId::random();
    let peer_id = PeerId::random();
    let authority = Authority::new(config, vec![local, SeatSpec::remote("Grace", peer_id)]);
    let host = spawn_host(host_id, HostReplicator::new(authority), host_link);
    let peer = spawn_peer(peer_id, peer_link, POLL);
    (host, peer)
}

/// Greedy choice from the seat's point of view: the best legal group, a blind
/// flip of slot 0, or a pickup.
fn choose(snapshot: &Snapshot, view: &SeatView) -> Option<PlayRequest> {
    let zone = playable_zone(view.hand.len(), view.face_up.len(), view.hidden_count)?;
    if zone == Zone::Hidden {
        return Some(PlayRequest::Hidden { slot: 0 });
    }
    let cards = if zone == Zone::Hand { &view.hand } else { &view.face_up };
    let group = best_group(legal_groups(cards, snapshot.top_of_pile(), snapshot.constraint))?;
    PlayRequest::visible(zone, group.cards.to_vec())
}

async fn setup_both(host: &HostHandle, peer: &mut PeerHandle) {
    let snap = peer.wait_for(|_| true).await.unwrap();
    let picks = stronghold_picks(&snap.players[1].hand, 3);
    peer.confirm_setup(&picks, 3).unwrap();

    let hand = host.state().borrow().players[0].hand.clone();
    host.submit(seat(0), Move::ConfirmSetup { face_up: stronghold_picks(&hand, 3) })
        .await
        .unwrap();
    peer.wait_for(|s| s.phase == Phase::Playing).await.unwrap();
}

/// A whole match between the host's seat and a remote seat. After every
/// accepted move the peer converges to the host's board, byte for byte.
#[tokio::test]
async fn test_online_game_converges() {
    common::init_logging();
    let relay = LocalRelay::new();
    let (host_session, peer_session) = tokio::join!(
        Session::establish(&relay, RegistrationRequest::create("birch", "Ada")),
        Session::establish(&relay, RegistrationRequest::join("birch", "Grace")),
    );
    let (host_session, peer_session) = (host_session.unwrap(), peer_session.unwrap());

    let authority = Authority::new(
        config().with_redact_hidden(false),
        vec![
            SeatSpec::human("Ada"),
            SeatSpec::remote(host_session.remote_name(), host_session.remote_id()),
        ],
    );
    let host = spawn_host(
        host_session.peer_id(),
        HostReplicator::new(authority),
        host_session.into_link(),
    );
    let mut peer = spawn_peer(peer_session.peer_id(), peer_session.into_link(), POLL);

    let game = async {
        setup_both(&host, &mut peer).await;
        let mut state = host.state();

        for _ in 0..2_000 {
            let snap = state.borrow_and_update().clone();
            if snap.phase == Phase::GameOver {
                break;
            }

            let synced = peer.wait_for(|s| last_seq(s) == last_seq(&snap)).await.unwrap();
            assert_eq!(
                Board::of_snapshot(&synced).to_bytes().unwrap(),
                Board::of_snapshot(&snap).to_bytes().unwrap()
            );

            let turn = snap.turn_index;
            let view = &snap.players[turn.index()];
            if turn == seat(0) {
                let mv = choose(&snap, view).map_or(Move::PickUp, Move::Play);
                host.submit(turn, mv).await.unwrap();
            } else {
                match choose(&snap, view) {
                    Some(play) => peer.play(play).unwrap(),
                    None => peer.pick_up().unwrap(),
                }
            }

            let seen = last_seq(&snap);
            state.wait_for(|s| last_seq(s) > seen).await.unwrap();
        }

        let last = state.borrow().clone();
        let synced = peer.wait_for(|s| last_seq(s) == last_seq(&last)).await.unwrap();
        assert_eq!(synced, last);
        assert_eq!(synced.total_cards(), 52);
    };
    timeout(DEADLINE, game).await.expect("game did not finish in time");

    assert_eq!(host.shutdown().await, LinkEvent::Closed);
    assert_eq!(peer.finished().await, LinkEvent::ConnectionLost);
}

#[tokio::test]
async fn test_peer_sees_redacted_hidden_zones() {
    let (host, mut peer) = start(config(), SeatSpec::human("Ada"));

    let snap = timeout(DEADLINE, peer.wait_for(|_| true)).await.unwrap().unwrap();
    assert!(snap.players.iter().all(|p| p.hidden.is_none() && p.hidden_count == 3));
    assert!(host.state().borrow().players.iter().all(|p| p.hidden.is_some()));
    assert_eq!(snap.deck_count, 52 - 18);
    assert_eq!(snap.total_cards(), 52);

    assert_eq!(peer.leave().await, LinkEvent::Closed);
    assert_eq!(host.finished().await, LinkEvent::ConnectionLost);
}

/// An intent from the inactive seat is dropped; the next snapshot is unchanged.
#[tokio::test]
async fn test_stale_intent_ignored() {
    let (host, mut peer) = start(config(), SeatSpec::human("Ada"));
    let work = async {
        setup_both(&host, &mut peer).await;
        let host_seq = last_seq(&host.state().borrow());
        let before = peer.wait_for(|s| last_seq(s) == host_seq).await.unwrap();
        assert_eq!(before.turn_index, seat(0));

        assert!(matches!(
            peer.pick_up(),
            Err(ReplicationError::Rejected(Rejection::NotYourTurn { .. }))
        ));

        peer.send_unchecked(Message::PickUp).unwrap();
        peer.request_sync().unwrap();
        let after = peer.changed().await.unwrap().snapshot().cloned().unwrap();
        assert_eq!(Board::of_snapshot(&after), Board::of_snapshot(&before));
        assert_eq!(last_seq(&after), last_seq(&before));
        assert_eq!(last_seq(&host.state().borrow()), host_seq);
    };
    timeout(DEADLINE, work).await.unwrap();
    host.shutdown().await;
}

/// Bots on the host move on their own; the peer just watches the results.
#[tokio::test]
async fn test_host_bot_moves_reach_peer() {
    let (host, mut peer) = start(config(), SeatSpec::bot("Bot"));
    let work = async {
        let snap = peer.wait_for(|_| true).await.unwrap();
        let picks = stronghold_picks(&snap.players[1].hand, 3);
        peer.confirm_setup(&picks, 3).unwrap();

        // Seat 0 opens, so the peer's first turn comes after a bot move.
        let mine = peer
            .wait_for(|s| s.phase == Phase::Playing && s.turn_index == seat(1))
            .await
            .unwrap();
        assert!(mine.log_tail.iter().any(|e| matches!(
            e.event,
            GameEvent::Played { seat: s, .. } | GameEvent::PickedUp { seat: s, .. } | GameEvent::Passed { seat: s }
                if s == seat(0)
        )));
        assert!(peer.replica().is_my_turn());
    };
    timeout(DEADLINE, work).await.unwrap();
    host.shutdown().await;
}

/// A stalled remote seat is forced to pick up when its countdown runs out.
#[tokio::test]
async fn test_turn_timeout_forces_pickup() {
    let config = config()
        .with_unit(Duration::from_millis(20))
        .with_turn_timeout(5);
    let (host, mut peer) = start(config, SeatSpec::human("Ada"));
    let work = async {
        setup_both(&host, &mut peer).await;
        // Seat 0 may already have run out of time itself; either way seat 1
        // is next.
        let _ = host.submit(seat(0), Move::PickUp).await;

        let after = peer
            .wait_for(|s| {
                s.log_tail
                    .iter()
                    .any(|e| e.event == GameEvent::TimedOut { seat: seat(1) })
            })
            .await
            .unwrap();
        assert_eq!(after.turn_index, seat(0));
    };
    timeout(DEADLINE, work).await.unwrap();
    host.shutdown().await;
}

/// Only accepted moves restart the countdown; a peer asking for state more
/// often than once per unit does not keep the idle seat alive.
#[tokio::test(start_paused = true)]
async fn test_sync_requests_do_not_stall_countdown() {
    let config = config()
        .with_unit(Duration::from_secs(1))
        .with_turn_timeout(3);
    let (host, mut peer) = start(config, SeatSpec::human("Ada"));
    setup_both(&host, &mut peer).await;

    let started = time::Instant::now();
    let mut state = host.state();
    for resync in 0.. {
        let timed_out = state
            .borrow_and_update()
            .log_tail
            .iter()
            .any(|e| e.event == GameEvent::TimedOut { seat: seat(0) });
        if timed_out {
            break;
        }
        assert!(resync < 12, "seat 0 never timed out");
        time::sleep(Duration::from_millis(900)).await;
        peer.request_sync().unwrap();
    }

    assert!(started.elapsed() <= Duration::from_secs(4));
    assert_eq!(state.borrow().turn_index, seat(1));
    host.shutdown().await;
}

/// Until a snapshot arrives the peer keeps asking for one, then stops.
#[tokio::test]
async fn test_peer_polls_until_first_snapshot() {
    let (mut host_end, peer_end) = MemoryLink::pair();
    let peer_id = PeerId::random();
    let mut peer = spawn_peer(peer_id, peer_end, POLL);

    assert!(matches!(peer.pick_up(), Err(ReplicationError::NotSynced)));
    for _ in 0..2 {
        let frame = host_end.recv().await.unwrap();
        let envelope = Envelope::decode(&frame).unwrap();
        assert_eq!(envelope.sender, peer_id);
        assert_eq!(envelope.message, Message::RequestSync);
    }

    let session = GameSession::deal(
        &TableConfig::default(),
        vec![SeatSpec::human("Ada"), SeatSpec::remote("Grace", peer_id)],
        &mut GameRng::new(3),
    );
    let snapshot = Snapshot::capture(&session, stronghold::replication::Visibility::Public, 20);
    let reply = Envelope::new(PeerId::random(), Message::SyncState(Box::new(snapshot.clone())));
    host_end.send(reply.encode().unwrap()).await.unwrap();

    let received = timeout(DEADLINE, peer.wait_for(|_| true)).await.unwrap().unwrap();
    assert_eq!(received, snapshot);

    // Drain polls already in flight, then expect silence.
    while let Ok(Some(_)) = timeout(POLL * 5, host_end.recv()).await {}
    assert!(timeout(POLL * 10, host_end.recv()).await.is_err());

    host_end.close();
    assert_eq!(peer.finished().await, LinkEvent::ConnectionLost);
}

// =============================================================================
// Property tests
// =============================================================================

mod convergence {
    use proptest::prelude::*;

    use stronghold::replication::{Board, Visibility};
    use stronghold::{Authority, PeerId, PeerReplica, SeatSpec, Snapshot, TableConfig};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Whatever subset of S1..Sn a replica saw, once it holds Sn its board
        /// matches the host byte for byte.
        #[test]
        fn test_latest_snapshot_is_enough(
            seed in any::<u64>(),
            steps in 1usize..200,
            delivered in proptest::collection::vec(any::<bool>(), 200),
            redact in any::<bool>(),
        ) {
            let config = TableConfig::default().with_seed(seed).with_redact_hidden(redact);
            let visibility = Visibility::from_redaction(redact);
            let mut host = Authority::new(config, vec![SeatSpec::bot("A"), SeatSpec::bot("B")]);

            let mut lossy = PeerReplica::new(PeerId::random());
            let mut fresh = PeerReplica::new(PeerId::random());
            let mut latest = Snapshot::capture(host.session(), visibility, 20);

            for step in 0..steps {
                if host.bot_step().is_none() {
                    break;
                }
                latest = Snapshot::capture(host.session(), visibility, 20);
                if delivered[step] {
                    lossy.replace(latest.clone());
                }
            }
            lossy.replace(latest.clone());
            fresh.replace(latest);

            let expected = Board::of_session(host.session(), visibility).to_bytes().unwrap();
            for replica in [&lossy, &fresh] {
                let board = Board::of_snapshot(replica.snapshot().unwrap());
                prop_assert_eq!(board.to_bytes().unwrap(), expected.clone());
            }
        }
    }
}
