//! End-to-end scenarios for the equal-rotation pipeline: worker-side packet
//! handling, the bounded main-context hand-off, exception resolution, and
//! violation reporting.

use glam::DVec3;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;
use warden_core::checks::EqualRotationCheck;
use warden_core::config::WardenConfig;
use warden_core::material::Material;
use warden_core::session::{MovementCategory, SessionStore};
use warden_core::violation::ViolationSink;
use warden_core::world::{EnvironmentResolver, Hitbox, WorldAccess, main_thread_channel};
use warden_core::{DetectionEvent, DetectorId, Warden};
use warden_protocol::{RotationUpdate, SMovePlayerRot};

const SERVER_1_8: i32 = 47;
const SERVER_1_12: i32 = 340;
const CLIENT_1_12: i32 = 340;

/// World stub with toggleable answers, served on a spawned "main context".
#[derive(Default)]
struct TestWorld {
    in_vehicle: AtomicBool,
    in_liquid: AtomicBool,
    slime_below: AtomicBool,
    in_changed_hitbox: AtomicBool,
}

impl WorldAccess for TestWorld {
    fn is_hitbox_intersecting(&self, _: DVec3, _: Hitbox, materials: &[Material]) -> bool {
        if materials.contains(&Material::Water) {
            self.in_liquid.load(Ordering::Relaxed)
        } else if materials.contains(&Material::GlassPane) {
            self.in_changed_hitbox.load(Ordering::Relaxed)
        } else {
            false
        }
    }

    fn block_below(&self, _: DVec3) -> Material {
        if self.slime_below.load(Ordering::Relaxed) {
            Material::SlimeBlock
        } else {
            Material::Solid
        }
    }

    fn is_player_in_vehicle(&self, _: Uuid) -> bool {
        self.in_vehicle.load(Ordering::Relaxed)
    }
}

/// Captures every event the detectors hand to the violation sink.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<DetectionEvent>>,
}

impl RecordingSink {
    fn scored(&self) -> Vec<DetectionEvent> {
        self.events.lock().clone()
    }
}

impl ViolationSink for RecordingSink {
    fn flag(
        &self,
        event: &DetectionEvent,
        _on_flagged: &mut dyn FnMut(),
        on_always: &mut dyn FnMut(),
    ) {
        on_always();
        self.events.lock().push(event.clone());
    }
}

struct Harness {
    warden: Warden,
    world: Arc<TestWorld>,
    sink: Arc<RecordingSink>,
    player: Uuid,
}

fn test_config() -> WardenConfig {
    let mut config = WardenConfig::default();
    // Wide stillness window so recorded movement stays "recent" for the
    // whole test regardless of scheduling.
    config.equal_rotation.movement_window_ms = 10_000;
    config
}

/// Builds an engine over a served main context, with one joined player who
/// moved recently (the common "actively playing" baseline).
fn harness(config: WardenConfig, server_protocol: i32, client_protocol: Option<i32>) -> Harness {
    let world = Arc::new(TestWorld::default());
    let (gate, queue) = main_thread_channel(world.clone());
    tokio::spawn(queue.serve());

    let sessions = Arc::new(SessionStore::new());
    let sink = Arc::new(RecordingSink::default());
    let warden = Warden::with_sink(config, server_protocol, gate, sessions, sink.clone())
        .expect("supported server protocol");

    let player = Uuid::from_u128(0xA);
    warden
        .player_join(player, "Alex", client_protocol)
        .expect("supported client protocol");
    warden.record_movement(player, MovementCategory::Horizontal);

    Harness {
        warden,
        world,
        sink,
        player,
    }
}

fn look(yaw: f32, pitch: f32) -> RotationUpdate {
    RotationUpdate::Rot(SMovePlayerRot {
        yaw,
        pitch,
        on_ground: true,
    })
}

#[tokio::test]
async fn varying_rotations_never_flag() {
    let h = harness(test_config(), SERVER_1_12, None);
    for i in 0..20 {
        let yaw = 10.0 + i as f32 * 0.003;
        let pitch = -5.0 + i as f32 * 0.001;
        assert!(h.warden.handle_rotation(h.player, look(yaw, pitch)).await.is_none());
    }
    assert!(h.sink.scored().is_empty());
}

#[tokio::test]
async fn one_repeated_pair_is_exactly_one_minimal_event() {
    let h = harness(test_config(), SERVER_1_12, None);

    assert!(h.warden.handle_rotation(h.player, look(10.0, 0.0)).await.is_none());
    let event = h
        .warden
        .handle_rotation(h.player, look(10.0, 0.0))
        .await
        .expect("second identical rotation should flag");

    assert_eq!(event.detector, DetectorId::EqualRotation);
    assert_eq!(event.severity_delta, 1);
    assert!(event.is_scored());
    assert!(event.evidence.contains("Alex"));

    let scored = h.sink.scored();
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].player_id, h.player);
}

#[tokio::test]
async fn every_repeated_pair_flags_again() {
    let h = harness(test_config(), SERVER_1_12, None);
    for _ in 0..4 {
        h.warden.handle_rotation(h.player, look(33.0, 12.0)).await;
    }
    // Four packets: three consecutive equal pairs.
    assert_eq!(h.sink.scored().len(), 3);
}

#[tokio::test]
async fn stillness_is_not_cheating() {
    // No recorded horizontal movement at all.
    let world = Arc::new(TestWorld::default());
    let (gate, queue) = main_thread_channel(world.clone());
    tokio::spawn(queue.serve());
    let sessions = Arc::new(SessionStore::new());
    let sink = Arc::new(RecordingSink::default());
    let warden = Warden::with_sink(test_config(), SERVER_1_12, gate, sessions, sink.clone())
        .expect("supported server protocol");
    let player = Uuid::from_u128(0xB);
    warden.player_join(player, "Bea", None).expect("join");

    for _ in 0..3 {
        assert!(warden.handle_rotation(player, look(0.0, 0.0)).await.is_none());
    }
    assert!(sink.scored().is_empty());
}

#[tokio::test]
async fn teleport_grace_window_suppresses() {
    let h = harness(test_config(), SERVER_1_12, None);
    h.warden.record_teleport(h.player);

    h.warden.handle_rotation(h.player, look(90.0, 45.0)).await;
    assert!(h.warden.handle_rotation(h.player, look(90.0, 45.0)).await.is_none());
    assert!(h.sink.scored().is_empty());
}

#[tokio::test]
async fn vehicles_are_exempt_without_consuming_the_one_shot_flag() {
    let h = harness(test_config(), SERVER_1_12, None);
    h.world.in_vehicle.store(true, Ordering::Relaxed);
    h.warden.expect_equal_rotation(h.player);

    h.warden.handle_rotation(h.player, look(1.0, 2.0)).await;
    assert!(h.warden.handle_rotation(h.player, look(1.0, 2.0)).await.is_none());
    assert!(h.sink.scored().is_empty());

    // Leaving the vehicle: the untouched one-shot flag absorbs the next
    // flaggable occurrence, the one after that is scored.
    h.world.in_vehicle.store(false, Ordering::Relaxed);
    let absorbed = h
        .warden
        .handle_rotation(h.player, look(1.0, 2.0))
        .await
        .expect("evaluated");
    assert!(!absorbed.is_scored());
    assert!(h.warden.handle_rotation(h.player, look(1.0, 2.0)).await.expect("evaluated").is_scored());
}

#[tokio::test]
async fn one_shot_flag_consumes_exactly_one_occurrence() {
    let h = harness(test_config(), SERVER_1_12, None);
    h.warden.expect_equal_rotation(h.player);

    h.warden.handle_rotation(h.player, look(10.0, 0.0)).await;
    let first = h
        .warden
        .handle_rotation(h.player, look(10.0, 0.0))
        .await
        .expect("evaluated");
    assert_eq!(first.suppressed_reason, Some("expected equal rotation"));
    assert!(h.sink.scored().is_empty());

    let second = h
        .warden
        .handle_rotation(h.player, look(10.0, 0.0))
        .await
        .expect("evaluated");
    assert!(second.is_scored());
    assert_eq!(h.sink.scored().len(), 1);
}

#[tokio::test]
async fn slime_pool_landing_is_suppressed() {
    let h = harness(test_config(), SERVER_1_12, None);
    h.world.in_liquid.store(true, Ordering::Relaxed);
    h.world.slime_below.store(true, Ordering::Relaxed);

    h.warden.handle_rotation(h.player, look(0.0, 90.0)).await;
    let event = h
        .warden
        .handle_rotation(h.player, look(0.0, 90.0))
        .await
        .expect("evaluated");
    assert_eq!(event.suppressed_reason, Some("world geometry"));
    assert!(h.sink.scored().is_empty());
}

#[tokio::test]
async fn liquid_without_slime_below_still_flags() {
    let h = harness(test_config(), SERVER_1_12, None);
    h.world.in_liquid.store(true, Ordering::Relaxed);

    h.warden.handle_rotation(h.player, look(0.0, 90.0)).await;
    let event = h
        .warden
        .handle_rotation(h.player, look(0.0, 90.0))
        .await
        .expect("evaluated");
    assert!(event.is_scored());
}

#[tokio::test]
async fn cross_version_hitbox_mismatch_is_suppressed() {
    // Legacy 1.8 server, modern 1.12 client, player against a glass pane.
    let h = harness(test_config(), SERVER_1_8, Some(CLIENT_1_12));
    h.world.in_changed_hitbox.store(true, Ordering::Relaxed);

    h.warden.handle_rotation(h.player, look(5.0, 5.0)).await;
    let event = h
        .warden
        .handle_rotation(h.player, look(5.0, 5.0))
        .await
        .expect("evaluated");
    assert_eq!(event.suppressed_reason, Some("world geometry"));
    assert!(h.sink.scored().is_empty());
}

#[tokio::test]
async fn matching_versions_ignore_changed_hitboxes() {
    // Same band on both sides: the changed-hitbox rule must not apply.
    let h = harness(test_config(), SERVER_1_12, Some(CLIENT_1_12));
    h.world.in_changed_hitbox.store(true, Ordering::Relaxed);

    h.warden.handle_rotation(h.player, look(5.0, 5.0)).await;
    let event = h
        .warden
        .handle_rotation(h.player, look(5.0, 5.0))
        .await
        .expect("evaluated");
    assert!(event.is_scored());
}

#[tokio::test]
async fn unsupported_client_generation_fails_the_join() {
    let h = harness(test_config(), SERVER_1_12, None);
    // 107 is 1.9: inside the unclassified gap.
    let result = h.warden.player_join(Uuid::from_u128(0xC), "Caro", Some(107));
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn timeout_drops_the_occurrence_without_scoring() {
    let world = Arc::new(TestWorld::default());
    // Queue kept alive but never driven: every query times out.
    let (gate, _queue) = main_thread_channel(world);

    let sessions = Arc::new(SessionStore::new());
    let sink = Arc::new(RecordingSink::default());
    let mut config = test_config();
    config.equal_rotation.world_query_timeout_ms = 100;
    let warden = Warden::with_sink(config, SERVER_1_12, gate, sessions, sink.clone())
        .expect("supported server protocol");

    let player = Uuid::from_u128(0xD);
    warden.player_join(player, "Dana", None).expect("join");
    warden.record_movement(player, MovementCategory::Horizontal);

    warden.handle_rotation(player, look(42.0, 0.0)).await;
    assert!(warden.handle_rotation(player, look(42.0, 0.0)).await.is_none());
    assert!(sink.scored().is_empty());
}

#[tokio::test(start_paused = true)]
async fn consecutive_timeouts_are_counted_for_escalation() {
    let world = Arc::new(TestWorld::default());
    let (gate, _queue) = main_thread_channel(world);

    let sessions = Arc::new(SessionStore::new());
    let player = Uuid::from_u128(0xE);
    sessions.session_for(player).lock().name = "Eve".to_string();
    sessions.record_movement(player, MovementCategory::Horizontal, Instant::now());

    let sink = Arc::new(RecordingSink::default());
    let mut config = test_config();
    config.equal_rotation.world_query_timeout_ms = 100;
    let check = EqualRotationCheck::new(
        sessions.clone(),
        EnvironmentResolver::new(gate, warden_protocol::VersionBand::V1_12),
        sink,
        config.equal_rotation,
    );

    let update = look(7.0, 7.0);
    assert!(check.on_rotation(player, &update).await.expect("first packet").is_none());
    for expected in 1..=3 {
        let result = check.on_rotation(player, &update).await;
        assert!(matches!(
            result,
            Err(warden_core::CheckError::WorldQueryTimedOut(d)) if d == Duration::from_millis(100)
        ));
        assert_eq!(check.consecutive_timeouts(), expected);
    }
}
