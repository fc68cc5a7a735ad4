/// End-to-end session scenarios against the in-memory scene and a scripted link.
/// Covers slot identity handling, item application, resync pickup and location reporting.
mod common;

use common::*;
use goosebridge::catalog::{Catalog, Region, BASE_ID, GOLDEN_BELL_SOUL, PROGRESSIVE_AREA};
use goosebridge::guard::SAFE_POINT;
use goosebridge::progression::SessionIdentity;
use goosebridge::session::{SessionCoordinator, SessionEvent, SessionPhase};
use goosebridge::storage::{KvStore, MemoryKvStore};
use goosebridge::world::{SceneWorld, SimWorld};

fn unlock_count(events: &[SessionEvent], capability: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::CapabilityUnlocked { capability: c, .. } if c == capability))
        .count()
}

#[test]
fn fresh_slot_area_item_opens_gate_and_persists() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();

    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);

    assert_eq!(session.phase(), SessionPhase::Connected);
    assert!(session.progression().is_set("High Street Access"));

    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
    assert_eq!(world.active_at(&format!("{}/autoCloser", HALL_GATE)), Some(false));
    assert_eq!(world.active_at(GARDEN_WALL), Some(false));
    assert_eq!(world.active_at(&format!("{}/gate/InvisibleBlocker", TALL_GATE)), Some(false));
    assert!(world.events().iter().any(|e| e == "unlockHighStreet"));

    // other regions stay shut
    assert_eq!(world.active_at(GARAGE_WALL), Some(true));
    assert_eq!(world.active_at(PUB_GATE_EXTRA), Some(true));
    let pub_gate = world.find_by_path(PUB_GATE).unwrap();
    assert_eq!(world.switch_state(pub_gate), Some(0));

    // hub passages are cleared by the resync
    assert_eq!(world.active_at(HALL_FRAME), Some(false));
    assert_eq!(world.active_at(PUB_HUB_FRAME), Some(false));

    assert_eq!(
        session.store().get_string("gb.flag.High Street Access", ""),
        "1"
    );
    let events = session.drain_events();
    assert!(events.contains(&SessionEvent::CapabilityUnlocked {
        capability: "High Street Access".to_string(),
        item_id: HIGH_STREET_ACCESS_ITEM,
    }));
}

#[test]
fn guard_follows_received_access() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);
    session.drain_events();

    let allowed = session.attempt_region_transition(&mut world, Region::HighStreet);
    assert!(allowed.is_allowed());
    assert_eq!(world.teleport_count(), 0);

    let blocked = session.attempt_region_transition(&mut world, Region::Pub);
    assert!(!blocked.is_allowed());
    assert_eq!(world.teleport_count(), 1);
    assert_eq!(world.player_position(), SAFE_POINT);
    let events = session.drain_events();
    assert!(events.contains(&SessionEvent::RegionBlocked {
        region: Region::Pub,
        capability: "Pub Access",
    }));
    assert!(events.contains(&SessionEvent::Notice("You need Pub Access to enter!".to_string())));

    // the hub is never gated
    assert!(session
        .attempt_region_transition(&mut world, Region::Hub)
        .is_allowed());
    assert!(session.on_switch_event(&mut world, "someOtherSwitch").is_none());
    let entry = session.on_switch_event(&mut world, "enterAreaPub").unwrap();
    assert!(!entry.is_allowed());
    assert_eq!(world.teleport_count(), 2);
}

#[test]
fn target_spawned_later_is_picked_up_by_scheduled_resync() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();

    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);
    assert!(session.binder().pending().any(|p| p == HALL_GATE));
    assert!(session.is_resync_scheduled());

    add_gates(&mut world);
    session.tick(&mut world);

    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
    assert!(!session.binder().pending().any(|p| p == HALL_GATE));
    assert!(!session.is_resync_scheduled());
}

#[test]
fn same_slot_reconnect_restores_progression() {
    let (mut first, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM, BASE_ID + 201]));
    first.tick(&mut world);
    first.disconnect();
    assert_eq!(first.phase(), SessionPhase::NoSession);
    assert_eq!(link.disconnects(), 1);
    let store = first.store().clone();

    let mut second = SessionCoordinator::new(store, fast_settings());
    let link = ScriptedLink::new("Goose");
    let phase = second.connect(identity("Goose"), link.clone()).unwrap();
    assert_eq!(phase, SessionPhase::ConnectingSameSlot);
    assert!(second.progression().is_set("High Street Access"));
    assert_eq!(second.progression().counter("Speedy Feet"), 1);
    assert_eq!(second.progression().items_applied(), 2);

    // the server replays the whole stream on reconnect
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM, BASE_ID + 201]));
    second.tick(&mut world);

    assert_eq!(second.progression().counter("Speedy Feet"), 1);
    assert_eq!(unlock_count(&second.drain_events(), "High Street Access"), 0);
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
}

#[test]
fn different_slot_wipes_persisted_state() {
    let (mut first, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    first.tick(&mut world);
    first.check_location(BASE_ID + 1);
    first.tick(&mut world);
    first.disconnect();
    let store = first.store().clone();
    assert_eq!(store.get_string("gb.flag.High Street Access", ""), "1");

    let mut second = SessionCoordinator::new(store, fast_settings());
    let phase = second
        .connect(identity("Gander"), ScriptedLink::new("Gander"))
        .unwrap();
    assert_eq!(phase, SessionPhase::ConnectingNewSlot);
    assert!(!second.progression().is_set("High Street Access"));
    assert!(!second.progression().has_location(BASE_ID + 1));
    assert_eq!(second.progression().items_applied(), 0);
    assert_eq!(second.store().get_string("gb.flag.High Street Access", ""), "");
    assert_eq!(second.store().get_string("gb.locations.sent", ""), "");

    let persisted = SessionIdentity::load(second.store()).unwrap();
    assert_eq!(persisted.slot, "Gander");
}

#[test]
fn duplicate_item_in_stream_unlocks_once() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[PUB_ACCESS_ITEM, PUB_ACCESS_ITEM]));
    // the same position arriving twice is dropped outright
    link.push(&items_frame(1, &[PUB_ACCESS_ITEM]));
    session.tick(&mut world);

    assert_eq!(unlock_count(&session.drain_events(), "Pub Access"), 1);
    assert_eq!(session.progression().items_applied(), 2);
    let pub_gate = world.find_by_path(PUB_GATE).unwrap();
    assert_eq!(world.switch_state(pub_gate), Some(1));
}

#[test]
fn locations_are_reported_at_most_once() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(&connected_frame(&[]));
    session.tick(&mut world);

    assert!(session.check_location(BASE_ID + 5));
    assert!(!session.check_location(BASE_ID + 5));
    assert_eq!(session.on_goal_completed("goalRake"), Vec::<i64>::new());
    assert_eq!(link.sent_locations(), vec![BASE_ID + 5]);

    assert_eq!(session.on_goal_completed("goalGarden"), vec![BASE_ID + 1]);
    assert_eq!(session.on_goal_completed("goalGarden"), Vec::<i64>::new());
    assert_eq!(session.on_goal_completed("notAGoal"), Vec::<i64>::new());
    assert_eq!(link.sent_locations(), vec![BASE_ID + 5, BASE_ID + 1]);
}

#[test]
fn offline_checks_are_sent_after_handshake() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();

    // recorded before the server accepted us
    assert!(session.check_location(BASE_ID + 2));
    assert!(link.sent_locations().is_empty());

    link.push(r#"[{"cmd":"RoomInfo","seed_name":"abc"}]"#);
    link.push(&connected_frame(&[BASE_ID + 3]));
    session.tick(&mut world);

    assert_eq!(link.sent_names(), vec!["Connect", "LocationChecks"]);
    assert_eq!(link.sent_locations(), vec![BASE_ID + 2]);
    assert!(session.progression().has_location(BASE_ID + 3));
    assert!(!session.check_location(BASE_ID + 3));
}

#[test]
fn refused_connection_ends_session() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(r#"[{"cmd":"ConnectionRefused","errors":["InvalidSlot"]}]"#);
    session.tick(&mut world);

    assert_eq!(session.phase(), SessionPhase::NoSession);
    assert_eq!(session.status(), "Connection Refused");
    assert_eq!(link.disconnects(), 1);
    assert!(session.link().is_none());
    assert!(session
        .messages()
        .any(|m| m == "Connection refused: InvalidSlot"));
}

#[test]
fn remote_close_is_reported_as_disconnect() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(&connected_frame(&[]));
    session.tick(&mut world);
    assert_eq!(session.status(), "Connected");

    link.close();
    session.tick(&mut world);
    assert_eq!(session.phase(), SessionPhase::NoSession);
    assert_eq!(session.status(), "Disconnected");
    let events = session.drain_events();
    assert!(events.contains(&SessionEvent::StatusChanged("Disconnected".to_string())));
}

#[test]
fn lines_queued_before_close_are_still_handled() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    link.close_after_next_poll(&[&items_frame(0, &[PUB_ACCESS_ITEM])]);
    session.tick(&mut world);

    assert!(session.progression().is_set("Pub Access"));
    assert_eq!(session.phase(), SessionPhase::NoSession);
    assert_eq!(session.status(), "Disconnected");
    assert_eq!(link.disconnects(), 1);
}

#[test]
fn refusal_queued_before_close_is_reported() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.close_after_next_poll(&[r#"[{"cmd":"ConnectionRefused","errors":["InvalidPassword"]}]"#]);
    session.tick(&mut world);

    assert_eq!(session.phase(), SessionPhase::NoSession);
    assert_eq!(session.status(), "Connection Refused");
    assert_eq!(link.disconnects(), 1);
    assert!(session
        .messages()
        .any(|m| m == "Connection refused: InvalidPassword"));
}

#[test]
fn malformed_frames_are_skipped() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push("this is not json");
    link.push(r#"{"cmd":"Connected"}"#);
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);

    assert_eq!(session.phase(), SessionPhase::Connected);
    assert!(session.progression().is_set("High Street Access"));
}

#[test]
fn out_of_range_item_index_is_dropped() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(u64::MAX, &[HIGH_STREET_ACCESS_ITEM]));
    link.push(&items_frame(i64::MAX as u64, &[HIGH_STREET_ACCESS_ITEM]));
    link.push(&items_frame(0, &[PUB_ACCESS_ITEM]));
    session.tick(&mut world);

    assert_eq!(session.phase(), SessionPhase::Connected);
    assert!(!session.progression().is_set("High Street Access"));
    assert!(session.progression().is_set("Pub Access"));
    assert_eq!(session.progression().items_applied(), 1);
}

#[test]
fn unknown_item_ids_are_ignored() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[BASE_ID + 98_765, PUB_ACCESS_ITEM]));
    session.tick(&mut world);

    assert!(session.progression().is_set("Pub Access"));
    assert_eq!(session.progression().items_applied(), 2);
}

#[test]
fn soul_items_reveal_hidden_objects() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = populated_scene();
    link.push(&connected_frame(&[]));
    session.tick(&mut world);

    let carrot_a = world.find_by_path("gardenDynamic/props/Carrot (1)").unwrap();
    let carrot_b = world.find_by_path("gardenDynamic/props/Carrot (2)").unwrap();
    let boy = world.find_by_path("highStreetDynamic/npcs/Wimp Brain").unwrap();
    assert!(!world.is_active(carrot_a));
    assert!(!world.is_active(carrot_b));
    assert!(!world.colliders_enabled(carrot_a));
    assert!(!world.is_active(boy));
    // ignored and unrecognized objects are never touched
    assert_eq!(world.active_at("gardenDynamic/props/UmbrellaStand"), Some(true));
    assert_eq!(world.active_at("gardenDynamic/props/Mystery Thing"), Some(true));

    link.push(&items_frame(0, &[CARROT_SOUL_ITEM]));
    session.tick(&mut world);
    assert!(world.is_active(carrot_a));
    assert!(world.is_active(carrot_b));
    assert!(world.colliders_enabled(carrot_a));
    assert_eq!(world.body_asleep(carrot_a), Some(false));
    assert!(!world.is_active(boy));

    link.push(&items_frame(1, &[BOY_SOUL_ITEM]));
    session.tick(&mut world);
    assert!(world.is_active(boy));
}

#[test]
fn prop_souls_disabled_by_slot_options() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = populated_scene();
    link.push(
        r#"[{"cmd":"Connected","slot":1,"checked_locations":[],"slot_data":{"include_prop_souls":false}}]"#,
    );
    session.tick(&mut world);

    assert!(!session.progression().options().prop_souls);
    assert!(session.progression().options().npc_souls);
    assert_eq!(world.active_at("gardenDynamic/props/Carrot (1)"), Some(true));
    assert_eq!(world.active_at("highStreetDynamic/npcs/Wimp Brain"), Some(false));
    assert_eq!(session.store().get_string("gb.options.prop_souls", ""), "0");
}

#[test]
fn progressive_area_unlocks_regions_in_order() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    let progressive = BASE_ID + 110;
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[progressive, progressive]));
    session.tick(&mut world);

    assert_eq!(session.progression().counter(PROGRESSIVE_AREA), 2);
    assert!(session.progression().is_set("Garden Access"));
    assert!(session.progression().is_set("High Street Access"));
    assert!(!session.progression().is_set("Back Gardens Access"));
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
}

#[test]
fn golden_bell_soul_is_received_by_fixed_id() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    let bell = Catalog::global().capability(GOLDEN_BELL_SOUL).unwrap().item_id;
    assert_eq!(bell, BASE_ID + 450);
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[bell]));
    session.tick(&mut world);

    assert!(session.progression().is_set(GOLDEN_BELL_SOUL));
}

#[test]
fn scene_reload_rebinds_from_scratch() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = populated_scene();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[CARROT_SOUL_ITEM, HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);
    let first_generation = session.cache().unwrap().generation;

    world.reload();
    world.set_ready(false);
    session.tick(&mut world);
    assert!(session.cache().is_none());

    add_gates(&mut world);
    let carrot = world.spawn_prop("gardenDynamic/props/Carrot (3)");
    let boy = world.spawn_npc("highStreetDynamic/npcs/Wimp Brain");
    world.set_ready(true);
    session.tick(&mut world);

    let cache = session.cache().unwrap();
    assert_ne!(cache.generation, first_generation);
    assert_eq!(cache.handles("Carrot Soul"), &[carrot]);
    assert!(world.is_active(carrot));
    assert!(!world.is_active(boy));
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
}

#[test]
fn reset_all_progress_keeps_identity() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = SceneWorld::new();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[PUB_ACCESS_ITEM]));
    session.tick(&mut world);

    session.reset_all_progress().unwrap();
    assert!(!session.progression().is_set("Pub Access"));
    assert_eq!(session.store().get_string("gb.flag.Pub Access", ""), "");
    assert_eq!(SessionIdentity::load(session.store()).unwrap().slot, "Goose");
    assert!(session.messages().any(|m| m == "All progress has been reset."));
}

#[test]
fn death_link_from_other_slot_returns_player() {
    let store = MemoryKvStore::new();
    let link = ScriptedLink::new("Goose");
    let mut settings = fast_settings();
    settings.death_link = true;
    let mut session = SessionCoordinator::new(store, settings);
    session.connect(identity("Goose"), link.clone()).unwrap();
    let mut world = SceneWorld::new();

    link.push(&connected_frame(&[]));
    link.push(r#"[{"cmd":"Bounced","tags":["DeathLink"],"data":{"source":"Goose","cause":"x"}}]"#);
    session.tick(&mut world);
    assert_eq!(world.teleport_count(), 0);

    link.push(r#"[{"cmd":"Bounced","tags":["DeathLink"],"data":{"source":"Farmer","cause":"x"}}]"#);
    session.tick(&mut world);
    assert_eq!(world.teleport_count(), 1);
    assert!(session.messages().any(|m| m == "DeathLink from Farmer"));

    assert!(session.on_player_shooed());
    assert_eq!(link.sent_names().last().copied(), Some("Bounce"));
}

#[test]
fn traps_run_on_the_tick_and_are_not_replayed() {
    use goosebridge::effects::TimedEffect;

    let mut settings = fast_settings();
    settings.effects.tired = std::time::Duration::from_millis(40);
    let link = ScriptedLink::new("Goose");
    let mut session = SessionCoordinator::new(MemoryKvStore::new(), settings);
    session.connect(identity("Goose"), link.clone()).unwrap();
    let mut world = SceneWorld::new();

    let tired = BASE_ID + 300;
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[tired]));
    session.tick(&mut world);
    assert!(session.effect_timers().is_active(TimedEffect::Tired));
    assert!(session.effects().active.contains(&TimedEffect::Tired));
    assert!(session.effects().speed_multiplier < 1.0);

    for _ in 0..3 {
        session.tick(&mut world);
    }
    assert!(!session.effect_timers().is_active(TimedEffect::Tired));
    assert!(session.messages().any(|m| m == "Trap effects have worn off!"));

    // replayed on reconnect: the trap does not fire again
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[tired]));
    session.tick(&mut world);
    assert!(!session.effect_timers().is_active(TimedEffect::Tired));
}
