/// Integration tests for the finale lockdown
/// Tests that the lockdown closes every gate but the Pub's and survives later unlocks and resyncs

mod common;

use common::*;
use goosebridge::binder::WorldBinder;
use goosebridge::catalog::{Region, BASE_ID};
use goosebridge::progression::ProgressionState;
use goosebridge::storage::MemoryKvStore;
use goosebridge::world::SimWorld;

const HUB_LOCK: &str = "overworldStatic/GROUP_Hub/HubGateSystem/HubGateLockSystem";
const HUB_MAIN: &str = "overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem";
const HUB_MAIN_FRAME: &str = "overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem/gateFrame";

fn unlocked(caps: &[&str]) -> ProgressionState {
    let mut state = ProgressionState::new();
    for cap in caps {
        state.apply(cap);
    }
    state
}

#[test]
fn lockdown_closes_hub_gates() {
    let mut world = gate_scene();
    world.spawn_switch(HUB_LOCK, 0);
    world.spawn(&format!("{}/autoCloser", HUB_MAIN));
    let progression = unlocked(&["High Street Access", "Pub Access"]);
    let mut binder = WorldBinder::new();

    binder.resync(&mut world, None, &progression);
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
    assert_eq!(world.active_at(HALL_FRAME), Some(false));

    assert!(binder.start_finale(&mut world));

    assert_eq!(world.switch_state(hall), Some(0));
    let lock = world.find_by_path(HALL_LOCK).unwrap();
    assert_eq!(world.switch_state(lock), Some(1));
    let hub_lock = world.find_by_path(HUB_LOCK).unwrap();
    assert_eq!(world.switch_state(hub_lock), Some(1));
    let hub_main = world.find_by_path(HUB_MAIN).unwrap();
    assert_eq!(world.switch_state(hub_main), Some(0));
    assert_eq!(world.active_at(&format!("{}/autoCloser", HALL_GATE)), Some(true));
    assert_eq!(world.active_at(&format!("{}/autoCloser", HUB_MAIN)), Some(true));

    let frame = world.find_by_path(HALL_FRAME).unwrap();
    assert!(world.is_active(frame));
    assert!(world.colliders_enabled(frame));
    assert_eq!(world.active_at(HUB_MAIN_FRAME), Some(true));
    // the pub side of the hub stays passable
    assert_eq!(world.active_at(PUB_HUB_FRAME), Some(false));
}

#[test]
fn resync_after_finale_keeps_gates_shut() {
    let mut world = gate_scene();
    let progression = unlocked(&["High Street Access", "Pub Access"]);
    let mut binder = WorldBinder::new();
    binder.resync(&mut world, None, &progression);
    binder.start_finale(&mut world);

    let report = binder.resync(&mut world, None, &progression);
    assert!(report.events_fired > 0);

    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(0));
    assert_eq!(world.active_at(HALL_FRAME), Some(true));

    let pub_gate = world.find_by_path(PUB_GATE).unwrap();
    assert_eq!(world.switch_state(pub_gate), Some(1));
    assert!(world.events().iter().filter(|e| *e == "openPub").count() >= 2);
}

#[test]
fn open_region_is_refused_during_finale() {
    let mut world = gate_scene();
    let progression = unlocked(&["High Street Access"]);
    let mut binder = WorldBinder::new();
    binder.start_finale(&mut world);

    let report = binder.open_region(&mut world, Region::HighStreet, &progression);
    assert_eq!(report.switches_set, 0);
    assert_eq!(report.events_fired, 0);
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(0));
    assert_eq!(world.active_at(GARDEN_WALL), Some(true));

    let preserved = binder.open_region(&mut world, Region::Pub, &progression);
    assert!(preserved.switches_set > 0);
}

#[test]
fn late_area_item_does_not_reopen() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    session.tick(&mut world);

    assert!(session.on_finale_started(&mut world));
    assert!(!session.on_finale_started(&mut world));
    assert!(session.messages().any(|m| m == "The gates slam shut behind you!"));

    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);
    assert!(session.progression().is_set("High Street Access"));
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(0));
    assert!(session.binder().finale_active());
}

#[test]
fn scene_reload_clears_lockdown() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    link.push(&items_frame(0, &[HIGH_STREET_ACCESS_ITEM]));
    session.tick(&mut world);
    session.on_finale_started(&mut world);

    world.reload();
    add_gates(&mut world);
    session.tick(&mut world);

    assert!(!session.binder().finale_active());
    let hall = world.find_by_path(HALL_GATE).unwrap();
    assert_eq!(world.switch_state(hall), Some(1));
}

#[test]
fn finale_goal_reports_completion() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    let mut world = gate_scene();
    link.push(&connected_frame(&[]));
    session.tick(&mut world);

    let recorded = session.on_goal_completed("goalFinale");
    assert_eq!(recorded, vec![BASE_ID + 42]);
    assert_eq!(
        link.sent_names(),
        vec!["LocationChecks", "StatusUpdate"]
    );
}

#[test]
fn offline_finale_goal_is_sent_on_reconnect() {
    let (mut session, link) = connected_session("Goose", MemoryKvStore::new());
    link.close();
    session.on_goal_completed("goalFinale");
    assert!(link.sent().is_empty());

    let mut world = gate_scene();
    let fresh = ScriptedLink::new("Goose");
    session.attach_link(fresh.clone()).unwrap();
    fresh.push(&connected_frame(&[]));
    session.tick(&mut world);

    assert_eq!(fresh.sent_names(), vec!["LocationChecks", "StatusUpdate"]);
    assert_eq!(fresh.sent_locations(), vec![BASE_ID + 42]);
}
