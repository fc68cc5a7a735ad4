//! Test utilities & fixtures.
//! Scene builders, a scripted in-memory link and session helpers shared by the
//! integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use goosebridge::catalog::BASE_ID;
use goosebridge::link::{Credentials, Link, LinkError, LinkStatus};
use goosebridge::progression::SessionIdentity;
use goosebridge::protocol::ClientPacket;
use goosebridge::session::{SessionCoordinator, SessionSettings};
use goosebridge::storage::MemoryKvStore;
use goosebridge::world::SceneWorld;

pub const HIGH_STREET_ACCESS_ITEM: i64 = BASE_ID + 101;
pub const PUB_ACCESS_ITEM: i64 = BASE_ID + 103;
pub const CARROT_SOUL_ITEM: i64 = BASE_ID + 500;
pub const BOY_SOUL_ITEM: i64 = BASE_ID + 401;

#[derive(Default)]
struct Script {
    inbound: VecDeque<String>,
    sent: Vec<ClientPacket>,
    closed: bool,
    disconnects: usize,
    /// Frames the remote writes just before closing, delivered after the next poll.
    last_words: Option<Vec<String>>,
}

/// In-memory [`Link`]. Clones share the same script so a test can keep a
/// handle after the coordinator takes ownership.
#[derive(Clone)]
pub struct ScriptedLink {
    script: Arc<Mutex<Script>>,
    credentials: Credentials,
}

impl ScriptedLink {
    pub fn new(slot: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            credentials: Credentials {
                slot: slot.to_string(),
                password: None,
            },
        }
    }

    /// Queue one inbound frame.
    pub fn push(&self, frame: &str) {
        self.script.lock().unwrap().inbound.push_back(frame.to_string());
    }

    pub fn sent(&self) -> Vec<ClientPacket> {
        self.script.lock().unwrap().sent.clone()
    }

    /// Every location id sent in `LocationChecks`, in order.
    pub fn sent_locations(&self) -> Vec<i64> {
        self.sent()
            .into_iter()
            .flat_map(|p| match p {
                ClientPacket::LocationChecks { locations } => locations,
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn sent_names(&self) -> Vec<&'static str> {
        self.sent().iter().map(|p| p.name()).collect()
    }

    /// Simulate the remote end closing the socket.
    pub fn close(&self) {
        self.script.lock().unwrap().closed = true;
    }

    /// The remote writes `frames` and closes right after the next inbox poll,
    /// the way the reader thread does on EOF.
    pub fn close_after_next_poll(&self, frames: &[&str]) {
        self.script.lock().unwrap().last_words =
            Some(frames.iter().map(|f| f.to_string()).collect());
    }

    pub fn disconnects(&self) -> usize {
        self.script.lock().unwrap().disconnects
    }
}

impl Link for ScriptedLink {
    fn send(&mut self, packet: &ClientPacket) -> Result<(), LinkError> {
        let mut script = self.script.lock().unwrap();
        if script.closed {
            return Err(LinkError::Closed);
        }
        script.sent.push(packet.clone());
        Ok(())
    }

    fn poll_inbound(&mut self) -> Vec<String> {
        let mut script = self.script.lock().unwrap();
        let lines = script.inbound.drain(..).collect();
        if let Some(frames) = script.last_words.take() {
            script.inbound.extend(frames);
            script.closed = true;
        }
        lines
    }

    fn status(&self) -> LinkStatus {
        if self.script.lock().unwrap().closed {
            LinkStatus::Closed
        } else {
            LinkStatus::Open
        }
    }

    fn disconnect(&mut self) {
        let mut script = self.script.lock().unwrap();
        script.closed = true;
        script.inbound.clear();
        script.disconnects += 1;
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

pub type TestSession = SessionCoordinator<MemoryKvStore, ScriptedLink>;

pub fn identity(slot: &str) -> SessionIdentity {
    SessionIdentity::new("localhost", 38281, slot).unwrap()
}

/// Settings with no delay before scheduled resyncs.
pub fn fast_settings() -> SessionSettings {
    SessionSettings {
        resync_delay: std::time::Duration::ZERO,
        resync_attempts: 2,
        resync_interval: std::time::Duration::from_millis(16),
        ..SessionSettings::default()
    }
}

/// A coordinator connected on a fresh store, plus the link handle.
pub fn connected_session(slot: &str, store: MemoryKvStore) -> (TestSession, ScriptedLink) {
    let link = ScriptedLink::new(slot);
    let mut session = SessionCoordinator::new(store, fast_settings());
    session.connect(identity(slot), link.clone()).unwrap();
    (session, link)
}

pub fn connected_frame(checked: &[i64]) -> String {
    format!(
        r#"[{{"cmd":"Connected","slot":1,"checked_locations":{:?},"slot_data":{{}}}}]"#,
        checked
    )
}

pub fn items_frame(index: u64, items: &[i64]) -> String {
    let list: Vec<String> = items
        .iter()
        .map(|i| format!(r#"{{"item":{},"location":0,"player":1,"flags":0}}"#, i))
        .collect();
    format!(
        r#"[{{"cmd":"ReceivedItems","index":{},"items":[{}]}}]"#,
        index,
        list.join(",")
    )
}

pub const HALL_GATE: &str = "overworldStatic/GROUP_Hub/HallToHubGateSystem/HallToHubGateMainSystem";
pub const HALL_LOCK: &str = "overworldStatic/GROUP_Hub/HallToHubGateSystem/HallToHubGateLockSystem";
pub const HALL_FRAME: &str = "overworldStatic/GROUP_Hub/HallToHubGateSystem/gateFrame";
pub const PUB_HUB_FRAME: &str = "overworldStatic/GROUP_Hub/PubToHubGateSystem/gateFrame";
pub const GARDEN_WALL: &str = "gardenDynamic/GROUP_Hammering/InvisibleWall";
pub const TALL_GATE: &str = "gardenDynamic/GROUP_Hammering/gateTall/gateTallOpenSystem";
pub const PUB_GATE: &str = "pubDynamic/GROUP_pubItems/PubGateSystem";
pub const PUB_GATE_EXTRA: &str = "pubDynamic/GROUP_pubItems/PubGateSystem/GateExtraColliders";
pub const GARAGE_WALL: &str = "highStreetDynamic/GROUP_Garage/InvisibleWall";

/// Gate hierarchy for High Street and Pub plus the hub frames.
pub fn gate_scene() -> SceneWorld {
    let mut world = SceneWorld::new();
    add_gates(&mut world);
    world
}

pub fn add_gates(world: &mut SceneWorld) {
    world.spawn_switch(HALL_GATE, 0);
    world.spawn(&format!("{}/autoCloser", HALL_GATE));
    world.spawn_switch(HALL_LOCK, 0);
    world.spawn(HALL_FRAME);
    world.spawn(PUB_HUB_FRAME);
    world.spawn_switch("overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem", 1);
    world.spawn("overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem/gateFrame");
    world.spawn(GARDEN_WALL);
    world.spawn_switch(TALL_GATE, 0);
    world.spawn(&format!("{}/autoCloser", TALL_GATE));
    world.spawn(&format!("{}/gate/InvisibleBlocker", TALL_GATE));
    world.spawn_switch(PUB_GATE, 0);
    world.spawn(PUB_GATE_EXTRA);
    world.spawn(GARAGE_WALL);
}

/// Props and NPCs covering several buckets.
pub fn populated_scene() -> SceneWorld {
    let mut world = gate_scene();
    world.spawn_prop("gardenDynamic/props/Carrot (1)");
    world.spawn_prop("gardenDynamic/props/Carrot (2)");
    world.spawn_prop("pubDynamic/props/PintGlass");
    world.spawn_prop("gardenDynamic/props/UmbrellaStand");
    world.spawn_prop("gardenDynamic/props/Mystery Thing");
    world.spawn_npc("highStreetDynamic/npcs/Wimp Brain");
    world
}
