//! In-memory scene graph implementing [`SimWorld`].
//!
//! Used by the headless binary (loaded from a JSON scene dump) and by tests.
//! Handles are never reused, so a handle from before a [`SceneWorld::reload`]
//! stays stale.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ObjectHandle, ObjectRole, SimWorld, Vec3, WorldError};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<u64>,
    children: Vec<u64>,
    active: bool,
    colliders: bool,
    role: Option<ObjectRole>,
    switch: Option<i32>,
    /// `Some(asleep)` when the object has a physics body.
    body: Option<bool>,
}

/// One object in a scene dump. Missing ancestors are created implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneObject {
    pub path: String,
    #[serde(default)]
    pub role: Option<ObjectRole>,
    #[serde(default)]
    pub switch: Option<i32>,
    #[serde(default)]
    pub body: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDump {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub player: Vec3,
}

#[derive(Debug)]
pub struct SceneWorld {
    nodes: BTreeMap<u64, Node>,
    next_id: u64,
    generation: u64,
    ready: bool,
    player: Vec3,
    teleports: usize,
    events: Vec<String>,
    dt: Duration,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            generation: 1,
            ready: true,
            player: Vec3::default(),
            teleports: 0,
            events: Vec::new(),
            dt: Duration::from_millis(16),
        }
    }

    pub fn from_dump(dump: &SceneDump) -> Self {
        let mut world = Self::new();
        for obj in &dump.objects {
            let h = world.spawn(&obj.path);
            if let Some(node) = world.nodes.get_mut(&h.0) {
                node.role = obj.role;
                node.switch = obj.switch;
                node.body = obj.body.then_some(false);
                node.active = obj.active;
            }
        }
        world.player = dump.player;
        world
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let dump: SceneDump = serde_json::from_str(json)?;
        Ok(Self::from_dump(&dump))
    }

    /// Create the object at `path` (and any missing ancestors). Returns the
    /// existing handle if the path is already present.
    pub fn spawn(&mut self, path: &str) -> ObjectHandle {
        let mut parent: Option<u64> = None;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let existing = match parent {
                Some(p) => self.nodes.get(&p).and_then(|n| {
                    n.children
                        .iter()
                        .copied()
                        .find(|c| self.nodes.get(c).map(|cn| cn.name == segment).unwrap_or(false))
                }),
                None => self
                    .nodes
                    .iter()
                    .find(|(_, n)| n.parent.is_none() && n.name == segment)
                    .map(|(id, _)| *id),
            };
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.nodes.insert(
                        id,
                        Node {
                            name: segment.to_string(),
                            parent,
                            children: Vec::new(),
                            active: true,
                            colliders: true,
                            role: None,
                            switch: None,
                            body: None,
                        },
                    );
                    if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
                        p.children.push(id);
                    }
                    id
                }
            };
            parent = Some(id);
        }
        ObjectHandle(parent.unwrap_or(0))
    }

    pub fn spawn_prop(&mut self, path: &str) -> ObjectHandle {
        let h = self.spawn(path);
        if let Some(node) = self.nodes.get_mut(&h.0) {
            node.role = Some(ObjectRole::Prop);
            node.body = Some(false);
        }
        h
    }

    pub fn spawn_npc(&mut self, path: &str) -> ObjectHandle {
        let h = self.spawn(path);
        if let Some(node) = self.nodes.get_mut(&h.0) {
            node.role = Some(ObjectRole::Npc);
        }
        h
    }

    pub fn spawn_switch(&mut self, path: &str, state: i32) -> ObjectHandle {
        let h = self.spawn(path);
        if let Some(node) = self.nodes.get_mut(&h.0) {
            node.switch = Some(state);
        }
        h
    }

    /// Remove an object and its subtree.
    pub fn despawn(&mut self, handle: ObjectHandle) {
        let Some(node) = self.nodes.remove(&handle.0) else {
            return;
        };
        if let Some(p) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != handle.0);
        }
        for child in node.children {
            self.despawn(ObjectHandle(child));
        }
    }

    /// Drop every object and start a new scene generation.
    pub fn reload(&mut self) {
        self.nodes.clear();
        self.generation += 1;
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn set_delta_time(&mut self, dt: Duration) {
        self.dt = dt;
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn teleport_count(&self) -> usize {
        self.teleports
    }

    pub fn colliders_enabled(&self, handle: ObjectHandle) -> bool {
        self.nodes.get(&handle.0).map(|n| n.colliders).unwrap_or(false)
    }

    /// `Some(true)` if the object's body is asleep.
    pub fn body_asleep(&self, handle: ObjectHandle) -> Option<bool> {
        self.nodes.get(&handle.0).and_then(|n| n.body)
    }

    pub fn object_count(&self) -> usize {
        self.nodes.len()
    }

    /// Active flag by path; `None` when the path does not exist.
    pub fn active_at(&self, path: &str) -> Option<bool> {
        self.find_by_path(path).map(|h| self.is_active(h))
    }
}

impl SimWorld for SceneWorld {
    fn is_scene_ready(&self) -> bool {
        self.ready
    }

    fn scene_generation(&self) -> u64 {
        self.generation
    }

    fn find_objects(&self, role: ObjectRole) -> Vec<ObjectHandle> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.role == Some(role))
            .map(|(id, _)| ObjectHandle(*id))
            .collect()
    }

    fn find_by_path(&self, path: &str) -> Option<ObjectHandle> {
        let mut current: Option<u64> = None;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let next = match current {
                Some(id) => self.nodes.get(&id)?.children.iter().copied().find(|c| {
                    self.nodes
                        .get(c)
                        .map(|n| n.name == segment)
                        .unwrap_or(false)
                }),
                None => self
                    .nodes
                    .iter()
                    .find(|(_, n)| n.parent.is_none() && n.name == segment)
                    .map(|(id, _)| *id),
            };
            current = Some(next?);
        }
        current.map(ObjectHandle)
    }

    fn name(&self, handle: ObjectHandle) -> Option<String> {
        self.nodes.get(&handle.0).map(|n| n.name.clone())
    }

    fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.nodes
            .get(&handle.0)
            .map(|n| n.children.iter().copied().map(ObjectHandle).collect())
            .unwrap_or_default()
    }

    fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.nodes.contains_key(&handle.0)
    }

    fn is_active(&self, handle: ObjectHandle) -> bool {
        self.nodes.get(&handle.0).map(|n| n.active).unwrap_or(false)
    }

    fn set_active(&mut self, handle: ObjectHandle, active: bool) -> Result<(), WorldError> {
        let node = self
            .nodes
            .get_mut(&handle.0)
            .ok_or(WorldError::Stale(handle))?;
        node.active = active;
        if !active {
            if let Some(asleep) = node.body.as_mut() {
                *asleep = true;
            }
        }
        Ok(())
    }

    fn set_colliders_enabled(
        &mut self,
        handle: ObjectHandle,
        enabled: bool,
    ) -> Result<(), WorldError> {
        if !self.nodes.contains_key(&handle.0) {
            return Err(WorldError::Stale(handle));
        }
        let mut stack = vec![handle.0];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.colliders = enabled;
                stack.extend(node.children.iter().copied());
            }
        }
        Ok(())
    }

    fn wake_body(&mut self, handle: ObjectHandle) -> Result<(), WorldError> {
        let node = self
            .nodes
            .get_mut(&handle.0)
            .ok_or(WorldError::Stale(handle))?;
        if let Some(asleep) = node.body.as_mut() {
            *asleep = false;
        }
        Ok(())
    }

    fn switch_state(&self, handle: ObjectHandle) -> Option<i32> {
        self.nodes.get(&handle.0).and_then(|n| n.switch)
    }

    fn set_switch_state(&mut self, handle: ObjectHandle, state: i32) -> Result<(), WorldError> {
        let node = self
            .nodes
            .get_mut(&handle.0)
            .ok_or(WorldError::Stale(handle))?;
        match node.switch.as_mut() {
            Some(s) => {
                *s = state;
                Ok(())
            }
            None => Err(WorldError::NoSwitch(handle)),
        }
    }

    fn trigger_event(&mut self, event: &str) {
        self.events.push(event.to_string());
    }

    fn player_position(&self) -> Vec3 {
        self.player
    }

    fn teleport_player(&mut self, position: Vec3) {
        self.player = position;
        self.teleports += 1;
    }

    fn delta_time(&self) -> Duration {
        self.dt
    }
}
