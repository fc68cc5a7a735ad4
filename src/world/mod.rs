//! Simulation collaborator interface.
//!
//! The synchronizer never owns simulation objects. It holds [`ObjectHandle`]s,
//! opaque keys that the host resolves on every call; a handle whose object has
//! been destroyed reports [`WorldError::Stale`] instead of panicking.

mod scene;

pub use scene::{SceneDump, SceneObject, SceneWorld};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

/// Candidate roles the resolver scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectRole {
    Prop,
    Npc,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("object {0:?} no longer exists")]
    Stale(ObjectHandle),
    #[error("object {0:?} has no switch")]
    NoSwitch(ObjectHandle),
}

pub trait SimWorld {
    /// False while at a menu or mid-load.
    fn is_scene_ready(&self) -> bool;
    /// Changes every time the scene is (re)loaded.
    fn scene_generation(&self) -> u64;
    fn find_objects(&self, role: ObjectRole) -> Vec<ObjectHandle>;
    /// Find by `/`-separated hierarchy path. Inactive objects are found too.
    fn find_by_path(&self, path: &str) -> Option<ObjectHandle>;
    fn name(&self, handle: ObjectHandle) -> Option<String>;
    fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle>;
    fn is_alive(&self, handle: ObjectHandle) -> bool;
    fn is_active(&self, handle: ObjectHandle) -> bool;
    fn set_active(&mut self, handle: ObjectHandle, active: bool) -> Result<(), WorldError>;
    /// Toggle collision on the object and all of its descendants.
    fn set_colliders_enabled(&mut self, handle: ObjectHandle, enabled: bool)
        -> Result<(), WorldError>;
    /// Wake a physics body left sleeping by deactivation. No-op without a body.
    fn wake_body(&mut self, handle: ObjectHandle) -> Result<(), WorldError>;
    fn switch_state(&self, handle: ObjectHandle) -> Option<i32>;
    fn set_switch_state(&mut self, handle: ObjectHandle, state: i32) -> Result<(), WorldError>;
    fn trigger_event(&mut self, event: &str);
    fn player_position(&self) -> Vec3;
    /// Move the player and zero its velocity.
    fn teleport_player(&mut self, position: Vec3);
    fn delta_time(&self) -> Duration;

    fn find_child(&self, handle: ObjectHandle, name: &str) -> Option<ObjectHandle> {
        self.children(handle)
            .into_iter()
            .find(|c| self.name(*c).as_deref() == Some(name))
    }
}

/// Depth-first list of every descendant of `root`, excluding `root`.
pub fn descendants<W: SimWorld + ?Sized>(world: &W, root: ObjectHandle) -> Vec<ObjectHandle> {
    let mut out = Vec::new();
    let mut stack: Vec<ObjectHandle> = world.children(root).into_iter().rev().collect();
    while let Some(h) = stack.pop() {
        out.push(h);
        stack.extend(world.children(h).into_iter().rev());
    }
    out
}
