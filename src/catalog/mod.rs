//! # Capability Catalog
//!
//! Static lookup tables tying the remote session's numeric ids to local meaning:
//!
//! - remote item id -> capability ([`Catalog::capability_for_item`])
//! - capability -> unlock action ([`Catalog::unlock_action`])
//! - goal / pickup name -> location id ([`Catalog::location_for_goal`], [`Catalog::location_for_pickup`])
//! - region -> milestone location ([`Catalog::milestone_location`])
//!
//! The catalog holds no mutable state. An id outside the tables is reported as
//! `None`; callers log it and move on.

mod items;
mod locations;

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::effects::TimedEffect;

pub use items::{GOLDEN_BELL_SOUL, PROGRESSIVE_AREA};

/// Offset added to every item and location id on the wire.
pub const BASE_ID: i64 = 119_000_000;

/// Logical areas of the world. `Hub` is the shared crossroads and is never gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Hub,
    Garden,
    HighStreet,
    BackGardens,
    Pub,
    ModelVillage,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Hub,
        Region::Garden,
        Region::HighStreet,
        Region::BackGardens,
        Region::Pub,
        Region::ModelVillage,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Hub => "Hub",
            Region::Garden => "Garden",
            Region::HighStreet => "High Street",
            Region::BackGardens => "Back Gardens",
            Region::Pub => "Pub",
            Region::ModelVillage => "Model Village",
        }
    }

    /// Capability that must be held to enter this region.
    pub fn access_capability(&self) -> Option<&'static str> {
        match self {
            Region::Hub => None,
            Region::Garden => Some(items::GARDEN_ACCESS),
            Region::HighStreet => Some(items::HIGH_STREET_ACCESS),
            Region::BackGardens => Some(items::BACK_GARDENS_ACCESS),
            Region::Pub => Some(items::PUB_ACCESS),
            Region::ModelVillage => Some(items::MODEL_VILLAGE_ACCESS),
        }
    }

    /// Map an area-entry switch event (`enterAreaPub`, ...) to its region.
    pub fn from_transition_event(event: &str) -> Option<Region> {
        match event {
            "enterAreaGarden" => Some(Region::Garden),
            "enterAreaHighstreet" => Some(Region::HighStreet),
            "enterAreaBackyards" => Some(Region::BackGardens),
            "enterAreaPub" => Some(Region::Pub),
            "enterAreaFinale" => Some(Region::ModelVillage),
            _ => None,
        }
    }

    /// Map the simulation's own area names, case-insensitively.
    pub fn from_area_name(name: &str) -> Option<Region> {
        match name.to_ascii_lowercase().as_str() {
            "hub" | "park" => Some(Region::Hub),
            "garden" => Some(Region::Garden),
            "shops" | "highstreet" => Some(Region::HighStreet),
            "backyards" | "backgardens" => Some(Region::BackGardens),
            "pub" => Some(Region::Pub),
            "finale" | "modelvillage" => Some(Region::ModelVillage),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    Area,
    NpcSoul,
    PropSoul,
    Buff,
    Counter,
    Milestone,
    Trap,
    Filler,
}

impl CapabilityKind {
    /// Kinds whose flag never resets within a slot.
    pub fn is_sticky(&self) -> bool {
        matches!(
            self,
            CapabilityKind::Area
                | CapabilityKind::NpcSoul
                | CapabilityKind::PropSoul
                | CapabilityKind::Milestone
                | CapabilityKind::Buff
        )
    }
}

/// What receiving a capability does to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockAction {
    OpenRegion(Region),
    /// Show every object the resolver bound to the capability's bucket.
    RevealBucket,
    /// Grant the next locked region in progression order.
    ProgressiveArea,
    Counter { max: u32 },
    /// State only.
    Flag,
    Timed(TimedEffect),
    Notice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityDef {
    pub item_id: i64,
    pub id: &'static str,
    pub kind: CapabilityKind,
    pub action: UnlockAction,
}

pub struct Catalog {
    by_item: HashMap<i64, CapabilityDef>,
    by_id: HashMap<&'static str, i64>,
    goals: HashMap<&'static str, i64>,
    pickups: HashMap<&'static str, i64>,
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    pub fn global() -> &'static Catalog {
        CATALOG.get_or_init(Catalog::build)
    }

    fn build() -> Catalog {
        let mut defs: Vec<CapabilityDef> = items::FIXED_ITEMS
            .iter()
            .map(|e| CapabilityDef {
                item_id: BASE_ID + e.offset,
                id: e.name,
                kind: e.kind,
                action: e.action,
            })
            .collect();
        defs.extend(items::NPC_SOULS.iter().enumerate().map(|(i, name)| CapabilityDef {
            item_id: BASE_ID + items::NPC_SOUL_BASE + i as i64,
            id: *name,
            kind: CapabilityKind::NpcSoul,
            action: UnlockAction::RevealBucket,
        }));
        defs.extend(items::PROP_SOULS.iter().enumerate().map(|(i, name)| CapabilityDef {
            item_id: BASE_ID + items::PROP_SOUL_BASE + i as i64,
            id: *name,
            kind: CapabilityKind::PropSoul,
            action: UnlockAction::RevealBucket,
        }));

        let by_id = defs.iter().map(|d| (d.id, d.item_id)).collect();
        let by_item = defs.into_iter().map(|d| (d.item_id, d)).collect();
        let goals = locations::GOALS
            .iter()
            .map(|(name, off)| (*name, BASE_ID + off))
            .collect();
        let pickups = locations::PICKUPS
            .iter()
            .map(|(name, off)| (*name, BASE_ID + off))
            .collect();
        Catalog {
            by_item,
            by_id,
            goals,
            pickups,
        }
    }

    pub fn capability_for_item(&self, item_id: i64) -> Option<&CapabilityDef> {
        self.by_item.get(&item_id)
    }

    pub fn capability(&self, id: &str) -> Option<&CapabilityDef> {
        self.by_id.get(id).and_then(|item| self.by_item.get(item))
    }

    pub fn unlock_action(&self, id: &str) -> Option<UnlockAction> {
        self.capability(id).map(|d| d.action)
    }

    pub fn kind_of(&self, id: &str) -> Option<CapabilityKind> {
        self.capability(id).map(|d| d.kind)
    }

    /// Display name for an item id, or `Unknown Item (<offset>)`.
    pub fn item_name(&self, item_id: i64) -> String {
        match self.capability_for_item(item_id) {
            Some(def) => def.id.to_string(),
            None => format!("Unknown Item ({})", item_id - BASE_ID),
        }
    }

    pub fn capabilities_of_kind(&self, kind: CapabilityKind) -> Vec<&CapabilityDef> {
        let mut out: Vec<_> = self.by_item.values().filter(|d| d.kind == kind).collect();
        out.sort_by_key(|d| d.item_id);
        out
    }

    pub fn location_for_goal(&self, goal: &str) -> Option<i64> {
        self.goals.get(goal).copied()
    }

    pub fn is_finale_goal(&self, goal: &str) -> bool {
        goal == locations::FINALE_GOAL
    }

    /// Pickup location for a raw object name. Matching is on the lowercased,
    /// trimmed name with any `(Clone)` suffix removed.
    pub fn location_for_pickup(&self, raw_name: &str) -> Option<i64> {
        let lower = raw_name.trim().to_lowercase().replace("(clone)", "");
        self.pickups.get(lower.trim()).copied()
    }

    pub fn milestone_location(&self, region: Region) -> Option<i64> {
        locations::AREA_MILESTONES
            .iter()
            .find(|(r, _, _)| *r == region)
            .map(|(_, off, _)| BASE_ID + off)
    }

    /// Milestones earned by the given set of reported locations, in table order.
    pub fn earned_milestones(&self, reported: &dyn Fn(i64) -> bool) -> Vec<i64> {
        let mut earned = Vec::new();
        let mut all_areas = true;
        for (_, milestone, tasks) in locations::AREA_MILESTONES {
            if tasks.iter().all(|t| reported(BASE_ID + t)) {
                earned.push(BASE_ID + milestone);
            } else {
                all_areas = false;
            }
        }
        if all_areas {
            earned.push(BASE_ID + locations::ALL_MAIN_MILESTONE);
        }
        earned
    }

    /// Region granted by the `n`th Progressive Area (1-based).
    pub fn progressive_region(&self, n: u32) -> Option<Region> {
        (n as usize)
            .checked_sub(1)
            .and_then(|i| items::PROGRESSIVE_ORDER.get(i))
            .copied()
    }

    pub fn progressive_max(&self) -> u32 {
        items::PROGRESSIVE_ORDER.len() as u32
    }
}
