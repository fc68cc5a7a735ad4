//! # World Binder
//!
//! Projects progression onto the simulation:
//!
//! - soul capabilities show or hide every object bound to their bucket
//! - area capabilities open region gates (events, switch states, obstruction removal)
//! - [`WorldBinder::resync`] re-applies the whole progression state from scratch
//! - [`WorldBinder::start_finale`] is the one-way lockdown of every gate but one
//!
//! Every operation here is idempotent. Targets that do not exist yet are
//! recorded as pending and picked up by the next resync.

pub mod gates;

use std::collections::BTreeSet;

use log::{debug, info, trace};

use crate::catalog::{Catalog, CapabilityDef, CapabilityKind, Region, UnlockAction, GOLDEN_BELL_SOUL};
use crate::errors::SyncError;
use crate::metrics;
use crate::progression::{ProgressionState, SlotOptions};
use crate::resolver::BucketCache;
use crate::world::{descendants, ObjectHandle, SimWorld, WorldError};

use gates::{gate_for, FINALE, GATE_CLOSED, GATE_OPEN, HUB_BLOCKERS};

/// Collider marker substrings for the recursive sweep.
const OBSTRUCTION_MARKERS: &[&str] = &["collider", "blocker", "invisible", "obstruction"];
/// Names containing this stay untouched by the sweep.
const ALWAYS_BLOCKING: &str = "hub";

/// Counters from one binder operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BindReport {
    pub events_fired: usize,
    pub switches_set: usize,
    pub obstructions_removed: usize,
    pub objects_shown: usize,
    pub objects_hidden: usize,
    /// Paths or buckets that could not be reached this time.
    pub missing: Vec<String>,
}

impl BindReport {
    fn merge(&mut self, other: BindReport) {
        self.events_fired += other.events_fired;
        self.switches_set += other.switches_set;
        self.obstructions_removed += other.obstructions_removed;
        self.objects_shown += other.objects_shown;
        self.objects_hidden += other.objects_hidden;
        self.missing.extend(other.missing);
    }
}

/// Whether a soul bucket is gated at all under the slot's options.
pub fn is_gated(bucket: &str, kind: CapabilityKind, options: SlotOptions) -> bool {
    if bucket == GOLDEN_BELL_SOUL {
        return true;
    }
    match kind {
        CapabilityKind::NpcSoul => options.npc_souls,
        CapabilityKind::PropSoul => options.prop_souls,
        _ => false,
    }
}

fn is_obstruction_name(lower: &str) -> bool {
    lower == "wall" || OBSTRUCTION_MARKERS.iter().any(|m| lower.contains(m))
}

#[derive(Debug, Default)]
pub struct WorldBinder {
    finale_active: bool,
    pending: BTreeSet<String>,
}

impl WorldBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finale_active(&self) -> bool {
        self.finale_active
    }

    /// Targets missed by the most recent operations, cleared by a clean resync.
    pub fn pending(&self) -> impl Iterator<Item = &str> + '_ {
        self.pending.iter().map(String::as_str)
    }

    /// Forget the lockdown. Only for a new slot or a fresh scene.
    pub fn reset_finale(&mut self) {
        if self.finale_active {
            info!("finale lockdown cleared");
        }
        self.finale_active = false;
    }

    /// Apply the world side of a capability that has just been set.
    pub fn apply_capability<W: SimWorld + ?Sized>(
        &mut self,
        world: &mut W,
        cache: Option<&BucketCache>,
        progression: &ProgressionState,
        def: &CapabilityDef,
    ) -> BindReport {
        match def.action {
            UnlockAction::OpenRegion(region) => self.open_region(world, region, progression),
            UnlockAction::RevealBucket => {
                if !is_gated(def.id, def.kind, progression.options()) {
                    return BindReport::default();
                }
                match cache {
                    Some(cache) => self.set_bucket_visible(world, cache, def.id, true),
                    None => {
                        debug!("no resolver cache yet, '{}' waits for resync", def.id);
                        self.pending.insert(def.id.to_string());
                        BindReport::default()
                    }
                }
            }
            _ => BindReport::default(),
        }
    }

    /// Open one region's gate. Safe to call any number of times.
    pub fn open_region<W: SimWorld + ?Sized>(
        &mut self,
        world: &mut W,
        region: Region,
        progression: &ProgressionState,
    ) -> BindReport {
        let mut report = BindReport::default();
        if self.finale_active && region != FINALE.preserved {
            debug!("finale active, {} stays closed", region);
            return report;
        }
        let Some(gate) = gate_for(region) else {
            return report;
        };

        for event in gate.events {
            world.trigger_event(event);
            report.events_fired += 1;
        }

        for path in gate.blockers {
            match world.find_by_path(path) {
                Some(h) => {
                    if disable_obstruction(world, h) {
                        report.obstructions_removed += 1;
                    }
                }
                None => self.note_missing(&mut report, path),
            }
        }

        let protected = self.protected_roots(world, region, progression);
        for path in gate.switches {
            let Some(root) = world.find_by_path(path) else {
                self.note_missing(&mut report, path);
                continue;
            };
            if let Some(closer) = world.find_child(root, gates::AUTO_CLOSER) {
                let _ = world.set_active(closer, false);
            }
            if world.switch_state(root).is_some() {
                match world.set_switch_state(root, GATE_OPEN) {
                    Ok(()) => report.switches_set += 1,
                    Err(e) => trace!("switch {}: {}", gates::describe_path(path), e),
                }
            }
            report.obstructions_removed += sweep(world, root, &protected);
        }
        debug!(
            "opened {}: {} events, {} switches, {} obstructions, {} missing",
            region,
            report.events_fired,
            report.switches_set,
            report.obstructions_removed,
            report.missing.len()
        );
        report
    }

    /// Show or hide every object in a bucket. Stale handles are skipped.
    pub fn set_bucket_visible<W: SimWorld + ?Sized>(
        &mut self,
        world: &mut W,
        cache: &BucketCache,
        bucket: &str,
        visible: bool,
    ) -> BindReport {
        let mut report = BindReport::default();
        for &handle in cache.handles(bucket) {
            match set_object_visible(world, handle, visible) {
                Ok(()) if visible => report.objects_shown += 1,
                Ok(()) => report.objects_hidden += 1,
                Err(e) => {
                    let err = SyncError::TransientLookupFailure(format!("{} ({})", bucket, e));
                    debug!("{}", err);
                    report.missing.push(bucket.to_string());
                }
            }
        }
        if visible && report.missing.is_empty() {
            self.pending.remove(bucket);
        } else if !report.missing.is_empty() {
            self.pending.insert(bucket.to_string());
        }
        report
    }

    /// Re-apply all of `progression` to the world: hub passages, every open
    /// region, then soul visibility for every resolved bucket.
    pub fn resync<W: SimWorld + ?Sized>(
        &mut self,
        world: &mut W,
        cache: Option<&BucketCache>,
        progression: &ProgressionState,
    ) -> BindReport {
        metrics::inc_resync_passes();
        self.pending.clear();
        let mut report = BindReport::default();

        if !self.finale_active {
            for path in HUB_BLOCKERS {
                match world.find_by_path(path) {
                    Some(h) => {
                        if disable_obstruction(world, h) {
                            report.obstructions_removed += 1;
                        }
                    }
                    None => trace!("hub blocker {} not present", gates::describe_path(path)),
                }
            }
        }

        for region in Region::ALL {
            let unlocked = region
                .access_capability()
                .is_some_and(|cap| progression.is_set(cap));
            if unlocked {
                let opened = self.open_region(world, region, progression);
                report.merge(opened);
            }
        }

        if let Some(cache) = cache {
            let catalog = Catalog::global();
            let options = progression.options();
            let buckets: Vec<&'static str> = cache.bucket_names().collect();
            for bucket in buckets {
                let kind = catalog.kind_of(bucket).unwrap_or(CapabilityKind::PropSoul);
                let visible = !is_gated(bucket, kind, options) || progression.is_set(bucket);
                let applied = self.set_bucket_visible(world, cache, bucket, visible);
                report.merge(applied);
            }
        }

        info!(
            "resync: {} shown, {} hidden, {} obstructions removed, {} missing",
            report.objects_shown,
            report.objects_hidden,
            report.obstructions_removed,
            report.missing.len()
        );
        report
    }

    /// Close every gate except the preserved region's. Returns false if the
    /// lockdown was already active.
    pub fn start_finale<W: SimWorld + ?Sized>(&mut self, world: &mut W) -> bool {
        if self.finale_active {
            return false;
        }
        self.finale_active = true;
        info!("finale lockdown: only {} stays open", FINALE.preserved);

        for path in FINALE.lock_switches {
            if let Some(h) = world.find_by_path(path) {
                let _ = world.set_switch_state(h, GATE_OPEN);
            }
        }
        for path in FINALE.close_switches {
            let Some(h) = world.find_by_path(path) else {
                continue;
            };
            if let Some(closer) = world.find_child(h, gates::AUTO_CLOSER) {
                let _ = world.set_active(closer, true);
            }
            let _ = world.set_switch_state(h, GATE_CLOSED);
        }
        for path in FINALE.reblock {
            if let Some(h) = world.find_by_path(path) {
                let _ = world.set_active(h, true);
                let _ = world.set_colliders_enabled(h, true);
            }
        }
        true
    }

    fn note_missing(&mut self, report: &mut BindReport, path: &str) {
        debug!("{}", SyncError::TransientLookupFailure(path.to_string()));
        report.missing.push(path.to_string());
        self.pending.insert(path.to_string());
    }

    /// Blocker roots of other regions that are still locked.
    fn protected_roots<W: SimWorld + ?Sized>(
        &self,
        world: &W,
        opening: Region,
        progression: &ProgressionState,
    ) -> Vec<ObjectHandle> {
        Region::ALL
            .iter()
            .filter(|r| **r != opening)
            .filter(|r| {
                r.access_capability()
                    .is_some_and(|cap| !progression.is_set(cap))
            })
            .filter_map(|r| gate_for(*r))
            .flat_map(|g| g.blockers.iter())
            .filter_map(|p| world.find_by_path(p))
            .collect()
    }
}

fn set_object_visible<W: SimWorld + ?Sized>(
    world: &mut W,
    handle: ObjectHandle,
    visible: bool,
) -> Result<(), WorldError> {
    world.set_active(handle, visible)?;
    world.set_colliders_enabled(handle, visible)?;
    if visible {
        world.wake_body(handle)?;
    }
    Ok(())
}

/// Returns true if the object was still blocking.
fn disable_obstruction<W: SimWorld + ?Sized>(world: &mut W, handle: ObjectHandle) -> bool {
    let was_active = world.is_active(handle);
    let _ = world.set_colliders_enabled(handle, false);
    let _ = world.set_active(handle, false);
    was_active
}

/// Disable obstruction descendants of a gate switch. Hub-tagged names and
/// protected roots are left alone; an obstruction that contains a hub-tagged
/// descendant is descended into instead of disabled whole.
fn sweep<W: SimWorld + ?Sized>(
    world: &mut W,
    root: ObjectHandle,
    protected: &[ObjectHandle],
) -> usize {
    let mut removed = 0;
    for child in world.children(root) {
        if protected.contains(&child) {
            continue;
        }
        let lower = world.name(child).unwrap_or_default().to_lowercase();
        if lower.contains(ALWAYS_BLOCKING) {
            continue;
        }
        if !is_obstruction_name(&lower) {
            removed += sweep(world, child, protected);
            continue;
        }
        let holds_hub = descendants(world, child).into_iter().any(|d| {
            world
                .name(d)
                .is_some_and(|n| n.to_lowercase().contains(ALWAYS_BLOCKING))
        });
        if holds_hub {
            removed += sweep(world, child, protected);
        } else if disable_obstruction(world, child) {
            removed += 1;
        }
    }
    removed
}
