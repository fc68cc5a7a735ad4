//! # Session Coordinator
//!
//! Owns one slot's session end to end and is driven entirely from the host's
//! update tick:
//!
//! ```text
//! link inbox -> tick() -> ProgressionState -> WorldBinder -> SimWorld
//!                              ^
//!            AccessGuard ------+  (consulted on every region transition)
//! ```
//!
//! ## Session identity
//!
//! [`SessionCoordinator::begin_session`] compares the requested
//! [`SessionIdentity`] against the persisted one. The same slot reloads its
//! progression; anything else wipes persisted and in-memory state before a
//! single new message is accepted.
//!
//! ## Resync
//!
//! A full resync runs when a session begins, whenever the scene generation
//! changes, and on a bounded retry schedule after the handshake, since the
//! scene may still be initializing when the server answers.

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::binder::{BindReport, WorldBinder};
use crate::catalog::{Catalog, CapabilityDef, Region, UnlockAction, PROGRESSIVE_AREA};
use crate::effects::{EffectDurations, EffectTimers, EffectsSnapshot};
use crate::errors::SyncError;
use crate::guard::{AccessGuard, GuardDecision, SAFE_POINT};
use crate::link::{Link, LinkStatus};
use crate::logutil::escape_log;
use crate::metrics;
use crate::progression::{ProgressionState, SessionIdentity, SlotOptions};
use crate::protocol::{self, ClientPacket, NetworkItem, ProtocolError, ServerPacket};
use crate::resolver::{BucketCache, EntityResolver};
use crate::storage::KvStore;
use crate::world::SimWorld;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Wait after `Connected` before the first scheduled resync.
    pub resync_delay: Duration,
    pub resync_attempts: u32,
    pub resync_interval: Duration,
    pub death_link: bool,
    pub message_log_size: usize,
    pub effects: EffectDurations,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            resync_delay: Duration::from_secs(2),
            resync_attempts: 5,
            resync_interval: Duration::from_secs(2),
            death_link: false,
            message_log_size: 20,
            effects: EffectDurations::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoSession,
    ConnectingSameSlot,
    ConnectingNewSlot,
    Connected,
}

/// Outbox for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CapabilityUnlocked { capability: String, item_id: i64 },
    Notice(String),
    StatusChanged(String),
    RegionBlocked { region: Region, capability: &'static str },
}

#[derive(Debug, Clone, Copy)]
struct ResyncSchedule {
    next_in: Duration,
    remaining: u32,
}

pub struct SessionCoordinator<S: KvStore, L: Link> {
    settings: SessionSettings,
    store: S,
    link: Option<L>,
    identity: Option<SessionIdentity>,
    phase: SessionPhase,
    status: String,
    progression: ProgressionState,
    resolver: EntityResolver,
    cache: Option<BucketCache>,
    binder: WorldBinder,
    effects: EffectTimers,
    /// Item stream positions handled on the current connection.
    seen_positions: BTreeSet<u64>,
    resync_requested: bool,
    schedule: Option<ResyncSchedule>,
    goal_pending: bool,
    death_pending: Option<String>,
    messages: VecDeque<String>,
    events: Vec<SessionEvent>,
}

impl<S: KvStore, L: Link> SessionCoordinator<S, L> {
    pub fn new(store: S, settings: SessionSettings) -> Self {
        let effects = EffectTimers::new(settings.effects);
        Self {
            settings,
            store,
            link: None,
            identity: None,
            phase: SessionPhase::NoSession,
            status: "Not connected".to_string(),
            progression: ProgressionState::new(),
            resolver: EntityResolver::new(),
            cache: None,
            binder: WorldBinder::new(),
            effects,
            seen_positions: BTreeSet::new(),
            resync_requested: false,
            schedule: None,
            goal_pending: false,
            death_pending: None,
            messages: VecDeque::new(),
            events: Vec::new(),
        }
    }

    /// Decide same-slot vs new-slot and prepare state before any message
    /// from the new connection is accepted.
    pub fn begin_session(&mut self, identity: SessionIdentity) -> Result<SessionPhase, SyncError> {
        let persisted = SessionIdentity::load(&self.store);
        self.seen_positions.clear();
        self.schedule = None;

        if persisted.as_ref() == Some(&identity) {
            self.progression = ProgressionState::load(&self.store);
            self.phase = SessionPhase::ConnectingSameSlot;
            info!("resuming {}", identity);
        } else {
            if let Some(old) = persisted {
                let err = SyncError::IdentityMismatch {
                    persisted: old.to_string(),
                    requested: identity.to_string(),
                };
                warn!("{}; wiping persisted progression", err);
            }
            let removed = ProgressionState::wipe_persisted(&mut self.store)?;
            debug!("wiped {} persisted keys", removed);
            self.progression.clear();
            self.effects.clear();
            self.binder.reset_finale();
            self.goal_pending = false;
            self.death_pending = None;
            identity.save(&mut self.store)?;
            self.progression.save(&mut self.store)?;
            self.phase = SessionPhase::ConnectingNewSlot;
            info!("new session {}", identity);
        }
        self.identity = Some(identity);
        self.resync_requested = true;
        Ok(self.phase)
    }

    /// Hand over a freshly connected link. The handshake continues on the tick.
    pub fn attach_link(&mut self, link: L) -> Result<(), SyncError> {
        if self.identity.is_none() {
            return Err(SyncError::NotConnected);
        }
        if let Some(mut old) = self.link.take() {
            old.disconnect();
        }
        self.link = Some(link);
        self.set_status("Connecting");
        Ok(())
    }

    /// Convenience for [`Self::begin_session`] followed by [`Self::attach_link`].
    pub fn connect(&mut self, identity: SessionIdentity, link: L) -> Result<SessionPhase, SyncError> {
        let phase = self.begin_session(identity)?;
        self.attach_link(link)?;
        Ok(phase)
    }

    /// User-initiated disconnect.
    pub fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.disconnect();
        }
        self.schedule = None;
        self.phase = SessionPhase::NoSession;
        self.set_status("Disconnected");
    }

    /// One update tick.
    pub fn tick<W: SimWorld + ?Sized>(&mut self, world: &mut W) {
        self.track_scene(world);
        self.drain_inbound(world);
        self.check_link(world);

        if world.is_scene_ready() {
            if self.resync_requested {
                self.resync_requested = false;
                self.run_resync(world);
            }
            self.advance_schedule(world);
            if let Some(source) = self.death_pending.take() {
                world.teleport_player(SAFE_POINT);
                self.notice(format!("DeathLink from {}", source));
            }
        }

        for text in self.effects.tick(world.delta_time()) {
            self.notice(text);
        }

        if self.progression.is_dirty() {
            if let Err(e) = self.progression.save(&mut self.store) {
                warn!("{}", SyncError::Storage(e));
            }
        }
    }

    fn drain_inbound<W: SimWorld + ?Sized>(&mut self, world: &mut W) {
        let frames = match self.link.as_mut() {
            Some(link) => link.poll_inbound(),
            None => return,
        };
        for frame in frames {
            let packets = match protocol::parse_frame(&frame) {
                Ok(p) => p,
                Err(e) => {
                    metrics::inc_frames_dropped();
                    warn!("{}", SyncError::ProtocolDesync(e));
                    continue;
                }
            };
            for packet in packets {
                match packet {
                    Ok(p) => self.handle_packet(world, p),
                    Err(e) => {
                        metrics::inc_frames_dropped();
                        warn!("{}", SyncError::ProtocolDesync(e));
                    }
                }
            }
        }
    }

    fn check_link<W: SimWorld + ?Sized>(&mut self, world: &mut W) {
        let closed = self
            .link
            .as_ref()
            .is_some_and(|l| l.status() == LinkStatus::Closed);
        if !closed {
            return;
        }
        // the reader may have queued its last lines after the tick drained the inbox
        self.drain_inbound(world);
        if self.link.is_none() {
            return;
        }
        warn!("{}", SyncError::ConnectionLost("remote closed".to_string()));
        if let Some(mut link) = self.link.take() {
            link.disconnect();
        }
        self.schedule = None;
        self.phase = SessionPhase::NoSession;
        self.set_status("Disconnected");
    }

    fn track_scene<W: SimWorld + ?Sized>(&mut self, world: &W) {
        if !world.is_scene_ready() {
            if self.cache.take().is_some() {
                debug!("scene not ready, dropping resolver cache");
            }
            return;
        }
        let generation = world.scene_generation();
        let stale = self
            .cache
            .as_ref()
            .map_or(true, |c| c.generation != generation);
        if stale {
            if self.cache.is_some() {
                self.binder.reset_finale();
            }
            let cache = self.resolver.scan(world);
            info!(
                "scene generation {}: {} objects in {} buckets, {} unmatched",
                generation,
                cache.entity_count(),
                cache.buckets.len(),
                cache.unmatched.len()
            );
            self.cache = Some(cache);
            self.resync_requested = true;
        }
    }

    fn advance_schedule<W: SimWorld + ?Sized>(&mut self, world: &mut W) {
        let Some(mut schedule) = self.schedule else {
            return;
        };
        schedule.next_in = schedule.next_in.saturating_sub(world.delta_time());
        if !schedule.next_in.is_zero() {
            self.schedule = Some(schedule);
            return;
        }
        self.run_resync(world);
        schedule.remaining = schedule.remaining.saturating_sub(1);
        self.schedule = if schedule.remaining == 0 {
            debug!("scheduled resyncs finished");
            None
        } else {
            schedule.next_in = self.settings.resync_interval;
            Some(schedule)
        };
    }

    fn run_resync<W: SimWorld + ?Sized>(&mut self, world: &mut W) -> BindReport {
        if self.cache.is_none() && world.is_scene_ready() {
            self.cache = Some(self.resolver.scan(world));
        }
        self.binder
            .resync(world, self.cache.as_ref(), &self.progression)
    }

    fn handle_packet<W: SimWorld + ?Sized>(&mut self, world: &mut W, packet: ServerPacket) {
        match packet {
            ServerPacket::RoomInfo { .. } => {
                let Some(creds) = self.link.as_ref().map(|l| l.credentials().clone()) else {
                    return;
                };
                let connect = ClientPacket::connect(
                    &creds.slot,
                    creds.password.as_deref(),
                    self.settings.death_link,
                );
                if let Err(e) = self.send(&connect) {
                    warn!("handshake: {}", e);
                }
            }
            ServerPacket::Connected {
                checked_locations,
                slot_data,
                ..
            } => self.on_connected(checked_locations, &slot_data),
            ServerPacket::ConnectionRefused { errors } => {
                warn!("connection refused: {}", escape_log(&errors.join(", ")));
                for error in &errors {
                    self.notice(format!("Connection refused: {}", error));
                }
                if let Some(mut link) = self.link.take() {
                    link.disconnect();
                }
                self.schedule = None;
                self.phase = SessionPhase::NoSession;
                self.set_status("Connection Refused");
            }
            ServerPacket::ReceivedItems { index, items } => {
                self.on_received_items(world, index, &items)
            }
            ServerPacket::RoomUpdate { checked_locations } => {
                for location in checked_locations {
                    self.progression.mark_location_sent(location);
                }
            }
            ServerPacket::PrintJson { data } => {
                let text: String = data.iter().map(|p| p.text.as_str()).collect();
                debug!("server: {}", escape_log(&text));
                self.push_message(text);
            }
            ServerPacket::Bounced { tags, data } => {
                if !self.settings.death_link || !protocol::is_death_link(&tags) {
                    return;
                }
                let source = data
                    .get("source")
                    .and_then(|v| v.as_str())
                    .unwrap_or("someone")
                    .to_string();
                let own = self.identity.as_ref().map(|i| i.slot.as_str());
                if own == Some(source.as_str()) {
                    return;
                }
                info!("death link from {}", escape_log(&source));
                self.death_pending = Some(source);
            }
            ServerPacket::Other => trace!("ignoring unhandled command"),
        }
    }

    fn on_connected(&mut self, checked: Vec<i64>, slot_data: &serde_json::Value) {
        self.phase = SessionPhase::Connected;
        self.seen_positions.clear();
        self.set_status("Connected");

        let server_has: BTreeSet<i64> = checked.iter().copied().collect();
        let unsent: Vec<i64> = self
            .progression
            .locations_sent()
            .filter(|l| !server_has.contains(l))
            .collect();
        for location in checked {
            self.progression.mark_location_sent(location);
        }

        let options = SlotOptions {
            npc_souls: protocol::slot_option(slot_data, "include_npc_souls"),
            prop_souls: protocol::slot_option(slot_data, "include_prop_souls"),
        };
        if options != self.progression.options() {
            self.progression.set_options(options);
            self.resync_requested = true;
        }

        if !unsent.is_empty() {
            info!("reporting {} locations recorded offline", unsent.len());
            let count = unsent.len();
            match self.send(&ClientPacket::LocationChecks { locations: unsent }) {
                Ok(()) => metrics::add_locations_sent(count),
                Err(e) => warn!("offline location sync: {}", e),
            }
        }
        if self.goal_pending && self.send(&ClientPacket::goal_complete()).is_ok() {
            self.goal_pending = false;
        }

        self.schedule = Some(ResyncSchedule {
            next_in: self.settings.resync_delay,
            remaining: self.settings.resync_attempts,
        });
    }

    fn on_received_items<W: SimWorld + ?Sized>(&mut self, world: &mut W, index: u64, items: &[NetworkItem]) {
        // positions are persisted as i64
        let in_range = index
            .checked_add(items.len() as u64)
            .is_some_and(|end| end <= i64::MAX as u64);
        if !in_range {
            metrics::inc_frames_dropped();
            warn!(
                "{}",
                SyncError::ProtocolDesync(ProtocolError::IndexOutOfRange {
                    index,
                    count: items.len(),
                })
            );
            return;
        }
        for (offset, item) in items.iter().enumerate() {
            let position = index + offset as u64;
            if !self.seen_positions.insert(position) {
                trace!("item position {} already handled", position);
                continue;
            }
            let replay = self.progression.is_replay(position);
            self.process_item(world, item.item, replay);
            self.progression.advance_items_applied(position);
        }
    }

    /// Apply one remote item. Replays only re-apply idempotent flags.
    fn process_item<W: SimWorld + ?Sized>(&mut self, world: &mut W, item_id: i64, replay: bool) {
        let catalog = Catalog::global();
        let Some(def) = catalog.capability_for_item(item_id).copied() else {
            metrics::inc_unknown_items();
            warn!("{}", SyncError::UnknownCapabilityId(item_id));
            return;
        };
        metrics::inc_items_applied();

        match def.action {
            UnlockAction::OpenRegion(_) | UnlockAction::RevealBucket | UnlockAction::Flag => {
                if self.progression.apply(def.id) {
                    self.bind(world, &def);
                    self.unlocked(&def, format!("Received {}!", def.id));
                }
            }
            UnlockAction::ProgressiveArea => {
                if replay {
                    return;
                }
                if self
                    .progression
                    .increment_counter(PROGRESSIVE_AREA, catalog.progressive_max())
                    .is_none()
                {
                    self.notice("All areas are already unlocked.".to_string());
                    return;
                }
                let next = (1..=catalog.progressive_max())
                    .filter_map(|n| catalog.progressive_region(n))
                    .find_map(|r| {
                        r.access_capability()
                            .filter(|cap| !self.progression.is_set(cap))
                    })
                    .and_then(|cap| catalog.capability(cap).copied());
                if let Some(area) = next {
                    self.progression.apply(area.id);
                    self.bind(world, &area);
                    self.unlocked(&area, format!("Progressive Area: {} unlocked!", area.id));
                }
            }
            UnlockAction::Counter { max } => {
                if replay {
                    return;
                }
                match self.progression.increment_counter(def.id, max) {
                    Some(level) => self.unlocked(&def, format!("{} level {}!", def.id, level)),
                    None => self.notice(format!("{} is already at max level.", def.id)),
                }
            }
            UnlockAction::Timed(effect) => {
                if replay {
                    return;
                }
                let text = self.effects.activate(effect);
                self.notice(text);
            }
            UnlockAction::Notice => {
                if !replay {
                    self.notice(format!("Received {}.", def.id));
                }
            }
        }
    }

    /// World side of a freshly set capability. Deferred to the next resync
    /// when the scene is not ready.
    fn bind<W: SimWorld + ?Sized>(&mut self, world: &mut W, def: &CapabilityDef) {
        if !world.is_scene_ready() {
            self.resync_requested = true;
            return;
        }
        let report = self
            .binder
            .apply_capability(world, self.cache.as_ref(), &self.progression, def);
        if !report.missing.is_empty() {
            debug!("{}: {} targets pending resync", def.id, report.missing.len());
        }
    }

    fn unlocked(&mut self, def: &CapabilityDef, text: String) {
        self.events.push(SessionEvent::CapabilityUnlocked {
            capability: def.id.to_string(),
            item_id: def.item_id,
        });
        self.notice(text);
    }

    /// Report a completed goal. Returns the locations newly recorded.
    pub fn on_goal_completed(&mut self, goal: &str) -> Vec<i64> {
        let catalog = Catalog::global();
        let mut recorded = Vec::new();
        match catalog.location_for_goal(goal) {
            Some(location) => {
                if self.check_location(location) {
                    recorded.push(location);
                }
            }
            None => debug!("goal {} has no location", escape_log(goal)),
        }
        let progression = &self.progression;
        let earned = catalog.earned_milestones(&|id| progression.has_location(id));
        for milestone in earned {
            if self.check_location(milestone) {
                recorded.push(milestone);
            }
        }
        if catalog.is_finale_goal(goal) {
            info!("finale goal complete");
            if self.send(&ClientPacket::goal_complete()).is_err() {
                self.goal_pending = true;
            }
        }
        recorded
    }

    pub fn on_item_picked_up(&mut self, raw_name: &str) -> Option<i64> {
        let location = Catalog::global().location_for_pickup(raw_name)?;
        self.check_location(location).then_some(location)
    }

    /// Record a location and report it if connected. At most once per location.
    pub fn check_location(&mut self, location: i64) -> bool {
        if !self.progression.mark_location_sent(location) {
            return false;
        }
        if self.phase == SessionPhase::Connected {
            match self.send(&ClientPacket::LocationChecks {
                locations: vec![location],
            }) {
                Ok(()) => metrics::add_locations_sent(1),
                Err(e) => debug!("location {} kept for reconnect: {}", location, e),
            }
        }
        true
    }

    pub fn on_finale_started<W: SimWorld + ?Sized>(&mut self, world: &mut W) -> bool {
        let started = self.binder.start_finale(world);
        if started {
            self.notice("The gates slam shut behind you!".to_string());
        }
        started
    }

    /// Guard a region transition. On a block the player is returned to the
    /// safe point and told which capability is missing.
    pub fn attempt_region_transition<W: SimWorld + ?Sized>(
        &mut self,
        world: &mut W,
        region: Region,
    ) -> GuardDecision {
        let decision = AccessGuard::decide(region, &self.progression);
        if let GuardDecision::Blocked { region, capability } = decision {
            let count = metrics::record_blocked_transition(region.display_name());
            debug!("blocked entry to {} ({} so far)", region, count);
            world.teleport_player(SAFE_POINT);
            self.events.push(SessionEvent::RegionBlocked { region, capability });
            if let Some(text) = decision.notice() {
                self.notice(text);
            }
        }
        decision
    }

    /// Area-entry switch events; anything else passes through as `None`.
    pub fn on_switch_event<W: SimWorld + ?Sized>(
        &mut self,
        world: &mut W,
        event: &str,
    ) -> Option<GuardDecision> {
        let region = Region::from_transition_event(event)?;
        Some(self.attempt_region_transition(world, region))
    }

    pub fn on_player_shooed(&mut self) -> bool {
        if !self.settings.death_link || self.phase != SessionPhase::Connected {
            return false;
        }
        let slot = self
            .identity
            .as_ref()
            .map(|i| i.slot.clone())
            .unwrap_or_default();
        let cause = format!("{} was shooed away.", slot);
        self.send(&ClientPacket::death_link(&slot, &cause)).is_ok()
    }

    /// Full resync right now, rescanning first if there is no cache.
    pub fn resync_now<W: SimWorld + ?Sized>(&mut self, world: &mut W) -> BindReport {
        self.run_resync(world)
    }

    /// Forget all progress for the current slot, persisted and in memory.
    pub fn reset_all_progress(&mut self) -> Result<(), SyncError> {
        ProgressionState::wipe_persisted(&mut self.store)?;
        self.progression.clear();
        self.effects.clear();
        self.binder.reset_finale();
        self.seen_positions.clear();
        self.goal_pending = false;
        if let Some(identity) = &self.identity {
            identity.save(&mut self.store)?;
        }
        self.progression.save(&mut self.store)?;
        self.resync_requested = true;
        self.notice("All progress has been reset.".to_string());
        Ok(())
    }

    fn send(&mut self, packet: &ClientPacket) -> Result<(), SyncError> {
        let link = self.link.as_mut().ok_or(SyncError::NotConnected)?;
        link.send(packet)
            .map_err(|e| SyncError::ConnectionLost(e.to_string()))
    }

    fn notice(&mut self, text: String) {
        info!("{}", escape_log(&text));
        self.push_message(text.clone());
        self.events.push(SessionEvent::Notice(text));
    }

    fn push_message(&mut self, text: String) {
        if self.settings.message_log_size == 0 {
            return;
        }
        while self.messages.len() >= self.settings.message_log_size {
            self.messages.pop_front();
        }
        self.messages.push_back(text);
    }

    fn set_status(&mut self, status: &str) {
        if self.status != status {
            info!("status: {}", status);
            self.status = status.to_string();
            self.events.push(SessionEvent::StatusChanged(self.status.clone()));
        }
    }

    pub fn effects(&self) -> EffectsSnapshot {
        self.effects.snapshot(&self.progression)
    }

    pub fn effect_timers(&self) -> &EffectTimers {
        &self.effects
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages.iter().map(String::as_str)
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn binder(&self) -> &WorldBinder {
        &self.binder
    }

    pub fn cache(&self) -> Option<&BucketCache> {
        self.cache.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn link(&self) -> Option<&L> {
        self.link.as_ref()
    }

    pub fn link_mut(&mut self) -> Option<&mut L> {
        self.link.as_mut()
    }

    pub fn is_resync_scheduled(&self) -> bool {
        self.schedule.is_some()
    }
}
