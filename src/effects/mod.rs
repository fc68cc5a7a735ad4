//! Timed traps and buffs, counted down on the update tick.
//!
//! Each effect has its own timer; re-receiving an active effect restarts it.
//! Persistent buffs (counters, Silent Steps) live in [`ProgressionState`] and
//! are only read here to build an [`EffectsSnapshot`] for the host.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, info};

use crate::progression::ProgressionState;

pub const SPEEDY_FEET: &str = "Speedy Feet";
pub const MEGA_HONK: &str = "Mega Honk";
pub const SILENT_STEPS: &str = "Silent Steps";

/// Speed bonus per Speedy Feet level.
const SPEED_PER_LEVEL: f32 = 0.15;
/// Movement multiplier while the Tired trap runs.
const TIRED_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimedEffect {
    Tired,
    Confused,
    Butterbeak,
    Suspicious,
    GooseDay,
}

impl TimedEffect {
    pub fn is_trap(&self) -> bool {
        !matches!(self, TimedEffect::GooseDay)
    }

    fn start_notice(&self, secs: u64) -> String {
        match self {
            TimedEffect::Tired => format!("TRAP: You feel very tired... ({}s)", secs),
            TimedEffect::Confused => format!("TRAP: Your feet are confused! ({}s)", secs),
            TimedEffect::Butterbeak => {
                format!("TRAP: Butterbeak! You might drop items! ({}s)", secs)
            }
            TimedEffect::Suspicious => format!("TRAP: NPCs are suspicious of you! ({}s)", secs),
            TimedEffect::GooseDay => format!("What a nice day to be a goose! ({}s)", secs),
        }
    }

    fn end_notice(&self) -> &'static str {
        if self.is_trap() {
            "Trap effects have worn off!"
        } else {
            "The nice day is over."
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectDurations {
    pub tired: Duration,
    pub confused: Duration,
    pub butterbeak: Duration,
    pub suspicious: Duration,
    pub goose_day: Duration,
}

impl Default for EffectDurations {
    fn default() -> Self {
        Self {
            tired: Duration::from_secs(60),
            confused: Duration::from_secs(60),
            butterbeak: Duration::from_secs(60),
            suspicious: Duration::from_secs(30),
            goose_day: Duration::from_secs(60),
        }
    }
}

impl EffectDurations {
    pub fn for_effect(&self, effect: TimedEffect) -> Duration {
        match effect {
            TimedEffect::Tired => self.tired,
            TimedEffect::Confused => self.confused,
            TimedEffect::Butterbeak => self.butterbeak,
            TimedEffect::Suspicious => self.suspicious,
            TimedEffect::GooseDay => self.goose_day,
        }
    }
}

/// What the host should currently apply to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsSnapshot {
    pub speed_multiplier: f32,
    pub silent: bool,
    pub mega_honk_level: u32,
    pub active: Vec<TimedEffect>,
}

#[derive(Debug, Default)]
pub struct EffectTimers {
    durations: EffectDurations,
    active: BTreeMap<TimedEffect, Duration>,
}

impl EffectTimers {
    pub fn new(durations: EffectDurations) -> Self {
        Self {
            durations,
            active: BTreeMap::new(),
        }
    }

    /// Start (or restart) an effect. Returns the user-facing notice.
    pub fn activate(&mut self, effect: TimedEffect) -> String {
        let duration = self.durations.for_effect(effect);
        self.active.insert(effect, duration);
        info!("effect {:?} active for {:?}", effect, duration);
        effect.start_notice(duration.as_secs())
    }

    /// Advance all timers. Returns notices for effects that ran out, one per
    /// distinct notice text.
    pub fn tick(&mut self, dt: Duration) -> Vec<String> {
        let mut expired = Vec::new();
        self.active.retain(|effect, remaining| {
            *remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                expired.push(*effect);
                false
            } else {
                true
            }
        });
        let mut notices: Vec<String> = Vec::new();
        for effect in expired {
            debug!("effect {:?} expired", effect);
            let text = effect.end_notice().to_string();
            if !notices.contains(&text) {
                notices.push(text);
            }
        }
        notices
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.active.contains_key(&effect)
    }

    pub fn remaining(&self, effect: TimedEffect) -> Option<Duration> {
        self.active.get(&effect).copied()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn snapshot(&self, progression: &ProgressionState) -> EffectsSnapshot {
        let speedy = progression.counter(SPEEDY_FEET);
        let mut speed = 1.0 + SPEED_PER_LEVEL * speedy as f32;
        if self.is_active(TimedEffect::Tired) {
            speed *= TIRED_FACTOR;
        }
        EffectsSnapshot {
            speed_multiplier: speed,
            silent: progression.is_set(SILENT_STEPS),
            mega_honk_level: progression.counter(MEGA_HONK),
            active: self.active.keys().copied().collect(),
        }
    }
}
