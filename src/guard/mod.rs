//! Region access checks ahead of the simulation's own area transition.
//!
//! [`AccessGuard::decide`] is a pure function of [`ProgressionState`]; the
//! teleport and notice on a block are applied by the session coordinator.

use crate::catalog::Region;
use crate::progression::ProgressionState;
use crate::world::Vec3;

/// Where a blocked player is sent: the well in the hub.
pub const SAFE_POINT: Vec3 = Vec3::new(1.0, 1.5, -1.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Allowed,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Blocked {
        region: Region,
        capability: &'static str,
    },
}

impl GuardDecision {
    pub fn state(&self) -> GuardState {
        match self {
            GuardDecision::Allowed => GuardState::Allowed,
            GuardDecision::Blocked { .. } => GuardState::Blocked,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.state() == GuardState::Allowed
    }

    /// User-facing text for a block.
    pub fn notice(&self) -> Option<String> {
        match self {
            GuardDecision::Allowed => None,
            GuardDecision::Blocked { capability, .. } => {
                Some(format!("You need {} to enter!", capability))
            }
        }
    }
}

pub struct AccessGuard;

impl AccessGuard {
    pub fn decide(region: Region, progression: &ProgressionState) -> GuardDecision {
        match region.access_capability() {
            Some(capability) if !progression.is_set(capability) => GuardDecision::Blocked {
                region,
                capability,
            },
            _ => GuardDecision::Allowed,
        }
    }

    /// Decide for an area-entry switch event. `None` if the event is not a
    /// region transition.
    pub fn decide_event(event: &str, progression: &ProgressionState) -> Option<GuardDecision> {
        Region::from_transition_event(event).map(|r| Self::decide(r, progression))
    }
}
