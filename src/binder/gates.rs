//! Declarative region gate data. Paths are `/`-separated scene hierarchy paths.

use crate::catalog::Region;

/// Everything needed to open one region.
#[derive(Debug)]
pub struct GateDescriptor {
    pub region: Region,
    /// Fired in order when the region opens.
    pub events: &'static [&'static str],
    /// Gate switch roots: autoCloser disabled, state set to open, subtree swept.
    pub switches: &'static [&'static str],
    /// Obstructions removed outright.
    pub blockers: &'static [&'static str],
}

/// Terminal lockdown data.
#[derive(Debug)]
pub struct FinaleDescriptor {
    /// The one region whose gate stays open.
    pub preserved: Region,
    /// Switched to the locked state.
    pub lock_switches: &'static [&'static str],
    /// autoCloser re-enabled and state set to closed.
    pub close_switches: &'static [&'static str],
    /// Obstructions re-activated with collision.
    pub reblock: &'static [&'static str],
}

pub const GATE_OPEN: i32 = 1;
pub const GATE_CLOSED: i32 = 0;
pub const AUTO_CLOSER: &str = "autoCloser";

const HALL_TO_HUB: &str = "overworldStatic/GROUP_Hub/HallToHubGateSystem";

pub const GATES: &[GateDescriptor] = &[
    GateDescriptor {
        region: Region::HighStreet,
        events: &["unlockHighStreet", "openHighStreet"],
        switches: &[
            "gardenDynamic/GROUP_Hammering/gateTall/gateTallOpenSystem",
            "overworldStatic/GROUP_Hub/HallToHubGateSystem/HallToHubGateMainSystem",
            "overworldStatic/GROUP_Hub/HallToHubGateSystem/HallToHubGateLockSystem",
        ],
        blockers: &[
            "gardenDynamic/GROUP_Hammering/InvisibleWall",
            "gardenDynamic/GROUP_Hammering/gateTall/GateExtraColliders",
        ],
    },
    GateDescriptor {
        region: Region::BackGardens,
        events: &["unlockBackyards", "openBackyards"],
        switches: &["highStreetDynamic/GROUP_Garage/irongate/GateSystem"],
        blockers: &[
            "highStreetDynamic/GROUP_Garage/InvisibleWall",
            "highStreetDynamic/GROUP_Garage/irongate/GateSystem/GateExtraColliders",
        ],
    },
    GateDescriptor {
        region: Region::Pub,
        events: &["unlockPub", "openPub"],
        switches: &[
            "pubDynamic/GROUP_pubItems/PubGateSystem",
            "overworldStatic/GROUP_BackyardToPub/SluiceGateSystem",
            "overworldStatic/GROUP_Hub/PubToHubGateSystem",
        ],
        blockers: &[
            "overworldStatic/GROUP_BackyardToPub/InvisibleWall",
            "overworldStatic/GROUP_BackyardToPub/SluiceGateSystem/InvisibleWall",
            "pubDynamic/GROUP_pubItems/PubGateSystem/GateExtraColliders",
        ],
    },
    GateDescriptor {
        region: Region::ModelVillage,
        events: &["unlockFinale", "openFinale"],
        switches: &[
            "pubDynamic/GROUP_BucketOnHead/binSkip_openable/switchSystem",
            "pubDynamic/GROUP_BucketOnHead/PubToFinaleGateSystem",
            "pubDynamic/GROUP_BucketOnHead/PubToFinaleGateSystem/gate",
            "pubDynamic/GROUP_BucketOnHead/PubToFinaleGateSystem/gate/gateMetal",
            "overworldStatic/GROUP_ParkToPub/FinaleToParkGateSystem",
        ],
        blockers: &[
            "pubDynamic/GROUP_BucketOnHead/InvisibleWall",
            "pubDynamic/GROUP_BucketOnHead/PubToFinaleGateSystem/GateExtraColliders",
        ],
    },
];

/// Hub boundary colliders. The hub is never gated, so these are removed on
/// every resync until the finale starts.
pub const HUB_BLOCKERS: &[&str] = &[
    "highStreetDynamic/GROUP_Garage/irongate/GateSystem/GateExtraColliders/AlleyHubGateExtraCollider",
    "highStreetDynamic/GROUP_Garage/irongate/GateSystem/GateExtraColliders/ParkHubGateExtraCollider",
    "overworldStatic/GROUP_Hub/HallToHubGateSystem/gateFrame/colllidersNegScalingFlipped",
    "overworldStatic/GROUP_Hub/HallToHubGateSystem/gateFrame",
    "overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem/gateFrame",
    "overworldStatic/GROUP_Hub/PubToHubGateSystem/gateFrame",
];

pub const FINALE: FinaleDescriptor = FinaleDescriptor {
    preserved: Region::Pub,
    lock_switches: &[
        "overworldStatic/GROUP_Hub/HallToHubGateSystem/HallToHubGateLockSystem",
        "overworldStatic/GROUP_Hub/HubGateSystem/HubGateLockSystem",
    ],
    close_switches: &[
        "overworldStatic/GROUP_Hub/HallToHubGateSystem/HallToHubGateMainSystem",
        "overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem",
    ],
    reblock: &[
        "overworldStatic/GROUP_Hub/HallToHubGateSystem/gateFrame/colllidersNegScalingFlipped",
        "overworldStatic/GROUP_Hub/HallToHubGateSystem/gateFrame",
        "overworldStatic/GROUP_Hub/HubGateSystem/HubGateMainSystem/gateFrame",
    ],
};

pub fn gate_for(region: Region) -> Option<&'static GateDescriptor> {
    GATES.iter().find(|g| g.region == region)
}

/// Root of the gate system a hub path hangs off, used in log lines.
pub fn describe_path(path: &str) -> &str {
    if path.starts_with(HALL_TO_HUB) {
        "hall-to-hub"
    } else {
        path.rsplit('/').next().unwrap_or(path)
    }
}
