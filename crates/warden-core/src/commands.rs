//! Operator commands sent into the engagement engine.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All operator actions the engine accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorCommand {
    // --- Guard mode ---
    /// Toggle autonomous guard mode on a platform.
    ToggleGuardMode { platform_track: u32 },
    /// Set the target-selection policy.
    SetTargetPolicy {
        platform_track: u32,
        policy: TargetPolicy,
    },
    /// Toggle burst-fire mode for direct-fire groups.
    ToggleBurstMode { platform_track: u32 },

    // --- Manual engagement ---
    /// Fire the currently selected weapon at the primary target.
    Fire { platform_track: u32 },
    /// Cycle the selected weapon to the next group in the inventory.
    CycleWeapon { platform_track: u32 },
    /// Pin a target for `TARGET_OVERRIDE_DURATION`, bypassing the tier ladder.
    OverrideTarget {
        platform_track: u32,
        target_track: u32,
    },
    /// Manually dispatch a countermeasure salvo.
    DropCountermeasure {
        platform_track: u32,
        cm_type: CountermeasureType,
    },

    // --- Simulation control ---
    Pause,
    Resume,
}
