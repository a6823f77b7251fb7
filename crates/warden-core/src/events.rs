//! Events emitted by the engagement engine for the surrounding simulation.
//!
//! The core emits these; audio/visual playback is someone else's job.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Engagement events, one vector drained per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngagementEvent {
    /// Guard mode entered on a platform.
    GuardEngaged { platform_track: u32 },
    /// Guard mode left; turrets safed, slaving released.
    GuardDisengaged { platform_track: u32 },
    /// A scan pass committed a weapon to a target.
    WeaponCommitted {
        commitment_id: u32,
        mount_id: u32,
        target_track: u32,
        kind: WeaponKind,
    },
    /// A scan pass found no authorized weapon (normal hold-fire outcome).
    HoldFire { platform_track: u32 },
    /// A scan pass found no target at any tier.
    NoTarget { platform_track: u32 },
    /// Bay/rail opened for a launch sequence.
    BayOpened { bay_id: u32 },
    BayClosed { bay_id: u32 },
    /// Sensor lock acquired during a guided sequence.
    LockAcquired {
        sensor: SensorKind,
        target_track: u32,
    },
    /// Lock retries exhausted.
    LockFailed {
        sensor: SensorKind,
        target_track: u32,
    },
    /// Ordnance released.
    WeaponReleased {
        commitment_id: u32,
        kind: WeaponKind,
        target_track: u32,
        degraded: bool,
    },
    /// Autofire burst window opened on a direct-fire group.
    BurstStarted { group_id: u32, target_track: u32 },
    BurstEnded { group_id: u32 },
    /// Bomb run asked the autopilot to break off.
    BreakoffRequested { commitment_id: u32 },
    /// A commitment ended before release.
    CommitmentCancelled {
        commitment_id: u32,
        outcome: CommitmentOutcome,
    },
    /// Point defense assigned an interceptor to an inbound threat.
    PointDefenseAssigned {
        mount_id: u32,
        threat_track: u32,
    },
    /// Countermeasure salvo dispatched.
    CountermeasureDispatched {
        platform_track: u32,
        cm_type: CountermeasureType,
        threat_track: u32,
    },
    /// Missile threat newly detected; scan wait shortened.
    MissileWarning {
        platform_track: u32,
        threat_track: u32,
    },
}
