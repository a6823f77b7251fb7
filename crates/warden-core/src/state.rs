//! Engine state snapshot — the visible state produced after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::EngagementEvent;
use crate::types::{Position, SimTime};

/// Complete engine state built after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub platforms: Vec<PlatformView>,
    pub tracks: Vec<TrackView>,
    pub commitments: Vec<CommitmentView>,
    pub events: Vec<EngagementEvent>,
}

/// Guard posture of one platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformView {
    pub track_id: u32,
    pub team: u8,
    pub position: Position,
    pub guard_phase: GuardPhase,
    pub policy: TargetPolicy,
    pub burst_mode: bool,
    pub primary_target: Option<u32>,
    pub selected_weapon: Option<u32>,
    pub secondary_targets: Vec<u32>,
    pub fixed_weapon_solution: bool,
    pub request_extend: bool,
    pub request_disengage: bool,
    pub weapons: Vec<WeaponView>,
    pub sensors: Vec<SensorView>,
    pub bays: Vec<BayView>,
}

/// One weapon mount for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponView {
    pub mount_id: u32,
    pub group_id: u32,
    pub name: String,
    pub kind: WeaponKind,
    pub priority: u8,
    pub ammo: u32,
    pub reloading: bool,
    pub overheated: bool,
    pub mid_burst: bool,
}

/// Sensor enable/lock state for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorView {
    pub kind: SensorKind,
    pub enabled: bool,
    pub locked_tracks: Vec<u32>,
}

/// Bay door state for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayView {
    pub bay_id: u32,
    pub state: BayState,
    pub claims: u32,
}

/// A visible track.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackView {
    pub track_id: u32,
    pub team: u8,
    pub position: Position,
    pub speed: f64,
    pub heading: f64,
    pub class: Option<TargetClass>,
    pub is_missile: bool,
    pub engagement_count: u32,
}

/// One live commitment for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentView {
    pub commitment_id: u32,
    pub platform_track: u32,
    pub mount_id: u32,
    pub target_track: u32,
    pub kind: WeaponKind,
    /// Sequence phase rendered as text (phases differ per kind).
    pub phase: String,
}
