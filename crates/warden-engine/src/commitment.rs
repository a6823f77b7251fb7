//! Commitment data model — the lifecycle of one weapon committed to one
//! target.
//!
//! Stored in `GuardEngine`'s commitment map, NOT as ECS entities. Each
//! commitment owns a per-kind routine state machine that the sequencer
//! systems advance one tick at a time; every suspension point re-checks
//! the cancellation guards before proceeding.

use warden_core::enums::{
    BombRunPhase, BurstPhase, CommitmentOutcome, CoordinateSource, MissileSequencePhase, WeaponKind,
};
use warden_core::types::Position;

/// One weapon mount committed to one target.
#[derive(Debug, Clone)]
pub struct Commitment {
    pub id: u32,
    pub platform_track: u32,
    pub mount_id: u32,
    pub target_track: u32,
    pub kind: WeaponKind,
    /// Tick the commitment was created.
    pub start_tick: u64,
    /// Tick the routine reached a terminal phase, for retirement timing.
    pub finished_tick: Option<u64>,
    pub outcome: Option<CommitmentOutcome>,
    pub routine: Routine,
}

impl Commitment {
    pub fn finished(&self) -> bool {
        self.finished_tick.is_some()
    }

    /// Sequence phase rendered as text for the snapshot view.
    pub fn phase_name(&self) -> String {
        match &self.routine {
            Routine::Missile(r) => format!("{:?}", r.phase),
            Routine::BombRun(r) => format!("{:?}", r.phase),
            Routine::Burst(r) => format!("{:?}", r.phase),
        }
    }
}

/// Per-kind routine state. Guided missiles, bomb runs, and direct-fire
/// bursts advance through different phase sets.
#[derive(Debug, Clone)]
pub enum Routine {
    Missile(MissileRoutine),
    BombRun(BombRoutine),
    Burst(BurstRoutine),
}

/// Guided-missile firing sequence state.
#[derive(Debug, Clone)]
pub struct MissileRoutine {
    pub phase: MissileSequencePhase,
    /// Bay this routine holds a claim on, if the round is enclosed.
    pub bay_id: Option<u32>,
    pub bay_claimed: bool,
    /// Generic wait timer for the current phase (settle, retry interval).
    pub wait_remaining_secs: f64,
    pub lock_attempts: u32,
    pub lock_acquired: bool,
    /// Degraded unguided release armed after lock exhaustion.
    pub degraded: bool,
    pub slew_elapsed_secs: f64,
}

impl MissileRoutine {
    pub fn new(bay_id: Option<u32>) -> Self {
        Self {
            phase: MissileSequencePhase::OpeningBay,
            bay_id,
            bay_claimed: false,
            wait_remaining_secs: 0.0,
            lock_attempts: 0,
            lock_acquired: false,
            degraded: false,
            slew_elapsed_secs: 0.0,
        }
    }
}

/// Bomb-run sequence state.
#[derive(Debug, Clone)]
pub struct BombRoutine {
    pub phase: BombRunPhase,
    pub bay_id: Option<u32>,
    pub bay_claimed: bool,
    /// Ground coordinates once acquired.
    pub coordinates: Option<Position>,
    pub source: Option<CoordinateSource>,
    pub wait_remaining_secs: f64,
    pub released: u32,
    /// Last slant distance to the coordinates, for the overshoot latch.
    pub last_slant_m: f64,
    /// Consecutive ticks the slant distance grew. Two in a row means the
    /// run overshot and the autopilot should break off.
    pub slant_increases: u32,
}

impl BombRoutine {
    pub fn new(bay_id: Option<u32>) -> Self {
        Self {
            phase: BombRunPhase::AcquiringCoordinates,
            bay_id,
            bay_claimed: false,
            coordinates: None,
            source: None,
            wait_remaining_secs: 0.0,
            released: 0,
            last_slant_m: f64::MAX,
            slant_increases: 0,
        }
    }
}

/// Direct-fire turret burst state.
#[derive(Debug, Clone)]
pub struct BurstRoutine {
    pub phase: BurstPhase,
    pub group_id: u32,
    pub window_remaining_secs: f64,
    pub slew_elapsed_secs: f64,
    /// Fractional rounds accumulated at the mount's rate of fire.
    pub rounds_accum: f64,
    /// (mount, target) pairings for the whole firing group, planned at the
    /// top of the aiming phase.
    pub assignments: Vec<(u32, u32)>,
}

impl BurstRoutine {
    pub fn new(group_id: u32) -> Self {
        Self {
            phase: BurstPhase::Aiming,
            group_id,
            window_remaining_secs: 0.0,
            slew_elapsed_secs: 0.0,
            rounds_accum: 0.0,
            assignments: Vec::new(),
        }
    }
}
