//! Enumeration types used throughout the engagement engine.

use serde::{Deserialize, Serialize};

/// The six weapon classes the inventory recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Gun,
    Rocket,
    DirectedEnergy,
    GuidedMissile,
    UnpoweredBomb,
    SubsurfaceWeapon,
}

/// Seeker/guidance cue of a guided round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingMode {
    #[default]
    None,
    Heat,
    RadarActive,
    RadarSemiActive,
    Laser,
    Satellite,
    Inertial,
    AntiEmission,
}

impl TargetingMode {
    /// The sensor that must be up before this mode can acquire, if any.
    pub fn required_sensor(&self) -> Option<SensorKind> {
        match self {
            TargetingMode::RadarActive | TargetingMode::RadarSemiActive => Some(SensorKind::Radar),
            TargetingMode::Heat => Some(SensorKind::Infrared),
            TargetingMode::Laser => Some(SensorKind::Laser),
            TargetingMode::None
            | TargetingMode::Satellite
            | TargetingMode::Inertial
            | TargetingMode::AntiEmission => None,
        }
    }
}

/// Onboard sensor subsystems the core issues status/command calls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Radar,
    Infrared,
    Laser,
    Sonar,
}

/// Broad target classification driving weapon-selection dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetClass {
    Air,
    Missile,
    Surface,
    Submerged,
}

/// Flavor of a subsurface weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsurfaceKind {
    DepthCharge,
    Torpedo,
}

/// Guard controller top-level state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardPhase {
    #[default]
    Disengaged,
    Engaging,
}

/// Target-selection policy applied at the configured-policy tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Nearest target, with hysteresis against flip-flopping.
    #[default]
    Nearest,
    /// Weighted multi-criteria priority score.
    WeightedScore,
    /// Target with the fewest friendly platforms already on it.
    LeastEngaged,
}

/// Countermeasure payload types, per dispenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountermeasureType {
    Flare,
    Chaff,
    Smoke,
    Decoy,
    Bubbles,
}

/// Weapon bay / launch rail door state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayState {
    #[default]
    Closed,
    Opening,
    Open,
}

/// Guided-missile firing sequence phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileSequencePhase {
    /// Waiting for the bay/rail to open and settle.
    OpeningBay,
    /// Bounded sensor-lock retry loop.
    AcquiringLock,
    /// Slewing a dedicated turret toward the lead point.
    SlewingTurret,
    /// Re-validating envelope and authorization before release.
    FinalValidation,
    /// Round released; awaiting bookkeeping.
    Released,
    Complete,
    Aborted,
}

/// Bomb-run sequence phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombRunPhase {
    /// Walking the coordinate-acquisition ladder while outside release range.
    AcquiringCoordinates,
    /// Tracking the closest-point-of-approach estimate inbound.
    Approach,
    /// Dropping rounds, capped per target.
    Releasing,
    /// Overshoot or roll inversion detected; asking the autopilot to break off.
    BreakoffRequested,
    Complete,
    Aborted,
}

/// Source that produced the bomb-run target coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSource {
    Database,
    Designator,
    RadarRanging,
}

/// Direct-fire turret burst sequence phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstPhase {
    /// Assigning and slewing mounts onto their targets.
    Aiming,
    /// Autofire burst window open.
    Firing,
    /// Post-burst cooldown before the mount may re-enter selection.
    Cooling,
    Complete,
    Aborted,
}

/// Why a commitment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentOutcome {
    /// Ordnance released as planned.
    Released,
    /// Guided shot degraded to unguided release after lock failure.
    DegradedRelease,
    /// Cancelled by target/weapon loss or mode change.
    Cancelled,
    /// Validation failed at the final check; nothing released.
    RefusedAtRelease,
}

/// Kind of a live fired-ordnance registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdnanceKind {
    Missile,
    Rocket,
    Projectile,
}
