//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Selection and sequencing logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// Marks an entity as a combat platform running the guard controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombatPlatform;

/// Links a subsystem entity (mount, sensor, bay, dispenser) to its platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aboard {
    pub platform_track: u32,
}

/// Platform motion regime, used by envelope and launch-window checks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlatformStatus {
    /// Parked on a surface with no appreciable motion.
    pub stationary: bool,
    /// In contact with a surface (landed or surfaced), as opposed to in flight.
    pub surface_contact: bool,
    /// Vacuum-like regime: skip the extrapolated time-to-effect check.
    pub in_vacuum: bool,
}

/// Role flags declaring what a mount may engage.
/// A mount with no declared role is implicitly eligible everywhere.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngageRoles {
    pub air: bool,
    pub missile: bool,
    pub surface: bool,
    pub subsurface: bool,
}

impl EngageRoles {
    pub fn declared(&self) -> bool {
        self.air || self.missile || self.surface || self.subsurface
    }

    pub fn eligible(&self, class: TargetClass) -> bool {
        if !self.declared() {
            return true;
        }
        match class {
            TargetClass::Air => self.air,
            TargetClass::Missile => self.missile,
            TargetClass::Surface => self.surface,
            TargetClass::Submerged => self.subsurface,
        }
    }
}

/// Ammunition, thermal, and crew state shared by every mount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStatus {
    pub ammo: u32,
    /// Remaining reload time; > 0 means the mount is reloading.
    pub reload_remaining_secs: f64,
    /// Heat fraction; at or above `OVERHEAT_THRESHOLD` the mount is overheated.
    pub heat: f64,
    pub crewed: bool,
    /// True while an autofire burst window is open on this mount.
    pub mid_burst: bool,
}

impl Default for WeaponStatus {
    fn default() -> Self {
        Self {
            ammo: 0,
            reload_remaining_secs: 0.0,
            heat: 0.0,
            crewed: true,
            mid_burst: false,
        }
    }
}

impl WeaponStatus {
    pub fn overheated(&self) -> bool {
        self.heat >= crate::constants::OVERHEAT_THRESHOLD
    }

    pub fn reloading(&self) -> bool {
        self.reload_remaining_secs > 0.0
    }
}

/// Ballistic gun parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GunSpec {
    pub rate_of_fire_rpm: f64,
    pub caliber_mm: f64,
    pub muzzle_velocity_mps: f64,
    pub blast_radius_m: f64,
    pub proximity_fuze: bool,
    pub projectiles_per_shot: u32,
}

/// Unguided rocket parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocketSpec {
    pub rate_of_fire_rpm: f64,
    pub velocity_mps: f64,
    pub blast_radius_m: f64,
    pub proximity_fuze: bool,
    pub rockets_per_salvo: u32,
}

/// Directed-energy weapon parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamSpec {
    /// Electro-optical dazzlers are excluded from anti-missile work.
    pub electro_optical: bool,
    pub power_kw: f64,
}

/// Guided missile parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissileSpec {
    pub targeting_mode: TargetingMode,
    /// Shooter must be at or above this speed to launch (m/s).
    pub min_launch_speed: f64,
    /// Airframe maneuverability in g, drives the anti-missile fitness term.
    pub maneuverability_g: f64,
    pub blast_radius_m: f64,
    pub yield_kg: f64,
    /// Characteristic time from release to effect (seconds).
    pub time_to_effect_secs: f64,
    /// Physical bay/rail this round launches from, if enclosed.
    pub bay_id: Option<u32>,
    /// Cap on simultaneous rounds of this type against one target.
    pub max_on_target: u32,
}

/// Unpowered bomb parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BombSpec {
    pub yield_kg: f64,
    pub submunitions: bool,
    pub guided: bool,
    /// Slant release range (meters).
    pub release_range_m: f64,
    pub max_per_target: u32,
    pub bay_id: Option<u32>,
}

/// Depth charge / torpedo parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsurfaceSpec {
    pub kind: SubsurfaceKind,
    /// Torpedoes may not be armed inside this range (meters).
    pub min_safe_blast_range_m: f64,
    /// Maximum effective depth for depth charges (meters, positive down).
    pub max_depth_m: f64,
}

/// Closed sum over the six weapon kinds. Every mount carries exactly one variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WeaponSpec {
    Gun(GunSpec),
    Rocket(RocketSpec),
    DirectedEnergy(BeamSpec),
    GuidedMissile(MissileSpec),
    UnpoweredBomb(BombSpec),
    Subsurface(SubsurfaceSpec),
}

impl WeaponSpec {
    pub fn kind(&self) -> WeaponKind {
        match self {
            WeaponSpec::Gun(_) => WeaponKind::Gun,
            WeaponSpec::Rocket(_) => WeaponKind::Rocket,
            WeaponSpec::DirectedEnergy(_) => WeaponKind::DirectedEnergy,
            WeaponSpec::GuidedMissile(_) => WeaponKind::GuidedMissile,
            WeaponSpec::UnpoweredBomb(_) => WeaponKind::UnpoweredBomb,
            WeaponSpec::Subsurface(_) => WeaponKind::SubsurfaceWeapon,
        }
    }

    pub fn as_missile(&self) -> Option<&MissileSpec> {
        match self {
            WeaponSpec::GuidedMissile(m) => Some(m),
            _ => None,
        }
    }
}

/// Turret traverse envelope and current aim for turreted mounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretMount {
    /// Installed facing relative to platform heading (degrees, clockwise).
    pub mount_bearing_deg: f64,
    /// Traverse half-angle either side of the mount bearing (degrees).
    pub yaw_limit_deg: f64,
    pub pitch_limit_deg: f64,
    pub slew_rate_deg_s: f64,
    /// Current aim offset from the mount bearing (degrees).
    pub aim_offset_deg: f64,
    pub aim_elevation_deg: f64,
    /// Track this turret is slaved to, if any.
    pub slaved_to_track: Option<u32>,
}

impl TurretMount {
    /// Whether a bearing offset (degrees from mount bearing) is inside traverse,
    /// widened by `tolerance_deg`.
    pub fn within_traverse(&self, offset_deg: f64, elevation_deg: f64, tolerance_deg: f64) -> bool {
        offset_deg.abs() <= self.yaw_limit_deg + tolerance_deg
            && elevation_deg.abs() <= self.pitch_limit_deg + tolerance_deg
    }
}

/// One weapon mount on a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponMount {
    pub mount_id: u32,
    /// Group id assigned on inventory rescan; mounts sharing name and
    /// engagement parameters share a group and ripple together.
    pub group_id: u32,
    pub name: String,
    /// Operator priority rank: strictly higher always wins selection.
    pub priority: u8,
    pub roles: EngageRoles,
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub status: WeaponStatus,
    pub spec: WeaponSpec,
    pub turret: Option<TurretMount>,
}

impl WeaponMount {
    pub fn kind(&self) -> WeaponKind {
        self.spec.kind()
    }

    /// Whether this mount can hold a commitment (missile-capable kinds).
    pub fn commitment_exclusive(&self) -> bool {
        matches!(
            self.kind(),
            WeaponKind::GuidedMissile | WeaponKind::UnpoweredBomb | WeaponKind::SubsurfaceWeapon
        )
    }
}

/// Per-platform engagement count on a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlatformCount {
    pub platform_track: u32,
    pub count: u32,
}

/// Per-platform detection record on a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub platform_track: u32,
    pub last_detected_tick: u64,
}

/// Track data for any combat entity (platform, target, or live ordnance).
/// Owned by the world registry; the engine mutates only the per-platform fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetTrack {
    pub track_id: u32,
    pub team: u8,
    pub airborne: bool,
    /// Landed or surfaced (in contact with a surface).
    pub surfaced: bool,
    pub submerged: bool,
    pub is_missile: bool,
    /// Per-engaging-platform detection records.
    pub detected_by: Vec<DetectionRecord>,
    /// Per-engaging-platform engagement counters.
    pub engaged_by: Vec<PlatformCount>,
    // --- weighted-priority metadata ---
    pub mass_t: f64,
    pub weapon_count: u32,
    /// Fraction of the target already destroyed, 0..1.
    pub damage_fraction: f64,
    pub threat_rating: f64,
    pub vip: bool,
}

impl TargetTrack {
    pub fn classify(&self) -> TargetClass {
        if self.is_missile {
            TargetClass::Missile
        } else if self.submerged {
            TargetClass::Submerged
        } else if self.airborne {
            TargetClass::Air
        } else {
            TargetClass::Surface
        }
    }

    /// Total engagements across all platforms.
    pub fn engagement_count(&self) -> u32 {
        self.engaged_by.iter().map(|e| e.count).sum()
    }

    pub fn engagement_count_for(&self, platform_track: u32) -> u32 {
        self.engaged_by
            .iter()
            .find(|e| e.platform_track == platform_track)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    pub fn detected_by(&self, platform_track: u32) -> bool {
        self.detected_by
            .iter()
            .any(|d| d.platform_track == platform_track)
    }
}

/// A sensor subsystem on a platform. Detection physics live outside the core;
/// this component only carries enable/lock state the engine commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub kind: SensorKind,
    pub enabled: bool,
    pub max_locks: u8,
    /// Tracks currently locked, oldest first.
    pub locked_tracks: Vec<u32>,
}

impl Sensor {
    pub fn locked(&self) -> bool {
        !self.locked_tracks.is_empty()
    }

    pub fn locked_on(&self, track_id: u32) -> bool {
        self.locked_tracks.contains(&track_id)
    }
}

/// Laser designator head: slew-toward-point is a multi-tick operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Designator {
    pub slew_target: Option<Position>,
    pub slew_remaining_secs: f64,
    /// Point currently painted, if the slew has converged.
    pub painted: Option<Position>,
    pub locked: bool,
}

/// A physical weapon bay or launch rail door. Open state is refcounted so it
/// closes idempotently once no in-flight routine needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayDoor {
    pub bay_id: u32,
    pub state: BayState,
    pub settle_remaining_secs: f64,
    /// Number of live routines holding this bay open.
    pub claims: u32,
}

/// One countermeasure dispenser aboard a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountermeasureDispenser {
    pub cm_type: CountermeasureType,
    pub rounds: u32,
    /// Higher-priority dispensers are preferred when several match a threat.
    pub priority: u8,
    pub cooldown_remaining_secs: f64,
}

/// Registry entry for a live fired weapon/projectile, enumerable by team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiredOrdnance {
    pub team: u8,
    pub kind: OrdnanceKind,
    /// Track id of the launching platform.
    pub origin_track: u32,
    /// Track id this round is homing on, if known.
    pub aimed_at_track: Option<u32>,
    /// Seeker type, for countermeasure matching.
    pub seeker: TargetingMode,
}

/// Countermeasure-in-flight flags, one per payload type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CountermeasureFlags {
    pub flare: bool,
    pub chaff: bool,
    pub smoke: bool,
    pub decoy: bool,
    pub bubbles: bool,
}

impl CountermeasureFlags {
    pub fn get(&self, cm: CountermeasureType) -> bool {
        match cm {
            CountermeasureType::Flare => self.flare,
            CountermeasureType::Chaff => self.chaff,
            CountermeasureType::Smoke => self.smoke,
            CountermeasureType::Decoy => self.decoy,
            CountermeasureType::Bubbles => self.bubbles,
        }
    }

    pub fn set(&mut self, cm: CountermeasureType, value: bool) {
        match cm {
            CountermeasureType::Flare => self.flare = value,
            CountermeasureType::Chaff => self.chaff = value,
            CountermeasureType::Smoke => self.smoke = value,
            CountermeasureType::Decoy => self.decoy = value,
            CountermeasureType::Bubbles => self.bubbles = value,
        }
    }
}

/// Guard controller state bundle, one per platform.
/// Mutated only by the guard controller and the firing sequencers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardState {
    pub phase: GuardPhase,
    pub policy: TargetPolicy,
    pub burst_mode: bool,
    pub scan_remaining_secs: f64,
    /// Set when a missile threat was newly detected this tick; shortens the scan wait.
    pub missile_warning: bool,
    pub primary_target: Option<u32>,
    pub selected_weapon: Option<u32>,
    pub secondary_targets: Vec<u32>,
    /// Operator override target with expiry.
    pub override_target: Option<u32>,
    pub override_deadline_tick: u64,
    /// Set by the inventory rescan when anti-emission ordnance is aboard.
    pub has_anti_emission: bool,
    pub cm_in_flight: CountermeasureFlags,
    /// Point-defense sub-loop timer, independent of the scan timer.
    pub point_defense_remaining_secs: f64,
    // --- autopilot-facing flags ---
    pub fixed_weapon_solution: bool,
    pub request_extend: bool,
    pub request_disengage: bool,
}

impl Default for GuardState {
    fn default() -> Self {
        Self {
            phase: GuardPhase::Disengaged,
            policy: TargetPolicy::default(),
            burst_mode: false,
            scan_remaining_secs: 0.0,
            missile_warning: false,
            primary_target: None,
            selected_weapon: None,
            secondary_targets: Vec::new(),
            override_target: None,
            override_deadline_tick: 0,
            has_anti_emission: false,
            cm_in_flight: CountermeasureFlags::default(),
            point_defense_remaining_secs: 0.0,
            fixed_weapon_solution: false,
            request_extend: false,
            request_disengage: false,
        }
    }
}
