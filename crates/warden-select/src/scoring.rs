//! Per-kind fitness scoring for weapon selection, and the weighted target
//! priority score used by the target selector's configured-policy tier.
//!
//! `score_candidate` is a total match over the weapon-kind sum type: every
//! kind is handled in every target-class branch, and inapplicable pairings
//! return `None` rather than a sentinel score.

use warden_core::components::{WeaponMount, WeaponSpec};
use warden_core::constants::*;
use warden_core::enums::{SubsurfaceKind, TargetClass};

use crate::context::{SensorAvailability, ShooterState, TargetState};
use crate::envelope::required_sensor_enabled;
use crate::launch::{boresight_tolerance_deg, off_boresight_deg};

/// Reference rate of fire for normalizing the rate term (rpm).
const REFERENCE_ROF_RPM: f64 = 600.0;

/// Reference beam power (kW).
const REFERENCE_BEAM_KW: f64 = 50.0;

/// Reference maneuverability for the anti-missile missile term (g).
const REFERENCE_MANEUVER_G: f64 = 30.0;

/// Reference standoff range (meters).
const REFERENCE_STANDOFF_M: f64 = 10_000.0;

/// Fitness of one candidate weapon against one target. `None` means the kind
/// does not apply to this target class at all; `Some` is comparable only
/// within the same operator priority rank.
pub fn score_candidate(
    shooter: &ShooterState,
    mount: &WeaponMount,
    target: &TargetState,
    distance: f64,
    sensors: &SensorAvailability,
    turret_reachable: bool,
) -> Option<f64> {
    match target.class {
        TargetClass::Missile => score_vs_missile(mount, distance, sensors, turret_reachable),
        TargetClass::Air => score_vs_air(shooter, mount, target, distance, sensors, turret_reachable),
        TargetClass::Surface => score_vs_surface(mount, target, distance, turret_reachable),
        TargetClass::Submerged => score_vs_submerged(mount, target, distance),
    }
}

fn range_window_penalty(mount: &WeaponMount, distance: f64) -> f64 {
    if distance < mount.min_range_m || distance > mount.max_range_m {
        SCORE_RANGE_WINDOW_PENALTY
    } else {
        0.0
    }
}

fn reachability(turret_reachable: bool) -> f64 {
    if turret_reachable {
        1.0
    } else {
        0.2
    }
}

fn score_vs_missile(
    mount: &WeaponMount,
    distance: f64,
    sensors: &SensorAvailability,
    turret_reachable: bool,
) -> Option<f64> {
    match &mount.spec {
        WeaponSpec::DirectedEnergy(beam) => {
            // Electro-optical dazzlers cannot kill inbound ordnance.
            if beam.electro_optical || !turret_reachable {
                return None;
            }
            Some(beam.power_kw / REFERENCE_BEAM_KW)
        }
        WeaponSpec::Gun(gun) => {
            let mut score = (gun.rate_of_fire_rpm / REFERENCE_ROF_RPM)
                * reachability(turret_reachable);
            if gun.proximity_fuze {
                score += SCORE_PROXIMITY_FUZE_BONUS;
            }
            score += (gun.projectiles_per_shot.saturating_sub(1)) as f64
                * SCORE_MULTI_PROJECTILE_BONUS;
            Some(score - range_window_penalty(mount, distance))
        }
        WeaponSpec::Rocket(rocket) => {
            let mut score = (rocket.rate_of_fire_rpm / REFERENCE_ROF_RPM)
                * reachability(turret_reachable);
            if rocket.proximity_fuze {
                score += SCORE_PROXIMITY_FUZE_BONUS;
            }
            score += (rocket.rockets_per_salvo.saturating_sub(1)) as f64
                * SCORE_MULTI_PROJECTILE_BONUS;
            Some(score - range_window_penalty(mount, distance))
        }
        WeaponSpec::GuidedMissile(missile) => {
            let mut score = missile.maneuverability_g / REFERENCE_MANEUVER_G
                + mount.max_range_m / REFERENCE_STANDOFF_M;
            if !required_sensor_enabled(mount, sensors) {
                score -= SCORE_SENSOR_UNAVAILABLE_PENALTY;
            }
            Some(score)
        }
        WeaponSpec::UnpoweredBomb(_) | WeaponSpec::Subsurface(_) => None,
    }
}

fn score_vs_air(
    shooter: &ShooterState,
    mount: &WeaponMount,
    target: &TargetState,
    distance: f64,
    sensors: &SensorAvailability,
    turret_reachable: bool,
) -> Option<f64> {
    match &mount.spec {
        WeaponSpec::GuidedMissile(_) => {
            let cue_available = required_sensor_enabled(mount, sensors);
            let tolerance = boresight_tolerance_deg(mount, target, distance);
            let off = off_boresight_deg(shooter, mount, target);
            let margin = ((tolerance - off) / tolerance.max(1.0)).clamp(0.0, 1.0);

            let mut score = margin;
            if cue_available {
                score += 1.0;
            } else {
                score -= SCORE_SENSOR_OFF_AIR_PENALTY;
            }
            Some(score)
        }
        WeaponSpec::Gun(_) | WeaponSpec::Rocket(_) | WeaponSpec::DirectedEnergy(_) => Some(
            size_heuristic(mount, target) * reachability(turret_reachable)
                - range_window_penalty(mount, distance),
        ),
        WeaponSpec::UnpoweredBomb(_) | WeaponSpec::Subsurface(_) => None,
    }
}

fn score_vs_surface(
    mount: &WeaponMount,
    target: &TargetState,
    distance: f64,
    turret_reachable: bool,
) -> Option<f64> {
    let moving = !target.stationary();
    match &mount.spec {
        WeaponSpec::Gun(_) | WeaponSpec::Rocket(_) | WeaponSpec::DirectedEnergy(_) => Some(
            size_heuristic(mount, target) * reachability(turret_reachable)
                - range_window_penalty(mount, distance),
        ),
        WeaponSpec::GuidedMissile(missile) => {
            if moving {
                // Moving surface targets belong to guns or submunition bombs;
                // a guided round still applies, ranked by yield.
                Some(missile.yield_kg / 1000.0)
            } else {
                Some(SCORE_GUIDED_PREFERENCE_BONUS + missile.yield_kg / 1000.0)
            }
        }
        WeaponSpec::UnpoweredBomb(bomb) => {
            let mut score = bomb.yield_kg / 1000.0;
            if bomb.guided && !moving {
                score += SCORE_GUIDED_PREFERENCE_BONUS;
            }
            if bomb.submunitions && moving {
                score += SCORE_SUBMUNITION_BONUS;
            }
            Some(score)
        }
        WeaponSpec::Subsurface(_) => None,
    }
}

fn score_vs_submerged(mount: &WeaponMount, target: &TargetState, distance: f64) -> Option<f64> {
    match &mount.spec {
        WeaponSpec::Subsurface(spec) => match spec.kind {
            SubsurfaceKind::DepthCharge => {
                // Depth charges only work above the target's depth.
                if target.depth_m() > spec.max_depth_m {
                    return None;
                }
                Some(1.0 + (spec.max_depth_m - target.depth_m()) / spec.max_depth_m.max(1.0))
            }
            SubsurfaceKind::Torpedo => {
                if distance < spec.min_safe_blast_range_m {
                    return None;
                }
                Some(1.5)
            }
        },
        _ => None,
    }
}

/// Caliber-or-rate heuristic: large targets favor caliber, small targets
/// favor rate of fire. The original folds both into one rate-named variable;
/// the net numeric behavior is replicated here without the variable reuse.
fn size_heuristic(mount: &WeaponMount, target: &TargetState) -> f64 {
    let large_target = target.mass_t >= SCORE_LARGE_TARGET_MASS_T;
    match &mount.spec {
        WeaponSpec::Gun(gun) => {
            if large_target {
                gun.caliber_mm / SCORE_LARGE_TARGET_CALIBER_MM
            } else {
                gun.rate_of_fire_rpm / REFERENCE_ROF_RPM
            }
        }
        WeaponSpec::Rocket(rocket) => {
            if large_target {
                rocket.blast_radius_m / 10.0
            } else {
                rocket.rate_of_fire_rpm / REFERENCE_ROF_RPM
            }
        }
        WeaponSpec::DirectedEnergy(beam) => beam.power_kw / REFERENCE_BEAM_KW,
        _ => 0.0,
    }
}

/// Inputs to the weighted target priority score.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetScoreInputs {
    pub range_m: f64,
    /// Positive when the target closes on the shooter (m/s).
    pub closing_rate: f64,
    pub acceleration: f64,
    pub weapon_count: u32,
    pub mass_t: f64,
    pub damage_fraction: f64,
    pub friendlies_engaging: u32,
    pub threat_rating: f64,
    pub vip: bool,
}

/// Weighted priority score over range/geometry/acceleration/weapon-count/
/// mass/damage/friendlies-engaging/threat/VIP-bias. Higher is more urgent.
pub fn target_priority_score(inputs: &TargetScoreInputs) -> f64 {
    let range_term =
        (TARGET_SCORE_REFERENCE_RANGE / inputs.range_m.max(1.0)).min(10.0) * TARGET_WEIGHT_RANGE;
    let geometry_term = (inputs.closing_rate / 100.0).clamp(-1.0, 1.0) * TARGET_WEIGHT_GEOMETRY;
    let accel_term = (inputs.acceleration / 30.0).min(1.0) * TARGET_WEIGHT_ACCELERATION;
    let weapons_term = (inputs.weapon_count as f64 / 4.0).min(1.0) * TARGET_WEIGHT_WEAPON_COUNT;
    let mass_term = (inputs.mass_t / 50.0).min(1.0) * TARGET_WEIGHT_MASS;
    // A nearly-dead target is a poor use of ordnance.
    let damage_term = -inputs.damage_fraction * TARGET_WEIGHT_DAMAGE;
    // Spread fire: each friendly already on the target pushes it down.
    let friendlies_term =
        -(inputs.friendlies_engaging as f64 / 3.0).min(1.0) * TARGET_WEIGHT_FRIENDLIES_ENGAGING;
    let threat_term = inputs.threat_rating.min(2.0) * TARGET_WEIGHT_THREAT;
    let vip_term = if inputs.vip { TARGET_WEIGHT_VIP } else { 0.0 };

    range_term
        + geometry_term
        + accel_term
        + weapons_term
        + mass_term
        + damage_term
        + friendlies_term
        + threat_term
        + vip_term
}
