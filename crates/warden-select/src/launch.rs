//! Dynamic launch zones and launch authorization.
//!
//! The launch zone is a derived (min, max) range pair recomputed per check
//! and never stored. Authorization projects a lead point and requires the
//! shot to be in boresight tolerance now and, outside a vacuum-like regime,
//! at the weapon's characteristic time-to-effect under linear extrapolation.

use warden_core::components::{MissileSpec, WeaponMount, WeaponSpec};
use warden_core::constants::*;
use warden_core::types::{off_axis_angle_deg, Position};

use crate::context::{ShooterState, TargetState};
use crate::error::SelectError;

/// Derived range window for a guided launch. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchZone {
    pub min_m: f64,
    pub max_m: f64,
}

impl LaunchZone {
    pub fn contains(&self, range: f64) -> bool {
        range >= self.min_m && range <= self.max_m
    }
}

/// Compute the dynamic launch zone for a guided round.
///
/// Closing geometry stretches the declared maximum (a launch fired at a
/// closing target flies less distance than the current range); opening
/// geometry shrinks it.
pub fn dynamic_launch_zone(
    shooter: &ShooterState,
    mount: &WeaponMount,
    spec: &MissileSpec,
    target: &TargetState,
) -> LaunchZone {
    let range = shooter.position.range_to(&target.position);
    let min_m = mount.min_range_m * LAUNCH_ZONE_MIN_FACTOR;

    if range < 1.0 {
        return LaunchZone {
            min_m,
            max_m: mount.max_range_m,
        };
    }

    // Range rate: positive = opening, negative = closing.
    let los = (target.position.to_dvec3() - shooter.position.to_dvec3()) / range;
    let range_rate = (target.velocity.to_dvec3() - shooter.velocity.to_dvec3()).dot(los);

    // Normalize by the round's own pace over its time to effect.
    let missile_pace = if spec.time_to_effect_secs > 0.0 {
        mount.max_range_m / spec.time_to_effect_secs
    } else {
        mount.max_range_m
    };
    let normalized = (range_rate / missile_pace.max(1.0)).clamp(-1.0, 1.0);

    let factor = if normalized < 0.0 {
        // Closing: stretch toward LAUNCH_ZONE_CLOSING_STRETCH.
        1.0 + (LAUNCH_ZONE_CLOSING_STRETCH - 1.0) * (-normalized)
    } else {
        // Opening: shrink toward LAUNCH_ZONE_OPENING_SHRINK.
        1.0 - (1.0 - LAUNCH_ZONE_OPENING_SHRINK) * normalized
    };

    LaunchZone {
        min_m,
        max_m: (mount.max_range_m * factor).max(min_m),
    }
}

/// Characteristic time from trigger to effect at the given range.
pub fn time_to_effect(mount: &WeaponMount, range: f64) -> f64 {
    match &mount.spec {
        WeaponSpec::Gun(g) if g.muzzle_velocity_mps > 0.0 => range / g.muzzle_velocity_mps,
        WeaponSpec::Rocket(r) if r.velocity_mps > 0.0 => range / r.velocity_mps,
        WeaponSpec::DirectedEnergy(_) => 0.0,
        WeaponSpec::GuidedMissile(m) => m.time_to_effect_secs,
        WeaponSpec::UnpoweredBomb(_) => BOMB_FALL_TIME,
        _ => UNGUIDED_TIME_TO_EFFECT,
    }
}

/// Project the lead/intercept point. Stationary targets use current position.
pub fn lead_point(target: &TargetState, time_of_flight: f64) -> Position {
    if target.stationary() {
        target.position
    } else {
        target.position.extrapolated(&target.velocity, time_of_flight)
    }
}

/// Boresight tolerance for this weapon against this target, in degrees.
///
/// Guided shots get a wide cone, reduced against airborne targets. Unguided
/// shots get the angle subtended by the lethal radius at range, floored.
pub fn boresight_tolerance_deg(mount: &WeaponMount, target: &TargetState, range: f64) -> f64 {
    match &mount.spec {
        WeaponSpec::GuidedMissile(_) => {
            if target.airborne {
                GUIDED_BORESIGHT_AIRBORNE_DEG
            } else {
                GUIDED_BORESIGHT_DEG
            }
        }
        WeaponSpec::UnpoweredBomb(b) if b.guided => GUIDED_BORESIGHT_DEG,
        other => {
            let blast_radius = match other {
                WeaponSpec::Gun(g) => g.blast_radius_m,
                WeaponSpec::Rocket(r) => r.blast_radius_m,
                WeaponSpec::UnpoweredBomb(b) => b.yield_kg.cbrt(),
                _ => 1.0,
            };
            let subtended = (blast_radius / range.max(1.0)).atan().to_degrees();
            subtended.max(UNGUIDED_BORESIGHT_FLOOR_DEG)
        }
    }
}

/// `authorize` with the tolerance made explicit. Monotone in `tolerance_deg`:
/// widening the cone never revokes an authorized shot.
pub fn authorize_with_tolerance(
    shooter: &ShooterState,
    mount: &WeaponMount,
    target: &TargetState,
    tolerance_deg: f64,
) -> Result<bool, SelectError> {
    let range = shooter.position.range_to(&target.position);
    if range < 1.0 {
        return Err(SelectError::DegenerateGeometry);
    }

    let tof = time_to_effect(mount, range);
    let aim = lead_point(target, tof);
    let boresight = shooter.boresight();

    let now_deg = off_axis_angle_deg(shooter.position.to_dvec3(), aim.to_dvec3(), boresight);
    if now_deg > tolerance_deg {
        return Ok(false);
    }

    // Outside a vacuum-like regime, also require in-tolerance at the weapon's
    // time-to-effect, extrapolating both shooter and target linearly. The
    // horizon stops short of the merge point on closing geometry; projecting
    // past it flips the line of sight and refuses every head-on shot.
    if !shooter.status.in_vacuum && tof > 0.0 {
        let los = (target.position.to_dvec3() - shooter.position.to_dvec3()) / range;
        let closing = (shooter.velocity.to_dvec3() - target.velocity.to_dvec3()).dot(los);
        let horizon = if closing > 1.0 {
            tof.min(range / closing * LEAD_HORIZON_MERGE_FRACTION)
        } else {
            tof
        };
        let shooter_later = shooter.position.extrapolated(&shooter.velocity, horizon);
        let target_later = target.position.extrapolated(&target.velocity, horizon);
        let later_deg =
            off_axis_angle_deg(shooter_later.to_dvec3(), target_later.to_dvec3(), boresight);
        if later_deg > tolerance_deg {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Boresight/lead authorization for one (weapon, target) pairing.
pub fn authorize(
    shooter: &ShooterState,
    mount: &WeaponMount,
    target: &TargetState,
) -> Result<bool, SelectError> {
    let range = shooter.position.range_to(&target.position);
    let tolerance = boresight_tolerance_deg(mount, target, range);
    authorize_with_tolerance(shooter, mount, target, tolerance)
}

/// Current off-boresight angle to the target's lead point, in degrees.
/// The sequencers use this for slew convergence and degraded-release checks.
pub fn off_boresight_deg(shooter: &ShooterState, mount: &WeaponMount, target: &TargetState) -> f64 {
    let range = shooter.position.range_to(&target.position);
    let aim = lead_point(target, time_to_effect(mount, range));
    off_axis_angle_deg(
        shooter.position.to_dvec3(),
        aim.to_dvec3(),
        shooter.boresight(),
    )
}
