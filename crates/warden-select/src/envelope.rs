//! Engagement envelope validation — per-weapon go/no-go for one target at
//! one distance.

use warden_core::components::{WeaponMount, WeaponSpec};
use warden_core::constants::*;
use warden_core::enums::SensorKind;

use crate::context::{SensorAvailability, ShooterState, TargetState};
use crate::error::SelectError;
use crate::launch::{dynamic_launch_zone, LaunchZone};

/// Outcome of an envelope check. Side effects are returned as requests so the
/// caller (which owns the sensors) can perform them.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeDecision {
    pub engageable: bool,
    /// The prerequisite sensor this weapon's targeting mode wants enabled.
    pub sensor_request: Option<SensorKind>,
    /// Launch zone computed for guided rounds, for reuse by the caller.
    pub launch_zone: Option<LaunchZone>,
}

impl EnvelopeDecision {
    fn no(sensor_request: Option<SensorKind>) -> Self {
        Self {
            engageable: false,
            sensor_request,
            launch_zone: None,
        }
    }
}

/// `CanEngage(weapon, distance, target)`.
///
/// Transient unavailability (ammo, heat, traverse, window) is a plain
/// `engageable: false`. Malformed state surfaces as `SelectError` for the
/// caller to catch, log, and downgrade — it never propagates past the
/// per-candidate boundary.
pub fn can_engage(
    shooter: &ShooterState,
    mount: &WeaponMount,
    target: &TargetState,
    distance: f64,
    unlimited_ammo: bool,
) -> Result<EnvelopeDecision, SelectError> {
    if distance <= 0.0 {
        return Err(SelectError::DegenerateGeometry);
    }

    let has_ammo = unlimited_ammo || mount.status.ammo > 0;

    match &mount.spec {
        WeaponSpec::GuidedMissile(spec) => {
            // Side effect request happens regardless of the outcome: the scan
            // that rejects for range still warms the sensor up for the next one.
            let sensor_request = spec.targeting_mode.required_sensor();

            if !has_ammo {
                return Ok(EnvelopeDecision::no(sensor_request));
            }
            if shooter.speed() < spec.min_launch_speed {
                return Ok(EnvelopeDecision::no(sensor_request));
            }

            let zone = dynamic_launch_zone(shooter, mount, spec, target);
            Ok(EnvelopeDecision {
                engageable: zone.contains(distance),
                sensor_request,
                launch_zone: Some(zone),
            })
        }
        _ => {
            // Direct fire, bombs, and subsurface weapons.
            if !has_ammo
                || mount.status.overheated()
                || mount.status.reloading()
                || !mount.status.crewed
            {
                return Ok(EnvelopeDecision::no(None));
            }

            let min_safe = mount.min_range_m.max(DIRECT_FIRE_MIN_SAFE_DISTANCE);
            if distance < min_safe {
                return Ok(EnvelopeDecision::no(None));
            }

            if let Some(turret) = &mount.turret {
                let tolerance = if shooter.status.stationary && shooter.status.surface_contact {
                    TURRET_TOLERANCE_STATIONARY_DEG
                } else {
                    TURRET_TOLERANCE_MOVING_DEG
                };

                let bearing_deg = shooter
                    .position
                    .bearing_to(&target.position)
                    .to_degrees();
                let heading_deg = shooter.velocity.heading().to_degrees();
                // Offset from the turret's installed facing, wrapped to ±180.
                let offset =
                    wrap_deg(bearing_deg - heading_deg - turret.mount_bearing_deg);
                let elevation_deg = shooter
                    .position
                    .elevation_to(&target.position)
                    .to_degrees();

                if !turret.within_traverse(offset, elevation_deg, tolerance) {
                    return Ok(EnvelopeDecision::no(None));
                }
            }

            Ok(EnvelopeDecision {
                engageable: true,
                sensor_request: None,
                launch_zone: None,
            })
        }
    }
}

/// Wrap an angle in degrees to the range (-180, 180].
pub fn wrap_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Whether the required sensor for a guided mount is physically aboard.
/// A guided candidate whose cue sensor is not even fitted is rejected outright.
pub fn required_sensor_fitted(mount: &WeaponMount, sensors: &SensorAvailability) -> bool {
    match mount
        .spec
        .as_missile()
        .and_then(|m| m.targeting_mode.required_sensor())
    {
        Some(kind) => sensors.fitted(kind),
        None => true,
    }
}

/// Whether the required sensor for a guided mount is currently powered up.
/// A fitted-but-off sensor costs score, not eligibility.
pub fn required_sensor_enabled(mount: &WeaponMount, sensors: &SensorAvailability) -> bool {
    match mount
        .spec
        .as_missile()
        .and_then(|m| m.targeting_mode.required_sensor())
    {
        Some(kind) => sensors.enabled(kind),
        None => true,
    }
}
