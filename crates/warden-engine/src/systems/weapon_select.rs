//! Multi-criteria weapon selection for one platform against one target.
//!
//! Operator priority rank always wins; within a rank, candidates are ranked
//! by the per-kind fitness score. Guided candidates must additionally pass
//! the envelope, have their cue sensor fitted, and hold launch
//! authorization. A malformed candidate is logged and skipped, never
//! allowed to poison the whole pass.

use std::collections::HashMap;

use hecs::World;
use tracing::warn;

use warden_core::components::{Aboard, WeaponMount};
use warden_core::enums::{SensorKind, WeaponKind};
use warden_select::envelope::{can_engage, required_sensor_fitted};
use warden_select::launch::authorize;
use warden_select::scoring::score_candidate;

use crate::commitment::Commitment;
use crate::systems::{query, sensors};

/// Winning candidate of one selection pass.
#[derive(Debug, Clone, Copy)]
pub struct WeaponChoice {
    pub mount_id: u32,
    pub kind: WeaponKind,
    pub score: f64,
    /// Sensor the winning candidate wants powered up.
    pub sensor_request: Option<SensorKind>,
}

/// Select the best weapon aboard `platform_track` against `target_track`.
pub fn select(
    world: &mut World,
    platform_track: u32,
    target_track: u32,
    commitments: &HashMap<u32, Commitment>,
    unlimited_ammo: bool,
) -> Option<WeaponChoice> {
    let shooter = query::shooter_state(world, platform_track)?;
    let target = query::target_state(world, target_track)?;
    let sensor_fit = sensors::availability(world, platform_track);
    let distance = shooter.position.range_to(&target.position);

    // A mount mid-burst stays pinned until its window closes, so selection
    // can't steal a firing turret.
    if let Some(pinned) = mid_burst_mount(world, platform_track) {
        return Some(WeaponChoice {
            mount_id: pinned.0,
            kind: pinned.1,
            score: f64::MAX,
            sensor_request: None,
        });
    }

    let mounts: Vec<WeaponMount> = world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .filter(|(_, (a, _))| a.platform_track == platform_track)
        .map(|(_, (_, m))| m.clone())
        .collect();

    let mut best: Option<WeaponChoice> = None;
    let mut best_rank: (u8, f64) = (0, f64::NEG_INFINITY);
    let mut sensor_requests: Vec<SensorKind> = Vec::new();

    for mount in &mounts {
        if !mount.roles.eligible(target.class) {
            continue;
        }
        if mount.commitment_exclusive() && has_active_commitment(commitments, platform_track, mount)
        {
            continue;
        }
        if saturated(commitments, mount, target_track) {
            continue;
        }

        let decision = match can_engage(&shooter, mount, &target, distance, unlimited_ammo) {
            Ok(d) => d,
            Err(err) => {
                warn!(mount = mount.mount_id, %err, "candidate dropped from selection");
                continue;
            }
        };
        if let Some(kind) = decision.sensor_request {
            if !sensor_requests.contains(&kind) {
                sensor_requests.push(kind);
            }
        }
        if !decision.engageable {
            continue;
        }

        if mount.kind() == WeaponKind::GuidedMissile {
            if !required_sensor_fitted(mount, &sensor_fit) {
                continue;
            }
            match authorize(&shooter, mount, &target) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(mount = mount.mount_id, %err, "authorization errored, candidate dropped");
                    continue;
                }
            }
        }

        let score = match score_candidate(&shooter, mount, &target, distance, &sensor_fit, true) {
            Some(s) => s,
            None => continue,
        };

        let better = match &best {
            None => true,
            Some(current) => {
                (mount.priority, score) > best_rank
                    || ((mount.priority, score) == best_rank && mount.mount_id < current.mount_id)
            }
        };
        if better {
            best_rank = (mount.priority, score);
            best = Some(WeaponChoice {
                mount_id: mount.mount_id,
                kind: mount.kind(),
                score,
                sensor_request: decision.sensor_request,
            });
        }
    }

    // Side effect of the pass: power up the cue sensor of every guided
    // candidate that asked, not just the winner's, so the next scan sees
    // them warmed up.
    for kind in sensor_requests {
        sensors::enable(world, platform_track, kind);
    }
    best
}

fn mid_burst_mount(world: &World, platform_track: u32) -> Option<(u32, WeaponKind)> {
    world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .find(|(_, (a, m))| a.platform_track == platform_track && m.status.mid_burst)
        .map(|(_, (_, m))| (m.mount_id, m.kind()))
}

fn has_active_commitment(
    commitments: &HashMap<u32, Commitment>,
    platform_track: u32,
    mount: &WeaponMount,
) -> bool {
    commitments.values().any(|c| {
        !c.finished() && c.platform_track == platform_track && c.mount_id == mount.mount_id
    })
}

/// Whether the per-target simultaneous-round cap for this mount's kind is
/// already reached by live commitments.
fn saturated(
    commitments: &HashMap<u32, Commitment>,
    mount: &WeaponMount,
    target_track: u32,
) -> bool {
    let cap = match &mount.spec {
        warden_core::components::WeaponSpec::GuidedMissile(m) => m.max_on_target,
        warden_core::components::WeaponSpec::UnpoweredBomb(b) => b.max_per_target,
        _ => return false,
    };
    let live = commitments
        .values()
        .filter(|c| !c.finished() && c.target_track == target_track && c.kind == mount.kind())
        .count() as u32;
    live >= cap
}
