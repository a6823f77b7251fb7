//! Guided-missile firing sequence (also drives subsurface weapon drops,
//! which skip the lock and slew phases).
//!
//! OpeningBay -> AcquiringLock -> SlewingTurret -> FinalValidation ->
//! Released. Lock acquisition is a bounded retry loop; exhausting it arms a
//! degraded unguided release if the geometry is still plausible.

use hecs::World;
use tracing::warn;

use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;
use warden_select::envelope::{can_engage, wrap_deg};
use warden_select::launch::{authorize, off_boresight_deg};

use crate::commitment::{Commitment, Routine};
use crate::systems::sequencer;
use crate::systems::{query, sensors};
use crate::world_setup;

#[allow(clippy::too_many_arguments)]
pub fn advance(
    world: &mut World,
    c: &mut Commitment,
    next_track_id: &mut u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
    unlimited_ammo: bool,
    protected: &[u32],
) {
    let phase = match &c.routine {
        Routine::Missile(r) => r.phase,
        _ => return,
    };

    // The round is already away in Released; only bookkeeping remains, so
    // the cancellation guards no longer apply.
    if phase == MissileSequencePhase::Released {
        let degraded = match &c.routine {
            Routine::Missile(r) => r.degraded,
            _ => return,
        };
        let outcome = if degraded {
            CommitmentOutcome::DegradedRelease
        } else {
            CommitmentOutcome::Released
        };
        sequencer::finish(world, c, outcome, tick, events);
        return;
    }

    if let Some(outcome) = sequencer::cancellation(world, c, unlimited_ammo) {
        sequencer::finish(world, c, outcome, tick, events);
        return;
    }

    let mount = match query::mount_clone(world, c.platform_track, c.mount_id) {
        Some(m) => m,
        None => return,
    };
    let shooter = match query::shooter_state(world, c.platform_track) {
        Some(s) => s,
        None => return,
    };
    let target = match query::target_state(world, c.target_track) {
        Some(t) => t,
        None => return,
    };
    let seeker = mount
        .spec
        .as_missile()
        .map(|s| s.targeting_mode)
        .unwrap_or_default();
    let cue_sensor = seeker.required_sensor();

    match phase {
        MissileSequencePhase::OpeningBay => {
            let (bay_id, claimed) = match &c.routine {
                Routine::Missile(r) => (r.bay_id, r.bay_claimed),
                _ => return,
            };
            if let Some(bay) = bay_id {
                if !claimed {
                    sequencer::claim_bay(world, c.platform_track, bay);
                    if let Routine::Missile(r) = &mut c.routine {
                        r.bay_claimed = true;
                    }
                    return;
                }
                if !sequencer::bay_open(world, c.platform_track, bay) {
                    return;
                }
            }
            if let Routine::Missile(r) = &mut c.routine {
                r.phase = if cue_sensor.is_some() {
                    MissileSequencePhase::AcquiringLock
                } else if mount.turret.is_some() {
                    MissileSequencePhase::SlewingTurret
                } else {
                    MissileSequencePhase::FinalValidation
                };
            }
        }

        MissileSequencePhase::AcquiringLock => {
            let ready = match &mut c.routine {
                Routine::Missile(r) => {
                    r.wait_remaining_secs -= DT;
                    r.wait_remaining_secs <= 0.0
                }
                _ => return,
            };
            if !ready {
                return;
            }
            let kind = match cue_sensor {
                Some(k) => k,
                // Cue requirement vanished (mount swapped out); skip ahead.
                None => {
                    if let Routine::Missile(r) = &mut c.routine {
                        r.phase = MissileSequencePhase::FinalValidation;
                    }
                    return;
                }
            };

            let locked =
                sensors::try_lock(world, c.platform_track, kind, c.target_track, protected);
            if locked {
                events.push(EngagementEvent::LockAcquired {
                    sensor: kind,
                    target_track: c.target_track,
                });
                if let Routine::Missile(r) = &mut c.routine {
                    r.lock_acquired = true;
                    r.phase = if mount.turret.is_some() {
                        MissileSequencePhase::SlewingTurret
                    } else {
                        MissileSequencePhase::FinalValidation
                    };
                }
                return;
            }

            let exhausted = match &mut c.routine {
                Routine::Missile(r) => {
                    r.lock_attempts += 1;
                    if r.lock_attempts >= LOCK_RETRY_ATTEMPTS {
                        true
                    } else {
                        r.wait_remaining_secs = LOCK_RETRY_INTERVAL;
                        false
                    }
                }
                _ => return,
            };
            if !exhausted {
                return;
            }

            events.push(EngagementEvent::LockFailed {
                sensor: kind,
                target_track: c.target_track,
            });
            // Geometry still plausible: fall through to a degraded unguided
            // release instead of wasting the whole sequence.
            let off = off_boresight_deg(&shooter, &mount, &target);
            if off <= DEGRADED_RELEASE_CONE_DEG {
                if let Routine::Missile(r) = &mut c.routine {
                    r.degraded = true;
                    r.phase = MissileSequencePhase::FinalValidation;
                }
            } else {
                sequencer::finish(world, c, CommitmentOutcome::Cancelled, tick, events);
            }
        }

        MissileSequencePhase::SlewingTurret => {
            let timed_out = match &mut c.routine {
                Routine::Missile(r) => {
                    r.slew_elapsed_secs += DT;
                    r.slew_elapsed_secs > TURRET_SLEW_TIMEOUT
                }
                _ => return,
            };
            if timed_out {
                sequencer::finish(world, c, CommitmentOutcome::Cancelled, tick, events);
                return;
            }

            let bearing_deg = shooter.position.bearing_to(&target.position).to_degrees();
            let heading_deg = shooter.velocity.heading().to_degrees();
            let mount_bearing = mount
                .turret
                .as_ref()
                .map(|t| t.mount_bearing_deg)
                .unwrap_or(0.0);
            let desired = wrap_deg(bearing_deg - heading_deg - mount_bearing);
            let elevation = shooter
                .position
                .elevation_to(&target.position)
                .to_degrees();

            let remaining = sequencer::slew_turret(
                world,
                c.platform_track,
                c.mount_id,
                c.target_track,
                desired,
                elevation,
            );
            if remaining <= TURRET_SLEW_CONE_DEG {
                if let Routine::Missile(r) = &mut c.routine {
                    r.phase = MissileSequencePhase::FinalValidation;
                }
            }
        }

        MissileSequencePhase::FinalValidation => {
            let degraded = match &c.routine {
                Routine::Missile(r) => r.degraded,
                _ => return,
            };
            let distance = shooter.position.range_to(&target.position);

            let go = if degraded {
                off_boresight_deg(&shooter, &mount, &target) <= DEGRADED_RELEASE_CONE_DEG
            } else {
                match can_engage(&shooter, &mount, &target, distance, unlimited_ammo) {
                    Ok(decision) => {
                        decision.engageable
                            && authorize(&shooter, &mount, &target).unwrap_or(false)
                    }
                    Err(err) => {
                        warn!(commitment = c.id, %err, "final validation errored");
                        false
                    }
                }
            };
            if !go {
                sequencer::finish(world, c, CommitmentOutcome::RefusedAtRelease, tick, events);
                return;
            }

            sequencer::expend_round(world, c.platform_track, c.mount_id, unlimited_ammo);
            let team = query::track_team(world, c.platform_track).unwrap_or(0);
            let ordnance_kind = match c.kind {
                WeaponKind::GuidedMissile => OrdnanceKind::Missile,
                _ => OrdnanceKind::Projectile,
            };
            let release_seeker = if degraded { TargetingMode::None } else { seeker };
            world_setup::spawn_released_ordnance(
                world,
                next_track_id,
                team,
                ordnance_kind,
                c.platform_track,
                Some(c.target_track),
                release_seeker,
                shooter.position,
                shooter.velocity,
            );
            events.push(EngagementEvent::WeaponReleased {
                commitment_id: c.id,
                kind: c.kind,
                target_track: c.target_track,
                degraded,
            });
            if let Routine::Missile(r) = &mut c.routine {
                r.phase = MissileSequencePhase::Released;
            }
        }

        // Handled above, before the cancellation guards.
        MissileSequencePhase::Released => {}

        MissileSequencePhase::Complete | MissileSequencePhase::Aborted => {}
    }
}
