//! Bomb-run sequence.
//!
//! AcquiringCoordinates -> Approach -> Releasing. Coordinates come from the
//! best available source in ladder order: the surveyed database position of
//! a fixed target, a painted designator point, then radar ranging on a
//! detected track. The drop point is where the miss-distance proxy stops
//! improving; two consecutive growths of the slant distance inside release
//! range trigger the release, and the same latch outside release range
//! means the run overshot and requests an autopilot breakoff.

use hecs::World;

use warden_core::components::{Aboard, Designator, WeaponSpec};
use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;
use warden_core::types::Position;
use warden_select::context::TargetState;

use crate::commitment::{Commitment, Routine};
use crate::systems::sequencer;
use crate::systems::{guard, query};
use crate::world_setup;

pub fn advance(
    world: &mut World,
    c: &mut Commitment,
    next_track_id: &mut u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
    unlimited_ammo: bool,
) {
    let phase = match &c.routine {
        Routine::BombRun(r) => r.phase,
        _ => return,
    };
    if matches!(phase, BombRunPhase::Complete | BombRunPhase::Aborted) {
        return;
    }

    if let Some(outcome) = sequencer::cancellation(world, c, unlimited_ammo) {
        // Rounds already dropped still count as a release.
        let released = matches!(&c.routine, Routine::BombRun(r) if r.released > 0);
        let outcome = if released {
            CommitmentOutcome::Released
        } else {
            outcome
        };
        sequencer::finish(world, c, outcome, tick, events);
        return;
    }

    let mount = match query::mount_clone(world, c.platform_track, c.mount_id) {
        Some(m) => m,
        None => return,
    };
    let spec = match &mount.spec {
        WeaponSpec::UnpoweredBomb(s) => s.clone(),
        _ => return,
    };
    let shooter = match query::shooter_state(world, c.platform_track) {
        Some(s) => s,
        None => return,
    };
    let target = match query::target_state(world, c.target_track) {
        Some(t) => t,
        None => return,
    };

    match phase {
        BombRunPhase::AcquiringCoordinates => {
            let ready = match &mut c.routine {
                Routine::BombRun(r) => {
                    r.wait_remaining_secs -= DT;
                    r.wait_remaining_secs <= 0.0
                }
                _ => return,
            };
            if !ready {
                return;
            }

            let (coords, source) = match acquire_coordinates(world, c, &target) {
                Some(v) => v,
                // No source can place the target yet; retry on the cadence.
                None => {
                    if let Routine::BombRun(r) = &mut c.routine {
                        r.wait_remaining_secs = BOMB_ACQUIRE_INTERVAL;
                    }
                    return;
                }
            };

            if let Some(bay) = spec.bay_id {
                sequencer::claim_bay(world, c.platform_track, bay);
            }
            if let Routine::BombRun(r) = &mut c.routine {
                r.coordinates = Some(coords);
                r.source = Some(source);
                r.bay_claimed = spec.bay_id.is_some();
                r.phase = BombRunPhase::Approach;
                r.wait_remaining_secs = BOMB_ACQUIRE_INTERVAL;
            }
        }

        BombRunPhase::Approach => {
            // Non-database coordinates go stale; refresh on the acquire
            // cadence while inbound.
            let refresh_due = match &mut c.routine {
                Routine::BombRun(r) => {
                    r.wait_remaining_secs -= DT;
                    if r.wait_remaining_secs <= 0.0 {
                        r.wait_remaining_secs = BOMB_ACQUIRE_INTERVAL;
                        r.source != Some(CoordinateSource::Database)
                    } else {
                        false
                    }
                }
                _ => return,
            };
            if refresh_due {
                if let Some((coords, source)) = acquire_coordinates(world, c, &target) {
                    if let Routine::BombRun(r) = &mut c.routine {
                        r.coordinates = Some(coords);
                        r.source = Some(source);
                    }
                }
            }

            let coords = match &c.routine {
                Routine::BombRun(r) => r.coordinates.unwrap_or(target.position),
                _ => return,
            };
            let slant = shooter.position.range_to(&coords);

            if spec.bay_id.is_some()
                && !sequencer::bay_open(world, c.platform_track, spec.bay_id.unwrap_or(0))
            {
                return;
            }

            let latched = match &mut c.routine {
                Routine::BombRun(r) => {
                    if slant > r.last_slant_m {
                        r.slant_increases += 1;
                    } else {
                        r.slant_increases = 0;
                    }
                    r.last_slant_m = slant;
                    r.slant_increases >= 2
                }
                _ => return,
            };
            if !latched {
                return;
            }

            // The miss distance stopped improving. Inside release range that
            // is the drop point; outside it the run has overshot.
            if slant <= spec.release_range_m {
                if let Routine::BombRun(r) = &mut c.routine {
                    r.phase = BombRunPhase::Releasing;
                    r.wait_remaining_secs = 0.0;
                }
            } else {
                if let Routine::BombRun(r) = &mut c.routine {
                    r.phase = BombRunPhase::BreakoffRequested;
                }
                guard::set_guard(world, c.platform_track, |g| g.request_extend = true);
                events.push(EngagementEvent::BreakoffRequested { commitment_id: c.id });
            }
        }

        BombRunPhase::Releasing => {
            let due = match &mut c.routine {
                Routine::BombRun(r) => {
                    r.wait_remaining_secs -= DT;
                    r.wait_remaining_secs <= 0.0
                }
                _ => return,
            };
            if !due {
                return;
            }

            sequencer::expend_round(world, c.platform_track, c.mount_id, unlimited_ammo);
            let team = query::track_team(world, c.platform_track).unwrap_or(0);
            world_setup::spawn_released_ordnance(
                world,
                next_track_id,
                team,
                OrdnanceKind::Projectile,
                c.platform_track,
                Some(c.target_track),
                TargetingMode::None,
                shooter.position,
                shooter.velocity,
            );
            events.push(EngagementEvent::WeaponReleased {
                commitment_id: c.id,
                kind: c.kind,
                target_track: c.target_track,
                degraded: false,
            });

            let done = match &mut c.routine {
                Routine::BombRun(r) => {
                    r.released += 1;
                    r.wait_remaining_secs = BOMB_RELEASE_INTERVAL;
                    r.released >= spec.max_per_target
                        || (!unlimited_ammo && remaining_ammo(world, c) <= 0)
                }
                _ => return,
            };
            if done {
                sequencer::finish(world, c, CommitmentOutcome::Released, tick, events);
            }
        }

        BombRunPhase::BreakoffRequested => {
            sequencer::finish(world, c, CommitmentOutcome::Cancelled, tick, events);
        }

        BombRunPhase::Complete | BombRunPhase::Aborted => {}
    }
}

/// Coordinate ladder, best source first: the surveyed database position of
/// a fixed target, then a painted designator point, then radar ranging on a
/// detected track.
fn acquire_coordinates(
    world: &World,
    c: &Commitment,
    target: &TargetState,
) -> Option<(Position, CoordinateSource)> {
    if target.stationary() {
        return Some((target.position, CoordinateSource::Database));
    }
    if let Some(p) = designator_point(world, c.platform_track) {
        return Some((p, CoordinateSource::Designator));
    }
    if track_detected(world, c.target_track, c.platform_track) {
        return Some((target.position, CoordinateSource::RadarRanging));
    }
    None
}

fn designator_point(world: &World, platform_track: u32) -> Option<Position> {
    world
        .query::<(&Aboard, &Designator)>()
        .iter()
        .find(|(_, (a, d))| a.platform_track == platform_track && d.locked)
        .and_then(|(_, (_, d))| d.painted)
}

fn track_detected(world: &World, track_id: u32, platform_track: u32) -> bool {
    world
        .query::<&warden_core::components::TargetTrack>()
        .iter()
        .any(|(_, t)| t.track_id == track_id && t.detected_by(platform_track))
}

fn remaining_ammo(world: &World, c: &Commitment) -> i64 {
    query::mount_clone(world, c.platform_track, c.mount_id)
        .map(|m| m.status.ammo as i64)
        .unwrap_or(0)
}
