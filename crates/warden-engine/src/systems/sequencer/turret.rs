//! Direct-fire turret burst sequence.
//!
//! Aiming -> Firing -> Cooling. The burst drives the committed mount's whole
//! firing group: mounts are paired with targets round-robin over the ranked
//! list (primary first, then the guard's secondaries), each pairing
//! re-checked for reachability with the primary as fallback. The firing
//! window drains ammunition at the mount's rate of fire and accumulates
//! heat; overheat or an empty magazine closes the window early. `mid_burst`
//! pins the committed mount in weapon selection for the duration.

use hecs::World;

use warden_core::components::{Aboard, CombatPlatform, GuardState, TargetTrack, WeaponMount, WeaponSpec};
use warden_core::constants::*;
use warden_core::enums::{BurstPhase, CommitmentOutcome};
use warden_core::events::EngagementEvent;
use warden_select::context::ShooterState;
use warden_select::envelope::{can_engage, wrap_deg};
use warden_select::launch::authorize;

use crate::commitment::{Commitment, Routine};
use crate::systems::query;
use crate::systems::sequencer;

pub fn advance(
    world: &mut World,
    c: &mut Commitment,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
    unlimited_ammo: bool,
) {
    let phase = match &c.routine {
        Routine::Burst(r) => r.phase,
        _ => return,
    };
    if matches!(phase, BurstPhase::Complete | BurstPhase::Aborted) {
        return;
    }

    // Cooling is pure bookkeeping; the target dying mid-cooldown changes
    // nothing.
    if phase != BurstPhase::Cooling {
        if let Some(outcome) = sequencer::cancellation(world, c, unlimited_ammo) {
            let fired = phase == BurstPhase::Firing;
            let outcome = if fired {
                CommitmentOutcome::Released
            } else {
                outcome
            };
            end_burst_if_open(world, c, events);
            sequencer::finish(world, c, outcome, tick, events);
            return;
        }
    }

    let mount = match query::mount_clone(world, c.platform_track, c.mount_id) {
        Some(m) => m,
        None => return,
    };

    match phase {
        BurstPhase::Aiming => {
            let timed_out = match &mut c.routine {
                Routine::Burst(r) => {
                    r.slew_elapsed_secs += DT;
                    r.slew_elapsed_secs > TURRET_SLEW_TIMEOUT
                }
                _ => return,
            };
            if timed_out {
                sequencer::finish(world, c, CommitmentOutcome::Cancelled, tick, events);
                return;
            }

            let shooter = match query::shooter_state(world, c.platform_track) {
                Some(s) => s,
                None => return,
            };
            let target = match query::target_state(world, c.target_track) {
                Some(t) => t,
                None => return,
            };

            let need_plan = matches!(&c.routine, Routine::Burst(r) if r.assignments.is_empty());
            if need_plan {
                let planned = plan_assignments(world, c, mount.group_id, unlimited_ammo);
                if let Routine::Burst(r) = &mut c.routine {
                    r.assignments = planned;
                }
            }
            let assignments = match &c.routine {
                Routine::Burst(r) => r.assignments.clone(),
                _ => return,
            };

            let mut primary_remaining = None;
            for (mount_id, assigned_target) in &assignments {
                let remaining =
                    slew_toward(world, &shooter, c.platform_track, *mount_id, *assigned_target);
                if *mount_id == c.mount_id {
                    primary_remaining = remaining;
                }
            }

            let on_target = match primary_remaining {
                Some(remaining) => remaining <= TURRET_SLEW_CONE_DEG,
                // Fixed mount: the autopilot points the nose; fire only once
                // the boresight solution holds.
                None => authorize(&shooter, &mount, &target).unwrap_or(false),
            };

            if on_target {
                for (mount_id, _) in &assignments {
                    set_mid_burst(world, c.platform_track, *mount_id, true);
                }
                let group_id = match &mut c.routine {
                    Routine::Burst(r) => {
                        r.phase = BurstPhase::Firing;
                        r.window_remaining_secs = BURST_WINDOW_SECS;
                        r.group_id
                    }
                    _ => return,
                };
                events.push(EngagementEvent::BurstStarted {
                    group_id,
                    target_track: c.target_track,
                });
            }
        }

        BurstPhase::Firing => {
            let window_open = match &mut c.routine {
                Routine::Burst(r) => {
                    r.window_remaining_secs -= DT;
                    r.window_remaining_secs > 0.0
                }
                _ => return,
            };

            let rate_rpm = match &mount.spec {
                WeaponSpec::Gun(g) => g.rate_of_fire_rpm,
                WeaponSpec::Rocket(r) => r.rate_of_fire_rpm,
                // Beams fire continuously for the window.
                WeaponSpec::DirectedEnergy(_) => 0.0,
                _ => 0.0,
            };
            let (rounds, assignments) = match &mut c.routine {
                Routine::Burst(r) => {
                    r.rounds_accum += rate_rpm / 60.0 * DT;
                    let whole = r.rounds_accum.floor() as u32;
                    r.rounds_accum -= whole as f64;
                    (whole, r.assignments.clone())
                }
                _ => return,
            };

            // Group members share the spec, so one accumulator serves all.
            let mut dry = false;
            let mut overheated = false;
            for (mount_id, _) in &assignments {
                let (d, o) =
                    fire_rounds(world, c.platform_track, *mount_id, rounds, unlimited_ammo);
                if *mount_id == c.mount_id {
                    dry = d;
                    overheated = o;
                }
            }

            if !window_open || dry || overheated {
                end_burst_if_open(world, c, events);
                if let Routine::Burst(r) = &mut c.routine {
                    r.phase = BurstPhase::Cooling;
                    r.window_remaining_secs = BURST_COOLDOWN_SECS;
                }
            }
        }

        BurstPhase::Cooling => {
            let done = match &mut c.routine {
                Routine::Burst(r) => {
                    r.window_remaining_secs -= DT;
                    r.window_remaining_secs <= 0.0
                }
                _ => return,
            };
            if done {
                sequencer::finish(world, c, CommitmentOutcome::Released, tick, events);
            }
        }

        BurstPhase::Complete | BurstPhase::Aborted => {}
    }
}

/// Pair each mount of the firing group with a target, round-robin over the
/// ranked list capped at `TURRET_MAX_TARGETS`. A pairing that fails the
/// reachability check falls back to the primary target.
fn plan_assignments(
    world: &World,
    c: &Commitment,
    group_id: u32,
    unlimited_ammo: bool,
) -> Vec<(u32, u32)> {
    let shooter = match query::shooter_state(world, c.platform_track) {
        Some(s) => s,
        None => return vec![(c.mount_id, c.target_track)],
    };

    let mut ranked = vec![c.target_track];
    let secondaries: Vec<u32> = world
        .query::<(&CombatPlatform, &TargetTrack, &GuardState)>()
        .iter()
        .find(|(_, (_, t, _))| t.track_id == c.platform_track)
        .map(|(_, (_, _, g))| g.secondary_targets.clone())
        .unwrap_or_default();
    for id in secondaries {
        if !ranked.contains(&id) {
            ranked.push(id);
        }
    }
    ranked.truncate(TURRET_MAX_TARGETS);

    let mut mounts: Vec<u32> = world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .filter(|(_, (a, m))| {
            a.platform_track == c.platform_track
                && m.group_id == group_id
                && m.status.crewed
                && (unlimited_ammo || m.status.ammo > 0)
        })
        .map(|(_, (_, m))| m.mount_id)
        .collect();
    mounts.sort_unstable();
    if mounts.is_empty() {
        mounts.push(c.mount_id);
    }

    mounts
        .into_iter()
        .enumerate()
        .map(|(i, mount_id)| {
            let want = ranked[i % ranked.len()];
            let ok = want == c.target_track
                || reachable(world, &shooter, c.platform_track, mount_id, want, unlimited_ammo);
            (mount_id, if ok { want } else { c.target_track })
        })
        .collect()
}

fn reachable(
    world: &World,
    shooter: &ShooterState,
    platform_track: u32,
    mount_id: u32,
    target_track: u32,
    unlimited_ammo: bool,
) -> bool {
    let mount = match query::mount_clone(world, platform_track, mount_id) {
        Some(m) => m,
        None => return false,
    };
    let target = match query::target_state(world, target_track) {
        Some(t) => t,
        None => return false,
    };
    let distance = shooter.position.range_to(&target.position);
    can_engage(shooter, &mount, &target, distance, unlimited_ammo)
        .map(|d| d.engageable)
        .unwrap_or(false)
}

/// Slew one turreted mount toward its assigned target. Returns the remaining
/// angular error, or `None` for a fixed mount.
fn slew_toward(
    world: &mut World,
    shooter: &ShooterState,
    platform_track: u32,
    mount_id: u32,
    target_track: u32,
) -> Option<f64> {
    let mount = query::mount_clone(world, platform_track, mount_id)?;
    let mount_bearing = mount.turret.as_ref()?.mount_bearing_deg;
    let target = query::target_state(world, target_track)?;

    let bearing_deg = shooter.position.bearing_to(&target.position).to_degrees();
    let heading_deg = shooter.velocity.heading().to_degrees();
    let desired = wrap_deg(bearing_deg - heading_deg - mount_bearing);
    let elevation = shooter.position.elevation_to(&target.position).to_degrees();
    Some(sequencer::slew_turret(
        world,
        platform_track,
        mount_id,
        target_track,
        desired,
        elevation,
    ))
}

/// Expend rounds and accumulate heat. Returns (magazine dry, overheated).
fn fire_rounds(
    world: &mut World,
    platform_track: u32,
    mount_id: u32,
    rounds: u32,
    unlimited_ammo: bool,
) -> (bool, bool) {
    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if aboard.platform_track != platform_track || mount.mount_id != mount_id {
            continue;
        }
        if !unlimited_ammo {
            mount.status.ammo = mount.status.ammo.saturating_sub(rounds);
        }
        mount.status.heat += BURST_HEAT_PER_SEC * DT;
        let dry = !unlimited_ammo && mount.status.ammo == 0;
        return (dry, mount.status.overheated());
    }
    (true, false)
}

fn set_mid_burst(world: &mut World, platform_track: u32, mount_id: u32, value: bool) {
    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if aboard.platform_track == platform_track && mount.mount_id == mount_id {
            mount.status.mid_burst = value;
        }
    }
}

/// Close the burst window if this commitment opened one, clearing every
/// group mount it pinned.
fn end_burst_if_open(world: &mut World, c: &mut Commitment, events: &mut Vec<EngagementEvent>) {
    let open = match &c.routine {
        Routine::Burst(r) => r.phase == BurstPhase::Firing,
        _ => false,
    };
    if open {
        let (group_id, assignments) = match &c.routine {
            Routine::Burst(r) => (r.group_id, r.assignments.clone()),
            _ => (0, Vec::new()),
        };
        set_mid_burst(world, c.platform_track, c.mount_id, false);
        for (mount_id, _) in &assignments {
            set_mid_burst(world, c.platform_track, *mount_id, false);
        }
        events.push(EngagementEvent::BurstEnded { group_id });
    }
}
