//! Firing sequencers — per-kind multi-tick routines advanced once per tick.
//!
//! Every suspension point re-checks the cancellation guards before doing
//! anything else: target alive, mount alive and fed, guard still engaging.
//! Cancellation must leave no residue — bay claims released, turrets
//! unslaved, burst flags cleared.

pub mod bomb;
pub mod missile;
pub mod turret;

use std::collections::HashMap;

use hecs::World;

use warden_core::components::*;
use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;

use crate::commitment::{Commitment, Routine};
use crate::systems::{guard, query, sensors};

/// Advance every live commitment by one tick.
pub fn run(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    next_track_id: &mut u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
    unlimited_ammo: bool,
) {
    tick_bays(world, events);

    let protected = protected_tracks(commitments);
    let mut ids: Vec<u32> = commitments.keys().copied().collect();
    ids.sort_unstable();

    for id in ids {
        let mut c = match commitments.get(&id) {
            Some(c) if !c.finished() => c.clone(),
            _ => continue,
        };
        match &c.routine {
            Routine::Missile(_) => missile::advance(
                world,
                &mut c,
                next_track_id,
                tick,
                events,
                unlimited_ammo,
                &protected,
            ),
            Routine::BombRun(_) => {
                bomb::advance(world, &mut c, next_track_id, tick, events, unlimited_ammo)
            }
            Routine::Burst(_) => turret::advance(world, &mut c, tick, events, unlimited_ammo),
        }
        commitments.insert(id, c);
    }
}

/// Track ids that live commitments are riding; their sensor locks must not
/// be evicted by anyone else.
pub fn protected_tracks(commitments: &HashMap<u32, Commitment>) -> Vec<u32> {
    commitments
        .values()
        .filter(|c| !c.finished())
        .map(|c| c.target_track)
        .collect()
}

/// Advance bay doors: opening bays settle then report open, unclaimed bays
/// close.
fn tick_bays(world: &mut World, events: &mut Vec<EngagementEvent>) {
    for (_, (_, bay)) in world.query_mut::<(&Aboard, &mut BayDoor)>() {
        match bay.state {
            BayState::Opening => {
                bay.settle_remaining_secs -= DT;
                if bay.settle_remaining_secs <= 0.0 {
                    bay.state = BayState::Open;
                    events.push(EngagementEvent::BayOpened { bay_id: bay.bay_id });
                }
            }
            BayState::Open if bay.claims == 0 => {
                bay.state = BayState::Closed;
                events.push(EngagementEvent::BayClosed { bay_id: bay.bay_id });
            }
            _ => {}
        }
    }
}

/// Take one claim on a bay, commanding it open if closed.
pub fn claim_bay(world: &mut World, platform_track: u32, bay_id: u32) {
    for (_, (aboard, bay)) in world.query_mut::<(&Aboard, &mut BayDoor)>() {
        if aboard.platform_track == platform_track && bay.bay_id == bay_id {
            bay.claims += 1;
            if bay.state == BayState::Closed {
                bay.state = BayState::Opening;
                bay.settle_remaining_secs = BAY_SETTLE_TIME;
            }
        }
    }
}

/// Drop one claim on a bay. The door closes on the bay tick once no claims
/// remain, so double-release is harmless.
pub fn release_bay(world: &mut World, platform_track: u32, bay_id: u32) {
    for (_, (aboard, bay)) in world.query_mut::<(&Aboard, &mut BayDoor)>() {
        if aboard.platform_track == platform_track && bay.bay_id == bay_id {
            bay.claims = bay.claims.saturating_sub(1);
        }
    }
}

/// Whether a bay is open and settled.
pub fn bay_open(world: &World, platform_track: u32, bay_id: u32) -> bool {
    world
        .query::<(&Aboard, &BayDoor)>()
        .iter()
        .any(|(_, (a, b))| {
            a.platform_track == platform_track && b.bay_id == bay_id && b.state == BayState::Open
        })
}

/// Shared cancellation guard. `None` means carry on; `Some` is the outcome
/// to finish with.
pub fn cancellation(
    world: &World,
    c: &Commitment,
    unlimited_ammo: bool,
) -> Option<CommitmentOutcome> {
    // Target gone or destroyed.
    let target_alive = world
        .query::<&TargetTrack>()
        .iter()
        .any(|(_, t)| t.track_id == c.target_track && t.damage_fraction < 1.0);
    if !target_alive {
        return Some(CommitmentOutcome::Cancelled);
    }

    // Mount gone, uncrewed, or dry.
    let mount = match query::mount_clone(world, c.platform_track, c.mount_id) {
        Some(m) => m,
        None => return Some(CommitmentOutcome::Cancelled),
    };
    if !mount.status.crewed || (!unlimited_ammo && mount.status.ammo == 0) {
        return Some(CommitmentOutcome::Cancelled);
    }

    // Guard mode left while the routine was in flight.
    let engaging = world
        .query::<(&CombatPlatform, &TargetTrack, &GuardState)>()
        .iter()
        .any(|(_, (_, t, g))| t.track_id == c.platform_track && g.phase == GuardPhase::Engaging);
    if !engaging {
        return Some(CommitmentOutcome::Cancelled);
    }

    None
}

/// Terminate a commitment: record the outcome, decrement the engagement
/// counter, release bay claims and turret slaving, and emit the
/// cancellation event for pre-release outcomes.
pub fn finish(
    world: &mut World,
    c: &mut Commitment,
    outcome: CommitmentOutcome,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
) {
    c.outcome = Some(outcome);
    c.finished_tick = Some(tick);

    let bay = match &mut c.routine {
        Routine::Missile(r) => {
            r.phase = terminal_missile_phase(outcome);
            r.bay_claimed.then_some(r.bay_id).flatten()
        }
        Routine::BombRun(r) => {
            r.phase = match outcome {
                CommitmentOutcome::Released | CommitmentOutcome::DegradedRelease => {
                    BombRunPhase::Complete
                }
                _ => BombRunPhase::Aborted,
            };
            r.bay_claimed.then_some(r.bay_id).flatten()
        }
        Routine::Burst(r) => {
            r.phase = match outcome {
                CommitmentOutcome::Released => BurstPhase::Complete,
                _ => BurstPhase::Aborted,
            };
            None
        }
    };
    if let Some(bay_id) = bay {
        release_bay(world, c.platform_track, bay_id);
    }

    unslave_turret(world, c.platform_track, c.mount_id);
    clear_mid_burst(world, c.platform_track, c.mount_id);
    guard::bump_engagement(world, c.target_track, c.platform_track, -1);
    sensors::drop_lock(world, c.platform_track, c.target_track);

    if matches!(
        outcome,
        CommitmentOutcome::Cancelled | CommitmentOutcome::RefusedAtRelease
    ) {
        events.push(EngagementEvent::CommitmentCancelled {
            commitment_id: c.id,
            outcome,
        });
    }
}

fn terminal_missile_phase(outcome: CommitmentOutcome) -> MissileSequencePhase {
    match outcome {
        CommitmentOutcome::Released | CommitmentOutcome::DegradedRelease => {
            MissileSequencePhase::Complete
        }
        _ => MissileSequencePhase::Aborted,
    }
}

/// Release a turret from target slaving.
pub fn unslave_turret(world: &mut World, platform_track: u32, mount_id: u32) {
    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if aboard.platform_track == platform_track && mount.mount_id == mount_id {
            if let Some(turret) = &mut mount.turret {
                turret.slaved_to_track = None;
            }
        }
    }
}

fn clear_mid_burst(world: &mut World, platform_track: u32, mount_id: u32) {
    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if aboard.platform_track == platform_track && mount.mount_id == mount_id {
            mount.status.mid_burst = false;
        }
    }
}

/// Slew a turret's aim toward a desired offset/elevation at its slew rate.
/// Returns the remaining angular error in degrees.
pub fn slew_turret(
    world: &mut World,
    platform_track: u32,
    mount_id: u32,
    target_track: u32,
    desired_offset_deg: f64,
    desired_elevation_deg: f64,
) -> f64 {
    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if aboard.platform_track != platform_track || mount.mount_id != mount_id {
            continue;
        }
        let turret = match &mut mount.turret {
            Some(t) => t,
            None => return 0.0,
        };
        turret.slaved_to_track = Some(target_track);
        let step = turret.slew_rate_deg_s * DT;

        let yaw_err = desired_offset_deg - turret.aim_offset_deg;
        turret.aim_offset_deg += yaw_err.clamp(-step, step);
        let pitch_err = desired_elevation_deg - turret.aim_elevation_deg;
        turret.aim_elevation_deg += pitch_err.clamp(-step, step);

        let yaw_rem = (desired_offset_deg - turret.aim_offset_deg).abs();
        let pitch_rem = (desired_elevation_deg - turret.aim_elevation_deg).abs();
        return yaw_rem.max(pitch_rem);
    }
    0.0
}

/// Decrement a mount's ammunition, respecting unlimited-ammo mode.
pub fn expend_round(world: &mut World, platform_track: u32, mount_id: u32, unlimited_ammo: bool) {
    if unlimited_ammo {
        return;
    }
    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if aboard.platform_track == platform_track && mount.mount_id == mount_id {
            mount.status.ammo = mount.status.ammo.saturating_sub(1);
        }
    }
}
