//! Point-defense sub-loop — a fast cadence independent of the guard scan
//! that pairs direct-fire mounts with inbound ordnance.

use std::collections::HashMap;

use hecs::World;

use warden_core::components::*;
use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;
use warden_core::types::{Position, Velocity};

use crate::commitment::Commitment;
use crate::systems::{guard, query};

/// Run the point-defense loop for one tick.
pub fn run(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    next_commitment_id: &mut u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
) {
    for platform_track in query::platform_tracks(world) {
        let due = advance_timer(world, platform_track);
        if !due {
            continue;
        }
        assign(
            world,
            commitments,
            next_commitment_id,
            platform_track,
            tick,
            events,
        );
    }
}

fn advance_timer(world: &mut World, platform_track: u32) -> bool {
    for (_, (_, track, guard)) in
        world.query_mut::<(&CombatPlatform, &TargetTrack, &mut GuardState)>()
    {
        if track.track_id != platform_track {
            continue;
        }
        if guard.phase != GuardPhase::Engaging {
            return false;
        }
        guard.point_defense_remaining_secs -= DT;
        if guard.point_defense_remaining_secs <= 0.0 {
            guard.point_defense_remaining_secs = POINT_DEFENSE_INTERVAL;
            return true;
        }
        return false;
    }
    false
}

fn assign(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    next_commitment_id: &mut u32,
    platform_track: u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
) {
    let (own_team, own_pos, own_vel) = match platform_kinematics(world, platform_track) {
        Some(v) => v,
        None => return,
    };

    // Inbound threats: enemy live ordnance inside the defended bubble with
    // closing geometry, nearest first.
    let mut threats: Vec<(u32, f64)> = world
        .query::<(&TargetTrack, &FiredOrdnance, &Position, &Velocity)>()
        .iter()
        .filter(|(_, (t, o, ..))| t.team != own_team && o.kind == OrdnanceKind::Missile)
        .filter_map(|(_, (t, o, pos, vel))| {
            let range = own_pos.range_to(pos);
            if range > POINT_DEFENSE_RANGE {
                return None;
            }
            let los = (own_pos.to_dvec3() - pos.to_dvec3()) / range.max(1.0);
            let closing = (vel.to_dvec3() - own_vel.to_dvec3()).dot(los);
            let inbound = o.aimed_at_track == Some(platform_track) || closing > 0.0;
            inbound.then_some((t.track_id, range))
        })
        .collect();
    threats.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    if threats.is_empty() {
        return;
    }

    // Free anti-missile direct-fire mounts, in priority-then-id order.
    let mut mounts: Vec<(u32, u8)> = world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .filter(|(_, (a, m))| {
            a.platform_track == platform_track
                && m.roles.eligible(TargetClass::Missile)
                && !m.commitment_exclusive()
                && !m.status.mid_burst
                && !m.status.overheated()
                && m.status.ammo > 0
                && !commitments
                    .values()
                    .any(|c| !c.finished() && c.mount_id == m.mount_id)
        })
        .map(|(_, (_, m))| (m.mount_id, m.priority))
        .collect();
    mounts.sort_by_key(|(id, prio)| (std::cmp::Reverse(*prio), *id));

    // Round-robin mounts over threats, bounded per threat so one inbound
    // round can't soak up the whole battery.
    let mut mount_iter = mounts.into_iter();
    for (threat_track, _) in threats {
        let engaged = commitments
            .values()
            .filter(|c| !c.finished() && c.target_track == threat_track)
            .count();
        if engaged >= POINT_DEFENSE_MAX_PER_THREAT {
            continue;
        }
        let (mount_id, _) = match mount_iter.next() {
            Some(m) => m,
            None => break,
        };
        if guard::commit(
            world,
            commitments,
            next_commitment_id,
            platform_track,
            mount_id,
            threat_track,
            tick,
            events,
        )
        .is_some()
        {
            events.push(EngagementEvent::PointDefenseAssigned {
                mount_id,
                threat_track,
            });
        }
    }
}

fn platform_kinematics(world: &World, platform_track: u32) -> Option<(u8, Position, Velocity)> {
    world
        .query::<(&CombatPlatform, &TargetTrack, &Position, &Velocity)>()
        .iter()
        .find(|(_, (_, t, ..))| t.track_id == platform_track)
        .map(|(_, (_, t, pos, vel))| (t.team, *pos, *vel))
}
