//! End-of-tick housekeeping — retiring finished commitments, expiring
//! overrides, despawning destroyed tracks, and weapon status decay.

use std::collections::HashMap;

use hecs::{Entity, World};

use warden_core::components::*;
use warden_core::constants::*;
use warden_core::enums::GuardPhase;

use crate::commitment::Commitment;

pub fn run(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    despawn_buffer: &mut Vec<Entity>,
    tick: u64,
) {
    retire_commitments(commitments, tick);
    expire_overrides(world, tick);
    decay_weapon_status(world);
    despawn_destroyed(world, despawn_buffer);
}

/// Finished commitments linger briefly for snapshot visibility, then go.
fn retire_commitments(commitments: &mut HashMap<u32, Commitment>, tick: u64) {
    let retire_ticks = (COMMITMENT_RETIRE_SECS / DT) as u64;
    commitments.retain(|_, c| match c.finished_tick {
        Some(finished) => tick.saturating_sub(finished) < retire_ticks,
        None => true,
    });
}

fn expire_overrides(world: &mut World, tick: u64) {
    for (_, (_, guard)) in world.query_mut::<(&CombatPlatform, &mut GuardState)>() {
        if guard.override_target.is_some() && tick >= guard.override_deadline_tick {
            guard.override_target = None;
        }
        if guard.phase == GuardPhase::Disengaged {
            guard.request_extend = false;
        }
    }
}

/// Heat dissipates and reloads count down while a mount is not firing.
fn decay_weapon_status(world: &mut World) {
    for (_, (_, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if !mount.status.mid_burst {
            mount.status.heat = (mount.status.heat - HEAT_DISSIPATION_PER_SEC * DT).max(0.0);
        }
        if mount.status.reload_remaining_secs > 0.0 {
            mount.status.reload_remaining_secs -= DT;
        }
    }
}

fn despawn_destroyed(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    for (entity, (track, platform)) in world
        .query::<(&TargetTrack, Option<&CombatPlatform>)>()
        .iter()
    {
        if track.damage_fraction >= 1.0 && platform.is_none() {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
