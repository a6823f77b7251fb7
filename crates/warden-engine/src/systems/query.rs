//! Read-only world lookups shared by the systems.

use hecs::{Entity, World};

use warden_core::components::{Aboard, CombatPlatform, PlatformStatus, TargetTrack, WeaponMount};
use warden_core::types::{Acceleration, Position, Velocity};
use warden_select::context::{ShooterState, TargetState};

/// Entity carrying the track with this id, if alive.
pub fn track_entity(world: &World, track_id: u32) -> Option<Entity> {
    world
        .query::<&TargetTrack>()
        .iter()
        .find(|(_, t)| t.track_id == track_id)
        .map(|(e, _)| e)
}

/// Position of a track, if alive.
pub fn track_position(world: &World, track_id: u32) -> Option<Position> {
    world
        .query::<(&TargetTrack, &Position)>()
        .iter()
        .find(|(_, (t, _))| t.track_id == track_id)
        .map(|(_, (_, p))| *p)
}

/// Shooter-side selection context for a platform.
pub fn shooter_state(world: &World, platform_track: u32) -> Option<ShooterState> {
    world
        .query::<(&CombatPlatform, &TargetTrack, &Position, &Velocity, &PlatformStatus)>()
        .iter()
        .find(|(_, (_, t, ..))| t.track_id == platform_track)
        .map(|(_, (_, _, pos, vel, status))| ShooterState {
            position: *pos,
            velocity: *vel,
            status: *status,
        })
}

/// Target-side selection context for a track.
pub fn target_state(world: &World, track_id: u32) -> Option<TargetState> {
    world
        .query::<(&TargetTrack, &Position, &Velocity, &Acceleration)>()
        .iter()
        .find(|(_, (t, ..))| t.track_id == track_id)
        .map(|(_, (t, pos, vel, acc))| TargetState::from_track(t, *pos, *vel, *acc))
}

/// Mount entity for (platform, mount id).
pub fn mount_entity(world: &World, platform_track: u32, mount_id: u32) -> Option<Entity> {
    world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .find(|(_, (a, m))| a.platform_track == platform_track && m.mount_id == mount_id)
        .map(|(e, _)| e)
}

/// Snapshot of one mount's data.
pub fn mount_clone(world: &World, platform_track: u32, mount_id: u32) -> Option<WeaponMount> {
    world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .find(|(_, (a, m))| a.platform_track == platform_track && m.mount_id == mount_id)
        .map(|(_, (_, m))| m.clone())
}

/// All platform track ids in the world, sorted for deterministic iteration.
pub fn platform_tracks(world: &World) -> Vec<u32> {
    let mut ids: Vec<u32> = world
        .query::<(&CombatPlatform, &TargetTrack)>()
        .iter()
        .map(|(_, (_, t))| t.track_id)
        .collect();
    ids.sort_unstable();
    ids
}

/// Team a track belongs to.
pub fn track_team(world: &World, track_id: u32) -> Option<u8> {
    world
        .query::<&TargetTrack>()
        .iter()
        .find(|(_, t)| t.track_id == track_id)
        .map(|(_, t)| t.team)
}
