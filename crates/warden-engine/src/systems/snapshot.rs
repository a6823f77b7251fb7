//! Snapshot system: queries the ECS world and builds a complete
//! `EngineSnapshot`.
//!
//! This system is read-only — it never modifies the world.

use std::collections::HashMap;

use hecs::World;

use warden_core::components::*;
use warden_core::events::EngagementEvent;
use warden_core::state::*;
use warden_core::types::{Position, SimTime, Velocity};

use crate::commitment::Commitment;

/// Build a complete snapshot from the current world state.
pub fn build(
    world: &World,
    time: &SimTime,
    paused: bool,
    commitments: &HashMap<u32, Commitment>,
    events: Vec<EngagementEvent>,
) -> EngineSnapshot {
    EngineSnapshot {
        time: *time,
        paused,
        platforms: build_platforms(world),
        tracks: build_tracks(world),
        commitments: build_commitments(commitments),
        events,
    }
}

fn build_platforms(world: &World) -> Vec<PlatformView> {
    let mut platforms: Vec<PlatformView> = world
        .query::<(&CombatPlatform, &TargetTrack, &Position, &GuardState)>()
        .iter()
        .map(|(_, (_, track, pos, guard))| PlatformView {
            track_id: track.track_id,
            team: track.team,
            position: *pos,
            guard_phase: guard.phase,
            policy: guard.policy,
            burst_mode: guard.burst_mode,
            primary_target: guard.primary_target,
            selected_weapon: guard.selected_weapon,
            secondary_targets: guard.secondary_targets.clone(),
            fixed_weapon_solution: guard.fixed_weapon_solution,
            request_extend: guard.request_extend,
            request_disengage: guard.request_disengage,
            weapons: build_weapons(world, track.track_id),
            sensors: build_sensors(world, track.track_id),
            bays: build_bays(world, track.track_id),
        })
        .collect();
    platforms.sort_by_key(|p| p.track_id);
    platforms
}

fn build_weapons(world: &World, platform_track: u32) -> Vec<WeaponView> {
    let mut weapons: Vec<WeaponView> = world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .filter(|(_, (a, _))| a.platform_track == platform_track)
        .map(|(_, (_, m))| WeaponView {
            mount_id: m.mount_id,
            group_id: m.group_id,
            name: m.name.clone(),
            kind: m.kind(),
            priority: m.priority,
            ammo: m.status.ammo,
            reloading: m.status.reloading(),
            overheated: m.status.overheated(),
            mid_burst: m.status.mid_burst,
        })
        .collect();
    weapons.sort_by_key(|w| w.mount_id);
    weapons
}

fn build_sensors(world: &World, platform_track: u32) -> Vec<SensorView> {
    let mut sensors: Vec<SensorView> = world
        .query::<(&Aboard, &Sensor)>()
        .iter()
        .filter(|(_, (a, _))| a.platform_track == platform_track)
        .map(|(_, (_, s))| SensorView {
            kind: s.kind,
            enabled: s.enabled,
            locked_tracks: s.locked_tracks.clone(),
        })
        .collect();
    sensors.sort_by_key(|s| format!("{:?}", s.kind));
    sensors
}

fn build_bays(world: &World, platform_track: u32) -> Vec<BayView> {
    let mut bays: Vec<BayView> = world
        .query::<(&Aboard, &BayDoor)>()
        .iter()
        .filter(|(_, (a, _))| a.platform_track == platform_track)
        .map(|(_, (_, b))| BayView {
            bay_id: b.bay_id,
            state: b.state,
            claims: b.claims,
        })
        .collect();
    bays.sort_by_key(|b| b.bay_id);
    bays
}

fn build_tracks(world: &World) -> Vec<TrackView> {
    let mut tracks: Vec<TrackView> = world
        .query::<(&TargetTrack, &Position, &Velocity)>()
        .iter()
        .map(|(_, (track, pos, vel))| TrackView {
            track_id: track.track_id,
            team: track.team,
            position: *pos,
            speed: vel.speed(),
            heading: vel.heading(),
            class: Some(track.classify()),
            is_missile: track.is_missile,
            engagement_count: track.engagement_count(),
        })
        .collect();
    tracks.sort_by_key(|t| t.track_id);
    tracks
}

fn build_commitments(commitments: &HashMap<u32, Commitment>) -> Vec<CommitmentView> {
    let mut views: Vec<CommitmentView> = commitments
        .values()
        .map(|c| CommitmentView {
            commitment_id: c.id,
            platform_track: c.platform_track,
            mount_id: c.mount_id,
            target_track: c.target_track,
            kind: c.kind,
            phase: c.phase_name(),
        })
        .collect();
    views.sort_by_key(|v| v.commitment_id);
    views
}
