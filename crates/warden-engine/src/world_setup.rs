//! World population helpers — platforms, subsystems, targets, and live
//! ordnance. Used by the engine's command handlers and by scenario tests.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use warden_core::components::*;
use warden_core::enums::*;
use warden_core::types::{Acceleration, Position, Velocity};

/// Spawn a combat platform running the guard controller.
/// Returns its entity and track id.
pub fn spawn_platform(
    world: &mut World,
    next_track_id: &mut u32,
    team: u8,
    position: Position,
    velocity: Velocity,
    status: PlatformStatus,
) -> (Entity, u32) {
    let track_id = *next_track_id;
    *next_track_id += 1;

    let track = TargetTrack {
        track_id,
        team,
        airborne: !status.surface_contact,
        surfaced: status.surface_contact,
        submerged: false,
        is_missile: false,
        detected_by: Vec::new(),
        engaged_by: Vec::new(),
        mass_t: 15.0,
        weapon_count: 0,
        damage_fraction: 0.0,
        threat_rating: 0.0,
        vip: false,
    };

    let entity = world.spawn((
        CombatPlatform,
        track,
        position,
        velocity,
        Acceleration::default(),
        status,
        GuardState::default(),
    ));
    (entity, track_id)
}

/// Mount a weapon aboard a platform. Group ids are assigned by the
/// inventory rescan; `0` here is a placeholder.
#[allow(clippy::too_many_arguments)]
pub fn add_weapon(
    world: &mut World,
    next_mount_id: &mut u32,
    platform_track: u32,
    name: &str,
    priority: u8,
    roles: EngageRoles,
    min_range_m: f64,
    max_range_m: f64,
    ammo: u32,
    spec: WeaponSpec,
    turret: Option<TurretMount>,
) -> u32 {
    let mount_id = *next_mount_id;
    *next_mount_id += 1;

    world.spawn((
        Aboard { platform_track },
        WeaponMount {
            mount_id,
            group_id: 0,
            name: name.to_string(),
            priority,
            roles,
            min_range_m,
            max_range_m,
            status: WeaponStatus {
                ammo,
                ..Default::default()
            },
            spec,
            turret,
        },
    ));
    mount_id
}

/// Fit a sensor subsystem aboard a platform.
pub fn add_sensor(world: &mut World, platform_track: u32, kind: SensorKind, enabled: bool) {
    world.spawn((
        Aboard { platform_track },
        Sensor {
            kind,
            enabled,
            max_locks: 2,
            locked_tracks: Vec::new(),
        },
    ));
}

/// Fit a weapon bay door aboard a platform.
pub fn add_bay(world: &mut World, platform_track: u32, bay_id: u32) {
    world.spawn((
        Aboard { platform_track },
        BayDoor {
            bay_id,
            state: BayState::Closed,
            settle_remaining_secs: 0.0,
            claims: 0,
        },
    ));
}

/// Fit a laser designator head aboard a platform.
pub fn add_designator(world: &mut World, platform_track: u32) {
    world.spawn((Aboard { platform_track }, Designator::default()));
}

/// Fit a countermeasure dispenser aboard a platform.
pub fn add_dispenser(
    world: &mut World,
    platform_track: u32,
    cm_type: CountermeasureType,
    rounds: u32,
    priority: u8,
) {
    world.spawn((
        Aboard { platform_track },
        CountermeasureDispenser {
            cm_type,
            rounds,
            priority,
            cooldown_remaining_secs: 0.0,
        },
    ));
}

/// Parameters for spawning a plain target track.
#[derive(Debug, Clone)]
pub struct TargetParams {
    pub team: u8,
    pub airborne: bool,
    pub surfaced: bool,
    pub submerged: bool,
    pub is_missile: bool,
    pub mass_t: f64,
    pub weapon_count: u32,
    pub threat_rating: f64,
    pub vip: bool,
}

impl Default for TargetParams {
    fn default() -> Self {
        Self {
            team: 1,
            airborne: false,
            surfaced: true,
            submerged: false,
            is_missile: false,
            mass_t: 10.0,
            weapon_count: 0,
            threat_rating: 0.5,
            vip: false,
        }
    }
}

/// Spawn a target track with kinematics. Returns its entity and track id.
pub fn spawn_target(
    world: &mut World,
    next_track_id: &mut u32,
    position: Position,
    velocity: Velocity,
    params: TargetParams,
) -> (Entity, u32) {
    let track_id = *next_track_id;
    *next_track_id += 1;

    let entity = world.spawn((
        TargetTrack {
            track_id,
            team: params.team,
            airborne: params.airborne,
            surfaced: params.surfaced,
            submerged: params.submerged,
            is_missile: params.is_missile,
            detected_by: Vec::new(),
            engaged_by: Vec::new(),
            mass_t: params.mass_t,
            weapon_count: params.weapon_count,
            damage_fraction: 0.0,
            threat_rating: params.threat_rating,
            vip: params.vip,
        },
        position,
        velocity,
        Acceleration::default(),
    ));
    (entity, track_id)
}

pub fn spawn_air_target(
    world: &mut World,
    next_track_id: &mut u32,
    team: u8,
    position: Position,
    velocity: Velocity,
) -> (Entity, u32) {
    spawn_target(
        world,
        next_track_id,
        position,
        velocity,
        TargetParams {
            team,
            airborne: true,
            surfaced: false,
            mass_t: 8.0,
            weapon_count: 2,
            threat_rating: 1.0,
            ..Default::default()
        },
    )
}

pub fn spawn_surface_target(
    world: &mut World,
    next_track_id: &mut u32,
    team: u8,
    position: Position,
    velocity: Velocity,
) -> (Entity, u32) {
    spawn_target(
        world,
        next_track_id,
        position,
        velocity,
        TargetParams {
            team,
            mass_t: 25.0,
            weapon_count: 1,
            ..Default::default()
        },
    )
}

pub fn spawn_submerged_target(
    world: &mut World,
    next_track_id: &mut u32,
    team: u8,
    position: Position,
    velocity: Velocity,
) -> (Entity, u32) {
    spawn_target(
        world,
        next_track_id,
        position,
        velocity,
        TargetParams {
            team,
            surfaced: false,
            submerged: true,
            mass_t: 40.0,
            ..Default::default()
        },
    )
}

/// Spawn an inbound enemy missile homing on `aimed_at_track`.
pub fn spawn_inbound_missile(
    world: &mut World,
    next_track_id: &mut u32,
    team: u8,
    position: Position,
    velocity: Velocity,
    aimed_at_track: u32,
    seeker: TargetingMode,
) -> (Entity, u32) {
    let track_id = *next_track_id;
    *next_track_id += 1;

    let entity = world.spawn((
        TargetTrack {
            track_id,
            team,
            airborne: true,
            surfaced: false,
            submerged: false,
            is_missile: true,
            detected_by: Vec::new(),
            engaged_by: Vec::new(),
            mass_t: 0.5,
            weapon_count: 0,
            damage_fraction: 0.0,
            threat_rating: 2.0,
            vip: false,
        },
        FiredOrdnance {
            team,
            kind: OrdnanceKind::Missile,
            origin_track: u32::MAX,
            aimed_at_track: Some(aimed_at_track),
            seeker,
        },
        position,
        velocity,
        Acceleration::default(),
    ));
    (entity, track_id)
}

/// Spawn a jittered wave of hostile air targets around a center point,
/// inbound toward the origin.
pub fn spawn_hostile_wave(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    next_track_id: &mut u32,
    team: u8,
    center: Position,
    count: usize,
) -> Vec<u32> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let position = Position::new(
            center.x + rng.gen_range(-2_000.0..2_000.0),
            center.y + rng.gen_range(-2_000.0..2_000.0),
            (center.z + rng.gen_range(-500.0..500.0)).max(100.0),
        );
        let speed = rng.gen_range(150.0..300.0);
        let horizontal = (position.x * position.x + position.y * position.y).sqrt().max(1.0);
        let velocity = Velocity::new(
            -position.x / horizontal * speed,
            -position.y / horizontal * speed,
            0.0,
        );
        let (_, id) = spawn_air_target(world, next_track_id, team, position, velocity);
        ids.push(id);
    }
    ids
}

/// Spawn a friendly round released by a sequencer.
#[allow(clippy::too_many_arguments)]
pub fn spawn_released_ordnance(
    world: &mut World,
    next_track_id: &mut u32,
    team: u8,
    kind: OrdnanceKind,
    origin_track: u32,
    aimed_at_track: Option<u32>,
    seeker: TargetingMode,
    position: Position,
    velocity: Velocity,
) -> (Entity, u32) {
    let track_id = *next_track_id;
    *next_track_id += 1;

    let entity = world.spawn((
        TargetTrack {
            track_id,
            team,
            airborne: true,
            surfaced: false,
            submerged: false,
            is_missile: kind == OrdnanceKind::Missile,
            detected_by: Vec::new(),
            engaged_by: Vec::new(),
            mass_t: 0.3,
            weapon_count: 0,
            damage_fraction: 0.0,
            threat_rating: 0.0,
            vip: false,
        },
        FiredOrdnance {
            team,
            kind,
            origin_track,
            aimed_at_track,
            seeker,
        },
        position,
        velocity,
        Acceleration::default(),
    ));
    (entity, track_id)
}
