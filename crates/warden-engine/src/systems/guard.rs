//! Guard controller — the periodic scan loop that owns target selection,
//! weapon selection, and commitment creation for each engaging platform.

use std::collections::HashMap;

use hecs::World;

use warden_core::components::*;
use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;
use warden_core::types::Position;

use crate::commitment::{BombRoutine, BurstRoutine, Commitment, MissileRoutine, Routine};
use crate::systems::{query, target_select, weapon_select};

/// Run the guard controller for one tick across all platforms.
pub fn run(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    next_commitment_id: &mut u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
    unlimited_ammo: bool,
) {
    update_detection(world, tick, events);

    for platform_track in query::platform_tracks(world) {
        let (engaging, scan_due) = advance_scan_timer(world, platform_track);
        if !engaging || !scan_due {
            continue;
        }
        scan(
            world,
            commitments,
            next_commitment_id,
            platform_track,
            tick,
            events,
            unlimited_ammo,
        );
    }
}

/// Upsert per-platform detection records for hostiles in detection range.
/// A hostile missile newly entering detection raises the missile warning.
fn update_detection(world: &mut World, tick: u64, events: &mut Vec<EngagementEvent>) {
    let platforms: Vec<(u32, u8, Position)> = world
        .query::<(&CombatPlatform, &TargetTrack, &Position)>()
        .iter()
        .map(|(_, (_, t, p))| (t.track_id, t.team, *p))
        .collect();

    let mut warnings: Vec<(u32, u32)> = Vec::new();

    for (_, (track, pos)) in world.query_mut::<(&mut TargetTrack, &Position)>() {
        for (platform_track, team, platform_pos) in &platforms {
            if track.team == *team || track.track_id == *platform_track {
                continue;
            }
            let in_range = platform_pos.range_to(pos) <= GUARD_DETECTION_RANGE;
            let existing = track
                .detected_by
                .iter_mut()
                .find(|d| d.platform_track == *platform_track);
            match (in_range, existing) {
                (true, Some(rec)) => rec.last_detected_tick = tick,
                (true, None) => {
                    track.detected_by.push(DetectionRecord {
                        platform_track: *platform_track,
                        last_detected_tick: tick,
                    });
                    if track.is_missile {
                        warnings.push((*platform_track, track.track_id));
                    }
                }
                (false, _) => {
                    track
                        .detected_by
                        .retain(|d| d.platform_track != *platform_track);
                }
            }
        }
    }

    for (platform_track, threat_track) in warnings {
        for (_, (_, track, guard)) in
            world.query_mut::<(&CombatPlatform, &TargetTrack, &mut GuardState)>()
        {
            if track.track_id == platform_track && guard.phase == GuardPhase::Engaging {
                guard.missile_warning = true;
                events.push(EngagementEvent::MissileWarning {
                    platform_track,
                    threat_track,
                });
            }
        }
    }
}

/// Tick the scan timer. Returns (engaging, scan fired this tick).
fn advance_scan_timer(world: &mut World, platform_track: u32) -> (bool, bool) {
    for (_, (_, track, guard)) in
        world.query_mut::<(&CombatPlatform, &TargetTrack, &mut GuardState)>()
    {
        if track.track_id != platform_track {
            continue;
        }
        if guard.phase != GuardPhase::Engaging {
            return (false, false);
        }
        if guard.missile_warning {
            // A fresh missile threat shortens the wait to the rescan floor.
            guard.scan_remaining_secs = guard.scan_remaining_secs.min(GUARD_THREAT_RESCAN);
            guard.missile_warning = false;
        }
        guard.scan_remaining_secs -= DT;
        if guard.scan_remaining_secs <= 0.0 {
            guard.scan_remaining_secs = GUARD_SCAN_INTERVAL;
            return (true, true);
        }
        return (true, false);
    }
    (false, false)
}

/// One full selection pass for one platform.
fn scan(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    next_commitment_id: &mut u32,
    platform_track: u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
    unlimited_ammo: bool,
) {
    let guard_snapshot = match guard_clone(world, platform_track) {
        Some(g) => g,
        None => return,
    };

    // Walk the target ladder, discarding any primary no weapon aboard can
    // serve, until a tier yields an engageable pairing. A tier is only a
    // stopping point when a weapon exists for its target.
    let mut unengageable: Vec<u32> = Vec::new();
    let mut held: Option<target_select::TargetSelection> = None;

    let (selection, choice) = loop {
        let selection =
            target_select::select(world, platform_track, &guard_snapshot, tick, &unengageable);
        let primary = match selection.primary {
            Some(p) => p,
            None => {
                match held.take() {
                    // Targets exist but nothing aboard can engage any of
                    // them. Holding fire is a normal outcome, not an error;
                    // the best target stays posted for the operator.
                    Some(first) => {
                        set_guard(world, platform_track, |g| {
                            g.primary_target = first.primary;
                            g.secondary_targets = first.secondaries;
                            g.selected_weapon = None;
                            g.fixed_weapon_solution = false;
                        });
                        events.push(EngagementEvent::HoldFire { platform_track });
                    }
                    None => {
                        set_guard(world, platform_track, |g| {
                            g.primary_target = None;
                            g.selected_weapon = None;
                            g.secondary_targets.clear();
                            g.fixed_weapon_solution = false;
                        });
                        events.push(EngagementEvent::NoTarget { platform_track });
                    }
                }
                return;
            }
        };
        match weapon_select::select(world, platform_track, primary, commitments, unlimited_ammo) {
            Some(choice) => break (selection, choice),
            None => {
                if held.is_none() {
                    held = Some(selection);
                }
                unengageable.push(primary);
            }
        }
    };

    let primary = match selection.primary {
        Some(p) => p,
        None => return,
    };

    let fixed_solution = query::mount_clone(world, platform_track, choice.mount_id)
        .map(|m| m.turret.is_none() && !m.commitment_exclusive())
        .unwrap_or(false);

    set_guard(world, platform_track, |g| {
        g.primary_target = Some(primary);
        g.secondary_targets = selection.secondaries.clone();
        g.selected_weapon = Some(choice.mount_id);
        g.fixed_weapon_solution = fixed_solution;
    });

    match choice.kind {
        WeaponKind::GuidedMissile | WeaponKind::UnpoweredBomb | WeaponKind::SubsurfaceWeapon => {
            commit(
                world,
                commitments,
                next_commitment_id,
                platform_track,
                choice.mount_id,
                primary,
                tick,
                events,
            );
        }
        WeaponKind::Gun | WeaponKind::Rocket | WeaponKind::DirectedEnergy => {
            if guard_snapshot.burst_mode {
                commit(
                    world,
                    commitments,
                    next_commitment_id,
                    platform_track,
                    choice.mount_id,
                    primary,
                    tick,
                    events,
                );
            }
        }
    }
}

/// Create a commitment binding one mount to one target, bump the target's
/// engagement counter, and emit the committed event. Shared with the manual
/// fire command path.
#[allow(clippy::too_many_arguments)]
pub fn commit(
    world: &mut World,
    commitments: &mut HashMap<u32, Commitment>,
    next_commitment_id: &mut u32,
    platform_track: u32,
    mount_id: u32,
    target_track: u32,
    tick: u64,
    events: &mut Vec<EngagementEvent>,
) -> Option<u32> {
    let mount = query::mount_clone(world, platform_track, mount_id)?;
    let kind = mount.kind();

    let already = commitments.values().any(|c| {
        !c.finished() && c.platform_track == platform_track && c.mount_id == mount_id
    });
    if already {
        return None;
    }

    let routine = match &mount.spec {
        WeaponSpec::GuidedMissile(spec) => Routine::Missile(MissileRoutine::new(spec.bay_id)),
        WeaponSpec::Subsurface(_) => Routine::Missile(MissileRoutine::new(None)),
        WeaponSpec::UnpoweredBomb(spec) => Routine::BombRun(BombRoutine::new(spec.bay_id)),
        WeaponSpec::Gun(_) | WeaponSpec::Rocket(_) | WeaponSpec::DirectedEnergy(_) => {
            Routine::Burst(BurstRoutine::new(mount.group_id))
        }
    };

    let id = *next_commitment_id;
    *next_commitment_id += 1;

    commitments.insert(
        id,
        Commitment {
            id,
            platform_track,
            mount_id,
            target_track,
            kind,
            start_tick: tick,
            finished_tick: None,
            outcome: None,
            routine,
        },
    );

    bump_engagement(world, target_track, platform_track, 1);

    events.push(EngagementEvent::WeaponCommitted {
        commitment_id: id,
        mount_id,
        target_track,
        kind,
    });
    Some(id)
}

/// Adjust a target's per-platform engagement counter by +1/-1.
pub fn bump_engagement(world: &mut World, target_track: u32, platform_track: u32, delta: i32) {
    for (_, track) in world.query_mut::<&mut TargetTrack>() {
        if track.track_id != target_track {
            continue;
        }
        match track
            .engaged_by
            .iter_mut()
            .find(|e| e.platform_track == platform_track)
        {
            Some(entry) => {
                entry.count = if delta > 0 {
                    entry.count + 1
                } else {
                    entry.count.saturating_sub(1)
                };
            }
            None if delta > 0 => track.engaged_by.push(PlatformCount {
                platform_track,
                count: 1,
            }),
            None => {}
        }
        track.engaged_by.retain(|e| e.count > 0);
    }
}

fn guard_clone(world: &World, platform_track: u32) -> Option<GuardState> {
    world
        .query::<(&CombatPlatform, &TargetTrack, &GuardState)>()
        .iter()
        .find(|(_, (_, t, _))| t.track_id == platform_track)
        .map(|(_, (_, _, g))| g.clone())
}

/// Apply a mutation to one platform's guard state.
pub fn set_guard(world: &mut World, platform_track: u32, f: impl FnOnce(&mut GuardState)) {
    for (_, (_, track, guard)) in
        world.query_mut::<(&CombatPlatform, &TargetTrack, &mut GuardState)>()
    {
        if track.track_id == platform_track {
            f(guard);
            return;
        }
    }
}
