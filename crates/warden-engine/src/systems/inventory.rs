//! Weapon inventory rescan — group assignment, role bookkeeping, and the
//! anti-emission flag.
//!
//! Mounts sharing a name and engagement parameters aboard one platform
//! share a group and ripple together; the group id is the single owner of
//! that association, assigned here every tick so hot-added or destroyed
//! mounts converge immediately. A same-named mount with a different range
//! window is a different group.

use std::collections::HashMap;

use hecs::World;

use warden_core::components::{Aboard, CombatPlatform, GuardState, TargetTrack, WeaponMount};
use warden_core::enums::TargetingMode;

/// Grouping key: platform, mount name, and the engagement-parameter window
/// (range bounds, bit-exact).
type GroupKey = (u32, String, u64, u64);

fn group_key(platform_track: u32, mount: &WeaponMount) -> GroupKey {
    (
        platform_track,
        mount.name.clone(),
        mount.min_range_m.to_bits(),
        mount.max_range_m.to_bits(),
    )
}

/// Run the inventory rescan for one tick.
pub fn run(world: &mut World) {
    // Group ids in deterministic mount-id order.
    let mut mounts: Vec<(u32, u32, GroupKey, bool)> = world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .map(|(_, (a, m))| {
            let anti_emission = m
                .spec
                .as_missile()
                .map(|s| s.targeting_mode == TargetingMode::AntiEmission)
                .unwrap_or(false);
            (a.platform_track, m.mount_id, group_key(a.platform_track, m), anti_emission)
        })
        .collect();
    mounts.sort_by_key(|(platform, mount_id, _, _)| (*platform, *mount_id));

    let mut group_ids: HashMap<GroupKey, u32> = HashMap::new();
    let mut next_group = 1u32;
    let mut anti_emission_platforms: Vec<u32> = Vec::new();
    let mut any_ammo: HashMap<u32, bool> = HashMap::new();

    for (platform, _, key, anti_emission) in &mounts {
        group_ids.entry(key.clone()).or_insert_with(|| {
            let id = next_group;
            next_group += 1;
            id
        });
        if *anti_emission {
            anti_emission_platforms.push(*platform);
        }
    }

    for (_, (aboard, mount)) in world.query_mut::<(&Aboard, &mut WeaponMount)>() {
        if let Some(&group) = group_ids.get(&group_key(aboard.platform_track, mount)) {
            mount.group_id = group;
        }
        let has = any_ammo.entry(aboard.platform_track).or_insert(false);
        *has |= mount.status.ammo > 0;
    }

    for (_, (_, track, guard)) in
        world.query_mut::<(&CombatPlatform, &TargetTrack, &mut GuardState)>()
    {
        guard.has_anti_emission = anti_emission_platforms.contains(&track.track_id);
        // A platform shot completely dry asks the autopilot to disengage.
        guard.request_disengage = !any_ammo.get(&track.track_id).copied().unwrap_or(false);
    }
}

/// Mount ids aboard a platform in group-then-mount order, for weapon cycling.
pub fn cycle_order(world: &World, platform_track: u32) -> Vec<u32> {
    let mut mounts: Vec<(u32, u32)> = world
        .query::<(&Aboard, &WeaponMount)>()
        .iter()
        .filter(|(_, (a, _))| a.platform_track == platform_track)
        .map(|(_, (_, m))| (m.group_id, m.mount_id))
        .collect();
    mounts.sort_unstable();
    mounts.into_iter().map(|(_, id)| id).collect()
}
