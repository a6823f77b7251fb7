//! Tiered target selection.
//!
//! The ladder runs top-down and stops at the first tier that yields a
//! target: operator override, missiles inbound on this platform, unengaged
//! enemy missiles, the configured policy over detected targets, nearest
//! visible, low-priority missiles, and finally an exhaustive sweep over
//! every hostile track. Secondary targets come from the policy ordering.
//!
//! Tracks the caller has proven unengageable are excluded up front, so the
//! guard scan can re-run the ladder until a tier yields a target its
//! armament can actually serve.

use hecs::World;

use warden_core::components::{CombatPlatform, FiredOrdnance, GuardState, TargetTrack};
use warden_core::constants::*;
use warden_core::enums::TargetPolicy;
use warden_core::types::{Acceleration, Position, Velocity};
use warden_select::scoring::{target_priority_score, TargetScoreInputs};

/// Outcome of one selection pass.
#[derive(Debug, Clone, Default)]
pub struct TargetSelection {
    pub primary: Option<u32>,
    pub secondaries: Vec<u32>,
}

#[derive(Debug, Clone)]
struct Candidate {
    track_id: u32,
    is_missile: bool,
    aimed_at_self: bool,
    detected: bool,
    range_m: f64,
    closing_rate: f64,
    acceleration: f64,
    weapon_count: u32,
    mass_t: f64,
    damage_fraction: f64,
    engagement_count: u32,
    own_engagements: u32,
    threat_rating: f64,
    vip: bool,
    /// Another friendly platform already calls this its primary.
    claimed_by_friendly: bool,
}

/// Run the tier ladder for one platform. `excluded` tracks never surface as
/// primary or secondary.
pub fn select(
    world: &World,
    platform_track: u32,
    guard: &GuardState,
    tick: u64,
    excluded: &[u32],
) -> TargetSelection {
    let (own_team, own_pos, own_vel) = match platform_kinematics(world, platform_track) {
        Some(v) => v,
        None => return TargetSelection::default(),
    };

    let friendly_primaries: Vec<u32> = world
        .query::<(&CombatPlatform, &TargetTrack, &GuardState)>()
        .iter()
        .filter(|(_, (_, t, _))| t.track_id != platform_track)
        .filter_map(|(_, (_, _, g))| g.primary_target)
        .collect();

    let mut candidates = collect_candidates(
        world,
        platform_track,
        own_team,
        own_pos,
        own_vel,
        &friendly_primaries,
    );
    candidates.retain(|c| !excluded.contains(&c.track_id));
    // Deterministic base order.
    candidates.sort_by_key(|c| c.track_id);

    // Tier 1: operator override, while it lasts and the track lives.
    if let Some(override_id) = guard.override_target {
        if tick < guard.override_deadline_tick
            && candidates.iter().any(|c| c.track_id == override_id)
        {
            return with_secondaries(override_id, guard, &candidates, own_pos);
        }
    }

    // Tier 2: missiles homing on this platform, nearest first.
    if let Some(primary) = nearest(candidates.iter().filter(|c| c.aimed_at_self)) {
        return with_secondaries(primary, guard, &candidates, own_pos);
    }

    // Tier 3: hostile missiles nobody is engaging yet.
    if let Some(primary) = nearest(
        candidates
            .iter()
            .filter(|c| c.is_missile && c.detected && c.engagement_count == 0),
    ) {
        return with_secondaries(primary, guard, &candidates, own_pos);
    }

    // Tier 4: configured policy over detected non-missile hostiles.
    // Mutual aid: targets already claimed as a friendly's primary drop out
    // of this tier when unclaimed alternatives exist.
    let policy_pool: Vec<&Candidate> = {
        let detected: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.detected && !c.is_missile)
            .collect();
        let unclaimed: Vec<&Candidate> = detected
            .iter()
            .copied()
            .filter(|c| !c.claimed_by_friendly)
            .collect();
        if unclaimed.is_empty() {
            detected
        } else {
            unclaimed
        }
    };
    if let Some(primary) = apply_policy(guard, &policy_pool) {
        return with_secondaries(primary, guard, &candidates, own_pos);
    }

    // Tier 5: nearest detected hostile of any class.
    if let Some(primary) = nearest(candidates.iter().filter(|c| c.detected)) {
        return with_secondaries(primary, guard, &candidates, own_pos);
    }

    // Tier 6: hostile missiles not aimed here and already engaged elsewhere.
    if let Some(primary) = nearest(candidates.iter().filter(|c| c.is_missile)) {
        return with_secondaries(primary, guard, &candidates, own_pos);
    }

    // Tier 7: exhaustive — anything hostile at all.
    match nearest(candidates.iter()) {
        Some(primary) => with_secondaries(primary, guard, &candidates, own_pos),
        None => TargetSelection::default(),
    }
}

fn platform_kinematics(world: &World, platform_track: u32) -> Option<(u8, Position, Velocity)> {
    world
        .query::<(&CombatPlatform, &TargetTrack, &Position, &Velocity)>()
        .iter()
        .find(|(_, (_, t, ..))| t.track_id == platform_track)
        .map(|(_, (_, t, pos, vel))| (t.team, *pos, *vel))
}

fn collect_candidates(
    world: &World,
    platform_track: u32,
    own_team: u8,
    own_pos: Position,
    own_vel: Velocity,
    friendly_primaries: &[u32],
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (entity, (track, pos, vel, acc)) in world
        .query::<(&TargetTrack, &Position, &Velocity, &Acceleration)>()
        .iter()
    {
        if track.team == own_team || track.damage_fraction >= 1.0 {
            continue;
        }

        let range = own_pos.range_to(pos);
        let aimed_at_self = world
            .get::<&FiredOrdnance>(entity)
            .map(|o| o.aimed_at_track == Some(platform_track))
            .unwrap_or(false);

        // Range rate along the line of sight; positive means closing.
        let closing_rate = if range > 1.0 {
            let los = (own_pos.to_dvec3() - pos.to_dvec3()) / range;
            (vel.to_dvec3() - own_vel.to_dvec3()).dot(los)
        } else {
            0.0
        };

        out.push(Candidate {
            track_id: track.track_id,
            is_missile: track.is_missile,
            aimed_at_self,
            detected: track.detected_by(platform_track),
            range_m: range,
            closing_rate,
            acceleration: acc.magnitude(),
            weapon_count: track.weapon_count,
            mass_t: track.mass_t,
            damage_fraction: track.damage_fraction,
            engagement_count: track.engagement_count(),
            own_engagements: track.engagement_count_for(platform_track),
            threat_rating: track.threat_rating,
            vip: track.vip,
            claimed_by_friendly: friendly_primaries.contains(&track.track_id),
        });
    }
    out
}

fn nearest<'a>(iter: impl Iterator<Item = &'a Candidate>) -> Option<u32> {
    iter.min_by(|a, b| {
        a.range_m
            .partial_cmp(&b.range_m)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
    .map(|c| c.track_id)
}

fn apply_policy(guard: &GuardState, pool: &[&Candidate]) -> Option<u32> {
    match guard.policy {
        TargetPolicy::Nearest => {
            let best = pool.iter().min_by(|a, b| {
                a.range_m
                    .partial_cmp(&b.range_m)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
            // Hysteresis: keep the incumbent unless the challenger is closer
            // by a real margin, so two near-equidistant targets don't flip
            // the solution every scan.
            if let Some(incumbent_id) = guard.primary_target {
                if let Some(incumbent) = pool.iter().find(|c| c.track_id == incumbent_id) {
                    if best.range_m >= incumbent.range_m * NEAREST_TARGET_HYSTERESIS {
                        return Some(incumbent.track_id);
                    }
                }
            }
            Some(best.track_id)
        }
        TargetPolicy::WeightedScore => pool
            .iter()
            .max_by(|a, b| {
                priority_of(a)
                    .partial_cmp(&priority_of(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|c| c.track_id),
        TargetPolicy::LeastEngaged => pool
            .iter()
            .min_by(|a, b| {
                (a.engagement_count, a.range_m as u64).cmp(&(b.engagement_count, b.range_m as u64))
            })
            .map(|c| c.track_id),
    }
}

fn priority_of(c: &Candidate) -> f64 {
    target_priority_score(&TargetScoreInputs {
        range_m: c.range_m,
        closing_rate: c.closing_rate,
        acceleration: c.acceleration,
        weapon_count: c.weapon_count,
        mass_t: c.mass_t,
        damage_fraction: c.damage_fraction,
        friendlies_engaging: c.engagement_count.saturating_sub(c.own_engagements),
        threat_rating: c.threat_rating,
        vip: c.vip,
    })
}

fn with_secondaries(
    primary: u32,
    guard: &GuardState,
    candidates: &[Candidate],
    _own_pos: Position,
) -> TargetSelection {
    let mut rest: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.track_id != primary && c.detected)
        .collect();
    match guard.policy {
        TargetPolicy::WeightedScore => rest.sort_by(|a, b| {
            priority_of(b)
                .partial_cmp(&priority_of(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        _ => rest.sort_by(|a, b| {
            a.range_m
                .partial_cmp(&b.range_m)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
    TargetSelection {
        primary: Some(primary),
        secondaries: rest
            .into_iter()
            .take(MAX_SECONDARY_TARGETS)
            .map(|c| c.track_id)
            .collect(),
    }
}
