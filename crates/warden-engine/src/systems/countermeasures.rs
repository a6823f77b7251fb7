//! Countermeasure dispatcher — evaluated every tick, unlike the guard scan.
//!
//! Inbound threats are matched to a payload by seeker type; a dispatch
//! ejects a salvo from the highest-priority ready dispenser of that type
//! and latches the in-flight flag until no matching threat remains.

use hecs::World;

use warden_core::components::*;
use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;
use warden_core::types::{Position, Velocity};

use crate::systems::query;

/// Run the dispatcher for one tick.
pub fn run(world: &mut World, events: &mut Vec<EngagementEvent>) {
    tick_cooldowns(world);

    for platform_track in query::platform_tracks(world) {
        evaluate(world, platform_track, events);
    }
}

fn tick_cooldowns(world: &mut World) {
    for (_, (_, dispenser)) in world.query_mut::<(&Aboard, &mut CountermeasureDispenser)>() {
        if dispenser.cooldown_remaining_secs > 0.0 {
            dispenser.cooldown_remaining_secs -= DT;
        }
    }
}

/// Payload matched to a seeker type.
fn payload_for(seeker: TargetingMode, submerged_threat: bool) -> CountermeasureType {
    if submerged_threat {
        return CountermeasureType::Bubbles;
    }
    match seeker {
        TargetingMode::Heat => CountermeasureType::Flare,
        TargetingMode::RadarActive | TargetingMode::RadarSemiActive => CountermeasureType::Chaff,
        TargetingMode::Laser => CountermeasureType::Smoke,
        _ => CountermeasureType::Decoy,
    }
}

fn evaluate(world: &mut World, platform_track: u32, events: &mut Vec<EngagementEvent>) {
    let (own_team, own_pos, own_vel, engaging) = match world
        .query::<(&CombatPlatform, &TargetTrack, &Position, &Velocity, &GuardState)>()
        .iter()
        .find(|(_, (_, t, ..))| t.track_id == platform_track)
        .map(|(_, (_, t, pos, vel, g))| (t.team, *pos, *vel, g.phase == GuardPhase::Engaging))
    {
        Some(v) => v,
        None => return,
    };
    if !engaging {
        return;
    }

    // Threats demanding a response right now, grouped by payload type.
    let mut demanded: Vec<(CountermeasureType, u32)> = Vec::new();
    for (_, (track, ordnance, pos, vel)) in world
        .query::<(&TargetTrack, &FiredOrdnance, &Position, &Velocity)>()
        .iter()
    {
        if track.team == own_team || ordnance.aimed_at_track != Some(platform_track) {
            continue;
        }
        let range = own_pos.range_to(pos);
        let los = (own_pos.to_dvec3() - pos.to_dvec3()) / range.max(1.0);
        let closing = (vel.to_dvec3() - own_vel.to_dvec3()).dot(los);
        let closing_time = if closing > 0.0 { range / closing } else { f64::MAX };

        if range <= CM_REACTION_RANGE || closing_time <= CM_CLOSING_TIME_THRESHOLD {
            let payload = payload_for(ordnance.seeker, pos.z < 0.0);
            demanded.push((payload, track.track_id));
        }
    }

    // Latch release: payload types with no live demand clear their flag.
    let mut flags = match guard_flags(world, platform_track) {
        Some(f) => f,
        None => return,
    };
    for cm in [
        CountermeasureType::Flare,
        CountermeasureType::Chaff,
        CountermeasureType::Smoke,
        CountermeasureType::Decoy,
        CountermeasureType::Bubbles,
    ] {
        if flags.get(cm) && !demanded.iter().any(|(p, _)| *p == cm) {
            flags.set(cm, false);
        }
    }

    demanded.sort_by_key(|(_, track)| *track);
    for (payload, threat_track) in demanded {
        if flags.get(payload) {
            continue;
        }
        if dispatch(world, platform_track, payload) {
            flags.set(payload, true);
            events.push(EngagementEvent::CountermeasureDispatched {
                platform_track,
                cm_type: payload,
                threat_track,
            });
        }
    }

    set_guard_flags(world, platform_track, flags);
}

/// Eject one salvo of `payload` from the best ready dispenser aboard.
/// Returns false when no dispenser can serve the request.
pub fn dispatch(world: &mut World, platform_track: u32, payload: CountermeasureType) -> bool {
    let mut best: Option<(hecs::Entity, u8)> = None;
    for (entity, (aboard, dispenser)) in world.query::<(&Aboard, &CountermeasureDispenser)>().iter()
    {
        if aboard.platform_track != platform_track
            || dispenser.cm_type != payload
            || dispenser.rounds == 0
            || dispenser.cooldown_remaining_secs > 0.0
        {
            continue;
        }
        if best.map(|(_, p)| dispenser.priority > p).unwrap_or(true) {
            best = Some((entity, dispenser.priority));
        }
    }
    let entity = match best {
        Some((e, _)) => e,
        None => return false,
    };
    if let Ok(mut dispenser) = world.get::<&mut CountermeasureDispenser>(entity) {
        dispenser.rounds = dispenser.rounds.saturating_sub(CM_SALVO_SIZE);
        dispenser.cooldown_remaining_secs = CM_DISPENSER_COOLDOWN;
        return true;
    }
    false
}

fn guard_flags(world: &World, platform_track: u32) -> Option<CountermeasureFlags> {
    world
        .query::<(&CombatPlatform, &TargetTrack, &GuardState)>()
        .iter()
        .find(|(_, (_, t, _))| t.track_id == platform_track)
        .map(|(_, (_, _, g))| g.cm_in_flight)
}

fn set_guard_flags(world: &mut World, platform_track: u32, flags: CountermeasureFlags) {
    for (_, (_, track, guard)) in
        world.query_mut::<(&CombatPlatform, &TargetTrack, &mut GuardState)>()
    {
        if track.track_id == platform_track {
            guard.cm_in_flight = flags;
        }
    }
}
