//! Sensor subsystem bookkeeping — enablement, lock management, and the
//! designator slew tick.
//!
//! Detection physics live outside this crate. The engine only commands
//! enable state and lock slots, and must never disturb a lock an active
//! commitment is riding.

use hecs::World;

use warden_core::components::{Aboard, Designator, Sensor, TargetTrack};
use warden_core::constants::DT;
use warden_core::enums::SensorKind;
use warden_select::context::{SensorAvailability, SensorStatus};

/// Advance designator slews and prune locks on dead tracks.
/// `protected` lists track ids active commitments are riding.
pub fn run(world: &mut World, protected: &[u32]) {
    let live: Vec<u32> = world
        .query::<&TargetTrack>()
        .iter()
        .map(|(_, t)| t.track_id)
        .collect();

    for (_, (_, sensor)) in world.query_mut::<(&Aboard, &mut Sensor)>() {
        sensor
            .locked_tracks
            .retain(|id| live.contains(id) || protected.contains(id));
    }

    for (_, (_, head)) in world.query_mut::<(&Aboard, &mut Designator)>() {
        if head.slew_target.is_some() && head.slew_remaining_secs > 0.0 {
            head.slew_remaining_secs -= DT;
            if head.slew_remaining_secs <= 0.0 {
                head.painted = head.slew_target.take();
                head.locked = true;
            }
        }
    }
}

/// Fitted/enabled snapshot of a platform's sensor fit.
pub fn availability(world: &World, platform_track: u32) -> SensorAvailability {
    let mut out = SensorAvailability::default();
    for (_, (aboard, sensor)) in world.query::<(&Aboard, &Sensor)>().iter() {
        if aboard.platform_track != platform_track {
            continue;
        }
        let status = SensorStatus {
            fitted: true,
            enabled: sensor.enabled,
        };
        match sensor.kind {
            SensorKind::Radar => out.radar = status,
            SensorKind::Infrared => out.infrared = status,
            SensorKind::Laser => out.laser = status,
            SensorKind::Sonar => out.sonar = status,
        }
    }
    out
}

/// Enable a sensor kind aboard a platform. Existing locks are untouched.
pub fn enable(world: &mut World, platform_track: u32, kind: SensorKind) {
    for (_, (aboard, sensor)) in world.query_mut::<(&Aboard, &mut Sensor)>() {
        if aboard.platform_track == platform_track && sensor.kind == kind {
            sensor.enabled = true;
        }
    }
}

/// Attempt a lock on `track_id` with the platform's sensor of `kind`.
///
/// Fails when the sensor is absent or off. When the lock table is full, the
/// oldest lock is evicted unless it is protected by an active commitment.
pub fn try_lock(world: &mut World, platform_track: u32, kind: SensorKind, track_id: u32, protected: &[u32]) -> bool {
    for (_, (aboard, sensor)) in world.query_mut::<(&Aboard, &mut Sensor)>() {
        if aboard.platform_track != platform_track || sensor.kind != kind {
            continue;
        }
        if !sensor.enabled {
            return false;
        }
        if sensor.locked_on(track_id) {
            return true;
        }
        if sensor.locked_tracks.len() >= sensor.max_locks as usize {
            let evictable = sensor
                .locked_tracks
                .iter()
                .position(|id| !protected.contains(id));
            match evictable {
                Some(idx) => {
                    sensor.locked_tracks.remove(idx);
                }
                None => return false,
            }
        }
        sensor.locked_tracks.push(track_id);
        return true;
    }
    false
}

/// Drop locks on one track across a platform's sensors.
pub fn drop_lock(world: &mut World, platform_track: u32, track_id: u32) {
    for (_, (aboard, sensor)) in world.query_mut::<(&Aboard, &mut Sensor)>() {
        if aboard.platform_track == platform_track {
            sensor.locked_tracks.retain(|id| *id != track_id);
        }
    }
}

/// Enable every sensor aboard a platform, restoring the standing fit after
/// a disengage safed it.
pub fn enable_all(world: &mut World, platform_track: u32) {
    for (_, (aboard, sensor)) in world.query_mut::<(&Aboard, &mut Sensor)>() {
        if aboard.platform_track == platform_track {
            sensor.enabled = true;
        }
    }
}

/// Disable every sensor aboard a platform and clear its locks.
pub fn safe_all(world: &mut World, platform_track: u32) {
    for (_, (aboard, sensor)) in world.query_mut::<(&Aboard, &mut Sensor)>() {
        if aboard.platform_track == platform_track {
            sensor.enabled = false;
            sensor.locked_tracks.clear();
        }
    }
}
