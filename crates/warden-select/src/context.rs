//! Plain-data inputs to the selection functions.
//!
//! The engine snapshots world state into these before evaluation, so the
//! selection logic stays free of ECS queries.

use glam::DVec3;

use warden_core::components::{PlatformStatus, TargetTrack};
use warden_core::enums::{SensorKind, TargetClass};
use warden_core::types::{Acceleration, Position, Velocity};

/// The firing platform's kinematic and regime state.
#[derive(Debug, Clone, Copy)]
pub struct ShooterState {
    pub position: Position,
    pub velocity: Velocity,
    pub status: PlatformStatus,
}

impl ShooterState {
    pub fn speed(&self) -> f64 {
        self.velocity.speed()
    }

    /// Boresight reference direction: the velocity vector, or due North for a
    /// platform too slow to have a meaningful heading.
    pub fn boresight(&self) -> DVec3 {
        let v = self.velocity.to_dvec3();
        if v.length_squared() < 0.01 {
            DVec3::Y
        } else {
            v.normalize()
        }
    }
}

/// One target's state as seen at evaluation time.
#[derive(Debug, Clone, Copy)]
pub struct TargetState {
    pub track_id: u32,
    pub class: TargetClass,
    pub airborne: bool,
    pub position: Position,
    pub velocity: Velocity,
    pub acceleration: Acceleration,
    pub mass_t: f64,
}

impl TargetState {
    pub fn from_track(
        track: &TargetTrack,
        position: Position,
        velocity: Velocity,
        acceleration: Acceleration,
    ) -> Self {
        Self {
            track_id: track.track_id,
            class: track.classify(),
            airborne: track.airborne,
            position,
            velocity,
            acceleration,
            mass_t: track.mass_t,
        }
    }

    pub fn stationary(&self) -> bool {
        self.velocity.speed() < 0.5
    }

    /// Depth below the surface in meters (0 for anything at or above it).
    pub fn depth_m(&self) -> f64 {
        (-self.position.z).max(0.0)
    }
}

/// Fitted/enabled state of one sensor subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorStatus {
    /// Physically aboard the platform.
    pub fitted: bool,
    /// Currently powered up.
    pub enabled: bool,
}

impl SensorStatus {
    pub fn fitted_on() -> Self {
        Self {
            fitted: true,
            enabled: true,
        }
    }

    pub fn fitted_off() -> Self {
        Self {
            fitted: true,
            enabled: false,
        }
    }
}

/// Which sensor subsystems are fitted and enabled right now.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorAvailability {
    pub radar: SensorStatus,
    pub infrared: SensorStatus,
    pub laser: SensorStatus,
    pub sonar: SensorStatus,
}

impl SensorAvailability {
    pub fn status(&self, kind: SensorKind) -> SensorStatus {
        match kind {
            SensorKind::Radar => self.radar,
            SensorKind::Infrared => self.infrared,
            SensorKind::Laser => self.laser,
            SensorKind::Sonar => self.sonar,
        }
    }

    pub fn fitted(&self, kind: SensorKind) -> bool {
        self.status(kind).fitted
    }

    pub fn enabled(&self, kind: SensorKind) -> bool {
        self.status(kind).enabled
    }
}
