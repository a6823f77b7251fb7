//! Engagement decision engine for the WARDEN combat platform core.
//!
//! Owns the hecs ECS world, runs the guard controller and firing
//! sequencers at a fixed tick rate, and produces `EngineSnapshot`s
//! for the surrounding simulation. Completely headless, enabling
//! deterministic testing.

pub mod commitment;
pub mod engine;
pub mod systems;
pub mod world_setup;

pub use engine::GuardEngine;
pub use warden_core as core;

#[cfg(test)]
mod tests;
