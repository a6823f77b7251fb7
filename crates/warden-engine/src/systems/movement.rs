//! Movement integration — simple forward Euler over Position/Velocity.

use hecs::World;

use warden_core::constants::DT;
use warden_core::types::{Acceleration, Position, Velocity};

/// Integrate all moving entities by one tick.
pub fn run(world: &mut World) {
    for (_, (pos, vel, acc)) in world.query_mut::<(&mut Position, &mut Velocity, &Acceleration)>() {
        vel.x += acc.x * DT;
        vel.y += acc.y * DT;
        vel.z += acc.z * DT;
        pos.x += vel.x * DT;
        pos.y += vel.y * DT;
        pos.z += vel.z * DT;
    }
}
