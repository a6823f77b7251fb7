//! All engine systems. Each is a free function taking `&mut World` plus
//! whatever engine state it needs, run in a fixed order each tick.

pub mod cleanup;
pub mod countermeasures;
pub mod guard;
pub mod inventory;
pub mod movement;
pub mod point_defense;
pub mod query;
pub mod sensors;
pub mod sequencer;
pub mod snapshot;
pub mod target_select;
pub mod weapon_select;
