//! Pure selection logic for the WARDEN engagement engine.
//!
//! Envelope validation, dynamic launch zones, launch authorization, and
//! per-kind fitness scoring as pure functions over plain data.
//! No ECS dependency — the engine crate copies world state into the
//! context structs before calling in.

pub mod context;
pub mod envelope;
pub mod error;
pub mod launch;
pub mod scoring;

pub use error::SelectError;
