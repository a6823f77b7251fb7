//! The single-evaluation error boundary.
//!
//! Malformed state encountered while evaluating one candidate becomes a
//! `SelectError`. The engine catches it at the per-candidate boundary, logs
//! it, and treats the candidate as failing — it never halts the scan.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("track {0} has no kinematic state")]
    MissingKinematics(u32),
    #[error("weapon mount {0} no longer exists")]
    MissingMount(u32),
    #[error("track {0} no longer exists")]
    MissingTrack(u32),
    #[error("degenerate geometry between shooter and target")]
    DegenerateGeometry,
}
