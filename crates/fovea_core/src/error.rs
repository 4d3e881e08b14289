//! Failure classes for mesh generation.
//!
//! Everything here is surfaced synchronously to the caller of a generator
//! entry point; there is no retry or partial-mesh recovery. The variants
//! split into three classes: caller preconditions, ill-behaved projection
//! models, and runaway generation tripping a safety bound.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("radial resolution k must be at least 1")]
    ZeroRadialResolution,

    #[error("object height must be finite and positive (got {0})")]
    InvalidHeight(f64),

    #[error("maximum distance must be finite and positive (got {0})")]
    InvalidMaxDistance(f64),

    #[error("shape returned a non-finite polar angle for radial step {v}")]
    NonFinitePolarAngle { v: f64 },

    #[error("shape polar angle must increase with radial step: phi({v}) = {phi} is not above the previous ring's {previous}")]
    NonMonotonicPolarAngle { v: f64, phi: f64, previous: f64 },

    #[error("shape polar angle {phi} at radial step {v} reached the horizon; the stopping distance is unreachable")]
    HorizonReached { v: f64, phi: f64 },

    #[error("shape returned a non-positive or non-finite angular resolution {theta} at polar angle {phi}")]
    InvalidAngularResolution { theta: f64, phi: f64 },

    #[error("ring budget of {limit} exhausted before reaching the stopping distance")]
    RingBudgetExhausted { limit: usize },

    #[error("node budget of {limit} exhausted before reaching the stopping distance ({nodes} nodes)")]
    NodeBudgetExhausted { limit: usize, nodes: usize },
}
