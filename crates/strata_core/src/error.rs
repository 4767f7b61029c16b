//! Errors raised while assembling an object hierarchy.
//!
//! Scene traversal and time control never fail loudly; only building
//! nodes from raw sample data can.

use thiserror::Error;

/// Errors that can occur while constructing scene objects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectError {
    #[error("Object name is empty")]
    EmptyName,

    #[error("Object name '{0}' contains a path separator")]
    InvalidName(String),

    #[error("Sample track has no samples")]
    EmptySamples,

    #[error("Sample times must strictly increase ({previous}ms followed by {next}ms)")]
    UnsortedSamples { previous: u64, next: u64 },

    #[error("Triangle index {index} out of range for {vertex_count} vertices at {time_ms}ms")]
    IndexOutOfRange {
        index: u32,
        vertex_count: usize,
        time_ms: u64,
    },

    #[error("Flat index list of length {index_count} is not a whole number of triangles")]
    PartialTriangle { index_count: usize },

    #[error("Curve vertex counts sum to {expected} but sample at {time_ms}ms has {actual} points")]
    CurveCountMismatch {
        expected: usize,
        actual: usize,
        time_ms: u64,
    },

    #[error("NURBS control grid {u_count}x{v_count} does not match {actual} points at {time_ms}ms")]
    ControlGridMismatch {
        u_count: usize,
        v_count: usize,
        actual: usize,
        time_ms: u64,
    },

    #[error("Invalid camera clip range: near {near}, far {far}")]
    InvalidClipRange { near: f32, far: f32 },

    #[error("Duplicate child name: {0}")]
    DuplicateChild(String),
}

/// Result type for object construction.
pub type ObjectResult<T> = Result<T, ObjectError>;
