//! Common utilities and error types shared by the polypath crates
//!
//! Everything here works on a Y-up coordinate system. "2D" helpers operate on
//! the XZ ground plane and ignore height.

mod geometry;
mod math;
mod vector;

pub use geometry::*;
pub use math::*;
pub use vector::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid input mesh: {0}")]
    InvalidMesh(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no path from node {start} to node {target}")]
    NoPath { start: u32, target: u32 },

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

/// Result type for polypath operations
pub type Result<T> = std::result::Result<T, Error>;
