//! Scene content the scheduler picks against.
//!
//! Provides the flat ground plane with its pickable surface and a reference
//! grid drawn just above it.

/// Ground plane mesh and its `GroundSurface` pick volume.
pub mod ground;

/// Flat reference grid over the ground plane.
///
/// Single line-list mesh with evenly spaced lines along both axes.
pub mod grid;
