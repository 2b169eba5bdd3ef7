//! # warren_fov
//!
//! Field-of-view computation, independent of the world model. Callers
//! describe the map as an `opaque` closure over positions; the crate never
//! sees tiles or rooms.
//!
//! Two algorithms with different jobs:
//!
//! - [`shadowcast`] — recursive octant shadowcasting. Visits every position
//!   with unobstructed line of sight from an origin within a radius,
//!   including the blocking cells themselves (so wall faces can be drawn).
//! - [`line_of_sight`] — Bresenham walk between two positions, for cheap
//!   point-to-point checks.

pub mod los;
pub mod shadow;

pub use los::line_of_sight;
pub use shadow::shadowcast;
