//! # warren_geom
//!
//! Integer grid geometry for the dungeon simulation. Re-exports [`glam`]'s
//! `IVec2` as the engine-wide [`Position`] type and defines the spatial
//! primitives built on top of it:
//!
//! - [`Rect`] — axis-aligned integer rectangle with containment and
//!   intersection helpers.
//! - [`LineIter`] — lazy Bresenham interpolation between two positions.
//! - [`Direction`] — the eight movement directions.

pub mod dir;
pub mod line;
pub mod rect;

pub use dir::Direction;
pub use line::{LineIter, line};
pub use rect::Rect;

/// A grid position, in absolute or room-relative coordinates.
///
/// Addition, subtraction, scalar multiplication, equality, and
/// `length_squared` all come from [`glam::IVec2`].
pub type Position = glam::IVec2;
