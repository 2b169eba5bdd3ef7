//! # warren_core
//!
//! The dungeon simulation core. One authoritative [`World`] owns:
//!
//! - the spatial model — a [`Level`] of [`Room`]s of [`Tile`]s;
//! - the entity arena — every game object is an [`EntityId`] whose data
//!   (components, parent/child edges, tile occupancy) lives in the world;
//! - the class registry — named entity classes built from definition data,
//!   with single-level-or-deeper base inheritance;
//! - the delay queue — all deferred component behaviour, drained at the
//!   start of each tick.
//!
//! Control flow per tick: the world drains due scheduled actions, gives
//! every placed entity one `think` opportunity (components dispatch in
//! reverse registration order, children recurse in registration order),
//! then advances the clock. Per-client [`RoomVisibility`] masks are
//! recomputed from player positions by the server between ticks.

pub mod appearance;
pub mod component;
pub mod components;
pub mod damage;
pub mod defs;
pub mod entity;
pub mod level;
pub mod room;
pub mod tile;
pub mod visibility;
pub mod world;

pub use appearance::{EntityAppearance, TileAppearance};
pub use component::{Component, ComponentTag, Role};
pub use damage::DamageInfo;
pub use defs::{ClassDef, ClassRegistry, ComponentDef, DefError, PropBag};
pub use entity::EntityId;
pub use level::{Level, Tick};
pub use room::{Room, RoomId};
pub use tile::{Tile, TileState};
pub use visibility::RoomVisibility;
pub use world::World;
