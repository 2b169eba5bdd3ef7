//! The built-in component set.
//!
//! Definition data refers to these by type name; the factories are
//! registered into every fresh world before the load phase runs.

pub mod control;
pub mod drawable;
pub mod health;
pub mod inventory;
pub mod wander;

pub use control::PlayerControl;
pub use drawable::StaticDrawable;
pub use health::Health;
pub use inventory::Inventory;
pub use wander::Wander;

use crate::world::World;

/// Register the factories for all built-in component types.
pub fn register_builtins(world: &mut World) {
    world.register_component(StaticDrawable::NAME, || {
        Box::new(StaticDrawable::default())
    });
    world.register_component(Health::NAME, || Box::new(Health::default()));
    world.register_component(PlayerControl::NAME, || {
        Box::new(PlayerControl::default())
    });
    world.register_component(Wander::NAME, || Box::new(Wander::default()));
    world.register_component(Inventory::NAME, || Box::new(Inventory::default()));
}
