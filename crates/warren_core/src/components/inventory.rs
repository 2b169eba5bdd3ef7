//! Item containment.

use std::any::Any;

use crate::component::{Component, ComponentTag};

/// Marks the entity as able to hold items.
///
/// Held items are child entities parented to the holder through
/// [`World::pick_up`](crate::World::pick_up); they leave their tile when
/// picked up and return to one when dropped. Containment itself lives on
/// the entity's parent/child edges, so the component carries no state of
/// its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inventory;

impl Inventory {
    /// Definition type name.
    pub const NAME: &'static str = "Inventory";
    /// Registry tag.
    pub const TAG: ComponentTag = ComponentTag::from_name(Self::NAME);
}

impl Component for Inventory {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
