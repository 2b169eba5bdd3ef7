//! The [`Component`] trait — the unit of entity behaviour.
//!
//! Entities are composed from components; every component instance is bound
//! to exactly one entity and owned by the world's arena. Behaviour reaches
//! a component through the lifecycle hooks, which the world invokes with
//! the component temporarily detached from the arena so hooks are free to
//! mutate the rest of the world.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::appearance::EntityAppearance;
use crate::damage::DamageInfo;
use crate::defs::{DefError, PropBag};
use crate::entity::EntityId;
use crate::level::Tick;
use crate::world::World;

/// A unique identifier for a component type, derived from its string name
/// with the FNV-1a 64-bit hash.
///
/// Deriving the tag from the name keeps definition files and the runtime
/// registry on one identifier space without any runtime type reflection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ComponentTag(pub u64);

impl ComponentTag {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the tag for a component type name.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }
}

/// An abstract capability a component can fulfil.
///
/// Components declare roles in addition to their concrete tag, so callers
/// can look up "the drawable components" or "the damageable component"
/// without naming concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Contributes an [`EntityAppearance`] to its tile.
    Drawable,
    /// Accepts [`DamageInfo`] applications.
    Damageable,
}

/// The component contract.
///
/// A component belongs to exactly one entity for its whole life. All hooks
/// receive the owning world and the owning entity's id; while a hook runs,
/// the entity's own components are detached from the arena, so hooks must
/// not look themselves up through the world.
pub trait Component: Send + 'static {
    /// The component's type name, e.g. `"Health"`. [`Component::tag`] is
    /// derived from it.
    fn type_name(&self) -> &'static str;

    /// The component's concrete tag. At most one component per tag may be
    /// attached to an entity.
    fn tag(&self) -> ComponentTag {
        ComponentTag::from_name(self.type_name())
    }

    /// Abstract roles this component fulfils, in addition to its tag.
    fn roles(&self) -> &'static [Role] {
        &[]
    }

    /// Apply definition data. Recognised keys are component-specific;
    /// unrecognised keys are ignored.
    fn configure(&mut self, props: &PropBag) -> Result<(), DefError> {
        let _ = props;
        Ok(())
    }

    /// Invoked after the component joins an entity, and again each time
    /// the entity is placed onto a tile.
    fn on_initialize(&mut self, world: &mut World, me: EntityId) {
        let _ = (world, me);
    }

    /// Invoked on every component of an entity after its component set
    /// changes.
    fn on_components_changed(&mut self, world: &mut World, me: EntityId) {
        let _ = (world, me);
    }

    /// Whether this component needs per-tick dispatch. Entities without
    /// any thinking component (transitively) are skipped whole.
    fn thinks(&self) -> bool {
        false
    }

    /// One tick of behaviour. Only called once per entity per tick.
    fn on_think(&mut self, world: &mut World, me: EntityId, time: Tick) {
        let _ = (world, me, time);
    }

    /// Invoked when the component is removed from its entity or the entity
    /// is removed from the world.
    fn on_remove(&mut self, world: &mut World, me: EntityId) {
        let _ = (world, me);
    }

    /// The appearance contributed to the owning tile, for
    /// [`Role::Drawable`] components.
    fn appearance(&self) -> Option<EntityAppearance> {
        None
    }

    /// Consume one damage application, for [`Role::Damageable`]
    /// components.
    fn on_damage(&mut self, world: &mut World, me: EntityId, damage: &mut DamageInfo) {
        let _ = (world, me, damage);
    }

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
