//! Hit points and death.

use std::any::Any;

use tracing::debug;

use crate::component::{Component, ComponentTag, Role};
use crate::damage::DamageInfo;
use crate::defs::{DefError, PropBag};
use crate::entity::EntityId;
use crate::world::World;

/// Tracks hit points and consumes damage applications.
///
/// Definition keys: `MaxHealth`. When hit points reach zero the entity's
/// removal is queued for the current tick.
#[derive(Debug, Clone)]
pub struct Health {
    /// Upper bound on hit points.
    pub max: i32,
    /// Current hit points.
    pub current: i32,
}

impl Health {
    /// Definition type name.
    pub const NAME: &'static str = "Health";
    /// Registry tag.
    pub const TAG: ComponentTag = ComponentTag::from_name(Self::NAME);
}

impl Default for Health {
    fn default() -> Self {
        Self {
            max: 10,
            current: 10,
        }
    }
}

impl Component for Health {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn roles(&self) -> &'static [Role] {
        &[Role::Damageable]
    }

    fn configure(&mut self, props: &PropBag) -> Result<(), DefError> {
        if let Some(max) = props.get_i64("MaxHealth")? {
            self.max = max as i32;
            self.current = self.max;
        }
        Ok(())
    }

    fn on_damage(&mut self, world: &mut World, me: EntityId, damage: &mut DamageInfo) {
        let amount = damage.amount();
        self.current -= amount;
        debug!(entity = %me, amount, remaining = self.current, "damage");
        if self.current <= 0 {
            world.defer((me, Self::TAG), move |w| w.remove(me));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
