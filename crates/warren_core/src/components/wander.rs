//! Vermin wandering AI.

use std::any::Any;

use rand::Rng;

use crate::component::{Component, ComponentTag};
use crate::defs::{DefError, PropBag};
use crate::entity::EntityId;
use crate::level::Tick;
use crate::world::World;

/// Moves the entity one random step every `MovePeriod` ticks.
///
/// The pacing runs through the delay queue: after each step the component
/// disarms, opens a delay, and re-arms from the delay's continuation. A
/// blocked step is not retried — the next cycle rolls a fresh direction.
///
/// Definition keys: `MovePeriod`.
#[derive(Debug, Clone)]
pub struct Wander {
    /// Ticks between steps.
    pub move_period: i64,
    armed: bool,
}

impl Wander {
    /// Definition type name.
    pub const NAME: &'static str = "Wander";
    /// Registry tag.
    pub const TAG: ComponentTag = ComponentTag::from_name(Self::NAME);
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            move_period: 4,
            armed: true,
        }
    }
}

impl Component for Wander {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, props: &PropBag) -> Result<(), DefError> {
        if let Some(period) = props.get_i64("MovePeriod")? {
            self.move_period = period;
        }
        Ok(())
    }

    fn thinks(&self) -> bool {
        true
    }

    fn on_think(&mut self, world: &mut World, me: EntityId, _time: Tick) {
        if !self.armed {
            return;
        }
        let dirs = warren_geom::Direction::ALL;
        let dir = dirs[world.rng().random_range(0..dirs.len())];
        let _ = world.move_dir(me, dir);
        if self.move_period <= 0 {
            return;
        }
        self.armed = false;
        let delay = world.delay_for((me, Self::TAG), self.move_period);
        world.on_complete(delay, move |w| {
            if let Some(wander) = w.find_component_mut::<Wander>(me) {
                wander.armed = true;
            }
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
