//! Player movement control.

use std::any::Any;

use crate::component::{Component, ComponentTag};
use crate::defs::{DefError, PropBag};
use crate::entity::EntityId;
use crate::level::Tick;
use crate::world::World;

/// Consumes client movement intents.
///
/// The transport layer stores at most one pending direction; the next
/// think consumes and clears it. After an accepted move the component
/// disarms and re-arms itself through the delay queue `MovePeriod` ticks
/// later, bounding the movement rate regardless of how fast intents
/// arrive.
///
/// Definition keys: `MovePeriod`.
#[derive(Debug, Clone)]
pub struct PlayerControl {
    /// Ticks between accepted moves.
    pub move_period: i64,
    intent: Option<warren_geom::Direction>,
    ready: bool,
}

impl PlayerControl {
    /// Definition type name.
    pub const NAME: &'static str = "PlayerControl";
    /// Registry tag.
    pub const TAG: ComponentTag = ComponentTag::from_name(Self::NAME);

    /// Store a movement intent, replacing any unconsumed one.
    pub fn set_intent(&mut self, dir: warren_geom::Direction) {
        self.intent = Some(dir);
    }

    /// The unconsumed intent, if any.
    #[must_use]
    pub fn pending_intent(&self) -> Option<warren_geom::Direction> {
        self.intent
    }
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self {
            move_period: 1,
            intent: None,
            ready: true,
        }
    }
}

impl Component for PlayerControl {
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
        // Intents clear whether or not they result in a move.
        let Some(dir) = self.intent.take() else {
            return;
        };
        if !self.ready {
            return;
        }
        if !world.move_dir(me, dir) {
            // Blocked; the client may simply try again next tick.
            return;
        }
        if self.move_period <= 0 {
            return;
        }
        self.ready = false;
        let period = self.move_period;
        world.schedule(period, (me, Self::TAG), move |w| {
            if let Some(control) = w.find_component_mut::<PlayerControl>(me) {
                control.ready = true;
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
