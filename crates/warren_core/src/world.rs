//! The world — canonical simulation state and the tick driver.
//!
//! The world owns the level, the entity arena, the class registry, the
//! component factories, and the delay queue. It is the single source of
//! truth: only the simulation thread mutates it, and snapshot readers take
//! the same coarse lock around their read.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::appearance::TileAppearance;
use crate::component::{Component, ComponentTag, Role};
use crate::damage::DamageInfo;
use crate::defs::{ClassDef, ClassRegistry, DefError, PropBag};
use crate::entity::{EntityAllocator, EntityData, EntityId};
use crate::level::{Level, Tick};
use crate::room::RoomId;
use crate::tile::TileState;
use warren_geom::{Direction, Position, Rect};
use warren_sched::{DelayId, DelayQueue, Guard, QueueHost};

/// A component factory, keyed by type name in the world's registry.
pub type ComponentFactory = fn() -> Box<dyn Component>;

/// Identifies a scheduled action's owner: the entity and the component tag
/// the action belongs to. Used for validity checks when deferred work
/// comes due.
pub type Owner = (EntityId, ComponentTag);

/// The authoritative simulation state.
pub struct World {
    level: Level,
    classes: ClassRegistry,
    factories: HashMap<String, ComponentFactory>,
    entities: HashMap<EntityId, EntityData>,
    allocator: EntityAllocator,
    queue: DelayQueue<World>,
    rng: StdRng,
}

impl QueueHost for World {
    fn delay_queue(&mut self) -> &mut DelayQueue<Self> {
        &mut self.queue
    }
}

impl World {
    /// A fresh world with an empty level, the built-in component factories
    /// registered, and a seeded random stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            level: Level::new(),
            classes: ClassRegistry::new(),
            factories: HashMap::new(),
            entities: HashMap::new(),
            allocator: EntityAllocator::new(),
            queue: DelayQueue::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        crate::components::register_builtins(&mut world);
        world
    }

    /// The level.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// The current simulation time.
    #[must_use]
    pub fn time(&self) -> Tick {
        self.level.time()
    }

    /// The class registry.
    #[must_use]
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Mutable access to the class registry, for the load phase and for
    /// chain queries.
    pub fn classes_mut(&mut self) -> &mut ClassRegistry {
        &mut self.classes
    }

    /// The world's random stream.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Number of entities ever created and still tracked.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ── Definitions ────────────────────────────────────────────────────

    /// Register a component factory under its type name. Definition data
    /// resolves component entries against these factories.
    pub fn register_component(&mut self, name: &str, factory: ComponentFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Register an entity class. Last write wins.
    pub fn register_class(&mut self, def: ClassDef) {
        self.classes.register(def);
    }

    /// Check every registered class: base chains must resolve and every
    /// component type must have a factory. Called once after the load
    /// phase; any error aborts startup.
    pub fn validate_definitions(&mut self) -> Result<(), DefError> {
        let names: Vec<String> = self.classes.names().map(String::from).collect();
        for name in names {
            for def in self.classes.resolve(&name)? {
                for comp in &def.components {
                    if !self.factories.contains_key(&comp.kind) {
                        return Err(DefError::UnknownComponent(comp.kind.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    // ── Geometry ───────────────────────────────────────────────────────

    /// Create a room covering `rect`, all tiles Void.
    pub fn create_room(&mut self, rect: Rect) -> RoomId {
        self.level.create_room(rect)
    }

    /// Set one tile's terrain state.
    ///
    /// A transition to Void evicts all occupants first — every occupant's
    /// `remove` runs before the state changes, so Void tiles never hold
    /// entities.
    pub fn set_tile_state(&mut self, pos: Position, state: TileState) {
        if state == TileState::Void {
            let occupants: Vec<EntityId> = self.level.tile(pos).entities().to_vec();
            for id in occupants {
                self.remove(id);
            }
        }
        if let Some(tile) = self.level.tile_mut(pos) {
            tile.set_state_raw(state);
        }
    }

    /// Set the terrain state of every tile in a region. Positions outside
    /// all rooms are skipped.
    pub fn fill(&mut self, rect: Rect, state: TileState) {
        for pos in rect.iter() {
            self.set_tile_state(pos, state);
        }
    }

    // ── Entity lifecycle ───────────────────────────────────────────────

    /// Allocate a bare entity with no components and no class.
    pub fn create_empty(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.insert(id, EntityData::new());
        id
    }

    /// Create an entity of a named class.
    ///
    /// Resolves the class chain base-most first and applies each class's
    /// components in order. A component type already present from a base
    /// class is reconfigured in place (the derived class overrides it);
    /// otherwise a fresh component is added. Each class name in the chain
    /// is pushed onto the entity's class-name stack.
    pub fn create(&mut self, class: &str) -> Result<EntityId, DefError> {
        let chain = self.classes.resolve(class)?;
        let id = self.create_empty();
        for def in chain {
            self.entities
                .get_mut(&id)
                .expect("freshly created entity")
                .classes
                .push(def.name.clone());
            for comp in &def.components {
                let factory = self
                    .factories
                    .get(comp.kind.as_str())
                    .copied()
                    .ok_or_else(|| DefError::UnknownComponent(comp.kind.clone()))?;
                let tag = ComponentTag::from_name(&comp.kind);
                if self.has_component(id, tag) {
                    self.configure_component(id, tag, &comp.props)?;
                } else {
                    let mut component = factory();
                    component.configure(&comp.props)?;
                    self.add_boxed(id, component);
                }
            }
        }
        Ok(id)
    }

    /// Returns `true` if the id was ever created and is still tracked.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// An entity is valid while it is reachable: either an owning tile's
    /// occupant list contains it, or it hangs (transitively) under a valid
    /// parent.
    #[must_use]
    pub fn is_valid(&self, id: EntityId) -> bool {
        let Some(e) = self.entities.get(&id) else {
            return false;
        };
        if let Some(pos) = e.tile {
            return self.level.tile(pos).entities().contains(&id);
        }
        match e.parent {
            Some(parent) => self.is_valid(parent),
            None => false,
        }
    }

    /// Returns `true` if the entity's class-name stack contains `name`
    /// (its own class or any ancestor class).
    #[must_use]
    pub fn is_of_class(&self, id: EntityId, name: &str) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.classes.iter().any(|c| c == name))
    }

    // ── Components ─────────────────────────────────────────────────────

    /// Add a default-constructed component of type `T`.
    ///
    /// # Panics
    ///
    /// Panics if the entity already has a component with `T`'s tag —
    /// duplicate component types are a component-authoring bug.
    pub fn add_component<T: Component + Default>(&mut self, id: EntityId) {
        self.add_boxed(id, Box::new(T::default()));
    }

    /// Add an already-constructed component.
    ///
    /// The component joins the end of the entity's registration order,
    /// `on_initialize` fires on it, then `on_components_changed` fires on
    /// the entity's whole component set.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate tag or an unknown entity.
    pub fn add_boxed(&mut self, id: EntityId, mut component: Box<dyn Component>) {
        let tag = component.tag();
        assert!(
            self.exists(id),
            "add_component on unknown entity {id}"
        );
        assert!(
            !self.has_component(id, tag),
            "duplicate component `{}` on {id}",
            component.type_name()
        );
        component.on_initialize(self, id);
        let e = self.entities.get_mut(&id).expect("checked above");
        e.components.push(component);
        e.has_thinker = e.components.iter().any(|c| c.thinks());
        self.components_changed(id);
    }

    /// Remove the component with the given tag. Fires `on_remove` on it
    /// and `on_components_changed` on the remainder. Returns `false` when
    /// no such component exists.
    pub fn remove_component(&mut self, id: EntityId, tag: ComponentTag) -> bool {
        let Some(e) = self.entities.get_mut(&id) else {
            return false;
        };
        let Some(index) = e.components.iter().position(|c| c.tag() == tag) else {
            return false;
        };
        let mut component = e.components.remove(index);
        e.has_thinker = e.components.iter().any(|c| c.thinks());
        component.on_remove(self, id);
        self.components_changed(id);
        true
    }

    /// Returns `true` if the entity has a component with this tag.
    #[must_use]
    pub fn has_component(&self, id: EntityId, tag: ComponentTag) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.components.iter().any(|c| c.tag() == tag))
    }

    /// Returns `true` if any of the entity's components fulfils `role`.
    #[must_use]
    pub fn has_role(&self, id: EntityId, role: Role) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.components.iter().any(|c| c.roles().contains(&role)))
    }

    /// The entity's component of concrete type `T`, or `None`.
    #[must_use]
    pub fn find_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities
            .get(&id)?
            .components
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the entity's component of type `T`, or `None`.
    pub fn find_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(&id)?
            .components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// The entity's component of type `T`.
    ///
    /// # Panics
    ///
    /// Panics when the entity has no such component; use
    /// [`World::find_component`] for the fallible lookup.
    #[must_use]
    pub fn component<T: Component>(&self, id: EntityId) -> &T {
        self.find_component(id)
            .unwrap_or_else(|| panic!("{id} has no component {}", std::any::type_name::<T>()))
    }

    fn configure_component(
        &mut self,
        id: EntityId,
        tag: ComponentTag,
        props: &PropBag,
    ) -> Result<(), DefError> {
        let Some(e) = self.entities.get_mut(&id) else {
            return Ok(());
        };
        for c in &mut e.components {
            if c.tag() == tag {
                return c.configure(props);
            }
        }
        Ok(())
    }

    /// Run `f` with the entity's component list temporarily detached from
    /// the arena, so hooks can take `&mut World`. Components added during
    /// `f` are appended behind the detached ones on restore.
    fn with_components<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut World, &mut Vec<Box<dyn Component>>) -> R,
    ) -> Option<R> {
        let mut components = std::mem::take(&mut self.entities.get_mut(&id)?.components);
        let out = f(self, &mut components);
        if let Some(e) = self.entities.get_mut(&id) {
            let added = std::mem::take(&mut e.components);
            components.extend(added);
            e.components = components;
            e.has_thinker = e.components.iter().any(|c| c.thinks());
        }
        Some(out)
    }

    fn components_changed(&mut self, id: EntityId) {
        self.with_components(id, |world, components| {
            for c in components.iter_mut() {
                c.on_components_changed(world, id);
            }
        });
    }

    // ── Placement ──────────────────────────────────────────────────────

    /// Place the entity onto the tile at `pos`.
    ///
    /// Evicts it from any prior tile or parent first (a full `remove`),
    /// sets occupancy, then re-fires `on_initialize` on every component.
    /// Placing onto a Void tile records the position but the tile accepts
    /// no occupant, leaving the entity invalid.
    pub fn place(&mut self, id: EntityId, pos: Position) {
        if !self.exists(id) {
            return;
        }
        self.remove(id);
        if let Some(e) = self.entities.get_mut(&id) {
            e.tile = Some(pos);
        }
        if let Some(tile) = self.level.tile_mut(pos) {
            tile.add_entity(id);
        }
        self.with_components(id, |world, components| {
            for c in components.iter_mut() {
                c.on_initialize(world, id);
            }
        });
    }

    /// Attach `child` under `parent` (containment, e.g. inventory).
    ///
    /// The child is evicted from any tile or previous parent first. An
    /// entity is never simultaneously placed and parented.
    ///
    /// # Panics
    ///
    /// Panics on self-attachment or a cycle — both are authoring bugs.
    pub fn attach(&mut self, child: EntityId, parent: EntityId) {
        assert!(child != parent, "cannot attach {child} to itself");
        assert!(
            self.exists(child) && self.exists(parent),
            "attach on unknown entity"
        );
        let mut cursor = Some(parent);
        while let Some(p) = cursor {
            assert!(p != child, "cyclic attachment of {child}");
            cursor = self.entities.get(&p).and_then(|e| e.parent);
        }
        self.remove(child);
        if let Some(e) = self.entities.get_mut(&child) {
            e.parent = Some(parent);
        }
        if let Some(e) = self.entities.get_mut(&parent) {
            e.children.push(child);
        }
    }

    /// Remove the entity from play: notify every component, recursively
    /// remove children, then detach from its tile or parent. Idempotent —
    /// removing an already-invalid entity just clears any stale edges.
    pub fn remove(&mut self, id: EntityId) {
        if !self.exists(id) {
            return;
        }
        if self.is_valid(id) {
            self.with_components(id, |world, components| {
                for c in components.iter_mut() {
                    c.on_remove(world, id);
                }
            });
            let children = self.entities[&id].children.clone();
            for child in children {
                self.remove(child);
            }
        }
        self.detach(id);
    }

    fn detach(&mut self, id: EntityId) {
        let Some(e) = self.entities.get_mut(&id) else {
            return;
        };
        let parent = e.parent.take();
        let tile = e.tile.take();
        if let Some(parent) = parent {
            if let Some(pe) = self.entities.get_mut(&parent) {
                pe.children.retain(|c| *c != id);
            }
        }
        if let Some(pos) = tile {
            if let Some(t) = self.level.tile_mut(pos) {
                t.remove_entity(id);
            }
        }
    }

    /// The absolute position of the entity's tile. Parented entities
    /// forward the query to their parent.
    #[must_use]
    pub fn entity_tile(&self, id: EntityId) -> Option<Position> {
        let e = self.entities.get(&id)?;
        if let Some(pos) = e.tile {
            return Some(pos);
        }
        e.parent.and_then(|p| self.entity_tile(p))
    }

    /// The room containing the entity's tile, forwarded like
    /// [`World::entity_tile`].
    #[must_use]
    pub fn entity_room(&self, id: EntityId) -> Option<RoomId> {
        self.entity_tile(id).and_then(|pos| self.level.room_at(pos))
    }

    /// The entity's parent, if it is contained in another entity.
    #[must_use]
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(&id)?.parent
    }

    /// The entity's children, in attachment order.
    #[must_use]
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.entities
            .get(&id)
            .map_or(&[], |e| e.children.as_slice())
    }

    /// Move the entity to the tile at `dest`.
    ///
    /// Succeeds only onto Floor; a blocked move returns `false` and is
    /// simply re-attempted by control logic on a later tick. The entity is
    /// never listed on two tiles at once.
    ///
    /// # Panics
    ///
    /// Panics when the entity is parented — containment and tile movement
    /// are mutually exclusive.
    pub fn move_to(&mut self, id: EntityId, dest: Position) -> bool {
        let Some(e) = self.entities.get(&id) else {
            return false;
        };
        assert!(e.parent.is_none(), "cannot move parented entity {id}");
        let old = e.tile;
        if self.level.tile(dest).state() != TileState::Floor {
            return false;
        }
        if old == Some(dest) {
            return true;
        }
        if let Some(pos) = old {
            if let Some(t) = self.level.tile_mut(pos) {
                t.remove_entity(id);
            }
        }
        if let Some(e) = self.entities.get_mut(&id) {
            e.tile = Some(dest);
        }
        if let Some(t) = self.level.tile_mut(dest) {
            t.add_entity(id);
        }
        true
    }

    /// Move the entity one step in `dir`.
    pub fn move_dir(&mut self, id: EntityId, dir: Direction) -> bool {
        let Some(e) = self.entities.get(&id) else {
            return false;
        };
        let Some(from) = e.tile else {
            return false;
        };
        self.move_to(id, from + dir.delta())
    }

    // ── Think dispatch ─────────────────────────────────────────────────

    /// Whether the entity or any descendant owns a thinking component.
    /// Idle subtrees are skipped whole during tick dispatch.
    #[must_use]
    pub fn can_think(&self, id: EntityId) -> bool {
        let Some(e) = self.entities.get(&id) else {
            return false;
        };
        e.has_thinker || e.children.iter().any(|&c| self.can_think(c))
    }

    /// Give the entity its think opportunity for `time`.
    ///
    /// No-op if it already thought this tick or nothing in its subtree
    /// thinks. Components dispatch in reverse registration order — later
    /// additions (status effects) observe earlier components before those
    /// act — then children recurse in registration order.
    pub fn think(&mut self, id: EntityId, time: Tick) {
        let Some(e) = self.entities.get(&id) else {
            return;
        };
        if e.last_think >= time || !self.can_think(id) {
            return;
        }
        self.entities
            .get_mut(&id)
            .expect("checked above")
            .last_think = time;
        self.with_components(id, |world, components| {
            for c in components.iter_mut().rev() {
                c.on_think(world, id, time);
            }
        });
        let children = self
            .entities
            .get(&id)
            .map(|e| e.children.clone())
            .unwrap_or_default();
        for child in children {
            self.think(child, time);
        }
    }

    /// Advance the simulation by one tick: drain due deferred actions,
    /// give every placed entity one think opportunity (rooms in creation
    /// order, tiles row-major, occupants in arrival order), then advance
    /// the clock.
    pub fn tick(&mut self) {
        let time = self.level.time();
        self.queue.sync(time);
        DelayQueue::run_due(self, time);

        let mut ids: Vec<EntityId> = Vec::new();
        for room in self.level.rooms() {
            for tile in room.tiles() {
                ids.extend_from_slice(tile.entities());
            }
        }
        debug!(time, entities = ids.len(), "tick");
        for id in ids {
            self.think(id, time);
        }
        self.level.advance();
    }

    // ── Scheduling ─────────────────────────────────────────────────────

    /// Returns `true` if the owning entity is valid and still has the
    /// owning component. Scheduled work is dropped once this fails.
    #[must_use]
    pub fn component_alive(&self, owner: Owner) -> bool {
        self.is_valid(owner.0) && self.has_component(owner.0, owner.1)
    }

    fn owner_guard(owner: Owner) -> Guard<World> {
        Box::new(move |world: &World| world.component_alive(owner))
    }

    /// Schedule `action` to run `delay` ticks from now, owned by
    /// `owner`.
    ///
    /// Scheduling against an invalid entity is a silent no-op. A delay of
    /// zero (or less) runs the action synchronously. Otherwise the action
    /// runs when the clock reaches the target tick — unless the owner has
    /// become invalid or lost the component by then, in which case it is
    /// silently dropped.
    pub fn schedule(
        &mut self,
        delay: i64,
        owner: Owner,
        action: impl FnOnce(&mut World) + Send + 'static,
    ) {
        if !self.is_valid(owner.0) {
            return;
        }
        if delay <= 0 {
            action(self);
            return;
        }
        let target = self.level.time() + delay as u64;
        self.queue
            .schedule_at(target, Self::owner_guard(owner), Box::new(action));
    }

    /// Queue `action` for the current tick's drain — it runs at the start
    /// of the next [`World::tick`] rather than synchronously.
    pub fn defer(&mut self, owner: Owner, action: impl FnOnce(&mut World) + Send + 'static) {
        if !self.is_valid(owner.0) {
            return;
        }
        let target = self.level.time();
        self.queue
            .schedule_at(target, Self::owner_guard(owner), Box::new(action));
    }

    /// Create a delay completing `ticks` from now. Continuations attach
    /// with [`World::on_complete`]; a non-positive delay is already
    /// complete and fires them immediately.
    pub fn delay_for(&mut self, owner: Owner, ticks: i64) -> DelayId {
        let now = self.level.time();
        self.queue.sync(now);
        let target = now + ticks.max(0) as u64;
        self.queue.delay_at(target, Self::owner_guard(owner))
    }

    /// Attach a continuation to a delay. Continuations fire in attachment
    /// order when the delay completes; if the owner is invalidated first
    /// they are never invoked.
    pub fn on_complete(
        &mut self,
        id: DelayId,
        action: impl FnOnce(&mut World) + Send + 'static,
    ) {
        DelayQueue::attach(self, id, Box::new(action));
    }

    // ── Damage ─────────────────────────────────────────────────────────

    /// Apply one damage record to the target's damageable component.
    /// Returns `false` when the target has none.
    pub fn apply_damage(&mut self, target: EntityId, mut info: DamageInfo) -> bool {
        self.with_components(target, |world, components| {
            for c in components.iter_mut() {
                if c.roles().contains(&Role::Damageable) {
                    c.on_damage(world, target, &mut info);
                    return true;
                }
            }
            false
        })
        .unwrap_or(false)
    }

    // ── Visibility and appearance ──────────────────────────────────────

    /// Whether `to` can be seen from `from`, by Bresenham walk over the
    /// level's tiles.
    #[must_use]
    pub fn line_of_sight(&self, from: Position, to: Position) -> bool {
        warren_fov::line_of_sight(from, to, &|p| self.level.tile(p).blocks_sight())
    }

    /// Every position visible from `origin` within `radius`, by recursive
    /// shadowcasting over the level's tiles.
    #[must_use]
    pub fn visible_set(&self, origin: Position, radius: i32) -> HashSet<Position> {
        let mut seen = HashSet::new();
        warren_fov::shadowcast(
            origin,
            radius,
            &|p| self.level.tile(p).blocks_sight(),
            &mut |p| {
                seen.insert(p);
            },
        );
        seen
    }

    /// The tile's appearance at the current tick: terrain symbol and
    /// colors plus the appearances of drawable occupants. Memoised on the
    /// tile, recomputed at most once per tick.
    pub fn tile_appearance(&mut self, pos: Position) -> TileAppearance {
        let time = self.level.time();
        let tile = self.level.tile(pos);
        if let Some(app) = tile.cached_appearance(time) {
            return app.clone();
        }
        let (symbol, fg, bg) = tile.state().appearance();
        let occupants: Vec<EntityId> = tile.entities().to_vec();
        let mut entities = Vec::new();
        for id in occupants {
            if let Some(e) = self.entities.get(&id) {
                for c in &e.components {
                    if let Some(app) = c.appearance() {
                        entities.push(app);
                    }
                }
            }
        }
        let app = TileAppearance {
            symbol,
            fg,
            bg,
            entities,
        };
        if let Some(tile) = self.level.tile_mut(pos) {
            tile.store_appearance(time, app.clone());
        }
        app
    }

    // ── Containment helpers ────────────────────────────────────────────

    /// Parent `item` under `holder`'s inventory. Fails when the holder has
    /// no inventory component or the item is not in play.
    pub fn pick_up(&mut self, holder: EntityId, item: EntityId) -> bool {
        if !self.has_component(holder, crate::components::Inventory::TAG) {
            return false;
        }
        if !self.is_valid(item) || !self.is_valid(holder) {
            return false;
        }
        self.attach(item, holder);
        true
    }

    /// Drop a held item onto the holder's tile.
    pub fn drop_item(&mut self, holder: EntityId, item: EntityId) -> bool {
        if self.parent(item) != Some(holder) {
            return false;
        }
        let Some(pos) = self.entity_tile(holder) else {
            return false;
        };
        self.place(item, pos);
        true
    }
}
