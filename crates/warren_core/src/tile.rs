//! Tiles — the smallest addressable simulation unit.

use serde::{Deserialize, Serialize};

use crate::appearance::TileAppearance;
use crate::entity::EntityId;
use crate::level::Tick;
use crate::room::RoomId;
use warren_geom::Position;

/// Terrain state of one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileState {
    /// Not part of the dungeon. Void tiles never hold entities and block
    /// sight.
    #[default]
    Void,
    /// Solid terrain. Blocks movement and sight.
    Wall,
    /// Walkable, see-through terrain.
    Floor,
}

impl TileState {
    /// Terrain symbol and palette indices for this state.
    #[must_use]
    pub const fn appearance(self) -> (char, u8, u8) {
        match self {
            TileState::Void => (' ', 0, 0),
            TileState::Wall => ('#', 7, 0),
            TileState::Floor => ('.', 8, 0),
        }
    }
}

/// One grid cell of a room.
///
/// A tile knows its owning room and its immutable room-relative position;
/// its absolute position is the room's top-left corner plus that offset.
/// The occupant list holds every entity standing on the tile — an entity
/// appears on at most one tile's list at any time, which is maintained by
/// the entity placement code in [`World`](crate::World), never by mutating
/// the list directly.
#[derive(Debug, Clone)]
pub struct Tile {
    state: TileState,
    room: RoomId,
    rel: Position,
    entities: Vec<EntityId>,
    /// Appearance memoised by the tick it was computed at.
    cached: Option<(Tick, TileAppearance)>,
}

impl Tile {
    /// The shared sentinel returned for positions outside every room.
    pub const VOID: Tile = Tile {
        state: TileState::Void,
        room: RoomId::INVALID,
        rel: Position::new(0, 0),
        entities: Vec::new(),
        cached: None,
    };

    pub(crate) const fn new(room: RoomId, rel: Position) -> Self {
        Tile {
            state: TileState::Void,
            room,
            rel,
            entities: Vec::new(),
            cached: None,
        }
    }

    /// Terrain state.
    #[must_use]
    pub fn state(&self) -> TileState {
        self.state
    }

    /// The owning room.
    #[must_use]
    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Room-relative position, assigned at construction.
    #[must_use]
    pub fn rel(&self) -> Position {
        self.rel
    }

    /// Entities standing on this tile, in arrival order.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Whether this tile blocks line of sight. Only floor is see-through.
    #[must_use]
    pub fn blocks_sight(&self) -> bool {
        self.state != TileState::Floor
    }

    /// Set the terrain state without occupancy bookkeeping. Eviction on a
    /// transition to Void is handled by
    /// [`World::set_tile_state`](crate::World::set_tile_state).
    pub(crate) fn set_state_raw(&mut self, state: TileState) {
        self.state = state;
        self.cached = None;
    }

    /// Add an occupant. A no-op on Void tiles and for entities already
    /// present, so placement code can call it unconditionally.
    pub(crate) fn add_entity(&mut self, id: EntityId) {
        if self.state == TileState::Void || self.entities.contains(&id) {
            return;
        }
        self.entities.push(id);
        self.cached = None;
    }

    /// Remove an occupant. A no-op when the entity is not present.
    pub(crate) fn remove_entity(&mut self, id: EntityId) {
        self.entities.retain(|e| *e != id);
        self.cached = None;
    }

    pub(crate) fn cached_appearance(&self, time: Tick) -> Option<&TileAppearance> {
        match &self.cached {
            Some((at, app)) if *at == time => Some(app),
            _ => None,
        }
    }

    pub(crate) fn store_appearance(&mut self, time: Tick, appearance: TileAppearance) {
        self.cached = Some((time, appearance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_tile_rejects_occupants() {
        let mut tile = Tile::new(RoomId(0), Position::new(0, 0));
        tile.add_entity(EntityId::from_raw(1));
        assert!(tile.entities().is_empty());
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut tile = Tile::new(RoomId(0), Position::new(0, 0));
        tile.set_state_raw(TileState::Floor);
        let e = EntityId::from_raw(1);
        tile.add_entity(e);
        tile.add_entity(e);
        assert_eq!(tile.entities(), &[e]);
    }

    #[test]
    fn test_remove_absent_is_ignored() {
        let mut tile = Tile::new(RoomId(0), Position::new(0, 0));
        tile.set_state_raw(TileState::Floor);
        tile.remove_entity(EntityId::from_raw(7));
        assert!(tile.entities().is_empty());
    }

    #[test]
    fn test_appearance_cache_keyed_by_tick() {
        let mut tile = Tile::new(RoomId(0), Position::new(0, 0));
        let (symbol, fg, bg) = TileState::Floor.appearance();
        let app = TileAppearance {
            symbol,
            fg,
            bg,
            entities: Vec::new(),
        };
        tile.store_appearance(3, app.clone());
        assert_eq!(tile.cached_appearance(3), Some(&app));
        assert_eq!(tile.cached_appearance(4), None);
    }

    #[test]
    fn test_state_change_invalidates_cache() {
        let mut tile = Tile::new(RoomId(0), Position::new(0, 0));
        let app = TileAppearance {
            symbol: '.',
            fg: 8,
            bg: 0,
            entities: Vec::new(),
        };
        tile.store_appearance(3, app);
        tile.set_state_raw(TileState::Wall);
        assert_eq!(tile.cached_appearance(3), None);
    }
}
