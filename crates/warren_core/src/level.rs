//! The level — the ordered collection of rooms and the simulation clock.

use crate::room::{Room, RoomId};
use crate::tile::Tile;
use warren_geom::{Position, Rect};

/// A discrete simulation time point. The clock starts at 1 and advances
/// once per tick.
pub type Tick = u64;

/// Shared sentinel for positions outside every room. Point lookups always
/// return a tile, never fail.
static VOID_TILE: Tile = Tile::VOID;

/// The level owns the rooms and the monotonic simulation clock.
///
/// Created once at server startup, mutated by room creation during
/// generation, and alive for the rest of the process.
#[derive(Debug)]
pub struct Level {
    rooms: Vec<Room>,
    time: Tick,
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    /// An empty level at time 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: Vec::new(),
            time: 1,
        }
    }

    /// The current simulation time.
    #[must_use]
    pub fn time(&self) -> Tick {
        self.time
    }

    /// Advance the clock by one tick. Called by the world at the end of
    /// its tick, after every room has thought.
    pub(crate) fn advance(&mut self) {
        self.time += 1;
    }

    /// Create a room covering `rect`, with all tiles Void. The only
    /// sanctioned way tiles come to exist.
    pub fn create_room(&mut self, rect: Rect) -> RoomId {
        let id = RoomId(self.rooms.len() as u32);
        self.rooms.push(Room::new(id, rect));
        id
    }

    /// The room with the given id.
    ///
    /// # Panics
    ///
    /// Panics when the id was not issued by this level.
    #[must_use]
    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.index()]
    }

    /// Iterate over all rooms in creation order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Number of rooms.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The first room (in creation order) whose rectangle contains `pos`.
    #[must_use]
    pub fn room_at(&self, pos: Position) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|r| r.rect().contains(pos))
            .map(Room::id)
    }

    /// The tile at an absolute position: the first containing room's tile,
    /// or the shared void sentinel when no room contains the point.
    #[must_use]
    pub fn tile(&self, pos: Position) -> &Tile {
        match self.room_at(pos) {
            Some(id) => {
                let room = self.room(id);
                room.tile(room.to_relative(pos)).unwrap_or(&VOID_TILE)
            }
            None => &VOID_TILE,
        }
    }

    pub(crate) fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        let id = self.room_at(pos)?;
        let rel = self.room(id).to_relative(pos);
        self.rooms[id.index()].tile_mut(rel)
    }

    /// Room-relative tile access. In-bounds positions resolve inside the
    /// room; out-of-bounds positions are forwarded to the level at the
    /// equivalent absolute position, so neighbour queries across room
    /// boundaries transparently reach adjacent rooms or the void sentinel.
    #[must_use]
    pub fn room_tile(&self, id: RoomId, rel: Position) -> &Tile {
        let room = self.room(id);
        match room.tile(rel) {
            Some(tile) => tile,
            None => self.tile(room.to_absolute(rel)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileState;

    #[test]
    fn test_clock_starts_at_one() {
        assert_eq!(Level::new().time(), 1);
    }

    #[test]
    fn test_outside_lookup_yields_void_sentinel() {
        let level = Level::new();
        let tile = level.tile(Position::new(100, 100));
        assert_eq!(tile.state(), TileState::Void);
        assert_eq!(tile.room(), RoomId::INVALID);
    }

    #[test]
    fn test_point_lookup_finds_first_containing_room() {
        let mut level = Level::new();
        let a = level.create_room(Rect::new(0, 0, 4, 4));
        let _b = level.create_room(Rect::new(2, 2, 4, 4));
        // (3, 3) lies in both; the first room wins.
        assert_eq!(level.tile(Position::new(3, 3)).room(), a);
    }

    #[test]
    fn test_room_tile_forwards_out_of_bounds() {
        let mut level = Level::new();
        let a = level.create_room(Rect::new(0, 0, 2, 2));
        let b = level.create_room(Rect::new(2, 0, 2, 2));
        // One step east of room a's right edge lands in room b.
        let tile = level.room_tile(a, Position::new(2, 0));
        assert_eq!(tile.room(), b);
        // Far out of bounds lands on the void sentinel.
        let tile = level.room_tile(a, Position::new(-10, 0));
        assert_eq!(tile.room(), RoomId::INVALID);
    }
}
