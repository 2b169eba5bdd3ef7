//! Rooms — rectangular grids of tiles.

use serde::{Deserialize, Serialize};

use crate::tile::Tile;
use warren_geom::{Position, Rect};

/// Identifier of a room within its level, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub(crate) u32);

impl RoomId {
    /// Sentinel for "no room", used by the shared void tile.
    pub const INVALID: RoomId = RoomId(u32::MAX);

    /// Index into the level's room list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A rectangular grid of tiles.
///
/// Rooms own their tiles but no entities — entities belong to tile
/// occupant lists. Every tile carries a back-reference to its owning room
/// id and its immutable room-relative position.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    rect: Rect,
    /// Row-major, `rect.width() * rect.height()` tiles, all initially Void.
    tiles: Vec<Tile>,
}

impl Room {
    pub(crate) fn new(id: RoomId, rect: Rect) -> Self {
        assert!(!rect.is_empty(), "room rectangle must not be empty");
        let tiles = rect
            .iter()
            .map(|abs| Tile::new(id, abs - rect.min))
            .collect();
        Self { id, rect, tiles }
    }

    /// This room's id.
    #[must_use]
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// The room's absolute rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Translate a room-relative position to an absolute one.
    #[must_use]
    pub fn to_absolute(&self, rel: Position) -> Position {
        self.rect.min + rel
    }

    /// Translate an absolute position to a room-relative one.
    #[must_use]
    pub fn to_relative(&self, abs: Position) -> Position {
        abs - self.rect.min
    }

    fn index(&self, rel: Position) -> Option<usize> {
        if rel.x < 0 || rel.y < 0 || rel.x >= self.rect.width() || rel.y >= self.rect.height() {
            return None;
        }
        Some((rel.y * self.rect.width() + rel.x) as usize)
    }

    /// The tile at a room-relative position, or `None` when out of bounds.
    /// Cross-boundary neighbour queries resolve through
    /// [`Level::room_tile`](crate::Level::room_tile) instead.
    #[must_use]
    pub fn tile(&self, rel: Position) -> Option<&Tile> {
        self.index(rel).map(|i| &self.tiles[i])
    }

    pub(crate) fn tile_mut(&mut self, rel: Position) -> Option<&mut Tile> {
        self.index(rel).map(|i| &mut self.tiles[i])
    }

    /// Iterate over the room's tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_know_their_relative_position() {
        let room = Room::new(RoomId(0), Rect::new(10, 20, 3, 2));
        let tile = room.tile(Position::new(2, 1)).unwrap();
        assert_eq!(tile.rel(), Position::new(2, 1));
        assert_eq!(tile.room(), RoomId(0));
        assert_eq!(room.to_absolute(tile.rel()), Position::new(12, 21));
    }

    #[test]
    fn test_out_of_bounds_is_none() {
        let room = Room::new(RoomId(0), Rect::new(0, 0, 3, 3));
        assert!(room.tile(Position::new(3, 0)).is_none());
        assert!(room.tile(Position::new(0, -1)).is_none());
    }

    #[test]
    fn test_coordinate_translation_roundtrip() {
        let room = Room::new(RoomId(1), Rect::new(-5, 7, 4, 4));
        let abs = Position::new(-3, 9);
        assert_eq!(room.to_absolute(room.to_relative(abs)), abs);
    }
}
