//! Per-client reveal masks.
//!
//! Each connected client keeps one [`RoomVisibility`] per room: a grid of
//! "last tick seen" stamps that only ever moves forward. Tiles a client has
//! seen stay revealed (remembered terrain); tiles stamped at exactly the
//! current tick are the currently-visible set serialised into snapshots.

use crate::level::Tick;
use crate::room::{Room, RoomId};
use crate::tile::TileState;
use crate::world::World;
use warren_geom::{Position, Rect, line};

/// Persistent visibility state for one room, for one client.
///
/// Created at connect time and never reset; the mask accumulates for as
/// long as the client stays connected.
#[derive(Debug)]
pub struct RoomVisibility {
    room: RoomId,
    rect: Rect,
    /// Last tick each tile was seen, row-major. 0 = never.
    seen: Vec<Tick>,
    /// Latest tick any tile in the room was seen.
    last_seen: Tick,
}

impl RoomVisibility {
    /// A fresh, fully-unseen mask for `room`.
    #[must_use]
    pub fn new(room: &Room) -> Self {
        let rect = room.rect();
        Self {
            room: room.id(),
            rect,
            seen: vec![0; (rect.width() * rect.height()) as usize],
            last_seen: 0,
        }
    }

    /// The room this mask tracks.
    #[must_use]
    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Latest tick any tile in the room was seen.
    #[must_use]
    pub fn last_seen(&self) -> Tick {
        self.last_seen
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if !self.rect.contains(pos) {
            return None;
        }
        let rel = pos - self.rect.min;
        Some((rel.y * self.rect.width() + rel.x) as usize)
    }

    /// Last tick the tile at an absolute position was seen. 0 = never.
    #[must_use]
    pub fn seen_at(&self, pos: Position) -> Tick {
        self.index(pos).map_or(0, |i| self.seen[i])
    }

    /// Absolute positions of every tile seen at exactly `time`.
    pub fn visible_at(&self, time: Tick) -> impl Iterator<Item = Position> + '_ {
        self.rect
            .iter()
            .filter(move |&pos| self.seen_at(pos) == time)
    }

    /// Recompute this room's visibility from `origin`.
    ///
    /// For every room position within `max_radius`, walks the Bresenham
    /// line from the origin and stamps each tile at `time`, up to and
    /// including the first non-Floor tile — walls are revealed, nothing
    /// behind them is. Returns whether any tile in the room was visible
    /// at `time`.
    pub fn update(
        &mut self,
        world: &World,
        origin: Position,
        max_radius: i32,
        time: Tick,
    ) -> bool {
        let radius_sq = max_radius * max_radius;
        let mut any = false;
        for target in self.rect.iter() {
            if (target - origin).length_squared() > radius_sq {
                continue;
            }
            for pos in line(origin, target) {
                if let Some(i) = self.index(pos) {
                    self.seen[i] = time;
                    any = true;
                }
                if world.level().tile(pos).state() != TileState::Floor {
                    break;
                }
            }
        }
        if any {
            self.last_seen = time;
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A corridor world: one room of `width` x 1 floor tiles at the
    /// origin, with walls where `walls` says.
    fn corridor(width: i32, walls: &[i32]) -> World {
        let mut world = World::new(0);
        let rect = Rect::new(0, 0, width, 1);
        world.create_room(rect);
        world.fill(rect, TileState::Floor);
        for &x in walls {
            world.set_tile_state(Position::new(x, 0), TileState::Wall);
        }
        world
    }

    #[test]
    fn test_reveal_stops_at_wall_inclusive() {
        // 5x1 corridor, wall at index 2, viewed from index 0: tiles 0..=2
        // are revealed, tiles 3 and 4 are not.
        let world = corridor(5, &[2]);
        let room = world.level().rooms().next().unwrap();
        let mut vis = RoomVisibility::new(room);
        let any = vis.update(&world, Position::new(0, 0), 10, 1);
        assert!(any);
        assert_eq!(vis.seen_at(Position::new(0, 0)), 1);
        assert_eq!(vis.seen_at(Position::new(1, 0)), 1);
        assert_eq!(vis.seen_at(Position::new(2, 0)), 1, "the wall is revealed");
        assert_eq!(vis.seen_at(Position::new(3, 0)), 0);
        assert_eq!(vis.seen_at(Position::new(4, 0)), 0);
    }

    #[test]
    fn test_origin_tile_is_revealed() {
        let world = corridor(3, &[]);
        let room = world.level().rooms().next().unwrap();
        let mut vis = RoomVisibility::new(room);
        vis.update(&world, Position::new(1, 0), 5, 7);
        assert_eq!(vis.seen_at(Position::new(1, 0)), 7);
    }

    #[test]
    fn test_radius_bounds_reveal() {
        let world = corridor(10, &[]);
        let room = world.level().rooms().next().unwrap();
        let mut vis = RoomVisibility::new(room);
        vis.update(&world, Position::new(0, 0), 3, 1);
        assert_eq!(vis.seen_at(Position::new(3, 0)), 1);
        assert_eq!(vis.seen_at(Position::new(4, 0)), 0);
    }

    #[test]
    fn test_mask_is_monotonic() {
        // Once seen, a tile stays revealed at its old stamp even when a
        // later update no longer reaches it.
        let world = corridor(8, &[]);
        let room = world.level().rooms().next().unwrap();
        let mut vis = RoomVisibility::new(room);
        vis.update(&world, Position::new(7, 0), 2, 1);
        assert_eq!(vis.seen_at(Position::new(7, 0)), 1);
        vis.update(&world, Position::new(0, 0), 2, 2);
        assert_eq!(vis.seen_at(Position::new(0, 0)), 2);
        // Out of range of the second update, still carries the old stamp.
        assert_eq!(vis.seen_at(Position::new(7, 0)), 1);
        assert_eq!(vis.last_seen(), 2);
    }

    #[test]
    fn test_visible_at_reports_only_current_tick() {
        let world = corridor(4, &[]);
        let room = world.level().rooms().next().unwrap();
        let mut vis = RoomVisibility::new(room);
        vis.update(&world, Position::new(0, 0), 2, 1);
        vis.update(&world, Position::new(3, 0), 1, 2);
        let now: Vec<Position> = vis.visible_at(2).collect();
        assert!(now.contains(&Position::new(3, 0)));
        assert!(!now.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_no_tiles_in_range_returns_false() {
        let world = corridor(3, &[]);
        let room = world.level().rooms().next().unwrap();
        let mut vis = RoomVisibility::new(room);
        assert!(!vis.update(&world, Position::new(100, 100), 3, 1));
        assert_eq!(vis.last_seen(), 0);
    }
}
