//! Movement directions on the grid.

use serde::{Deserialize, Serialize};

use crate::Position;

/// One of the eight movement directions.
///
/// `y` grows downward, so `North` is negative `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The unit step for this direction.
    #[must_use]
    pub const fn delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::NorthEast => Position::new(1, -1),
            Direction::East => Position::new(1, 0),
            Direction::SouthEast => Position::new(1, 1),
            Direction::South => Position::new(0, 1),
            Direction::SouthWest => Position::new(-1, 1),
            Direction::West => Position::new(-1, 0),
            Direction::NorthWest => Position::new(-1, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deltas_are_unit_steps() {
        for dir in Direction::ALL {
            let d = dir.delta();
            assert!(d.x.abs() <= 1 && d.y.abs() <= 1);
            assert_ne!(d, Position::ZERO);
        }
    }

    #[test]
    fn test_opposites_cancel() {
        assert_eq!(
            Direction::North.delta() + Direction::South.delta(),
            Position::ZERO
        );
        assert_eq!(
            Direction::NorthEast.delta() + Direction::SouthWest.delta(),
            Position::ZERO
        );
    }
}
