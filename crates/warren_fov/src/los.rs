//! Point-to-point line of sight.

use warren_geom::{Position, line};

/// Returns `true` if `to` can be seen from `from`.
///
/// Walks the Bresenham line between the two positions; sight is blocked
/// when any strictly intermediate position is opaque. The endpoints
/// themselves never block — a creature standing on a wall tile can still
/// be seen.
#[must_use]
pub fn line_of_sight(from: Position, to: Position, opaque: &impl Fn(Position) -> bool) -> bool {
    line(from, to)
        .skip(1)
        .take_while(|&p| p != to)
        .all(|p| !opaque(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_line() {
        let opaque = |_| false;
        assert!(line_of_sight(
            Position::new(0, 0),
            Position::new(5, 3),
            &opaque
        ));
    }

    #[test]
    fn test_adjacent_always_visible() {
        let opaque = |_| true;
        assert!(line_of_sight(
            Position::new(0, 0),
            Position::new(1, 1),
            &opaque
        ));
    }

    #[test]
    fn test_wall_blocks() {
        let opaque = |p: Position| p == Position::new(2, 0);
        assert!(!line_of_sight(
            Position::new(0, 0),
            Position::new(4, 0),
            &opaque
        ));
    }

    #[test]
    fn test_opaque_endpoint_does_not_block() {
        let opaque = |p: Position| p == Position::new(3, 0);
        assert!(line_of_sight(
            Position::new(0, 0),
            Position::new(3, 0),
            &opaque
        ));
    }

    #[test]
    fn test_self_sight() {
        let opaque = |_| true;
        assert!(line_of_sight(Position::new(2, 2), Position::new(2, 2), &opaque));
    }
}
