//! Bresenham line interpolation between grid positions.

use crate::Position;

/// Returns an iterator over the grid positions on the Bresenham line from
/// `from` to `to`, inclusive of both endpoints.
#[must_use]
pub fn line(from: Position, to: Position) -> LineIter {
    LineIter::new(from, to)
}

/// A lazy Bresenham line walk.
///
/// The iterator is finite and `Clone`, so a walk can be saved at any point
/// and restarted from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineIter {
    cur: Position,
    to: Position,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl LineIter {
    fn new(from: Position, to: Position) -> Self {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        Self {
            cur: from,
            to,
            dx,
            dy,
            sx: if from.x < to.x { 1 } else { -1 },
            sy: if from.y < to.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for LineIter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.done {
            return None;
        }
        let out = self.cur;
        if self.cur == self.to {
            self.done = true;
        } else {
            let e2 = 2 * self.err;
            if e2 >= self.dy {
                self.err += self.dy;
                self.cur.x += self.sx;
            }
            if e2 <= self.dx {
                self.err += self.dx;
                self.cur.y += self.sy;
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_single_point() {
        let pts: Vec<Position> = line(Position::new(3, 3), Position::new(3, 3)).collect();
        assert_eq!(pts, vec![Position::new(3, 3)]);
    }

    #[test]
    fn test_line_horizontal_inclusive() {
        let pts: Vec<Position> = line(Position::new(0, 0), Position::new(4, 0)).collect();
        assert_eq!(
            pts,
            (0..=4).map(|x| Position::new(x, 0)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_line_diagonal() {
        let pts: Vec<Position> = line(Position::new(0, 0), Position::new(3, 3)).collect();
        assert_eq!(
            pts,
            (0..=3).map(|i| Position::new(i, i)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_line_negative_direction() {
        let pts: Vec<Position> = line(Position::new(2, 5), Position::new(0, 5)).collect();
        assert_eq!(
            pts,
            vec![Position::new(2, 5), Position::new(1, 5), Position::new(0, 5)]
        );
    }

    #[test]
    fn test_line_restartable_from_clone() {
        let mut walk = line(Position::new(0, 0), Position::new(5, 2));
        walk.next();
        walk.next();
        let saved = walk;
        let rest_a: Vec<Position> = walk.collect();
        let rest_b: Vec<Position> = saved.collect();
        assert_eq!(rest_a, rest_b);
        assert_eq!(rest_a.last(), Some(&Position::new(5, 2)));
    }

    #[test]
    fn test_line_steep_slope_is_connected() {
        let pts: Vec<Position> = line(Position::new(0, 0), Position::new(2, 7)).collect();
        assert_eq!(pts.first(), Some(&Position::new(0, 0)));
        assert_eq!(pts.last(), Some(&Position::new(2, 7)));
        for pair in pts.windows(2) {
            let step = pair[1] - pair[0];
            assert!(step.x.abs() <= 1 && step.y.abs() <= 1);
            assert_ne!(step, Position::ZERO);
        }
    }
}
