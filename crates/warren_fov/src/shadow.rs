//! Recursive octant shadowcasting.
//!
//! The plane around the origin is divided into eight 45° octants. Each
//! octant is scanned row by row at increasing distance from the origin,
//! between two boundary slopes that start at the octant's edges. When a scan
//! hits an opaque cell, the remainder of the octant splits: the span before
//! the blocker continues in a recursive sub-scan narrowed to the blocker's
//! near corner, and the span after it resumes once a transparent cell is
//! found, with the boundary advanced past the blocker's far corner.
//!
//! Compared to casting a ray per cell this visits each cell of the disc at
//! most once per octant and terminates whole wedges as soon as they fall
//! into shadow. Blocking cells are themselves reported visible, so walls
//! appear in the result set but nothing behind them does.

use warren_geom::Position;

/// Slope comparisons tolerate this much floating-point error at cell
/// corners.
const EPS: f32 = 1e-5;

/// Octant transforms from scan-local (dx, dy) to world offsets.
const XX: [i32; 8] = [1, 0, 0, -1, -1, 0, 0, 1];
const XY: [i32; 8] = [0, 1, -1, 0, 0, -1, 1, 0];
const YX: [i32; 8] = [0, 1, 1, 0, 0, -1, -1, 0];
const YY: [i32; 8] = [1, 0, 0, 1, -1, 0, 0, -1];

/// Visits every position visible from `origin` within `radius`.
///
/// `opaque` reports whether a position blocks sight. `visit` receives the
/// origin first, then each visible position; positions on octant seams may
/// be reported more than once.
pub fn shadowcast(
    origin: Position,
    radius: i32,
    opaque: &impl Fn(Position) -> bool,
    visit: &mut impl FnMut(Position),
) {
    visit(origin);
    for octant in 0..8 {
        scan(origin, radius, octant, 1, 1.0, 0.0, opaque, visit);
    }
}

/// Scan one octant from `start_row` outward, bounded by `start_slope`
/// (toward the diagonal) and `end_slope` (toward the axis).
#[allow(clippy::too_many_arguments)]
fn scan(
    origin: Position,
    radius: i32,
    octant: usize,
    start_row: i32,
    mut start_slope: f32,
    end_slope: f32,
    opaque: &impl Fn(Position) -> bool,
    visit: &mut impl FnMut(Position),
) {
    if start_slope < end_slope {
        return;
    }
    let radius_sq = radius * radius;
    let mut new_start = start_slope;

    for row in start_row..=radius {
        let dy = -row;
        let mut blocked = false;

        for dx in -row..=0 {
            let l_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
            let r_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);
            if start_slope < r_slope - EPS {
                continue;
            }
            if end_slope > l_slope + EPS {
                break;
            }

            let cell = origin
                + Position::new(
                    dx * XX[octant] + dy * XY[octant],
                    dx * YX[octant] + dy * YY[octant],
                );
            if dx * dx + dy * dy <= radius_sq {
                visit(cell);
            }

            if blocked {
                if opaque(cell) {
                    new_start = r_slope;
                } else {
                    blocked = false;
                    start_slope = new_start;
                }
            } else if opaque(cell) && row < radius {
                // Split: the near span continues below the blocker's near
                // corner, this scan resumes past its far corner.
                blocked = true;
                scan(
                    origin, radius, octant, row + 1, start_slope, l_slope, opaque, visit,
                );
                new_start = r_slope;
            }
        }

        if blocked {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// Casts from `origin` on a map where `walls` are the only opaque cells
    /// inside `floor`, and everything outside `floor` is opaque.
    fn cast(
        origin: Position,
        radius: i32,
        floor: &HashSet<Position>,
        walls: &HashSet<Position>,
    ) -> HashSet<Position> {
        let opaque = |p: Position| !floor.contains(&p) || walls.contains(&p);
        let mut seen = HashSet::new();
        shadowcast(origin, radius, &opaque, &mut |p| {
            seen.insert(p);
        });
        seen
    }

    #[test]
    fn test_open_room_fully_visible() {
        // A 3x3 all-floor room, origin at the centre, radius 5: every tile
        // of the room is visible.
        let floor: HashSet<Position> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
            .collect();
        let seen = cast(Position::new(1, 1), 5, &floor, &HashSet::new());
        for p in &floor {
            assert!(seen.contains(p), "{p} should be visible");
        }
    }

    #[test]
    fn test_wall_casts_shadow_along_row() {
        // A 5x1 corridor with a wall at x=2: tiles 0..=2 are visible from
        // x=0, tiles 3 and 4 are in its shadow.
        let floor: HashSet<Position> = (0..5).map(|x| Position::new(x, 0)).collect();
        let walls: HashSet<Position> = [Position::new(2, 0)].into();
        let seen = cast(Position::new(0, 0), 10, &floor, &walls);
        assert!(seen.contains(&Position::new(0, 0)));
        assert!(seen.contains(&Position::new(1, 0)));
        assert!(seen.contains(&Position::new(2, 0)), "walls are revealed");
        assert!(!seen.contains(&Position::new(3, 0)));
        assert!(!seen.contains(&Position::new(4, 0)));
    }

    #[test]
    fn test_radius_limits_reach() {
        let floor: HashSet<Position> = (-20..=20)
            .flat_map(|y| (-20..=20).map(move |x| Position::new(x, y)))
            .collect();
        let seen = cast(Position::ZERO, 3, &floor, &HashSet::new());
        assert!(seen.contains(&Position::new(3, 0)));
        assert!(!seen.contains(&Position::new(4, 0)));
        for p in &seen {
            assert!(p.length_squared() <= 9, "{p} is beyond the radius");
        }
    }

    #[test]
    fn test_origin_always_visible() {
        // Even when completely walled in.
        let floor: HashSet<Position> = [Position::ZERO].into();
        let seen = cast(Position::ZERO, 5, &floor, &HashSet::new());
        assert!(seen.contains(&Position::ZERO));
    }

    #[test]
    fn test_pillar_shadow_widens_with_distance() {
        let floor: HashSet<Position> = (-10..=10)
            .flat_map(|y| (-10..=10).map(move |x| Position::new(x, y)))
            .collect();
        let walls: HashSet<Position> = [Position::new(2, 0)].into();
        let seen = cast(Position::ZERO, 8, &floor, &walls);
        // Directly behind the pillar is dark.
        assert!(!seen.contains(&Position::new(4, 0)));
        assert!(!seen.contains(&Position::new(7, 0)));
        // Off-axis cells at the same distance stay lit.
        assert!(seen.contains(&Position::new(4, 3)));
        assert!(seen.contains(&Position::new(4, -3)));
    }
}
