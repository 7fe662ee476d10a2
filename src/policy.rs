//! One-step greedy lookahead over converged utilities.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{MdpError, Result};
use crate::geometry::{Coord, Direction};
use crate::grid::Grid;
use crate::solver::UtilityMap;

/// Picks the open neighbour of `at` with the highest utility. Directions
/// blocked by a wall are never chosen; ties go to the first direction in
/// `Direction::ALL`.
pub fn greedy_direction(grid: &Grid, utilities: &UtilityMap, at: Coord) -> Result<Direction> {
    let mut best: Option<(Direction, f64)> = None;
    for (dir, next) in grid.neighbours(at).iter() {
        if next == at {
            continue;
        }
        let u = *utilities
            .get(&next)
            .ok_or(MdpError::MissingUtility { cell: next })?;
        match best {
            Some((_, top)) if u <= top => {}
            _ => best = Some((dir, u)),
        }
    }
    best.map(|(dir, _)| dir).ok_or(MdpError::Boxed { cell: at })
}

/// Returns `wanted` when the host allows it, otherwise a random legal move.
pub fn legalize(wanted: Direction, legal: &[Direction], rng: &mut impl Rng) -> Result<Direction> {
    if legal.contains(&wanted) {
        return Ok(wanted);
    }
    legal
        .choose(rng)
        .copied()
        .ok_or(MdpError::NoLegalMove { wanted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::boxed_grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat(grid: &Grid) -> UtilityMap {
        grid.open_cells().into_iter().map(|c| (c, 0.0)).collect()
    }

    #[test]
    fn picks_highest_neighbour() {
        let grid = boxed_grid(7, &[]);
        let mut utils = flat(&grid);
        utils.insert(Coord::new(3, 2), 5.0);
        utils.insert(Coord::new(4, 3), 7.0);
        let dir = greedy_direction(&grid, &utils, Coord::new(3, 3)).unwrap();
        assert_eq!(dir, Direction::East);
    }

    #[test]
    fn ties_follow_enumeration_order() {
        let grid = boxed_grid(7, &[]);
        let utils = flat(&grid);
        assert_eq!(
            greedy_direction(&grid, &utils, Coord::new(3, 3)).unwrap(),
            Direction::North
        );
        // North is a wall at the top row, so South wins the tie.
        assert_eq!(
            greedy_direction(&grid, &utils, Coord::new(3, 5)).unwrap(),
            Direction::South
        );
    }

    #[test]
    fn never_walks_into_walls() {
        let grid = boxed_grid(7, &[(2, 3), (4, 3), (3, 4)]);
        let mut utils = flat(&grid);
        // The cell itself is very attractive; only South is open.
        utils.insert(Coord::new(3, 3), 1000.0);
        utils.insert(Coord::new(3, 2), -50.0);
        let dir = greedy_direction(&grid, &utils, Coord::new(3, 3)).unwrap();
        assert_eq!(dir, Direction::South);
    }

    #[test]
    fn boxed_in_agent_is_an_error() {
        let grid = boxed_grid(5, &[(1, 2), (2, 1), (3, 2), (2, 3)]);
        let utils = flat(&grid);
        assert_eq!(
            greedy_direction(&grid, &utils, Coord::new(2, 2)),
            Err(MdpError::Boxed {
                cell: Coord::new(2, 2)
            })
        );
    }

    #[test]
    fn missing_neighbour_utility_is_fatal() {
        let grid = boxed_grid(7, &[]);
        let mut utils = flat(&grid);
        utils.remove(&Coord::new(3, 4));
        assert_eq!(
            greedy_direction(&grid, &utils, Coord::new(3, 3)),
            Err(MdpError::MissingUtility {
                cell: Coord::new(3, 4)
            })
        );
    }

    #[test]
    fn legalize_keeps_or_replaces() {
        let mut rng = StdRng::seed_from_u64(7);
        let legal = [Direction::East, Direction::West];
        assert_eq!(
            legalize(Direction::East, &legal, &mut rng),
            Ok(Direction::East)
        );
        let replaced = legalize(Direction::North, &legal, &mut rng).unwrap();
        assert!(legal.contains(&replaced));
        assert_eq!(
            legalize(Direction::North, &[], &mut rng),
            Err(MdpError::NoLegalMove {
                wanted: Direction::North
            })
        );
    }
}
