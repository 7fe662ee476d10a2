//! Per-step reward shaping over the open cells of the maze.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::config::RewardWeights;
use crate::geometry::{Coord, Direction};
use crate::grid::Grid;
use crate::world::{Ghost, GhostMode, Observation};

/// Reward for every open cell. Never holds an entry for a wall.
pub type RewardMap = BTreeMap<Coord, f64>;

/// Builds the reward map for one decision.
///
/// Layers are written in order, later layers overwriting earlier ones: step
/// cost, food, capsules, food-holding corners, then each ghost's own cell and
/// influence field.
pub fn build_rewards(
    grid: &Grid,
    observation: &Observation,
    weights: &RewardWeights,
    ghost_buffer: u32,
) -> RewardMap {
    let mut rewards: RewardMap = grid
        .open_cells()
        .into_iter()
        .map(|c| (c, weights.step))
        .collect();

    overlay(&mut rewards, observation.food.iter(), weights.food);
    overlay(&mut rewards, observation.capsules.iter(), weights.capsule);
    let corners = grid.reachable_corners(&observation.food);
    overlay(&mut rewards, corners.iter(), weights.corner);

    let occupied: HashSet<Coord> = observation.ghosts.iter().map(|g| g.position).collect();
    for ghost in &observation.ghosts {
        if !rewards.contains_key(&ghost.position) {
            continue;
        }
        let value = ghost_value(ghost, weights);
        rewards.insert(ghost.position, value);

        let rings = influence_rings(grid, ghost.position, observation.agent, &occupied, ghost_buffer);
        for (hop, cells) in rings.iter().enumerate() {
            let shaped = decay(value, hop as u32 + 1);
            for cell in cells {
                if let Some(r) = rewards.get_mut(cell) {
                    *r = shaped;
                }
            }
        }
    }
    rewards
}

fn overlay<'a>(rewards: &mut RewardMap, cells: impl Iterator<Item = &'a Coord>, value: f64) {
    for cell in cells {
        if let Some(r) = rewards.get_mut(cell) {
            *r = value;
        }
    }
}

fn ghost_value(ghost: &Ghost, weights: &RewardWeights) -> f64 {
    match ghost.mode {
        GhostMode::Dangerous => weights.ghost,
        GhostMode::Fleeing => weights.edible_ghost,
    }
}

/// Reward at `hop` steps from a ghost worth `value`.
pub fn decay(value: f64, hop: u32) -> f64 {
    (value / (hop as f64 + 1.0)).round()
}

/// Cells within `buffer` hops of `origin`, grouped by hop distance (index 0
/// is the adjacent ring). The expansion never enters walls, the agent's cell
/// or any ghost's cell, and each cell lands in the ring where it was first
/// discovered.
pub fn influence_rings(
    grid: &Grid,
    origin: Coord,
    agent: Coord,
    ghosts: &HashSet<Coord>,
    buffer: u32,
) -> Vec<Vec<Coord>> {
    let mut rings: Vec<Vec<Coord>> = vec![Vec::new(); buffer as usize];
    let mut depth: HashMap<Coord, u32> = HashMap::new();
    let mut frontier = VecDeque::new();
    frontier.push_back((origin, 0u32));

    while let Some((cell, d)) = frontier.pop_front() {
        if d >= buffer {
            continue;
        }
        for dir in Direction::ALL {
            let next = cell.step(dir);
            if !grid.is_open(next) || next == agent || ghosts.contains(&next) || next == origin {
                continue;
            }
            if depth.contains_key(&next) {
                continue;
            }
            depth.insert(next, d + 1);
            rings[d as usize].push(next);
            frontier.push_back((next, d + 1));
        }
    }
    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::boxed_grid;

    fn observe(agent: (i32, i32), food: &[(i32, i32)], ghosts: Vec<Ghost>) -> Observation {
        Observation {
            agent: agent.into(),
            food: food.iter().map(|&p| Coord::from(p)).collect(),
            capsules: HashSet::new(),
            ghosts,
        }
    }

    #[test]
    fn one_entry_per_open_cell() {
        let grid = boxed_grid(7, &[(2, 2), (3, 3)]);
        let obs = observe((1, 1), &[(4, 4)], vec![Ghost::dangerous(Coord::new(5, 5))]);
        let rewards = build_rewards(&grid, &obs, &RewardWeights::default(), 2);
        let open = grid.open_cells();
        assert_eq!(rewards.len(), open.len());
        assert!(open.iter().all(|c| rewards.contains_key(c)));
        assert!(rewards.keys().all(|c| !grid.is_wall(*c)));
    }

    #[test]
    fn overlays_apply_in_order() {
        let grid = boxed_grid(8, &[]);
        let mut obs = observe((3, 3), &[(2, 3), (1, 1), (4, 4)], vec![]);
        obs.capsules.insert(Coord::new(4, 4));
        let w = RewardWeights::default();
        let rewards = build_rewards(&grid, &obs, &w, 2);
        assert_eq!(rewards[&Coord::new(3, 3)], w.step);
        assert_eq!(rewards[&Coord::new(2, 3)], w.food);
        assert_eq!(rewards[&Coord::new(4, 4)], w.capsule);
        // (1,1) is an inner corner still holding food.
        assert_eq!(rewards[&Coord::new(1, 1)], w.corner);
        // (6,6) is an inner corner without food.
        assert_eq!(rewards[&Coord::new(6, 6)], w.step);
    }

    #[test]
    fn dangerous_field_decays_with_distance() {
        let grid = boxed_grid(11, &[]);
        let ghost = Coord::new(5, 5);
        let obs = observe((1, 1), &[], vec![Ghost::dangerous(ghost)]);
        let w = RewardWeights::default();
        let rewards = build_rewards(&grid, &obs, &w, 3);

        assert_eq!(rewards[&ghost], -500.0);
        assert_eq!(rewards[&Coord::new(5, 6)], -250.0);
        assert_eq!(rewards[&Coord::new(6, 6)], -167.0);
        assert_eq!(rewards[&Coord::new(5, 8)], -125.0);
        assert_eq!(rewards[&Coord::new(5, 9)], w.step);

        let mut last = f64::INFINITY;
        for hop in 1..=3 {
            let r = rewards[&Coord::new(5 + hop, 5)];
            assert_eq!(r, (-500.0 / (hop as f64 + 1.0)).round());
            assert!(r.abs() < last);
            last = r.abs();
        }
    }

    #[test]
    fn fleeing_field_is_positive() {
        let grid = boxed_grid(9, &[]);
        let obs = observe((1, 1), &[], vec![Ghost::fleeing(Coord::new(4, 4))]);
        let rewards = build_rewards(&grid, &obs, &RewardWeights::default(), 2);
        assert_eq!(rewards[&Coord::new(4, 4)], 200.0);
        assert_eq!(rewards[&Coord::new(4, 5)], 100.0);
        assert_eq!(rewards[&Coord::new(4, 6)], 67.0);
    }

    #[test]
    fn field_skips_agent_and_other_ghosts() {
        let grid = boxed_grid(9, &[]);
        let agent = Coord::new(4, 5);
        let other = Coord::new(5, 4);
        let obs = observe(
            (agent.x, agent.y),
            &[],
            vec![Ghost::dangerous(Coord::new(4, 4)), Ghost::fleeing(other)],
        );
        let w = RewardWeights::default();
        let rewards = build_rewards(&grid, &obs, &w, 2);
        assert_eq!(rewards[&agent], w.step);
        assert_eq!(rewards[&other], w.edible_ghost);
        assert_eq!(rewards[&Coord::new(4, 4)], w.ghost);
    }

    #[test]
    fn later_ghost_overwrites_overlap() {
        let grid = boxed_grid(9, &[]);
        let obs = observe(
            (1, 1),
            &[],
            vec![
                Ghost::dangerous(Coord::new(3, 4)),
                Ghost::fleeing(Coord::new(5, 4)),
            ],
        );
        let rewards = build_rewards(&grid, &obs, &RewardWeights::default(), 1);
        // (4,4) is adjacent to both; the fleeing ghost came last.
        assert_eq!(rewards[&Coord::new(4, 4)], 100.0);
        assert_eq!(rewards[&Coord::new(2, 4)], -250.0);
    }

    #[test]
    fn walls_block_the_field() {
        // A wall column at x=3 except nothing: the field cannot leak through.
        let walls: Vec<(i32, i32)> = (1..8).map(|y| (3, y)).collect();
        let grid = boxed_grid(9, &walls);
        let rings = influence_rings(&grid, Coord::new(2, 4), Coord::new(7, 7), &HashSet::new(), 3);
        assert!(rings.iter().flatten().all(|c| c.x < 3));
        assert_eq!(rings[0].len(), 3);
    }

    #[test]
    fn rings_hold_each_cell_once() {
        let grid = boxed_grid(9, &[]);
        let rings = influence_rings(&grid, Coord::new(4, 4), Coord::new(1, 1), &HashSet::new(), 3);
        let all: Vec<Coord> = rings.iter().flatten().copied().collect();
        let unique: HashSet<Coord> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[1].len(), 8);
        assert_eq!(rings[2].len(), 12);
        for (hop, ring) in rings.iter().enumerate() {
            for c in ring {
                assert_eq!(c.manhattan(Coord::new(4, 4)) as usize, hop + 1);
            }
        }
    }

    #[test]
    fn off_grid_ghost_is_ignored() {
        let grid = boxed_grid(7, &[]);
        let obs = observe((1, 1), &[], vec![Ghost::dangerous(Coord::new(0, 3))]);
        let w = RewardWeights::default();
        let rewards = build_rewards(&grid, &obs, &w, 2);
        assert!(rewards.values().all(|r| *r == w.step || *r == w.corner));
        assert_eq!(rewards[&Coord::new(1, 3)], w.step);
    }
}
