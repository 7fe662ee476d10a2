//! Stochastic move outcomes. Depends only on wall geometry, so it is built
//! once per maze and reused across decisions.

use std::collections::BTreeMap;

use crate::geometry::{Coord, Direction};
use crate::grid::Grid;

pub const INTENDED_PROBABILITY: f64 = 0.8;
pub const DRIFT_PROBABILITY: f64 = 0.1;

/// `[intended, perpendicular A, perpendicular B]` successors.
pub type Successors = [Coord; 3];

#[derive(Clone, Debug, Default)]
pub struct TransitionModel {
    table: BTreeMap<Coord, [Successors; 4]>,
}

impl TransitionModel {
    pub fn build(grid: &Grid) -> Self {
        let table = grid
            .open_cells()
            .into_iter()
            .map(|cell| {
                let adj = grid.neighbours(cell);
                let row = Direction::ALL.map(|dir| {
                    let [a, b] = dir.perpendicular();
                    [adj.get(dir), adj.get(a), adj.get(b)]
                });
                (cell, row)
            })
            .collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn successors(&self, cell: Coord, dir: Direction) -> Option<&Successors> {
        self.table.get(&cell).map(|row| &row[dir.index()])
    }

    /// All four directions for `cell`, in `Direction::ALL` order.
    pub fn row(&self, cell: Coord) -> Option<&[Successors; 4]> {
        self.table.get(&cell)
    }

    /// `(successor, probability)` pairs for one move.
    pub fn outcomes(&self, cell: Coord, dir: Direction) -> Option<[(Coord, f64); 3]> {
        self.successors(cell, dir).map(|[intended, a, b]| {
            [
                (*intended, INTENDED_PROBABILITY),
                (*a, DRIFT_PROBABILITY),
                (*b, DRIFT_PROBABILITY),
            ]
        })
    }
}
