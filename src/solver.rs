//! Value iteration over the reward and transition models.
//!
//! The default sweep updates utilities in place, so cells later in a sweep
//! already see the new values of cells earlier in it (Gauss-Seidel). The
//! synchronous sweep reads only the previous sweep's values. Both reach the
//! same fixed point; they differ in how many sweeps it takes.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::DEFAULT_TOLERANCE;
use crate::error::{MdpError, Result};
use crate::geometry::Coord;
use crate::grid::Grid;
use crate::reward::RewardMap;
use crate::transition::{Successors, TransitionModel, DRIFT_PROBABILITY, INTENDED_PROBABILITY};

pub type UtilityMap = BTreeMap<Coord, f64>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SweepMode {
    #[default]
    InPlace,
    Synchronous,
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub utilities: UtilityMap,
    pub sweeps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueIteration {
    pub discount: f64,
    pub tolerance: f64,
    pub sweep: SweepMode,
}

impl ValueIteration {
    pub fn new(discount: f64) -> Self {
        Self {
            discount,
            tolerance: DEFAULT_TOLERANCE,
            sweep: SweepMode::InPlace,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_sweep(mut self, sweep: SweepMode) -> Self {
        self.sweep = sweep;
        self
    }

    /// Iterates until the largest utility change in a sweep drops below the
    /// tolerance. There is no sweep cap: termination rests on the discount
    /// being below one and every reward being finite, both checked up front.
    pub fn solve(
        &self,
        grid: &Grid,
        rewards: &RewardMap,
        transitions: &TransitionModel,
    ) -> Result<Solution> {
        if !self.discount.is_finite() || !(0.0..1.0).contains(&self.discount) {
            return Err(MdpError::InvalidDiscount(self.discount));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(MdpError::InvalidTolerance(self.tolerance));
        }

        let cells = grid.open_cells();
        let mut rows = Vec::with_capacity(cells.len());
        for &cell in &cells {
            let reward = *rewards.get(&cell).ok_or(MdpError::MissingReward { cell })?;
            if !reward.is_finite() {
                return Err(MdpError::NonFiniteReward {
                    cell,
                    value: reward,
                });
            }
            let row = transitions
                .row(cell)
                .ok_or(MdpError::MissingTransitions { cell })?;
            rows.push((cell, reward, row));
        }

        let mut utilities: UtilityMap = cells.iter().map(|&c| (c, 0.0)).collect();
        let mut sweeps = 0u32;
        loop {
            sweeps += 1;
            let delta = match self.sweep {
                SweepMode::InPlace => self.sweep_in_place(&rows, &mut utilities)?,
                SweepMode::Synchronous => self.sweep_synchronous(&rows, &mut utilities)?,
            };
            if delta < self.tolerance {
                debug!(sweeps, cells = cells.len(), "value iteration converged");
                return Ok(Solution { utilities, sweeps });
            }
        }
    }

    fn sweep_in_place(
        &self,
        rows: &[(Coord, f64, &[Successors; 4])],
        utilities: &mut UtilityMap,
    ) -> Result<f64> {
        let mut delta: f64 = 0.0;
        for &(cell, reward, row) in rows {
            let updated = reward + self.discount * best_expectation(row, utilities)?;
            let slot = utilities
                .get_mut(&cell)
                .ok_or(MdpError::MissingUtility { cell })?;
            delta = delta.max((updated - *slot).abs());
            *slot = updated;
        }
        Ok(delta)
    }

    fn sweep_synchronous(
        &self,
        rows: &[(Coord, f64, &[Successors; 4])],
        utilities: &mut UtilityMap,
    ) -> Result<f64> {
        let previous = utilities.clone();
        let mut delta: f64 = 0.0;
        for &(cell, reward, row) in rows {
            let updated = reward + self.discount * best_expectation(row, &previous)?;
            let old = previous
                .get(&cell)
                .copied()
                .ok_or(MdpError::MissingUtility { cell })?;
            delta = delta.max((updated - old).abs());
            utilities.insert(cell, updated);
        }
        Ok(delta)
    }
}

/// Max over the four moves of the expected successor utility.
fn best_expectation(row: &[Successors; 4], utilities: &UtilityMap) -> Result<f64> {
    let mut best = f64::NEG_INFINITY;
    for successors in row {
        best = best.max(expected_utility(successors, utilities)?);
    }
    Ok(best)
}

pub fn expected_utility(successors: &Successors, utilities: &UtilityMap) -> Result<f64> {
    let u = |cell: Coord| {
        utilities
            .get(&cell)
            .copied()
            .ok_or(MdpError::MissingUtility { cell })
    };
    let [intended, a, b] = *successors;
    Ok(INTENDED_PROBABILITY * u(intended)?
        + DRIFT_PROBABILITY * u(a)?
        + DRIFT_PROBABILITY * u(b)?)
}
