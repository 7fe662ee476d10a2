//! Errors raised while building or solving the decision model.
//!
//! Every variant is an internal-invariant failure: the host handed over a
//! maze the model cannot represent, or the configuration breaks the
//! contraction that value iteration relies on. None of them is retried.

use thiserror::Error;

use crate::geometry::{Coord, Direction};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MdpError {
    #[error("discount factor {0} must be finite and in [0, 1)")]
    InvalidDiscount(f64),

    #[error("convergence tolerance {0} must be finite and positive")]
    InvalidTolerance(f64),

    #[error("reward at {cell} is not finite ({value})")]
    NonFiniteReward { cell: Coord, value: f64 },

    #[error("no reward recorded for open cell {cell}")]
    MissingReward { cell: Coord },

    #[error("no transitions recorded for open cell {cell}")]
    MissingTransitions { cell: Coord },

    #[error("no utility for cell {cell}")]
    MissingUtility { cell: Coord },

    #[error("agent at {cell} has no open neighbour")]
    Boxed { cell: Coord },

    #[error("host offered no legal move (wanted {wanted})")]
    NoLegalMove { wanted: Direction },

    #[error("agent asked to act before the maze was registered")]
    NotRegistered,
}

pub type Result<T> = std::result::Result<T, MdpError>;
