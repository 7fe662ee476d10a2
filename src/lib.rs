//! An MDP agent for grid-world pursuit games.
//!
//! Every turn the agent shapes a reward over the open cells of the maze,
//! solves the resulting Markov decision process with value iteration, and
//! steps towards the neighbour with the highest utility. [`game`] and
//! [`render`] provide a terminal Pac-Man host to run it against.

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod policy;
pub mod render;
pub mod reward;
pub mod solver;
pub mod transition;
pub mod world;

pub use agent::{MdpAgent, Phase};
pub use config::{AgentConfig, MazeConfig, RewardWeights, RunConfig};
pub use error::MdpError;
pub use geometry::{Coord, Direction};
pub use grid::Grid;
pub use solver::{SweepMode, ValueIteration};
pub use world::{Ghost, GhostMode, Observation, WorldView};
