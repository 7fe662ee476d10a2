//! The narrow query surface the agent needs from a host game engine.

use std::collections::HashSet;

use crate::geometry::{Coord, Direction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GhostMode {
    Dangerous,
    Fleeing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub position: Coord,
    pub mode: GhostMode,
}

impl Ghost {
    pub fn dangerous(position: Coord) -> Self {
        Self {
            position,
            mode: GhostMode::Dangerous,
        }
    }

    pub fn fleeing(position: Coord) -> Self {
        Self {
            position,
            mode: GhostMode::Fleeing,
        }
    }
}

/// Read-only view of the host's world state.
///
/// `walls` and `corners` are read once per game; everything else once per
/// decision.
pub trait WorldView {
    fn walls(&self) -> Vec<Coord>;
    fn corners(&self) -> Vec<Coord>;
    fn agent_position(&self) -> Coord;
    fn food(&self) -> Vec<Coord>;
    fn capsules(&self) -> Vec<Coord>;
    fn ghosts(&self) -> Vec<Ghost>;
    fn legal_moves(&self) -> Vec<Direction>;
}

/// Facts observed at the start of one decision.
#[derive(Clone, Debug, Default)]
pub struct Observation {
    pub agent: Coord,
    pub food: HashSet<Coord>,
    pub capsules: HashSet<Coord>,
    pub ghosts: Vec<Ghost>,
}

impl Observation {
    pub fn capture<W: WorldView + ?Sized>(world: &W) -> Self {
        Self {
            agent: world.agent_position(),
            food: world.food().into_iter().collect(),
            capsules: world.capsules().into_iter().collect(),
            ghosts: world.ghosts(),
        }
    }
}
