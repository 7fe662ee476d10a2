//! The per-turn controller that ties the models together.

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info, trace};

use crate::config::{AgentConfig, MazeConfig};
use crate::error::{MdpError, Result};
use crate::geometry::Direction;
use crate::grid::Grid;
use crate::policy::{greedy_direction, legalize};
use crate::reward::build_rewards;
use crate::solver::ValueIteration;
use crate::transition::TransitionModel;
use crate::world::{Observation, WorldView};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ObservingState,
    BuildingRewards,
    BuildingTransitions,
    Solving,
    ExtractingMove,
}

/// Computes one move per host turn by solving a fresh MDP.
///
/// The grid and the transition model live for a whole game; rewards and
/// utilities are rebuilt on every call and dropped once the move is chosen.
pub struct MdpAgent<R = ThreadRng> {
    config: AgentConfig,
    maze: MazeConfig,
    grid: Option<Grid>,
    transitions: Option<TransitionModel>,
    phase: Phase,
    games: u32,
    rng: R,
}

impl MdpAgent<ThreadRng> {
    pub fn new(config: AgentConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl Default for MdpAgent<ThreadRng> {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

impl<R: Rng> MdpAgent<R> {
    pub fn with_rng(config: AgentConfig, rng: R) -> Self {
        Self {
            config,
            maze: MazeConfig::DEFAULT,
            grid: None,
            transitions: None,
            phase: Phase::Idle,
            games: 1,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of the game currently being played, starting at 1.
    pub fn games(&self) -> u32 {
        self.games
    }

    pub fn maze_config(&self) -> MazeConfig {
        self.maze
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn has_transitions(&self) -> bool {
        self.transitions.is_some()
    }

    /// Reads the static maze and picks the preset for its size.
    pub fn register_initial_state<W: WorldView + ?Sized>(&mut self, world: &W) {
        let grid = Grid::from_corners(world.corners(), world.walls());
        self.maze = MazeConfig::for_dimensions(grid.max_w(), grid.max_h());
        debug!(
            max_w = grid.max_w(),
            max_h = grid.max_h(),
            discount = self.maze.discount,
            ghost_buffer = self.maze.ghost_buffer,
            "registered maze"
        );
        self.grid = Some(grid);
        self.phase = Phase::Idle;
    }

    /// Runs one decision and returns a move the host accepts.
    pub fn get_action<W: WorldView + ?Sized>(&mut self, world: &W) -> Result<Direction> {
        let result = self.decide(world);
        advance(&mut self.phase, Phase::Idle);
        result
    }

    fn decide<W: WorldView + ?Sized>(&mut self, world: &W) -> Result<Direction> {
        let grid = self.grid.as_ref().ok_or(MdpError::NotRegistered)?;

        advance(&mut self.phase, Phase::ObservingState);
        let observation = Observation::capture(world);

        advance(&mut self.phase, Phase::BuildingRewards);
        let rewards = build_rewards(
            grid,
            &observation,
            &self.config.weights,
            self.maze.ghost_buffer,
        );

        if self.transitions.is_none() {
            advance(&mut self.phase, Phase::BuildingTransitions);
            self.transitions = Some(TransitionModel::build(grid));
        }
        let transitions = self
            .transitions
            .as_ref()
            .ok_or(MdpError::NotRegistered)?;

        advance(&mut self.phase, Phase::Solving);
        let solution = ValueIteration::new(self.maze.discount)
            .with_tolerance(self.config.tolerance)
            .with_sweep(self.config.sweep)
            .solve(grid, &rewards, transitions)?;

        advance(&mut self.phase, Phase::ExtractingMove);
        let wanted = greedy_direction(grid, &solution.utilities, observation.agent)?;
        let chosen = legalize(wanted, &world.legal_moves(), &mut self.rng)?;
        debug!(
            at = %observation.agent,
            %wanted,
            %chosen,
            sweeps = solution.sweeps,
            "decided move"
        );
        Ok(chosen)
    }

    /// Called by the host when a game ends. Drops the per-game model so the
    /// next game rebuilds it for its own maze.
    pub fn final_state<W: WorldView + ?Sized>(&mut self, _world: &W) {
        self.grid = None;
        self.transitions = None;
        self.games += 1;
        advance(&mut self.phase, Phase::Idle);
        info!(round = self.games, "game finished");
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    trace!(from = ?*phase, to = ?next, "phase");
    *phase = next;
}
