//! A small turn-based Pac-Man engine that hosts the agent.
//!
//! One tick: the agent moves and eats, ghosts move, power timers run down,
//! collisions resolve. The game is won when the last food is eaten and lost
//! when a dangerous ghost catches the agent.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::geometry::{Coord, Direction};
use crate::layout::{Layout, Tile};
use crate::world::{Ghost, GhostMode, WorldView};

const FOOD_SCORE: i64 = 10;
const CAPSULE_SCORE: i64 = 50;
const GHOST_SCORE: i64 = 200;
const WIN_SCORE: i64 = 500;
const LOSE_SCORE: i64 = -500;
const TIME_PENALTY: i64 = 1;
const SCARED_TICKS: u32 = 40;
const GHOST_MOVE_INTERVAL: u32 = 2;
/// Chance that a dangerous ghost follows the shortest path to the agent
/// instead of wandering.
const CHASE_CHANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    TimedOut,
}

#[derive(Clone, Debug)]
struct GhostAgent {
    pos: Coord,
    spawn: Coord,
    scared: u32,
}

#[derive(Clone, Debug)]
pub struct Game {
    width: i32,
    height: i32,
    tiles: Vec<Vec<Tile>>,
    player: Coord,
    ghosts: Vec<GhostAgent>,
    score: i64,
    food_left: usize,
    ticks: u32,
    tick_limit: Option<u32>,
    outcome: Option<Outcome>,
}

impl Game {
    pub fn new(layout: &Layout) -> Self {
        let tiles = layout.tiles().to_vec();
        let food_left = tiles
            .iter()
            .flatten()
            .filter(|t| **t == Tile::Food)
            .count();
        let ghosts = layout
            .ghost_starts
            .iter()
            .map(|&pos| GhostAgent {
                pos,
                spawn: pos,
                scared: 0,
            })
            .collect();
        Game {
            width: layout.width(),
            height: layout.height(),
            tiles,
            player: layout.agent_start,
            ghosts,
            score: 0,
            food_left,
            ticks: 0,
            tick_limit: None,
            outcome: None,
        }
    }

    /// Ends the game as [`Outcome::TimedOut`] once `limit` ticks have passed.
    pub fn with_tick_limit(mut self, limit: u32) -> Self {
        self.tick_limit = Some(limit);
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn food_left(&self) -> usize {
        self.food_left
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn player(&self) -> Coord {
        self.player
    }

    pub fn tile(&self, c: Coord) -> Tile {
        if c.x < 0 || c.y < 0 || c.x >= self.width || c.y >= self.height {
            return Tile::Wall;
        }
        self.tiles[c.y as usize][c.x as usize]
    }

    /// Ghost at `c`, if any, and whether it is currently frightened.
    pub fn ghost_at(&self, c: Coord) -> Option<bool> {
        self.ghosts
            .iter()
            .find(|g| g.pos == c)
            .map(|g| g.scared > 0)
    }

    pub fn tick(&mut self, dir: Option<Direction>, rng: &mut impl Rng) {
        if self.is_over() {
            return;
        }
        self.ticks = self.ticks.wrapping_add(1);
        self.score -= TIME_PENALTY;

        self.move_player(dir);
        self.consume_tile();
        if self.food_left == 0 {
            self.score += WIN_SCORE;
            self.outcome = Some(Outcome::Won);
            return;
        }
        self.handle_collisions();
        if self.is_over() {
            return;
        }

        self.update_ghosts(rng);
        self.tick_scared_timers();
        self.handle_collisions();
        if !self.is_over() && self.tick_limit.is_some_and(|limit| self.ticks >= limit) {
            self.outcome = Some(Outcome::TimedOut);
        }
    }

    fn move_player(&mut self, dir: Option<Direction>) {
        if let Some(dir) = dir {
            if can_move(self, self.player, dir) {
                self.player = self.player.step(dir);
            }
        }
    }

    fn consume_tile(&mut self) {
        let Coord { x, y } = self.player;
        let tile = &mut self.tiles[y as usize][x as usize];
        match *tile {
            Tile::Food => {
                *tile = Tile::Empty;
                self.score += FOOD_SCORE;
                self.food_left = self.food_left.saturating_sub(1);
            }
            Tile::Capsule => {
                *tile = Tile::Empty;
                self.score += CAPSULE_SCORE;
                for ghost in &mut self.ghosts {
                    ghost.scared = SCARED_TICKS;
                }
            }
            _ => {}
        }
    }

    fn update_ghosts(&mut self, rng: &mut impl Rng) {
        if self.ticks % GHOST_MOVE_INTERVAL != 0 {
            return;
        }
        let dist = bfs_distance(self, self.player);
        let mut moved = Vec::with_capacity(self.ghosts.len());
        for ghost in &self.ghosts {
            let flee = ghost.scared > 0;
            let chase = !flee && rng.gen_bool(CHASE_CHANCE);
            let dir = ghost_next_dir(self, ghost.pos, &dist, flee, chase, rng);
            moved.push(dir.map_or(ghost.pos, |d| ghost.pos.step(d)));
        }
        for (ghost, pos) in self.ghosts.iter_mut().zip(moved) {
            ghost.pos = pos;
        }
    }

    fn tick_scared_timers(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.scared = ghost.scared.saturating_sub(1);
        }
    }

    fn handle_collisions(&mut self) {
        for ghost in &mut self.ghosts {
            if ghost.pos != self.player {
                continue;
            }
            if ghost.scared > 0 {
                self.score += GHOST_SCORE;
                ghost.pos = ghost.spawn;
                ghost.scared = 0;
            } else {
                self.score += LOSE_SCORE;
                self.outcome = Some(Outcome::Lost);
                return;
            }
        }
    }
}

impl WorldView for Game {
    fn walls(&self) -> Vec<Coord> {
        let mut walls = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let c = Coord::new(x, y);
                if self.tile(c) == Tile::Wall {
                    walls.push(c);
                }
            }
        }
        walls
    }

    fn corners(&self) -> Vec<Coord> {
        let (w, h) = (self.width - 1, self.height - 1);
        vec![
            Coord::new(0, 0),
            Coord::new(w, 0),
            Coord::new(0, h),
            Coord::new(w, h),
        ]
    }

    fn agent_position(&self) -> Coord {
        self.player
    }

    fn food(&self) -> Vec<Coord> {
        self.cells_with(Tile::Food)
    }

    fn capsules(&self) -> Vec<Coord> {
        self.cells_with(Tile::Capsule)
    }

    fn ghosts(&self) -> Vec<Ghost> {
        self.ghosts
            .iter()
            .map(|g| Ghost {
                position: g.pos,
                mode: if g.scared > 0 {
                    GhostMode::Fleeing
                } else {
                    GhostMode::Dangerous
                },
            })
            .collect()
    }

    fn legal_moves(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| can_move(self, self.player, *d))
            .collect()
    }
}

impl Game {
    fn cells_with(&self, tile: Tile) -> Vec<Coord> {
        let mut cells = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, t) in row.iter().enumerate() {
                if *t == tile {
                    cells.push(Coord::new(x as i32, y as i32));
                }
            }
        }
        cells
    }
}

fn can_move(game: &Game, pos: Coord, dir: Direction) -> bool {
    game.tile(pos.step(dir)) != Tile::Wall
}

/// Hop distance from `start` to every reachable cell, `-1` where unreachable.
fn bfs_distance(game: &Game, start: Coord) -> Vec<Vec<i32>> {
    let mut dist = vec![vec![-1; game.width as usize]; game.height as usize];
    let mut q = VecDeque::new();
    dist[start.y as usize][start.x as usize] = 0;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        let base = dist[pos.y as usize][pos.x as usize];
        for dir in Direction::ALL {
            if !can_move(game, pos, dir) {
                continue;
            }
            let next = pos.step(dir);
            let slot = &mut dist[next.y as usize][next.x as usize];
            if *slot == -1 {
                *slot = base + 1;
                q.push_back(next);
            }
        }
    }
    dist
}

/// Chasing ghosts close the distance to the agent, fleeing ghosts open it,
/// wandering ghosts pick any open direction. Ties are broken at random.
fn ghost_next_dir(
    game: &Game,
    pos: Coord,
    dist: &[Vec<i32>],
    flee: bool,
    chase: bool,
    rng: &mut impl Rng,
) -> Option<Direction> {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| can_move(game, pos, *d))
        .collect();
    if !flee && !chase {
        return open.choose(rng).copied();
    }

    let mut options = Vec::new();
    let mut best = if flee { i32::MIN } else { i32::MAX };
    for dir in open {
        let next = pos.step(dir);
        let d = dist[next.y as usize][next.x as usize];
        if d < 0 {
            continue;
        }
        let better = if flee { d > best } else { d < best };
        if better {
            best = d;
            options.clear();
            options.push(dir);
        } else if d == best {
            options.push(dir);
        }
    }
    options.choose(rng).copied()
}
