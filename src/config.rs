//! Tunables for the solver and for the terminal runner.

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::solver::SweepMode;

pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Per-maze constants, chosen once per game from the measured maze size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeConfig {
    pub discount: f64,
    /// How many hops the influence field of a ghost reaches.
    pub ghost_buffer: u32,
}

impl MazeConfig {
    pub const SMALL: MazeConfig = MazeConfig {
        discount: 0.7,
        ghost_buffer: 2,
    };
    pub const MEDIUM: MazeConfig = MazeConfig {
        discount: 0.9,
        ghost_buffer: 3,
    };
    pub const DEFAULT: MazeConfig = MazeConfig {
        discount: 0.7,
        ghost_buffer: 2,
    };

    pub fn for_dimensions(max_w: i32, max_h: i32) -> MazeConfig {
        match (max_w, max_h) {
            (6, 6) => MazeConfig::SMALL,
            (19, 10) => MazeConfig::MEDIUM,
            _ => {
                info!(
                    max_w,
                    max_h, "no preset for maze size, using default discount and ghost buffer"
                );
                MazeConfig::DEFAULT
            }
        }
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        MazeConfig::DEFAULT
    }
}

/// Reward constants used to shape the model each step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardWeights {
    pub step: f64,
    pub food: f64,
    pub capsule: f64,
    pub corner: f64,
    pub ghost: f64,
    pub edible_ghost: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            step: -1.0,
            food: 10.0,
            capsule: 50.0,
            corner: 100.0,
            ghost: -500.0,
            edible_ghost: 200.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentConfig {
    pub weights: RewardWeights,
    pub tolerance: f64,
    pub sweep: SweepMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            weights: RewardWeights::default(),
            tolerance: DEFAULT_TOLERANCE,
            sweep: SweepMode::InPlace,
        }
    }
}

const DEFAULT_TICK_MS: u64 = 120;
const DEFAULT_RENDER_FPS: u64 = 60;
const DEFAULT_GAMES: u32 = 1;
const DEFAULT_MAX_TICKS: u32 = 3000;

/// Which maze the runner loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutSource {
    Small,
    Medium,
    File(PathBuf),
}

/// Settings for the `pacman-mdp` binary.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub layout: LayoutSource,
    pub tick_ms: u64,
    pub render_fps: u64,
    pub games: u32,
    /// Ticks after which an unfinished game is abandoned.
    pub max_ticks: u32,
    pub headless: bool,
    pub seed: Option<u64>,
    pub log_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            layout: LayoutSource::Medium,
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            games: DEFAULT_GAMES,
            max_ticks: DEFAULT_MAX_TICKS,
            headless: false,
            seed: None,
            log_dir: env::temp_dir().join("pacman-mdp"),
        }
    }
}

impl RunConfig {
    /// Reads the process environment.
    ///
    /// - `PACMAN_LAYOUT` - `small`, `medium` or a path to a layout file (default: medium)
    /// - `PACMAN_TICK_MS` - milliseconds per game tick (default: 120)
    /// - `PACMAN_FPS` - render rate (default: 60)
    /// - `PACMAN_GAMES` - games to play in a row (default: 1)
    /// - `PACMAN_MAX_TICKS` - ticks before a game is abandoned (default: 3000)
    /// - `PACMAN_HEADLESS` - skip the terminal UI
    /// - `PACMAN_SEED` - seed for ghost movement
    /// - `PACMAN_LOG_DIR` - where the interactive mode writes its log
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(layout) = lookup("PACMAN_LAYOUT") {
            config.layout = match layout.trim().to_ascii_lowercase().as_str() {
                "small" | "smallgrid" => LayoutSource::Small,
                "medium" | "mediumclassic" => LayoutSource::Medium,
                _ => LayoutSource::File(PathBuf::from(layout)),
            };
        }
        if let Some(v) = parse_positive::<u64>(lookup("PACMAN_TICK_MS")) {
            config.tick_ms = v;
        }
        if let Some(v) = parse_positive::<u64>(lookup("PACMAN_FPS")) {
            config.render_fps = v;
        }
        if let Some(v) = parse_positive::<u32>(lookup("PACMAN_GAMES")) {
            config.games = v;
        }
        if let Some(v) = parse_positive::<u32>(lookup("PACMAN_MAX_TICKS")) {
            config.max_ticks = v;
        }
        if let Some(v) = lookup("PACMAN_HEADLESS") {
            // Setting the variable without a value counts as "on".
            config.headless = v.is_empty() || v.parse::<bool>().unwrap_or(v != "0");
        }
        config.seed = lookup("PACMAN_SEED").and_then(|v| v.parse().ok());
        if let Some(dir) = lookup("PACMAN_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        config
    }
}

fn parse_positive<T>(raw: Option<String>) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw?.parse::<T>().ok().filter(|v| *v > T::default())
}
