use std::fs;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pacman_mdp::config::{LayoutSource, RunConfig};
use pacman_mdp::game::{Game, Outcome};
use pacman_mdp::layout::Layout;
use pacman_mdp::render::Renderer;
use pacman_mdp::{AgentConfig, MdpAgent, MdpError};

#[derive(Default)]
struct Tally {
    wins: u32,
    played: u32,
    total_score: i64,
}

impl Tally {
    fn record(&mut self, game: &Game) {
        self.played += 1;
        self.total_score += game.score();
        if game.outcome() == Some(Outcome::Won) {
            self.wins += 1;
        }
    }

    fn summary(&self) -> String {
        let average = if self.played == 0 {
            0.0
        } else {
            self.total_score as f64 / self.played as f64
        };
        format!(
            "Won {}/{} games, average score {:.1}",
            self.wins, self.played, average
        )
    }
}

fn main() -> io::Result<()> {
    let config = RunConfig::from_env();
    let layout = load_layout(&config.layout)?;

    if config.headless {
        init_stderr_logging();
        let tally = run_headless(&config, &layout)?;
        println!("{}", tally.summary());
        return Ok(());
    }

    let _guard = init_file_logging(&config)?;
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config, &layout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    println!("{}", result?.summary());
    Ok(())
}

fn load_layout(source: &LayoutSource) -> io::Result<Layout> {
    let layout = match source {
        LayoutSource::Small => Layout::small(),
        LayoutSource::Medium => Layout::medium(),
        LayoutSource::File(path) => Layout::load(path),
    };
    layout.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn rngs(config: &RunConfig) -> (StdRng, StdRng) {
    match config.seed {
        Some(seed) => (
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (StdRng::from_entropy(), StdRng::from_entropy()),
    }
}

fn decision_failed(e: MdpError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

fn run_headless(config: &RunConfig, layout: &Layout) -> io::Result<Tally> {
    let (mut world_rng, agent_rng) = rngs(config);
    let mut agent = MdpAgent::with_rng(AgentConfig::default(), agent_rng);
    let mut tally = Tally::default();

    for _ in 0..config.games {
        let mut game = Game::new(layout).with_tick_limit(config.max_ticks);
        agent.register_initial_state(&game);
        while !game.is_over() {
            let dir = agent.get_action(&game).map_err(decision_failed)?;
            game.tick(Some(dir), &mut world_rng);
        }
        info!(
            game = agent.games(),
            outcome = ?game.outcome(),
            score = game.score(),
            ticks = game.ticks(),
            "game over"
        );
        tally.record(&game);
        agent.final_state(&game);
    }
    Ok(tally)
}

fn run(stdout: &mut Stdout, config: &RunConfig, layout: &Layout) -> io::Result<Tally> {
    let (mut world_rng, agent_rng) = rngs(config);
    let mut agent = MdpAgent::with_rng(AgentConfig::default(), agent_rng);
    let mut renderer = Renderer::new(layout.width(), layout.height());
    let mut tally = Tally::default();
    let tick = Duration::from_millis(config.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / config.render_fps.max(1));

    for _ in 0..config.games {
        let mut game = Game::new(layout).with_tick_limit(config.max_ticks);
        agent.register_initial_state(&game);
        renderer.invalidate();
        let mut last_tick = Instant::now();

        while !game.is_over() {
            let frame_start = Instant::now();
            if quit_requested()? {
                return Ok(tally);
            }

            if last_tick.elapsed() >= tick {
                last_tick = Instant::now();
                let dir = agent.get_action(&game).map_err(decision_failed)?;
                game.tick(Some(dir), &mut world_rng);
            }
            renderer.render(stdout, &game, agent.games())?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_time {
                thread::sleep(frame_time - elapsed);
            }
        }

        renderer.render_outcome(stdout, &game)?;
        info!(
            game = agent.games(),
            outcome = ?game.outcome(),
            score = game.score(),
            ticks = game.ticks(),
            "game over"
        );
        tally.record(&game);
        agent.final_state(&game);
        // Leave the result on screen for a moment before the next game.
        thread::sleep(tick * 10);
    }
    Ok(tally)
}

fn quit_requested() -> io::Result<bool> {
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

/// The terminal UI owns stdout, so the interactive mode logs to a file.
/// Buffered lines are flushed when the returned guard drops.
fn init_file_logging(config: &RunConfig) -> io::Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "pacman-mdp.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .init();

    info!(
        "logging to {}",
        config.log_dir.join("pacman-mdp.log").display()
    );
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_log_is_flushed_when_guard_drops() {
        let log_dir = std::env::temp_dir().join(format!("pacman-mdp-log-{}", std::process::id()));
        let config = RunConfig {
            log_dir: log_dir.clone(),
            ..RunConfig::default()
        };
        let guard = init_file_logging(&config).unwrap();
        info!(game = 1, "game over");
        drop(guard);

        let written = fs::read_to_string(log_dir.join("pacman-mdp.log")).unwrap();
        assert!(written.contains("game over"));
        fs::remove_dir_all(&log_dir).unwrap();
    }
}
