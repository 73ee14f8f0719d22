use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use cubris_engine::{Command, Game, GameConfig, PieceSeed};
use rand::Rng;
use rand_pcg::Pcg32;
use tracing::{debug, info};

use crate::{
    pacing::{Pacer, Speed},
    schema::{
        script::Script,
        summary::{PacingSummary, SessionSummary},
    },
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Game configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Piece seed as 32 hex digits; overrides the configuration file
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Starting gravity speed
    #[arg(long, value_enum, default_value_t = Speed::default())]
    speed: Speed,
    /// Stop after this many gravity steps even if the game is still running
    #[arg(long, default_value_t = 10_000)]
    max_ticks: usize,
    /// Upper bound of random inputs between two gravity steps
    #[arg(long, default_value_t = 3)]
    moves_per_tick: usize,
    /// Summary output file (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the played commands as a replayable script
    #[arg(long)]
    save_script: Option<PathBuf>,
}

/// Random inputs a player would send between gravity steps.
#[derive(Debug)]
struct RandomPlayer {
    rng: Pcg32,
    moves_per_tick: usize,
}

impl RandomPlayer {
    const MOVES: [Command; 4] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::RotateCw,
        Command::RotateCcw,
    ];
    const HARD_DROP_PROBABILITY: f64 = 0.05;
    /// PCG stream selector for the player, apart from the piece generator's.
    const PLAYER_STREAM: u64 = 0x5851_f42d_4c95_7f2d;

    fn new(seed: PieceSeed, moves_per_tick: usize) -> Self {
        Self {
            rng: Self::rng_for(seed),
            moves_per_tick,
        }
    }

    fn rng_for(seed: PieceSeed) -> Pcg32 {
        let mut state = [0; 8];
        state.copy_from_slice(&seed.to_bytes()[..8]);
        Pcg32::new(u64::from_le_bytes(state), Self::PLAYER_STREAM)
    }

    fn next_inputs(&mut self) -> Vec<Command> {
        let count = self.rng.random_range(0..=self.moves_per_tick);
        let mut inputs: Vec<_> = (0..count)
            .map(|_| Self::MOVES[self.rng.random_range(0..Self::MOVES.len())])
            .collect();
        if self.rng.random_bool(Self::HARD_DROP_PROBABILITY) {
            inputs.push(Command::HardDrop);
        }
        inputs
    }
}

#[derive(Debug)]
struct Simulation {
    game: Game,
    player: RandomPlayer,
    pacer: Pacer,
    commands: Vec<Command>,
    ticks: usize,
    elapsed: Duration,
}

impl Simulation {
    fn new(game: Game, player: RandomPlayer, pacer: Pacer) -> Self {
        Self {
            game,
            player,
            pacer,
            commands: Vec::new(),
            ticks: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn apply(&mut self, command: Command) {
        self.game.apply(command);
        self.commands.push(command);
    }

    /// Runs one frame: the player's inputs, then one gravity step once the
    /// current interval has elapsed on the simulated clock.
    fn step(&mut self) {
        for input in self.player.next_inputs() {
            if self.game.is_game_over() {
                return;
            }
            self.apply(input);
        }
        if self.game.is_game_over() {
            return;
        }
        self.elapsed += self.pacer.interval();
        self.apply(Command::Tick);
        self.ticks += 1;

        if self.pacer.update(self.game.lines_cleared()) {
            debug!(
                interval_ms = self.pacer.interval_ms(),
                lines_cleared = self.game.lines_cleared(),
                "gravity sped up"
            );
        }
    }

    fn run(&mut self, max_ticks: usize) {
        while self.ticks < max_ticks && !self.game.is_game_over() {
            self.step();
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        config,
        seed,
        speed,
        max_ticks,
        moves_per_tick,
        output,
        save_script,
    } = arg;

    let config: GameConfig = match config {
        Some(path) => util::read_json_file("game config", path)?,
        None => GameConfig::default(),
    };
    let seed = seed
        .or(config.seed)
        .unwrap_or_else(|| rand::rng().random());
    let game = Game::new(config.clone().with_seed(seed)).context("Invalid game configuration")?;

    info!(%seed, ?speed, max_ticks, "starting simulation");
    let started_at = Utc::now();
    let mut sim = Simulation::new(
        game,
        RandomPlayer::new(seed, *moves_per_tick),
        Pacer::new(*speed),
    );
    sim.run(*max_ticks);
    info!(
        ticks = sim.ticks,
        score = sim.game.score(),
        lines_cleared = sim.game.lines_cleared(),
        game_over = sim.game.is_game_over(),
        "simulation finished"
    );

    if let Some(path) = save_script {
        let script = Script {
            config: GameConfig { seed: None, ..config },
            seed,
            commands: sim.commands.clone(),
        };
        Output::save_json(&script, Some(path.as_path()))?;
        eprintln!("Saved {} commands to {}", script.commands.len(), path.display());
    }

    let summary = SessionSummary {
        pacing: Some(PacingSummary {
            speed: *speed,
            final_interval_ms: sim.pacer.interval_ms(),
            simulated_ms: u64::try_from(sim.elapsed.as_millis()).unwrap_or(u64::MAX),
        }),
        ..SessionSummary::new(started_at, seed, sim.ticks, &sim.game)
    };
    Output::save_json(&summary, output.as_deref())?;

    Ok(())
}
