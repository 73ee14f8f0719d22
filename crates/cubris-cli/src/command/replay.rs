use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use cubris_engine::{Command, Game};
use tracing::{info, warn};

use crate::{
    schema::{script::Script, summary::SessionSummary},
    util::{self, Output},
    view,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the script file (JSON format)
    script_file: PathBuf,
    /// Print the final grid, hidden rows included, to stderr
    #[arg(long)]
    show_board: bool,
    /// Summary output file (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Applies every command of `script` to a fresh game and returns it with
/// the number of gravity steps.
fn replay(script: &Script) -> anyhow::Result<(Game, usize)> {
    let mut game = Game::new(script.game_config()).context("Invalid game configuration")?;
    let mut ticks = 0;
    for (index, command) in script.commands.iter().enumerate() {
        if game.is_game_over() && *command != Command::Reset {
            warn!(index, ?command, "command after game over");
        }
        game.apply(*command);
        if *command == Command::Tick {
            ticks += 1;
        }
    }
    Ok((game, ticks))
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        script_file,
        show_board,
        output,
    } = arg;

    eprintln!("Loading script from {}", script_file.display());
    let script: Script = util::read_json_file("script", script_file)?;
    eprintln!("Loaded {} commands", script.commands.len());

    let started_at = Utc::now();
    let (game, ticks) = replay(&script)?;
    info!(
        ticks,
        score = game.score(),
        game_over = game.is_game_over(),
        "replay finished"
    );

    if *show_board {
        eprint!("{}", view::render(&game, true));
    }

    let summary = SessionSummary::new(started_at, script.seed, ticks, &game);
    Output::save_json(&summary, output.as_deref())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use cubris_engine::{GameConfig, PieceSeed};

    use super::*;

    fn script(commands: Vec<Command>) -> Script {
        Script {
            config: GameConfig::default(),
            seed: PieceSeed::from_bytes([9; 16]),
            commands,
        }
    }

    #[test]
    fn test_replay_counts_ticks_and_locks() {
        let (game, ticks) = replay(&script(vec![
            Command::MoveLeft,
            Command::Tick,
            Command::Tick,
            Command::HardDrop,
            Command::HardDrop,
        ]))
        .unwrap();
        assert_eq!(ticks, 2);
        assert_eq!(game.stats().completed_pieces(), 2);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let commands = vec![
            Command::RotateCw,
            Command::MoveRight,
            Command::HardDrop,
            Command::RotateCcw,
            Command::MoveLeft,
            Command::HardDrop,
        ];
        let (a, _) = replay(&script(commands.clone())).unwrap();
        let (b, _) = replay(&script(commands)).unwrap();
        assert_eq!(a.board(), b.board());
        assert_eq!(a.next_piece(), b.next_piece());
    }

    #[test]
    fn test_replay_rejects_invalid_config() {
        let mut bad = script(vec![]);
        bad.config.width = 1;
        assert!(replay(&bad).is_err());
    }
}
