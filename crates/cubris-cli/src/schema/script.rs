use cubris_engine::{Command, GameConfig, PieceSeed};
use serde::{Deserialize, Serialize};

/// A reproducible game: configuration, piece seed and every command in order.
///
/// Any `seed` inside `config` is ignored in favor of the top-level one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub config: GameConfig,
    pub seed: PieceSeed,
    pub commands: Vec<Command>,
}

impl Script {
    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        self.config.clone().with_seed(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_script() {
        let script: Script = serde_json::from_str(
            r#"{
                "seed": "000102030405060708090a0b0c0d0e0f",
                "commands": ["move_left", "rotate_cw", "tick", "hard_drop"]
            }"#,
        )
        .unwrap();
        assert_eq!(script.config, GameConfig::default());
        assert_eq!(
            script.commands,
            [
                Command::MoveLeft,
                Command::RotateCw,
                Command::Tick,
                Command::HardDrop
            ]
        );
        assert_eq!(script.game_config().seed, Some(script.seed));
    }

    #[test]
    fn test_rejects_unknown_command() {
        let result = serde_json::from_str::<Script>(
            r#"{ "seed": "000102030405060708090a0b0c0d0e0f", "commands": ["hold"] }"#,
        );
        assert!(result.is_err());
    }
}
