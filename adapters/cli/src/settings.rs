//! Loading of the game configuration consumed by the runner.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use waypoint_defence_core::GameConfig;

/// Reads the configuration at `path`, or the built-in defaults when absent.
///
/// Missing fields fall back to their defaults, so an empty file is valid.
pub(crate) fn load(path: Option<&Path>, seed: Option<u64>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(seed) = seed {
        config.tuning.simulation.seed = seed;
    }

    config
        .validate()
        .context("configuration rejected by validation")?;
    Ok(config)
}

fn parse(contents: &str) -> Result<GameConfig> {
    toml::from_str(contents).context("configuration is not valid TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{EnemyKind, Wave};

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse("").expect("empty TOML"), GameConfig::default());
    }

    #[test]
    fn levels_and_tuning_can_be_overridden() {
        let config = parse(
            r#"
            [tuning.economy]
            initial_money = 500

            [[levels]]
            path = [[0.0, 0.0], [100.0, 0.0]]
            waves = [{ kind = "fast", count = 3 }]
            "#,
        )
        .expect("valid TOML");

        assert_eq!(config.tuning.economy.initial_money, 500);
        assert_eq!(config.tuning.economy.initial_lives, 10);
        assert_eq!(config.levels.len(), 1);
        assert_eq!(
            config.levels.iter().next().map(|level| level.waves.clone()),
            Some(vec![Wave::new(EnemyKind::Fast, 3)])
        );
    }

    #[test]
    fn seed_override_applies_without_file() {
        let config = load(None, Some(11)).expect("defaults are valid");
        assert_eq!(config.tuning.simulation.seed, 11);
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load(Some(Path::new("/nonexistent/waypoint.toml")), None)
            .expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/waypoint.toml"));
    }

    #[test]
    fn invalid_levels_are_rejected() {
        let error = parse("levels = []")
            .and_then(|config| config.validate().map_err(Into::into))
            .expect_err("no levels");
        assert!(error.to_string().contains("no levels"));
    }
}
