//! Summary of a headless run, accumulated from simulation events.

use std::fmt;

use waypoint_defence_core::{Event, LevelIndex};

/// How a headless run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The tick budget ran out while a level was still in progress.
    OutOfTicks,
    /// The player lost every life.
    Defeated,
    /// A level was cleared and the runner was not asked to advance.
    LevelComplete,
    /// The final configured level was cleared.
    Victory,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OutOfTicks => "out of ticks",
            Self::Defeated => "defeated",
            Self::LevelComplete => "level complete",
            Self::Victory => "victory",
        };
        f.write_str(label)
    }
}

/// Counters describing a headless run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RunReport {
    pub(crate) ticks: u64,
    pub(crate) levels_started: Vec<LevelIndex>,
    pub(crate) spawned: usize,
    pub(crate) killed: usize,
    pub(crate) escaped: usize,
    pub(crate) shots: usize,
    pub(crate) towers_built: usize,
    pub(crate) rejected_actions: usize,
    pub(crate) money: u32,
    pub(crate) lives: u32,
    pub(crate) outcome: Outcome,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            ticks: 0,
            levels_started: Vec::new(),
            spawned: 0,
            killed: 0,
            escaped: 0,
            shots: 0,
            towers_built: 0,
            rejected_actions: 0,
            money: 0,
            lives: 0,
            outcome: Outcome::OutOfTicks,
        }
    }
}

impl RunReport {
    /// Folds a batch of events into the counters.
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelStarted { level } => self.levels_started.push(*level),
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { .. } => self.killed += 1,
                Event::EnemyEscaped { .. } => self.escaped += 1,
                Event::ProjectileFired { .. } => self.shots += 1,
                Event::TowerPlaced { .. } => self.towers_built += 1,
                Event::TowerPlacementRejected { .. } | Event::TowerUpgradeRejected { .. } => {
                    self.rejected_actions += 1;
                }
                _ => {}
            }
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<String> = self
            .levels_started
            .iter()
            .map(|level| (level.get() + 1).to_string())
            .collect();
        writeln!(f, "outcome:   {}", self.outcome)?;
        writeln!(f, "ticks:     {}", self.ticks)?;
        writeln!(f, "levels:    {}", levels.join(", "))?;
        writeln!(f, "towers:    {} built, {} rejected", self.towers_built, self.rejected_actions)?;
        writeln!(
            f,
            "enemies:   {} spawned, {} killed, {} escaped",
            self.spawned, self.killed, self.escaped
        )?;
        writeln!(f, "shots:     {}", self.shots)?;
        write!(f, "player:    {} money, {} lives", self.money, self.lives)
    }
}
