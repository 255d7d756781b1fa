//! Tuning tables and level data consumed when a level starts.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{EnemyKind, LevelIndex, Path, ProjectileKind, TowerKind, MAX_TOWER_LEVEL};

/// Lower bound applied to jittered delays between spawns of one wave.
pub const MIN_INTRA_WAVE_DELAY: Duration = Duration::from_millis(50);

/// Lower bound applied to jittered delays between two waves.
pub const MIN_INTER_WAVE_DELAY: Duration = Duration::from_millis(100);

/// Complete static configuration of a game session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Numeric parameters of enemies, towers, projectiles and timing.
    pub tuning: Tuning,
    /// Levels played in order.
    pub levels: LevelSet,
}

impl GameConfig {
    /// Checks the configuration for data the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()?;
        self.levels.validate()
    }
}

/// Aggregated tuning knobs for every adjustable aspect of the simulation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Starting resources of the player.
    pub economy: EconomyTuning,
    /// Per-kind enemy parameters.
    pub enemies: EnemyTable,
    /// Per-kind tower parameters.
    pub towers: TowerTable,
    /// Per-kind projectile parameters.
    pub projectiles: ProjectileTable,
    /// Spawn cadence of waves.
    pub waves: WaveTiming,
    /// Clock and randomness settings.
    pub simulation: SimulationTuning,
}

impl Tuning {
    fn validate(&self) -> Result<(), ConfigError> {
        for kind in [EnemyKind::Basic, EnemyKind::Fast] {
            let stats = self.enemies.stats(kind);
            if !(stats.speed.is_finite() && stats.speed > 0.0) {
                return Err(ConfigError::InvalidEnemySpeed { kind });
            }
            if !(stats.speed_jitter.is_finite() && stats.speed_jitter >= 0.0) {
                return Err(ConfigError::InvalidEnemySpeed { kind });
            }
        }

        for kind in [ProjectileKind::Basic, ProjectileKind::Heavy] {
            let stats = self.projectiles.stats(kind);
            if !(stats.speed.is_finite() && stats.speed > 0.0) {
                return Err(ConfigError::InvalidProjectileSpeed { kind });
            }
        }

        for kind in [TowerKind::Basic, TowerKind::Sniper] {
            let stats = self.towers.stats(kind);
            if !(stats.range.is_finite() && stats.range >= 0.0) {
                return Err(ConfigError::InvalidTowerRange { kind });
            }
        }

        if self.simulation.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        Ok(())
    }
}

/// Resources granted to the player whenever a level attempt starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Money available for towers at level start.
    pub initial_money: u32,
    /// Lives available at level start.
    pub initial_lives: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            initial_money: 200,
            initial_lives: 10,
        }
    }
}

/// Parameters shared by every enemy of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Hit points at spawn time.
    pub hit_points: i32,
    /// Base distance travelled per tick.
    pub speed: f32,
    /// Upper bound of the random bonus added to `speed` at spawn time.
    #[serde(default)]
    pub speed_jitter: f32,
    /// Money granted when the enemy is destroyed.
    pub reward: u32,
}

/// Enemy parameters keyed by [`EnemyKind`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    /// Parameters of [`EnemyKind::Basic`].
    pub basic: EnemyStats,
    /// Parameters of [`EnemyKind::Fast`].
    pub fast: EnemyStats,
}

impl EnemyTable {
    /// Parameters of the requested kind.
    #[must_use]
    pub const fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Fast => &self.fast,
        }
    }
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            basic: EnemyStats {
                hit_points: 5,
                speed: 1.0,
                speed_jitter: 0.3,
                reward: 10,
            },
            fast: EnemyStats {
                hit_points: 3,
                speed: 2.0,
                speed_jitter: 0.0,
                reward: 15,
            },
        }
    }
}

/// Parameters shared by every tower of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Money required to place the tower.
    pub cost: u32,
    /// Targeting range at level 1.
    pub range: f32,
    /// Minimum time between two shots, in milliseconds.
    pub fire_interval_ms: u64,
    /// Price of each level transition, indexed by `level - 1`.
    pub upgrade_costs: [u32; 2],
    /// Projectile fired by the tower.
    pub projectile: ProjectileKind,
}

impl TowerStats {
    /// Minimum time between two shots.
    #[must_use]
    pub const fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }

    /// Price of upgrading a tower currently at `level`, or `None` once the
    /// tower reached [`MAX_TOWER_LEVEL`].
    #[must_use]
    pub fn upgrade_cost(&self, level: u8) -> Option<u32> {
        if level == 0 || level >= MAX_TOWER_LEVEL {
            return None;
        }
        self.upgrade_costs.get(usize::from(level - 1)).copied()
    }
}

/// Tower parameters keyed by [`TowerKind`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTable {
    /// Parameters of [`TowerKind::Basic`].
    pub basic: TowerStats,
    /// Parameters of [`TowerKind::Sniper`].
    pub sniper: TowerStats,
}

impl TowerTable {
    /// Parameters of the requested kind.
    #[must_use]
    pub const fn stats(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Basic => &self.basic,
            TowerKind::Sniper => &self.sniper,
        }
    }
}

impl Default for TowerTable {
    fn default() -> Self {
        Self {
            basic: TowerStats {
                cost: 50,
                range: 100.0,
                fire_interval_ms: 1_000,
                upgrade_costs: [30, 50],
                projectile: ProjectileKind::Basic,
            },
            sniper: TowerStats {
                cost: 100,
                range: 200.0,
                fire_interval_ms: 1_500,
                upgrade_costs: [60, 100],
                projectile: ProjectileKind::Basic,
            },
        }
    }
}

/// Parameters shared by every projectile of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileStats {
    /// Damage applied on impact.
    pub damage: u32,
    /// Distance travelled per tick.
    pub speed: f32,
}

/// Projectile parameters keyed by [`ProjectileKind`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTable {
    /// Parameters of [`ProjectileKind::Basic`].
    pub basic: ProjectileStats,
    /// Parameters of [`ProjectileKind::Heavy`].
    pub heavy: ProjectileStats,
}

impl ProjectileTable {
    /// Parameters of the requested kind.
    #[must_use]
    pub const fn stats(&self, kind: ProjectileKind) -> &ProjectileStats {
        match kind {
            ProjectileKind::Basic => &self.basic,
            ProjectileKind::Heavy => &self.heavy,
        }
    }
}

impl Default for ProjectileTable {
    fn default() -> Self {
        Self {
            basic: ProjectileStats {
                damage: 1,
                speed: 5.0,
            },
            heavy: ProjectileStats {
                damage: 3,
                speed: 3.0,
            },
        }
    }
}

/// Base delays and symmetric jitter bounds of the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTiming {
    /// Base delay between spawns within a wave, in milliseconds.
    pub intra_base_ms: u64,
    /// Maximum deviation from `intra_base_ms`, in milliseconds.
    pub intra_jitter_ms: u64,
    /// Base delay between the last spawn of a wave and the next wave.
    pub inter_base_ms: u64,
    /// Maximum deviation from `inter_base_ms`, in milliseconds.
    pub inter_jitter_ms: u64,
}

impl WaveTiming {
    /// Returns a copy of the timing with all jitter removed.
    #[must_use]
    pub const fn without_jitter(self) -> Self {
        Self {
            intra_jitter_ms: 0,
            inter_jitter_ms: 0,
            ..self
        }
    }
}

impl Default for WaveTiming {
    fn default() -> Self {
        Self {
            intra_base_ms: 1_000,
            intra_jitter_ms: 200,
            inter_base_ms: 10_000,
            inter_jitter_ms: 800,
        }
    }
}

/// Clock and randomness parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationTuning {
    /// Number of ticks simulated per second.
    pub tick_rate: u32,
    /// Seed for every random stream of a session.
    pub seed: u64,
    /// Side length of the square a tower occupies, used for point lookups.
    pub tower_footprint: f32,
}

impl SimulationTuning {
    /// Simulated time covered by a single tick.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }
}

impl Default for SimulationTuning {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            seed: 0x5eed_7d0e_2f1a_9c44,
            tower_footprint: 64.0,
        }
    }
}

/// Batch of identical enemies spawned one after another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// Kind of every enemy in the wave.
    pub kind: EnemyKind,
    /// Number of enemies in the wave.
    pub count: u32,
}

impl Wave {
    /// Creates a new wave description.
    #[must_use]
    pub const fn new(kind: EnemyKind, count: u32) -> Self {
        Self { kind, count }
    }
}

/// Path and wave list of a single level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Waypoints enemies follow.
    pub path: Path,
    /// Waves spawned in order.
    pub waves: Vec<Wave>,
}

/// Ordered list of levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelSet {
    levels: Vec<LevelDefinition>,
}

impl LevelSet {
    /// Creates a level set from the provided definitions.
    #[must_use]
    pub fn new(levels: Vec<LevelDefinition>) -> Self {
        Self { levels }
    }

    /// Level at the provided index, if configured.
    #[must_use]
    pub fn get(&self, level: LevelIndex) -> Option<&LevelDefinition> {
        self.levels.get(level.get())
    }

    /// Number of configured levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether no level is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Reports whether another level follows the provided one.
    #[must_use]
    pub fn has_next(&self, level: LevelIndex) -> bool {
        level.get().saturating_add(1) < self.levels.len()
    }

    /// Iterator over the configured levels.
    pub fn iter(&self) -> impl Iterator<Item = &LevelDefinition> {
        self.levels.iter()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        for (level, definition) in self.levels.iter().enumerate() {
            if definition.path.is_empty() {
                return Err(ConfigError::EmptyPath { level });
            }
            if definition
                .path
                .waypoints()
                .iter()
                .any(|waypoint| !waypoint.is_finite())
            {
                return Err(ConfigError::NonFiniteWaypoint { level });
            }
            if definition.waves.is_empty() {
                return Err(ConfigError::NoWaves { level });
            }
            if let Some(wave) = definition.waves.iter().position(|wave| wave.count == 0) {
                return Err(ConfigError::EmptyWave { level, wave });
            }
        }

        Ok(())
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        let first_path = [
            (-50.0, 1014.0),
            (200.0, 800.0),
            (600.0, 800.0),
            (600.0, 600.0),
            (1000.0, 600.0),
            (1000.0, 200.0),
            (1400.0, 200.0),
            (1586.0, 200.0),
        ];
        let second_path = [
            (-50.0, 500.0),
            (300.0, 500.0),
            (300.0, 300.0),
            (900.0, 300.0),
            (900.0, 700.0),
            (1586.0, 700.0),
        ];

        Self::new(vec![
            LevelDefinition {
                path: path_from(&first_path),
                waves: vec![
                    Wave::new(EnemyKind::Basic, 2),
                    Wave::new(EnemyKind::Basic, 3),
                    Wave::new(EnemyKind::Basic, 5),
                ],
            },
            LevelDefinition {
                path: path_from(&second_path),
                waves: vec![Wave::new(EnemyKind::Basic, 4), Wave::new(EnemyKind::Fast, 4)],
            },
        ])
    }
}

fn path_from(points: &[(f32, f32)]) -> Path {
    Path::new(points.iter().map(|&(x, y)| Vec2::new(x, y)).collect())
}

/// Problems detected while validating a [`GameConfig`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration does not declare any level.
    #[error("no levels configured")]
    NoLevels,
    /// A level declares a path without waypoints.
    #[error("level {level} has an empty path")]
    EmptyPath {
        /// Offending level index.
        level: usize,
    },
    /// A level declares a waypoint with NaN or infinite coordinates.
    #[error("level {level} has a non-finite waypoint")]
    NonFiniteWaypoint {
        /// Offending level index.
        level: usize,
    },
    /// A level declares no waves.
    #[error("level {level} has no waves")]
    NoWaves {
        /// Offending level index.
        level: usize,
    },
    /// A wave spawns zero enemies.
    #[error("wave {wave} of level {level} spawns no enemies")]
    EmptyWave {
        /// Offending level index.
        level: usize,
        /// Offending wave index within the level.
        wave: usize,
    },
    /// An enemy kind moves at a non-positive or non-finite speed.
    #[error("enemy kind {kind:?} has an invalid speed")]
    InvalidEnemySpeed {
        /// Offending enemy kind.
        kind: EnemyKind,
    },
    /// A projectile kind moves at a non-positive or non-finite speed.
    #[error("projectile kind {kind:?} has an invalid speed")]
    InvalidProjectileSpeed {
        /// Offending projectile kind.
        kind: ProjectileKind,
    },
    /// A tower kind declares a negative or non-finite range.
    #[error("tower kind {kind:?} has an invalid range")]
    InvalidTowerRange {
        /// Offending tower kind.
        kind: TowerKind,
    },
    /// The simulation would never advance.
    #[error("tick rate must be positive")]
    ZeroTickRate,
}
