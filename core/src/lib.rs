#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume event streams, query
//! immutable views, and respond exclusively with new command batches.
//!
//! Entities never own each other. Towers and projectiles refer to enemies
//! through [`EnemyId`] handles that are validated for liveness whenever they
//! are dereferenced.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;

pub use config::{
    ConfigError, EconomyTuning, EnemyStats, EnemyTable, GameConfig, LevelDefinition, LevelSet,
    ProjectileStats, ProjectileTable, SimulationTuning, TowerStats, TowerTable, Tuning, Wave,
    WaveTiming, MIN_INTER_WAVE_DELAY, MIN_INTRA_WAVE_DELAY,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Waypoint Defence.";

/// Level assigned to freshly placed towers.
pub const INITIAL_TOWER_LEVEL: u8 = 1;

/// Highest level a tower may reach through upgrades.
pub const MAX_TOWER_LEVEL: u8 = 3;

/// Multiplier applied to a tower's range by every successful upgrade.
pub const UPGRADE_RANGE_FACTOR: f32 = 1.2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards every entity, resets the player and loads the provided path.
    StartLevel {
        /// Index of the level being started.
        level: LevelIndex,
        /// Waypoints enemies follow during the level.
        path: Path,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests creation of an enemy at the first waypoint of the active path.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Moves every live enemy one step along the path.
    AdvanceEnemies,
    /// Requests that a tower fire a projectile at the provided enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
    },
    /// Moves every projectile toward its target and resolves impacts.
    AdvanceProjectiles,
    /// Removes enemies and projectiles that were marked dead this tick.
    PurgeDead,
    /// Requests placement of a tower at the provided position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Centre of the tower in path space.
        position: Vec2,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level attempt began with a fresh world state.
    LevelStarted {
        /// Index of the level that started.
        level: LevelIndex,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Position of the enemy at spawn time.
        position: Vec2,
    },
    /// Reports that an enemy reached another waypoint.
    EnemyAdvanced {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Index of the waypoint the enemy reached.
        waypoint: usize,
    },
    /// Reports that an enemy walked off the end of the path, costing a life.
    EnemyEscaped {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
    },
    /// Reports that an enemy absorbed damage and survived.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Damage applied.
        damage: u32,
        /// Hit points left after the hit.
        remaining: Health,
    },
    /// Reports that an enemy was destroyed, granting its reward.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Money granted to the player.
        reward: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy being tracked.
        target: EnemyId,
    },
    /// Reports that a projectile reached its target.
    ProjectileHit {
        /// Identifier of the projectile that hit.
        projectile: ProjectileId,
        /// Enemy that was struck.
        target: EnemyId,
        /// Damage delivered.
        damage: u32,
    },
    /// Reports that a projectile vanished because its target is gone.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
        /// Enemy the projectile had been tracking.
        target: EnemyId,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Centre of the tower.
        position: Vec2,
        /// Money spent on the placement.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced a level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u8,
        /// Range after the upgrade.
        range: f32,
        /// Money spent on the upgrade.
        cost: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports how many dead entities were dropped from their collections.
    EntitiesPurged {
        /// Number of enemies removed.
        enemies: usize,
        /// Number of projectiles removed.
        projectiles: usize,
    },
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated in spawn order and never reused, so an id held
/// after its enemy disappeared resolves to nothing instead of a newer enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based index into the configured level list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelIndex(usize);

impl LevelIndex {
    /// Index of the opening level.
    pub const FIRST: Self = Self(0);

    /// Creates a new level index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Index of the level that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Remaining hit points of an enemy. Values at or below zero mean destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(i32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit point count.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Subtracts damage; the result may drop below zero.
    #[must_use]
    pub fn damaged(self, amount: u32) -> Self {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        Self(self.0.saturating_sub(amount))
    }

    /// Reports whether the hit points are exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }
}

/// Kinds of enemies that waves may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Sturdy, slow enemy.
    Basic,
    /// Fragile enemy that moves twice as fast.
    Fast,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Cheap tower with a short range and quick cadence.
    Basic,
    /// Expensive long-range tower with a slow cadence.
    Sniper,
}

/// Kinds of projectiles towers can launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Fast, light projectile.
    Basic,
    /// Slow projectile carrying more damage.
    Heavy,
}

/// Ordered polyline of waypoints that enemies follow.
///
/// Paths are authored data and stay immutable once a level starts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path from the provided waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Waypoint at the provided index, if any.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Entry point where enemies appear.
    #[must_use]
    pub fn start(&self) -> Option<Vec2> {
        self.waypoints.first().copied()
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current position in path space.
    pub position: Vec2,
    /// Index of the last waypoint the enemy reached.
    pub waypoint: usize,
    /// Remaining hit points.
    pub health: Health,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Money granted when the enemy is destroyed.
    pub reward: u32,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Current upgrade level, between 1 and [`MAX_TOWER_LEVEL`].
    pub level: u8,
    /// Centre of the tower.
    pub position: Vec2,
    /// Maximum distance at which the tower acquires targets.
    pub range: f32,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Time remaining before a tower may fire again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower the cooldown belongs to.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Zero once the fire interval has elapsed since the last shot.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower's cooldown, sorted by tower id.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Snapshots in tower identifier order.
    #[must_use]
    pub fn as_slice(&self) -> &[TowerCooldownSnapshot] {
        &self.snapshots
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Kind of projectile.
    pub kind: ProjectileKind,
    /// Current position.
    pub position: Vec2,
    /// Enemy the projectile homes in on.
    pub target: EnemyId,
    /// Damage delivered on impact.
    pub damage: u32,
    /// Distance travelled per tick.
    pub speed: f32,
}

/// Read-only snapshot of all projectiles in flight, sorted by id.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Target selected for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy chosen as the target.
    pub enemy: EnemyId,
    /// Euclidean distance between tower and enemy.
    pub distance: f32,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The player cannot pay for the tower.
    #[error("insufficient funds: tower costs {cost}, player holds {available}")]
    InsufficientFunds {
        /// Price of the requested tower.
        cost: u32,
        /// Money held by the player.
        available: u32,
    },
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower already reached the highest level.
    #[error("tower is already at the maximum level")]
    MaxLevel,
    /// The player cannot pay for the upgrade.
    #[error("insufficient funds: upgrade costs {cost}, player holds {available}")]
    InsufficientFunds {
        /// Price of the upgrade.
        cost: u32,
        /// Money held by the player.
        available: u32,
    },
}

/// Reasons a level transition may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum LevelError {
    /// The requested level index exceeds the configured levels.
    #[error("level {requested} is out of range ({available} levels configured)")]
    OutOfRange {
        /// Level index that was requested.
        requested: usize,
        /// Number of configured levels.
        available: usize,
    },
    /// The current level has not been completed yet.
    #[error("the current level is not complete")]
    NotComplete,
}
