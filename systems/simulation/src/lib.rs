#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step simulation loop that drives the Waypoint Defence world.
//!
//! Every step runs the same ordered phases:
//!
//! 1. advance the clock and let the wave scheduler spawn enemies,
//! 2. move every enemy along the level path,
//! 3. acquire targets and fire every ready tower,
//! 4. move every projectile and resolve impacts,
//! 5. purge destroyed enemies and spent projectiles.
//!
//! Adapters observe the world only between steps, through [`Simulation::world`]
//! and the events each step returns.

use std::time::Duration;

use glam::Vec2;
use tracing::info;
use waypoint_defence_core::{
    Command, ConfigError, Event, GameConfig, LevelError, LevelIndex, PlacementError, TowerId,
    TowerKind, TowerTarget, UpgradeError,
};
use waypoint_defence_system_tower_combat::TowerCombat;
use waypoint_defence_system_tower_targeting::TowerTargeting;
use waypoint_defence_system_wave_scheduler::WaveScheduler;
use waypoint_defence_world::{self as world, query, World};

/// Owns the world and every system for one game session.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    level: LevelIndex,
    targets: Vec<TowerTarget>,
    pending: Vec<Event>,
    clear_announced: bool,
}

impl Simulation {
    /// Validates `config` and starts its first level.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut simulation = Self {
            world: World::new(config.tuning.clone()),
            scheduler: WaveScheduler::new(config.tuning.waves, config.tuning.simulation.seed),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            level: LevelIndex::FIRST,
            targets: Vec::new(),
            pending: Vec::new(),
            clear_announced: false,
            config,
        };
        simulation
            .start_level(LevelIndex::FIRST)
            .map_err(|_| ConfigError::NoLevels)?;
        Ok(simulation)
    }

    /// Starts `level` from scratch.
    ///
    /// Money and lives are reset, every entity is cleared and a fresh
    /// scheduler replaces the previous one together with its armed timer.
    pub fn start_level(&mut self, level: LevelIndex) -> Result<(), LevelError> {
        let definition =
            self.config
                .levels
                .get(level)
                .ok_or(LevelError::OutOfRange {
                    requested: level.get(),
                    available: self.config.levels.len(),
                })?;

        let mut scheduler = WaveScheduler::new(
            self.config.tuning.waves,
            self.config.tuning.simulation.seed,
        );
        scheduler.start_level(&definition.waves);
        self.scheduler = scheduler;
        self.level = level;
        self.targets.clear();
        self.clear_announced = false;

        world::apply(
            &mut self.world,
            Command::StartLevel {
                level,
                path: definition.path.clone(),
            },
            &mut self.pending,
        );
        Ok(())
    }

    /// Restarts the level currently being played.
    pub fn restart_level(&mut self) -> Result<(), LevelError> {
        self.start_level(self.level)
    }

    /// Moves on to the next level once the current one is complete.
    pub fn advance_level(&mut self) -> Result<(), LevelError> {
        if !self.level_complete() {
            return Err(LevelError::NotComplete);
        }
        self.start_level(self.level.next())
    }

    /// Advances the simulation by one tick of the configured tick rate.
    pub fn tick(&mut self) -> Vec<Event> {
        self.step(self.config.tuning.simulation.tick_duration())
    }

    /// Advances the simulation by `dt`, returning every event produced since
    /// the previous step.
    pub fn step(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = std::mem::take(&mut self.pending);
        let mut commands = Vec::new();

        let time_start = events.len();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.scheduler.handle(&events[time_start..], &mut commands);
        self.execute(&mut commands, &mut events);

        world::apply(&mut self.world, Command::AdvanceEnemies, &mut events);

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        self.combat.handle(
            &query::tower_cooldowns(&self.world),
            &self.targets,
            &mut commands,
        );
        self.execute(&mut commands, &mut events);

        world::apply(&mut self.world, Command::AdvanceProjectiles, &mut events);
        world::apply(&mut self.world, Command::PurgeDead, &mut events);

        if !self.clear_announced && self.waves_cleared() {
            self.clear_announced = true;
            info!(
                level = self.level.get(),
                has_next = self.config.levels.has_next(self.level),
                lives = query::player(&self.world).lives(),
                "level cleared"
            );
        }

        events
    }

    /// Builds a tower of `kind` centred on `position`, paying its cost.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
    ) -> Result<TowerId, PlacementError> {
        world::place_tower(&mut self.world, kind, position, &mut self.pending)
    }

    /// Upgrades `tower` by one level, returning the new level.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u8, UpgradeError> {
        world::upgrade_tower(&mut self.world, tower, &mut self.pending)
    }

    /// Upgrades the tower whose footprint contains `point`.
    pub fn upgrade_tower_at(&mut self, point: Vec2) -> Result<u8, UpgradeError> {
        let tower = query::tower_at(&self.world, point).ok_or(UpgradeError::MissingTower)?;
        self.upgrade_tower(tower)
    }

    /// Takes the events produced by level changes and player actions since
    /// the previous step.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    /// Reports whether every wave has spawned and no enemy is left alive.
    #[must_use]
    pub fn waves_cleared(&self) -> bool {
        self.scheduler.is_finished() && query::live_enemy_count(&self.world) == 0
    }

    /// Reports whether the current level is won and another level follows.
    ///
    /// Evaluated from live state on every call.
    #[must_use]
    pub fn level_complete(&self) -> bool {
        self.waves_cleared() && self.config.levels.has_next(self.level)
    }

    /// Reports whether the player has run out of lives.
    #[must_use]
    pub fn defeated(&self) -> bool {
        query::player(&self.world).is_defeated()
    }

    /// Index of the level being played.
    #[must_use]
    pub fn level(&self) -> LevelIndex {
        self.level
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the wave scheduler of the current level.
    #[must_use]
    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    fn execute(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{EnemyKind, LevelDefinition, LevelSet, Path, Wave};

    fn config(waves: Vec<Wave>, path: Vec<Vec2>) -> GameConfig {
        let mut config = GameConfig::default();
        config.tuning.waves = config.tuning.waves.without_jitter();
        config.tuning.enemies.basic.speed_jitter = 0.0;
        config.levels = LevelSet::new(vec![
            LevelDefinition {
                path: Path::new(path),
                waves,
            },
            LevelDefinition {
                path: Path::new(vec![Vec2::ZERO, Vec2::new(0.0, 10.0)]),
                waves: vec![Wave::new(EnemyKind::Fast, 1)],
            },
        ]);
        config
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut config = GameConfig::default();
        config.levels = LevelSet::new(Vec::new());
        assert_eq!(
            Simulation::new(config).map(|_| ()),
            Err(ConfigError::NoLevels)
        );
    }

    #[test]
    fn first_step_reports_level_start() {
        let mut simulation = Simulation::new(GameConfig::default()).expect("default config");
        let events = simulation.tick();
        assert_eq!(
            events.first(),
            Some(&Event::LevelStarted {
                level: LevelIndex::FIRST
            })
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. })));
    }

    #[test]
    fn advancing_an_unfinished_level_is_refused() {
        let mut simulation = Simulation::new(GameConfig::default()).expect("default config");
        assert_eq!(simulation.advance_level(), Err(LevelError::NotComplete));
        assert_eq!(simulation.level(), LevelIndex::FIRST);
    }

    #[test]
    fn out_of_range_level_is_reported() {
        let mut simulation = Simulation::new(GameConfig::default()).expect("default config");
        assert_eq!(
            simulation.start_level(LevelIndex::new(5)),
            Err(LevelError::OutOfRange {
                requested: 5,
                available: 2
            })
        );
        assert_eq!(simulation.level(), LevelIndex::FIRST);
    }

    #[test]
    fn placement_and_upgrade_results_mirror_world_events() {
        let mut simulation = Simulation::new(config(
            vec![Wave::new(EnemyKind::Basic, 1)],
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
        ))
        .expect("valid config");

        let tower = simulation
            .place_tower(TowerKind::Sniper, Vec2::new(100.0, 100.0))
            .expect("affordable");
        assert_eq!(simulation.upgrade_tower(tower), Ok(2));
        assert_eq!(
            simulation.place_tower(TowerKind::Basic, Vec2::ZERO),
            Err(PlacementError::InsufficientFunds {
                cost: 50,
                available: 40
            })
        );
        assert_eq!(
            simulation.upgrade_tower_at(Vec2::new(500.0, 500.0)),
            Err(UpgradeError::MissingTower)
        );
        assert_eq!(
            simulation.upgrade_tower_at(Vec2::new(110.0, 90.0)),
            Err(UpgradeError::InsufficientFunds {
                cost: 100,
                available: 40
            })
        );

        let events = simulation.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TowerUpgraded { level: 2, .. })));
        assert!(simulation.drain_events().is_empty());
    }

    #[test]
    fn completion_requires_spawns_exhausted_and_no_live_enemies() {
        let mut simulation = Simulation::new(config(
            vec![Wave::new(EnemyKind::Basic, 1)],
            vec![Vec2::ZERO, Vec2::new(3.0, 0.0)],
        ))
        .expect("valid config");

        let _ = simulation.step(Duration::from_millis(1_000));
        assert_eq!(query::live_enemy_count(simulation.world()), 1);
        assert!(!simulation.level_complete());

        for _ in 0..10 {
            let _ = simulation.step(Duration::from_millis(10));
        }
        assert_eq!(query::live_enemy_count(simulation.world()), 0);
        assert!(!simulation.scheduler().is_finished());
        assert!(!simulation.level_complete());

        let _ = simulation.step(Duration::from_millis(10_000));
        assert!(simulation.scheduler().is_finished());
        assert!(simulation.level_complete());

        assert_eq!(simulation.advance_level(), Ok(()));
        assert_eq!(simulation.level(), LevelIndex::new(1));
        assert!(!simulation.level_complete());
        assert_eq!(query::player(simulation.world()).lives(), 10);
    }
}
