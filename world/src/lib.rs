#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waypoint Defence.
//!
//! The world owns the three entity collections of a level attempt (enemies,
//! towers, projectiles) together with the player's money and lives. It only
//! changes in response to [`Command`] values handed to [`apply`], and reports
//! every observable change as an [`Event`].

mod enemies;
mod player;
mod projectiles;
mod towers;

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use waypoint_defence_core::{
    Command, EnemyId, EnemyKind, Event, LevelIndex, Path, PlacementError, ProjectileId, TowerId,
    TowerKind, Tuning, UpgradeError, WELCOME_BANNER,
};

use enemies::{DamageOutcome, Enemy, Movement};
use projectiles::{Flight, Projectile};
use towers::TowerRegistry;

pub use player::PlayerState;

/// Stream of the shared seed reserved for spawn-time enemy variance.
const ENEMY_RNG_STREAM: u64 = 1;

/// Represents the authoritative Waypoint Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: Tuning,
    level: LevelIndex,
    path: Path,
    clock: Duration,
    tick_index: u64,
    player: PlayerState,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    next_enemy_id: EnemyId,
    next_projectile_id: ProjectileId,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world governed by the provided tuning.
    ///
    /// No path is loaded until a [`Command::StartLevel`] is applied.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(tuning.simulation.seed);
        rng.set_stream(ENEMY_RNG_STREAM);
        Self {
            banner: WELCOME_BANNER,
            player: PlayerState::new(&tuning.economy),
            tuning,
            level: LevelIndex::FIRST,
            path: Path::default(),
            clock: Duration::ZERO,
            tick_index: 0,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            next_projectile_id: ProjectileId::new(0),
            rng,
        }
    }

    fn start_level(&mut self, level: LevelIndex, path: Path, out_events: &mut Vec<Event>) {
        self.level = level;
        self.path = path;
        self.clock = Duration::ZERO;
        self.tick_index = 0;
        self.player.reset(&self.tuning.economy);
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        info!(
            level = level.get(),
            waypoints = self.path.len(),
            "level started"
        );
        out_events.push(Event::LevelStarted { level });
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let Some(start) = self.path.start() else {
            warn!(?kind, "spawn requested without a loaded path");
            return;
        };

        let stats = *self.tuning.enemies.stats(kind);
        let speed_bonus = if stats.speed_jitter > 0.0 {
            self.rng.gen_range(0.0..=stats.speed_jitter)
        } else {
            0.0
        };

        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.enemies
            .push(Enemy::spawn(id, kind, &stats, start, speed_bonus));
        debug!(enemy = id.get(), ?kind, "enemy spawned");
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position: start,
        });
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.iter_mut() {
            match enemy.advance(&self.path) {
                Movement::Escaped => {
                    self.player.lose_life();
                    debug!(
                        enemy = enemy.id.get(),
                        lives = self.player.lives(),
                        "enemy escaped"
                    );
                    out_events.push(Event::EnemyEscaped { enemy: enemy.id });
                }
                Movement::Reached(waypoint) => {
                    out_events.push(Event::EnemyAdvanced {
                        enemy: enemy.id,
                        waypoint,
                    });
                }
                Movement::Moved | Movement::Idle => {}
            }
        }
    }

    fn fire_projectile(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get_mut(tower_id) else {
            debug!(tower = tower_id.get(), "fire request for unknown tower");
            return;
        };

        let tower_stats = self.tuning.towers.stats(tower.kind);
        if !tower
            .ready_in(self.clock, tower_stats.fire_interval())
            .is_zero()
        {
            debug!(tower = tower_id.get(), "fire request before cooldown elapsed");
            return;
        }

        let target_alive = enemies::find_index(&self.enemies, target)
            .is_some_and(|index| self.enemies[index].alive);
        if !target_alive {
            debug!(
                tower = tower_id.get(),
                enemy = target.get(),
                "fire request at dead enemy"
            );
            return;
        }

        let kind = tower_stats.projectile;
        let projectile_stats = self.tuning.projectiles.stats(kind);
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        self.projectiles.push(Projectile {
            id,
            kind,
            position: tower.position,
            target,
            damage: projectile_stats.damage,
            speed: projectile_stats.speed,
            spent: false,
        });
        tower.last_shot = self.clock;

        debug!(
            tower = tower_id.get(),
            enemy = target.get(),
            projectile = id.get(),
            "projectile fired"
        );
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower: tower_id,
            target,
        });
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let Self {
            projectiles,
            enemies,
            player,
            ..
        } = self;

        for projectile in projectiles.iter_mut() {
            let index = enemies::find_index(enemies, projectile.target)
                .filter(|&index| enemies[index].alive);
            let target_position = index.map(|index| enemies[index].position);

            match projectile.advance(target_position) {
                Flight::Expired => {
                    out_events.push(Event::ProjectileExpired {
                        projectile: projectile.id,
                        target: projectile.target,
                    });
                }
                Flight::Impact => {
                    let Some(index) = index else {
                        continue;
                    };
                    let enemy = &mut enemies[index];
                    out_events.push(Event::ProjectileHit {
                        projectile: projectile.id,
                        target: enemy.id,
                        damage: projectile.damage,
                    });

                    match enemy.take_damage(projectile.damage) {
                        DamageOutcome::Survived(remaining) => {
                            out_events.push(Event::EnemyDamaged {
                                enemy: enemy.id,
                                damage: projectile.damage,
                                remaining,
                            });
                        }
                        DamageOutcome::Destroyed { reward } => {
                            player.earn(reward);
                            debug!(
                                enemy = enemy.id.get(),
                                reward,
                                money = player.money(),
                                "enemy killed"
                            );
                            out_events.push(Event::EnemyKilled {
                                enemy: enemy.id,
                                reward,
                            });
                        }
                        DamageOutcome::Ignored => {}
                    }
                }
                Flight::Homing | Flight::Idle => {}
            }
        }
    }

    fn purge_dead(&mut self, out_events: &mut Vec<Event>) {
        let enemies_before = self.enemies.len();
        let projectiles_before = self.projectiles.len();
        self.enemies.retain(|enemy| enemy.alive);
        self.projectiles.retain(|projectile| !projectile.spent);

        let enemies = enemies_before - self.enemies.len();
        let projectiles = projectiles_before - self.projectiles.len();
        if enemies > 0 || projectiles > 0 {
            out_events.push(Event::EntitiesPurged {
                enemies,
                projectiles,
            });
        }
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        let stats = *self.tuning.towers.stats(kind);
        if !self.player.spend(stats.cost) {
            let reason = PlacementError::InsufficientFunds {
                cost: stats.cost,
                available: self.player.money(),
            };
            warn!(?kind, %reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason,
            });
            return Err(reason);
        }

        let tower = self.towers.insert(kind, &stats, position, self.clock);
        info!(tower = tower.get(), ?kind, money = self.player.money(), "tower placed");
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            position,
            cost: stats.cost,
        });
        Ok(tower)
    }

    fn upgrade_tower(
        &mut self,
        tower_id: TowerId,
        out_events: &mut Vec<Event>,
    ) -> Result<u8, UpgradeError> {
        match self.try_upgrade(tower_id) {
            Ok((level, range, cost)) => {
                info!(tower = tower_id.get(), level, range, "tower upgraded");
                out_events.push(Event::TowerUpgraded {
                    tower: tower_id,
                    level,
                    range,
                    cost,
                });
                Ok(level)
            }
            Err(reason) => {
                warn!(tower = tower_id.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected {
                    tower: tower_id,
                    reason,
                });
                Err(reason)
            }
        }
    }

    fn try_upgrade(&mut self, tower_id: TowerId) -> Result<(u8, f32, u32), UpgradeError> {
        let tower = self
            .towers
            .get_mut(tower_id)
            .ok_or(UpgradeError::MissingTower)?;
        let cost = self
            .tuning
            .towers
            .stats(tower.kind)
            .upgrade_cost(tower.level)
            .ok_or(UpgradeError::MaxLevel)?;
        if !self.player.spend(cost) {
            return Err(UpgradeError::InsufficientFunds {
                cost,
                available: self.player.money(),
            });
        }
        tower.promote();
        Ok((tower.level, tower.range, cost))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel { level, path } => world.start_level(level, path, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::AdvanceEnemies => world.advance_enemies(out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceProjectiles => world.advance_projectiles(out_events),
        Command::PurgeDead => world.purge_dead(out_events),
        Command::PlaceTower { kind, position } => {
            let _ = place_tower(world, kind, position, out_events);
        }
        Command::UpgradeTower { tower } => {
            let _ = upgrade_tower(world, tower, out_events);
        }
    }
}

/// Builds a tower and reports the outcome that [`Command::PlaceTower`] would
/// publish as an event.
pub fn place_tower(
    world: &mut World,
    kind: TowerKind,
    position: Vec2,
    out_events: &mut Vec<Event>,
) -> Result<TowerId, PlacementError> {
    world.place_tower(kind, position, out_events)
}

/// Upgrades a tower and reports the outcome that [`Command::UpgradeTower`]
/// would publish as an event.
pub fn upgrade_tower(
    world: &mut World,
    tower: TowerId,
    out_events: &mut Vec<Event>,
) -> Result<u8, UpgradeError> {
    world.upgrade_tower(tower, out_events)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use waypoint_defence_core::{
        EnemyId, EnemyView, LevelIndex, Path, ProjectileView, TowerCooldownSnapshot,
        TowerCooldownView, TowerId, TowerSnapshot, TowerView,
    };

    use super::{enemies, PlayerState, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Index of the level being played.
    #[must_use]
    pub fn level(world: &World) -> LevelIndex {
        world.level
    }

    /// Path enemies currently follow.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Simulated time elapsed since the level started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied since the level started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Money and lives of the player.
    #[must_use]
    pub fn player(world: &World) -> &PlayerState {
        &world.player
    }

    /// Captures a read-only view of the live enemies in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.alive)
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.alive).count()
    }

    /// Reports whether the enemy exists and has not been destroyed.
    #[must_use]
    pub fn is_alive(world: &World, enemy: EnemyId) -> bool {
        enemies::find_index(&world.enemies, enemy)
            .is_some_and(|index| world.enemies[index].alive)
    }

    /// Captures a read-only view of all placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a single tower, when it exists.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(tower).map(|tower| tower.snapshot())
    }

    /// Captures the remaining cooldown of every tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    kind: tower.kind,
                    ready_in: tower.ready_in(
                        world.clock,
                        world.tuning.towers.stats(tower.kind).fire_interval(),
                    ),
                })
                .collect(),
        )
    }

    /// Finds the first tower whose footprint contains `point`.
    #[must_use]
    pub fn tower_at(world: &World, point: Vec2) -> Option<TowerId> {
        let footprint = world.tuning.simulation.tower_footprint;
        world
            .towers
            .iter()
            .find(|tower| tower.covers(point, footprint))
            .map(|tower| tower.id)
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .filter(|projectile| !projectile.spent)
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }
}
