#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.
//!
//! A tower fires only when its cooldown has fully elapsed and the targeting
//! pass found an enemy for it. Towers without a target keep their cooldown
//! untouched and retry on the next tick.

use waypoint_defence_core::{Command, TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerTarget};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat;

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    ///
    /// Targets whose tower is missing from `tower_cooldowns` are dropped.
    /// Commands follow the order of `tower_targets`.
    pub fn handle(
        &self,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        let cooldowns = tower_cooldowns.as_slice();
        out.extend(
            tower_targets
                .iter()
                .filter(|target| is_ready(cooldowns, target.tower))
                .map(|target| Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                }),
        );
    }
}

fn is_ready(cooldowns: &[TowerCooldownSnapshot], tower: TowerId) -> bool {
    cooldowns
        .binary_search_by_key(&tower, |snapshot| snapshot.tower)
        .is_ok_and(|index| cooldowns[index].ready_in.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use waypoint_defence_core::{EnemyId, TowerKind};

    #[test]
    fn no_targets_means_no_commands() {
        let system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let mut out = Vec::new();

        system.handle(&cooldowns, &[], &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn firing_respects_cooldown_readiness() {
        let system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            snapshot(5, Duration::ZERO),
            snapshot(2, Duration::ZERO),
        ]);
        let targets = vec![target(2, 4), target(5, 1)];
        let mut out = Vec::new();

        system.handle(&cooldowns, &targets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireProjectile {
                    tower: TowerId::new(2),
                    target: EnemyId::new(4),
                },
                Command::FireProjectile {
                    tower: TowerId::new(5),
                    target: EnemyId::new(1),
                },
            ],
        );
    }

    #[test]
    fn non_ready_or_missing_towers_are_skipped() {
        let system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            snapshot(3, Duration::from_millis(250)),
            snapshot(8, Duration::ZERO),
        ]);
        let targets = vec![target(3, 9), target(8, 2), target(42, 3)];
        let mut out = Vec::new();

        system.handle(&cooldowns, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(8),
                target: EnemyId::new(2),
            }],
        );
    }

    fn snapshot(tower: u32, ready_in: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: TowerId::new(tower),
            kind: TowerKind::Basic,
            ready_in,
        }
    }

    fn target(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
            distance: 0.0,
        }
    }
}
