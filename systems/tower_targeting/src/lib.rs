#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use waypoint_defence_core::{EnemyId, EnemyView, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Every tower picks the live enemy closest to its centre among those no
    /// farther than its range. Equidistant enemies resolve to the smaller
    /// identifier. The output buffer is cleared before populating it with the
    /// latest assignments.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter() {
            let max_distance_sq = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = candidate.position.distance_squared(tower.position);
                if distance_sq > max_distance_sq {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    distance: best_candidate.distance_sq.sqrt(),
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace
            .extend(enemies.iter().map(|snapshot| EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            }));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{
        EnemyKind, EnemySnapshot, Health, TowerId, TowerKind, TowerSnapshot,
    };

    fn tower(id: u32, position: Vec2, range: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Basic,
            level: 1,
            position,
            range,
        }
    }

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Basic,
            position,
            waypoint: 0,
            health: Health::new(5),
            speed: 1.0,
            reward: 10,
        }
    }

    fn targets(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
            distance: 0.0,
        }];
        system.handle(
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn enemy_out_of_range_is_ignored() {
        let out = targets(
            vec![tower(0, Vec2::ZERO, 100.0)],
            vec![enemy(0, Vec2::new(150.0, 0.0))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn enemy_exactly_at_range_is_acquired() {
        let out = targets(
            vec![tower(0, Vec2::ZERO, 100.0)],
            vec![enemy(4, Vec2::new(60.0, 80.0))],
        );
        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(0),
                enemy: EnemyId::new(4),
                distance: 100.0,
            }]
        );
    }

    #[test]
    fn nearest_enemy_wins_regardless_of_order() {
        let out = targets(
            vec![tower(0, Vec2::ZERO, 100.0)],
            vec![
                enemy(0, Vec2::new(90.0, 0.0)),
                enemy(1, Vec2::new(0.0, -30.0)),
                enemy(2, Vec2::new(50.0, 0.0)),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(1));
    }

    #[test]
    fn equidistant_enemies_resolve_to_smaller_identifier() {
        let out = targets(
            vec![tower(0, Vec2::ZERO, 100.0)],
            vec![
                enemy(7, Vec2::new(0.0, 40.0)),
                enemy(3, Vec2::new(40.0, 0.0)),
                enemy(5, Vec2::new(-40.0, 0.0)),
            ],
        );
        assert_eq!(out[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn each_tower_targets_independently() {
        let out = targets(
            vec![
                tower(0, Vec2::ZERO, 50.0),
                tower(1, Vec2::new(200.0, 0.0), 50.0),
                tower(2, Vec2::new(0.0, 500.0), 50.0),
            ],
            vec![
                enemy(0, Vec2::new(10.0, 0.0)),
                enemy(1, Vec2::new(190.0, 0.0)),
            ],
        );
        assert_eq!(
            out.iter()
                .map(|target| (target.tower, target.enemy))
                .collect::<Vec<_>>(),
            vec![
                (TowerId::new(0), EnemyId::new(0)),
                (TowerId::new(1), EnemyId::new(1)),
            ]
        );
    }

    #[test]
    fn empty_inputs_clear_previous_targets() {
        assert!(targets(vec![tower(0, Vec2::ZERO, 100.0)], Vec::new()).is_empty());
        assert!(targets(Vec::new(), vec![enemy(0, Vec2::ZERO)]).is_empty());
    }
}
