//! Enemy records and their per-tick movement and damage rules.

use glam::Vec2;
use waypoint_defence_core::{EnemyId, EnemyKind, EnemySnapshot, EnemyStats, Health, Path};

/// Authoritative state of a single enemy.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) waypoint: usize,
    pub(crate) health: Health,
    pub(crate) speed: f32,
    pub(crate) reward: u32,
    pub(crate) alive: bool,
}

/// Result of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Movement {
    /// The enemy had no waypoint left and left the path.
    Escaped,
    /// The enemy snapped onto the waypoint with the provided index.
    Reached(usize),
    /// The enemy moved toward its next waypoint.
    Moved,
    /// The enemy is already dead and did not move.
    Idle,
}

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    /// The enemy absorbed the hit.
    Survived(Health),
    /// The hit exhausted the enemy's hit points.
    Destroyed { reward: u32 },
    /// The enemy was already dead; nothing changed.
    Ignored,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        stats: &EnemyStats,
        start: Vec2,
        speed_bonus: f32,
    ) -> Self {
        Self {
            id,
            kind,
            position: start,
            waypoint: 0,
            health: Health::new(stats.hit_points),
            speed: stats.speed + speed_bonus,
            reward: stats.reward,
            alive: true,
        }
    }

    /// Moves the enemy one tick along `path`.
    ///
    /// When the remaining distance to the next waypoint is shorter than a
    /// step, the enemy snaps onto that waypoint and the leftover distance is
    /// discarded.
    pub(crate) fn advance(&mut self, path: &Path) -> Movement {
        if !self.alive {
            return Movement::Idle;
        }

        let next_index = self.waypoint.saturating_add(1);
        let Some(next) = path.waypoint(next_index) else {
            self.alive = false;
            return Movement::Escaped;
        };

        let delta = next - self.position;
        let distance = delta.length();
        if distance < self.speed {
            self.waypoint = next_index;
            self.position = next;
            return Movement::Reached(next_index);
        }

        self.position += delta / distance * self.speed;
        Movement::Moved
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.damaged(amount);
        if self.health.is_depleted() {
            self.alive = false;
            DamageOutcome::Destroyed {
                reward: self.reward,
            }
        } else {
            DamageOutcome::Survived(self.health)
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            waypoint: self.waypoint,
            health: self.health,
            speed: self.speed,
            reward: self.reward,
        }
    }
}

/// Locates an enemy by id in a collection kept sorted by id.
pub(crate) fn find_index(enemies: &[Enemy], id: EnemyId) -> Option<usize> {
    enemies.binary_search_by_key(&id, |enemy| enemy.id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hit_points: i32, speed: f32) -> EnemyStats {
        EnemyStats {
            hit_points,
            speed,
            speed_jitter: 0.0,
            reward: 10,
        }
    }

    fn straight_path() -> Path {
        Path::new(vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)])
    }

    #[test]
    fn moves_by_speed_toward_next_waypoint() {
        let path = straight_path();
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Basic,
            &stats(5, 4.0),
            Vec2::ZERO,
            0.0,
        );

        assert_eq!(enemy.advance(&path), Movement::Moved);
        assert_eq!(enemy.position, Vec2::new(4.0, 0.0));
        assert_eq!(enemy.advance(&path), Movement::Moved);
        assert_eq!(enemy.position, Vec2::new(8.0, 0.0));
        assert_eq!(enemy.advance(&path), Movement::Reached(1));
        assert_eq!(enemy.position, Vec2::new(10.0, 0.0));
        assert_eq!(enemy.waypoint, 1);
        assert_eq!(enemy.advance(&path), Movement::Escaped);
        assert!(!enemy.alive);
        assert_eq!(enemy.advance(&path), Movement::Idle);
    }

    #[test]
    fn single_waypoint_path_escapes_immediately() {
        let path = Path::new(vec![Vec2::new(3.0, 3.0)]);
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Fast,
            &stats(3, 2.0),
            Vec2::new(3.0, 3.0),
            0.0,
        );
        assert_eq!(enemy.advance(&path), Movement::Escaped);
    }

    #[test]
    fn damage_destroys_once() {
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Basic,
            &stats(5, 1.0),
            Vec2::ZERO,
            0.0,
        );

        assert_eq!(enemy.take_damage(3), DamageOutcome::Survived(Health::new(2)));
        assert!(enemy.alive);
        assert_eq!(
            enemy.take_damage(3),
            DamageOutcome::Destroyed { reward: 10 }
        );
        assert_eq!(enemy.health, Health::new(-1));
        assert!(!enemy.alive);
        assert_eq!(enemy.take_damage(3), DamageOutcome::Ignored);
        assert_eq!(enemy.health, Health::new(-1));
    }

    #[test]
    fn speed_bonus_is_added_to_base_speed() {
        let enemy = Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Basic,
            &stats(5, 1.0),
            Vec2::ZERO,
            0.25,
        );
        assert!((enemy.speed - 1.25).abs() < f32::EPSILON);
    }
}
