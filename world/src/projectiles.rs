//! Homing projectiles.

use glam::Vec2;
use waypoint_defence_core::{EnemyId, ProjectileId, ProjectileKind, ProjectileSnapshot};

/// Authoritative state of a projectile in flight.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec2,
    pub(crate) target: EnemyId,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
    pub(crate) spent: bool,
}

/// Result of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Flight {
    /// The target no longer exists; the projectile vanished harmlessly.
    Expired,
    /// The projectile reached its target and must deliver its damage.
    Impact,
    /// The projectile moved closer to its target.
    Homing,
    /// The projectile was already spent.
    Idle,
}

impl Projectile {
    /// Re-aims at the target's current position and moves one step.
    ///
    /// `target` is `None` when the tracked enemy is dead or gone.
    pub(crate) fn advance(&mut self, target: Option<Vec2>) -> Flight {
        if self.spent {
            return Flight::Idle;
        }

        let Some(target) = target else {
            self.spent = true;
            return Flight::Expired;
        };

        let delta = target - self.position;
        let distance = delta.length();
        if distance < self.speed || distance == 0.0 {
            self.position = target;
            self.spent = true;
            return Flight::Impact;
        }

        self.position += delta / distance * self.speed;
        Flight::Homing
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            target: self.target,
            damage: self.damage,
            speed: self.speed,
        }
    }
}
