//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use waypoint_defence_core::{
    TowerId, TowerKind, TowerSnapshot, TowerStats, INITIAL_TOWER_LEVEL, MAX_TOWER_LEVEL,
    UPGRADE_RANGE_FACTOR,
};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Upgrade level, within `1..=MAX_TOWER_LEVEL`.
    pub(crate) level: u8,
    /// Centre of the tower.
    pub(crate) position: Vec2,
    /// Current targeting range.
    pub(crate) range: f32,
    /// Simulation time of the latest shot, or of placement before the first.
    pub(crate) last_shot: Duration,
}

impl TowerState {
    /// Time left before the tower may fire again.
    pub(crate) fn ready_in(&self, now: Duration, interval: Duration) -> Duration {
        let elapsed = now.saturating_sub(self.last_shot);
        interval.saturating_sub(elapsed)
    }

    /// Raises the level by one and widens the range.
    pub(crate) fn promote(&mut self) {
        self.level = (self.level + 1).min(MAX_TOWER_LEVEL);
        self.range *= UPGRADE_RANGE_FACTOR;
    }

    /// Reports whether `point` lies inside the square footprint of the tower.
    pub(crate) fn covers(&self, point: Vec2, footprint: f32) -> bool {
        let half = footprint * 0.5;
        let offset = (point - self.position).abs();
        offset.x <= half && offset.y <= half
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            level: self.level,
            position: self.position,
            range: self.range,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a freshly built level-1 tower and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        stats: &TowerStats,
        position: Vec2,
        now: Duration,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let previous = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                level: INITIAL_TOWER_LEVEL,
                position,
                range: stats.range,
                last_shot: now,
            },
        );
        debug_assert!(previous.is_none(), "tower identifiers are never reused");
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Drops every tower. Identifiers keep counting upward.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
