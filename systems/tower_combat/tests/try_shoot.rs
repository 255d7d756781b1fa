use std::time::Duration;

use glam::Vec2;
use waypoint_defence_core::{
    Command, EnemyKind, Event, LevelIndex, Path, TowerId, TowerKind, Tuning,
};
use waypoint_defence_system_tower_combat::TowerCombat;
use waypoint_defence_system_tower_targeting::TowerTargeting;
use waypoint_defence_world::{self as world, query, World};

fn world_with_enemy_at(enemy_start: Vec2) -> World {
    let mut world = World::new(Tuning::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartLevel {
            level: LevelIndex::FIRST,
            path: Path::new(vec![enemy_start, enemy_start + Vec2::new(0.0, 1_000.0)]),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Vec2::ZERO,
        },
        &mut events,
    );
    world::apply(&mut world, Command::SpawnEnemy { kind: EnemyKind::Basic }, &mut events);
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(1_500),
        },
        &mut events,
    );
    world
}

fn try_shoot(world: &mut World) -> Vec<Event> {
    let mut targeting = TowerTargeting::new();
    let combat = TowerCombat::new();
    let mut targets = Vec::new();
    targeting.handle(
        &query::tower_view(world),
        &query::enemy_view(world),
        &mut targets,
    );

    let mut commands = Vec::new();
    combat.handle(&query::tower_cooldowns(world), &targets, &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn no_target_in_range_leaves_cooldown_untouched() {
    let mut world = world_with_enemy_at(Vec2::new(150.0, 0.0));
    let before = query::tower_cooldowns(&world).into_vec();

    let events = try_shoot(&mut world);

    assert!(events.is_empty());
    assert!(query::projectile_view(&world).is_empty());
    assert_eq!(query::tower_cooldowns(&world).into_vec(), before);
    assert_eq!(before[0].ready_in, Duration::ZERO, "tower keeps retrying");
}

#[test]
fn ready_tower_with_target_fires_and_restarts_cooldown() {
    let mut world = world_with_enemy_at(Vec2::new(60.0, 0.0));

    let events = try_shoot(&mut world);

    assert!(matches!(
        events.as_slice(),
        [Event::ProjectileFired { tower, .. }] if *tower == TowerId::new(0)
    ));
    assert_eq!(query::projectile_view(&world).len(), 1);
    let cooldown = query::tower_cooldowns(&world).into_vec()[0];
    assert_eq!(cooldown.ready_in, Duration::from_millis(1_000));

    assert!(try_shoot(&mut world).is_empty(), "second shot waits for the cooldown");
}
