use glam::Vec2;
use waypoint_defence_core::{
    Command, EnemyId, EnemyKind, Event, LevelIndex, Path, TowerId, TowerKind, TowerTarget, Tuning,
};
use waypoint_defence_system_tower_targeting::TowerTargeting;
use waypoint_defence_world::{self as world, query, World};

#[test]
fn deterministic_replay_tracks_enemies_along_the_path() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first.assignments, second.assignments, "replay diverged between runs");
    assert_eq!(first.events, second.events, "event log diverged between runs");

    let spawn_ids: Vec<EnemyId> = first
        .events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(spawn_ids, vec![EnemyId::new(0), EnemyId::new(1)]);

    let after_second_spawn = &first.assignments[4];
    assert_eq!(after_second_spawn.len(), 1, "only the near tower reaches the spawn");
    assert_eq!(after_second_spawn[0].tower, TowerId::new(0));
    assert_eq!(
        after_second_spawn[0].enemy,
        EnemyId::new(0),
        "stacked enemies resolve to the first spawned"
    );

    let last = first.assignments.last().expect("assignments recorded");
    assert!(
        last.iter()
            .any(|target| target.tower == TowerId::new(1) && target.enemy == EnemyId::new(0)),
        "far tower acquires the leading enemy once it walks into range: {last:?}"
    );
}

#[test]
fn enemy_beyond_range_is_never_targeted() {
    let mut world = World::new(Tuning::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartLevel {
            level: LevelIndex::FIRST,
            path: Path::new(vec![Vec2::new(150.0, 0.0), Vec2::new(150.0, 500.0)]),
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

    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    targeting.handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );

    assert!(targets.is_empty());
}

struct ReplayOutcome {
    assignments: Vec<Vec<TowerTarget>>,
    events: Vec<Event>,
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut tuning = Tuning::default();
    tuning.enemies.basic.speed_jitter = 0.0;
    let mut world = World::new(tuning);
    let mut targeting = TowerTargeting::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        world::apply(&mut world, command, &mut events);

        let mut targets = Vec::new();
        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut targets,
        );
        assignments.push(targets);
    }

    ReplayOutcome {
        assignments,
        events,
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::StartLevel {
            level: LevelIndex::FIRST,
            path: Path::new(vec![Vec2::ZERO, Vec2::new(400.0, 0.0)]),
        },
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Vec2::new(0.0, 50.0),
        },
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Vec2::new(250.0, 50.0),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Basic,
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Basic,
        },
    ];
    commands.extend(std::iter::repeat(Command::AdvanceEnemies).take(180));
    commands
}
