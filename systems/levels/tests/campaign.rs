use std::{path::PathBuf, time::Duration};

use cube_slide_core::{CellCoord, Command, Event, GameState};
use cube_slide_system_levels::{Campaign, LevelAsset, Palette, Progress};
use cube_slide_world::{self as world, query, GridObject, Movable, SessionConfig, World};

fn levels_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../levels")
}

fn play(world: &mut World, asset: &LevelAsset, taps: &[(i32, i32)]) -> Vec<Event> {
    let mut log = Vec::new();
    world::apply(
        world,
        Command::LoadLevel {
            definition: asset.definition.clone(),
        },
        &mut log,
    );

    for &(x, z) in taps {
        let (cube, direction) = {
            let cube = query::cube_at(world, CellCoord::on_plane(x, z)).expect("tapped cube");
            (cube.grid_id(), cube.direction())
        };
        world::apply(world, Command::RequestMove { cube, direction }, &mut log);
        while !query::is_idle(world) {
            world::apply(
                world,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut log,
            );
        }
    }
    log
}

#[test]
fn bundled_campaign_can_be_cleared() {
    let mut campaign = Campaign::from_dir(&levels_dir(), &Palette::default()).expect("campaign");
    assert_eq!(campaign.len(), 2);

    let mut world = World::new(SessionConfig::default());

    let first = campaign.start(1).clone();
    let log = play(&mut world, &first, &[(1, 2), (3, 2), (2, 2), (0, 4)]);
    assert!(log.contains(&Event::LevelCompleted { level: 1 }));
    assert_eq!(query::game_state(&world), GameState::LevelComplete);
    assert_eq!(query::moves_left(&world), 1);

    let second = match campaign.next() {
        Progress::Level(asset) => asset.clone(),
        Progress::AllLevelsCompleted => panic!("expected a second level"),
    };
    let log = play(&mut world, &second, &[(0, 0), (2, 5), (5, 3)]);
    assert!(log.contains(&Event::LevelCompleted { level: 2 }));
    assert_eq!(query::moves_left(&world), 0);

    assert_eq!(campaign.next(), Progress::AllLevelsCompleted);
}

#[test]
fn bundled_levels_frame_their_layout() {
    let mut campaign = Campaign::from_dir(&levels_dir(), &Palette::default()).expect("campaign");
    let frame = campaign.start(2).frame(1.0, 16.0 / 9.0).expect("frame");
    assert!((frame.position.y - 12.0).abs() < f32::EPSILON);
    assert!(frame.orthographic_size > 0.0);
}
