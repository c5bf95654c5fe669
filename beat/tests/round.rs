use beat::components::{Ball, Player, Position};
use beat::content::placeholder_assets;
use beat::render::ShapeKind;
use beat::{
    Config, DrawCommand, GameScreen, JsonTileMap, Key, MapBundle, NullAudio, Outcome, Vec2,
};

const FRAME: f32 = 1.0 / 64.0;

const LEVEL: &str = r#"{
    "layers": [
        { "name": "background" },
        { "name": "bricks", "objects": [
            { "x": 16, "y": 160, "width": 16, "height": 8, "properties": { "hit": 2 } },
            { "x": 48, "y": 160, "width": 16, "height": 8, "properties": { "hit": 1 } }
        ] },
        { "name": "deadZone", "objects": [
            { "x": 0, "y": -10, "width": 128, "height": 10 }
        ] }
    ]
}"#;

fn screen(config: Config) -> GameScreen {
    let map = JsonTileMap::from_json(LEVEL).unwrap();
    let loader = Box::new(placeholder_assets(&config));
    let texts = Box::new(MapBundle::new().with("game.loose", "Try again"));
    GameScreen::new(config, loader, &map, texts, Box::new(NullAudio), 42).unwrap()
}

fn run(screen: &mut GameScreen, frames: usize) {
    for _ in 0..frames {
        screen.update(FRAME).unwrap();
    }
}

fn position_of<T: 'static>(screen: &GameScreen) -> Vec2 {
    let world = &screen.context().world;
    let (entity, _) = world.query::<T>()[0];
    world.get::<Position>(entity).unwrap().0
}

#[test]
fn ball_lost_in_dead_zone_retries_level() {
    let mut screen = screen(Config::default());
    run(&mut screen, 1);
    screen.input().press_key(Key::Space);
    run(&mut screen, 1);

    let ctx = screen.context_mut();
    let (ball, _) = ctx.world.query::<Ball>()[0];
    ctx.world.get_mut::<Position>(ball).unwrap().0 = Vec2::new(60.0, -9.0);
    run(&mut screen, 1);
    assert!(screen.context().world.query::<Ball>().is_empty());
    assert_eq!(screen.outcome(), None);

    // fade out, then three seconds of banner
    run(&mut screen, 64 * 5);
    assert_eq!(screen.outcome(), Some(Outcome::Retry));
}

#[test]
fn dragging_moves_the_paddle_by_pointer_delta() {
    let mut screen = screen(Config::default());
    run(&mut screen, 1);
    let start = position_of::<Player>(&screen);

    screen.input().press_pointer(Vec2::new(50.0, 200.0));
    run(&mut screen, 1);
    assert_eq!(position_of::<Player>(&screen), start);

    screen.input().move_pointer(Vec2::new(70.0, 200.0));
    run(&mut screen, 1);
    let moved = position_of::<Player>(&screen);
    assert!((moved.x - (start.x + 20.0)).abs() < 1e-3);

    screen.input().release_pointer();
    run(&mut screen, 1);
    assert_eq!(position_of::<Player>(&screen).x, moved.x);
}

#[test]
fn paddle_never_leaves_the_arena() {
    let mut screen = screen(Config::default());
    screen.input().press_key(Key::Left);
    run(&mut screen, 64);
    assert_eq!(position_of::<Player>(&screen).x, 0.0);
}

#[test]
fn hitbox_overlay_follows_config() {
    let config = Config::from_json(r#"{ "hitbox": true, "sprites": false }"#).unwrap();
    let mut screen = screen(config);
    run(&mut screen, 1);

    let commands = screen.draw_commands();
    assert!(commands.iter().any(|c| matches!(
        c,
        DrawCommand::Shape {
            kind: ShapeKind::Rectangle,
            ..
        }
    )));
    assert!(!commands
        .iter()
        .any(|c| matches!(c, DrawCommand::Sprite { .. })));
}
