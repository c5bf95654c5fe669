//! The game screen: loads a level, spawns its entities and wires every
//! system in frame order.

use anyhow::Result;
use glam::Mat4;
use log::info;

use crate::assets::{AssetLoader, AssetManager};
use crate::audio::AudioSink;
use crate::components::{
    AnimatedHitbox, Animated, Ball, BallCopy, Brick, CameraHolder, Cloud, DeadZone,
    DebugCollision, Debugable, EntityRender, Hitbox, MapLayer, Move, Player, Position, Rotation,
    ShapeToRender, Size, StateComponent, Transition,
};
use crate::config::Config;
use crate::content::{
    manifest, MUSIC, SHEET_CHICKEN, SHEET_CLOUDS, SHEET_EGG, SHEET_FOX, SLICE_HITBOX,
};
use crate::engine::{Engine, EngineContext, Outcome};
use crate::i18n::TextBundle;
use crate::input::InputState;
use crate::interpolation::Interpolation;
use crate::level::{BrickSpec, Level, TileMapSource};
use crate::math::{Rect, Vec2};
use crate::physics::{ColliderShape, Material, RigidBodyType};
use crate::render::{Color, DrawCommand, GlyphMetrics};
use crate::state::{StateClock, StateMachine};
use crate::systems::{
    register_outcome_listeners, AnimationFrames, BallBehavior, BallEchoes, BrickBehavior,
    CameraBehavior, CloudDrift, DebugCollisionDecay, DebugDirections, DebugPositions,
    DebugShapes, EchoFade, Feathers, FreeChickenFlight, GateBehavior, HitboxSlices, ImpactDraw,
    ImpactParticles, InputEvents, MapBackground, MapForeground, MoveSystem, PhysicsStep,
    PlayerAnimation, PlayerControl, SpriteRender, TextDraw, TransformSync, TransitionOverlay,
    TransitionSystem,
};
use crate::world::{EntityId, World};
use crate::{BALL_RADIUS, PLAYER_HEIGHT, PLAYER_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Breakable bricks start this far above their resting place and slide in.
const SLIDE_IN_OFFSET: f32 = SCREEN_HEIGHT * 0.5;
const SLIDE_IN_DURATION: f32 = 0.7;
const SLIDE_IN_STAGGER: f32 = 0.1;

const PLAYER_Y: f32 = 25.0;
const BALL_SIZE: Vec2 = Vec2::new(8.0, 9.0);
const BALL_ORIGIN: Vec2 = Vec2::new(4.0, 4.0);
const ECHOES: usize = 4;
const FOX_SIZE: Vec2 = Vec2::new(64.0, 32.0);
const CLOUD_SIZE: Vec2 = Vec2::new(64.0, 64.0);
const CLOUD_CLIPS: [&str; 3] = ["cloud1", "cloud2", "cloud3"];
const MUSIC_VOLUME: f32 = 0.2;

/// One round of the game, from the fade-in to the requested [`Outcome`].
pub struct GameScreen {
    engine: Engine,
}

impl GameScreen {
    /// Load every asset, build the level described by `map` and wire the systems.
    ///
    /// Fails on an invalid configuration, a malformed level or a missing asset.
    pub fn new(
        config: Config,
        loader: Box<dyn AssetLoader>,
        map: &dyn TileMapSource,
        texts: Box<dyn TextBundle>,
        audio: Box<dyn AudioSink>,
        seed: u64,
    ) -> Result<Self> {
        info!("loading game screen for level {}", config.level);

        let mut assets = AssetManager::new(loader);
        for (kind, name) in manifest(&config) {
            assets.queue(kind, name);
        }
        assets.finish_loading()?;

        let level = Level::from_map(map)?;
        let ctx = EngineContext::new(config, assets, audio, texts, seed)?;
        let mut engine = Engine::new(ctx);

        let ctx = engine.context_mut();
        spawn_level(ctx, &level)?;
        add_walls(ctx)?;
        register_outcome_listeners(ctx);
        wire_systems(&mut engine);
        start_music(engine.context_mut())?;

        info!(
            "game screen ready: {} entities, {} bodies, {} systems",
            engine.context().world.len(),
            engine.context().physics.len(),
            engine.system_count()
        );
        Ok(Self { engine })
    }

    /// Advance one frame; returns the delta actually simulated.
    pub fn update(&mut self, raw_dt: f32) -> Result<f32> {
        self.engine.update(raw_dt)
    }

    /// Where to go next, once the round is over and its delay has elapsed.
    pub fn outcome(&self) -> Option<Outcome> {
        self.engine.context().outcome()
    }

    pub fn input(&mut self) -> &mut InputState {
        &mut self.engine.context_mut().input
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.context_mut().resize(width, height);
    }

    /// Replace the fixed-width metrics used to lay out text.
    pub fn set_glyph_metrics(&mut self, glyphs: Box<dyn GlyphMetrics>) {
        self.engine.context_mut().glyphs = glyphs;
    }

    /// What the last frame drew, in order.
    pub fn draw_commands(&self) -> &[DrawCommand] {
        self.engine.context().draw.commands()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.engine
            .context()
            .camera
            .view_projection(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn context(&self) -> &EngineContext {
        self.engine.context()
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        self.engine.context_mut()
    }
}

fn wire_systems(engine: &mut Engine) {
    let ball = StateMachine::new(BallBehavior::default());
    let brick = StateMachine::new(BrickBehavior);
    let player = StateMachine::new(PlayerAnimation);
    let gate = StateMachine::new(GateBehavior);
    let camera = StateMachine::new(CameraBehavior);

    let bus = &mut engine.context_mut().bus;
    ball.listen(bus);
    brick.listen(bus);
    player.listen(bus);
    gate.listen(bus);
    camera.listen(bus);

    engine
        // input
        .add_system(InputEvents)
        .add_system(PlayerControl::new())
        .add_system(PhysicsStep)
        .add_system(StateClock)
        // gameplay
        .add_system(DebugCollisionDecay)
        .add_system(MoveSystem::default())
        .add_system(ball)
        .add_system(brick)
        .add_system(player)
        .add_system(gate)
        .add_system(CloudDrift)
        .add_system(FreeChickenFlight)
        .add_system(BallEchoes::new())
        .add_system(EchoFade)
        .add_system(ImpactParticles)
        .add_system(TransitionSystem)
        .add_system(TransformSync)
        // render
        .add_system(MapBackground)
        .add_system(AnimationFrames)
        .add_system(HitboxSlices)
        .add_system(Feathers)
        .add_system(SpriteRender)
        .add_system(ImpactDraw)
        .add_system(MapForeground)
        .add_system(TextDraw)
        .add_system(DebugShapes)
        .add_system(DebugPositions)
        .add_system(DebugDirections)
        .add_system(TransitionOverlay)
        .add_system(camera);
}

fn spawn_level(ctx: &mut EngineContext, level: &Level) -> Result<()> {
    info!("spawning {} bricks", level.bricks.len());
    let mut bricks = level
        .bricks
        .iter()
        .map(|spec| spawn_brick(ctx, spec))
        .collect::<Result<Vec<_>>>()?;
    slide_in(ctx, &mut bricks);

    info!("spawning {} dead zone(s)", level.dead_zones.len());
    for zone in &level.dead_zones {
        let e = ctx.world.spawn();
        ctx.world.insert(e, Debugable);
        ctx.world.insert(e, DebugCollision::default());
        ctx.world.insert(e, Position(zone.position()));
        ctx.world.insert(e, Size(zone.size()));
        ctx.world.insert(e, DeadZone);
        ctx.world.insert(e, ShapeToRender::rect(Color::RED));
    }

    spawn_ball(ctx)?;
    spawn_player(ctx)?;
    spawn_scenery(ctx, level)?;

    let fade = ctx.world.spawn();
    ctx.world.insert(fade, Transition::way_out());
    ctx.world.insert(fade, StateComponent::default());
    Ok(())
}

/// Breakable bricks start above the screen; walls and gates are placed directly.
///
/// The physics body always sits at the resting place.
fn spawn_brick(ctx: &mut EngineContext, spec: &BrickSpec) -> Result<EntityId> {
    let bounds = spec.bounds;
    let size = bounds.size();
    let position = if spec.is_breakable() {
        Vec2::new(bounds.x, bounds.y + SLIDE_IN_OFFSET)
    } else {
        bounds.position()
    };

    let body = ctx
        .physics
        .create_body(RigidBodyType::Fixed, bounds.center(), 0.0);
    ctx.physics.add_collider(
        body,
        ColliderShape::Box {
            hx: size.x * 0.5,
            hy: size.y * 0.5,
        },
        Material::default(),
    )?;

    let e = ctx.world.spawn();
    ctx.world.insert(
        e,
        Brick {
            hit: spec.hit,
            body: Some(body),
        },
    );
    ctx.world.insert(e, Debugable);
    ctx.world.insert(e, DebugCollision::default());
    ctx.world.insert(e, Position(position));
    ctx.world.insert(e, Size(size));
    ctx.world.insert(e, StateComponent::default());
    ctx.world.insert(
        e,
        Hitbox {
            size,
            offset: Vec2::ZERO,
        },
    );
    ctx.world.insert(e, ShapeToRender::rect(Color::CHARTREUSE));

    if spec.is_breakable() {
        ctx.world.insert(e, Animated::default());
        ctx.world.insert(e, EntityRender::default());
    } else if let Some(gate) = spec.gate {
        ctx.world.insert(e, gate);
        ctx.world.insert(e, AnimatedHitbox::default());
        ctx.world.insert(e, Animated::default());
        ctx.world.insert(e, EntityRender::at_z(-1));
    }
    Ok(e)
}

/// Stagger the breakable bricks bottom row first, left to right.
fn slide_in(ctx: &mut EngineContext, bricks: &mut [EntityId]) {
    let resting = |world: &World, e: EntityId| {
        world.get::<Position>(e).map(|p| p.0).unwrap_or_default()
    };
    let world = &ctx.world;
    bricks.sort_by(|a, b| {
        let (a, b) = (resting(world, *a), resting(world, *b));
        a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
    });
    let breakable: Vec<(EntityId, Vec2)> = bricks
        .iter()
        .copied()
        .filter(|e| world.get::<Brick>(*e).is_some_and(|b| b.hit > 0))
        .map(|e| (e, resting(world, e)))
        .collect();

    for (index, (brick, from)) in breakable.into_iter().enumerate() {
        ctx.world.insert(
            brick,
            Move {
                duration: SLIDE_IN_DURATION,
                delay: index as f32 * SLIDE_IN_STAGGER,
                from,
                target: from - Vec2::new(0.0, SLIDE_IN_OFFSET),
                interpolation: Interpolation::Pow2Out,
            },
        );
    }
}

fn spawn_ball(ctx: &mut EngineContext) -> Result<()> {
    let egg = ctx.assets.sheet(SHEET_EGG)?.frame(0)?;

    let ball = ctx.world.spawn();
    ctx.world.insert(ball, Ball::default());
    ctx.world.insert(ball, Debugable);
    ctx.world.insert(
        ball,
        Position(Vec2::new(
            (SCREEN_WIDTH - BALL_RADIUS) * 0.5,
            PLAYER_Y + PLAYER_HEIGHT,
        )),
    );
    ctx.world.insert(ball, Size(BALL_SIZE));
    ctx.world.insert(ball, ShapeToRender::rect(Color::WHITE));
    ctx.world.insert(ball, EntityRender::with_texture(egg, 0));
    ctx.world.insert(ball, StateComponent::default());
    ctx.world.insert(ball, Rotation::around(BALL_ORIGIN));

    // hidden until the echo system moves them
    for i in 1..=ECHOES {
        let echo = ctx.world.spawn();
        ctx.world.insert(
            echo,
            BallCopy {
                alpha: 1.0 / i as f32,
            },
        );
        ctx.world.insert(echo, Position(Vec2::new(-100.0, -100.0)));
        ctx.world.insert(echo, Size(BALL_SIZE));
        ctx.world.insert(echo, EntityRender::with_texture(egg, -1));
        ctx.world.insert(echo, StateComponent::default());
        ctx.world.insert(echo, Rotation::around(BALL_ORIGIN));
    }
    Ok(())
}

fn spawn_player(ctx: &mut EngineContext) -> Result<()> {
    // slices are measured from the top of the frame
    let bounds: Rect = ctx.assets.sheet(SHEET_CHICKEN)?.slice(SLICE_HITBOX)?;

    let player = ctx.world.spawn();
    ctx.world.insert(
        player,
        Player {
            hitbox: bounds.size(),
            hitbox_offset: Vec2::new(bounds.x, PLAYER_HEIGHT - bounds.y - bounds.height),
            ..Player::default()
        },
    );
    ctx.world.insert(player, Debugable);
    ctx.world.insert(player, DebugCollision::default());
    ctx.world.insert(player, EntityRender::default());
    ctx.world.insert(player, Animated::default());
    ctx.world.insert(
        player,
        Position(Vec2::new((SCREEN_WIDTH - PLAYER_WIDTH) * 0.5, PLAYER_Y)),
    );
    ctx.world.insert(player, Size(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)));
    ctx.world.insert(player, ShapeToRender::rect(Color::BLUE));
    ctx.world.insert(player, StateComponent::default());
    Ok(())
}

fn spawn_scenery(ctx: &mut EngineContext, level: &Level) -> Result<()> {
    let fox_idle = ctx.assets.sheet(SHEET_FOX)?.clip("idle")?;
    let fox = ctx.world.spawn();
    ctx.world.insert(fox, Debugable);
    ctx.world.insert(fox, EntityRender::default());
    ctx.world.insert(fox, Animated::new(fox_idle));
    ctx.world.insert(
        fox,
        Position(Vec2::new(SCREEN_WIDTH - FOX_SIZE.x, SCREEN_HEIGHT - FOX_SIZE.y)),
    );
    ctx.world.insert(fox, Size(FOX_SIZE));
    ctx.world.insert(fox, ShapeToRender::rect(Color::BLUE));
    ctx.world.insert(fox, StateComponent::default());

    let holder = ctx.world.spawn();
    ctx.world.insert(holder, CameraHolder::default());
    ctx.world.insert(
        holder,
        Position(Vec2::new(SCREEN_WIDTH * 0.5, SCREEN_HEIGHT * 0.5)),
    );
    ctx.world.insert(holder, StateComponent::default());

    let map = ctx.world.spawn();
    ctx.world.insert(
        map,
        MapLayer {
            background: level.background.clone(),
            foreground: level.foreground.clone(),
        },
    );

    let sheet = ctx.assets.sheet(SHEET_CLOUDS)?;
    let origins = [
        Vec2::new(0.0, SCREEN_WIDTH * 0.5),
        Vec2::new(80.0, SCREEN_HEIGHT * 0.5),
    ];
    for (index, origin) in origins.into_iter().enumerate() {
        let name = CLOUD_CLIPS[ctx.rng.usize(..CLOUD_CLIPS.len())];
        let texture = sheet.clip(name)?.key_frame(0.0).copied();

        let cloud = ctx.world.spawn();
        ctx.world.insert(cloud, Debugable);
        ctx.world.insert(
            cloud,
            Cloud {
                origin,
                offset: index as f32 * 2.5,
            },
        );
        ctx.world.insert(cloud, Position(origin));
        ctx.world.insert(cloud, Size(CLOUD_SIZE));
        ctx.world.insert(cloud, ShapeToRender::rect(Color::BLACK));
        ctx.world.insert(
            cloud,
            EntityRender {
                texture,
                ..EntityRender::at_z(-2)
            },
        );
        ctx.world.insert(cloud, StateComponent::default());
    }
    Ok(())
}

/// Floor and side walls of the arena, for debris and dropped chickens.
fn add_walls(ctx: &mut EngineContext) -> Result<()> {
    let walls = [
        (Vec2::new(SCREEN_WIDTH * 0.5, 0.0), Vec2::new(SCREEN_WIDTH * 0.5, 10.0)),
        (Vec2::new(-5.0, SCREEN_HEIGHT * 0.5), Vec2::new(5.0, SCREEN_HEIGHT * 0.5)),
        (
            Vec2::new(SCREEN_WIDTH + 5.0, SCREEN_HEIGHT * 0.5),
            Vec2::new(5.0, SCREEN_HEIGHT * 0.5),
        ),
    ];
    for (center, half) in walls {
        let body = ctx.physics.create_body(RigidBodyType::Fixed, center, 0.0);
        ctx.physics.add_collider(
            body,
            ColliderShape::Box {
                hx: half.x,
                hy: half.y,
            },
            Material::default(),
        )?;
    }
    Ok(())
}

fn start_music(ctx: &mut EngineContext) -> Result<()> {
    if !ctx.config.music || !ctx.audio.is_available() {
        return Ok(());
    }
    let music = ctx.assets.music(MUSIC)?;
    ctx.audio.play_music(music, true, MUSIC_VOLUME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioLog, NullAudio};
    use crate::components::{Brick, Gate, TextRender};
    use crate::content::placeholder_assets;
    use crate::event::{Event, EventId};
    use crate::i18n::MapBundle;
    use crate::input::Key;
    use crate::level::JsonTileMap;

    const FRAME: f32 = 1.0 / 64.0;

    const LEVEL: &str = r#"{
        "layers": [
            { "name": "sky" },
            { "name": "bricks", "objects": [
                { "x": 8, "y": 150, "width": 16, "height": 8, "properties": { "hit": 1 } },
                { "x": 40, "y": 140, "width": 16, "height": 8, "properties": { "hit": 2 } },
                { "x": 0, "y": 100, "width": 16, "height": 8, "properties": { "hit": 0 } },
                { "x": 56, "y": 120, "width": 16, "height": 16, "properties": { "hit": -2 } }
            ] },
            { "name": "deadZone", "objects": [
                { "x": 0, "y": -10, "width": 128, "height": 10 }
            ] },
            { "name": "front_leaves" }
        ]
    }"#;

    fn screen_with(config: Config, audio: Box<dyn AudioSink>) -> GameScreen {
        let map = JsonTileMap::from_json(LEVEL).unwrap();
        let loader = Box::new(placeholder_assets(&config));
        let texts = Box::new(MapBundle::new().with("game.win", "You win").with("game.loose", "Game over"));
        GameScreen::new(config, loader, &map, texts, audio, 7).unwrap()
    }

    fn screen() -> GameScreen {
        screen_with(Config::default(), Box::new(NullAudio))
    }

    fn run(screen: &mut GameScreen, frames: usize) {
        for _ in 0..frames {
            screen.update(FRAME).unwrap();
        }
    }

    fn bricks(screen: &GameScreen) -> Vec<(EntityId, Brick)> {
        screen
            .context()
            .world
            .query::<Brick>()
            .into_iter()
            .map(|(e, b)| (e, *b))
            .collect()
    }

    #[test]
    fn test_level_entities_are_spawned() {
        let screen = screen();
        let world = &screen.context().world;

        assert_eq!(bricks(&screen).len(), 4);
        assert_eq!(world.query::<Gate>().len(), 1);
        assert_eq!(world.query::<DeadZone>().len(), 1);
        assert_eq!(world.query::<Ball>().len(), 1);
        assert_eq!(world.query::<BallCopy>().len(), ECHOES);
        assert_eq!(world.query::<Cloud>().len(), 2);
        assert_eq!(world.query::<Transition>().len(), 1);
        // one body per brick plus three walls
        assert_eq!(screen.context().physics.len(), 4 + 3);

        let map = world.query::<MapLayer>();
        assert_eq!(map[0].1.background, vec![0, 1, 2]);
        assert_eq!(map[0].1.foreground, vec![3]);

        let (ball, _) = world.query::<Ball>()[0];
        assert_eq!(world.get::<Position>(ball).unwrap().0, Vec2::new(62.0, 57.0));
    }

    #[test]
    fn test_player_hitbox_comes_from_slice() {
        let screen = screen();
        let world = &screen.context().world;
        let (player, p) = world.query::<Player>()[0];
        assert_eq!(p.hitbox, Vec2::new(40.0, 8.0));
        assert_eq!(p.hitbox_offset, Vec2::new(4.0, 6.0));
        assert_eq!(world.get::<Position>(player).unwrap().0, Vec2::new(40.0, 25.0));
    }

    #[test]
    fn test_breakable_bricks_slide_in_staggered() {
        let screen = screen();
        let world = &screen.context().world;

        let mut moves: Vec<Move> = world.query::<Move>().into_iter().map(|(_, m)| *m).collect();
        moves.sort_by(|a, b| a.delay.total_cmp(&b.delay));
        assert_eq!(moves.len(), 2);
        // lower brick first
        assert_eq!(moves[0].target, Vec2::new(40.0, 140.0));
        assert_eq!(moves[0].from, Vec2::new(40.0, 252.0));
        assert_eq!(moves[0].delay, 0.0);
        assert_eq!(moves[1].target, Vec2::new(8.0, 150.0));
        assert!((moves[1].delay - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_bricks_settle_after_slide_in() {
        let mut screen = screen();
        run(&mut screen, 64);

        let world = &screen.context().world;
        assert!(world.query::<Move>().is_empty());
        let resting: Vec<Vec2> = bricks(&screen)
            .into_iter()
            .filter(|(_, b)| b.hit > 0)
            .map(|(e, _)| world.get::<Position>(e).unwrap().0)
            .collect();
        assert!(resting.contains(&Vec2::new(8.0, 150.0)));
        assert!(resting.contains(&Vec2::new(40.0, 140.0)));
    }

    #[test]
    fn test_frame_draws_sprites_and_fades_in() {
        let mut screen = screen();
        screen.update(FRAME).unwrap();

        let commands = screen.draw_commands();
        assert!(matches!(commands.first(), Some(DrawCommand::TileLayers { .. })));
        assert!(commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Sprite { .. })));
        assert!(commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Overlay { .. })));

        // the fade-in removes itself after half a second
        run(&mut screen, 40);
        assert!(screen.context().world.query::<Transition>().is_empty());
    }

    #[test]
    fn test_keyboard_moves_paddle_and_launches_ball() {
        let mut screen = screen();
        // machines pick up their entities on the first frame
        run(&mut screen, 1);
        screen.input().press_key(Key::Right);
        run(&mut screen, 8);

        let world = &screen.context().world;
        let (player, _) = world.query::<Player>()[0];
        assert!(world.get::<Position>(player).unwrap().0.x > 40.0);
        let (ball, _) = world.query::<Ball>()[0];
        assert!(world.get::<Position>(ball).unwrap().0.y > 57.0);
    }

    #[test]
    fn test_win_leads_to_next_level() {
        let mut screen = screen();
        screen
            .context_mut()
            .emit(Event::new(EventId::Win))
            .unwrap();
        assert!(screen.context().world.query::<Ball>().is_empty());

        // fade, then the victory shower, then five seconds
        run(&mut screen, 64 * 7);
        assert_eq!(screen.outcome(), Some(Outcome::NextLevel));
        let banners = screen.context().world.query::<TextRender>();
        assert!(banners.iter().all(|(_, t)| t.text == "You win"));
    }

    #[test]
    fn test_last_breakable_brick_wins() {
        let mut screen = screen();
        run(&mut screen, 64);

        let targets: Vec<EntityId> = bricks(&screen)
            .into_iter()
            .filter(|(_, b)| b.hit > 0)
            .map(|(e, _)| e)
            .collect();
        for target in targets {
            let ctx = screen.context_mut();
            if let Some(b) = ctx.world.get_mut::<Brick>(target) {
                b.hit = 1;
            }
            ctx.emit(Event::to(EventId::BrickTouched, target)).unwrap();
        }
        assert!(bricks(&screen).iter().all(|(_, b)| b.hit <= 0));
        assert!(screen
            .context()
            .world
            .query::<Player>()
            .iter()
            .all(|(_, p)| p.win));
        assert_eq!(screen.context().world.query::<TextRender>().len(), 5);
    }

    #[test]
    fn test_music_starts_when_enabled() {
        let log = AudioLog::new();
        let _screen = screen_with(Config::default(), Box::new(log.clone()));
        assert_eq!(log.entries().len(), 1);

        let quiet = AudioLog::new();
        let config = Config {
            music: false,
            ..Config::default()
        };
        let _screen = screen_with(config, Box::new(quiet.clone()));
        assert!(quiet.entries().is_empty());
    }

    #[test]
    fn test_bad_configuration_is_rejected() {
        let config = Config {
            viewport: "TinyViewport".into(),
            ..Config::default()
        };
        let map = JsonTileMap::from_json(LEVEL).unwrap();
        let loader = Box::new(placeholder_assets(&config));
        let result = GameScreen::new(
            config,
            loader,
            &map,
            Box::new(MapBundle::new()),
            Box::new(NullAudio),
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_view_projection_centres_arena() {
        let screen = screen();
        let centre = screen
            .view_projection()
            .project_point3(glam::Vec3::new(SCREEN_WIDTH * 0.5, SCREEN_HEIGHT * 0.5, 0.0));
        assert!(centre.x.abs() < 1e-5 && centre.y.abs() < 1e-5);
    }
}
