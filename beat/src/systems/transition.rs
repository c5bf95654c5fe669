//! End of a round: win/lose banners, screen fades and the victory shower.

use anyhow::Result;

use crate::components::{
    Animated, Ball, Debugable, EntityRender, Player, Position, Rotation, Size, StateComponent,
    TextRender, Transition,
};
use crate::content::SHEET_FREE_CHICKEN;
use crate::engine::{EngineContext, Outcome, System};
use crate::event::{listener, Event, EventId};
use crate::math::Vec2;
use crate::physics::{ColliderShape, Material, RigidBodyType};
use crate::render::{Color, HAlign};
use crate::world::{EntityId, Family};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::random_range;

/// Extra time a way-in fade stays fully black before its callback fires.
const WAY_IN_HOLD: f32 = 0.3;
const RETRY_DELAY: f32 = 3.0;
const NEXT_LEVEL_DELAY: f32 = 5.0;

const DROPPED_CHICKENS: usize = 31;
const DROP_INTERVAL: f32 = 0.1;
const DROP_IMPULSE: f32 = 280.0;
const CHICKEN_RADIUS: f32 = 8.0;

const BANNER_Y: f32 = 64.0;
const BANNER_SIZE: Vec2 = Vec2::new(SCREEN_WIDTH, 90.0);
const SHADOW_OFFSET: f32 = 2.0;

/// Runs fades and fires their completion once.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransitionSystem;

impl TransitionSystem {
    fn complete(ctx: &mut EngineContext, entity: EntityId, way_in: bool) -> Result<()> {
        if !way_in {
            ctx.remove_entity(entity);
            return Ok(());
        }

        let win = ctx.world.query::<Player>().iter().any(|(_, p)| p.win);
        if win {
            drop_chickens(ctx);
            ctx.request_outcome(Outcome::NextLevel, NEXT_LEVEL_DELAY);
        } else {
            ctx.request_outcome(Outcome::Retry, RETRY_DELAY);
        }
        Ok(())
    }
}

impl System for TransitionSystem {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let family = Family::new()
            .with::<Transition>()
            .with::<StateComponent>();
        for entity in ctx.world.family(&family) {
            // an earlier completion may have cleared the screen
            if !ctx.world.matches(entity, &family) {
                continue;
            }
            let time = ctx
                .world
                .get::<StateComponent>(entity)
                .map(|s| s.time)
                .unwrap_or(0.0);
            let Some(transition) = ctx.world.get_mut::<Transition>(entity) else {
                continue;
            };
            if transition.done {
                continue;
            }
            let hold = if transition.way_in { WAY_IN_HOLD } else { 0.0 };
            if time > transition.duration + hold {
                transition.done = true;
                let way_in = transition.way_in;
                Self::complete(ctx, entity, way_in)?;
            }
        }
        Ok(())
    }
}

/// Overlay opacity of a fade `time` seconds in.
pub fn overlay_alpha(transition: &Transition, time: f32) -> f32 {
    let progress = if transition.duration > 0.0 {
        time / transition.duration
    } else {
        1.0
    };
    if transition.way_in {
        progress.min(1.0)
    } else {
        (1.0 - progress).max(0.0)
    }
}

/// Clear the arena and schedule the victory shower.
pub fn drop_chickens(ctx: &mut EngineContext) {
    let doomed: Vec<EntityId> = ctx
        .world
        .entities()
        .iter()
        .copied()
        .filter(|e| !ctx.world.has::<TextRender>(*e))
        .collect();
    log::info!("clearing {} entities for the victory shower", doomed.len());
    for entity in doomed {
        ctx.remove_entity(entity);
    }
    ctx.physics.destroy_all();

    for i in 0..DROPPED_CHICKENS {
        ctx.emit_later(i as f32 * DROP_INTERVAL, Event::new(EventId::DropChicken));
    }
}

fn spawn_dropped_chicken(ctx: &mut EngineContext) -> Result<()> {
    let from_below = ctx.rng.bool();
    let drift = random_range(&mut ctx.rng, -10.0, 10.0);
    let (position, impulse) = if from_below {
        (
            Vec2::new(SCREEN_WIDTH * 0.5, -16.0),
            Vec2::new(drift, DROP_IMPULSE),
        )
    } else {
        (
            Vec2::new(SCREEN_WIDTH * 0.5, SCREEN_HEIGHT + 16.0),
            Vec2::new(drift, -DROP_IMPULSE),
        )
    };
    let fly = ctx.assets.sheet(SHEET_FREE_CHICKEN)?.clip("fly")?;

    let chicken = ctx.world.spawn();
    ctx.world.insert(chicken, Position(position));
    ctx.world.insert(chicken, Size(Vec2::new(16.0, 16.0)));
    ctx.world.insert(chicken, StateComponent::default());
    ctx.world.insert(chicken, EntityRender::default());
    ctx.world.insert(chicken, Debugable);
    ctx.world.insert(chicken, Rotation::default());
    ctx.world.insert(chicken, Animated::new(fly));

    let body = ctx.physics.create_body(RigidBodyType::Dynamic, position, 0.0);
    ctx.physics.add_collider(
        body,
        ColliderShape::Circle {
            radius: CHICKEN_RADIUS,
        },
        Material {
            density: 1.0,
            friction: 2.0,
            restitution: 0.0,
        },
    )?;
    ctx.physics.set_linear_damping(body, 0.5);
    ctx.physics.apply_impulse(body, impulse, position);
    ctx.physics.attach(body, chicken);
    Ok(())
}

fn show_banner(ctx: &mut EngineContext, key: &str, scale: f32) {
    let text = ctx.texts.get(key);
    let shadows = [-SHADOW_OFFSET, SHADOW_OFFSET]
        .into_iter()
        .flat_map(|x| [(x, -SHADOW_OFFSET), (x, SHADOW_OFFSET)])
        .map(|(x, y)| (Vec2::new(x, BANNER_Y + y), Color::BLACK));
    let front = std::iter::once((Vec2::new(0.0, BANNER_Y), Color::WHITE));

    for (position, color) in shadows.chain(front) {
        let banner = ctx.world.spawn();
        ctx.world.insert(
            banner,
            TextRender {
                text: text.clone(),
                color,
                scale,
                halign: HAlign::Center,
            },
        );
        ctx.world.insert(banner, Position(position));
        ctx.world.insert(banner, Size(BANNER_SIZE));
    }

    let fade = ctx.world.spawn();
    ctx.world.insert(fade, Transition::way_in());
    ctx.world.insert(fade, StateComponent::default());
}

fn remove_balls(ctx: &mut EngineContext) {
    let balls: Vec<EntityId> = ctx.world.query::<Ball>().into_iter().map(|(e, _)| e).collect();
    for ball in balls {
        ctx.remove_entity(ball);
    }
}

/// Wire the `Lose`, `Win` and `DropChicken` reactions of the screen.
pub fn register_outcome_listeners(ctx: &mut EngineContext) {
    ctx.bus.register(
        listener(|ctx, _| {
            log::info!("player lost the round");
            remove_balls(ctx);
            show_banner(ctx, "game.loose", 1.0);
            Ok(())
        }),
        &[EventId::Lose],
    );

    ctx.bus.register(
        listener(|ctx, _| {
            log::info!("player won the round");
            let players: Vec<EntityId> =
                ctx.world.query::<Player>().into_iter().map(|(e, _)| e).collect();
            for player in players {
                if let Some(p) = ctx.world.get_mut::<Player>(player) {
                    p.win = true;
                }
            }
            remove_balls(ctx);
            show_banner(ctx, "game.win", 0.7);
            Ok(())
        }),
        &[EventId::Win],
    );

    ctx.bus.register(
        listener(|ctx, _| spawn_dropped_chicken(ctx)),
        &[EventId::DropChicken],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MapBundle;
    use crate::state::StateClock;
    use crate::systems::test_context;

    fn frame(ctx: &mut EngineContext, dt: f32) {
        ctx.flush_events(dt).unwrap();
        StateClock.update(ctx, dt).unwrap();
        TransitionSystem.update(ctx, dt).unwrap();
    }

    fn spawn_round(ctx: &mut EngineContext) -> EntityId {
        let player = ctx.world.spawn();
        ctx.world.insert(player, Player::default());
        let ball = ctx.world.spawn();
        ctx.world.insert(ball, Ball::default());
        player
    }

    #[test]
    fn test_way_out_fade_removes_itself() {
        let mut ctx = EngineContext::headless(1);
        let fade = ctx.world.spawn();
        ctx.world.insert(fade, Transition::way_out());
        ctx.world.insert(fade, StateComponent::default());

        frame(&mut ctx, 0.25);
        frame(&mut ctx, 0.25);
        assert!(ctx.world.is_alive(fade));
        frame(&mut ctx, 0.125);
        assert!(!ctx.world.is_alive(fade));
    }

    #[test]
    fn test_overlay_alpha() {
        let way_in = Transition::way_in();
        assert_eq!(overlay_alpha(&way_in, 0.25), 0.5);
        assert_eq!(overlay_alpha(&way_in, 2.0), 1.0);
        let way_out = Transition::way_out();
        assert_eq!(overlay_alpha(&way_out, 0.25), 0.5);
        assert_eq!(overlay_alpha(&way_out, 2.0), 0.0);
    }

    #[test]
    fn test_lose_shows_banner_and_retries() {
        let mut ctx = EngineContext::headless(1);
        ctx.texts = Box::new(MapBundle::new().with("game.loose", "Game over"));
        register_outcome_listeners(&mut ctx);
        spawn_round(&mut ctx);

        ctx.emit(Event::new(EventId::Lose)).unwrap();
        assert!(ctx.world.query::<Ball>().is_empty());
        let banners = ctx.world.query::<TextRender>();
        assert_eq!(banners.len(), 5);
        assert!(banners.iter().all(|(_, t)| t.text == "Game over" && t.scale == 1.0));
        assert_eq!(banners.iter().filter(|(_, t)| t.color == Color::WHITE).count(), 1);

        // fade (0.5) + hold (0.3), then three seconds of black
        for _ in 0..7 {
            frame(&mut ctx, 0.125);
        }
        assert_eq!(ctx.outcome(), None);
        for _ in 0..23 {
            frame(&mut ctx, 0.125);
        }
        assert_eq!(ctx.outcome(), None);
        for _ in 0..2 {
            frame(&mut ctx, 0.125);
        }
        assert_eq!(ctx.outcome(), Some(Outcome::Retry));
    }

    #[test]
    fn test_win_drops_chickens_then_next_level() {
        let mut ctx = test_context(1);
        register_outcome_listeners(&mut ctx);
        let player = spawn_round(&mut ctx);
        let wall = ctx.physics.create_body(RigidBodyType::Fixed, Vec2::ZERO, 0.0);

        ctx.emit(Event::new(EventId::Win)).unwrap();
        assert!(ctx.world.get::<Player>(player).unwrap().win);
        assert_eq!(ctx.world.query::<TextRender>()[0].1.scale, 0.7);

        for _ in 0..7 {
            frame(&mut ctx, 0.125);
        }
        // screen cleared except for the banners
        assert!(!ctx.world.is_alive(player));
        assert!(!ctx.physics.contains(wall));
        assert_eq!(ctx.world.len(), 5);

        for _ in 0..40 {
            frame(&mut ctx, 0.125);
        }
        assert_eq!(ctx.physics.len(), DROPPED_CHICKENS);
        assert_eq!(ctx.world.len(), 5 + DROPPED_CHICKENS);
        assert_eq!(ctx.outcome(), Some(Outcome::NextLevel));
    }
}
