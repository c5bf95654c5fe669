//! The ball: wobbles on the paddle until the first input, then bounces.

use anyhow::Result;

use crate::components::{
    Ball, Brick, DeadZone, DebugCollision, Hitbox, ImpactParticle, Player, Position, Rotation,
    Size, StateComponent,
};
use crate::content::{SFX_BRICK, SFX_PADDLE, SFX_WALL};
use crate::engine::EngineContext;
use crate::event::{Event, EventId, Payload};
use crate::math::{Rect, Vec2};
use crate::state::{Behavior, Transitions};
use crate::world::{EntityId, Family};
use crate::{HIT_TIME, SCREEN_HEIGHT, SCREEN_WIDTH};

use super::random_range;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BallState {
    /// Resting on the paddle, aim swinging left and right.
    Idle,
    Moving,
}

pub struct BallBehavior {
    bricks: Family,
    dead_zones: Family,
    players: Family,
}

impl Default for BallBehavior {
    fn default() -> Self {
        Self {
            bricks: Family::new()
                .with::<Brick>()
                .with::<Position>()
                .with::<Hitbox>(),
            dead_zones: Family::new()
                .with::<DeadZone>()
                .with::<Position>()
                .with::<Size>(),
            players: Family::new().with::<Player>().with::<Position>(),
        }
    }
}

/// What the ball looks like before it moves this frame.
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    position: Vec2,
    size: Vec2,
    direction: Vec2,
}

impl BallBehavior {
    fn snapshot(ctx: &EngineContext, ball: EntityId) -> Option<Snapshot> {
        Some(Snapshot {
            position: ctx.world.get::<Position>(ball)?.0,
            size: ctx.world.get::<Size>(ball).map(|s| s.0).unwrap_or_default(),
            direction: ctx.world.get::<Ball>(ball)?.direction,
        })
    }

    fn set_direction(ctx: &mut EngineContext, ball: EntityId, direction: Vec2) {
        if let Some(b) = ctx.world.get_mut::<Ball>(ball) {
            b.direction = direction;
        }
    }

    fn wobble(ctx: &mut EngineContext, ball: EntityId) {
        let time = ctx
            .world
            .get::<StateComponent>(ball)
            .map(|s| s.time)
            .unwrap_or_default();
        let rot = (time / 0.5).cos();
        Self::set_direction(ctx, ball, Vec2::Y.rotated(rot));
        if let Some(rotation) = ctx.world.get_mut::<Rotation>(ball) {
            rotation.degree = rot.to_degrees();
        }
    }

    fn in_dead_zone(&self, ctx: &EngineContext, ball: &Snapshot) -> bool {
        let center = Rect::from_corner(ball.position, ball.size).center();
        ctx.world.family(&self.dead_zones).into_iter().any(|zone| {
            match (ctx.world.get::<Position>(zone), ctx.world.get::<Size>(zone)) {
                (Some(p), Some(s)) => Rect::from_corner(p.0, s.0).contains(center),
                _ => false,
            }
        })
    }

    fn outside_area(ctx: &mut EngineContext, ball: EntityId, snap: &Snapshot) -> Result<bool> {
        let mut next = snap.position + snap.direction;
        let mut direction = snap.direction;
        let max_x = SCREEN_WIDTH - snap.size.x;
        let mut touched = false;

        if next.x < 0.0 || next.x > max_x {
            next.x = next.x.max(0.0).min(max_x);
            direction.x = -direction.x;
            touched = true;
        }
        if next.y < 0.0 || next.y > SCREEN_HEIGHT {
            next.y = next.y.max(0.0).min(SCREEN_HEIGHT);
            direction.y = -direction.y;
            touched = true;
        }

        if touched {
            if let Some(p) = ctx.world.get_mut::<Position>(ball) {
                p.0 = next;
            }
            Self::set_direction(ctx, ball, direction);
            let volume = random_range(&mut ctx.rng, 0.3, 0.8);
            ctx.play_sound(SFX_WALL, volume)?;
        }
        Ok(touched)
    }

    fn touch_player(&self, ctx: &mut EngineContext, ball: EntityId, snap: &Snapshot) -> Result<bool> {
        let Some(paddle) = ctx.world.family(&self.players).first().copied() else {
            return Ok(false);
        };
        let (Some(player), Some(paddle_pos)) = (
            ctx.world.get::<Player>(paddle).copied(),
            ctx.world.get::<Position>(paddle).map(|p| p.0),
        ) else {
            return Ok(false);
        };
        let paddle_size = ctx.world.get::<Size>(paddle).map(|s| s.0).unwrap_or_default();

        let paddle_box = Rect::from_corner(paddle_pos + player.hitbox_offset, player.hitbox);
        let ball_box = Rect::from_corner(snap.position + snap.direction, snap.size);
        if !ball_box.overlaps(&paddle_box) {
            return Ok(false);
        }

        let middle = paddle_pos.x + paddle_size.x * 0.5;
        let direction = Vec2::new(0.2 * (ball_box.center().x - middle), -snap.direction.y);
        Self::set_direction(ctx, ball, direction);
        if let Some(flash) = ctx.world.get_mut::<DebugCollision>(paddle) {
            flash.hit = HIT_TIME;
        }

        ctx.emit(Event::to(EventId::PlayerTouch, paddle))?;
        let volume = random_range(&mut ctx.rng, 0.3, 0.8);
        ctx.play_sound(SFX_PADDLE, volume)?;
        Ok(true)
    }

    fn brick_box(ctx: &EngineContext, brick: EntityId) -> Option<Rect> {
        let position = ctx.world.get::<Position>(brick)?.0;
        let hitbox = ctx.world.get::<Hitbox>(brick)?;
        let bounds = Rect::from_corner(position + hitbox.offset, hitbox.size);
        (!bounds.is_degenerate()).then_some(bounds)
    }

    fn first_brick_hit(&self, ctx: &EngineContext, bricks: &[EntityId], moved: &Rect) -> Option<EntityId> {
        bricks.iter().copied().find(|&brick| {
            ctx.world.matches(brick, &self.bricks)
                && Self::brick_box(ctx, brick).is_some_and(|b| moved.overlaps(&b))
        })
    }

    /// X and Y moves are tested on their own so a corner hit bounces both ways.
    fn touch_brick(&self, ctx: &mut EngineContext, ball: EntityId, snap: &Snapshot) -> Result<bool> {
        let bricks = ctx.world.family(&self.bricks);
        let mut direction = snap.direction;
        let move_x = Rect::from_corner(snap.position + Vec2::new(direction.x, 0.0), snap.size);
        let move_y = Rect::from_corner(snap.position + Vec2::new(0.0, direction.y), snap.size);

        let mut hit = false;
        if let Some(brick) = self.first_brick_hit(ctx, &bricks, &move_x) {
            let event = Event::to(EventId::BrickTouched, brick).with_payload(Payload::Vector(direction));
            ctx.emit(event)?;
            direction.x = -direction.x;
            Self::set_direction(ctx, ball, direction);
            hit = true;
        }
        if let Some(brick) = self.first_brick_hit(ctx, &bricks, &move_y) {
            let event = Event::to(EventId::BrickTouched, brick).with_payload(Payload::Vector(direction));
            ctx.emit(event)?;
            direction.y = -direction.y;
            Self::set_direction(ctx, ball, direction);
            hit = true;
        }

        if hit {
            let volume = random_range(&mut ctx.rng, 0.3, 0.8);
            ctx.play_sound(SFX_BRICK, volume)?;
            ctx.emit(Event::new(EventId::CameraShake))?;
        }
        Ok(hit)
    }

    fn advance(&self, ctx: &mut EngineContext, ball: EntityId) -> Result<()> {
        let Some(snap) = Self::snapshot(ctx, ball) else {
            return Ok(());
        };
        if self.in_dead_zone(ctx, &snap) {
            return ctx.emit(Event::new(EventId::Lose));
        }

        let touched = Self::outside_area(ctx, ball, &snap)?
            || self.touch_player(ctx, ball, &snap)?
            || self.touch_brick(ctx, ball, &snap)?;

        // the last brick going down ends the game and takes the ball with it
        let Some(snap) = Self::snapshot(ctx, ball) else {
            return Ok(());
        };

        if touched {
            let particle = ctx.world.spawn();
            ctx.world.insert(particle, Position(snap.position));
            ctx.world.insert(particle, ImpactParticle);
            ctx.world.insert(particle, StateComponent::default());
        }

        if let Some(p) = ctx.world.get_mut::<Position>(ball) {
            p.0 += snap.direction;
        }
        if let Some(rotation) = ctx.world.get_mut::<Rotation>(ball) {
            rotation.degree += 2.0;
        }
        Ok(())
    }
}

impl Behavior for BallBehavior {
    type State = BallState;

    fn family(&self) -> Family {
        Family::new().with::<Ball>().with::<Position>()
    }

    fn start(&self, _ctx: &EngineContext, _entity: EntityId) -> BallState {
        BallState::Idle
    }

    fn transitions(&self) -> Transitions<BallState> {
        Transitions::new().on(
            BallState::Idle,
            &[EventId::Touched, EventId::Key],
            BallState::Moving,
        )
    }

    /// Aim right away so a launch on the very next frame already has a direction.
    fn enter(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: BallState,
        _event: Option<&Event>,
    ) -> Result<()> {
        if state == BallState::Idle {
            Self::wobble(ctx, entity);
        }
        Ok(())
    }

    fn update(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: BallState,
        _dt: f32,
    ) -> Result<()> {
        match state {
            BallState::Idle => {
                Self::wobble(ctx, entity);
                Ok(())
            }
            BallState::Moving => self.advance(ctx, entity),
        }
    }
}
