//! The paddle: input translation, movement and animation.

use anyhow::Result;

use crate::components::{
    Animated, Debugable, Player, PlayerTouch, Position, ShapeToRender, Size,
    StateComponent,
};
use crate::content::SHEET_CHICKEN;
use crate::engine::{EngineContext, System};
use crate::event::{Event, EventId};
use crate::input::Key;
use crate::math::Vec2;
use crate::render::{Color, ShapeKind};
use crate::state::{Behavior, Transitions};
use crate::world::{EntityId, Family};
use crate::SCREEN_WIDTH;

/// Keyboard speed of the paddle, in units per second.
pub const PLAYER_SPEED: f32 = 128.0;

const TOUCH_MARKER_SIZE: Vec2 = Vec2::new(4.0, 4.0);

/// Turns raw input transitions into bus events.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputEvents;

impl System for InputEvents {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if ctx.input.any_key_pressed() {
            ctx.emit(Event::new(EventId::Key))?;
        }
        if ctx.input.any_key_released() {
            ctx.emit(Event::new(EventId::KeyUp))?;
        }
        if ctx.input.is_touch_started() {
            ctx.emit(Event::new(EventId::Touched))?;
        }
        if ctx.input.is_touch_released() {
            ctx.emit(Event::new(EventId::Slide))?;
        }
        Ok(())
    }
}

/// Moves the paddle from the keyboard or a pointer drag.
///
/// While dragging, two debug markers show where the drag started and where
/// the pointer currently is.
#[derive(Clone, Debug, Default)]
pub struct PlayerControl {
    moving_by_touch: bool,
    current: Vec2,
    cursor: Option<EntityId>,
}

impl PlayerControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_marker(ctx: &mut EngineContext, at: Vec2) -> EntityId {
        let marker = ctx.world.spawn();
        ctx.world.insert(marker, Position(at));
        ctx.world.insert(marker, PlayerTouch);
        ctx.world.insert(marker, Debugable);
        ctx.world.insert(marker, Size(TOUCH_MARKER_SIZE));
        ctx.world.insert(
            marker,
            ShapeToRender {
                kind: ShapeKind::Circle,
                color: Color::WHITE,
            },
        );
        marker
    }

    fn drag(&mut self, ctx: &mut EngineContext) -> f32 {
        let pointer = ctx.pointer_world();
        if !self.moving_by_touch {
            self.moving_by_touch = true;
            self.current = pointer;
            Self::spawn_marker(ctx, pointer);
            self.cursor = Some(Self::spawn_marker(ctx, pointer));
            return 0.0;
        }

        let delta = pointer.x - self.current.x;
        self.current = pointer;
        if let Some(p) = self.cursor.and_then(|c| ctx.world.get_mut::<Position>(c)) {
            p.0 = pointer;
        }
        delta
    }

    fn release(&mut self, ctx: &mut EngineContext) {
        if !self.moving_by_touch {
            return;
        }
        let markers: Vec<EntityId> = ctx
            .world
            .query::<PlayerTouch>()
            .into_iter()
            .map(|(e, _)| e)
            .collect();
        for marker in markers {
            ctx.remove_entity(marker);
        }
        self.moving_by_touch = false;
        self.cursor = None;
    }
}

impl System for PlayerControl {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        let family = Family::new().with::<Player>().with::<Position>();
        for player in ctx.world.family(&family) {
            let dx = if ctx.input.is_key_down(Key::Left) {
                -PLAYER_SPEED * dt
            } else if ctx.input.is_key_down(Key::Right) {
                PLAYER_SPEED * dt
            } else if ctx.input.is_touched() {
                self.drag(ctx)
            } else {
                self.release(ctx);
                0.0
            };

            let width = ctx.world.get::<Size>(player).map(|s| s.0.x).unwrap_or(0.0);
            if let Some(p) = ctx.world.get_mut::<Player>(player) {
                p.direction = Vec2::new(dx, 0.0);
            }
            if let Some(p) = ctx.world.get_mut::<Position>(player) {
                let max = (SCREEN_WIDTH - width).max(0.0);
                p.0.x = (p.0.x + dx).clamp(0.0, max);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Move,
}

/// Picks the paddle's clip from whatever moved it last.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerAnimation;

impl PlayerAnimation {
    fn clip_for(ctx: &mut EngineContext, state: PlayerState, event: Option<&Event>) -> &'static str {
        let bounced = event.map(|e| e.id) == Some(EventId::PlayerTouch);
        match state {
            _ if bounced => "bounce",
            PlayerState::Idle => {
                if ctx.rng.bool() {
                    "idle"
                } else {
                    "idle3"
                }
            }
            PlayerState::Move => "idle2",
        }
    }
}

impl Behavior for PlayerAnimation {
    type State = PlayerState;

    fn family(&self) -> Family {
        Family::new()
            .with::<Player>()
            .with::<Animated>()
            .with::<StateComponent>()
    }

    fn start(&self, _ctx: &EngineContext, _entity: EntityId) -> PlayerState {
        PlayerState::Idle
    }

    fn transitions(&self) -> Transitions<PlayerState> {
        Transitions::new()
            .on(
                PlayerState::Idle,
                &[EventId::PlayerIdle, EventId::PlayerTouch],
                PlayerState::Idle,
            )
            .on(
                PlayerState::Idle,
                &[EventId::Key, EventId::Touched],
                PlayerState::Move,
            )
            .on(
                PlayerState::Move,
                &[EventId::KeyUp, EventId::Slide],
                PlayerState::Idle,
            )
            .on(PlayerState::Move, &[EventId::PlayerTouch], PlayerState::Move)
    }

    fn enter(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: PlayerState,
        event: Option<&Event>,
    ) -> Result<()> {
        let clip = Self::clip_for(ctx, state, event);
        let animation = ctx.assets.sheet(SHEET_CHICKEN)?.clip(clip)?;
        if let Some(animated) = ctx.world.get_mut::<Animated>(entity) {
            *animated = Animated::new(animation);
        }
        Ok(())
    }

    fn update(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: PlayerState,
        _dt: f32,
    ) -> Result<()> {
        // MOVE only goes back to IDLE on KeyUp or Slide
        if state != PlayerState::Idle {
            return Ok(());
        }
        let time = ctx
            .world
            .get::<StateComponent>(entity)
            .map(|s| s.time)
            .unwrap_or(0.0);
        let finished = ctx
            .world
            .get::<Animated>(entity)
            .and_then(|a| a.animation.as_ref())
            .is_some_and(|a| a.is_finished(time));
        if finished {
            ctx.emit(Event::to(EventId::PlayerIdle, entity))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateClock, StateMachine};
    use crate::systems::test_context;

    fn spawn_player(ctx: &mut EngineContext, x: f32) -> EntityId {
        let e = ctx.world.spawn();
        ctx.world.insert(e, Player::default());
        ctx.world.insert(e, Position(Vec2::new(x, 25.0)));
        ctx.world.insert(e, Size(Vec2::new(48.0, 32.0)));
        ctx.world.insert(e, StateComponent::default());
        ctx.world.insert(e, Animated::default());
        e
    }

    fn x_of(ctx: &EngineContext, e: EntityId) -> f32 {
        ctx.world.get::<Position>(e).unwrap().0.x
    }

    #[test]
    fn test_keyboard_moves_and_clamps() {
        let mut ctx = EngineContext::headless(1);
        let player = spawn_player(&mut ctx, 40.0);
        let mut control = PlayerControl::new();

        ctx.input.press_key(Key::Left);
        control.update(&mut ctx, 0.125).unwrap();
        assert_eq!(x_of(&ctx, player), 24.0);
        assert_eq!(ctx.world.get::<Player>(player).unwrap().direction.x, -16.0);

        control.update(&mut ctx, 1.0).unwrap();
        assert_eq!(x_of(&ctx, player), 0.0);

        ctx.input.release_key(Key::Left);
        ctx.input.press_key(Key::Right);
        control.update(&mut ctx, 1.0).unwrap();
        assert_eq!(x_of(&ctx, player), SCREEN_WIDTH - 48.0);
    }

    #[test]
    fn test_drag_moves_by_pointer_delta_with_markers() {
        let mut ctx = EngineContext::headless(1);
        let player = spawn_player(&mut ctx, 40.0);
        let mut control = PlayerControl::new();

        ctx.input.press_pointer(Vec2::new(60.0, 100.0));
        control.update(&mut ctx, 0.016).unwrap();
        assert_eq!(x_of(&ctx, player), 40.0);
        assert_eq!(ctx.world.query::<PlayerTouch>().len(), 2);

        ctx.input.move_pointer(Vec2::new(70.0, 100.0));
        control.update(&mut ctx, 0.016).unwrap();
        assert!((x_of(&ctx, player) - 50.0).abs() < 1e-4);

        ctx.input.release_pointer();
        control.update(&mut ctx, 0.016).unwrap();
        assert!(ctx.world.query::<PlayerTouch>().is_empty());
        assert_eq!(ctx.world.get::<Player>(player).unwrap().direction, Vec2::ZERO);
    }

    #[test]
    fn test_input_events_are_emitted_once_per_transition() {
        let mut ctx = EngineContext::headless(1);
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = std::rc::Rc::clone(&seen);
        ctx.bus.register(
            crate::event::listener(move |_, e| {
                log.borrow_mut().push(e.id);
                Ok(())
            }),
            &[EventId::Key, EventId::KeyUp, EventId::Touched, EventId::Slide],
        );

        ctx.input.press_key(Key::Space);
        ctx.input.press_pointer(Vec2::ZERO);
        InputEvents.update(&mut ctx, 0.016).unwrap();
        ctx.input.begin_frame();
        InputEvents.update(&mut ctx, 0.016).unwrap();
        ctx.input.release_key(Key::Space);
        ctx.input.release_pointer();
        InputEvents.update(&mut ctx, 0.016).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![EventId::Key, EventId::Touched, EventId::KeyUp, EventId::Slide]
        );
    }

    #[test]
    fn test_animation_follows_input_and_bounces() {
        let mut ctx = test_context(3);
        let player = spawn_player(&mut ctx, 40.0);
        let machine = StateMachine::new(PlayerAnimation);
        machine.listen(&mut ctx.bus);
        machine.run(&mut ctx, 0.0).unwrap();
        assert_eq!(machine.state_of(player), Some(PlayerState::Idle));

        ctx.emit(Event::new(EventId::Key)).unwrap();
        assert_eq!(machine.state_of(player), Some(PlayerState::Move));
        let sheet = ctx.assets.sheet(SHEET_CHICKEN).unwrap();
        let clip = |ctx: &EngineContext| ctx.world.get::<Animated>(player).unwrap().animation.clone();
        assert_eq!(clip(&ctx), Some(sheet.clip("idle2").unwrap()));

        ctx.emit(Event::to(EventId::PlayerTouch, player)).unwrap();
        assert_eq!(machine.state_of(player), Some(PlayerState::Move));
        assert_eq!(clip(&ctx), Some(sheet.clip("bounce").unwrap()));

        ctx.emit(Event::new(EventId::KeyUp)).unwrap();
        assert_eq!(machine.state_of(player), Some(PlayerState::Idle));
    }

    #[test]
    fn test_finished_clip_restarts_idle() {
        let mut ctx = test_context(3);
        let player = spawn_player(&mut ctx, 40.0);
        let machine = StateMachine::new(PlayerAnimation);
        machine.listen(&mut ctx.bus);
        machine.run(&mut ctx, 0.0).unwrap();
        ctx.emit(Event::to(EventId::PlayerTouch, player)).unwrap();

        // "bounce" lasts 0.3s
        StateClock.update(&mut ctx, 0.5).unwrap();
        machine.run(&mut ctx, 0.5).unwrap();
        assert_eq!(machine.state_of(player), Some(PlayerState::Idle));
        assert_eq!(ctx.world.get::<StateComponent>(player).unwrap().time, 0.0);
        let sheet = ctx.assets.sheet(SHEET_CHICKEN).unwrap();
        let clip = ctx.world.get::<Animated>(player).unwrap().animation.clone();
        assert!(clip == Some(sheet.clip("idle").unwrap()) || clip == Some(sheet.clip("idle3").unwrap()));
    }

    #[test]
    fn test_finished_clip_keeps_moving_paddle_in_move() {
        use crate::event::listener;
        use std::cell::Cell;
        use std::rc::Rc;

        let mut ctx = test_context(3);
        let player = spawn_player(&mut ctx, 40.0);
        let machine = StateMachine::new(PlayerAnimation);
        machine.listen(&mut ctx.bus);
        let idles = Rc::new(Cell::new(0));
        let counter = Rc::clone(&idles);
        ctx.bus.register(
            listener(move |_, _| {
                counter.set(counter.get() + 1);
                Ok(())
            }),
            &[EventId::PlayerIdle],
        );

        machine.run(&mut ctx, 0.0).unwrap();
        ctx.emit(Event::new(EventId::Key)).unwrap();
        ctx.emit(Event::to(EventId::PlayerTouch, player)).unwrap();
        assert_eq!(machine.state_of(player), Some(PlayerState::Move));

        // "bounce" is over, but only a release brings the paddle back to IDLE
        for _ in 0..3 {
            StateClock.update(&mut ctx, 0.5).unwrap();
            machine.run(&mut ctx, 0.5).unwrap();
        }
        assert_eq!(idles.get(), 0);
        assert_eq!(machine.state_of(player), Some(PlayerState::Move));
    }
}
