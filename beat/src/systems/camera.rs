//! Camera follows its holder and shakes briefly on brick hits.

use std::f32::consts::TAU;

use anyhow::Result;

use crate::components::{CameraHolder, Position, StateComponent};
use crate::engine::EngineContext;
use crate::event::{Event, EventId};
use crate::math::Vec2;
use crate::state::{Behavior, Transitions};
use crate::world::{EntityId, Family};

use super::random_range;

/// Length of one shake, in seconds.
pub const SHAKE_DURATION: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraState {
    Idle,
    Shaking,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CameraBehavior;

impl CameraBehavior {
    fn center_on_holder(ctx: &mut EngineContext, holder: EntityId) {
        if let Some(p) = ctx.world.get::<Position>(holder) {
            ctx.camera.position = p.0;
        }
    }
}

impl Behavior for CameraBehavior {
    type State = CameraState;

    fn family(&self) -> Family {
        Family::new()
            .with::<CameraHolder>()
            .with::<Position>()
            .with::<StateComponent>()
    }

    fn start(&self, _ctx: &EngineContext, _entity: EntityId) -> CameraState {
        CameraState::Idle
    }

    fn transitions(&self) -> Transitions<CameraState> {
        Transitions::new()
            .on(CameraState::Idle, &[EventId::CameraShake], CameraState::Shaking)
            .on(CameraState::Shaking, &[EventId::CameraIdle], CameraState::Idle)
    }

    fn enter(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: CameraState,
        _event: Option<&Event>,
    ) -> Result<()> {
        match state {
            CameraState::Idle => Self::center_on_holder(ctx, entity),
            CameraState::Shaking => {
                ctx.emit_later(SHAKE_DURATION, Event::to(EventId::CameraIdle, entity));
                let amplitude = Vec2::new(
                    random_range(&mut ctx.rng, -1.0, 1.0),
                    random_range(&mut ctx.rng, -1.0, 1.0),
                );
                if let Some(holder) = ctx.world.get_mut::<CameraHolder>(entity) {
                    holder.amplitude = amplitude;
                }
            }
        }
        Ok(())
    }

    fn update(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: CameraState,
        _dt: f32,
    ) -> Result<()> {
        match state {
            CameraState::Idle => Self::center_on_holder(ctx, entity),
            CameraState::Shaking => {
                let time = ctx
                    .world
                    .get::<StateComponent>(entity)
                    .map(|s| s.time)
                    .unwrap_or(0.0);
                let amplitude = ctx
                    .world
                    .get::<CameraHolder>(entity)
                    .map(|h| h.amplitude)
                    .unwrap_or_default();
                // displacement accumulates frame over frame
                ctx.camera
                    .translate(amplitude * (TAU * (2.0 * time / SHAKE_DURATION)).sin());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateClock, StateMachine};
    use crate::engine::System;

    fn setup() -> (EngineContext, std::rc::Rc<StateMachine<CameraBehavior>>, EntityId) {
        let mut ctx = EngineContext::headless(5);
        let holder = ctx.world.spawn();
        ctx.world.insert(holder, CameraHolder::default());
        ctx.world.insert(holder, Position(Vec2::new(64.0, 112.0)));
        ctx.world.insert(holder, StateComponent::default());
        let machine = StateMachine::new(CameraBehavior);
        machine.listen(&mut ctx.bus);
        (ctx, machine, holder)
    }

    #[test]
    fn test_idle_camera_tracks_holder() {
        let (mut ctx, machine, holder) = setup();
        ctx.camera.position = Vec2::ZERO;
        machine.run(&mut ctx, 0.0).unwrap();
        assert_eq!(ctx.camera.position, Vec2::new(64.0, 112.0));

        ctx.world.get_mut::<Position>(holder).unwrap().0 = Vec2::new(10.0, 20.0);
        machine.run(&mut ctx, 0.016).unwrap();
        assert_eq!(ctx.camera.position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_shake_randomizes_amplitude_and_returns_to_idle() {
        let (mut ctx, machine, holder) = setup();
        machine.run(&mut ctx, 0.0).unwrap();

        ctx.emit(Event::new(EventId::CameraShake)).unwrap();
        assert_eq!(machine.state_of(holder), Some(CameraState::Shaking));
        let amplitude = ctx.world.get::<CameraHolder>(holder).unwrap().amplitude;
        assert!(amplitude.x.abs() <= 1.0 && amplitude.y.abs() <= 1.0);

        // a second shake while shaking changes nothing
        ctx.emit(Event::new(EventId::CameraShake)).unwrap();
        assert_eq!(
            ctx.world.get::<CameraHolder>(holder).unwrap().amplitude,
            amplitude
        );

        for _ in 0..3 {
            StateClock.update(&mut ctx, 0.05).unwrap();
            machine.run(&mut ctx, 0.05).unwrap();
            ctx.flush_events(0.05).unwrap();
        }
        assert_eq!(machine.state_of(holder), Some(CameraState::Shaking));

        for _ in 0..4 {
            StateClock.update(&mut ctx, 0.05).unwrap();
            machine.run(&mut ctx, 0.05).unwrap();
            ctx.flush_events(0.05).unwrap();
        }
        assert_eq!(machine.state_of(holder), Some(CameraState::Idle));
        assert_eq!(ctx.camera.position, Vec2::new(64.0, 112.0));
    }
}
