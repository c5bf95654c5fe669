//! Gates open and close on a fixed period; their hitbox follows the drawing.

use anyhow::Result;

use crate::components::{Animated, AnimatedHitbox, Gate};
use crate::content::{SHEET_GATE, SLICE_GATE};
use crate::engine::EngineContext;
use crate::event::{Event, EventId};
use crate::state::{Behavior, Transitions};
use crate::world::{EntityId, Family};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateState {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GateBehavior;

impl Behavior for GateBehavior {
    type State = GateState;

    fn family(&self) -> Family {
        Family::new().with::<Gate>()
    }

    fn start(&self, ctx: &EngineContext, entity: EntityId) -> GateState {
        match ctx.world.get::<Gate>(entity) {
            Some(gate) if !gate.open => GateState::Closed,
            _ => GateState::Open,
        }
    }

    fn transitions(&self) -> Transitions<GateState> {
        Transitions::new()
            .on(GateState::Open, &[EventId::UpdateGate], GateState::Closed)
            .on(GateState::Closed, &[EventId::UpdateGate], GateState::Open)
    }

    fn enter(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: GateState,
        _event: Option<&Event>,
    ) -> Result<()> {
        let Some(gate) = ctx.world.get::<Gate>(entity).copied() else {
            return Ok(());
        };
        let (clip, hold) = match state {
            GateState::Open => ("open_nr", gate.open_time),
            GateState::Closed => ("close_nr", gate.close_time),
        };

        let sheet = ctx.assets.sheet(SHEET_GATE)?;
        let animation = sheet.clip(clip)?;
        let slices = sheet.slice_clip(SLICE_GATE, clip)?;
        if let Some(animated) = ctx.world.get_mut::<Animated>(entity) {
            *animated = Animated::new(animation);
        }
        if let Some(hitbox) = ctx.world.get_mut::<AnimatedHitbox>(entity) {
            hitbox.slices = Some(slices);
        }

        ctx.emit_later(hold, Event::to(EventId::UpdateGate, entity));
        Ok(())
    }
}
