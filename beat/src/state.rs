//! Per-entity finite state machines driven by frames and events.
//!
//! A [`StateMachine`] binds a [`Behavior`] to a [`Family`] of entities. Each
//! frame it resolves a start state for newcomers and runs `update` for the
//! others; events listed in the behaviour's [`Transitions`] move entities
//! between states. The current state of every entity is kept by the machine
//! itself, never on the entity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use anyhow::Result;

use crate::components::StateComponent;
use crate::engine::{EngineContext, System};
use crate::event::{Event, EventBus, EventId, EventListener};
use crate::world::{EntityId, Family};

/// `(state, event) -> state` table.
#[derive(Clone, Debug)]
pub struct Transitions<S> {
    table: HashMap<(S, EventId), S>,
}

impl<S> Default for Transitions<S> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<S: Copy + Eq + Hash> Transitions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Go from `from` to `to` on any of `events`.
    #[must_use]
    pub fn on(mut self, from: S, events: &[EventId], to: S) -> Self {
        for id in events {
            self.table.insert((from, *id), to);
        }
        self
    }

    pub fn target(&self, from: S, event: EventId) -> Option<S> {
        self.table.get(&(from, event)).copied()
    }

    /// Every event id the table reacts to, sorted.
    pub fn events(&self) -> Vec<EventId> {
        let mut ids: Vec<_> = self.table.keys().map(|(_, id)| *id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// What a machine does in each of its states.
pub trait Behavior: 'static {
    type State: Copy + Eq + Hash + Debug + 'static;

    /// Entities driven by this behaviour.
    fn family(&self) -> Family;

    /// State a newly seen entity starts in.
    fn start(&self, ctx: &EngineContext, entity: EntityId) -> Self::State;

    fn transitions(&self) -> Transitions<Self::State>;

    /// Called after the state is recorded and its clock reset. `event` is the
    /// event that caused the transition, if any.
    fn enter(
        &self,
        _ctx: &mut EngineContext,
        _entity: EntityId,
        _state: Self::State,
        _event: Option<&Event>,
    ) -> Result<()> {
        Ok(())
    }

    fn update(
        &self,
        _ctx: &mut EngineContext,
        _entity: EntityId,
        _state: Self::State,
        _dt: f32,
    ) -> Result<()> {
        Ok(())
    }

    fn exit(
        &self,
        _ctx: &mut EngineContext,
        _entity: EntityId,
        _state: Self::State,
        _event: Option<&Event>,
    ) -> Result<()> {
        Ok(())
    }
}

pub struct StateMachine<B: Behavior> {
    behavior: B,
    family: Family,
    transitions: Transitions<B::State>,
    current: RefCell<HashMap<EntityId, B::State>>,
}

impl<B: Behavior> StateMachine<B> {
    pub fn new(behavior: B) -> Rc<Self> {
        let family = behavior.family();
        let transitions = behavior.transitions();
        Rc::new(Self {
            behavior,
            family,
            transitions,
            current: RefCell::new(HashMap::new()),
        })
    }

    /// Subscribe the machine to every event its transition table uses.
    pub fn listen(self: &Rc<Self>, bus: &mut EventBus) {
        let listener: Rc<dyn EventListener> = Rc::clone(self) as Rc<dyn EventListener>;
        bus.register(listener, &self.transitions.events());
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Current state of `entity`, if the machine has seen it.
    pub fn state_of(&self, entity: EntityId) -> Option<B::State> {
        self.current.borrow().get(&entity).copied()
    }

    /// Entities the machine currently tracks.
    pub fn tracked(&self) -> usize {
        self.current.borrow().len()
    }

    /// Exit the prior state, record `next`, reset the state clock, enter `next`.
    pub fn go(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        next: B::State,
        event: Option<&Event>,
    ) -> Result<()> {
        let prior = self.state_of(entity);
        if let Some(prior) = prior {
            self.behavior.exit(ctx, entity, prior, event)?;
        }

        self.current.borrow_mut().insert(entity, next);
        if let Some(clock) = ctx.world.get_mut::<StateComponent>(entity) {
            clock.time = 0.0;
        }
        log::debug!("{entity:?}: {prior:?} -> {next:?}");

        self.behavior.enter(ctx, entity, next, event)
    }

    /// One frame: start newcomers, update everyone else, forget leavers.
    pub fn run(&self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        for entity in ctx.world.family(&self.family) {
            // an earlier entity's hooks may have removed this one
            if !ctx.world.matches(entity, &self.family) {
                continue;
            }
            match self.state_of(entity) {
                None => {
                    let start = self.behavior.start(ctx, entity);
                    self.go(ctx, entity, start, None)?;
                }
                Some(state) => self.behavior.update(ctx, entity, state, dt)?,
            }
        }

        let world = &ctx.world;
        let family = &self.family;
        self.current
            .borrow_mut()
            .retain(|entity, _| world.matches(*entity, family));
        Ok(())
    }

    fn dispatch(&self, ctx: &mut EngineContext, event: &Event) -> Result<()> {
        let targets = match event.target {
            Some(target) => vec![target],
            None => ctx.world.family(&self.family),
        };

        for entity in targets {
            if !ctx.world.matches(entity, &self.family) {
                continue;
            }
            let Some(state) = self.state_of(entity) else {
                continue;
            };
            if let Some(next) = self.transitions.target(state, event.id) {
                self.go(ctx, entity, next, Some(event))?;
            }
        }
        Ok(())
    }
}

impl<B: Behavior> EventListener for StateMachine<B> {
    fn on_event(&self, ctx: &mut EngineContext, event: &Event) -> Result<()> {
        self.dispatch(ctx, event)
    }
}

impl<B: Behavior> System for Rc<StateMachine<B>> {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        self.run(ctx, dt)
    }
}

/// Advances every `StateComponent` before the machines run.
#[derive(Clone, Copy, Debug, Default)]
pub struct StateClock;

impl System for StateClock {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        let family = Family::new().with::<StateComponent>();
        for entity in ctx.world.family(&family) {
            if let Some(clock) = ctx.world.get_mut::<StateComponent>(entity) {
                clock.time += dt;
            }
        }
        Ok(())
    }
}
