//! Publish/subscribe bus with immediate and delayed dispatch.
//!
//! `emit` runs listeners right away and may be called from inside a listener,
//! so a collision can cascade through several state machines within one
//! frame. `emit_later` always waits for a frame boundary: the bus clock only
//! moves in [`EngineContext::flush_events`], and events scheduled while a
//! flush is running are left for the next one.
//!
//! Dispatch helpers live on [`EngineContext`] because listeners need the
//! whole context (world, physics, bus) while they run.

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use crate::engine::EngineContext;
use crate::math::Vec2;
use crate::world::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventId {
    BrickTouched,
    BrickIdle,
    BrickExploded,
    CameraIdle,
    CameraShake,
    PlayerIdle,
    PlayerTouch,
    Win,
    Lose,
    UpdateGate,
    /// Pointer pressed.
    Touched,
    /// Any key pressed.
    Key,
    /// Any key released.
    KeyUp,
    /// Pointer released after a drag.
    Slide,
    /// One chicken of the victory shower.
    DropChicken,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    Vector(Vec2),
    Entity(EntityId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub target: Option<EntityId>,
    pub payload: Payload,
}

impl Event {
    /// Untargeted event: every interested entity reacts.
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            target: None,
            payload: Payload::None,
        }
    }

    pub fn to(id: EventId, target: EntityId) -> Self {
        Self {
            id,
            target: Some(target),
            payload: Payload::None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn vector(&self) -> Option<Vec2> {
        match self.payload {
            Payload::Vector(v) => Some(v),
            _ => None,
        }
    }
}

pub trait EventListener {
    fn on_event(&self, ctx: &mut EngineContext, event: &Event) -> Result<()>;
}

impl<F> EventListener for F
where
    F: Fn(&mut EngineContext, &Event) -> Result<()>,
{
    fn on_event(&self, ctx: &mut EngineContext, event: &Event) -> Result<()> {
        self(ctx, event)
    }
}

/// Wrap a closure as a shareable listener.
pub fn listener<F>(f: F) -> Rc<dyn EventListener>
where
    F: Fn(&mut EngineContext, &Event) -> Result<()> + 'static,
{
    Rc::new(f)
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    at: f64,
    seq: u64,
    event: Event,
}

/// Listener registry plus the delayed-event queue.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventId, Vec<Rc<dyn EventListener>>>,
    queue: Vec<Scheduled>,
    clock: f64,
    next_seq: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to each of `ids`, after the listeners already registered.
    pub fn register(&mut self, listener: Rc<dyn EventListener>, ids: &[EventId]) {
        for id in ids {
            self.listeners
                .entry(*id)
                .or_default()
                .push(Rc::clone(&listener));
        }
    }

    /// Listeners for `id`, in registration order.
    pub fn listeners(&self, id: EventId) -> Vec<Rc<dyn EventListener>> {
        self.listeners.get(&id).cloned().unwrap_or_default()
    }

    /// Queue `event` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, event: Event) {
        let at = self.clock + f64::from(delay.max(0.0));
        self.queue.push(Scheduled {
            at,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    /// Advance the clock and take every event now due, oldest stamp first.
    pub fn advance(&mut self, dt: f32) -> Vec<Event> {
        self.clock += f64::from(dt);
        let clock = self.clock;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|s| s.at <= clock);
        self.queue = pending;

        due.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.event).collect()
    }

    /// Simulation time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl EngineContext {
    /// Dispatch `event` to its listeners now, in registration order.
    pub fn emit(&mut self, event: Event) -> Result<()> {
        let listeners = self.bus.listeners(event.id);
        if listeners.is_empty() {
            return Ok(());
        }
        log::trace!("emit {:?} -> {:?}", event.id, event.target);
        for listener in listeners {
            listener.on_event(self, &event)?;
        }
        Ok(())
    }

    /// Dispatch `event` at the first frame boundary at least `delay` seconds away.
    pub fn emit_later(&mut self, delay: f32, event: Event) {
        self.bus.schedule(delay, event);
    }

    /// Advance the bus clock by `dt` and dispatch the events that came due.
    pub fn flush_events(&mut self, dt: f32) -> Result<()> {
        for event in self.bus.advance(dt) {
            self.emit(event)?;
        }
        Ok(())
    }
}
