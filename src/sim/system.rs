//! Event-driven collision engine
//!
//! The engine owns the bodies and the event queue. Each step pops the
//! earliest event, throws it away if it is stale or out of range, and
//! otherwise drifts every body to the event time, applies the response and
//! re-predicts contacts for the bodies whose velocity changed.
//!
//! Nothing here reads a clock or a global RNG: identical inputs replay the
//! same event trace.

use glam::DVec2;

use super::body::Body;
use super::event::{Event, EventKind, EventQueue, EventRecord};
use super::geometry::Segment;
use super::spawn::build_bodies;
use crate::error::{Result, SimError};
use crate::render::Renderer;
use crate::settings::SimConfig;

/// When a [`CollisionSystem::run`] stops
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunLimits {
    /// Stop after this many processed events
    pub max_events: Option<u64>,
    /// Stop once the next event lies past this simulation time
    pub until: Option<f64>,
}

impl RunLimits {
    pub fn events(max_events: u64) -> Self {
        Self {
            max_events: Some(max_events),
            until: None,
        }
    }

    pub fn until(time: f64) -> Self {
        Self {
            max_events: None,
            until: Some(time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The renderer asked to stop
    Cancelled,
    EventLimit,
    TimeLimit,
    /// No valid event left to process
    Exhausted,
}

/// Outcome of a [`CollisionSystem::run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    /// Events processed during this run
    pub events: u64,
    /// Stale or out-of-range events dropped during this run
    pub discarded: u64,
    /// Simulation time when the run stopped
    pub time: f64,
}

/// The simulation engine
#[derive(Debug)]
pub struct CollisionSystem {
    time: f64,
    horizon: f64,
    bodies: Vec<Body>,
    segments: Vec<Segment>,
    queue: EventQueue,
    trace: Option<Vec<EventRecord>>,
    processed: u64,
    discarded: u64,
}

impl CollisionSystem {
    /// Create an engine and schedule the initial contacts.
    ///
    /// Body ids must equal their index in `bodies`.
    pub fn new(bodies: Vec<Body>, segments: Vec<Segment>, horizon: f64) -> Result<Self> {
        if horizon.is_nan() || horizon <= 0.0 {
            return Err(SimError::config("horizon must be > 0"));
        }
        if let Some((i, body)) = bodies.iter().enumerate().find(|(i, b)| b.id != *i) {
            return Err(SimError::config(format!(
                "body at index {i} has id {}; ids must match positions",
                body.id
            )));
        }
        if segments.iter().any(|s| !s.start.is_finite() || !s.end.is_finite() || s.length() == 0.0) {
            return Err(SimError::config("segment endpoints must be finite and distinct"));
        }

        let mut system = Self {
            time: 0.0,
            horizon,
            bodies,
            segments,
            queue: EventQueue::new(),
            trace: None,
            processed: 0,
            discarded: 0,
        };
        system.populate();

        log::info!(
            "Collision system ready: {} bodies, {} segments, {} events queued",
            system.bodies.len(),
            system.segments.len(),
            system.queue.len()
        );
        Ok(system)
    }

    /// Build bodies from `config` and create an engine for them
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let bodies = build_bodies(config)?;
        let mut system = Self::new(bodies, config.segments.clone(), config.horizon)?;
        system.set_record_trace(config.record_trace);
        log::info!("Seed {}", config.seed);
        Ok(system)
    }

    // === Accessors ===

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Read-only view of the bodies for drawing and inspection
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Queued events, stale ones included
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn events_processed(&self) -> u64 {
        self.processed
    }

    pub fn events_discarded(&self) -> u64 {
        self.discarded
    }

    /// Start or stop keeping processed events. Stopping drops the trace.
    pub fn set_record_trace(&mut self, record: bool) {
        match (record, self.trace.is_some()) {
            (true, false) => self.trace = Some(Vec::new()),
            (false, true) => self.trace = None,
            _ => {}
        }
    }

    pub fn trace(&self) -> Option<&[EventRecord]> {
        self.trace.as_deref()
    }

    /// Take the recorded trace, leaving an empty one if recording is on
    pub fn take_trace(&mut self) -> Vec<EventRecord> {
        match self.trace.as_mut() {
            Some(trace) => std::mem::take(trace),
            None => Vec::new(),
        }
    }

    /// Total kinetic energy of the movable bodies
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Total momentum of the movable bodies
    pub fn momentum(&self) -> DVec2 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    // === Stepping ===

    /// Process the next valid event, dropping stale ones on the way.
    ///
    /// Returns `None` once the queue has nothing left.
    pub fn step(&mut self) -> Result<Option<EventRecord>> {
        self.step_before(f64::INFINITY)
    }

    /// Process every event up to `target`, then drift all bodies to it.
    /// Returns the number of events processed.
    pub fn advance_to(&mut self, target: f64) -> Result<u64> {
        if !target.is_finite() {
            return Err(SimError::config("target time must be finite"));
        }
        if target < self.time {
            return Err(SimError::config(format!(
                "target time {target} is before the current time {}",
                self.time
            )));
        }

        let start = self.processed;
        while self.step_before(target)?.is_some() {}
        self.drift_to(target);
        Ok(self.processed - start)
    }

    /// Drive the simulation, drawing every body after each processed event.
    ///
    /// Cancellation is polled before each step.
    pub fn run<R: Renderer + ?Sized>(&mut self, renderer: &mut R, limits: RunLimits) -> Result<RunSummary> {
        let (start_processed, start_discarded) = (self.processed, self.discarded);
        let until = limits.until.unwrap_or(f64::INFINITY);

        let reason = loop {
            if renderer.poll_cancelled() {
                break StopReason::Cancelled;
            }
            if limits
                .max_events
                .is_some_and(|max| self.processed - start_processed >= max)
            {
                break StopReason::EventLimit;
            }

            if self.step_before(until)?.is_some() {
                for body in &self.bodies {
                    renderer.draw_body(body);
                }
                renderer.end_frame(self.time);
            } else if self.queue.is_empty() {
                break StopReason::Exhausted;
            } else {
                self.drift_to(until);
                break StopReason::TimeLimit;
            }
        };

        let summary = RunSummary {
            reason,
            events: self.processed - start_processed,
            discarded: self.discarded - start_discarded,
            time: self.time,
        };
        log::info!(
            "Run stopped ({:?}) at t={:.4}: {} events, {} discarded",
            summary.reason,
            summary.time,
            summary.events,
            summary.discarded
        );
        Ok(summary)
    }

    // === Internal helpers ===

    /// Heartbeat first, then every body's walls and segments, then every pair
    fn populate(&mut self) {
        self.queue.push(Event::heartbeat(self.time));

        for i in 0..self.bodies.len() {
            self.predict_boundaries(i);
        }
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let dt = self.bodies[i].time_to_hit(&self.bodies[j]);
                self.schedule(dt, EventKind::Pair { a: i, b: j });
            }
        }
    }

    /// Fresh predictions for a body whose velocity just changed
    fn predict(&mut self, i: usize) {
        if self.bodies[i].immovable {
            return;
        }
        for j in 0..self.bodies.len() {
            if j == i {
                continue;
            }
            let dt = self.bodies[i].time_to_hit(&self.bodies[j]);
            let (a, b) = if i < j { (i, j) } else { (j, i) };
            self.schedule(dt, EventKind::Pair { a, b });
        }
        self.predict_boundaries(i);
    }

    fn predict_boundaries(&mut self, i: usize) {
        let body = &self.bodies[i];
        let vertical = body.time_to_hit_vertical_wall();
        let horizontal = body.time_to_hit_horizontal_wall();
        let segment_times: Vec<f64> = self
            .segments
            .iter()
            .map(|segment| body.time_to_hit_segment(segment))
            .collect();

        let earliest = segment_times.iter().copied().fold(vertical.min(horizontal), f64::min);

        self.schedule(vertical, EventKind::VerticalWall { body: i });
        self.schedule(horizontal, EventKind::HorizontalWall { body: i });
        for (segment, dt) in segment_times.into_iter().enumerate() {
            self.schedule(dt, EventKind::Segment { body: i, segment });
        }

        // A moving body always has a boundary ahead. If it lies past the
        // horizon, look again before the body can get there unobserved.
        if earliest.is_finite() && earliest > self.horizon {
            self.schedule(self.horizon / 2.0, EventKind::Recheck { body: i });
        }
    }

    /// Queue an event `dt` from now if it is actionable
    fn schedule(&mut self, dt: f64, kind: EventKind) {
        let event = Event::new(self.time + dt, kind, &self.bodies);
        if event.is_valid(self.time, self.horizon) {
            log::trace!("Predicted {:?} at t={:.6}", kind, event.time);
            self.queue.push(event);
        }
    }

    /// Process the next valid event at or before `limit`
    fn step_before(&mut self, limit: f64) -> Result<Option<EventRecord>> {
        while let Some(next) = self.queue.peek_time() {
            if next > limit {
                return Ok(None);
            }
            let Some(event) = self.queue.pop() else {
                break;
            };

            if !event.is_valid(self.time, self.horizon) || event.is_stale(&self.bodies) {
                self.discarded += 1;
                log::trace!("Discarded {:?} at t={:.6}", event.kind, event.time);
                continue;
            }

            return self.process(event).map(Some);
        }
        Ok(None)
    }

    fn process(&mut self, event: Event) -> Result<EventRecord> {
        self.drift_to(event.time);

        match event.kind {
            EventKind::Pair { a, b } => {
                let (first, second) = pair_mut(&mut self.bodies, a, b);
                first.bounce_off(second)?;
                self.predict(a);
                self.predict(b);
            }
            EventKind::VerticalWall { body } => {
                self.bodies[body].bounce_off_vertical_wall();
                self.predict(body);
            }
            EventKind::HorizontalWall { body } => {
                self.bodies[body].bounce_off_horizontal_wall();
                self.predict(body);
            }
            EventKind::Segment { body, segment } => {
                self.bodies[body].bounce_off_segment(&self.segments[segment]);
                self.predict(body);
            }
            EventKind::Recheck { body } => self.predict(body),
            EventKind::Heartbeat => {}
        }

        self.processed += 1;
        let record = EventRecord {
            time: self.time,
            kind: event.kind,
        };
        if let Some(trace) = self.trace.as_mut() {
            trace.push(record);
        }
        log::debug!("t={:.6} {:?}", record.time, record.kind);
        Ok(record)
    }

    /// Move every body linearly to `target`
    fn drift_to(&mut self, target: f64) {
        let dt = target - self.time;
        if dt > 0.0 {
            for body in &mut self.bodies {
                body.move_by(dt);
            }
            self.time = target;
        }
    }
}

/// Two distinct bodies borrowed mutably, in the order asked for
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = bodies.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
