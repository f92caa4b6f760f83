//! Predicted contact events and the time-ordered queue
//!
//! An event remembers the collision counters of its participants at the
//! moment it was predicted. If either counter has moved on by the time the
//! event is popped, the prediction was made against a trajectory that no
//! longer exists and the event is dropped.

use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::body::Body;

/// Who takes part in a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Two bodies touch
    Pair { a: usize, b: usize },
    /// Body reaches x = 0 or x = width
    VerticalWall { body: usize },
    /// Body reaches y = 0 or y = height
    HorizontalWall { body: usize },
    /// Body reaches a barrier segment
    Segment { body: usize, segment: usize },
    /// Body's boundary contacts lay past the horizon; predict them again
    Recheck { body: usize },
    /// No-op that keeps the queue non-empty at start-up
    Heartbeat,
}

impl EventKind {
    /// Participant slots: both for a pair, `a` only for a vertical wall,
    /// segment or recheck, `b` only for a horizontal wall, neither for a heartbeat.
    pub fn participants(&self) -> (Option<usize>, Option<usize>) {
        match *self {
            EventKind::Pair { a, b } => (Some(a), Some(b)),
            EventKind::VerticalWall { body } => (Some(body), None),
            EventKind::HorizontalWall { body } => (None, Some(body)),
            EventKind::Segment { body, .. } | EventKind::Recheck { body } => (Some(body), None),
            EventKind::Heartbeat => (None, None),
        }
    }
}

/// A predicted contact at absolute simulation time `time`
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    count_a: u64,
    count_b: u64,
    seq: u64,
}

impl Event {
    /// Create an event, snapshotting the participants' collision counters
    pub fn new(time: f64, kind: EventKind, bodies: &[Body]) -> Self {
        let (a, b) = kind.participants();
        let count = |slot: Option<usize>| slot.map_or(0, |i| bodies[i].collision_count());
        Self {
            time,
            kind,
            count_a: count(a),
            count_b: count(b),
            seq: 0,
        }
    }

    pub fn heartbeat(time: f64) -> Self {
        Self {
            time,
            kind: EventKind::Heartbeat,
            count_a: 0,
            count_b: 0,
            seq: 0,
        }
    }

    /// Finite, not in the past, and no more than `horizon` past `now`
    #[inline]
    pub fn is_valid(&self, now: f64, horizon: f64) -> bool {
        self.time.is_finite() && self.time >= now && self.time - now <= horizon
    }

    /// True if any participant has collided since this event was predicted
    pub fn is_stale(&self, bodies: &[Body]) -> bool {
        let (a, b) = self.kind.participants();
        let moved = |slot: Option<usize>, snapshot: u64| {
            slot.is_some_and(|i| bodies[i].collision_count() != snapshot)
        };
        moved(a, self.count_a) || moved(b, self.count_b)
    }
}

// Ascending time, ties broken by insertion order
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Min-queue of events by time with FIFO tie-breaking
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut event: Event) {
        event.seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(event));
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// One processed event, as recorded in the run trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub time: f64,
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::Shape;
    use glam::DVec2;
    use proptest::prelude::*;

    fn bodies(n: usize) -> Vec<Body> {
        (0..n)
            .map(|id| {
                Body::builder(id, Shape::Circle { radius: 1.0 })
                    .position(DVec2::new(10.0 * id as f64 + 5.0, 5.0))
                    .velocity(DVec2::new(1.0, 0.0))
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_participant_patterns() {
        assert_eq!(EventKind::Pair { a: 1, b: 2 }.participants(), (Some(1), Some(2)));
        assert_eq!(EventKind::VerticalWall { body: 3 }.participants(), (Some(3), None));
        assert_eq!(EventKind::HorizontalWall { body: 3 }.participants(), (None, Some(3)));
        assert_eq!(EventKind::Recheck { body: 4 }.participants(), (Some(4), None));
        assert_eq!(EventKind::Heartbeat.participants(), (None, None));
    }

    #[test]
    fn test_validity_window() {
        let bodies = bodies(1);
        let event = Event::new(5.0, EventKind::VerticalWall { body: 0 }, &bodies);
        assert!(event.is_valid(0.0, 10.0));
        assert!(event.is_valid(5.0, 10.0));
        assert!(!event.is_valid(6.0, 10.0)); // in the past
        assert!(!event.is_valid(0.0, 4.0)); // beyond horizon

        let never = Event::new(f64::INFINITY, EventKind::VerticalWall { body: 0 }, &bodies);
        assert!(!never.is_valid(0.0, f64::MAX));
        let nan = Event::new(f64::NAN, EventKind::VerticalWall { body: 0 }, &bodies);
        assert!(!nan.is_valid(0.0, 10.0));
    }

    #[test]
    fn test_staleness_follows_counters() {
        let mut bodies = bodies(3);
        let pair = Event::new(2.0, EventKind::Pair { a: 0, b: 1 }, &bodies);
        let wall = Event::new(3.0, EventKind::HorizontalWall { body: 2 }, &bodies);
        assert!(!pair.is_stale(&bodies));
        assert!(!wall.is_stale(&bodies));

        bodies[1].bounce_off_vertical_wall();
        assert!(pair.is_stale(&bodies));
        assert!(!wall.is_stale(&bodies));

        // Heartbeats never go stale
        assert!(!Event::heartbeat(0.0).is_stale(&bodies));
    }

    #[test]
    fn test_equal_times_pop_in_insertion_order() {
        let bodies = bodies(3);
        let mut queue = EventQueue::new();
        queue.push(Event::new(1.0, EventKind::VerticalWall { body: 2 }, &bodies));
        queue.push(Event::new(1.0, EventKind::VerticalWall { body: 0 }, &bodies));
        queue.push(Event::heartbeat(0.5));
        queue.push(Event::new(1.0, EventKind::VerticalWall { body: 1 }, &bodies));

        assert_eq!(queue.peek_time(), Some(0.5));
        let order: Vec<EventKind> = std::iter::from_fn(|| queue.pop()).map(|e| e.kind).collect();
        assert_eq!(
            order,
            vec![
                EventKind::Heartbeat,
                EventKind::VerticalWall { body: 2 },
                EventKind::VerticalWall { body: 0 },
                EventKind::VerticalWall { body: 1 },
            ]
        );
        assert!(queue.is_empty());
    }

    proptest! {
        #[test]
        fn prop_queue_pops_non_decreasing(times in proptest::collection::vec(0.0f64..1e6, 1..64)) {
            let mut queue = EventQueue::new();
            for t in &times {
                queue.push(Event::heartbeat(*t));
            }
            prop_assert_eq!(queue.len(), times.len());
            let mut last = f64::NEG_INFINITY;
            while let Some(event) = queue.pop() {
                prop_assert!(event.time >= last);
                last = event.time;
            }
        }
    }
}
