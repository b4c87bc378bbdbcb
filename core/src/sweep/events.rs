use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::beach_line::ArcId;
use crate::geometry::{CirclePoint, Point2};
use crate::sites::{Site, SiteId, SiteSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EventKind {
    Site = 0,
    Circle = 1,
}

/// Position of an event in sweep order.
///
/// Lower `y` first, then lighter site weight (circle events count as weight
/// 0), then smaller `x`, then sites before circles, then insertion order.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct EventKey {
    pub y: f64,
    pub weight: f64,
    pub x: f64,
    pub kind: EventKind,
    pub seq: u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.weight.total_cmp(&other.weight))
            .then_with(|| self.x.total_cmp(&other.x))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Site {
        site: SiteId,
    },
    Circle {
        center: Point2,
        radius: f64,
        top: Point2,
        /// Left neighbour, vanishing arc's site, right neighbour.
        sites: [SiteId; 3],
        arc: ArcId,
        valid: bool,
    },
}

impl Event {
    pub fn circle(point: CirclePoint, sites: [SiteId; 3], arc: ArcId) -> Self {
        Event::Circle {
            center: point.center,
            radius: point.radius,
            top: point.top,
            sites,
            arc,
            valid: true,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Site { .. } => EventKind::Site,
            Event::Circle { .. } => EventKind::Circle,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Event::Site { .. } => true,
            Event::Circle { valid, .. } => *valid,
        }
    }

    /// `S <name>` for sites, `I(x, y)` for circle events.
    pub fn display(&self, sites: &SiteSet) -> EventDisplay {
        match self {
            Event::Site { site } => EventDisplay::Site(sites.get(*site).name.clone()),
            Event::Circle { center, .. } => EventDisplay::Circle(*center),
        }
    }
}

pub enum EventDisplay {
    Site(String),
    Circle(Point2),
}

impl fmt::Display for EventDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventDisplay::Site(name) => write!(f, "S {}", name),
            EventDisplay::Circle(p) => write!(f, "I({:.4}, {:.4})", p.x, p.y),
        }
    }
}

/// Events ordered by [`EventKey`]. Circle events are invalidated in place
/// and dropped only when they reach the front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventQueue {
    events: BTreeMap<EventKey, Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_key(&mut self, y: f64, weight: f64, x: f64, kind: EventKind) -> EventKey {
        let seq = self.next_seq;
        self.next_seq += 1;
        EventKey { y, weight, x, kind, seq }
    }

    fn push(&mut self, y: f64, weight: f64, x: f64, event: Event) -> EventKey {
        let key = self.next_key(y, weight, x, event.kind());
        self.events.insert(key, event);
        key
    }

    pub fn push_site(&mut self, site: &Site) -> EventKey {
        self.push(site.event_y(), site.weight, site.position.x, Event::Site { site: site.id })
    }

    pub fn push_circle(&mut self, point: CirclePoint, sites: [SiteId; 3], arc: ArcId) -> EventKey {
        self.push(point.top.y, 0.0, point.top.x, Event::circle(point, sites, arc))
    }

    /// Removes and returns the first valid event, discarding invalidated
    /// ones on the way.
    pub fn pop_min(&mut self) -> Option<(EventKey, Event)> {
        while let Some((key, event)) = self.events.pop_first() {
            if event.is_valid() {
                return Some((key, event));
            }
        }
        None
    }

    pub fn peek(&self) -> Option<(&EventKey, &Event)> {
        self.iter_valid().next()
    }

    /// Marks a circle event stale. Returns whether it was live.
    pub fn invalidate(&mut self, key: &EventKey) -> bool {
        match self.events.get_mut(key) {
            Some(Event::Circle { valid, .. }) if *valid => {
                *valid = false;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, key: &EventKey) -> Option<&Event> {
        self.events.get(key)
    }

    /// Live events in sweep order.
    pub fn iter_valid(&self) -> impl Iterator<Item = (&EventKey, &Event)> {
        self.events.iter().filter(|(_, e)| e.is_valid())
    }

    pub fn has_valid(&self) -> bool {
        self.peek().is_some()
    }

    /// Stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
