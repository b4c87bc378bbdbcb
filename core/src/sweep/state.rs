use tracing::debug;

use super::beach_line::{BeachLine, Sweep};
use super::events::{Event, EventKey, EventQueue};
use crate::diagram::DiagramBuilder;
use crate::sites::SiteSet;

/// The event most recently applied to a state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEvent {
    pub key: EventKey,
    pub event: Event,
}

/// Full construction state after some number of events. Cloned to produce
/// the next checkpoint; never shared between checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionState {
    pub beach_line: BeachLine,
    pub queue: EventQueue,
    pub diagram: DiagramBuilder,
    pub last_event: Option<ProcessedEvent>,
    pub sweep_y: f64,
    pub processed: usize,
    pub finished: bool,
}

impl ConstructionState {
    /// Queues a site event per non-dominated site and seeds the beach line
    /// with the first one.
    pub fn initial(sites: &SiteSet, padding: f64) -> Self {
        let mut state = Self {
            beach_line: BeachLine::new(),
            queue: EventQueue::new(),
            diagram: DiagramBuilder::new(),
            last_event: None,
            sweep_y: f64::NEG_INFINITY,
            processed: 0,
            finished: false,
        };
        for site in sites.iter().filter(|s| !sites.is_dominated(s.id)) {
            state.queue.push_site(site);
        }

        if let Some((key, Event::Site { site })) = state.queue.pop_min() {
            state.sweep_y = key.y;
            let mut ctx = Sweep {
                sites,
                queue: &mut state.queue,
                diagram: &mut state.diagram,
                sweep_y: key.y,
            };
            state.beach_line.insert_site(sites.get(site), &mut ctx);
        }

        if !state.queue.has_valid() {
            state.finalize(sites, padding);
        }
        state
    }

    pub fn next_event(&self) -> Option<(&EventKey, &Event)> {
        self.queue.peek()
    }

    /// Applies the next valid event. Returns false when nothing was left to
    /// process. The state is finalized as soon as the queue runs dry.
    pub fn step(&mut self, sites: &SiteSet, padding: f64) -> bool {
        if self.finished {
            return false;
        }

        let processed = loop {
            let Some((key, event)) = self.queue.pop_min() else {
                break None;
            };
            self.sweep_y = key.y;
            let mut ctx = Sweep {
                sites,
                queue: &mut self.queue,
                diagram: &mut self.diagram,
                sweep_y: key.y,
            };

            match &event {
                Event::Site { site } => {
                    let site = sites.get(*site);
                    self.beach_line.insert_site(site, &mut ctx);
                    debug!(site = %site.name, sweep_y = key.y, arcs = self.beach_line.len(), "site event");
                }
                Event::Circle { center, arc, sites: triple, .. } => {
                    if !self.beach_line.is_current(*arc, *triple, &key) {
                        debug!(sweep_y = key.y, "stale circle event skipped");
                        continue;
                    }
                    let vertex = self.beach_line.remove_arc(*arc, *center, &mut ctx);
                    debug!(
                        x = center.x,
                        y = center.y,
                        sweep_y = key.y,
                        vertex = ?vertex,
                        "circle event"
                    );
                }
            }
            break Some(ProcessedEvent { key, event });
        };

        if let Some(processed) = &processed {
            self.last_event = Some(processed.clone());
            self.processed += 1;
        }
        if !self.queue.has_valid() {
            self.finalize(sites, padding);
        }
        processed.is_some()
    }

    /// Clips the remaining open edges. Idempotent.
    pub fn finalize(&mut self, sites: &SiteSet, padding: f64) {
        if self.finished {
            return;
        }
        self.diagram.finalize(sites, padding);
        self.finished = true;
        debug!(
            vertices = self.diagram.circle_vertex_count(),
            half_edges = self.diagram.edges().len(),
            "construction finished"
        );
    }

    /// Processes every remaining event in place.
    pub fn run(&mut self, sites: &SiteSet, padding: f64) {
        while self.step(sites, padding) {}
        self.finalize(sites, padding);
    }
}
