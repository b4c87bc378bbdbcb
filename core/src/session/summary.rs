//! Serializable snapshot of one checkpoint for display.

use std::collections::HashSet;

use serde::Serialize;

use crate::engine::{Engine, EngineStatus};
use crate::sites::{DiagramKind, SiteId};
use crate::sweep::{ArcId, BreakpointId, Event, EventKey, EventKind, Sign};

/// Role of a beach-line entry in the upcoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Idle,
    /// Split by the next site event, or a neighbour of the vanishing arc.
    Active,
    /// Removed by the next circle event.
    PendingDeletion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BeachEntry {
    Region {
        site: SiteId,
        name: String,
        /// `<name> S(x, y)` or `<name> WS(x, y, w)`.
        label: String,
        marker: Marker,
    },
    Boundary {
        sites: [SiteId; 2],
        /// `B+(p, q)` or `B-(p, q)`.
        label: String,
        sign: Sign,
        x: f64,
        marker: Marker,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub kind: EventKind,
    /// `S <name>` or `I(x, y)`.
    pub label: String,
    pub sweep_y: f64,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub kind: DiagramKind,
    pub status: EngineStatus,
    pub cursor: usize,
    pub checkpoints: usize,
    /// None before any event has been seen.
    pub sweep_y: Option<f64>,
    pub beach_line: Vec<BeachEntry>,
    pub queue: Vec<EventSummary>,
    pub current_event: Option<EventSummary>,
    pub has_next: bool,
    pub has_prev: bool,
    pub vertices: usize,
    pub edges: usize,
}

#[derive(Default)]
struct Highlights {
    active: HashSet<ArcId>,
    pending_arcs: HashSet<ArcId>,
    pending_breakpoints: HashSet<BreakpointId>,
}

impl StateSummary {
    pub fn of(engine: &Engine) -> Self {
        let state = engine.current();
        let sites = engine.sites();
        let beach = &state.beach_line;

        let mut marks = Highlights::default();
        if let Some((key, event)) = state.next_event() {
            match event {
                Event::Site { site } => {
                    let x = sites.get(*site).position.x;
                    if let Some(arc) = beach.locate(x, sites, key.y) {
                        marks.active.insert(arc);
                    }
                }
                Event::Circle { arc, .. } => {
                    let node = beach.arc(*arc);
                    marks.pending_arcs.insert(*arc);
                    marks.pending_breakpoints.extend(node.left_breakpoint);
                    marks.pending_breakpoints.extend(node.right_breakpoint);
                    marks.active.extend(node.prev());
                    marks.active.extend(node.next());
                }
            }
        }

        let mut entries = Vec::with_capacity(beach.len() * 2);
        for (id, arc) in beach.arcs() {
            let marker = if marks.pending_arcs.contains(&id) {
                Marker::PendingDeletion
            } else if marks.active.contains(&id) {
                Marker::Active
            } else {
                Marker::Idle
            };
            let site = sites.get(arc.site);
            entries.push(BeachEntry::Region {
                site: site.id,
                name: site.name.clone(),
                label: site.label(),
                marker,
            });

            if let Some(bp_id) = arc.right_breakpoint {
                let bp = beach.breakpoint(bp_id);
                let right = sites.get(beach.arc(bp.right_arc).site);
                let marker = if marks.pending_breakpoints.contains(&bp_id) {
                    Marker::PendingDeletion
                } else {
                    Marker::Idle
                };
                entries.push(BeachEntry::Boundary {
                    sites: [site.id, right.id],
                    label: format!("B{}({}, {})", bp.sign.symbol(), site.name, right.name),
                    sign: bp.sign,
                    x: beach.breakpoint_x(bp_id, sites, state.sweep_y),
                    marker,
                });
            }
        }

        let summarize = |key: &EventKey, event: &Event| EventSummary {
            kind: key.kind,
            label: event.display(sites).to_string(),
            sweep_y: key.y,
            x: key.x,
        };

        Self {
            kind: sites.kind(),
            status: engine.status(),
            cursor: engine.cursor(),
            checkpoints: engine.checkpoints().len(),
            sweep_y: Some(state.sweep_y).filter(|y| y.is_finite()),
            beach_line: entries,
            queue: state.queue.iter_valid().map(|(k, e)| summarize(k, e)).collect(),
            current_event: state.last_event.as_ref().map(|p| summarize(&p.key, &p.event)),
            has_next: engine.has_next(),
            has_prev: engine.has_prev(),
            vertices: state.diagram.circle_vertex_count(),
            edges: state.diagram.edges().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{SiteInput, SiteSet};

    fn engine() -> Engine {
        let inputs = [
            SiteInput::new(0.0, 0.0, "A"),
            SiteInput::new(4.0, 0.0, "B"),
            SiteInput::new(2.0, 4.0, "C"),
        ];
        Engine::new(SiteSet::new(&inputs, DiagramKind::Ordinary, 100).unwrap(), 0.25)
    }

    fn region_labels(summary: &StateSummary) -> Vec<String> {
        summary
            .beach_line
            .iter()
            .filter_map(|e| match e {
                BeachEntry::Region { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_summary_marks_split_arc() {
        let summary = StateSummary::of(&engine());
        assert_eq!(summary.status, EngineStatus::Empty);
        assert_eq!(summary.sweep_y, Some(0.0));
        assert_eq!(summary.beach_line.len(), 1);
        assert!(matches!(
            &summary.beach_line[0],
            BeachEntry::Region { name, marker: Marker::Active, .. } if name == "A"
        ));
        assert_eq!(region_labels(&summary), vec!["A S(0.0000, 0.0000)"]);
        let labels: Vec<&str> = summary.queue.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["S B", "S C"]);
        assert!(summary.current_event.is_none());
    }

    #[test]
    fn test_pending_circle_event_marks_arc_and_boundaries() {
        let mut engine = engine();
        engine.advance();
        engine.advance();
        let summary = StateSummary::of(&engine);

        let markers: Vec<Marker> = summary
            .beach_line
            .iter()
            .map(|e| match e {
                BeachEntry::Region { marker, .. } | BeachEntry::Boundary { marker, .. } => *marker,
            })
            .collect();
        use Marker::*;
        // A | B | C | B with the first B about to vanish.
        assert_eq!(
            markers,
            vec![Active, PendingDeletion, PendingDeletion, PendingDeletion, Active, Idle, Idle]
        );

        let labels: Vec<String> = summary
            .beach_line
            .iter()
            .filter_map(|e| match e {
                BeachEntry::Boundary { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["B-(A, B)", "B-(B, C)", "B+(C, B)"]);
        assert_eq!(summary.queue.len(), 1);
        assert_eq!(summary.queue[0].label, "I(2.0000, 1.5000)");
        assert_eq!(summary.queue[0].sweep_y, 4.0);
        assert_eq!(summary.current_event.as_ref().map(|e| e.label.as_str()), Some("S C"));
    }

    #[test]
    fn test_weighted_regions_carry_their_weight() {
        let inputs = [SiteInput::weighted(1.0, 2.0, 0.5, "P"), SiteInput::weighted(6.0, 0.0, 1.0, "Q")];
        let engine = Engine::new(SiteSet::new(&inputs, DiagramKind::Weighted, 100).unwrap(), 0.25);
        let summary = StateSummary::of(&engine);
        // Q tops out at y = 1, before P at y = 2.5.
        assert_eq!(region_labels(&summary), vec!["Q WS(6.0000, 0.0000, 1.0000)"]);
        assert_eq!(summary.queue[0].label, "S P");
    }
}
