use crate::diagram::DiagramBuilder;
use crate::sites::{DiagramKind, SiteId, SiteInput, SiteSet};
use crate::sweep::beach_line::{BeachLine, Sign, Sweep};
use crate::sweep::events::{Event, EventQueue};
use crate::sweep::state::ConstructionState;

fn site_set(raw: &[(f64, f64)]) -> SiteSet {
    let inputs: Vec<SiteInput> = raw.iter().map(|&(x, y)| SiteInput::new(x, y, "")).collect();
    SiteSet::new(&inputs, DiagramKind::Ordinary, 100).unwrap()
}

fn order(beach: &BeachLine) -> Vec<usize> {
    beach.arcs().map(|(_, arc)| arc.site.0).collect()
}

#[test]
fn test_split_produces_three_arcs() {
    let sites = site_set(&[(0.0, 0.0), (2.0, 4.0)]);
    let mut beach = BeachLine::new();
    let mut queue = EventQueue::new();
    let mut diagram = DiagramBuilder::new();

    let mut ctx = Sweep { sites: &sites, queue: &mut queue, diagram: &mut diagram, sweep_y: 0.0 };
    beach.insert_site(sites.get(SiteId(0)), &mut ctx);
    ctx.sweep_y = 4.0;
    beach.insert_site(sites.get(SiteId(1)), &mut ctx);

    assert_eq!(order(&beach), vec![0, 1, 0]);
    assert_eq!(beach.len(), 3);
    beach.validate(&sites, 4.0).unwrap();

    // Twin half-edges start on the lower arc right below the new site.
    assert_eq!(diagram.edges().len(), 2);
    let start = diagram.edges()[0].start.unwrap();
    assert!((start.x - 2.0).abs() < 1e-9);
    assert!((start.y - 1.5).abs() < 1e-9);

    let signs: Vec<Sign> = beach.breakpoints().map(|(_, bp)| bp.sign).collect();
    assert_eq!(signs, vec![Sign::Minus, Sign::Plus]);
}

#[test]
fn test_locate_ties_go_right() {
    let sites = site_set(&[(0.0, 0.0), (2.0, 4.0)]);
    let mut beach = BeachLine::new();
    let mut queue = EventQueue::new();
    let mut diagram = DiagramBuilder::new();
    let mut ctx = Sweep { sites: &sites, queue: &mut queue, diagram: &mut diagram, sweep_y: 0.0 };
    beach.insert_site(sites.get(SiteId(0)), &mut ctx);
    ctx.sweep_y = 4.0;
    beach.insert_site(sites.get(SiteId(1)), &mut ctx);

    let arcs: Vec<_> = beach.arcs().map(|(id, _)| id).collect();
    // Both breakpoints sit at x = 2 while the new arc is still a ray.
    assert_eq!(beach.locate(2.0, &sites, 4.0), Some(arcs[2]));
    assert_eq!(beach.locate(1.0, &sites, 4.0), Some(arcs[0]));
    // Above the row the middle arc spans [0, 5].
    assert_eq!(beach.locate(2.0, &sites, 5.0), Some(arcs[1]));
}

#[test]
fn test_bottom_row_sites_share_vertical_bisectors() {
    let sites = site_set(&[(0.0, 0.0), (2.0, 0.0), (5.0, 0.0)]);
    let state = {
        let mut s = ConstructionState::initial(&sites, 0.25);
        s.step(&sites, 0.25);
        s.step(&sites, 0.25);
        s
    };
    assert_eq!(order(&state.beach_line), vec![0, 1, 2]);
    state.beach_line.validate(&sites, 1.0).unwrap();
    assert!(state.finished);
    // No circle events for a single row.
    assert_eq!(state.diagram.circle_vertex_count(), 0);
    assert_eq!(state.diagram.edges().len(), 2);
    for edge in state.diagram.edges() {
        let (start, end) = (edge.start.unwrap(), edge.end.unwrap());
        assert!((start.x - end.x).abs() < 1e-9);
        assert!(start.y < end.y);
    }
}

#[test]
fn test_circle_event_removes_middle_arc() {
    let sites = site_set(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)]);
    let mut state = ConstructionState::initial(&sites, 0.25);
    assert_eq!(order(&state.beach_line), vec![0]);

    state.step(&sites, 0.25);
    assert_eq!(order(&state.beach_line), vec![0, 1]);
    state.step(&sites, 0.25);
    assert_eq!(order(&state.beach_line), vec![0, 1, 2, 1]);
    let pending: Vec<_> = state.queue.iter_valid().collect();
    assert_eq!(pending.len(), 1);
    assert!(matches!(pending[0].1, Event::Circle { sites, .. } if *sites == [SiteId(0), SiteId(1), SiteId(2)]));

    state.step(&sites, 0.25);
    assert_eq!(order(&state.beach_line), vec![0, 2, 1]);
    state.beach_line.validate(&sites, 5.0).unwrap();
    assert!(state.finished);
    assert_eq!(state.diagram.circle_vertex_count(), 1);
    let vertex = state.diagram.vertices()[0].point;
    assert!((vertex.x - 2.0).abs() < 1e-9);
    assert!((vertex.y - 1.5).abs() < 1e-9);
}

#[test]
fn test_tree_stays_balanced_under_many_insertions() {
    // Sites on a rising zigzag keep splitting arcs near the right end.
    let raw: Vec<(f64, f64)> = (0..40).map(|i| (i as f64 * 1.5, i as f64 * 0.25 + (i % 3) as f64 * 0.1)).collect();
    let sites = site_set(&raw);
    let mut state = ConstructionState::initial(&sites, 0.25);
    while state.step(&sites, 0.25) {
        if !state.finished {
            state.beach_line.validate(&sites, state.sweep_y + 1e-7).unwrap();
        }
    }
    assert!(state.finished);
    assert!(!state.beach_line.is_empty());
    assert!(state.diagram.circle_vertex_count() > 0);
}
