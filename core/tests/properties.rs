use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use vd_core::diagram::DiagramDescriptor;
use vd_core::engine::{self, Engine};
use vd_core::sites::{DiagramKind, SiteInput, SiteSet};

const PADDING: f64 = 0.25;

// ===================
// Strategies
// ===================

fn point_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-100.0f64..100.0, -100.0f64..100.0)
}

/// Between two and twelve sites, no two closer than 0.01.
fn sites_strategy() -> impl Strategy<Value = Vec<SiteInput>> {
    prop::collection::vec(point_strategy(), 2..12).prop_map(|points| {
        let mut kept: Vec<(f64, f64)> = Vec::new();
        for (x, y) in points {
            if kept.iter().all(|&(kx, ky)| (kx - x).hypot(ky - y) > 0.01) {
                kept.push((x, y));
            }
        }
        kept.into_iter().map(|(x, y)| SiteInput::new(x, y, "")).collect()
    })
}

fn weighted_sites_strategy() -> impl Strategy<Value = Vec<SiteInput>> {
    prop::collection::vec((point_strategy(), 0.0f64..5.0), 2..10).prop_map(|points| {
        let mut kept: Vec<SiteInput> = Vec::new();
        for ((x, y), w) in points {
            if kept.iter().all(|s| (s.x - x).hypot(s.y - y) > 0.01) {
                kept.push(SiteInput::weighted(x, y, w, ""));
            }
        }
        kept
    })
}

fn site_set(inputs: &[SiteInput], kind: DiagramKind) -> Result<SiteSet, TestCaseError> {
    SiteSet::new(inputs, kind, 100).map_err(|e| TestCaseError::fail(e.to_string()))
}

// ===================
// Property Test Functions
// ===================

/// Running twice over the same input yields the same diagram.
fn check_construction_is_deterministic(inputs: &[SiteInput], kind: DiagramKind) -> Result<(), TestCaseError> {
    let sites = site_set(inputs, kind)?;
    let first = engine::run(&sites, PADDING);
    let second = engine::run(&sites, PADDING);
    prop_assert_eq!(
        DiagramDescriptor::build(&sites, &first.diagram),
        DiagramDescriptor::build(&sites, &second.diagram)
    );
    Ok(())
}

/// Single steps until exhaustion reach the same state as a full run.
fn check_stepping_matches_full_run(inputs: &[SiteInput], kind: DiagramKind) -> Result<(), TestCaseError> {
    let sites = site_set(inputs, kind)?;
    let full = engine::run(&sites, PADDING);

    let mut engine = Engine::new(sites, PADDING);
    let mut steps = 0;
    while engine.has_next() {
        engine.advance();
        steps += 1;
        prop_assert!(steps <= 10 * inputs.len() * inputs.len() + 10, "construction does not terminate");
    }
    prop_assert_eq!(engine.current(), &full);
    Ok(())
}

/// Stepping back then forward again reproduces the checkpoint.
fn check_retreat_then_advance_restores(inputs: &[SiteInput], cut: usize) -> Result<(), TestCaseError> {
    let sites = site_set(inputs, DiagramKind::Ordinary)?;
    let mut engine = Engine::new(sites, PADDING);
    for _ in 0..cut {
        engine.advance();
    }
    if !engine.has_prev() {
        return Ok(());
    }
    let before = engine.current().clone();
    engine.retreat().map_err(|e| TestCaseError::fail(e.to_string()))?;
    engine.advance();
    prop_assert_eq!(engine.current(), &before);
    Ok(())
}

/// Every site of an ordinary diagram with two or more sites borders an edge.
fn check_every_region_has_an_edge(inputs: &[SiteInput]) -> Result<(), TestCaseError> {
    let sites = site_set(inputs, DiagramKind::Ordinary)?;
    let state = engine::run(&sites, PADDING);
    let d = DiagramDescriptor::build(&sites, &state.diagram);
    prop_assert_eq!(d.regions.len(), inputs.len());
    if inputs.len() >= 2 {
        prop_assert!(d.regions.iter().all(|r| !r.edges.is_empty()));
    }
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn construction_is_deterministic(inputs in sites_strategy()) {
        check_construction_is_deterministic(&inputs, DiagramKind::Ordinary)?;
    }

    #[test]
    fn weighted_construction_is_deterministic(inputs in weighted_sites_strategy()) {
        check_construction_is_deterministic(&inputs, DiagramKind::Weighted)?;
    }

    #[test]
    fn stepping_matches_full_run(inputs in sites_strategy()) {
        check_stepping_matches_full_run(&inputs, DiagramKind::Ordinary)?;
    }

    #[test]
    fn weighted_stepping_matches_full_run(inputs in weighted_sites_strategy()) {
        check_stepping_matches_full_run(&inputs, DiagramKind::Weighted)?;
    }

    #[test]
    fn retreat_then_advance_restores(inputs in sites_strategy(), cut in 1usize..20) {
        check_retreat_then_advance_restores(&inputs, cut)?;
    }

    #[test]
    fn every_region_has_an_edge(inputs in sites_strategy()) {
        check_every_region_has_an_edge(&inputs)?;
    }
}
