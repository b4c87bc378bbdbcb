use super::{run, Engine, EngineStatus};
use crate::error::{StepError, VoronoiError};
use crate::sites::{DiagramKind, SiteInput, SiteSet};

fn triangle() -> SiteSet {
    let inputs = [
        SiteInput::new(0.0, 0.0, "A"),
        SiteInput::new(4.0, 0.0, "B"),
        SiteInput::new(2.0, 4.0, "C"),
    ];
    SiteSet::new(&inputs, DiagramKind::Ordinary, 100).unwrap()
}

#[test]
fn test_three_advances_complete_triangle() {
    let mut engine = Engine::new(triangle(), 0.25);
    assert_eq!(engine.status(), EngineStatus::Empty);
    assert!(engine.has_next());
    assert!(!engine.has_prev());

    assert_eq!(engine.advance(), EngineStatus::Running);
    assert_eq!(engine.advance(), EngineStatus::Running);
    assert_eq!(engine.advance(), EngineStatus::Completed);
    assert!(!engine.has_next());
    assert_eq!(engine.checkpoints().len(), 4);

    // Further advances do nothing.
    assert_eq!(engine.advance(), EngineStatus::Completed);
    assert_eq!(engine.checkpoints().len(), 4);

    let full = run(engine.sites(), 0.25);
    assert_eq!(engine.current(), &full);
}

#[test]
fn test_retreat_at_start_fails_and_leaves_state() {
    let mut engine = Engine::new(triangle(), 0.25);
    let before = engine.current().clone();
    let err = engine.retreat().unwrap_err();
    assert_eq!(err, VoronoiError::InvalidStep(StepError::AtStart));
    assert_eq!(engine.cursor(), 0);
    assert_eq!(engine.current(), &before);
}

#[test]
fn test_advance_then_retreat_restores_state() {
    let mut engine = Engine::new(triangle(), 0.25);
    engine.advance();
    let before = engine.current().clone();

    engine.advance();
    assert_ne!(engine.current(), &before);
    assert_eq!(engine.retreat().unwrap(), EngineStatus::Running);
    assert_eq!(engine.current(), &before);

    // Stepping forward again rebuilds an identical checkpoint.
    let ahead = engine.checkpoints()[2].clone();
    engine.advance();
    assert_eq!(engine.current(), &ahead);
    assert_eq!(engine.checkpoints().len(), 3);
}

#[test]
fn test_retreat_from_completed_reopens() {
    let mut engine = Engine::new(triangle(), 0.25);
    engine.run_to_completion();
    assert_eq!(engine.status(), EngineStatus::Completed);
    assert_eq!(engine.checkpoints().len(), 2);

    engine.retreat().unwrap();
    assert_eq!(engine.status(), EngineStatus::Empty);
    assert!(engine.has_next());
}

#[test]
fn test_single_site_is_complete_immediately() {
    let sites = SiteSet::new(&[SiteInput::new(1.0, 1.0, "A")], DiagramKind::Ordinary, 100).unwrap();
    let mut engine = Engine::new(sites, 0.25);
    assert_eq!(engine.status(), EngineStatus::Completed);
    assert!(!engine.has_next());
    assert_eq!(engine.advance(), EngineStatus::Completed);
    assert!(engine.diagram().edges().is_empty());
    assert!(engine.diagram().vertices().is_empty());
}

#[test]
fn test_stepping_matches_in_place_processing() {
    let inputs: Vec<SiteInput> = [(0.3, 2.0), (4.1, 1.2), (2.2, 5.3), (6.7, 3.9), (1.5, -2.2), (5.0, -0.7)]
        .iter()
        .map(|&(x, y)| SiteInput::new(x, y, ""))
        .collect();
    let sites = SiteSet::new(&inputs, DiagramKind::Ordinary, 100).unwrap();

    let mut engine = Engine::new(sites.clone(), 0.25);
    let mut reference = crate::sweep::ConstructionState::initial(&sites, 0.25);
    while engine.has_next() {
        engine.advance();
        reference.step(&sites, 0.25);
        assert_eq!(engine.current(), &reference);
    }
    assert_eq!(engine.current(), &run(&sites, 0.25));
}
