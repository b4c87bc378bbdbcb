use std::time::{Duration, Instant};

use super::{Progress, SessionId, SessionStore};
use crate::config::CoreConfig;
use crate::engine::EngineStatus;
use crate::error::{StepError, VoronoiError};
use crate::sites::{DiagramKind, SiteInput};

fn triangle() -> Vec<SiteInput> {
    vec![
        SiteInput::new(0.0, 0.0, "A"),
        SiteInput::new(4.0, 0.0, "B"),
        SiteInput::new(2.0, 4.0, "C"),
    ]
}

#[test]
fn test_step_forward_and_back() {
    let store = SessionStore::new(CoreConfig::default());
    let id = store.create(&triangle(), DiagramKind::Ordinary).unwrap();

    let err = store.retreat(id).unwrap_err();
    assert_eq!(err, VoronoiError::InvalidStep(StepError::AtStart));

    let first = store.advance(id).unwrap();
    assert!(matches!(first, Progress::Advanced(_)));
    assert_eq!(first.summary().cursor, 1);

    let back = store.retreat(id).unwrap();
    assert_eq!(back.cursor, 0);
    assert_eq!(back.status, EngineStatus::Empty);

    for _ in 0..3 {
        store.advance(id).unwrap();
    }
    let done = store.advance(id).unwrap();
    assert!(matches!(done, Progress::Completed(_)));
    assert!(!done.summary().has_next);
    assert_eq!(done.summary().vertices, 1);
}

#[test]
fn test_export_requires_completion() {
    let store = SessionStore::new(CoreConfig::default());
    let id = store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    assert_eq!(store.export(id).unwrap_err(), VoronoiError::InvalidStep(StepError::NotCompleted));

    store.run_to_completion(id).unwrap();
    let export = store.export(id).unwrap();
    assert_eq!(export.descriptor.edges.len(), 3);
    assert_eq!(export.descriptor.regions.len(), 3);
    assert!(!export.script.commands.is_empty());
}

#[test]
fn test_unknown_and_deleted_sessions() {
    let store = SessionStore::new(CoreConfig::default());
    let ghost = SessionId::new();
    assert_eq!(
        store.describe(ghost).unwrap_err(),
        VoronoiError::InvalidStep(StepError::UnknownSession(ghost))
    );

    let id = store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    store.delete(id).unwrap();
    assert!(store.advance(id).is_err());
    assert!(store.delete(id).is_err());
    assert!(store.is_empty());
}

#[test]
fn test_session_cap() {
    let config = CoreConfig { max_sessions: 2, ..CoreConfig::default() };
    let store = SessionStore::new(config);
    store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    assert!(matches!(
        store.create(&triangle(), DiagramKind::Ordinary),
        Err(VoronoiError::ResourceExhausted(_))
    ));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_site_cap_and_invalid_input() {
    let config = CoreConfig { max_sites: 2, ..CoreConfig::default() };
    let store = SessionStore::new(config);
    assert!(matches!(
        store.create(&triangle(), DiagramKind::Ordinary),
        Err(VoronoiError::ResourceExhausted(_))
    ));
    assert!(matches!(store.create(&[], DiagramKind::Ordinary), Err(VoronoiError::InvalidInput(_))));
    assert!(store.is_empty());
}

#[test]
fn test_idle_sessions_expire() {
    let config = CoreConfig { session_ttl_secs: 60, ..CoreConfig::default() };
    let store = SessionStore::new(config);
    let id = store.create(&triangle(), DiagramKind::Ordinary).unwrap();

    assert_eq!(store.purge_expired_at(Instant::now()), 0);
    assert_eq!(store.purge_expired_at(Instant::now() + Duration::from_secs(61)), 1);
    assert!(matches!(
        store.describe(id),
        Err(VoronoiError::InvalidStep(StepError::UnknownSession(_)))
    ));
}

#[test]
fn test_sessions_are_isolated() {
    let store = SessionStore::new(CoreConfig::default());
    let a = store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    let b = store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    assert_ne!(a, b);

    store.advance(a).unwrap();
    store.advance(a).unwrap();
    assert_eq!(store.describe(a).unwrap().cursor, 2);
    assert_eq!(store.describe(b).unwrap().cursor, 0);
}

#[test]
fn test_session_id_parsing() {
    let id = SessionId::new();
    assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
    assert!("not-a-uuid".parse::<SessionId>().is_err());
}

#[test]
fn test_concurrent_steps_keep_sessions_consistent() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let scattered: Vec<SiteInput> = (0..20)
        .map(|i| SiteInput::new((i * 7 % 20) as f64 + 0.1 * i as f64, (i * 13 % 17) as f64, ""))
        .collect();
    let store = SessionStore::new(CoreConfig::default());
    let shared = store.create(&scattered, DiagramKind::Ordinary).unwrap();
    let solo = store.create(&triangle(), DiagramKind::Ordinary).unwrap();
    let advanced = AtomicUsize::new(0);
    let retreated = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let (store, advanced, retreated) = (&store, &advanced, &retreated);
            scope.spawn(move || {
                for round in 0..30 {
                    if (round + worker) % 3 == 2 {
                        if let Ok(summary) = store.retreat(shared) {
                            retreated.fetch_add(1, Ordering::SeqCst);
                            assert!(summary.cursor + 1 < summary.checkpoints);
                        }
                    } else if let Progress::Advanced(summary) = store.advance(shared).unwrap() {
                        advanced.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(summary.cursor + 1, summary.checkpoints);
                    }
                }
            });
        }

        scope.spawn(|| {
            let mut steps = 0;
            while let Progress::Advanced(_) = store.advance(solo).unwrap() {
                steps += 1;
            }
            assert_eq!(steps, 3);
            assert_eq!(store.export(solo).unwrap().descriptor.circle_vertices(), 1);
        });
    });

    let summary = store.describe(shared).unwrap();
    assert_eq!(
        summary.cursor,
        advanced.load(Ordering::SeqCst) - retreated.load(Ordering::SeqCst)
    );
    assert!(summary.cursor < summary.checkpoints);

    // Whatever the interleaving, finishing from here matches a fresh run.
    store.run_to_completion(shared).unwrap();
    let fresh = store.create(&scattered, DiagramKind::Ordinary).unwrap();
    store.run_to_completion(fresh).unwrap();
    assert_eq!(store.export(shared).unwrap(), store.export(fresh).unwrap());
}
