//! Session store: one engine per session, reclaimed after an idle TTL.
//!
//! The id map and each engine sit behind separate mutexes. The map lock is
//! released before an engine runs, so a slow construction never blocks other
//! sessions.

pub mod summary;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::diagram::{ConstructionScript, DiagramDescriptor};
use crate::engine::{Engine, EngineStatus};
use crate::error::{Result, StepError, VoronoiError};
use crate::sites::{DiagramKind, SiteInput, SiteSet};

pub use summary::{BeachEntry, EventSummary, Marker, StateSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = VoronoiError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| VoronoiError::InvalidInput(format!("bad session id '{}': {}", s, e)))
    }
}

/// Outcome of a forward step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "progress", content = "state")]
pub enum Progress {
    Advanced(StateSummary),
    /// Nothing left to process; the state is unchanged.
    Completed(StateSummary),
}

impl Progress {
    pub fn summary(&self) -> &StateSummary {
        match self {
            Progress::Advanced(s) | Progress::Completed(s) => s,
        }
    }
}

/// Descriptor plus construction script of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Export {
    pub descriptor: DiagramDescriptor,
    pub script: ConstructionScript,
}

impl Export {
    pub fn from_engine(engine: &Engine) -> Self {
        let descriptor = DiagramDescriptor::build(engine.sites(), engine.diagram());
        let script = ConstructionScript::build(&descriptor);
        Self { descriptor, script }
    }
}

pub struct Session {
    pub id: SessionId,
    pub kind: DiagramKind,
    pub engine: Engine,
    pub created_at: Instant,
    pub last_access: Instant,
}

/// Recovers the guard of a poisoned lock. Checkpoints are appended only
/// after an event is fully applied, so the data behind it is consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

type SharedSession = Arc<Mutex<Session>>;

pub struct SessionStore {
    config: CoreConfig,
    sessions: Mutex<HashMap<SessionId, SharedSession>>,
}

impl SessionStore {
    pub fn new(config: CoreConfig) -> Self {
        Self { config, sessions: Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates the input and starts a new construction.
    pub fn create(&self, inputs: &[SiteInput], kind: DiagramKind) -> Result<SessionId> {
        self.purge_expired();

        let sites = SiteSet::new(inputs, kind, self.config.max_sites).map_err(|e| {
            warn!(error = %e, "rejected site set");
            e
        })?;
        if lock(&self.sessions).len() >= self.config.max_sessions {
            warn!(limit = self.config.max_sessions, "session limit reached");
            return Err(VoronoiError::ResourceExhausted(format!(
                "at most {} sessions may be open",
                self.config.max_sessions
            )));
        }

        // Seeding runs outside the map lock.
        let engine = Engine::new(sites, self.config.padding_factor);
        let now = Instant::now();
        let id = SessionId::new();
        let session = Session { id, kind, engine, created_at: now, last_access: now };

        let mut sessions = lock(&self.sessions);
        if sessions.len() >= self.config.max_sessions {
            return Err(VoronoiError::ResourceExhausted(format!(
                "at most {} sessions may be open",
                self.config.max_sessions
            )));
        }
        sessions.insert(id, Arc::new(Mutex::new(session)));
        info!(session = %id, kind = %kind, sites = inputs.len(), "session created");
        Ok(id)
    }

    fn get(&self, id: SessionId) -> Result<SharedSession> {
        self.purge_expired();
        lock(&self.sessions)
            .get(&id)
            .cloned()
            .ok_or_else(|| StepError::UnknownSession(id).into())
    }

    /// Runs `f` on the session's engine with only the session lock held.
    fn with_session<T>(&self, id: SessionId, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let shared = self.get(id)?;
        let mut session = lock(&shared);
        session.last_access = Instant::now();
        f(&mut session)
    }

    pub fn advance(&self, id: SessionId) -> Result<Progress> {
        self.with_session(id, |session| {
            if session.engine.status() == EngineStatus::Completed {
                return Ok(Progress::Completed(StateSummary::of(&session.engine)));
            }
            session.engine.advance();
            Ok(Progress::Advanced(StateSummary::of(&session.engine)))
        })
    }

    pub fn retreat(&self, id: SessionId) -> Result<StateSummary> {
        self.with_session(id, |session| {
            session.engine.retreat()?;
            Ok(StateSummary::of(&session.engine))
        })
    }

    pub fn run_to_completion(&self, id: SessionId) -> Result<StateSummary> {
        self.with_session(id, |session| {
            session.engine.run_to_completion();
            Ok(StateSummary::of(&session.engine))
        })
    }

    pub fn describe(&self, id: SessionId) -> Result<StateSummary> {
        self.with_session(id, |session| Ok(StateSummary::of(&session.engine)))
    }

    /// Only available once the cursor sits on a finished checkpoint.
    pub fn export(&self, id: SessionId) -> Result<Export> {
        self.with_session(id, |session| {
            if session.engine.status() != EngineStatus::Completed {
                return Err(StepError::NotCompleted.into());
            }
            Ok(Export::from_engine(&session.engine))
        })
    }

    pub fn delete(&self, id: SessionId) -> Result<()> {
        match lock(&self.sessions).remove(&id) {
            Some(_) => {
                info!(session = %id, "session deleted");
                Ok(())
            }
            None => Err(StepError::UnknownSession(id).into()),
        }
    }

    /// Drops sessions idle for longer than the configured TTL. Returns how
    /// many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let ttl = self.config.session_ttl();
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|id, shared| {
            // Busy sessions are not idle.
            let session = match shared.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return true,
            };
            let keep = now.saturating_duration_since(session.last_access) < ttl;
            if !keep {
                info!(session = %id, "session expired");
            }
            keep
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests_store;
