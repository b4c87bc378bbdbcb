//! Steppable construction: a linear history of checkpoints with a cursor.
//!
//! Checkpoint 0 is the seeded state. Every `advance()` clones the checkpoint
//! under the cursor, applies one event and appends the result, discarding
//! any checkpoints past the cursor first.

use serde::Serialize;
use tracing::debug;

use crate::diagram::DiagramBuilder;
use crate::error::{Result, StepError};
use crate::sites::SiteSet;
use crate::sweep::ConstructionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineStatus {
    /// At checkpoint 0 with events still queued.
    Empty,
    Running,
    /// The checkpoint under the cursor is finished.
    Completed,
}

#[derive(Debug, Clone)]
pub struct Engine {
    sites: SiteSet,
    padding: f64,
    checkpoints: Vec<ConstructionState>,
    cursor: usize,
}

impl Engine {
    pub fn new(sites: SiteSet, padding: f64) -> Self {
        let initial = ConstructionState::initial(&sites, padding);
        Self { sites, padding, checkpoints: vec![initial], cursor: 0 }
    }

    pub fn sites(&self) -> &SiteSet {
        &self.sites
    }

    pub fn current(&self) -> &ConstructionState {
        &self.checkpoints[self.cursor]
    }

    pub fn checkpoints(&self) -> &[ConstructionState] {
        &self.checkpoints
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn diagram(&self) -> &DiagramBuilder {
        &self.current().diagram
    }

    pub fn has_next(&self) -> bool {
        !self.current().finished
    }

    pub fn has_prev(&self) -> bool {
        self.cursor > 0
    }

    pub fn status(&self) -> EngineStatus {
        if self.current().finished {
            EngineStatus::Completed
        } else if self.cursor == 0 {
            EngineStatus::Empty
        } else {
            EngineStatus::Running
        }
    }

    /// Processes one event. A no-op once the construction is completed.
    pub fn advance(&mut self) -> EngineStatus {
        let current = &self.checkpoints[self.cursor];
        if current.finished {
            return EngineStatus::Completed;
        }

        let mut next = current.clone();
        next.step(&self.sites, self.padding);

        self.checkpoints.truncate(self.cursor + 1);
        self.checkpoints.push(next);
        self.cursor += 1;

        let status = self.status();
        debug!(cursor = self.cursor, status = ?status, "advanced");
        status
    }

    /// Moves the cursor back one checkpoint without recomputing anything.
    pub fn retreat(&mut self) -> Result<EngineStatus> {
        if self.cursor == 0 {
            return Err(StepError::AtStart.into());
        }
        self.cursor -= 1;
        Ok(self.status())
    }

    /// Processes every remaining event on a single working state and
    /// appends only the finished result.
    pub fn run_to_completion(&mut self) -> EngineStatus {
        if self.current().finished {
            return EngineStatus::Completed;
        }
        let mut state = self.current().clone();
        state.run(&self.sites, self.padding);

        self.checkpoints.truncate(self.cursor + 1);
        self.checkpoints.push(state);
        self.cursor += 1;
        EngineStatus::Completed
    }
}

/// Builds the finished construction without keeping any history.
pub fn run(sites: &SiteSet, padding: f64) -> ConstructionState {
    let mut state = ConstructionState::initial(sites, padding);
    state.run(sites, padding);
    state
}

#[cfg(test)]
mod tests_stepping;
