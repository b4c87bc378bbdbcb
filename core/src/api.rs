//! Entry points for collaborators (HTTP handlers, CLIs, tests).

use serde::Deserialize;

use crate::config::CoreConfig;
use crate::diagram::DiagramDescriptor;
use crate::engine;
use crate::error::Result;
use crate::session::{Export, Progress, SessionId, SessionStore, StateSummary};
use crate::sites::{DiagramKind, SiteInput, SiteSet};

/// Body of a construction request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BeginRequest {
    #[serde(default)]
    pub kind: DiagramKind,
    pub sites: Vec<SiteInput>,
}

pub fn begin(store: &SessionStore, sites: &[SiteInput], kind: DiagramKind) -> Result<SessionId> {
    store.create(sites, kind)
}

pub fn step_forward(store: &SessionStore, id: SessionId) -> Result<Progress> {
    store.advance(id)
}

pub fn step_backward(store: &SessionStore, id: SessionId) -> Result<StateSummary> {
    store.retreat(id)
}

pub fn describe(store: &SessionStore, id: SessionId) -> Result<StateSummary> {
    store.describe(id)
}

pub fn end(store: &SessionStore, id: SessionId) -> Result<()> {
    store.delete(id)
}

pub fn export(store: &SessionStore, id: SessionId) -> Result<Export> {
    store.export(id)
}

/// Builds the whole diagram in one go, without a session.
pub fn run_full(sites: &[SiteInput], kind: DiagramKind, config: &CoreConfig) -> Result<DiagramDescriptor> {
    let sites = SiteSet::new(sites, kind, config.max_sites)?;
    let state = engine::run(&sites, config.padding_factor);
    Ok(DiagramDescriptor::build(&sites, &state.diagram))
}
