//! Line protocol of the driver.
//!
//! Requests are `VERB:payload`, one per line. Replies are a single line
//! `KIND:{json}`; failures are reported as `ERROR_UPDATE:{code, message, severity}`.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use vd_core::api::{self, BeginRequest};
use vd_core::{Result, SessionId, SessionStore, VoronoiError};

/// Format a core error as a JSON reply line.
pub fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": code,
            "message": message,
            "severity": severity
        })
    )
}

fn reply<T: Serialize>(kind: &str, payload: &T) -> String {
    match serde_json::to_string(payload) {
        Ok(json) => format!("{}:{}", kind, json),
        Err(e) => format_error("SERIALIZATION", &e.to_string(), "error"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin(BeginRequest),
    Next(SessionId),
    Prev(SessionId),
    Info(SessionId),
    Export(SessionId),
    End(SessionId),
    Full(BeginRequest),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, payload) = line
            .split_once(':')
            .ok_or_else(|| VoronoiError::InvalidInput(format!("expected VERB:payload, got '{}'", line)))?;

        let request = |payload: &str| -> Result<BeginRequest> {
            serde_json::from_str(payload).map_err(|e| VoronoiError::InvalidInput(e.to_string()))
        };

        match verb {
            "BEGIN" => Ok(Command::Begin(request(payload)?)),
            "FULL" => Ok(Command::Full(request(payload)?)),
            "NEXT" => Ok(Command::Next(payload.parse()?)),
            "PREV" => Ok(Command::Prev(payload.parse()?)),
            "INFO" => Ok(Command::Info(payload.parse()?)),
            "EXPORT" => Ok(Command::Export(payload.parse()?)),
            "END" => Ok(Command::End(payload.parse()?)),
            other => Err(VoronoiError::InvalidInput(format!("unknown command '{}'", other))),
        }
    }
}

/// Runs one command against the store and renders the reply line.
pub fn execute(store: &SessionStore, command: Command) -> String {
    match run(store, command) {
        Ok(line) => line,
        Err(e) => {
            warn!(code = e.code(), "command failed: {}", e);
            format_error(e.code(), &e.to_string(), "error")
        }
    }
}

fn run(store: &SessionStore, command: Command) -> Result<String> {
    match command {
        Command::Begin(req) => {
            let id = api::begin(store, &req.sites, req.kind)?;
            let state = api::describe(store, id)?;
            Ok(reply("SESSION_UPDATE", &json!({ "session": id, "state": state })))
        }
        Command::Next(id) => Ok(reply("STATE_UPDATE", &api::step_forward(store, id)?)),
        Command::Prev(id) => Ok(reply("STATE_UPDATE", &api::step_backward(store, id)?)),
        Command::Info(id) => Ok(reply("STATE_UPDATE", &api::describe(store, id)?)),
        Command::Export(id) => {
            let export = api::export(store, id)?;
            Ok(reply(
                "EXPORT_UPDATE",
                &json!({ "descriptor": export.descriptor, "script": export.script.to_string() }),
            ))
        }
        Command::End(id) => {
            api::end(store, id)?;
            Ok(reply("SESSION_ENDED", &json!({ "session": id })))
        }
        Command::Full(req) => {
            let diagram = api::run_full(&req.sites, req.kind, store.config())?;
            info!(
                sites = req.sites.len(),
                vertices = diagram.circle_vertices(),
                edges = diagram.edges.len(),
                "full construction"
            );
            Ok(reply("DIAGRAM_UPDATE", &diagram))
        }
    }
}
