pub mod api;
pub mod config;
pub mod diagram;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod session;
pub mod sites;
pub mod sweep;

pub use config::CoreConfig;
pub use error::{Result, StepError, VoronoiError};
pub use session::{Progress, SessionId, SessionStore};
pub use sites::{DiagramKind, SiteInput};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
