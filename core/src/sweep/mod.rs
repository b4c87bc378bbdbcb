//! Fortune sweep: event queue, beach line and the per-checkpoint state.

pub mod beach_line;
pub mod events;
pub mod state;

pub use beach_line::{Arc, ArcId, BeachLine, Breakpoint, BreakpointId, Sign};
pub use events::{Event, EventKey, EventKind, EventQueue};
pub use state::{ConstructionState, ProcessedEvent};

#[cfg(test)]
mod tests_beach_line;
