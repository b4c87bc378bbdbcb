pub mod builder;
pub mod export;

pub use builder::{DiagramBuilder, EdgeId, HalfEdge, Vertex, VertexId, VertexKind};
pub use export::{ConstructionScript, DiagramDescriptor, ScriptCommand};
