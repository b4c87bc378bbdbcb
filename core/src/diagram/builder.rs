//! Vertices and half-edges accumulated while the sweep runs.

use serde::Serialize;
use tracing::warn;

use crate::geometry::{breakpoint_entry, breakpoint_exit, Bounds, Point2};
use crate::sites::{SiteId, SiteSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VertexKind {
    /// Produced by a circle event.
    Circle,
    /// Produced by clipping at completion.
    Boundary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vertex {
    pub point: Point2,
    pub edges: Vec<EdgeId>,
    pub kind: VertexKind,
}

/// One traced side of a Voronoi edge, following a single breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HalfEdge {
    /// Sites on the left and right of the breakpoint that traces the edge.
    pub sites: [SiteId; 2],
    /// None only for the lower half of a bottom-row bisector.
    pub start: Option<Point2>,
    /// None while unbounded.
    pub end: Option<Point2>,
    pub start_vertex: Option<VertexId>,
    pub end_vertex: Option<VertexId>,
    pub twin: Option<EdgeId>,
    /// Sweep position at which the breakpoint appeared.
    pub born_at: f64,
}

impl HalfEdge {
    fn new(sites: [SiteId; 2], start: Option<Point2>, born_at: f64) -> Self {
        Self { sites, start, end: None, start_vertex: None, end_vertex: None, twin: None, born_at }
    }

    pub fn is_closed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn touches(&self, site: SiteId) -> bool {
        self.sites.contains(&site)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramBuilder {
    vertices: Vec<Vertex>,
    edges: Vec<HalfEdge>,
    bounds: Option<Bounds>,
}

impl DiagramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &HalfEdge {
        &self.edges[id.0]
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    /// Set once the diagram has been finalized.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn circle_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.kind == VertexKind::Circle).count()
    }

    fn push_edge(&mut self, edge: HalfEdge) -> EdgeId {
        self.edges.push(edge);
        EdgeId(self.edges.len() - 1)
    }

    fn push_vertex(&mut self, point: Point2, kind: VertexKind) -> VertexId {
        self.vertices.push(Vertex { point, edges: Vec::new(), kind });
        VertexId(self.vertices.len() - 1)
    }

    /// Twin pair born when `inner` splits the arc of `outer` at `start`.
    /// Returns the halves for breakpoints `(outer, inner)` and `(inner, outer)`.
    pub fn open_twins(&mut self, outer: SiteId, inner: SiteId, start: Point2, sweep_y: f64) -> (EdgeId, EdgeId) {
        let left = self.push_edge(HalfEdge::new([outer, inner], Some(start), sweep_y));
        let right = self.push_edge(HalfEdge::new([inner, outer], Some(start), sweep_y));
        self.edges[left.0].twin = Some(right);
        self.edges[right.0].twin = Some(left);
        (left, right)
    }

    /// Bisector of two sites starting on the same sweep row; it comes from infinity.
    pub fn open_vertical(&mut self, left: SiteId, right: SiteId, sweep_y: f64) -> EdgeId {
        self.push_edge(HalfEdge::new([left, right], None, sweep_y))
    }

    pub fn open_from_vertex(&mut self, left: SiteId, right: SiteId, vertex: VertexId, sweep_y: f64) -> EdgeId {
        let point = self.vertices[vertex.0].point;
        let id = self.push_edge(HalfEdge::new([left, right], Some(point), sweep_y));
        self.edges[id.0].start_vertex = Some(vertex);
        self.vertices[vertex.0].edges.push(id);
        id
    }

    pub fn add_circle_vertex(&mut self, point: Point2) -> VertexId {
        self.push_vertex(point, VertexKind::Circle)
    }

    pub fn close_edge(&mut self, edge: EdgeId, vertex: VertexId) {
        let point = self.vertices[vertex.0].point;
        let half = &mut self.edges[edge.0];
        half.end = Some(point);
        half.end_vertex = Some(vertex);
        self.vertices[vertex.0].edges.push(edge);
    }

    /// Reassigns the sites of an edge whose breakpoint changed its left or right arc.
    pub fn retarget(&mut self, edge: EdgeId, sites: [SiteId; 2]) {
        self.edges[edge.0].sites = sites;
    }

    fn cap_end(&mut self, edge: EdgeId, point: Point2) {
        let vertex = self.push_vertex(point, VertexKind::Boundary);
        let half = &mut self.edges[edge.0];
        half.end = Some(point);
        half.end_vertex = Some(vertex);
        self.vertices[vertex.0].edges.push(edge);
    }

    fn cap_start(&mut self, edge: EdgeId, point: Point2) {
        let vertex = self.push_vertex(point, VertexKind::Boundary);
        let half = &mut self.edges[edge.0];
        half.start = Some(point);
        half.start_vertex = Some(vertex);
        self.vertices[vertex.0].edges.push(edge);
    }

    /// Box every finite feature fits in, grown by `padding`.
    fn completion_bounds(&self, sites: &SiteSet, padding: f64) -> Option<Bounds> {
        let mut bounds = sites.bounds()?;
        for v in &self.vertices {
            bounds.include(&v.point);
        }
        for e in &self.edges {
            if let Some(p) = &e.start {
                bounds.include(p);
            }
            if let Some(p) = &e.end {
                bounds.include(p);
            }
        }
        Some(bounds.padded(padding))
    }

    /// Clips every unbounded half-edge against the completion box and caps
    /// it with boundary vertices.
    pub fn finalize(&mut self, sites: &SiteSet, padding: f64) {
        let Some(bounds) = self.completion_bounds(sites, padding) else {
            return;
        };

        for index in 0..self.edges.len() {
            let id = EdgeId(index);
            let edge = &self.edges[index];
            let left = sites.get(edge.sites[0]);
            let right = sites.get(edge.sites[1]);
            let mut from_sweep = edge.born_at;

            if edge.start.is_none() {
                match breakpoint_entry(left, right, from_sweep, &bounds) {
                    Some((sweep, point)) => {
                        from_sweep = sweep;
                        self.cap_start(id, point);
                    }
                    None => {
                        warn!(edge = index, "bottom-row bisector never enters the completion box");
                        continue;
                    }
                }
            }

            if self.edges[index].end.is_none() {
                let exit = breakpoint_exit(left, right, from_sweep, &bounds).or_else(|| {
                    warn!(edge = index, "breakpoint exit not found, clamping to its start");
                    self.edges[index].start.map(|p| bounds.clamp(&p))
                });
                if let Some(point) = exit {
                    self.cap_end(id, point);
                }
            }
        }

        self.bounds = Some(bounds);
    }
}
