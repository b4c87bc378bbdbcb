//! Render-agnostic views of a finished diagram: a structured descriptor and
//! a GeoGebra-style construction script.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::builder::{DiagramBuilder, VertexId, VertexKind};
use crate::geometry::{Bounds, Point2};
use crate::sites::{DiagramKind, SiteId, SiteSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDescriptor {
    pub id: SiteId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexDescriptor {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
    pub kind: VertexKind,
}

/// One Voronoi edge. Twin half-edges are merged into a single entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDescriptor {
    pub id: usize,
    pub sites: [SiteId; 2],
    pub start: Option<VertexId>,
    pub end: Option<VertexId>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDescriptor {
    pub site: SiteId,
    pub name: String,
    pub edges: Vec<usize>,
    /// No edge of the region reaches the completion box.
    pub bounded: bool,
    pub dominated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramDescriptor {
    pub kind: DiagramKind,
    pub bounds: Option<Bounds>,
    pub sites: Vec<SiteDescriptor>,
    pub vertices: Vec<VertexDescriptor>,
    pub edges: Vec<EdgeDescriptor>,
    pub regions: Vec<RegionDescriptor>,
}

fn xy(p: &Point2) -> [f64; 2] {
    [p.x, p.y]
}

impl DiagramDescriptor {
    pub fn build(sites: &SiteSet, diagram: &DiagramBuilder) -> Self {
        let vertices = diagram
            .vertices()
            .iter()
            .enumerate()
            .map(|(i, v)| VertexDescriptor { id: VertexId(i), x: v.point.x, y: v.point.y, kind: v.kind })
            .collect();

        let mut edges: Vec<EdgeDescriptor> = Vec::new();
        for (i, half) in diagram.edges().iter().enumerate() {
            match half.twin {
                Some(twin) if twin.0 < i => continue,
                Some(twin) => {
                    let other = diagram.edge(twin);
                    let points = [half.end, half.start, other.end].iter().flatten().map(xy).collect();
                    edges.push(EdgeDescriptor {
                        id: edges.len(),
                        sites: half.sites,
                        start: half.end_vertex,
                        end: other.end_vertex,
                        points,
                    });
                }
                None => {
                    let points = [half.start, half.end].iter().flatten().map(xy).collect();
                    edges.push(EdgeDescriptor {
                        id: edges.len(),
                        sites: half.sites,
                        start: half.start_vertex,
                        end: half.end_vertex,
                        points,
                    });
                }
            }
        }

        let is_boundary =
            |v: Option<VertexId>| v.map_or(true, |id| diagram.vertex(id).kind == VertexKind::Boundary);
        let regions = sites
            .iter()
            .map(|site| {
                let own: Vec<&EdgeDescriptor> = edges.iter().filter(|e| e.sites.contains(&site.id)).collect();
                let bounded = !own.is_empty() && own.iter().all(|e| !is_boundary(e.start) && !is_boundary(e.end));
                RegionDescriptor {
                    site: site.id,
                    name: site.name.clone(),
                    edges: own.iter().map(|e| e.id).collect(),
                    bounded,
                    dominated: sites.is_dominated(site.id),
                }
            })
            .collect();

        Self {
            kind: sites.kind(),
            bounds: diagram.bounds().copied(),
            sites: sites
                .iter()
                .map(|s| SiteDescriptor {
                    id: s.id,
                    name: s.name.clone(),
                    x: s.position.x,
                    y: s.position.y,
                    weight: s.weight,
                })
                .collect(),
            vertices,
            edges,
            regions,
        }
    }

    /// Number of vertices produced by circle events.
    pub fn circle_vertices(&self) -> usize {
        self.vertices.iter().filter(|v| v.kind == VertexKind::Circle).count()
    }

    pub fn region(&self, site: SiteId) -> Option<&RegionDescriptor> {
        self.regions.iter().find(|r| r.site == site)
    }
}

/// One `label = expression` line. Commands without a label are plain
/// statements such as captions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptCommand {
    pub label: Option<String>,
    pub expression: String,
}

impl ScriptCommand {
    fn labelled(label: impl Into<String>, expression: impl Into<String>) -> Self {
        Self { label: Some(label.into()), expression: expression.into() }
    }

    fn statement(expression: impl Into<String>) -> Self {
        Self { label: None, expression: expression.into() }
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} = {}", label, self.expression),
            None => write!(f, "{}", self.expression),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstructionScript {
    pub commands: Vec<ScriptCommand>,
}

impl ConstructionScript {
    /// Site points (with their weight circles), vertices and edge segments.
    pub fn build(descriptor: &DiagramDescriptor) -> Self {
        let mut commands = Vec::new();

        for site in &descriptor.sites {
            let point = format!("p_{{{}}}", site.name);
            let (label_x, label_y) = (format!("p_{{{}x}}", site.name), format!("p_{{{}y}}", site.name));
            commands.push(ScriptCommand::labelled(label_x.clone(), site.x.to_string()));
            commands.push(ScriptCommand::labelled(label_y.clone(), site.y.to_string()));
            commands.push(ScriptCommand::labelled(point.clone(), format!("({}, {})", label_x, label_y)));
            commands.push(ScriptCommand::statement(format!("SetCaption({}, \"{}\")", point, site.name)));
            if site.weight > 0.0 {
                let label_w = format!("p_{{{}w}}", site.name);
                commands.push(ScriptCommand::labelled(label_w.clone(), site.weight.to_string()));
                commands.push(ScriptCommand::labelled(
                    format!("w_{{{}}}", site.name),
                    format!("Circle({}, {})", point, label_w),
                ));
            }
        }

        let mut used = BTreeSet::new();
        for edge in &descriptor.edges {
            used.extend(edge.start);
            used.extend(edge.end);
        }
        for vertex in descriptor.vertices.iter().filter(|v| used.contains(&v.id)) {
            let prefix = match vertex.kind {
                VertexKind::Circle => "v",
                VertexKind::Boundary => "b",
            };
            commands.push(ScriptCommand::labelled(
                format!("{}_{{{}}}", prefix, vertex.id.0),
                format!("({}, {})", vertex.x, vertex.y),
            ));
        }

        let vertex_label = |id: VertexId| {
            let prefix = match descriptor.vertices[id.0].kind {
                VertexKind::Circle => "v",
                VertexKind::Boundary => "b",
            };
            format!("{}_{{{}}}", prefix, id.0)
        };
        // Ordinary bisectors are straight even when twins were merged through
        // their shared start point.
        let straight = |edge: &EdgeDescriptor| descriptor.kind == DiagramKind::Ordinary || edge.points.len() == 2;
        for edge in &descriptor.edges {
            let label = format!("e_{{{}}}", edge.id);
            let expression = match (edge.start, edge.end) {
                (Some(a), Some(b)) if straight(edge) => {
                    format!("Segment({}, {})", vertex_label(a), vertex_label(b))
                }
                _ => {
                    let points: Vec<String> = edge.points.iter().map(|p| format!("({}, {})", p[0], p[1])).collect();
                    format!("Polyline({})", points.join(", "))
                }
            };
            commands.push(ScriptCommand::labelled(label, expression));
        }

        Self { commands }
    }
}

impl fmt::Display for ConstructionScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{}", command)?;
        }
        Ok(())
    }
}
