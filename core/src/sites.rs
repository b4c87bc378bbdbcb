//! Input sites: validation, labels and dominance for weighted input.

use crate::error::{Result, VoronoiError};
use crate::geometry::{dist, Bounds, Point2, EPSILON};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a site in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub usize);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which diagram the sweep builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiagramKind {
    /// Ordinary Voronoi diagram, weights ignored.
    #[default]
    #[serde(rename = "vd")]
    Ordinary,
    /// Additively weighted diagram: distance to a site is `|p - s| + weight`.
    #[serde(rename = "weighted", alias = "aw_vd")]
    Weighted,
}

impl FromStr for DiagramKind {
    type Err = VoronoiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vd" => Ok(Self::Ordinary),
            "weighted" | "aw_vd" => Ok(Self::Weighted),
            other => Err(VoronoiError::InvalidInput(format!("unknown diagram kind '{}'", other))),
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinary => write!(f, "vd"),
            Self::Weighted => write!(f, "weighted"),
        }
    }
}

/// One site as received from the collaborator layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInput {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub name: String,
}

impl SiteInput {
    pub fn new(x: f64, y: f64, name: &str) -> Self {
        Self { x, y, weight: None, name: name.to_string() }
    }

    pub fn weighted(x: f64, y: f64, weight: f64, name: &str) -> Self {
        Self { x, y, weight: Some(weight), name: name.to_string() }
    }
}

impl From<(f64, f64, &str)> for SiteInput {
    fn from((x, y, name): (f64, f64, &str)) -> Self {
        Self::new(x, y, name)
    }
}

impl From<(f64, f64, f64, &str)> for SiteInput {
    fn from((x, y, weight, name): (f64, f64, f64, &str)) -> Self {
        Self::weighted(x, y, weight, name)
    }
}

/// A validated site. Immutable once construction starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub position: Point2,
    /// Additive weight; always 0 for ordinary diagrams.
    pub weight: f64,
}

impl Site {
    /// Sweep position at which the site event fires (top of the weight circle).
    pub fn event_y(&self) -> f64 {
        self.position.y + self.weight
    }

    /// Higher by y, then by x.
    pub fn is_above(&self, other: &Site) -> bool {
        self.position.y > other.position.y
            || (self.position.y == other.position.y && self.position.x >= other.position.x)
    }

    /// Display string used in step summaries.
    pub fn label(&self) -> String {
        if self.weight > 0.0 {
            format!(
                "{} WS({:.4}, {:.4}, {:.4})",
                self.name, self.position.x, self.position.y, self.weight
            )
        } else {
            format!("{} S({:.4}, {:.4})", self.name, self.position.x, self.position.y)
        }
    }
}

/// The full, validated input of one construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSet {
    kind: DiagramKind,
    sites: Vec<Site>,
    dominated: Vec<bool>,
}

impl SiteSet {
    /// Validates raw input. Rejects empty input, more than `max_sites` sites,
    /// non-finite coordinates, negative weights and duplicates.
    pub fn new(inputs: &[SiteInput], kind: DiagramKind, max_sites: usize) -> Result<Self> {
        if inputs.is_empty() {
            return Err(VoronoiError::InvalidInput("site set is empty".into()));
        }
        if inputs.len() > max_sites {
            return Err(VoronoiError::ResourceExhausted(format!(
                "{} sites exceed the limit of {}",
                inputs.len(),
                max_sites
            )));
        }

        let mut sites: Vec<Site> = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            if !input.x.is_finite() || !input.y.is_finite() {
                return Err(VoronoiError::InvalidInput(format!(
                    "site {} has a non-finite coordinate",
                    index
                )));
            }
            let weight = match kind {
                DiagramKind::Ordinary => 0.0,
                DiagramKind::Weighted => {
                    let w = input.weight.unwrap_or(0.0);
                    if !w.is_finite() || w < 0.0 {
                        return Err(VoronoiError::InvalidInput(format!(
                            "site {} has an invalid weight {}",
                            index, w
                        )));
                    }
                    w
                }
            };
            let position = Point2::new(input.x, input.y);

            if let Some(other) = sites.iter().find(|s| {
                (s.position.x - position.x).abs() <= EPSILON
                    && (s.position.y - position.y).abs() <= EPSILON
                    && (s.weight - weight).abs() <= EPSILON
            }) {
                return Err(VoronoiError::InvalidInput(format!(
                    "site {} duplicates site {} at ({}, {})",
                    index, other.id, input.x, input.y
                )));
            }

            let name = if input.name.trim().is_empty() {
                default_name(index)
            } else {
                input.name.trim().to_string()
            };
            sites.push(Site { id: SiteId(index), name, position, weight });
        }

        let dominated = sites
            .iter()
            .map(|t| {
                sites.iter().any(|s| {
                    s.id != t.id && t.weight + EPSILON >= dist(&s.position, &t.position) + s.weight
                })
            })
            .collect();

        Ok(Self { kind, sites, dominated })
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, id: SiteId) -> &Site {
        &self.sites[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }

    /// A dominated site is at least as far as some other site from every
    /// point, so its region is empty.
    pub fn is_dominated(&self, id: SiteId) -> bool {
        self.dominated[id.0]
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds = Bounds::around(self.sites.iter().map(|s| &s.position))?;
        for s in &self.sites {
            bounds.include(&Point2::new(s.position.x - s.weight, s.position.y - s.weight));
            bounds.include(&Point2::new(s.position.x + s.weight, s.position.y + s.weight));
        }
        Some(bounds)
    }
}

/// "A".."Z", then "S27", "S28", ...
fn default_name(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        format!("S{}", index + 1)
    }
}
