//! Axis-aligned bounds and ray clipping used to cap unbounded Voronoi edges.

use super::{Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds {
    /// Smallest box containing every point. Returns None for an empty iterator.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self { min: *first, max: *first };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    pub fn include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Grows the box on every side by `factor` times its larger extent,
    /// never by less than `1.0`.
    pub fn padded(&self, factor: f64) -> Self {
        let pad = (self.width().max(self.height()) * factor).max(1.0);
        Self {
            min: Point2::new(self.min.x - pad, self.min.y - pad),
            max: Point2::new(self.max.x + pad, self.max.y + pad),
        }
    }

    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x - EPSILON
            && p.x <= self.max.x + EPSILON
            && p.y >= self.min.y - EPSILON
            && p.y <= self.max.y + EPSILON
    }

    pub fn clamp(&self, p: &Point2) -> Point2 {
        Point2::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }

    pub fn diagonal(&self) -> f64 {
        (self.width() * self.width() + self.height() * self.height()).sqrt()
    }
}

/// Point where a ray leaving `origin` along `direction` crosses the box boundary.
///
/// The origin is expected inside the box. Returns None for a zero direction.
pub fn clip_ray(origin: Point2, direction: Vector2, bounds: &Bounds) -> Option<Point2> {
    if direction.norm_squared() < EPSILON * EPSILON {
        return None;
    }

    // Smallest positive parameter over the four walls.
    let mut t_exit = f64::INFINITY;
    if direction.x > EPSILON {
        t_exit = t_exit.min((bounds.max.x - origin.x) / direction.x);
    } else if direction.x < -EPSILON {
        t_exit = t_exit.min((bounds.min.x - origin.x) / direction.x);
    }
    if direction.y > EPSILON {
        t_exit = t_exit.min((bounds.max.y - origin.y) / direction.y);
    } else if direction.y < -EPSILON {
        t_exit = t_exit.min((bounds.min.y - origin.y) / direction.y);
    }

    if !t_exit.is_finite() {
        return None;
    }
    let t = t_exit.max(0.0);
    Some(origin + direction * t)
}
