use nalgebra as na;

pub type Point2 = na::Point2<f64>;
pub type Vector2 = na::Vector2<f64>;

/// Tolerance for collinearity, degenerate arcs and coincident coordinates.
pub const EPSILON: f64 = 1e-9;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point2 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

pub mod kernel;
pub use kernel::*;

pub mod clip;
pub use clip::{clip_ray, Bounds};

/// 2D cross product of `(b - a)` and `(c - b)`.
/// Negative when `a, b, c` turn clockwise.
#[inline]
pub fn orientation(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    let ab = b - a;
    let bc = c - b;
    ab.x * bc.y - ab.y * bc.x
}

pub fn dist(p1: &Point2, p2: &Point2) -> f64 {
    na::distance(p1, p2)
}
