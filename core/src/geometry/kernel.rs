//! Sweep geometry: arc heights, breakpoint positions and circle events.
//!
//! The sweep line moves from -y towards +y. A site `s` of weight `w` owns the
//! parabola with focus `s` and directrix `y = sweep_y - w`, which is the locus
//! of points whose weighted distance `|p - s| + w` equals their distance to
//! the sweep line. The beach line is the upper envelope of these parabolas.

use super::{orientation, Bounds, Point2, Vector2, EPSILON};
use crate::sites::Site;

/// Circle touching three sites at the moment their middle arc vanishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePoint {
    /// The Voronoi vertex.
    pub center: Point2,
    /// Weighted distance from the center to each of the three sites.
    pub radius: f64,
    /// Point where the sweep line touches the circle; its y is the event sweep.
    pub top: Point2,
}

/// Distance from the directrix up to the focus, positive once the arc exists.
#[inline]
fn focal_gap(site: &Site, sweep_y: f64) -> f64 {
    sweep_y - site.weight - site.position.y
}

/// Height of `site`'s arc at `x`. None while the arc is a vertical ray.
pub fn arc_y(site: &Site, x: f64, sweep_y: f64) -> Option<f64> {
    let p = focal_gap(site, sweep_y);
    if p <= EPSILON {
        return None;
    }
    let dx = x - site.position.x;
    let directrix = sweep_y - site.weight;
    Some((site.position.y + directrix) / 2.0 - dx * dx / (2.0 * p))
}

/// x where the arc of `left` hands over to the arc of `right`.
pub fn bisector_x(left: &Site, right: &Site, sweep_y: f64) -> f64 {
    let (a, b) = (&left.position, &right.position);
    let pa = focal_gap(left, sweep_y);
    let pb = focal_gap(right, sweep_y);

    match (pa <= EPSILON, pb <= EPSILON) {
        (true, true) => return (a.x + b.x) / 2.0,
        (true, false) => return a.x,
        (false, true) => return b.x,
        (false, false) => {}
    }

    // f(x) = y_right(x) - y_left(x) = A x^2 + B x + C, crossing upwards at the breakpoint.
    let ka = 1.0 / (2.0 * pa);
    let kb = 1.0 / (2.0 * pb);
    let ha = (a.y + sweep_y - left.weight) / 2.0;
    let hb = (b.y + sweep_y - right.weight) / 2.0;
    let qa = ka * a.x * a.x - ha;
    let qb = kb * b.x * b.x - hb;
    let coef_b = -2.0 * (ka * a.x - kb * b.x);
    let coef_c = qa - qb;

    if (pa - pb).abs() <= EPSILON * (1.0 + pa.max(pb)) {
        if coef_b.abs() <= EPSILON {
            return (a.x + b.x) / 2.0;
        }
        return -coef_c / coef_b;
    }

    let coef_a = ka - kb;
    let disc = (coef_b * coef_b - 4.0 * coef_a * coef_c).max(0.0);
    let root = disc.sqrt();
    if coef_b >= 0.0 {
        let denom = -coef_b - root;
        if denom.abs() <= f64::MIN_POSITIVE {
            return (a.x + b.x) / 2.0;
        }
        2.0 * coef_c / denom
    } else {
        (-coef_b + root) / (2.0 * coef_a)
    }
}

/// Position of the breakpoint between two adjacent arcs. None when both
/// arcs are still vertical rays (the breakpoint is at infinity).
pub fn breakpoint_point(left: &Site, right: &Site, sweep_y: f64) -> Option<Point2> {
    let x = bisector_x(left, right, sweep_y);
    let y = arc_y(left, x, sweep_y).or_else(|| arc_y(right, x, sweep_y))?;
    Some(Point2::new(x, y))
}

fn same_weight(a: &Site, b: &Site) -> bool {
    (a.weight - b.weight).abs() <= EPSILON
}

/// Where the breakpoint between `left` and `right`, observed from
/// `from_sweep` onwards, leaves `bounds`.
///
/// Equal weights give a straight bisector which is clipped directly. Otherwise
/// the hyperbola branch is followed by doubling sweep steps and bisection.
pub fn breakpoint_exit(left: &Site, right: &Site, from_sweep: f64, bounds: &Bounds) -> Option<Point2> {
    let start = breakpoint_point(left, right, from_sweep)?;
    let step = (bounds.diagonal() * 1e-3).max(EPSILON);

    if same_weight(left, right) {
        let ahead = breakpoint_point(left, right, from_sweep + step)?;
        let ab = right.position - left.position;
        let mut direction = Vector2::new(-ab.y, ab.x);
        if direction.dot(&(ahead - start)) < 0.0 {
            direction = -direction;
        }
        return super::clip_ray(bounds.clamp(&start), direction, bounds);
    }

    let inside = |sweep: f64| {
        breakpoint_point(left, right, sweep)
            .filter(|p| p.x.is_finite() && p.y.is_finite() && bounds.contains(p))
    };

    let mut last_inside = from_sweep;
    let mut delta = step;
    let mut outside = None;
    for _ in 0..80 {
        let sweep = from_sweep + delta;
        if inside(sweep).is_some() {
            last_inside = sweep;
            delta *= 2.0;
        } else {
            outside = Some(sweep);
            break;
        }
    }

    let Some(mut hi) = outside else {
        return inside(last_inside).map(|p| bounds.clamp(&p));
    };
    let mut lo = last_inside;
    for _ in 0..64 {
        let mid = (lo + hi) / 2.0;
        if inside(mid).is_some() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    inside(lo).map(|p| bounds.clamp(&p))
}

/// For a breakpoint born at infinity (two arcs that start on the same sweep
/// row), the sweep and point at which it first enters `bounds` from below.
pub fn breakpoint_entry(
    left: &Site,
    right: &Site,
    from_sweep: f64,
    bounds: &Bounds,
) -> Option<(f64, Point2)> {
    let step = (bounds.diagonal() * 1e-3).max(EPSILON);
    let inside = |sweep: f64| {
        breakpoint_point(left, right, sweep)
            .filter(|p| p.x.is_finite() && p.y.is_finite() && bounds.contains(p))
    };

    let mut outside = from_sweep;
    let mut delta = step;
    let mut found = None;
    for _ in 0..80 {
        let sweep = from_sweep + delta;
        if inside(sweep).is_some() {
            found = Some(sweep);
            break;
        }
        outside = sweep;
        delta *= 2.0;
    }

    let mut hi = found?;
    let mut lo = outside;
    for _ in 0..64 {
        let mid = (lo + hi) / 2.0;
        if inside(mid).is_some() {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    inside(hi).map(|p| (hi, bounds.clamp(&p)))
}

/// Circle event for the arc of `b` between `a` and `c`, if the two
/// breakpoints around it converge at or after `sweep_y`.
pub fn circle_event_point(a: &Site, b: &Site, c: &Site, sweep_y: f64) -> Option<CirclePoint> {
    let (pa, pb, pc) = (&a.position, &b.position, &c.position);

    let m11 = 2.0 * (pb.x - pa.x);
    let m12 = 2.0 * (pb.y - pa.y);
    let m21 = 2.0 * (pc.x - pa.x);
    let m22 = 2.0 * (pc.y - pa.y);
    let det = m11 * m22 - m12 * m21;
    let scale = (m11.abs() + m12.abs()) * (m21.abs() + m22.abs());
    if det.abs() <= EPSILON * scale.max(1.0) {
        return None;
    }

    let tolerance = EPSILON * (1.0 + sweep_y.abs()) * 1e3;

    if same_weight(a, b) && same_weight(b, c) {
        if orientation(pa, pb, pc) <= 0.0 {
            return None;
        }
        let v1 = pb.coords.norm_squared() - pa.coords.norm_squared();
        let v2 = pc.coords.norm_squared() - pa.coords.norm_squared();
        let center = Point2::new((v1 * m22 - m12 * v2) / det, (m11 * v2 - m21 * v1) / det);
        let radius = super::dist(&center, pa) + a.weight;
        return settle(center, radius, sweep_y, tolerance);
    }

    // |q - s_i| = r - w_i. Subtracting the equation for `a` makes q linear in r:
    // q = q0 + r * q1.
    let norm_w = |s: &Site| s.position.coords.norm_squared() - s.weight * s.weight;
    let v1 = norm_w(b) - norm_w(a);
    let v2 = norm_w(c) - norm_w(a);
    let u1 = 2.0 * (b.weight - a.weight);
    let u2 = 2.0 * (c.weight - a.weight);
    let solve = |r1: f64, r2: f64| Vector2::new((r1 * m22 - m12 * r2) / det, (m11 * r2 - m21 * r1) / det);
    let q0 = Point2::from(solve(v1, v2));
    let q1 = solve(u1, u2);

    let e = q0 - pa;
    let qa = q1.norm_squared() - 1.0;
    let qb = 2.0 * (e.dot(&q1) + a.weight);
    let qc = e.norm_squared() - a.weight * a.weight;

    let mut radii = Vec::with_capacity(2);
    if qa.abs() <= EPSILON {
        if qb.abs() > EPSILON {
            radii.push(-qc / qb);
        }
    } else {
        let disc = qb * qb - 4.0 * qa * qc;
        if disc >= -EPSILON {
            let root = disc.max(0.0).sqrt();
            radii.push((-qb + root) / (2.0 * qa));
            radii.push((-qb - root) / (2.0 * qa));
        }
    }

    radii
        .into_iter()
        .filter(|r| r.is_finite())
        .filter(|r| [a, b, c].iter().all(|s| r - s.weight >= -EPSILON))
        .filter_map(|r| {
            let center = q0 + q1 * r;
            let event = settle(center, r, sweep_y, tolerance)?;
            let at = event.top.y;
            let slack = 1e-6 * (1.0 + r.abs() + center.coords.amax());
            let left = bisector_x(a, b, at);
            let right = bisector_x(b, c, at);
            let meets = (left - center.x).abs() <= slack && (right - center.x).abs() <= slack;
            (meets && crosses_after(a, b, c, at)).then_some(event)
        })
        .min_by(|p, q| p.top.y.total_cmp(&q.top.y))
}

/// The middle arc only vanishes if its breakpoints have crossed just past
/// the event; a growing arc whose breakpoints merely touch does not.
fn crosses_after(a: &Site, b: &Site, c: &Site, at: f64) -> bool {
    let later = at + 1e-4 * (1.0 + at.abs());
    bisector_x(a, b, later) >= bisector_x(b, c, later)
}

/// Builds the event, rejecting circles whose top lies behind the sweep.
fn settle(center: Point2, radius: f64, sweep_y: f64, tolerance: f64) -> Option<CirclePoint> {
    if !center.x.is_finite() || !center.y.is_finite() || !radius.is_finite() {
        return None;
    }
    let top_y = center.y + radius;
    if top_y < sweep_y - tolerance {
        return None;
    }
    Some(CirclePoint {
        center,
        radius,
        top: Point2::new(center.x, top_y.max(sweep_y)),
    })
}
