//! Lines in Hesse normal form and wrap-safe angular statistics.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

const TAU: f32 = 2.0 * PI;

/// A line in Hesse normal form: `x·cos θ + y·sin θ = ρ`.
///
/// Invariants: `rho >= 0` and `theta ∈ [0, 2π)`. [`Line::new`] re-expresses
/// a negative-ρ form by rotating θ half a turn and negating ρ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Normal direction in radians.
    pub theta: f32,
    /// Distance from the origin along the normal, in pixels.
    pub rho: f32,
}

impl Line {
    pub fn new(theta: f32, rho: f32) -> Self {
        let (theta, rho) = if rho < 0.0 {
            (theta + PI, -rho)
        } else {
            (theta, rho)
        };
        Self {
            theta: theta.rem_euclid(TAU),
            rho,
        }
    }
}

/// A point in image coordinates (x right, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Circular mean of the θ values of `lines`.
///
/// When the set straddles the 2π wrap (spread ≥ 4π/3) every angle is first
/// shifted past the wrap, averaged, and the result shifted back, so a set
/// like {6.2, 0.1} averages next to the wrap instead of near π.
pub fn mean_theta(lines: &[Line]) -> f32 {
    debug_assert!(!lines.is_empty());

    let mut sum = 0.0f32;
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for line in lines {
        sum += line.theta;
        min = min.min(line.theta);
        max = max.max(line.theta);
    }

    let mut shift = 0.0f32;
    if max - min >= 4.0 * PI / 3.0 {
        // Pivot just past the largest angle; the extra 1.0 keeps the
        // shifted values clear of the wrap itself.
        shift = TAU - max + 1.0;
        sum = lines.iter().map(|line| (line.theta + shift) % TAU).sum();
    }

    (sum / lines.len() as f32 - shift).rem_euclid(TAU)
}

/// Shorter-arc distance between two angles on the circle.
pub fn difference_theta(theta1: f32, theta2: f32) -> f32 {
    (theta1 - theta2)
        .abs()
        .min(theta1.min(theta2) + TAU - theta1.max(theta2))
}

/// Closed-form intersection of two Hesse normal form lines.
///
/// Returns `None` for parallel lines (`θ₁ == θ₂`).
pub fn intersect_lines(line1: &Line, line2: &Line) -> Option<Point> {
    if line1.theta == line2.theta {
        return None;
    }

    let (sin1, cos1) = line1.theta.sin_cos();
    let (sin2, cos2) = line2.theta.sin_cos();
    let sin_diff = (line2.theta - line1.theta).sin();

    Some(Point {
        x: (line1.rho * sin2 - line2.rho * sin1) / sin_diff,
        y: (line1.rho * cos2 - line2.rho * cos1) / -sin_diff,
    })
}
