//! Bezier curve primitives and adaptive flattening.

use glam::Vec2;

/// Recursion depth cap for [`CubicBezier::flatten`].
pub const MAX_FLATTEN_DEPTH: u32 = 10;

/// A quadratic Bezier curve (one control point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    /// Start point
    pub from: Vec2,
    /// Control point
    pub control: Vec2,
    /// End point
    pub to: Vec2,
}

impl QuadraticBezier {
    /// Create a new quadratic Bezier curve.
    pub fn new(from: Vec2, control: Vec2, to: Vec2) -> Self {
        Self { from, control, to }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        self.from * (mt * mt) + self.control * (2.0 * mt * t) + self.to * (t * t)
    }

    /// Exact degree elevation to a cubic.
    pub fn to_cubic(&self) -> CubicBezier {
        CubicBezier::new(
            self.from,
            self.from + (self.control - self.from) * (2.0 / 3.0),
            self.to + (self.control - self.to) * (2.0 / 3.0),
            self.to,
        )
    }
}

/// A cubic Bezier curve (two control points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// Start point
    pub from: Vec2,
    /// First control point
    pub control1: Vec2,
    /// Second control point
    pub control2: Vec2,
    /// End point
    pub to: Vec2,
}

impl CubicBezier {
    /// Create a new cubic Bezier curve.
    pub fn new(from: Vec2, control1: Vec2, control2: Vec2, to: Vec2) -> Self {
        Self {
            from,
            control1,
            control2,
            to,
        }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.from * mt3
            + self.control1 * (3.0 * mt2 * t)
            + self.control2 * (3.0 * mt * t2)
            + self.to * t3
    }

    /// Split the curve at parameter t (de Casteljau), returning two curves.
    pub fn split(&self, t: f32) -> (Self, Self) {
        let p01 = self.from.lerp(self.control1, t);
        let p12 = self.control1.lerp(self.control2, t);
        let p23 = self.control2.lerp(self.to, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let p0123 = p012.lerp(p123, t);

        (
            Self::new(self.from, p01, p012, p0123),
            Self::new(p0123, p123, p23, self.to),
        )
    }

    /// Whether the control polygon is within `tolerance` of the chord.
    ///
    /// Compares the summed (unnormalised) perpendicular distances of both
    /// control points against the chord, squared, with `tolerance * |chord|²`.
    /// A curve whose endpoints coincide is never flat.
    pub fn is_flat(&self, tolerance: f32) -> bool {
        let chord = self.to - self.from;
        let d2 = (self.control1 - self.to).perp_dot(chord).abs();
        let d3 = (self.control2 - self.to).perp_dot(chord).abs();

        (d2 + d3) * (d2 + d3) < tolerance * chord.length_squared()
    }

    /// Flatten into line segments by recursive midpoint subdivision.
    ///
    /// `emit` receives every segment endpoint in order (the start point is
    /// not emitted). The boolean is `true` only for the curve's own end
    /// point, which is a corner; interior points are smooth. Subdivision
    /// stops at [`MAX_FLATTEN_DEPTH`] even if the piece is not yet flat.
    pub fn flatten(&self, tolerance: f32, mut emit: impl FnMut(Vec2, bool)) {
        // Worklist instead of recursion; the right half is pushed first so
        // that pieces pop in curve order.
        let mut stack: Vec<(CubicBezier, u32, bool)> = vec![(*self, 0, true)];

        while let Some((curve, depth, is_end)) = stack.pop() {
            if depth >= MAX_FLATTEN_DEPTH || curve.is_flat(tolerance) {
                emit(curve.to, is_end);
                continue;
            }

            let (left, right) = curve.split(0.5);
            stack.push((right, depth + 1, is_end));
            stack.push((left, depth + 1, false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flattened(curve: &CubicBezier, tolerance: f32) -> Vec<(Vec2, bool)> {
        let mut out = Vec::new();
        curve.flatten(tolerance, |p, corner| out.push((p, corner)));
        out
    }

    #[test]
    fn test_cubic_endpoints() {
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(25.0, 100.0),
            Vec2::new(75.0, 100.0),
            Vec2::new(100.0, 0.0),
        );

        assert_eq!(curve.eval(0.0), curve.from);
        assert_eq!(curve.eval(1.0), curve.to);
    }

    #[test]
    fn test_split_meets_at_midpoint() {
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(25.0, 100.0),
            Vec2::new(75.0, 100.0),
            Vec2::new(100.0, 0.0),
        );

        let (left, right) = curve.split(0.5);
        let midpoint = curve.eval(0.5);

        assert!((left.to - midpoint).length() < 0.001);
        assert!((right.from - midpoint).length() < 0.001);
    }

    #[test]
    fn test_quadratic_to_cubic_matches() {
        let quad = QuadraticBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let cubic = quad.to_cubic();

        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((quad.eval(t) - cubic.eval(t)).length() < 0.01);
        }
    }

    #[test]
    fn test_straight_curve_emits_single_point() {
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.01),
            Vec2::new(60.0, -0.01),
            Vec2::new(100.0, 0.0),
        );

        let points = flattened(&curve, 0.25);
        assert_eq!(points, vec![(Vec2::new(100.0, 0.0), true)]);
    }

    #[test]
    fn test_tighter_tolerance_adds_points() {
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 0.0),
        );

        let mut previous = 0;
        for tolerance in [4.0, 1.0, 0.25, 0.05, 0.01] {
            let count = flattened(&curve, tolerance).len();
            assert!(count >= previous, "{count} < {previous} at {tolerance}");
            previous = count;
        }
        assert!(previous > flattened(&curve, 4.0).len());
    }

    #[test]
    fn test_only_last_point_is_corner() {
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 0.0),
        );

        let points = flattened(&curve, 0.25);
        let (last, rest) = points.split_last().unwrap();
        assert_eq!(*last, (curve.to, true));
        assert!(rest.iter().all(|(_, corner)| !corner));
    }

    #[test]
    fn test_degenerate_curve_terminates() {
        let p = Vec2::new(5.0, 5.0);
        let curve = CubicBezier::new(p, p, p, p);

        let points = flattened(&curve, 0.25);
        assert_eq!(points.len(), 1 << MAX_FLATTEN_DEPTH);
        assert!(points.iter().all(|(q, _)| *q == p));
    }
}
