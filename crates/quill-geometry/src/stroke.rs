//! Stroke expansion.
//!
//! Turns flattened sub-paths into triangle strips of constant width with
//! caps at open ends and joins between segments. Every strip carries an
//! optional antialiasing fringe encoded in the vertex `uv`.

use std::f32::consts::PI;

use glam::Vec2;
use quill_core::profiling::profile_function;

use crate::path_cache::{Point, PointFlags, left_normal};
use crate::{PathCache, Vertex};

/// Line cap style for stroke endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat cap ending at the endpoint.
    #[default]
    Butt,
    /// Round cap extending beyond the endpoint.
    Round,
    /// Square cap extending beyond the endpoint by half the width.
    Square,
}

/// Line join style for stroke corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Miter join (sharp corner), beveled past the miter limit.
    #[default]
    Miter,
    /// Round join (rounded corner).
    Round,
    /// Bevel join (flat corner).
    Bevel,
}

/// Upper bound on the segments used for a single cap or join.
pub const MAX_CURVE_DIVISIONS: usize = 256;

/// Number of segments needed to approximate an arc of `radius` spanning
/// `arc` radians within `tol`, between 2 and [`MAX_CURVE_DIVISIONS`].
pub fn curve_divisions(radius: f32, arc: f32, tol: f32) -> usize {
    let da = (radius / (radius + tol)).acos() * 2.0;
    // Radii far above `tol` round the ratio to 1 and the step to 0.
    if da <= 0.0 || !da.is_finite() {
        return MAX_CURVE_DIVISIONS;
    }
    ((arc / da).ceil() as usize).clamp(2, MAX_CURVE_DIVISIONS)
}

impl PathCache {
    /// Expand every sub-path into a stroke strip of half-width `half_width`.
    ///
    /// `fringe` is the antialiasing fringe width; zero disables the fringe
    /// and puts every vertex at `u = 0.5`. Fill ranges are left empty.
    ///
    /// # Panics
    ///
    /// Panics if a sub-path has fewer than two points, which flattening
    /// never produces.
    pub fn expand_stroke(
        &mut self,
        half_width: f32,
        fringe: f32,
        line_cap: LineCap,
        line_join: LineJoin,
        miter_limit: f32,
        tess_tol: f32,
    ) {
        profile_function!();

        let aa = fringe;
        let (u0, u1) = if aa == 0.0 { (0.5, 0.5) } else { (0.0, 1.0) };
        let ncap = curve_divisions(half_width, PI, tess_tol);
        let w = half_width + aa * 0.5;

        self.calculate_joins(w, line_join, miter_limit);

        let (points, sub_paths, vertices) = self.parts_mut();
        vertices.clear();

        for sp in sub_paths.iter_mut() {
            let pts = &points[sp.points.clone()];
            let n = pts.len();
            assert!(n >= 2, "stroke sub-path needs at least two points, got {n}");

            let start = vertices.len();
            sp.fill = start..start;

            if sp.closed {
                for i in 0..n {
                    let p0 = &pts[(i + n - 1) % n];
                    stroke_join(vertices, p0, &pts[i], w, line_join, u0, u1, ncap);
                }
                close_strip(vertices, start, u0, u1);
            } else {
                let dir = (pts[1].pos - pts[0].pos).normalize_or_zero();
                match line_cap {
                    LineCap::Butt => butt_cap_start(vertices, &pts[0], dir, w, -aa * 0.5, aa, u0, u1),
                    LineCap::Square => butt_cap_start(vertices, &pts[0], dir, w, w - aa, aa, u0, u1),
                    LineCap::Round => round_cap_start(vertices, &pts[0], dir, w, ncap, u0, u1),
                }

                for i in 1..n - 1 {
                    stroke_join(vertices, &pts[i - 1], &pts[i], w, line_join, u0, u1, ncap);
                }

                let dir = (pts[n - 1].pos - pts[n - 2].pos).normalize_or_zero();
                match line_cap {
                    LineCap::Butt => butt_cap_end(vertices, &pts[n - 1], dir, w, -aa * 0.5, aa, u0, u1),
                    LineCap::Square => butt_cap_end(vertices, &pts[n - 1], dir, w, w - aa, aa, u0, u1),
                    LineCap::Round => round_cap_end(vertices, &pts[n - 1], dir, w, ncap, u0, u1),
                }
            }

            sp.stroke = start..vertices.len();
        }
    }
}

/// Repeat the first two vertices of a strip starting at `start` so it
/// closes on itself.
pub(crate) fn close_strip(vertices: &mut Vec<Vertex>, start: usize, u0: f32, u1: f32) {
    if vertices.len() < start + 2 {
        return;
    }
    let first = vertices[start].pos();
    let second = vertices[start + 1].pos();
    vertices.push(Vertex::at(first, u0, 1.0));
    vertices.push(Vertex::at(second, u1, 1.0));
}

#[allow(clippy::too_many_arguments)]
fn stroke_join(
    vertices: &mut Vec<Vertex>,
    p0: &Point,
    p1: &Point,
    w: f32,
    line_join: LineJoin,
    u0: f32,
    u1: f32,
    ncap: usize,
) {
    if p1.flags.intersects(PointFlags::BEVEL | PointFlags::INNERBEVEL) {
        if line_join == LineJoin::Round {
            round_join(vertices, p0, p1, w, w, u0, u1, ncap);
        } else {
            bevel_join(vertices, p0, p1, w, w, u0, u1);
        }
    } else {
        vertices.push(Vertex::at(p1.pos + p1.extrusion * w, u0, 1.0));
        vertices.push(Vertex::at(p1.pos - p1.extrusion * w, u1, 1.0));
    }
}

#[allow(clippy::too_many_arguments)]
fn butt_cap_start(vertices: &mut Vec<Vertex>, point: &Point, dir: Vec2, w: f32, d: f32, aa: f32, u0: f32, u1: f32) {
    let p = point.pos - dir * d;
    let dl = left_normal(dir);

    vertices.push(Vertex::at(p + dl * w - dir * aa, u0, 0.0));
    vertices.push(Vertex::at(p - dl * w - dir * aa, u1, 0.0));
    vertices.push(Vertex::at(p + dl * w, u0, 1.0));
    vertices.push(Vertex::at(p - dl * w, u1, 1.0));
}

#[allow(clippy::too_many_arguments)]
fn butt_cap_end(vertices: &mut Vec<Vertex>, point: &Point, dir: Vec2, w: f32, d: f32, aa: f32, u0: f32, u1: f32) {
    let p = point.pos + dir * d;
    let dl = left_normal(dir);

    vertices.push(Vertex::at(p + dl * w, u0, 1.0));
    vertices.push(Vertex::at(p - dl * w, u1, 1.0));
    vertices.push(Vertex::at(p + dl * w + dir * aa, u0, 0.0));
    vertices.push(Vertex::at(p - dl * w + dir * aa, u1, 0.0));
}

fn round_cap_start(vertices: &mut Vec<Vertex>, point: &Point, dir: Vec2, w: f32, ncap: usize, u0: f32, u1: f32) {
    let p = point.pos;
    let dl = left_normal(dir);

    for i in 0..ncap {
        let a = i as f32 / (ncap - 1) as f32 * PI;
        let (sin, cos) = a.sin_cos();
        let (ax, ay) = (cos * w, sin * w);
        vertices.push(Vertex::at(p - dl * ax - dir * ay, u0, 1.0));
        vertices.push(Vertex::at(p, 0.5, 1.0));
    }

    vertices.push(Vertex::at(p + dl * w, u0, 1.0));
    vertices.push(Vertex::at(p - dl * w, u1, 1.0));
}

fn round_cap_end(vertices: &mut Vec<Vertex>, point: &Point, dir: Vec2, w: f32, ncap: usize, u0: f32, u1: f32) {
    let p = point.pos;
    let dl = left_normal(dir);

    vertices.push(Vertex::at(p + dl * w, u0, 1.0));
    vertices.push(Vertex::at(p - dl * w, u1, 1.0));

    for i in 0..ncap {
        let a = i as f32 / (ncap - 1) as f32 * PI;
        let (sin, cos) = a.sin_cos();
        let (ax, ay) = (cos * w, sin * w);
        vertices.push(Vertex::at(p, 0.5, 1.0));
        vertices.push(Vertex::at(p - dl * ax + dir * ay, u0, 1.0));
    }
}

/// The two outer corner positions of a join: offset along each segment's
/// normal when beveled, otherwise the single miter point twice.
fn choose_bevel(bevel: bool, p0: &Point, p1: &Point, w: f32) -> (Vec2, Vec2) {
    if bevel {
        (p1.pos + left_normal(p0.dir) * w, p1.pos + left_normal(p1.dir) * w)
    } else {
        let miter = p1.pos + p1.extrusion * w;
        (miter, miter)
    }
}

#[allow(clippy::too_many_arguments)]
fn round_join(vertices: &mut Vec<Vertex>, p0: &Point, p1: &Point, lw: f32, rw: f32, lu: f32, ru: f32, ncap: usize) {
    let dl0 = left_normal(p0.dir);
    let dl1 = left_normal(p1.dir);
    let inner_bevel = p1.flags.contains(PointFlags::INNERBEVEL);

    if p1.flags.contains(PointFlags::LEFT) {
        let (l0, l1) = choose_bevel(inner_bevel, p0, p1, lw);
        let a0 = (-dl0.y).atan2(-dl0.x);
        let mut a1 = (-dl1.y).atan2(-dl1.x);
        if a1 > a0 {
            a1 -= PI * 2.0;
        }

        vertices.push(Vertex::at(l0, lu, 1.0));
        vertices.push(Vertex::at(p1.pos - dl0 * rw, ru, 1.0));

        let n = (((a0 - a1) / PI * ncap as f32).ceil() as usize).clamp(2, ncap.max(2));
        for i in 0..n {
            let u = i as f32 / (n - 1) as f32;
            let a = a0 + u * (a1 - a0);
            let r = p1.pos + Vec2::from_angle(a) * rw;
            vertices.push(Vertex::at(p1.pos, 0.5, 1.0));
            vertices.push(Vertex::at(r, ru, 1.0));
        }

        vertices.push(Vertex::at(l1, lu, 1.0));
        vertices.push(Vertex::at(p1.pos - dl1 * rw, ru, 1.0));
    } else {
        let (r0, r1) = choose_bevel(inner_bevel, p0, p1, -rw);
        let a0 = dl0.y.atan2(dl0.x);
        let mut a1 = dl1.y.atan2(dl1.x);
        if a1 < a0 {
            a1 += PI * 2.0;
        }

        vertices.push(Vertex::at(p1.pos + dl0 * rw, lu, 1.0));
        vertices.push(Vertex::at(r0, ru, 1.0));

        let n = (((a1 - a0) / PI * ncap as f32).ceil() as usize).clamp(2, ncap.max(2));
        for i in 0..n {
            let u = i as f32 / (n - 1) as f32;
            let a = a0 + u * (a1 - a0);
            let l = p1.pos + Vec2::from_angle(a) * lw;
            vertices.push(Vertex::at(l, lu, 1.0));
            vertices.push(Vertex::at(p1.pos, 0.5, 1.0));
        }

        vertices.push(Vertex::at(p1.pos + dl1 * rw, lu, 1.0));
        vertices.push(Vertex::at(r1, ru, 1.0));
    }
}

/// Bevel join between `p0`'s segment and `p1`'s segment. `lw`/`rw` are the
/// offsets on the left and right side; they differ for fill fringes.
pub(crate) fn bevel_join(vertices: &mut Vec<Vertex>, p0: &Point, p1: &Point, lw: f32, rw: f32, lu: f32, ru: f32) {
    let dl0 = left_normal(p0.dir);
    let dl1 = left_normal(p1.dir);
    let inner_bevel = p1.flags.contains(PointFlags::INNERBEVEL);
    let outer_bevel = p1.flags.contains(PointFlags::BEVEL);

    if p1.flags.contains(PointFlags::LEFT) {
        let (l0, l1) = choose_bevel(inner_bevel, p0, p1, lw);

        vertices.push(Vertex::at(l0, lu, 1.0));
        vertices.push(Vertex::at(p1.pos - dl0 * rw, ru, 1.0));

        if outer_bevel {
            vertices.push(Vertex::at(l0, lu, 1.0));
            vertices.push(Vertex::at(p1.pos - dl0 * rw, ru, 1.0));

            vertices.push(Vertex::at(l1, lu, 1.0));
            vertices.push(Vertex::at(p1.pos - dl1 * rw, ru, 1.0));
        } else {
            let r0 = p1.pos - p1.extrusion * rw;

            vertices.push(Vertex::at(p1.pos, 0.5, 1.0));
            vertices.push(Vertex::at(p1.pos - dl0 * rw, ru, 1.0));

            vertices.push(Vertex::at(r0, ru, 1.0));
            vertices.push(Vertex::at(r0, ru, 1.0));

            vertices.push(Vertex::at(p1.pos, 0.5, 1.0));
            vertices.push(Vertex::at(p1.pos - dl1 * rw, ru, 1.0));
        }

        vertices.push(Vertex::at(l1, lu, 1.0));
        vertices.push(Vertex::at(p1.pos - dl1 * rw, ru, 1.0));
    } else {
        let (r0, r1) = choose_bevel(inner_bevel, p0, p1, -rw);

        vertices.push(Vertex::at(p1.pos + dl0 * lw, lu, 1.0));
        vertices.push(Vertex::at(r0, ru, 1.0));

        if outer_bevel {
            vertices.push(Vertex::at(p1.pos + dl0 * lw, lu, 1.0));
            vertices.push(Vertex::at(r0, ru, 1.0));

            vertices.push(Vertex::at(p1.pos + dl1 * lw, lu, 1.0));
            vertices.push(Vertex::at(r1, ru, 1.0));
        } else {
            let l0 = p1.pos + p1.extrusion * lw;

            vertices.push(Vertex::at(p1.pos + dl0 * lw, lu, 1.0));
            vertices.push(Vertex::at(p1.pos, 0.5, 1.0));

            vertices.push(Vertex::at(l0, lu, 1.0));
            vertices.push(Vertex::at(l0, lu, 1.0));

            vertices.push(Vertex::at(p1.pos + dl1 * lw, lu, 1.0));
            vertices.push(Vertex::at(p1.pos, 0.5, 1.0));
        }

        vertices.push(Vertex::at(p1.pos + dl1 * lw, lu, 1.0));
        vertices.push(Vertex::at(r1, ru, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathCommand, Tolerances};

    fn flatten(commands: &[PathCommand]) -> PathCache {
        let mut cache = PathCache::new();
        cache.flatten(commands, &Tolerances::from_pixel_ratio(1.0));
        cache
    }

    fn line(from: Vec2, to: Vec2) -> PathCache {
        flatten(&[PathCommand::MoveTo(from), PathCommand::LineTo(to)])
    }

    #[test]
    fn test_curve_divisions() {
        assert_eq!(curve_divisions(0.0, PI, 0.25), 2);
        assert!(curve_divisions(50.0, PI, 0.25) > curve_divisions(5.0, PI, 0.25));
    }

    #[test]
    fn test_curve_divisions_huge_radius_is_bounded() {
        assert_eq!(curve_divisions(5.0e6, PI, 0.25), MAX_CURVE_DIVISIONS);
        assert_eq!(curve_divisions(1.0e7, PI, 1.0e-4), MAX_CURVE_DIVISIONS);
        assert!(curve_divisions(1.0e4, PI, 0.25) <= MAX_CURVE_DIVISIONS);
    }

    #[test]
    fn test_huge_round_cap_stays_bounded() {
        let mut cache = line(Vec2::ZERO, Vec2::new(10.0, 0.0));
        cache.expand_stroke(5.0e6, 0.0, LineCap::Round, LineJoin::Round, 10.0, 0.25);

        let sp = &cache.sub_paths()[0];
        let strip = &cache.vertices()[sp.stroke_range()];
        assert!(strip.len() <= 4 * MAX_CURVE_DIVISIONS + 8);
        assert!(strip.iter().all(|v| v.pos().is_finite()));
    }

    #[test]
    fn test_butt_line_without_fringe() {
        let mut cache = line(Vec2::ZERO, Vec2::new(10.0, 0.0));
        cache.expand_stroke(2.0, 0.0, LineCap::Butt, LineJoin::Miter, 10.0, 0.25);

        let sp = &cache.sub_paths()[0];
        assert!(sp.fill_range().is_empty());
        let strip = &cache.vertices()[sp.stroke_range()];
        assert_eq!(strip.len(), 8);
        assert!(strip.iter().all(|v| v.uv[0] == 0.5));
        for v in strip {
            assert!(v.position[0] >= 0.0 && v.position[0] <= 10.0);
            assert!(v.position[1].abs() <= 2.0 + 1e-5);
        }
    }

    #[test]
    fn test_square_cap_extends_past_end() {
        let mut cache = line(Vec2::ZERO, Vec2::new(10.0, 0.0));
        cache.expand_stroke(2.0, 0.0, LineCap::Square, LineJoin::Miter, 10.0, 0.25);

        let strip = &cache.vertices()[cache.sub_paths()[0].stroke_range()];
        let max_x = strip.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        let min_x = strip.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        assert!((max_x - 12.0).abs() < 1e-4);
        assert!((min_x + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_round_cap_stays_within_radius() {
        let mut cache = line(Vec2::ZERO, Vec2::new(10.0, 0.0));
        cache.expand_stroke(3.0, 0.0, LineCap::Round, LineJoin::Round, 10.0, 0.25);

        let strip = &cache.vertices()[cache.sub_paths()[0].stroke_range()];
        let ncap = curve_divisions(3.0, PI, 0.25);
        assert_eq!(strip.len(), 2 * (2 * ncap + 2));
        for v in strip {
            let p = v.pos();
            let d = p.distance(Vec2::ZERO).min(p.distance(Vec2::new(10.0, 0.0)));
            assert!(d <= 3.0 + 1e-4 || (p.x >= 0.0 && p.x <= 10.0));
        }
    }

    #[test]
    fn test_fringe_coordinates() {
        let mut cache = line(Vec2::ZERO, Vec2::new(10.0, 0.0));
        cache.expand_stroke(2.0, 1.0, LineCap::Butt, LineJoin::Miter, 10.0, 0.25);

        let strip = &cache.vertices()[cache.sub_paths()[0].stroke_range()];
        assert_eq!(strip[0].uv, [0.0, 0.0]);
        assert_eq!(strip[1].uv, [1.0, 0.0]);
        assert_eq!(strip[2].uv, [0.0, 1.0]);
        assert_eq!(strip[3].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_closed_strip_loops_back() {
        let mut cache = flatten(&[
            PathCommand::MoveTo(Vec2::ZERO),
            PathCommand::LineTo(Vec2::new(0.0, 10.0)),
            PathCommand::LineTo(Vec2::new(10.0, 10.0)),
            PathCommand::LineTo(Vec2::new(10.0, 0.0)),
            PathCommand::Close,
        ]);
        cache.expand_stroke(1.0, 0.0, LineCap::Butt, LineJoin::Miter, 10.0, 0.25);

        let strip = &cache.vertices()[cache.sub_paths()[0].stroke_range()];
        assert_eq!(strip.len(), 4 * 2 + 2);
        assert_eq!(strip[8].position, strip[0].position);
        assert_eq!(strip[9].position, strip[1].position);
    }

    #[test]
    fn test_sharp_turn_falls_back_to_bevel() {
        let angle = 179f32.to_radians();
        let corner = Vec2::new(100.0, 0.0);
        let end = corner + Vec2::from_angle(angle) * 100.0;
        let mut cache = flatten(&[
            PathCommand::MoveTo(Vec2::ZERO),
            PathCommand::LineTo(corner),
            PathCommand::LineTo(end),
        ]);

        let width = 10.0;
        cache.expand_stroke(width * 0.5, 0.0, LineCap::Butt, LineJoin::Miter, 4.0, 0.25);

        let pts = cache.sub_path_points(&cache.sub_paths()[0]);
        assert!(pts[1].flags.contains(PointFlags::BEVEL));

        let limit = 4.0 * width * 0.5;
        for v in &cache.vertices()[cache.sub_paths()[0].stroke_range()] {
            let d = v.pos().distance(corner);
            let near_ends = v.pos().distance(Vec2::ZERO) <= width || v.pos().distance(end) <= width;
            assert!(d <= limit + 1e-3 || near_ends, "vertex {:?} too far from join", v.position);
        }
    }
}
