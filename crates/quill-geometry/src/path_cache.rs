//! Per-path derived geometry.
//!
//! The [`PathCache`] flattens a command stream into polylines once per path
//! use, then holds the fill and stroke vertices produced by the expanders.
//! One cache is reused across frames; [`PathCache::clear`] keeps every
//! allocation.

use std::ops::Range;

use bitflags::bitflags;
use glam::Vec2;
use quill_core::profiling::profile_function;

use crate::{LineJoin, PathCommand, RenderPath, Tolerances, Vertex, Winding};

bitflags! {
    /// Join classification of a flattened point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointFlags: u8 {
        /// A real corner (segment end point), as opposed to a point
        /// produced inside a curve.
        const CORNER = 0x01;
        /// The path turns left at this point.
        const LEFT = 0x02;
        /// The outer side of the join is beveled.
        const BEVEL = 0x04;
        /// The inner side of the join is beveled.
        const INNERBEVEL = 0x08;
    }
}

/// A flattened path point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Position in drawing space
    pub pos: Vec2,
    /// Unit direction of the outgoing segment (zero for a zero-length segment)
    pub dir: Vec2,
    /// Length of the outgoing segment
    pub len: f32,
    /// Miter extrusion: offset direction for the join, scaled so that
    /// `pos + extrusion * w` lies on both offset lines at distance `w`
    pub extrusion: Vec2,
    pub flags: PointFlags,
}

/// Left-hand normal of a direction: `(dy, -dx)`.
#[inline]
pub(crate) fn left_normal(dir: Vec2) -> Vec2 {
    Vec2::new(dir.y, -dir.x)
}

/// Signed area of a polygon, positive for counter-clockwise winding.
pub fn polygon_area(points: &[Point]) -> f32 {
    let Some(a) = points.first() else {
        return 0.0;
    };

    let mut area = 0.0;
    for pair in points[1..].windows(2) {
        let ab = pair[0].pos - a.pos;
        let ac = pair[1].pos - a.pos;
        area += ac.x * ab.y - ab.x * ac.y;
    }
    area * 0.5
}

/// Direction and length of `d`; a zero-length vector yields `(ZERO, 0.0)`.
fn safe_normalize(d: Vec2) -> (Vec2, f32) {
    let len = d.length();
    if len > 1e-6 {
        (d / len, len)
    } else {
        (Vec2::ZERO, 0.0)
    }
}

/// Axis-aligned bounding box of flattened geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// Inverted box; the first included point establishes the bounds.
    pub const EMPTY: Self = Self {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    /// Create bounds from corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Widen to include `p`.
    pub fn include(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Check if no point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Check if `p` lies inside (edges included).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// `[xmin, ymin, xmax, ymax]`
    pub fn to_array(&self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

/// One flattened sub-path: a range of the shared point buffer plus the
/// ranges of the shared vertex buffer produced for it by the last expansion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubPath {
    pub(crate) points: Range<usize>,
    pub(crate) closed: bool,
    pub(crate) convex: bool,
    pub(crate) winding: Winding,
    pub(crate) bevel_count: usize,
    pub(crate) fill: Range<usize>,
    pub(crate) stroke: Range<usize>,
}

impl SubPath {
    /// Range of this sub-path's points in [`PathCache::points`].
    pub fn point_range(&self) -> Range<usize> {
        self.points.clone()
    }

    /// Get the number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the last join pass found the outline convex.
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    pub fn winding(&self) -> Winding {
        self.winding
    }

    /// Number of points that need bevel geometry at the current width.
    pub fn bevel_count(&self) -> usize {
        self.bevel_count
    }

    /// Range of fill (fan) vertices in [`PathCache::vertices`].
    pub fn fill_range(&self) -> Range<usize> {
        self.fill.clone()
    }

    /// Range of stroke (strip) vertices in [`PathCache::vertices`]. After a
    /// fill expansion this holds the antialiasing fringe.
    pub fn stroke_range(&self) -> Range<usize> {
        self.stroke.clone()
    }
}

/// Tracks sign changes of edge directions for the convexity test.
#[derive(Default)]
struct SignFlips {
    sign: i8,
    first_sign: i8,
    flips: u32,
}

impl SignFlips {
    fn track(&mut self, value: f32) {
        let sign = if value > 0.0 {
            1
        } else if value < 0.0 {
            -1
        } else {
            return;
        };

        if self.sign == 0 {
            self.first_sign = sign;
        } else if self.sign != sign {
            self.flips += 1;
        }
        self.sign = sign;
    }

    /// Flip count including the wrap from the last edge back to the first.
    fn closed_flips(&self) -> u32 {
        if self.sign != 0 && self.sign != self.first_sign {
            self.flips + 1
        } else {
            self.flips
        }
    }
}

/// Flattened sub-paths and the vertex data expanded from them.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    points: Vec<Point>,
    sub_paths: Vec<SubPath>,
    vertices: Vec<Vertex>,
    bounds: Bounds,
    flattened: bool,
}

impl PathCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all derived geometry, keeping the allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        self.sub_paths.clear();
        self.vertices.clear();
        self.bounds = Bounds::EMPTY;
        self.flattened = false;
    }

    /// Whether [`PathCache::flatten`] has run since the last clear.
    pub fn is_flattened(&self) -> bool {
        self.flattened
    }

    /// Every flattened point, for all sub-paths.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn sub_paths(&self) -> &[SubPath] {
        &self.sub_paths
    }

    /// Points belonging to `sub_path`.
    pub fn sub_path_points(&self, sub_path: &SubPath) -> &[Point] {
        &self.points[sub_path.points.clone()]
    }

    /// Bounds of every flattened point.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Shared vertex buffer written by the last expansion.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Per-sub-path views of the last expansion's output.
    pub fn render_paths(&self) -> impl Iterator<Item = RenderPath<'_>> + '_ {
        self.sub_paths.iter().map(|sp| RenderPath {
            fill: &self.vertices[sp.fill.clone()],
            stroke: &self.vertices[sp.stroke.clone()],
            closed: sp.closed,
            convex: sp.convex,
        })
    }

    /// Flatten `commands` into sub-paths.
    ///
    /// Does nothing if the cache is already flattened; the result stays
    /// memoized until [`PathCache::clear`]. Sub-paths that end up with fewer
    /// than two points are dropped, so every remaining sub-path has at least
    /// one segment.
    pub fn flatten(&mut self, commands: &[PathCommand], tolerances: &Tolerances) {
        if self.flattened {
            return;
        }
        profile_function!();

        let dist_tol = tolerances.dist_tol;

        for cmd in commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    self.add_sub_path();
                    self.add_point(p, PointFlags::CORNER, dist_tol);
                }
                PathCommand::LineTo(p) => {
                    self.add_point(p, PointFlags::CORNER, dist_tol);
                }
                PathCommand::BezierTo {
                    control1,
                    control2,
                    to,
                } => {
                    if let Some(from) = self.current_point() {
                        let curve = crate::CubicBezier::new(from, control1, control2, to);
                        curve.flatten(tolerances.tess_tol, |p, corner| {
                            let flags = if corner {
                                PointFlags::CORNER
                            } else {
                                PointFlags::empty()
                            };
                            self.add_point(p, flags, dist_tol);
                        });
                    }
                }
                PathCommand::Close => {
                    if let Some(sp) = self.sub_paths.last_mut() {
                        sp.closed = true;
                    }
                }
                PathCommand::Winding(winding) => {
                    if let Some(sp) = self.sub_paths.last_mut() {
                        sp.winding = winding;
                    }
                }
            }
        }

        let before = self.sub_paths.len();
        self.sub_paths.retain(|sp| sp.points.len() >= 2);
        if self.sub_paths.len() != before {
            tracing::trace!(
                "Dropped {} sub-path(s) with fewer than two points",
                before - self.sub_paths.len()
            );
        }

        let mut bounds = Bounds::EMPTY;
        for sp in &mut self.sub_paths {
            let pts = &self.points[sp.points.clone()];
            let (first, last) = (pts[0].pos, pts[pts.len() - 1].pos);

            // A trailing point that lands back on the start closes the path.
            if pts.len() > 2 && first.distance_squared(last) < dist_tol * dist_tol {
                sp.points.end -= 1;
                sp.closed = true;
            }

            let pts = &mut self.points[sp.points.clone()];

            if pts.len() > 2 {
                let area = polygon_area(pts);
                let reversed = match sp.winding {
                    Winding::Solid => area < 0.0,
                    Winding::Hole => area > 0.0,
                };
                if reversed {
                    pts.reverse();
                }
            }

            let n = pts.len();
            for i in 0..n {
                let next = pts[(i + 1) % n].pos;
                let p = &mut pts[i];
                (p.dir, p.len) = safe_normalize(next - p.pos);
                bounds.include(p.pos);
            }
        }

        self.bounds = bounds;
        self.flattened = true;

        tracing::trace!(
            "Flattened {} command(s) into {} sub-path(s), {} point(s)",
            commands.len(),
            self.sub_paths.len(),
            self.points.len()
        );
    }

    /// Split borrows used by the expanders.
    pub(crate) fn parts_mut(&mut self) -> (&[Point], &mut [SubPath], &mut Vec<Vertex>) {
        (&self.points, &mut self.sub_paths, &mut self.vertices)
    }

    /// Vertex ranges stay empty until an expander writes them.
    fn add_sub_path(&mut self) {
        let start = self.points.len();
        self.sub_paths.push(SubPath {
            points: start..start,
            ..Default::default()
        });
    }

    fn current_point(&self) -> Option<Vec2> {
        let sp = self.sub_paths.last()?;
        if sp.points.is_empty() {
            return None;
        }
        self.points.last().map(|p| p.pos)
    }

    fn add_point(&mut self, pos: Vec2, flags: PointFlags, dist_tol: f32) {
        let Some(sp) = self.sub_paths.last_mut() else {
            return;
        };

        if !sp.points.is_empty() {
            if let Some(last) = self.points.last_mut() {
                if last.pos.distance_squared(pos) < dist_tol * dist_tol {
                    last.flags |= flags;
                    return;
                }
            }
        }

        self.points.push(Point {
            pos,
            flags,
            ..Default::default()
        });
        sp.points.end += 1;
    }

    /// Classify every point's join for an offset of `w` and decide convexity.
    pub(crate) fn calculate_joins(&mut self, w: f32, line_join: LineJoin, miter_limit: f32) {
        let inv_w = if w > 0.0 { 1.0 / w } else { 0.0 };

        for sp in &mut self.sub_paths {
            let pts = &mut self.points[sp.points.clone()];
            let n = pts.len();
            let mut left_turns = 0;
            let mut x_flips = SignFlips::default();
            let mut y_flips = SignFlips::default();
            sp.bevel_count = 0;

            for i in 0..n {
                let p0 = pts[(i + n - 1) % n];
                let p1 = &mut pts[i];

                let mut extrusion = (left_normal(p0.dir) + left_normal(p1.dir)) * 0.5;
                let dmr2 = extrusion.length_squared();
                if dmr2 > 1e-6 {
                    extrusion *= (1.0 / dmr2).min(600.0);
                }
                p1.extrusion = extrusion;

                p1.flags &= PointFlags::CORNER;

                if p1.dir.perp_dot(p0.dir) > 0.0 {
                    left_turns += 1;
                    p1.flags |= PointFlags::LEFT;
                }

                x_flips.track(p1.dir.x);
                y_flips.track(p1.dir.y);

                // Inner miter would overshoot the shorter adjacent segment.
                let limit = (p0.len.min(p1.len) * inv_w).max(1.01);
                if dmr2 * limit * limit < 1.0 {
                    p1.flags |= PointFlags::INNERBEVEL;
                }

                if p1.flags.contains(PointFlags::CORNER)
                    && (dmr2 * miter_limit * miter_limit < 1.0 || line_join != LineJoin::Miter)
                {
                    p1.flags |= PointFlags::BEVEL;
                }

                if p1.flags.intersects(PointFlags::BEVEL | PointFlags::INNERBEVEL) {
                    sp.bevel_count += 1;
                }
            }

            sp.convex = left_turns == n && x_flips.closed_flips() == 2 && y_flips.closed_flips() == 2;
        }
    }
}
