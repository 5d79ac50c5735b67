//! Fill expansion.
//!
//! A single convex sub-path fills as a plain triangle fan. Anything else is
//! drawn by the backend with a stencil pass, so the fan is inset by half the
//! fringe and an antialiasing ribbon straddles the outline.

use quill_core::profiling::profile_function;

use crate::path_cache::{PointFlags, left_normal};
use crate::stroke::{bevel_join, close_strip};
use crate::{LineJoin, PathCache, Vertex};

impl PathCache {
    /// Expand every sub-path into fill geometry.
    ///
    /// `fringe` is the antialiasing fringe width, zero to disable it.
    /// Sub-paths with fewer than three points get empty ranges.
    pub fn expand_fill(&mut self, fringe: f32, line_join: LineJoin, miter_limit: f32) {
        profile_function!();

        let woff = 0.5 * fringe;

        self.calculate_joins(fringe, line_join, miter_limit);

        let (points, sub_paths, vertices) = self.parts_mut();
        let convex = sub_paths.len() == 1 && sub_paths[0].convex;
        let with_fringe = fringe > 0.0 && !convex;
        vertices.clear();

        for sp in sub_paths.iter_mut() {
            let pts = &points[sp.points.clone()];
            let n = pts.len();
            let start = vertices.len();

            if n < 3 {
                sp.fill = start..start;
                sp.stroke = start..start;
                continue;
            }

            if with_fringe {
                for i in 0..n {
                    let p0 = &pts[(i + n - 1) % n];
                    let p1 = &pts[i];
                    if p1.flags.contains(PointFlags::BEVEL) && !p1.flags.contains(PointFlags::LEFT) {
                        vertices.push(Vertex::at(p1.pos + left_normal(p0.dir) * woff, 0.5, 1.0));
                        vertices.push(Vertex::at(p1.pos + left_normal(p1.dir) * woff, 0.5, 1.0));
                    } else {
                        vertices.push(Vertex::at(p1.pos + p1.extrusion * woff, 0.5, 1.0));
                    }
                }
            } else {
                vertices.extend(pts.iter().map(|p| Vertex::at(p.pos, 0.5, 1.0)));
            }
            sp.fill = start..vertices.len();

            let start = vertices.len();
            if with_fringe {
                let (lw, rw) = (fringe + woff, fringe - woff);
                let (lu, ru) = (0.0, 1.0);

                for i in 0..n {
                    let p0 = &pts[(i + n - 1) % n];
                    let p1 = &pts[i];
                    if p1.flags.intersects(PointFlags::BEVEL | PointFlags::INNERBEVEL) {
                        bevel_join(vertices, p0, p1, lw, rw, lu, ru);
                    } else {
                        vertices.push(Vertex::at(p1.pos + p1.extrusion * lw, lu, 1.0));
                        vertices.push(Vertex::at(p1.pos - p1.extrusion * rw, ru, 1.0));
                    }
                }
                close_strip(vertices, start, lu, ru);
            }
            sp.stroke = start..vertices.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::{PathCommand, Tolerances, Winding};

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Vec<PathCommand> {
        vec![
            PathCommand::MoveTo(Vec2::new(x, y)),
            PathCommand::LineTo(Vec2::new(x, y + h)),
            PathCommand::LineTo(Vec2::new(x + w, y + h)),
            PathCommand::LineTo(Vec2::new(x + w, y)),
            PathCommand::Close,
        ]
    }

    fn expand(commands: &[PathCommand], fringe: f32) -> PathCache {
        let mut cache = PathCache::new();
        cache.flatten(commands, &Tolerances::from_pixel_ratio(1.0));
        cache.expand_fill(fringe, LineJoin::Miter, 2.4);
        cache
    }

    #[test]
    fn test_convex_fill_is_plain_fan() {
        let cache = expand(&rect(0.0, 0.0, 100.0, 50.0), 1.0);
        let sp = &cache.sub_paths()[0];

        assert!(sp.is_convex());
        assert!(sp.stroke_range().is_empty());
        let fan = &cache.vertices()[sp.fill_range()];
        let positions: Vec<_> = fan.iter().map(|v| v.position).collect();
        assert_eq!(positions, vec![[0.0, 0.0], [0.0, 50.0], [100.0, 50.0], [100.0, 0.0]]);
    }

    #[test]
    fn test_fill_without_fringe_uses_raw_points() {
        let mut commands = rect(0.0, 0.0, 100.0, 100.0);
        commands.extend(rect(25.0, 25.0, 50.0, 50.0));
        commands.push(PathCommand::Winding(Winding::Hole));

        let cache = expand(&commands, 0.0);
        for sp in cache.sub_paths() {
            assert_eq!(sp.fill_range().len(), 4);
            assert!(sp.stroke_range().is_empty());
        }
    }

    #[test]
    fn test_concave_fill_gets_fringe() {
        let mut commands = rect(0.0, 0.0, 100.0, 100.0);
        commands.extend(rect(25.0, 25.0, 50.0, 50.0));
        commands.push(PathCommand::Winding(Winding::Hole));

        let cache = expand(&commands, 1.0);
        for sp in cache.sub_paths() {
            assert_eq!(sp.fill_range().len(), 4);
            // two vertices per corner plus the closing pair
            assert_eq!(sp.stroke_range().len(), 4 * 2 + 2);
            let ribbon = &cache.vertices()[sp.stroke_range()];
            assert_eq!(ribbon[8].position, ribbon[0].position);
            assert!(ribbon.iter().all(|v| v.uv[0] == 0.0 || v.uv[0] == 1.0));
        }

        // The outer fan is pulled in by half the fringe.
        let outer = &cache.vertices()[cache.sub_paths()[0].fill_range()];
        assert!(outer.iter().all(|v| v.position[0] > 0.0 && v.position[0] < 100.0));
    }

    #[test]
    fn test_degenerate_sub_path_is_skipped() {
        let cache = expand(
            &[
                PathCommand::MoveTo(Vec2::ZERO),
                PathCommand::LineTo(Vec2::new(10.0, 0.0)),
            ],
            1.0,
        );
        let sp = &cache.sub_paths()[0];
        assert!(sp.fill_range().is_empty());
        assert!(sp.stroke_range().is_empty());
        assert_eq!(cache.render_paths().filter(|p| !p.fill.is_empty()).count(), 0);
    }
}
