//! High-level shape primitives.
//!
//! Shapes expand into plain [`PathCommand`] sequences in logical space; the
//! context bakes its transform in when it appends them.

use crate::{PathCommand, Winding};
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Control point offset factor for approximating a quarter circle with a
/// cubic Bezier.
pub const KAPPA90: f32 = 0.552_284_8;

/// Corner radii below this are drawn as square corners.
const MIN_CORNER_RADIUS: f32 = 0.1;

/// A high-level shape that can be converted to path commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A rectangle.
    Rect {
        /// Top-left position
        position: Vec2,
        /// Size (width, height)
        size: Vec2,
    },
    /// A rounded rectangle.
    RoundedRect {
        /// Top-left position
        position: Vec2,
        /// Size (width, height)
        size: Vec2,
        /// Corner radii [top-left, top-right, bottom-right, bottom-left]
        radii: [f32; 4],
    },
    /// A circle.
    Circle {
        /// Center point
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// An ellipse.
    Ellipse {
        /// Center point
        center: Vec2,
        /// Radii (x, y)
        radii: Vec2,
    },
    /// A closed polygon.
    Polygon {
        /// Vertices of the polygon
        points: Vec<Vec2>,
    },
    /// An open polyline.
    Polyline {
        /// Points defining the polyline
        points: Vec<Vec2>,
    },
}

impl Shape {
    /// Create a rectangle.
    pub fn rect(position: Vec2, size: Vec2) -> Self {
        Self::Rect { position, size }
    }

    /// Create a rounded rectangle with uniform corner radius.
    pub fn rounded_rect(position: Vec2, size: Vec2, radius: f32) -> Self {
        Self::RoundedRect {
            position,
            size,
            radii: [radius; 4],
        }
    }

    /// Create a rounded rectangle with individual corner radii.
    pub fn rounded_rect_varying(position: Vec2, size: Vec2, radii: [f32; 4]) -> Self {
        Self::RoundedRect {
            position,
            size,
            radii,
        }
    }

    /// Create a circle.
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    /// Create an ellipse.
    pub fn ellipse(center: Vec2, radii: Vec2) -> Self {
        Self::Ellipse { center, radii }
    }

    /// Create a closed polygon.
    pub fn polygon(points: Vec<Vec2>) -> Self {
        Self::Polygon { points }
    }

    /// Create an open polyline.
    pub fn polyline(points: Vec<Vec2>) -> Self {
        Self::Polyline { points }
    }

    /// Expand the shape into path commands.
    pub fn to_commands(&self) -> Vec<PathCommand> {
        match self {
            Shape::Rect { position, size } => rect_commands(*position, *size),
            Shape::RoundedRect {
                position,
                size,
                radii,
            } => rounded_rect_commands(*position, *size, *radii),
            Shape::Circle { center, radius } => ellipse_commands(*center, Vec2::splat(*radius)),
            Shape::Ellipse { center, radii } => ellipse_commands(*center, *radii),
            Shape::Polygon { points } => {
                let mut commands = polyline_commands(points);
                if !commands.is_empty() {
                    commands.push(PathCommand::Close);
                }
                commands
            }
            Shape::Polyline { points } => polyline_commands(points),
        }
    }
}

fn rect_commands(p: Vec2, size: Vec2) -> Vec<PathCommand> {
    vec![
        PathCommand::MoveTo(p),
        PathCommand::LineTo(Vec2::new(p.x, p.y + size.y)),
        PathCommand::LineTo(p + size),
        PathCommand::LineTo(Vec2::new(p.x + size.x, p.y)),
        PathCommand::Close,
    ]
}

fn rounded_rect_commands(p: Vec2, size: Vec2, radii: [f32; 4]) -> Vec<PathCommand> {
    if radii.iter().all(|r| *r < MIN_CORNER_RADIUS) {
        return rect_commands(p, size);
    }

    // A corner radius never exceeds half the shorter side. Signs follow the
    // size so that negative extents mirror the corners.
    let max_radius = size.x.abs().min(size.y.abs()) * 0.5;
    let corner = |r: f32| {
        let r = r.min(max_radius);
        Vec2::new(r * size.x.signum(), r * size.y.signum())
    };
    let [tl, tr, br, bl] = radii.map(corner);
    let (x, y, w, h) = (p.x, p.y, size.x, size.y);
    let k = 1.0 - KAPPA90;

    vec![
        PathCommand::MoveTo(Vec2::new(x, y + tl.y)),
        PathCommand::LineTo(Vec2::new(x, y + h - bl.y)),
        PathCommand::BezierTo {
            control1: Vec2::new(x, y + h - bl.y * k),
            control2: Vec2::new(x + bl.x * k, y + h),
            to: Vec2::new(x + bl.x, y + h),
        },
        PathCommand::LineTo(Vec2::new(x + w - br.x, y + h)),
        PathCommand::BezierTo {
            control1: Vec2::new(x + w - br.x * k, y + h),
            control2: Vec2::new(x + w, y + h - br.y * k),
            to: Vec2::new(x + w, y + h - br.y),
        },
        PathCommand::LineTo(Vec2::new(x + w, y + tr.y)),
        PathCommand::BezierTo {
            control1: Vec2::new(x + w, y + tr.y * k),
            control2: Vec2::new(x + w - tr.x * k, y),
            to: Vec2::new(x + w - tr.x, y),
        },
        PathCommand::LineTo(Vec2::new(x + tl.x, y)),
        PathCommand::BezierTo {
            control1: Vec2::new(x + tl.x * k, y),
            control2: Vec2::new(x, y + tl.y * k),
            to: Vec2::new(x, y + tl.y),
        },
        PathCommand::Close,
    ]
}

fn ellipse_commands(c: Vec2, r: Vec2) -> Vec<PathCommand> {
    let k = KAPPA90;
    vec![
        PathCommand::MoveTo(Vec2::new(c.x - r.x, c.y)),
        PathCommand::BezierTo {
            control1: Vec2::new(c.x - r.x, c.y + r.y * k),
            control2: Vec2::new(c.x - r.x * k, c.y + r.y),
            to: Vec2::new(c.x, c.y + r.y),
        },
        PathCommand::BezierTo {
            control1: Vec2::new(c.x + r.x * k, c.y + r.y),
            control2: Vec2::new(c.x + r.x, c.y + r.y * k),
            to: Vec2::new(c.x + r.x, c.y),
        },
        PathCommand::BezierTo {
            control1: Vec2::new(c.x + r.x, c.y - r.y * k),
            control2: Vec2::new(c.x + r.x * k, c.y - r.y),
            to: Vec2::new(c.x, c.y - r.y),
        },
        PathCommand::BezierTo {
            control1: Vec2::new(c.x - r.x * k, c.y - r.y),
            control2: Vec2::new(c.x - r.x, c.y - r.y * k),
            to: Vec2::new(c.x - r.x, c.y),
        },
        PathCommand::Close,
    ]
}

fn polyline_commands(points: &[Vec2]) -> Vec<PathCommand> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };

    std::iter::once(PathCommand::MoveTo(*first))
        .chain(rest.iter().map(|p| PathCommand::LineTo(*p)))
        .collect()
}

/// Commands for a circular arc around `center` from angle `a0` to `a1`
/// (radians), drawn in direction `dir`.
///
/// The arc is split into at most five cubic segments. When `continue_path`
/// is set the arc is joined to the current point with a line instead of
/// starting a new sub-path.
pub fn arc_commands(
    center: Vec2,
    radius: f32,
    a0: f32,
    a1: f32,
    dir: Winding,
    continue_path: bool,
) -> Vec<PathCommand> {
    let mut da = a1 - a0;
    if dir == Winding::CW {
        if da.abs() >= TAU {
            da = TAU;
        } else {
            while da < 0.0 {
                da += TAU;
            }
        }
    } else if da.abs() >= TAU {
        da = -TAU;
    } else {
        while da > 0.0 {
            da -= TAU;
        }
    }

    // Zero sweep: only the start point, otherwise kappa divides by sin(0).
    if da.abs() < 1e-6 {
        let (sin, cos) = a0.sin_cos();
        let start = center + Vec2::new(cos, sin) * radius;
        return vec![if continue_path {
            PathCommand::LineTo(start)
        } else {
            PathCommand::MoveTo(start)
        }];
    }

    let divisions = ((da.abs() / FRAC_PI_2 + 0.5) as usize).clamp(1, 5);
    let half = da / divisions as f32 * 0.5;
    let mut kappa = (4.0 / 3.0 * (1.0 - half.cos()) / half.sin()).abs();
    if dir == Winding::CCW {
        kappa = -kappa;
    }

    let mut commands = Vec::with_capacity(divisions + 1);
    let mut prev = Vec2::ZERO;
    let mut prev_tangent = Vec2::ZERO;

    for i in 0..=divisions {
        let a = a0 + da * (i as f32 / divisions as f32);
        let (sin, cos) = a.sin_cos();
        let point = center + Vec2::new(cos, sin) * radius;
        let tangent = Vec2::new(-sin, cos) * radius * kappa;

        if i == 0 {
            commands.push(if continue_path {
                PathCommand::LineTo(point)
            } else {
                PathCommand::MoveTo(point)
            });
        } else {
            commands.push(PathCommand::BezierTo {
                control1: prev + prev_tangent,
                control2: point - tangent,
                to: point,
            });
        }
        prev = point;
        prev_tangent = tangent;
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn end_points(commands: &[PathCommand]) -> Vec<Vec2> {
        commands.iter().filter_map(PathCommand::end_point).collect()
    }

    #[test]
    fn test_rect_commands() {
        let commands = Shape::rect(Vec2::ZERO, Vec2::new(100.0, 50.0)).to_commands();

        assert_eq!(commands.len(), 5);
        assert_eq!(commands[4], PathCommand::Close);
        assert_eq!(
            end_points(&commands),
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 50.0),
                Vec2::new(100.0, 50.0),
                Vec2::new(100.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_small_radius_is_plain_rect() {
        let rounded = Shape::rounded_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), 0.05);
        assert_eq!(
            rounded.to_commands(),
            Shape::rect(Vec2::ZERO, Vec2::new(10.0, 10.0)).to_commands()
        );
    }

    #[test]
    fn test_rounded_rect_radius_clamped_to_short_side() {
        let commands =
            Shape::rounded_rect(Vec2::ZERO, Vec2::new(100.0, 20.0), 50.0).to_commands();

        // First point sits on the left edge one (clamped) radius down.
        assert_eq!(commands[0], PathCommand::MoveTo(Vec2::new(0.0, 10.0)));
        // Top edge ends one clamped radius in from the left.
        assert_eq!(commands[7], PathCommand::LineTo(Vec2::new(10.0, 0.0)));
        assert_eq!(commands.len(), 10);
    }

    #[test]
    fn test_ellipse_visits_extremes() {
        let commands = Shape::ellipse(Vec2::new(50.0, 50.0), Vec2::new(30.0, 20.0)).to_commands();

        assert_eq!(
            end_points(&commands),
            vec![
                Vec2::new(20.0, 50.0),
                Vec2::new(50.0, 70.0),
                Vec2::new(80.0, 50.0),
                Vec2::new(50.0, 30.0),
                Vec2::new(20.0, 50.0),
            ]
        );
    }

    #[test]
    fn test_polygon_and_polyline() {
        let points = vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];

        let polygon = Shape::polygon(points.clone()).to_commands();
        assert_eq!(polygon.len(), 4);
        assert_eq!(polygon.last(), Some(&PathCommand::Close));

        let polyline = Shape::polyline(points).to_commands();
        assert_eq!(polyline.len(), 3);

        assert!(Shape::polygon(Vec::new()).to_commands().is_empty());
    }

    #[test]
    fn test_arc_half_circle() {
        let commands = arc_commands(Vec2::ZERO, 10.0, 0.0, PI, Winding::CW, false);

        // Half circle splits into two quarter segments.
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], PathCommand::MoveTo(Vec2::new(10.0, 0.0)));
        let end = commands[2].end_point().unwrap();
        assert!((end - Vec2::new(-10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_arc_full_circle_capped_segments() {
        let commands = arc_commands(Vec2::ZERO, 10.0, 0.0, 10.0 * PI, Winding::CCW, true);

        assert!(matches!(commands[0], PathCommand::LineTo(_)));
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn test_arc_zero_sweep_is_single_point() {
        for (dir, continue_path) in [(Winding::CW, true), (Winding::CCW, false)] {
            let commands = arc_commands(Vec2::new(50.0, 50.0), 20.0, 1.0, 1.0, dir, continue_path);

            assert_eq!(commands.len(), 1);
            let point = commands[0].end_point().unwrap();
            assert!(point.is_finite());
            assert!((point - Vec2::new(50.0, 50.0) - Vec2::from_angle(1.0) * 20.0).length() < 1e-4);
        }
        let commands = arc_commands(Vec2::ZERO, 10.0, 0.5, 0.5, Winding::CW, true);
        assert!(matches!(commands[0], PathCommand::LineTo(_)));
    }
}
