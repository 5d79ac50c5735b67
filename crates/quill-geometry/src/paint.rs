//! Paint types for filling and stroking.
//!
//! Every paint, solid or not, is described by the same gradient record: a
//! transform into paint space, a box extent, a corner radius and a feather
//! width between the inner and outer color. Backends evaluate it per pixel.

use glam::Vec2;
use quill_core::Color;

use crate::Transform2D;

/// Handle of an image owned by the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// Distance used to turn a linear gradient into a very large box.
const LINEAR_GRADIENT_EXTENT: f32 = 1e5;

/// Describes how to color geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Transform from paint space to drawing space
    pub transform: Transform2D,
    /// Half-size of the gradient box
    pub extent: Vec2,
    /// Corner radius of the gradient box
    pub radius: f32,
    /// Width of the transition between inner and outer color
    pub feather: f32,
    pub inner_color: Color,
    pub outer_color: Color,
    /// Image sampled by the paint, if any
    pub image: Option<ImageId>,
}

impl Paint {
    /// Create a solid color paint.
    pub const fn color(color: Color) -> Self {
        Self {
            transform: Transform2D::IDENTITY,
            extent: Vec2::ZERO,
            radius: 0.0,
            feather: 1.0,
            inner_color: color,
            outer_color: color,
            image: None,
        }
    }

    /// Create a linear gradient from `start` to `end`.
    ///
    /// Points before `start` take `inner`, points past `end` take `outer`.
    pub fn linear_gradient(start: Vec2, end: Vec2, inner: Color, outer: Color) -> Self {
        let large = LINEAR_GRADIENT_EXTENT;
        let delta = end - start;
        let len = delta.length();
        let dir = if len > 1e-4 { delta / len } else { Vec2::Y };

        Self {
            transform: Transform2D::from_values(
                dir.y,
                -dir.x,
                dir.x,
                dir.y,
                start.x - dir.x * large,
                start.y - dir.y * large,
            ),
            extent: Vec2::new(large, large + len * 0.5),
            radius: 0.0,
            feather: len.max(1.0),
            inner_color: inner,
            outer_color: outer,
            image: None,
        }
    }

    /// Create a radial gradient around `center`, blending from `inner` at
    /// `inner_radius` to `outer` at `outer_radius`.
    pub fn radial_gradient(
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        let r = (inner_radius + outer_radius) * 0.5;
        let f = outer_radius - inner_radius;

        Self {
            transform: Transform2D::translate(center.x, center.y),
            extent: Vec2::splat(r),
            radius: r,
            feather: f.max(1.0),
            inner_color: inner,
            outer_color: outer,
            image: None,
        }
    }

    /// Create a box gradient: a feathered rounded rectangle, commonly used
    /// for drop shadows.
    pub fn box_gradient(
        position: Vec2,
        size: Vec2,
        radius: f32,
        feather: f32,
        inner: Color,
        outer: Color,
    ) -> Self {
        let center = position + size * 0.5;

        Self {
            transform: Transform2D::translate(center.x, center.y),
            extent: size * 0.5,
            radius,
            feather: feather.max(1.0),
            inner_color: inner,
            outer_color: outer,
            image: None,
        }
    }

    /// Create an image pattern with its top-left corner at `origin`, one
    /// image repeat covering `size`, rotated by `angle` radians.
    pub fn image_pattern(origin: Vec2, size: Vec2, angle: f32, image: ImageId, alpha: f32) -> Self {
        let tint = Color::WHITE.with_alpha(alpha);

        Self {
            transform: Transform2D::rotate(angle).then(&Transform2D::translate(origin.x, origin.y)),
            extent: size,
            radius: 0.0,
            feather: 0.0,
            inner_color: tint,
            outer_color: tint,
            image: Some(image),
        }
    }

    /// Check if this paint is a single flat color.
    pub fn is_solid(&self) -> bool {
        self.image.is_none() && self.inner_color == self.outer_color
    }

    /// Get the color if this is a solid paint.
    pub fn as_solid(&self) -> Option<Color> {
        self.is_solid().then_some(self.inner_color)
    }

    /// Same paint with both colors' alpha multiplied by `factor`.
    pub fn with_alpha_scale(self, factor: f32) -> Self {
        Self {
            inner_color: self.inner_color.scale_alpha(factor),
            outer_color: self.outer_color.scale_alpha(factor),
            ..self
        }
    }

    /// Same paint with `transform` applied after its own transform.
    pub fn transformed(self, transform: &Transform2D) -> Self {
        Self {
            transform: self.transform.then(transform),
            ..self
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::color(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_paint() {
        let paint = Paint::color(Color::RED);
        assert!(paint.is_solid());
        assert_eq!(paint.as_solid(), Some(Color::RED));
        assert_eq!(Paint::from(Color::RED), paint);
    }

    #[test]
    fn test_linear_gradient() {
        let paint = Paint::linear_gradient(Vec2::ZERO, Vec2::new(0.0, 100.0), Color::WHITE, Color::BLACK);
        assert!(!paint.is_solid());
        assert_eq!(paint.feather, 100.0);
        assert_eq!(paint.extent, Vec2::new(1e5, 1e5 + 50.0));
        // Paint-space origin sits `large` units before the start point.
        assert_eq!(paint.transform.translation(), Vec2::new(0.0, -1e5));
    }

    #[test]
    fn test_degenerate_linear_gradient() {
        let paint = Paint::linear_gradient(Vec2::ONE, Vec2::ONE, Color::WHITE, Color::BLACK);
        assert_eq!(paint.feather, 1.0);
        assert!(paint.extent.x.is_finite());
    }

    #[test]
    fn test_radial_gradient() {
        let paint = Paint::radial_gradient(Vec2::new(10.0, 20.0), 5.0, 15.0, Color::WHITE, Color::BLACK);
        assert_eq!(paint.radius, 10.0);
        assert_eq!(paint.feather, 10.0);
        assert_eq!(paint.extent, Vec2::splat(10.0));
        assert_eq!(paint.transform.translation(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_box_gradient() {
        let paint = Paint::box_gradient(Vec2::ZERO, Vec2::new(100.0, 50.0), 4.0, 0.5, Color::BLACK, Color::TRANSPARENT);
        assert_eq!(paint.transform.translation(), Vec2::new(50.0, 25.0));
        assert_eq!(paint.extent, Vec2::new(50.0, 25.0));
        assert_eq!(paint.feather, 1.0);
    }

    #[test]
    fn test_image_pattern() {
        let paint = Paint::image_pattern(Vec2::new(5.0, 6.0), Vec2::new(32.0, 32.0), 0.0, ImageId(3), 0.5);
        assert_eq!(paint.image, Some(ImageId(3)));
        assert_eq!(paint.inner_color.to_array(), [1.0, 1.0, 1.0, 0.5]);
        assert_eq!(paint.outer_color, paint.inner_color);
        assert!(!paint.is_solid());
        assert_eq!(paint.transform.translation(), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_alpha_scale() {
        let paint = Paint::color(Color::rgba(1.0, 0.0, 0.0, 0.5)).with_alpha_scale(0.5);
        assert_eq!(paint.inner_color.a, 0.25);
        assert_eq!(paint.outer_color.a, 0.25);
    }

    #[test]
    fn test_transformed() {
        let paint = Paint::color(Color::WHITE).transformed(&Transform2D::translate(3.0, 4.0));
        assert_eq!(paint.transform.translation(), Vec2::new(3.0, 4.0));
    }
}
