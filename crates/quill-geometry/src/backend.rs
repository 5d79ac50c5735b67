//! Interface to the rasterizing backend.
//!
//! The context never draws anything itself; it hands finished vertex data
//! plus paint and scissor descriptors to a [`RenderBackend`].

use std::collections::HashMap;

use crate::{Bounds, ImageId, Paint, Scissor, Vertex};

/// Geometry of one sub-path as submitted to the backend.
///
/// `fill` is a triangle fan; `stroke` is a triangle strip (the stroke itself,
/// or the antialiasing fringe of a fill). Either may be empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPath<'a> {
    pub fill: &'a [Vertex],
    pub stroke: &'a [Vertex],
    pub closed: bool,
    pub convex: bool,
}

/// A rasterizer that consumes expanded geometry.
pub trait RenderBackend {
    /// Whether the backend wants antialiasing fringes generated.
    fn edge_anti_alias(&self) -> bool;

    /// Size of an image in pixels, if the backend knows it.
    fn image_size(&self, _image: ImageId) -> Option<(u32, u32)> {
        None
    }

    /// Called at the start of every frame.
    fn viewport(&mut self, _width: f32, _height: f32, _device_pixel_ratio: f32) {}

    /// Draw filled sub-paths. Non-convex sets are expected to be drawn with
    /// a stencil pass covering `bounds`.
    fn render_fill(
        &mut self,
        paint: &Paint,
        scissor: &Scissor,
        fringe_width: f32,
        bounds: Bounds,
        paths: &[RenderPath<'_>],
    );

    /// Draw stroked sub-paths of the given device-space width.
    fn render_stroke(
        &mut self,
        paint: &Paint,
        scissor: &Scissor,
        fringe_width: f32,
        stroke_width: f32,
        paths: &[RenderPath<'_>],
    );

    /// Called at the end of every frame.
    fn flush(&mut self) {}
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn edge_anti_alias(&self) -> bool {
        (**self).edge_anti_alias()
    }

    fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        (**self).image_size(image)
    }

    fn viewport(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        (**self).viewport(width, height, device_pixel_ratio)
    }

    fn render_fill(
        &mut self,
        paint: &Paint,
        scissor: &Scissor,
        fringe_width: f32,
        bounds: Bounds,
        paths: &[RenderPath<'_>],
    ) {
        (**self).render_fill(paint, scissor, fringe_width, bounds, paths)
    }

    fn render_stroke(
        &mut self,
        paint: &Paint,
        scissor: &Scissor,
        fringe_width: f32,
        stroke_width: f32,
        paths: &[RenderPath<'_>],
    ) {
        (**self).render_stroke(paint, scissor, fringe_width, stroke_width, paths)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

/// Owned copy of a [`RenderPath`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPath {
    pub fill: Vec<Vertex>,
    pub stroke: Vec<Vertex>,
    pub closed: bool,
    pub convex: bool,
}

impl From<&RenderPath<'_>> for CapturedPath {
    fn from(path: &RenderPath<'_>) -> Self {
        Self {
            fill: path.fill.to_vec(),
            stroke: path.stroke.to_vec(),
            closed: path.closed,
            convex: path.convex,
        }
    }
}

/// Records a submission made to a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill {
        paint: Paint,
        scissor: Scissor,
        fringe_width: f32,
        bounds: Bounds,
        paths: Vec<CapturedPath>,
    },
    Stroke {
        paint: Paint,
        scissor: Scissor,
        fringe_width: f32,
        stroke_width: f32,
        paths: Vec<CapturedPath>,
    },
}

impl DrawCall {
    /// Submitted sub-paths.
    pub fn paths(&self) -> &[CapturedPath] {
        match self {
            DrawCall::Fill { paths, .. } | DrawCall::Stroke { paths, .. } => paths,
        }
    }

    pub fn paint(&self) -> &Paint {
        match self {
            DrawCall::Fill { paint, .. } | DrawCall::Stroke { paint, .. } => paint,
        }
    }

    pub fn scissor(&self) -> &Scissor {
        match self {
            DrawCall::Fill { scissor, .. } | DrawCall::Stroke { scissor, .. } => scissor,
        }
    }
}

/// Headless backend that keeps a copy of every submission.
///
/// # Example
///
/// ```
/// use quill_geometry::{Context, ContextDescriptor, RecordingBackend};
///
/// let mut ctx = Context::new(RecordingBackend::new(true), ContextDescriptor::default()).unwrap();
/// ctx.begin_frame(800.0, 600.0, 1.0);
/// ctx.begin_path();
/// ctx.rect(10.0, 10.0, 100.0, 50.0);
/// ctx.fill();
/// ctx.end_frame();
///
/// assert_eq!(ctx.backend().calls().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    edge_anti_alias: bool,
    calls: Vec<DrawCall>,
    viewport: Option<(f32, f32, f32)>,
    flushes: usize,
    images: HashMap<ImageId, (u32, u32)>,
}

impl RecordingBackend {
    /// Create a backend; `edge_anti_alias` selects whether fringes are
    /// requested.
    pub fn new(edge_anti_alias: bool) -> Self {
        Self {
            edge_anti_alias,
            ..Default::default()
        }
    }

    /// Register an image size reported through [`RenderBackend::image_size`].
    pub fn with_image(mut self, image: ImageId, width: u32, height: u32) -> Self {
        self.images.insert(image, (width, height));
        self
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn last_call(&self) -> Option<&DrawCall> {
        self.calls.last()
    }

    /// Last viewport as `(width, height, device_pixel_ratio)`.
    pub fn last_viewport(&self) -> Option<(f32, f32, f32)> {
        self.viewport
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.viewport = None;
        self.flushes = 0;
    }
}

impl RenderBackend for RecordingBackend {
    fn edge_anti_alias(&self) -> bool {
        self.edge_anti_alias
    }

    fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        self.images.get(&image).copied()
    }

    fn viewport(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.viewport = Some((width, height, device_pixel_ratio));
    }

    fn render_fill(
        &mut self,
        paint: &Paint,
        scissor: &Scissor,
        fringe_width: f32,
        bounds: Bounds,
        paths: &[RenderPath<'_>],
    ) {
        self.calls.push(DrawCall::Fill {
            paint: *paint,
            scissor: *scissor,
            fringe_width,
            bounds,
            paths: paths.iter().map(CapturedPath::from).collect(),
        });
    }

    fn render_stroke(
        &mut self,
        paint: &Paint,
        scissor: &Scissor,
        fringe_width: f32,
        stroke_width: f32,
        paths: &[RenderPath<'_>],
    ) {
        self.calls.push(DrawCall::Stroke {
            paint: *paint,
            scissor: *scissor,
            fringe_width,
            stroke_width,
            paths: paths.iter().map(CapturedPath::from).collect(),
        });
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend() {
        let mut backend = RecordingBackend::new(false).with_image(ImageId(1), 64, 32);
        assert!(!backend.edge_anti_alias());
        assert_eq!(backend.image_size(ImageId(1)), Some((64, 32)));
        assert_eq!(backend.image_size(ImageId(2)), None);

        let fan = [Vertex::new(0.0, 0.0, 0.5, 1.0); 3];
        let path = RenderPath {
            fill: &fan,
            stroke: &[],
            closed: true,
            convex: true,
        };
        backend.viewport(100.0, 100.0, 2.0);
        backend.render_fill(&Paint::default(), &Scissor::DISABLED, 1.0, Bounds::EMPTY, &[path]);
        backend.flush();

        assert_eq!(backend.last_viewport(), Some((100.0, 100.0, 2.0)));
        assert_eq!(backend.flush_count(), 1);
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(backend.calls()[0].paths()[0].fill.len(), 3);

        assert_eq!(backend.take_calls().len(), 1);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_boxed_backend() {
        let mut backend: Box<dyn RenderBackend> = Box::new(RecordingBackend::new(true));
        assert!(backend.edge_anti_alias());
        backend.render_stroke(&Paint::default(), &Scissor::DISABLED, 1.0, 2.0, &[]);
    }
}
