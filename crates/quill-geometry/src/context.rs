//! Immediate-mode drawing context.
//!
//! [`Context`] owns the drawing state, the command buffer and the path
//! cache. Path calls append transformed commands; [`Context::fill`] and
//! [`Context::stroke`] flatten them once, expand them into vertices and
//! submit the result to the backend.

use glam::Vec2;
use quill_core::Color;
use quill_core::profiling::{profile_function, profile_scope};

use crate::config::is_valid_pixel_ratio;
use crate::curve::QuadraticBezier;
use crate::shape::arc_commands;
use crate::{
    CommandBuffer, ContextDescriptor, ContextResult, ImageId, LineCap, LineJoin, Paint, PathCache,
    PathCommand, RenderBackend, RenderPath, RenderState, Scissor, Shape, StateStack, TextAlign,
    Tolerances, Transform2D, Winding,
};

/// Miter limit used for the antialiasing fringe of fills.
const FILL_FRINGE_MITER_LIMIT: f32 = 2.4;

/// Per-frame submission counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub fill_triangles: usize,
    pub stroke_triangles: usize,
}

/// Immediate-mode 2D drawing context.
///
/// # Example
///
/// ```
/// use quill_core::Color;
/// use quill_geometry::{Context, ContextDescriptor, RecordingBackend};
///
/// let mut ctx = Context::new(RecordingBackend::new(true), ContextDescriptor::default())?;
/// ctx.begin_frame(640.0, 480.0, 1.0);
///
/// ctx.begin_path();
/// ctx.circle(100.0, 100.0, 40.0);
/// ctx.set_fill_color(Color::RED);
/// ctx.fill();
///
/// ctx.set_stroke_width(3.0);
/// ctx.stroke();
///
/// let stats = ctx.end_frame();
/// assert!(stats.draw_calls > 0);
/// # Ok::<(), quill_geometry::ContextError>(())
/// ```
pub struct Context<B: RenderBackend> {
    backend: B,
    descriptor: ContextDescriptor,
    commands: CommandBuffer,
    cache: PathCache,
    states: StateStack,
    tolerances: Tolerances,
    stats: FrameStats,
}

impl<B: RenderBackend> Context<B> {
    /// Create a context drawing into `backend`.
    pub fn new(backend: B, descriptor: ContextDescriptor) -> ContextResult<Self> {
        descriptor.validate()?;

        tracing::info!(
            "Creating context '{}' (pixel ratio {}, {} states)",
            descriptor.name,
            descriptor.device_pixel_ratio,
            descriptor.max_states
        );

        Ok(Self {
            backend,
            tolerances: descriptor.tolerances(),
            states: StateStack::new(descriptor.max_states),
            descriptor,
            commands: CommandBuffer::new(),
            cache: PathCache::new(),
            stats: FrameStats::default(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consume the context, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn descriptor(&self) -> &ContextDescriptor {
        &self.descriptor
    }

    /// Tolerances in effect for the current frame.
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// The recorded commands of the current path, in drawing space.
    pub fn commands(&self) -> &[PathCommand] {
        self.commands.commands()
    }

    /// Derived geometry of the current path.
    pub fn path_cache(&self) -> &PathCache {
        &self.cache
    }

    /// Counters accumulated since the last [`Context::begin_frame`].
    pub fn frame_stats(&self) -> FrameStats {
        self.stats
    }

    /// Size of `image` as reported by the backend.
    pub fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        self.backend.image_size(image)
    }

    // Frame lifecycle

    /// Start a frame: reset the state stack, derive tolerances for
    /// `device_pixel_ratio` and forward the viewport to the backend.
    pub fn begin_frame(&mut self, window_width: f32, window_height: f32, device_pixel_ratio: f32) {
        profile_function!();

        self.states.clear();
        if is_valid_pixel_ratio(device_pixel_ratio) {
            self.tolerances = Tolerances::from_pixel_ratio(device_pixel_ratio);
        } else {
            tracing::warn!(
                "Ignoring invalid device pixel ratio {} for '{}'",
                device_pixel_ratio,
                self.descriptor.name
            );
        }
        self.backend
            .viewport(window_width, window_height, self.tolerances.device_pixel_ratio);
        self.stats = FrameStats::default();

        tracing::debug!(
            "Begin frame {}x{} @ {}",
            window_width,
            window_height,
            self.tolerances.device_pixel_ratio
        );
    }

    /// Finish the frame, flushing the backend.
    pub fn end_frame(&mut self) -> FrameStats {
        profile_function!();

        self.backend.flush();
        tracing::debug!(
            "End frame: {} draw calls, {} fill / {} stroke triangles",
            self.stats.draw_calls,
            self.stats.fill_triangles,
            self.stats.stroke_triangles
        );
        self.stats
    }

    // State

    /// Push a copy of the current state. Ignored when the stack is full.
    pub fn save(&mut self) {
        self.states.save();
    }

    /// Pop the last saved state. The bottom state is never popped.
    pub fn restore(&mut self) {
        self.states.restore();
    }

    /// Run `f` between a save and a restore.
    pub fn with_saved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let result = f(self);
        self.restore();
        result
    }

    /// Reset the current state to defaults.
    pub fn reset(&mut self) {
        self.states.reset();
    }

    pub fn state(&self) -> &RenderState {
        self.states.current()
    }

    /// Number of states on the stack, the current one included.
    pub fn state_depth(&self) -> usize {
        self.states.depth()
    }

    fn state_mut(&mut self) -> &mut RenderState {
        self.states.current_mut()
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.state_mut().stroke_width = width;
    }

    pub fn set_miter_limit(&mut self, limit: f32) {
        self.state_mut().miter_limit = limit;
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state_mut().line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state_mut().line_join = join;
    }

    /// Set the alpha multiplied into every paint at submission.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state_mut().alpha = alpha;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state_mut().fill = Paint::color(color);
    }

    /// Set the fill paint; the current transform is baked into it.
    pub fn set_fill_paint(&mut self, paint: Paint) {
        let state = self.state_mut();
        state.fill = paint.transformed(&state.transform);
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state_mut().stroke = Paint::color(color);
    }

    /// Set the stroke paint; the current transform is baked into it.
    pub fn set_stroke_paint(&mut self, paint: Paint) {
        let state = self.state_mut();
        state.stroke = paint.transformed(&state.transform);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.state_mut().text.font_size = size;
    }

    pub fn set_letter_spacing(&mut self, spacing: f32) {
        self.state_mut().text.letter_spacing = spacing;
    }

    pub fn set_line_height(&mut self, line_height: f32) {
        self.state_mut().text.line_height = line_height;
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state_mut().text.align = align;
    }

    pub fn set_font_face_id(&mut self, font_face: u32) {
        self.state_mut().text.font_face = Some(font_face);
    }

    // Transform

    pub fn reset_transform(&mut self) {
        self.state_mut().transform = Transform2D::IDENTITY;
    }

    /// Apply the matrix `[a, b, c, d, e, f]` in the current local space.
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.apply_transform(&Transform2D::from_values(a, b, c, d, e, f));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.apply_transform(&Transform2D::translate(x, y));
    }

    /// Rotate by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        self.apply_transform(&Transform2D::rotate(angle));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.apply_transform(&Transform2D::scale(x, y));
    }

    pub fn skew_x(&mut self, angle: f32) {
        self.apply_transform(&Transform2D::skew_x(angle));
    }

    pub fn skew_y(&mut self, angle: f32) {
        self.apply_transform(&Transform2D::skew_y(angle));
    }

    pub fn current_transform(&self) -> Transform2D {
        self.state().transform
    }

    fn apply_transform(&mut self, op: &Transform2D) {
        let state = self.state_mut();
        state.transform = state.transform.pre_multiply(op);
    }

    // Scissor

    /// Clip to the rectangle in the current transform's space, replacing any
    /// previous scissor.
    pub fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let state = self.state_mut();
        state.scissor = Scissor::new(&state.transform, x, y, w, h);
    }

    /// Clip to the intersection of the current scissor and the rectangle.
    pub fn intersect_scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let state = self.state_mut();
        state.scissor = state.scissor.intersect(&state.transform, x, y, w, h);
    }

    pub fn reset_scissor(&mut self) {
        self.state_mut().scissor = Scissor::DISABLED;
    }

    /// Current scissor as `[x, y, w, h]` in the current transform's space.
    pub fn scissor_rect(&self) -> Option<[f32; 4]> {
        let state = self.state();
        state.scissor.local_rect(&state.transform)
    }

    // Path

    /// Start a new path, discarding the previous commands and geometry.
    pub fn begin_path(&mut self) {
        self.commands.clear();
        self.cache.clear();
    }

    fn append(&mut self, commands: impl IntoIterator<Item = PathCommand>) {
        self.commands
            .append(commands, &self.states.current().transform);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.append([PathCommand::MoveTo(Vec2::new(x, y))]);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.append([PathCommand::LineTo(Vec2::new(x, y))]);
    }

    /// Cubic Bezier from the current point through two control points.
    pub fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.append([PathCommand::BezierTo {
            control1: Vec2::new(c1x, c1y),
            control2: Vec2::new(c2x, c2y),
            to: Vec2::new(x, y),
        }]);
    }

    /// Quadratic Bezier from the current point.
    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let quad = QuadraticBezier::new(self.commands.last_point(), Vec2::new(cx, cy), Vec2::new(x, y));
        let cubic = quad.to_cubic();
        self.append([PathCommand::BezierTo {
            control1: cubic.control1,
            control2: cubic.control2,
            to: cubic.to,
        }]);
    }

    /// Circular arc from angle `a0` to `a1` (radians). Continues the current
    /// sub-path with a line if the path already has commands.
    pub fn arc(&mut self, cx: f32, cy: f32, radius: f32, a0: f32, a1: f32, dir: Winding) {
        let continue_path = !self.commands.is_empty();
        self.append(arc_commands(Vec2::new(cx, cy), radius, a0, a1, dir, continue_path));
    }

    pub fn close_path(&mut self) {
        self.append([PathCommand::Close]);
    }

    /// Set the winding of the current sub-path.
    pub fn path_winding(&mut self, winding: Winding) {
        self.append([PathCommand::Winding(winding)]);
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.shape(&Shape::rect(Vec2::new(x, y), Vec2::new(w, h)));
    }

    pub fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        self.shape(&Shape::rounded_rect(Vec2::new(x, y), Vec2::new(w, h), radius));
    }

    /// Rounded rectangle with per-corner radii, clockwise from top-left.
    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect_varying(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        top_left: f32,
        top_right: f32,
        bottom_right: f32,
        bottom_left: f32,
    ) {
        self.shape(&Shape::rounded_rect_varying(
            Vec2::new(x, y),
            Vec2::new(w, h),
            [top_left, top_right, bottom_right, bottom_left],
        ));
    }

    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        self.shape(&Shape::ellipse(Vec2::new(cx, cy), Vec2::new(rx, ry)));
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32) {
        self.shape(&Shape::circle(Vec2::new(cx, cy), radius));
    }

    /// Append the commands of `shape`.
    pub fn shape(&mut self, shape: &Shape) {
        self.append(shape.to_commands());
    }

    // Rendering

    /// Fill the current path with the fill paint.
    pub fn fill(&mut self) {
        profile_function!();

        let state = self.states.current();
        let paint = state.fill.with_alpha_scale(state.alpha);
        let scissor = state.scissor;

        self.cache.flatten(self.commands.commands(), &self.tolerances);

        let fringe = self.tolerances.fringe_width;
        let aa = if self.backend.edge_anti_alias() { fringe } else { 0.0 };
        {
            profile_scope!("expand_fill");
            self.cache.expand_fill(aa, LineJoin::Miter, FILL_FRINGE_MITER_LIMIT);
        }

        let paths: Vec<RenderPath<'_>> = self
            .cache
            .render_paths()
            .filter(|path| !path.fill.is_empty())
            .collect();
        if paths.is_empty() {
            tracing::trace!("Nothing to fill");
            return;
        }

        self.backend
            .render_fill(&paint, &scissor, fringe, self.cache.bounds(), &paths);

        for path in &paths {
            self.stats.fill_triangles += path.fill.len().saturating_sub(2);
            self.stats.stroke_triangles += path.stroke.len().saturating_sub(2);
            self.stats.draw_calls += 2;
        }
    }

    /// Stroke the current path with the stroke paint.
    pub fn stroke(&mut self) {
        profile_function!();

        let state = self.states.current();
        let scale = state.transform.average_scale();
        let fringe = self.tolerances.fringe_width;
        let mut stroke_width = (state.stroke_width * scale).clamp(0.0, self.descriptor.max_stroke_width);
        let mut paint = state.stroke.with_alpha_scale(state.alpha);
        let (line_cap, line_join, miter_limit) = (state.line_cap, state.line_join, state.miter_limit);
        let scissor = state.scissor;

        if stroke_width < fringe {
            // Thinner than a pixel: draw one fringe wide at reduced coverage.
            let coverage = (stroke_width / fringe).clamp(0.0, 1.0);
            paint = paint.with_alpha_scale(coverage * coverage);
            stroke_width = fringe;
        }

        self.cache.flatten(self.commands.commands(), &self.tolerances);

        let aa = if self.backend.edge_anti_alias() { fringe } else { 0.0 };
        {
            profile_scope!("expand_stroke");
            self.cache.expand_stroke(
                stroke_width * 0.5,
                aa,
                line_cap,
                line_join,
                miter_limit,
                self.tolerances.tess_tol,
            );
        }

        let paths: Vec<RenderPath<'_>> = self.cache.render_paths().collect();
        if paths.is_empty() {
            tracing::trace!("Nothing to stroke");
            return;
        }

        self.backend
            .render_stroke(&paint, &scissor, fringe, stroke_width, &paths);

        for path in &paths {
            self.stats.stroke_triangles += path.stroke.len().saturating_sub(2);
            self.stats.draw_calls += 2;
        }
    }

    /// Log every cached sub-path's vertices.
    pub fn debug_dump_path_cache(&self) {
        tracing::debug!(
            "Path cache of '{}': {} sub-path(s)",
            self.descriptor.name,
            self.cache.sub_paths().len()
        );
        for (i, path) in self.cache.render_paths().enumerate() {
            tracing::debug!(
                " - Path {}: closed={} convex={}",
                i,
                path.closed,
                path.convex
            );
            if !path.fill.is_empty() {
                tracing::debug!("   - fill: {}", path.fill.len());
                for v in path.fill {
                    tracing::debug!("     {:?} {:?}", v.position, v.uv);
                }
            }
            if !path.stroke.is_empty() {
                tracing::debug!("   - stroke: {}", path.stroke.len());
                for v in path.stroke {
                    tracing::debug!("     {:?} {:?}", v.position, v.uv);
                }
            }
        }
    }
}
