//! Drawing state and its save/restore stack.

use bitflags::bitflags;
use glam::Vec2;
use quill_core::Color;

use crate::{LineCap, LineJoin, Paint, Transform2D};

/// Clip region: an oriented rectangle given by a transform to its center
/// and half-size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scissor {
    /// Transform from scissor space (origin at the rectangle center) to
    /// drawing space
    pub transform: Transform2D,
    /// Half-size of the rectangle; negative when clipping is disabled
    pub extent: Vec2,
}

impl Default for Scissor {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Intersection of two `[x, y, w, h]` rectangles, with zero size when they
/// do not overlap.
pub fn intersect_rects(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let min_x = a[0].max(b[0]);
    let min_y = a[1].max(b[1]);
    let max_x = (a[0] + a[2]).min(b[0] + b[2]);
    let max_y = (a[1] + a[3]).min(b[1] + b[3]);
    [min_x, min_y, (max_x - min_x).max(0.0), (max_y - min_y).max(0.0)]
}

impl Scissor {
    /// No clipping.
    pub const DISABLED: Self = Self {
        transform: Transform2D::IDENTITY,
        extent: Vec2::splat(-1.0),
    };

    /// Clip to the rectangle `(x, y, w, h)` given in `transform`'s space.
    /// Negative sizes clamp to zero.
    pub fn new(transform: &Transform2D, x: f32, y: f32, w: f32, h: f32) -> Self {
        let w = w.max(0.0);
        let h = h.max(0.0);

        Self {
            transform: Transform2D::translate(x + w * 0.5, y + h * 0.5).then(transform),
            extent: Vec2::new(w * 0.5, h * 0.5),
        }
    }

    /// Check if clipping is active.
    pub fn is_enabled(&self) -> bool {
        self.extent.x >= 0.0
    }

    /// Axis-aligned rectangle covering this scissor, expressed in
    /// `transform`'s space. `None` when clipping is disabled.
    pub fn local_rect(&self, transform: &Transform2D) -> Option<[f32; 4]> {
        if !self.is_enabled() {
            return None;
        }

        let [a, b, c, d, e, f] = self.transform.then(&transform.inverse()).to_array();
        let (ex, ey) = (self.extent.x, self.extent.y);
        let tex = ex * a.abs() + ey * c.abs();
        let tey = ex * b.abs() + ey * d.abs();

        Some([e - tex, f - tey, tex * 2.0, tey * 2.0])
    }

    /// Intersect with the rectangle `(x, y, w, h)` in `transform`'s space.
    ///
    /// The current region is first approximated by its bounding rectangle in
    /// that space, so rotated scissors only clip conservatively.
    pub fn intersect(&self, transform: &Transform2D, x: f32, y: f32, w: f32, h: f32) -> Self {
        match self.local_rect(transform) {
            None => Self::new(transform, x, y, w, h),
            Some(rect) => {
                let [x, y, w, h] = intersect_rects(rect, [x, y, w, h]);
                Self::new(transform, x, y, w, h)
            }
        }
    }
}

bitflags! {
    /// Horizontal and vertical text alignment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextAlign: u8 {
        const LEFT = 1 << 0;
        const CENTER = 1 << 1;
        const RIGHT = 1 << 2;
        const TOP = 1 << 3;
        const MIDDLE = 1 << 4;
        const BOTTOM = 1 << 5;
        const BASELINE = 1 << 6;
    }
}

impl Default for TextAlign {
    fn default() -> Self {
        TextAlign::LEFT | TextAlign::BASELINE
    }
}

/// Text settings carried with the drawing state for an external text layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub letter_spacing: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub align: TextAlign,
    /// Font face handle, `None` until one is selected
    pub font_face: Option<u32>,
}

impl TextStyle {
    pub const DEFAULT: Self = Self {
        font_size: 16.0,
        letter_spacing: 0.0,
        line_height: 1.0,
        align: TextAlign::LEFT.union(TextAlign::BASELINE),
        font_face: None,
    };
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The mutable drawing state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f32,
    pub miter_limit: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    /// Multiplied into paint alpha when geometry is submitted
    pub alpha: f32,
    pub transform: Transform2D,
    pub scissor: Scissor,
    pub text: TextStyle,
}

impl RenderState {
    pub const DEFAULT: Self = Self {
        fill: Paint::color(Color::WHITE),
        stroke: Paint::color(Color::BLACK),
        stroke_width: 1.0,
        miter_limit: 10.0,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Miter,
        alpha: 1.0,
        transform: Transform2D::IDENTITY,
        scissor: Scissor::DISABLED,
        text: TextStyle::DEFAULT,
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Bounded stack of [`RenderState`] values.
///
/// The stack always holds at least one state: the current one. Saving past
/// the capacity is ignored and restoring the last state does nothing.
#[derive(Debug, Clone)]
pub struct StateStack {
    current: RenderState,
    saved: Vec<RenderState>,
    capacity: usize,
}

impl StateStack {
    /// Create a stack holding one default state.
    pub fn new(capacity: usize) -> Self {
        Self {
            current: RenderState::DEFAULT,
            saved: Vec::with_capacity(capacity.saturating_sub(1)),
            capacity: capacity.max(1),
        }
    }

    /// Push a copy of the current state. Returns `false` if the stack is full.
    pub fn save(&mut self) -> bool {
        if self.depth() >= self.capacity {
            tracing::warn!(
                "State stack full ({} states), ignoring save",
                self.capacity
            );
            return false;
        }
        self.saved.push(self.current.clone());
        true
    }

    /// Pop back to the previously saved state. Returns `false` if only one
    /// state remains.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    /// Reset the current state to defaults, leaving saved states alone.
    pub fn reset(&mut self) {
        self.current = RenderState::DEFAULT;
    }

    /// Drop every saved state and reset the current one.
    pub fn clear(&mut self) {
        self.saved.clear();
        self.reset();
    }

    pub fn current(&self) -> &RenderState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut RenderState {
        &mut self.current
    }

    /// Number of states on the stack, the current one included.
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
