//! Context configuration and the geometry tolerances derived from it.

use crate::{ContextError, ContextResult};

/// Geometry tolerances for one device pixel ratio.
///
/// All three scale inversely with the ratio so that flattening precision and
/// antialiasing width stay constant in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Maximum deviation of a flattened curve from the true curve
    pub tess_tol: f32,
    /// Points closer than this are merged
    pub dist_tol: f32,
    /// Width of the antialiasing fringe
    pub fringe_width: f32,
    pub device_pixel_ratio: f32,
}

impl Tolerances {
    /// Derive tolerances for `ratio` physical pixels per logical pixel.
    pub fn from_pixel_ratio(ratio: f32) -> Self {
        Self {
            tess_tol: 0.25 / ratio,
            dist_tol: 0.01 / ratio,
            fringe_width: 1.0 / ratio,
            device_pixel_ratio: ratio,
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::from_pixel_ratio(1.0)
    }
}

/// Check that `ratio` can be used to derive tolerances.
pub(crate) fn is_valid_pixel_ratio(ratio: f32) -> bool {
    ratio.is_finite() && ratio > 0.0
}

/// Configuration for creating a [`Context`](crate::Context).
///
/// # Example
///
/// ```
/// use quill_geometry::ContextDescriptor;
///
/// let desc = ContextDescriptor::default()
///     .with_name("HUD")
///     .with_device_pixel_ratio(2.0)
///     .with_max_states(16);
/// assert!(desc.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ContextDescriptor {
    /// Name for the context (used in log output).
    pub name: String,
    /// Initial device pixel ratio. `begin_frame` replaces it every frame.
    pub device_pixel_ratio: f32,
    /// Capacity of the state stack; saves past it are ignored.
    pub max_states: usize,
    /// Upper clamp for stroke widths in drawing space.
    pub max_stroke_width: f32,
}

impl Default for ContextDescriptor {
    fn default() -> Self {
        Self {
            name: "Quill".to_string(),
            device_pixel_ratio: 1.0,
            max_states: 32,
            max_stroke_width: 200.0,
        }
    }
}

impl ContextDescriptor {
    /// Set the context name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    pub fn with_max_stroke_width(mut self, width: f32) -> Self {
        self.max_stroke_width = width;
        self
    }

    /// Check every field, returning the first invalid one.
    pub fn validate(&self) -> ContextResult<()> {
        if !is_valid_pixel_ratio(self.device_pixel_ratio) {
            return Err(ContextError::InvalidPixelRatio(self.device_pixel_ratio));
        }
        if self.max_states == 0 {
            return Err(ContextError::InvalidStateCapacity(self.max_states));
        }
        if !(self.max_stroke_width.is_finite() && self.max_stroke_width > 0.0) {
            return Err(ContextError::InvalidStrokeWidthLimit(self.max_stroke_width));
        }
        Ok(())
    }

    /// Tolerances for the initial pixel ratio.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances::from_pixel_ratio(self.device_pixel_ratio)
    }
}
