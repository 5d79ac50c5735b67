//! Quill Geometry - Immediate-mode 2D vector path tessellation
//!
//! This crate provides:
//! - A drawing [`Context`] with a save/restore state stack (transform,
//!   scissor, paints, stroke style)
//! - Path construction from lines, Bezier curves, arcs and shapes
//! - Adaptive curve flattening into cached polylines
//! - Antialiased fill and stroke expansion into triangle fans and strips
//! - A [`RenderBackend`] trait for the rasterizer that draws the result
//!
//! # Example
//!
//! ```
//! use quill_core::Color;
//! use quill_geometry::*;
//!
//! let mut ctx = Context::new(RecordingBackend::new(true), ContextDescriptor::default())?;
//! ctx.begin_frame(800.0, 600.0, 1.0);
//!
//! ctx.begin_path();
//! ctx.rounded_rect(10.0, 10.0, 200.0, 100.0, 8.0);
//! ctx.set_fill_paint(Paint::linear_gradient(
//!     glam::Vec2::new(10.0, 10.0),
//!     glam::Vec2::new(10.0, 110.0),
//!     Color::WHITE,
//!     Color::BLACK,
//! ));
//! ctx.fill();
//!
//! ctx.set_stroke_color(Color::RED);
//! ctx.set_stroke_width(2.0);
//! ctx.stroke();
//!
//! let stats = ctx.end_frame();
//! assert_eq!(ctx.backend().calls().len(), 2);
//! # let _ = stats;
//! # Ok::<(), ContextError>(())
//! ```

// Core primitives
mod command;
mod curve;
mod shape;
mod transform;

// Styling
mod paint;
mod state;

// Tessellation
mod fill;
mod path_cache;
mod stroke;
mod vertex;

// Context
mod backend;
mod config;
mod context;
mod error;

// Re-exports
pub use command::*;
pub use curve::*;
pub use shape::*;
pub use transform::*;

pub use paint::*;
pub use state::*;

pub use path_cache::*;
pub use stroke::*;
pub use vertex::*;

pub use backend::*;
pub use config::*;
pub use context::*;
pub use error::*;
