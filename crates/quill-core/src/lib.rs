//! Quill Core
//!
//! Shared services for the Quill vector graphics engine: logging setup,
//! profiling scopes and the color type used by paints.

pub mod color;
pub mod logging;
pub mod profiling;

pub use color::Color;
