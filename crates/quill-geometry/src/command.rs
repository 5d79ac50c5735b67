//! Path command recording.
//!
//! Commands are stored already transformed into drawing space: the transform
//! active when a command is appended is baked in immediately.

use crate::Transform2D;
use glam::Vec2;

/// Orientation of a sub-path.
///
/// Solid sub-paths have counter-clockwise (positive) area and add to the
/// filled region; holes are clockwise and cut it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    /// Counter-clockwise, fills.
    #[default]
    Solid,
    /// Clockwise, cuts holes.
    Hole,
}

impl Winding {
    /// Counter-clockwise; used as an arc direction.
    pub const CCW: Winding = Winding::Solid;
    /// Clockwise; used as an arc direction.
    pub const CW: Winding = Winding::Hole;
}

/// A command in a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Start a new sub-path.
    MoveTo(Vec2),
    /// Draw a line to a position.
    LineTo(Vec2),
    /// Draw a cubic Bezier curve from the current point.
    BezierTo {
        /// First control point
        control1: Vec2,
        /// Second control point
        control2: Vec2,
        /// End point
        to: Vec2,
    },
    /// Close the current sub-path.
    Close,
    /// Set the winding of the current sub-path.
    Winding(Winding),
}

impl PathCommand {
    /// The command's end point, if it has one.
    pub fn end_point(&self) -> Option<Vec2> {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::BezierTo { to, .. } => Some(*to),
            PathCommand::Close | PathCommand::Winding(_) => None,
        }
    }

    /// Copy of this command with every coordinate mapped through `transform`.
    pub fn transformed(&self, transform: &Transform2D) -> Self {
        match *self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(transform.transform_point(p)),
            PathCommand::LineTo(p) => PathCommand::LineTo(transform.transform_point(p)),
            PathCommand::BezierTo {
                control1,
                control2,
                to,
            } => PathCommand::BezierTo {
                control1: transform.transform_point(control1),
                control2: transform.transform_point(control2),
                to: transform.transform_point(to),
            },
            cmd @ (PathCommand::Close | PathCommand::Winding(_)) => cmd,
        }
    }
}

/// Flat, append-only stream of pre-transformed path commands.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<PathCommand>,
    /// Last end point in the caller's logical (untransformed) space.
    last_point: Vec2,
}

impl CommandBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.last_point = Vec2::ZERO;
    }

    /// Append logical-space commands, baking `transform` into each one.
    pub fn append(
        &mut self,
        commands: impl IntoIterator<Item = PathCommand>,
        transform: &Transform2D,
    ) {
        for cmd in commands {
            if let Some(p) = cmd.end_point() {
                self.last_point = p;
            }
            self.commands.push(cmd.transformed(transform));
        }
    }

    /// The recorded commands, in drawing space.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// End point of the last positioned command, in logical space.
    pub fn last_point(&self) -> Vec2 {
        self.last_point
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get the number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
