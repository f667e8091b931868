//! Turtle state and operations for planar line drawing.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// The state of the drawing turtle.
///
/// This is the record pushed onto the branch stack by `[` and restored by `]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the cursor.
    pub position: DVec2,

    /// Current heading in radians. `0` points along `+X`.
    pub heading: f64,
}

impl TurtleState {
    /// Unit vector along the current heading.
    pub fn forward(&self) -> DVec2 {
        DVec2::from_angle(self.heading)
    }

    /// Turns the turtle by `angle` radians.
    pub fn turn(&mut self, angle: f64) {
        self.heading += angle;
    }

    /// Moves the cursor `step` units along the heading and returns where it started.
    ///
    /// With `round` set, each axis of the step is rounded to a whole unit so that
    /// closed figures close exactly. Halves round up toward `+inf` on both axes, so
    /// `-2.5` becomes `-2` rather than `-3`.
    pub fn advance(&mut self, step: f64, round: bool) -> DVec2 {
        let origin = self.position;
        let delta = self.forward() * step;
        self.position += if round { (delta + 0.5).floor() } else { delta };
        origin
    }
}

/// Operations that can be performed by the drawing turtle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Move forward and emit a segment.
    Draw,
    /// Move forward without drawing.
    Move,
    /// Rotate by the configured angle times the sign (`+`/`-`).
    Turn(f64),
    /// Save the turtle state onto the stack (`[`).
    Push,
    /// Restore the most recently pushed turtle state (`]`).
    Pop,
    /// No-op — symbol has no drawing meaning.
    Ignore,
}
