//! Interpreter that converts an L-System symbol sequence into line segments.
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with a [`TurtleConfig`],
//! register symbol-to-operation mappings via [`TurtleInterpreter::set_op`] or
//! [`TurtleInterpreter::populate_symbols`], then call
//! [`TurtleInterpreter::build_segments`] with a [`symbios::SymbiosState`].
//! [`interpret`] does all three for a plain symbol sequence.

use crate::error::SandboxError;
use crate::grammar::RuleSet;
use crate::segment::LineSegment;
use crate::turtle::{TurtleOp, TurtleState};
use log::debug;
use symbios::{SymbiosState, SymbolTable};

/// Configuration for turtle interpretation.
#[derive(Clone, Debug)]
pub struct TurtleConfig {
    /// Turn angle in degrees applied by `+` and `-`.
    pub angle: f64,
    /// Distance covered by every draw or move step.
    pub step_length: f64,
    /// Symbol that always moves and draws.
    pub draw_symbol: char,
    /// Symbol that always moves without drawing.
    pub move_symbol: char,
    /// Round each step to whole units on both axes.
    pub round_steps: bool,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            angle: 90.0,
            step_length: 10.0,
            draw_symbol: 'F',
            move_symbol: 'f',
            round_steps: true,
        }
    }
}

impl TurtleConfig {
    /// Checks the numeric parameters before a run.
    pub fn validate(&self) -> Result<(), SandboxError> {
        if !self.angle.is_finite() {
            return Err(SandboxError::InvalidAngle(self.angle));
        }
        if !self.step_length.is_finite() || self.step_length <= 0.0 {
            return Err(SandboxError::InvalidStep(self.step_length));
        }
        Ok(())
    }
}

/// Interprets L-System output as planar turtle graphics.
pub struct TurtleInterpreter {
    op_map: Vec<TurtleOp>,
    config: TurtleConfig,
}

impl TurtleInterpreter {
    /// Creates a new interpreter with the given configuration and an empty symbol map.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            op_map: Vec::new(),
            config,
        }
    }

    /// Replaces the entire symbol-to-operation map in one step (builder pattern).
    ///
    /// `map` is indexed by symbol ID as returned by [`symbios::SymbolTable`].
    /// Any ID that falls outside the slice is treated as [`TurtleOp::Ignore`].
    pub fn with_map(mut self, map: Vec<TurtleOp>) -> Self {
        self.op_map = map;
        self
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Assigns a single [`TurtleOp`] to a symbol ID, growing the map as needed.
    pub fn set_op(&mut self, sym_id: u16, op: TurtleOp) {
        let idx = sym_id as usize;
        if idx >= self.op_map.len() {
            self.op_map.resize(idx + 1, TurtleOp::Ignore);
        }
        self.op_map[idx] = op;
    }

    /// Registers operations for every symbol known to `interner`.
    ///
    /// Rules flagged `drawing` map to [`TurtleOp::Draw`]. The configured draw and
    /// move symbols and the four control symbols are then mapped on top, so they
    /// behave the same regardless of their rule flags. Symbols missing from the
    /// interner are skipped.
    pub fn populate_symbols(&mut self, rules: &RuleSet, interner: &SymbolTable) {
        for (symbol, rule) in rules.iter() {
            if rule.drawing
                && let Some(id) = resolve(interner, symbol)
            {
                self.set_op(id, TurtleOp::Draw);
            }
        }

        let fixed = [
            (self.config.draw_symbol, TurtleOp::Draw),
            (self.config.move_symbol, TurtleOp::Move),
            ('+', TurtleOp::Turn(1.0)),
            ('-', TurtleOp::Turn(-1.0)),
            ('[', TurtleOp::Push),
            (']', TurtleOp::Pop),
        ];
        for (symbol, op) in fixed {
            if let Some(id) = resolve(interner, symbol) {
                self.set_op(id, op);
            }
        }
    }

    /// Walks every symbol in `state` and returns one segment per draw event.
    ///
    /// The turtle starts at the origin with heading 0. `[` saves position and heading;
    /// `]` restores the most recent save and does nothing when the stack is empty.
    /// Segments are in world space and in the order they were drawn.
    pub fn build_segments(&self, state: &SymbiosState) -> Vec<LineSegment> {
        let mut segments = Vec::new();
        let mut turtle = TurtleState::default();
        let mut stack: Vec<TurtleState> = Vec::new();
        let turn = self.config.angle.to_radians();

        for i in 0..state.len() {
            let view = match state.get_view(i) {
                Some(v) => v,
                None => break,
            };

            let op = self
                .op_map
                .get(view.sym as usize)
                .unwrap_or(&TurtleOp::Ignore);

            match op {
                TurtleOp::Draw => {
                    let start = turtle.advance(self.config.step_length, self.config.round_steps);
                    segments.push(LineSegment::from_points(start, turtle.position));
                }
                TurtleOp::Move => {
                    turtle.advance(self.config.step_length, self.config.round_steps);
                }
                TurtleOp::Turn(sign) => turtle.turn(turn * sign),
                TurtleOp::Push => stack.push(turtle),
                TurtleOp::Pop => {
                    if let Some(saved) = stack.pop() {
                        turtle = saved;
                    }
                }
                TurtleOp::Ignore => {}
            }
        }

        debug!(
            "interpreted {} symbols into {} segments",
            state.len(),
            segments.len()
        );
        segments
    }
}

fn resolve(interner: &SymbolTable, symbol: char) -> Option<u16> {
    let mut buf = [0u8; 4];
    let name: &str = symbol.encode_utf8(&mut buf);
    interner.resolve_id(name)
}

/// Interns `symbols` into `interner` and stores them, in order, in a new state.
///
/// The state is sized to hold the whole sequence, so its capacity never truncates
/// an expansion the caller has already allowed.
pub fn encode(
    symbols: &[char],
    interner: &mut SymbolTable,
) -> Result<SymbiosState, SandboxError> {
    let mut state = SymbiosState::new();
    state.max_capacity = state.max_capacity.max(symbols.len());

    let mut buf = [0u8; 4];
    for &symbol in symbols {
        let id = interner
            .get_or_intern(symbol.encode_utf8(&mut buf))
            .map_err(SandboxError::SymbolTable)?;
        state
            .push(id, 0.0, &[])
            .map_err(|e| SandboxError::SymbolTable(e.to_string()))?;
    }

    Ok(state)
}

/// Interprets an expanded symbol sequence with `rules` deciding which extra symbols draw.
pub fn interpret(
    symbols: &[char],
    rules: &RuleSet,
    config: TurtleConfig,
) -> Result<Vec<LineSegment>, SandboxError> {
    config.validate()?;

    let mut interner = SymbolTable::new();
    let state = encode(symbols, &mut interner)?;

    let mut interpreter = TurtleInterpreter::new(config);
    interpreter.populate_symbols(rules, &interner);
    Ok(interpreter.build_segments(&state))
}
