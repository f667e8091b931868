//! End-to-end run from a scene description to viewport-space segments.
//!
//! A [`Pipeline`] holds the construction-time state (configuration and viewport)
//! and is otherwise stateless: every call to [`Pipeline::run`] reconciles, expands,
//! interprets, normalizes and merges from scratch.

use crate::error::SandboxError;
use crate::grammar::{GrammarExpander, ProductionRule, RuleSet, is_reserved, reconcile_rules};
use crate::interpreter::{TurtleConfig, interpret};
use crate::merge::{DEFAULT_MERGE_THRESHOLD, SegmentMerger};
use crate::normalize::{DEFAULT_PADDING, Normalizer, Viewport};
use crate::segment::LineSegment;
use log::debug;
use serde::{Deserialize, Serialize};

/// Application-wide settings that do not change between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Largest iteration count a scene may request.
    pub max_iterations: u32,
    /// Step length of newly created scenes.
    pub default_step_length: f64,
    /// Turn angle, in degrees, of newly created scenes.
    pub default_angle: f64,
    /// Viewport padding in pixels.
    pub padding: f64,
    /// Segment count above which merging is skipped.
    pub merge_threshold: usize,
    pub draw_symbol: char,
    pub move_symbol: char,
    /// Round every turtle step to whole units.
    pub round_steps: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_iterations: 12,
            default_step_length: 10.0,
            default_angle: 90.0,
            padding: DEFAULT_PADDING,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            draw_symbol: 'F',
            move_symbol: 'f',
            round_steps: true,
        }
    }
}

impl SandboxConfig {
    /// Parses and validates a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SandboxError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the draw and move symbols are usable.
    ///
    /// Neither may be a control symbol, and they must differ.
    pub fn validate(&self) -> Result<(), SandboxError> {
        for symbol in [self.draw_symbol, self.move_symbol] {
            if is_reserved(symbol) {
                return Err(SandboxError::ReservedSymbol(symbol));
            }
        }
        if self.draw_symbol == self.move_symbol {
            return Err(SandboxError::SymbolClash(self.draw_symbol));
        }
        Ok(())
    }
}

/// Everything the user edits: the grammar and how to draw it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub axiom: String,
    pub rules: RuleSet,
    #[serde(default)]
    pub iterations: u32,
    /// Turn angle in degrees.
    pub angle: f64,
    pub step_length: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::dragon_preset(&SandboxConfig::default())
    }
}

impl Scene {
    /// The Heighway dragon, drawn with the configuration's default angle and step.
    pub fn dragon(config: &SandboxConfig) -> Result<Self, SandboxError> {
        config.validate()?;
        Ok(Self::dragon_preset(config))
    }

    fn dragon_preset(config: &SandboxConfig) -> Self {
        let rules = [
            (
                config.draw_symbol,
                ProductionRule::new(config.draw_symbol.to_string())
                    .drawing()
                    .mandatory(),
            ),
            (
                config.move_symbol,
                ProductionRule::placeholder(config.move_symbol),
            ),
            ('X', ProductionRule::new("X+YF+")),
            ('Y', ProductionRule::new("-FX-Y")),
        ]
        .into_iter()
        .collect();

        Self {
            axiom: format!("{}X", config.draw_symbol),
            rules,
            iterations: 0,
            angle: config.default_angle,
            step_length: config.default_step_length,
        }
    }

    /// Parses a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, SandboxError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    /// The scene's rules reconciled against its axiom. The caller should adopt these.
    pub rules: RuleSet,
    /// Length of the expanded symbol sequence.
    pub symbol_count: usize,
    /// Segments drawn before merging.
    pub raw_segment_count: usize,
    /// Viewport-space segments ready to stroke.
    pub segments: Vec<LineSegment>,
}

/// Runs the four drawing stages for a fixed configuration and viewport.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: SandboxConfig,
    expander: GrammarExpander,
    normalizer: Normalizer,
    merger: SegmentMerger,
}

impl Pipeline {
    pub fn new(config: SandboxConfig, viewport: Viewport) -> Result<Self, SandboxError> {
        config.validate()?;
        Ok(Self {
            expander: GrammarExpander::new(config.max_iterations),
            normalizer: Normalizer::new(viewport),
            merger: SegmentMerger::new(config.merge_threshold),
            config,
        })
    }

    /// Builds a pipeline for a `width` x `height` canvas using the configured padding.
    pub fn with_size(
        config: SandboxConfig,
        width: f64,
        height: f64,
    ) -> Result<Self, SandboxError> {
        let viewport = Viewport::new(width, height, config.padding)?;
        Self::new(config, viewport)
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        self.normalizer.viewport()
    }

    /// Replaces the viewport after the canvas changed size.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), SandboxError> {
        let viewport = Viewport::new(width, height, self.config.padding)?;
        self.normalizer = Normalizer::new(viewport);
        Ok(())
    }

    /// Produces the frame for `scene`.
    pub fn run(&self, scene: &Scene) -> Result<Frame, SandboxError> {
        let rules = reconcile_rules(&scene.axiom, &scene.rules);
        let symbols = self.expander.expand(&scene.axiom, &rules, scene.iterations)?;

        let turtle = TurtleConfig {
            angle: scene.angle,
            step_length: scene.step_length,
            draw_symbol: self.config.draw_symbol,
            move_symbol: self.config.move_symbol,
            round_steps: self.config.round_steps,
        };
        let raw = interpret(&symbols, &rules, turtle)?;
        let fitted = self.normalizer.normalize(&raw);
        let segments = self.merger.merge(&fitted);

        debug!(
            "iteration {}: {} symbols, {} segments ({} after merge)",
            scene.iterations,
            symbols.len(),
            raw.len(),
            segments.len()
        );

        Ok(Frame {
            rules,
            symbol_count: symbols.len(),
            raw_segment_count: raw.len(),
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::with_size(SandboxConfig::default(), 500.0, 500.0).unwrap()
    }

    #[test]
    fn default_scene_is_the_dragon_seed() {
        let scene = Scene::default();
        assert_eq!(scene.axiom, "FX");
        assert_eq!(scene.rules.len(), 4);
        assert!(scene.rules.get('F').unwrap().mandatory);
        assert!(!scene.rules.get('f').unwrap().active);
    }

    #[test]
    fn run_reconciles_rules_and_drops_unused_ones() {
        let frame = pipeline().run(&Scene::default()).unwrap();
        // `f` never appears in the axiom or an active replacement.
        assert!(!frame.rules.contains('f'));
        assert!(frame.rules.contains('F'));
        assert_eq!(frame.symbol_count, 2);
        assert_eq!(frame.segments.len(), 1);
    }

    #[test]
    fn dragon_segment_count_doubles_per_iteration() {
        let pipeline = pipeline();
        let mut scene = Scene::default();
        for n in 0..6 {
            scene.iterations = n;
            let frame = pipeline.run(&scene).unwrap();
            assert_eq!(frame.raw_segment_count, 1 << n);
        }
    }

    #[test]
    fn iterations_above_configured_maximum_fail() {
        let mut scene = Scene::default();
        scene.iterations = 13;
        assert!(matches!(
            pipeline().run(&scene),
            Err(SandboxError::IterationLimit { requested: 13, max: 12 })
        ));
    }

    #[test]
    fn resize_rejects_too_small_canvas() {
        let mut pipeline = pipeline();
        assert!(pipeline.resize(30.0, 300.0).is_err());
        pipeline.resize(800.0, 600.0).unwrap();
        assert_eq!(pipeline.viewport().width, 800.0);
    }

    #[test]
    fn config_json_fills_missing_fields_with_defaults() {
        let config = SandboxConfig::from_json(r#"{"max_iterations": 4, "padding": 8}"#).unwrap();
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.padding, 8.0);
        assert_eq!(config.merge_threshold, DEFAULT_MERGE_THRESHOLD);
        assert!(SandboxConfig::from_json("not json").is_err());
    }

    #[test]
    fn reserved_draw_symbol_is_rejected() {
        assert!(matches!(
            SandboxConfig::from_json(r#"{"draw_symbol": "+"}"#),
            Err(SandboxError::ReservedSymbol('+'))
        ));
        assert!(matches!(
            SandboxConfig::from_json(r#"{"move_symbol": "]"}"#),
            Err(SandboxError::ReservedSymbol(']'))
        ));
    }

    #[test]
    fn draw_and_move_symbols_must_differ() {
        let config = SandboxConfig {
            move_symbol: 'F',
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SandboxError::SymbolClash('F'))));
        assert!(matches!(
            Scene::dragon(&config),
            Err(SandboxError::SymbolClash('F'))
        ));
        assert!(matches!(
            Pipeline::new(config, Viewport::default()),
            Err(SandboxError::SymbolClash('F'))
        ));
    }

    #[test]
    fn dragon_follows_configured_draw_symbol() {
        let config = SandboxConfig::from_json(r#"{"draw_symbol": "G", "default_angle": 60}"#)
            .unwrap();
        let scene = Scene::dragon(&config).unwrap();
        assert_eq!(scene.axiom, "GX");
        assert!(scene.rules.get('G').unwrap().drawing);
        assert_eq!(scene.angle, 60.0);
    }

    #[test]
    fn scene_round_trips_through_json() {
        let scene = Scene::default();
        let json = serde_json::to_string(&scene).unwrap();
        assert_eq!(Scene::from_json(&json).unwrap(), scene);
    }
}
