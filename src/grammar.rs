//! Production rules and the generation-by-generation grammar expander.

use crate::error::SandboxError;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Control symbols interpreted directly by the turtle. They can never carry a rule.
pub const RESERVED_SYMBOLS: [char; 4] = ['+', '-', '[', ']'];

/// Returns true for the turtle's turn and branch symbols.
pub fn is_reserved(symbol: char) -> bool {
    RESERVED_SYMBOLS.contains(&symbol)
}

/// A per-symbol rewrite definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    /// String substituted for the symbol each generation while the rule is active.
    pub replacement: String,

    /// Whether the rule participates in expansion.
    #[serde(default)]
    pub active: bool,

    /// Whether the turtle draws a segment when it meets this symbol.
    #[serde(default)]
    pub drawing: bool,

    /// The UI may not deactivate or remove this rule. Carried as data only.
    #[serde(default)]
    pub mandatory: bool,
}

impl ProductionRule {
    /// An active, non-drawing rule with the given replacement.
    pub fn new(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            active: true,
            drawing: false,
            mandatory: false,
        }
    }

    /// The inert rule created for a symbol that has just appeared: rewrites to
    /// itself and is switched off.
    pub fn placeholder(symbol: char) -> Self {
        Self {
            replacement: symbol.to_string(),
            active: false,
            drawing: false,
            mandatory: false,
        }
    }

    pub fn drawing(mut self) -> Self {
        self.drawing = true;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Production rules keyed by symbol.
///
/// Reserved control symbols are rejected on insertion and on deserialization, so a
/// `RuleSet` never holds a rule for `+`, `-`, `[` or `]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<char, ProductionRule>", into = "BTreeMap<char, ProductionRule>")]
pub struct RuleSet {
    rules: BTreeMap<char, ProductionRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the rule for `symbol`, returning the previous one.
    pub fn insert(
        &mut self,
        symbol: char,
        rule: ProductionRule,
    ) -> Result<Option<ProductionRule>, SandboxError> {
        if is_reserved(symbol) {
            return Err(SandboxError::ReservedSymbol(symbol));
        }
        Ok(self.rules.insert(symbol, rule))
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, symbol: char, rule: ProductionRule) -> Result<Self, SandboxError> {
        self.insert(symbol, rule)?;
        Ok(self)
    }

    pub fn get(&self, symbol: char) -> Option<&ProductionRule> {
        self.rules.get(&symbol)
    }

    pub fn get_mut(&mut self, symbol: char) -> Option<&mut ProductionRule> {
        self.rules.get_mut(&symbol)
    }

    pub fn remove(&mut self, symbol: char) -> Option<ProductionRule> {
        self.rules.remove(&symbol)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.rules.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates rules in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &ProductionRule)> {
        self.rules.iter().map(|(symbol, rule)| (*symbol, rule))
    }

    /// Flips `active` on the rule for `symbol`. Mandatory rules stay active.
    ///
    /// Returns the new value, or `None` if there is no such rule.
    pub fn toggle_active(&mut self, symbol: char) -> Option<bool> {
        let rule = self.rules.get_mut(&symbol)?;
        rule.active = !rule.active || rule.mandatory;
        Some(rule.active)
    }

    /// Flips `drawing` on the rule for `symbol`. Mandatory rules keep drawing.
    pub fn toggle_drawing(&mut self, symbol: char) -> Option<bool> {
        let rule = self.rules.get_mut(&symbol)?;
        rule.drawing = !rule.drawing || rule.mandatory;
        Some(rule.drawing)
    }
}

impl TryFrom<BTreeMap<char, ProductionRule>> for RuleSet {
    type Error = SandboxError;

    fn try_from(rules: BTreeMap<char, ProductionRule>) -> Result<Self, Self::Error> {
        if let Some(symbol) = rules.keys().copied().find(|s| is_reserved(*s)) {
            return Err(SandboxError::ReservedSymbol(symbol));
        }
        Ok(Self { rules })
    }
}

/// Collects rules, leaving out any keyed by a reserved symbol.
impl FromIterator<(char, ProductionRule)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (char, ProductionRule)>>(iter: I) -> Self {
        let rules = iter
            .into_iter()
            .filter(|(symbol, _)| {
                let reserved = is_reserved(*symbol);
                if reserved {
                    warn!("dropping rule for reserved symbol '{symbol}'");
                }
                !reserved
            })
            .collect();
        Self { rules }
    }
}

impl From<RuleSet> for BTreeMap<char, ProductionRule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

/// Computes the rule set that matches the current axiom.
///
/// A symbol is *live* if it occurs in the axiom or in the replacement of an active
/// rule. Every live symbol without a rule gains a [`ProductionRule::placeholder`];
/// every rule whose symbol is no longer live is dropped unless it is mandatory.
/// Whitespace and reserved symbols never get rules. `rules` is left untouched.
pub fn reconcile_rules(axiom: &str, rules: &RuleSet) -> RuleSet {
    let live: BTreeSet<char> = axiom
        .chars()
        .chain(
            rules
                .iter()
                .filter(|(_, rule)| rule.active)
                .flat_map(|(_, rule)| rule.replacement.chars()),
        )
        .filter(|s| !s.is_whitespace() && !is_reserved(*s))
        .collect();

    let mut reconciled: BTreeMap<char, ProductionRule> = rules
        .iter()
        .filter(|(symbol, rule)| rule.mandatory || live.contains(symbol))
        .map(|(symbol, rule)| (symbol, rule.clone()))
        .collect();

    for symbol in live {
        reconciled
            .entry(symbol)
            .or_insert_with(|| ProductionRule::placeholder(symbol));
    }

    debug!(
        "reconciled {} rules into {} for axiom {:?}",
        rules.len(),
        reconciled.len(),
        axiom
    );

    RuleSet { rules: reconciled }
}

/// Rewrites an axiom through a bounded number of generations.
#[derive(Clone, Copy, Debug)]
pub struct GrammarExpander {
    max_iterations: u32,
}

impl GrammarExpander {
    /// Creates an expander that refuses iteration counts above `max_iterations`.
    pub fn new(max_iterations: u32) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Returns generation `iterations` of `axiom`.
    ///
    /// Each generation is one pass over the previous one: symbols with an active rule
    /// are replaced by the rule's full replacement, everything else is copied through.
    /// Text inserted during a pass is not rescanned until the next pass. Generation 0
    /// is the axiom itself.
    pub fn expand(
        &self,
        axiom: &str,
        rules: &RuleSet,
        iterations: u32,
    ) -> Result<Vec<char>, SandboxError> {
        if iterations > self.max_iterations {
            return Err(SandboxError::IterationLimit {
                requested: iterations,
                max: self.max_iterations,
            });
        }

        let mut current: Vec<char> = axiom.chars().collect();
        for generation in 1..=iterations {
            let mut next = Vec::with_capacity(current.len());
            for &symbol in &current {
                match rules.get(symbol) {
                    Some(rule) if rule.active => next.extend(rule.replacement.chars()),
                    _ => next.push(symbol),
                }
            }
            trace!("generation {generation}: {} symbols", next.len());
            current = next;
        }

        debug!(
            "expanded {:?} through {iterations} generations into {} symbols",
            axiom,
            current.len()
        );
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algae() -> RuleSet {
        RuleSet::new()
            .with('A', ProductionRule::new("AB"))
            .and_then(|r| r.with('B', ProductionRule::new("A")))
            .unwrap()
    }

    fn expand(axiom: &str, rules: &RuleSet, n: u32) -> String {
        GrammarExpander::new(16)
            .expand(axiom, rules, n)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn zero_iterations_returns_axiom_verbatim() {
        assert_eq!(expand("A+[B]", &algae(), 0), "A+[B]");
    }

    #[test]
    fn algae_generations_follow_fibonacci_lengths() {
        let rules = algae();
        assert_eq!(expand("A", &rules, 1), "AB");
        assert_eq!(expand("A", &rules, 2), "ABA");
        assert_eq!(expand("A", &rules, 3), "ABAAB");
        assert_eq!(expand("A", &rules, 5).len(), 13);
    }

    #[test]
    fn replacement_is_not_rescanned_within_a_pass() {
        let rules = RuleSet::new()
            .with('X', ProductionRule::new("XX"))
            .unwrap();
        assert_eq!(expand("X", &rules, 1), "XX");
        assert_eq!(expand("X", &rules, 3), "XXXXXXXX");
    }

    #[test]
    fn inactive_and_unknown_symbols_pass_through() {
        let rules = RuleSet::new()
            .with('F', ProductionRule::new("FF").inactive())
            .unwrap();
        assert_eq!(expand("F+G", &rules, 4), "F+G");
    }

    #[test]
    fn iteration_count_above_maximum_is_rejected() {
        let err = GrammarExpander::new(3).expand("A", &algae(), 4).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::IterationLimit {
                requested: 4,
                max: 3
            }
        ));
    }

    #[test]
    fn reserved_symbols_cannot_be_keys() {
        let mut rules = RuleSet::new();
        for symbol in RESERVED_SYMBOLS {
            assert!(matches!(
                rules.insert(symbol, ProductionRule::new("F")),
                Err(SandboxError::ReservedSymbol(s)) if s == symbol
            ));
        }
        assert!(rules.is_empty());
    }

    #[test]
    fn deserializing_reserved_key_fails() {
        let json = r#"{"+": {"replacement": "F", "active": true}}"#;
        assert!(serde_json::from_str::<RuleSet>(json).is_err());

        let ok: RuleSet = serde_json::from_str(r#"{"F": {"replacement": "FF"}}"#).unwrap();
        assert_eq!(ok.get('F').map(|r| r.replacement.as_str()), Some("FF"));
        assert!(!ok.get('F').unwrap().active);
    }

    #[test]
    fn reconcile_adds_placeholders_for_new_symbols() {
        let rules = RuleSet::new()
            .with('X', ProductionRule::new("X+YF+"))
            .unwrap();
        let reconciled = reconcile_rules("FX", &rules);

        assert_eq!(reconciled.get('F'), Some(&ProductionRule::placeholder('F')));
        assert_eq!(reconciled.get('Y'), Some(&ProductionRule::placeholder('Y')));
        assert_eq!(reconciled.get('X'), rules.get('X'));
        assert!(!reconciled.contains('+'));
    }

    #[test]
    fn reconcile_drops_vanished_symbols_but_keeps_mandatory() {
        let rules = RuleSet::new()
            .with('F', ProductionRule::new("G").drawing().mandatory().inactive())
            .and_then(|r| r.with('Q', ProductionRule::new("Q").inactive()))
            .and_then(|r| r.with('Z', ProductionRule::new("ZZ").inactive()))
            .unwrap();
        let reconciled = reconcile_rules("A", &rules);

        assert!(reconciled.contains('F'));
        assert!(reconciled.contains('A'));
        assert!(!reconciled.contains('Q'));
        assert!(!reconciled.contains('Z'));
        // Input is not mutated.
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn reconcile_ignores_whitespace_and_inactive_replacements() {
        let rules = RuleSet::new()
            .with('A', ProductionRule::new("B C").inactive())
            .unwrap();
        let reconciled = reconcile_rules("A A", &rules);
        assert_eq!(reconciled.len(), 1);
        assert!(reconciled.contains('A'));
    }

    #[test]
    fn collecting_skips_reserved_symbols() {
        let rules: RuleSet = [
            ('F', ProductionRule::new("FF")),
            ('[', ProductionRule::new("F")),
            ('X', ProductionRule::new("X")),
        ]
        .into_iter()
        .collect();
        assert_eq!(rules.len(), 2);
        assert!(!rules.contains('['));
    }

    #[test]
    fn rules_can_be_edited_and_removed_in_place() {
        let mut rules = algae();
        rules.get_mut('A').unwrap().replacement = "AAB".into();
        assert_eq!(expand("A", &rules, 1), "AAB");

        assert_eq!(rules.remove('B').map(|r| r.replacement), Some("A".to_string()));
        assert!(rules.remove('B').is_none());
        // Without a rule, B passes through unchanged.
        assert_eq!(expand("B", &rules, 3), "B");
    }

    #[test]
    fn toggling_mandatory_rule_keeps_it_on() {
        let mut rules = RuleSet::new()
            .with('F', ProductionRule::new("F").drawing().mandatory())
            .and_then(|r| r.with('G', ProductionRule::new("G")))
            .unwrap();

        assert_eq!(rules.toggle_active('F'), Some(true));
        assert_eq!(rules.toggle_drawing('F'), Some(true));
        assert_eq!(rules.toggle_active('G'), Some(false));
        assert_eq!(rules.toggle_active('G'), Some(true));
        assert_eq!(rules.toggle_active('?'), None);
    }
}
