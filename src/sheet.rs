//! The character-sheet value store.
//!
//! A `CharacterSheet` owns every named value of one character: plain
//! numbers, formula-backed values with their parsed trees, the memoized
//! results of those formulas, the dependency graph that ties them
//! together, and the change callbacks the UI layer hangs off individual
//! names. All mutation runs to completion before returning; there is no
//! partial evaluation.

use crate::context::GameContext;
use crate::error::{EvaluationError, SyntaxError};
use crate::eval::ValueLookup;
use crate::expression::Expression;
use crate::graph::DependencyGraph;
use crate::value_id::ValueId;
use std::collections::HashMap;

/// Notification hook invoked with a value's new number.
pub type ChangeCallback = Box<dyn Fn(f64)>;

/// The evaluator-facing view of a sheet: base values and cached expression
/// results. An uncached expression is invisible here — references resolve
/// through at most one level of substitution, never by re-entering another
/// formula.
struct SheetValues<'a> {
    base: &'a HashMap<ValueId, f64>,
    cached: &'a HashMap<ValueId, f64>,
}

impl ValueLookup for SheetValues<'_> {
    fn lookup(&self, name: &ValueId) -> Option<f64> {
        self.base
            .get(name)
            .or_else(|| self.cached.get(name))
            .copied()
    }
}

/// All state tracked for one character.
///
/// A name is either a base value (a number the user typed) or an
/// expression value (computed from a formula), never both. Expression
/// results are cached; changing a base value cascades re-evaluation down
/// the dependency graph so reads stay cheap and current.
///
/// # Examples
///
/// ```rust
/// use charsheet::{CharacterSheet, GameContext};
///
/// let mut sheet = CharacterSheet::new();
/// let context = GameContext::new();
///
/// sheet.set_value("Creo Exp", 7.0, &context).unwrap();
/// sheet
///     .set_expression("Creo", "RoundDown((sqrt(8*[Creo Exp]+1)-1)/2)", &context)
///     .unwrap();
/// assert_eq!(sheet.get_value("creo", &context).unwrap(), Some(3.0));
///
/// // raising the experience re-derives the score
/// sheet.set_value("creo exp", 15.0, &context).unwrap();
/// assert_eq!(sheet.get_value("creo", &context).unwrap(), Some(5.0));
/// ```
#[derive(Default)]
pub struct CharacterSheet {
    /// Flat user-entered numbers.
    base_values: HashMap<ValueId, f64>,
    /// Formula-backed values.
    expressions: HashMap<ValueId, Expression>,
    /// Memoized results for expression-backed names only.
    cached_values: HashMap<ValueId, f64>,
    /// Change hooks per name, invoked in insertion order.
    callbacks: HashMap<ValueId, Vec<ChangeCallback>>,
    /// Which values must be recomputed when a name changes.
    dependencies: DependencyGraph,
}

impl std::fmt::Debug for CharacterSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterSheet")
            .field("base_values", &self.base_values)
            .field("expressions", &self.expressions)
            .field("cached_values", &self.cached_values)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

impl CharacterSheet {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a base value.
    ///
    /// If the name was expression-backed it reverts to a plain number: the
    /// expression, its cached result, and its incoming dependency edges are
    /// dropped (its own dependents remain and now consume the number
    /// directly). The name's callbacks fire with the new value, then the
    /// change cascades depth-first through the dependency graph,
    /// re-evaluating and re-caching every dependent expression and firing
    /// its callbacks in turn.
    ///
    /// A dependent whose re-evaluation fails (say the new value makes it
    /// divide by zero) has its stale cache entry removed so the error
    /// surfaces on the next read of that name; the cascade continues past
    /// it. A dependent that is itself a base value means the graph is
    /// corrupted and aborts with [`EvaluationError::InvertedDependency`].
    pub fn set_value(
        &mut self,
        name: &str,
        value: f64,
        context: &GameContext,
    ) -> Result<(), EvaluationError> {
        let id = ValueId::new(name);
        if self.expressions.remove(&id).is_some() {
            self.cached_values.remove(&id);
            self.dependencies.clear_sources(&id);
        }
        self.base_values.insert(id.clone(), value);
        self.notify(&id, value);
        self.cascade_from(&id, context)
    }

    /// Parse a formula and bind it to a name.
    ///
    /// Consumes free-form text: mixed case and whitespace are normalized
    /// away before parsing. The assignment is transactional. The formula is
    /// parsed into a fresh tree, a candidate dependency graph is built from
    /// a clone of the live one, and cycle detection runs over it starting
    /// from `name`; a detected cycle returns
    /// [`SyntaxError::CyclicDependency`] with the offending path and leaves
    /// every observable piece of state exactly as it was. Only then is the
    /// candidate swapped in, any base value under the name dropped, and the
    /// expression stored, evaluated, and cached; the new value propagates
    /// to dependents through the same cascade a base-value change uses.
    ///
    /// A formula whose references are not yet resolvable is stored
    /// uncached rather than rejected; it evaluates lazily once its inputs
    /// exist.
    pub fn set_expression(
        &mut self,
        name: &str,
        raw_formula: &str,
        context: &GameContext,
    ) -> Result<(), SyntaxError> {
        let id = ValueId::new(name);
        if id.is_empty() {
            return Err(SyntaxError::EmptyStateValueName {
                expr: raw_formula.to_string(),
            });
        }

        let expression = Expression::parse(id.clone(), raw_formula)?;
        let references = expression.references();

        // candidate graph: the live graph stays untouched until the cycle
        // scan passes
        let mut candidate = self.dependencies.clone();
        candidate.set_sources(&id, &references);
        if let Some(path) = candidate.find_cycle_from(&id) {
            return Err(SyntaxError::CyclicDependency { path });
        }
        self.dependencies = candidate;

        self.base_values.remove(&id);
        self.cached_values.remove(&id);
        let values = SheetValues {
            base: &self.base_values,
            cached: &self.cached_values,
        };
        let result = expression.evaluate(&values, context);
        self.expressions.insert(id.clone(), expression);
        if let Ok(value) = result {
            self.cached_values.insert(id.clone(), value);
            // incoming edges only ever target expression names, so this
            // cascade cannot hit the inverted-dependency path
            let cascade = self.cascade_from(&id, context);
            debug_assert!(cascade.is_ok());
        }
        Ok(())
    }

    /// Read the current value of a name.
    ///
    /// Cached expression results are returned as-is; an uncached expression
    /// is evaluated and cached on the way out; otherwise the base value is
    /// returned. An unknown name is `Ok(None)` — absence is probe-able, not
    /// an error. Evaluation failures propagate and cache nothing.
    pub fn get_value(
        &mut self,
        name: &str,
        context: &GameContext,
    ) -> Result<Option<f64>, EvaluationError> {
        let id = ValueId::new(name);
        if let Some(&value) = self.cached_values.get(&id) {
            return Ok(Some(value));
        }
        if let Some(expression) = self.expressions.get(&id) {
            let values = SheetValues {
                base: &self.base_values,
                cached: &self.cached_values,
            };
            let value = expression.evaluate(&values, context)?;
            self.cached_values.insert(id, value);
            return Ok(Some(value));
        }
        Ok(self.base_values.get(&id).copied())
    }

    /// Whether the name is set on this sheet, as either kind of value.
    pub fn contains(&self, name: &str) -> bool {
        let id = ValueId::new(name);
        self.base_values.contains_key(&id) || self.expressions.contains_key(&id)
    }

    /// The expression bound to a name, if the name is formula-backed.
    pub fn expression(&self, name: &str) -> Option<&Expression> {
        self.expressions.get(&ValueId::new(name))
    }

    /// Register a hook invoked with the new value whenever `name` is
    /// rewritten by [`CharacterSheet::set_value`] or a cascade. Hooks on a
    /// name fire in registration order; no ordering is promised across
    /// names. Purely a notification side-channel.
    pub fn on_value_change(&mut self, name: &str, callback: impl Fn(f64) + 'static) {
        self.callbacks
            .entry(ValueId::new(name))
            .or_default()
            .push(Box::new(callback));
    }

    fn notify(&self, id: &ValueId, value: f64) {
        if let Some(callbacks) = self.callbacks.get(id) {
            for callback in callbacks {
                callback(value);
            }
        }
    }

    /// Depth-first re-evaluation of everything downstream of `id`.
    fn cascade_from(&mut self, id: &ValueId, context: &GameContext) -> Result<(), EvaluationError> {
        for dependent in self.dependencies.dependents_of(id) {
            if self.base_values.contains_key(&dependent) {
                return Err(EvaluationError::InvertedDependency(dependent));
            }
            let result = match self.expressions.get(&dependent) {
                Some(expression) => {
                    let values = SheetValues {
                        base: &self.base_values,
                        cached: &self.cached_values,
                    };
                    expression.evaluate(&values, context)
                }
                // the name participates in the graph but has no expression
                // yet; nothing to refresh
                None => continue,
            };
            match result {
                Ok(value) => {
                    self.cached_values.insert(dependent.clone(), value);
                    self.notify(&dependent, value);
                }
                Err(_) => {
                    // keep no stale number around; the error surfaces on
                    // the next read of this name
                    self.cached_values.remove(&dependent);
                }
            }
            self.cascade_from(&dependent, context)?;
        }
        Ok(())
    }
}
