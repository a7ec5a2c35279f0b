//! # charsheet - Reactive Value Engine for Tabletop Character Sheets
//!
//! The spreadsheet core beneath a character-sheet UI:
//! - **Named values** are plain numbers or formulas over other names
//! - **Reactive** reads: formulas re-evaluate as their inputs change
//! - **Transactional** assignment: cyclic formulas are rejected with no
//!   partial state left behind
//! - **Cached** results with cascading invalidation, so reads stay cheap
//!
//! ## Core Concepts
//!
//! ### Value Pipeline
//!
//! Formula text flows through a fixed pipeline:
//!
//! ```text
//! raw text → normalize → validate → build (AST) → dependency graph → cache
//! ```
//!
//! 1. **Normalization** lowercases and strips whitespace
//! 2. **Validation** rejects malformed text before any tree exists
//! 3. **Building** turns the text into an owned tree via a worklist
//! 4. **The graph** records who must be recomputed when a name changes
//! 5. **Evaluation** walks the tree against the sheet and a fallback
//!    context, memoizing the result
//!
//! ### Formula Language
//!
//! Arithmetic (`+ - * / ^`), grouping parens, numeric literals, bracketed
//! references to other values (`[Creo Exp]`), and the functions `sqrt`,
//! `pow`, `round`, `roundup`, `rounddown`, `min`, and `max`. Case and
//! whitespace never matter.
//!
//! ## Example
//!
//! ```rust
//! use charsheet::{CharacterSheet, GameContext};
//!
//! let mut sheet = CharacterSheet::new();
//! let context = GameContext::new();
//!
//! // an Ars Magica art score derived from its experience total
//! sheet.set_value("Creo Exp", 7.0, &context).unwrap();
//! sheet
//!     .set_expression("Creo", "RoundDown((sqrt(8 * [Creo Exp] + 1) - 1) / 2)", &context)
//!     .unwrap();
//! assert_eq!(sheet.get_value("creo", &context).unwrap(), Some(3.0));
//!
//! // raising the experience updates the score on the next read
//! sheet.set_value("creo exp", 15.0, &context).unwrap();
//! assert_eq!(sheet.get_value("creo", &context).unwrap(), Some(5.0));
//!
//! // circular definitions are rejected outright
//! assert!(sheet
//!     .set_expression("creo exp", "[creo] * 2", &context)
//!     .is_err());
//! ```
//!
//! ## Modules
//!
//! - [`sheet`] - The value store: base values, expressions, cache, callbacks
//! - [`expression`] - A named formula and its tree
//! - [`parser`] - Root-operation finder and worklist tree builder
//! - [`validate`] - Normalization and pre-parse validation
//! - [`eval`] - Tree evaluation against value sources
//! - [`ast`] - Tree representation
//! - [`graph`] - Dependency tracking and cycle detection
//! - [`context`] - Campaign-level fallback values
//! - [`value_id`] - Normalized value names
//! - [`error`] - Error types

pub mod ast;
pub mod context;
pub mod error;
pub mod eval;
pub mod expression;
pub mod graph;
pub mod parser;
pub mod sheet;
pub mod validate;
pub mod value_id;

// Re-export main types for convenience
pub use ast::{Arity, Ast, NodeId, NodeKind};
pub use context::GameContext;
pub use error::{EvaluationError, SyntaxError};
pub use eval::{evaluate, ValueLookup};
pub use expression::Expression;
pub use graph::DependencyGraph;
pub use sheet::{ChangeCallback, CharacterSheet};
pub use validate::{normalize, validate};
pub use value_id::ValueId;
