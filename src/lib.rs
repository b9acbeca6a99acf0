//! # kensa
//!
//! An embeddable rule engine. Rules are written in a small DSL and evaluated
//! against a syntax tree owned by the host, which the engine only reaches
//! through the [`Adapter`] trait.
//!
//! ```text
//! rule files → Preprocessor → Tokenizer → Analyzer → FunctionTable → Evaluator ⇄ Adapter
//! ```
//!
//! ## Rule language
//!
//! ```text
//! ; long functions are reported
//! @LongFunctions:
//! FOR #f IN GET_NODES_OF_TYPE(Function)
//!     IF #f.lines > 50 THEN
//!         PRINT(#f)
//!         @LongFunctions = TRUE
//!     END
//! END
//! END
//! ```
//!
//! Every expression yields a sequence of node handles; an empty sequence is
//! false. A rule's name doubles as its return variable.
//!
//! ## Modules
//!
//! * [`tokenizer`] and [`preprocessor`]: rule text to tokens
//! * [`analyzer`]: backtracking parser combinators and the rule grammar
//! * [`ast`]: the rule tree
//! * [`eval`]: the interpreter
//! * [`engine`]: load / list / execute front-end
//! * [`adapter`]: the host query interface and a JSON-backed implementation
//! * [`config`], [`diagnostics`], [`error`]: ambient concerns

pub mod adapter;
pub mod analyzer;
pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod eval;
pub mod function_table;
pub mod preprocessor;
pub mod tokenizer;

// Re-exports
pub use adapter::{Adapter, Attributes};
pub use diagnostics::{Diagnostic, Severity};
pub use engine::{LoadError, LoadReport, RuleEngine, RuleOutcome};
pub use error::*;
