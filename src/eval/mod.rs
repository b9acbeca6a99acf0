//! # Evaluation
//!
//! Runs parsed rules against a host tree through an [`Adapter`](crate::adapter::Adapter).
//!
//! ## Components
//!
//! * **Value**: the sequence of node handles every expression produces
//! * **Execution Context**: the active scope and the call stack of suspended
//!   caller scopes
//! * **Evaluator**: a single match-based interpreter over the AST, split into
//!   statement and expression evaluation
//!
//! ## Pipeline
//!
//! 1. The engine creates an [`Evaluator`] per `execute` batch
//! 2. Each entry rule runs from a fresh scope; its id is its return slot
//! 3. Calls evaluate arguments in the caller's scope, then run the callee in
//!    a new scope while the caller's waits on the call stack
//! 4. Runtime errors inside a call are reported and turn the call's result
//!    empty; errors at the top level fail only that rule

pub mod context;
pub mod evaluator;
mod expression;
mod statement;
pub mod value;

pub use context::{ExecutionContext, VariableSet};
pub use evaluator::{EvalError, EvalResult, Evaluator};
pub use value::Value;
