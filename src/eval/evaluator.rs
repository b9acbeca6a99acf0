use std::io::{self, Write};

use thiserror::Error;

use crate::adapter::Adapter;
use crate::ast::{Function, InvariantViolation};
use crate::diagnostics::Reporter;
use crate::function_table::FunctionTable;

use super::context::ExecutionContext;
use super::value::Value;

pub type EvalResult<T> = Result<T, EvalError>;

/// A rule failed at runtime. Everything except [`EvalError::Invariant`] is a
/// problem with the rule or the tree it ran against.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Undefined variable: {name} @Line: {line}")]
    UndefinedVariable { name: String, line: usize },

    #[error("Function with name \"{name}\" not defined! @Line: {line}")]
    UndefinedFunction { name: String, line: usize },

    #[error("Function with name \"{name}\" called with {given} parameters instead of {expected}. @Line: {line}")]
    ArityMismatch {
        name: String,
        given: usize,
        expected: usize,
        line: usize,
    },

    #[error("Parameter \"{type_name}\" of {operation} is not a known Node Type. @Line: {line}")]
    UnknownNodeType {
        operation: String,
        type_name: String,
        line: usize,
    },

    #[error("Variable named \"{name}\" has empty value! @Line: {line}")]
    EmptyValue { name: String, line: usize },

    #[error("Variable named \"{name}\" has no attributes! @Line: {line}")]
    NoAttributes { name: String, line: usize },

    #[error("Variable named \"{name}\" has no attribute named \"{attribute}\"! @Line: {line}")]
    MissingAttribute {
        name: String,
        attribute: String,
        line: usize,
    },

    #[error("Value of {name}.{attribute} \"{value}\" is not a number! @Line: {line}")]
    NotANumber {
        name: String,
        attribute: String,
        value: String,
        line: usize,
    },

    #[error("Number {literal} is out of range! @Line: {line}")]
    NumberOutOfRange { literal: String, line: usize },

    #[error("{operation} called with expression which returned nothing. @Line: {line}")]
    EmptyOperand { operation: String, line: usize },

    #[error("Operation {operation} parameter is NULL pointer. @Line: {line}")]
    NullReference { operation: String, line: usize },

    #[error("Failed to write output @Line: {line}: {source}")]
    Output {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl EvalError {
    pub fn line(&self) -> usize {
        match self {
            Self::UndefinedVariable { line, .. }
            | Self::UndefinedFunction { line, .. }
            | Self::ArityMismatch { line, .. }
            | Self::UnknownNodeType { line, .. }
            | Self::EmptyValue { line, .. }
            | Self::NoAttributes { line, .. }
            | Self::MissingAttribute { line, .. }
            | Self::NotANumber { line, .. }
            | Self::NumberOutOfRange { line, .. }
            | Self::EmptyOperand { line, .. }
            | Self::NullReference { line, .. }
            | Self::Output { line, .. } => *line,
            Self::Invariant(violation) => violation.line(),
        }
    }

    /// Whether a call boundary may absorb the error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Invariant(_))
    }
}

/// Tree-walking interpreter for one batch of rule executions.
///
/// Expression and statement evaluation live in the sibling `expression` and
/// `statement` modules; this type holds the state they share.
pub struct Evaluator<'a, A: Adapter> {
    pub(super) functions: &'a FunctionTable,
    pub(super) adapter: &'a A,
    pub(super) output: &'a mut dyn Write,
    pub(super) reporter: &'a Reporter,
    pub(super) context: ExecutionContext<A::Node>,
}

impl<'a, A: Adapter> Evaluator<'a, A> {
    pub fn new(
        functions: &'a FunctionTable,
        adapter: &'a A,
        output: &'a mut dyn Write,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            functions,
            adapter,
            output,
            reporter,
            context: ExecutionContext::new(),
        }
    }

    /// Runs a rule from a fresh scope and returns its result.
    pub fn run(&mut self, function: &Function) -> EvalResult<Value<A::Node>> {
        self.context.reset();
        self.eval_function(function)
    }

    /// Binds the rule's id as its return slot, runs the body in the current
    /// scope and reads the slot back.
    pub(super) fn eval_function(&mut self, function: &Function) -> EvalResult<Value<A::Node>> {
        tracing::debug!(rule = %function.id, depth = self.context.depth(), "enter rule");
        self.context
            .scope_mut()
            .set(function.id.clone(), Value::empty());
        self.eval_block(&function.body)?;
        let result = self
            .context
            .scope()
            .get(&function.id)
            .cloned()
            .unwrap_or_default();
        tracing::debug!(rule = %function.id, truthy = result.is_truthy(), "leave rule");
        Ok(result)
    }

    pub fn context(&self) -> &ExecutionContext<A::Node> {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_lines_and_recoverability() {
        let error = EvalError::NotANumber {
            name: "f".to_string(),
            attribute: "size".to_string(),
            value: "big".to_string(),
            line: 12,
        };
        assert_eq!(error.line(), 12);
        assert!(error.is_recoverable());
        assert_eq!(
            error.to_string(),
            "Value of f.size \"big\" is not a number! @Line: 12"
        );

        let error = EvalError::from(InvariantViolation::CallStackUnderflow { line: 4 });
        assert_eq!(error.line(), 4);
        assert!(!error.is_recoverable());
    }
}
