use thiserror::Error;

use crate::adapter::json_tree::JsonTreeError;
use crate::analyzer::SyntaxError;
use crate::ast::InvariantViolation;
use crate::config::ConfigError;
use crate::engine::LoadError;
use crate::eval::EvalError;
use crate::tokenizer::token::TokenizerError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("RUNTIME ERROR: {0}")]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tree(#[from] JsonTreeError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }

    /// Source line of the problem, for errors raised by a specific rule.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Tokenizer(e) => Some(e.line()),
            Error::Syntax(e) => Some(e.line),
            Error::Load(LoadError::DuplicateFunction { line, .. }) => Some(*line),
            Error::Eval(e) => Some(e.line()),
            Error::Invariant(e) => Some(e.line()),
            _ => None,
        }
    }
}
