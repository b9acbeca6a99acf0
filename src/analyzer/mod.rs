//! # Analyzer (Parser)
//!
//! Turns the token stream of one rule file into [`ast::Function`]s using parser
//! combinators.
//!
//! ## Core Components
//!
//! * **Parser Trait**: the position-threaded parsing interface in [`core`]
//! * **Combinators**: composable building blocks in [`combinators`] and [`prelude`]
//! * **Grammar**: rule, statement and expression parsers in [`parsers`]
//!
//! ## Backtracking
//!
//! Ordered choice is the only source of ambiguity resolution: alternatives are
//! tried in a fixed order and the first to succeed wins. Since every parser
//! receives its start position by value, a failed alternative needs no undo
//! step and nested alternatives each resume from their own start.
//!
//! ```text
//! Source Code → Preprocessor → Tokenizer → Analyzer/Parser → Evaluator
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use kensa::analyzer::parse_rules;
//! use kensa::tokenizer::token::Tokenizer;
//!
//! let tokens = Tokenizer::new().tokenize("@Always:\n@Always = TRUE\nEND").unwrap();
//! let parsed = parse_rules("inline", &tokens);
//! assert_eq!(parsed.functions.len(), 1);
//! assert!(parsed.error.is_none());
//! ```

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;

use thiserror::Error;

use crate::ast;
use crate::tokenizer::token::Token;

/// A malformed rule file, reported against the first token that did not fit.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Syntax error in {path} @Line: {line}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub path: String,
    pub line: usize,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub fn from_parse_error(path: &str, tokens: &[Token], error: &ParseError) -> Self {
        let found = tokens[error.get_position().min(tokens.len())..]
            .iter()
            .find(|token| !token.is_space());
        let line = found
            .or_else(|| tokens.last())
            .map(|token| token.line)
            .unwrap_or(0);
        let expected = match error.get_context() {
            Some(context) if !matches!(error, ParseError::NoAlternative { .. }) => {
                format!("{} (in {})", error.expectation(), context)
            }
            _ => error.expectation(),
        };
        Self {
            path: path.to_string(),
            line,
            expected,
            found: found
                .map(|token| format!("\"{}\"", token.text))
                .unwrap_or_else(|| "end of file".to_string()),
        }
    }
}

/// Result of parsing one file: every rule up to the first syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRules {
    pub functions: Vec<ast::Function>,
    pub error: Option<SyntaxError>,
}

/// Parses consecutive rule definitions until the tokens run out.
///
/// A syntax error stops the file: the rules parsed before it are kept and the
/// error is returned alongside them.
pub fn parse_rules(path: &str, tokens: &[Token]) -> ParsedRules {
    let rule = parsers::parse_function();
    let skip = parsers::skip_spaces();
    let mut functions = Vec::new();
    let mut pos = 0;

    loop {
        // skip_spaces never fails
        pos = skip.parse(tokens, pos).map(|(next, _)| next).unwrap_or(pos);
        if pos >= tokens.len() {
            break;
        }
        match rule.parse(tokens, pos) {
            Ok((next, function)) => {
                tracing::debug!(rule = %function.id, line = function.line(), "parsed rule");
                functions.push(function);
                pos = next;
            }
            Err(e) => {
                let error = SyntaxError::from_parse_error(path, tokens, &e);
                tracing::error!("{}", error);
                return ParsedRules {
                    functions,
                    error: Some(error),
                };
            }
        }
    }

    ParsedRules {
        functions,
        error: None,
    }
}
