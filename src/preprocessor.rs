//! # Preprocessor
//!
//! Normalizes raw rule source before tokenization. The only rewrite the rule
//! language needs is dropping comment lines (lines whose first character is
//! `;`). Dropped lines are blanked rather than removed so that every token
//! still reports the line it was written on.
//!
//! ```text
//! Source Code → Preprocessor → Tokenizer → Parser → Evaluator
//! ```

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COMMENT_LINE: Regex = Regex::new(r"(?m)^;[^\n]*").unwrap();
}

/// A trait for preprocessing different types of input
pub trait Preprocessor<T, U = T> {
    /// Process the input of type T and return the processed result
    fn process(&self, input: T) -> U;
}

/// Strips comment lines from rule source text.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringPreprocessor;

impl Preprocessor<String> for StringPreprocessor {
    fn process(&self, input: String) -> String {
        COMMENT_LINE.replace_all(&input, "").into_owned()
    }
}
