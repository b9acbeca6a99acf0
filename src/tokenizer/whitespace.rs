//! # Whitespace Handling
//!
//! Spaces and other blanks are treated differently:
//!
//! * A space is a delimiter and becomes a `" "` token. The parser skips these
//!   everywhere except inside quoted text, where they are part of the literal.
//! * Runs of tabs, carriage returns and newlines only separate tokens and never
//!   produce one.

use nom::{bytes::complete::take_while1, combinator::value, error::context};

use super::token::ParserResult;

pub fn is_blank(c: char) -> bool {
    matches!(c, '\t' | '\r' | '\n')
}

/// Consumes a run of tabs, carriage returns and newlines.
pub fn parse_blank_run(input: &str) -> ParserResult<()> {
    context("blank run", value((), take_while1(is_blank)))(input)
}
