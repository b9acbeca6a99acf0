//! # Delimiter Symbols
//!
//! The rule language isolates a fixed set of single-character delimiters. Each
//! occurrence becomes its own token, regardless of what surrounds it, so `==`
//! reaches the parser as two `=` tokens and `<=` as `<` followed by `=`.

use nom::{character::complete::one_of, combinator::recognize, error::context};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::token::ParserResult;

/// Single-character delimiters recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr, EnumIter)]
pub enum Delimiter {
    /// Variable prefix (`#`)
    #[strum(serialize = "#")]
    Hash,
    /// Function prefix (`@`)
    #[strum(serialize = "@")]
    At,
    #[strum(serialize = ":")]
    Colon,
    #[strum(serialize = ";")]
    Semicolon,
    #[strum(serialize = "=")]
    Equal,
    #[strum(serialize = "<")]
    Lower,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = ".")]
    Dot,
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = "\"")]
    Quote,
    #[strum(serialize = "(")]
    OpenParen,
    #[strum(serialize = ")")]
    CloseParen,
    /// A single space. Spaces are tokens so that quoted text keeps them.
    #[strum(serialize = " ")]
    Space,
}

pub const DELIMITER_CHARS: &str = "#@:;=<>+.,\"() ";

impl Delimiter {
    pub fn is_delimiter_char(c: char) -> bool {
        DELIMITER_CHARS.contains(c)
    }
}

/// Parses exactly one delimiter character and yields its text.
pub fn parse_delimiter(input: &str) -> ParserResult<&str> {
    context(
        "delimiter",
        recognize(one_of(DELIMITER_CHARS)),
    )(input)
}
