use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    combinator::map,
    error::{context, VerboseError},
    IResult,
};
use thiserror::Error;

use super::{
    symbol::{parse_delimiter, Delimiter},
    whitespace::{is_blank, parse_blank_run},
};
use crate::preprocessor::{Preprocessor, StringPreprocessor};

/// One token of a rule file: its raw text and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    pub fn is_space(&self) -> bool {
        self.text == Delimiter::Space.as_ref()
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Default)]
pub struct Tokenizer {
    preprocessor: StringPreprocessor,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits rule source into a flat token stream.
    ///
    /// Comment lines are dropped, every delimiter (space included) is isolated
    /// into its own token and runs of tabs / line breaks only separate tokens.
    #[tracing::instrument(level = "debug", skip(self, input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<Token>> {
        let source = self.preprocessor.process(input.to_string());
        let mut tokens = Vec::new();

        for (index, line) in source.split('\n').enumerate() {
            let line_number = index + 1;
            let mut remaining = line;

            while !remaining.is_empty() {
                match parse_fragment(remaining) {
                    Ok((rest, Some(text))) => {
                        tokens.push(Token::new(text, line_number));
                        remaining = rest;
                    }
                    Ok((rest, None)) => remaining = rest,
                    Err(e) => {
                        let found = remaining.chars().take(20).collect::<String>();
                        let error = TokenizerError::ParseError {
                            message: match e {
                                nom::Err::Incomplete(needed) => {
                                    format!("Incomplete input, {:?}", needed)
                                }
                                nom::Err::Error(e) | nom::Err::Failure(e) => {
                                    nom::error::convert_error(remaining, e)
                                }
                            },
                            found,
                            line: line_number,
                        };
                        tracing::error!("{}", error);
                        return Err(error);
                    }
                }
            }
        }

        tracing::debug!(count = tokens.len(), "tokenized rule source");
        Ok(tokens)
    }
}

/// One lexical step: a delimiter, a word, or a blank run that yields nothing.
fn parse_fragment(input: &str) -> ParserResult<Option<&str>> {
    alt((
        map(parse_blank_run, |_| None),
        map(parse_delimiter, Some),
        map(parse_word, Some),
    ))(input)
}

fn parse_word(input: &str) -> ParserResult<&str> {
    context(
        "word",
        take_while1(|c: char| !is_blank(c) && !Delimiter::is_delimiter_char(c)),
    )(input)
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("Tokenize error: {message} at line {line}, found: {found}")]
    ParseError {
        message: String,
        found: String,
        line: usize,
    },
}

impl TokenizerError {
    pub fn line(&self) -> usize {
        match self {
            Self::ParseError { line, .. } => *line,
        }
    }
}
