//! # Parser Combinators
//!
//! Building blocks for the rule grammar. Every combinator takes the input slice
//! and a start position and returns the position after what it consumed, so a
//! failed branch leaves nothing to undo: the caller retries from the position
//! it already holds.
//!
//! ## Combinator Types
//!
//! * **Primitive**: `Satisfy`, `SkipWhile`
//! * **Sequential**: `Preceded`, `Delimited`, `Tuple2` .. `Tuple5`
//! * **Alternative**: `Choice`, `Optional`
//! * **Repetition**: `Many`, `ManyUntil`, `SeparatedList1`
//! * **Transformation**: `Map`, `TryMap`, `AsUnit`
//! * **Structural**: `WithContext`, `Lazy`

use std::fmt;
use std::marker::PhantomData;

use super::core::{ParseError, ParseResult, Parser};

/// Satisfy: consumes one item when `f` accepts it.
///
/// `expected` describes what `f` accepts and ends up in the error message.
#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    expected: String,
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F> {
    pub fn new(expected: impl Into<String>, f: F) -> Self {
        Self {
            expected: expected.into(),
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    I: fmt::Display,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        match input.get(pos) {
            Some(item) => match (self.f)(item) {
                Some(result) => Ok((pos + 1, result)),
                None => Err(ParseError::Unexpected {
                    expected: self.expected.clone(),
                    parsed: item.to_string(),
                    position: pos,
                    context: None,
                }),
            },
            None => Err(ParseError::UnexpectedEOF {
                message: self.expected.clone(),
                position: pos,
                context: None,
            }),
        }
    }
}

/// SkipWhile: advances past every leading item matching the predicate. Never fails.
#[derive(Clone)]
pub struct SkipWhile<I, F> {
    f: F,
    _phantom: PhantomData<I>,
}

impl<I, F> SkipWhile<I, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, F> Parser<I, ()> for SkipWhile<I, F>
where
    F: Fn(&I) -> bool,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        let skipped = input[pos.min(input.len())..]
            .iter()
            .take_while(|item| (self.f)(item))
            .count();
        Ok((pos + skipped, ()))
    }
}

/// Choice: ordered alternatives, first success wins.
///
/// Each alternative starts from the same position. When all fail, the error of
/// the one alternative that got furthest is returned. If no alternative got
/// past the others, the failure is `NoAlternative` at that position.
pub struct Choice<I, O> {
    parsers: Vec<Box<dyn Parser<I, O>>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<Box<dyn Parser<I, O>>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let mut furthest: Option<ParseError> = None;
        let mut tied = false;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(e) => match furthest.as_ref().map(ParseError::get_position) {
                    Some(best) if e.get_position() < best => {}
                    Some(best) if e.get_position() == best => tied = true,
                    _ => {
                        furthest = Some(e);
                        tied = false;
                    }
                },
            }
        }
        match furthest {
            Some(e) if !tied && e.get_position() > pos => Err(e),
            other => Err(ParseError::NoAlternative {
                position: other.map_or(pos, |e| e.get_position()),
                context: None,
            }),
        }
    }
}

#[derive(Clone)]
pub struct Preceded<P1, P2, I, O> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O)>,
}

impl<P1, P2, I, O> Preceded<P1, P2, I, O> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O> Parser<I, O> for Preceded<P1, P2, I, O>
where
    P1: Parser<I, ()>,
    P2: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.parser1.parse(input, pos)?;
        self.parser2.parse(input, pos)
    }
}

#[derive(Clone)]
pub struct Delimited<L, P, R, I, O> {
    left: L,
    parser: P,
    right: R,
    _phantom: PhantomData<(I, O)>,
}

impl<L, P, R, I, O> Delimited<L, P, R, I, O> {
    pub fn new(left: L, parser: P, right: R) -> Self {
        Self {
            left,
            parser,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, L, P, R> Parser<I, O> for Delimited<L, P, R, I, O>
where
    L: Parser<I, ()>,
    P: Parser<I, O>,
    R: Parser<I, ()>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.left.parse(input, pos)?;
        let (pos, value) = self.parser.parse(input, pos)?;
        let (pos, _) = self.right.parse(input, pos)?;
        Ok((pos, value))
    }
}

#[derive(Clone)]
pub struct Map<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> Map<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

/// TryMap: like `Map`, but the conversion may reject the parsed value.
///
/// A rejection is reported as a `Failure` at the position the inner parser
/// started from.
#[derive(Clone)]
pub struct TryMap<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> TryMap<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F, E> Parser<I, B> for TryMap<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> Result<B, E>,
    E: fmt::Display,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        let (next, value) = self.parser.parse(input, pos)?;
        (self.f)(value)
            .map(|converted| (next, converted))
            .map_err(|e| ParseError::Failure {
                message: e.to_string(),
                position: pos,
                context: None,
            })
    }
}

#[derive(Clone)]
pub struct AsUnit<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> AsUnit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, P, O> Parser<I, ()> for AsUnit<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|(pos, _)| (pos, ()))
    }
}

/// Many: zero or more repetitions, stopping at the first failure.
#[derive(Clone)]
pub struct Many<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;
        while let Ok((new_pos, value)) = self.parser.parse(input, current_pos) {
            if new_pos == current_pos {
                break;
            }
            results.push(value);
            current_pos = new_pos;
        }
        Ok((current_pos, results))
    }
}

/// ManyUntil: repeats `parser` until `terminator` would match.
///
/// The terminator is only looked at, never consumed. Unlike `Many`, a failing
/// item is an error rather than the end of the list, so the message points at
/// the item that is actually malformed.
#[derive(Clone)]
pub struct ManyUntil<P, T, I, O, U> {
    parser: P,
    terminator: T,
    _phantom: PhantomData<(I, O, U)>,
}

impl<P, T, I, O, U> ManyUntil<P, T, I, O, U> {
    pub fn new(parser: P, terminator: T) -> Self {
        Self {
            parser,
            terminator,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, U, P, T> Parser<I, Vec<O>> for ManyUntil<P, T, I, O, U>
where
    P: Parser<I, O>,
    T: Parser<I, U>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;
        loop {
            if self.terminator.parse(input, current_pos).is_ok() {
                return Ok((current_pos, results));
            }
            let (new_pos, value) = self.parser.parse(input, current_pos)?;
            if new_pos == current_pos {
                return Err(ParseError::Failure {
                    message: "repeated item consumed no input".to_string(),
                    position: current_pos,
                    context: None,
                });
            }
            results.push(value);
            current_pos = new_pos;
        }
    }
}

/// SeparatedList1: one or more items with a separator between each pair.
///
/// Once a separator has been consumed the following item is mandatory.
pub struct SeparatedList1<P, S, I, O> {
    item_parser: P,
    separator_parser: S,
    _phantom: PhantomData<(I, O)>,
}

impl<P, S, I, O> SeparatedList1<P, S, I, O> {
    pub fn new(item_parser: P, separator_parser: S) -> Self {
        Self {
            item_parser,
            separator_parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P, S> Parser<I, Vec<O>> for SeparatedList1<P, S, I, O>
where
    P: Parser<I, O>,
    S: Parser<I, ()>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let (mut current_pos, first) = self.item_parser.parse(input, pos)?;
        let mut results = vec![first];
        while let Ok((sep_pos, _)) = self.separator_parser.parse(input, current_pos) {
            let (new_pos, value) = self.item_parser.parse(input, sep_pos)?;
            results.push(value);
            current_pos = new_pos;
        }
        Ok((current_pos, results))
    }
}

#[derive(Clone)]
pub struct Optional<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Optional<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Option<O>> for Optional<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Option<O>> {
        match self.parser.parse(input, pos) {
            Ok((new_pos, value)) => Ok((new_pos, Some(value))),
            Err(_) => Ok((pos, None)),
        }
    }
}

#[derive(Clone)]
pub struct Tuple2<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Tuple2<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, (O1, O2)> for Tuple2<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        Ok((pos, (result1, result2)))
    }
}

#[derive(Clone)]
pub struct Tuple3<P1, P2, P3, I, O1, O2, O3> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    _phantom: PhantomData<(I, O1, O2, O3)>,
}

impl<P1, P2, P3, I, O1, O2, O3> Tuple3<P1, P2, P3, I, O1, O2, O3> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, I, O1, O2, O3> Parser<I, (O1, O2, O3)> for Tuple3<P1, P2, P3, I, O1, O2, O3>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2, O3)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        Ok((pos, (result1, result2, result3)))
    }
}

#[derive(Clone)]
pub struct Tuple4<P1, P2, P3, P4, I, O1, O2, O3, O4> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    parser4: P4,
    _phantom: PhantomData<(I, O1, O2, O3, O4)>,
}

impl<P1, P2, P3, P4, I, O1, O2, O3, O4> Tuple4<P1, P2, P3, P4, I, O1, O2, O3, O4> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3, parser4: P4) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            parser4,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, P4, I, O1, O2, O3, O4> Parser<I, (O1, O2, O3, O4)>
    for Tuple4<P1, P2, P3, P4, I, O1, O2, O3, O4>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
    P4: Parser<I, O4>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2, O3, O4)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        let (pos, result4) = self.parser4.parse(input, pos)?;
        Ok((pos, (result1, result2, result3, result4)))
    }
}

#[derive(Clone)]
pub struct Tuple5<P1, P2, P3, P4, P5, I, O1, O2, O3, O4, O5> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    parser4: P4,
    parser5: P5,
    _phantom: PhantomData<(I, O1, O2, O3, O4, O5)>,
}

impl<P1, P2, P3, P4, P5, I, O1, O2, O3, O4, O5> Tuple5<P1, P2, P3, P4, P5, I, O1, O2, O3, O4, O5> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3, parser4: P4, parser5: P5) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            parser4,
            parser5,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, P4, P5, I, O1, O2, O3, O4, O5> Parser<I, (O1, O2, O3, O4, O5)>
    for Tuple5<P1, P2, P3, P4, P5, I, O1, O2, O3, O4, O5>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
    P4: Parser<I, O4>,
    P5: Parser<I, O5>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2, O3, O4, O5)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        let (pos, result4) = self.parser4.parse(input, pos)?;
        let (pos, result5) = self.parser5.parse(input, pos)?;
        Ok((pos, (result1, result2, result3, result4, result5)))
    }
}

/// WithContext: names the grammar rule a failure happened in.
#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| e.with_context(&self.context.to_string()))
    }
}

/// Lazy: builds the inner parser on use. Needed for recursive grammar rules.
#[derive(Clone)]
pub struct Lazy<F> {
    f: F,
}

impl<F> Lazy<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<I, O, F, P> Parser<I, O> for Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        (self.f)().parse(input, pos)
    }
}
