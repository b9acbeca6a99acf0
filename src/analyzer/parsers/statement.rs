use super::{
    super::{core::*, prelude::*},
    common::*,
    expression::*,
};
use crate::ast::{Statement, StatementKind};
use crate::tokenizer::{keyword::Keyword, token::Token};

pub fn parse_statement() -> impl Parser<Token, Statement> {
    with_context(
        choice(vec![
            Box::new(parse_for_loop()),
            Box::new(parse_if_statement()),
            Box::new(parse_print()),
            Box::new(parse_print_text()),
            Box::new(parse_set_return()),
            Box::new(parse_call_statement()),
            Box::new(parse_assignment()),
            Box::new(parse_while_loop()),
        ]),
        "statement",
    )
}

/// Statements up to, but not including, `END`.
pub fn parse_block() -> impl Parser<Token, Vec<Statement>> {
    many_until(lazy(parse_statement), parse_keyword(Keyword::End))
}

fn parse_end() -> impl Parser<Token, ()> {
    as_unit(parse_keyword(Keyword::End))
}

fn parse_for_loop() -> impl Parser<Token, Statement> {
    with_context(
        map(
            tuple5(
                parse_keyword(Keyword::For),
                parse_variable_name(),
                preceded(as_unit(parse_keyword(Keyword::In)), parse_value_expression()),
                parse_block(),
                parse_end(),
            ),
            |(token, variable, collection, body, _)| {
                let kind = StatementKind::ForLoop {
                    variable: variable.text,
                    collection,
                    body,
                };
                Statement::new(kind, token)
            },
        ),
        "FOR loop",
    )
}

fn parse_while_loop() -> impl Parser<Token, Statement> {
    with_context(
        map(
            tuple4(
                parse_keyword(Keyword::While),
                parse_or_expression(),
                parse_block(),
                parse_end(),
            ),
            |(token, condition, body, _)| {
                Statement::new(StatementKind::While { condition, body }, token)
            },
        ),
        "WHILE loop",
    )
}

fn parse_if_statement() -> impl Parser<Token, Statement> {
    let then_terminator = choice(vec![
        Box::new(parse_keyword(Keyword::Else)) as Box<dyn Parser<Token, Token>>,
        Box::new(parse_keyword(Keyword::End)),
    ]);
    with_context(
        map(
            tuple5(
                parse_keyword(Keyword::If),
                map(
                    tuple2(parse_or_expression(), parse_keyword(Keyword::Then)),
                    |(condition, _)| condition,
                ),
                many_until(lazy(parse_statement), then_terminator),
                optional(preceded(
                    as_unit(parse_keyword(Keyword::Else)),
                    parse_block(),
                )),
                parse_end(),
            ),
            |(token, condition, then_branch, else_branch, _)| {
                let kind = StatementKind::If {
                    condition,
                    then_branch,
                    else_branch: else_branch.unwrap_or_default(),
                };
                Statement::new(kind, token)
            },
        ),
        "IF statement",
    )
}

fn parse_print() -> impl Parser<Token, Statement> {
    with_context(
        map(
            tuple2(
                parse_keyword(Keyword::Print),
                delimited(
                    parse_open_paren(),
                    parse_and_expression(),
                    parse_close_paren(),
                ),
            ),
            |(token, value)| Statement::new(StatementKind::Print(value), token),
        ),
        "PRINT",
    )
}

enum TextSegment {
    Text(String),
    Newline,
}

/// `PRINTS("a" + "b" + endl)`: segments are joined with a single space, except
/// around a line break.
fn parse_print_text() -> impl Parser<Token, Statement> {
    let segment = || {
        choice(vec![
            Box::new(map(parse_keyword(Keyword::Endl), |_| TextSegment::Newline))
                as Box<dyn Parser<Token, TextSegment>>,
            Box::new(map(parse_quoted_text(), TextSegment::Text)),
        ])
    };
    with_context(
        map(
            tuple2(
                parse_keyword(Keyword::Prints),
                delimited(
                    parse_open_paren(),
                    separated_list1(segment(), parse_plus()),
                    parse_close_paren(),
                ),
            ),
            |(token, segments)| {
                Statement::new(StatementKind::PrintText(compose_text(segments)), token)
            },
        ),
        "PRINTS",
    )
}

fn compose_text(segments: Vec<TextSegment>) -> String {
    let mut text = String::new();
    let mut separator = "";
    for segment in segments {
        match segment {
            TextSegment::Newline => {
                text.push('\n');
                separator = "";
            }
            TextSegment::Text(part) => {
                text.push_str(separator);
                text.push_str(&part);
                separator = " ";
            }
        }
    }
    text
}

fn parse_set_return() -> impl Parser<Token, Statement> {
    with_context(
        map(
            tuple3(
                parse_function_name(),
                parse_assign(),
                parse_or_expression(),
            ),
            |(name, _, value)| {
                let kind = StatementKind::SetReturn {
                    function: name.text.clone(),
                    value,
                };
                Statement::new(kind, name)
            },
        ),
        "return assignment",
    )
}

fn parse_call_statement() -> impl Parser<Token, Statement> {
    map(parse_call(), |(token, call)| {
        Statement::new(StatementKind::Call(call), token)
    })
}

fn parse_assignment() -> impl Parser<Token, Statement> {
    with_context(
        map(
            tuple3(
                parse_variable_name(),
                parse_assign(),
                parse_and_expression(),
            ),
            |(name, _, value)| {
                let kind = StatementKind::Assignment {
                    variable: name.text.clone(),
                    value,
                };
                Statement::new(kind, name)
            },
        ),
        "assignment",
    )
}
