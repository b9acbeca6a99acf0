//! Expression grammar.
//!
//! ```text
//! OrExpr    := AndExpr ('OR' AndExpr)*
//! AndExpr   := ValueExpr ('AND' ValueExpr)*
//! ValueExpr := '(' OrExpr ')' | CompareAttr | AttrCheck | NullCheck | Variable
//!            | Parent | 'NOT' '(' OrExpr ')' | TRUE | FALSE | FunctionCall
//!            | ConditionsOf | GetNodesOfType
//! ```
//!
//! `ValueExpr` is an ordered choice: `#x.name == "a"` must be tried as an
//! attribute check before `#x` alone could match as a variable.

use super::{
    super::{core::*, prelude::*},
    common::*,
};
use crate::ast::{
    AttributeOperand, Call, CheckType, ConditionalBlock, Expression, ExpressionKind,
    InvariantViolation,
};
use crate::tokenizer::{keyword::Keyword, symbol::Delimiter, token::Token};

pub fn parse_or_expression() -> impl Parser<Token, Expression> {
    with_context(
        try_map(
            separated_list1(
                parse_and_expression(),
                as_unit(parse_keyword(Keyword::Or)),
            ),
            |members| group(Vec::new(), members),
        ),
        "OR expression",
    )
}

pub fn parse_and_expression() -> impl Parser<Token, Expression> {
    with_context(
        try_map(
            separated_list1(
                parse_value_expression(),
                as_unit(parse_keyword(Keyword::And)),
            ),
            |members| group(members, Vec::new()),
        ),
        "AND expression",
    )
}

fn group(all: Vec<Expression>, any: Vec<Expression>) -> Result<Expression, InvariantViolation> {
    let token = all
        .first()
        .or(any.first())
        .map(|member| member.token.clone())
        .unwrap_or_else(|| Token::new("", 0));
    let block = ConditionalBlock::new(all, any, token.line)?;
    Ok(Expression::new(ExpressionKind::Conditional(block), token))
}

pub fn parse_value_expression() -> impl Parser<Token, Expression> {
    with_context(
        choice(vec![
            Box::new(parse_parenthesized()),
            Box::new(parse_compare_attribute()),
            Box::new(parse_attribute_check()),
            Box::new(parse_null_check()),
            Box::new(parse_variable()),
            Box::new(parse_parent()),
            Box::new(parse_not()),
            Box::new(parse_literal(Keyword::True, ExpressionKind::True)),
            Box::new(parse_literal(Keyword::False, ExpressionKind::False)),
            Box::new(parse_function_call_expression()),
            Box::new(parse_conditions_of()),
            Box::new(parse_nodes_of_type()),
        ]),
        "value expression",
    )
}

fn parse_parenthesized() -> impl Parser<Token, Expression> {
    delimited(
        parse_open_paren(),
        lazy(parse_or_expression),
        parse_close_paren(),
    )
}

fn parse_variable() -> impl Parser<Token, Expression> {
    map(parse_variable_name(), |name: Token| {
        Expression::new(ExpressionKind::Variable(name.text.clone()), name)
    })
}

fn parse_null_check() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple3(
                parse_variable_name(),
                parse_double_equal(),
                parse_keyword(Keyword::Null),
            ),
            |(name, _, _)| Expression::new(ExpressionKind::NullCheck(name.text.clone()), name),
        ),
        "null check",
    )
}

fn parse_literal(keyword: Keyword, kind: ExpressionKind) -> impl Parser<Token, Expression> {
    map(parse_keyword(keyword), move |token| {
        Expression::new(kind.clone(), token)
    })
}

fn parse_not() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_keyword(Keyword::Not),
                delimited(
                    parse_open_paren(),
                    lazy(parse_or_expression),
                    parse_close_paren(),
                ),
            ),
            |(token, inner)| Expression::new(ExpressionKind::Not(Box::new(inner)), token),
        ),
        "NOT",
    )
}

/// `KEYWORD ( AndExpr )`, shared by `PARENT` and `CONDITIONS_OF`.
fn parse_node_query<F>(keyword: Keyword, build: F) -> impl Parser<Token, Expression>
where
    F: Fn(Box<Expression>) -> ExpressionKind,
{
    with_context(
        map(
            tuple2(
                parse_keyword(keyword),
                delimited(
                    parse_open_paren(),
                    lazy(parse_and_expression),
                    parse_close_paren(),
                ),
            ),
            move |(token, inner)| Expression::new(build(Box::new(inner)), token),
        ),
        keyword.to_string(),
    )
}

fn parse_parent() -> impl Parser<Token, Expression> {
    parse_node_query(Keyword::Parent, ExpressionKind::Parent)
}

fn parse_conditions_of() -> impl Parser<Token, Expression> {
    parse_node_query(Keyword::ConditionsOf, ExpressionKind::ConditionsOf)
}

fn parse_nodes_of_type() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_keyword(Keyword::GetNodesOfType),
                delimited(parse_open_paren(), parse_identifier(), parse_close_paren()),
            ),
            |(token, type_name)| {
                Expression::new(ExpressionKind::NodesOfType(type_name.text), token)
            },
        ),
        "GET_NODES_OF_TYPE",
    )
}

/// `@name [ '(' OrExpr (',' OrExpr)* ')' ]`
pub fn parse_call() -> impl Parser<Token, (Token, Call)> {
    with_context(
        map(
            tuple2(
                parse_function_name(),
                optional(delimited(
                    parse_open_paren(),
                    separated_list1(lazy(parse_or_expression), parse_comma()),
                    parse_close_paren(),
                )),
            ),
            |(name, arguments)| {
                let call = Call {
                    function: name.text.clone(),
                    arguments: arguments.unwrap_or_default(),
                };
                (name, call)
            },
        ),
        "function call",
    )
}

fn parse_function_call_expression() -> impl Parser<Token, Expression> {
    map(parse_call(), |(token, call)| {
        Expression::new(ExpressionKind::Call(call), token)
    })
}

/// `#var.attr` followed by `== "text"`, `<op> number` or `.Method("text")`.
fn parse_attribute_check() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple4(
                parse_variable_name(),
                parse_dot(),
                parse_identifier(),
                parse_attribute_test(),
            ),
            |(variable, _, attribute, (check, literal))| {
                let kind = ExpressionKind::AttributeCheck {
                    variable: variable.text.clone(),
                    attribute: attribute.text,
                    literal,
                    check,
                };
                Expression::new(kind, variable)
            },
        ),
        "attribute check",
    )
}

fn parse_attribute_test() -> impl Parser<Token, (CheckType, String)> {
    choice(vec![
        Box::new(map(
            preceded(parse_double_equal(), parse_quoted_text()),
            |literal| (CheckType::Equal, literal),
        )),
        Box::new(map(
            tuple2(parse_numeric_operator(), parse_number()),
            |(check, number)| (check, number.text),
        )),
        Box::new(tuple2(
            preceded(parse_dot(), parse_text_method()),
            delimited(parse_open_paren(), parse_quoted_text(), parse_close_paren()),
        )),
    ])
}

fn parse_text_method() -> impl Parser<Token, CheckType> {
    choice(vec![
        Box::new(map(parse_keyword(Keyword::StartsWith), |_| {
            CheckType::StartsWith
        })),
        Box::new(map(parse_keyword(Keyword::EndsWith), |_| CheckType::EndsWith)),
        Box::new(map(parse_keyword(Keyword::Contains), |_| CheckType::Contains)),
    ])
}

/// `<=`, `<`, `>=` or `>`. The two-token forms are tried first.
fn parse_numeric_operator() -> impl Parser<Token, CheckType> {
    choice(vec![
        Box::new(parse_operator_or_equal(Delimiter::Lower, CheckType::Le)),
        Box::new(parse_operator(Delimiter::Lower, CheckType::Lt)),
        Box::new(parse_operator_or_equal(Delimiter::Greater, CheckType::Ge)),
        Box::new(parse_operator(Delimiter::Greater, CheckType::Gt)),
    ])
}

fn parse_operator(delimiter: Delimiter, check: CheckType) -> impl Parser<Token, CheckType> {
    map(parse_symbol(delimiter), move |_| check)
}

fn parse_operator_or_equal(delimiter: Delimiter, check: CheckType) -> impl Parser<Token, CheckType> {
    map(
        tuple2(parse_symbol(delimiter), parse_symbol(Delimiter::Equal)),
        move |_| check,
    )
}

fn parse_comparison_operator() -> impl Parser<Token, CheckType> {
    choice(vec![
        Box::new(map(parse_double_equal(), |_| CheckType::Equal)),
        Box::new(parse_numeric_operator()),
    ])
}

/// `Operand CmpOrEq Operand` where both sides read an attribute.
fn parse_compare_attribute() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple3(
                parse_attribute_operand(),
                parse_comparison_operator(),
                parse_attribute_operand(),
            ),
            |((token, left), check, (_, right))| {
                Expression::new(ExpressionKind::CompareAttribute { left, right, check }, token)
            },
        ),
        "attribute comparison",
    )
}

fn parse_attribute_operand() -> impl Parser<Token, (Token, AttributeOperand)> {
    map(
        tuple5(
            optional(tuple2(parse_quoted_text(), parse_plus())),
            parse_variable_name(),
            parse_dot(),
            parse_identifier(),
            optional(preceded(parse_plus(), parse_quoted_text())),
        ),
        |(prefix, variable, _, attribute, postfix)| {
            let operand = AttributeOperand {
                prefix: prefix.map(|(text, _)| text).unwrap_or_default(),
                variable: variable.text.clone(),
                attribute: attribute.text,
                postfix: postfix.unwrap_or_default(),
            };
            (variable, operand)
        },
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tokenizer::token::Tokenizer;

    fn parse(source: &str) -> Expression {
        let tokens = Tokenizer::new().tokenize(source).unwrap();
        let (pos, expression) = parse_or_expression().parse(&tokens, 0).unwrap();
        assert_eq!(pos, tokens.len(), "unconsumed input in {:?}", source);
        expression
    }

    /// Strips the single-member groups the grammar wraps every operand in.
    fn unwrap_atoms(expression: Expression) -> Expression {
        match expression.kind {
            ExpressionKind::Conditional(ConditionalBlock::Atom(inner)) => unwrap_atoms(*inner),
            _ => expression,
        }
    }

    fn kind(source: &str) -> ExpressionKind {
        unwrap_atoms(parse(source)).kind
    }

    #[test]
    fn test_literals_and_variable() {
        assert_eq!(kind("TRUE"), ExpressionKind::True);
        assert_eq!(kind("FALSE"), ExpressionKind::False);
        assert_eq!(kind("#node"), ExpressionKind::Variable("node".to_string()));
        assert_eq!(kind("#node == NULL"), ExpressionKind::NullCheck("node".to_string()));
    }

    #[test]
    fn test_attribute_checks() {
        assert_eq!(
            kind("#x.name == \"main\""),
            ExpressionKind::AttributeCheck {
                variable: "x".to_string(),
                attribute: "name".to_string(),
                literal: "main".to_string(),
                check: CheckType::Equal,
            }
        );
        assert_eq!(
            kind("#x.size <= 10"),
            ExpressionKind::AttributeCheck {
                variable: "x".to_string(),
                attribute: "size".to_string(),
                literal: "10".to_string(),
                check: CheckType::Le,
            }
        );
        assert_eq!(
            kind("#x.name.StartsWith(\"get \")"),
            ExpressionKind::AttributeCheck {
                variable: "x".to_string(),
                attribute: "name".to_string(),
                literal: "get ".to_string(),
                check: CheckType::StartsWith,
            }
        );
    }

    #[test]
    fn test_compare_attribute_with_affixes() {
        assert_eq!(
            kind("\"I\" + #a.name == #b.name + \"_t\""),
            ExpressionKind::CompareAttribute {
                left: AttributeOperand {
                    prefix: "I".to_string(),
                    variable: "a".to_string(),
                    attribute: "name".to_string(),
                    postfix: String::new(),
                },
                right: AttributeOperand {
                    prefix: String::new(),
                    variable: "b".to_string(),
                    attribute: "name".to_string(),
                    postfix: "_t".to_string(),
                },
                check: CheckType::Equal,
            }
        );
        assert!(matches!(
            kind("#a.line > #b.line"),
            ExpressionKind::CompareAttribute {
                check: CheckType::Gt,
                ..
            }
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expression = parse("#a AND #b OR #c");
        let ExpressionKind::Conditional(ConditionalBlock::Any(members)) = expression.kind else {
            panic!("expected an OR group");
        };
        assert_eq!(members.len(), 2);
        assert!(matches!(
            members[0].kind,
            ExpressionKind::Conditional(ConditionalBlock::All(_))
        ));
    }

    #[test]
    fn test_queries_and_calls() {
        assert!(matches!(kind("PARENT(#x)"), ExpressionKind::Parent(_)));
        assert!(matches!(kind("CONDITIONS_OF(#x)"), ExpressionKind::ConditionsOf(_)));
        assert_eq!(
            kind("GET_NODES_OF_TYPE(Function)"),
            ExpressionKind::NodesOfType("Function".to_string())
        );
        assert!(matches!(kind("NOT(#x OR #y)"), ExpressionKind::Not(_)));

        let ExpressionKind::Call(call) = kind("@IsPublic(#x, PARENT(#x))") else {
            panic!("expected a call");
        };
        assert_eq!(call.function, "IsPublic");
        assert_eq!(call.arguments.len(), 2);

        let ExpressionKind::Call(call) = kind("@Check") else {
            panic!("expected a call");
        };
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_parenthesized_group() {
        let expression = parse("(#a OR #b) AND #c");
        let ExpressionKind::Conditional(ConditionalBlock::Atom(and_group)) = expression.kind else {
            panic!("expected a single AND group");
        };
        let ExpressionKind::Conditional(ConditionalBlock::All(members)) = and_group.kind else {
            panic!("expected an AND group");
        };
        assert!(matches!(
            unwrap_atoms(members[0].clone()).kind,
            ExpressionKind::Conditional(ConditionalBlock::Any(_))
        ));
    }

    #[test]
    fn test_dangling_operator_is_an_error() {
        let tokens = Tokenizer::new().tokenize("#a AND").unwrap();
        assert!(parse_or_expression().parse(&tokens, 0).is_err());
    }

    #[test]
    fn test_error_points_into_bad_alternative() {
        let tokens = Tokenizer::new().tokenize("#x.size < big").unwrap();
        let (pos, _) = parse_value_expression().parse(&tokens, 0).unwrap();
        // the attribute check fails at "big", so only "#x" is taken as a variable
        assert_eq!(pos, 2);
    }
}
