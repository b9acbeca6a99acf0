//! # Rule AST
//!
//! The tree the parser builds for each rule. Nodes own their children outright
//! and are never mutated after construction. Every node keeps the token it
//! started at so runtime errors can name the source line.

use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::tokenizer::token::Token;

/// A named rule: `@id[(params)]: body END`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: String,
    pub parameters: Vec<String>,
    pub body: Vec<Statement>,
    pub token: Token,
}

impl Function {
    pub fn line(&self) -> usize {
        self.token.line
    }

    /// Rules with parameters can only be reached through a call.
    pub fn is_entry_point(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub token: Token,
}

impl Statement {
    pub fn new(kind: StatementKind, token: Token) -> Self {
        Self { kind, token }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    ForLoop {
        variable: String,
        collection: Expression,
        body: Vec<Statement>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Vec<Statement>,
    },
    Assignment {
        variable: String,
        value: Expression,
    },
    /// `@fn = expr`: binds the rule's own name, which doubles as its return slot.
    SetReturn {
        function: String,
        value: Expression,
    },
    Call(Call),
    Print(Expression),
    /// `PRINTS(...)`, composed into a single string while parsing.
    PrintText(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub token: Token,
}

impl Expression {
    pub fn new(kind: ExpressionKind, token: Token) -> Self {
        Self { kind, token }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    True,
    False,
    Variable(String),
    Not(Box<Expression>),
    /// `#x == NULL`
    NullCheck(String),
    Conditional(ConditionalBlock),
    Parent(Box<Expression>),
    ConditionsOf(Box<Expression>),
    NodesOfType(String),
    Call(Call),
    AttributeCheck {
        variable: String,
        attribute: String,
        literal: String,
        check: CheckType,
    },
    CompareAttribute {
        left: AttributeOperand,
        right: AttributeOperand,
        check: CheckType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: String,
    pub arguments: Vec<Expression>,
}

/// One side of an attribute comparison: `["pre" +] #var.attr [+ "post"]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeOperand {
    pub prefix: String,
    pub variable: String,
    pub attribute: String,
    pub postfix: String,
}

/// A boolean group of expressions.
///
/// A group of one is a passthrough and yields its member's value unchanged.
/// Larger groups evaluate every member and collapse to true or false.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalBlock {
    Atom(Box<Expression>),
    /// AND: every member must be non-empty.
    All(Vec<Expression>),
    /// OR: any member may be non-empty.
    Any(Vec<Expression>),
}

impl ConditionalBlock {
    /// Builds a block from its AND members and its OR members. Exactly one of
    /// the two lists may be non-empty.
    pub fn new(
        all: Vec<Expression>,
        any: Vec<Expression>,
        line: usize,
    ) -> Result<Self, InvariantViolation> {
        let (all_len, any_len) = (all.len(), any.len());
        let mut members = match (all_len, any_len) {
            (0, 0) | (1.., 1..) => {
                return Err(InvariantViolation::ConditionalBlockShape {
                    all: all_len,
                    any: any_len,
                    line,
                })
            }
            (_, 0) => all,
            _ => any,
        };
        if members.len() == 1 {
            if let Some(member) = members.pop() {
                return Ok(Self::Atom(Box::new(member)));
            }
        }
        Ok(if any_len == 0 {
            Self::All(members)
        } else {
            Self::Any(members)
        })
    }

    pub fn members(&self) -> &[Expression] {
        match self {
            Self::Atom(member) => std::slice::from_ref(member.as_ref()),
            Self::All(members) | Self::Any(members) => members,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckType {
    Equal,
    StartsWith,
    EndsWith,
    Contains,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CheckType {
    /// Numeric checks compare both sides as integers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge)
    }

    pub fn compare_numbers(&self, left: i64, right: i64) -> bool {
        match self {
            Self::Lt => left < right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Ge => left >= right,
            Self::Equal => left == right,
            Self::StartsWith | Self::EndsWith | Self::Contains => false,
        }
    }

    pub fn compare_text(&self, value: &str, literal: &str) -> bool {
        match self {
            Self::Equal => value == literal,
            Self::StartsWith => value.starts_with(literal),
            Self::EndsWith => value.ends_with(literal),
            Self::Contains => value.contains(literal),
            Self::Lt | Self::Gt | Self::Le | Self::Ge => false,
        }
    }
}

/// A broken construction invariant: a defect in the interpreter, not in the rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("This is a bug in the interpreter! Conditional block with {all} AND and {any} OR members @Line: {line}")]
    ConditionalBlockShape { all: usize, any: usize, line: usize },
    #[error("This is a bug in the interpreter! Call stack is empty on return @Line: {line}")]
    CallStackUnderflow { line: usize },
}

impl InvariantViolation {
    pub fn line(&self) -> usize {
        match self {
            Self::ConditionalBlockShape { line, .. } | Self::CallStackUnderflow { line } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(kind: ExpressionKind) -> Expression {
        Expression::new(kind, Token::new("TRUE", 1))
    }

    #[test]
    fn test_conditional_block_shapes() {
        let single = ConditionalBlock::new(vec![flag(ExpressionKind::True)], vec![], 1).unwrap();
        assert!(matches!(single, ConditionalBlock::Atom(_)));

        let single_or = ConditionalBlock::new(vec![], vec![flag(ExpressionKind::False)], 1).unwrap();
        assert!(matches!(single_or, ConditionalBlock::Atom(_)));

        let all = ConditionalBlock::new(
            vec![flag(ExpressionKind::True), flag(ExpressionKind::False)],
            vec![],
            1,
        )
        .unwrap();
        assert_eq!(all.members().len(), 2);
        assert!(matches!(all, ConditionalBlock::All(_)));

        let any = ConditionalBlock::new(
            vec![],
            vec![flag(ExpressionKind::True), flag(ExpressionKind::False)],
            1,
        )
        .unwrap();
        assert!(matches!(any, ConditionalBlock::Any(_)));
    }

    #[test]
    fn test_conditional_block_rejects_invalid_shapes() {
        assert_eq!(
            ConditionalBlock::new(vec![], vec![], 7),
            Err(InvariantViolation::ConditionalBlockShape {
                all: 0,
                any: 0,
                line: 7
            })
        );
        assert!(ConditionalBlock::new(
            vec![flag(ExpressionKind::True)],
            vec![flag(ExpressionKind::True)],
            3
        )
        .is_err());
    }

    #[test]
    fn test_check_type_comparisons() {
        assert!(CheckType::StartsWith.compare_text("get_value", "get"));
        assert!(CheckType::EndsWith.compare_text("get_value", "value"));
        assert!(!CheckType::EndsWith.compare_text("a", "abc"));
        assert!(CheckType::Contains.compare_text("get_value", "_"));
        assert!(CheckType::Le.compare_numbers(3, 3));
        assert!(!CheckType::Gt.compare_numbers(3, 3));
        assert!(CheckType::Lt.is_numeric());
        assert!(!CheckType::Equal.is_numeric());
        assert_eq!(CheckType::StartsWith.as_ref(), "STARTS_WITH");
    }
}
