use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Reserved words of the rule language.
///
/// Keywords are not a separate token class: the tokenizer emits plain text and
/// the parser compares it against [`Keyword::as_ref`]. Keywords are matched
/// case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Keyword {
    For,
    In,
    While,
    If,
    Then,
    Else,
    End,
    Not,
    And,
    Or,
    True,
    False,
    Null,
    Parent,
    ConditionsOf,
    GetNodesOfType,
    Print,
    Prints,
    #[strum(serialize = "endl")]
    Endl,
    #[strum(serialize = "StartsWith")]
    StartsWith,
    #[strum(serialize = "EndsWith")]
    EndsWith,
    #[strum(serialize = "Contains")]
    Contains,
}
