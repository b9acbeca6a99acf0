use super::super::{core::*, prelude::*};
use crate::tokenizer::{keyword::Keyword, symbol::Delimiter, token::Token};

/// Space tokens separate words but carry no meaning outside quoted text.
pub fn skip_spaces() -> impl Parser<Token, ()> {
    skip_while(|token: &Token| token.is_space())
}

/// Next non-space token, accepted when `f` maps it to a value.
fn parse_token<O, F>(expected: impl Into<String>, f: F) -> impl Parser<Token, O>
where
    F: Fn(&Token) -> Option<O>,
{
    preceded(skip_spaces(), satisfy(expected, f))
}

fn parse_exact(text: String) -> impl Parser<Token, Token> {
    let expected = format!("\"{}\"", text);
    parse_token(expected, move |token: &Token| {
        token.is(&text).then(|| token.clone())
    })
}

pub fn parse_keyword(keyword: Keyword) -> impl Parser<Token, Token> {
    parse_exact(keyword.to_string())
}

pub fn parse_symbol(delimiter: Delimiter) -> impl Parser<Token, Token> {
    parse_exact(delimiter.to_string())
}

/// Word made of ASCII letters, digits and underscores. Keywords are not
/// reserved here: `@IF:` declares a rule named `IF`.
pub fn parse_identifier() -> impl Parser<Token, Token> {
    parse_token("identifier", |token: &Token| {
        let valid = !token.text.is_empty()
            && token
                .text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| token.clone())
    })
}

pub fn parse_number() -> impl Parser<Token, Token> {
    parse_token("number", |token: &Token| {
        let valid = !token.text.is_empty() && token.text.chars().all(|c| c.is_ascii_digit());
        valid.then(|| token.clone())
    })
}

/// `"..."`: everything between the quotes, spaces included, token by token.
pub fn parse_quoted_text() -> impl Parser<Token, String> {
    with_context(
        map(
            tuple3(
                parse_symbol(Delimiter::Quote),
                many(satisfy("quoted text", |token: &Token| {
                    (!token.is(Delimiter::Quote.as_ref())).then(|| token.text.clone())
                })),
                satisfy("closing quote", |token: &Token| {
                    token.is(Delimiter::Quote.as_ref()).then_some(())
                }),
            ),
            |(_, parts, _)| parts.concat(),
        ),
        "quoted text",
    )
}

/// `#name`, yielding the name token.
pub fn parse_variable_name() -> impl Parser<Token, Token> {
    preceded(as_unit(parse_symbol(Delimiter::Hash)), parse_identifier())
}

/// `@name`, yielding the name token.
pub fn parse_function_name() -> impl Parser<Token, Token> {
    preceded(as_unit(parse_symbol(Delimiter::At)), parse_identifier())
}

pub fn parse_open_paren() -> impl Parser<Token, ()> {
    as_unit(parse_symbol(Delimiter::OpenParen))
}

pub fn parse_close_paren() -> impl Parser<Token, ()> {
    as_unit(parse_symbol(Delimiter::CloseParen))
}

pub fn parse_comma() -> impl Parser<Token, ()> {
    as_unit(parse_symbol(Delimiter::Comma))
}

pub fn parse_plus() -> impl Parser<Token, ()> {
    as_unit(parse_symbol(Delimiter::Plus))
}

pub fn parse_dot() -> impl Parser<Token, ()> {
    as_unit(parse_symbol(Delimiter::Dot))
}

/// `==`, which reaches the parser as two `=` tokens.
pub fn parse_double_equal() -> impl Parser<Token, ()> {
    as_unit(tuple2(
        parse_symbol(Delimiter::Equal),
        parse_symbol(Delimiter::Equal),
    ))
}

pub fn parse_assign() -> impl Parser<Token, ()> {
    as_unit(parse_symbol(Delimiter::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token::Tokenizer;

    fn tokens(source: &str) -> Vec<Token> {
        Tokenizer::new().tokenize(source).unwrap()
    }

    #[test]
    fn test_keyword_skips_leading_spaces() {
        let input = tokens("   END");
        let (pos, token) = parse_keyword(Keyword::End).parse(&input, 0).unwrap();
        assert_eq!(pos, 4);
        assert_eq!(token.text, "END");
    }

    #[test]
    fn test_identifier_rejects_symbols() {
        let input = tokens("rule_1 (");
        assert!(parse_identifier().parse(&input, 0).is_ok());
        assert!(matches!(
            parse_identifier().parse(&input, 1),
            Err(ParseError::Unexpected { position: 2, .. })
        ));
    }

    #[test]
    fn test_number() {
        let input = tokens("42 4x");
        assert_eq!(parse_number().parse(&input, 0).unwrap().1.text, "42");
        assert!(parse_number().parse(&input, 1).is_err());
    }

    #[test]
    fn test_quoted_text_keeps_inner_spaces() {
        let input = tokens(" \"hello  big world\" x");
        let (pos, text) = parse_quoted_text().parse(&input, 0).unwrap();
        assert_eq!(text, "hello  big world");
        assert_eq!(input[pos].text, " ");
    }

    #[test]
    fn test_unterminated_quote() {
        let input = tokens("\"abc");
        let error = parse_quoted_text().parse(&input, 0).unwrap_err();
        assert!(matches!(error, ParseError::UnexpectedEOF { .. }));
        assert_eq!(error.get_context(), Some("quoted text"));
    }

    #[test]
    fn test_double_equal_and_variable() {
        let input = tokens("# x == y");
        let (pos, name) = parse_variable_name().parse(&input, 0).unwrap();
        assert_eq!(name.text, "x");
        assert!(parse_double_equal().parse(&input, pos).is_ok());
    }
}
