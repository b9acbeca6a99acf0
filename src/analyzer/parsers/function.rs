use super::{
    super::{core::*, prelude::*},
    common::*,
    statement::parse_block,
};
use crate::ast::Function;
use crate::tokenizer::{keyword::Keyword, symbol::Delimiter, token::Token};

/// `@id [ '(' param (',' param)* ')' ] ':' statements END`
pub fn parse_function() -> impl Parser<Token, Function> {
    with_context(
        map(
            tuple5(
                parse_function_name(),
                optional(parse_parameter_list()),
                as_unit(parse_symbol(Delimiter::Colon)),
                parse_block(),
                as_unit(parse_keyword(Keyword::End)),
            ),
            |(name, parameters, _, body, _)| Function {
                id: name.text.clone(),
                parameters: parameters.unwrap_or_default(),
                body,
                token: name,
            },
        ),
        "rule definition",
    )
}

fn parse_parameter_list() -> impl Parser<Token, Vec<String>> {
    delimited(
        parse_open_paren(),
        separated_list1(parse_parameter(), parse_comma()),
        parse_close_paren(),
    )
}

/// Parameters are plain names; a leading `#` is accepted so a declaration can
/// read like the variables it binds.
fn parse_parameter() -> impl Parser<Token, String> {
    map(
        preceded(
            as_unit(optional(parse_symbol(Delimiter::Hash))),
            parse_identifier(),
        ),
        |name| name.text,
    )
}
