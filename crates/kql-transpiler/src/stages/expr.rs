//! Shared expression-tokenisation helper (spec §4.A's reference
//! `getExprFromToken`): walks a stage's argument tokens, applying the
//! operator library (§4.B) and function factory (§4.C/§4.D), honouring the
//! `alias = expr ⇒ expr AS alias` rename and comma-triggered item flush at
//! paren/bracket depth zero.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::functions::FunctionFactory;
use crate::operators::KqlOperators;
use crate::stages::is_stage_end;
use crate::token::TokenKind;

/// Parses one `expr` or `alias = expr` term, stopping at depth zero when
/// `extra_stop` fires, a comma is seen, or the stage boundary is reached.
pub(crate) fn scan_expr(
    cursor: &mut Cursor,
    aliases: &AliasCounter,
    extra_stop: impl Fn(&Cursor) -> bool,
) -> Result<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut alias: Option<String> = None;
    let mut depth = 0i32;

    while !(depth == 0
        && (is_stage_end(cursor) || cursor.is_kind(TokenKind::Comma) || extra_stop(cursor)))
    {
        if KqlOperators::convert(&mut parts, cursor) {
            continue;
        }
        match cursor.peek().kind {
            TokenKind::Eq if depth == 0 => {
                alias = Some(parts.join(" ").trim().to_string());
                parts.clear();
                cursor.advance();
            }
            TokenKind::ParenOpen if matches!(parts.last().map(String::as_str), Some(name) if FunctionFactory::is_registered(name)) =>
            {
                let name = parts
                    .pop()
                    .expect("just matched a registered function name");
                parts.push(FunctionFactory::expand(&name, cursor, aliases)?);
            }
            TokenKind::ParenOpen | TokenKind::BracketOpen => {
                depth += 1;
                parts.push(cursor.text().to_string());
                cursor.advance();
            }
            TokenKind::ParenClose | TokenKind::BracketClose => {
                depth -= 1;
                parts.push(cursor.text().to_string());
                cursor.advance();
            }
            _ => {
                parts.push(cursor.text().to_string());
                cursor.advance();
            }
        }
    }

    let body = parts.join(" ");
    Ok(match alias {
        Some(name) => format!("{body} AS {name}"),
        None => body,
    })
}

/// A single expression, with no comma splitting (used by `filter`, `sort`
/// terms, `summarize`/`make-series` group fields).
pub fn parse_single_expr(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<String> {
    scan_expr(cursor, aliases, |_| false)
}

/// A comma-separated expression list, each item alias-rename-aware (used by
/// `project`).
pub fn parse_expr_list(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<Vec<String>> {
    let mut items = Vec::new();
    loop {
        items.push(parse_single_expr(cursor, aliases)?);
        if cursor.is_kind(TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    Ok(items)
}

/// One expression, stopping early (at depth zero) when `stop_word` is seen
/// as a bare word — used by `summarize ... by` and `make-series ... on`.
pub fn parse_until(cursor: &mut Cursor, aliases: &AliasCounter, stop_word: &str) -> Result<String> {
    scan_expr(cursor, aliases, |c| {
        c.is_kind(TokenKind::BareWord) && c.text().eq_ignore_ascii_case(stop_word)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::rc::Rc;

    fn run(src: &str) -> Vec<String> {
        let tokens = Rc::new(tokenize(src));
        let mut cursor = Cursor::new(tokens);
        parse_expr_list(&mut cursor, &AliasCounter::new()).unwrap()
    }

    #[test]
    fn renames_alias_assignment() {
        assert_eq!(run("y = x + 1"), vec!["x + 1 AS y"]);
    }

    #[test]
    fn splits_on_top_level_comma_but_not_inside_parens() {
        let items = run("a, format_ipv4(b)");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], "a");
        assert!(items[1].starts_with("ifNull(if("));
    }

    #[test]
    fn in_list_commas_do_not_split_items() {
        let items = run("x in (1, 2, 3)");
        assert_eq!(items, vec!["x IN ( 1 , 2 , 3 )"]);
    }

    #[test]
    fn equality_is_not_mistaken_for_alias_rename() {
        assert_eq!(run("x == 1"), vec!["x = 1"]);
    }
}
