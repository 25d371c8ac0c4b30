//! `sort` / `order` (synonym per §4.E): parses a comma-separated list of
//! `expr [asc|desc]` and emits an ORDER BY list.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::pipeline::OutputSelect;
use crate::stages::expr::scan_expr;
use crate::stages::StageParser;
use crate::token::TokenKind;

#[derive(Default)]
pub struct SortStage {
    cursor: Option<Cursor>,
}

fn is_direction_word(text: &str) -> bool {
    text.eq_ignore_ascii_case("asc") || text.eq_ignore_ascii_case("desc")
}

/// A direction keyword only terminates the term when it is itself the last
/// token before the next comma/stage-boundary — otherwise `desc` could be a
/// column name.
fn read_one_term(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<String> {
    let mut term = scan_expr(cursor, aliases, |c| {
        if !(c.is_kind(TokenKind::BareWord) && is_direction_word(c.text())) {
            return false;
        }
        let mut lookahead = c.clone();
        lookahead.advance();
        lookahead.is_kind(TokenKind::Comma)
            || lookahead.at_stop()
            || lookahead.is_kind(TokenKind::Pipe)
    })?;
    if cursor.is_kind(TokenKind::BareWord) && is_direction_word(cursor.text()) {
        term = format!("{term} {}", cursor.text().to_ascii_uppercase());
        cursor.advance();
    }
    Ok(term)
}

fn read_sort_list(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<String> {
    // Real KQL always writes `sort by col [asc|desc], ...`; accept the
    // leading keyword when present rather than requiring it, since spec.md's
    // grammar only names the stage keyword itself.
    if cursor.is_kind(TokenKind::BareWord) && cursor.text().eq_ignore_ascii_case("by") {
        cursor.advance();
    }
    let mut items = Vec::new();
    loop {
        items.push(read_one_term(cursor, aliases)?);
        if cursor.is_kind(TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    Ok(items.join(", "))
}

impl StageParser for SortStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        read_sort_list(cursor, &AliasCounter::new())
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        out.order_by = Some(read_sort_list(&mut cursor, aliases)?);
        Ok(())
    }
}
