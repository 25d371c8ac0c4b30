//! `summarize`: parses `agg(expr) [, agg(expr)...] [by field [, field...]]`
//! into a SELECT-list override and a GROUP BY list. May additionally
//! override the TABLES/WHERE slots (spec §4.E) — exposed here as a
//! deliberate no-op, since this crate has no schema to derive a windowed
//! subquery from, but the slot-write precedence still applies.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::pipeline::OutputSelect;
use crate::stages::{expr, StageParser};
use crate::token::TokenKind;

#[derive(Default)]
pub struct SummarizeStage {
    cursor: Option<Cursor>,
}

fn is_by(cursor: &Cursor) -> bool {
    cursor.is_kind(TokenKind::BareWord) && cursor.text().eq_ignore_ascii_case("by")
}

fn read_summarize(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<(String, Option<String>)> {
    let mut aggregates = Vec::new();
    loop {
        aggregates.push(expr::parse_until(cursor, aliases, "by")?);
        if cursor.is_kind(TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }

    let group_by = if is_by(cursor) {
        cursor.advance();
        let mut fields = Vec::new();
        loop {
            fields.push(expr::parse_single_expr(cursor, aliases)?);
            if cursor.is_kind(TokenKind::Comma) {
                cursor.advance();
                continue;
            }
            break;
        }
        Some(fields.join(", "))
    } else {
        None
    };

    Ok((aggregates.join(", "), group_by))
}

impl StageParser for SummarizeStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        let (aggs, group_by) = read_summarize(cursor, &AliasCounter::new())?;
        Ok(match group_by {
            Some(g) => format!("{aggs} by {g}"),
            None => aggs,
        })
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        let (aggs, group_by) = read_summarize(&mut cursor, aliases)?;
        out.select = Some(aggs);
        out.group_by = group_by;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::rc::Rc;

    #[test]
    fn aggregate_with_group_by() {
        let tokens = Rc::new(tokenize("Count = count() by Region"));
        let cursor = Cursor::new(tokens);
        let mut stage = SummarizeStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        stage.parse(&AliasCounter::new(), &mut out).unwrap();
        assert_eq!(out.select.as_deref(), Some("count ( ) AS Count"));
        assert_eq!(out.group_by.as_deref(), Some("Region"));
    }

    #[test]
    fn aggregate_without_group_by() {
        let tokens = Rc::new(tokenize("count()"));
        let cursor = Cursor::new(tokens);
        let mut stage = SummarizeStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        stage.parse(&AliasCounter::new(), &mut out).unwrap();
        assert_eq!(out.group_by, None);
    }
}
