//! `make-series`: parses `agg(expr) [, ...] on time_field [by field...]`
//! into a SELECT-list override and a time-bucketed GROUP BY override,
//! mirroring the "make-series may override TABLES/GROUP BY" rule (§4.E).

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::{Result, TranspileError};
use crate::pipeline::OutputSelect;
use crate::stages::{expr, StageParser};
use crate::token::TokenKind;

#[derive(Default)]
pub struct MakeSeriesStage {
    cursor: Option<Cursor>,
}

fn is_keyword(cursor: &Cursor, word: &str) -> bool {
    cursor.is_kind(TokenKind::BareWord) && cursor.text().eq_ignore_ascii_case(word)
}

fn read_make_series(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<(String, String)> {
    let offset = cursor.byte_offset();
    let mut aggregates = Vec::new();
    loop {
        aggregates.push(expr::parse_until(cursor, aliases, "on")?);
        if cursor.is_kind(TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }

    if !is_keyword(cursor, "on") {
        return Err(TranspileError::MalformedArguments {
            stage: "make-series".to_string(),
            offset,
            reason: "expected 'on' before the time axis field".to_string(),
        });
    }
    cursor.advance();

    let time_field = expr::parse_until(cursor, aliases, "by")?;
    let mut group_by = vec![format!("toStartOfHour({time_field})")];
    if is_keyword(cursor, "by") {
        cursor.advance();
        loop {
            group_by.push(expr::parse_single_expr(cursor, aliases)?);
            if cursor.is_kind(TokenKind::Comma) {
                cursor.advance();
                continue;
            }
            break;
        }
    }

    Ok((aggregates.join(", "), group_by.join(", ")))
}

impl StageParser for MakeSeriesStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        let (aggs, group_by) = read_make_series(cursor, &AliasCounter::new())?;
        Ok(format!("{aggs} group {group_by}"))
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        let (aggs, group_by) = read_make_series(&mut cursor, aliases)?;
        out.select = Some(aggs);
        out.group_by = Some(group_by);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::rc::Rc;

    #[test]
    fn buckets_on_the_time_axis_and_accepts_extra_group_fields() {
        let tokens = Rc::new(tokenize("count() on Timestamp by Region"));
        let cursor = Cursor::new(tokens);
        let mut stage = MakeSeriesStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        stage.parse(&AliasCounter::new(), &mut out).unwrap();
        assert_eq!(out.select.as_deref(), Some("count ( )"));
        assert_eq!(
            out.group_by.as_deref(),
            Some("toStartOfHour(Timestamp), Region")
        );
    }

    #[test]
    fn rejects_missing_on_clause() {
        let tokens = Rc::new(tokenize("count()"));
        let cursor = Cursor::new(tokens);
        let mut stage = MakeSeriesStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        assert!(stage.parse(&AliasCounter::new(), &mut out).is_err());
    }
}
