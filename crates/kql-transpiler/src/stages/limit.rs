//! `limit` / `take` (synonym per §4.E): parses a single integer literal as
//! the LIMIT length.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::{Result, TranspileError};
use crate::pipeline::OutputSelect;
use crate::stages::{is_stage_end, StageParser};
use crate::token::TokenKind;

#[derive(Default)]
pub struct LimitStage {
    cursor: Option<Cursor>,
}

fn read_limit(cursor: &mut Cursor) -> Result<String> {
    let offset = cursor.byte_offset();
    if !cursor.is_kind(TokenKind::Number) {
        return Err(TranspileError::MalformedArguments {
            stage: "limit".to_string(),
            offset,
            reason: "expected an integer literal".to_string(),
        });
    }
    let n = cursor.text().to_string();
    cursor.advance();
    if !is_stage_end(cursor) {
        return Err(TranspileError::MalformedArguments {
            stage: "limit".to_string(),
            offset,
            reason: "unexpected trailing tokens after the limit".to_string(),
        });
    }
    Ok(n)
}

impl StageParser for LimitStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        read_limit(cursor)
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, _aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        out.limit = Some(read_limit(&mut cursor)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::rc::Rc;

    #[test]
    fn parses_the_integer_literal() {
        let tokens = Rc::new(tokenize("10"));
        let cursor = Cursor::new(tokens);
        let mut stage = LimitStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        stage.parse(&AliasCounter::new(), &mut out).unwrap();
        assert_eq!(out.limit.as_deref(), Some("10"));
    }

    #[test]
    fn rejects_non_numeric_argument() {
        let tokens = Rc::new(tokenize("ten"));
        let cursor = Cursor::new(tokens);
        let mut stage = LimitStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        assert!(stage.parse(&AliasCounter::new(), &mut out).is_err());
    }
}
