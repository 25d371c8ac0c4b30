//! `filter` / `where` (spec §4.F; synonym per §4.E): tokenises its argument
//! expression via the operator library and function factory, emitting a
//! WHERE predicate.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::pipeline::OutputSelect;
use crate::stages::{expr, StageParser};

#[derive(Default)]
pub struct FilterStage {
    cursor: Option<Cursor>,
}

impl StageParser for FilterStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        expr::parse_single_expr(cursor, &AliasCounter::new())
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        out.where_ = Some(expr::parse_single_expr(&mut cursor, aliases)?);
        Ok(())
    }
}
