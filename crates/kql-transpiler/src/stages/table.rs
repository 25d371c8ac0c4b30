//! `table` (spec §4.E synthetic head stage): a single bare-word token names
//! the FROM target; `AtTable → InPipeline` advances exactly one token.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::pipeline::OutputSelect;
use crate::stages::StageParser;

#[derive(Default)]
pub struct TableStage {
    cursor: Option<Cursor>,
}

impl StageParser for TableStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        let name = cursor.text().to_string();
        cursor.advance();
        Ok(name)
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, _aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        out.from = Some(self.token_skipper(&mut cursor)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::rc::Rc;

    #[test]
    fn captures_single_token_table_name() {
        let tokens = Rc::new(tokenize("Events | take 1"));
        let cursor = Cursor::new(tokens);
        let mut stage = TableStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        stage.parse(&AliasCounter::new(), &mut out).unwrap();
        assert_eq!(out.from.as_deref(), Some("Events"));
    }
}
