//! `project`: tokenises a comma-separated expression list, honouring the
//! `alias = expr ⇒ expr AS alias` rewrite, emitting the SELECT list.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::pipeline::OutputSelect;
use crate::stages::{expr, StageParser};

#[derive(Default)]
pub struct ProjectStage {
    cursor: Option<Cursor>,
}

impl StageParser for ProjectStage {
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String> {
        Ok(expr::parse_expr_list(cursor, &AliasCounter::new())?.join(", "))
    }

    fn prepare(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn parse(&mut self, aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()> {
        let mut cursor = self.cursor.clone().expect("prepare called before parse");
        let items = expr::parse_expr_list(&mut cursor, aliases)?;
        out.select = Some(items.join(", "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::rc::Rc;

    #[test]
    fn emits_a_comma_separated_select_list_with_rename() {
        let tokens = Rc::new(tokenize("x, y = z"));
        let cursor = Cursor::new(tokens);
        let mut stage = ProjectStage::default();
        stage.prepare(cursor);
        let mut out = OutputSelect::default();
        stage.parse(&AliasCounter::new(), &mut out).unwrap();
        assert_eq!(out.select.as_deref(), Some("x, z AS y"));
    }
}
