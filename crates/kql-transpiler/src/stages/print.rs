//! `print` (spec §4.E `Start → AtTable` special case): delegates to the same
//! expression-tokenisation path as `project` and emits a single-row
//! `SELECT <expr>`, terminating the dispatcher immediately. Not part of
//! `PipelinePlan` — the dispatcher never builds stages for it.

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::stages::expr;

pub fn render(cursor: &mut Cursor, aliases: &AliasCounter) -> Result<String> {
    let items = expr::parse_expr_list(cursor, aliases)?;
    Ok(items.join(", "))
}
