//! Component F — the sub-parser contract (spec §4.F) and minimal concrete
//! implementations of each stage the dispatcher (§4.E) can invoke.

pub mod expr;
pub mod filter;
pub mod limit;
pub mod make_series;
pub mod print;
pub mod project;
pub mod sort;
pub mod summarize;
pub mod table;

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::pipeline::OutputSelect;
use crate::token::TokenKind;

/// Shared interface for per-clause parsers (spec §4.F). The dispatcher
/// depends only on this triad, never on a sub-parser's internals.
pub trait StageParser {
    /// Advances `cursor` past this stage's arguments, stopping at the next
    /// `|`/`;`/EOF, and returns the rewritten textual expression (used by
    /// the dispatcher only to reach the next stage, and by `--explain`).
    fn token_skipper(&self, cursor: &mut Cursor) -> Result<String>;

    /// Remembers `cursor` for the assembly phase. Side-effect-free.
    fn prepare(&mut self, cursor: Cursor);

    /// Emits this stage's SQL fragment into the `OutputSelect` slot(s) it owns.
    fn parse(&mut self, aliases: &AliasCounter, out: &mut OutputSelect) -> Result<()>;
}

/// True once `cursor` has reached this stage's boundary.
pub fn is_stage_end(cursor: &Cursor) -> bool {
    cursor.is_kind(TokenKind::Pipe) || cursor.at_stop()
}

/// Resolves spec §4.E's operator synonyms (`where`→`filter`, `take`→`limit`,
/// `order`→`sort`) to their canonical dispatch-table key.
pub fn canonical_name(word: &str) -> Option<&'static str> {
    match word.to_ascii_lowercase().as_str() {
        "filter" | "where" => Some("filter"),
        "project" => Some("project"),
        "limit" | "take" => Some("limit"),
        "sort" | "order" => Some("sort"),
        "summarize" => Some("summarize"),
        "make-series" => Some("make-series"),
        _ => None,
    }
}

/// Builds a fresh, stateless parser instance for a canonical stage name.
/// `table` is synthetic (spec §3 `PipelinePlan` invariant) and is not a
/// dispatch-table key, so it is not reachable through here.
pub fn new_parser(name: &str) -> Option<Box<dyn StageParser>> {
    match name {
        "filter" => Some(Box::new(filter::FilterStage::default())),
        "project" => Some(Box::new(project::ProjectStage::default())),
        "limit" => Some(Box::new(limit::LimitStage::default())),
        "sort" => Some(Box::new(sort::SortStage::default())),
        "summarize" => Some(Box::new(summarize::SummarizeStage::default())),
        "make-series" => Some(Box::new(make_series::MakeSeriesStage::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_resolve_to_the_same_canonical_name() {
        assert_eq!(canonical_name("filter"), canonical_name("where"));
        assert_eq!(canonical_name("limit"), canonical_name("take"));
        assert_eq!(canonical_name("sort"), canonical_name("order"));
        assert_eq!(canonical_name("make-series"), Some("make-series"));
        assert_eq!(canonical_name("nope"), None);
    }
}
