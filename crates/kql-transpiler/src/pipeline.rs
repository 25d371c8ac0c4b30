//! Component E — the pipeline dispatcher (spec §4.E): splits a KQL query on
//! `|`, assigns each stage to its sub-parser, calls them in canonical SQL
//! order, and assembles the output SELECT.

use std::rc::Rc;

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::{Result, TranspileError};
use crate::stages::{self, table::TableStage, StageParser};
use crate::token::{tokenize, TokenKind};

/// The assembled SQL SELECT (spec §3): six slots, at most one value each,
/// last write wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputSelect {
    pub select: Option<String>,
    pub from: Option<String>,
    pub where_: Option<String>,
    pub group_by: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
}

impl OutputSelect {
    fn render(&self) -> String {
        let mut sql = format!("SELECT {}", self.select.as_deref().unwrap_or("*"));
        if let Some(from) = &self.from {
            sql.push_str(&format!(" FROM {from}"));
        }
        if let Some(predicate) = &self.where_ {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        if let Some(group_by) = &self.group_by {
            sql.push_str(&format!(" GROUP BY {group_by}"));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {order_by}"));
        }
        if let Some(limit) = &self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }
}

/// One `(operator_name, cursor_at_args)` pair (spec §3 `StageRecord`).
struct StageRecord {
    operator: String,
    cursor: Cursor,
}

/// Clause emission order, fixed regardless of textual stage order (spec §4.E).
const EMISSION_ORDER: &[&str] = &[
    "table",
    "project",
    "limit",
    "filter",
    "sort",
    "summarize",
    "make-series",
];

/// Parses `source` and returns the equivalent ClickHouse-flavoured SQL
/// SELECT, or a structured diagnostic (spec §7).
pub fn transpile(source: &str) -> Result<String> {
    log::trace!("tokenizing query ({} bytes)", source.len());
    let tokens = Rc::new(tokenize(source));
    let mut cursor = Cursor::new(tokens);

    if cursor.is_kind(TokenKind::BareWord) && cursor.text().eq_ignore_ascii_case("print") {
        log::debug!("dispatch: print query");
        cursor.advance();
        let aliases = AliasCounter::new();
        let expr = stages::print::render(&mut cursor, &aliases)?;
        return Ok(format!("SELECT {expr}"));
    }

    let plan = scan_pipeline(&mut cursor)?;
    assemble(&plan)
}

/// The recognised stage plan in textual (input) order, for `--explain`
/// diagnostics. Does not run the assembly phase.
pub fn plan_summary(source: &str) -> Result<Vec<String>> {
    let tokens = Rc::new(tokenize(source));
    let mut cursor = Cursor::new(tokens);

    if cursor.is_kind(TokenKind::BareWord) && cursor.text().eq_ignore_ascii_case("print") {
        return Ok(vec!["print".to_string()]);
    }

    let plan = scan_pipeline(&mut cursor)?;
    Ok(plan.into_iter().map(|record| record.operator).collect())
}

/// `Start → AtTable → InPipeline` (spec §4.E): builds the ordered
/// `PipelinePlan`, delegating argument-skipping to each stage's
/// `token_skipper` so the scan only ever looks for `|`/`;`/EOF.
fn scan_pipeline(cursor: &mut Cursor) -> Result<Vec<StageRecord>> {
    if !cursor.is_kind(TokenKind::BareWord) {
        return Err(TranspileError::MalformedPipeline {
            offset: cursor.byte_offset(),
            reason: "expected a table name".to_string(),
        });
    }
    let mut plan = vec![StageRecord {
        operator: "table".to_string(),
        cursor: cursor.clone(),
    }];
    cursor.advance();

    while !cursor.at_stop() {
        if !cursor.is_kind(TokenKind::Pipe) {
            return Err(TranspileError::MalformedPipeline {
                offset: cursor.byte_offset(),
                reason: "expected '|' or end of query".to_string(),
            });
        }
        cursor.advance();
        if cursor.at_stop() {
            return Err(TranspileError::MalformedPipeline {
                offset: cursor.byte_offset(),
                reason: "'|' at end of query".to_string(),
            });
        }

        let op_offset = cursor.byte_offset();
        if !cursor.is_kind(TokenKind::BareWord) {
            return Err(TranspileError::MalformedPipeline {
                offset: op_offset,
                reason: "expected a stage keyword".to_string(),
            });
        }
        let mut word = cursor.text().to_string();
        cursor.advance();

        if word.eq_ignore_ascii_case("make") {
            let has_series = cursor.is_kind(TokenKind::Minus)
                && cursor.peek_ahead(1).kind == TokenKind::BareWord
                && cursor.peek_ahead(1).text.eq_ignore_ascii_case("series");
            if !has_series {
                return Err(TranspileError::UnknownOperator {
                    operator: word,
                    offset: op_offset,
                });
            }
            cursor.advance(); // past '-'
            cursor.advance(); // past 'series'
            word = "make-series".to_string();
        }

        let canonical =
            stages::canonical_name(&word).ok_or_else(|| TranspileError::UnknownOperator {
                operator: word.clone(),
                offset: op_offset,
            })?;
        log::trace!("stage recognised: {canonical} at byte {op_offset}");

        plan.push(StageRecord {
            operator: canonical.to_string(),
            cursor: cursor.clone(),
        });

        let skipper =
            stages::new_parser(canonical).expect("canonical_name implies a registered parser");
        skipper.token_skipper(cursor)?;
    }

    Ok(plan)
}

/// Assembly phase (spec §4.E): each `StageRecord`'s `prepare` is called in
/// insertion order, then `parse` is invoked in `EMISSION_ORDER`, last write
/// wins per slot.
fn assemble(plan: &[StageRecord]) -> Result<String> {
    let aliases = AliasCounter::new();
    let mut out = OutputSelect::default();

    for &name in EMISSION_ORDER {
        for record in plan.iter().filter(|r| r.operator == name) {
            log::debug!("assembling stage {name}");
            if name == "table" {
                let mut stage = TableStage::default();
                stage.prepare(record.cursor.clone());
                stage.parse(&aliases, &mut out)?;
            } else {
                let mut stage =
                    stages::new_parser(name).expect("emission order only lists known stages");
                stage.prepare(record.cursor.clone());
                stage.parse(&aliases, &mut out)?;
            }
        }
    }

    Ok(out.render())
}
