//! Component B — the operator library (spec §4.B).
//!
//! Recognises a KQL infix/prefix operator at the cursor and appends its SQL
//! rewrite into an accumulator of already-emitted tokens, purely as text —
//! the library never consults the function factory. Ties are broken by
//! longest KQL-source-text match.

use crate::cursor::Cursor;
use crate::token::TokenKind;

/// One KQL operator spelling and its ClickHouse SQL rewrite.
struct OperatorRule {
    /// Token texts that make up the KQL spelling, matched in sequence.
    kql: &'static [&'static str],
    sql: &'static str,
}

/// Ordered longest-prefix-first; ties within the same token count keep
/// table order; `convert` scans top to bottom and returns on first match,
/// so longer spellings are listed before the shorter spellings they'd
/// otherwise shadow (e.g. `!=` before a hypothetical single-token `!`).
const RULES: &[OperatorRule] = &[
    OperatorRule {
        kql: &["=", "~"],
        sql: "=",
    },
    OperatorRule {
        kql: &["!", "~"],
        sql: "!=",
    },
    OperatorRule {
        kql: &["=", "="],
        sql: "=",
    },
    OperatorRule {
        kql: &["!", "="],
        sql: "!=",
    },
    OperatorRule {
        kql: &["<", "="],
        sql: "<=",
    },
    OperatorRule {
        kql: &[">", "="],
        sql: ">=",
    },
    OperatorRule {
        kql: &["!", "contains"],
        sql: "NOT LIKE",
    },
    OperatorRule {
        kql: &["!", "has"],
        sql: "NOT hasTokenCaseInsensitive",
    },
    OperatorRule {
        kql: &["!", "in"],
        sql: "NOT IN",
    },
    OperatorRule {
        kql: &["!", "startswith"],
        sql: "NOT startsWith",
    },
    OperatorRule {
        kql: &["!", "endswith"],
        sql: "NOT endsWith",
    },
    OperatorRule {
        kql: &["contains"],
        sql: "LIKE",
    },
    OperatorRule {
        kql: &["has"],
        sql: "hasTokenCaseInsensitive",
    },
    OperatorRule {
        kql: &["in"],
        sql: "IN",
    },
    OperatorRule {
        kql: &["startswith"],
        sql: "startsWith",
    },
    OperatorRule {
        kql: &["endswith"],
        sql: "endsWith",
    },
    OperatorRule {
        kql: &["<"],
        sql: "<",
    },
    OperatorRule {
        kql: &[">"],
        sql: ">",
    },
    OperatorRule {
        kql: &["and"],
        sql: "AND",
    },
    OperatorRule {
        kql: &["or"],
        sql: "OR",
    },
    OperatorRule {
        kql: &["not"],
        sql: "NOT",
    },
];

pub struct KqlOperators;

impl KqlOperators {
    /// Attempts to recognise a KQL operator at `cursor`. On success, appends
    /// the SQL rewrite to `accumulator`, advances `cursor` past the operator's
    /// tokens, and returns `true`. On failure leaves both untouched.
    pub fn convert(accumulator: &mut Vec<String>, cursor: &mut Cursor) -> bool {
        'rule: for rule in RULES {
            let probe = cursor.clone();
            for (i, expect) in rule.kql.iter().enumerate() {
                let tok = probe.peek_ahead(i);
                let matches = match tok.kind {
                    TokenKind::Eq => *expect == "=",
                    TokenKind::Bang => *expect == "!",
                    TokenKind::Tilde => *expect == "~",
                    TokenKind::Lt => *expect == "<",
                    TokenKind::Gt => *expect == ">",
                    TokenKind::BareWord => tok.text.eq_ignore_ascii_case(expect),
                    _ => false,
                };
                if !matches {
                    continue 'rule;
                }
            }
            for _ in 0..rule.kql.len() {
                cursor.advance();
            }
            accumulator.push(rule.sql.to_string());
            return true;
        }
        false
    }
}
