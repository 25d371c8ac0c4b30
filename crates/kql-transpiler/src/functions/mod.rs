//! Components C and D — the function factory and its expansion templates
//! (spec §4.C/§4.D).

mod ip;

use std::collections::HashMap;

use crate::alias::AliasCounter;
use crate::cursor::Cursor;
use crate::error::{Result, TranspileError};
use crate::token::TokenKind;

/// Passed into every template expansion (spec §3 `FunctionContext`). Templates
/// must not retain it past the call that receives it.
pub struct FunctionContext<'a> {
    pub args: &'a [String],
    pub aliases: &'a AliasCounter,
}

impl<'a> FunctionContext<'a> {
    pub fn arg(&self, i: usize, function: &str, offset: usize) -> Result<&str> {
        self.args
            .get(i)
            .map(String::as_str)
            .ok_or_else(|| TranspileError::MalformedArguments {
                stage: function.to_string(),
                offset,
                reason: format!("expected at least {} argument(s)", i + 1),
            })
    }

    pub fn arg_or(&self, i: usize, default: &str) -> String {
        self.args
            .get(i)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

type Template = fn(&FunctionContext, usize) -> Result<String>;

fn registry() -> &'static HashMap<&'static str, Template> {
    use std::sync::OnceLock;
    static REGISTRY: OnceLock<HashMap<&'static str, Template>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut m: HashMap<&'static str, Template> = HashMap::new();
        m.insert("format_ipv4", ip::format_ipv4);
        m.insert("format_ipv4_mask", ip::format_ipv4_mask);
        m.insert("ipv4_compare", ip::ipv4_compare);
        m.insert("ipv4_is_match", ip::ipv4_is_match);
        m.insert("ipv6_compare", ip::ipv6_compare);
        m.insert("ipv6_is_match", ip::ipv6_is_match);
        m.insert("ipv4_is_in_range", ip::ipv4_is_in_range);
        m.insert("ipv4_is_private", ip::ipv4_is_private);
        m.insert("ipv4_netmask_suffix", ip::ipv4_netmask_suffix);
        m.insert("parse_ipv4", ip::parse_ipv4);
        m.insert("parse_ipv4_mask", ip::parse_ipv4_mask);
        m.insert("parse_ipv6", ip::parse_ipv6);
        m.insert("parse_ipv6_mask", ip::parse_ipv6_mask);
        m
    })
}

pub struct FunctionFactory;

impl FunctionFactory {
    /// True if `name` has a registered expansion template.
    pub fn is_registered(name: &str) -> bool {
        registry().contains_key(name)
    }

    /// `cursor` must be positioned at the function's opening parenthesis.
    /// Parses the comma-separated argument list (honouring nested
    /// parentheses and string literals), dispatches to the registered
    /// template, and leaves `cursor` just past the closing parenthesis.
    pub fn expand(name: &str, cursor: &mut Cursor, aliases: &AliasCounter) -> Result<String> {
        let offset = cursor.byte_offset();
        let template = *registry()
            .get(name)
            .ok_or_else(|| TranspileError::UnknownFunction {
                name: name.to_string(),
                offset,
            })?;

        let args = parse_argument_list(cursor)?;
        let ctx = FunctionContext {
            args: &args,
            aliases,
        };
        template(&ctx, offset)
    }
}

/// Parses `( arg0 , arg1 , ... )` starting at `cursor` (positioned on the
/// opening parenthesis), honouring nested parens and string literals so a
/// comma inside a nested call doesn't split an argument. Leaves `cursor`
/// positioned just past the closing parenthesis.
fn parse_argument_list(cursor: &mut Cursor) -> Result<Vec<String>> {
    let open_offset = cursor.byte_offset();
    if !cursor.is_kind(TokenKind::ParenOpen) {
        return Err(TranspileError::MalformedArguments {
            stage: "function call".to_string(),
            offset: open_offset,
            reason: "expected '('".to_string(),
        });
    }
    cursor.advance();

    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    loop {
        if cursor.at_stop() {
            return Err(TranspileError::MalformedArguments {
                stage: "function call".to_string(),
                offset: open_offset,
                reason: "unterminated argument list".to_string(),
            });
        }
        match cursor.peek().kind {
            TokenKind::ParenClose if depth == 0 => {
                cursor.advance();
                break;
            }
            TokenKind::ParenOpen => {
                depth += 1;
                push_token(&mut current, cursor.text());
                cursor.advance();
            }
            TokenKind::ParenClose => {
                depth -= 1;
                push_token(&mut current, cursor.text());
                cursor.advance();
            }
            TokenKind::Comma if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
                cursor.advance();
            }
            _ => {
                push_token(&mut current, cursor.text());
                cursor.advance();
            }
        }
    }

    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    Ok(args)
}

fn push_token(buf: &mut String, text: &str) {
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}
