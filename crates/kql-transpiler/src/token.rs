//! The host lexer (spec §3/§6). Kept intentionally small: enough lexical
//! surface for the dispatcher, operator library and function factory to
//! work from, nothing Unicode-aware beyond UTF-8 char boundaries.

use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    BareWord,
    Number,
    StringLit,
    Pipe,
    Semicolon,
    Comma,
    Minus,
    Eq,
    Bang,
    Lt,
    Gt,
    Tilde,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Dot,
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub begin: usize,
    pub end: usize,
    pub text: String,
}

impl Token {
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfStream
    }
}

/// Splits `source` into a flat token stream, dropping whitespace and `//` comments.
/// Always ends with a single `TokenKind::EndOfStream` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < len {
        let c = bytes[i] as char;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '/' && i + 1 < len && bytes[i + 1] as char == '/' {
            while i < len && bytes[i] as char != '\n' {
                i += 1;
            }
            continue;
        }

        let begin = i;
        let (kind, end) = match c {
            '|' => (TokenKind::Pipe, i + 1),
            ';' => (TokenKind::Semicolon, i + 1),
            ',' => (TokenKind::Comma, i + 1),
            '-' => (TokenKind::Minus, i + 1),
            '=' => (TokenKind::Eq, i + 1),
            '!' => (TokenKind::Bang, i + 1),
            '<' => (TokenKind::Lt, i + 1),
            '>' => (TokenKind::Gt, i + 1),
            '~' => (TokenKind::Tilde, i + 1),
            '(' => (TokenKind::ParenOpen, i + 1),
            ')' => (TokenKind::ParenClose, i + 1),
            '[' => (TokenKind::BracketOpen, i + 1),
            ']' => (TokenKind::BracketClose, i + 1),
            '.' if !bytes
                .get(i + 1)
                .is_some_and(|b| (*b as char).is_ascii_digit()) =>
            {
                (TokenKind::Dot, i + 1)
            }
            '"' | '\'' => {
                let quote = c;
                let mut j = i + 1;
                while j < len && bytes[j] as char != quote {
                    j += 1;
                }
                let end = (j + 1).min(len);
                (TokenKind::StringLit, end)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut j = i + 1;
                while j < len {
                    let ch = bytes[j] as char;
                    if ch.is_ascii_digit() || ch == '.' {
                        j += 1;
                    } else {
                        break;
                    }
                }
                (TokenKind::Number, j)
            }
            _ => {
                let mut j = i;
                while j < len {
                    let ch = bytes[j] as char;
                    if ch.is_whitespace() || "|;,-=!<>~()[].\"'".contains(ch) {
                        break;
                    }
                    j += 1;
                }
                if j == i {
                    j += 1;
                }
                (TokenKind::BareWord, j)
            }
        };

        out.push(Token {
            kind,
            begin,
            end,
            text: source[begin..end].to_string(),
        });
        i = end;
    }

    out.push(Token {
        kind: TokenKind::EndOfStream,
        begin: len,
        end: len,
        text: String::new(),
    });
    out
}
