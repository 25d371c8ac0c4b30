//! KQL pipeline parsing and transpilation to ClickHouse-flavoured SQL.
//!
//! The crate is organised the way the pipeline itself is read: a token
//! cursor ([`cursor`]) built from a lexer ([`token`]), an operator library
//! ([`operators`]) and function factory ([`functions`]) that both work in
//! terms of that cursor, and a dispatcher ([`pipeline`]) that walks a query
//! stage by stage, handing each stage off to the sub-parser registered for
//! it ([`stages`]).

pub mod alias;
pub mod cursor;
pub mod error;
pub mod functions;
pub mod operators;
pub mod pipeline;
pub mod stages;
pub mod token;

pub use error::{Result, TranspileError};
pub use pipeline::{plan_summary, transpile};
