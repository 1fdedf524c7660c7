//! # cellspan core
//!
//! Column and row spanning for Markdown pipe tables.
//!
//! Plain pipe tables give every cell exactly one slot. This crate adds two
//! conventions on top and rewrites the parsed table accordingly:
//!
//! - A cell followed by extra pipes spans that many more columns:
//!   `| wide cell || next |`. When the table parser would mangle an empty
//!   cell, write the empty-cell token instead: `| wide cell |~~| next |`.
//! - A cell holding only a row-span marker merges upward into the first
//!   non-blank cell of its column. `_ _` centers the merged content,
//!   `_^_` aligns it to the top and `_=_` to the bottom. To keep a cell
//!   that merely looks like a marker, add `&#20;` to it.
//!
//! ## Quick Start
//!
//! ```rust
//! use cellspan_core::{process, SpanConfig};
//!
//! let input = "\
//! | A | B | C |
//! |---|---|---|
//! | wide   || c1 |
//! | a2 | b2 | c2 |
//! | a3 | b3 | _ _ |
//! ";
//! let doc = process(input, &SpanConfig::default()).unwrap();
//! let table = doc.tables().next().unwrap();
//!
//! assert_eq!(table.body[0].cells[0].colspan, Some(2));
//! assert_eq!(table.body[1].cells[2].rowspan, Some(2));
//! assert_eq!(table.body[2].cells.len(), 2);
//! ```
//!
//! ## Running the stages yourself
//!
//! [`process`] wires the two stages together. To drive them separately,
//! parse into a fresh [`SpanContext`] (it records each table's raw source)
//! and hand the same context to a [`SpanResolver`]:
//!
//! ```rust
//! use cellspan_core::{Parser, SpanConfig, SpanContext, SpanResolver};
//!
//! let input = "| A | B |\n|---|---|\n| x || \n";
//! let mut context = SpanContext::new();
//! let mut doc = Parser::new().parse_observed(input, &mut context);
//!
//! let resolver = SpanResolver::new(&SpanConfig::default()).unwrap();
//! let report = resolver.resolve(&context, &mut doc).unwrap();
//! assert_eq!(report.colspans, 1);
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod source;
pub mod span;

pub use ast::{Block, Document, Table, TableCell, TableRow, VAlign};
pub use config::SpanConfig;
pub use error::{SpanError, SpanResult};
pub use parser::Parser;
pub use resolver::{ResolveReport, SpanResolver};
pub use source::{SpanContext, TableObserver, TableSource};

/// Parse `input` and resolve the spans of every table in it.
pub fn process<'a>(input: &'a str, config: &SpanConfig) -> SpanResult<Document<'a>> {
    process_with_report(input, config).map(|(document, _)| document)
}

/// Like [`process`], also returning what the resolver changed.
pub fn process_with_report<'a>(
    input: &'a str,
    config: &SpanConfig,
) -> SpanResult<(Document<'a>, ResolveReport)> {
    let resolver = SpanResolver::new(config)?;
    let mut context = SpanContext::new();
    let mut document = Parser::new().parse_observed(input, &mut context);
    let report = resolver.resolve(&context, &mut document)?;
    Ok((document, report))
}
