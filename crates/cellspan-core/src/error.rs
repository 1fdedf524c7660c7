use std::fmt;

use thiserror::Error;

/// Errors that abort a span-resolution pass.
///
/// All of them are deterministic input problems; the message is meant to be
/// shown verbatim to whoever wrote the document. Table and row numbers in the
/// messages are 1-based, the fields are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    /// A row has more merge markers than there are cells to merge into.
    #[error(
        "cannot merge cell beyond end of row (one too many '|' characters in row?)\n\
         check row {} of table {} in your document. Row contents:\n{}",
        number(.row),
        number(.table),
        CellDump(.cells)
    )]
    StructuralMismatch {
        table: usize,
        row: usize,
        /// Text of each cell in the row at the time of failure.
        cells: Vec<String>,
    },

    /// A row-span marker asks for both top (`^`) and bottom (`=`) alignment.
    #[error(
        "cannot use both ^ (top) and = (bottom) codes in a row span marker\n\
         check row {}, column {} in table {} in your document",
        number(.row),
        number(.column),
        number(.table)
    )]
    InvalidAlignmentMarker {
        table: usize,
        row: usize,
        column: usize,
    },

    /// The tree holds a table the recorder never saw.
    #[error("no recorded source for table {}", number(.table))]
    MissingSource { table: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SpanError {
    /// Zero-based index of the offending table, when the error has one.
    pub fn table(&self) -> Option<usize> {
        match self {
            SpanError::StructuralMismatch { table, .. }
            | SpanError::InvalidAlignmentMarker { table, .. }
            | SpanError::MissingSource { table } => Some(*table),
            SpanError::Config(_) => None,
        }
    }
}

pub type SpanResult<T> = Result<T, SpanError>;

fn number(index: &usize) -> usize {
    index + 1
}

struct CellDump<'a>(&'a [String]);

impl fmt::Display for CellDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, text) in self.0.iter().enumerate() {
            let shown = if text.is_empty() { "Empty" } else { text };
            writeln!(f, "  Cell {}: {}", i + 1, shown)?;
        }
        Ok(())
    }
}
