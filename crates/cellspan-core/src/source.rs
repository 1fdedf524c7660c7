//! Raw table sources recorded during the parse.
//!
//! The parser reports every table block it recognizes to a [`TableObserver`]
//! before building the tree for it. [`SourceRecorder`] keeps those blocks, in
//! encounter order, as [`TableSource`] values that pair each body row of the
//! future tree with the raw line it was built from. The resolver later reads
//! them back in the same order.

use tracing::trace;

/// A table block as recognized by the parser.
///
/// Line indices are relative to `lines`, which holds every line of the block
/// in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock<'a> {
    pub lines: Vec<&'a str>,
    /// Zero-based line number of the block's first line in the document.
    pub start_line: usize,
    pub header: usize,
    pub delimiter: usize,
    /// For each body row the parser will build, the line it comes from.
    pub body: Vec<usize>,
}

/// Receives table blocks as the parser recognizes them.
///
/// Observers only watch: the parser builds the table tree whatever the
/// observer does.
pub trait TableObserver<'a> {
    fn table_block(&mut self, block: &TableBlock<'a>);
}

impl<'a> TableObserver<'a> for () {
    fn table_block(&mut self, _block: &TableBlock<'a>) {}
}

/// Raw text of one recorded table, with its row correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource<'a> {
    /// Position of this table among the recorded tables.
    pub index: usize,
    pub start_line: usize,
    lines: Vec<&'a str>,
    header: usize,
    body: Vec<usize>,
}

impl<'a> TableSource<'a> {
    fn from_block(index: usize, block: &TableBlock<'a>) -> Self {
        Self {
            index,
            start_line: block.start_line,
            lines: block.lines.clone(),
            header: block.header,
            body: block.body.clone(),
        }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn header_line(&self) -> &'a str {
        self.lines[self.header]
    }

    /// Raw line behind body row `row`.
    pub fn body_line(&self, row: usize) -> Option<&'a str> {
        self.body.get(row).map(|&line| self.lines[line])
    }

    /// Document line number (0-based) of body row `row`.
    pub fn body_line_number(&self, row: usize) -> Option<usize> {
        self.body.get(row).map(|&line| self.start_line + line)
    }

    pub fn body_rows(&self) -> usize {
        self.body.len()
    }

    /// The block text as written, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Accumulates table sources in encounter order.
#[derive(Debug, Default)]
pub struct SourceRecorder<'a> {
    sources: Vec<TableSource<'a>>,
}

impl<'a> SourceRecorder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[TableSource<'a>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}

impl<'a> TableObserver<'a> for SourceRecorder<'a> {
    fn table_block(&mut self, block: &TableBlock<'a>) {
        let index = self.sources.len();
        trace!(
            table = index,
            line = block.start_line + 1,
            rows = block.body.len(),
            "recorded table source"
        );
        self.sources.push(TableSource::from_block(index, block));
    }
}

/// State for one document run, shared by the parser and the resolver.
///
/// Create one per document, or call [`SpanContext::reset`] before reusing it,
/// so sources never leak from one document into the next.
#[derive(Debug, Default)]
pub struct SpanContext<'a> {
    recorder: SourceRecorder<'a>,
}

impl<'a> SpanContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        self.recorder.clear();
    }

    pub fn sources(&self) -> &[TableSource<'a>] {
        self.recorder.sources()
    }

    pub fn recorder_mut(&mut self) -> &mut SourceRecorder<'a> {
        &mut self.recorder
    }
}

impl<'a> TableObserver<'a> for SpanContext<'a> {
    fn table_block(&mut self, block: &TableBlock<'a>) {
        self.recorder.table_block(block);
    }
}
