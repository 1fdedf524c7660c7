//! Block parser for the Markdown subset the span pass needs.
//!
//! Recognizes ATX headings, fenced code, thematic breaks, paragraphs and
//! pipe tables. Tables are the only blocks given structure; every table block
//! is handed to a [`TableObserver`] before its tree is built.
//!
//! Table recognition follows the usual pipe-table rules: a header line with
//! at least one unescaped `|`, followed by a delimiter row with the same
//! number of cells, each made of dashes with optional leading/trailing
//! colons. Body rows run until a blank line or the start of another block.
//! Every row in the tree gets exactly one cell per header column. A table
//! only starts a block; it never interrupts a paragraph.

use std::borrow::Cow;

use tracing::debug;

use crate::ast::{
    Block, CodeBlock, ColumnAlign, Document, Heading, Paragraph, Table, TableCell, TableRow,
};
use crate::lexer::{Line, Lexer};
use crate::source::{TableBlock, TableObserver};
use crate::span::Span;

/// Markdown block parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Parse without recording table sources.
    pub fn parse<'a>(&self, input: &'a str) -> Document<'a> {
        self.parse_observed(input, &mut ())
    }

    /// Parse, reporting each recognized table block to `observer` in
    /// document order.
    pub fn parse_observed<'a, O>(&self, input: &'a str, observer: &mut O) -> Document<'a>
    where
        O: TableObserver<'a> + ?Sized,
    {
        let mut lexer = Lexer::new(input);
        let mut blocks = Vec::with_capacity(16);

        while !lexer.is_eof() {
            lexer.skip_blank_lines();
            if lexer.is_eof() {
                break;
            }
            if let Some(block) = self.parse_block(&mut lexer, input, observer) {
                blocks.push(block);
            }
        }

        Document {
            blocks,
            span: Span::new(0, input.len() as u32),
        }
    }

    fn parse_block<'a, O>(
        &self,
        lexer: &mut Lexer<'a>,
        input: &'a str,
        observer: &mut O,
    ) -> Option<Block<'a>>
    where
        O: TableObserver<'a> + ?Sized,
    {
        let line = *lexer.peek_line()?;

        if let Some(fence) = fence_of(&line) {
            return self.parse_code_block(lexer, input, fence);
        }
        if heading_level(&line).is_some() {
            return self.parse_heading(lexer);
        }
        if let Some(alignments) = self.table_start(lexer) {
            return self.parse_table(lexer, alignments, observer);
        }
        if is_thematic_break(&line) {
            lexer.next_line();
            return Some(Block::ThematicBreak(line.span));
        }
        self.parse_paragraph(lexer, input)
    }

    fn parse_heading<'a>(&self, lexer: &mut Lexer<'a>) -> Option<Block<'a>> {
        let line = lexer.next_line()?;
        let level = heading_level(&line)?;
        let rest = line.trimmed()[level as usize..].trim();
        // Optional closing sequence: "## Title ##"
        let stripped = rest.trim_end_matches('#');
        let text = if stripped.is_empty() || stripped.ends_with([' ', '\t']) {
            stripped.trim_end()
        } else {
            rest
        };

        Some(Block::Heading(Heading {
            level,
            text: Cow::Borrowed(text),
            span: line.span,
        }))
    }

    fn parse_code_block<'a>(
        &self,
        lexer: &mut Lexer<'a>,
        input: &'a str,
        fence: Fence,
    ) -> Option<Block<'a>> {
        let open = lexer.next_line()?;
        let lang = open.trimmed()[fence.len..].trim();

        let content_start = (open.span.end as usize + 1).min(input.len());
        let mut content_end = content_start;
        let mut end_span = open.span;

        while let Some(line) = lexer.next_line() {
            end_span = line.span;
            if closes_fence(&line, fence) {
                break;
            }
            content_end = line.span.end as usize;
        }

        let content = input.get(content_start..content_end).unwrap_or("");

        Some(Block::CodeBlock(CodeBlock {
            lang: Cow::Borrowed(lang),
            content: Cow::Borrowed(content),
            span: Span::new(open.span.start, end_span.end),
        }))
    }

    fn parse_paragraph<'a>(&self, lexer: &mut Lexer<'a>, input: &'a str) -> Option<Block<'a>> {
        let first = lexer.next_line()?;
        let mut end = first.span;

        while let Some(line) = lexer.peek_line() {
            if line.is_blank()
                || fence_of(line).is_some()
                || heading_level(line).is_some()
                || is_thematic_break(line)
            {
                break;
            }
            end = line.span;
            lexer.next_line();
        }

        let span = first.span.merge(end);
        Some(Block::Paragraph(Paragraph {
            text: Cow::Borrowed(span.slice(input).unwrap_or("")),
            span,
        }))
    }

    /// Column alignments if the next two lines open a table.
    fn table_start(&self, lexer: &mut Lexer<'_>) -> Option<Vec<ColumnAlign>> {
        let header = lexer.peek_ahead(0)?;
        let delimiter = lexer.peek_ahead(1)?;

        if header.indent() >= 4 || !header.has_pipe() {
            return None;
        }
        let header_cells = split_row(header.text).len();
        let alignments = parse_delimiter_row(delimiter.text)?;

        (header_cells == alignments.len()).then_some(alignments)
    }

    fn parse_table<'a, O>(
        &self,
        lexer: &mut Lexer<'a>,
        alignments: Vec<ColumnAlign>,
        observer: &mut O,
    ) -> Option<Block<'a>>
    where
        O: TableObserver<'a> + ?Sized,
    {
        let header_line = lexer.next_line()?;
        let delimiter_line = lexer.next_line()?;
        let mut body_lines: Vec<Line<'a>> = Vec::with_capacity(8);

        while let Some(line) = lexer.peek_line() {
            if line.is_blank()
                || fence_of(line).is_some()
                || heading_level(line).is_some()
                || is_thematic_break(line)
            {
                break;
            }
            body_lines.push(*line);
            lexer.next_line();
        }

        let mut lines = Vec::with_capacity(body_lines.len() + 2);
        lines.push(header_line.text);
        lines.push(delimiter_line.text);
        lines.extend(body_lines.iter().map(|l| l.text));

        observer.table_block(&TableBlock {
            lines,
            start_line: header_line.number,
            header: 0,
            delimiter: 1,
            body: (2..body_lines.len() + 2).collect(),
        });

        let columns = alignments.len();
        let header = build_row(&header_line, columns);
        let body: Vec<TableRow<'a>> = body_lines
            .iter()
            .map(|line| build_row(line, columns))
            .collect();

        let end = body_lines.last().unwrap_or(&delimiter_line).span;
        debug!(
            line = header_line.number + 1,
            columns,
            rows = body.len(),
            "parsed table"
        );

        Some(Block::Table(Table {
            header,
            alignments,
            body,
            span: header_line.span.merge(end),
        }))
    }
}

/// Build a row with exactly `columns` cells: extra cells are dropped, missing
/// ones are filled with empty cells at the end of the line.
fn build_row<'a>(line: &Line<'a>, columns: usize) -> TableRow<'a> {
    let base = line.span.start;
    let mut cells: Vec<TableCell<'a>> = split_row(line.text)
        .into_iter()
        .take(columns)
        .map(|(offset, raw)| {
            let start = base + offset as u32;
            TableCell::new(raw.trim(), Span::new(start, start + raw.len() as u32))
        })
        .collect();

    while cells.len() < columns {
        cells.push(TableCell::new("", Span::new(line.span.end, line.span.end)));
    }

    TableRow {
        cells,
        span: line.span,
    }
}

/// Split a table line into raw cell segments, dropping the outer border
/// pipes. Offsets are byte positions within `text`.
pub(crate) fn split_row(text: &str) -> Vec<(usize, &str)> {
    let (offset, inner) = strip_leading_border(text);
    let mut inner = inner.trim_end();

    if inner.ends_with('|') && !inner.ends_with("\\|") {
        inner = &inner[..inner.len() - 1];
    }

    split_segments(inner)
        .into_iter()
        .map(|(at, seg)| (offset + at, seg))
        .collect()
}

/// Drop leading whitespace and the opening border pipe, if any. Returns the
/// byte offset of the remainder within `text`.
pub(crate) fn strip_leading_border(text: &str) -> (usize, &str) {
    let rest = text.trim_start();
    let offset = text.len() - rest.len();
    match rest.strip_prefix('|') {
        Some(inner) => (offset + 1, inner),
        None => (offset, rest),
    }
}

/// Split on every `|` that is neither backslash-escaped nor inside a code
/// span. No trimming, no border handling: `"a||b|"` gives four segments.
pub(crate) fn split_segments(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut segments = Vec::with_capacity(8);
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                i = match find_backtick_run(bytes, i + run, run) {
                    Some(close) => close + run,
                    None => i + run,
                };
            }
            b'|' => {
                segments.push((start, &text[start..i]));
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    segments.push((start, &text[start.min(text.len())..]));

    segments
}

fn find_backtick_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

fn parse_delimiter_row(text: &str) -> Option<Vec<ColumnAlign>> {
    let cells = split_row(text);
    let mut alignments = Vec::with_capacity(cells.len());

    for (_, raw) in cells {
        let cell = raw.trim();
        let dashes = cell.trim_start_matches(':').trim_end_matches(':');
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        alignments.push(match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => ColumnAlign::Center,
            (true, false) => ColumnAlign::Left,
            (false, true) => ColumnAlign::Right,
            (false, false) => ColumnAlign::None,
        });
    }

    Some(alignments)
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

fn fence_of(line: &Line<'_>) -> Option<Fence> {
    if line.indent() >= 4 {
        return None;
    }
    let trimmed = line.trimmed();
    let marker = *trimmed.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = trimmed.bytes().take_while(|&b| b == marker).count();
    if len < 3 || (marker == b'`' && trimmed[len..].contains('`')) {
        return None;
    }
    Some(Fence { marker, len })
}

fn closes_fence(line: &Line<'_>, open: Fence) -> bool {
    let trimmed = line.trimmed();
    let len = trimmed.bytes().take_while(|&b| b == open.marker).count();
    len >= open.len && len == trimmed.len()
}

fn heading_level(line: &Line<'_>) -> Option<u8> {
    if line.indent() >= 4 {
        return None;
    }
    let trimmed = line.trimmed();
    let level = trimmed.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match trimmed.as_bytes().get(level) {
        None | Some(b' ') | Some(b'\t') => Some(level as u8),
        _ => None,
    }
}

fn is_thematic_break(line: &Line<'_>) -> bool {
    if line.indent() >= 4 {
        return false;
    }
    let trimmed = line.trimmed();
    let Some(&marker) = trimmed.as_bytes().first() else {
        return false;
    };
    if !matches!(marker, b'-' | b'*' | b'_') {
        return false;
    }
    let mut count = 0;
    for b in trimmed.bytes() {
        match b {
            b' ' | b'\t' => {}
            b if b == marker => count += 1,
            _ => return false,
        }
    }
    count >= 3
}
