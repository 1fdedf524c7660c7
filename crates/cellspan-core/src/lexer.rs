//! Line lexer feeding the block parser.
//!
//! Splits input into lines with `memchr` newline scanning. Lines borrow from
//! the input and carry both a byte span and a zero-based line number, so the
//! table recorder can keep raw rows without copying.

use crate::span::Span;
use memchr::memchr;

/// A single source line, without its line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    pub span: Span,
    /// Zero-based line number in the input.
    pub number: usize,
}

impl<'a> Line<'a> {
    /// Check if this line contains only spaces or tabs.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Leading indentation in columns (tabs count as four).
    #[inline]
    pub fn indent(&self) -> usize {
        self.text
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .map(|b| if b == b'\t' { 4 } else { 1 })
            .sum()
    }

    /// Check if the line contains an unescaped `|`.
    pub fn has_pipe(&self) -> bool {
        let bytes = self.text.as_bytes();
        let mut from = 0;
        while let Some(pos) = memchr(b'|', &bytes[from..]) {
            let at = from + pos;
            if at == 0 || bytes[at - 1] != b'\\' {
                return true;
            }
            from = at + 1;
        }
        false
    }
}

/// Peek/consume access to the lines of an input string.
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line_number: usize,
    peeked: Option<Line<'a>>,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line_number: 0,
            peeked: None,
        }
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.peeked.is_none() && self.offset >= self.input.len()
    }

    /// Peek at the next line without consuming it.
    #[inline]
    pub fn peek_line(&mut self) -> Option<&Line<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line();
        }
        self.peeked.as_ref()
    }

    /// The `n`-th upcoming line (0 is the next one), without consuming anything.
    pub fn peek_ahead(&mut self, n: usize) -> Option<Line<'a>> {
        let saved = (self.offset, self.line_number, self.peeked);
        let mut found = None;
        for _ in 0..=n {
            found = self.next_line();
            if found.is_none() {
                break;
            }
        }
        (self.offset, self.line_number, self.peeked) = saved;
        found
    }

    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if let Some(line) = self.peeked.take() {
            return Some(line);
        }
        self.read_line()
    }

    /// Skip blank lines and return the count skipped.
    pub fn skip_blank_lines(&mut self) -> usize {
        let mut count = 0;
        while let Some(line) = self.peek_line() {
            if !line.is_blank() {
                break;
            }
            self.next_line();
            count += 1;
        }
        count
    }

    fn read_line(&mut self) -> Option<Line<'a>> {
        let bytes = self.input.as_bytes();
        if self.offset >= bytes.len() {
            return None;
        }

        let start = self.offset;
        let end = match memchr(b'\n', &bytes[start..]) {
            Some(pos) => start + pos,
            None => bytes.len(),
        };

        // CRLF
        let text_end = if end > start && bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        self.offset = if end < bytes.len() { end + 1 } else { end };
        let number = self.line_number;
        self.line_number += 1;

        Some(Line {
            // Newline and CR are single-byte ASCII, so both ends sit on char boundaries.
            text: &self.input[start..text_end],
            span: Span::new(start as u32, text_end as u32),
            number,
        })
    }
}
