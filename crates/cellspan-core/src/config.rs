//! Resolver configuration and the patterns derived from it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::VAlign;
use crate::error::{SpanError, SpanResult};

/// Token that stands for an empty cell inside a column merge (`|~~|`).
pub const DEFAULT_EMPTY_CELL: &str = "~~";

/// Anchored row-span marker: `_`, then only `_`, `^`, `=` or spaces, then `_`.
static ROW_SPAN_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_[_^= ]*_$").unwrap());

/// Options for the span resolver.
///
/// The only knob is the empty-cell token. Changing it changes which input
/// counts as an empty marker in a column merge and which cells count as blank
/// when scanning upward from a row-span marker; nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanConfig {
    empty_cell: String,
}

impl Default for SpanConfig {
    fn default() -> Self {
        Self {
            empty_cell: DEFAULT_EMPTY_CELL.to_string(),
        }
    }
}

impl SpanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` as the empty-cell sentinel instead of `~~`.
    pub fn with_empty_cell(mut self, token: impl Into<String>) -> Self {
        self.empty_cell = token.into();
        self
    }

    pub fn empty_cell(&self) -> &str {
        &self.empty_cell
    }

    /// Compile the configuration into the patterns the resolver runs.
    ///
    /// The token is matched literally. It must be non-empty and must not
    /// contain `|`, which would make it indistinguishable from a separator.
    pub fn compile(&self) -> SpanResult<Matchers> {
        let token = self.empty_cell.as_str();
        if token.trim().is_empty() {
            return Err(SpanError::Config(
                "empty-cell token must contain a visible character".to_string(),
            ));
        }
        if token.contains('|') {
            return Err(SpanError::Config(format!(
                "empty-cell token {token:?} must not contain '|'"
            )));
        }

        let escaped = regex::escape(token);
        let adjacent = Regex::new(&format!(r"\|(?:{escaped})?\|"))
            .map_err(|e| SpanError::Config(e.to_string()))?;
        let blank = Regex::new(&format!(r"^\s*(?:{escaped})?\s*$"))
            .map_err(|e| SpanError::Config(e.to_string()))?;

        Ok(Matchers {
            empty_cell: token.to_string(),
            adjacent,
            blank,
        })
    }
}

/// Compiled patterns for one resolver run.
#[derive(Debug, Clone)]
pub struct Matchers {
    empty_cell: String,
    adjacent: Regex,
    blank: Regex,
}

impl Matchers {
    /// Quick test: does a raw row contain two separators with nothing (or
    /// only the empty-cell token) between them?
    #[inline]
    pub fn has_adjacent_separators(&self, raw_row: &str) -> bool {
        self.adjacent.is_match(raw_row)
    }

    /// A raw segment that marks "merge me into the cell on the left".
    #[inline]
    pub fn is_empty_marker(&self, segment: &str) -> bool {
        segment.is_empty() || segment == self.empty_cell
    }

    /// Whitespace only, optionally with the empty-cell token.
    #[inline]
    pub fn is_blank(&self, text: &str) -> bool {
        self.blank.is_match(text)
    }

    #[inline]
    pub fn is_row_span_marker(&self, text: &str) -> bool {
        ROW_SPAN_MARKER.is_match(text)
    }
}

/// Alignment requested by a row-span marker, or `None` if it asks for both
/// top and bottom.
pub fn marker_alignment(marker: &str) -> Option<VAlign> {
    match (marker.contains('^'), marker.contains('=')) {
        (true, true) => None,
        (true, false) => Some(VAlign::Top),
        (false, true) => Some(VAlign::Bottom),
        (false, false) => Some(VAlign::Middle),
    }
}
