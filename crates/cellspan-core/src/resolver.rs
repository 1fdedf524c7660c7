//! Span resolution: turns merge markers into colspan/rowspan attributes.
//!
//! Each table is walked together with its recorded [`TableSource`], body row
//! by body row, top to bottom. For every row:
//!
//! 1. **Column merges** come from the raw line. An empty segment between two
//!    separators (`||`), or a segment that is exactly the empty-cell token
//!    (`|~~|`), widens the nearest non-empty cell to its left by one column
//!    and queues the empty cell for removal.
//! 2. **Row merges** come from the tree. A cell whose whole text is a
//!    row-span marker (`_ _`, `_^_`, `_=_`) merges upward into the first
//!    non-blank cell of its column, which receives the rowspan and the
//!    alignment the marker asks for.
//!
//! Removals are only applied once the whole table has been scanned, so
//! every lookup during detection sees the tree exactly as the parser built
//! it. Running the resolver twice over the same tree is not supported.

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::ast::{Document, Table, TableRow};
use crate::config::{marker_alignment, Matchers, SpanConfig};
use crate::error::{SpanError, SpanResult};
use crate::parser::{split_segments, strip_leading_border};
use crate::source::{SpanContext, TableSource};

/// What a resolver pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub tables: usize,
    /// Columns added to surviving cells by column merges.
    pub colspans: usize,
    /// Row-span anchors written (an anchor extended twice counts twice).
    pub rowspans: usize,
    pub removed: usize,
}

impl ResolveReport {
    fn absorb(&mut self, other: ResolveReport) {
        self.tables += other.tables;
        self.colspans += other.colspans;
        self.rowspans += other.rowspans;
        self.removed += other.removed;
    }

    /// True when the pass left every table as it was.
    pub fn is_noop(&self) -> bool {
        self.colspans == 0 && self.rowspans == 0 && self.removed == 0
    }
}

/// Cells to delete once detection for a table is done, addressed by their
/// `(row, column)` position in the unmutated tree.
#[derive(Debug, Default)]
struct PendingRemovals {
    cells: BTreeSet<(usize, usize)>,
}

impl PendingRemovals {
    fn queue(&mut self, row: usize, column: usize) {
        self.cells.insert((row, column));
    }

    fn contains(&self, row: usize, column: usize) -> bool {
        self.cells.contains(&(row, column))
    }

    /// Remove every queued cell. Positions are visited in descending order so
    /// removing one never shifts another that is still pending.
    fn apply(self, rows: &mut [TableRow<'_>]) -> usize {
        let mut removed = 0;
        for &(row, column) in self.cells.iter().rev() {
            if let Some(cells) = rows.get_mut(row).map(|r| &mut r.cells) {
                if column < cells.len() {
                    cells.remove(column);
                    removed += 1;
                }
            }
        }
        removed
    }
}

/// Applies column and row spans to parsed tables.
#[derive(Debug, Clone)]
pub struct SpanResolver {
    matchers: Matchers,
}

impl SpanResolver {
    pub fn new(config: &SpanConfig) -> SpanResult<Self> {
        Ok(Self {
            matchers: config.compile()?,
        })
    }

    /// Resolve every table of `document`, pairing the n-th table with the
    /// n-th source recorded in `context`.
    ///
    /// The first error aborts the pass; tables already processed keep their
    /// changes.
    pub fn resolve(
        &self,
        context: &SpanContext<'_>,
        document: &mut Document<'_>,
    ) -> SpanResult<ResolveReport> {
        let sources = context.sources();
        let mut report = ResolveReport::default();
        let mut seen = 0;

        for (index, table) in document.tables_mut().enumerate() {
            let source = sources
                .get(index)
                .ok_or(SpanError::MissingSource { table: index })?;
            report.absorb(self.resolve_table(source, table)?);
            seen += 1;
        }

        if seen < sources.len() {
            warn!(
                recorded = sources.len(),
                tables = seen,
                "recorded table sources without a matching table"
            );
        }

        debug!(
            tables = report.tables,
            colspans = report.colspans,
            rowspans = report.rowspans,
            removed = report.removed,
            "resolved spans"
        );
        Ok(report)
    }

    /// Resolve one table against its source.
    pub fn resolve_table(
        &self,
        source: &TableSource<'_>,
        table: &mut Table<'_>,
    ) -> SpanResult<ResolveReport> {
        let index = source.index;
        let mut removals = PendingRemovals::default();
        let mut report = ResolveReport {
            tables: 1,
            ..ResolveReport::default()
        };

        for row in 0..table.body.len() {
            if let Some(raw) = source.body_line(row) {
                if self.matchers.has_adjacent_separators(raw) {
                    report.colspans +=
                        self.merge_columns(index, row, raw, &mut table.body[row], &mut removals)?;
                }
            }

            for column in 0..table.body[row].cells.len() {
                if self
                    .matchers
                    .is_row_span_marker(&table.body[row].cells[column].text)
                    && self.merge_rows(index, &mut table.body, row, column, &mut removals)?
                {
                    report.rowspans += 1;
                }
            }
        }

        report.removed = removals.apply(&mut table.body);
        trace!(table = index, removed = report.removed, "applied removals");
        Ok(report)
    }

    /// Apply the column merges of one row. Returns the number of columns
    /// added to surviving cells.
    fn merge_columns(
        &self,
        table: usize,
        row: usize,
        raw: &str,
        tree_row: &mut TableRow<'_>,
        removals: &mut PendingRemovals,
    ) -> SpanResult<usize> {
        let cells = &mut tree_row.cells;
        let (_, text) = strip_leading_border(raw);

        let mut last_filled: Option<usize> = None;
        let mut merged = 0;

        for (i, (_, segment)) in split_segments(text).into_iter().enumerate() {
            if !self.matchers.is_empty_marker(segment) {
                last_filled = Some(i);
                continue;
            }

            let target = match last_filled {
                Some(target) if target < cells.len() => target,
                _ => {
                    return Err(SpanError::StructuralMismatch {
                        table,
                        row,
                        cells: cell_texts(tree_row),
                    })
                }
            };

            // Past the last cell: the closing pipe of the row, not a merge.
            if i >= cells.len() {
                continue;
            }

            let cell = &mut cells[target];
            cell.colspan = Some(cell.effective_colspan() + 1);
            removals.queue(row, i);
            merged += 1;
            trace!(table, row, column = target, colspan = ?cell.colspan, "column merge");
        }

        Ok(merged)
    }

    /// Merge the marker at `(row, column)` upward. Returns whether an anchor
    /// was written.
    fn merge_rows(
        &self,
        table: usize,
        rows: &mut [TableRow<'_>],
        row: usize,
        column: usize,
        removals: &mut PendingRemovals,
    ) -> SpanResult<bool> {
        let valign = marker_alignment(&rows[row].cells[column].text)
            .ok_or(SpanError::InvalidAlignmentMarker { table, row, column })?;

        if row == 0 {
            warn!(
                table,
                column, "row-span marker on the first body row has nothing to merge into"
            );
            return Ok(false);
        }

        // Cells already merged away (earlier markers in this column, or
        // column merges) are part of the region, not its anchor.
        let anchor = (0..row)
            .rev()
            .find(|&above| {
                let blank = rows[above]
                    .cells
                    .get(column)
                    .map_or(true, |cell| self.matchers.is_blank(&cell.text));
                !blank && !removals.contains(above, column)
            })
            .unwrap_or(0);

        let rowspan = (row - anchor + 1) as u32;
        let cell = match rows[anchor].cells.get_mut(column) {
            Some(cell) => cell,
            None => {
                return Err(SpanError::StructuralMismatch {
                    table,
                    row: anchor,
                    cells: cell_texts(&rows[anchor]),
                })
            }
        };
        cell.rowspan = Some(rowspan);
        cell.valign = Some(valign);

        for merged in anchor + 1..=row {
            removals.queue(merged, column);
        }

        debug!(
            table,
            anchor_row = anchor,
            column,
            rowspan,
            valign = valign.as_str(),
            "row merge"
        );
        Ok(true)
    }
}

fn cell_texts(row: &TableRow<'_>) -> Vec<String> {
    row.cells.iter().map(|c| c.text.to_string()).collect()
}
