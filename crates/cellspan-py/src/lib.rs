//! Python bindings for the cellspan table pass.

use cellspan_core::{
    ast::ColumnAlign, config::DEFAULT_EMPTY_CELL, process_with_report, span::Span as CoreSpan,
    Document, ResolveReport, SpanConfig, SpanError, Table, TableCell, TableRow,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

// ============================================================================
// Span
// ============================================================================

/// Source location in the input text (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

// ============================================================================
// Table nodes
// ============================================================================

/// Table cell with its resolved spans.
///
/// `colspan` and `rowspan` are None for a cell covering a single slot.
/// `valign` is one of "top", "middle" or "bottom" on row-span anchors.
#[pyclass(frozen, get_all, name = "Cell")]
#[derive(Clone)]
pub struct PyCell {
    pub text: String,
    pub colspan: Option<u32>,
    pub rowspan: Option<u32>,
    pub valign: Option<&'static str>,
    pub span: PySpan,
}

#[pymethods]
impl PyCell {
    fn __repr__(&self) -> String {
        let mut attrs = String::new();
        if let Some(n) = self.colspan {
            attrs.push_str(&format!(", colspan={}", n));
        }
        if let Some(n) = self.rowspan {
            attrs.push_str(&format!(", rowspan={}", n));
        }
        if let Some(v) = self.valign {
            attrs.push_str(&format!(", valign={:?}", v));
        }
        format!("Cell({:?}{})", self.text, attrs)
    }
}

/// Table row.
#[pyclass(frozen, get_all, name = "Row")]
#[derive(Clone)]
pub struct PyRow {
    pub cells: Vec<PyCell>,
    pub span: PySpan,
}

#[pymethods]
impl PyRow {
    fn __len__(&self) -> usize {
        self.cells.len()
    }

    fn __repr__(&self) -> String {
        format!("Row(cells={})", self.cells.len())
    }
}

/// Pipe table after span resolution.
#[pyclass(frozen, get_all, name = "Table")]
#[derive(Clone)]
pub struct PyTable {
    pub columns: usize,
    pub alignments: Vec<&'static str>,
    pub header: PyRow,
    pub rows: Vec<PyRow>,
    pub span: PySpan,
}

#[pymethods]
impl PyTable {
    fn __repr__(&self) -> String {
        format!("Table(columns={}, rows={})", self.columns, self.rows.len())
    }
}

fn convert_cell(cell: &TableCell) -> PyCell {
    PyCell {
        text: cell.text.to_string(),
        colspan: cell.colspan,
        rowspan: cell.rowspan,
        valign: cell.valign.map(|v| v.as_str()),
        span: cell.span.into(),
    }
}

fn convert_row(row: &TableRow) -> PyRow {
    PyRow {
        cells: row.cells.iter().map(convert_cell).collect(),
        span: row.span.into(),
    }
}

fn convert_table(table: &Table) -> PyTable {
    PyTable {
        columns: table.columns(),
        alignments: table
            .alignments
            .iter()
            .map(|a| match a {
                ColumnAlign::None => "none",
                ColumnAlign::Left => "left",
                ColumnAlign::Center => "center",
                ColumnAlign::Right => "right",
            })
            .collect(),
        header: convert_row(&table.header),
        rows: table.body.iter().map(convert_row).collect(),
        span: table.span.into(),
    }
}

// ============================================================================
// Document
// ============================================================================

/// What the resolver changed.
#[pyclass(frozen, get_all, name = "Report")]
#[derive(Clone)]
pub struct PyReport {
    pub tables: usize,
    pub colspans: usize,
    pub rowspans: usize,
    pub removed: usize,
}

#[pymethods]
impl PyReport {
    fn __repr__(&self) -> String {
        format!(
            "Report(tables={}, colspans={}, rowspans={}, removed={})",
            self.tables, self.colspans, self.rowspans, self.removed
        )
    }
}

impl From<ResolveReport> for PyReport {
    fn from(r: ResolveReport) -> Self {
        PyReport {
            tables: r.tables,
            colspans: r.colspans,
            rowspans: r.rowspans,
            removed: r.removed,
        }
    }
}

/// A processed document: its tables and the resolver report.
#[pyclass(frozen, get_all, name = "Document")]
pub struct PyDocument {
    pub tables: Vec<PyTable>,
    pub blocks: usize,
    pub report: PyReport,
    pub span: PySpan,
}

#[pymethods]
impl PyDocument {
    fn __repr__(&self) -> String {
        format!(
            "Document(blocks={}, tables={})",
            self.blocks,
            self.tables.len()
        )
    }

    fn __len__(&self) -> usize {
        self.tables.len()
    }
}

fn convert_document(doc: &Document, report: ResolveReport) -> PyDocument {
    PyDocument {
        tables: doc.tables().map(convert_table).collect(),
        blocks: doc.blocks.len(),
        report: report.into(),
        span: doc.span.into(),
    }
}

fn to_py_err(e: SpanError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ============================================================================
// Module functions
// ============================================================================

/// Parse a Markdown string and resolve the spans of every table in it.
///
/// Args:
///     input: Markdown text
///     empty_cell: Token marking an empty cell in a column merge (default: "~~")
///
/// Returns:
///     Document: Tables with colspan, rowspan and valign filled in
///
/// Raises:
///     ValueError: A row merges past its end, a row-span marker asks for
///         both top and bottom alignment, or `empty_cell` is unusable
#[pyfunction]
#[pyo3(signature = (input, empty_cell=DEFAULT_EMPTY_CELL))]
fn process(py: Python<'_>, input: &str, empty_cell: &str) -> PyResult<PyDocument> {
    let config = SpanConfig::new().with_empty_cell(empty_cell);
    py.allow_threads(|| {
        process_with_report(input, &config).map(|(doc, report)| convert_document(&doc, report))
    })
    .map_err(to_py_err)
}

// ============================================================================
// Module
// ============================================================================

/// cellspan - column and row spans for Markdown pipe tables.
#[pymodule]
fn pycellspan(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyCell>()?;
    m.add_class::<PyRow>()?;
    m.add_class::<PyTable>()?;
    m.add_class::<PyReport>()?;
    m.add_class::<PyDocument>()?;
    m.add("DEFAULT_EMPTY_CELL", DEFAULT_EMPTY_CELL)?;
    m.add_function(wrap_pyfunction!(process, m)?)?;
    Ok(())
}
