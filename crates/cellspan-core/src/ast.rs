//! Document tree produced by the block parser and rewritten by the span
//! resolver.
//!
//! The tree is deliberately shallow: only tables carry structure, every other
//! block keeps its text as written. Text borrows from the input through
//! [`CowStr`] wherever possible.

use crate::span::Span;

/// Borrowed or owned string used throughout the tree.
pub type CowStr<'a> = std::borrow::Cow<'a, str>;

/// A parsed document: its blocks in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    pub blocks: Vec<Block<'a>>,
    pub span: Span,
}

impl<'a> Document<'a> {
    /// Iterate over the document's tables in source order.
    pub fn tables(&self) -> impl Iterator<Item = &Table<'a>> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Mutable variant of [`Document::tables`], same order.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table<'a>> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// Block-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    /// ATX heading (`#` through `######`).
    Heading(Heading<'a>),
    /// Consecutive non-blank lines that are nothing else.
    Paragraph(Paragraph<'a>),
    /// Fenced code block; pipes inside it are never tables.
    CodeBlock(CodeBlock<'a>),
    /// Pipe table.
    Table(Table<'a>),
    ThematicBreak(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading<'a> {
    /// Heading level (1-6).
    pub level: u8,
    pub text: CowStr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph<'a> {
    pub text: CowStr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock<'a> {
    /// Info string after the opening fence (may be empty).
    pub lang: CowStr<'a>,
    pub content: CowStr<'a>,
    pub span: Span,
}

/// Horizontal alignment of a column, from the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlign {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Vertical alignment hint attached to a row-span anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl VAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Middle => "middle",
            VAlign::Bottom => "bottom",
        }
    }
}

/// A pipe table: header row, per-column alignment and body rows.
///
/// As built by the parser, every row holds exactly `columns()` cells. After
/// span resolution body rows may hold fewer: merged cells are removed and the
/// survivors carry `colspan`/`rowspan`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    pub header: TableRow<'a>,
    pub alignments: Vec<ColumnAlign>,
    pub body: Vec<TableRow<'a>>,
    pub span: Span,
}

impl<'a> Table<'a> {
    /// Number of columns, as declared by the delimiter row.
    #[inline]
    pub fn columns(&self) -> usize {
        self.alignments.len()
    }

    /// Columns occupied by each body row, counting colspans in the row and
    /// rowspans reaching down from rows above.
    ///
    /// For a well-formed resolved table every entry equals [`Table::columns`].
    pub fn occupied_columns(&self) -> Vec<usize> {
        let mut carried = vec![0usize; self.body.len()];
        let mut widths = Vec::with_capacity(self.body.len());

        for (r, row) in self.body.iter().enumerate() {
            let mut width = carried[r];
            for cell in &row.cells {
                let colspan = cell.effective_colspan() as usize;
                width += colspan;
                let rowspan = cell.effective_rowspan() as usize;
                for below in carried.iter_mut().skip(r + 1).take(rowspan.saturating_sub(1)) {
                    *below += colspan;
                }
            }
            widths.push(width);
        }

        widths
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    pub cells: Vec<TableCell<'a>>,
    pub span: Span,
}

/// A single table cell.
///
/// `None` for any span attribute means the default (1, 1, middle), which is
/// also how the renderer is expected to read it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell<'a> {
    /// Cell text, trimmed, exactly as written between the separators.
    pub text: CowStr<'a>,
    pub colspan: Option<u32>,
    pub rowspan: Option<u32>,
    pub valign: Option<VAlign>,
    pub span: Span,
}

impl<'a> TableCell<'a> {
    pub fn new(text: impl Into<CowStr<'a>>, span: Span) -> Self {
        Self {
            text: text.into(),
            colspan: None,
            rowspan: None,
            valign: None,
            span,
        }
    }

    #[inline]
    pub fn effective_colspan(&self) -> u32 {
        self.colspan.unwrap_or(1)
    }

    #[inline]
    pub fn effective_rowspan(&self) -> u32 {
        self.rowspan.unwrap_or(1)
    }

    #[inline]
    pub fn effective_valign(&self) -> VAlign {
        self.valign.unwrap_or_default()
    }

    /// True when no span attribute has been set.
    pub fn is_plain(&self) -> bool {
        self.colspan.is_none() && self.rowspan.is_none() && self.valign.is_none()
    }
}
