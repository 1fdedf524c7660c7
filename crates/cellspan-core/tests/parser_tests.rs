//! Integration tests for the block parser and the table-source recorder

use cellspan_core::ast::{Block, ColumnAlign};
use cellspan_core::source::{SourceRecorder, TableBlock, TableObserver};
use cellspan_core::{Parser, SpanContext, Table};

fn only_table<'a>(blocks: &'a [Block<'a>]) -> &'a Table<'a> {
    let tables: Vec<_> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(tables.len(), 1, "expected exactly one table in {:?}", blocks);
    tables[0]
}

fn texts<'a>(table: &'a Table<'a>, row: usize) -> Vec<&'a str> {
    table.body[row].cells.iter().map(|c| c.text.as_ref()).collect()
}

// ============================================================================
// Block Tests
// ============================================================================

#[test]
fn test_parse_heading_levels() {
    let input = "# H1\n## H2\n### H3\n#### H4\n##### H5\n###### H6";
    let doc = Parser::new().parse(input);

    assert_eq!(doc.blocks.len(), 6);
    for (i, block) in doc.blocks.iter().enumerate() {
        if let Block::Heading(h) = block {
            assert_eq!(h.level, (i + 1) as u8);
        } else {
            panic!("Expected heading, got {:?}", block);
        }
    }
}

#[test]
fn test_parse_heading_closing_sequence() {
    let doc = Parser::new().parse("## Title ##\n\n# C#");
    match (&doc.blocks[0], &doc.blocks[1]) {
        (Block::Heading(a), Block::Heading(b)) => {
            assert_eq!(a.text, "Title");
            assert_eq!(b.text, "C#");
        }
        other => panic!("Expected headings, got {:?}", other),
    }
}

#[test]
fn test_seven_hashes_is_paragraph() {
    let doc = Parser::new().parse("####### not a heading");
    assert!(matches!(doc.blocks[0], Block::Paragraph(_)));
}

#[test]
fn test_parse_paragraph_multiline() {
    let doc = Parser::new().parse("first line\nsecond line\n\nnext");
    assert_eq!(doc.blocks.len(), 2);
    if let Block::Paragraph(p) = &doc.blocks[0] {
        assert_eq!(p.text, "first line\nsecond line");
    } else {
        panic!("Expected paragraph");
    }
}

#[test]
fn test_parse_code_block() {
    let input = "```rust\nlet x = 1;\n| a | b |\n|---|---|\n```";
    let doc = Parser::new().parse(input);

    assert_eq!(doc.blocks.len(), 1);
    if let Block::CodeBlock(c) = &doc.blocks[0] {
        assert_eq!(c.lang, "rust");
        assert!(c.content.contains("| a | b |"));
    } else {
        panic!("Expected code block, got {:?}", doc.blocks[0]);
    }
}

#[test]
fn test_tilde_fence_needs_matching_marker() {
    let input = "~~~\n```\nstill code\n~~~\nafter";
    let doc = Parser::new().parse(input);

    assert_eq!(doc.blocks.len(), 2);
    if let Block::CodeBlock(c) = &doc.blocks[0] {
        assert_eq!(c.content, "```\nstill code");
    } else {
        panic!("Expected code block");
    }
}

#[test]
fn test_parse_thematic_break() {
    let doc = Parser::new().parse("---\n\n* * *\n\n___");
    assert_eq!(doc.blocks.len(), 3);
    assert!(doc
        .blocks
        .iter()
        .all(|b| matches!(b, Block::ThematicBreak(_))));
}

#[test]
fn test_parse_unclosed_code_block_runs_to_end() {
    let doc = Parser::new().parse("```\n| a | b |\n|---|---|");
    assert_eq!(doc.blocks.len(), 1);
    assert!(matches!(doc.blocks[0], Block::CodeBlock(_)));
}

// ============================================================================
// Table Tests
// ============================================================================

#[test]
fn test_parse_table_basic() {
    let input = "| Name | Speed |\n| ---- | ----- |\n| Fast | 100ms |\n| Slow | 1s |";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    assert_eq!(table.columns(), 2);
    assert_eq!(table.header.cells[0].text, "Name");
    assert_eq!(table.body.len(), 2);
    assert_eq!(texts(table, 0), ["Fast", "100ms"]);
    assert_eq!(texts(table, 1), ["Slow", "1s"]);
    assert!(table.body.iter().flat_map(|r| &r.cells).all(|c| c.is_plain()));
}

#[test]
fn test_parse_table_alignments() {
    let input = "| a | b | c | d |\n|:--|:-:|--:|---|\n| 1 | 2 | 3 | 4 |";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    assert_eq!(
        table.alignments,
        [
            ColumnAlign::Left,
            ColumnAlign::Center,
            ColumnAlign::Right,
            ColumnAlign::None
        ]
    );
}

#[test]
fn test_parse_table_without_border_pipes() {
    let input = "a | b\n--|--\n1 | 2";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    assert_eq!(table.columns(), 2);
    assert_eq!(texts(table, 0), ["1", "2"]);
}

#[test]
fn test_table_rows_padded_and_truncated_to_header() {
    let input = "| a | b | c |\n|---|---|---|\n| 1 |\n| 1 | 2 | 3 | 4 |";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    assert_eq!(texts(table, 0), ["1", "", ""]);
    assert_eq!(texts(table, 1), ["1", "2", "3"]);
}

#[test]
fn test_adjacent_pipes_give_empty_cells() {
    let input = "| a | b | c |\n|---|---|---|\n| wide || c |\n| x |~~| z |";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    assert_eq!(texts(table, 0), ["wide", "", "c"]);
    assert_eq!(texts(table, 1), ["x", "~~", "z"]);
}

#[test]
fn test_escaped_pipe_and_code_span_stay_in_cell() {
    let input = "| a | b |\n|---|---|\n| x \\| y | `p|q` |";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    assert_eq!(texts(table, 0), ["x \\| y", "`p|q`"]);
}

#[test]
fn test_delimiter_width_mismatch_is_not_a_table() {
    let doc = Parser::new().parse("| a | b |\n|---|\n| 1 | 2 |");
    assert!(doc.tables().next().is_none());
    assert!(matches!(doc.blocks[0], Block::Paragraph(_)));
}

#[test]
fn test_table_ends_at_blank_line() {
    let input = "| a | b |\n|---|---|\n| 1 | 2 |\n\nafter the table";
    let doc = Parser::new().parse(input);

    assert_eq!(doc.blocks.len(), 2);
    assert_eq!(only_table(&doc.blocks).body.len(), 1);
    assert!(matches!(doc.blocks[1], Block::Paragraph(_)));
}

#[test]
fn test_cell_spans_point_into_input() {
    let input = "intro\n\n| a | bee |\n|---|-----|\n| 1 | two |";
    let doc = Parser::new().parse(input);
    let table = only_table(&doc.blocks);

    let cell = &table.body[0].cells[1];
    let raw = cell.span.slice(input).unwrap();
    assert_eq!(raw.trim(), "two");
}

// ============================================================================
// Recorder Tests
// ============================================================================

#[test]
fn test_recorder_sees_tables_in_order() {
    let input = "| a | b |\n|---|---|\n| 1 | 2 |\n\ntext\n\n| c |\n|---|\n| 3 |\n| 4 |";
    let mut context = SpanContext::new();
    let doc = Parser::new().parse_observed(input, &mut context);

    let sources = context.sources();
    assert_eq!(sources.len(), 2);
    assert_eq!(doc.tables().count(), 2);

    assert_eq!(sources[0].index, 0);
    assert_eq!(sources[0].header_line(), "| a | b |");
    assert_eq!(sources[0].body_line(0), Some("| 1 | 2 |"));
    assert_eq!(sources[0].body_line(1), None);
    assert_eq!(sources[0].lines(), ["| a | b |", "|---|---|", "| 1 | 2 |"]);

    assert_eq!(sources[1].index, 1);
    assert_eq!(sources[1].start_line, 6);
    assert_eq!(sources[1].body_rows(), 2);
    assert_eq!(sources[1].body_line(1), Some("| 4 |"));
    assert_eq!(sources[1].body_line_number(1), Some(9));
    assert_eq!(sources[1].text(), "| c |\n|---|\n| 3 |\n| 4 |");
}

#[test]
fn test_recorder_body_rows_match_tree_rows() {
    let input = "| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n| 5 | 6 |";
    let mut context = SpanContext::new();
    let doc = Parser::new().parse_observed(input, &mut context);
    let table = doc.tables().next().unwrap();
    let source = &context.sources()[0];

    assert_eq!(source.body_rows(), table.body.len());
    for (row, tree_row) in table.body.iter().enumerate() {
        let raw = source.body_line(row).unwrap();
        assert!(raw.contains(tree_row.cells[0].text.as_ref()));
    }
}

#[test]
fn test_recorder_ignores_non_tables() {
    let mut context = SpanContext::new();
    Parser::new().parse_observed("# Title\n\n```\n| a |\n|---|\n```\n\nplain", &mut context);
    assert!(context.sources().is_empty());
}

#[test]
fn test_context_reset_between_runs() {
    let mut context = SpanContext::new();
    Parser::new().parse_observed("| a |\n|---|\n| 1 |", &mut context);
    assert_eq!(context.sources().len(), 1);

    context.reset();
    Parser::new().parse_observed("| b |\n|---|\n| 2 |\n\n| c |\n|---|", &mut context);
    assert_eq!(context.sources().len(), 2);
    assert_eq!(context.sources()[0].header_line(), "| b |");
}

#[test]
fn test_custom_observer() {
    struct Counter(usize, Vec<usize>);

    impl<'a> TableObserver<'a> for Counter {
        fn table_block(&mut self, block: &TableBlock<'a>) {
            self.0 += 1;
            self.1.push(block.body.len());
        }
    }

    let mut counter = Counter(0, Vec::new());
    let input = "| a |\n|---|\n| 1 |\n| 2 |\n\n| b |\n|---|";
    Parser::new().parse_observed(input, &mut counter);

    assert_eq!(counter.0, 2);
    assert_eq!(counter.1, [2, 0]);
}

#[test]
fn test_context_recorder_as_observer() {
    let mut context = SpanContext::new();
    Parser::new().parse_observed("| a |\n|---|\n| 1 |", context.recorder_mut());
    assert_eq!(context.sources().len(), 1);
    assert_eq!(context.sources()[0].body_line(0), Some("| 1 |"));
}

#[test]
fn test_source_recorder_standalone() {
    let mut recorder = SourceRecorder::new();
    Parser::new().parse_observed("| a |\n|---|\n| 1 |", &mut recorder);
    assert_eq!(recorder.len(), 1);
    recorder.clear();
    assert!(recorder.is_empty());
}
