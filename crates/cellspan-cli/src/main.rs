//! cellspan CLI - resolve cell and row spans in Markdown tables
//!
//! Usage:
//!   cellspan [OPTIONS] [COMMAND] <FILE>
//!
//! Commands:
//!   parse     Show every table with its spans (default)
//!   check     Only report whether the spans resolve
//!   stats     Show table and merge statistics

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use cellspan_core::ast::ColumnAlign;
use cellspan_core::{
    config::DEFAULT_EMPTY_CELL, process_with_report, Document, ResolveReport, SpanConfig, Table,
    TableCell, TableRow,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "cellspan",
    version,
    about = "Resolve column and row spans in Markdown pipe tables",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every table with its spans.
    Parse(InputArgs),
    /// Check that the document's spans resolve, without output.
    Check(InputArgs),
    /// Show table and merge statistics.
    Stats(InputArgs),
}

#[derive(Debug, Clone, Args)]
struct InputArgs {
    /// Markdown file to read, or `-` for stdin.
    file: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(short, long)]
    json: bool,

    /// Show every cell with its attributes.
    #[arg(short, long)]
    verbose: bool,

    /// Token that marks an empty cell inside a column merge.
    #[arg(long, value_name = "TOKEN", default_value = DEFAULT_EMPTY_CELL)]
    empty_cell: String,
}

impl InputArgs {
    fn config(&self) -> SpanConfig {
        SpanConfig::new().with_empty_cell(self.empty_cell.clone())
    }

    fn read(&self) -> Result<(String, String)> {
        let file = self
            .file
            .as_ref()
            .context("no input file specified (use `-` for stdin)")?;

        if file.as_os_str() == "-" {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            return Ok(("<stdin>".to_string(), input));
        }

        let input = fs::read_to_string(file)
            .with_context(|| format!("failed to read '{}'", file.display()))?;
        Ok((file.display().to_string(), input))
    }
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cellspan_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Parse(args)) => cmd_parse(&args),
        Some(Command::Check(args)) => cmd_check(&args),
        Some(Command::Stats(args)) => cmd_stats(&args),
        None => cmd_parse(&cli.input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn resolve<'a>(
    name: &str,
    input: &'a str,
    args: &InputArgs,
) -> Result<(Document<'a>, ResolveReport)> {
    let result = process_with_report(input, &args.config())
        .with_context(|| format!("failed to resolve table spans in '{name}'"));
    if let Ok((_, report)) = &result {
        info!(
            file = name,
            tables = report.tables,
            removed = report.removed,
            "resolved"
        );
    }
    result
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(args: &InputArgs) -> Result<()> {
    let (name, input) = args.read()?;
    let (document, _) = resolve(&name, &input, args)?;

    if args.json {
        let tables: Vec<JsonTable> = document.tables().map(convert_table).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonDocument { tables })
                .context("failed to serialize tables")?
        );
        return Ok(());
    }

    let count = document.tables().count();
    println!("Tables: {}", count);
    for (i, table) in document.tables().enumerate() {
        println!();
        println!("[{}] {}", i + 1, describe_table(table));
        if args.verbose {
            print_table_verbose(table);
        } else {
            print_table_summary(table);
        }
    }

    Ok(())
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(args: &InputArgs) -> Result<()> {
    let (name, input) = args.read()?;

    match process_with_report(&input, &args.config()) {
        Ok((_, report)) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({"valid": true, "tables": report.tables})
                );
            } else {
                println!("ok: {} table(s) in {}", report.tables, name);
            }
            Ok(())
        }
        Err(error) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "table": error.table().map(|t| t + 1),
                        "error": error.to_string(),
                    })
                );
            }
            Err(error).with_context(|| format!("'{name}' has invalid table spans"))
        }
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(args: &InputArgs) -> Result<()> {
    let (name, input) = args.read()?;
    let (document, report) = resolve(&name, &input, args)?;
    let stats = TableStats::from_document(&document);

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "tables": report.tables,
                "body_rows": stats.body_rows,
                "cells": stats.cells,
                "colspans": report.colspans,
                "rowspans": report.rowspans,
                "removed": report.removed,
                "widest": stats.widest,
            })
        );
        return Ok(());
    }

    println!("Table Statistics");
    println!("----------------");
    println!("Tables:          {}", report.tables);
    println!("Body rows:       {}", stats.body_rows);
    println!("Cells kept:      {}", stats.cells);
    println!("Widest table:    {} columns", stats.widest);
    println!();
    println!("Merges:");
    println!("  Columns added: {}", report.colspans);
    println!("  Row spans:     {}", report.rowspans);
    println!("  Cells removed: {}", report.removed);

    Ok(())
}

#[derive(Default)]
struct TableStats {
    body_rows: usize,
    cells: usize,
    widest: usize,
}

impl TableStats {
    fn from_document(doc: &Document) -> Self {
        doc.tables().fold(Self::default(), |mut stats, table| {
            stats.body_rows += table.body.len();
            stats.cells += table.body.iter().map(|r| r.cells.len()).sum::<usize>();
            stats.widest = stats.widest.max(table.columns());
            stats
        })
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    tables: Vec<JsonTable<'a>>,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    columns: usize,
    alignments: Vec<&'static str>,
    header: Vec<JsonCell<'a>>,
    rows: Vec<Vec<JsonCell<'a>>>,
}

#[derive(Serialize)]
struct JsonCell<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    colspan: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rowspan: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valign: Option<&'static str>,
}

fn convert_table<'a>(table: &'a Table) -> JsonTable<'a> {
    JsonTable {
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
    }
}

fn convert_row<'a>(row: &'a TableRow) -> Vec<JsonCell<'a>> {
    row.cells
        .iter()
        .map(|cell| JsonCell {
            text: &cell.text,
            colspan: cell.colspan,
            rowspan: cell.rowspan,
            valign: cell.valign.map(|v| v.as_str()),
        })
        .collect()
}

// =============================================================================
// Text Output
// =============================================================================

fn describe_table(table: &Table) -> String {
    let merged = table
        .body
        .iter()
        .flat_map(|r| &r.cells)
        .filter(|c| !c.is_plain())
        .count();
    format!(
        "Table ({} columns, {} rows, {} merged cells)",
        table.columns(),
        table.body.len(),
        merged
    )
}

fn print_table_summary(table: &Table) {
    println!("  Header: {}", format_row(&table.header));
    for (i, row) in table.body.iter().enumerate() {
        println!("  Row {}: {}", i + 1, format_row(row));
    }
}

fn print_table_verbose(table: &Table) {
    println!("  Span: {}..{}", table.span.start, table.span.end);
    println!("  Alignments: {:?}", table.alignments);
    for (i, row) in table.body.iter().enumerate() {
        println!("  Row {}:", i + 1);
        for (j, cell) in row.cells.iter().enumerate() {
            println!(
                "    Cell {}: {:?} colspan={} rowspan={} valign={}",
                j + 1,
                cell.text,
                cell.effective_colspan(),
                cell.effective_rowspan(),
                cell.effective_valign().as_str()
            );
        }
    }
}

fn format_row(row: &TableRow) -> String {
    let cells: Vec<String> = row.cells.iter().map(format_cell).collect();
    cells.join(" | ")
}

fn format_cell(cell: &TableCell) -> String {
    let mut out = cell.text.to_string();
    let mut attrs = Vec::new();
    if let Some(n) = cell.colspan {
        attrs.push(format!("colspan={}", n));
    }
    if let Some(n) = cell.rowspan {
        attrs.push(format!("rowspan={}", n));
    }
    if let Some(v) = cell.valign {
        attrs.push(format!("valign={}", v.as_str()));
    }
    if !attrs.is_empty() {
        out.push_str(&format!(" [{}]", attrs.join(" ")));
    }
    out
}
