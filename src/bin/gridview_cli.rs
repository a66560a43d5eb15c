//! CLI tool for gridview - composes the header of a column-definition file
//!
//! Usage:
//!   gridview_cli <columns.json>                # ASCII header grid
//!   gridview_cli <columns.json> --json         # header layout as JSON
//!   gridview_cli <columns.json> --order a,b,c  # apply a column order first

use std::env;
use std::fs;
use std::process::ExitCode;

use gridview::{compose_header, resolve_columns, ColumnDef, ColumnOrder, HeaderLayout, LeafColumn};
use tracing_subscriber::EnvFilter;

struct Args {
    input: String,
    order: Option<Vec<String>>,
    json: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut input = None;
    let mut order = None;
    let mut json = false;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--order" => {
                let list = args.next().ok_or("--order needs a comma-separated id list")?;
                order = Some(list.split(',').map(|s| s.trim().to_string()).collect());
            }
            _ if input.is_none() => input = Some(arg),
            other => return Err(format!("unexpected argument: {other}")),
        }
    }
    Ok(Args {
        input: input.ok_or("Usage: gridview_cli <columns.json> [--order a,b,c] [--json]")?,
        order,
        json,
    })
}

fn column_widths(leaves: &[LeafColumn]) -> Vec<usize> {
    leaves
        .iter()
        .map(|leaf| leaf.title.chars().count().max(4) + 2)
        .collect()
}

fn span_width(widths: &[usize], start: usize, span: usize) -> usize {
    let sum: usize = widths.iter().skip(start).take(span).sum();
    sum + span.saturating_sub(1)
}

/// Whether leaf `index` is covered by a cell that continues below `level`.
fn continues_below(layout: &HeaderLayout, level: usize, index: usize) -> bool {
    layout.cells.iter().any(|c| {
        c.level <= level
            && c.level + c.row_span > level + 1
            && (c.start_index..c.end_index()).contains(&index)
    })
}

fn border(layout: &HeaderLayout, widths: &[usize], after_level: Option<usize>) -> String {
    let mut line = String::from("+");
    for (i, &w) in widths.iter().enumerate() {
        let fill = match after_level {
            Some(level) if continues_below(layout, level, i) => ' ',
            _ => '-',
        };
        line.extend(std::iter::repeat(fill).take(w));
        line.push('+');
    }
    line
}

fn render_ascii(layout: &HeaderLayout, leaves: &[LeafColumn]) -> String {
    let widths = column_widths(leaves);
    let levels = layout.by_level();
    let mut out = vec![border(layout, &widths, None)];
    for (level, cells) in levels.iter().enumerate() {
        let mut line = String::from("|");
        let mut index = 0;
        while index < widths.len() {
            match cells.iter().find(|c| c.start_index == index) {
                Some(cell) => {
                    let w = span_width(&widths, index, cell.col_span);
                    line.push_str(&format!("{:^w$}", cell.title, w = w));
                    index += cell.col_span.max(1);
                }
                None => {
                    let w = widths.get(index).copied().unwrap_or(0);
                    line.push_str(&" ".repeat(w));
                    index += 1;
                }
            }
            line.push('|');
        }
        out.push(line);
        let last = level + 1 == levels.len();
        out.push(border(layout, &widths, (!last).then_some(level)));
    }
    out.join("\n")
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let text = fs::read_to_string(&args.input)
        .map_err(|e| format!("Error reading {}: {e}", args.input))?;
    let defs: Vec<ColumnDef> =
        serde_json::from_str(&text).map_err(|e| format!("Error parsing columns: {e}"))?;

    let mut leaves = resolve_columns(&defs);
    if let Some(ids) = args.order {
        leaves = ColumnOrder::new(ids).apply(&leaves);
    }
    tracing::debug!(leaves = leaves.len(), "columns resolved");
    let layout = compose_header(&leaves);

    if args.json {
        let json = serde_json::to_string_pretty(&layout)
            .map_err(|e| format!("Error serializing JSON: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", render_ascii(&layout, &leaves));
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
