use comfy_table::{Cell, Table};
use serde_json::Value;
use tracing::warn;

use super::{SortAs, TableArgs, ViewArgs};
use crate::error::Result;
use crate::loader::{load_records, parse_filter};
use crate::record::{date_key, display_value, lookup_path, number_key, text_key, Record};
use crate::settings::load_settings;
use crate::table::{infer_columns, ColumnSpec, DataTable, SortDirection, SortState};
use crate::tui::header_label;

/// Terminal cell text: nested arrays and objects print as compact JSON
/// instead of their search form.
fn render_cell(record: &Record, accessor: &str) -> String {
    match lookup_path(record, accessor) {
        Some(v @ (Value::Array(_) | Value::Object(_))) => v.to_string(),
        Some(v) => display_value(v),
        None => String::new(),
    }
}

/// Columns named on the command line, or one per field found in `records`.
pub(crate) fn build_columns(records: &[Record], view: &ViewArgs) -> Vec<ColumnSpec> {
    let names: Vec<&str> = view
        .columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    let columns = if names.is_empty() {
        infer_columns(records)
    } else {
        names.into_iter().map(|c| ColumnSpec::new(c, c)).collect()
    };
    columns
        .into_iter()
        .map(|col| {
            let accessor = col.accessor.clone();
            col.with_render(move |r| render_cell(r, &accessor))
        })
        .collect()
}

/// Install a typed `sort_by` on the column keyed `key`.
fn with_sort_as(columns: Vec<ColumnSpec>, key: &str, sort_as: SortAs) -> Vec<ColumnSpec> {
    if !columns.iter().any(|c| c.accessor == key) {
        warn!("--sort-as ignored: '{key}' is not a displayed column");
        return columns;
    }
    columns
        .into_iter()
        .map(|col| {
            if col.accessor != key {
                return col;
            }
            let field = key.to_string();
            match sort_as {
                SortAs::Text => col.with_sort_by(move |r| text_key(r, &field)),
                SortAs::Number => col.with_sort_by(move |r| number_key(r, &field)),
                SortAs::Date => col.with_sort_by(move |r| date_key(r, &field)),
            }
        })
        .collect()
}

pub(crate) fn page_size(view: &ViewArgs) -> usize {
    view.page_size.unwrap_or_else(|| load_settings().page_size)
}

/// Apply the command-line search, filters, sort and page to a fresh table.
pub(crate) fn configure(records: &[Record], args: &TableArgs, page_size: usize) -> Result<DataTable> {
    let mut columns = build_columns(records, &args.view);
    if let (Some(key), Some(sort_as)) = (&args.sort, args.sort_as) {
        columns = with_sort_as(columns, key, sort_as);
    }

    let mut table = DataTable::new(columns, page_size);
    if let Some(ref term) = args.search {
        table.set_search_term(term.as_str());
    }
    for spec in &args.filters {
        let (field, value) = parse_filter(spec)?;
        table.set_filter(field, value);
    }
    if let Some(ref key) = args.sort {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        table.set_sort(SortState::by(key.as_str(), direction));
    }
    let total = table.view(records).total_pages;
    table.goto_page(args.page, total);
    Ok(table)
}

pub fn run(args: &TableArgs) -> Result<()> {
    let records = load_records(&args.file)?;
    let table = configure(&records, args, page_size(&args.view))?;
    let view = table.view(&records);

    let mut out = Table::new();
    let header: Vec<String> = table
        .columns()
        .iter()
        .map(|c| header_label(&c.header, &c.accessor, table.sort()))
        .collect();
    out.set_header(header);
    for record in &view.rows {
        let cells: Vec<Cell> = table.columns().iter().map(|c| Cell::new(c.cell(record))).collect();
        out.add_row(cells);
    }

    let title = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    println!("{title}\n{out}");
    println!(
        "Page {} of {} | {} of {} records",
        table.current_page(),
        view.total_pages.max(1),
        view.total_matched,
        records.len()
    );
    Ok(())
}
