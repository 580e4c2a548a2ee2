use std::path::Path;

use super::table::{build_columns, page_size};
use super::ViewArgs;
use crate::browser::TableBrowser;
use crate::error::Result;
use crate::loader::load_records;
use crate::table::DataTable;

pub fn run(file: &Path, view: &ViewArgs) -> Result<()> {
    let records = load_records(file)?;
    let table = DataTable::new(build_columns(&records, view), page_size(view));
    let title = format!(
        "{} ({} records)",
        file.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        records.len()
    );
    let mut browser = TableBrowser::new(title, records, table);
    browser.run()?;
    Ok(())
}
