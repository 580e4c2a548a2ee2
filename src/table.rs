//! Client-side table engine: search filter, equality filters, single-key
//! sort and pagination over an in-memory record list.
//!
//! [`compute_view`] is the pure pipeline. [`DataTable`] wraps it with the
//! filter/sort/page state a list page keeps between keystrokes and clicks.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::record::{
    display_value, loose_cmp, lookup_path, matches_search, stable_sort_by, strict_eq, Record,
};

type RenderFn = Box<dyn Fn(&Record) -> String>;
type SortByFn = Box<dyn Fn(&Record) -> Value>;

/// One displayable column.
pub struct ColumnSpec {
    pub header: String,
    pub accessor: String,
    render: Option<RenderFn>,
    sort_by: Option<SortByFn>,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            accessor: accessor.into(),
            render: None,
            sort_by: None,
        }
    }

    pub fn with_render(mut self, render: impl Fn(&Record) -> String + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    /// Override the value used when this column is the sort key.
    pub fn with_sort_by(mut self, sort_by: impl Fn(&Record) -> Value + 'static) -> Self {
        self.sort_by = Some(Box::new(sort_by));
        self
    }

    pub fn has_sort_by(&self) -> bool {
        self.sort_by.is_some()
    }

    /// Cell text for a record. Missing fields render empty.
    pub fn cell(&self, record: &Record) -> String {
        if let Some(render) = &self.render {
            return render(record);
        }
        lookup_path(record, &self.accessor)
            .map(display_value)
            .unwrap_or_default()
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("render", &self.render.is_some())
            .field("sort_by", &self.has_sort_by())
            .finish()
    }
}

/// Build plain columns, one per field, in first-seen order across `records`.
pub fn infer_columns(records: &[Record]) -> Vec<ColumnSpec> {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !seen.contains(&key.as_str()) {
                seen.push(key);
            }
        }
    }
    seen.into_iter().map(|k| ColumnSpec::new(k, k)).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub equality_filters: BTreeMap<String, Value>,
}

impl FilterState {
    pub fn reset(&mut self) {
        self.search_term.clear();
        self.equality_filters.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.active_filters().next().is_none()
    }

    /// Filters that actually constrain: `null` and `""` mean "any".
    pub fn active_filters(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.equality_filters
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
    }

    pub fn matches(&self, record: &Record) -> bool {
        matches_search(record, &self.search_term)
            && self
                .active_filters()
                .all(|(field, expected)| strict_eq(record.get(field.as_str()), expected))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// Header click: the same key while ascending flips to descending, every
    /// other click sorts ascending by `key`.
    pub fn toggle(&mut self, key: &str) {
        let flip = self.key.as_deref() == Some(key) && self.direction == SortDirection::Asc;
        self.direction = if flip {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.key = Some(key.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Pull `current_page` back into `1..=max(total_pages, 1)`.
    pub fn clamp(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }
}

pub fn total_pages(matched: usize, page_size: usize) -> usize {
    matched.div_ceil(page_size.max(1))
}

/// Index range of `page` (1-based) clipped to `len`. Page 0 is empty.
pub fn page_bounds(page: usize, page_size: usize, len: usize) -> Range<usize> {
    let size = page_size.max(1);
    if page == 0 {
        return 0..0;
    }
    let start = (page - 1).saturating_mul(size).min(len);
    let end = page.saturating_mul(size).min(len);
    start..end
}

/// The rows to display plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage<'a> {
    pub rows: Vec<&'a Record>,
    pub total_pages: usize,
    pub total_matched: usize,
}

/// Filter, sort and paginate `records` without touching them.
///
/// A `page_size` of 0 is treated as 1.
pub fn compute_view<'a>(
    records: &'a [Record],
    filter: &FilterState,
    columns: &[ColumnSpec],
    sort: &SortState,
    page: usize,
    page_size: usize,
) -> ViewPage<'a> {
    let mut matched: Vec<&'a Record> = records.iter().filter(|r| filter.matches(r)).collect();

    if let Some(key) = sort.key.as_deref() {
        sort_rows(&mut matched, columns, key, sort.direction);
    }

    let total_matched = matched.len();
    let range = page_bounds(page, page_size, total_matched);
    trace!(
        "view: {} of {} records matched, page {} -> rows {:?}",
        total_matched,
        records.len(),
        page,
        range
    );

    ViewPage {
        rows: matched[range].to_vec(),
        total_pages: total_pages(total_matched, page_size),
        total_matched,
    }
}

fn sort_rows(rows: &mut [&Record], columns: &[ColumnSpec], key: &str, direction: SortDirection) {
    let column = columns.iter().find(|c| c.accessor == key);
    let keys: Vec<Option<Value>> = rows
        .iter()
        .map(|r| match column.and_then(|c| c.sort_by.as_ref()) {
            Some(sort_by) => Some(sort_by(r)),
            None => r.get(key).cloned(),
        })
        .collect();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    stable_sort_by(&mut order, |&a, &b| {
        let ord = loose_cmp(keys[a].as_ref(), keys[b].as_ref());
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let sorted: Vec<&Record> = order.iter().map(|&i| rows[i]).collect();
    rows.copy_from_slice(&sorted);
}

/// A list page's table: columns plus the filter, sort and page state that
/// the presentation layer mutates between renders.
#[derive(Debug)]
pub struct DataTable {
    columns: Vec<ColumnSpec>,
    filter: FilterState,
    sort: SortState,
    page: PageState,
}

impl DataTable {
    pub fn new(columns: Vec<ColumnSpec>, page_size: usize) -> Self {
        Self {
            columns,
            filter: FilterState::default(),
            sort: SortState::default(),
            page: PageState::new(page_size),
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn current_page(&self) -> usize {
        self.page.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page.page_size
    }

    /// Back to the freshly mounted state.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.sort = SortState::default();
        self.page.current_page = 1;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.page.current_page = 1;
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: Value) {
        self.filter.equality_filters.insert(field.into(), value);
        self.page.current_page = 1;
    }

    pub fn remove_filter(&mut self, field: &str) {
        self.filter.equality_filters.remove(field);
        self.page.current_page = 1;
    }

    pub fn toggle_sort(&mut self, key: &str) {
        self.sort.toggle(key);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.goto_page(self.page.current_page + 1, total_pages);
    }

    pub fn prev_page(&mut self, total_pages: usize) {
        self.goto_page(self.page.current_page.saturating_sub(1), total_pages);
    }

    pub fn goto_page(&mut self, page: usize, total_pages: usize) {
        self.page.current_page = page;
        self.page.clamp(total_pages);
    }

    pub fn view<'a>(&self, records: &'a [Record]) -> ViewPage<'a> {
        compute_view(
            records,
            &self.filter,
            &self.columns,
            &self.sort,
            self.page.current_page,
            self.page.page_size,
        )
    }
}
