use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};
use serde_json::Value;

use crate::loader::parse_filter;
use crate::record::{display_value, Record};
use crate::table::DataTable;
use crate::tui::{header_label, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

enum BrowseMode {
    Normal,
    Search(String),
    Filter(String),
    GotoPage(String),
}

pub enum BrowseAction {
    Continue,
    Close,
}

/// Interactive pager over a record list. All filtering, sorting and paging
/// goes through the wrapped [`DataTable`].
pub struct TableBrowser {
    title: String,
    records: Vec<Record>,
    table: DataTable,
    selected: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    table_state: TableState,
}

impl TableBrowser {
    pub fn new(title: String, records: Vec<Record>, table: DataTable) -> Self {
        Self {
            title,
            records,
            table,
            selected: 0,
            mode: BrowseMode::Normal,
            status_message: None,
            table_state: TableState::default(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if self.records.is_empty() {
            println!("No records found.");
            return Ok(());
        }

        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.table.view(&self.records).rows.get(self.selected).copied()
    }

    fn total_pages(&self) -> usize {
        self.table.view(&self.records).total_pages
    }

    fn rows_on_page(&self) -> usize {
        self.table.view(&self.records).rows.len()
    }

    /// Draw the browser into the given frame.
    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let areas = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Fill(1),   // table
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(frame.area());

        frame.render_widget(
            Paragraph::new(self.title.as_str()).style(HEADER_STYLE),
            areas[0],
        );

        let view = self.table.view(&self.records);
        let columns = self.table.columns();
        let rows: Vec<Row> = view
            .rows
            .iter()
            .map(|record| Row::new(columns.iter().map(|c| Cell::from(c.cell(record)))))
            .collect();
        let header: Vec<String> = columns
            .iter()
            .map(|c| header_label(&c.header, &c.accessor, self.table.sort()))
            .collect();
        let widths = vec![Constraint::Fill(1); columns.len().max(1)];

        if self.selected >= rows.len() {
            self.selected = rows.len().saturating_sub(1);
        }
        self.table_state.select(if rows.is_empty() { None } else { Some(self.selected) });

        let table = Table::new(rows, widths)
            .header(Row::new(header).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, areas[1], &mut self.table_state);

        let mut status = format!(
            "Page {} of {} | {} of {} records",
            self.table.current_page(),
            view.total_pages.max(1),
            view.total_matched,
            self.records.len(),
        );
        let filter = self.table.filter();
        if !filter.is_empty() {
            if !filter.search_term.is_empty() {
                status.push_str(&format!(" | search: '{}'", filter.search_term));
            }
            for (field, value) in filter.active_filters() {
                status.push_str(&format!(" | {field}={}", display_value(value)));
            }
        }
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), areas[2]);

        let keys_widget = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  enter:show  n/\u{2192}:next  p/\u{2190}:prev  1-9:sort  /:search  f:filter  g:page  c:clear  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search(input) => Paragraph::new(format!("Search: {input}\u{2588}")),
            BrowseMode::Filter(input) => {
                Paragraph::new(format!("Filter (field=value): {input}\u{2588}"))
            }
            BrowseMode::GotoPage(input) => Paragraph::new(format!("Go to page: {input}\u{2588}")),
        };
        frame.render_widget(keys_widget, areas[3]);
    }

    /// Handle a key event. Returns a BrowseAction indicating what the caller should do.
    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
                KeyCode::Down => {
                    if self.selected + 1 < self.rows_on_page() {
                        self.selected += 1;
                    }
                }
                KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Enter => {
                    self.status_message = self
                        .selected_record()
                        .map(|r| Value::Object(r.clone()).to_string());
                }
                KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                    let total = self.total_pages();
                    self.table.next_page(total);
                    self.selected = 0;
                }
                KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    let total = self.total_pages();
                    self.table.prev_page(total);
                    self.selected = 0;
                }
                KeyCode::Home => {
                    let total = self.total_pages();
                    self.table.goto_page(1, total);
                    self.selected = 0;
                }
                KeyCode::End => {
                    let total = self.total_pages();
                    self.table.goto_page(total, total);
                    self.selected = 0;
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let idx = c as usize - '1' as usize;
                    match self.table.columns().get(idx).map(|col| col.accessor.clone()) {
                        Some(accessor) => {
                            self.table.toggle_sort(&accessor);
                            self.selected = 0;
                        }
                        None => self.status_message = Some(format!("No column {c}")),
                    }
                }
                KeyCode::Char('/') => {
                    self.mode = BrowseMode::Search(self.table.filter().search_term.clone());
                }
                KeyCode::Char('f') => self.mode = BrowseMode::Filter(String::new()),
                KeyCode::Char('g') => self.mode = BrowseMode::GotoPage(String::new()),
                KeyCode::Char('c') => {
                    self.table.reset();
                    self.selected = 0;
                    self.status_message = Some("Cleared search, filters and sort".into());
                }
                _ => {}
            },
            BrowseMode::Search(_) => self.handle_search_key(code),
            BrowseMode::Filter(_) | BrowseMode::GotoPage(_) => match code {
                KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Enter => self.submit_input(),
                KeyCode::Backspace => self.input_backspace(),
                KeyCode::Char(c) => self.input_push(c),
                _ => {}
            },
        }
        BrowseAction::Continue
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }

                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }

                if let BrowseAction::Close = self.handle_key_event(code) {
                    break;
                }
            }
        }
        Ok(())
    }

    /// The search term follows every keystroke.
    fn handle_search_key(&mut self, code: KeyCode) {
        let BrowseMode::Search(input) = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                self.mode = BrowseMode::Normal;
                return;
            }
            KeyCode::Esc => {
                input.clear();
                self.mode = BrowseMode::Normal;
                self.table.set_search_term("");
                self.selected = 0;
                return;
            }
            _ => return,
        }
        let term = input.clone();
        self.table.set_search_term(term);
        self.selected = 0;
    }

    fn input_push(&mut self, c: char) {
        match &mut self.mode {
            BrowseMode::Filter(s) | BrowseMode::GotoPage(s) => s.push(c),
            _ => {}
        }
    }

    fn input_backspace(&mut self) {
        match &mut self.mode {
            BrowseMode::Filter(s) | BrowseMode::GotoPage(s) => {
                s.pop();
            }
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
        match &mode {
            BrowseMode::Filter(input) => match parse_filter(input.trim()) {
                Ok((field, Value::String(s))) if s.is_empty() => {
                    self.table.remove_filter(&field);
                    self.selected = 0;
                    self.status_message = Some(format!("Removed filter on {field}"));
                }
                Ok((field, value)) => {
                    self.table.set_filter(field, value);
                    self.selected = 0;
                }
                Err(e) => self.status_message = Some(e.to_string()),
            },
            BrowseMode::GotoPage(input) => match input.trim().parse::<usize>() {
                Ok(page) if page >= 1 => {
                    let total = self.total_pages();
                    self.table.goto_page(page, total);
                    self.selected = 0;
                }
                _ => self.status_message = Some(format!("Not a page number: {input}")),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnSpec, SortDirection, SortState};
    use serde_json::json;

    const DEPARTMENTS: [&str; 3] = ["Engineering", "Sales", "HR"];

    fn make_records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                json!({
                    "id": i + 1,
                    "name": format!("Employee {}", i + 1),
                    "department": DEPARTMENTS[i % 3],
                    "salary": 4000 + (i * 37 % 11) * 100,
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect()
    }

    fn make_browser(n: usize) -> TableBrowser {
        let columns = vec![
            ColumnSpec::new("ID", "id"),
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Department", "department"),
            ColumnSpec::new("Salary", "salary"),
        ];
        TableBrowser::new("Employees".into(), make_records(n), DataTable::new(columns, 5))
    }

    fn type_text(browser: &mut TableBrowser, text: &str) {
        for c in text.chars() {
            browser.handle_key_event(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_next_and_prev_page() {
        let mut browser = make_browser(12);
        assert_eq!(browser.table.current_page(), 1);

        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.table.current_page(), 2);
        browser.handle_key_event(KeyCode::Char('n'));
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.table.current_page(), 3); // clamped at last page

        browser.handle_key_event(KeyCode::Char('p'));
        assert_eq!(browser.table.current_page(), 2);
        browser.handle_key_event(KeyCode::Home);
        assert_eq!(browser.table.current_page(), 1);
        browser.handle_key_event(KeyCode::End);
        assert_eq!(browser.table.current_page(), 3);
    }

    #[test]
    fn test_selected_row_stays_on_page() {
        let mut browser = make_browser(7);
        for _ in 0..10 {
            browser.handle_key_event(KeyCode::Down);
        }
        assert_eq!(browser.selected, 4);
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.selected, 0);
        browser.handle_key_event(KeyCode::Down);
        browser.handle_key_event(KeyCode::Down);
        assert_eq!(browser.selected, 1); // only 2 rows on page 2
        browser.handle_key_event(KeyCode::Up);
        browser.handle_key_event(KeyCode::Up);
        assert_eq!(browser.selected, 0);
    }

    #[test]
    fn test_search_updates_on_every_keystroke() {
        let mut browser = make_browser(12);
        browser.handle_key_event(KeyCode::Char('n'));
        browser.handle_key_event(KeyCode::Char('/'));
        type_text(&mut browser, "sal");
        assert_eq!(browser.table.filter().search_term, "sal");
        assert_eq!(browser.table.current_page(), 1);
        assert_eq!(browser.table.view(&browser.records).total_matched, 4);

        browser.handle_key_event(KeyCode::Backspace);
        assert_eq!(browser.table.filter().search_term, "sa");

        browser.handle_key_event(KeyCode::Enter);
        assert!(matches!(browser.mode, BrowseMode::Normal));
        assert_eq!(browser.table.filter().search_term, "sa");
    }

    #[test]
    fn test_esc_in_search_clears_term() {
        let mut browser = make_browser(6);
        browser.handle_key_event(KeyCode::Char('/'));
        type_text(&mut browser, "hr");
        browser.handle_key_event(KeyCode::Esc);
        assert!(matches!(browser.mode, BrowseMode::Normal));
        assert!(browser.table.filter().search_term.is_empty());
    }

    #[test]
    fn test_digit_toggles_sort() {
        let mut browser = make_browser(6);
        browser.handle_key_event(KeyCode::Char('4'));
        assert_eq!(browser.table.sort(), &SortState::by("salary", SortDirection::Asc));
        browser.handle_key_event(KeyCode::Char('4'));
        assert_eq!(browser.table.sort(), &SortState::by("salary", SortDirection::Desc));
        browser.handle_key_event(KeyCode::Char('2'));
        assert_eq!(browser.table.sort(), &SortState::by("name", SortDirection::Asc));

        browser.handle_key_event(KeyCode::Char('9'));
        assert!(browser.status_message.as_ref().unwrap().contains('9'));
    }

    #[test]
    fn test_filter_input() {
        let mut browser = make_browser(12);
        browser.handle_key_event(KeyCode::Char('f'));
        type_text(&mut browser, "department=HR");
        browser.handle_key_event(KeyCode::Enter);
        assert_eq!(browser.table.view(&browser.records).total_matched, 4);
        let record = browser.selected_record().unwrap();
        assert_eq!(record["department"], json!("HR"));
    }

    #[test]
    fn test_bad_filter_sets_status() {
        let mut browser = make_browser(3);
        browser.handle_key_event(KeyCode::Char('f'));
        type_text(&mut browser, "department");
        browser.handle_key_event(KeyCode::Enter);
        assert!(browser.status_message.is_some());
        assert!(browser.table.filter().is_empty());
    }

    #[test]
    fn test_empty_filter_value_removes_filter() {
        let mut browser = make_browser(12);
        browser.handle_key_event(KeyCode::Char('f'));
        type_text(&mut browser, "department=Sales");
        browser.handle_key_event(KeyCode::Enter);
        assert_eq!(browser.table.view(&browser.records).total_matched, 4);

        browser.handle_key_event(KeyCode::Char('f'));
        type_text(&mut browser, "department=");
        browser.handle_key_event(KeyCode::Enter);
        assert!(browser.table.filter().is_empty());
        assert_eq!(browser.table.view(&browser.records).total_matched, 12);
    }

    #[test]
    fn test_enter_shows_selected_row() {
        let mut browser = make_browser(3);
        browser.handle_key_event(KeyCode::Down);
        browser.handle_key_event(KeyCode::Enter);
        let msg = browser.status_message.clone().unwrap();
        assert!(msg.contains("Employee 2"));
    }

    #[test]
    fn test_goto_page() {
        let mut browser = make_browser(30);
        browser.handle_key_event(KeyCode::Char('g'));
        type_text(&mut browser, "4");
        browser.handle_key_event(KeyCode::Enter);
        assert_eq!(browser.table.current_page(), 4);

        browser.mode = BrowseMode::GotoPage("99".into());
        browser.submit_input();
        assert_eq!(browser.table.current_page(), 6);

        browser.mode = BrowseMode::GotoPage("x".into());
        browser.submit_input();
        assert!(browser.status_message.as_ref().unwrap().contains('x'));
    }

    #[test]
    fn test_clear_resets_table() {
        let mut browser = make_browser(12);
        browser.handle_key_event(KeyCode::Char('1'));
        browser.handle_key_event(KeyCode::Char('/'));
        type_text(&mut browser, "employee 1");
        browser.handle_key_event(KeyCode::Enter);
        browser.handle_key_event(KeyCode::Char('c'));
        assert!(browser.table.filter().is_empty());
        assert_eq!(browser.table.sort(), &SortState::default());
    }

    #[test]
    fn test_close_on_q() {
        let mut browser = make_browser(3);
        assert!(matches!(
            browser.handle_key_event(KeyCode::Char('q')),
            BrowseAction::Close
        ));
    }
}
