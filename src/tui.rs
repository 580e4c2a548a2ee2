use ratatui::style::{Color, Modifier, Style};

use crate::table::{SortDirection, SortState};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Column header with an arrow when it is the active sort key.
pub fn header_label(header: &str, accessor: &str, sort: &SortState) -> String {
    match (&sort.key, sort.direction) {
        (Some(key), SortDirection::Asc) if key == accessor => format!("{header} \u{25b2}"),
        (Some(key), SortDirection::Desc) if key == accessor => format!("{header} \u{25bc}"),
        _ => header.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_label_marks_sorted_column() {
        let sort = SortState::by("age", SortDirection::Desc);
        assert_eq!(header_label("Age", "age", &sort), "Age \u{25bc}");
        assert_eq!(header_label("Name", "name", &sort), "Name");
        assert_eq!(header_label("Age", "age", &SortState::default()), "Age");
    }
}
