use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;

use super::components::{ConnectionForm, FocusedWidget, FormField, ViewerScreen, Window};

pub fn render_window(f: &mut Frame, window: &Window) {
    match window {
        Window::ConnectionForm(form) => render_connection_form(f, form),
        Window::Viewer(screen) => render_viewer_screen(f, screen),
    }
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::Yellow)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn key_hint(key: &str, color: Color) -> Span<'_> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn render_connection_form(f: &mut Frame, form: &ConnectionForm) {
    let size = f.area();
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Length(9),
                Constraint::Length(2),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(size);

    let form_area = centered_rect(50, vertical_chunks[1]);

    let block = Block::default()
        .title("New Connection")
        .borders(Borders::ALL)
        .title_alignment(Alignment::Center);

    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                FormField::Dialect => format!("< {} >", form.dialect),
                FormField::Hostname => form.hostname.clone(),
                FormField::Username => form.username.clone(),
                FormField::Password => "*".repeat(form.password.chars().count()),
                FormField::Database => form.database.clone(),
            };
            let label = format!("{:>9}: ", field.label());
            if *field == form.current_field {
                Line::from(vec![
                    Span::styled(label, Style::default().fg(Color::Yellow)),
                    Span::raw(value),
                    Span::raw(" <"),
                ])
            } else {
                Line::from(vec![Span::raw(label), Span::raw(value)])
            }
        })
        .collect();

    let form_widget = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);

    f.render_widget(form_widget, form_area);

    let help_message = vec![Line::from(vec![
        key_hint("Tab", Color::Yellow),
        Span::raw(" next field, "),
        key_hint("Left", Color::Yellow),
        Span::raw("/"),
        key_hint("Right", Color::Yellow),
        Span::raw(" dialect, "),
        key_hint("Enter", Color::Green),
        Span::raw(" to connect, "),
        key_hint("Esc", Color::Red),
        Span::raw(" to cancel"),
    ])];

    let help_paragraph = Paragraph::new(help_message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, vertical_chunks[2]);

    if let Some(error) = &form.error {
        render_error_popup(f, error);
    }
}

pub fn render_viewer_screen(f: &mut Frame, screen: &ViewerScreen) {
    let size = f.area();
    let viewer = &screen.viewer;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(size);

    let title = Paragraph::new(viewer.title())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(title, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(rows[1]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(chunks[1]);

    let table_list: Vec<ListItem> = viewer
        .tables()
        .into_iter()
        .map(|table| ListItem::new(table.to_string()))
        .collect();
    let tables_block = Block::default()
        .borders(Borders::ALL)
        .title("Tables")
        .border_style(border_style(screen.current_focus == FocusedWidget::TablesList));
    let tables_widget = List::new(table_list)
        .block(tables_block)
        .highlight_style(highlight());
    let mut list_state = ListState::default().with_selected(if viewer.tables().is_empty() {
        None
    } else {
        Some(screen.selected_table)
    });
    f.render_stateful_widget(tables_widget, chunks[0], &mut list_state);

    render_filter_bar(f, screen, right_chunks[0]);
    render_grid(f, screen, right_chunks[1]);

    let status = match &screen.status {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(vec![
            key_hint("Tab", Color::Yellow),
            Span::raw(" focus, "),
            key_hint("Enter", Color::Green),
            Span::raw(" select/filter, "),
            key_hint("e", Color::Yellow),
            Span::raw(" export grid, "),
            key_hint("Esc", Color::Red),
            Span::raw(" clear filter/close, "),
            key_hint("q", Color::Red),
            Span::raw(" close"),
        ]),
    };
    f.render_widget(Paragraph::new(status), rows[2]);

    if let Some(error) = &screen.error {
        render_error_popup(f, error);
    }
}

fn render_filter_bar(f: &mut Frame, screen: &ViewerScreen, area: Rect) {
    let filter = screen.viewer.filter();
    let styled = |text: String, widget: FocusedWidget| {
        if screen.current_focus == widget {
            Span::styled(text, highlight())
        } else {
            Span::raw(text)
        }
    };

    let column = filter.selected_column_name().unwrap_or("-").to_string();
    let mut spans = vec![
        Span::raw("Filter: "),
        styled(format!("[{} \u{25be}]", column), FocusedWidget::FilterColumn),
        Span::raw(" "),
        styled(format!("[{}]", filter.operator), FocusedWidget::FilterOperator),
        Span::raw(" "),
        styled(format!("[{:<12}]", filter.value), FocusedWidget::FilterValue),
        Span::raw(" "),
        Span::styled("[Filter]", Style::default().fg(Color::Green)),
    ];
    if let Some(applied) = &filter.applied {
        spans.push(Span::styled(
            format!("  active: {} {} '{}'", applied.column, applied.operator, applied.value),
            Style::default().fg(Color::Cyan),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(screen.current_focus.is_filter_bar()));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_grid(f: &mut Frame, screen: &ViewerScreen, area: Rect) {
    let grid = screen.viewer.grid();

    let title = match screen.viewer.selected_table() {
        Some(table) => format!(
            "{} (showing {} of {} rows)",
            table,
            grid.rows.len(),
            grid.total_rows
        ),
        None => "Select a table".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(screen.current_focus == FocusedWidget::Grid));

    let header = Row::new(
        grid.headers
            .iter()
            .map(|h| Cell::from(h.clone()).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().fg(Color::Yellow));

    let rows: Vec<Row> = grid
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|value| Cell::from(value.clone()))))
        .collect();

    let column_count = grid.headers.len().max(1) as u32;
    let widths: Vec<Constraint> = (0..column_count)
        .map(|_| Constraint::Ratio(1, column_count))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(highlight());

    let selected = (screen.current_focus == FocusedWidget::Grid && !grid.rows.is_empty())
        .then_some(screen.selected_row);
    let mut state = TableState::default().with_selected(selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn render_error_popup(f: &mut Frame, message: &str) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Percentage(35),
            ]
            .as_ref(),
        )
        .split(f.area());
    let area = centered_rect(60, vertical[1]);

    let block = Block::default()
        .title("Error")
        .borders(Borders::ALL)
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::Red));
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        area,
    );
}

fn centered_rect(percent_x: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    popup_layout[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::screen_with_rows;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_connection_form_masks_password() {
        let mut form = ConnectionForm::new("sample.db");
        form.password = "secret".to_string();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| render_connection_form(f, &form)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("New Connection"));
        assert!(text.contains("< sqlite >"));
        assert!(text.contains("sample.db"));
        assert!(text.contains("******"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_connection_form_error_popup() {
        let mut form = ConnectionForm::new("sample.db");
        form.error = Some("Connection error: refused".to_string());
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| render_connection_form(f, &form)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Connection error: refused"));
        assert!(text.contains("Press any key to dismiss"));
    }

    #[tokio::test]
    async fn test_viewer_screen_renders_grid() {
        let mut screen = screen_with_rows(3).await;
        screen.viewer.select_table("orders").await.unwrap();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal.draw(|f| render_viewer_screen(f, &screen)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("sqlite:///sample.db"));
        assert!(text.contains("users"));
        assert!(text.contains("orders (showing 3 of 3 rows)"));
        assert!(text.contains("total"));
        assert!(text.contains("20"));
        assert!(text.contains("[Filter]"));
    }
}
