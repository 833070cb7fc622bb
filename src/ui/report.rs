use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{
    app::App,
    report::{weekday_name, CalendarCell, WEEK_ORDER},
    ui::{LOCK_IN_COLOR, OVERTIME_COLOR},
};

/// Pure presenter for one calendar cell: day number over minutes worked
pub fn present_cell(cell: Option<&CalendarCell>, today: chrono::NaiveDate) -> Cell<'static> {
    use chrono::Datelike;

    let Some(cell) = cell else {
        return Cell::from("");
    };

    let day_style = if cell.date == today {
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let minutes_style = match (cell.minutes_worked, cell.has_overtime) {
        (0, _) => Style::default().add_modifier(Modifier::DIM),
        (_, true) => Style::default().fg(OVERTIME_COLOR),
        (_, false) => Style::default().fg(LOCK_IN_COLOR),
    };
    let minutes = if cell.minutes_worked == 0 {
        "-".to_string()
    } else {
        format!("{}m", cell.minutes_worked)
    };

    Cell::from(vec![
        Line::from(Span::styled(cell.date.day().to_string(), day_style)),
        Line::from(Span::styled(minutes, minutes_style)),
    ])
}

pub fn render_report(app: &App, f: &mut Frame) {
    let area = f.area();
    let calendar = app.month_calendar();
    let today = app.today();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Calendar
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(calendar.title())
        .block(Block::default().borders(Borders::ALL).title("Report"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let header = Row::new(
        WEEK_ORDER
            .iter()
            .map(|d| Cell::from(&weekday_name(*d)[..3]))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD))
    .bottom_margin(1);

    let rows = calendar.weeks.iter().map(|week| {
        Row::new(
            week.iter()
                .map(|cell| present_cell(cell.as_ref(), today))
                .collect::<Vec<_>>(),
        )
        .height(2)
        .bottom_margin(1)
    });

    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(table, chunks[1]);

    let help = Paragraph::new("(←/→) month / (p/esc) back / (q)uit")
        .style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);
}
