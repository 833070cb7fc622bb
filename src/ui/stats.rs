use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    app::App,
    report::{weekday_name, PeriodStats, StatsPeriod, WeekdayStat},
    ui::{
        charting::{bar_cells, bar_percentage, overtime_portion},
        LOCK_IN_COLOR, OVERTIME_COLOR,
    },
    util::format_hours_minutes,
};

const LABEL_WIDTH: usize = 11;
const VALUE_WIDTH: u16 = 10;

/// Summary lines above the weekday chart
pub fn summary_lines(stats: &PeriodStats) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let entry = |label: &str, value: String| {
        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(value, bold),
        ])
    };

    let highest = stats
        .highest_day
        .map(|d| format!("{} ({})", weekday_name(d), format_hours_minutes(stats.highest_avg)))
        .unwrap_or_else(|| "-".to_string());
    let most_overtime = stats
        .day_with_most_overtime
        .map(|d| format!("{} ({})", weekday_name(d), format_hours_minutes(stats.max_overtime)))
        .unwrap_or_else(|| "-".to_string());

    vec![
        entry("Total", format_hours_minutes(stats.total_time_in_period)),
        entry(
            "Overtime",
            format!(
                "{} ({}%)",
                format_hours_minutes(stats.total_overtime_in_period),
                stats.overtime_percentage
            ),
        ),
        entry("Active days", stats.days_with_activity.to_string()),
        entry("Average per active day", format_hours_minutes(stats.average_per_active_day)),
        entry("Best day", highest),
        entry(
            "Lightest day",
            format!("{} ({})", weekday_name(stats.lowest_day), format_hours_minutes(stats.lowest_avg)),
        ),
        entry("Most overtime", most_overtime),
    ]
}

/// One weekday bar: regular time, then the overtime share of it
pub fn weekday_line(stat: &WeekdayStat, max_average: u64, bar_width: u16) -> Line<'static> {
    let pct = bar_percentage(stat.average, max_average);
    let (regular, overtime) = bar_cells(bar_width, pct, overtime_portion(stat.overtime, stat.average));

    Line::from(vec![
        Span::raw(format!("{:<width$}", weekday_name(stat.weekday), width = LABEL_WIDTH)),
        Span::styled("█".repeat(regular as usize), Style::default().fg(LOCK_IN_COLOR)),
        Span::styled("█".repeat(overtime as usize), Style::default().fg(OVERTIME_COLOR)),
        Span::styled(
            format!(" {}", format_hours_minutes(stat.average)),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ])
}

pub fn render_stats(app: &App, f: &mut Frame) {
    let area = f.area();
    let stats = app.period_stats();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(9), // Summary
            Constraint::Min(0),    // Weekday chart
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title_text = format!(
        "{} ({} to {})",
        app.stats_period,
        stats.period_start.format("%b %-d"),
        stats.period_end.format("%b %-d")
    );
    let title = Paragraph::new(title_text)
        .block(Block::default().borders(Borders::ALL).title("Stats"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let summary = Paragraph::new(summary_lines(&stats))
        .block(Block::default().borders(Borders::ALL).title("Summary"));
    f.render_widget(summary, chunks[1]);

    let bar_width = chunks[2]
        .width
        .saturating_sub(LABEL_WIDTH as u16 + VALUE_WIDTH + 2);
    let max_average = stats.weekdays.iter().map(|w| w.average).max().unwrap_or(0);
    let bars: Vec<Line> = stats
        .weekdays
        .iter()
        .map(|w| weekday_line(w, max_average, bar_width))
        .collect();
    let chart = Paragraph::new(bars)
        .block(Block::default().borders(Borders::ALL).title("Average by weekday"));
    f.render_widget(chart, chunks[2]);

    let periods = StatsPeriod::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| format!("({}) {}", i + 1, p))
        .collect::<Vec<_>>()
        .join(" / ");
    let help = Paragraph::new(format!("{periods} / (t/esc) back / (q)uit"))
        .style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
