pub mod charting;
pub mod report;
pub mod screen;
pub mod settings;
pub mod stats;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
    Frame,
};

use crate::{
    app::App,
    preset::Preset,
    timer::TimerStatus,
    util::format_clock,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub const LOCK_IN_COLOR: Color = Color::Rgb(184, 88, 75);
pub const OVERTIME_COLOR: Color = Color::Rgb(210, 63, 49);
pub const SMALL_BREAK_COLOR: Color = Color::Rgb(53, 126, 134);
pub const LONG_BREAK_COLOR: Color = Color::Rgb(61, 116, 160);

pub fn preset_color(preset: Preset) -> Color {
    match preset {
        Preset::LockIn => LOCK_IN_COLOR,
        Preset::SmallBreak => SMALL_BREAK_COLOR,
        Preset::LongBreak => LONG_BREAK_COLOR,
    }
}

/// Draw the current view, with the settings form on top when it is open
pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.view).render(app, f);
    if let Some(form) = &app.settings_form {
        settings::render_settings(form, f);
    }
}

fn status_label(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Idle => "ready",
        TimerStatus::Running => "locked in",
        TimerStatus::Paused => "paused",
        TimerStatus::Overtime => "overtime",
        TimerStatus::OvertimePaused => "overtime paused",
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let timer = &self.timer;
        let background = if timer.in_overtime() {
            OVERTIME_COLOR
        } else {
            preset_color(timer.active_preset())
        };

        let base_style = Style::default().bg(background).fg(Color::White);
        let bold_style = base_style.add_modifier(Modifier::BOLD);
        let dim_style = base_style.add_modifier(Modifier::DIM);

        Block::default().style(base_style).render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // preset tabs
                Constraint::Min(1),    // padding
                Constraint::Length(1), // clock
                Constraint::Length(1), // status
                Constraint::Length(1), // progress detail
                Constraint::Length(1), // session number
                Constraint::Min(1),    // padding
                Constraint::Length(1), // sync indicator
                Constraint::Length(1), // legend
            ])
            .split(area);

        let mut tabs = Vec::new();
        for preset in Preset::ALL {
            let style = if preset == timer.active_preset() {
                bold_style.add_modifier(Modifier::REVERSED)
            } else {
                dim_style
            };
            tabs.push(Span::styled(format!(" {preset} "), style));
            tabs.push(Span::styled("  ", base_style));
        }
        tabs.pop();
        Paragraph::new(Line::from(tabs))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(format_clock(timer.remaining_seconds()), bold_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(status_label(timer.status()), dim_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let detail = if timer.in_overtime() {
            Some(format!("+{} over", format_clock(timer.state().overtime_seconds as i64)))
        } else {
            timer.partial_progress().map(|(elapsed, original)| {
                format!(
                    "{} of {} done",
                    format_clock(elapsed as i64),
                    format_clock(original as i64)
                )
            })
        };
        if let Some(detail) = detail {
            Paragraph::new(Span::styled(detail, base_style.add_modifier(Modifier::ITALIC)))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        if timer.active_preset().is_lock_in() {
            Paragraph::new(Span::styled(format!("#{}", self.next_session_number()), dim_style))
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
        }

        if self.is_syncing() {
            Paragraph::new(Span::styled("Syncing…", dim_style.add_modifier(Modifier::ITALIC)))
                .alignment(Alignment::Right)
                .render(chunks[7], buf);
        }

        let toggle = if timer.is_running() { "pause" } else { "start" };
        let legend = Paragraph::new(Span::styled(
            format!(
                "(space) {toggle} / (c)omplete / (r)eset / (1-3) preset / re(p)ort / s(t)ats / (s)ettings / (esc)ape"
            ),
            dim_style.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[8], buf);
    }
}

/// Flatten a rendered buffer into one string for assertions
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &Buffer) -> String {
    buffer.content().iter().map(|c| c.symbol()).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::app::{App, Startup};
    use crate::clock::FixedClock;
    use crate::cue::SilentPlayer;
    use crate::session::Session;
    use crate::settings::TimerConfiguration;
    use crate::store::MemoryStore;
    use crate::timer::TimerVariant;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    pub fn app_with_sessions(sessions: Vec<Session>) -> App {
        let store = MemoryStore::new();
        let startup = Startup {
            config: TimerConfiguration {
                lock_in: 1500,
                small_break: 300,
                long_break: 900,
            },
            sessions,
        };
        App::new(
            startup,
            TimerVariant::Overtime,
            Box::new(store),
            Box::new(SilentPlayer),
            Box::new(FixedClock(today())),
        )
    }
}
