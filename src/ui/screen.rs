use ratatui::Frame;

use crate::{
    app::{App, View},
    ui::{report::render_report, stats::render_stats},
};

/// A UI Screen boundary: responsible for rendering one view
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Timer screen - renders the countdown using the App widget
pub struct TimerScreen;

impl Screen for TimerScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Calendar report for one month
pub struct ReportScreen;

impl Screen for ReportScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_report(app, f);
    }
}

pub struct StatsScreen;

impl Screen for StatsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Timer => Box::new(TimerScreen),
        View::Report => Box::new(ReportScreen),
        View::Stats => Box::new(StatsScreen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{draw, test_support::app_with_sessions};
    use ratatui::{backend::TestBackend, Terminal};

    fn drawn_text(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        crate::ui::buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn each_view_draws_its_screen() {
        let mut app = app_with_sessions(vec![]);
        assert!(drawn_text(&app).contains("25:00"));

        app.view = View::Report;
        assert!(drawn_text(&app).contains("March 2024"));

        app.view = View::Stats;
        assert!(drawn_text(&app).contains("Last Week"));
    }

    #[test]
    fn settings_form_draws_over_the_view() {
        let mut app = app_with_sessions(vec![]);
        app.open_settings();
        let text = drawn_text(&app);
        assert!(text.contains("Settings"));
        assert!(text.contains("Small Break"));
    }
}
