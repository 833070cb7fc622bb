use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::{app::SettingsForm, preset::Preset, ui::preset_color};

const MODAL_WIDTH: u16 = 44;
const MODAL_HEIGHT: u16 = 10;

/// Rect of at most `width` x `height` centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn field_line(preset: Preset, value: &str, selected: bool) -> Line<'static> {
    let label_style = Style::default().fg(preset_color(preset));
    let value_style = if selected {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let marker = if selected { "> " } else { "  " };

    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{:<12}", preset.to_string()), label_style),
        Span::styled(format!("{value:>4}"), value_style),
        Span::raw(" min"),
    ])
}

pub fn render_settings(form: &SettingsForm, f: &mut Frame) {
    let area = centered_rect(MODAL_WIDTH, MODAL_HEIGHT, f.area());
    f.render_widget(Clear, area);

    let block = Block::default().borders(Borders::ALL).title("Settings");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints([
            Constraint::Length(3), // fields
            Constraint::Length(1), // padding
            Constraint::Length(1), // validation
            Constraint::Min(1),    // help
        ])
        .split(inner);

    let fields: Vec<Line> = Preset::ALL
        .iter()
        .zip(&form.fields)
        .enumerate()
        .map(|(i, (preset, value))| field_line(*preset, value, i == form.selected))
        .collect();
    f.render_widget(Paragraph::new(fields), chunks[0]);

    if let Some(error) = &form.error {
        f.render_widget(
            Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red))),
            chunks[2],
        );
    }

    let help = Paragraph::new("(↑/↓) field / (enter) save / (esc) cancel")
        .style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
