pub mod markdown;
pub mod widgets;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    // Input grows with its content, up to half the screen
    let available_width = frame.area().width.saturating_sub(2).max(1) as usize;
    let input_lines = app.input_buffer.chars().count().div_ceil(available_width).max(1);
    let max_lines = (frame.area().height as usize / 2).saturating_sub(2).max(1);

    #[allow(clippy::cast_possible_truncation)]
    let input_height = (input_lines.min(max_lines) + 2) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Min(0),               // Conversation
            Constraint::Length(input_height), // Input field
            Constraint::Length(1),            // Keymap bar
        ])
        .split(frame.area());

    widgets::render_header(frame, app, chunks[0]);
    widgets::render_chat_history(frame, app, chunks[1]);
    widgets::render_input_field(frame, app, chunks[2]);
    widgets::render_bottom_bar(frame, app, chunks[3]);

    if app.show_help {
        widgets::render_help_window(frame, frame.area());
    }

    if app.show_about {
        widgets::render_about_window(frame, frame.area());
    }
}
