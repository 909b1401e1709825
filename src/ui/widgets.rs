use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::markdown;
use crate::app::App;
use crate::controller::Phase;
use crate::models::Sender;

const PLACEHOLDER: &str = "Start your yarn here. What's on your mind today?";

const WELCOME_TITLE: &str = "G'Day Mate!";

const WELCOME_TEXT: &str = "This is a safe place to sit and yarn, no matter what's on your mind. \
Here, we'll listen with an open heart and help you find your way back to your own songline.";

const PURPOSE: [&str; 3] = [
    "Yarn Link was developed by Algonova to provide a friendly, safe and accessible mental \
health support tool to regional Australians, which includes Aboriginal and Torres Strait \
Islander peoples. We aim to bridge the accessibility, affordability and effectiveness gap of \
mental health support in rural communities across Australia.",
    "The service uses generative AI to analyse each and every prompt, tailoring its response in \
a respectful, gentle and calm manner to assist with any basic mental needs. The intelligence \
is trained on data across regional Australia, and responds with a storytelling mindset to give \
you a safe, calm experience that understands your culture. Even if you ask it to do something it \
cannot do, it will recommend other mental health services near you to contact.",
    "Yarn Link acknowledges the Traditional Owners and Custodians of the lands that this platform \
serves and was built upon. We pay our respects to Elders past and present, and emerging leaders, \
and we extend that respect to all other Aboriginal and Torres Strait Islander peoples. This \
always is, was and will be, Aboriginal land.",
];

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn popup<'a>(title: &'a str, lines: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled(
            "Yarn Link - Keyboard Shortcuts",
            bold.fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled("Chat:", bold)),
        Line::from("  Enter         - Send message"),
        Line::from("  Ctrl+L        - Clear conversation and start over"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", bold)),
        Line::from("  Up/Down       - Scroll history"),
        Line::from("  PgUp/PgDn     - Scroll history"),
        Line::from("  Home/End      - Jump to start/end"),
        Line::from(""),
        Line::from(Span::styled("General:", bold)),
        Line::from("  Ctrl+A        - About Yarn Link"),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+Q        - Quit"),
        Line::from("  Ctrl+C (x2)   - Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup_area = centered(area, 60, 20);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup(" Help ", help_text), popup_area);
}

pub fn render_about_window(frame: &mut Frame, area: Rect) {
    let mut text = vec![
        Line::from(Span::styled(
            "Our purpose",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for paragraph in PURPOSE {
        text.push(Line::from(paragraph));
        text.push(Line::from(""));
    }
    text.push(Line::from(Span::styled(
        "Press Ctrl+A or Esc to close",
        Style::default().fg(Color::DarkGray),
    )));

    let popup_area = centered(area, 76, 30);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup(" About ", text), popup_area);
}

pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let [title_area, status_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(12)]).areas(area);

    let title = Paragraph::new(Span::styled(
        " Yarn Link",
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, title_area);

    if app.controller.phase() == Phase::Submitting {
        let status = Paragraph::new("Yarning... ")
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(status, status_area);
    }
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if app.has_started() {
        (
            "Ctrl+L: Clear | Ctrl+A: About | Ctrl+H: Help | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "Ctrl+A: About | Ctrl+H: Help | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    let bar = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(bar, area);
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let welcome = Paragraph::new(vec![
        Line::from(Span::styled(
            WELCOME_TITLE,
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(WELCOME_TEXT, Style::default().fg(Color::Cyan))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(welcome, centered(area, 64, 6));
}

pub fn render_chat_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let controller = &app.controller;
    if controller.conversation().is_empty() {
        render_welcome(frame, area);
        return;
    }

    let mut lines = Vec::new();

    for turn in controller.conversation().turns() {
        let (who, color) = match turn.sender() {
            Sender::User => ("You", Color::Cyan),
            Sender::Ai => ("Yarn Link", Color::Green),
        };

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            who,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        if turn.is_user() {
            lines.extend(turn.text().lines().map(|l| Line::from(l.to_string())));
        } else {
            lines.extend(markdown::render_reply(turn.text()));
        }
    }

    if controller.is_loading() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(error) = controller.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                "An error occurred: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(error.to_string(), Style::default().fg(Color::Red)),
        ]));
    }

    // Count wrapped rows so the bottom of the history can be reached
    let available_width = area.width.max(1) as usize;
    let total_visual_lines: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(available_width).max(1))
        .sum();

    let max_scroll = total_visual_lines.saturating_sub(area.height as usize);
    let actual_scroll = app.scroll_offset.min(max_scroll);
    app.scroll_offset = actual_scroll;

    let chat_history = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(chat_history, area);
}

pub fn render_input_field(frame: &mut Frame, app: &App, area: Rect) {
    let enabled = app.input_enabled();
    let (input_text, input_style) = if app.input_buffer.is_empty() {
        (PLACEHOLDER, Style::default().fg(Color::Gray))
    } else {
        (
            app.input_buffer.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    let border = if enabled { Color::Cyan } else { Color::DarkGray };
    let input_style = if enabled {
        input_style
    } else {
        input_style.fg(Color::DarkGray)
    };

    let input = Paragraph::new(input_text)
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);
}
