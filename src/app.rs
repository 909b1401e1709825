use crate::controller::{Completion, Controller, PendingRequest};
use crate::events::AppEvent;

/// View state wrapped around the one controller that owns the conversation.
#[derive(Debug, Default)]
pub struct App {
    pub controller: Controller,
    pub input_buffer: String,
    pub scroll_offset: usize,
    pub show_help: bool,
    pub show_about: bool,
    pub exit_pending: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub const fn toggle_about(&mut self) {
        self.show_about = !self.show_about;
    }

    /// True once the first turn has been recorded.
    pub fn has_started(&self) -> bool {
        !self.controller.conversation().is_empty()
    }

    /// The input line accepts edits only while no request is in flight.
    pub const fn input_enabled(&self) -> bool {
        !self.controller.is_loading()
    }

    pub fn push_char(&mut self, c: char) {
        if self.input_enabled() {
            self.input_buffer.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.input_enabled() {
            self.input_buffer.pop();
        }
    }

    /// Hands the input line to the controller. The buffer is emptied only
    /// when something was actually submitted.
    pub fn submit_input(&mut self) -> Option<PendingRequest> {
        if !self.input_enabled() {
            return None;
        }

        let pending = self.controller.submit(&self.input_buffer)?;
        self.input_buffer.clear();
        self.scroll_to_bottom();
        Some(pending)
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Completion {
        match event {
            AppEvent::QueryFinished { id, result } => {
                let completion = self.controller.complete(id, result);
                if completion != Completion::Stale {
                    self.scroll_to_bottom();
                }
                completion
            }
        }
    }

    pub fn clear_conversation(&mut self) {
        self.controller.clear();
        self.scroll_offset = 0;
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub const fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Clamped to the real maximum when the history is rendered
        self.scroll_offset = usize::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryError;

    #[test]
    fn test_app_new() {
        let app = App::new();
        assert!(!app.should_quit);
        assert!(!app.has_started());
        assert!(app.input_enabled());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        app.quit();
        assert!(app.should_quit);
    }

    #[test]
    fn test_toggle_overlays() {
        let mut app = App::new();
        app.toggle_help();
        assert!(app.show_help);
        app.toggle_help();
        assert!(!app.show_help);

        app.toggle_about();
        assert!(app.show_about);
    }

    #[test]
    fn test_submit_clears_input_immediately() {
        let mut app = App::new();
        app.input_buffer = "  kia ora  ".to_string();

        let pending = app.submit_input().unwrap();
        assert_eq!(pending.prompt, "kia ora");
        assert!(app.input_buffer.is_empty());
        assert!(app.has_started());
        assert_eq!(app.scroll_offset, usize::MAX);
    }

    #[test]
    fn test_blank_submit_keeps_input() {
        let mut app = App::new();
        app.input_buffer = "   ".to_string();

        assert!(app.submit_input().is_none());
        assert_eq!(app.input_buffer, "   ");
        assert!(!app.has_started());
    }

    #[test]
    fn test_input_disabled_while_loading() {
        let mut app = App::new();
        app.input_buffer = "first".to_string();
        app.submit_input().unwrap();

        app.push_char('x');
        assert!(app.input_buffer.is_empty());

        app.input_buffer = "second".to_string();
        assert!(app.submit_input().is_none());
        assert_eq!(app.controller.conversation().len(), 1);

        app.pop_char();
        assert_eq!(app.input_buffer, "second");
    }

    #[test]
    fn test_handle_event_applies_reply() {
        let mut app = App::new();
        app.input_buffer = "hi".to_string();
        let pending = app.submit_input().unwrap();
        app.scroll_offset = 0;

        let completion = app.handle_event(AppEvent::QueryFinished {
            id: pending.id,
            result: Ok("Hello".to_string()),
        });

        assert_eq!(completion, Completion::Replied);
        assert_eq!(app.controller.conversation().len(), 2);
        assert_eq!(app.scroll_offset, usize::MAX);
        assert!(app.input_enabled());
    }

    #[test]
    fn test_late_event_after_clear_is_dropped() {
        let mut app = App::new();
        app.input_buffer = "hi".to_string();
        let pending = app.submit_input().unwrap();
        app.clear_conversation();

        let completion = app.handle_event(AppEvent::QueryFinished {
            id: pending.id,
            result: Err(QueryError::Status(500)),
        });

        assert_eq!(completion, Completion::Stale);
        assert!(!app.has_started());
        assert_eq!(app.controller.error(), None);
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn test_scrolling() {
        let mut app = App::new();
        app.scroll_offset = 10;
        app.scroll_up(3);
        assert_eq!(app.scroll_offset, 7);
        app.scroll_up(10);
        assert_eq!(app.scroll_offset, 0);
        app.scroll_down(4);
        assert_eq!(app.scroll_offset, 4);
        app.scroll_to_bottom();
        app.scroll_down(1);
        assert_eq!(app.scroll_offset, usize::MAX);
        app.scroll_to_top();
        assert_eq!(app.scroll_offset, 0);
    }
}
