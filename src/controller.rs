//! # Request lifecycle
//!
//! Turns typed input into backend requests and folds the results back into
//! the conversation. The controller never touches the network itself: it
//! hands out a [`PendingRequest`] on submit and is told about the outcome
//! through [`Controller::complete`], so any [`Transport`] (or none at all)
//! can sit between the two halves.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──complete──▶ Idle
//!                      │                     ▲
//!                      └──────clear──────────┘
//! ```
//!
//! Every request is tagged with a [`RequestId`]. Only the most recent
//! outstanding request is applied; anything it superseded, or anything that
//! lands after a clear, is dropped.

use log::{debug, error, info};

use crate::api::{QueryError, Transport};
use crate::conversation::Conversation;
use crate::models::Turn;

/// Monotonic tag assigned when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A request the caller must send, then report back via `complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// What `complete` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// An AI turn was appended.
    Replied,
    /// The error slot was set.
    Failed,
    /// The request was no longer current; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct Controller {
    conversation: Conversation,
    request: RequestState,
    last_issued: u64,
    outstanding: Option<RequestId>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub const fn is_loading(&self) -> bool {
        self.request.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.request.error.as_deref()
    }

    pub const fn phase(&self) -> Phase {
        if self.request.is_loading {
            Phase::Submitting
        } else {
            Phase::Idle
        }
    }

    /// Records the user's turn and returns the request to issue.
    ///
    /// Whitespace-only input is ignored and yields `None`.
    pub fn submit(&mut self, raw_input: &str) -> Option<PendingRequest> {
        let prompt = raw_input.trim();
        if prompt.is_empty() {
            return None;
        }

        self.conversation.append(Turn::user(prompt));
        self.request.is_loading = true;
        self.request.error = None;

        self.last_issued += 1;
        let id = RequestId(self.last_issued);
        self.outstanding = Some(id);

        info!(
            "Submitting request {} ({} chars)",
            id.value(),
            prompt.chars().count()
        );

        Some(PendingRequest {
            id,
            prompt: prompt.to_string(),
        })
    }

    /// Applies the outcome of request `id`. Loading is cleared last.
    pub fn complete(&mut self, id: RequestId, result: Result<String, QueryError>) -> Completion {
        if self.outstanding != Some(id) {
            debug!("Discarding stale response for request {}", id.value());
            return Completion::Stale;
        }
        self.outstanding = None;

        let completion = match result {
            Ok(reply) => {
                self.conversation.append(Turn::ai(reply));
                Completion::Replied
            }
            Err(err) => {
                error!("Fetch error: {err}");
                self.request.error = Some(err.to_string());
                Completion::Failed
            }
        };

        self.request.is_loading = false;
        completion
    }

    /// Submits `raw_input`, waits on `transport`, and applies the result.
    ///
    /// Returns `None` when the input was blank and nothing was sent.
    pub async fn run<T>(&mut self, raw_input: &str, transport: &T) -> Option<Completion>
    where
        T: Transport + ?Sized,
    {
        let pending = self.submit(raw_input)?;
        let result = transport.query(&pending.prompt).await;
        Some(self.complete(pending.id, result))
    }

    pub fn clear(&mut self) {
        info!("Clearing conversation ({} turns)", self.conversation.len());
        self.conversation.clear();
        self.request = RequestState::default();
        self.outstanding = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::models::Sender;

    fn replying(reply: &'static str) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_query()
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(reply.to_string()) }));
        transport
    }

    fn failing(err: QueryError) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_query()
            .times(1)
            .returning(move |_| {
                let err = err.clone();
                Box::pin(async move { Err(err) })
            });
        transport
    }

    #[test]
    fn test_new_controller_is_idle() {
        let controller = Controller::new();
        assert!(controller.conversation().is_empty());
        assert!(!controller.is_loading());
        assert_eq!(controller.error(), None);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_whitespace_submit_is_noop() {
        let mut controller = Controller::new();
        for input in ["", "   ", "\n\t  \r\n"] {
            assert!(controller.submit(input).is_none());
        }
        assert!(controller.conversation().is_empty());
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_whitespace_submit_keeps_previous_error() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        controller.complete(pending.id, Err(QueryError::Status(502)));

        assert!(controller.submit("  ").is_none());
        assert!(controller.error().is_some());
    }

    #[test]
    fn test_submit_appends_trimmed_user_turn_before_request() {
        let mut controller = Controller::new();
        let pending = controller.submit("  how are you?  \n").unwrap();

        assert_eq!(pending.prompt, "how are you?");
        assert_eq!(controller.conversation().len(), 1);
        let turn = controller.conversation().last().unwrap();
        assert_eq!(turn.sender(), Sender::User);
        assert_eq!(turn.text(), "how are you?");
        assert!(controller.is_loading());
        assert_eq!(controller.phase(), Phase::Submitting);
    }

    #[test]
    fn test_submit_clears_previous_error() {
        let mut controller = Controller::new();
        let first = controller.submit("one").unwrap();
        controller.complete(first.id, Err(QueryError::Status(500)));
        assert!(controller.error().is_some());

        controller.submit("two").unwrap();
        assert_eq!(controller.error(), None);
    }

    #[test]
    fn test_success_appends_ai_turn() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        let completion = controller.complete(pending.id, Ok("Hello".to_string()));

        assert_eq!(completion, Completion::Replied);
        assert_eq!(controller.conversation().len(), 2);
        let turn = controller.conversation().last().unwrap();
        assert_eq!(turn.sender(), Sender::Ai);
        assert_eq!(turn.text(), "Hello");
        assert_eq!(controller.error(), None);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_status_failure_sets_error() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        let completion = controller.complete(pending.id, Err(QueryError::Status(500)));

        assert_eq!(completion, Completion::Failed);
        assert_eq!(
            controller.error(),
            Some("Sorry, we couldn't connect. The server responded with status: 500")
        );
        assert_eq!(controller.conversation().len(), 1);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        controller.complete(pending.id, Err(QueryError::Transport("offline".to_string())));
        controller.submit("again").unwrap();

        controller.clear();
        assert_eq!(controller.request, RequestState::default());
        assert!(controller.conversation().is_empty());

        controller.clear();
        assert!(controller.conversation().is_empty());
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_clear_after_failure_unsets_error() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        controller.complete(pending.id, Err(QueryError::Backend("rate limited".to_string())));
        assert_eq!(controller.error(), Some("rate limited"));

        controller.clear();
        assert_eq!(controller.error(), None);
        assert!(!controller.is_loading());
        assert!(controller.conversation().is_empty());
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_clear_with_error_and_request_in_flight() {
        let mut controller = Controller::new();
        let first = controller.submit("hi").unwrap();
        let second = controller.submit("again").unwrap();
        controller.complete(second.id, Err(QueryError::Status(500)));
        assert!(controller.error().is_some());

        // `first` has not come back yet
        controller.clear();
        assert_eq!(controller.error(), None);
        assert!(!controller.is_loading());
        assert!(controller.conversation().is_empty());

        assert_eq!(
            controller.complete(first.id, Err(QueryError::Status(502))),
            Completion::Stale
        );
        assert_eq!(controller.error(), None);
        assert!(controller.conversation().is_empty());
    }

    #[test]
    fn test_response_after_clear_is_discarded() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        controller.clear();

        let completion = controller.complete(pending.id, Ok("late".to_string()));
        assert_eq!(completion, Completion::Stale);
        assert!(controller.conversation().is_empty());
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut controller = Controller::new();
        let first = controller.submit("first").unwrap();
        let second = controller.submit("second").unwrap();
        assert!(second.id > first.id);

        assert_eq!(
            controller.complete(first.id, Ok("old".to_string())),
            Completion::Stale
        );
        assert!(controller.is_loading());
        assert_eq!(controller.conversation().len(), 2);

        assert_eq!(
            controller.complete(second.id, Ok("new".to_string())),
            Completion::Replied
        );
        assert!(!controller.is_loading());
        assert_eq!(controller.conversation().last().unwrap().text(), "new");
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut controller = Controller::new();
        let pending = controller.submit("hi").unwrap();
        controller.complete(pending.id, Ok("once".to_string()));
        assert_eq!(
            controller.complete(pending.id, Ok("twice".to_string())),
            Completion::Stale
        );
        assert_eq!(controller.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_run_sends_trimmed_prompt_once() {
        let mut transport = MockTransport::new();
        transport
            .expect_query()
            .withf(|prompt: &str| prompt == "Hello there")
            .times(1)
            .returning(|_| Box::pin(async { Ok("G'day".to_string()) }));

        let mut controller = Controller::new();
        let completion = controller.run("  Hello there ", &transport).await;

        assert_eq!(completion, Some(Completion::Replied));
        assert_eq!(controller.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_run_with_blank_input_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_query().times(0);

        let mut controller = Controller::new();
        assert_eq!(controller.run(" \t ", &transport).await, None);
        assert!(controller.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_run_success() {
        let mut controller = Controller::new();
        controller.run("hi", &replying("Hello")).await;

        let texts: Vec<&str> = controller
            .conversation()
            .turns()
            .iter()
            .map(Turn::text)
            .collect();
        assert_eq!(texts, vec!["hi", "Hello"]);
        assert_eq!(controller.error(), None);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_run_application_error() {
        let mut controller = Controller::new();
        let completion = controller
            .run("hi", &failing(QueryError::Backend("rate limited".to_string())))
            .await;

        assert_eq!(completion, Some(Completion::Failed));
        assert_eq!(controller.error(), Some("rate limited"));
        assert_eq!(controller.conversation().len(), 1);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_run_transport_error() {
        let mut controller = Controller::new();
        controller
            .run("hi", &failing(QueryError::Transport("connection refused".to_string())))
            .await;

        assert_eq!(controller.error(), Some("connection refused"));
        assert!(!controller.is_loading());
    }
}
