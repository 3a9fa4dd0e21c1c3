use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::api::{ChatReply, ChatService};
use crate::models::CandidatePreview;

pub const GREETING: &str = "Hi! I'm your AI Talent Assistant. I can help you find the perfect \
    candidates for your job openings. What kind of role are you looking to fill?";

/// Canned prompts that populate the input buffer like manual typing.
pub const QUICK_SUGGESTIONS: [&str; 6] = [
    "I need a video editor for entertainment content",
    "Looking for TikTok content creator",
    "Need operations manager for productivity channel",
    "Urgent: Need experienced video editor ASAP",
    "Looking for creative team player with 3+ years experience",
    "Remote video editor with Adobe Premiere experience",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation. The log is append-only; messages are
/// never edited or removed until the session is torn down.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: i64,
    pub role: Role,
    pub body: String,
    pub candidates: Vec<CandidatePreview>,
    pub sent_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No turn in flight, input enabled.
    Idle,
    /// One request in flight; new submissions are dropped.
    Sending,
}

/// The conversational session: message log, at-most-one-in-flight guard,
/// and the current input buffer. Failures are absorbed into the log as
/// assistant turns; the session always returns to Idle.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: SessionState,
    input: String,
    last_id: i64,
    scroll_requests: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let mut session = Self {
            messages: Vec::new(),
            state: SessionState::Idle,
            input: String::new(),
            last_id: 0,
            scroll_requests: 0,
        };
        session.append(Role::Assistant, GREETING.to_string(), Vec::new());
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == SessionState::Sending
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_input(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    /// Populate the input buffer from a quick suggestion. No transition.
    pub fn apply_suggestion(&mut self, index: usize) {
        if let Some(text) = QUICK_SUGGESTIONS.get(index) {
            self.input = text.to_string();
        }
    }

    /// Ids are timestamp-derived and strictly monotonic, even when several
    /// messages land within the same millisecond.
    fn next_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    fn append(&mut self, role: Role, body: String, candidates: Vec<CandidatePreview>) {
        let id = self.next_id();
        self.messages.push(ChatMessage {
            id,
            role,
            body,
            candidates,
            sent_at: Local::now(),
        });
        // One scroll-to-latest per append, drained by the renderer.
        self.scroll_requests += 1;
    }

    /// Pending scroll-to-latest side effects, cleared on read.
    pub fn drain_scroll_requests(&mut self) -> usize {
        std::mem::take(&mut self.scroll_requests)
    }

    /// Open a turn: append the user message, clear the input, enter
    /// Sending. Returns the text to put on the wire, or None when the
    /// submission is guarded off (empty input or a turn already in
    /// flight).
    pub fn begin_turn(&mut self) -> Option<String> {
        if self.is_sending() || self.input.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        self.append(Role::User, text.clone(), Vec::new());
        self.state = SessionState::Sending;
        Some(text)
    }

    /// Resolve the in-flight turn. Success and failure both append exactly
    /// one assistant message and return the session to Idle; errors never
    /// escape to the caller.
    pub fn resolve_turn(&mut self, outcome: Result<ChatReply>) {
        if !self.is_sending() {
            return;
        }
        match outcome {
            Ok(reply) => self.append(Role::Assistant, reply.message, reply.candidates),
            Err(err) => self.append(
                Role::Assistant,
                format!(
                    "I'm sorry, I'm having trouble connecting to my AI brain right now. \
                     Error: {}. Please make sure the backend server is running and try again.",
                    err
                ),
                Vec::new(),
            ),
        }
        self.state = SessionState::Idle;
    }

    /// Blocking submit: one full turn against the given service.
    pub fn submit(&mut self, service: &dyn ChatService) -> bool {
        let Some(text) = self.begin_turn() else {
            return false;
        };
        let outcome = service.send(&text);
        self.resolve_turn(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;

    struct MockChat {
        sent: RefCell<Vec<String>>,
        reply: Result<ChatReply>,
    }

    impl MockChat {
        fn replying(reply: Result<ChatReply>) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                reply,
            }
        }
    }

    impl ChatService for MockChat {
        fn send(&self, message: &str) -> Result<ChatReply> {
            self.sent.borrow_mut().push(message.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(err) => Err(anyhow!("{}", err)),
            }
        }
    }

    fn preview(rank: u32) -> CandidatePreview {
        CandidatePreview {
            rank: Some(rank),
            name: Some("Ava Chen".to_string()),
            score: Some(0.91),
            location: Some("Singapore, Singapore".to_string()),
            skills: Some("Splice & Dice".to_string()),
            bio: None,
        }
    }

    #[test]
    fn test_new_session_opens_with_greeting() {
        let mut session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.messages()[0].body, GREETING);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.drain_scroll_requests(), 1);
    }

    #[test]
    fn test_empty_input_is_a_noop() {
        let mut session = ChatSession::new();
        session.set_input("   ");
        assert!(session.begin_turn().is_none());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_submit_while_sending_is_a_noop() {
        let mut session = ChatSession::new();
        session.set_input("find me an editor");
        let text = session.begin_turn().unwrap();
        assert_eq!(text, "find me an editor");
        assert!(session.is_sending());
        let log_len = session.messages().len();

        session.set_input("second message");
        assert!(session.begin_turn().is_none());
        assert_eq!(session.messages().len(), log_len);
    }

    #[test]
    fn test_successful_turn_appends_assistant_reply() {
        let service = MockChat::replying(Ok(ChatReply {
            message: "Here are your top matches.".to_string(),
            candidates: vec![preview(1), preview(2)],
        }));
        let mut session = ChatSession::new();
        session.set_input("I need a video editor");

        assert!(session.submit(&service));
        assert_eq!(*service.sent.borrow(), vec!["I need a video editor"]);
        assert_eq!(session.messages().len(), 3);

        let reply = session.messages().last().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.body, "Here are your top matches.");
        assert_eq!(reply.candidates.len(), 2);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_failed_turn_appends_exactly_one_assistant_message() {
        let service = MockChat::replying(Err(anyhow!("AI Chat Service not available")));
        let mut session = ChatSession::new();
        session.set_input("hello");

        assert!(session.submit(&service));
        // greeting + user + one synthetic assistant failure turn
        assert_eq!(session.messages().len(), 3);
        let failure = session.messages().last().unwrap();
        assert_eq!(failure.role, Role::Assistant);
        assert!(failure.body.contains("AI Chat Service not available"));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_message_ids_are_strictly_monotonic() {
        let service = MockChat::replying(Ok(ChatReply {
            message: "ok".to_string(),
            candidates: Vec::new(),
        }));
        let mut session = ChatSession::new();
        for turn in 0..3 {
            session.set_input(format!("turn {}", turn));
            session.submit(&service);
        }
        let ids: Vec<i64> = session.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_suggestion_fills_input_without_transition() {
        let mut session = ChatSession::new();
        session.drain_scroll_requests();
        session.apply_suggestion(1);
        assert_eq!(session.input(), QUICK_SUGGESTIONS[1]);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.drain_scroll_requests(), 0);

        // Out-of-range index leaves the buffer alone.
        session.apply_suggestion(99);
        assert_eq!(session.input(), QUICK_SUGGESTIONS[1]);
    }

    #[test]
    fn test_scroll_request_per_append() {
        let service = MockChat::replying(Ok(ChatReply {
            message: "ok".to_string(),
            candidates: Vec::new(),
        }));
        let mut session = ChatSession::new();
        session.drain_scroll_requests();

        session.set_input("hi");
        session.submit(&service);
        // user append + assistant append
        assert_eq!(session.drain_scroll_requests(), 2);
        assert_eq!(session.drain_scroll_requests(), 0);
    }
}
