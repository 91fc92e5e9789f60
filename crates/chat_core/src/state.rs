use std::collections::VecDeque;

use crate::view_model::ChatViewModel;

pub type ExchangeId = u64;

/// How in-flight stage requests are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusStyle {
    /// A typing indicator until the stage answers.
    #[default]
    TypingIndicator,
    /// Status bubbles. Only "Validating question..." is replaced by the
    /// outcome; the refining and similarity notices stay in the transcript.
    StatusText,
    /// Nothing.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Validating,
    Refining,
    CheckingSimilarity,
}

impl StatusKind {
    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Validating => "Validating question...",
            StatusKind::Refining => "Refining question...",
            StatusKind::CheckingSimilarity => "Checking for similar questions...",
        }
    }

    pub fn activity(self) -> &'static str {
        match self {
            StatusKind::Validating => "validating",
            StatusKind::Refining => "refining",
            StatusKind::CheckingSimilarity => "checking similarity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
    /// Transient; replaced by the next outcome.
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub author: Author,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarLine {
    pub question: String,
    /// Already formatted for display.
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    status_style: StatusStyle,
    input: String,
    bubbles: Vec<Bubble>,
    typing: bool,
    in_flight: Option<ExchangeId>,
    /// Sent while an exchange was in flight, oldest first.
    queued: VecDeque<String>,
    last_exchange_id: ExchangeId,
    quit_requested: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_style(status_style: StatusStyle) -> Self {
        Self {
            status_style,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ChatViewModel {
        ChatViewModel {
            bubbles: self.bubbles.clone(),
            input: self.input.clone(),
            typing: self.typing,
            busy: self.in_flight.is_some(),
            queued: self.queued.len(),
            should_exit: self.quit_requested
                && self.in_flight.is_none()
                && self.queued.is_empty(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn in_flight(&self) -> Option<ExchangeId> {
        self.in_flight
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.dirty = true;
        }
    }

    /// Empties the input box and returns what it held.
    pub(crate) fn take_input(&mut self) -> String {
        self.dirty = true;
        std::mem::take(&mut self.input)
    }

    /// Marks a new exchange as in flight.
    pub(crate) fn begin_exchange(&mut self) -> ExchangeId {
        self.last_exchange_id += 1;
        self.in_flight = Some(self.last_exchange_id);
        self.dirty = true;
        self.last_exchange_id
    }

    pub(crate) fn enqueue(&mut self, text: String) {
        self.queued.push_back(text);
        self.dirty = true;
    }

    pub(crate) fn next_queued(&mut self) -> Option<String> {
        self.queued.pop_front()
    }

    pub(crate) fn end_exchange(&mut self) {
        self.settle_status();
        self.in_flight = None;
        self.dirty = true;
    }

    pub(crate) fn request_quit(&mut self) {
        if !self.quit_requested {
            self.quit_requested = true;
            self.dirty = true;
        }
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.push(Author::User, text.into());
    }

    /// Appends a bot bubble in place of any pending status.
    pub(crate) fn push_bot(&mut self, text: impl Into<String>) {
        self.settle_status();
        self.push(Author::Bot, text.into());
    }

    pub(crate) fn show_status(&mut self, kind: StatusKind) {
        match self.status_style {
            StatusStyle::TypingIndicator => {
                if !self.typing {
                    self.typing = true;
                    self.dirty = true;
                }
            }
            StatusStyle::StatusText if kind == StatusKind::Validating => {
                self.settle_status();
                self.push(Author::Status, kind.label().to_string());
            }
            StatusStyle::StatusText => self.push_bot(kind.label()),
            StatusStyle::Hidden => {}
        }
    }

    fn settle_status(&mut self) {
        if self.typing {
            self.typing = false;
            self.dirty = true;
        }
        if matches!(self.bubbles.last(), Some(bubble) if bubble.author == Author::Status) {
            self.bubbles.pop();
            self.dirty = true;
        }
    }

    fn push(&mut self, author: Author, text: String) {
        self.bubbles.push(Bubble { author, text });
        self.dirty = true;
    }
}
