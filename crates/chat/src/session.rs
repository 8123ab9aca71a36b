use crate::crisis::{CRISIS_FOLLOW_UP_DELAY, CRISIS_RESOURCES, CrisisAlert, contains_crisis_keywords};
use crate::error::ChatResult;
use crate::message::{Message, Sender};

pub const FALLBACK_APOLOGY: &str = "I apologize, but I'm having trouble connecting right now. \
Please try again in a moment, or reach out to a mental health professional if you need immediate support.";

/// How a failed exchange is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureDisplay {
    /// Every failure, server-reported or not, shows [`FALLBACK_APOLOGY`].
    #[default]
    Fallback,
    /// Server-reported errors show their own text; transport failures still apologize.
    SurfaceServerErrors,
}

/// Input controls: draft text, enabled flag, focus and the loading indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub draft: String,
    pub enabled: bool,
    pub focused: bool,
    pub loading: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            draft: String::new(),
            enabled: true,
            focused: true,
            loading: false,
        }
    }
}

/// Everything a renderer needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub welcome_visible: bool,
    pub input: InputState,
}

impl Default for ChatSnapshot {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            welcome_visible: true,
            input: InputState::default(),
        }
    }
}

/// A user message that was accepted and now needs one network exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub message: String,
    pub crisis: Option<CrisisAlert>,
}

/// Synchronous chat state. All mutation happens here; async orchestration
/// lives in [`crate::ChatWidget`].
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    state: ChatSnapshot,
    crisis_delay: Option<std::time::Duration>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_crisis_delay(mut self, delay: std::time::Duration) -> Self {
        self.crisis_delay = Some(delay);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn welcome_visible(&self) -> bool {
        self.state.welcome_visible
    }

    pub fn input(&self) -> &InputState {
        &self.state.input
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.state.clone()
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.state.input.draft = draft.into();
    }

    /// Appends a bubble, then runs crisis detection on it.
    pub fn add_message(&mut self, content: impl Into<String>, sender: Sender) -> Option<CrisisAlert> {
        self.append(Message::new(content, sender));
        self.state
            .messages
            .last()
            .and_then(|message| self.crisis_follow_up(message))
    }

    pub fn push_crisis_resources(&mut self) {
        self.append(Message::bot(CRISIS_RESOURCES));
    }

    /// Accepts the trimmed draft, or returns `None` when it is blank or a request
    /// is already pending.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if !self.state.input.enabled {
            return None;
        }

        let message = self.state.input.draft.trim().to_string();
        if message.is_empty() {
            return None;
        }

        let crisis = self.add_message(message.clone(), Sender::User);
        self.state.input.draft.clear();
        self.set_locked(true);

        Some(PendingSend { message, crisis })
    }

    /// Takes `content` as the draft and accepts it in one step. While a request
    /// is pending the current draft is left as it was and `None` is returned.
    pub fn submit(&mut self, content: impl Into<String>) -> Option<PendingSend> {
        if !self.state.input.enabled {
            return None;
        }

        self.state.input.draft = content.into();
        self.begin_send()
    }

    /// Renders the outcome of the exchange and unlocks input.
    pub fn finish_send(&mut self, outcome: &ChatResult<String>, display: FailureDisplay) {
        let text = match outcome {
            Ok(response) => response.clone(),
            Err(error) => match (display, error.server_message()) {
                (FailureDisplay::SurfaceServerErrors, Some(message)) => message.to_string(),
                _ => FALLBACK_APOLOGY.to_string(),
            },
        };

        self.add_message(text, Sender::Bot);
        self.set_locked(false);
    }

    fn append(&mut self, message: Message) {
        self.state.welcome_visible = false;
        self.state.messages.push(message);
    }

    fn crisis_follow_up(&self, message: &Message) -> Option<CrisisAlert> {
        if message.is_user() && contains_crisis_keywords(&message.content) {
            Some(CrisisAlert {
                delay: self.crisis_delay.unwrap_or(CRISIS_FOLLOW_UP_DELAY),
            })
        } else {
            None
        }
    }

    fn set_locked(&mut self, locked: bool) {
        let input = &mut self.state.input;
        input.loading = locked;
        input.enabled = !locked;
        // Focus returns to the input whenever it is unlocked.
        input.focused = !locked;
    }
}
