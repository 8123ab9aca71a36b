/// Who authored a chat bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Text shown in the avatar slot next to the bubble.
    pub const fn avatar(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Bot => "🧠",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// One rendered chat bubble. Lives only as long as the widget does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub sender: Sender,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            content: content.into(),
            sender,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Bot)
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
