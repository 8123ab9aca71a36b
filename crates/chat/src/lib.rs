#![deny(unsafe_code)]

//! Chat domain for the support widget: message model, crisis detection,
//! the `/chat` HTTP client, and the session/widget pair that drives input gating.

mod client;
mod crisis;
mod error;
mod message;
mod session;
mod widget;

pub use client::{
    BoxFuture, CHAT_PATH, CRISIS_RESOURCES_PATH, ChatClient, ChatReply, ChatRequest, CrisisDirectory,
    CrisisLine, HttpChatClient,
};
pub use crisis::{
    CRISIS_FOLLOW_UP_DELAY, CRISIS_KEYWORDS, CRISIS_RESOURCES, CrisisAlert, contains_crisis_keywords,
};
pub use error::{ChatError, ChatResult};
pub use message::{Message, Sender};
pub use session::{ChatSession, ChatSnapshot, FALLBACK_APOLOGY, FailureDisplay, InputState, PendingSend};
pub use widget::{ChatConfig, ChatWidget, SendReport};
