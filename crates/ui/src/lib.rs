#![deny(unsafe_code)]

/// Desktop shell hosting the chat and navigator pages.
pub mod app;
/// Chat page: transcript, composer and the widget driver glue.
pub mod chat;
pub mod navigator;
/// Settings persistence.
pub mod settings;
