pub mod message_input;
pub mod message_list;
pub mod scroll_manager;
pub mod view;

use std::sync::Arc;

use haven_chat::{ChatResult, ChatWidget, HttpChatClient};

pub use message_input::{MessageInput, Submit};
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use view::ChatView;

use crate::settings::HavenSettings;

/// Builds the single chat widget the app shares between its views.
pub fn build_chat_widget(settings: &HavenSettings) -> ChatResult<ChatWidget> {
    let client = HttpChatClient::new(settings.server_url.clone(), settings.request_timeout())?;
    tracing::info!(
        server_url = client.base_url(),
        failure_display = ?settings.failure_display(),
        "chat client ready"
    );

    Ok(ChatWidget::new(Arc::new(client), settings.chat_config()))
}
