use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::client::{ChatClient, ChatRequest};
use crate::crisis::{CRISIS_FOLLOW_UP_DELAY, CRISIS_RESOURCES, CrisisAlert};
use crate::message::Sender;
use crate::session::{ChatSession, ChatSnapshot, FailureDisplay, PendingSend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatConfig {
    pub crisis_delay: Duration,
    pub failure_display: FailureDisplay,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            crisis_delay: CRISIS_FOLLOW_UP_DELAY,
            failure_display: FailureDisplay::Fallback,
        }
    }
}

/// What happened to one `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendReport {
    /// Blank draft or a request already in flight; nothing was sent.
    Skipped,
    Replied,
    Failed,
}

/// Owned chat widget handle. Clones share the same session, so the renderer and
/// any deferred crisis follow-up all see one transcript.
///
/// Every mutation publishes a fresh [`ChatSnapshot`] on a `watch` channel.
#[derive(Clone)]
pub struct ChatWidget {
    session: Arc<Mutex<ChatSession>>,
    client: Arc<dyn ChatClient>,
    config: ChatConfig,
    snapshots: Arc<watch::Sender<ChatSnapshot>>,
}

impl ChatWidget {
    pub fn new(client: Arc<dyn ChatClient>, config: ChatConfig) -> Self {
        let session = ChatSession::new().with_crisis_delay(config.crisis_delay);
        let (snapshots, _) = watch::channel(session.snapshot());

        Self {
            session: Arc::new(Mutex::new(session)),
            client,
            config,
            snapshots: Arc::new(snapshots),
        }
    }

    pub fn config(&self) -> ChatConfig {
        self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock().snapshot()
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.update(|session| session.set_draft(draft));
    }

    /// Appends one bubble and schedules the crisis follow-up if the text calls for it.
    pub fn add_message(&self, content: impl Into<String>, sender: Sender) {
        let content = content.into();
        if let Some(alert) = self.update(|session| session.add_message(content, sender)) {
            self.schedule_crisis_resources(alert);
        }
    }

    /// Sends the current draft. Exactly one request is issued per accepted draft,
    /// and input is unlocked again whatever the outcome.
    pub async fn send_message(&self) -> SendReport {
        let Some(pending) = self.update(ChatSession::begin_send) else {
            return SendReport::Skipped;
        };

        self.deliver(pending).await
    }

    /// Accepts `content` and locks input right away, without waiting on any
    /// runtime. The caller then drives the exchange with [`Self::deliver`].
    /// Returns `None`, leaving the draft alone, while a request is pending.
    pub fn submit(&self, content: impl Into<String>) -> Option<PendingSend> {
        let content = content.into();
        self.update(|session| session.submit(content))
    }

    /// Runs the network exchange for an accepted message and unlocks input
    /// again whatever the outcome.
    pub async fn deliver(&self, pending: PendingSend) -> SendReport {
        if let Some(alert) = pending.crisis {
            self.schedule_crisis_resources(alert);
        }

        tracing::debug!(
            chars = pending.message.chars().count(),
            "sending chat message"
        );
        let outcome = self
            .client
            .send_message(ChatRequest::new(pending.message))
            .await;

        if let Err(error) = &outcome {
            tracing::error!(
                error = %error,
                server_reported = error.server_message().is_some(),
                "chat exchange failed"
            );
        }

        let display = self.config.failure_display;
        self.update(|session| session.finish_send(&outcome, display));

        match outcome {
            Ok(_) => SendReport::Replied,
            Err(_) => SendReport::Failed,
        }
    }

    /// Asks the server for its crisis directory and posts it as a bot bubble.
    /// Falls back to the built-in resources text when the request fails.
    pub async fn fetch_crisis_resources(&self) {
        let text = match self.client.crisis_resources().await {
            Ok(directory) => directory.to_message_text(),
            Err(error) => {
                tracing::warn!(error = %error, "crisis directory unavailable; using built-in text");
                CRISIS_RESOURCES.to_string()
            }
        };

        self.add_message(text, Sender::Bot);
    }

    fn schedule_crisis_resources(&self, alert: CrisisAlert) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime for the crisis timer; posting resources now");
            self.update(ChatSession::push_crisis_resources);
            return;
        };

        let widget = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(alert.delay).await;
            widget.update(ChatSession::push_crisis_resources);
            tracing::info!("posted crisis resources after keyword match");
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChatSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<T>(&self, mutate: impl FnOnce(&mut ChatSession) -> T) -> T {
        let mut session = self.lock();
        let result = mutate(&mut session);
        self.snapshots.send_replace(session.snapshot());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BoxFuture, CrisisDirectory};
    use crate::error::{ChatError, ChatResult};
    use crate::message::Message;
    use crate::session::FALLBACK_APOLOGY;

    #[derive(Clone, Copy)]
    enum FakeReply {
        Text(&'static str),
        ServerError(&'static str),
        Unreachable,
    }

    struct FakeClient {
        requests: Mutex<Vec<ChatRequest>>,
        reply: FakeReply,
        latency: Duration,
    }

    impl FakeClient {
        fn new(reply: FakeReply) -> Arc<Self> {
            Self::slow(reply, Duration::ZERO)
        }

        fn slow(reply: FakeReply, latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply,
                latency,
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().expect("requests lock").clone()
        }
    }

    impl ChatClient for FakeClient {
        fn send_message<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, ChatResult<String>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }

                match self.reply {
                    FakeReply::Text(text) => Ok(text.to_string()),
                    FakeReply::ServerError(message) => Err(ChatError::ServerReported {
                        stage: "fake",
                        message: message.to_string(),
                    }),
                    FakeReply::Unreachable => Err(ChatError::Status {
                        stage: "fake",
                        status: 503,
                        body: String::new(),
                    }),
                }
            })
        }

        fn crisis_resources<'a>(&'a self) -> BoxFuture<'a, ChatResult<CrisisDirectory>> {
            Box::pin(async move {
                match self.reply {
                    FakeReply::Unreachable => Err(ChatError::Status {
                        stage: "fake",
                        status: 503,
                        body: String::new(),
                    }),
                    _ => Ok(CrisisDirectory {
                        crisis_lines: Vec::new(),
                        resources: vec!["Call a crisis helpline".to_string()],
                    }),
                }
            })
        }
    }

    fn widget_with(client: Arc<FakeClient>) -> ChatWidget {
        ChatWidget::new(client, ChatConfig::default())
    }

    #[tokio::test]
    async fn hello_round_trip_renders_reply_and_unlocks_input() {
        let client = FakeClient::new(FakeReply::Text("Hi there"));
        let widget = widget_with(client.clone());

        widget.set_draft("Hello");
        let report = widget.send_message().await;

        let snapshot = widget.snapshot();
        assert_eq!(report, SendReport::Replied);
        assert_eq!(client.requests(), vec![ChatRequest::new("Hello")]);
        assert_eq!(
            snapshot.messages,
            vec![Message::user("Hello"), Message::bot("Hi there")]
        );
        assert!(snapshot.input.enabled);
        assert!(snapshot.input.focused);
        assert!(!snapshot.input.loading);
        assert_eq!(snapshot.input.draft, "");
    }

    #[tokio::test]
    async fn whitespace_draft_sends_nothing() {
        let client = FakeClient::new(FakeReply::Text("unused"));
        let widget = widget_with(client.clone());

        widget.set_draft(" \n ");
        let report = widget.send_message().await;

        assert_eq!(report, SendReport::Skipped);
        assert!(client.requests().is_empty());
        assert!(widget.snapshot().messages.is_empty());
        assert!(widget.snapshot().welcome_visible);
    }

    #[tokio::test]
    async fn rejected_request_shows_exactly_one_apology() {
        let client = FakeClient::new(FakeReply::Unreachable);
        let widget = widget_with(client.clone());

        widget.set_draft("Hello");
        let report = widget.send_message().await;

        let snapshot = widget.snapshot();
        assert_eq!(report, SendReport::Failed);
        let bot_messages = snapshot
            .messages
            .iter()
            .filter(|message| !message.is_user())
            .collect::<Vec<_>>();
        assert_eq!(bot_messages, vec![&Message::bot(FALLBACK_APOLOGY)]);
        assert!(snapshot.input.enabled);
    }

    #[tokio::test]
    async fn server_reported_error_collapses_to_apology_by_default() {
        let client = FakeClient::new(FakeReply::ServerError("No message provided"));
        let widget = widget_with(client.clone());

        widget.set_draft("Hello");
        widget.send_message().await;

        assert_eq!(
            widget.snapshot().messages.last(),
            Some(&Message::bot(FALLBACK_APOLOGY))
        );
    }

    #[tokio::test]
    async fn server_reported_error_can_be_surfaced() {
        let client = FakeClient::new(FakeReply::ServerError("No message provided"));
        let widget = ChatWidget::new(
            client,
            ChatConfig {
                failure_display: FailureDisplay::SurfaceServerErrors,
                ..ChatConfig::default()
            },
        );

        widget.set_draft("Hello");
        widget.send_message().await;

        assert_eq!(
            widget.snapshot().messages.last(),
            Some(&Message::bot("No message provided"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn crisis_resources_follow_after_delay_when_request_fails() {
        let client = FakeClient::new(FakeReply::Unreachable);
        let widget = widget_with(client.clone());

        widget.set_draft("Some days I want to kill myself");
        widget.send_message().await;

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(
            widget.snapshot().messages,
            vec![
                Message::user("Some days I want to kill myself"),
                Message::bot(FALLBACK_APOLOGY),
            ]
        );

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(
            widget.snapshot().messages.last(),
            Some(&Message::bot(CRISIS_RESOURCES))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn crisis_resources_do_not_wait_for_slow_server() {
        let client = FakeClient::slow(FakeReply::Text("I'm here with you."), Duration::from_secs(5));
        let widget = widget_with(client.clone());

        widget.set_draft("I don't want to live");
        let in_flight = tokio::spawn({
            let widget = widget.clone();
            async move { widget.send_message().await }
        });

        tokio::time::sleep(Duration::from_millis(1_001)).await;
        let snapshot = widget.snapshot();
        assert_eq!(
            snapshot.messages,
            vec![
                Message::user("I don't want to live"),
                Message::bot(CRISIS_RESOURCES),
            ]
        );
        assert!(!snapshot.input.enabled);
        assert!(snapshot.input.loading);

        assert_eq!(in_flight.await.expect("send task"), SendReport::Replied);
        assert_eq!(
            widget.snapshot().messages.last(),
            Some(&Message::bot("I'm here with you."))
        );
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_request_blocks_second_send() {
        let client = FakeClient::slow(FakeReply::Text("ok"), Duration::from_secs(2));
        let widget = widget_with(client.clone());

        widget.set_draft("first");
        let in_flight = tokio::spawn({
            let widget = widget.clone();
            async move { widget.send_message().await }
        });
        tokio::task::yield_now().await;

        widget.set_draft("second");
        assert_eq!(widget.send_message().await, SendReport::Skipped);

        in_flight.await.expect("send task");
        assert_eq!(client.requests(), vec![ChatRequest::new("first")]);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_locks_input_before_delivery_starts() {
        let client = FakeClient::slow(FakeReply::Text("ok"), Duration::from_secs(2));
        let widget = widget_with(client.clone());

        let pending = widget.submit("first").expect("first accepted");
        assert!(!widget.snapshot().input.enabled);
        assert!(client.requests().is_empty());

        assert_eq!(widget.submit("second"), None);

        assert_eq!(widget.deliver(pending).await, SendReport::Replied);
        assert_eq!(client.requests(), vec![ChatRequest::new("first")]);
        assert_eq!(
            widget.snapshot().messages,
            vec![Message::user("first"), Message::bot("ok")]
        );
        assert!(widget.submit("second").is_some());
    }

    #[tokio::test]
    async fn subscribers_observe_every_published_snapshot() {
        let client = FakeClient::new(FakeReply::Text("Hi there"));
        let widget = widget_with(client);
        let mut snapshots = widget.subscribe();
        assert!(snapshots.borrow_and_update().welcome_visible);

        widget.set_draft("Hello");
        widget.send_message().await;

        assert!(snapshots.has_changed().expect("sender alive"));
        let latest = snapshots.borrow_and_update().clone();
        assert_eq!(latest, widget.snapshot());
    }

    #[tokio::test]
    async fn crisis_directory_is_posted_as_one_bubble() {
        let widget = widget_with(FakeClient::new(FakeReply::Text("unused")));
        widget.fetch_crisis_resources().await;

        let messages = widget.snapshot().messages;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("• Call a crisis helpline"));

        let offline = widget_with(FakeClient::new(FakeReply::Unreachable));
        offline.fetch_crisis_resources().await;
        assert_eq!(offline.snapshot().messages, vec![Message::bot(CRISIS_RESOURCES)]);
    }
}
