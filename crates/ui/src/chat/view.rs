use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use gpui_tokio_bridge::Tokio;
use haven_chat::{ChatSnapshot, ChatWidget};

use crate::chat::message_input::{MessageInput, Submit};
use crate::chat::message_list::MessageList;

/// Chat page. Drives the shared [`ChatWidget`] on the tokio runtime and mirrors
/// every published snapshot into the list and composer.
pub struct ChatView {
    widget: ChatWidget,
    snapshot: ChatSnapshot,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    send_task: Option<Task<()>>,
    resources_task: Option<Task<()>>,
    _snapshot_reader: Task<()>,
}

impl ChatView {
    pub fn new(widget: ChatWidget, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let snapshot = widget.snapshot();
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        message_list.update(cx, |list, cx| list.set_snapshot(&snapshot, cx));

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &Submit, window, cx| {
                this.handle_submit(event, window, cx);
            },
        )
        .detach();

        let snapshot_reader = Self::spawn_snapshot_reader(&widget, window, cx);

        Self {
            widget,
            snapshot,
            message_list,
            message_input,
            send_task: None,
            resources_task: None,
            _snapshot_reader: snapshot_reader,
        }
    }

    pub fn focus_input(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.message_input
            .update(cx, |input, cx| input.focus(window, cx));
    }

    fn is_sending(&self) -> bool {
        self.send_task.is_some() || self.snapshot.input.loading
    }

    fn spawn_snapshot_reader(
        widget: &ChatWidget,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Task<()> {
        let mut snapshots = widget.subscribe();

        cx.spawn_in(window, async move |this, cx| {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                let applied = this.update_in(cx, |this, window, cx| {
                    this.apply_snapshot(snapshot, window, cx);
                });
                if applied.is_err() {
                    break;
                }
            }
        })
    }

    fn apply_snapshot(&mut self, snapshot: ChatSnapshot, window: &mut Window, cx: &mut Context<Self>) {
        let unlocked = !self.snapshot.input.enabled && snapshot.input.enabled;

        self.message_list
            .update(cx, |list, cx| list.set_snapshot(&snapshot, cx));
        self.message_input.update(cx, |input, cx| {
            input.set_enabled(snapshot.input.enabled, cx);
            if unlocked && snapshot.input.focused {
                input.focus(window, cx);
            }
        });

        self.snapshot = snapshot;
        cx.notify();
    }

    fn handle_submit(&mut self, event: &Submit, window: &mut Window, cx: &mut Context<Self>) {
        // A rejected submit leaves the text in the composer.
        if self.is_sending() {
            return;
        }
        let Some(pending) = self.widget.submit(event.content.clone()) else {
            return;
        };

        self.message_input.update(cx, |input, cx| {
            input.clear(window, cx);
            input.set_enabled(false, cx);
        });

        let widget = self.widget.clone();
        let send = Tokio::spawn(cx, async move { widget.deliver(pending).await });

        self.send_task = Some(cx.spawn(async move |this, cx| {
            match send.await {
                Ok(report) => tracing::debug!(?report, "chat send finished"),
                Err(error) => tracing::error!(?error, "chat send task did not complete"),
            }

            let _ = this.update(cx, |this, cx| {
                this.send_task = None;
                cx.notify();
            });
        }));
    }

    fn request_crisis_resources(&mut self, cx: &mut Context<Self>) {
        if self.resources_task.is_some() {
            return;
        }

        let widget = self.widget.clone();
        let fetch = Tokio::spawn(cx, async move { widget.fetch_crisis_resources().await });

        self.resources_task = Some(cx.spawn(async move |this, cx| {
            if let Err(error) = fetch.await {
                tracing::error!(?error, "crisis directory task did not complete");
            }

            let _ = this.update(cx, |this, cx| {
                this.resources_task = None;
                cx.notify();
            });
        }));
        cx.notify();
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("chat-view-header")
                    .flex_shrink_0()
                    .w_full()
                    .px_4()
                    .py_2()
                    .justify_between()
                    .items_center()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(theme.foreground)
                            .child("Support chat"),
                    )
                    .child(
                        Button::new("crisis-resources")
                            .small()
                            .danger()
                            .child("🆘 Crisis resources")
                            .disabled(self.resources_task.is_some())
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.request_crisis_resources(cx);
                            })),
                    ),
            )
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
