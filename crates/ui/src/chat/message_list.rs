use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};
use haven_chat::{ChatSnapshot, Message, Sender};

use crate::chat::scroll_manager::ScrollManager;

pub const WELCOME_TITLE: &str = "Welcome to Haven 💙";
pub const WELCOME_BODY: &str = "This is a safe, judgment-free space. Tell me how you're \
feeling today, and we can talk it through together.";
pub const LOADING_LABEL: &str = "Thinking...";

const BUBBLE_MAX_WIDTH: Pixels = px(540.);
const AVATAR_SIZE: Pixels = px(32.);

/// Transcript view. Mirrors the latest [`ChatSnapshot`] it was handed.
pub struct MessageList {
    messages: Vec<Message>,
    welcome_visible: bool,
    loading: bool,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            welcome_visible: true,
            loading: false,
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn set_snapshot(&mut self, snapshot: &ChatSnapshot, cx: &mut Context<Self>) {
        let grew = snapshot.messages.len() > self.messages.len()
            || (snapshot.input.loading && !self.loading);
        let user_sent = snapshot.messages.len() > self.messages.len()
            && snapshot.messages.last().is_some_and(Message::is_user);

        self.messages = snapshot.messages.clone();
        self.welcome_visible = snapshot.welcome_visible;
        self.loading = snapshot.input.loading;

        if user_sent {
            self.scroll_manager.request_scroll_to_bottom();
        } else if grew {
            self.scroll_manager.content_grew();
        }
        cx.notify();
    }

    fn render_welcome(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .id("welcome-message")
            .w_full()
            .items_center()
            .gap_2()
            .p_6()
            .rounded_lg()
            .bg(theme.muted)
            .child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child(WELCOME_TITLE),
            )
            .child(
                div()
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child(WELCOME_BODY),
            )
            .into_any_element()
    }

    fn render_message_row(&self, index: usize, message: &Message, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let is_user = message.is_user();

        let avatar = div()
            .flex_shrink_0()
            .size(AVATAR_SIZE)
            .rounded_full()
            .flex()
            .items_center()
            .justify_center()
            .text_xs()
            .when(is_user, |avatar| {
                avatar
                    .bg(theme.primary)
                    .text_color(theme.primary_foreground)
            })
            .when(!is_user, |avatar| avatar.bg(theme.secondary))
            .child(message.sender.avatar());

        let (bubble_bg, bubble_fg) = match message.sender {
            Sender::User => (theme.accent, theme.accent_foreground),
            Sender::Bot => (theme.muted, theme.foreground),
        };
        let bubble = div()
            .max_w(BUBBLE_MAX_WIDTH)
            .px_3()
            .py_2()
            .rounded_lg()
            .bg(bubble_bg)
            .text_color(bubble_fg)
            .text_sm()
            .child(message.content.clone());

        h_flex()
            .id(("message", index))
            .w_full()
            .gap_2()
            .items_start()
            .when(is_user, |row| row.flex_row_reverse())
            .child(avatar)
            .child(bubble)
            .into_any_element()
    }

    fn render_loading(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("loading")
            .gap_2()
            .items_center()
            .child(div().size(px(8.)).rounded_full().bg(theme.primary))
            .child(
                Label::new(LOADING_LABEL)
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        let cx: &Context<Self> = cx;
        let rows = self
            .messages
            .iter()
            .enumerate()
            .map(|(index, message)| self.render_message_row(index, message, cx))
            .collect::<Vec<_>>();

        div()
            .id("chatMessages")
            .size_full()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .child(
                v_flex()
                    .w_full()
                    .gap_3()
                    .p_4()
                    .when(self.welcome_visible, |list| list.child(self.render_welcome(cx)))
                    .children(rows)
                    .when(self.loading, |list| list.child(self.render_loading(cx))),
            )
    }
}
