use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};

pub const INPUT_PLACEHOLDER: &str = "Share what's on your mind...";

/// Emitted when the user submits a non-blank draft. The composer keeps its text
/// until the listener accepts the submission and clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

/// Composer. Enter submits, Shift+Enter inserts a newline.
pub struct MessageInput {
    input_state: Entity<InputState>,
    enabled: bool,
    pending_newline: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(INPUT_PLACEHOLDER)
                .auto_grow(1, 6)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { secondary } = event {
                    if *secondary {
                        this.pending_newline = false;
                        return;
                    }

                    if this.pending_newline {
                        // Shift+Enter already inserted the newline; the PressEnter that
                        // follows must not submit.
                        this.pending_newline = false;
                    } else {
                        this.trim_trailing_newline(window, cx);
                        this.handle_submit(cx);
                    }
                }
            },
        )
        .detach();

        Self {
            input_state,
            enabled: true,
            pending_newline: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool, cx: &mut Context<Self>) {
        self.enabled = enabled;
        if !enabled {
            self.pending_newline = false;
        }
        cx.notify();
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| state.focus(window, cx));
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.pending_newline = false;
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.enabled {
            return;
        }

        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        if !self.enabled {
            return;
        }

        let content = self.input_state.read(cx).value().to_string();
        if content.trim().is_empty() {
            return;
        }

        cx.emit(Submit { content });
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let enabled = self.enabled;

        v_flex().id("messageInput").bg(theme.background).p_3().child(
            h_flex()
                .w_full()
                .gap_2()
                .items_end()
                .child(
                    div()
                        .flex_1()
                        .min_w_0()
                        .px_3()
                        .py_2()
                        .rounded_lg()
                        .border_1()
                        .border_color(theme.border)
                        .bg(theme.background)
                        .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                            if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                                this.handle_shift_enter(window, cx);
                            }
                        }))
                        .child(Input::new(&self.input_state).w_full().disabled(!enabled)),
                )
                .child(
                    Button::new("sendButton")
                        .small()
                        .primary()
                        .icon(IconName::ArrowUp)
                        .child("Send")
                        .disabled(!enabled)
                        .on_click(cx.listener(|this, _, _window, cx| {
                            this.handle_submit(cx);
                        })),
                ),
        )
    }
}
