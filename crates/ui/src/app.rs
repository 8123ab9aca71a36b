use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable, ThemeMode,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use haven_chat::ChatWidget;
use haven_navigator::StreetSafetyNavigator;

use crate::chat::ChatView;
use crate::navigator::NavigatorView;
use crate::settings::{SettingsChanged, SettingsState};

gpui::actions!(haven, [ShowChat, ShowNavigator, ToggleTheme, Quit]);

/// Top-level page shown in the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Chat,
    Navigator,
}

impl Page {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Navigator => "Street Navigator",
        }
    }
}

/// Shell with a toolbar that switches between the chat and navigator pages.
pub struct HavenShell {
    page: Page,
    chat_view: Entity<ChatView>,
    navigator_view: Entity<NavigatorView>,
    settings_state: Entity<SettingsState>,
}

impl HavenShell {
    pub fn new(
        widget: ChatWidget,
        settings_state: Entity<SettingsState>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(widget, window, cx));
        let navigator_view = cx.new(|cx| NavigatorView::new(StreetSafetyNavigator::new(), cx));

        cx.subscribe_in(
            &settings_state,
            window,
            |_, _, event: &SettingsChanged, window, cx| {
                event.settings.apply_theme(Some(window), cx);
                cx.refresh_windows();
            },
        )
        .detach();

        chat_view.update(cx, |chat_view, cx| chat_view.focus_input(window, cx));

        Self {
            page: Page::Chat,
            chat_view,
            navigator_view,
            settings_state,
        }
    }

    fn show_page(&mut self, page: Page, window: &mut Window, cx: &mut Context<Self>) {
        if self.page == page {
            return;
        }

        self.page = page;
        match page {
            Page::Chat => self
                .chat_view
                .update(cx, |chat_view, cx| chat_view.focus_input(window, cx)),
            Page::Navigator => self.navigator_view.read(cx).focus(window),
        }
        tracing::debug!(page = page.title(), "switched page");
        cx.notify();
    }

    fn toggle_theme(&mut self, cx: &mut Context<Self>) {
        let current = self.settings_state.read(cx).settings();
        let next_mode = if current.theme_mode.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        let next = (*current).clone().with_theme_mode(next_mode);

        let saved = self
            .settings_state
            .update(cx, |state, cx| state.update_settings(next, cx));
        if let Err(error) = saved {
            tracing::error!(%error, "failed to save theme preference");
        }
    }

    fn render_top_bar(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let theme_icon = if theme.mode.is_dark() {
            IconName::Sun
        } else {
            IconName::Moon
        };
        let tab = |page: Page| {
            Button::new(page.title())
                .small()
                .when(self.page == page, |button| button.primary())
                .when(self.page != page, |button| button.ghost())
                .child(page.title())
                .on_click(cx.listener(move |this, _, window, cx| {
                    this.show_page(page, window, cx);
                }))
        };

        h_flex()
            .id("app-top-bar")
            .w_full()
            .flex_shrink_0()
            .px_4()
            .py_2()
            .gap_2()
            .items_center()
            .justify_between()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .child(
                        div()
                            .mr_2()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(theme.foreground)
                            .child("Haven"),
                    )
                    .child(tab(Page::Chat))
                    .child(tab(Page::Navigator)),
            )
            .child(
                Button::new("toggle-theme")
                    .ghost()
                    .small()
                    .icon(theme_icon)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.toggle_theme(cx);
                    })),
            )
    }
}

impl Render for HavenShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let content = match self.page {
            Page::Chat => self.chat_view.clone().into_any_element(),
            Page::Navigator => self.navigator_view.clone().into_any_element(),
        };

        v_flex()
            .id("haven-shell")
            .size_full()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &ShowChat, window, cx| {
                this.show_page(Page::Chat, window, cx);
            }))
            .on_action(cx.listener(|this, _: &ShowNavigator, window, cx| {
                this.show_page(Page::Navigator, window, cx);
            }))
            .on_action(cx.listener(|this, _: &ToggleTheme, _window, cx| {
                this.toggle_theme(cx);
            }))
            .child(self.render_top_bar(cx))
            .child(
                div()
                    .id("main-content")
                    .flex_1()
                    .min_h_0()
                    .overflow_hidden()
                    .child(content),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_is_the_landing_page() {
        assert_eq!(Page::default(), Page::Chat);
        assert_eq!(Page::Navigator.title(), "Street Navigator");
    }
}
