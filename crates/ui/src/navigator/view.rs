use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use haven_navigator::{
    Direction, INITIAL_PROMPT_BODY, INITIAL_PROMPT_TITLE, MAP_HEIGHT, MAP_WIDTH, MoveOutcome,
    STREET_COUNT, SafetyPanel, SafetyTier, StreetSafetyNavigator,
};

const MARKER_SIZE: f32 = 16.;
const PANEL_WIDTH: Pixels = px(320.);

/// Street safety page: the map, the safety panel and the movement controls.
pub struct NavigatorView {
    navigator: StreetSafetyNavigator,
    focus_handle: FocusHandle,
}

impl NavigatorView {
    pub fn new(navigator: StreetSafetyNavigator, cx: &mut Context<Self>) -> Self {
        Self {
            navigator,
            focus_handle: cx.focus_handle(),
        }
    }

    pub fn focus(&self, window: &mut Window) {
        window.focus(&self.focus_handle);
    }

    fn move_character(&mut self, direction: Direction, cx: &mut Context<Self>) {
        if let MoveOutcome::Moved {
            reveal: Some(reveal),
            ..
        } = self.navigator.move_character(direction)
        {
            tracing::debug!(
                street = %reveal.street,
                tier = %reveal.tier,
                first_visit = reveal.first_visit,
                "entered street"
            );
        }
        cx.notify();
    }

    fn reset_character(&mut self, cx: &mut Context<Self>) {
        self.navigator.reset_character();
        cx.notify();
    }

    fn handle_key_down(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) {
        let Some(direction) = Direction::from_key(&event.keystroke.key) else {
            return;
        };

        self.move_character(direction, cx);
        cx.stop_propagation();
    }

    fn render_map(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let position = self.navigator.position();
        let label = self.navigator.label_position();
        let half_marker = MARKER_SIZE / 2.;

        let streets = self.navigator.streets().iter().map(|street| {
            let bounds = street.bounds();
            let fill = match self.navigator.marking(street.name) {
                Some(SafetyTier::Safe) => theme.success.opacity(0.7),
                Some(SafetyTier::Caution) => theme.warning.opacity(0.7),
                Some(SafetyTier::Unsafe) => theme.danger.opacity(0.7),
                None => theme.muted_foreground.opacity(0.25),
            };

            div()
                .id(SharedString::from(street.name.as_str()))
                .absolute()
                .left(px(bounds.min_x as f32))
                .top(px(bounds.min_y as f32))
                .w(px(bounds.width() as f32))
                .h(px(bounds.height() as f32))
                .bg(fill)
        });

        div()
            .id("street-map")
            .relative()
            .flex_shrink_0()
            .w(px(MAP_WIDTH as f32))
            .h(px(MAP_HEIGHT as f32))
            .overflow_hidden()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.muted)
            .children(streets)
            .child(
                div()
                    .id("character")
                    .absolute()
                    .left(px(position.x as f32 - half_marker))
                    .top(px(position.y as f32 - half_marker))
                    .size(px(MARKER_SIZE))
                    .rounded_full()
                    .border_2()
                    .border_color(theme.background)
                    .bg(theme.primary),
            )
            .child(
                div()
                    .id("character-label")
                    .absolute()
                    .left(px(label.x as f32 - half_marker))
                    .top(px(label.y as f32))
                    .text_xs()
                    .child("🚶"),
            )
    }

    fn render_panel(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let panel = v_flex()
            .id("safetyPanel")
            .w(PANEL_WIDTH)
            .gap_2()
            .p_4()
            .rounded_lg()
            .border_1()
            .bg(theme.background);

        match self.navigator.panel() {
            SafetyPanel::Prompt => panel
                .border_color(theme.border)
                .child(
                    div()
                        .text_lg()
                        .font_weight(FontWeight::SEMIBOLD)
                        .text_color(theme.foreground)
                        .child(INITIAL_PROMPT_TITLE),
                )
                .child(
                    div()
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child(INITIAL_PROMPT_BODY),
                ),
            SafetyPanel::Report(report) => {
                let info = report.info();
                let accent = match report.tier {
                    SafetyTier::Safe => theme.success,
                    SafetyTier::Caution => theme.warning,
                    SafetyTier::Unsafe => theme.danger,
                };

                panel
                    .border_color(accent)
                    .child(
                        div()
                            .text_lg()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(theme.foreground)
                            .child(format!("{} {}", info.icon, report.street)),
                    )
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::MEDIUM)
                            .text_color(accent)
                            .child(report.headline()),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(report.description()),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.foreground)
                            .child(info.tips),
                    )
            }
        }
    }

    fn render_controls(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let direction_button = |direction: Direction, glyph: &'static str| {
            Button::new(direction.label())
                .small()
                .ghost()
                .child(glyph)
                .on_click(cx.listener(move |this, _, window, cx| {
                    this.move_character(direction, cx);
                    this.focus(window);
                }))
        };

        v_flex()
            .id("navigator-controls")
            .gap_2()
            .items_center()
            .child(direction_button(Direction::Up, "↑"))
            .child(
                h_flex()
                    .gap_2()
                    .child(direction_button(Direction::Left, "←"))
                    .child(direction_button(Direction::Down, "↓"))
                    .child(direction_button(Direction::Right, "→")),
            )
            .child(
                Button::new("reset-character")
                    .small()
                    .primary()
                    .child("Reset")
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.reset_character(cx);
                        this.focus(window);
                    })),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(format!(
                        "Visited streets: {} / {STREET_COUNT}",
                        self.navigator.visited().len()
                    )),
            )
    }
}

impl Focusable for NavigatorView {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for NavigatorView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let focused = self.focus_handle.is_focused(window);

        h_flex()
            .id("navigator-view")
            .track_focus(&self.focus_handle)
            .key_context("StreetSafetyNavigator")
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, _window, cx| {
                this.handle_key_down(event, cx);
            }))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, window, _cx| {
                    this.focus(window);
                }),
            )
            .size_full()
            .min_h_0()
            .gap_4()
            .p_4()
            .items_start()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.render_map(cx))
            .child(
                v_flex()
                    .gap_4()
                    .child(self.render_panel(cx))
                    .child(self.render_controls(cx))
                    .when(!focused, |column| {
                        column.child(
                            div()
                                .text_xs()
                                .text_color(theme.muted_foreground)
                                .child("Click the map to use the arrow keys."),
                        )
                    }),
            )
    }
}
