use gpui::*;
use gpui_component::Root;
use tracing_subscriber::EnvFilter;

use haven::app::{HavenShell, Quit, ShowChat, ShowNavigator, ToggleTheme};
use haven::chat::build_chat_widget;
use haven::settings::SettingsState;

/// Boots logging, gpui, the tokio bridge and the component library, builds the
/// one chat widget from settings and opens the shell window.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Must run before any Root is created.
        gpui_component::init(cx);

        let settings_state = SettingsState::new(cx);
        let settings = settings_state.read(cx).settings();
        settings.apply_theme(None, cx);

        let widget = match build_chat_widget(&settings) {
            Ok(widget) => widget,
            Err(error) => {
                tracing::error!(%error, "chat client could not be created");
                cx.quit();
                return;
            }
        };

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("secondary-q", Quit, None),
            KeyBinding::new("secondary-1", ShowChat, None),
            KeyBinding::new("secondary-2", ShowNavigator, None),
            KeyBinding::new("secondary-shift-t", ToggleTheme, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1240.), px(760.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Haven".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                cx.open_window(options, |window, cx| {
                    let shell =
                        cx.new(|cx| HavenShell::new(widget, settings_state, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });
}
