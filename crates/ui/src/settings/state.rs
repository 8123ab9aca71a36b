use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use gpui::*;
use gpui_component::{Theme, ThemeMode};
use haven_chat::{CRISIS_FOLLOW_UP_DELAY, ChatConfig, FailureDisplay};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ResultExt, Snafu};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const SETTINGS_DIRECTORY_NAME: &str = "haven";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "HAVEN_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HavenSettings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Unset means the request waits as long as the server takes.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_crisis_delay_ms")]
    pub crisis_delay_ms: u64,
    /// Show the server's own error text instead of the generic apology.
    #[serde(default)]
    pub surface_server_errors: bool,
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
}

impl Default for HavenSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: None,
            crisis_delay_ms: default_crisis_delay_ms(),
            surface_server_errors: false,
            theme_mode: default_theme_mode(),
        }
    }
}

impl HavenSettings {
    pub fn normalized(mut self) -> Self {
        let server_url = self.server_url.trim().trim_end_matches('/');
        self.server_url = if server_url.is_empty() {
            default_server_url()
        } else {
            server_url.to_string()
        };
        self.request_timeout_secs = self.request_timeout_secs.filter(|secs| *secs > 0);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn failure_display(&self) -> FailureDisplay {
        if self.surface_server_errors {
            FailureDisplay::SurfaceServerErrors
        } else {
            FailureDisplay::Fallback
        }
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            crisis_delay: Duration::from_millis(self.crisis_delay_ms),
            failure_display: self.failure_display(),
        }
    }

    pub fn with_theme_mode(mut self, theme_mode: ThemeMode) -> Self {
        self.theme_mode = theme_mode;
        self
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        Theme::change(self.theme_mode, window, cx);
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<HavenSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".haven"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn settings(&self) -> Arc<HavenSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: HavenSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    /// Defaults, then the JSON file when present, then `HAVEN_*` variables.
    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(HavenSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    fn load_from(path: &Path) -> HavenSettings {
        if !path.exists() {
            tracing::debug!(path = ?path, "no settings file, using defaults and environment");
        }

        match Self::figment(path).extract::<HavenSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(path = ?path, %error, "failed to parse settings, using defaults");
                HavenSettings::default()
            }
        }
    }

    fn persist(&self, settings: &HavenSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!(path = ?self.config_path, "saved settings");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// gpui-side owner of the settings store.
pub struct SettingsState {
    store: SettingsStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChanged {
    pub settings: HavenSettings,
}

impl EventEmitter<SettingsChanged> for SettingsState {}

impl SettingsState {
    pub fn new(cx: &mut App) -> Entity<Self> {
        cx.new(|_| Self {
            store: SettingsStore::load(),
        })
    }

    pub fn settings(&self) -> Arc<HavenSettings> {
        self.store.settings()
    }

    pub fn update_settings(
        &mut self,
        settings: HavenSettings,
        cx: &mut Context<Self>,
    ) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.store.update(normalized_settings.clone())?;
        cx.emit(SettingsChanged {
            settings: normalized_settings,
        });
        cx.notify();
        Ok(())
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_crisis_delay_ms() -> u64 {
    CRISIS_FOLLOW_UP_DELAY.as_millis() as u64
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}
