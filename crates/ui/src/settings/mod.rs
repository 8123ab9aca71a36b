pub mod state;

pub use state::{HavenSettings, SettingsChanged, SettingsError, SettingsState, SettingsStore};
