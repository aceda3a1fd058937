//! Provider configuration.
//!
//! Callers supply a [`ConfigOverrides`] where every field is optional; it is
//! merged field-by-field over the built-in defaults into a [`Config`].
//!
//! ```rust
//! use umbra_core::{Config, ConfigOverrides, DEFAULT_STORAGE_KEY};
//!
//! let config = Config::merged(&ConfigOverrides::new().with_use_local_storage(true));
//! assert!(config.use_local_storage);
//! assert!(config.listen_window_events);
//! assert_eq!(config.local_storage_key, DEFAULT_STORAGE_KEY);
//! ```

/// Key used for the persisted entry when the caller doesn't pick one.
pub const DEFAULT_STORAGE_KEY: &str = "__userColorScheme";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Key of the persisted entry.
    pub local_storage_key: String,
    /// Follow OS preference change notifications.
    pub listen_window_events: bool,
    /// Read the initial value from, and write every update to, the store.
    pub use_local_storage: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_storage_key: DEFAULT_STORAGE_KEY.to_string(),
            listen_window_events: true,
            use_local_storage: false,
        }
    }
}

impl Config {
    /// Defaults with every field set in `overrides` replaced.
    pub fn merged(overrides: &ConfigOverrides) -> Self {
        let defaults = Self::default();
        Self {
            local_storage_key: overrides
                .local_storage_key
                .clone()
                .unwrap_or(defaults.local_storage_key),
            listen_window_events: overrides
                .listen_window_events
                .unwrap_or(defaults.listen_window_events),
            use_local_storage: overrides
                .use_local_storage
                .unwrap_or(defaults.use_local_storage),
        }
    }
}

/// Partial configuration as supplied by a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct ConfigOverrides {
    pub local_storage_key: Option<String>,
    pub listen_window_events: Option<bool>,
    pub use_local_storage: Option<bool>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_storage_key(mut self, key: impl Into<String>) -> Self {
        self.local_storage_key = Some(key.into());
        self
    }

    pub fn with_listen_window_events(mut self, listen: bool) -> Self {
        self.listen_window_events = Some(listen);
        self
    }

    pub fn with_use_local_storage(mut self, persist: bool) -> Self {
        self.use_local_storage = Some(persist);
        self
    }
}

impl From<Config> for ConfigOverrides {
    fn from(config: Config) -> Self {
        Self {
            local_storage_key: Some(config.local_storage_key),
            listen_window_events: Some(config.listen_window_events),
            use_local_storage: Some(config.use_local_storage),
        }
    }
}
