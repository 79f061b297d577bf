//! # Storefront Settings
//!
//! Process-level settings: which store backend to open and how the facade
//! waits on it. Business policy (charges, edit window) is *not* here; it
//! lives in the `config` table as `AppConfig`.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GROCER_BACKEND=sqlite                                              │
//! │     GROCER_DB_PATH=/var/lib/grocer/grocer.db                           │
//! │     GROCER_WRITE_ACK_TIMEOUT_MS=2000                                   │
//! │     GROCER_COUNTDOWN_TICK_MS=1000                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/grocer/storefront.toml (Linux)                           │
//! │     ~/Library/Application Support/com.grocer.storefront/… (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     in-memory backend, 2 s write ack, 1 s countdown tick               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [store]
//! backend = "sqlite"           # memory | sqlite
//! database_path = "grocer.db"  # sqlite only; defaults to the data dir
//!
//! [session]
//! write_ack_timeout_ms = 2000
//! countdown_tick_ms = 1000
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Backend
// =============================================================================

/// Which table store implementation to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Process-local; everything is lost on exit.
    #[default]
    Memory,
    /// SQLite file.
    Sqlite,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Memory => write!(f, "memory"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Backend {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Backend::Memory),
            "sqlite" | "file" => Ok(Backend::Sqlite),
            _ => Err(SyncError::InvalidConfig(format!(
                "Unknown backend '{}'. Valid: memory, sqlite",
                s
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: Backend,

    /// SQLite file. `None` means `grocer.db` in the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// How long a write waits for its own change notification before
    /// returning anyway.
    #[serde(default = "default_write_ack_timeout")]
    pub write_ack_timeout_ms: u64,

    /// Edit-window countdown refresh interval.
    #[serde(default = "default_countdown_tick")]
    pub countdown_tick_ms: u64,
}

fn default_write_ack_timeout() -> u64 {
    2000
}

fn default_countdown_tick() -> u64 {
    1000
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            write_ack_timeout_ms: default_write_ack_timeout(),
            countdown_tick_ms: default_countdown_tick(),
        }
    }
}

// =============================================================================
// Storefront Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorefrontSettings {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl StorefrontSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront settings from file");
                let contents = std::fs::read_to_string(&path)?;
                settings = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront settings saved");
        Ok(())
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.session.write_ack_timeout_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "write_ack_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.session.countdown_tick_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "countdown_tick_ms must be greater than 0".into(),
            ));
        }

        if let Some(path) = &self.store.database_path {
            if path.as_os_str().is_empty() {
                return Err(SyncError::InvalidConfig("database_path must not be empty".into()));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("GROCER_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding backend from environment");
                    self.store.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown backend in environment"),
            }
        }

        if let Ok(path) = std::env::var("GROCER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Ok(timeout) = std::env::var("GROCER_WRITE_ACK_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                self.session.write_ack_timeout_ms = ms;
            }
        }

        if let Ok(tick) = std::env::var("GROCER_COUNTDOWN_TICK_MS") {
            if let Ok(ms) = tick.parse::<u64>() {
                self.session.countdown_tick_ms = ms;
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "grocer", "storefront")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn backend(&self) -> Backend {
        self.store.backend
    }

    /// Resolved SQLite path: the configured one, else the platform data
    /// dir, else the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("grocer.db")))
            .unwrap_or_else(|| PathBuf::from("grocer.db"))
    }

    pub fn write_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.session.write_ack_timeout_ms)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.session.countdown_tick_ms)
    }
}
