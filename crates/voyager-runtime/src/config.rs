//! Configuration for voyagerd

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use voyager_dispatch::DispatchConfig;
use voyager_emergency::EmergencyConfig;
use voyager_types::DangerZone;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoyagerConfig {
    /// Danger zones, fixed for the lifetime of the engine
    #[serde(default = "default_zones")]
    pub zones: Vec<DangerZone>,

    /// Emergency session timing
    #[serde(default)]
    pub emergency: EmergencyConfig,

    /// Outbound alert construction
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Trusted contact persistence
    #[serde(default)]
    pub contacts: ContactsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for VoyagerConfig {
    fn default() -> Self {
        Self {
            zones: default_zones(),
            emergency: EmergencyConfig::default(),
            dispatch: DispatchConfig::default(),
            contacts: ContactsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Trusted contact persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// JSON file holding the ordered contact list. Without one the
    /// trusted circle lives in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_zones() -> Vec<DangerZone> {
    DangerZone::kolkata_defaults()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl VoyagerConfig {
    /// Load configuration: built-in defaults, then the file at `path` if
    /// given, then `VOYAGER_` environment variables with `__` between
    /// nesting levels (e.g. `VOYAGER_EMERGENCY__COUNTDOWN_SECS=10`,
    /// `VOYAGER_CONTACTS__PATH=/var/lib/voyager/contacts.json`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&VoyagerConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("VOYAGER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
