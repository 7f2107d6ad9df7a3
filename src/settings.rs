//! Runtime settings loaded through the `config` crate.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional config file (TOML, YAML or JSON, picked by extension)
//! 3. `HOSTWATCH_*` environment variables
//! 4. command-line flags, applied by the binary
//!
//! ```toml
//! endpoint = "http://monitor:5000/cmk"
//! user = "automation"
//! secret = "..."
//! interval_secs = 10
//! timeout_secs = 10
//! trigger_dir = "/tmp"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use hostwatch_adapters::{Credentials, Endpoint};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "HOSTWATCH";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the CheckMK site.
    pub endpoint: String,
    pub user: String,
    pub secret: String,
    /// Seconds between polls.
    pub interval_secs: u64,
    /// Upper bound on one fetch, in seconds.
    pub timeout_secs: u64,
    /// Directory watched for trigger files.
    pub trigger_dir: PathBuf,
    /// Poll right after startup instead of waiting one interval.
    pub poll_immediately: bool,
    /// Suppress the celebration on the very first poll.
    pub require_prior_poll: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/cmk".to_string(),
            user: "automation".to_string(),
            secret: String::new(),
            interval_secs: 10,
            timeout_secs: 10,
            trigger_dir: PathBuf::from("/tmp"),
            poll_immediately: true,
            require_prior_poll: false,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .field("interval_secs", &self.interval_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("trigger_dir", &self.trigger_dir)
            .field("poll_immediately", &self.poll_immediately)
            .field("require_prior_poll", &self.require_prior_poll)
            .finish()
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings with an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("endpoint", defaults.endpoint)?
            .set_default("user", defaults.user)?
            .set_default("secret", defaults.secret)?
            .set_default("interval_secs", defaults.interval_secs)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("trigger_dir", defaults.trigger_dir.to_string_lossy().to_string())?
            .set_default("poll_immediately", defaults.poll_immediately)?
            .set_default("require_prior_poll", defaults.require_prior_poll)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the poller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            bail!("endpoint must not be empty");
        }
        if self.interval_secs == 0 {
            bail!("interval_secs must be greater than zero");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn monitoring_endpoint(&self) -> Endpoint {
        Endpoint::new(
            self.endpoint.clone(),
            Credentials::new(self.user.clone(), self.secret.clone()),
        )
    }
}
