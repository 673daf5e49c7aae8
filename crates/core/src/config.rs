use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BeaconError, BeaconResult};

/// Root tracker configuration. Loaded from environment variables with the
/// prefix `BEACON__`, falling back to defaults for anything unset.
#[derive(Debug, Clone, Deserialize)]
pub struct BeaconConfig {
    /// Segment every virtual pageview path is filed under.
    #[serde(default = "default_virtual_prefix")]
    pub virtual_prefix: String,
    /// Replacement for actions and labels that look like email addresses.
    #[serde(default = "default_redaction_marker")]
    pub redaction_marker: String,
    /// Page host name, used as the default event category.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Backends in dispatch priority order.
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendKind>,
}

/// The collector families a tracker knows how to talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// analytics.js style `ga("send", {...})` dispatcher.
    Hit,
    /// ga.js style `_gaq` command queue.
    Legacy,
    /// Optimizely style goal queue.
    Goal,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Hit => "hit",
            BackendKind::Legacy => "legacy",
            BackendKind::Goal => "goal",
        }
    }
}

impl FromStr for BackendKind {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hit" => Ok(BackendKind::Hit),
            "legacy" => Ok(BackendKind::Legacy),
            "goal" => Ok(BackendKind::Goal),
            other => Err(BeaconError::Config(format!("unknown backend '{other}'"))),
        }
    }
}

fn default_virtual_prefix() -> String {
    "/virtual/".to_string()
}
fn default_redaction_marker() -> String {
    "REDACTED (Potential Email Address)".to_string()
}
fn default_hostname() -> String {
    "localhost".to_string()
}
fn default_backends() -> Vec<BackendKind> {
    vec![BackendKind::Hit, BackendKind::Legacy, BackendKind::Goal]
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            virtual_prefix: default_virtual_prefix(),
            redaction_marker: default_redaction_marker(),
            hostname: default_hostname(),
            backends: default_backends(),
        }
    }
}

impl BeaconConfig {
    /// Load configuration from environment variables.
    pub fn load() -> BeaconResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("BEACON")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("backends"),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BeaconResult<()> {
        if self.virtual_prefix.len() < 2
            || !self.virtual_prefix.starts_with('/')
            || !self.virtual_prefix.ends_with('/')
        {
            return Err(BeaconError::Config(format!(
                "virtual_prefix must start and end with '/', got '{}'",
                self.virtual_prefix
            )));
        }
        if self.redaction_marker.trim().is_empty() {
            return Err(BeaconError::Config(
                "redaction_marker must not be empty".into(),
            ));
        }
        if self.hostname.trim().is_empty() {
            return Err(BeaconError::Config("hostname must not be empty".into()));
        }
        if self.backends.is_empty() {
            return Err(BeaconError::Config(
                "at least one backend must be enabled".into(),
            ));
        }
        for (i, kind) in self.backends.iter().enumerate() {
            if self.backends[..i].contains(kind) {
                return Err(BeaconError::Config(format!(
                    "backend '{}' listed more than once",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }
}
