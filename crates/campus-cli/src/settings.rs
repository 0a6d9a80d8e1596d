//! Layered settings: built-in defaults, an optional TOML file, `CAMPUS_*`
//! environment variables, then command-line flags.

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use campus_client::ApiConfig;
use campus_core::role::Role;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub base_url:       String,
  pub api_prefix:     String,
  #[serde(default)]
  pub session_cookie: Option<String>,
  pub role:           Role,
  pub close_delay_ms: u64,
  pub toast_ms:       u64,
  #[serde(default)]
  pub log_file:       Option<PathBuf>,
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Default)]
pub struct Overrides {
  pub base_url: Option<String>,
  pub role:     Option<Role>,
  pub log_file: Option<PathBuf>,
}

impl Settings {
  pub fn load(file: Option<PathBuf>, overrides: Overrides) -> anyhow::Result<Self> {
    let mut builder = Config::builder()
      .set_default("base_url", "http://localhost:5000")?
      .set_default("api_prefix", "/api")?
      .set_default("role", Role::Admin.as_str())?
      .set_default("close_delay_ms", 1500)?
      .set_default("toast_ms", 1500)?;

    builder = match file {
      Some(path) => builder.add_source(File::from(path).required(true)),
      None => builder.add_source(File::with_name("campus").required(false)),
    };

    let settings = builder
      .add_source(Environment::with_prefix("CAMPUS"))
      .set_override_option("base_url", overrides.base_url)?
      .set_override_option("role", overrides.role.map(|r| r.as_str()))?
      .set_override_option(
        "log_file",
        overrides.log_file.map(|p| p.to_string_lossy().into_owned()),
      )?
      .build()
      .context("failed to read configuration")?;

    settings.try_deserialize().context("invalid configuration")
  }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      base_url:       self.base_url.clone(),
      api_prefix:     self.api_prefix.clone(),
      session_cookie: self.session_cookie.clone(),
    }
  }

  pub fn close_delay(&self) -> Duration {
    Duration::from_millis(self.close_delay_ms)
  }

  pub fn toast_ttl(&self) -> Duration {
    Duration::from_millis(self.toast_ms)
  }
}
