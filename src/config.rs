use anyhow::{Context, Result, bail};
use colored::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::dispatch::{DEFAULT_SECRET_NAME, DispatchRequest};

pub const CONFIG_FILE_NAME: &str = "repo_dispatch.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SecretSource {
    #[default]
    Env,
    File {
        path: PathBuf,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    pub owner: String,
    pub repo: String,
    pub event_type: String,
    pub secret_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub confirm_title: String,
    pub confirm_message: String,
    pub secret_source: SecretSource,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            owner: "Nalhan".to_string(),
            repo: "BotaTools".to_string(),
            event_type: "update-lines".to_string(),
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            timeout_secs: None,
            confirm_title: "Update Addon?".to_string(),
            confirm_message: "Are you sure you want to trigger a GitHub update and release?"
                .to_string(),
            secret_source: SecretSource::Env,
        }
    }
}

/// Per-invocation values from the command line. They never touch the stored file.
#[derive(Debug, Default, Clone)]
pub struct DispatchOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub event_type: Option<String>,
}

pub struct Config {
    pub file_path: PathBuf,
    pub settings: DispatchConfig,
}

impl Config {
    /// Missing file means defaults. A file that exists but fails to parse is an error.
    pub fn create_or_load(toml_path: PathBuf) -> Result<Self> {
        let settings = if toml_path.exists() {
            Self::read_toml(&toml_path)?
        } else {
            DispatchConfig::default()
        };
        Ok(Self {
            file_path: toml_path,
            settings,
        })
    }

    fn read_toml(toml_path: &Path) -> Result<DispatchConfig> {
        let content = fs::read_to_string(toml_path)
            .with_context(|| format!("Unable to read config file {}", toml_path.display()))?;
        let settings: DispatchConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", toml_path.display()))?;
        if settings.timeout_secs == Some(0) {
            bail!(
                "Invalid config file {}: timeout_secs must be greater than zero (omit it for the client default)",
                toml_path.display()
            );
        }
        Ok(settings)
    }

    pub fn init(toml_path: PathBuf, force: bool) -> Result<Self> {
        if toml_path.exists() && !force {
            bail!(
                "Config file already exists - {} (use --force to overwrite)",
                toml_path.display()
            );
        }
        let config = Self {
            file_path: toml_path,
            settings: DispatchConfig::default(),
        };
        config.write_back()?;
        println!(
            "Wrote default config - {}",
            config.file_path.display().to_string().green()
        );
        Ok(config)
    }

    fn write_back(&self) -> Result<()> {
        let toml_data =
            toml::to_string(&self.settings).context("Unable to convert to TOML format")?;
        fs::write(&self.file_path, toml_data)
            .with_context(|| format!("Unable to write to file {}", self.file_path.display()))
    }

    pub fn dispatch_request(&self, overrides: &DispatchOverrides) -> DispatchRequest {
        let pick = |value: &Option<String>, fallback: &String| {
            value.clone().unwrap_or_else(|| fallback.clone())
        };
        DispatchRequest::new(
            pick(&overrides.owner, &self.settings.owner),
            pick(&overrides.repo, &self.settings.repo),
            pick(&overrides.event_type, &self.settings.event_type),
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.settings.timeout_secs.map(Duration::from_secs)
    }

    pub fn show(&self, secret_present: bool) {
        let settings = &self.settings;
        let request = self.dispatch_request(&DispatchOverrides::default());
        println!("Config     {} {}", "->".bright_blue(), self.file_path.display());
        println!(
            "Target     {} {}/{}",
            "->".bright_blue(),
            settings.owner.green(),
            settings.repo.green()
        );
        println!("Event      {} {}", "->".bright_blue(), settings.event_type.magenta());
        println!("URL        {} {}", "->".bright_blue(), request.url());
        let source = match &settings.secret_source {
            SecretSource::Env => "environment".to_string(),
            SecretSource::File { path } => path.display().to_string(),
        };
        let status = if secret_present {
            "set".green()
        } else {
            "missing".red()
        };
        println!(
            "Secret     {} {} ({}) {}",
            "->".bright_blue(),
            settings.secret_name,
            source,
            status
        );
        let timeout = settings
            .timeout_secs
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "client default".to_string());
        println!("Timeout    {} {}", "->".bright_blue(), timeout);
    }
}
