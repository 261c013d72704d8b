use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::config::SecretSource;

/// Read-only lookup of sensitive values kept outside the config file.
pub trait SecretProvider {
    fn get_secret(&self, name: &str) -> Option<String>;
}

impl<P: SecretProvider + ?Sized> SecretProvider for &P {
    fn get_secret(&self, name: &str) -> Option<String> {
        (**self).get_secret(name)
    }
}

impl SecretProvider for HashMap<String, String> {
    fn get_secret(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Secrets from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretProvider for EnvSecrets {
    fn get_secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Secrets from a flat TOML table of `name = "value"` pairs.
#[derive(Debug, Clone)]
pub struct FileSecrets {
    path: PathBuf,
}

impl FileSecrets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Option<HashMap<String, String>> {
        if !self.path.exists() {
            return None;
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| warn!(path = %self.path.display(), "unable to read secrets file: {}", e))
            .ok()?;
        toml::from_str(&content)
            .map_err(|e| warn!(path = %self.path.display(), "malformed secrets file: {}", e))
            .ok()
    }
}

impl SecretProvider for FileSecrets {
    fn get_secret(&self, name: &str) -> Option<String> {
        self.load()?.remove(name)
    }
}

/// The provider selected by configuration.
#[derive(Debug, Clone)]
pub enum SecretStore {
    Env(EnvSecrets),
    File(FileSecrets),
}

impl SecretStore {
    pub fn from_source(source: &SecretSource) -> Self {
        match source {
            SecretSource::Env => Self::Env(EnvSecrets),
            SecretSource::File { path } => Self::File(FileSecrets::new(path)),
        }
    }
}

impl SecretProvider for SecretStore {
    fn get_secret(&self, name: &str) -> Option<String> {
        match self {
            Self::Env(store) => store.get_secret(name),
            Self::File(store) => store.get_secret(name),
        }
    }
}
