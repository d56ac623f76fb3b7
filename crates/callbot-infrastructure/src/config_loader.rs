//! Configuration loading.
//!
//! Resolution order for the file: explicit path, then `CALLBOT_CONFIG`, then
//! the default `config.toml` under the config directory. A missing file is
//! not an error; every setting has a default. Environment overrides are
//! applied after the file is read.

use crate::paths::CallbotPaths;
use callbot_core::Result;
use callbot_core::config::{CallbotConfig, StorageKind};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "CALLBOT_CONFIG";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the configuration using the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<(CallbotConfig, PathBuf)> {
        Self::load_with(explicit, |name| std::env::var(name).ok())
    }

    /// Loads the configuration, reading variables through `lookup`.
    pub fn load_with(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(CallbotConfig, PathBuf)> {
        let path = Self::resolve_path(explicit, &lookup)?;
        let mut config = Self::read_file(&path)?;
        Self::apply_env_overrides(&mut config, &lookup);
        Ok((config, path))
    }

    pub fn resolve_path(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            return Ok(PathBuf::from(path));
        }
        CallbotPaths::config_file()
    }

    /// Reads a TOML config file; a missing or empty file yields defaults.
    pub fn read_file(path: &Path) -> Result<CallbotConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[Config] No config file at {:?}, using defaults", path);
                return Ok(CallbotConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(CallbotConfig::default());
        }

        let config = toml::from_str(&content)?;
        tracing::info!("[Config] Loaded {:?}", path);
        Ok(config)
    }

    /// Applies deployment overrides from the environment.
    pub fn apply_env_overrides(
        config: &mut CallbotConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Some(model) = get("OPENAI_MODEL_NAME") {
            config.llm.model = model;
        }
        if let Some(url) = get("OUTCOME_SINK_URL").or_else(|| get("SPRING_BOOT_URL")) {
            config.outcome.url = url;
        }
        if let Some(url) = get("STT_GATEWAY_URL") {
            config.transcription.url = Some(url);
        }
        if let Some(dir) = get("CALLBOT_STORAGE_DIR") {
            config.storage.kind = StorageKind::File;
            config.storage.dir = Some(dir);
        }
        if let Some(bind) = get("CALLBOT_BIND") {
            config.server.bind = bind;
        }
    }
}
