// src/infra/config.rs - Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coach::prompts::CoachingMode;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coach: CoachConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(default)]
    pub mode: CoachingMode,
    /// Class sections offered in quantitative mode. The first is preselected.
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
    /// Initial autosave toggle for qualitative sessions. Quantitative always saves.
    #[serde(default)]
    pub autosave: bool,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            mode: CoachingMode::default(),
            sections: default_sections(),
            autosave: false,
        }
    }
}

fn default_sections() -> Vec<String> {
    vec![
        "OPMGT 301 A".into(),
        "OPMGT 301 B".into(),
        "OPMGT 301 C".into(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub primary: String,
    pub fallback: String,
    pub base_url: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            primary: "gpt-5-mini".into(),
            fallback: "gpt-4o-mini".into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Gcs,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub bucket: String,
    pub project: String,
    /// Target directory for the local backend.
    #[serde(default)]
    pub local_dir: Option<PathBuf>,
    /// Root for per-save scratch directories.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: "beergame1".into(),
            project: "beer-game-488600".into(),
            local_dir: None,
            scratch_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn local_dir(&self) -> PathBuf {
        self.local_dir.clone().unwrap_or_else(paths::transcripts_dir)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(paths::scratch_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
    /// Optional bearer token required on every session route.
    pub token: Option<String>,
    /// Drop sessions untouched for this long. 0 keeps them until DELETE.
    pub session_idle_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            token: None,
            session_idle_secs: 7200,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.coach.mode.requires_section() && self.coach.sections.is_empty() {
            anyhow::bail!("[coach] sections must list at least one section in quantitative mode");
        }
        if self.models.primary.trim().is_empty() || self.models.fallback.trim().is_empty() {
            anyhow::bail!("[models] primary and fallback must be non-empty");
        }
        Ok(())
    }
}
