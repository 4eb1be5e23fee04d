// src/infra/paths.rs - Path management
//
// All paths respect the BEERGAME_HOME environment variable for isolation.
// When unset, config lives under ~/.beergame/ and data under XDG_DATA_HOME.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

fn beergame_home() -> Option<PathBuf> {
    std::env::var_os("BEERGAME_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when it cannot be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $BEERGAME_HOME/ or ~/.beergame/
pub fn config_dir() -> PathBuf {
    if let Some(home) = beergame_home() {
        return home;
    }
    dirs_home().join(".beergame")
}

/// Data directory: $BEERGAME_HOME/data/ or ~/.local/share/beergame/
pub fn data_dir() -> PathBuf {
    if let Some(home) = beergame_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "beergame")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn credentials_dir() -> PathBuf {
    config_dir().join("credentials")
}

/// Default target for the local blob store.
pub fn transcripts_dir() -> PathBuf {
    data_dir().join("transcripts")
}

/// Default root for per-save scratch directories.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join("beergame-coach")
}
