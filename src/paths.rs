// colablint - Path Resolution
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single source of truth for where colablint keeps its config and
// where the mounted drive lives. Cached via OnceLock.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CONFIG_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Default mount point of the cloud drive inside a hosted runtime
pub const DEFAULT_DRIVE_ROOT: &str = "/content/drive";

/// Config directory for colablint.
///
/// Resolution order:
///   1. COLABLINT_CONFIG_DIR environment variable
///   2. XDG_CONFIG_HOME/colablint
///   3. HOME/.config/colablint
///   4. ./.colablint (no home at all, e.g. minimal containers)
pub fn config_dir() -> &'static Path {
    CONFIG_DIR_CACHE.get_or_init(|| {
        if let Ok(dir) = std::env::var("COLABLINT_CONFIG_DIR") {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join("colablint");
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config/colablint");
        }

        PathBuf::from(".colablint")
    })
}

/// Default location of config.json
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Default location of the sqlfluff config written by `init-config`
pub fn default_sqlfluff_config_path() -> PathBuf {
    config_dir().join(".sqlfluff")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_paths_share_one_directory() {
        let config = default_config_path();
        let sqlfluff = default_sqlfluff_config_path();
        assert_eq!(config.parent(), sqlfluff.parent());
        assert!(config.ends_with("config.json"));
        assert!(sqlfluff.ends_with(".sqlfluff"));
    }
}
