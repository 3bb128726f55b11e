//! Optional per-corpus configuration.
//!
//! A `coursemap.toml` at the corpus root tunes the directory scan. Absent
//! file means defaults; a present but unparseable file is a hard error so
//! a typo cannot silently change what gets indexed.

use crate::core::error::CoursemapError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "coursemap.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// Directory names to skip during the scan, in addition to the
    /// built-in ignores (`.git`, `target`, dot-directories).
    pub ignore: Vec<String>,
    /// Follow directory symlinks while scanning. Off by default; a link
    /// loop would otherwise never terminate.
    pub follow_symlinks: bool,
}

impl CorpusConfig {
    pub fn load(root: &Path) -> Result<CorpusConfig, CoursemapError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(CorpusConfig::default());
        }
        let raw = fs::read_to_string(&path)?;
        toml::from_str(&raw)
            .map_err(|e| CoursemapError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        name.starts_with('.') || name == "target" || self.ignore.iter().any(|i| i == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_ignore_dot_dirs_and_target() {
        let config = CorpusConfig::default();
        assert!(config.is_ignored_dir(".git"));
        assert!(config.is_ignored_dir("target"));
        assert!(!config.is_ignored_dir("02-design"));
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn parses_ignore_list() {
        let config: CorpusConfig = toml::from_str("ignore = [\"drafts\", \"attic\"]").unwrap();
        assert!(config.is_ignored_dir("drafts"));
        assert!(config.is_ignored_dir("attic"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CorpusConfig>("ignored = [\"drafts\"]").is_err());
    }
}
