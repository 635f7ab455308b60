//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `tarmac.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/tarmac.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults.
///
/// A missing config file falls back to defaults; a config file that exists
/// but fails to parse or validate is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match load_config_from_dir(dir) {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(ConfigError::NotFound(_)) => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tarmac.toml");
        std::fs::write(&config_path, "[packages]\nunzip_program = \"unzip\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("tarmac.toml");
        let yaml_path = temp.path().join("tarmac.yaml");
        std::fs::write(&toml_path, "[packages]\nunzip_program = \"unzip\"").unwrap();
        std::fs::write(&yaml_path, "packages:\n  unzip_program: unzip").unwrap();

        let found = find_config(temp.path()).unwrap();
        assert_eq!(found, toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("tarmac.toml");
        std::fs::write(&config_path, "[packages]\nunzip_program = \"unzip\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".tarmac.yaml");
        std::fs::write(&config_path, "packages:\n  unzip_program: unzip").unwrap();
        let nested = temp.path().join("ios").join("build");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config(&nested);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tarmac.toml");
        std::fs::write(
            &config_path,
            "[packages]\nunzip_program = \"/opt/homebrew/bin/unzip\"\nextract_dir = \"build/extracted\"\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.packages.unzip_program, "/opt/homebrew/bin/unzip");
        assert_eq!(
            config.packages.extract_dir,
            Some(PathBuf::from("build/extracted"))
        );
    }

    #[test]
    fn test_load_config_yaml_with_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tarmac.yaml");
        std::fs::write(&config_path, "packages:\n  extract_dir: out\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.packages.unzip_program, "unzip");
        assert_eq!(config.packages.extract_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tarmac.toml");
        std::fs::write(&config_path, "[packages]\nunzip_program = \"\"\n").unwrap();

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(load_config_or_default(temp.path()).is_err());
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.is_none());
    }
}
