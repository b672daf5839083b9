//! Configuration file support for unrx
//!
//! Loads `.unrx.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use unrx_transform::RewriteOptions;

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rewrite: RewriteConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Helper awaited in place of the subscription (default: firstValueFrom)
    pub first_value_fn: Option<String>,
    /// Error class checked for completion-without-value (default: EmptyError)
    pub empty_error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json", or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.unrx.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(".unrx.toml");
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Rewrite options with config overrides applied over the defaults
    pub fn rewrite_options(&self) -> RewriteOptions {
        let mut options = RewriteOptions::default();
        if let Some(name) = &self.rewrite.first_value_fn {
            options.first_value_fn = name.clone();
        }
        if let Some(name) = &self.rewrite.empty_error {
            options.empty_error = name.clone();
        }
        options
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                // Also try matching against just the file/dir name
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns like "node_modules/" exclude everything under
            // any matching path segment
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(".unrx.toml"), content).unwrap();
    }

    #[test]
    fn test_load_basic_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[rewrite]
first_value_fn = "lastValueFrom"

[paths]
exclude = ["node_modules/"]
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();
        assert_eq!(path, temp.path().join(".unrx.toml"));
        assert_eq!(
            config.rewrite.first_value_fn.as_deref(),
            Some("lastValueFrom")
        );
        assert_eq!(config.paths.exclude, vec!["node_modules/"]);
    }

    #[test]
    fn test_load_from_parent_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src").join("app");
        fs::create_dir_all(&nested).unwrap();
        create_config(temp.path(), "[output]\nformat = \"json\"\n");

        let (config, _) = Config::load_from(nested).unwrap().unwrap();
        assert_eq!(config.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_load_path_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load_path(&temp.path().join(".unrx.toml")).is_err());
    }

    #[test]
    fn test_rewrite_options_defaults() {
        let config = Config::default();
        let options = config.rewrite_options();
        assert_eq!(options.first_value_fn, "firstValueFrom");
        assert_eq!(options.empty_error, "EmptyError");
    }

    #[test]
    fn test_rewrite_options_overrides() {
        let config: Config = toml::from_str(
            r#"
[rewrite]
first_value_fn = "take1"
empty_error = "NoValue"
"#,
        )
        .unwrap();
        let options = config.rewrite_options();
        assert_eq!(options.first_value_fn, "take1");
        assert_eq!(options.empty_error, "NoValue");
    }

    #[test]
    fn test_should_exclude_glob_pattern() {
        let config: Config = toml::from_str("[paths]\nexclude = [\"*.spec.ts\"]\n").unwrap();
        assert!(config.should_exclude(Path::new("src/app.spec.ts")));
        assert!(!config.should_exclude(Path::new("src/app.ts")));
    }

    #[test]
    fn test_should_exclude_directory_pattern() {
        let config: Config = toml::from_str("[paths]\nexclude = [\"node_modules/\"]\n").unwrap();
        assert!(config.should_exclude(Path::new("node_modules/rxjs/index.js")));
        assert!(config.should_exclude(Path::new("pkg/node_modules/rxjs/index.js")));
        assert!(!config.should_exclude(Path::new("src/modules.ts")));
    }

    #[test]
    fn test_invalid_config_errors() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "rewrite = not-a-table");
        assert!(Config::load_path(&temp.path().join(".unrx.toml")).is_err());
    }
}
