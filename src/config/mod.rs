//! Configuration loading for MockMate

mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILENAME: &str = ".mockmaterc.json";

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            load_config_with_extends(&path, &mut HashSet::new())
        }
        None => {
            debug!("No {} found, using defaults", CONFIG_FILENAME);
            Ok(Config::default())
        }
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    // Prevent circular extends
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference relative to the config that names it
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let extends_path = if Path::new(extends).is_absolute() {
        PathBuf::from(extends)
    } else {
        config_dir.join(extends)
    };

    // Ensure it has .json extension
    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    debug!("{} extends {}", config_path.display(), extends_path.display());
    load_config_with_extends(&extends_path, visited)
}

/// Search for .mockmaterc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Write a starter config into `dir`. Refuses to overwrite an existing one.
pub fn write_starter_config(dir: &Path, pass_threshold: Option<f64>) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let json = serde_json::to_string_pretty(&Config::starter(pass_threshold))?;
    fs::write(&path, format!("{}\n", json))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Build a GlobSet from ignore patterns for path matching
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        // Parents of a temp dir are not expected to carry a .mockmaterc.json
        if find_config_in_parents(&nested).is_none() {
            assert_eq!(load_config(&nested, None).unwrap(), Config::default());
        }
    }

    #[test]
    fn test_config_found_in_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "passThreshold": 60, "utcOffsetMinutes": -300 }"#,
        )
        .unwrap();
        let nested = dir.path().join("sessions");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested, None).unwrap();
        assert_eq!(config.pass_threshold, Some(60.0));
        assert_eq!(config.utc_offset_minutes, Some(-300));
    }

    #[test]
    fn test_custom_path_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_is_ignored_drafts() {
        let set = build_ignore_set(&["**/drafts/**".to_string()]).unwrap();
        assert!(is_ignored(Path::new("tests/drafts/physics.json"), &set));
        assert!(!is_ignored(Path::new("tests/physics.json"), &set));
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        assert!(build_ignore_set(&["[".to_string()]).is_err());
    }

    #[test]
    fn test_config_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.json");
        let mut base_file = fs::File::create(&base_path).unwrap();
        writeln!(
            base_file,
            r#"{{
                "passThreshold": 50,
                "milestones": [1, 3, 7],
                "ignore": ["**/drafts/**"]
            }}"#
        )
        .unwrap();

        let child_path = dir.path().join(CONFIG_FILENAME);
        let mut child_file = fs::File::create(&child_path).unwrap();
        writeln!(
            child_file,
            r#"{{
                "extends": "./base",
                "passThreshold": 75,
                "ignore": ["**/archive/**"]
            }}"#
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();

        // Child value wins
        assert_eq!(config.pass_threshold, Some(75.0));
        // Base values are inherited
        assert_eq!(config.milestones, Some(vec![1, 3, 7]));
        // Ignore lists are concatenated, base first
        assert_eq!(config.ignore, vec!["**/drafts/**", "**/archive/**"]);
    }

    #[test]
    fn test_circular_extends() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();

        let err = load_config(dir.path(), Some(Path::new("a.json"))).unwrap_err();
        assert!(err.to_string().contains("Circular extends"));
    }

    #[test]
    fn test_invalid_json_has_context() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "{ not json").unwrap();
        let err = load_config(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON in config"));
    }

    #[test]
    fn test_merge_with_cli() {
        let config = Config {
            pass_threshold: Some(40.0),
            ..Config::default()
        };
        assert_eq!(config.clone().merge_with_cli(None).pass_threshold, Some(40.0));
        assert_eq!(config.merge_with_cli(Some(90.0)).pass_threshold, Some(90.0));
    }

    #[test]
    fn test_starter_config_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = write_starter_config(dir.path(), Some(65.0)).unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.pass_threshold, Some(65.0));
        assert_eq!(config.milestones, Some(vec![1, 5, 10, 20, 50, 100]));
        assert!(write_starter_config(dir.path(), None).is_err());
        assert!(path.ends_with(CONFIG_FILENAME));
    }
}
