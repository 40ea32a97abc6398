//! Configuration file discovery and loading.
//!
//! A project is configured by a single file in its root. The first of
//! [`CONFIG_FILE_NAMES`] that exists wins; `--config` bypasses discovery.

use crate::config::schema::RigupConfig;
use crate::error::{Result, RigupError};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names, in discovery order.
pub const CONFIG_FILE_NAMES: [&str; 4] = ["rigup.yml", "rigup.yaml", "rigup.json", ".rigup.yml"];

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from the file extension. Anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Find the config file in a project directory.
pub fn discover_config(project_dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.is_file())
}

/// Load a single config file and parse it into RigupConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the content is invalid.
pub fn load_config_file(path: &Path) -> Result<RigupConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RigupError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RigupError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse config content, picking the format from `source_path`.
///
/// # Arguments
///
/// * `content` - The file content to parse
/// * `source_path` - Path for format detection and error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<RigupConfig> {
    if content.trim().is_empty() {
        return Ok(RigupConfig::default());
    }

    let parsed = match ConfigFormat::from_path(source_path) {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| RigupError::ConfigParseError {
        path: source_path.to_path_buf(),
        message,
    })
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads that file. Otherwise discovers
/// the config in `project_dir`. Returns the path that was loaded along
/// with the parsed config.
pub fn load_config(
    project_dir: &Path,
    config_override: Option<&Path>,
) -> Result<(PathBuf, RigupConfig)> {
    let path = match config_override {
        Some(path) => path.to_path_buf(),
        None => discover_config(project_dir).ok_or_else(|| RigupError::ConfigNotFound {
            path: project_dir.join(CONFIG_FILE_NAMES[0]),
        })?,
    };

    let config = load_config_file(&path)?;
    Ok((path, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepType;
    use tempfile::TempDir;

    #[test]
    fn discover_prefers_rigup_yml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rigup.json"), "{}").unwrap();
        fs::write(temp.path().join("rigup.yml"), "name: test").unwrap();

        let found = discover_config(temp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "rigup.yml");
    }

    #[test]
    fn discover_falls_back_to_hidden_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".rigup.yml"), "name: test").unwrap();

        let found = discover_config(temp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), ".rigup.yml");
    }

    #[test]
    fn discover_returns_none_for_missing_configs() {
        let temp = TempDir::new().unwrap();
        assert!(discover_config(temp.path()).is_none());
    }

    #[test]
    fn format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("rigup.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("rigup.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("rigup")), ConfigFormat::Yaml);
    }

    #[test]
    fn load_config_file_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("rigup.yml");
        fs::write(
            &config_path,
            "name: TestApp\nsetup_steps:\n  - name: deps\n    type: package-manager\n    manager: npm\n",
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.name, Some("TestApp".to_string()));
        assert_eq!(config.setup_steps[0].step_type, StepType::PackageManager);
    }

    #[test]
    fn load_config_file_parses_json() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("rigup.json");
        fs::write(
            &config_path,
            r#"{"name": "JsonApp", "setup_steps": [{"name": "hi", "type": "shell", "command": "echo hi"}]}"#,
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.name, Some("JsonApp".to_string()));
        assert_eq!(config.setup_steps[0].command, Some("echo hi".to_string()));
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/rigup.yml"));
        assert!(matches!(result, Err(RigupError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("invalid: yaml: content: [", Path::new("rigup.yml"));
        assert!(matches!(result, Err(RigupError::ConfigParseError { .. })));
    }

    #[test]
    fn parse_config_rejects_unknown_step_type() {
        let content = "setup_steps:\n  - name: x\n    type: teleport\n";
        let result = parse_config(content, Path::new("rigup.yml"));
        assert!(matches!(result, Err(RigupError::ConfigParseError { .. })));
    }

    #[test]
    fn parse_config_handles_empty_file() {
        let config = parse_config("  \n", Path::new("rigup.yml")).unwrap();
        assert!(config.name.is_none());
        assert!(config.setup_steps.is_empty());
    }

    #[test]
    fn null_step_list_is_empty_in_both_formats() {
        let json = parse_config(r#"{"name":"demo","setup_steps":null}"#, Path::new("rigup.json"))
            .unwrap();
        let yaml = parse_config("name: demo\nsetup_steps:\n", Path::new("rigup.yml")).unwrap();

        assert!(json.setup_steps.is_empty());
        assert_eq!(json, yaml);
    }

    #[test]
    fn null_nested_lists_are_empty() {
        let content = r#"{"setup_steps": [
            {"name": "a", "type": "shell", "command": "true", "depends_on": null},
            {"name": "db", "type": "choice", "prompt": "?", "choices": [
                {"name": "None", "value": "none", "actions": null}
            ]}
        ]}"#;
        let config = parse_config(content, Path::new("rigup.json")).unwrap();

        assert!(config.setup_steps[0].depends_on.is_empty());
        assert!(config.setup_steps[1].choices[0].actions.is_empty());
    }

    #[test]
    fn load_config_with_override() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom.yml");
        fs::write(&custom, "name: Custom").unwrap();
        fs::write(temp.path().join("rigup.yml"), "name: Discovered").unwrap();

        let (path, config) = load_config(temp.path(), Some(&custom)).unwrap();
        assert_eq!(path, custom);
        assert_eq!(config.name, Some("Custom".to_string()));
    }

    #[test]
    fn load_config_without_config_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_config(temp.path(), None);
        match result {
            Err(RigupError::ConfigNotFound { path }) => {
                assert_eq!(path, temp.path().join("rigup.yml"));
            }
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }
}
