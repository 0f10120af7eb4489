//! Configuration file loader for `suite-kit.toml`.
//!
//! Resolution order:
//! 1. An explicit path (must exist)
//! 2. `suite-kit.toml` in the given root directory (optional)
//! 3. Built-in defaults
//!
//! Environment overrides are applied last.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use sk_protocol::config_models::ClientConfig;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// File name looked up in the root directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "suite-kit.toml";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "SUITE_KIT_BASE_URL";

/// Loads the client configuration.
///
/// # Arguments
///
/// * `root` - Directory searched for `suite-kit.toml` when `explicit` is `None`
/// * `explicit` - A config file that must exist
/// * `base_url` - Command-line override, applied after the environment and
///   validated like any other value
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - An explicit file is missing or unreadable
/// - A file has invalid TOML syntax
/// - A value fails validation (e.g. a non-HTTP `base_url`)
///
/// # Example
///
/// ```rust,no_run
/// use sk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("."), None, None).await?;
/// println!("Engine at {}", config.base_url);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(
    root: &Path,
    explicit: Option<&Path>,
    base_url: Option<&str>,
) -> ConfigResult<ClientConfig> {
    let config = match explicit {
        Some(path) => read_config_file(path).await?,
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if path.exists() {
                read_config_file(&path).await?
            } else {
                debug!(path = %path.display(), "no config file, using defaults");
                ClientConfig::default()
            }
        }
    };

    let mut config = apply_env_overrides(config, |key| std::env::var(key).ok());
    if let Some(base_url) = base_url {
        config.base_url = base_url.to_string();
    }
    validate(&config, explicit.map(Path::to_path_buf).unwrap_or_else(|| root.join(CONFIG_FILE_NAME)))?;
    Ok(config)
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        debug!(%base_url, "base_url overridden from environment");
        config.base_url = base_url;
    }
    config
}

async fn read_config_file(path: &Path) -> ConfigResult<ClientConfig> {
    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(config: &ClientConfig, path: PathBuf) -> ConfigResult<()> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidConfig {
            path,
            reason: format!("base_url must start with http:// or https://, got {}", config.base_url),
        });
    }
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfig {
            path,
            reason: "request_timeout_secs must be greater than zero".to_string(),
        });
    }
    if config.confirm_timeout_secs == Some(0) {
        return Err(ConfigError::InvalidConfig {
            path,
            reason: "confirm_timeout_secs must be greater than zero when set".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_config_missing_file_uses_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path(), None, None).await.unwrap();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
        assert!(config.parallel);
        assert_eq!(config.confirm_timeout_secs, None);
    }

    #[tokio::test]
    async fn test_load_config_from_root() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
base_url = "https://engine.internal:8443"
parallel = false
confirm_timeout_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(dir.path(), None, None).await.unwrap();
        assert_eq!(config.base_url, "https://engine.internal:8443");
        assert!(!config.parallel);
        assert_eq!(config.confirm_timeout_secs, Some(5));
        // Unspecified fields keep their defaults
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_load_config_explicit_missing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("nope.toml");

        let result = load_config(dir.path(), Some(&missing), None).await;
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "base_url = [not toml").unwrap();

        let result = load_config(dir.path(), None, None).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_rejects_non_http_base_url() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("custom.toml");
        fs::write(&path, r#"base_url = "ftp://engine""#).unwrap();

        let result = load_config(dir.path(), Some(&path), None).await;
        match result {
            Err(ConfigError::InvalidConfig { reason, .. }) => assert!(reason.contains("base_url")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_rejects_zero_confirm_timeout() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "confirm_timeout_secs = 0").unwrap();

        let result = load_config(dir.path(), None, None).await;
        assert!(matches!(result, Err(ConfigError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_load_config_validates_command_line_base_url() {
        let dir = tempdir().expect("Failed to create temp dir");

        let result = load_config(dir.path(), None, Some("ftp://engine")).await;
        assert!(matches!(result, Err(ConfigError::InvalidConfig { .. })));

        let config = load_config(dir.path(), None, Some("https://engine.example"))
            .await
            .unwrap();
        assert_eq!(config.base_url, "https://engine.example");
    }

    #[test]
    fn test_env_override_base_url() {
        let config = apply_env_overrides(ClientConfig::default(), |key| {
            (key == BASE_URL_ENV).then(|| "http://10.0.0.2:5000".to_string())
        });
        assert_eq!(config.base_url, "http://10.0.0.2:5000");

        let untouched = apply_env_overrides(ClientConfig::default(), |_| Some("  ".to_string()));
        assert_eq!(untouched.base_url, ClientConfig::default().base_url);
    }
}
