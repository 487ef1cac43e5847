use crate::config::schema::{Config, SessionScope};
use crate::providers::{LlmProxyConfig, OpenAiConfig, ProviderConfig};
use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing configuration value '{field}': {hint}")]
    Missing { field: &'static str, hint: &'static str },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Values given on the command line; they take precedence over everything else
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
}

/// Loads configuration from defaults, the config file, the process
/// environment and CLI flags, in increasing order of precedence.
pub fn load_config(overrides: &CliOverrides, cli_config_path: Option<PathBuf>) -> Result<Config> {
    load_config_with_env(overrides, cli_config_path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup
pub fn load_config_with_env<F>(
    overrides: &CliOverrides,
    cli_config_path: Option<PathBuf>,
    env: F,
) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    tracing::debug!("Loading configuration");

    let mut config = Config::default();

    // Layer 1: config file (~/.finbot/config.json or --config)
    let explicit = cli_config_path.is_some();
    let config_file = cli_config_path.or_else(get_default_config_path);

    if let Some(ref path) = config_file {
        if path.exists() {
            tracing::debug!(config_path = %path.display(), "Loading configuration from file");
            config = merge_config_from_file(config, path, explicit)?;
        } else {
            tracing::debug!(config_path = %path.display(), "Config file not found, using defaults");
        }
    }

    // Layer 2: environment variables
    tracing::debug!("Applying environment variable overrides");
    config = merge_env_variables(config, env)?;

    // Layer 3: CLI flags
    apply_cli_overrides(&mut config, overrides);

    let summary = config.get_safe_summary();
    tracing::debug!(
        search_configured = summary.search_configured,
        provider = ?summary.provider_type,
        model = ?summary.model,
        bind_address = %summary.bind_address,
        shared_session = summary.shared_session,
        "Configuration loaded successfully"
    );

    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(ref host) = overrides.host {
        tracing::debug!(host = %host, "Applying CLI host override");
        config.server.host = host.clone();
    }
    if let Some(port) = overrides.port {
        tracing::debug!(port = port, "Applying CLI port override");
        config.server.port = port;
    }
    if let Some(ref model) = overrides.model {
        tracing::debug!(model = %model, "Applying CLI model override");
        if let Some(ref mut provider_config) = config.provider_config {
            provider_config.set_default_model(model.clone());
        } else {
            tracing::warn!("--model given but no completion backend is configured");
        }
    }
}

pub fn get_default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".finbot").join("config.json"))
}

/// Reads the config file over `config`.
///
/// A file that is not mode 0600 is skipped, unless it was named explicitly
/// with `--config`, in which case it is an error.
fn merge_config_from_file(config: Config, path: &Path, explicit: bool) -> Result<Config> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(config),
        Err(e) => return Err(e).context("Failed to read metadata for config file"),
    };

    // The file carries API keys
    let mode = metadata.permissions().mode() & 0o777;
    if mode != 0o600 {
        if explicit {
            return Err(ConfigError::Invalid {
                message: format!(
                    "config file {} has permissions {:o}, expected 600 (run: chmod 600 {})",
                    path.display(),
                    mode,
                    path.display()
                ),
            }
            .into());
        }
        tracing::error!(
            "Config file {:?} has permissions {:o}, expected 0600 - skipping for security",
            path,
            mode
        );
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .map_err(ConfigError::IoError)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let file_config: Config = serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;
    Ok(file_config)
}

fn merge_env_variables<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Empty values count as unset
    let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = env("GOOGLE_API_KEY") {
        config.search.api_key = Some(key);
    }
    if let Some(id) = env("SEARCH_ENGINE_ID") {
        config.search.engine_id = Some(id);
    }

    let proxy_key = env("LLMPROXY_API_KEY");
    let proxy_endpoint = env("LLMPROXY_ENDPOINT");
    if proxy_key.is_some() || proxy_endpoint.is_some() {
        let mut proxy = match config.provider_config.take() {
            Some(ProviderConfig::LlmProxy(existing)) => existing,
            _ => LlmProxyConfig::new("", ""),
        };
        if let Some(key) = proxy_key {
            proxy.api_key = key;
        }
        if let Some(endpoint) = proxy_endpoint {
            proxy.endpoint = endpoint;
        }
        config.provider_config = Some(ProviderConfig::LlmProxy(proxy));
    } else if let Some(key) = env("OPENAI_API_KEY") {
        // An LLMProxy backend from the config file wins over a stray OpenAI key
        config.provider_config = match config.provider_config.take() {
            Some(ProviderConfig::LlmProxy(existing)) => Some(ProviderConfig::LlmProxy(existing)),
            Some(ProviderConfig::OpenAi(existing)) => Some(ProviderConfig::OpenAi(OpenAiConfig {
                api_key: key,
                ..existing
            })),
            None => Some(ProviderConfig::openai(key)),
        };
    }

    if let Some(model) = env("FINBOT_MODEL") {
        if let Some(ref mut provider_config) = config.provider_config {
            provider_config.set_default_model(model);
        }
    }

    if let Some(scope) = env("FINBOT_SESSION_SCOPE") {
        config.assistant.session_scope = match scope.trim() {
            "per_user" => SessionScope::PerUser,
            "shared" => SessionScope::default(),
            other => {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "FINBOT_SESSION_SCOPE must be 'shared' or 'per_user', got '{}'",
                        other
                    ),
                });
            }
        };
    }

    if let Some(host) = env("HOST") {
        config.server.host = host;
    }
    if let Some(port) = env("PORT") {
        config.server.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
            message: format!("PORT must be a number between 0 and 65535, got '{}'", port),
        })?;
    }

    Ok(config)
}

impl Config {
    /// Checks that everything the server needs at runtime is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Missing {
                field: "search.api_key",
                hint: "set GOOGLE_API_KEY or search.api_key in the config file",
            });
        }

        if self.search.engine_id.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Missing {
                field: "search.engine_id",
                hint: "set SEARCH_ENGINE_ID or search.engine_id in the config file",
            });
        }

        let provider_config = self.provider_config.as_ref().ok_or(ConfigError::Missing {
            field: "provider_config",
            hint: "set LLMPROXY_API_KEY and LLMPROXY_ENDPOINT, or OPENAI_API_KEY",
        })?;

        provider_config
            .validate()
            .map_err(|e| ConfigError::Invalid {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &TempDir, json: &str, mode: u32) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, json).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(mode);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn complete_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GOOGLE_API_KEY", "g-key"),
            ("SEARCH_ENGINE_ID", "cx-id"),
            ("LLMPROXY_API_KEY", "p-key"),
            ("LLMPROXY_ENDPOINT", "https://proxy.example.com/generate"),
        ]
    }

    #[test]
    fn test_load_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nonexistent_config.json");

        let config =
            load_config_with_env(&CliOverrides::default(), Some(missing), env_from(&[])).unwrap();
        assert!(config.search.api_key.is_none());
        assert!(config.provider_config.is_none());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_env_populates_search_and_llmproxy() {
        let config =
            load_config_with_env(&CliOverrides::default(), None, env_from(&complete_env()))
                .unwrap();

        assert_eq!(config.search.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.search.engine_id.as_deref(), Some("cx-id"));
        match config.provider_config.as_ref().unwrap() {
            ProviderConfig::LlmProxy(cfg) => {
                assert_eq!(cfg.api_key, "p-key");
                assert_eq!(cfg.endpoint, "https://proxy.example.com/generate");
                assert_eq!(cfg.default_model, "4o-mini");
            }
            other => panic!("Expected LlmProxy config, got {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = load_config_with_env(
            &CliOverrides::default(),
            None,
            env_from(&[("GOOGLE_API_KEY", ""), ("OPENAI_API_KEY", "  ")]),
        )
        .unwrap();

        assert!(config.search.api_key.is_none());
        assert!(config.provider_config.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{
                "server": {"port": 9100},
                "search": {"api_key": "file-key", "engine_id": "file-cx"},
                "provider_config": {"type": "openai", "api_key": "file-openai"}
            }"#,
            0o600,
        );

        let config =
            load_config_with_env(&CliOverrides::default(), Some(path), env_from(&[])).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.search.api_key.as_deref(), Some("file-key"));
        assert!(matches!(config.provider_config, Some(ProviderConfig::OpenAi(_))));
    }

    #[test]
    fn test_world_readable_default_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"server": {"port": 9100}}"#, 0o644);

        let config = merge_config_from_file(Config::default(), &path, false).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_world_readable_explicit_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"server": {"port": 9100}}"#, 0o644);

        let result = load_config_with_env(&CliOverrides::default(), Some(path), env_from(&[]));
        let err_msg = format!("{:#}", result.unwrap_err());
        assert!(err_msg.contains("permissions 644"));
        assert!(err_msg.contains("expected 600"));
    }

    #[test]
    fn test_load_config_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "not valid json", 0o600);

        let result = load_config_with_env(&CliOverrides::default(), Some(path), env_from(&[]));
        let err_msg = format!("{}", result.unwrap_err());
        assert!(err_msg.contains("invalid JSON"));
    }

    #[test]
    fn test_env_overrides_file_llmproxy_key_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{"provider_config": {"type": "llmproxy", "api_key": "file-key", "endpoint": "https://file.example.com", "default_model": "4o"}}"#,
            0o600,
        );

        let config = load_config_with_env(
            &CliOverrides::default(),
            Some(path),
            env_from(&[("LLMPROXY_API_KEY", "env-key")]),
        )
        .unwrap();

        match config.provider_config.unwrap() {
            ProviderConfig::LlmProxy(cfg) => {
                assert_eq!(cfg.api_key, "env-key");
                assert_eq!(cfg.endpoint, "https://file.example.com");
                assert_eq!(cfg.default_model, "4o");
            }
            other => panic!("Expected LlmProxy config, got {:?}", other),
        }
    }

    #[test]
    fn test_openai_key_does_not_replace_file_llmproxy() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{"provider_config": {"type": "llmproxy", "api_key": "k", "endpoint": "https://file.example.com"}}"#,
            0o600,
        );

        let config = load_config_with_env(
            &CliOverrides::default(),
            Some(path),
            env_from(&[("OPENAI_API_KEY", "sk-test")]),
        )
        .unwrap();
        assert!(matches!(config.provider_config, Some(ProviderConfig::LlmProxy(_))));
    }

    #[test]
    fn test_session_scope_and_port_from_env() {
        let config = load_config_with_env(
            &CliOverrides::default(),
            None,
            env_from(&[("FINBOT_SESSION_SCOPE", "per_user"), ("PORT", "8080")]),
        )
        .unwrap();

        assert_eq!(config.assistant.session_scope, SessionScope::PerUser);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_env_values_rejected() {
        let result = load_config_with_env(
            &CliOverrides::default(),
            None,
            env_from(&[("PORT", "eighty")]),
        );
        assert!(result.unwrap_err().to_string().contains("PORT"));

        let result = load_config_with_env(
            &CliOverrides::default(),
            None,
            env_from(&[("FINBOT_SESSION_SCOPE", "global")]),
        );
        assert!(result.unwrap_err().to_string().contains("FINBOT_SESSION_SCOPE"));
    }

    #[test]
    fn test_config_hierarchy_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{"server": {"host": "127.0.0.1", "port": 7000}}"#,
            0o600,
        );

        let mut env = complete_env();
        env.push(("PORT", "7500"));
        env.push(("FINBOT_MODEL", "env-model"));

        let overrides = CliOverrides {
            host: None,
            port: Some(7999),
            model: Some("cli-model".to_string()),
        };
        let config = load_config_with_env(&overrides, Some(path), env_from(&env)).unwrap();

        // CLI > Env > File > Defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7999);
        assert_eq!(
            config.provider_config.as_ref().unwrap().default_model(),
            "cli-model"
        );
    }

    #[test]
    fn test_validate_reports_missing_fields_in_order() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "search.api_key",
                ..
            })
        ));

        config.search.api_key = Some("k".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "search.engine_id",
                ..
            })
        ));

        config.search.engine_id = Some("cx".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "provider_config",
                ..
            })
        ));

        config.provider_config = Some(ProviderConfig::llmproxy("k", ""));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = get_default_config_path() {
            assert!(path.to_string_lossy().contains(".finbot"));
            assert!(path.to_string_lossy().ends_with("config.json"));
        }
    }
}
