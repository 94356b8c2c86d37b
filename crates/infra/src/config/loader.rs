//! Configuration loader
//!
//! Loads [`AppConfig`] from a TOML or JSON file, then applies environment
//! overrides and validates the result.
//!
//! ## Loading Strategy
//! 1. `.env` is read (if present) with `dotenvy`
//! 2. `AUTOPOST_CONFIG` names an explicit file; otherwise standard paths are
//!    searched
//! 3. With no file at all, defaults are used and the environment must supply
//!    the rest
//! 4. Environment variables override file values
//! 5. The merged configuration is validated
//!
//! ## Environment Variables
//! - `AUTOPOST_CONFIG`: Explicit config file path
//! - `AUTOPOST_CONSUMER_KEY`: OAuth consumer key
//! - `AUTOPOST_CONSUMER_SECRET`: OAuth consumer secret
//! - `AUTOPOST_ACCESS_TOKEN`: OAuth access token
//! - `AUTOPOST_TOKEN_SECRET`: OAuth token secret
//! - `AUTOPOST_GENERATION_API_KEY`: Bearer key for the generation API
//! - `AUTOPOST_INTERVAL_MINUTES`: Schedule interval in minutes
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./autopost.toml`, `./autopost.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use autopost_domain::constants::MAX_TOPICS;
use autopost_domain::{AppConfig, AutopostError, Result, RetryPolicy};
use url::Url;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "AUTOPOST_CONFIG";

const CONFIG_FILE_NAMES: [&str; 4] = ["autopost.toml", "autopost.json", "config.toml", "config.json"];

/// Load configuration from the standard sources.
///
/// # Errors
/// Returns `AutopostError::Config` if an explicit file is missing, a file
/// cannot be parsed, an override has an invalid value, or validation fails.
pub fn load() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = match explicit.or_else(find_config_file) {
        Some(path) => read_file(&path)?,
        None => {
            tracing::info!("No config file found; using defaults and environment");
            AppConfig::default()
        }
    };

    finish(config)
}

/// Load configuration from an explicit file, then apply environment
/// overrides and validate.
///
/// # Errors
/// Returns `AutopostError::Config` if the file is missing, unparsable, or the
/// merged configuration is invalid.
pub fn load_from_file(path: &Path) -> Result<AppConfig> {
    let config = read_file(path)?;
    finish(config)
}

fn finish(mut config: AppConfig) -> Result<AppConfig> {
    apply_env_overrides(&mut config)?;
    validate(&mut config)?;
    tracing::info!(
        topics = config.topics.len(),
        interval_minutes = config.schedule.interval_minutes,
        credentials_complete = config.credentials.is_complete(),
        "Configuration loaded"
    );
    Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(AutopostError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AutopostError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content.
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AutopostError::Config` if the format is unsupported or parsing
/// fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AutopostError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AutopostError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AutopostError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Apply `AUTOPOST_*` environment overrides on top of file values.
///
/// # Errors
/// Returns `AutopostError::Config` if `AUTOPOST_INTERVAL_MINUTES` is not a
/// number.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    let credentials = &mut config.credentials;
    override_string("AUTOPOST_CONSUMER_KEY", &mut credentials.consumer_key);
    override_string("AUTOPOST_CONSUMER_SECRET", &mut credentials.consumer_secret);
    override_string("AUTOPOST_ACCESS_TOKEN", &mut credentials.access_token);
    override_string("AUTOPOST_TOKEN_SECRET", &mut credentials.token_secret);

    if let Some(key) = env_non_empty("AUTOPOST_GENERATION_API_KEY") {
        config.generation.api_key = Some(key);
    }

    if let Some(raw) = env_non_empty("AUTOPOST_INTERVAL_MINUTES") {
        config.schedule.interval_minutes = raw.trim().parse::<u64>().map_err(|e| {
            AutopostError::Config(format!("Invalid AUTOPOST_INTERVAL_MINUTES: {e}"))
        })?;
    }

    Ok(())
}

/// Validate and normalize a merged configuration.
///
/// Topics are trimmed and blanks dropped; the retry policy is clamped.
///
/// # Errors
/// Returns `AutopostError::Config` when there are no topics or more than
/// [`MAX_TOPICS`], the interval is zero, or an endpoint URL does not parse.
pub fn validate(config: &mut AppConfig) -> Result<()> {
    config.topics = config.clean_topics();
    if config.topics.is_empty() {
        return Err(AutopostError::Config("At least one topic is required".to_string()));
    }
    if config.topics.len() > MAX_TOPICS {
        return Err(AutopostError::Config(format!(
            "At most {MAX_TOPICS} topics are allowed, found {}",
            config.topics.len()
        )));
    }

    if config.schedule.interval_minutes == 0 {
        return Err(AutopostError::Config("Interval must be at least 1 minute".to_string()));
    }

    let clamped: RetryPolicy = config.retry.clamped();
    if clamped != config.retry {
        tracing::warn!(?clamped, "Retry policy adjusted to sane bounds");
        config.retry = clamped;
    }

    for (name, value) in [
        ("publish.endpoint", &config.publish.endpoint),
        ("publish.share_intent_url", &config.publish.share_intent_url),
        ("generation.api_url", &config.generation.api_url),
    ] {
        Url::parse(value)
            .map_err(|e| AutopostError::Config(format!("Invalid URL for {name}: {e}")))?;
    }

    Ok(())
}

fn override_string(key: &str, target: &mut String) {
    if let Some(value) = env_non_empty(key) {
        *target = value;
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 6] = [
        "AUTOPOST_CONSUMER_KEY",
        "AUTOPOST_CONSUMER_SECRET",
        "AUTOPOST_ACCESS_TOKEN",
        "AUTOPOST_TOKEN_SECRET",
        "AUTOPOST_GENERATION_API_KEY",
        "AUTOPOST_INTERVAL_MINUTES",
    ];

    fn clear_env() {
        for key in OVERRIDE_VARS {
            std::env::remove_var(key);
        }
    }

    fn config_with_topics(topics: &[&str]) -> AppConfig {
        AppConfig { topics: topics.iter().map(|t| (*t).to_string()).collect(), ..Default::default() }
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let mut config = config_with_topics(&["rust"]);
        config.credentials.consumer_key = "file-key".into();

        std::env::set_var("AUTOPOST_CONSUMER_KEY", "env-key");
        std::env::set_var("AUTOPOST_TOKEN_SECRET", "env-token-secret");
        std::env::set_var("AUTOPOST_GENERATION_API_KEY", "sk-env");
        std::env::set_var("AUTOPOST_INTERVAL_MINUTES", "15");

        apply_env_overrides(&mut config).expect("overrides apply");

        assert_eq!(config.credentials.consumer_key, "env-key");
        assert_eq!(config.credentials.token_secret, "env-token-secret");
        assert_eq!(config.generation.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.schedule.interval_minutes, 15);

        clear_env();
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let mut config = config_with_topics(&["rust"]);
        config.credentials.access_token = "file-token".into();
        std::env::set_var("AUTOPOST_ACCESS_TOKEN", "   ");

        apply_env_overrides(&mut config).expect("overrides apply");
        assert_eq!(config.credentials.access_token, "file-token");

        clear_env();
    }

    #[test]
    fn test_invalid_interval_override() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("AUTOPOST_INTERVAL_MINUTES", "forty");
        let mut config = config_with_topics(&["rust"]);
        let err = apply_env_overrides(&mut config).expect_err("non-numeric interval");
        assert!(matches!(err, AutopostError::Config(_)));

        clear_env();
    }

    #[test]
    fn test_validate_requires_topics() {
        let mut config = config_with_topics(&["  ", ""]);
        let err = validate(&mut config).expect_err("no topics");
        assert!(matches!(err, AutopostError::Config(msg) if msg.contains("topic")));
    }

    #[test]
    fn test_validate_limits_topic_count() {
        let topics: Vec<String> = (0..=MAX_TOPICS).map(|i| format!("topic {i}")).collect();
        let mut config = AppConfig { topics, ..Default::default() };
        assert!(validate(&mut config).is_err());

        config.topics.truncate(MAX_TOPICS);
        assert!(validate(&mut config).is_ok());
    }

    #[test]
    fn test_validate_trims_topics_and_clamps_retry() {
        let mut config = config_with_topics(&[" rust ", "", "tokio"]);
        config.retry.max_attempts = 0;
        config.retry.backoff_multiplier = 0.5;

        validate(&mut config).expect("valid config");

        assert_eq!(config.topics, vec!["rust".to_string(), "tokio".to_string()]);
        assert_eq!(config.retry.max_attempts, 1);
        assert!((config.retry.backoff_multiplier - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = config_with_topics(&["rust"]);
        config.schedule.interval_minutes = 0;
        assert!(validate(&mut config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = config_with_topics(&["rust"]);
        config.publish.endpoint = "not a url".into();
        let err = validate(&mut config).expect_err("bad endpoint");
        assert!(matches!(err, AutopostError::Config(msg) if msg.contains("publish.endpoint")));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
topics = ["rust", "tokio"]

[credentials]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
token_secret = "ts"

[schedule]
interval_minutes = 30
"#;

        let config = parse_config(toml_content, Path::new("autopost.toml")).expect("valid TOML");
        assert_eq!(config.topics.len(), 2);
        assert_eq!(config.schedule.interval_minutes, 30);
        assert!(config.credentials.is_complete());
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "topics": ["rust"],
            "retry": { "max_attempts": 5, "base_delay_ms": 100, "backoff_multiplier": 3.0 }
        }"#;

        let config = parse_config(json_content, Path::new("autopost.json")).expect("valid JSON");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 100);
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("topics: [rust]", Path::new("autopost.yaml"));
        assert!(matches!(result, Err(AutopostError::Config(_))));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Path::new("/nonexistent/autopost.toml"));
        assert!(matches!(result, Err(AutopostError::Config(msg)) if msg.contains("not found")));
    }
}
