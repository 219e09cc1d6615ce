//! Worker configuration: optional TOML file layered under environment
//! variable overrides.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct WorkerConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Seconds between monitoring passes.
    #[serde(default = "default_pass_interval")]
    pub pass_interval_seconds: u64,

    /// Upper bound on simultaneous outbound probes.
    #[serde(default = "default_max_probes")]
    pub max_concurrent_probes: usize,

    /// Alert delivery channel: "twilio" or "webhook".
    #[serde(default = "default_alert_channel")]
    pub alert_channel: String,

    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_phone: Option<String>,

    pub webhook_url: Option<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialWorkerConfig {
    data_dir: Option<String>,
    log_dir: Option<String>,
    pass_interval_seconds: Option<u64>,
    max_concurrent_probes: Option<usize>,
    alert_channel: Option<String>,
    twilio_account_sid: Option<String>,
    twilio_auth_token: Option<String>,
    twilio_from_phone: Option<String>,
    webhook_url: Option<String>,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_pass_interval() -> u64 {
    60
}

fn default_max_probes() -> usize {
    64
}

fn default_alert_channel() -> String {
    "twilio".to_string()
}

fn env_string(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String> {
    match env_string(env, key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("{key} has an invalid value: {raw}")),
        None => Ok(None),
    }
}

impl WorkerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();
        Self::load_with_env(config_path, &|key| env::var(key).ok())
    }

    // The environment lookup is injected so tests are insulated from the
    // host's variables.
    fn load_with_env(
        config_path: Option<&str>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        // 1. Load from file (optional)
        let file_config: PartialWorkerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                return Err(format!("Config file {path:?} does not exist"));
            }
        } else {
            PartialWorkerConfig::default()
        };

        // 2. Merge: environment overrides file, defaults fill the rest
        let final_config = WorkerConfig {
            data_dir: env_string(env, "UPCHECK_DATA_DIR")
                .or(file_config.data_dir)
                .unwrap_or_else(default_data_dir),
            log_dir: env_string(env, "UPCHECK_LOG_DIR")
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            pass_interval_seconds: env_parsed(env, "UPCHECK_PASS_INTERVAL_SECONDS")?
                .or(file_config.pass_interval_seconds)
                .unwrap_or_else(default_pass_interval),
            max_concurrent_probes: env_parsed(env, "UPCHECK_MAX_CONCURRENT_PROBES")?
                .or(file_config.max_concurrent_probes)
                .unwrap_or_else(default_max_probes),
            alert_channel: env_string(env, "UPCHECK_ALERT_CHANNEL")
                .or(file_config.alert_channel)
                .unwrap_or_else(default_alert_channel),
            twilio_account_sid: env_string(env, "UPCHECK_TWILIO_ACCOUNT_SID")
                .or(file_config.twilio_account_sid),
            twilio_auth_token: env_string(env, "UPCHECK_TWILIO_AUTH_TOKEN")
                .or(file_config.twilio_auth_token),
            twilio_from_phone: env_string(env, "UPCHECK_TWILIO_FROM_PHONE")
                .or(file_config.twilio_from_phone),
            webhook_url: env_string(env, "UPCHECK_WEBHOOK_URL").or(file_config.webhook_url),
        };

        if final_config.pass_interval_seconds == 0 {
            return Err("pass_interval_seconds must be at least 1".to_string());
        }
        if final_config.max_concurrent_probes == 0 {
            return Err("max_concurrent_probes must be at least 1".to_string());
        }

        Ok(final_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = WorkerConfig::load_with_env(None, &no_env).unwrap();
        assert_eq!(config.pass_interval_seconds, 60);
        assert_eq!(config.max_concurrent_probes, 64);
        assert_eq!(config.alert_channel, "twilio");
        assert_eq!(config.data_dir, "data");
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "pass_interval_seconds = 30\nalert_channel = \"webhook\"\nwebhook_url = \"http://hooks.example.com/alert\""
        )
        .unwrap();

        let config = WorkerConfig::load_with_env(file.path().to_str(), &no_env).unwrap();
        assert_eq!(config.pass_interval_seconds, 30);
        assert_eq!(config.alert_channel, "webhook");
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("http://hooks.example.com/alert")
        );
        // Untouched keys keep their defaults.
        assert_eq!(config.max_concurrent_probes, 64);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pass_interval_seconds = 30\ndata_dir = \"from-file\"").unwrap();

        let env = |key: &str| match key {
            "UPCHECK_PASS_INTERVAL_SECONDS" => Some("15".to_string()),
            _ => None,
        };
        let config = WorkerConfig::load_with_env(file.path().to_str(), &env).unwrap();
        assert_eq!(config.pass_interval_seconds, 15);
        // Keys without an environment override still come from the file.
        assert_eq!(config.data_dir, "from-file");
    }

    #[test]
    fn unparseable_environment_values_are_errors() {
        let env = |key: &str| match key {
            "UPCHECK_MAX_CONCURRENT_PROBES" => Some("lots".to_string()),
            _ => None,
        };
        assert!(WorkerConfig::load_with_env(None, &env).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = WorkerConfig::load_with_env(Some("/definitely/not/a/real/path.toml"), &no_env);
        assert!(result.is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pass_interval_seconds = 0").unwrap();
        assert!(WorkerConfig::load_with_env(file.path().to_str(), &no_env).is_err());
    }
}
