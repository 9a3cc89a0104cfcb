// src/config/load.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{EngineConfig, DEFAULT_USER_AGENT};

pub const ENV_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";
const ENV_RAPIDAPI_KEY: &str = "RAPIDAPI_KEY";
const ENV_USAJOBS_KEY: &str = "USAJOBS_API_KEY";

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading engine config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())?;
    Ok(finalize(cfg))
}

/// Load config using env var + fallbacks:
/// 1) $ENGINE_CONFIG_PATH
/// 2) config/engine.toml
/// 3) config/engine.json
/// 4) built-in defaults
pub fn load_default() -> Result<EngineConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("ENGINE_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/engine.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/engine.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(finalize(EngineConfig::default()))
}

fn parse_config(s: &str, hint_ext: &str) -> Result<EngineConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing engine config json");
    }
    if hint_ext == "toml" {
        return toml::from_str(s).context("parsing engine config toml");
    }
    // Unknown extension: sniff.
    if s.trim_start().starts_with('{') {
        serde_json::from_str(s).context("parsing engine config json")
    } else {
        toml::from_str(s).context("parsing engine config toml")
    }
}

/// Resolve secrets from the environment and clamp nonsense values.
fn finalize(mut cfg: EngineConfig) -> EngineConfig {
    cfg.providers.rapidapi_key = resolve_secret(cfg.providers.rapidapi_key.take(), ENV_RAPIDAPI_KEY);
    cfg.providers.usajobs_key = resolve_secret(cfg.providers.usajobs_key.take(), ENV_USAJOBS_KEY);

    let defaults = EngineConfig::default();
    if cfg.breaker.failure_threshold == 0 {
        cfg.breaker.failure_threshold = 1;
    }
    if cfg.breaker.open_timeout_secs == 0 {
        cfg.breaker.open_timeout_secs = defaults.breaker.open_timeout_secs;
    }
    if cfg.http.connect_timeout_ms == 0 {
        cfg.http.connect_timeout_ms = defaults.http.connect_timeout_ms;
    }
    if cfg.http.request_timeout_ms == 0 {
        cfg.http.request_timeout_ms = defaults.http.request_timeout_ms;
    }
    if cfg.http.user_agent.trim().is_empty() {
        cfg.http.user_agent = DEFAULT_USER_AGENT.to_string();
    }
    if cfg.acquire.request_deadline_ms == 0 {
        cfg.acquire.request_deadline_ms = defaults.acquire.request_deadline_ms;
    }
    if cfg.acquire.default_location.trim().is_empty() {
        cfg.acquire.default_location = defaults.acquire.default_location;
    }
    if cfg.acquire.synthetic_url_base.trim().is_empty() {
        cfg.acquire.synthetic_url_base = defaults.acquire.synthetic_url_base;
    }
    cfg.acquire.synthetic_url_base = cfg
        .acquire
        .synthetic_url_base
        .trim_end_matches('/')
        .to_string();
    cfg
}

/// Env wins when set and non-empty; "ENV"/blank in the file means "env only".
fn resolve_secret(file_value: Option<String>, env_name: &str) -> Option<String> {
    let from_env = std::env::var(env_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if from_env.is_some() {
        return from_env;
    }
    file_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("env"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = r#"
            [breaker]
            failure_threshold = 5

            [acquire]
            fan_out = true
        "#;
        let cfg = finalize(parse_config(s, "toml").unwrap());
        assert_eq!(cfg.breaker.failure_threshold, 5);
        assert_eq!(cfg.breaker.open_timeout_secs, 60);
        assert!(cfg.acquire.fan_out);
        assert_eq!(cfg.http.max_retries, 2);
        assert_eq!(cfg.acquire.default_location, "US");
    }

    #[test]
    fn json_is_sniffed_without_extension() {
        let s = r#"{"http": {"max_retries": 0, "request_timeout_ms": 0}}"#;
        let cfg = finalize(parse_config(s, "").unwrap());
        assert_eq!(cfg.http.max_retries, 0);
        // zero timeout replaced by default
        assert_eq!(cfg.http.request_timeout_ms, 12_000);
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let s = "[breaker]\nfailure_threshold = 0\n";
        let cfg = finalize(parse_config(s, "toml").unwrap());
        assert_eq!(cfg.breaker.failure_threshold, 1);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_RAPIDAPI_KEY);

        // No files in temp CWD → defaults
        let cfg = load_default().unwrap();
        assert_eq!(cfg.breaker.failure_threshold, 3);
        assert!(cfg.providers.rapidapi_key.is_none());

        // Env path wins
        let p = tmp.path().join("custom.json");
        fs::write(&p, r#"{"breaker": {"open_timeout_secs": 7}}"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let cfg2 = load_default().unwrap();
        assert_eq!(cfg2.breaker.open_timeout_secs, 7);

        // Non-existent env path is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
        assert!(load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }

    #[serial_test::serial]
    #[test]
    fn env_secret_overrides_file_placeholder() {
        env::set_var(ENV_RAPIDAPI_KEY, "  from-env ");
        assert_eq!(
            resolve_secret(Some("ENV".into()), ENV_RAPIDAPI_KEY).as_deref(),
            Some("from-env")
        );
        env::remove_var(ENV_RAPIDAPI_KEY);
        assert_eq!(resolve_secret(Some("ENV".into()), ENV_RAPIDAPI_KEY), None);
        assert_eq!(
            resolve_secret(Some("abc".into()), ENV_RAPIDAPI_KEY).as_deref(),
            Some("abc")
        );
    }
}
