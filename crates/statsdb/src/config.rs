// Configuration loading and validation (config/statsdb.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_SEASON: u16 = 2023;
pub const DEFAULT_STATS_API_BASE: &str = "https://statsapi.mlb.com/api/v1/stats";
pub const DEFAULT_WAR_BATTING_URL: &str =
    "https://www.baseball-reference.com/data/war_daily_bat.txt";
pub const DEFAULT_WAR_PITCHING_URL: &str =
    "https://www.baseball-reference.com/data/war_daily_pitch.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "statsDatabase.json";
pub const DEFAULT_PLAYER_POOL: &str = "all";
pub const DEFAULT_LIMIT: u32 = 10_000;

/// Location of the optional config file, relative to the base directory.
pub const CONFIG_FILE: &str = "config/statsdb.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not readable: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Everything a run needs. Every key is optional in the TOML file and falls
/// back to the compiled-in default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub season: u16,
    pub output_path: PathBuf,
    pub stats_api: StatsApiConfig,
    pub war: WarSources,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatsApiConfig {
    pub base_url: String,
    pub player_pool: String,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WarSources {
    pub batting_url: String,
    pub pitching_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            stats_api: StatsApiConfig::default(),
            war: WarSources::default(),
        }
    }
}

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STATS_API_BASE.to_string(),
            player_pool: DEFAULT_PLAYER_POOL.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Default for WarSources {
    fn default() -> Self {
        Self {
            batting_url: DEFAULT_WAR_BATTING_URL.to_string(),
            pitching_url: DEFAULT_WAR_PITCHING_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from `config/statsdb.toml` under `base_dir`. A missing
/// file is not an error: the defaults are used as-is.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join(CONFIG_FILE);
    let config = if path.exists() {
        let text = read_file(&path)?;
        parse_config(&text, &path)?
    } else {
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url_fields: &[(&str, &str)] = &[
        ("stats_api.base_url", config.stats_api.base_url.as_str()),
        ("war.batting_url", config.war.batting_url.as_str()),
        ("war.pitching_url", config.war.pitching_url.as_str()),
    ];
    for (name, val) in url_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.stats_api.player_pool.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "stats_api.player_pool".into(),
            message: "must not be empty".into(),
        });
    }

    if config.stats_api.limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "stats_api.limit".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.output_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output_path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, text: &str) {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("statsdb.toml"), text).unwrap();
    }

    /// The bundled defaults file shipped next to Cargo.toml.
    fn defaults_file() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        manifest.join("defaults/statsdb.toml")
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config_from(tmp.path()).expect("defaults should validate");
        assert_eq!(config, Config::default());
        assert_eq!(config.season, 2023);
        assert_eq!(config.output_path, PathBuf::from("statsDatabase.json"));
        assert_eq!(config.stats_api.limit, 10_000);
        assert_eq!(config.stats_api.player_pool, "all");
    }

    #[test]
    fn bundled_defaults_match_compiled_defaults() {
        let text = fs::read_to_string(defaults_file()).expect("defaults/statsdb.toml should exist");
        let config = parse_config(&text, &defaults_file()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(
            tmp.path(),
            r#"
season = 2022

[war]
batting_url = "http://localhost:9000/bat.txt"
"#,
        );

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.season, 2022);
        assert_eq!(config.war.batting_url, "http://localhost:9000/bat.txt");
        assert_eq!(config.war.pitching_url, DEFAULT_WAR_PITCHING_URL);
        assert_eq!(config.stats_api.base_url, DEFAULT_STATS_API_BASE);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "season = [not valid");

        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_zero_limit() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[stats_api]\nlimit = 0\n");

        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "stats_api.limit"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_url() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[war]\npitching_url = \"  \"\n");

        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "war.pitching_url"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_player_pool() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[stats_api]\nplayer_pool = \"\"\n");

        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "stats_api.player_pool");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_output_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "output_path = \"\"\n");

        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "output_path"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }
}
