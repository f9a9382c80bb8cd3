use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::mindergas;

const DEFAULT_CONFIG_NAME: &str = ".homewizard-companion";

#[derive(Debug, Clone)]
pub struct Config {
    pub p1: P1Config,
    pub mindergas: MindergasConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone)]
pub struct P1Config {
    pub ip: String,
}

#[derive(Debug, Clone)]
pub struct MindergasConfig {
    pub token: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub hour: u32,
    pub minute: u32,
    pub poll_interval_secs: u64,
    pub jitter_min_minutes: u64,
    pub jitter_max_minutes: u64,
}

// Serde structs for the optional YAML config file
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    p1: RawP1,
    #[serde(default)]
    mindergas: RawMindergas,
    #[serde(default)]
    export: RawExport,
}

#[derive(Debug, Default, Deserialize)]
struct RawP1 {
    ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMindergas {
    token: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawExport {
    time: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, String> {
    match non_empty(value) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value: {v}")),
        None => Ok(default),
    }
}

/// Parse "HH:MM" into (hour, minute).
fn parse_export_time(value: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("Export time must be HH:MM, got '{value}'");
    let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    /// `config_file` comes from `--config` or `CONFIG_FILE`; without it the
    /// default file in `$HOME` is used when present.
    pub fn from_env(config_file: Option<&Path>) -> Result<Self, String> {
        let home = env::var_os("HOME").map(PathBuf::from);
        let raw = match resolve_config_file(config_file, home.as_deref()) {
            Some(path) => {
                let raw = load_file(&path)?;
                info!("Using config file {}", path.display());
                raw
            }
            None => RawConfig::default(),
        };

        Self::from_sources(raw, |key| env::var(key).ok())
    }

    fn from_sources(raw: RawConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let ip = non_empty(env("P1_IP"))
            .or(non_empty(raw.p1.ip))
            .ok_or("No P1 ip configured, set P1_IP or p1.ip to the ip address of your P1 meter")?;

        let token = non_empty(env("MINDERGAS_TOKEN"))
            .or(non_empty(raw.mindergas.token))
            .ok_or(
                "No mindergas token configured, set MINDERGAS_TOKEN or mindergas.token to the \
                 authentication token of your mindergas.nl account",
            )?;

        let url = non_empty(env("MINDERGAS_URL"))
            .or(non_empty(raw.mindergas.url))
            .unwrap_or_else(|| mindergas::DEFAULT_URL.to_string());

        let time = non_empty(env("EXPORT_TIME"))
            .or(non_empty(raw.export.time))
            .unwrap_or_else(|| "23:59".to_string());
        let (hour, minute) = parse_export_time(&time)?;

        let config = Self {
            p1: P1Config {
                ip: ip.trim().to_string(),
            },
            mindergas: MindergasConfig {
                token: token.trim().to_string(),
                url,
            },
            export: ExportConfig {
                hour,
                minute,
                poll_interval_secs: parse_or_default(
                    "POLL_INTERVAL_SECS",
                    env("POLL_INTERVAL_SECS"),
                    5,
                )?,
                jitter_min_minutes: parse_or_default(
                    "JITTER_MIN_MINUTES",
                    env("JITTER_MIN_MINUTES"),
                    1,
                )?,
                jitter_max_minutes: parse_or_default(
                    "JITTER_MAX_MINUTES",
                    env("JITTER_MAX_MINUTES"),
                    14,
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.export.poll_interval_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be > 0".into());
        }
        if self.export.jitter_min_minutes > self.export.jitter_max_minutes {
            return Err("JITTER_MIN_MINUTES must not exceed JITTER_MAX_MINUTES".into());
        }
        Ok(())
    }
}

/// An explicitly named file always wins and must exist; the default file
/// in `home` is only used if it is there.
fn resolve_config_file(explicit: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    match explicit.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => Some(path.to_path_buf()),
        None => home
            .map(|home| home.join(DEFAULT_CONFIG_NAME))
            .filter(|path| path.is_file()),
    }
}

fn load_file(path: &Path) -> Result<RawConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_file(&content).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

fn parse_file(content: &str) -> Result<RawConfig, serde_yml::Error> {
    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }
    serde_yml::from_str(content)
}
