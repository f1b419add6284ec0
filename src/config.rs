use crate::collectors::{CollectOptions, DEFAULT_CPU_SAMPLE_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_cpu_sample_interval")]
    pub cpu_sample_interval: String,
    #[serde(default = "default_collect_timeout")]
    pub collect_timeout: String,
    #[serde(default = "default_size_suffix")]
    pub size_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_sample_interval: default_cpu_sample_interval(),
            collect_timeout: default_collect_timeout(),
            size_suffix: default_size_suffix(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("не удалось прочитать файл конфигурации {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("не удалось разобрать YAML в {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("ошибка валидации конфигурации: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg = Self::from_yaml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path_display,
                source,
            },
            other => other,
        })?;
        Ok(cfg)
    }

    /// Like [`Config::load_from_file`], but a missing file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sample = self.cpu_sample_interval()?;
        let timeout = self.collect_timeout()?;
        if timeout.is_zero() {
            return Err(ConfigError::Validation(
                "collect_timeout должно быть > 0".to_string(),
            ));
        }
        if timeout <= sample {
            return Err(ConfigError::Validation(
                "collect_timeout должно быть больше cpu_sample_interval".to_string(),
            ));
        }
        if self.size_suffix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "size_suffix не должен быть пустым".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cpu_sample_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration_field("cpu_sample_interval", &self.cpu_sample_interval)
    }

    pub fn collect_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration_field("collect_timeout", &self.collect_timeout)
    }

    pub fn collect_options(&self) -> Result<CollectOptions, ConfigError> {
        Ok(CollectOptions {
            cpu_sample_interval: self.cpu_sample_interval()?,
        })
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn parse_duration_field(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|err| {
        ConfigError::Validation(format!("{field}: некорректная длительность '{value}': {err}"))
    })
}

fn default_cpu_sample_interval() -> String {
    humantime::format_duration(DEFAULT_CPU_SAMPLE_INTERVAL).to_string()
}

fn default_collect_timeout() -> String {
    "10s".to_string()
}

fn default_size_suffix() -> String {
    "B".to_string()
}
