use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::services::window_lister::MalformedLinePolicy;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub lister: ListerConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListerConfig {
    pub command: String,
    pub list_args: Vec<String>,
    pub malformed_lines: MalformedLinePolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub namespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub refresh_delay_ms: u64,
    pub focus_errors_fatal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            lister: ListerConfig {
                command: "wmctrl".to_string(),
                list_args: vec!["-l".to_string()],
                malformed_lines: MalformedLinePolicy::Abort,
            },
            store: StoreConfig {
                backend: StoreBackend::File,
                path: None,
                namespace: "window/".to_string(),
            },
            session: SessionConfig {
                refresh_delay_ms: 500,
                focus_errors_fatal: false,
            },
        }
    }
}

impl Config {
    /// Слои: значения по умолчанию -> TOML файл (если есть) -> переменные WINSWITCH_*.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("WINSWITCH_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.lister.command.trim().is_empty() {
            anyhow::bail!("lister.command не может быть пустым");
        }

        if self.session.refresh_delay_ms == 0 || self.session.refresh_delay_ms > 10_000 {
            anyhow::bail!(
                "session.refresh_delay_ms должно быть в диапазоне 1..=10000, получено {}",
                self.session.refresh_delay_ms
            );
        }

        if self.store.namespace.is_empty() {
            anyhow::bail!("store.namespace не может быть пустым");
        }

        Ok(())
    }

    /// Путь к файлу хранилища: явный из конфигурации или `<data_dir>/winswitch/usage.json`.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .context("Не удалось определить каталог данных пользователя")?;
        Ok(data_dir.join("winswitch").join("usage.json"))
    }
}
