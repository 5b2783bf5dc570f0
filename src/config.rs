use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::paths::expand_home;

pub const DEFAULT_PROFILES_DIR: &str = "~/.config/dofus_linux_toolbox";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    pub profiles_dir: String,
    pub last_profile_file: String,
    pub cycle_state_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    /// Заголовок окна игрового клиента до переименования
    pub title_prefix: String,
    #[serde(default)]
    pub display: Option<String>,
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    pub reorganize_settle_ms: u64,
    pub reorganize_step_ms: u64,
    pub invite_step_ms: u64,
    pub invite_countdown_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    pub mute_followers: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub invite_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
                filter: String::new(),
            },
            paths: PathsConfig {
                profiles_dir: DEFAULT_PROFILES_DIR.to_string(),
                last_profile_file: format!("{}/last_profile.txt", DEFAULT_PROFILES_DIR),
                cycle_state_file: "/tmp/dofus_window_index".to_string(),
            },
            window: WindowConfig {
                title_prefix: "Dofus".to_string(),
                display: None,
                command_timeout_ms: 5000,
            },
            timing: TimingConfig {
                reorganize_settle_ms: 300,
                reorganize_step_ms: 100,
                invite_step_ms: 100,
                invite_countdown_ms: 1500,
            },
            audio: AudioConfig {
                mute_followers: true,
            },
            input: InputConfig {
                invite_template: "/invite {name}".to_string(),
            },
        }
    }
}

impl Config {
    /// Путь к конфигурации по умолчанию
    pub fn default_path() -> PathBuf {
        expand_home(DEFAULT_PROFILES_DIR).join("toolbox.toml")
    }

    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // PROFILES_DIR и DISPLAY поддерживаются для совместимости со старыми .env файлами
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::raw()
                    .filter(|key| key.as_str().eq_ignore_ascii_case("PROFILES_DIR"))
                    .map(|_| "paths.profiles_dir".into()),
            )
            .merge(
                Env::raw()
                    .filter(|key| key.as_str().eq_ignore_ascii_case("DISPLAY"))
                    .map(|_| "window.display".into()),
            )
            .merge(Env::prefixed("TOOLBOX_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек окон
        let prefix = self.window.title_prefix.trim();
        if prefix.is_empty() {
            anyhow::bail!("title_prefix не может быть пустым");
        }
        if prefix.contains('-') {
            anyhow::bail!(
                "title_prefix не должен содержать '-': {}",
                self.window.title_prefix
            );
        }

        if self.window.command_timeout_ms == 0 {
            anyhow::bail!("command_timeout_ms должно быть больше 0");
        }

        if !self.input.invite_template.contains("{name}") {
            anyhow::bail!(
                "invite_template должен содержать {{name}}: {}",
                self.input.invite_template
            );
        }

        if self.paths.cycle_state_file.trim().is_empty() {
            anyhow::bail!("cycle_state_file не может быть пустым");
        }

        Ok(())
    }

    pub fn profiles_dir(&self) -> PathBuf {
        expand_home(&self.paths.profiles_dir)
    }

    pub fn default_profiles_file(&self) -> PathBuf {
        self.profiles_dir().join("profiles.json")
    }

    pub fn last_profile_file(&self) -> PathBuf {
        expand_home(&self.paths.last_profile_file)
    }

    pub fn cycle_state_file(&self) -> PathBuf {
        expand_home(&self.paths.cycle_state_file)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.window.command_timeout_ms)
    }

    /// Заголовок окна после переименования: `<prefix>-<role>`
    pub fn game_title(&self, role: &str) -> String {
        format!("{}-{}", self.window.title_prefix, role)
    }

    pub fn invite_line(&self, character: &str) -> String {
        self.input.invite_template.replace("{name}", character)
    }
}
