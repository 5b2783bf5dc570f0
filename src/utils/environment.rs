use crate::config::Config;
use crate::error::{Result, ToolboxError};
use crate::utils::paths::find_in_path;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Внешние утилиты: имя, обязательность, назначение
const TOOLS: &[(&str, bool, &str)] = &[
    ("wmctrl", true, "список, переименование и перенос окон"),
    ("xprop", false, "PID окна для заглушения звука"),
    ("pactl", false, "заглушение звука"),
    ("xdotool", false, "приглашения в группу"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCheck {
    pub name: &'static str,
    pub required: bool,
    pub purpose: &'static str,
    pub path: Option<PathBuf>,
}

impl ToolCheck {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Проверить окружение: дисплей, сессию, утилиты и файл профилей
pub fn check_environment(config: &Config, profiles_file: &Path) -> Result<Vec<ToolCheck>> {
    info!("Проверка окружения...");

    check_display(config);
    check_session();

    if profiles_file.is_file() {
        info!("Файл профилей: {:?}", profiles_file);
    } else {
        warn!("Файл профилей {:?} не существует", profiles_file);
    }

    let checks = check_tools_with(find_in_path);
    for check in &checks {
        match (&check.path, check.required) {
            (Some(path), _) => info!("{} найден: {:?}", check.name, path),
            (None, true) => warn!(
                "{} не найден ({}), установите пакет {}",
                check.name, check.purpose, check.name
            ),
            (None, false) => warn!("{} не найден, недоступно: {}", check.name, check.purpose),
        }
    }

    if let Some(missing) = checks.iter().find(|check| check.required && !check.found()) {
        return Err(ToolboxError::ToolMissing(missing.name.to_string()));
    }

    info!("Проверка окружения завершена успешно");
    Ok(checks)
}

pub fn check_tools_with(lookup: impl Fn(&str) -> Option<PathBuf>) -> Vec<ToolCheck> {
    TOOLS
        .iter()
        .map(|&(name, required, purpose)| ToolCheck {
            name,
            required,
            purpose,
            path: lookup(name),
        })
        .collect()
}

fn check_display(config: &Config) {
    match config.window.display.as_deref() {
        Some(value) if !value.is_empty() => info!("DISPLAY={}", value),
        _ => match std::env::var("DISPLAY") {
            Ok(value) => info!("DISPLAY={} (из окружения)", value),
            Err(_) => warn!("DISPLAY не задан, утилиты X11 не смогут подключиться к дисплею"),
        },
    }
}

fn check_session() {
    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        if session == "wayland" {
            warn!("Wayland-сессия: wmctrl видит только окна XWayland");
        } else {
            info!("Тип сессии: {}", session);
        }
    }
}
