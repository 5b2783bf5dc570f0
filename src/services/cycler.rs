use crate::error::{Result, ToolboxError};
use crate::models::{Direction, Profile};
use crate::services::window_manager::WindowManager;
use crate::toolbox_error;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Выбрать следующую роль по кругу, пропуская роли без открытого окна.
///
/// `last` - индекс роли, получившей фокус в прошлый раз.
pub fn next_role_index(
    roles: &[String],
    available: &[&str],
    last: usize,
    direction: Direction,
) -> Option<usize> {
    let total = roles.len();
    if total == 0 {
        return None;
    }
    let last = last % total;

    (1..=total)
        .map(|step| match direction {
            Direction::Forward => (last + step) % total,
            Direction::Backward => (last + total - step) % total,
        })
        .find(|&index| available.contains(&roles[index].as_str()))
}

/// Переключение фокуса между окнами профиля с сохранением позиции между запусками
pub struct WindowCycler {
    state_file: PathBuf,
}

impl WindowCycler {
    pub fn new(state_file: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
        }
    }

    /// Последний индекс; отсутствующий или испорченный файл даёт 0
    pub fn load_index(&self) -> usize {
        fs::read_to_string(&self.state_file)
            .ok()
            .and_then(|content| content.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn store_index(&self, index: usize) -> Result<()> {
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.state_file, format!("{}\n", index))?;
        Ok(())
    }

    /// Передать фокус следующему окну профиля, вернуть его роль
    pub async fn cycle(
        &self,
        profile: &Profile,
        windows: &WindowManager,
        direction: Direction,
    ) -> Result<Option<String>> {
        if profile.roles.is_empty() {
            return Err(toolbox_error!(empty_profile, "{}", profile.name));
        }

        let prefix = windows.title_prefix().to_string();
        let game_windows = windows.list_game_windows().await;
        let available: Vec<&str> = game_windows
            .iter()
            .filter_map(|window| window.role(&prefix))
            .collect();

        if available.is_empty() {
            return ToolboxError::no_windows(format!(
                "нет окон вида '{}-<роль>', сначала переименуйте окна",
                prefix
            ));
        }

        let last = self.load_index();
        let Some(next) = next_role_index(&profile.roles, &available, last, direction) else {
            warn!(
                "Ни одна роль профиля '{}' не совпадает с открытыми окнами {:?}",
                profile.name, available
            );
            return Ok(None);
        };

        let role = &profile.roles[next];
        let target = game_windows
            .iter()
            .find(|window| window.role(&prefix) == Some(role.as_str()))
            .ok_or_else(|| toolbox_error!(internal, "окно роли {} исчезло", role))?;

        debug!("Переключение {} с #{} на #{} ({})", direction, last, next, target);
        windows.activate(&target.id).await?;
        self.store_index(next)?;

        info!("Фокус: {}", role);
        Ok(Some(role.clone()))
    }
}
