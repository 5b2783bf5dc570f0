use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{Result, ToolboxError};
use crate::models::{Desktop, GameWindow};
use crate::services::command_runner::{CommandOutput, CommandRunner};
use std::sync::Arc;
use tracing::{debug, warn};

use super::wmctrl::{parse_desktops, parse_window_list};
use super::xprop::parse_wm_pid;

pub struct WindowManager {
    runner: Arc<dyn CommandRunner>,
    title_prefix: String,
}

impl WindowManager {
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            title_prefix: config.window.title_prefix.clone(),
        }
    }

    pub fn title_prefix(&self) -> &str {
        &self.title_prefix
    }

    /// Игровые окна в порядке, в котором их перечисляет wmctrl.
    ///
    /// Ошибка wmctrl не прерывает работу: возвращается пустой список.
    pub async fn list_game_windows(&self) -> Vec<GameWindow> {
        let output = match self.runner.run("wmctrl", &["-l", "-p"]).await {
            Ok(output) if output.success() => output,
            Ok(output) => {
                warn!("wmctrl -l вернул код {}: {}", output.status, output.stderr.trim());
                return Vec::new();
            }
            Err(e) => {
                warn!("Не удалось получить список окон: {}", e);
                return Vec::new();
            }
        };

        let windows = parse_window_list(&output.stdout, &self.title_prefix);
        debug_if_enabled!("Найдены окна: {:?}", windows);
        windows
    }

    pub async fn list_desktops(&self) -> Result<Vec<Desktop>> {
        let output = self.checked("wmctrl", &["-d"]).await?;
        Ok(parse_desktops(&output.stdout))
    }

    /// Снять максимизацию, иначе часть оконных менеджеров игнорирует переименование
    pub async fn unmaximize(&self, window_id: &str) -> Result<()> {
        self.checked(
            "wmctrl",
            &["-ir", window_id, "-b", "remove,maximized_vert,maximized_horz"],
        )
        .await
        .map(|_| ())
    }

    pub async fn rename(&self, window_id: &str, title: &str) -> Result<()> {
        debug!("Переименование {} в '{}'", window_id, title);
        self.checked("wmctrl", &["-ir", window_id, "-N", title])
            .await
            .map(|_| ())
    }

    pub async fn move_to_desktop(&self, window_id: &str, desktop: u32) -> Result<()> {
        let desktop = desktop.to_string();
        self.checked("wmctrl", &["-ir", window_id, "-t", &desktop])
            .await
            .map(|_| ())
    }

    pub async fn activate(&self, window_id: &str) -> Result<()> {
        self.checked("wmctrl", &["-ia", window_id]).await.map(|_| ())
    }

    /// PID процесса окна: из колонки wmctrl, иначе через `_NET_WM_PID`
    pub async fn window_pid(&self, window: &GameWindow) -> Option<u32> {
        if let Some(pid) = window.pid {
            return Some(pid);
        }

        match self.runner.run("xprop", &["-id", &window.id, "_NET_WM_PID"]).await {
            Ok(output) if output.success() => parse_wm_pid(&output.stdout),
            Ok(output) => {
                debug!("xprop для {} вернул код {}", window.id, output.status);
                None
            }
            Err(e) => {
                debug!("xprop недоступен: {}", e);
                None
            }
        }
    }

    async fn checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.runner.run(program, args).await?;
        if !output.success() {
            return Err(ToolboxError::CommandFailed {
                program: format!("{} {}", program, args.join(" ")),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::command_runner::DryRunCommandRunner;

    fn manager(runner: Arc<DryRunCommandRunner>) -> WindowManager {
        WindowManager::new(&Config::default(), runner)
    }

    #[tokio::test]
    async fn test_failed_listing_yields_no_windows() {
        let runner = Arc::new(DryRunCommandRunner::new().with_response(
            "wmctrl",
            &["-l", "-p"],
            CommandOutput::failed(1, "Cannot open display."),
        ));

        assert!(manager(runner).list_game_windows().await.is_empty());
    }

    #[tokio::test]
    async fn test_rename_issues_wmctrl_calls() {
        let runner = Arc::new(DryRunCommandRunner::new());
        let wm = manager(runner.clone());

        wm.unmaximize("0x01").await.unwrap();
        wm.rename("0x01", "Dofus-Iop").await.unwrap();
        wm.move_to_desktop("0x01", 1).await.unwrap();
        wm.activate("0x01").await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "wmctrl -ir 0x01 -b remove,maximized_vert,maximized_horz",
                "wmctrl -ir 0x01 -N Dofus-Iop",
                "wmctrl -ir 0x01 -t 1",
                "wmctrl -ia 0x01",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_command_is_an_error() {
        let runner = Arc::new(DryRunCommandRunner::new().with_response(
            "wmctrl",
            &["-ia", "0x09"],
            CommandOutput::failed(1, "no such window"),
        ));

        let result = manager(runner).activate("0x09").await;
        assert!(matches!(result, Err(ToolboxError::CommandFailed { status: 1, .. })));
    }

    #[tokio::test]
    async fn test_window_pid_falls_back_to_xprop() {
        let runner = Arc::new(DryRunCommandRunner::new().with_response(
            "xprop",
            &["-id", "0x02", "_NET_WM_PID"],
            CommandOutput::ok("_NET_WM_PID(CARDINAL) = 777"),
        ));
        let wm = manager(runner.clone());

        let known = GameWindow::new("0x01", "Dofus").with_pid(42);
        assert_eq!(wm.window_pid(&known).await, Some(42));
        assert!(runner.invocations().is_empty());

        let unknown = GameWindow::new("0x02", "Dofus");
        assert_eq!(wm.window_pid(&unknown).await, Some(777));
    }
}
