use crate::config::Config;
use crate::error::{Result, ToolboxError};
use crate::models::{Direction, GameWindow, Profile, ProfileBook};
use crate::services::arrangement::{assign_windows_to_roles, bounce_desktop};
use crate::services::command_runner::CommandRunner;
use crate::services::window_manager::current_desktop;
use crate::services::{
    AudioMuter, CycleScriptWriter, InputInjector, ProfileStore, WindowCycler, WindowManager,
};
use crate::toolbox_error;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Итог переименования окон
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameReport {
    /// Пары `(id окна, новый заголовок)`
    pub renamed: Vec<(String, String)>,
    pub failed: usize,
    /// Число окон, отправленных на заглушение
    pub muting: usize,
}

/// Итог раскладки окон
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReorganizeReport {
    pub desktop: u32,
    /// Роли в порядке, в котором окна вернулись на рабочий стол
    pub placed: Vec<String>,
    pub failed: usize,
}

/// Действия пользователя поверх профилей и оконного менеджера.
///
/// Отдельные вызовы утилит внутри действия выполняются по принципу
/// «лучшее из возможного»: ошибка логируется и действие продолжается.
/// Ошибкой завершаются только нарушенные предусловия.
pub struct Toolbox {
    config: Arc<Config>,
    store: ProfileStore,
    windows: WindowManager,
    audio: AudioMuter,
    input: InputInjector,
    cycler: WindowCycler,
    scripts: CycleScriptWriter,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl Toolbox {
    pub fn new(config: Arc<Config>, store: ProfileStore, runner: Arc<dyn CommandRunner>) -> Self {
        info!("Инициализация Toolbox, профили: {:?}", store.path());

        Self {
            windows: WindowManager::new(&config, runner.clone()),
            audio: AudioMuter::new(runner.clone()),
            input: InputInjector::new(runner),
            cycler: WindowCycler::new(config.cycle_state_file()),
            scripts: CycleScriptWriter::new(
                config.window.title_prefix.clone(),
                config.cycle_state_file(),
            ),
            store,
            config,
            background: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn profiles(&self) -> ProfileBook {
        self.store.load()
    }

    pub async fn windows(&self) -> Vec<GameWindow> {
        self.windows.list_game_windows().await
    }

    /// Профиль для действия: явно указанный, иначе активный, иначе первый
    pub fn resolve_profile(&self, requested: Option<&str>) -> Result<Profile> {
        let book = self.profiles();
        book.current(requested)?.cloned().ok_or_else(|| {
            toolbox_error!(
                profile_not_found,
                "файл {:?} не содержит профилей",
                self.store.path()
            )
        })
    }

    /// Сделать профиль активным и перегенерировать скрипты переключения
    pub fn select_profile(&self, name: &str) -> Result<Profile> {
        let book = self.profiles();
        let profile = book
            .get(name)
            .cloned()
            .ok_or_else(|| toolbox_error!(profile_not_found, "{}", name))?;

        self.store.set_active(&profile.name)?;
        self.write_scripts(&profile)?;
        Ok(profile)
    }

    pub fn write_scripts(&self, profile: &Profile) -> Result<Vec<PathBuf>> {
        self.scripts.write(&self.store.scripts_dir(), &profile.roles)
    }

    /// Переименовать окна в `<prefix>-<роль>` в порядке wmctrl и заглушить все, кроме первого
    pub async fn rename_windows(&self, requested: Option<&str>) -> Result<RenameReport> {
        self.require_profiles_file()?;

        let windows = self.require_windows().await?;
        let profile = self.resolve_profile(requested)?;
        if profile.roles.is_empty() {
            error!("В профиле '{}' нет окон", profile.name);
            return Err(toolbox_error!(empty_profile, "{}", profile.name));
        }

        debug!("Инициатива: {:?}", profile.roles);

        let mut report = RenameReport::default();
        for (window, role) in windows.iter().zip(&profile.roles) {
            let title = self.config.game_title(role);
            debug!("Переименование {} из '{}' в '{}'", window.id, window.title, title);

            if let Err(e) = self.windows.unmaximize(&window.id).await {
                warn!("Не удалось снять максимизацию с {}: {}", window.id, e);
            }
            match self.windows.rename(&window.id, &title).await {
                Ok(()) => report.renamed.push((window.id.clone(), title)),
                Err(e) => {
                    warn!("Не удалось переименовать {}: {}", window.id, e);
                    report.failed += 1;
                }
            }
        }

        if self.config.audio.mute_followers && windows.len() > 1 {
            let mut pids = Vec::new();
            for window in &windows[1..] {
                match self.windows.window_pid(window).await {
                    Some(pid) => pids.push(pid),
                    None => warn!("PID окна {} не найден, звук не заглушён", window.id),
                }
            }

            if !pids.is_empty() {
                debug!("Заглушение {} окон: {:?}", pids.len(), pids);
                report.muting = pids.len();
                let handle = self.audio.spawn_mute(pids);
                self.background.lock().push(handle);
            }
        }

        info!(
            "Переименовано окон: {} (ошибок: {})",
            report.renamed.len(),
            report.failed
        );
        Ok(report)
    }

    /// Перестроить порядок окон: увести все на соседний рабочий стол и вернуть в порядке ролей
    pub async fn reorganize_windows(&self, requested: Option<&str>) -> Result<ReorganizeReport> {
        self.require_profiles_file()?;

        let windows = self.require_windows().await?;
        let profile = self.resolve_profile(requested)?;
        if profile.roles.is_empty() {
            return Err(toolbox_error!(empty_profile, "{}", profile.name));
        }

        let desktops = match self.windows.list_desktops().await {
            Ok(desktops) => desktops,
            Err(e) => {
                warn!("Не удалось получить список рабочих столов: {}", e);
                Vec::new()
            }
        };
        let desktop = current_desktop(&desktops);
        let other = bounce_desktop(desktop);

        let assignment =
            assign_windows_to_roles(&profile.roles, &windows, self.windows.title_prefix());
        debug!("Сопоставление ролей: {:?}", assignment);

        let mut report = ReorganizeReport {
            desktop,
            ..Default::default()
        };

        for window in &windows {
            if let Err(e) = self.windows.move_to_desktop(&window.id, other).await {
                warn!("Не удалось перенести {} на стол {}: {}", window.id, other, e);
                report.failed += 1;
            }
        }

        sleep(Duration::from_millis(self.config.timing.reorganize_settle_ms)).await;

        for (role, window_id) in assignment {
            match self.windows.move_to_desktop(&window_id, desktop).await {
                Ok(()) => report.placed.push(role),
                Err(e) => {
                    warn!("Не удалось вернуть окно {} ({}): {}", window_id, role, e);
                    report.failed += 1;
                }
            }
            sleep(Duration::from_millis(self.config.timing.reorganize_step_ms)).await;
        }

        info!("Окна разложены на столе {}: {}", desktop, report.placed.join(" → "));
        Ok(report)
    }

    /// Отправить `/invite` каждому персонажу профиля после обратного отсчёта.
    ///
    /// Возвращает число отправленных приглашений.
    pub async fn invite_group(
        &self,
        requested: Option<&str>,
        countdown: Option<Duration>,
    ) -> Result<usize> {
        self.require_profiles_file()?;

        let profile = self.resolve_profile(requested)?;
        if profile.characters.is_empty() {
            warn!("В профиле '{}' нет персонажей для приглашения", profile.name);
            return Ok(0);
        }

        let countdown = countdown
            .unwrap_or_else(|| Duration::from_millis(self.config.timing.invite_countdown_ms));
        info!("Кликните в поле чата игры");
        run_countdown(countdown).await;

        let step = Duration::from_millis(self.config.timing.invite_step_ms);
        let mut sent = 0;
        for character in &profile.characters {
            let line = self.config.invite_line(character);
            match self.input.send_chat_line(&line, step).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Не удалось пригласить {}: {}", character, e),
            }
        }

        info!("Отправлено приглашений: {}/{}", sent, profile.characters.len());
        Ok(sent)
    }

    /// Передать фокус следующему (или предыдущему) окну текущего профиля
    pub async fn cycle(&self, direction: Direction) -> Result<Option<String>> {
        let profile = self.resolve_profile(None)?;
        self.cycler.cycle(&profile, &self.windows, direction).await
    }

    /// Дождаться фоновых задач (заглушение звука), не дольше `timeout`.
    ///
    /// Возвращает число задач, завершившихся вовремя.
    pub async fn wait_background(&self, timeout: Duration) -> usize {
        let handles: Vec<JoinHandle<()>> = self.background.lock().drain(..).collect();
        if handles.is_empty() {
            return 0;
        }

        let total = handles.len();
        let mut finished = 0;
        let deadline = tokio::time::Instant::now() + timeout;

        for handle in handles {
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => finished += 1,
                Ok(Err(e)) => warn!("Фоновая задача завершилась с ошибкой: {}", e),
                Err(_) => {
                    warn!("Таймаут ожидания фоновых задач ({} из {})", finished, total);
                    break;
                }
            }
        }

        finished
    }

    fn require_profiles_file(&self) -> Result<()> {
        if self.store.exists() {
            Ok(())
        } else {
            Err(ToolboxError::ProfilesFileMissing(
                self.store.path().display().to_string(),
            ))
        }
    }

    async fn require_windows(&self) -> Result<Vec<GameWindow>> {
        let windows = self.windows.list_game_windows().await;
        if windows.is_empty() {
            return ToolboxError::no_windows(format!(
                "нет окон с заголовком '{}'",
                self.windows.title_prefix()
            ));
        }
        Ok(windows)
    }
}

const COUNTDOWN_TICK: Duration = Duration::from_millis(100);
const COUNTDOWN_MARK_MS: u128 = 500;

/// Шаги обратного отсчёта: остаток перед шагом и нужно ли его объявить.
///
/// Объявляется первый шаг и каждый переход через границу полсекунды.
fn countdown_steps(total: Duration) -> Vec<(Duration, bool)> {
    let mut steps = Vec::new();
    let mut remaining = total;
    let mut announced = None;

    while !remaining.is_zero() {
        let mark = remaining.as_millis().div_ceil(COUNTDOWN_MARK_MS);
        steps.push((remaining, announced != Some(mark)));
        announced = Some(mark);
        remaining -= remaining.min(COUNTDOWN_TICK);
    }
    steps
}

/// Обратный отсчёт с выводом каждые полсекунды
async fn run_countdown(total: Duration) {
    for (remaining, announce) in countdown_steps(total) {
        if announce {
            info!("{:.1}", remaining.as_secs_f64());
        }
        sleep(remaining.min(COUNTDOWN_TICK)).await;
    }
}
