use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
mod config;
mod error;
mod models;
mod services;
mod utils;

use config::Config;
use models::Direction;
use services::{create_command_runner, ProfileLocator, ProfileStore, Toolbox};

/// Сколько ждать фоновые задачи (заглушение звука) перед выходом
const BACKGROUND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "dofus-toolbox")]
#[command(about = "Управление окнами нескольких игровых клиентов: роли, фокус, рабочие столы, приглашения")]
#[command(version)]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-файл профилей (запоминается для следующих запусков)
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Показать профили (активный отмечен звёздочкой)
    Profiles,

    /// Сделать профиль активным и обновить скрипты переключения
    Select {
        name: String,
    },

    /// Показать найденные игровые окна
    Windows,

    /// Переименовать окна по ролям и заглушить все, кроме первого
    Rename {
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Разложить окна в порядке ролей через соседний рабочий стол
    Reorganize {
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Пригласить персонажей профиля в группу через чат
    Invite {
        #[arg(short, long)]
        profile: Option<String>,

        /// Пауза перед вводом, чтобы успеть кликнуть в чат
        #[arg(long)]
        countdown_ms: Option<u64>,
    },

    /// Передать фокус следующему окну текущего профиля
    Cycle {
        #[arg(long, value_enum, default_value_t = Direction::Forward)]
        direction: Direction,
    },

    /// Перегенерировать скрипты переключения для горячих клавиш
    Scripts {
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Проверить окружение: дисплей, утилиты, файл профилей
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Arc::new(Config::load(&config_path)?);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config)?;

    debug!("Запуск dofus-toolbox v{}", env!("CARGO_PKG_VERSION"));
    debug!("Конфигурация загружена из: {:?}", config_path);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    let profiles_path = ProfileLocator::new(&config).resolve(args.profiles.as_deref())?;
    let runner = create_command_runner(&config, args.dry_run);
    let toolbox = Toolbox::new(config.clone(), ProfileStore::new(profiles_path), runner);

    run_command(&toolbox, &config, args.command).await?;

    // Фоновое заглушение не должно обрываться вместе с процессом
    let finished = toolbox.wait_background(BACKGROUND_TIMEOUT).await;
    if finished > 0 {
        debug!("Фоновых задач завершено: {}", finished);
    }

    Ok(())
}

async fn run_command(toolbox: &Toolbox, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Profiles => {
            let book = toolbox.profiles();
            if book.is_empty() {
                warn!("Профили не найдены в {:?}", toolbox.store().path());
            }
            for profile in &book.profiles {
                let marker = if profile.name == book.active { "*" } else { " " };
                println!("{} {:<20} {}", marker, profile.name, profile.initiative_line());
            }
        }
        Command::Select { name } => {
            let profile = toolbox.select_profile(&name)?;
            println!("{}", profile.initiative_line());
        }
        Command::Windows => {
            for window in toolbox.windows().await {
                println!("{}", window);
            }
        }
        Command::Rename { profile } => {
            let report = toolbox.rename_windows(profile.as_deref()).await?;
            for (id, title) in &report.renamed {
                println!("{} -> {}", id, title);
            }
        }
        Command::Reorganize { profile } => {
            let report = toolbox.reorganize_windows(profile.as_deref()).await?;
            println!("{}", report.placed.join(" → "));
        }
        Command::Invite {
            profile,
            countdown_ms,
        } => {
            let countdown = countdown_ms.map(Duration::from_millis);
            toolbox.invite_group(profile.as_deref(), countdown).await?;
        }
        Command::Cycle { direction } => {
            if let Some(role) = toolbox.cycle(direction).await? {
                debug!("Фокус передан роли {}", role);
            }
        }
        Command::Scripts { profile } => {
            let profile = toolbox.resolve_profile(profile.as_deref())?;
            for path in toolbox.write_scripts(&profile)? {
                println!("{}", path.display());
            }
        }
        Command::Doctor => {
            let checks = utils::environment::check_environment(config, toolbox.store().path())?;
            for check in checks {
                let status = if check.found() { "ok" } else { "--" };
                println!("[{}] {:<8} {}", status, check.name, check.purpose);
            }
        }
    }

    info!("Готово");
    Ok(())
}

fn init_tracing(level: &str, config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directives = if config.logging.filter.is_empty() {
        level.to_string()
    } else {
        format!("{},{}", level, config.logging.filter)
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))?;

    let registry = tracing_subscriber::registry().with(filter);

    // stdout остаётся для вывода команд
    match config.logging.format.as_str() {
        "full" => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
