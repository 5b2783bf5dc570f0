use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolboxError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Команда '{program}' завершилась с кодом {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Таймаут выполнения команды: {0}")]
    CommandTimeout(String),

    #[error("Утилита не найдена: {0}")]
    ToolMissing(String),

    #[error("Профиль не найден: {0}")]
    ProfileNotFound(String),

    #[error("В профиле нет ролей: {0}")]
    EmptyProfile(String),

    #[error("Игровые окна не найдены: {0}")]
    NoWindows(String),

    #[error("Файл профилей не найден: {0}")]
    ProfilesFileMissing(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl ToolboxError {
    pub fn no_windows<T>(msg: impl Into<String>) -> Result<T> {
        Err(ToolboxError::NoWindows(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, ToolboxError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! toolbox_error {
    (profile_not_found, $($arg:tt)*) => {
        $crate::error::ToolboxError::ProfileNotFound(format!($($arg)*))
    };
    (empty_profile, $($arg:tt)*) => {
        $crate::error::ToolboxError::EmptyProfile(format!($($arg)*))
    };
    (no_windows, $($arg:tt)*) => {
        $crate::error::ToolboxError::NoWindows(format!($($arg)*))
    };
    (timeout, $($arg:tt)*) => {
        $crate::error::ToolboxError::CommandTimeout(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::ToolboxError::Internal(format!($($arg)*))
    };
}
