use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Окно игрового клиента, как его видит wmctrl
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameWindow {
    pub id: String,
    /// -1 для окон, закреплённых на всех рабочих столах
    pub desktop: i64,
    pub pid: Option<u32>,
    pub host: String,
    pub title: String,
}

impl GameWindow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desktop: 0,
            pid: None,
            host: String::new(),
            title: title.into(),
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Роль из заголовка вида `<prefix>-<role>`
    pub fn role(&self, prefix: &str) -> Option<&str> {
        self.title
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .filter(|role| !role.is_empty())
    }

    /// Окно считается игровым, если заголовок равен префиксу или начинается с `<prefix>-`
    pub fn is_game_window(title: &str, prefix: &str) -> bool {
        match title.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        }
    }
}

impl fmt::Display for GameWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "{} \"{}\" (pid {})", self.id, self.title, pid),
            None => write!(f, "{} \"{}\"", self.id, self.title),
        }
    }
}

/// Виртуальный рабочий стол
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desktop {
    pub index: u32,
    pub current: bool,
    pub name: String,
}

/// Направление циклического переключения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "вперёд"),
            Direction::Backward => write!(f, "назад"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_window_matching() {
        assert!(GameWindow::is_game_window("Dofus", "Dofus"));
        assert!(GameWindow::is_game_window("Dofus-Iop", "Dofus"));
        assert!(!GameWindow::is_game_window("Dofus Launcher", "Dofus"));
        assert!(!GameWindow::is_game_window("Ankama Dofus", "Dofus"));
        assert!(!GameWindow::is_game_window("dofus-iop", "Dofus"));
    }

    #[test]
    fn test_role_extraction() {
        let renamed = GameWindow::new("0x01", "Dofus-Cra");
        assert_eq!(renamed.role("Dofus"), Some("Cra"));

        let fresh = GameWindow::new("0x02", "Dofus");
        assert_eq!(fresh.role("Dofus"), None);

        let dangling = GameWindow::new("0x03", "Dofus-");
        assert_eq!(dangling.role("Dofus"), None);
    }

    #[test]
    fn test_display() {
        let window = GameWindow::new("0x03a00007", "Dofus-Eni").with_pid(4242);
        assert_eq!(window.to_string(), "0x03a00007 \"Dofus-Eni\" (pid 4242)");
    }
}
