use crate::config::Config;
use crate::error::Result;
use crate::models::{ProfileBook, ProfileDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON-файл профилей
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Сгенерированные скрипты лежат рядом с файлом профилей
    pub fn scripts_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(|parent| parent.join("scripts"))
            .unwrap_or_else(|| PathBuf::from("scripts"))
    }

    /// Прочитать документ; отсутствующий или повреждённый файл даёт пустой документ
    pub fn load_document(&self) -> ProfileDocument {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                debug!("Файл профилей {:?} не прочитан: {}", self.path, e);
                return ProfileDocument::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(e) => {
                warn!("Файл профилей {:?} повреждён, используется пустой: {}", self.path, e);
                ProfileDocument::default()
            }
        }
    }

    pub fn load(&self) -> ProfileBook {
        ProfileBook::from_document(&self.load_document())
    }

    pub fn save_document(&self, document: &ProfileDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut text = serde_json::to_string_pretty(document)?;
        text.push('\n');
        fs::write(&self.path, text)?;

        debug!("Файл профилей {:?} сохранён", self.path);
        Ok(())
    }

    /// Запомнить активный профиль, не трогая остальное содержимое файла
    pub fn set_active(&self, name: &str) -> Result<()> {
        let mut document = self.load_document();
        document.active = name.to_string();
        self.save_document(&document)?;

        info!("Активный профиль: {}", name);
        Ok(())
    }
}

/// Выбор файла профилей: явный путь, затем последний использованный, затем путь по умолчанию
pub struct ProfileLocator {
    pointer_file: PathBuf,
    default_file: PathBuf,
}

impl ProfileLocator {
    pub fn new(config: &Config) -> Self {
        Self {
            pointer_file: config.last_profile_file(),
            default_file: config.default_profiles_file(),
        }
    }

    pub fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            self.remember(path)?;
            return Ok(path.to_path_buf());
        }

        Ok(self.last_used().unwrap_or_else(|| self.default_file.clone()))
    }

    /// Последний явно выбранный файл, если он всё ещё существует
    pub fn last_used(&self) -> Option<PathBuf> {
        let content = fs::read_to_string(&self.pointer_file).ok()?;
        let path = PathBuf::from(content.trim());

        if path.as_os_str().is_empty() || !path.exists() {
            debug!("Последний файл профилей {:?} недоступен", path);
            return None;
        }
        Some(path)
    }

    pub fn remember(&self, path: &Path) -> Result<()> {
        if let Some(parent) = self.pointer_file.parent() {
            fs::create_dir_all(parent)?;
        }

        // Относительный путь из командной строки сохраняется абсолютным
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        fs::write(&self.pointer_file, absolute.to_string_lossy().as_bytes())?;
        debug!("Запомнен файл профилей {:?}", absolute);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_profiles(dir: &Path) -> PathBuf {
        let path = dir.join("profiles.json");
        let content = json!({
            "profiles": { "team": ["Iop", "Cra"], "duo": { "windows": ["Eni"], "characters": ["Bob"], "note": "x" } },
            "active": "team",
            "version": 2
        });
        fs::write(&path, content.to_string()).unwrap();
        path
    }

    #[test]
    fn test_missing_and_corrupt_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();

        let missing = ProfileStore::new(dir.path().join("none.json"));
        assert!(!missing.exists());
        assert!(missing.load().is_empty());

        let corrupt_path = dir.path().join("bad.json");
        fs::write(&corrupt_path, "{ not json").unwrap();
        let corrupt = ProfileStore::new(&corrupt_path);
        assert!(corrupt.exists());
        assert!(corrupt.load().is_empty());
    }

    #[test]
    fn test_null_active_still_lists_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, r#"{"profiles":{"team":["Iop","Cra"]},"active":null}"#).unwrap();

        let book = ProfileStore::new(&path).load();
        assert_eq!(book.profiles.len(), 1);
        assert_eq!(book.active, "");
        assert_eq!(book.get("team").unwrap().roles, vec!["Iop", "Cra"]);
    }

    #[test]
    fn test_set_active_preserves_other_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(write_profiles(dir.path()));

        store.set_active("duo").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["active"], json!("duo"));
        assert_eq!(raw["version"], json!(2));
        assert_eq!(raw["profiles"]["duo"]["note"], json!("x"));

        let book = store.load();
        assert_eq!(book.active, "duo");
        assert_eq!(book.names().collect::<Vec<_>>(), vec!["team", "duo"]);
    }

    #[test]
    fn test_set_active_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("nested/profiles.json"));

        store.set_active("team").unwrap();
        assert!(store.exists());
        assert_eq!(store.load().active, "team");
    }

    #[test]
    fn test_scripts_dir_is_next_to_profiles() {
        let store = ProfileStore::new("/home/user/toolbox/profiles.json");
        assert_eq!(store.scripts_dir(), PathBuf::from("/home/user/toolbox/scripts"));
    }

    #[test]
    fn test_locator_prefers_explicit_then_last_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.profiles_dir = dir.path().to_string_lossy().into_owned();
        config.paths.last_profile_file = dir
            .path()
            .join("state/last_profile.txt")
            .to_string_lossy()
            .into_owned();

        let locator = ProfileLocator::new(&config);
        assert_eq!(
            locator.resolve(None).unwrap(),
            dir.path().join("profiles.json")
        );

        let custom = dir.path().join("custom.json");
        fs::write(&custom, "{}").unwrap();
        assert_eq!(locator.resolve(Some(custom.as_path())).unwrap(), custom);

        // Без явного пути используется запомненный
        assert_eq!(locator.resolve(None).unwrap(), custom);

        // Удалённый файл больше не предлагается
        fs::remove_file(&custom).unwrap();
        assert_eq!(
            locator.resolve(None).unwrap(),
            dir.path().join("profiles.json")
        );
    }
}
