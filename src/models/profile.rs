use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::toolbox_error;

/// Содержимое файла профилей.
///
/// Профили хранятся «как есть», чтобы запись активного профиля не теряла
/// неизвестные поля и порядок ключей.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default, deserialize_with = "lenient_map")]
    pub profiles: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub active: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Поле неверного типа отбрасывается, остальной документ сохраняется
fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        other => {
            warn!("Поле 'active' должно быть строкой, получено: {}", other);
            Ok(String::new())
        }
    }
}

fn lenient_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Map<String, Value>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => {
            warn!("Поле 'profiles' должно быть объектом, получено: {}", other);
            Ok(Map::new())
        }
    }
}

/// Две допустимые формы записи профиля
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileEntry {
    Roles(Vec<String>),
    Detailed {
        #[serde(default)]
        windows: Vec<String>,
        #[serde(default)]
        characters: Vec<String>,
    },
}

/// Профиль: упорядоченные роли окон и имена персонажей для приглашений
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub roles: Vec<String>,
    pub characters: Vec<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            name: name.into(),
            roles,
            characters: Vec::new(),
        }
    }

    pub fn with_characters(mut self, characters: Vec<String>) -> Self {
        self.characters = characters;
        self
    }

    /// Разобрать запись профиля; `None` для записей неизвестной формы
    pub fn from_value(name: &str, value: &Value) -> Option<Self> {
        match serde_json::from_value::<ProfileEntry>(value.clone()).ok()? {
            ProfileEntry::Roles(roles) => Some(Self::new(name, roles)),
            ProfileEntry::Detailed {
                windows,
                characters,
            } => Some(Self::new(name, windows).with_characters(characters)),
        }
    }

    /// Порядок инициативы в одну строку: `Iop → Cra → Eni`
    pub fn initiative_line(&self) -> String {
        self.roles.join(" → ")
    }
}

/// Все профили файла в порядке объявления плюс указатель на активный
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileBook {
    pub profiles: Vec<Profile>,
    pub active: String,
}

impl ProfileBook {
    pub fn from_document(document: &ProfileDocument) -> Self {
        let profiles = document
            .profiles
            .iter()
            .filter_map(|(name, value)| {
                let profile = Profile::from_value(name, value);
                if profile.is_none() {
                    warn!("Профиль '{}' имеет неизвестный формат и пропущен", name);
                }
                profile
            })
            .collect();

        Self {
            profiles,
            active: document.active.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|profile| profile.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Текущий профиль: явно запрошенный, иначе активный, иначе первый в файле
    pub fn current(&self, requested: Option<&str>) -> Result<Option<&Profile>> {
        if let Some(name) = requested {
            return self
                .get(name)
                .map(Some)
                .ok_or_else(|| toolbox_error!(profile_not_found, "{}", name));
        }

        Ok(self.get(&self.active).or_else(|| self.profiles.first()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolboxError;
    use serde_json::json;

    fn sample_document() -> ProfileDocument {
        serde_json::from_value(json!({
            "profiles": {
                "team-b": { "windows": ["Sadi", "Panda"], "characters": ["Bob", "Alice"] },
                "team-a": ["Iop", "Cra", "Eni"],
                "broken": 42,
                "solo": { "characters": ["Zed"] }
            },
            "active": "team-a",
            "theme": "dark"
        }))
        .unwrap()
    }

    #[test]
    fn test_both_profile_shapes_parse_in_file_order() {
        let book = ProfileBook::from_document(&sample_document());

        let names: Vec<&str> = book.names().collect();
        assert_eq!(names, vec!["team-b", "team-a", "solo"]);

        let team_b = book.get("team-b").unwrap();
        assert_eq!(team_b.roles, vec!["Sadi", "Panda"]);
        assert_eq!(team_b.characters, vec!["Bob", "Alice"]);

        let team_a = book.get("team-a").unwrap();
        assert_eq!(team_a.roles, vec!["Iop", "Cra", "Eni"]);
        assert!(team_a.characters.is_empty());

        let solo = book.get("solo").unwrap();
        assert!(solo.roles.is_empty());
        assert_eq!(solo.characters, vec!["Zed"]);
    }

    #[test]
    fn test_unknown_keys_survive_roundtrip() {
        let document = sample_document();
        assert_eq!(document.extra.get("theme"), Some(&json!("dark")));

        let text = serde_json::to_string(&document).unwrap();
        let reparsed: ProfileDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, document);
    }

    #[test]
    fn test_current_profile_resolution() {
        let mut book = ProfileBook::from_document(&sample_document());

        assert_eq!(book.current(None).unwrap().unwrap().name, "team-a");
        assert_eq!(book.current(Some("solo")).unwrap().unwrap().name, "solo");
        assert!(matches!(
            book.current(Some("nope")),
            Err(ToolboxError::ProfileNotFound(_))
        ));

        // Активный профиль отсутствует - берём первый
        book.active = "gone".to_string();
        assert_eq!(book.current(None).unwrap().unwrap().name, "team-b");

        let empty = ProfileBook::default();
        assert!(empty.current(None).unwrap().is_none());
    }

    #[test]
    fn test_invalid_active_keeps_profiles() {
        for active in [json!(null), json!(3), json!(["team"])] {
            let text = json!({ "profiles": { "team": ["Iop", "Cra"] }, "active": active });
            let text = text.to_string();
            let document: ProfileDocument = serde_json::from_str(&text).unwrap();

            assert_eq!(document.active, "");
            let book = ProfileBook::from_document(&document);
            assert_eq!(book.current(None).unwrap().unwrap().roles, vec!["Iop", "Cra"]);
        }
    }

    #[test]
    fn test_invalid_profiles_field_keeps_document() {
        let document: ProfileDocument =
            serde_json::from_str(r#"{"profiles": ["Iop"], "active": "team", "theme": "dark"}"#)
                .unwrap();

        assert!(document.profiles.is_empty());
        assert_eq!(document.active, "team");
        assert_eq!(document.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_initiative_line() {
        let profile = Profile::new("p", vec!["Iop".into(), "Cra".into()]);
        assert_eq!(profile.initiative_line(), "Iop → Cra");
        assert_eq!(Profile::new("e", vec![]).initiative_line(), "");
    }
}
