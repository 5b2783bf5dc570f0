use crate::error::Result;
use crate::models::Direction;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const FORWARD_SCRIPT: &str = "cycle_windows_dofus.sh";
pub const BACKWARD_SCRIPT: &str = "cycle_backward_windows_dofus.sh";

/// Генерация автономных bash-скриптов для горячих клавиш оконного менеджера.
///
/// Скрипты не зависят от этой утилиты: порядок ролей вшивается в текст,
/// позиция хранится в том же файле состояния, что и у команды `cycle`.
pub struct CycleScriptWriter {
    title_prefix: String,
    state_file: PathBuf,
}

impl CycleScriptWriter {
    pub fn new(title_prefix: impl Into<String>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            title_prefix: title_prefix.into(),
            state_file: state_file.into(),
        }
    }

    pub fn render(&self, roles: &[String], direction: Direction) -> String {
        let roles = roles
            .iter()
            .map(|role| shell_quote(role))
            .collect::<Vec<_>>()
            .join(" ");

        let next = match direction {
            Direction::Forward => "NEXT=$(( (INDEX + i) % TOTAL ))",
            Direction::Backward => "NEXT=$(( (INDEX - i + TOTAL) % TOTAL ))",
        };

        format!(
            r#"#!/bin/bash
STATE_FILE={state}
CLASS_INI=({roles})
AVAILABLE=($(wmctrl -l | grep {grep} | awk '{{print $4}}' | cut -d'-' -f2))
if [[ ${{#AVAILABLE[@]}} -eq 0 ]]; then exit 1; fi
if [ -f "$STATE_FILE" ]; then INDEX=$(cat "$STATE_FILE"); else INDEX=0; fi
TOTAL=${{#CLASS_INI[@]}}
for ((i=1; i<=TOTAL; i++)); do
    {next}
    CLASS_NAME=${{CLASS_INI[$NEXT]}}
    if printf '%s\n' "${{AVAILABLE[@]}}" | grep -q "^$CLASS_NAME$"; then
        wmctrl -a {prefix}-"$CLASS_NAME"
        echo "$NEXT" > "$STATE_FILE"
        exit 0
    fi
done
"#,
            state = shell_quote(&self.state_file.to_string_lossy()),
            roles = roles,
            grep = shell_quote(&format!("{}-", self.title_prefix)),
            next = next,
            prefix = shell_quote(&self.title_prefix),
        )
    }

    /// Записать оба скрипта (вперёд и назад) с правами 0755; пустой профиль ничего не пишет
    pub fn write(&self, dir: &Path, roles: &[String]) -> Result<Vec<PathBuf>> {
        if roles.is_empty() {
            debug!("Профиль без ролей - скрипты переключения не обновляются");
            return Ok(Vec::new());
        }

        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(2);
        for (name, direction) in [
            (FORWARD_SCRIPT, Direction::Forward),
            (BACKWARD_SCRIPT, Direction::Backward),
        ] {
            let path = dir.join(name);
            fs::write(&path, self.render(roles, direction))?;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
            written.push(path);
        }

        info!("Скрипты переключения обновлены в {:?}", dir);
        Ok(written)
    }
}

/// Заключить строку в одинарные кавычки для bash
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> CycleScriptWriter {
        CycleScriptWriter::new("Dofus", "/tmp/dofus_window_index")
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_render_forward_script() {
        let script = writer().render(&roles(&["Iop", "Cra"]), Direction::Forward);

        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("CLASS_INI=('Iop' 'Cra')"));
        assert!(script.contains("STATE_FILE='/tmp/dofus_window_index'"));
        assert!(script.contains("grep 'Dofus-' | awk '{print $4}'"));
        assert!(script.contains("NEXT=$(( (INDEX + i) % TOTAL ))"));
        assert!(script.contains("wmctrl -a 'Dofus'-\"$CLASS_NAME\""));
        assert!(script.contains("TOTAL=${#CLASS_INI[@]}"));
    }

    #[test]
    fn test_backward_script_differs_only_in_formula() {
        let roles = roles(&["Iop", "Cra"]);
        let forward = writer().render(&roles, Direction::Forward);
        let backward = writer().render(&roles, Direction::Backward);

        assert!(backward.contains("NEXT=$(( (INDEX - i + TOTAL) % TOTAL ))"));
        assert_eq!(
            forward.replace(
                "NEXT=$(( (INDEX + i) % TOTAL ))",
                "NEXT=$(( (INDEX - i + TOTAL) % TOTAL ))"
            ),
            backward
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(shell_quote("O'Brien"), r"'O'\''Brien'");
    }

    #[test]
    fn test_write_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("scripts");

        let written = writer().write(&scripts, &roles(&["Iop"])).unwrap();
        assert_eq!(written.len(), 2);

        for path in &written {
            let mode = fs::metadata(path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
        assert!(scripts.join(FORWARD_SCRIPT).exists());
        assert!(scripts.join(BACKWARD_SCRIPT).exists());
    }

    #[test]
    fn test_empty_profile_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("scripts");

        assert!(writer().write(&scripts, &[]).unwrap().is_empty());
        assert!(!scripts.exists());
    }
}
