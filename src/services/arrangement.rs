use crate::models::GameWindow;

/// Сопоставить роли профиля окнам для раскладки.
///
/// Сначала окна с точным заголовком `<prefix>-<role>`, затем по вхождению
/// роли в заголовок (без учёта регистра): окно получает первую ещё свободную
/// роль. Оставшиеся окна попарно получают оставшиеся роли в порядке профиля.
/// Результат упорядочен по ролям и содержит пары `(роль, id окна)`.
pub fn assign_windows_to_roles(
    roles: &[String],
    windows: &[GameWindow],
    prefix: &str,
) -> Vec<(String, String)> {
    let mut assigned: Vec<Option<&str>> = vec![None; roles.len()];
    let mut placed = vec![false; windows.len()];

    for (window, placed) in windows.iter().zip(placed.iter_mut()) {
        let exact = roles.iter().enumerate().find(|(index, role)| {
            assigned[*index].is_none() && window.title == format!("{}-{}", prefix, role)
        });
        if let Some((index, _)) = exact {
            assigned[index] = Some(window.id.as_str());
            *placed = true;
        }
    }

    for (window, placed) in windows.iter().zip(placed.iter_mut()) {
        if *placed {
            continue;
        }
        let title_lower = window.title.to_lowercase();
        let partial = roles.iter().enumerate().find(|(index, role)| {
            assigned[*index].is_none()
                && (title_lower.contains(&role.to_lowercase())
                    || window.title.contains(&format!("{}-{}", prefix, role)))
        });
        if let Some((index, _)) = partial {
            assigned[index] = Some(window.id.as_str());
            *placed = true;
        }
    }

    let mut unmatched = windows
        .iter()
        .zip(&placed)
        .filter(|(_, placed)| !**placed)
        .map(|(window, _)| window.id.as_str());
    for slot in assigned.iter_mut().filter(|slot| slot.is_none()) {
        match unmatched.next() {
            Some(id) => *slot = Some(id),
            None => break,
        }
    }

    roles
        .iter()
        .zip(assigned)
        .filter_map(|(role, id)| id.map(|id| (role.clone(), id.to_string())))
        .collect()
}

/// Рабочий стол для временного переноса: 1, если текущий 0, иначе 0
pub fn bounce_desktop(current: u32) -> u32 {
    if current == 0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_renamed_windows_follow_role_order() {
        let windows = vec![
            GameWindow::new("0x1", "Dofus-Cra"),
            GameWindow::new("0x2", "Dofus-Iop"),
            GameWindow::new("0x3", "Dofus-Eni"),
        ];

        let assignment = assign_windows_to_roles(&roles(&["Iop", "Eni", "Cra"]), &windows, "Dofus");
        assert_eq!(
            assignment,
            vec![
                ("Iop".to_string(), "0x2".to_string()),
                ("Eni".to_string(), "0x3".to_string()),
                ("Cra".to_string(), "0x1".to_string()),
            ]
        );
    }

    #[test]
    fn test_unmatched_windows_fill_remaining_roles() {
        let windows = vec![
            GameWindow::new("0x1", "Dofus"),
            GameWindow::new("0x2", "Dofus-sadi"),
            GameWindow::new("0x3", "Dofus"),
        ];

        let assignment =
            assign_windows_to_roles(&roles(&["Iop", "Sadi", "Cra", "Osa"]), &windows, "Dofus");
        assert_eq!(
            assignment,
            vec![
                ("Iop".to_string(), "0x1".to_string()),
                ("Sadi".to_string(), "0x2".to_string()),
                ("Cra".to_string(), "0x3".to_string()),
            ]
        );
    }

    #[test]
    fn test_exact_title_wins_over_partial_match() {
        let windows = vec![
            GameWindow::new("0x1", "Dofus-Iop2"),
            GameWindow::new("0x2", "Dofus-Iop"),
        ];

        let assignment = assign_windows_to_roles(&roles(&["Iop", "Iop2"]), &windows, "Dofus");
        assert_eq!(
            assignment,
            vec![
                ("Iop".to_string(), "0x2".to_string()),
                ("Iop2".to_string(), "0x1".to_string()),
            ]
        );
    }

    #[test]
    fn test_more_windows_than_roles() {
        let windows = vec![
            GameWindow::new("0x1", "Dofus"),
            GameWindow::new("0x2", "Dofus"),
        ];

        let assignment = assign_windows_to_roles(&roles(&["Iop"]), &windows, "Dofus");
        assert_eq!(assignment, vec![("Iop".to_string(), "0x1".to_string())]);
    }

    #[test]
    fn test_bounce_desktop() {
        assert_eq!(bounce_desktop(0), 1);
        assert_eq!(bounce_desktop(1), 0);
        assert_eq!(bounce_desktop(3), 0);
    }
}
