use crate::models::{Desktop, GameWindow};

/// Разбор `wmctrl -l -p`: `<id> <desktop> <pid> <host> <title...>`.
///
/// Возвращает только игровые окна (заголовок равен префиксу или начинается с `<prefix>-`).
pub fn parse_window_list(output: &str, prefix: &str) -> Vec<GameWindow> {
    output
        .lines()
        .filter_map(|line| {
            let (columns, title) = split_columns(line, 4)?;
            if !GameWindow::is_game_window(title, prefix) {
                return None;
            }

            Some(GameWindow {
                id: columns[0].to_string(),
                desktop: columns[1].parse().unwrap_or(-1),
                pid: columns[2].parse().ok().filter(|pid| *pid != 0),
                host: columns[3].to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

/// Отделить `count` колонок, разделённых пробелами; остаток строки возвращается как есть
fn split_columns(line: &str, count: usize) -> Option<(Vec<&str>, &str)> {
    let mut columns = Vec::with_capacity(count);
    let mut rest = line.trim_start();

    for _ in 0..count {
        let end = rest.find(char::is_whitespace)?;
        columns.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }

    let rest = rest.trim_end();
    if rest.is_empty() {
        return None;
    }
    Some((columns, rest))
}

/// Разбор `wmctrl -d`: текущий рабочий стол отмечен `*`
pub fn parse_desktops(output: &str) -> Vec<Desktop> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let index = parts.next()?.parse().ok()?;
            let current = parts.next()? == "*";

            // Имя идёт после геометрии рабочей области "WA: x,y WxH"
            let name = line
                .find("WA:")
                .map(|pos| {
                    line[pos..]
                        .split_whitespace()
                        .skip(3)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();

            Some(Desktop {
                index,
                current,
                name,
            })
        })
        .collect()
}

/// Индекс текущего рабочего стола, 0 если определить не удалось
pub fn current_desktop(desktops: &[Desktop]) -> u32 {
    desktops
        .iter()
        .find(|desktop| desktop.current)
        .map(|desktop| desktop.index)
        .unwrap_or(0)
}
