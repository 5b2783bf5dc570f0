/// Разбор `xprop -id <id> _NET_WM_PID`: `_NET_WM_PID(CARDINAL) = 12345`
pub fn parse_wm_pid(output: &str) -> Option<u32> {
    let (_, value) = output.split_once('=')?;
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wm_pid() {
        assert_eq!(parse_wm_pid("_NET_WM_PID(CARDINAL) = 12345\n"), Some(12345));
        assert_eq!(parse_wm_pid("_NET_WM_PID:  not found."), None);
        assert_eq!(parse_wm_pid(""), None);
    }
}
