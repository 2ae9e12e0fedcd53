use crate::error::{Result, SwitcherError};
use crate::events::WindowRecord;
use crate::trace_if_enabled;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Что делать со строкой, не подходящей под формат `wmctrl -l`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Прервать разбор всего списка
    #[default]
    Abort,
    /// Пропустить строку с предупреждением
    Skip,
}

/// Разбор вывода `wmctrl -l`: `<id> <desktop> <host> <title...>`.
///
/// Empty lines are dropped, and records keep input order. The title is
/// the rest of the line after the third field, with its inner whitespace kept.
pub fn parse_window_list(raw: &str, policy: MalformedLinePolicy) -> Result<Vec<WindowRecord>> {
    let mut windows = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Some(window) => {
                trace_if_enabled!("Разобрано окно: {}", window);
                windows.push(window);
            }
            None => {
                let line_number = index + 1;
                match policy {
                    MalformedLinePolicy::Abort => {
                        return Err(SwitcherError::MalformedLine {
                            line_number,
                            line: line.to_string(),
                        });
                    }
                    MalformedLinePolicy::Skip => {
                        warn!("Пропускаем некорректную строку #{}: '{}'", line_number, line);
                    }
                }
            }
        }
    }

    Ok(windows)
}

fn parse_line(line: &str) -> Option<WindowRecord> {
    let (id, rest) = next_token(line)?;
    let (desktop, rest) = next_token(rest)?;
    let (host, rest) = next_token(rest)?;
    let title = rest.trim_start();

    if title.is_empty() {
        return None;
    }

    Some(
        WindowRecord::new(id, title)
            .with_desktop(desktop)
            .with_host(host),
    )
}

/// Первый токен до пробела и остаток строки после него
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], &input[end..])),
        None => Some((input, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_lines_in_order() {
        let raw = "0x01 0 host Terminal\n0x02 0 host Browser";
        let windows = parse_window_list(raw, MalformedLinePolicy::Abort).unwrap();

        assert_eq!(
            windows,
            vec![
                WindowRecord::new("0x01", "Terminal").with_desktop("0").with_host("host"),
                WindowRecord::new("0x02", "Browser").with_desktop("0").with_host("host"),
            ]
        );
    }

    #[test]
    fn test_title_keeps_inner_whitespace() {
        let raw = "0x03c00007  1 workstation  vim -  notes.md  (~/src)\n";
        let windows = parse_window_list(raw, MalformedLinePolicy::Abort).unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].id, "0x03c00007");
        assert_eq!(windows[0].desktop, "1");
        assert_eq!(windows[0].host, "workstation");
        assert_eq!(windows[0].title, "vim -  notes.md  (~/src)");
    }

    #[test]
    fn test_empty_lines_are_dropped() {
        let raw = "\n0x01 0 host Terminal\n\n   \n0x02 -1 host Desktop\r\n";
        let windows = parse_window_list(raw, MalformedLinePolicy::Abort).unwrap();

        let titles: Vec<&str> = windows.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["Terminal", "Desktop"]);
        assert_eq!(windows[1].desktop, "-1");
    }

    #[test]
    fn test_empty_output_gives_empty_list() {
        assert!(parse_window_list("", MalformedLinePolicy::Abort).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_line_aborts_batch() {
        let raw = "0x01 0 host Terminal\n0x02 0 host\n0x03 0 host Browser";
        let err = parse_window_list(raw, MalformedLinePolicy::Abort).unwrap_err();

        match err {
            SwitcherError::MalformedLine { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "0x02 0 host");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_line_skipped_with_skip_policy() {
        let raw = "0x01 0 host Terminal\ngarbage\n0x03 0 host Browser";
        let windows = parse_window_list(raw, MalformedLinePolicy::Skip).unwrap();

        let ids: Vec<&str> = windows.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["0x01", "0x03"]);
    }

    #[test]
    fn test_one_record_per_non_empty_line() {
        let raw: String = (0..50)
            .map(|i| format!("0x{:02x} 0 host Window number {}\n\n", i, i))
            .collect();
        let windows = parse_window_list(&raw, MalformedLinePolicy::Abort).unwrap();

        assert_eq!(windows.len(), 50);
        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.title, format!("Window number {}", i));
        }
    }
}
