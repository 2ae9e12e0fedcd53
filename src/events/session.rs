use super::window::Selection;
use std::fmt;

/// События жизненного цикла хоста
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Хост открыт, нужно показать полный список
    Enter,
    /// Изменился поисковый запрос
    Search(String),
    /// Пользователь выбрал окно
    Select(Selection),
    /// Хост скрыт
    Hide,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Enter => write!(f, "enter"),
            SessionEvent::Search(query) => write!(f, "search \"{}\"", query),
            SessionEvent::Select(selection) => write!(f, "select {}", selection),
            SessionEvent::Hide => write!(f, "hide"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(SessionEvent::Enter.to_string(), "enter");
        assert_eq!(SessionEvent::Search("term".into()).to_string(), "search \"term\"");
        assert_eq!(
            SessionEvent::Select(Selection::by_title("Terminal")).to_string(),
            "select \"Terminal\""
        );
    }
}
