use std::fmt;

/// Состояние одной сессии хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Нет активного списка
    #[default]
    Idle,
    /// Показан полный ранжированный список
    Listing,
    /// Показан отфильтрованный список
    Filtering,
    /// Идёт активация выбранного окна
    Activating,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Listing => "listing",
            SessionState::Filtering => "filtering",
            SessionState::Activating => "activating",
        };
        f.write_str(name)
    }
}

/// Snapshot of the session tokens taken before a fetch. A fetch may render
/// only while both tokens are still the latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    pub epoch: u64,
    pub sequence: u64,
}
