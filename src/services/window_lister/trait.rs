use crate::config::Config;
use crate::error::Result;
use crate::events::WindowRecord;
use std::fmt;
use std::sync::Arc;

/// Как адресовать окно при фокусировке
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    /// По идентификатору оконной системы
    Id(String),
    /// По заголовку (первое совпадение на стороне wmctrl)
    Title(String),
}

impl fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusTarget::Id(id) => write!(f, "id {}", id),
            FocusTarget::Title(title) => write!(f, "title \"{}\"", title),
        }
    }
}

/// Enumerates open windows and raises them through an external tool.
#[async_trait::async_trait]
pub trait WindowLister: Send + Sync {
    /// Полный список открытых окон в порядке вывода утилиты
    async fn list_windows(&self) -> Result<Vec<WindowRecord>>;

    /// Активировать окно. Ненулевой код выхода утилиты возвращается как ошибка.
    async fn focus(&self, target: &FocusTarget) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Factory function to create an appropriate window lister based on the dry_run flag
pub fn create_window_lister(config: &Config, dry_run: bool) -> Arc<dyn WindowLister> {
    if dry_run {
        Arc::new(super::dry_run::DryRunLister::new())
    } else {
        Arc::new(super::wmctrl::WmctrlLister::new(&config.lister))
    }
}
