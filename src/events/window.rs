use serde::{Deserialize, Serialize};
use std::fmt;

/// Окно из одного снимка `wmctrl -l`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: String,
    pub title: String,
    pub desktop: String,
    pub host: String,
}

impl WindowRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            desktop: String::new(),
            host: String::new(),
        }
    }

    pub fn with_desktop(mut self, desktop: impl Into<String>) -> Self {
        self.desktop = desktop.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Регистронезависимый поиск подстроки в заголовке.
    /// Запрос должен быть уже приведён к нижнему регистру.
    pub fn matches_query_lower(&self, query_lower: &str) -> bool {
        if query_lower.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(query_lower)
    }

    pub fn to_render_item(&self) -> RenderItem {
        RenderItem {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

impl fmt::Display for WindowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.id, self.title)
    }
}

/// Элемент списка, передаваемый хосту для отрисовки.
///
/// The id travels with the title so a selection can name the exact window
/// even when several windows share a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderItem {
    pub id: String,
    pub title: String,
}

/// Выбор пользователя, возвращаемый хостом
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: Option<String>,
    pub title: String,
}

impl Selection {
    /// Выбор только по заголовку, для хостов без идентификаторов
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
        }
    }

    pub fn from_item(item: &RenderItem) -> Self {
        Self {
            id: Some(item.id.clone()),
            title: item.title.clone(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} \"{}\"", id, self.title),
            None => write!(f, "\"{}\"", self.title),
        }
    }
}
