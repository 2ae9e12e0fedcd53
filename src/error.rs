use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitcherError {
    #[error("Ошибка сериализации: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Внешняя команда '{command}' завершилась с ошибкой: {message}")]
    ExternalTool { command: String, message: String },

    #[error("Некорректная строка #{line_number} в списке окон: '{line}'")]
    MalformedLine { line_number: usize, line: String },

    #[error("Конфликт ревизий при записи документа '{id}'")]
    StoreConflict { id: String },

    #[error("Заголовок '{title}' совпадает с {matches} окнами")]
    AmbiguousTitle { title: String, matches: usize },

    #[error("Ошибка хранилища: {0}")]
    Store(String),
}

impl SwitcherError {
    pub fn external_tool(command: impl Into<String>, message: impl Into<String>) -> Self {
        SwitcherError::ExternalTool {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn store_conflict<T>(id: impl Into<String>) -> Result<T> {
        Err(SwitcherError::StoreConflict { id: id.into() })
    }
}

pub type Result<T> = std::result::Result<T, SwitcherError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! switch_error {
    (store, $($arg:tt)*) => {
        $crate::error::SwitcherError::Store(format!($($arg)*))
    };
}
