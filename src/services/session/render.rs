use crate::events::RenderItem;

/// Точка внедрения хоста: куда отрисовывать список
pub trait RenderTarget: Send + Sync {
    fn render(&self, items: Vec<RenderItem>);

    /// Хост должен скрыть интерфейс (после выбора окна)
    fn hide(&self) {}

    /// Ошибка получения списка вместо устаревшего списка
    fn show_error(&self, _message: &str) {}
}

/// Адаптер для хостов, которым достаточно одного колбэка
pub struct FnRenderTarget<F>(pub F);

impl<F> RenderTarget for FnRenderTarget<F>
where
    F: Fn(Vec<RenderItem>) + Send + Sync,
{
    fn render(&self, items: Vec<RenderItem>) {
        (self.0)(items)
    }
}
