use crate::config::SessionConfig;
use crate::error::{Result, SwitcherError};
use crate::{debug_if_enabled, switch_error};
use crate::events::{RenderItem, SessionEvent, Selection, WindowRecord};
use crate::services::ranker::Ranker;
use crate::services::usage_store::{UsageRecord, UsageStore};
use crate::services::window_lister::{FocusTarget, WindowLister};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use super::render::RenderTarget;
use super::state::{FetchTicket, SessionState};

/// Итог выбора окна
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub target: FocusTarget,
    pub resolved: Option<WindowRecord>,
    pub usage: Option<UsageRecord>,
}

/// Owns the list view of one host session.
///
/// Every fetch takes a [`FetchTicket`] before awaiting the lister. The result is
/// rendered only if no new session started and no newer fetch began in the
/// meantime, so late completions never overwrite a fresher list. The
/// post-activation refresh is a task owned by the session and is aborted when
/// a new session starts, a search replaces the view or another selection
/// replaces it.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

struct Shared {
    lister: Arc<dyn WindowLister>,
    usage: Arc<UsageStore>,
    ranker: Ranker,
    settings: SessionConfig,
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    epoch: u64,
    sequence: u64,
    state: SessionState,
    target: Option<Arc<dyn RenderTarget>>,
    pending_refresh: Option<JoinHandle<()>>,
}

impl Session {
    fn next_ticket(&mut self) -> FetchTicket {
        self.sequence += 1;
        FetchTicket {
            epoch: self.epoch,
            sequence: self.sequence,
        }
    }

    fn cancel_refresh(&mut self) {
        if let Some(handle) = self.pending_refresh.take() {
            handle.abort();
            debug!("Отложенное обновление отменено");
        }
    }

    fn start(&mut self, target: Arc<dyn RenderTarget>) {
        self.cancel_refresh();
        self.epoch += 1;
        self.target = Some(target);
        debug!("Новая сессия, эпоха {}", self.epoch);
    }
}

impl SessionController {
    pub fn new(
        lister: Arc<dyn WindowLister>,
        usage: Arc<UsageStore>,
        settings: SessionConfig,
    ) -> Self {
        info!(
            "Инициализация SessionController (lister: {}, задержка обновления: {}мс)",
            lister.name(),
            settings.refresh_delay_ms
        );

        Self {
            shared: Arc::new(Shared {
                lister,
                ranker: Ranker::new(usage.clone()),
                usage,
                settings,
                session: Mutex::new(Session::default()),
            }),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.shared.session.lock()
    }

    pub fn state(&self) -> SessionState {
        self.session().state
    }

    pub fn epoch(&self) -> u64 {
        self.session().epoch
    }

    /// Хост открыт: новая сессия и полный ранжированный список
    pub async fn enter(&self, target: Arc<dyn RenderTarget>) -> Result<()> {
        let ticket = {
            let mut session = self.session();
            session.start(target);
            session.state = SessionState::Listing;
            session.next_ticket()
        };

        self.render_fresh(ticket, None).await
    }

    /// Новый запрос: свежий список, ранжирование и фильтр по подстроке
    pub async fn search(&self, query: &str, target: Arc<dyn RenderTarget>) -> Result<()> {
        let ticket = {
            let mut session = self.session();
            let same_target = session
                .target
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &target));
            if same_target {
                // Иначе обновление после select затрёт отфильтрованный список
                session.cancel_refresh();
            } else {
                session.start(target);
            }
            session.state = if query.trim().is_empty() {
                SessionState::Listing
            } else {
                SessionState::Filtering
            };
            session.next_ticket()
        };

        self.render_fresh(ticket, Some(query)).await
    }

    /// Активация выбранного окна.
    ///
    /// Usage tracking is best-effort: a failed fetch or store write is logged and
    /// focusing still happens, falling back to the literal selected title.
    pub async fn select(&self, selection: Selection) -> Result<Activation> {
        let (epoch, target) = {
            let mut session = self.session();
            session.state = SessionState::Activating;
            session.cancel_refresh();
            (session.epoch, session.target.clone())
        };

        info!("Выбрано окно: {}", selection);
        if let Some(target) = &target {
            target.hide();
        }

        let resolved = match self.shared.lister.list_windows().await {
            Ok(windows) => resolve_selection(&windows, &selection),
            Err(e) => {
                warn!("Не удалось получить список окон при выборе: {}", e);
                None
            }
        };

        let usage = match &resolved {
            Some(window) => match self.record_usage(window).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Не удалось записать использование {}: {}", window, e);
                    None
                }
            },
            None => {
                debug!("Окно {} не найдено в текущем списке, счётчик не меняется", selection);
                None
            }
        };

        let focus_target = match &resolved {
            Some(window) => FocusTarget::Id(window.id.clone()),
            None => FocusTarget::Title(selection.title.clone()),
        };

        let focus_result = self.shared.lister.focus(&focus_target).await;
        self.schedule_refresh(epoch);

        if let Err(e) = focus_result {
            warn!("Не удалось активировать окно {}: {}", focus_target, e);
            if self.shared.settings.focus_errors_fatal {
                return Err(e);
            }
        }

        Ok(Activation {
            target: focus_target,
            resolved,
            usage,
        })
    }

    /// Хост скрыт. Отложенное обновление не отменяется: select сам скрывает хост,
    /// а обновлённый список нужен к следующему показу.
    pub fn hide(&self) {
        let mut session = self.session();
        session.state = SessionState::Idle;
        debug!("Хост скрыт, эпоха {}", session.epoch);
    }

    pub async fn dispatch(&self, event: SessionEvent, target: Arc<dyn RenderTarget>) -> Result<()> {
        debug_if_enabled!("Событие сессии: {}", event);
        match event {
            SessionEvent::Enter => self.enter(target).await,
            SessionEvent::Search(query) => self.search(&query, target).await,
            SessionEvent::Select(selection) => self.select(selection).await.map(|_| ()),
            SessionEvent::Hide => {
                self.hide();
                Ok(())
            }
        }
    }

    /// Файловое хранилище пишет на диск: запись идёт в блокирующем пуле
    async fn record_usage(&self, window: &WindowRecord) -> Result<UsageRecord> {
        let usage = self.shared.usage.clone();
        let (id, title) = (window.id.clone(), window.title.clone());

        tokio::task::spawn_blocking(move || usage.record_usage(&id, &title))
            .await
            .map_err(|e| switch_error!(store, "Задача записи использования прервана: {}", e))?
    }

    fn schedule_refresh(&self, epoch: u64) {
        let controller = self.clone();
        let delay = Duration::from_millis(self.shared.settings.refresh_delay_ms);

        let handle = tokio::spawn(async move {
            sleep(delay).await;
            controller.refresh(epoch).await;
        });

        let mut session = self.session();
        if session.epoch == epoch {
            session.cancel_refresh();
            session.pending_refresh = Some(handle);
        } else {
            handle.abort();
        }
    }

    async fn refresh(&self, epoch: u64) {
        let ticket = {
            let mut session = self.session();
            if session.epoch != epoch || session.target.is_none() {
                debug!("Отложенное обновление для эпохи {} устарело", epoch);
                return;
            }
            session.state = SessionState::Listing;
            session.next_ticket()
        };

        if let Err(e) = self.render_fresh(ticket, None).await {
            warn!("Отложенное обновление списка не удалось: {}", e);
        }
    }

    async fn fetch_ranked(&self) -> Result<Vec<WindowRecord>> {
        let windows = self.shared.lister.list_windows().await?;
        self.shared.ranker.rank(windows)
    }

    /// Цель отрисовки, если билет всё ещё актуален
    fn current_target(&self, ticket: FetchTicket) -> Option<Arc<dyn RenderTarget>> {
        let session = self.session();
        if session.epoch == ticket.epoch && session.sequence == ticket.sequence {
            session.target.clone()
        } else {
            None
        }
    }

    async fn render_fresh(&self, ticket: FetchTicket, query: Option<&str>) -> Result<()> {
        let windows = match self.fetch_ranked().await {
            Ok(windows) => windows,
            Err(e) => {
                if let Some(target) = self.current_target(ticket) {
                    target.show_error(&e.to_string());
                }
                return Err(e);
            }
        };

        let windows = match query {
            Some(query) => Ranker::filter(windows, query),
            None => windows,
        };
        let items: Vec<RenderItem> = windows.iter().map(WindowRecord::to_render_item).collect();

        match self.current_target(ticket) {
            Some(target) => {
                debug_if_enabled!("Отрисовка {} элементов (эпоха {})", items.len(), ticket.epoch);
                target.render(items);
            }
            None => debug!(
                "Результат запроса #{} эпохи {} устарел, отбрасываем",
                ticket.sequence, ticket.epoch
            ),
        }

        Ok(())
    }
}

/// Сначала по идентификатору, затем по заголовку (первое совпадение)
fn resolve_selection(windows: &[WindowRecord], selection: &Selection) -> Option<WindowRecord> {
    if let Some(id) = &selection.id {
        if let Some(window) = windows.iter().find(|w| &w.id == id) {
            return Some(window.clone());
        }
        debug!("Окно {} закрыто или пересоздано, ищем по заголовку", id);
    }

    let matches: Vec<&WindowRecord> = windows
        .iter()
        .filter(|w| w.title == selection.title)
        .collect();

    if matches.len() > 1 {
        let ambiguity = SwitcherError::AmbiguousTitle {
            title: selection.title.clone(),
            matches: matches.len(),
        };
        warn!("{}; берём первое окно {}", ambiguity, matches[0].id);
    }

    matches.first().map(|w| (*w).clone())
}
