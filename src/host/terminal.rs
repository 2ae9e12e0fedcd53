use crate::events::{RenderItem, SessionEvent, Selection};
use crate::services::{RenderTarget, SessionController};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, error, info, warn};

/// Что пользователь ввёл в терминальном хосте
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Event(SessionEvent),
    Help,
    Quit,
}

/// Рисует список в stdout и помнит последние элементы для выбора по номеру
#[derive(Default)]
pub struct TerminalRenderTarget {
    last_items: Mutex<Vec<RenderItem>>,
}

impl TerminalRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_items(&self) -> Vec<RenderItem> {
        self.last_items.lock().clone()
    }
}

impl RenderTarget for TerminalRenderTarget {
    fn render(&self, items: Vec<RenderItem>) {
        if items.is_empty() {
            println!("  (нет окон)");
        }
        for (index, item) in items.iter().enumerate() {
            println!("{:>3}. {}  [{}]", index + 1, item.title, item.id);
        }
        *self.last_items.lock() = items;
    }

    fn hide(&self) {
        println!("  ...");
    }

    fn show_error(&self, message: &str) {
        eprintln!("  ошибка: {}", message);
    }
}

/// Разбор строки ввода.
///
/// Empty line re-enters, `/text` or plain text searches, a number selects that
/// row of the last render, `h` hides, `?` prints help and `q` quits.
pub fn parse_command(line: &str, last_items: &[RenderItem]) -> std::result::Result<HostCommand, String> {
    let line = line.trim();

    match line {
        "" => return Ok(HostCommand::Event(SessionEvent::Enter)),
        "q" | "quit" => return Ok(HostCommand::Quit),
        "h" | "hide" => return Ok(HostCommand::Event(SessionEvent::Hide)),
        "?" | "help" => return Ok(HostCommand::Help),
        _ => {}
    }

    if let Some(query) = line.strip_prefix('/') {
        return Ok(HostCommand::Event(SessionEvent::Search(query.to_string())));
    }

    if let Ok(number) = line.parse::<usize>() {
        return match number.checked_sub(1).and_then(|index| last_items.get(index)) {
            Some(item) => Ok(HostCommand::Event(SessionEvent::Select(Selection::from_item(item)))),
            None => Err(format!("нет строки с номером {}", number)),
        };
    }

    Ok(HostCommand::Event(SessionEvent::Search(line.to_string())))
}

fn print_help() {
    println!("  <Enter>  обновить список");
    println!("  текст    фильтр по заголовку (или /текст)");
    println!("  N        активировать окно из строки N");
    println!("  h        скрыть");
    println!("  q        выход");
}

/// Интерактивный цикл: stdin -> события сессии, до `q`, EOF или Ctrl+C
pub async fn run(controller: SessionController) -> Result<()> {
    let terminal = Arc::new(TerminalRenderTarget::new());
    let target: Arc<dyn RenderTarget> = terminal.clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Err(e) = controller.enter(target.clone()).await {
        error!("Не удалось получить список окон: {}", e);
    }

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
        };

        let Some(line) = line else {
            info!("stdin закрыт");
            break;
        };

        let command = match parse_command(&line, &terminal.last_items()) {
            Ok(command) => command,
            Err(message) => {
                warn!("{}", message);
                continue;
            }
        };

        match command {
            HostCommand::Quit => break,
            HostCommand::Help => print_help(),
            HostCommand::Event(SessionEvent::Select(selection)) => {
                match controller.select(selection).await {
                    Ok(activation) => {
                        match (&activation.resolved, &activation.usage) {
                            (_, Some(usage)) => {
                                println!("  -> {} (выбрано раз: {})", activation.target, usage.count)
                            }
                            (Some(_), None) => println!("  -> {} (счётчик не обновлён)", activation.target),
                            (None, None) => println!("  -> {} (окно не найдено в списке)", activation.target),
                        }
                    }
                    Err(e) => warn!("Не удалось активировать окно: {}", e),
                }
            }
            HostCommand::Event(event) => {
                // Ошибки уже показаны через show_error, сессия продолжается
                if let Err(e) = controller.dispatch(event, target.clone()).await {
                    warn!("Событие не обработано: {}", e);
                }
            }
        }
        debug!("Состояние сессии: {}", controller.state());
    }

    Ok(())
}
