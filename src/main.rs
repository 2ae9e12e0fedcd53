use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
mod config;
mod error;
mod events;
mod host;
mod services;
mod utils;

use config::{Config, StoreBackend};
use services::{
    create_window_lister,
    usage_store::{DocumentStore, JsonFileDocumentStore, MemoryDocumentStore, SystemClock},
    Ranker, SessionController, UsageStore,
};

#[derive(Parser, Debug)]
#[command(name = "winswitch")]
#[command(about = "Переключатель окон с ранжированием по частоте использования")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "winswitch.toml")]
    config: String,

    /// Режим сухого запуска (фиктивные окна, счётчики только в памяти)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Интерактивный режим (по умолчанию)
    Run,
    /// Вывести ранжированный список окон и выйти
    List,
    /// Вывести сохранённые счётчики использования
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Конфигурация нужна до логирования: уровень и формат берутся из неё
    let config = Config::load(&args.config)?;
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск winswitch v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - окна фиктивные, счётчики не сохраняются");
    } else {
        utils::environment::check_environment();
    }

    let documents = open_document_store(&config, args.dry_run)?;
    let usage = Arc::new(UsageStore::new(
        documents,
        Arc::new(SystemClock),
        config.store.namespace.clone(),
    ));
    let lister = create_window_lister(&config, args.dry_run);

    info!("Все компоненты инициализированы");

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let controller = SessionController::new(lister, usage, config.session.clone());
            host::run(controller).await?;
        }
        Command::List => {
            let windows = lister.list_windows().await?;
            let ranked = Ranker::new(usage.clone()).rank(windows)?;
            for window in ranked {
                let record = usage.get(&window.id);
                let count = if record.is_persisted() {
                    record.count.to_string()
                } else {
                    "-".to_string()
                };
                println!("{:<12} {:>5}  {}", window.id, count, window.title);
            }
        }
        Command::Stats => {
            let mut records = usage.all_records()?;
            records.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| b.last_used.cmp(&a.last_used))
            });
            for record in records {
                println!(
                    "{:<12} {:>5}  {:>14}  {}",
                    record.window_id, record.count, record.last_used, record.title
                );
            }
        }
    }

    info!("winswitch завершил работу");
    Ok(())
}

fn open_document_store(config: &Config, dry_run: bool) -> Result<Arc<dyn DocumentStore>> {
    if dry_run || config.store.backend == StoreBackend::Memory {
        info!("Счётчики хранятся в памяти");
        return Ok(Arc::new(MemoryDocumentStore::new()));
    }

    let path = config.store_path()?;
    let store = JsonFileDocumentStore::open(&path)
        .with_context(|| format!("Не удалось открыть хранилище {:?}", path))?;
    info!("Счётчики хранятся в {:?}", store.path());
    Ok(Arc::new(store))
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    // Логи в stderr: stdout занят списком окон
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "full" => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
