use tracing::{info, warn};

/// Тип графической сессии, определённый по переменным окружения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    X11,
    /// Wayland с XWayland: wmctrl видит только X-клиентов
    WaylandWithXwayland,
    Wayland,
    Unknown,
}

/// Проверить окружение перед запуском wmctrl. Только предупреждает, не прерывает запуск.
pub fn check_environment() -> DisplayServer {
    info!("Проверка графического окружения...");

    let session_type = std::env::var("XDG_SESSION_TYPE").ok();
    let display = std::env::var("DISPLAY").ok();
    let wayland_display = std::env::var("WAYLAND_DISPLAY").ok();

    let server = detect_display_server(
        session_type.as_deref(),
        display.as_deref(),
        wayland_display.as_deref(),
    );

    match server {
        DisplayServer::X11 => info!("Обнаружена X11 сессия"),
        DisplayServer::WaylandWithXwayland => {
            warn!("Wayland сессия: wmctrl увидит только окна XWayland");
        }
        DisplayServer::Wayland => {
            warn!("Wayland сессия без DISPLAY: wmctrl не сможет получить список окон");
            for hint in setup_hints() {
                warn!("   {}", hint);
            }
        }
        DisplayServer::Unknown => {
            warn!("Не удалось определить графическую сессию (DISPLAY не задан)");
        }
    }

    server
}

fn detect_display_server(
    session_type: Option<&str>,
    display: Option<&str>,
    wayland_display: Option<&str>,
) -> DisplayServer {
    let has_display = display.is_some_and(|d| !d.is_empty());
    let is_wayland = session_type == Some("wayland") || wayland_display.is_some_and(|d| !d.is_empty());

    match (is_wayland, has_display) {
        (true, true) => DisplayServer::WaylandWithXwayland,
        (true, false) => DisplayServer::Wayland,
        (false, true) => DisplayServer::X11,
        (false, false) => DisplayServer::Unknown,
    }
}

/// Подсказки по установке и запуску wmctrl
pub fn setup_hints() -> Vec<String> {
    vec![
        "# Установить wmctrl:".to_string(),
        "sudo apt install wmctrl    # Debian/Ubuntu".to_string(),
        "sudo dnf install wmctrl    # Fedora".to_string(),
        "# wmctrl работает только с X11/XWayland окнами".to_string(),
    ]
}
