use crate::error::Result;
use crate::events::WindowRecord;
use async_trait::async_trait;
use tracing::info;

use super::r#trait::{FocusTarget, WindowLister};

/// Фиктивный список окон для режима сухого запуска
pub struct DryRunLister {
    windows: Vec<WindowRecord>,
}

impl DryRunLister {
    pub fn new() -> Self {
        let fake_windows = [
            ("0x00a00001", "Terminal - dry_run"),
            ("0x00a00002", "Browser - dry_run"),
            ("0x00a00003", "Editor - dry_run"),
            ("0x00a00004", "Game - dry_run"),
        ];

        let windows = fake_windows
            .iter()
            .map(|(id, title)| {
                WindowRecord::new(*id, *title)
                    .with_desktop("0")
                    .with_host("dry-run")
            })
            .collect();

        Self { windows }
    }
}

impl Default for DryRunLister {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowLister for DryRunLister {
    async fn list_windows(&self) -> Result<Vec<WindowRecord>> {
        Ok(self.windows.clone())
    }

    async fn focus(&self, target: &FocusTarget) -> Result<()> {
        info!("[DRY RUN] Активация окна: {}", target);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
