use crate::config::ListerConfig;
use crate::debug_if_enabled;
use crate::error::{Result, SwitcherError};
use crate::events::WindowRecord;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use super::parser::{parse_window_list, MalformedLinePolicy};
use super::r#trait::{FocusTarget, WindowLister};

pub struct WmctrlLister {
    command: String,
    list_args: Vec<String>,
    policy: MalformedLinePolicy,
}

impl WmctrlLister {
    pub fn new(config: &ListerConfig) -> Self {
        Self {
            command: config.command.clone(),
            list_args: config.list_args.clone(),
            policy: config.malformed_lines,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        debug_if_enabled!("Запуск {} {:?}", self.command, args);

        let output = Command::new(&self.command)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                debug!("{} не найден или не запускается: {}", self.command, e);
                SwitcherError::external_tool(&self.command, format!("не удалось запустить: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{} вернул ошибку ({}): {}", self.command, output.status, stderr);
            return Err(SwitcherError::external_tool(
                &self.command,
                format!("{}: {}", output.status, stderr),
            ));
        }

        Ok(output)
    }
}

#[async_trait::async_trait]
impl WindowLister for WmctrlLister {
    async fn list_windows(&self) -> Result<Vec<WindowRecord>> {
        let args: Vec<&str> = self.list_args.iter().map(String::as_str).collect();
        let output = self.run(&args).await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let windows = parse_window_list(&stdout, self.policy)?;
        debug_if_enabled!("{} вернул {} окон", self.command, windows.len());

        Ok(windows)
    }

    async fn focus(&self, target: &FocusTarget) -> Result<()> {
        match target {
            FocusTarget::Id(id) => self.run(&["-i", "-a", id.as_str()]).await?,
            FocusTarget::Title(title) => self.run(&["-a", title.as_str()]).await?,
        };
        debug!("Окно активировано: {}", target);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wmctrl"
    }
}
