use crate::error::{Result, ToolboxError};
use crate::services::command_runner::CommandRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Ввод текста и клавиш в окно под фокусом через xdotool
pub struct InputInjector {
    runner: Arc<dyn CommandRunner>,
}

impl InputInjector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        if text.contains('\0') {
            return Err(ToolboxError::Internal(
                "текст содержит нулевой байт".to_string(),
            ));
        }
        debug!("xdotool type '{}'", text);
        self.xdotool(&["type", "--clearmodifiers", text]).await
    }

    pub async fn press_key(&self, key: &str) -> Result<()> {
        self.xdotool(&["key", key]).await
    }

    /// Набрать строку чата и отправить её Enter'ом
    pub async fn send_chat_line(&self, text: &str, step: Duration) -> Result<()> {
        self.type_text(text).await?;
        sleep(step).await;
        self.press_key("Return").await?;
        sleep(step).await;
        Ok(())
    }

    async fn xdotool(&self, args: &[&str]) -> Result<()> {
        let output = self.runner.run("xdotool", args).await?;
        if !output.success() {
            return Err(ToolboxError::CommandFailed {
                program: format!("xdotool {}", args.first().copied().unwrap_or_default()),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
