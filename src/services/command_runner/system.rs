use super::r#trait::{CommandOutput, CommandRunner};
use crate::error::{Result, ToolboxError};
use crate::toolbox_error;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub struct SystemCommandRunner {
    display: Option<String>,
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(display: Option<String>, timeout: Duration) -> Self {
        Self { display, timeout }
    }

    fn create_command(&self, program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Утилиты X11 должны работать с тем же дисплеем, что и игровые клиенты
        if let Some(display) = &self.display {
            cmd.env("DISPLAY", display);
        }

        cmd
    }
}

#[async_trait::async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("Запуск: {} {}", program, args.join(" "));

        let child = self
            .create_command(program, args)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ToolboxError::ToolMissing(program.to_string()),
                _ => ToolboxError::Io(e),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| toolbox_error!(timeout, "{} {}", program, args.join(" ")))??;

        let result = CommandOutput {
            // Процесс, убитый сигналом, не имеет кода возврата
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            debug!(
                "{} завершился с кодом {}: {}",
                program,
                result.status,
                result.stderr.trim()
            );
        }

        Ok(result)
    }
}
