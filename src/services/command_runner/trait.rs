use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Result of a finished external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Trait for runners of external window-manager, audio and input tools
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a program with a fixed argument list and capture its output
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Factory function to create an appropriate command runner based on the dry_run flag
pub fn create_command_runner(config: &Config, dry_run: bool) -> Arc<dyn CommandRunner> {
    if dry_run {
        Arc::new(super::dry_run::DryRunCommandRunner::with_fake_session(
            &config.window.title_prefix,
        ))
    } else {
        Arc::new(super::system::SystemCommandRunner::new(
            config.window.display.clone(),
            config.command_timeout(),
        ))
    }
}
