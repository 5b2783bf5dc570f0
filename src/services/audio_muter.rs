use crate::services::command_runner::CommandRunner;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Заглушает звук клиентов через PulseAudio/PipeWire (`pactl`)
pub struct AudioMuter {
    runner: Arc<dyn CommandRunner>,
}

impl AudioMuter {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Запустить заглушение в фоне; результат только логируется
    pub fn spawn_mute(&self, pids: Vec<u32>) -> JoinHandle<()> {
        let muter = Self::new(self.runner.clone());
        tokio::spawn(async move {
            let muted = muter.mute_pids(&pids).await;
            debug!("Фоновое заглушение завершено: {} потоков", muted);
        })
    }

    /// Заглушить все sink-input'ы указанных процессов, вернуть число заглушённых
    pub async fn mute_pids(&self, pids: &[u32]) -> usize {
        if pids.is_empty() {
            return 0;
        }

        let listing = match self.runner.run("pactl", &["list", "sink-inputs"]).await {
            Ok(output) if output.success() => output.stdout,
            Ok(output) => {
                warn!("pactl list sink-inputs вернул код {}", output.status);
                return 0;
            }
            Err(e) => {
                warn!("Не удалось получить список аудиопотоков: {}", e);
                return 0;
            }
        };

        let mut muted = 0;
        for pid in pids {
            for sink_input in sink_inputs_for_pid(&listing, *pid) {
                let id = sink_input.to_string();
                match self
                    .runner
                    .run("pactl", &["set-sink-input-mute", &id, "1"])
                    .await
                {
                    Ok(output) if output.success() => {
                        info!("Заглушён поток #{} (pid {})", sink_input, pid);
                        muted += 1;
                    }
                    Ok(output) => warn!(
                        "Не удалось заглушить поток #{}: код {}",
                        sink_input, output.status
                    ),
                    Err(e) => warn!("Не удалось заглушить поток #{}: {}", sink_input, e),
                }
            }
        }

        muted
    }
}

/// Номера `Sink Input #N`, у которых `application.process.id` равен `pid`
pub fn sink_inputs_for_pid(listing: &str, pid: u32) -> Vec<u32> {
    let needle = format!("process.id = \"{}\"", pid);
    let mut current: Option<u32> = None;
    let mut found = Vec::new();

    for line in listing.lines() {
        let line = line.trim();
        if let Some(number) = line.strip_prefix("Sink Input #") {
            current = number.trim().parse().ok();
            continue;
        }

        if line.ends_with(&needle) {
            if let Some(id) = current {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::command_runner::{CommandOutput, DryRunCommandRunner};

    const LISTING: &str = "\
Sink Input #12
\tDriver: protocol-native.c
\tMute: no
\tProperties:
\t\tapplication.name = \"Dofus\"
\t\tapplication.process.id = \"4102\"

Sink Input #13
\tProperties:
\t\tapplication.process.id = \"41020\"

Sink Input #15
\tProperties:
\t\tapplication.process.id = \"4102\"
\t\tpipewire.sec.pid = \"4102\"
";

    #[test]
    fn test_sink_inputs_for_pid() {
        assert_eq!(sink_inputs_for_pid(LISTING, 4102), vec![12, 15]);
        assert_eq!(sink_inputs_for_pid(LISTING, 41020), vec![13]);
        assert!(sink_inputs_for_pid(LISTING, 1).is_empty());
    }

    #[tokio::test]
    async fn test_mute_pids_mutes_matching_inputs() {
        let runner = Arc::new(DryRunCommandRunner::new().with_response(
            "pactl",
            &["list", "sink-inputs"],
            CommandOutput::ok(LISTING),
        ));
        let muter = AudioMuter::new(runner.clone());

        assert_eq!(muter.mute_pids(&[4102]).await, 2);
        assert_eq!(
            runner.command_lines(),
            vec![
                "pactl list sink-inputs",
                "pactl set-sink-input-mute 12 1",
                "pactl set-sink-input-mute 15 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_background_mute_completes() {
        let runner = Arc::new(DryRunCommandRunner::new().with_response(
            "pactl",
            &["list", "sink-inputs"],
            CommandOutput::ok(LISTING),
        ));
        let muter = AudioMuter::new(runner.clone());

        muter.spawn_mute(vec![41020]).await.unwrap();
        assert!(runner
            .command_lines()
            .contains(&"pactl set-sink-input-mute 13 1".to_string()));
    }

    #[tokio::test]
    async fn test_no_pids_no_calls() {
        let runner = Arc::new(DryRunCommandRunner::new());
        let muter = AudioMuter::new(runner.clone());

        assert_eq!(muter.mute_pids(&[]).await, 0);
        assert!(runner.invocations().is_empty());
    }
}
