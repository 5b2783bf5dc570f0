use super::r#trait::{CommandOutput, CommandRunner};
use crate::error::Result;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tracing::{debug, info};

/// Записанный вызов внешней утилиты
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Runner без побочных эффектов: записывает вызовы и отвечает по сценарию.
///
/// Ответы ищутся по точной командной строке; неизвестные команды
/// завершаются успешно с пустым выводом.
#[derive(Default)]
pub struct DryRunCommandRunner {
    responses: RwLock<HashMap<String, CommandOutput>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl DryRunCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Эмуляция сессии: четыре игровых клиента и два рабочих стола
    pub fn with_fake_session(prefix: &str) -> Self {
        let windows = format!(
            "0x03a00007  0 4101   arena {p}-Iop\n\
             0x03c00007  0 4102   arena {p}-Cra\n\
             0x03e00007  0 4103   arena {p}\n\
             0x04000007  0 4104   arena {p}\n\
             0x01200003  0 900    arena Terminal - dry_run\n",
            p = prefix
        );
        let desktops = "0  * DG: 1920x1080  VP: 0,0  WA: 0,0 1920x1080  Desktop 1\n\
                        1  - DG: 1920x1080  VP: N/A  WA: 0,0 1920x1080  Desktop 2\n";

        let mut sink_inputs = String::new();
        for (index, pid) in (4101..=4104).enumerate() {
            sink_inputs.push_str(&format!(
                "Sink Input #{}\n\tDriver: protocol-native.c\n\tMute: no\n\tProperties:\n\t\tapplication.name = \"{}\"\n\t\tapplication.process.id = \"{}\"\n\n",
                40 + index,
                prefix,
                pid
            ));
        }

        Self::new()
            .with_response("wmctrl", &["-l", "-p"], CommandOutput::ok(windows))
            .with_response("wmctrl", &["-d"], CommandOutput::ok(desktops))
            .with_response("pactl", &["list", "sink-inputs"], CommandOutput::ok(sink_inputs))
    }

    pub fn with_response(self, program: &str, args: &[&str], output: CommandOutput) -> Self {
        self.respond(program, args, output);
        self
    }

    /// Задать (или заменить) ответ на конкретную команду
    pub fn respond(&self, program: &str, args: &[&str], output: CommandOutput) {
        self.responses
            .write()
            .insert(Self::key(program, args), output);
    }

    #[allow(dead_code)]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    #[allow(dead_code)]
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.invocations.lock().clear();
    }

    fn key(program: &str, args: &[&str]) -> String {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        };
        invocation.command_line()
    }
}

#[async_trait::async_trait]
impl CommandRunner for DryRunCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        };
        let line = invocation.command_line();
        self.invocations.lock().push(invocation);

        match self.responses.read().get(&line) {
            Some(output) => {
                debug!("[DRY RUN] {} -> код {}", line, output.status);
                Ok(output.clone())
            }
            None => {
                info!("[DRY RUN] {}", line);
                Ok(CommandOutput::default())
            }
        }
    }
}
