//! CommandRunner: the single seam for every external tool call
//!
//! Window-manager, audio and input services never spawn processes themselves.
//! They build fixed argument lists and hand them to a CommandRunner, which
//! either executes them (SystemCommandRunner) or records and answers them
//! from a script (DryRunCommandRunner, used by --dry-run and the tests).

mod dry_run;
mod system;
mod r#trait;

pub use self::dry_run::DryRunCommandRunner;
pub use self::r#trait::{create_command_runner, CommandOutput, CommandRunner};
