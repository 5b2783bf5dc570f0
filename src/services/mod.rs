pub mod arrangement;
pub mod audio_muter;
pub mod command_runner;
pub mod cycle_scripts;
pub mod cycler;
pub mod input_injector;
pub mod profile_store;
pub mod toolbox;
pub mod window_manager;

pub use audio_muter::AudioMuter;
pub use command_runner::create_command_runner;
pub use cycle_scripts::CycleScriptWriter;
pub use cycler::WindowCycler;
pub use input_injector::InputInjector;
pub use profile_store::{ProfileLocator, ProfileStore};
pub use toolbox::Toolbox;
pub use window_manager::WindowManager;
