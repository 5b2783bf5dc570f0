pub mod profile;
pub mod window;

pub use profile::{Profile, ProfileBook, ProfileDocument};
pub use window::{Desktop, Direction, GameWindow};
