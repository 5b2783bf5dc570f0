//! WindowManager service: responsibility and boundaries
//!
//! This module is responsible ONLY for talking to the X11 window manager
//! (listing, renaming, moving and activating game windows) through wmctrl and
//! xprop. It MUST NOT know about profiles or roles ordering: which window gets
//! which role is decided by the Toolbox.

mod window_manager;
mod wmctrl;
mod xprop;

pub use self::window_manager::WindowManager;
pub use self::wmctrl::current_desktop;
