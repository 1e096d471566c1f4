pub use manager::WindowManager;
pub use scheduler::PhaseScheduler;
pub use status::WindowStatus;
pub use window::{ElectionWindow, Transition, WindowId};

mod manager;
mod scheduler;
mod status;
mod window;
