pub mod service;
pub mod types;

pub use service::{launch_settings, log_launch_settings};
pub use types::{scale_factor, LaunchSettings, Point, Size, WindowSpec};
