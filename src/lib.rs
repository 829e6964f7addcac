pub mod bootstrap;
pub mod constants;
pub mod deep_link;
pub mod error;
pub mod logging;
pub mod os_utils;
pub mod runtime;
pub mod settings;
pub mod shutdown;

pub use bootstrap::{BootstrapState, Bootstrapper, Termination};
pub use deep_link::{normalize_arguments, NormalizedArguments, RawArguments};
pub use error::{BootstrapError, BootstrapResult};

/// Bring up the process and block until the main window closes.
/// Returns the process exit status.
#[cfg(windows)]
pub fn run() -> i32 {
  use crate::os_utils::windows::{ComApartment, Win32Environment, Win32Window};
  use crate::runtime::DataBundleRuntime;

  logging::init_logging();
  let launch = settings::launch_settings();
  settings::log_launch_settings(launch);

  let termination = Bootstrapper::new(
    Win32Environment::new(),
    ComApartment,
    Win32Window::new(),
    DataBundleRuntime::new(),
    launch.clone(),
  )
  .run();
  // Lets a blocked console close handler return
  shutdown::TEARDOWN.complete();
  termination.exit_code
}

#[cfg(not(windows))]
pub fn run() -> i32 {
  logging::init_logging();
  log::error!("[bootstrap] The native runner is only available on Windows");
  constants::EXIT_FAILURE
}
