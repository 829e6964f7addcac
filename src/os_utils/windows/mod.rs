pub mod apartment;
pub mod console;
pub mod signals;
pub mod window;

pub use apartment::ComApartment;
pub use window::Win32Window;

use crate::bootstrap::ProcessEnvironment;
use crate::error::BootstrapResult;

/// Null-terminated UTF-16 copy of `s` for the wide Win32 APIs.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
  s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The real process environment: console, debugger and command line.
pub struct Win32Environment;

impl Win32Environment {
  /// Must be created on the thread that will run the message loop.
  pub fn new() -> Self {
    signals::register_ui_thread();
    Self
  }
}

impl Default for Win32Environment {
  fn default() -> Self {
    Self::new()
  }
}

impl ProcessEnvironment for Win32Environment {
  fn attach_parent_console(&mut self) -> BootstrapResult<()> {
    console::attach_parent_console()?;
    signals::setup_signal_handlers();
    Ok(())
  }

  fn is_debugger_present(&self) -> bool {
    console::is_debugger_present()
  }

  fn create_and_attach_console(&mut self) -> BootstrapResult<()> {
    console::create_and_attach_console()?;
    signals::setup_signal_handlers();
    Ok(())
  }
}
