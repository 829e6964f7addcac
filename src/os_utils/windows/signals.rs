// Console control handling: turn Ctrl+C and console close into a quit message for the UI thread.
//
// Logoff and shutdown are not delivered here once user32 is loaded; the window
// receives WM_ENDSESSION instead.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use windows::Win32::Foundation::{BOOL, LPARAM, WPARAM};
use windows::Win32::System::Console::{
  SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT,
};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};

use crate::constants::TEARDOWN_WAIT_MS;
use crate::shutdown::TEARDOWN;

// 0 means no UI thread registered yet
static UI_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Remember the calling thread as the one running the message loop.
pub fn register_ui_thread() {
  let id = unsafe { GetCurrentThreadId() };
  UI_THREAD_ID.store(id, Ordering::SeqCst);
}

unsafe extern "system" fn console_handler(ctrl_type: u32) -> BOOL {
  // The process is terminated as soon as the handler returns from a close event
  let (event, wait_for_teardown) = match ctrl_type {
    CTRL_C_EVENT => ("CTRL+C", false),
    CTRL_BREAK_EVENT => ("CTRL+BREAK", false),
    CTRL_CLOSE_EVENT => ("CLOSE", true),
    _ => return BOOL(0), // not handled
  };

  let thread_id = UI_THREAD_ID.load(Ordering::SeqCst);
  if thread_id == 0 {
    return BOOL(0);
  }

  log::info!("[signal] Received {}, asking the message loop to quit", event);
  if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
    log::error!("[signal] Failed to post quit message: {}", e);
    return BOOL(0);
  }

  if wait_for_teardown && !TEARDOWN.wait(Duration::from_millis(TEARDOWN_WAIT_MS)) {
    log::warn!("[signal] Teardown did not finish before the console closed");
  }
  BOOL(1) // TRUE - handled
}

/// Install the console control handler. Only meaningful once a console is attached.
pub fn setup_signal_handlers() {
  if let Err(e) = unsafe { SetConsoleCtrlHandler(Some(console_handler), true) } {
    log::warn!("[signal] Failed to install console control handler: {}", e);
  }
}
