use std::cell::Cell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{
  BOOL, ERROR_SUCCESS, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM,
};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWA_USE_IMMERSIVE_DARK_MODE};
use windows::Win32::Graphics::Gdi::{MonitorFromPoint, MONITOR_DEFAULTTONEAREST};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Registry::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_DWORD};
use windows::Win32::UI::HiDpi::{
  EnableNonClientDpiScaling, GetDpiForMonitor, SetProcessDpiAwarenessContext,
  DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, MDT_EFFECTIVE_DPI,
};
use windows::Win32::UI::Input::KeyboardAndMouse::SetFocus;
use windows::Win32::UI::WindowsAndMessaging::{
  CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect, GetMessageW,
  GetWindowLongPtrW, LoadCursorW, MoveWindow, PostQuitMessage, RegisterClassW, SetParent,
  SetWindowLongPtrW, SetWindowPos, ShowWindow, TranslateMessage, UnregisterClassW, CREATESTRUCTW,
  CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, IDC_ARROW, MSG, SWP_NOACTIVATE, SWP_NOZORDER,
  SW_SHOWNORMAL, WINDOW_EX_STYLE, WM_ACTIVATE, WM_DESTROY, WM_DPICHANGED,
  WM_DWMCOLORIZATIONCOLORCHANGED, WM_NCCREATE, WM_SIZE, WNDCLASSW, WS_OVERLAPPEDWINDOW,
};

use super::to_wide;
use crate::bootstrap::WindowShim;
use crate::constants::{BASE_DPI, WINDOW_CLASS_NAME};
use crate::error::{BootstrapError, BootstrapResult};
use crate::runtime::RuntimeAdapter;
use crate::settings::{scale_factor, WindowSpec};

static CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Per-window state reachable from the window procedure through `GWLP_USERDATA`.
/// Only ever accessed through a shared reference.
#[derive(Default)]
struct WindowState {
  hwnd: Cell<Option<HWND>>,
  child_content: Cell<Option<HWND>>,
  quit_on_close: Cell<bool>,
}

impl WindowState {
  fn handle_message(&self, hwnd: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match message {
      WM_DESTROY => {
        self.hwnd.set(None);
        self.child_content.set(None);
        log::debug!("[window] Destroyed");
        if self.quit_on_close.get() {
          unsafe { PostQuitMessage(0) };
        }
        LRESULT(0)
      }
      WM_DPICHANGED => {
        // lparam carries the rectangle Windows suggests for the new DPI
        let suggested = unsafe { &*(lparam.0 as *const RECT) };
        if let Err(e) = unsafe {
          SetWindowPos(
            hwnd,
            None,
            suggested.left,
            suggested.top,
            suggested.right - suggested.left,
            suggested.bottom - suggested.top,
            SWP_NOZORDER | SWP_NOACTIVATE,
          )
        } {
          log::warn!("[window] Failed to apply DPI change: {}", e);
        }
        LRESULT(0)
      }
      WM_SIZE => {
        if let Some(child) = self.child_content.get() {
          fit_to_client(hwnd, child);
        }
        LRESULT(0)
      }
      WM_ACTIVATE => {
        if let Some(child) = self.child_content.get() {
          let _ = unsafe { SetFocus(Some(child)) };
        }
        LRESULT(0)
      }
      WM_DWMCOLORIZATIONCOLORCHANGED => {
        update_theme(hwnd);
        LRESULT(0)
      }
      _ => unsafe { DefWindowProcW(hwnd, message, wparam, lparam) },
    }
  }
}

unsafe extern "system" fn wnd_proc(
  hwnd: HWND,
  message: u32,
  wparam: WPARAM,
  lparam: LPARAM,
) -> LRESULT {
  if message == WM_NCCREATE {
    let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
    let state = create_struct.lpCreateParams as *const WindowState;
    unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, state as isize) };
    if let Some(state) = unsafe { state.as_ref() } {
      state.hwnd.set(Some(hwnd));
    }
    if let Err(e) = unsafe { EnableNonClientDpiScaling(hwnd) } {
      log::debug!("[window] Non-client DPI scaling unavailable: {}", e);
    }
    return unsafe { DefWindowProcW(hwnd, message, wparam, lparam) };
  }

  let state = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const WindowState;
  match unsafe { state.as_ref() } {
    Some(state) => state.handle_message(hwnd, message, wparam, lparam),
    None => unsafe { DefWindowProcW(hwnd, message, wparam, lparam) },
  }
}

/// The Win32 top-level window hosting the runtime, plus the thread's message queue.
pub struct Win32Window {
  // Boxed so the address handed to the window procedure stays put
  state: Box<WindowState>,
  instance: Option<HINSTANCE>,
}

impl Default for Win32Window {
  fn default() -> Self {
    Self::new()
  }
}

impl Win32Window {
  pub fn new() -> Self {
    Self {
      state: Box::default(),
      instance: None,
    }
  }

  pub fn handle(&self) -> Option<HWND> {
    self.state.hwnd.get()
  }

  /// Reparent `content` into this window and size it to the client area.
  pub fn set_child_content(&self, content: HWND) {
    let Some(hwnd) = self.handle() else {
      return;
    };
    self.state.child_content.set(Some(content));
    if let Err(e) = unsafe { SetParent(content, Some(hwnd)) } {
      log::warn!("[window] Failed to reparent content: {}", e);
    }
    fit_to_client(hwnd, content);
    let _ = unsafe { SetFocus(Some(content)) };
  }

  fn destroy(&mut self) {
    if let Some(hwnd) = self.state.hwnd.get() {
      if let Err(e) = unsafe { DestroyWindow(hwnd) } {
        log::warn!("[window] DestroyWindow failed: {}", e);
      }
    }
    self.state.hwnd.set(None);
    self.state.child_content.set(None);
  }
}

impl Drop for Win32Window {
  fn drop(&mut self) {
    // Closing from here is teardown, not a user request to quit
    self.state.quit_on_close.set(false);
    self.destroy();
    if let Some(instance) = self.instance.take() {
      unregister_class(instance);
    }
  }
}

impl WindowShim for Win32Window {
  type Message = MSG;

  fn create_window(
    &mut self,
    spec: &WindowSpec,
    runtime: &mut dyn RuntimeAdapter,
  ) -> BootstrapResult<()> {
    enable_dpi_awareness();

    let module = unsafe { GetModuleHandleW(None) }
      .map_err(|e| BootstrapError::window("GetModuleHandleW", e))?;
    let instance = HINSTANCE(module.0);
    register_class(instance)?;
    self.instance = Some(instance);

    let monitor = unsafe {
      MonitorFromPoint(
        POINT {
          x: spec.origin.x,
          y: spec.origin.y,
        },
        MONITOR_DEFAULTTONEAREST,
      )
    };
    let mut dpi_x = BASE_DPI;
    let mut dpi_y = BASE_DPI;
    if let Err(e) = unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) } {
      log::debug!("[window] GetDpiForMonitor failed, assuming {} DPI: {}", BASE_DPI, e);
    }
    let (origin, size) = spec.scaled(scale_factor(dpi_x));

    let class_name = to_wide(WINDOW_CLASS_NAME);
    let title = to_wide(&spec.title);
    let state = &*self.state as *const WindowState;
    let hwnd = unsafe {
      CreateWindowExW(
        WINDOW_EX_STYLE::default(),
        PCWSTR(class_name.as_ptr()),
        PCWSTR(title.as_ptr()),
        WS_OVERLAPPEDWINDOW,
        origin.x,
        origin.y,
        size.width as i32,
        size.height as i32,
        None,
        None,
        Some(instance),
        Some(state as *const c_void),
      )
    }
    .map_err(|e| BootstrapError::window("CreateWindowExW", e))?;
    log::info!(
      "[window] Created {}x{} at ({}, {}), {} DPI",
      size.width,
      size.height,
      origin.x,
      origin.y,
      dpi_x
    );

    update_theme(hwnd);

    let (width, height) = client_size(hwnd);
    match runtime.create_surface(width, height) {
      Ok(Some(surface)) => self.set_child_content(HWND(surface.0 as *mut c_void)),
      Ok(None) => log::debug!("[window] Runtime provided no content surface"),
      Err(e) => {
        self.destroy();
        return Err(e);
      }
    }

    let _ = unsafe { ShowWindow(hwnd, SW_SHOWNORMAL) };
    Ok(())
  }

  fn set_quit_on_close(&mut self, quit_on_close: bool) {
    self.state.quit_on_close.set(quit_on_close);
  }

  fn next_message(&mut self) -> BootstrapResult<Option<MSG>> {
    let mut msg = MSG::default();
    let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
    match result.0 {
      0 => Ok(None),
      // -1 means an invalid window or message pointer; it fails the same way on
      // every retry, so the run ends with a failure status instead of spinning
      -1 => Err(BootstrapError::MessageLoop(format!(
        "GetMessageW failed: {}",
        windows::core::Error::from_win32()
      ))),
      _ => Ok(Some(msg)),
    }
  }

  fn translate_and_dispatch(&mut self, message: &MSG) {
    unsafe {
      let _ = TranslateMessage(message);
      DispatchMessageW(message);
    }
  }
}

fn register_class(instance: HINSTANCE) -> BootstrapResult<()> {
  if CLASS_REGISTERED.load(Ordering::SeqCst) {
    return Ok(());
  }

  let class_name = to_wide(WINDOW_CLASS_NAME);
  let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }
    .map_err(|e| BootstrapError::window("LoadCursorW", e))?;
  let wc = WNDCLASSW {
    style: CS_HREDRAW | CS_VREDRAW,
    lpfnWndProc: Some(wnd_proc),
    hInstance: instance,
    hCursor: cursor,
    lpszClassName: PCWSTR(class_name.as_ptr()),
    ..Default::default()
  };

  if unsafe { RegisterClassW(&wc) } == 0 {
    return Err(BootstrapError::window(
      "RegisterClassW",
      windows::core::Error::from_win32(),
    ));
  }
  CLASS_REGISTERED.store(true, Ordering::SeqCst);
  log::debug!("[window] Class '{}' registered", WINDOW_CLASS_NAME);
  Ok(())
}

fn unregister_class(instance: HINSTANCE) {
  if !CLASS_REGISTERED.swap(false, Ordering::SeqCst) {
    return;
  }
  let class_name = to_wide(WINDOW_CLASS_NAME);
  if let Err(e) = unsafe { UnregisterClassW(PCWSTR(class_name.as_ptr()), Some(instance)) } {
    log::debug!("[window] UnregisterClassW failed: {}", e);
  }
}

fn enable_dpi_awareness() {
  // Fails harmlessly when the manifest or an earlier call already set it
  if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
    log::debug!("[window] DPI awareness not changed: {}", e);
  }
}

fn client_size(hwnd: HWND) -> (i32, i32) {
  let mut rect = RECT::default();
  if let Err(e) = unsafe { GetClientRect(hwnd, &mut rect) } {
    log::warn!("[window] GetClientRect failed: {}", e);
  }
  (rect.right - rect.left, rect.bottom - rect.top)
}

fn fit_to_client(hwnd: HWND, child: HWND) {
  let (width, height) = client_size(hwnd);
  if let Err(e) = unsafe { MoveWindow(child, 0, 0, width, height, true) } {
    log::warn!("[window] Failed to resize content: {}", e);
  }
}

/// `AppsUseLightTheme` is 0 when the user picked dark mode for apps.
fn prefers_dark_theme() -> bool {
  let mut light: u32 = 1;
  let mut size = std::mem::size_of::<u32>() as u32;
  let status = unsafe {
    RegGetValueW(
      HKEY_CURRENT_USER,
      w!("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize"),
      w!("AppsUseLightTheme"),
      RRF_RT_REG_DWORD,
      None,
      Some(&mut light as *mut u32 as *mut c_void),
      Some(&mut size as *mut u32),
    )
  };
  status == ERROR_SUCCESS && light == 0
}

fn update_theme(hwnd: HWND) {
  let dark = BOOL::from(prefers_dark_theme());
  if let Err(e) = unsafe {
    DwmSetWindowAttribute(
      hwnd,
      DWMWA_USE_IMMERSIVE_DARK_MODE,
      &dark as *const BOOL as *const c_void,
      std::mem::size_of::<BOOL>() as u32,
    )
  } {
    log::debug!("[window] Title bar theme not applied: {}", e);
  }
}
