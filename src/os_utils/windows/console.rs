use windows::core::PCWSTR;
use windows::Win32::Foundation::{GENERIC_READ, GENERIC_WRITE, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Console::{
    AllocConsole, AttachConsole, SetStdHandle, ATTACH_PARENT_PROCESS, STD_ERROR_HANDLE,
    STD_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows::Win32::System::Diagnostics::Debug::{IsDebuggerPresent, OutputDebugStringW};

use super::to_wide;
use crate::error::{BootstrapError, BootstrapResult};

/// Attach to the console of the process that launched us (e.g. a terminal).
pub fn attach_parent_console() -> BootstrapResult<()> {
    unsafe { AttachConsole(ATTACH_PARENT_PROCESS) }
        .map_err(|e| BootstrapError::ConsoleAttach(format!("AttachConsole: {}", e)))?;
    reopen_std_handles();
    Ok(())
}

/// Allocate a new console window for this process.
pub fn create_and_attach_console() -> BootstrapResult<()> {
    unsafe { AllocConsole() }
        .map_err(|e| BootstrapError::ConsoleAttach(format!("AllocConsole: {}", e)))?;
    reopen_std_handles();
    Ok(())
}

pub fn is_debugger_present() -> bool {
    unsafe { IsDebuggerPresent().as_bool() }
}

/// Write a line to the attached debugger's output window.
pub fn output_debug_string(message: &str) {
    let wide = to_wide(message);
    unsafe { OutputDebugStringW(PCWSTR(wide.as_ptr())) };
}

// A GUI-subsystem process starts without standard handles. After attaching,
// point them at the console device so stderr logging lands there.
fn reopen_std_handles() {
    if let Some(out) = open_console_device("CONOUT$", GENERIC_WRITE.0) {
        set_std_handle(STD_OUTPUT_HANDLE, out);
        set_std_handle(STD_ERROR_HANDLE, out);
    }
    if let Some(input) = open_console_device("CONIN$", GENERIC_READ.0) {
        set_std_handle(STD_INPUT_HANDLE, input);
    }
}

fn open_console_device(name: &str, access: u32) -> Option<HANDLE> {
    let wide = to_wide(name);
    let handle = unsafe {
        CreateFileW(
            PCWSTR(wide.as_ptr()),
            access,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            None,
            OPEN_EXISTING,
            FILE_FLAGS_AND_ATTRIBUTES(0),
            None,
        )
    };
    match handle {
        Ok(handle) => Some(handle),
        Err(e) => {
            output_debug_string(&format!("[console] Failed to open {}: {}\n", name, e));
            None
        }
    }
}

fn set_std_handle(which: STD_HANDLE, handle: HANDLE) {
    if let Err(e) = unsafe { SetStdHandle(which, handle) } {
        output_debug_string(&format!("[console] SetStdHandle failed: {}\n", e));
    }
}
