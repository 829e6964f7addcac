use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

use crate::bootstrap::Apartment;
use crate::error::{BootstrapError, BootstrapResult};

/// Single-threaded COM apartment for the UI thread, required by the runtime's plugins.
#[derive(Debug, Default)]
pub struct ComApartment;

impl Apartment for ComApartment {
    fn initialize(&self) -> BootstrapResult<()> {
        // S_FALSE (already initialized on this thread) still needs a matching CoUninitialize
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
            .ok()
            .map_err(|e| BootstrapError::ComInit(format!("CoInitializeEx failed: {:?}", e)))?;
        log::debug!("[com] Apartment initialized");
        Ok(())
    }

    fn uninitialize(&self) {
        unsafe { CoUninitialize() };
        log::debug!("[com] Apartment released");
    }
}
