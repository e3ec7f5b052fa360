use std::marker::PhantomData;

use crate::error::{BridgeError, Result};

/// Single-threaded COM apartment held by the current thread.
///
/// Entering initializes COM for the thread; dropping uninitializes it. The
/// guard is neither `Send` nor `Sync`, so it is released on the thread that
/// entered it, exactly once.
#[derive(Debug)]
pub struct ApartmentGuard {
    _thread_bound: PhantomData<*const ()>,
}

impl ApartmentGuard {
    #[cfg(windows)]
    pub fn enter() -> Result<Self> {
        use windows::Win32::System::Com::{COINIT_APARTMENTTHREADED, CoInitializeEx};

        // S_FALSE (already initialized on this thread) still needs a matching
        // uninitialize, so only real failures are errors.
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
            .ok()
            .map_err(|e| BridgeError::BackendUnavailable(format!("CoInitializeEx failed: {e}")))?;
        Ok(Self {
            _thread_bound: PhantomData,
        })
    }

    #[cfg(not(windows))]
    pub fn enter() -> Result<Self> {
        Err(BridgeError::BackendUnavailable(
            "COM automation is only available on Windows".to_string(),
        ))
    }
}

impl Drop for ApartmentGuard {
    fn drop(&mut self) {
        #[cfg(windows)]
        unsafe {
            windows::Win32::System::Com::CoUninitialize();
        }
    }
}
