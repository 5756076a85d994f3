//! hidapi-backed enumeration and handles

use std::ffi::CString;
use std::fs::OpenOptions;

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

use crate::error::TransportError;
use crate::types::RawInterface;
use crate::wide::widen;
use crate::{HidBackend, HidHandle};

/// Raw HID backend on top of hidapi
///
/// A fresh `HidApi` context is created per call, so enumeration always
/// reflects the devices attached right now.
#[derive(Debug, Default, Clone, Copy)]
pub struct HidApiBackend;

impl HidApiBackend {
    /// Create a new hidapi backend
    pub fn new() -> Self {
        Self
    }

    fn api() -> Result<HidApi, TransportError> {
        HidApi::new().map_err(|e| TransportError::HidError(e.to_string()))
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&self) -> Result<Vec<RawInterface>, TransportError> {
        let api = Self::api()?;
        let mut interfaces = Vec::new();

        for device_info in api.device_list() {
            let path = device_info.path().to_string_lossy().to_string();
            let product = device_info.product_string().map(widen);
            let serial = device_info.serial_number().map(widen);

            debug!(
                "Found interface: VID={:04X} PID={:04X} path={}",
                device_info.vendor_id(),
                device_info.product_id(),
                path
            );

            interfaces.push(RawInterface {
                path,
                vendor_id: device_info.vendor_id(),
                product_id: device_info.product_id(),
                product,
                serial,
            });
        }

        info!("Found {} HID interfaces", interfaces.len());
        Ok(interfaces)
    }

    fn open_path(&self, path: &str) -> Result<Box<dyn HidHandle>, TransportError> {
        let api = Self::api()?;
        let c_path = CString::new(path)
            .map_err(|_| TransportError::Internal(format!("NUL byte in device path {path:?}")))?;
        let device = api.open_path(&c_path)?;
        debug!("Opened HID device {}", path);
        Ok(Box::new(HidApiHandle {
            device,
            path: path.to_string(),
        }))
    }

    fn check_access(&self, path: &str) -> std::io::Result<()> {
        OpenOptions::new().read(true).write(true).open(path).map(drop)
    }
}

/// An open hidapi device
pub struct HidApiHandle {
    device: HidDevice,
    path: String,
}

impl HidHandle for HidApiHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        Ok(self.device.write(data)?)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        Ok(self.device.read_timeout(buf, timeout_ms)?)
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError> {
        Ok(self.device.set_blocking_mode(!nonblocking)?)
    }
}

impl Drop for HidApiHandle {
    fn drop(&mut self) {
        debug!("Closing HID device {}", self.path);
    }
}
