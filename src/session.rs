//! Open sessions on a single device
//!
//! A [`Session`] owns the HID handle, a copy of the device identity and the
//! driver bound at open time. Teardown runs once, from [`Session::close`] or
//! from `Drop`: release the log lock, deinitialize the driver, then close
//! the handle.

use std::sync::Arc;

use ambit_transport::{HidHandle, ProtocolTransport};
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::device_info::DeviceInfo;
use crate::discovery::AmbitDiscovery;
use crate::driver::{DeviceContext, DeviceDriver, DeviceStatus, LogSink, PersonalSettings};
use crate::error::{AmbitError, Result};

/// A live connection to one device
pub struct Session {
    handle: Option<Box<dyn HidHandle>>,
    device_info: DeviceInfo,
    driver: Option<Box<dyn DeviceDriver>>,
    sequence_no: u16,
    protocol: Arc<dyn ProtocolTransport>,
}

impl Session {
    /// Open a session on an enumerated, supported device
    ///
    /// Records that were not identified, or are not supported, are refused
    /// before any I/O happens.
    pub fn open(discovery: &AmbitDiscovery, info: &DeviceInfo) -> Result<Self> {
        if info.path.is_empty() {
            error!("Cannot open device: empty path");
            return Err(AmbitError::InvalidArgument("empty device path".to_string()));
        }

        if !info.access_status.is_ok() || !info.is_supported {
            debug!(
                "Refusing to open {} (access: {}, supported: {})",
                info.path, info.access_status, info.is_supported
            );
            return Err(AmbitError::DeviceUnavailable {
                path: info.path.clone(),
                reason: if info.access_status.is_ok() {
                    "device not supported".to_string()
                } else {
                    info.access_status.to_string()
                },
            });
        }

        let known = discovery
            .registry()
            .find(info.vendor_id, info.product_id, &info.model, info.fw_version)
            .ok_or_else(|| AmbitError::UnknownDevice {
                vendor_id: info.vendor_id,
                product_id: info.product_id,
                model: info.model.clone(),
            })?;
        let driver = known.new_driver();
        let driver_param = known.driver_param;

        let handle = match discovery.backend().open_path(&info.path) {
            Ok(mut handle) => {
                if discovery.config().nonblocking {
                    if let Err(e) = handle.set_nonblocking(true) {
                        warn!("{}: failed to set non-blocking mode: {}", info.path, e);
                    }
                }
                Some(handle)
            }
            Err(e) => {
                warn!("{}: failed to open HID device: {}", info.path, e);
                None
            }
        };

        let mut session = Session {
            handle,
            device_info: info.clone(),
            driver: None,
            sequence_no: 0,
            protocol: Arc::clone(discovery.protocol()),
        };

        if let Some(mut driver) = driver {
            // On failure the driver is dropped without deinit and the
            // session drop closes the handle
            let mut ctx = session.context();
            driver.init(&mut ctx, driver_param)?;
            session.driver = Some(driver);
        }

        info!("Opened {}", session.device_info.path);
        Ok(session)
    }

    /// Identity the session was opened with
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Current request sequence number
    pub fn sequence_no(&self) -> u16 {
        self.sequence_no
    }

    /// Whether the HID handle opened successfully
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Show the sync message on the device display (takes the log lock)
    pub fn sync_display_show(&mut self) -> Result<()> {
        self.set_log_lock(true)
    }

    /// Clear the sync message on the device display (releases the log lock)
    pub fn sync_display_clear(&mut self) -> Result<()> {
        self.set_log_lock(false)
    }

    pub fn date_time_set(&mut self, date_time: &NaiveDateTime) -> Result<()> {
        self.dispatch("date_time_set", |driver, ctx| driver.date_time_set(ctx, date_time))
    }

    pub fn status_get(&mut self) -> Result<DeviceStatus> {
        self.dispatch("status_get", |driver, ctx| driver.status_get(ctx))
    }

    pub fn personal_settings_get(&mut self) -> Result<PersonalSettings> {
        self.dispatch("personal_settings_get", |driver, ctx| {
            driver.personal_settings_get(ctx)
        })
    }

    /// Read the 8-byte header of the GPS orbit data stored on the device
    pub fn gps_orbit_header_read(&mut self) -> Result<[u8; 8]> {
        self.dispatch("gps_orbit_header_read", |driver, ctx| {
            driver.gps_orbit_header_read(ctx)
        })
    }

    pub fn gps_orbit_write(&mut self, data: &[u8]) -> Result<()> {
        self.dispatch("gps_orbit_write", |driver, ctx| driver.gps_orbit_write(ctx, data))
    }

    /// Read logs into `sink`, returning how many entries were pushed
    pub fn log_read(&mut self, sink: &mut dyn LogSink) -> Result<usize> {
        self.dispatch("log_read", |driver, ctx| driver.log_read(ctx, sink))
    }

    /// Tear the session down explicitly
    pub fn close(mut self) {
        self.teardown();
    }

    fn context(&mut self) -> DeviceContext<'_> {
        DeviceContext::new(
            self.handle.as_deref_mut(),
            &mut self.sequence_no,
            self.protocol.as_ref(),
            &self.device_info,
        )
    }

    /// Route a capability call to the driver
    fn dispatch<T>(
        &mut self,
        name: &'static str,
        call: impl FnOnce(&mut dyn DeviceDriver, &mut DeviceContext<'_>) -> Result<T>,
    ) -> Result<T> {
        let Some(driver) = self.driver.as_deref_mut() else {
            warn!("Driver does not support {}", name);
            return Err(AmbitError::Unsupported(name));
        };

        let mut ctx = DeviceContext::new(
            self.handle.as_deref_mut(),
            &mut self.sequence_no,
            self.protocol.as_ref(),
            &self.device_info,
        );
        match call(driver, &mut ctx) {
            Err(AmbitError::Unsupported(_)) => {
                warn!("Driver does not support {}", name);
                Err(AmbitError::Unsupported(name))
            }
            result => result,
        }
    }

    fn set_log_lock(&mut self, lock: bool) -> Result<()> {
        let Some(driver) = self.driver.as_mut() else {
            return Ok(());
        };

        let mut ctx = DeviceContext::new(
            self.handle.as_deref_mut(),
            &mut self.sequence_no,
            self.protocol.as_ref(),
            &self.device_info,
        );
        match driver.lock_log(&mut ctx, lock) {
            Err(e) if e.is_unsupported() => Ok(()),
            result => result,
        }
    }

    /// Release lock, deinit driver, close handle; runs at most once
    fn teardown(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            let mut ctx = DeviceContext::new(
                self.handle.as_deref_mut(),
                &mut self.sequence_no,
                self.protocol.as_ref(),
                &self.device_info,
            );
            match driver.lock_log(&mut ctx, false) {
                Ok(()) => {}
                Err(e) if e.is_unsupported() => {}
                Err(e) => warn!("{}: failed to release log lock: {}", self.device_info.path, e),
            }
            if let Err(e) = driver.deinit(&mut ctx) {
                warn!("{}: driver deinit failed: {}", self.device_info.path, e);
            }
        }

        if let Some(handle) = self.handle.take() {
            info!("Closing {}", self.device_info.path);
            drop(handle);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Close a session if there is one
pub fn close_session(session: Option<Session>) {
    if let Some(session) = session {
        session.close();
    }
}
