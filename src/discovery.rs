//! Device discovery and identification for Suunto Ambit devices
//!
//! Enumeration turns raw HID interfaces into [`DeviceInfo`] records. Every
//! interface that passes the registry's bus-id filter is probed over the live
//! transport, and a failed probe still yields a record that says why.

use std::sync::Arc;

use ambit_transport::wide::wide_to_utf8;
use ambit_transport::{
    DeviceInfoRequest, HidApiBackend, HidBackend, HidHandle, ProtocolTransport, RawInterface,
};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::device_info::{
    truncate_utf8, AccessStatus, DeviceInfo, FirmwareIdentity, PRODUCT_NAME_LENGTH, SERIAL_LENGTH,
};
use crate::driver::DeviceContext;
use crate::error::{AmbitError, Result};
use crate::registry::{DeviceRegistry, DeviceSupport};
use crate::session::Session;

/// Enumerates, identifies and opens Ambit devices
pub struct AmbitDiscovery {
    backend: Box<dyn HidBackend>,
    protocol: Arc<dyn ProtocolTransport>,
    registry: Arc<dyn DeviceRegistry>,
    config: Config,
}

impl AmbitDiscovery {
    /// Create a discovery over `backend` with the built-in registry and
    /// default configuration
    pub fn new(backend: impl HidBackend + 'static, protocol: Arc<dyn ProtocolTransport>) -> Self {
        Self {
            backend: Box::new(backend),
            protocol,
            registry: Arc::new(DeviceSupport::builtin()),
            config: Config::default(),
        }
    }

    /// Create a discovery on the system HID stack
    pub fn with_hidapi(protocol: Arc<dyn ProtocolTransport>) -> Self {
        Self::new(HidApiBackend::new(), protocol)
    }

    /// Replace the device registry
    pub fn with_registry(mut self, registry: impl DeviceRegistry + 'static) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &dyn DeviceRegistry {
        self.registry.as_ref()
    }

    pub(crate) fn backend(&self) -> &dyn HidBackend {
        self.backend.as_ref()
    }

    pub(crate) fn protocol(&self) -> &Arc<dyn ProtocolTransport> {
        &self.protocol
    }

    /// List every attached device the registry recognizes
    ///
    /// Records come back in enumeration order. Interfaces with unknown bus
    /// ids produce no record; interfaces that fail to probe produce a record
    /// whose access status explains the failure.
    pub fn enumerate(&self) -> Vec<DeviceInfo> {
        let interfaces = match self.backend.enumerate() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!("HID enumeration failed: {}", e);
                return Vec::new();
            }
        };

        if interfaces.is_empty() {
            warn!("No HID devices found");
            return Vec::new();
        }

        let devices: Vec<DeviceInfo> = interfaces
            .iter()
            .filter_map(|raw| self.identify(raw))
            .collect();

        debug!(
            "Identified {} of {} HID interfaces",
            devices.len(),
            interfaces.len()
        );
        devices
    }

    /// Enumerate and open the device at `pathname`
    pub fn open_path(&self, pathname: &str) -> Result<Session> {
        if pathname.is_empty() {
            error!("Cannot open device: empty path");
            return Err(AmbitError::InvalidArgument("empty device path".to_string()));
        }

        let info = self
            .enumerate()
            .into_iter()
            .find(|info| info.path == pathname)
            .ok_or_else(|| {
                warn!("No known device at {}", pathname);
                AmbitError::DeviceNotFound(pathname.to_string())
            })?;

        self.open(&info)
    }

    /// Open a session on an enumerated device
    pub fn open(&self, info: &DeviceInfo) -> Result<Session> {
        Session::open(self, info)
    }

    /// Build the record for one raw interface
    fn identify(&self, raw: &RawInterface) -> Option<DeviceInfo> {
        if raw.path.is_empty() {
            error!(
                "HID interface {:04x}/{:04x} has no path, skipping",
                raw.vendor_id, raw.product_id
            );
            return None;
        }

        if !self.registry.is_known(raw.vendor_id, raw.product_id) {
            debug!(
                "Ignoring unknown device {:04x}/{:04x} at {}",
                raw.vendor_id, raw.product_id, raw.path
            );
            return None;
        }

        let mut info = DeviceInfo::new(raw.path.clone(), raw.vendor_id, raw.product_id);
        info.name = raw
            .product
            .as_deref()
            .map(|product| wide_to_utf8(product, PRODUCT_NAME_LENGTH))
            .unwrap_or_default();
        info.serial = raw
            .serial
            .as_deref()
            .map(|serial| wide_to_utf8(serial, SERIAL_LENGTH))
            .unwrap_or_default();

        match self.backend.open_path(&raw.path) {
            Ok(mut handle) => {
                // Probe handle closes when it drops at the end of this arm
                self.probe(&mut info, &mut *handle);
            }
            Err(open_err) => match self.backend.check_access(&raw.path) {
                Err(access_err) => {
                    error!("{}: cannot open HID device: {}", raw.path, access_err);
                    info.access_status = AccessStatus::Os(access_err.raw_os_error().unwrap_or(-1));
                    info.clear_identity();
                }
                Ok(()) => {
                    warn!(
                        "{}: has read/write access but cannot open HID device: {}",
                        raw.path, open_err
                    );
                    info.access_status = AccessStatus::Unopenable;
                    info.is_supported = false;
                }
            },
        }

        info!("{}", info);
        Some(info)
    }

    /// Ask the firmware who it is and reconcile with the registry
    fn probe(&self, info: &mut DeviceInfo, handle: &mut (dyn HidHandle + 'static)) {
        let request = DeviceInfoRequest {
            version_tag: self.config.version_tag,
        };
        let reply = {
            let mut sequence_no = 0u16;
            let mut ctx =
                DeviceContext::new(Some(handle), &mut sequence_no, self.protocol.as_ref(), info);
            ctx.execute(&request)
        };

        let identity = match reply.and_then(|reply| FirmwareIdentity::parse(&reply)) {
            Ok(identity) => identity,
            Err(e) => {
                error!("{}: failed to read device info: {}", info.path, e);
                info.access_status = AccessStatus::NoReply;
                info.is_supported = false;
                return;
            }
        };

        if !info.serial.is_empty() && info.serial != identity.serial {
            info!(
                "{}: preferring F/W serial number over HID serial number ('{}' vs '{}')",
                info.path, identity.serial, info.serial
            );
        }
        info.apply_firmware(identity);

        match self
            .registry
            .find(info.vendor_id, info.product_id, &info.model, info.fw_version)
        {
            Some(known) => {
                if known.name != info.name {
                    info!(
                        "{}: preferring known device name over HID name ('{}' vs '{}')",
                        info.path, known.name, info.name
                    );
                }
                info.name = truncate_utf8(known.name, PRODUCT_NAME_LENGTH);
                info.is_supported = known.supported;
            }
            None => {
                debug!(
                    "{}: no registry entry for model '{}' F/W {}",
                    info.path, info.model, info.fw_version
                );
                info.is_supported = false;
            }
        }
        info.access_status = AccessStatus::Ok;
    }
}
