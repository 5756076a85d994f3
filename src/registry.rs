// Device registry - known Suunto devices
//
// Maps (vendor id, product id, model, firmware) to a display name, a support
// flag and a driver. The bus ids alone only say whether a device could
// match; the model and firmware from the probe pick the exact entry.

use std::fmt;
use std::sync::Arc;

use ambit_transport::SUUNTO_VENDOR_ID;

use crate::device_info::Version;
use crate::driver::DeviceDriver;
use crate::drivers::AmbitDriver;

/// Builds a fresh driver for one session
pub type DriverFactory = Arc<dyn Fn() -> Box<dyn DeviceDriver> + Send + Sync>;

/// One registry entry
#[derive(Clone)]
pub struct KnownDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Model nickname the firmware reports
    pub model: &'static str,
    /// Lowest firmware this entry applies to
    pub min_fw: Version,
    /// Canonical display name
    pub name: &'static str,
    pub supported: bool,
    /// `None` for entries that are recognized but not drivable
    pub driver: Option<DriverFactory>,
    /// Passed to the driver's `init`
    pub driver_param: u32,
}

impl KnownDevice {
    /// Instantiate this entry's driver
    pub fn new_driver(&self) -> Option<Box<dyn DeviceDriver>> {
        self.driver.as_ref().map(|factory| factory())
    }

    fn matches(&self, vendor_id: u16, product_id: u16, model: &str, fw_version: Version) -> bool {
        self.vendor_id == vendor_id
            && self.product_id == product_id
            && self.model == model
            && fw_version >= self.min_fw
    }
}

impl fmt::Debug for KnownDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnownDevice")
            .field("vendor_id", &format_args!("{:04x}", self.vendor_id))
            .field("product_id", &format_args!("{:04x}", self.product_id))
            .field("model", &self.model)
            .field("min_fw", &format_args!("{}", self.min_fw))
            .field("name", &self.name)
            .field("supported", &self.supported)
            .field("driver", &self.driver.is_some())
            .field("driver_param", &format_args!("0x{:04x}", self.driver_param))
            .finish()
    }
}

/// Lookup used by enumeration and session open
pub trait DeviceRegistry: Send + Sync {
    /// Coarse filter on bus ids, before any I/O
    fn is_known(&self, vendor_id: u16, product_id: u16) -> bool;

    /// Precise lookup once the firmware reported model and version
    fn find(&self, vendor_id: u16, product_id: u16, model: &str, fw_version: Version)
        -> Option<&KnownDevice>;
}

/// Table-backed registry
///
/// Entries are searched in order, so for one model the entry with the
/// highest minimum firmware must come first.
#[derive(Debug, Clone)]
pub struct DeviceSupport {
    devices: Vec<KnownDevice>,
}

impl DeviceSupport {
    pub fn new(devices: Vec<KnownDevice>) -> Self {
        Self { devices }
    }

    /// Registry of the Ambit family
    pub fn builtin() -> Self {
        Self::new(builtin_devices())
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownDevice> {
        self.devices.iter()
    }
}

impl Default for DeviceSupport {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DeviceRegistry for DeviceSupport {
    fn is_known(&self, vendor_id: u16, product_id: u16) -> bool {
        self.devices
            .iter()
            .any(|d| d.vendor_id == vendor_id && d.product_id == product_id)
    }

    fn find(
        &self,
        vendor_id: u16,
        product_id: u16,
        model: &str,
        fw_version: Version,
    ) -> Option<&KnownDevice> {
        self.devices
            .iter()
            .find(|d| d.matches(vendor_id, product_id, model, fw_version))
    }
}

/// Log memory format of the first-generation Ambit
const PARAM_AMBIT: u32 = 0x0200;
/// Log memory format of Ambit2 and later
const PARAM_AMBIT2: u32 = 0x0400;

fn ambit_driver() -> DriverFactory {
    Arc::new(|| Box::new(AmbitDriver::new()) as Box<dyn DeviceDriver>)
}

fn supported(
    product_id: u16,
    model: &'static str,
    min_fw: [u8; 4],
    name: &'static str,
    param: u32,
) -> KnownDevice {
    KnownDevice {
        vendor_id: SUUNTO_VENDOR_ID,
        product_id,
        model,
        min_fw: Version(min_fw),
        name,
        supported: true,
        driver: Some(ambit_driver()),
        driver_param: param,
    }
}

fn unsupported(
    product_id: u16,
    model: &'static str,
    min_fw: [u8; 4],
    name: &'static str,
) -> KnownDevice {
    KnownDevice {
        vendor_id: SUUNTO_VENDOR_ID,
        product_id,
        model,
        min_fw: Version(min_fw),
        name,
        supported: false,
        driver: None,
        driver_param: 0,
    }
}

fn builtin_devices() -> Vec<KnownDevice> {
    vec![
        supported(
            0x001e,
            "Ibisbill",
            [0x00, 0x02, 0x00, 0x00],
            "Suunto Ambit3 Run",
            PARAM_AMBIT2,
        ),
        supported(
            0x001d,
            "Greentit",
            [0x00, 0x02, 0x00, 0x00],
            "Suunto Ambit2 R",
            PARAM_AMBIT2,
        ),
        supported(
            0x001c,
            "Finch",
            [0x00, 0x02, 0x00, 0x00],
            "Suunto Ambit3 Sport",
            PARAM_AMBIT2,
        ),
        supported(
            0x001b,
            "Emu",
            [0x00, 0x02, 0x00, 0x00],
            "Suunto Ambit3 Peak",
            PARAM_AMBIT2,
        ),
        supported(
            0x001a,
            "Colibri",
            [0x01, 0x01, 0x02, 0x00],
            "Suunto Ambit2 S",
            PARAM_AMBIT2,
        ),
        supported(
            0x0019,
            "Duck",
            [0x01, 0x01, 0x02, 0x00],
            "Suunto Ambit2",
            PARAM_AMBIT2,
        ),
        unsupported(
            0x001a,
            "Colibri",
            [0x00, 0x02, 0x00, 0x00],
            "Suunto Ambit2 S",
        ),
        unsupported(0x0019, "Duck", [0x00, 0x02, 0x00, 0x00], "Suunto Ambit2"),
        supported(
            0x0010,
            "Bluebird",
            [0x01, 0x01, 0x00, 0x00],
            "Suunto Ambit",
            PARAM_AMBIT,
        ),
        unsupported(0x0010, "Bluebird", [0x00, 0x00, 0x00, 0x00], "Suunto Ambit"),
    ]
}
