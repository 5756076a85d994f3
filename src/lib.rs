//! Identification and session handling for Suunto Ambit wrist computers
//!
//! [`AmbitDiscovery`] enumerates attached HID interfaces, probes the ones the
//! registry recognizes and returns one [`DeviceInfo`] per device. A supported
//! record opens a [`Session`], which routes capability calls to the driver
//! bound from the registry and tears everything down when closed or dropped.
//! Logs come back as owned [`LogEntry`] values.

pub mod config;
pub mod device_info;
pub mod discovery;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod log_entry;
pub mod registry;
pub mod session;

pub use ambit_transport as transport;

pub use config::Config;
pub use device_info::{version_string, AccessStatus, DeviceInfo, Version};
pub use discovery::AmbitDiscovery;
pub use driver::{DeviceContext, DeviceDriver, DeviceStatus, LogSink, PersonalSettings};
pub use drivers::AmbitDriver;
pub use error::{AmbitError, Result};
pub use log_entry::{release, LogEntry, LogHeader, LogSample, ReleaseStats, SampleData};
pub use registry::{DeviceRegistry, DeviceSupport, KnownDevice};
pub use session::{close_session, Session};
