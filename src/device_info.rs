// Identity records produced by enumeration
//
// A DeviceInfo is the resolved description of one physical interface after
// probing and registry reconciliation.

use std::cmp::Ordering;
use std::fmt;

use ambit_transport::protocol::device_info::{MODEL_FIELD_LEN, SERIAL_FIELD_LEN};
use ambit_transport::DeviceInfoReply;
use tracing::warn;

use crate::error::{AmbitError, Result};

/// Width of the model (nickname) field, and its maximum character count
pub const MODEL_NAME_LENGTH: usize = MODEL_FIELD_LEN;
/// Width of the serial number field, and its maximum character count
pub const SERIAL_LENGTH: usize = SERIAL_FIELD_LEN;
/// Maximum bytes of the display name field
pub const PRODUCT_NAME_LENGTH: usize = 32;
/// Maximum length of a rendered version ("255.255.65535")
pub const VERSION_LENGTH: usize = 13;

/// Four-byte firmware or hardware version
///
/// Bytes are `[major, minor, patch_lo, patch_hi]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version(pub [u8; 4]);

impl Version {
    pub const fn new(major: u8, minor: u8, patch: u16) -> Self {
        let [lo, hi] = patch.to_le_bytes();
        Self([major, minor, lo, hi])
    }

    pub fn major(&self) -> u8 {
        self.0[0]
    }

    pub fn minor(&self) -> u8 {
        self.0[1]
    }

    /// Little-endian patch level from bytes 2 and 3
    pub fn patch(&self) -> u16 {
        u16::from_le_bytes([self.0[2], self.0[3]])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |v: &Self| (v.major(), v.minor(), v.patch());
        key(self).cmp(&key(other))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

impl From<[u8; 4]> for Version {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

/// Render version bytes as `"<major>.<minor>.<patch>"`
pub fn version_string(version: &[u8; 4]) -> String {
    Version(*version).to_string()
}

/// Why a record could or could not be probed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessStatus {
    /// Opened and identified by the firmware
    Ok,
    /// Opened, but the device-info probe got no usable reply
    NoReply,
    /// Read/write access exists but the HID open still failed
    Unopenable,
    /// Communication impossible; carries the OS error code
    Os(i32),
    /// Not probed yet
    #[default]
    Unknown,
}

impl AccessStatus {
    /// Numeric access status: 0 unless an OS error explains the failure
    pub fn code(&self) -> i32 {
        match self {
            AccessStatus::Os(code) => *code,
            _ => 0,
        }
    }

    /// True only when the firmware confirmed the identity
    pub fn is_ok(&self) -> bool {
        matches!(self, AccessStatus::Ok)
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStatus::Ok => write!(f, "ok"),
            AccessStatus::NoReply => write!(f, "no reply to device info"),
            AccessStatus::Unopenable => write!(f, "read/write access but cannot open HID device"),
            AccessStatus::Os(code) => write!(f, "{}", std::io::Error::from_raw_os_error(*code)),
            AccessStatus::Unknown => write!(f, "not probed"),
        }
    }
}

/// Identity record for one enumerated interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Platform device path, unique per physical interface
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Display name, at most [`PRODUCT_NAME_LENGTH`] bytes
    pub name: String,
    /// Serial number, at most [`SERIAL_LENGTH`] characters
    pub serial: String,
    /// Firmware-reported model, at most [`MODEL_NAME_LENGTH`] characters
    pub model: String,
    pub fw_version: Version,
    pub hw_version: Version,
    pub is_supported: bool,
    pub access_status: AccessStatus,
}

impl DeviceInfo {
    /// Record carrying only bus identity
    pub fn new(path: impl Into<String>, vendor_id: u16, product_id: u16) -> Self {
        Self {
            path: path.into(),
            vendor_id,
            product_id,
            ..Default::default()
        }
    }

    /// Clear every identity field beyond path and bus ids
    pub(crate) fn clear_identity(&mut self) {
        self.name.clear();
        self.serial.clear();
        self.model.clear();
        self.fw_version = Version::default();
        self.hw_version = Version::default();
        self.is_supported = false;
    }

    /// Adopt identity fields decoded from the firmware
    pub(crate) fn apply_firmware(&mut self, identity: FirmwareIdentity) {
        self.model = identity.model;
        self.serial = identity.serial;
        self.fw_version = identity.fw_version;
        self.hw_version = identity.hw_version;
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' (serial: {}, VID/PID: {:04x}/{:04x}, ",
            self.path, self.name, self.serial, self.vendor_id, self.product_id
        )?;
        write!(
            f,
            "nick: {}, F/W: {}, H/W: {}, supported: {})",
            self.model,
            self.fw_version,
            self.hw_version,
            if self.is_supported { "YES" } else { "NO" }
        )
    }
}

/// Identity fields decoded from a DEVICE_INFO reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareIdentity {
    pub model: String,
    pub serial: String,
    pub fw_version: Version,
    pub hw_version: Version,
}

impl FirmwareIdentity {
    /// Decode a DEVICE_INFO reply payload
    pub fn parse(reply: &[u8]) -> Result<Self> {
        let raw = DeviceInfoReply::parse(reply).ok_or_else(|| {
            AmbitError::UnexpectedResponse(format!(
                "device info reply too short: {} bytes",
                reply.len()
            ))
        })?;

        Ok(Self {
            model: fixed_field_to_string("model", &raw.model),
            serial: fixed_field_to_string("serial", &raw.serial),
            fw_version: Version(raw.fw_version),
            hw_version: Version(raw.hw_version),
        })
    }
}

/// Decode a fixed-width text field up to its first NUL
///
/// The clock encoding is assumed to be ASCII. Other bytes are logged and
/// kept, each decoded to one replacement character, so the result never has
/// more characters than the field has bytes.
fn fixed_field_to_string(field: &str, bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text = &bytes[..end];
    for (position, byte) in text.iter().enumerate().filter(|(_, b)| !b.is_ascii()) {
        warn!(
            "non-ASCII byte in {} at position {}: 0x{:02x}",
            field, position, byte
        );
    }
    String::from_utf8_lossy(text).into_owned()
}

/// Longest prefix of `s` that fits `max_bytes` without splitting a character
pub fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
