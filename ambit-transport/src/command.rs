//! Typed command payloads and replies
//!
//! Wire structs are `repr(C)` byte layouts read and written with zerocopy.
//! Multi-byte fields are little-endian on the wire.

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::protocol::{cmd, device_info};

/// A command whose payload is a fixed wire struct
pub trait AmbitCommand: IntoBytes + Immutable {
    /// Command identifier
    const CMD: u16;
    /// Whether the command uses the legacy packet format
    const LEGACY: bool = false;

    /// Serialize the payload
    fn to_data(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

// =============================================================================
// Device info
// =============================================================================

/// DEVICE_INFO (0x0000) request: 4-byte software version tag.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DeviceInfoRequest {
    pub version_tag: [u8; 4],
}

impl AmbitCommand for DeviceInfoRequest {
    const CMD: u16 = cmd::DEVICE_INFO;
    const LEGACY: bool = true;
}

/// DEVICE_INFO (0x0000) reply: 40 bytes.
///
/// Text fields are fixed width and only NUL terminated when shorter than the
/// field. Any trailing bytes after the hardware version are ignored.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DeviceInfoReply {
    pub model: [u8; device_info::MODEL_FIELD_LEN],
    pub serial: [u8; device_info::SERIAL_FIELD_LEN],
    pub fw_version: [u8; device_info::VERSION_FIELD_LEN],
    pub hw_version: [u8; device_info::VERSION_FIELD_LEN],
}

impl DeviceInfoReply {
    /// Read the reply from the start of a payload, `None` when too short
    pub fn parse(reply: &[u8]) -> Option<Self> {
        Self::read_from_prefix(reply).ok().map(|(parsed, _rest)| parsed)
    }
}

// =============================================================================
// Clock
// =============================================================================

/// DATE (0x0302): 8 bytes.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SetDate {
    pub year: U16,
    pub month: u8,
    pub day: u8,
    _reserved: [u8; 4],
}

impl SetDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self {
            year: U16::new(year),
            month,
            day,
            _reserved: [0; 4],
        }
    }
}

impl AmbitCommand for SetDate {
    const CMD: u16 = cmd::DATE;
}

/// TIME (0x0300): 20 bytes, date repeated ahead of the time of day.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SetTime {
    pub year: U16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub millis: U16,
    _reserved: [u8; 8],
    flags: U32,
}

impl SetTime {
    /// Flag value the device expects in the trailing word
    const SYNC_FLAGS: u32 = 0x02;

    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year: U16::new(year),
            month,
            day,
            hour,
            minute,
            millis: U16::new(u16::from(second) * 1000),
            _reserved: [0; 8],
            flags: U32::new(Self::SYNC_FLAGS),
        }
    }
}

impl AmbitCommand for SetTime {
    const CMD: u16 = cmd::TIME;
}

// =============================================================================
// Log lock
// =============================================================================

/// LOCK_SET (0x0b1a): 4 bytes, 1 = locked.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SetLock {
    pub state: U32,
}

impl SetLock {
    pub fn new(lock: bool) -> Self {
        Self {
            state: U32::new(u32::from(lock)),
        }
    }
}

impl AmbitCommand for SetLock {
    const CMD: u16 = cmd::LOCK_SET;
}

// =============================================================================
// Data upload
// =============================================================================

/// Header preceding each DATA_WRITE (0x0b16) chunk: 8 bytes.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DataWriteHeader {
    pub address: U32,
    pub length: U32,
}

impl DataWriteHeader {
    pub fn new(address: u32, length: u32) -> Self {
        Self {
            address: U32::new(address),
            length: U32::new(length),
        }
    }

    /// Header followed by the chunk bytes
    pub fn with_chunk(&self, chunk: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(std::mem::size_of::<Self>() + chunk.len());
        data.extend_from_slice(self.as_bytes());
        data.extend_from_slice(chunk);
        data
    }
}

/// DATA_TAIL_LEN (0x0b18): 4 bytes, total bytes written.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DataTailLen {
    pub length: U32,
}

impl DataTailLen {
    pub fn new(length: u32) -> Self {
        Self {
            length: U32::new(length),
        }
    }
}

impl AmbitCommand for DataTailLen {
    const CMD: u16 = cmd::DATA_TAIL_LEN;
}

/// WRITE_START (0x0b1b): 4 bytes.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct WriteStart {
    pub flags: U32,
}

impl Default for WriteStart {
    fn default() -> Self {
        Self {
            flags: U32::new(1),
        }
    }
}

impl AmbitCommand for WriteStart {
    const CMD: u16 = cmd::WRITE_START;
}
