//! Protocol constants for Suunto Ambit communication
//!
//! Only the command identifiers live here. Packet framing, chunking and
//! reply reassembly belong to a [`crate::ProtocolTransport`] implementation.

/// Suunto USB vendor ID
pub const SUUNTO_VENDOR_ID: u16 = 0x1493;

/// Command identifiers (`ambit_command_*`)
pub mod cmd {
    pub const DEVICE_INFO: u16 = 0x0000;
    pub const TIME: u16 = 0x0300;
    pub const DATE: u16 = 0x0302;
    pub const DEVICE_STATUS: u16 = 0x0306;
    pub const PERSONAL_SETTINGS: u16 = 0x0b00;
    pub const LOG_COUNT: u16 = 0x0b06;
    pub const LOG_HEAD_FIRST: u16 = 0x0b07;
    pub const LOG_HEAD_PEEK: u16 = 0x0b08;
    pub const LOG_HEAD_STEP: u16 = 0x0b0a;
    pub const LOG_HEAD: u16 = 0x0b0b;
    pub const GPS_ORBIT_HEAD: u16 = 0x0b15;
    pub const DATA_WRITE: u16 = 0x0b16;
    pub const LOG_READ: u16 = 0x0b17;
    pub const DATA_TAIL_LEN: u16 = 0x0b18;
    pub const LOCK_CHECK: u16 = 0x0b19;
    pub const LOCK_SET: u16 = 0x0b1a;
    pub const WRITE_START: u16 = 0x0b1b;

    /// Get human-readable name for a command identifier
    pub fn name(cmd: u16) -> &'static str {
        match cmd {
            DEVICE_INFO => "DEVICE_INFO",
            TIME => "TIME",
            DATE => "DATE",
            DEVICE_STATUS => "DEVICE_STATUS",
            PERSONAL_SETTINGS => "PERSONAL_SETTINGS",
            LOG_COUNT => "LOG_COUNT",
            LOG_HEAD_FIRST => "LOG_HEAD_FIRST",
            LOG_HEAD_PEEK => "LOG_HEAD_PEEK",
            LOG_HEAD_STEP => "LOG_HEAD_STEP",
            LOG_HEAD => "LOG_HEAD",
            GPS_ORBIT_HEAD => "GPS_ORBIT_HEAD",
            DATA_WRITE => "DATA_WRITE",
            LOG_READ => "LOG_READ",
            DATA_TAIL_LEN => "DATA_TAIL_LEN",
            LOCK_CHECK => "LOCK_CHECK",
            LOCK_SET => "LOCK_SET",
            WRITE_START => "WRITE_START",
            _ => "UNKNOWN",
        }
    }
}

/// Fixed field widths of the device-info reply
pub mod device_info {
    /// Model (nickname) field width, not necessarily NUL terminated
    pub const MODEL_FIELD_LEN: usize = 16;
    /// Serial number field width, not necessarily NUL terminated
    pub const SERIAL_FIELD_LEN: usize = 16;
    /// Firmware and hardware version width
    pub const VERSION_FIELD_LEN: usize = 4;
    /// Minimum reply length carrying every identity field
    pub const REPLY_LEN: usize = MODEL_FIELD_LEN + SERIAL_FIELD_LEN + 2 * VERSION_FIELD_LEN;
}

/// Memory layout used when uploading GPS orbit data
pub mod gps_orbit {
    /// Device address the orbit blob is written to
    pub const BASE_ADDRESS: u32 = 0x000A_0000;
    /// Largest data chunk carried by one DATA_WRITE command
    pub const CHUNK_SIZE: usize = 1024;
    /// Length of the orbit header returned by GPS_ORBIT_HEAD
    pub const HEADER_LEN: usize = 8;
}
