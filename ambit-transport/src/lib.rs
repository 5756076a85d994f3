//! Transport seams for Suunto Ambit wrist computers
//!
//! This crate holds everything the identification core talks to but does not
//! own:
//!
//! - raw HID enumeration and handles ([`HidBackend`], [`HidHandle`]), with a
//!   hidapi implementation
//! - the request/response protocol exchange ([`ProtocolTransport`])
//! - bounded wide-string transcoding ([`wide::wide_to_utf8`])
//! - command identifiers and typed payloads

pub mod command;
pub mod error;
pub mod protocol;
pub mod types;
pub mod wide;

mod hid;

pub use command::{AmbitCommand, DeviceInfoReply, DeviceInfoRequest};
pub use error::TransportError;
pub use hid::{HidApiBackend, HidApiHandle};
pub use protocol::{cmd, SUUNTO_VENDOR_ID};
pub use types::RawInterface;

/// Lists attached HID interfaces and opens them
pub trait HidBackend {
    /// List every attached HID interface with its bus-level metadata
    fn enumerate(&self) -> Result<Vec<RawInterface>, TransportError>;

    /// Open an interface by path for protocol I/O
    fn open_path(&self, path: &str) -> Result<Box<dyn HidHandle>, TransportError>;

    /// Plain read/write open of the path, used to explain why `open_path`
    /// failed. The OS error code is kept in the returned error.
    fn check_access(&self, path: &str) -> std::io::Result<()>;
}

/// An open HID interface
///
/// Dropping the handle closes it.
pub trait HidHandle: Send {
    /// Path the handle was opened from
    fn path(&self) -> &str;

    /// Write one output report
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Read one input report, waiting up to `timeout_ms` (-1 blocks)
    ///
    /// Returns 0 when nothing arrived in time.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError>;

    /// Switch between blocking and non-blocking reads
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError>;
}

/// Executes one command exchange over an open handle
///
/// Implementations own packet framing, chunking, retries and timeouts.
/// `sequence_no` is the caller's request counter; implementations advance it
/// for every packet they send.
pub trait ProtocolTransport: Send + Sync {
    /// Send `cmd` with `payload` and return the reassembled reply payload
    ///
    /// `legacy` selects the older packet format some commands still use.
    fn command(
        &self,
        handle: &mut dyn HidHandle,
        sequence_no: &mut u16,
        cmd: u16,
        payload: &[u8],
        legacy: bool,
    ) -> Result<Vec<u8>, TransportError>;
}
