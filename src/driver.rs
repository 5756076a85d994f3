//! Driver seam
//!
//! A driver is the per-family behaviour bound to a session at open time.
//! Every capability has a default body that reports it as unsupported and
//! performs no I/O, so a driver implements only what its devices can do.

use ambit_transport::{cmd, AmbitCommand, HidHandle, ProtocolTransport, TransportError};
use chrono::NaiveDateTime;
use tracing::trace;

use crate::device_info::DeviceInfo;
use crate::error::{AmbitError, Result};
use crate::log_entry::{LogEntry, LogHeader};

/// What a driver sees of the device while a capability runs
///
/// Built on the stack for each call: from a session, or from a bare probe
/// handle during enumeration.
pub struct DeviceContext<'a> {
    handle: Option<&'a mut (dyn HidHandle + 'static)>,
    sequence_no: &'a mut u16,
    protocol: &'a dyn ProtocolTransport,
    info: &'a DeviceInfo,
}

impl<'a> DeviceContext<'a> {
    pub fn new(
        handle: Option<&'a mut (dyn HidHandle + 'static)>,
        sequence_no: &'a mut u16,
        protocol: &'a dyn ProtocolTransport,
        info: &'a DeviceInfo,
    ) -> Self {
        Self {
            handle,
            sequence_no,
            protocol,
            info,
        }
    }

    /// Identity of the device being driven
    pub fn device_info(&self) -> &DeviceInfo {
        self.info
    }

    /// Current request sequence number
    pub fn sequence_no(&self) -> u16 {
        *self.sequence_no
    }

    /// Whether a HID handle is available for I/O
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Run one command exchange and return the reply payload
    pub fn command(&mut self, command: u16, payload: &[u8], legacy: bool) -> Result<Vec<u8>> {
        let handle = self
            .handle
            .as_deref_mut()
            .ok_or(AmbitError::Transport(TransportError::NotOpen))?;
        trace!(
            "command {} (0x{:04x}), {} byte payload, seq {}",
            cmd::name(command),
            command,
            payload.len(),
            *self.sequence_no
        );
        let reply = self
            .protocol
            .command(handle, &mut *self.sequence_no, command, payload, legacy)?;
        Ok(reply)
    }

    /// Run a typed command
    pub fn execute<C: AmbitCommand>(&mut self, command: &C) -> Result<Vec<u8>> {
        self.command(C::CMD, &command.to_data(), C::LEGACY)
    }
}

/// Battery and general status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Battery charge, percent
    pub charge: u8,
}

/// User settings stored on the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalSettings {
    pub sportmode_button_lock: bool,
    pub timemode_button_lock: bool,
    /// Compass declination, 1/100 degree
    pub compass_declination: i16,
    pub units_metric: bool,
    pub weight_grams: u16,
    pub birthyear: u16,
    pub max_hr: u8,
    pub rest_hr: u8,
    pub length_cm: u8,
    pub is_male: bool,
    pub alarm_enabled: bool,
    pub alarm_hour: u8,
    pub alarm_minute: u8,
}

/// Receives log entries while a driver reads them
pub trait LogSink {
    /// Return false to skip the entry described by `header`
    fn should_read(&mut self, _header: &LogHeader) -> bool {
        true
    }

    /// Take ownership of one parsed entry
    fn push(&mut self, entry: LogEntry);

    /// Progress notification
    fn progress(&mut self, _log_count: u16, _log_current: u16, _percent: u8) {}
}

/// Per-family device behaviour
pub trait DeviceDriver: Send {
    /// Called once when a session binds the driver
    fn init(&mut self, _ctx: &mut DeviceContext<'_>, _param: u32) -> Result<()> {
        Ok(())
    }

    /// Called once at session teardown, while the handle is still open
    fn deinit(&mut self, _ctx: &mut DeviceContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Take or release the on-device log lock (sync display)
    fn lock_log(&mut self, _ctx: &mut DeviceContext<'_>, _lock: bool) -> Result<()> {
        Err(AmbitError::Unsupported("lock_log"))
    }

    fn date_time_set(
        &mut self,
        _ctx: &mut DeviceContext<'_>,
        _date_time: &NaiveDateTime,
    ) -> Result<()> {
        Err(AmbitError::Unsupported("date_time_set"))
    }

    fn status_get(&mut self, _ctx: &mut DeviceContext<'_>) -> Result<DeviceStatus> {
        Err(AmbitError::Unsupported("status_get"))
    }

    fn personal_settings_get(&mut self, _ctx: &mut DeviceContext<'_>) -> Result<PersonalSettings> {
        Err(AmbitError::Unsupported("personal_settings_get"))
    }

    fn gps_orbit_header_read(&mut self, _ctx: &mut DeviceContext<'_>) -> Result<[u8; 8]> {
        Err(AmbitError::Unsupported("gps_orbit_header_read"))
    }

    fn gps_orbit_write(&mut self, _ctx: &mut DeviceContext<'_>, _data: &[u8]) -> Result<()> {
        Err(AmbitError::Unsupported("gps_orbit_write"))
    }

    /// Read logs into `sink`, returning how many entries were pushed
    fn log_read(&mut self, _ctx: &mut DeviceContext<'_>, _sink: &mut dyn LogSink) -> Result<usize> {
        Err(AmbitError::Unsupported("log_read"))
    }
}
