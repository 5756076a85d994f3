//! Driver for the Ambit family (Ambit, Ambit2, Ambit3)
//!
//! Covers the clock, status, sync-display lock and GPS orbit upload. Log
//! download and personal settings need the per-model record parsers and
//! report unsupported here.

use ambit_transport::cmd;
use ambit_transport::command::{DataTailLen, DataWriteHeader, SetDate, SetLock, SetTime, WriteStart};
use ambit_transport::protocol::gps_orbit;
use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{debug, info};

use crate::driver::{DeviceContext, DeviceDriver, DeviceStatus};
use crate::error::{AmbitError, Result};

/// Lock word values reported by LOCK_CHECK
mod lock_state {
    pub const UNLOCKED: u32 = 0;
    pub const LOCKED: u32 = 1;
}

/// Ambit family driver
#[derive(Debug, Default)]
pub struct AmbitDriver {
    /// Log memory format selector from the registry entry
    log_format: u32,
}

impl AmbitDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log memory format selected at init
    pub fn log_format(&self) -> u32 {
        self.log_format
    }

    fn read_lock(ctx: &mut DeviceContext<'_>) -> Result<u32> {
        let reply = ctx.command(cmd::LOCK_CHECK, &[], false)?;
        if reply.len() < 4 {
            return Err(AmbitError::UnexpectedResponse(format!(
                "lock check reply too short: {} bytes",
                reply.len()
            )));
        }
        Ok(u32::from_le_bytes([reply[0], reply[1], reply[2], reply[3]]))
    }
}

/// Device address one past the last byte of an orbit upload of `len` bytes
fn orbit_upload_end(len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .and_then(|len| gps_orbit::BASE_ADDRESS.checked_add(len))
        .ok_or_else(|| {
            AmbitError::InvalidArgument(format!("orbit data too large: {} bytes", len))
        })
}

impl DeviceDriver for AmbitDriver {
    fn init(&mut self, ctx: &mut DeviceContext<'_>, param: u32) -> Result<()> {
        self.log_format = param;
        debug!(
            "Ambit driver bound to {} (log format 0x{:04x})",
            ctx.device_info().path,
            param
        );
        Ok(())
    }

    fn deinit(&mut self, ctx: &mut DeviceContext<'_>) -> Result<()> {
        debug!("Ambit driver released from {}", ctx.device_info().path);
        Ok(())
    }

    fn lock_log(&mut self, ctx: &mut DeviceContext<'_>, lock: bool) -> Result<()> {
        let current = Self::read_lock(ctx)?;
        match (lock, current) {
            (true, lock_state::UNLOCKED) | (false, lock_state::LOCKED) => {
                ctx.execute(&SetLock::new(lock))?;
                debug!("Log lock set to {}", lock);
            }
            _ => debug!("Log lock already {} (state {})", lock, current),
        }
        Ok(())
    }

    fn date_time_set(
        &mut self,
        ctx: &mut DeviceContext<'_>,
        date_time: &NaiveDateTime,
    ) -> Result<()> {
        let year = u16::try_from(date_time.year()).map_err(|_| {
            AmbitError::InvalidArgument(format!("year {} out of range", date_time.year()))
        })?;
        // chrono guarantees these fit: month 1-12, day 1-31, hour 0-23, minute/second 0-59
        let month = date_time.month() as u8;
        let day = date_time.day() as u8;
        let hour = date_time.hour() as u8;
        let minute = date_time.minute() as u8;
        let second = date_time.second().min(59) as u8;

        ctx.execute(&SetDate::new(year, month, day))?;
        ctx.execute(&SetTime::new(year, month, day, hour, minute, second))?;
        info!("Device clock set to {}", date_time);
        Ok(())
    }

    fn status_get(&mut self, ctx: &mut DeviceContext<'_>) -> Result<DeviceStatus> {
        let reply = ctx.command(cmd::DEVICE_STATUS, &[], false)?;
        if reply.len() < 2 {
            return Err(AmbitError::UnexpectedResponse(format!(
                "status reply too short: {} bytes",
                reply.len()
            )));
        }
        Ok(DeviceStatus { charge: reply[1] })
    }

    fn gps_orbit_header_read(&mut self, ctx: &mut DeviceContext<'_>) -> Result<[u8; 8]> {
        let reply = ctx.command(cmd::GPS_ORBIT_HEAD, &[], false)?;
        if reply.len() < 1 + gps_orbit::HEADER_LEN {
            return Err(AmbitError::UnexpectedResponse(format!(
                "GPS orbit header reply too short: {} bytes",
                reply.len()
            )));
        }
        let mut header = [0u8; gps_orbit::HEADER_LEN];
        header.copy_from_slice(&reply[1..=gps_orbit::HEADER_LEN]);
        Ok(header)
    }

    fn gps_orbit_write(&mut self, ctx: &mut DeviceContext<'_>, data: &[u8]) -> Result<()> {
        // every chunk address below stays under this bound
        let end = orbit_upload_end(data.len())?;
        let total = end - gps_orbit::BASE_ADDRESS;

        ctx.execute(&WriteStart::default())?;

        let mut address = gps_orbit::BASE_ADDRESS;
        for chunk in data.chunks(gps_orbit::CHUNK_SIZE) {
            // chunks are at most CHUNK_SIZE bytes
            let len = chunk.len() as u32;
            let header = DataWriteHeader::new(address, len);
            ctx.command(cmd::DATA_WRITE, &header.with_chunk(chunk), false)?;
            address = address.checked_add(len).ok_or_else(|| {
                AmbitError::InvalidArgument(format!("orbit address overflow at 0x{:08x}", address))
            })?;
        }

        ctx.execute(&DataTailLen::new(total))?;
        info!("Wrote {} bytes of GPS orbit data", total);
        Ok(())
    }
}
