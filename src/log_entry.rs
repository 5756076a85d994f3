//! Parsed log entries
//!
//! An entry owns its samples and every sample owns its variant payload. The
//! variant is a sum type, so a sample can never carry a payload that
//! disagrees with its kind, and release handles each kind in one
//! exhaustive match.

use chrono::NaiveDateTime;
use tracing::debug;

/// Summary of one log, read before its samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogHeader {
    pub date_time: Option<NaiveDateTime>,
    /// Duration in milliseconds
    pub duration: u32,
    /// Ascent in meters
    pub ascent: u16,
    /// Descent in meters
    pub descent: u16,
    /// Distance in meters
    pub distance: u32,
    pub heartrate_avg: u8,
    pub heartrate_max: u8,
    pub activity_type: u8,
    pub activity_name: String,
    /// Number of samples the device reports for this log
    pub samples_count: u32,
}

/// One value of a periodic sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicValue {
    /// 1/10^7 degrees
    Latitude(i32),
    /// 1/10^7 degrees
    Longitude(i32),
    /// Meters
    Distance(u32),
    /// 1/100 m/s
    Speed(u16),
    /// Beats per minute
    HeartRate(u8),
    /// Milliseconds since log start
    Time(u32),
    /// Meters
    Altitude(i16),
    /// 1/10 hPa
    AbsPressure(u16),
    /// 1/10 kcal/min
    Energy(u16),
    /// 1/10 degree Celsius
    Temperature(i16),
    /// Percent
    Charge(u8),
    /// Revolutions per minute
    Cadence(u8),
    /// cm/s
    VerticalSpeed(i16),
    /// Any value type without a dedicated variant
    Other { kind: u16, raw: u32 },
}

/// One satellite in a GPS fix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Satellite {
    pub sv: u8,
    pub snr: u8,
    pub state: u8,
}

/// Full GPS fix record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpsBase {
    pub navtype: u16,
    pub utc_time: Option<NaiveDateTime>,
    /// 1/10^7 degrees
    pub latitude: i32,
    /// 1/10^7 degrees
    pub longitude: i32,
    /// Centimeters
    pub altitude: i32,
    /// 1/100 m/s
    pub speed: u16,
    /// 1/100 degree
    pub heading: u16,
    /// Estimated horizontal position error, centimeters
    pub ehpe: u32,
    pub hdop: u8,
    pub satellites: Vec<Satellite>,
}

/// Variant payload of a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleData {
    Periodic(Vec<PeriodicValue>),
    GpsBase(GpsBase),
    /// Record type the parser does not understand, kept verbatim
    Unknown(Vec<u8>),
}

/// Tag of a [`SampleData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Periodic,
    GpsBase,
    Unknown,
}

impl SampleData {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleData::Periodic(_) => SampleKind::Periodic,
            SampleData::GpsBase(_) => SampleKind::GpsBase,
            SampleData::Unknown(_) => SampleKind::Unknown,
        }
    }
}

/// One sample of a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSample {
    /// Milliseconds since log start
    pub time: u32,
    pub data: SampleData,
}

impl LogSample {
    pub fn new(time: u32, data: SampleData) -> Self {
        Self { time, data }
    }
}

/// A complete log: header plus samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub header: LogHeader,
    pub samples: Vec<LogSample>,
}

/// What a release walked through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseStats {
    pub samples: usize,
    pub periodic_values: usize,
    pub satellites: usize,
    pub unknown_bytes: usize,
}

impl LogEntry {
    pub fn new(header: LogHeader) -> Self {
        Self {
            header,
            samples: Vec::new(),
        }
    }

    /// Release every sample payload, then the samples, then the entry
    pub fn release(self) -> ReleaseStats {
        let LogEntry { header, samples } = self;
        let mut stats = ReleaseStats {
            samples: samples.len(),
            ..Default::default()
        };

        for sample in samples {
            match sample.data {
                SampleData::Periodic(values) => {
                    stats.periodic_values += values.len();
                    drop(values);
                }
                SampleData::GpsBase(gps) => {
                    stats.satellites += gps.satellites.len();
                    drop(gps.satellites);
                }
                SampleData::Unknown(data) => {
                    stats.unknown_bytes += data.len();
                    drop(data);
                }
            }
        }
        drop(header);

        debug!(
            "Released log entry: {} samples ({} periodic values, {} satellites, {} unknown bytes)",
            stats.samples, stats.periodic_values, stats.satellites, stats.unknown_bytes
        );
        stats
    }
}

/// Release an entry; `None` is a no-op
pub fn release(entry: Option<LogEntry>) -> ReleaseStats {
    entry.map(LogEntry::release).unwrap_or_default()
}
