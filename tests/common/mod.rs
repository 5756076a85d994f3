//! Fakes shared by the integration tests
//!
//! Every fake writes to one [`EventLog`] so tests can assert the order in
//! which the library touched the driver, the protocol and the handles.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use ambit_transport::{HidBackend, HidHandle, ProtocolTransport, RawInterface, TransportError};
use libambit::registry::{DriverFactory, KnownDevice};
use libambit::{AmbitError, DeviceContext, DeviceDriver, DeviceStatus, Result, Version};

pub const SUUNTO: u16 = 0x1493;
pub const DUCK_PID: u16 = 0x0019;

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Formatted log output collected by [`capture_logs`]
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records this thread's log lines
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.contents())
}

/// 40-byte DEVICE_INFO reply
pub fn device_info_reply(model: &str, serial: &str, fw: [u8; 4], hw: [u8; 4]) -> Vec<u8> {
    let mut buf = vec![0u8; 40];
    buf[..model.len()].copy_from_slice(model.as_bytes());
    buf[16..16 + serial.len()].copy_from_slice(serial.as_bytes());
    buf[32..36].copy_from_slice(&fw);
    buf[36..40].copy_from_slice(&hw);
    buf
}

// ── HID backend ──

#[derive(Default)]
struct BackendState {
    interfaces: Vec<RawInterface>,
    enumerate_fails: bool,
    openable: HashSet<String>,
    access_errno: HashMap<String, i32>,
    open_attempts: Vec<String>,
}

/// Scripted HID bus
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
    log: EventLog,
}

impl FakeBackend {
    pub fn new(log: &EventLog) -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState::default())),
            log: Arc::clone(log),
        }
    }

    /// Attach an interface that opens normally
    pub fn attach(&self, raw: RawInterface) -> &Self {
        let mut state = self.state.lock().unwrap();
        state.openable.insert(raw.path.clone());
        state.interfaces.push(raw);
        self
    }

    /// Attach an interface whose HID open fails; `errno` makes the plain
    /// read/write check fail too
    pub fn attach_unopenable(&self, raw: RawInterface, errno: Option<i32>) -> &Self {
        let mut state = self.state.lock().unwrap();
        if let Some(errno) = errno {
            state.access_errno.insert(raw.path.clone(), errno);
        }
        state.interfaces.push(raw);
        self
    }

    pub fn fail_enumeration(&self) {
        self.state.lock().unwrap().enumerate_fails = true;
    }

    pub fn set_openable(&self, path: &str, openable: bool) {
        let mut state = self.state.lock().unwrap();
        if openable {
            state.openable.insert(path.to_string());
        } else {
            state.openable.remove(path);
        }
    }

    pub fn open_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().open_attempts.clone()
    }
}

impl HidBackend for FakeBackend {
    fn enumerate(&self) -> std::result::Result<Vec<RawInterface>, TransportError> {
        let state = self.state.lock().unwrap();
        if state.enumerate_fails {
            return Err(TransportError::HidError("enumeration failed".into()));
        }
        Ok(state.interfaces.clone())
    }

    fn open_path(&self, path: &str) -> std::result::Result<Box<dyn HidHandle>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.open_attempts.push(path.to_string());
        if !state.openable.contains(path) {
            return Err(TransportError::HidError(format!("cannot open {path}")));
        }
        self.log.lock().unwrap().push(format!("open {path}"));
        Ok(Box::new(FakeHandle {
            path: path.to_string(),
            log: Arc::clone(&self.log),
        }))
    }

    fn check_access(&self, path: &str) -> std::io::Result<()> {
        match self.state.lock().unwrap().access_errno.get(path) {
            Some(&errno) => Err(std::io::Error::from_raw_os_error(errno)),
            None => Ok(()),
        }
    }
}

/// Handle that logs when it is closed
pub struct FakeHandle {
    path: String,
    log: EventLog,
}

impl HidHandle for FakeHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, TransportError> {
        Ok(data.len())
    }

    fn read_timeout(
        &mut self,
        _buf: &mut [u8],
        _timeout_ms: i32,
    ) -> std::result::Result<usize, TransportError> {
        Ok(0)
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> std::result::Result<(), TransportError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("nonblocking {nonblocking}"));
        Ok(())
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.log
            .lock()
            .unwrap()
            .push(format!("handle_close {}", self.path));
    }
}

// ── Protocol ──

/// One command as the protocol saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub path: String,
    pub cmd: u16,
    pub payload: Vec<u8>,
    pub legacy: bool,
}

/// Replies per (path, command); anything unscripted times out
#[derive(Default)]
pub struct ScriptedProtocol {
    replies: Mutex<HashMap<(String, u16), Vec<u8>>>,
    sent: Mutex<Vec<SentCommand>>,
}

impl ScriptedProtocol {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, path: &str, cmd: u16, reply: Vec<u8>) {
        self.replies
            .lock()
            .unwrap()
            .insert((path.to_string(), cmd), reply);
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().unwrap().clone()
    }
}

impl ProtocolTransport for ScriptedProtocol {
    fn command(
        &self,
        handle: &mut dyn HidHandle,
        sequence_no: &mut u16,
        cmd: u16,
        payload: &[u8],
        legacy: bool,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        *sequence_no = sequence_no.wrapping_add(1);
        self.sent.lock().unwrap().push(SentCommand {
            path: handle.path().to_string(),
            cmd,
            payload: payload.to_vec(),
            legacy,
        });
        self.replies
            .lock()
            .unwrap()
            .get(&(handle.path().to_string(), cmd))
            .cloned()
            .ok_or(TransportError::Timeout)
    }
}

// ── Driver ──

/// Driver that records its lifecycle calls
pub struct RecordingDriver {
    pub log: EventLog,
    pub supports_lock: bool,
    pub fail_init: bool,
}

impl DeviceDriver for RecordingDriver {
    fn init(&mut self, _ctx: &mut DeviceContext<'_>, param: u32) -> Result<()> {
        self.log.lock().unwrap().push(format!("init 0x{param:04x}"));
        if self.fail_init {
            return Err(AmbitError::UnexpectedResponse("init refused".into()));
        }
        Ok(())
    }

    fn deinit(&mut self, _ctx: &mut DeviceContext<'_>) -> Result<()> {
        self.log.lock().unwrap().push("deinit".into());
        Ok(())
    }

    fn lock_log(&mut self, _ctx: &mut DeviceContext<'_>, lock: bool) -> Result<()> {
        if !self.supports_lock {
            return Err(AmbitError::Unsupported("lock_log"));
        }
        self.log.lock().unwrap().push(format!("lock_log({lock})"));
        Ok(())
    }

    fn status_get(&mut self, ctx: &mut DeviceContext<'_>) -> Result<DeviceStatus> {
        let reply = ctx.command(ambit_transport::cmd::DEVICE_STATUS, &[], false)?;
        Ok(DeviceStatus {
            charge: reply.get(1).copied().unwrap_or_default(),
        })
    }
}

pub fn recording_factory(log: &EventLog, supports_lock: bool, fail_init: bool) -> DriverFactory {
    let log = Arc::clone(log);
    Arc::new(move || {
        Box::new(RecordingDriver {
            log: Arc::clone(&log),
            supports_lock,
            fail_init,
        }) as Box<dyn DeviceDriver>
    })
}

/// Registry entry for an Ambit2 ("Duck") with the given driver
pub fn duck_entry(driver: Option<DriverFactory>) -> KnownDevice {
    KnownDevice {
        vendor_id: SUUNTO,
        product_id: DUCK_PID,
        model: "Duck",
        min_fw: Version([1, 1, 2, 0]),
        name: "Suunto Ambit2",
        supported: true,
        driver,
        driver_param: 0x0400,
    }
}
